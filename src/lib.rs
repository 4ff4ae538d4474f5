//! An LS-8 style byte-code virtual machine.
//!
//! A program of binary literals is loaded into [`memory::Memory`] and run by a
//! [`processor::Processor`] against eight registers and a comparison flag.

pub mod alu;
pub mod config;
pub mod fault;
pub mod memory;
pub mod processor;
pub mod registers;
