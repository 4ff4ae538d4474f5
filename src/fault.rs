use thiserror::Error;

use crate::memory::{Address, Byte};
use crate::processor::Instruction;

/// Unrecoverable errors raised while the processor runs. Any of these moves
/// the processor into [`State::Faulted`](crate::processor::State::Faulted).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("address `0x{address:02X}` is outside of memory (size {size})")]
    OutOfBounds { address: Address, size: usize },
    #[error("register `R{index}` does not exist")]
    InvalidRegister { index: usize },
    #[error("unsupported ALU operation `{0}`")]
    UnsupportedOperation(Instruction),
    #[error("unknown instruction `0b{opcode:08b}` at `0x{address:02X}`")]
    UnknownInstruction { opcode: Byte, address: Address },
    #[error("failed to write output: {0}")]
    Output(String),
}
