//! Arithmetic and comparison on two register operands. Arithmetic is 8 bit
//! and wraps around.

use log::*;

use crate::fault::Fault;
use crate::memory::Byte;
use crate::processor::Instruction;
use crate::registers::{Flag, Registers};

/// Applies `op` to the registers `reg_a` and `reg_b`. ADD and MUL store the
/// result in `reg_a`, CMP overwrites the flag.
pub fn apply(
    op: Instruction,
    reg_a: usize,
    reg_b: usize,
    registers: &mut Registers,
) -> Result<(), Fault> {
    match op {
        Instruction::ADD | Instruction::MUL => {
            let a = registers.get(reg_a)?;
            let b = registers.get(reg_b)?;
            let result = if op == Instruction::ADD {
                a.wrapping_add(b)
            } else {
                a.wrapping_mul(b)
            };
            registers.set(reg_a, result)?;

            debug!("{} R{} R{}: {} {} = {}", op, reg_a, reg_b, a, b, result);
        }
        Instruction::CMP => {
            let a = registers.get(reg_a)?;
            let b = registers.get(reg_b)?;
            let flag = compare(a, b);
            registers.set_flag(flag);

            debug!("CMP R{} R{}: {} {} = {:?}", reg_a, reg_b, a, b, flag);
        }
        other => return Err(Fault::UnsupportedOperation(other)),
    }

    Ok(())
}

/// Equality is checked first, then less than, then greater than
pub fn compare(a: Byte, b: Byte) -> Flag {
    if a == b {
        Flag::Equal
    } else if a < b {
        Flag::LessThan
    } else {
        Flag::GreaterThan
    }
}
