use num_enum::IntoPrimitive;

use crate::fault::Fault;
use crate::memory::Byte;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 8;
/// Register reserved as stack pointer
pub const SP: usize = 7;
/// Initial value of the stack pointer. The stack grows down from here.
pub const STACK_START: Byte = 0xF4;

/// Outcome of the last comparison. Only one bit is ever set.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive)]
pub enum Flag {
    None = 0b000,
    Equal = 0b001,
    GreaterThan = 0b010,
    LessThan = 0b100,
}

impl Default for Flag {
    fn default() -> Self {
        Self::None
    }
}

impl Flag {
    /// The flag as raw `00000LGE` bits
    pub fn bits(self) -> Byte {
        self.into()
    }

    pub fn is_equal(self) -> bool {
        self == Self::Equal
    }
}

/// The register file of the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registers {
    data: [Byte; REGISTER_COUNT],
    flag: Flag,
}

impl Default for Registers {
    /// Zeroes all registers except the stack pointer
    fn default() -> Self {
        let mut data = [0; REGISTER_COUNT];
        data[SP] = STACK_START;

        Self {
            data,
            flag: Flag::None,
        }
    }
}

impl Registers {
    /// Reads register `index`
    pub fn get(&self, index: usize) -> Result<Byte, Fault> {
        self.data
            .get(index)
            .copied()
            .ok_or(Fault::InvalidRegister { index })
    }

    /// Writes `value` to register `index`
    pub fn set(&mut self, index: usize, value: Byte) -> Result<(), Fault> {
        let slot = self
            .data
            .get_mut(index)
            .ok_or(Fault::InvalidRegister { index })?;
        *slot = value;

        Ok(())
    }

    pub fn flag(&self) -> Flag {
        self.flag
    }

    pub fn set_flag(&mut self, flag: Flag) {
        self.flag = flag;
    }

    pub fn sp(&self) -> Byte {
        self.data[SP]
    }

    pub fn set_sp(&mut self, value: Byte) {
        self.data[SP] = value;
    }

    pub fn values(&self) -> &[Byte; REGISTER_COUNT] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_default() {
        let regs = Registers::default();

        assert_eq!(regs.values(), &[0, 0, 0, 0, 0, 0, 0, STACK_START]);
        assert_eq!(regs.flag(), Flag::None);
    }

    #[test]
    fn test_set_get() -> Result<()> {
        let mut regs = Registers::default();
        regs.set(3, 42)?;

        assert_eq!(regs.get(3)?, 42);
        assert_eq!(regs.values()[3], 42);

        Ok(())
    }

    #[test]
    fn test_invalid_register() {
        let mut regs = Registers::default();

        assert_eq!(regs.get(8), Err(Fault::InvalidRegister { index: 8 }));
        assert_eq!(regs.set(200, 1), Err(Fault::InvalidRegister { index: 200 }));
        assert_eq!(regs, Registers::default());
    }

    #[test]
    fn test_stack_pointer_is_r7() -> Result<()> {
        let mut regs = Registers::default();
        regs.set_sp(0x10);

        assert_eq!(regs.get(SP)?, 0x10);

        Ok(())
    }

    #[test]
    fn test_flag_bits() {
        assert_eq!(Flag::None.bits(), 0b000);
        assert_eq!(Flag::Equal.bits(), 0b001);
        assert_eq!(Flag::GreaterThan.bits(), 0b010);
        assert_eq!(Flag::LessThan.bits(), 0b100);
        assert!(Flag::Equal.is_equal());
        assert!(!Flag::LessThan.is_equal());
    }
}
