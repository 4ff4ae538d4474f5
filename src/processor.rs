use std::convert::TryFrom;
use std::io::Write;

use crate::alu;
use crate::fault::Fault;
use crate::memory::{Address, Byte, Memory};
use log::*;
use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

use crate::registers::Registers;

/// Run state of the CPU
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Running,
    /// Stopped by HLT
    Halted,
    /// Stopped by an unrecoverable error
    Faulted(Fault),
}

/// Emulates a CPU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processor {
    /// Program counter
    pub pc: Address,
    /// General purpose registers and the comparison flag
    pub registers: Registers,
    pub state: State,
}

impl Default for Processor {
    /// Initializes a new CPU starting at address 0
    fn default() -> Self {
        Self::new(0)
    }
}

impl Processor {
    /// Initializes a new CPU
    /// @param entrypoint The start of the program
    pub fn new(entrypoint: Address) -> Self {
        Self {
            pc: entrypoint,
            registers: Registers::default(),
            state: State::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Executes a single instruction
    pub fn execute_instruction<const S: usize, W: Write>(
        &mut self,
        instruction: Instruction,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<(), Fault> {
        match instruction {
            Instruction::HLT => {
                self.state = State::Halted;

                debug!("HLT");
            }
            Instruction::LDI => {
                let reg = self.register_operand(memory, 1)?;
                let value = self.operand(memory, 2)?;
                self.registers.set(reg, value)?;
                self.advance(instruction);

                debug!("LDI R{} {}", reg, value);
            }
            Instruction::PRN => {
                let reg = self.register_operand(memory, 1)?;
                let value = self.registers.get(reg)?;
                writeln!(out, "{}", value).map_err(|err| Fault::Output(err.to_string()))?;
                self.advance(instruction);

                debug!("PRN R{}: {}", reg, value);
            }
            Instruction::ADD | Instruction::MUL | Instruction::CMP => {
                let reg_a = self.register_operand(memory, 1)?;
                let reg_b = self.register_operand(memory, 2)?;
                alu::apply(instruction, reg_a, reg_b, &mut self.registers)?;
                self.advance(instruction);
            }
            Instruction::JMP => {
                let addr = self.jump_target(memory)?;
                self.pc = addr;

                debug!("JMP {}", addr);
            }
            Instruction::JEQ | Instruction::JNE => {
                let flag = self.registers.flag();

                if flag.is_equal() == (instruction == Instruction::JEQ) {
                    self.pc = self.jump_target(memory)?;
                } else {
                    self.advance(instruction);
                }

                debug!("{} {:?}: continue at {}", instruction, flag, self.pc);
            }
            Instruction::PUSH => {
                let reg = self.register_operand(memory, 1)?;
                let value = self.registers.get(reg)?;
                self.push(memory, value)?;
                self.advance(instruction);

                debug!("PUSH R{}: {}", reg, value);
            }
            Instruction::POP => {
                let reg = self.register_operand(memory, 1)?;
                let value = self.pop(memory)?;
                self.registers.set(reg, value)?;
                self.advance(instruction);

                debug!("POP R{}: {}", reg, value);
            }
            Instruction::CALL => {
                let addr = self.jump_target(memory)?;
                let ret = self.pc + instruction.size();
                // return addresses live on the 8 bit stack
                let ret_byte = Byte::try_from(ret).map_err(|_| Fault::OutOfBounds {
                    address: ret,
                    size: S,
                })?;
                self.push(memory, ret_byte)?;
                self.pc = addr;

                debug!("CALL {}: return to {}", addr, ret);
            }
            Instruction::RET => {
                let addr = Address::from(self.pop(memory)?);
                self.pc = addr;

                debug!("RET {}", addr);
            }
        }

        Ok(())
    }

    /// Runs one execution step. A fault stops the CPU and is returned.
    pub fn execute<const S: usize, W: Write>(
        &mut self,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<(), Fault> {
        if !self.is_running() {
            return Ok(());
        }

        let result = self.step(memory, out);
        if let Err(fault) = &result {
            error!("Fault at 0x{:02X}: {}", self.pc, fault);
            self.state = State::Faulted(fault.clone());
        }

        result
    }

    /// Run program until it halts or faults. A processor which already
    /// faulted returns its fault again.
    pub fn execute_until_halt<const S: usize, W: Write>(
        &mut self,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<(), Fault> {
        while self.is_running() {
            self.execute(memory, out)?;
        }

        match &self.state {
            State::Faulted(fault) => Err(fault.clone()),
            _ => {
                info!("Program halted at 0x{:02X}", self.pc);
                Ok(())
            }
        }
    }

    fn step<const S: usize, W: Write>(
        &mut self,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<(), Fault> {
        self.trace(memory);

        let opcode = memory.read_byte(self.pc)?; // Read opcode where PC is
        let instruction = Instruction::try_from(opcode).map_err(|_| Fault::UnknownInstruction {
            opcode,
            address: self.pc,
        })?;
        self.execute_instruction(instruction, memory, out)
    }

    /// Moves the PC past `instruction` and its operands
    fn advance(&mut self, instruction: Instruction) {
        self.pc += instruction.size();
    }

    /// Reads the operand byte at `offset` behind the opcode
    fn operand<const S: usize>(&self, memory: &Memory<S>, offset: usize) -> Result<Byte, Fault> {
        memory.read_byte(self.pc + offset)
    }

    fn register_operand<const S: usize>(
        &self,
        memory: &Memory<S>,
        offset: usize,
    ) -> Result<usize, Fault> {
        self.operand(memory, offset).map(usize::from)
    }

    /// Address held by the register named in the first operand. Not checked
    /// against memory: a bad target faults on the next fetch.
    fn jump_target<const S: usize>(&self, memory: &Memory<S>) -> Result<Address, Fault> {
        let reg = self.register_operand(memory, 1)?;
        self.registers.get(reg).map(Address::from)
    }

    fn push<const S: usize>(&mut self, memory: &mut Memory<S>, value: Byte) -> Result<(), Fault> {
        let sp = self.registers.sp().wrapping_sub(1);
        memory.write_byte(Address::from(sp), value)?;
        self.registers.set_sp(sp);

        Ok(())
    }

    fn pop<const S: usize>(&mut self, memory: &Memory<S>) -> Result<Byte, Fault> {
        let sp = self.registers.sp();
        let value = memory.read_byte(Address::from(sp))?;
        self.registers.set_sp(sp.wrapping_add(1));

        Ok(value)
    }

    /// Logs the CPU state: `pc | opcode operands | registers`
    fn trace<const S: usize>(&self, memory: &Memory<S>) {
        if !log_enabled!(Level::Trace) {
            return;
        }

        let byte = |offset: usize| {
            memory
                .read_byte(self.pc + offset)
                .map_or_else(|_| "--".to_string(), |b| format!("{:02X}", b))
        };
        let registers: String = self
            .registers
            .values()
            .iter()
            .map(|r| format!(" {:02X}", r))
            .collect();

        trace!(
            "TRACE: {:02X} | {} {} {} |{}",
            self.pc,
            byte(0),
            byte(1),
            byte(2),
            registers
        );
    }
}

macro_rules! instructions {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal => $operands:literal , )+ ) => {
        /// Defines the instructions and the number of operand bytes following
        /// each opcode
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Instruction {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Instruction {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }

            /// Number of operand bytes
            pub fn operands(&self) -> usize {
                match self {
                    $( Self::$name => $operands , )+
                }
            }

            /// Encoded length in bytes, opcode included
            pub fn size(&self) -> usize {
                1 + self.operands()
            }
        }

        impl ::std::fmt::Display for Instruction {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    }
}

instructions! {
    /// Stop the execution of the program
    HLT = 0b0000_0001 => 0,
    /// Return from a subroutine to the address on top of the stack
    RET = 0b0001_0001 => 0,
    /// Push a register onto the stack
    /// @param register
    PUSH = 0b0100_0101 => 1,
    /// Pop the top of the stack into a register
    /// @param register
    POP = 0b0100_0110 => 1,
    /// Prints the decimal value of a register
    /// @param register
    PRN = 0b0100_0111 => 1,
    /// Push the return address and jump to the address held in a register
    /// @param register
    CALL = 0b0101_0000 => 1,
    /// Jump to the address held in a register
    /// @param register
    JMP = 0b0101_0100 => 1,
    /// Jump if the last comparison was equal
    /// @param register
    JEQ = 0b0101_0101 => 1,
    /// Jump if the last comparison was not equal
    /// @param register
    JNE = 0b0101_0110 => 1,
    /// Load an immediate value into a register
    /// @param register
    /// @param value
    LDI = 0b1000_0010 => 2,
    /// Add register b to register a
    /// @param register a
    /// @param register b
    ADD = 0b1010_0000 => 2,
    /// Multiply register a by register b
    /// @param register a
    /// @param register b
    MUL = 0b1010_0010 => 2,
    /// Compare two registers and set the flag
    /// @param register a
    /// @param register b
    CMP = 0b1010_0111 => 2,
}
