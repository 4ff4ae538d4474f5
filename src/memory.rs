use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::*;
use thiserror::Error;

use crate::fault::Fault;

use self::parse::{ParseError, Parser};

pub mod parse;

pub type Byte = u8;
pub type Address = usize;

/// Size of the default memory
pub const STD_MEM_SIZE: usize = 256;

/// Default memory
pub type StdMem = Memory<STD_MEM_SIZE>;

/// Errors raised while loading a program into memory
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read program `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse program: {}", summarize(.0))]
    Parse(Vec<ParseError>),
}

fn summarize(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Emulates memory for use with the CPU. Holds the program and the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Byte; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a byte from the memory
    pub fn read_byte(&self, position: Address) -> Result<Byte, Fault> {
        self.data
            .get(position)
            .copied()
            .ok_or(Fault::OutOfBounds {
                address: position,
                size: S,
            })
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: Address, value: Byte) -> Result<(), Fault> {
        let cell = self.data.get_mut(position).ok_or(Fault::OutOfBounds {
            address: position,
            size: S,
        })?;
        *cell = value;

        Ok(())
    }

    /// Writes an array of bytes to the memory. Nothing is written if the
    /// array does not fit.
    pub fn write_array(&mut self, position: Address, data: &[Byte]) -> Result<(), Fault> {
        let end = position + data.len();
        let target = self
            .data
            .get_mut(position..end)
            .ok_or(Fault::OutOfBounds {
                address: end.saturating_sub(1),
                size: S,
            })?;
        target.copy_from_slice(data);

        Ok(())
    }

    /// Loads the program file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loading program `{}`", path.display());

        data.parse()
    }

    /// Logs every row of 16 bytes which is not all zero
    pub fn dump(&self) {
        if !log_enabled!(Level::Debug) {
            return;
        }

        for (row, chunk) in self.data.chunks(16).enumerate() {
            if chunk.iter().all(|&byte| byte == 0) {
                continue;
            }

            let line: String = chunk.iter().map(|b| format!(" {:02X}", b)).collect();
            debug!("{:04X}:{}", row * 16, line);
        }
    }
}

impl<const S: usize> FromStr for Memory<S> {
    type Err = LoadError;

    /// Parses a program of binary literals into memory starting at address 0
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s, Self::default())
            .parse()
            .map_err(LoadError::Parse)
    }
}

/// Writes a block of instructions directly into the memory
// Thanks for @Shemnei for helping me with this!
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ])
    };
}

#[cfg(test)]
mod tests {
    use crate::processor::Instruction;

    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_read_byte() -> Result<()> {
        let mut mem = StdMem::default();
        mem.data[0x2] = 0x12;
        assert_eq!(mem.read_byte(0x2)?, 0x12);

        Ok(())
    }

    #[test]
    fn test_write_byte() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_byte(0x44, 12)?;
        assert_eq!(mem.data[0x44], 12);

        Ok(())
    }

    #[test]
    fn test_out_of_bounds() {
        let mut mem = StdMem::default();

        assert_eq!(
            mem.read_byte(256),
            Err(Fault::OutOfBounds {
                address: 256,
                size: 256
            })
        );
        assert_eq!(
            mem.write_byte(300, 1),
            Err(Fault::OutOfBounds {
                address: 300,
                size: 256
            })
        );
        assert_eq!(mem, StdMem::default());
    }

    #[test]
    fn test_write_array() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_array(0x44, &[0x12, 0x34, 0x56, 0x78])?;
        assert_eq!(mem.data[0x44], 0x12);
        assert_eq!(mem.data[0x45], 0x34);
        assert_eq!(mem.data[0x46], 0x56);
        assert_eq!(mem.data[0x47], 0x78);

        Ok(())
    }

    #[test]
    fn test_write_array_out_of_bounds() {
        let mut mem = Memory::<4>::default();

        assert_eq!(
            mem.write_array(2, &[1, 2, 3]),
            Err(Fault::OutOfBounds {
                address: 4,
                size: 4
            })
        );
        assert_eq!(mem, Memory::<4>::default());
    }

    #[test]
    fn test_write_instructions() -> Result<()> {
        let mut mem = StdMem::default();

        mem.write_array(
            0x10,
            &[
                Instruction::LDI as Byte,
                0,
                42,
                Instruction::PRN as Byte,
                0,
                Instruction::HLT as Byte,
            ],
        )?;

        let mut mem2 = StdMem::default();
        use crate::processor::Instruction::*;
        write_instructions!(mem2 : 0x10 => LDI, 0, 42, PRN, 0, HLT)?;

        assert_eq!(mem, mem2);

        Ok(())
    }

    #[test]
    fn test_dump_leaves_memory_untouched() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_array(0x20, &[0xAB, 0x01])?;
        let before = mem;

        mem.dump();

        assert_eq!(mem, before);

        Ok(())
    }

    #[test]
    fn test_from_missing_file() {
        let result = StdMem::from_file("does/not/exist.ls8");

        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
