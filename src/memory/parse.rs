//! Loads programs written as one binary literal per line:
//!
//! ```text
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```

use std::borrow::Cow;
use std::error;
use std::{fmt, str::Lines};

use super::{Address, Byte, Memory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidNumber { radix: u32 },
    ProgramTooLarge { size: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidNumber { radix } => {
                write!(f, "failed to parse number with radix `{}`", radix)
            }
            ParseErrorKind::ProgramTooLarge { size } => {
                write!(f, "program does not fit into `{}` bytes of memory", size)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct Parser<'a, const S: usize> {
    lines: Lines<'a>,
    line_nr: usize,
    address: Address,
    memory: Memory<S>,
}

impl<'a, const S: usize> Parser<'a, S> {
    /// Creates a new parser for `data` which will populate `memory` from
    /// address 0.
    pub fn new(data: &'a str, memory: Memory<S>) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            address: 0,
            memory,
        }
    }

    /// Consumes `self` and tries to parse all lines into memory.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<Memory<S>, Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            log::debug!("Loaded {} bytes", self.address);
            Ok(self.memory)
        } else {
            Err(errors)
        }
    }

    /// Tries to parse the next line. Everything after a `#` is a comment,
    /// lines left empty are skipped.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        let token = match line.find('#') {
            Some(start) => &line[..start],
            None => line,
        }
        .trim();

        if token.is_empty() {
            Some(Ok(()))
        } else {
            Some(self.parse_byte(token))
        }
    }

    /// Tries to parse `token` as an 8 bit binary literal, with or without a
    /// `0b` prefix.
    ///
    /// # Examples
    ///
    /// - `10000010`
    /// - `0b1`
    fn parse_byte(&mut self, token: &str) -> Result<()> {
        let digits = token.strip_prefix("0b").unwrap_or(token);

        let byte = Byte::from_str_radix(digits, 2).map_err(|_| {
            ParseError::new(
                ParseErrorKind::InvalidNumber { radix: 2 },
                format!("`{}` is not an 8 bit binary literal", token),
                self.line_nr,
            )
        })?;

        log::trace!("[{}] 0x{:02X}: {:08b}", self.line_nr, self.address, byte);

        self.write_byte(byte)
    }

    /// Writes `byte` at the current address, then moves on by one.
    ///
    /// # Errors
    ///
    /// This will return an error if the address is outside of memory.
    fn write_byte(&mut self, byte: Byte) -> Result<()> {
        self.memory.write_byte(self.address, byte).map_err(|fault| {
            ParseError::new(
                ParseErrorKind::ProgramTooLarge { size: S },
                fault.to_string(),
                self.line_nr,
            )
        })?;
        self.address += 1;

        Ok(())
    }
}
