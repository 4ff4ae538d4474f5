//! Command line configuration: `ls8 [-v...] [-q] <program>`

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "ls8",
    version,
    about = "Run an LS-8 program written as one binary literal per line"
)]
pub struct Config {
    /// Raise the log level one step above `warn` per occurrence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Turn logging off
    #[arg(short, long)]
    pub quiet: bool,

    /// Path of the program file
    pub program: PathBuf,
}

impl Config {
    /// Log level picked by `-v` and `-q`
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Off;
        }

        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
