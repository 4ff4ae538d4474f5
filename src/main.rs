use std::io;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

use ls8::config::Config;
use ls8::memory::StdMem;
use ls8::processor::Processor;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling

    let config = Config::parse();
    SimpleLogger::new().with_level(config.log_level()).init()?; // logging

    let mut mem = StdMem::from_file(&config.program)
        .wrap_err_with(|| format!("Could not load `{}`", config.program.display()))?;
    mem.dump();

    let mut cpu = Processor::default();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    cpu.execute_until_halt(&mut mem, &mut out)
        .wrap_err("Program faulted")?;

    Ok(())
}
