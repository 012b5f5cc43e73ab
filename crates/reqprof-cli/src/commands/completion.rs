use anyhow::Result;
use clap::Command;
use clap_complete::Shell;
use std::io::{self, Write};

/// Write a completion script for `shell` covering every reqprof subcommand
pub fn execute(shell: Shell, mut cmd: Command) -> Result<()> {
    let bin_name = cmd.get_name().to_owned();
    let mut out = io::stdout().lock();
    clap_complete::generate(shell, &mut cmd, bin_name, &mut out);
    out.flush()?;
    Ok(())
}
