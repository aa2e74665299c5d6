//! Interactive command shell
//!
//! Reads Load/Reload/Status command lines from stdin and dispatches
//! them against one long-lived manager, so status survives across
//! commands within the session.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use loadstone_core::commands::{Command, dispatch};

/// Shell arguments
#[derive(Args)]
pub struct ShellArgs {
    /// Settings file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the interactive shell
pub fn run(args: ShellArgs) -> Result<()> {
    let mut manager = super::build_manager(args.config.as_ref());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    write!(stdout, "> ")?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }

        if !trimmed.is_empty() {
            match Command::parse(trimmed) {
                Ok(command) => {
                    for response in dispatch(&mut manager, command) {
                        println!("{response}");
                    }
                }
                Err(e) => println!("{e}"),
            }
        }

        write!(stdout, "> ")?;
        stdout.flush()?;
    }

    Ok(())
}
