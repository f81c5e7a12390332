use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Install and launch a prebuilt release binary")]
pub struct Args {
    /// Log every step, including HTTP and archive details
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub sub: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Download and install the binary for this platform (Exit 0 = installed, 1 = failed)
    Install {
        /// Package directory containing package.json (defaults to the current directory)
        #[arg(long)]
        package_root: Option<PathBuf>,

        /// Show the asset, URL and destination without downloading anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the installed binary, forwarding arguments and exit code
    Exec {
        /// Package directory containing package.json (defaults to this executable's directory)
        #[arg(long)]
        package_root: Option<PathBuf>,

        /// Arguments passed through to the binary
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            match self.sub {
                // Keep the wrapped program's stderr clean
                Cmd::Exec { .. } => LevelFilter::Warn,
                Cmd::Install { .. } => LevelFilter::Info,
            }
        }
    }
}
