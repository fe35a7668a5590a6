//! Code Climate engine for SwiftLint.
//!
//! Usage:
//! ```bash
//! codeclimate-swiftlint --version
//! codeclimate-swiftlint [--debug] [ROOT]
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Lint Swift sources with SwiftLint and stream Code Climate issues
#[derive(Parser)]
#[command(name = "codeclimate-swiftlint")]
#[command(author, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Print the SwiftLint version and exit
    #[arg(long, conflicts_with_all = ["debug", "jobs", "root"])]
    version: bool,

    /// Lint one file at a time and print a human-readable report
    #[arg(long)]
    debug: bool,

    /// Path to the swiftlint executable
    #[arg(long, env = "SWIFTLINT_PATH", default_value = "swiftlint")]
    swiftlint: PathBuf,

    /// Maximum number of files linted in parallel (default: CPU count)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Project root holding config.json (default: /config.json, paths
    /// relative to the current directory)
    root: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors share the failure status of a bad config.
            let failed = e.use_stderr();
            e.print()?;
            std::process::exit(i32::from(failed));
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.debug {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.version {
        return commands::version::run(&cli.swiftlint);
    }

    commands::lint::run(&commands::lint::LintArgs {
        root: cli.root,
        swiftlint: cli.swiftlint,
        debug: cli.debug,
        jobs: cli.jobs,
    })
}
