//! Lint command implementation.

use anyhow::{Context, Result};
use codeclimate_swiftlint_core::output::summary_line;
use codeclimate_swiftlint_core::{Framing, Run, RunMode, SwiftLint};
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// Arguments of a lint run.
pub struct LintArgs {
    /// Project root override.
    pub root: Option<PathBuf>,
    /// Engine executable.
    pub swiftlint: PathBuf,
    /// Human-readable sequential mode.
    pub debug: bool,
    /// Worker cap.
    pub jobs: Option<usize>,
}

/// Runs the lint command.
///
/// Nothing is written to stdout unless the options load.
pub fn run(args: &LintArgs) -> Result<()> {
    let mode = if args.debug {
        RunMode::Report
    } else {
        RunMode::Stream {
            jobs: args.jobs,
            framing: Framing::Nul,
        }
    };

    let run = Run::for_root(args.root.as_deref(), mode)
        .context("Failed to determine project root")?;
    let targets = run.targets().with_context(|| {
        format!("Failed to load options from {}", run.options_file.display())
    })?;

    if targets.is_empty() {
        tracing::info!("No Swift files to lint");
        if args.debug {
            eprintln!("{}", summary_line(0));
        }
        return Ok(());
    }

    let engine = SwiftLint::new(&args.swiftlint)
        .working_dir(&run.project_root)
        .load_catalog()
        .context("Failed to load SwiftLint rules")?;

    let stdout = BufWriter::new(io::stdout());
    let (_, summary) = run.lint(&engine, &targets, stdout)?;

    tracing::info!(
        "Linted {} file(s), {} violation(s)",
        summary.files,
        summary.violations
    );
    if args.debug {
        eprintln!("{}", summary_line(summary.violations));
    }

    Ok(())
}
