//! Version query.

use anyhow::{Context, Result};
use codeclimate_swiftlint_core::{LintEngine, SwiftLint};
use std::path::Path;

/// Prints the engine version. Does not read any configuration.
pub fn run(swiftlint: &Path) -> Result<()> {
    let version = SwiftLint::new(swiftlint)
        .version()
        .context("Failed to query SwiftLint version")?;
    println!("{version}");
    Ok(())
}
