//! # codeclimate-swiftlint-core
//!
//! Runs SwiftLint over a project and reports its violations as Code Climate
//! issues.
//!
//! The crate covers everything around the lint engine itself:
//!
//! - [`Options`] read from the Code Climate `config.json`
//! - [`files::resolve`] turning include/exclude paths into [`LintTarget`]s,
//!   each paired with its nearest SwiftLint configuration
//! - [`LintEngine`] and its subprocess implementation [`SwiftLint`]
//! - [`Issue`] records streamed by a single [`IssueWriter`]
//!
//! ## Example
//!
//! ```no_run
//! use codeclimate_swiftlint_core::{Run, RunMode, SwiftLint};
//!
//! let engine = SwiftLint::new("swiftlint").load_catalog()?;
//! let run = Run::for_root(None, RunMode::default())?;
//! let (_stdout, summary) = run.execute(&engine, std::io::stdout())?;
//! eprintln!("{} violations", summary.violations);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod configuration;
pub mod engine;
pub mod files;
pub mod issue;
pub mod options;
pub mod output;
pub mod paths;
pub mod runner;
mod violation;

pub use configuration::{ConfigSource, ConfigurationError, ConfigurationResolver, LintConfiguration};
pub use engine::{EngineError, LintEngine, RuleCatalog, SwiftLint};
pub use files::{LintTarget, SourceFile};
pub use issue::{Category, Issue, IssueSeverity};
pub use options::{Options, OptionsError};
pub use output::{Framing, IssueSender, IssueWriter, OutputError, XcodeReporter};
pub use runner::{Run, RunError, RunMode, RunSummary};
pub use violation::{Location, RuleKind, Severity, UnknownValue, Violation};
