//! The lint engine boundary.
//!
//! [`LintEngine`] is the seam between this crate and the rules that
//! actually analyze Swift code. [`SwiftLint`] implements it by driving the
//! `swiftlint` executable, one process per file.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, warn};

use crate::configuration::LintConfiguration;
use crate::files::SourceFile;
use crate::violation::{Location, RuleKind, Severity, Violation};

/// A source of violations for single files.
///
/// `lint` is best-effort: a file the engine cannot analyze yields an empty
/// list, never an error, so one bad file never aborts a run.
pub trait LintEngine: Send + Sync {
    /// Returns the engine's semantic version string.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    fn version(&self) -> Result<String, EngineError>;

    /// Lints one file under the given configuration.
    fn lint(&self, file: &SourceFile, configuration: &LintConfiguration) -> Vec<Violation>;
}

/// Errors raised while talking to the engine executable.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The executable could not be started.
    #[error("Failed to run {}: {source}", program.display())]
    Spawn {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The executable exited with an unexpected status.
    #[error("`{command}` exited with {status}: {stderr}")]
    Status {
        /// Subcommand that failed.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// Output was not the expected JSON report.
    #[error("Malformed report: {0}")]
    Report(#[from] serde_json::Error),

    /// The `rules` table could not be understood.
    #[error("Malformed rules table: {0}")]
    Catalog(String),
}

/// Rule identifier → kind, as listed by `swiftlint rules`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCatalog {
    kinds: HashMap<String, RuleKind>,
}

impl RuleCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule kind.
    #[must_use]
    pub fn with_rule(mut self, identifier: impl Into<String>, kind: RuleKind) -> Self {
        self.kinds.insert(identifier.into(), kind);
        self
    }

    /// Parses the table printed by `swiftlint rules`.
    ///
    /// The header row names the columns; `identifier` and `kind` are located
    /// by name. Rows with an unknown kind are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if no header row with both columns is found.
    pub fn parse(table: &str) -> Result<Self, EngineError> {
        let mut rows = table
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with('|'))
            .map(split_row);

        let header = rows
            .next()
            .ok_or_else(|| EngineError::Catalog("no table rows".to_string()))?;
        let column = |name: &str| {
            header
                .iter()
                .position(|cell| cell.eq_ignore_ascii_case(name))
                .ok_or_else(|| EngineError::Catalog(format!("missing `{name}` column")))
        };
        let id_col = column("identifier")?;
        let kind_col = column("kind")?;

        let mut kinds = HashMap::new();
        for row in rows {
            let (Some(id), Some(kind)) = (row.get(id_col), row.get(kind_col)) else {
                continue;
            };
            match kind.parse::<RuleKind>() {
                Ok(kind) => {
                    kinds.insert((*id).to_string(), kind);
                }
                Err(e) => debug!("Skipping rule {id}: {e}"),
            }
        }

        Ok(Self { kinds })
    }

    /// Kind of a rule; identifiers missing from the catalog (such as
    /// `custom_rules`) are style rules.
    #[must_use]
    pub fn kind_of(&self, identifier: &str) -> RuleKind {
        self.kinds
            .get(identifier)
            .copied()
            .unwrap_or(RuleKind::Style)
    }

    /// Number of known rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the catalog knows no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

fn split_row(line: &str) -> Vec<&str> {
    let inner = line.trim_matches('|');
    inner.split('|').map(str::trim).collect()
}

/// One entry of the engine's JSON reporter.
#[derive(Debug, Deserialize)]
struct ReportEntry {
    rule_id: String,
    #[serde(rename = "type")]
    rule_name: String,
    severity: String,
    #[serde(default)]
    line: Option<usize>,
    #[serde(default)]
    character: Option<usize>,
    reason: String,
}

/// Converts a JSON report for `file` into violations.
///
/// Entries with an unknown severity are dropped.
///
/// # Errors
///
/// Returns an error if `report` is not a JSON array of report entries.
pub fn parse_report(
    report: &[u8],
    file: &SourceFile,
    catalog: &RuleCatalog,
) -> Result<Vec<Violation>, EngineError> {
    if report.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let entries: Vec<ReportEntry> = serde_json::from_slice(report)?;

    let violations = entries
        .into_iter()
        .filter_map(|entry| {
            let severity = match entry.severity.parse::<Severity>() {
                Ok(s) => s,
                Err(e) => {
                    warn!("Dropping {} violation in {file}: {e}", entry.rule_id);
                    return None;
                }
            };
            Some(Violation {
                kind: catalog.kind_of(&entry.rule_id),
                rule_identifier: entry.rule_id,
                rule_name: entry.rule_name,
                severity,
                location: Location::new(file.path(), entry.line, entry.character),
                reason: entry.reason,
            })
        })
        .collect();

    Ok(violations)
}

/// Exit status the engine uses when error-severity violations were found.
const SERIOUS_VIOLATIONS_STATUS: i32 = 2;

/// The `swiftlint` executable.
#[derive(Debug, Clone)]
pub struct SwiftLint {
    program: PathBuf,
    working_dir: Option<PathBuf>,
    catalog: RuleCatalog,
}

impl SwiftLint {
    /// Creates an engine driving `program`, with an empty rule catalog.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: None,
            catalog: RuleCatalog::new(),
        }
    }

    /// Runs the engine from `dir`.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Uses a known rule catalog instead of querying the executable.
    #[must_use]
    pub fn with_catalog(mut self, catalog: RuleCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Queries the executable for its rule catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if `swiftlint rules` fails or prints an unexpected
    /// table.
    pub fn load_catalog(mut self) -> Result<Self, EngineError> {
        let output = self.run(&["rules"])?;
        let table = String::from_utf8_lossy(&output.stdout);
        self.catalog = RuleCatalog::parse(&table)?;
        debug!("Loaded {} rule kinds", self.catalog.len());
        Ok(self)
    }

    /// The rule catalog in use.
    #[must_use]
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// The executable path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }

    /// Runs a query subcommand that must succeed.
    fn run(&self, args: &[&str]) -> Result<Output, EngineError> {
        let output = self
            .command()
            .args(args)
            .output()
            .map_err(|e| EngineError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;
        if !output.status.success() {
            return Err(EngineError::Status {
                command: args.join(" "),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    fn try_lint(
        &self,
        file: &SourceFile,
        configuration: &LintConfiguration,
    ) -> Result<Vec<Violation>, EngineError> {
        let mut command = self.command();
        command.args(["lint", "--quiet", "--no-cache", "--reporter", "json"]);
        for config_file in configuration.config_files() {
            command.arg("--config").arg(config_file);
        }
        command.arg(file.path());

        let output = command.output().map_err(|e| EngineError::Spawn {
            program: self.program.clone(),
            source: e,
        })?;

        match output.status.code() {
            Some(0 | SERIOUS_VIOLATIONS_STATUS) => {}
            _ => {
                return Err(EngineError::Status {
                    command: "lint".to_string(),
                    status: output.status.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }
        }

        parse_report(&output.stdout, file, &self.catalog)
    }
}

impl LintEngine for SwiftLint {
    fn version(&self) -> Result<String, EngineError> {
        let output = self.run(&["version"])?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn lint(&self, file: &SourceFile, configuration: &LintConfiguration) -> Vec<Violation> {
        debug!("Linting: {file}");
        match self.try_lint(file, configuration) {
            Ok(violations) => violations,
            Err(e) => {
                warn!("No violations collected for {file}: {e}");
                Vec::new()
            }
        }
    }
}
