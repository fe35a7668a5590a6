//! Core types for engine violations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Severity level reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownValue;

    /// Parses the engine's spelling (`Warning`, `error`, ...), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(UnknownValue {
                kind: "severity",
                value: s.to_string(),
            }),
        }
    }
}

/// Rule kind, as classified by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Idiomatic Swift usage.
    Idiomatic,
    /// Likely bugs.
    Lint,
    /// Size and complexity metrics.
    Metrics,
    /// Performance pitfalls.
    Performance,
    /// Formatting and naming.
    Style,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idiomatic => "idiomatic",
            Self::Lint => "lint",
            Self::Metrics => "metrics",
            Self::Performance => "performance",
            Self::Style => "style",
        };
        f.write_str(name)
    }
}

impl FromStr for RuleKind {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idiomatic" => Ok(Self::Idiomatic),
            "lint" => Ok(Self::Lint),
            "metrics" => Ok(Self::Metrics),
            "performance" => Ok(Self::Performance),
            "style" => Ok(Self::Style),
            _ => Err(UnknownValue {
                kind: "rule kind",
                value: s.to_string(),
            }),
        }
    }
}

/// A value outside a closed set (severity, rule kind).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownValue {
    /// What was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Source code location of a violation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Absolute path of the linted file.
    pub file: PathBuf,
    /// Line number (1-indexed), if the engine reported one.
    pub line: Option<usize>,
    /// Column number (1-indexed), if the engine reported one.
    pub column: Option<usize>,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: Option<usize>, column: Option<usize>) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

/// A single finding produced by the engine for one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    /// Rule identifier (e.g., "line_length").
    pub rule_identifier: String,
    /// Human-readable rule name (e.g., "Line Length").
    pub rule_name: String,
    /// Kind of the rule that fired.
    pub kind: RuleKind,
    /// Severity of this violation.
    pub severity: Severity,
    /// Where the violation was found.
    pub location: Location,
    /// Human-readable message.
    pub reason: String,
}

impl Violation {
    /// Formats the violation as an Xcode-style diagnostic line.
    ///
    /// Missing line or column numbers are left out of the location prefix.
    #[must_use]
    pub fn format_xcode(&self) -> String {
        let position = match (self.location.line, self.location.column) {
            (Some(line), Some(column)) => format!(":{line}:{column}"),
            (Some(line), None) => format!(":{line}"),
            (None, _) => String::new(),
        };
        format!(
            "{}{position}: {}: {} Violation: {} ({})",
            self.location.file.display(),
            self.severity,
            self.rule_name,
            self.reason,
            self.rule_identifier
        )
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_xcode())
    }
}
