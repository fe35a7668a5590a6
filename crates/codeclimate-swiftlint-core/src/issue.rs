//! Code Climate issue records.
//!
//! An [`Issue`] is a pure view of a [`Violation`]; building one has no side
//! effects.

use serde::Serialize;
use std::path::Path;

use crate::paths;
use crate::violation::{RuleKind, Severity, Violation};

/// Code Climate issue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    /// Idiomatic usage.
    Clarity,
    /// Likely bugs.
    #[serde(rename = "Bug Risk")]
    BugRisk,
    /// Size and complexity.
    Complexity,
    /// Performance pitfalls.
    Performance,
    /// Formatting and naming.
    Style,
}

impl From<RuleKind> for Category {
    fn from(kind: RuleKind) -> Self {
        match kind {
            RuleKind::Idiomatic => Self::Clarity,
            RuleKind::Lint => Self::BugRisk,
            RuleKind::Metrics => Self::Complexity,
            RuleKind::Performance => Self::Performance,
            RuleKind::Style => Self::Style,
        }
    }
}

/// Code Climate issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    /// Reported for engine errors.
    Critical,
    /// Reported for engine warnings.
    Minor,
}

impl From<Severity> for IssueSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => Self::Critical,
            Severity::Warning => Self::Minor,
        }
    }
}

/// Begin and end line of an issue; both are the violation's line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lines {
    /// First line.
    pub begin: Option<usize>,
    /// Last line.
    pub end: Option<usize>,
}

/// Where an issue was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueLocation {
    /// Project-relative path, `null` when the file is outside the project.
    pub path: Option<String>,
    /// Line span.
    pub lines: Lines,
}

/// One record of the output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Always `"issue"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Human-readable rule name.
    pub check_name: String,
    /// The violation's reason.
    pub description: String,
    /// Exactly one category, derived from the rule kind.
    pub categories: [Category; 1],
    /// Location of the finding.
    pub location: IssueLocation,
    /// Severity of the finding.
    pub severity: IssueSeverity,
}

impl Issue {
    /// Builds the record for a violation, relativizing its path to `root`.
    #[must_use]
    pub fn new(violation: &Violation, root: &Path) -> Self {
        let path = paths::relative_to(&violation.location.file, root)
            .map(|p| p.to_string_lossy().into_owned());
        let line = violation.location.line;

        Self {
            kind: "issue",
            check_name: violation.rule_name.clone(),
            description: violation.reason.clone(),
            categories: [violation.kind.into()],
            location: IssueLocation {
                path,
                lines: Lines {
                    begin: line,
                    end: line,
                },
            },
            severity: violation.severity.into(),
        }
    }

    /// Serializes the record as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
