//! Engine options read from the Code Climate `config.json`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the options document inside the project root.
pub const OPTIONS_FILE_NAME: &str = "config.json";

/// Location of the options document when no project root is given.
pub const DEFAULT_OPTIONS_PATH: &str = "/config.json";

/// Include and exclude paths for a run.
///
/// Other keys Code Climate writes into the document are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Paths to lint, relative to the project root.
    pub include_paths: Vec<String>,

    /// Paths to subtract from the include set.
    #[serde(default)]
    pub exclude_paths: Option<Vec<String>>,
}

impl Options {
    /// Loads options from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, OptionsError> {
        let content = std::fs::read(path).map_err(|e| OptionsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_slice(&content).map_err(|e| OptionsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Parses options from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or `include_paths` is missing.
    pub fn parse(content: &str) -> Result<Self, OptionsError> {
        serde_json::from_str(content).map_err(|e| OptionsError::Parse {
            path: PathBuf::new(),
            source: e,
        })
    }

    /// Exclude paths, empty when none were configured.
    #[must_use]
    pub fn exclude_paths(&self) -> &[String] {
        self.exclude_paths.as_deref().unwrap_or_default()
    }
}

/// Returns where the options document lives for an optional project root.
#[must_use]
pub fn options_path(root: Option<&Path>) -> PathBuf {
    root.map_or_else(
        || PathBuf::from(DEFAULT_OPTIONS_PATH),
        |r| r.join(OPTIONS_FILE_NAME),
    )
}

/// Options loading errors.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    /// IO error reading the options file.
    #[error("Failed to read options file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Malformed JSON or missing `include_paths`.
    #[error("Failed to parse options {}: {source}", path.display())]
    Parse {
        /// Path of the document (empty when parsed from a string).
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}
