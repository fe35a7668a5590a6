//! Lintable file discovery.
//!
//! Include paths are expanded into files; exclude paths rule out everything
//! at or below them, whatever the SwiftLint configuration says. A path that
//! is both included and excluded is never linted.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::configuration::{ConfigurationResolver, LintConfiguration};
use crate::options::Options;
use crate::paths;

/// A file to lint, identified by its normalized absolute path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceFile(PathBuf);

impl SourceFile {
    /// Creates a source file from a path, relative paths resolving against
    /// `root`.
    #[must_use]
    pub fn new(root: &Path, path: &Path) -> Self {
        Self(paths::absolutize(root, path))
    }

    /// The normalized absolute path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Path relative to `root`, or `None` when the file lies outside it.
    #[must_use]
    pub fn relative_to(&self, root: &Path) -> Option<PathBuf> {
        paths::relative_to(&self.0, root)
    }
}

impl AsRef<Path> for SourceFile {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.display().fmt(f)
    }
}

/// A file paired with the configuration it is linted under.
#[derive(Debug, Clone)]
pub struct LintTarget {
    /// The file to lint.
    pub file: SourceFile,
    /// Its nearest configuration.
    pub configuration: Arc<LintConfiguration>,
}

/// Expands one configured path into the files it covers.
///
/// A path naming a file is returned as-is, whatever the configuration
/// excludes. A directory is walked recursively for `.swift` files, pruning
/// anything the configuration excludes or does not include.
#[must_use]
pub fn lintable_files(config: &LintConfiguration, path: &Path) -> Vec<SourceFile> {
    let path = paths::normalize(path);
    if path.is_file() {
        return vec![SourceFile(path)];
    }
    if !path.is_dir() {
        debug!("Path does not exist: {}", path.display());
        return Vec::new();
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(&path)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !config.is_excluded(&paths::normalize(e.path())));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() || !paths::is_swift_file(entry.path()) {
            continue;
        }
        let file = paths::normalize(entry.path());
        if config.is_included(&file) {
            files.push(SourceFile(file));
        }
    }

    files
}

/// Resolves options to the deduplicated set of files to lint, each paired
/// with its nearest configuration.
///
/// Targets sharing a configuration are adjacent; within a group files are
/// ordered by path.
pub fn resolve(options: &Options, resolver: &mut ConfigurationResolver) -> Vec<LintTarget> {
    let root = resolver.project_root().to_path_buf();
    let root_config = Arc::clone(resolver.root());

    let absolute = |p: &String| paths::absolutize(&root, Path::new(p));

    for include in &options.include_paths {
        if !absolute(include).exists() {
            warn!("Include path does not exist: {include}");
        }
    }

    let excluded: Vec<PathBuf> = options.exclude_paths().iter().map(absolute).collect();
    let files: BTreeSet<SourceFile> = options
        .include_paths
        .iter()
        .flat_map(|p| lintable_files(&root_config, &absolute(p)))
        .filter(|f| paths::is_swift_file(f.path()))
        .filter(|f| !excluded.iter().any(|e| f.path().starts_with(e)))
        .collect();

    info!("Found {} files to lint", files.len());

    group_by_configuration(files, resolver)
}

fn group_by_configuration(
    files: BTreeSet<SourceFile>,
    resolver: &mut ConfigurationResolver,
) -> Vec<LintTarget> {
    let mut groups: Vec<(Arc<LintConfiguration>, Vec<SourceFile>)> = Vec::new();
    let mut index: HashMap<Arc<LintConfiguration>, usize> = HashMap::new();

    for file in files {
        let configuration = resolver.configuration_for(file.path());
        let slot = *index.entry(Arc::clone(&configuration)).or_insert_with(|| {
            groups.push((configuration, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(file);
    }

    debug!("Files grouped under {} configuration(s)", groups.len());

    groups
        .into_iter()
        .flat_map(|(configuration, files)| {
            files.into_iter().map(move |file| LintTarget {
                file,
                configuration: Arc::clone(&configuration),
            })
        })
        .collect()
}
