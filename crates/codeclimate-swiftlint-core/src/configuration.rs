//! SwiftLint configuration resolution.
//!
//! Every linted file is paired with exactly one configuration:
//!
//! 1. the nearest `.swiftlint.yml` found walking up from the file's
//!    directory to the project root (inclusive),
//! 2. otherwise the root configuration, backed by the override file
//!    (`<root>/.swiftlint.yml` or `/code/.swiftlint.yml`) when it exists,
//! 3. otherwise the engine defaults.
//!
//! A nested configuration refines the one above it rather than replacing
//! it: [`LintConfiguration::config_files`] lists the whole chain, root
//! first, and the engine merges them in that order.
//!
//! Only `included` and `excluded` are read here; the rest of the file is
//! the engine's business and reaches it through `--config`.

use serde::Deserialize;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::paths;

/// Configuration file name looked up in every directory.
pub const CONFIG_FILE_NAME: &str = ".swiftlint.yml";

/// Override file consulted when no project root is given.
pub const DEFAULT_OVERRIDE_PATH: &str = "/code/.swiftlint.yml";

/// Where a configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// The project-wide override file.
    Override(PathBuf),
    /// A `.swiftlint.yml` nested below the project root.
    Nested(PathBuf),
    /// No file; engine defaults apply.
    Default,
}

impl ConfigSource {
    /// Returns the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Override(p) | Self::Nested(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` for a nested configuration.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Nested(_))
    }
}

/// Returns the override file location for an optional project root.
#[must_use]
pub fn override_path(root: Option<&Path>) -> PathBuf {
    root.map_or_else(
        || PathBuf::from(DEFAULT_OVERRIDE_PATH),
        |r| r.join(CONFIG_FILE_NAME),
    )
}

/// The subset of `.swiftlint.yml` read by the resolver.
#[derive(Debug, Default, Deserialize)]
struct SwiftLintFileDto {
    #[serde(default)]
    included: Option<Vec<String>>,
    #[serde(default)]
    excluded: Option<Vec<String>>,
}

/// Configuration applying to a subtree of the project.
#[derive(Debug, Clone)]
pub struct LintConfiguration {
    source: ConfigSource,
    dir: PathBuf,
    included: Vec<PathBuf>,
    excluded: Vec<PathBuf>,
    parent: Option<Arc<LintConfiguration>>,
}

impl LintConfiguration {
    /// Configuration with engine defaults for the given directory.
    #[must_use]
    pub fn default_for(dir: impl Into<PathBuf>) -> Self {
        Self {
            source: ConfigSource::Default,
            dir: dir.into(),
            included: Vec::new(),
            excluded: Vec::new(),
            parent: None,
        }
    }

    /// Builds the root configuration of a project.
    ///
    /// The override file is used only if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the override file exists but cannot be read or
    /// parsed.
    pub fn root(project_root: &Path, override_file: &Path) -> Result<Self, ConfigurationError> {
        if override_file.is_file() {
            tracing::debug!("Found override config: {}", override_file.display());
            Self::load(
                ConfigSource::Override(override_file.to_path_buf()),
                project_root,
            )
        } else {
            Ok(Self::default_for(project_root))
        }
    }

    /// Loads a configuration file whose relative paths resolve against `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or
    /// contains an invalid glob pattern.
    pub fn load(source: ConfigSource, dir: &Path) -> Result<Self, ConfigurationError> {
        let Some(path) = source.path() else {
            return Ok(Self::default_for(dir));
        };
        let content = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let dto: SwiftLintFileDto = if content.trim().is_empty() {
            SwiftLintFileDto::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| ConfigurationError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?
        };

        let included = expand_all(dir, dto.included.unwrap_or_default())?;
        let excluded = expand_all(dir, dto.excluded.unwrap_or_default())?;

        Ok(Self {
            source,
            dir: dir.to_path_buf(),
            included,
            excluded,
            parent: None,
        })
    }

    /// Places this configuration below `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: Arc<LintConfiguration>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// The configuration this one refines, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<LintConfiguration>> {
        self.parent.as_ref()
    }

    /// Where this configuration came from.
    #[must_use]
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// The backing `.swiftlint.yml`, if any.
    #[must_use]
    pub fn config_file(&self) -> Option<&Path> {
        self.source.path()
    }

    /// Every backing file from the root down to this configuration.
    #[must_use]
    pub fn config_files(&self) -> Vec<&Path> {
        let mut files = self
            .parent
            .as_deref()
            .map(Self::config_files)
            .unwrap_or_default();
        files.extend(self.config_file());
        files
    }

    /// Directory the relative `included`/`excluded` entries resolve against.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a walked file is ruled out by `excluded`.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.iter().any(|e| path.starts_with(e))
    }

    /// Whether a walked file is allowed by `included` (everything is when
    /// the list is empty).
    #[must_use]
    pub fn is_included(&self, path: &Path) -> bool {
        self.included.is_empty() || self.included.iter().any(|i| path.starts_with(i))
    }

    fn key(&self) -> &Path {
        self.config_file().unwrap_or(self.dir.as_path())
    }
}

impl PartialEq for LintConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for LintConfiguration {}

impl Hash for LintConfiguration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Expands configured entries into absolute paths; glob patterns are matched
/// against the filesystem.
fn expand_all(dir: &Path, entries: Vec<String>) -> Result<Vec<PathBuf>, ConfigurationError> {
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        if paths::has_glob_meta(&entry) {
            let pattern = paths::absolutize(dir, Path::new(&entry));
            for matched in glob::glob(&pattern.to_string_lossy())? {
                match matched {
                    Ok(p) => out.push(paths::normalize(&p)),
                    Err(e) => tracing::warn!("Skipping unreadable match: {e}"),
                }
            }
        } else {
            out.push(paths::absolutize(dir, Path::new(&entry)));
        }
    }
    Ok(out)
}

/// Maps files to their nearest configuration, sharing loaded instances.
#[derive(Debug)]
pub struct ConfigurationResolver {
    project_root: PathBuf,
    root: Arc<LintConfiguration>,
    by_dir: HashMap<PathBuf, Arc<LintConfiguration>>,
    by_file: HashMap<PathBuf, Arc<LintConfiguration>>,
}

impl ConfigurationResolver {
    /// Creates a resolver rooted at `project_root` with its root configuration.
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>, root: LintConfiguration) -> Self {
        let root = Arc::new(root);
        let mut by_file = HashMap::new();
        if let Some(p) = root.config_file() {
            by_file.insert(p.to_path_buf(), Arc::clone(&root));
        }
        Self {
            project_root: project_root.into(),
            root,
            by_dir: HashMap::new(),
            by_file,
        }
    }

    /// The project root.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// The root configuration.
    #[must_use]
    pub fn root(&self) -> &Arc<LintConfiguration> {
        &self.root
    }

    /// Returns the configuration for a (normalized, absolute) file path.
    ///
    /// A nested file that fails to load is logged and skipped; the search
    /// continues upward. A nested configuration's parent is the one
    /// resolved for the directory above it.
    pub fn configuration_for(&mut self, file: &Path) -> Arc<LintConfiguration> {
        let Some(dir) = file.parent() else {
            return Arc::clone(&self.root);
        };
        if let Some(hit) = self.by_dir.get(dir) {
            return Arc::clone(hit);
        }

        let resolved = self.search_from(dir);
        self.by_dir.insert(dir.to_path_buf(), Arc::clone(&resolved));
        resolved
    }

    fn search_from(&mut self, dir: &Path) -> Arc<LintConfiguration> {
        let mut current = dir.to_path_buf();
        while let Some(candidate) = find_in_dir(&current, &self.project_root) {
            if let Some(found) = self.load_cached(&candidate) {
                return found;
            }
            match candidate.parent().and_then(Path::parent) {
                Some(above) => current = above.to_path_buf(),
                None => break,
            }
        }
        Arc::clone(&self.root)
    }

    fn load_cached(&mut self, file: &Path) -> Option<Arc<LintConfiguration>> {
        if let Some(hit) = self.by_file.get(file) {
            return Some(Arc::clone(hit));
        }
        let dir = file.parent().unwrap_or(self.project_root.as_path()).to_path_buf();
        match LintConfiguration::load(ConfigSource::Nested(file.to_path_buf()), &dir) {
            Ok(config) => {
                tracing::debug!("Found nested config: {}", file.display());
                let parent = match dir.parent() {
                    Some(above) => self.search_from(above),
                    None => Arc::clone(&self.root),
                };
                let config = Arc::new(config.with_parent(parent));
                self.by_file.insert(file.to_path_buf(), Arc::clone(&config));
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Ignoring nested config: {e}");
                None
            }
        }
    }
}

/// Testable core: the nearest `.swiftlint.yml` at or above `dir`, without
/// leaving `project_root`.
fn find_in_dir(dir: &Path, project_root: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .take_while(|d| d.starts_with(project_root))
        .map(|d| d.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// IO error reading a configuration file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// YAML error in a configuration file.
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        /// Path of the malformed file.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },

    /// Invalid glob in `included` or `excluded`.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn root_of(tmp: &TempDir) -> PathBuf {
        paths::normalize(tmp.path())
    }

    #[test]
    fn override_used_when_present() {
        let tmp = TempDir::new().unwrap();
        let root = root_of(&tmp);
        let file = root.join(CONFIG_FILE_NAME);
        fs::write(&file, "excluded:\n  - Pods\n").unwrap();

        let config = LintConfiguration::root(&root, &file).unwrap();
        assert_eq!(config.source(), &ConfigSource::Override(file));
        assert!(config.is_excluded(&root.join("Pods/Alamofire/Session.swift")));
        assert!(!config.is_excluded(&root.join("Sources/App.swift")));
    }

    #[test]
    fn missing_override_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let root = root_of(&tmp);

        let config = LintConfiguration::root(&root, &root.join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config.source(), &ConfigSource::Default);
        assert!(config.config_file().is_none());
        assert!(config.is_included(&root.join("anything.swift")));
    }

    #[test]
    fn empty_config_file_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let root = root_of(&tmp);
        let file = root.join(CONFIG_FILE_NAME);
        fs::write(&file, "").unwrap();

        let config = LintConfiguration::root(&root, &file).unwrap();
        assert!(config.config_file().is_some());
    }

    #[test]
    fn malformed_override_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let root = root_of(&tmp);
        let file = root.join(CONFIG_FILE_NAME);
        fs::write(&file, "excluded: [unclosed\n").unwrap();

        let err = LintConfiguration::root(&root, &file).unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse { .. }));
    }

    #[test]
    fn other_keys_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let root = root_of(&tmp);
        let file = root.join(CONFIG_FILE_NAME);
        fs::write(
            &file,
            "disabled_rules:\n  - trailing_whitespace\nline_length: 140\nincluded:\n  - Sources\n",
        )
        .unwrap();

        let config = LintConfiguration::root(&root, &file).unwrap();
        assert!(config.is_included(&root.join("Sources/App.swift")));
        assert!(!config.is_included(&root.join("Tests/AppTests.swift")));
    }

    #[test]
    fn excluded_globs_are_expanded() {
        let tmp = TempDir::new().unwrap();
        let root = root_of(&tmp);
        fs::create_dir_all(root.join("Sources/Generated")).unwrap();
        fs::create_dir_all(root.join("Sources/Model")).unwrap();
        let file = root.join(CONFIG_FILE_NAME);
        fs::write(&file, "excluded:\n  - \"Sources/Gen*\"\n").unwrap();

        let config = LintConfiguration::root(&root, &file).unwrap();
        assert!(config.is_excluded(&root.join("Sources/Generated/R.swift")));
        assert!(!config.is_excluded(&root.join("Sources/Model/User.swift")));
    }

    #[test]
    fn equality_is_keyed_on_backing_file() {
        let a = LintConfiguration::default_for("/code");
        let b = LintConfiguration::default_for("/code");
        let c = LintConfiguration::default_for("/other");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn find_in_dir_prefers_nearest() {
        let tmp = TempDir::new().unwrap();
        let root = root_of(&tmp);
        let nested = root.join("Modules/Core");
        fs::create_dir_all(nested.join("Sources")).unwrap();
        fs::write(root.join(CONFIG_FILE_NAME), "").unwrap();
        fs::write(nested.join(CONFIG_FILE_NAME), "").unwrap();

        assert_eq!(
            find_in_dir(&nested.join("Sources"), &root),
            Some(nested.join(CONFIG_FILE_NAME))
        );
        assert_eq!(
            find_in_dir(&root.join("Modules"), &root),
            Some(root.join(CONFIG_FILE_NAME))
        );
    }

    #[test]
    fn find_in_dir_stops_at_project_root() {
        let tmp = TempDir::new().unwrap();
        let outer = root_of(&tmp);
        let root = outer.join("project");
        fs::create_dir_all(root.join("Sources")).unwrap();
        fs::write(outer.join(CONFIG_FILE_NAME), "").unwrap();

        assert_eq!(find_in_dir(&root.join("Sources"), &root), None);
    }

    #[test]
    fn resolver_falls_back_to_root() {
        let tmp = TempDir::new().unwrap();
        let root = root_of(&tmp);
        fs::create_dir_all(root.join("Sources")).unwrap();

        let mut resolver =
            ConfigurationResolver::new(&root, LintConfiguration::default_for(&root));
        let config = resolver.configuration_for(&root.join("Sources/App.swift"));
        assert!(Arc::ptr_eq(&config, resolver.root()));
    }

    #[test]
    fn resolver_returns_root_for_override_in_project_root() {
        let tmp = TempDir::new().unwrap();
        let root = root_of(&tmp);
        fs::create_dir_all(root.join("Sources")).unwrap();
        let file = root.join(CONFIG_FILE_NAME);
        fs::write(&file, "").unwrap();

        let mut resolver =
            ConfigurationResolver::new(&root, LintConfiguration::root(&root, &file).unwrap());
        let config = resolver.configuration_for(&root.join("Sources/App.swift"));
        assert!(Arc::ptr_eq(&config, resolver.root()));
    }

    #[test]
    fn resolver_shares_nested_instances() {
        let tmp = TempDir::new().unwrap();
        let root = root_of(&tmp);
        let module = root.join("Modules/Core");
        fs::create_dir_all(module.join("Sources/Models")).unwrap();
        fs::write(module.join(CONFIG_FILE_NAME), "excluded:\n  - Sources/Models\n").unwrap();

        let mut resolver =
            ConfigurationResolver::new(&root, LintConfiguration::default_for(&root));
        let a = resolver.configuration_for(&module.join("Sources/Core.swift"));
        let b = resolver.configuration_for(&module.join("Sources/Models/User.swift"));
        let other = resolver.configuration_for(&root.join("App.swift"));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.source().is_nested());
        assert!(a.is_excluded(&module.join("Sources/Models/User.swift")));
        assert!(Arc::ptr_eq(&other, resolver.root()));
    }

    #[test]
    fn nested_configurations_chain_from_the_root() {
        let tmp = TempDir::new().unwrap();
        let root = root_of(&tmp);
        let net = root.join("Modules/Net");
        let api = net.join("Sources/API");
        fs::create_dir_all(&api).unwrap();
        let root_file = root.join(CONFIG_FILE_NAME);
        let net_file = net.join(CONFIG_FILE_NAME);
        let api_file = api.join(CONFIG_FILE_NAME);
        fs::write(&root_file, "disabled_rules:\n  - line_length\n").unwrap();
        fs::write(&net_file, "").unwrap();
        fs::write(&api_file, "").unwrap();

        let mut resolver =
            ConfigurationResolver::new(&root, LintConfiguration::root(&root, &root_file).unwrap());
        let leaf = resolver.configuration_for(&api.join("Client.swift"));
        let middle = resolver.configuration_for(&net.join("Net.swift"));

        assert_eq!(
            leaf.config_files(),
            vec![root_file.as_path(), net_file.as_path(), api_file.as_path()]
        );
        assert!(Arc::ptr_eq(leaf.parent().unwrap(), &middle));
        assert!(Arc::ptr_eq(middle.parent().unwrap(), resolver.root()));
    }

    #[test]
    fn nested_configuration_under_default_root_stands_alone() {
        let tmp = TempDir::new().unwrap();
        let root = root_of(&tmp);
        let module = root.join("Modules/Core");
        fs::create_dir_all(&module).unwrap();
        let module_file = module.join(CONFIG_FILE_NAME);
        fs::write(&module_file, "").unwrap();

        let mut resolver =
            ConfigurationResolver::new(&root, LintConfiguration::default_for(&root));
        let config = resolver.configuration_for(&module.join("Core.swift"));
        assert_eq!(config.config_files(), vec![module_file.as_path()]);
    }

    #[test]
    fn resolver_skips_broken_nested_config() {
        let tmp = TempDir::new().unwrap();
        let root = root_of(&tmp);
        let module = root.join("Modules/Core");
        fs::create_dir_all(&module).unwrap();
        fs::write(module.join(CONFIG_FILE_NAME), "included: [oops\n").unwrap();

        let mut resolver =
            ConfigurationResolver::new(&root, LintConfiguration::default_for(&root));
        let config = resolver.configuration_for(&module.join("Core.swift"));
        assert!(Arc::ptr_eq(&config, resolver.root()));
    }

    #[test]
    fn override_path_uses_root_when_given() {
        assert_eq!(override_path(None), PathBuf::from("/code/.swiftlint.yml"));
        assert_eq!(
            override_path(Some(Path::new("/tmp/p"))),
            PathBuf::from("/tmp/p/.swiftlint.yml")
        );
    }
}
