//! Lexical path helpers shared by the resolvers.

use std::path::{Component, Path, PathBuf};

/// Extension of lintable source files.
pub const SWIFT_EXTENSION: &str = "swift";

/// Joins `path` onto `root` (unless already absolute) and normalizes it.
///
/// # Example
///
/// ```
/// use codeclimate_swiftlint_core::paths::absolutize;
/// use std::path::Path;
///
/// let p = absolutize(Path::new("/code"), Path::new("./Sources/../App.swift"));
/// assert_eq!(p, Path::new("/code/App.swift"));
/// ```
#[must_use]
pub fn absolutize(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&root.join(path))
    }
}

/// Removes `.` components and folds `..` components without touching the
/// filesystem. Symlinks are not resolved.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let unresolvable = out.as_os_str().is_empty()
                    || matches!(out.components().next_back(), Some(Component::ParentDir));
                if unresolvable {
                    out.push("..");
                } else {
                    // `..` at the root stays at the root
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Returns `path` relative to `root`, or `None` when it lies outside.
#[must_use]
pub fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
    path.strip_prefix(root).ok().map(Path::to_path_buf)
}

/// Whether the path has the Swift source extension.
#[must_use]
pub fn is_swift_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SWIFT_EXTENSION)
}

/// Whether a configured path contains glob metacharacters.
#[must_use]
pub fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_removes_cur_dir() {
        assert_eq!(
            normalize(Path::new("/code/./Sources/./App.swift")),
            PathBuf::from("/code/Sources/App.swift")
        );
    }

    #[test]
    fn test_normalize_folds_parent_dir() {
        assert_eq!(
            normalize(Path::new("/code/Sources/../Tests/AppTests.swift")),
            PathBuf::from("/code/Tests/AppTests.swift")
        );
        assert_eq!(normalize(Path::new("/../code")), PathBuf::from("/code"));
    }

    #[test]
    fn test_normalize_keeps_leading_parent_on_relative_paths() {
        assert_eq!(normalize(Path::new("../a/b")), PathBuf::from("../a/b"));
        assert_eq!(normalize(Path::new("../../a")), PathBuf::from("../../a"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_absolutize() {
        let root = Path::new("/code");
        assert_eq!(
            absolutize(root, Path::new("Sources/")),
            PathBuf::from("/code/Sources")
        );
        assert_eq!(
            absolutize(root, Path::new("/elsewhere/x.swift")),
            PathBuf::from("/elsewhere/x.swift")
        );
        assert_eq!(absolutize(root, Path::new("./")), PathBuf::from("/code"));
    }

    #[test]
    fn test_relative_to() {
        let root = Path::new("/code");
        assert_eq!(
            relative_to(Path::new("/code/Sources/App.swift"), root),
            Some(PathBuf::from("Sources/App.swift"))
        );
        assert_eq!(relative_to(Path::new("/tmp/App.swift"), root), None);
    }

    #[test]
    fn test_is_swift_file() {
        assert!(is_swift_file(Path::new("App.swift")));
        assert!(!is_swift_file(Path::new("App.swift.orig")));
        assert!(!is_swift_file(Path::new("Package.resolved")));
        assert!(!is_swift_file(Path::new("swift")));
    }

    #[test]
    fn test_has_glob_meta() {
        assert!(has_glob_meta("Sources/**/*.generated.swift"));
        assert!(has_glob_meta("Pod?"));
        assert!(!has_glob_meta("Carthage/Checkouts"));
    }
}
