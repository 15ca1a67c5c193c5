//! Target directory preparation: writability, creation, emptiness

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Entries tolerated in an otherwise empty project directory
const DEFAULT_ALLOWED: &[&str] = &[
    ".DS_Store",
    ".git",
    ".gitattributes",
    ".gitignore",
    ".gitlab-ci.yml",
    ".hg",
    ".hgcheck",
    ".hgignore",
    ".idea",
    ".npmignore",
    ".travis.yml",
    ".vscode",
    ".yarn",
    "LICENSE",
    "Thumbs.db",
    "docs",
    "mkdocs.yml",
    "npm-debug.log",
    "yarn-debug.log",
    "yarn-error.log",
    "yarnrc.yml",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
];

/// Suffixes tolerated the same way (IntelliJ module files)
const DEFAULT_ALLOWED_SUFFIXES: &[&str] = &[".iml"];

/// Which pre-existing entries still count as "empty"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPolicy {
    pub allowed_names: Vec<String>,
    pub allowed_suffixes: Vec<String>,
}

impl Default for DirectoryPolicy {
    fn default() -> Self {
        Self {
            allowed_names: DEFAULT_ALLOWED.iter().map(|s| s.to_string()).collect(),
            allowed_suffixes: DEFAULT_ALLOWED_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DirectoryPolicy {
    /// Add comma-separated names, e.g. from an environment variable
    pub fn extend_from_list(&mut self, list: &str) {
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if !self.allowed_names.iter().any(|n| n == name) {
                self.allowed_names.push(name.to_string());
            }
        }
    }

    pub fn allows(&self, file_name: &str) -> bool {
        self.allowed_names.iter().any(|n| n == file_name)
            || self
                .allowed_suffixes
                .iter()
                .any(|suffix| file_name.ends_with(suffix.as_str()))
    }
}

/// Join `app_path` onto `working_dir` and fold `.` and `..` lexically
///
/// `.` or `./` resolve to the working directory itself, so the project is
/// named after it rather than after an empty component.
pub fn resolve_app_path(working_dir: &Path, app_path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in working_dir.join(app_path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    resolved
}

/// Whether new entries can be created inside `dir`
pub fn is_writable(dir: &Path) -> bool {
    dir.is_dir() && tempfile::tempfile_in(dir).is_ok()
}

/// Create the directory and its parents; succeeds if it already exists
pub fn make_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// Require `dir` to be empty apart from entries the policy tolerates
///
/// `Ok(Err(conflicts))` lists the offending entries, directories with a
/// trailing `/`, sorted for stable output.
pub fn check_empty(
    dir: &Path,
    policy: &DirectoryPolicy,
) -> Result<std::result::Result<(), Vec<String>>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut conflicts = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if policy.allows(&name) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            conflicts.push(format!("{}/", name));
        } else {
            conflicts.push(name);
        }
    }

    if conflicts.is_empty() {
        Ok(Ok(()))
    } else {
        conflicts.sort();
        Ok(Err(conflicts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_make_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("nested").join("my-app");
        let policy = DirectoryPolicy::default();

        make_dir(&target).unwrap();
        assert!(check_empty(&target, &policy).unwrap().is_ok());

        make_dir(&target).unwrap();
        assert!(check_empty(&target, &policy).unwrap().is_ok());
    }

    #[test]
    fn test_allowed_entries_are_tolerated() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        std::fs::write(tmp.path().join(".gitignore"), "node_modules").unwrap();
        std::fs::write(tmp.path().join("project.iml"), "").unwrap();

        let result = check_empty(tmp.path(), &DirectoryPolicy::default()).unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn test_conflicts_are_reported_sorted() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("src")).unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(tmp.path().join("LICENSE"), "MIT").unwrap();

        let conflicts = check_empty(tmp.path(), &DirectoryPolicy::default())
            .unwrap()
            .unwrap_err();
        assert_eq!(conflicts, vec!["notes.txt".to_string(), "src/".to_string()]);
    }

    #[test]
    fn test_policy_extension() {
        let mut policy = DirectoryPolicy::default();
        assert!(!policy.allows(".envrc"));

        policy.extend_from_list(".envrc, flake.nix,,");
        assert!(policy.allows(".envrc"));
        assert!(policy.allows("flake.nix"));
        assert!(!policy.allows(""));
    }

    #[test]
    fn test_resolve_app_path_folds_dots() {
        let cwd = Path::new("/work/my-app");
        assert_eq!(resolve_app_path(cwd, Path::new(".")), cwd);
        assert_eq!(resolve_app_path(cwd, Path::new("./")), cwd);
        assert_eq!(
            resolve_app_path(cwd, Path::new("../blog/./site")),
            Path::new("/work/blog/site")
        );
        assert_eq!(
            resolve_app_path(cwd, Path::new("/srv/app")),
            Path::new("/srv/app")
        );
        assert_eq!(
            resolve_app_path(cwd, Path::new(".")).file_name(),
            Some(std::ffi::OsStr::new("my-app"))
        );
    }

    #[test]
    fn test_is_writable() {
        let tmp = TempDir::new().unwrap();
        assert!(is_writable(tmp.path()));
        assert!(!is_writable(&tmp.path().join("missing")));
    }
}
