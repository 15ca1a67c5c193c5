//! Best-effort version control initialization

use std::path::Path;
use std::process::{Command, Stdio};

/// Initializes version control in a fresh project
pub trait VersionControl {
    /// `true` only if a repository was created and committed; never fails
    fn try_init(&self, root: &Path) -> bool;
}

/// Creates a git repository with one initial commit on `main`
#[derive(Debug, Clone)]
pub struct GitInitializer {
    commit_message: String,
}

impl GitInitializer {
    pub fn new(commit_message: impl Into<String>) -> Self {
        Self {
            commit_message: commit_message.into(),
        }
    }
}

/// Run a command quietly in `root`, reporting only success
fn succeeds(program: &str, args: &[&str], root: &Path) -> bool {
    Command::new(program)
        .args(args)
        .current_dir(root)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

fn is_in_git_repository(root: &Path) -> bool {
    succeeds("git", &["rev-parse", "--is-inside-work-tree"], root)
}

fn is_in_mercurial_repository(root: &Path) -> bool {
    succeeds("hg", &["--cwd", ".", "root"], root)
}

fn is_default_branch_set(root: &Path) -> bool {
    succeeds("git", &["config", "init.defaultBranch"], root)
}

impl VersionControl for GitInitializer {
    fn try_init(&self, root: &Path) -> bool {
        if !succeeds("git", &["--version"], root) {
            return false;
        }
        if is_in_git_repository(root) || is_in_mercurial_repository(root) {
            return false;
        }
        if !succeeds("git", &["init"], root) {
            return false;
        }

        let committed = (is_default_branch_set(root)
            || succeeds("git", &["checkout", "-b", "main"], root))
            && succeeds("git", &["add", "-A"], root)
            && succeeds("git", &["commit", "-m", &self.commit_message], root);

        if !committed {
            let _ = std::fs::remove_dir_all(root.join(".git"));
        }
        committed
    }
}
