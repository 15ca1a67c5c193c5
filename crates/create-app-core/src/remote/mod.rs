//! Remote examples: resolution, existence checks, and retried downloads
//!
//! This module provides:
//! - Example classification and GitHub URL parsing (`reference`)
//! - The `ExampleRepository` seam the pipeline talks to
//! - A GitHub-backed implementation using codeload zip archives (`github`)
//! - A generic bounded retry utility (`retry`)

pub mod github;
pub mod reference;
pub mod retry;

use crate::error::{CreateError, Result};
use std::path::Path;

pub use github::GithubExamples;
pub use reference::{
    classify_example, parse_github_url, ExampleInput, ExampleSource, ParsedRepoUrl, RepoReference,
};
pub use retry::{retry, RetryPolicy};

/// Read-only lookups and downloads against the example sources
///
/// Existence checks answer `false` on any failure; they are treated as
/// deterministic and never retried. Fetches write into an existing, empty
/// directory and may be retried by the caller.
#[allow(async_fn_in_trait)]
pub trait ExampleRepository {
    /// Default branch of `{owner}/{name}`
    async fn default_branch(&self, owner: &str, name: &str) -> anyhow::Result<String>;

    /// Whether the repository, branch and path combination exists
    async fn repo_exists(&self, reference: &RepoReference) -> bool;

    /// Whether the catalog has an example called `name`
    async fn named_example_exists(&self, name: &str) -> bool;

    /// Download the referenced subtree into `root`
    async fn fetch_repo_subtree(&self, root: &Path, reference: &RepoReference)
        -> anyhow::Result<()>;

    /// Download the catalog example `name` into `root`
    async fn fetch_named_example(&self, root: &Path, name: &str) -> anyhow::Result<()>;
}

/// Turn the raw example string into a source that is known to exist
pub async fn resolve_example<R: ExampleRepository>(
    repository: &R,
    example: &str,
    example_path: Option<&str>,
) -> Result<ExampleSource> {
    match classify_example(example)? {
        ExampleInput::Url(url) => {
            let invalid = || CreateError::InvalidGithubUrl {
                example: example.to_string(),
            };
            let parsed = parse_github_url(&url, example_path).ok_or_else(invalid)?;

            let reference = match parsed.branch.clone() {
                Some(branch) => parsed.with_branch(branch),
                None => {
                    let branch = repository
                        .default_branch(&parsed.owner, &parsed.name)
                        .await
                        .map_err(|_| invalid())?;
                    parsed.with_branch(branch)
                }
            };

            if !repository.repo_exists(&reference).await {
                return Err(CreateError::RepoNotFound {
                    example: example.to_string(),
                });
            }
            Ok(ExampleSource::Repo(reference))
        }
        ExampleInput::Name(name) => {
            if !repository.named_example_exists(&name).await {
                return Err(CreateError::ExampleNotFound { name });
            }
            Ok(ExampleSource::Named(name))
        }
    }
}

/// Fetch the resolved example, retrying transient failures
///
/// Exhausted retries become `CreateError::DownloadFailed` carrying the last
/// failure's message.
pub async fn fetch_example<R: ExampleRepository>(
    repository: &R,
    root: &Path,
    source: &ExampleSource,
    policy: RetryPolicy,
) -> Result<()> {
    let result = match source {
        ExampleSource::Repo(reference) => {
            retry(policy, move || repository.fetch_repo_subtree(root, reference)).await
        }
        ExampleSource::Named(name) => {
            retry(policy, move || repository.fetch_named_example(root, name)).await
        }
    };
    result.map_err(|e| CreateError::DownloadFailed(format!("{:#}", e)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Scriptable repository recording every call
    #[derive(Default)]
    pub(crate) struct FakeRepository {
        pub default_branch: Option<String>,
        pub missing: bool,
        pub fail_fetches: usize,
        pub files: Vec<(String, String)>,
        pub fetch_calls: Cell<usize>,
        pub fetched: RefCell<Vec<ExampleSource>>,
        pub lookups: Cell<usize>,
    }

    impl ExampleRepository for FakeRepository {
        async fn default_branch(&self, _owner: &str, _name: &str) -> anyhow::Result<String> {
            self.lookups.set(self.lookups.get() + 1);
            self.default_branch
                .clone()
                .ok_or_else(|| anyhow::anyhow!("HTTP 404"))
        }

        async fn repo_exists(&self, _reference: &RepoReference) -> bool {
            self.lookups.set(self.lookups.get() + 1);
            !self.missing
        }

        async fn named_example_exists(&self, _name: &str) -> bool {
            self.lookups.set(self.lookups.get() + 1);
            !self.missing
        }

        async fn fetch_repo_subtree(
            &self,
            root: &Path,
            reference: &RepoReference,
        ) -> anyhow::Result<()> {
            self.record(root, ExampleSource::Repo(reference.clone()))
        }

        async fn fetch_named_example(&self, root: &Path, name: &str) -> anyhow::Result<()> {
            self.record(root, ExampleSource::Named(name.to_string()))
        }
    }

    impl FakeRepository {
        fn record(&self, root: &Path, source: ExampleSource) -> anyhow::Result<()> {
            let call = self.fetch_calls.get() + 1;
            self.fetch_calls.set(call);
            if call <= self.fail_fetches {
                return Err(anyhow::anyhow!("socket hang up (attempt {})", call)
                    .context("Failed to download example archive"));
            }
            for (path, content) in &self.files {
                let target = root.join(path);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(target, content)?;
            }
            self.fetched.borrow_mut().push(source);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_resolves_tree_url() {
        let repository = FakeRepository::default();
        let source = resolve_example(
            &repository,
            "https://github.com/acme/demo/tree/main/examples/foo",
            None,
        )
        .await
        .unwrap();

        assert_eq!(
            source,
            ExampleSource::Repo(RepoReference {
                owner: "acme".to_string(),
                name: "demo".to_string(),
                branch: "main".to_string(),
                file_path: "examples/foo".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_resolves_default_branch() {
        let repository = FakeRepository {
            default_branch: Some("trunk".to_string()),
            ..Default::default()
        };
        let source = resolve_example(&repository, "https://github.com/acme/demo", None)
            .await
            .unwrap();

        match source {
            ExampleSource::Repo(reference) => assert_eq!(reference.branch, "trunk"),
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_default_branch_failure_is_invalid_url() {
        let repository = FakeRepository::default();
        let err = resolve_example(&repository, "https://github.com/acme/demo", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::InvalidGithubUrl { .. }));
    }

    #[tokio::test]
    async fn test_missing_repo_is_not_found() {
        let repository = FakeRepository {
            missing: true,
            ..Default::default()
        };
        let err = resolve_example(&repository, "https://github.com/acme/demo/tree/main", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::RepoNotFound { .. }));
    }

    #[tokio::test]
    async fn test_missing_named_example() {
        let repository = FakeRepository {
            missing: true,
            ..Default::default()
        };
        let err = resolve_example(&repository, "with-typo", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::ExampleNotFound { ref name } if name == "with-typo"));
    }

    #[tokio::test]
    async fn test_foreign_host_never_touches_network() {
        let repository = FakeRepository::default();
        let err = resolve_example(&repository, "https://notgithub.com/x/y", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::InvalidExampleHost { .. }));
        assert_eq!(repository.lookups.get(), 0);
    }

    #[tokio::test]
    async fn test_fetch_retries_transient_failures() {
        let tmp = tempfile::TempDir::new().unwrap();
        let repository = FakeRepository {
            fail_fetches: 2,
            ..Default::default()
        };
        let source = ExampleSource::Named("blog-starter".to_string());

        fetch_example(&repository, tmp.path(), &source, RetryPolicy::immediate(3))
            .await
            .unwrap();

        assert_eq!(repository.fetch_calls.get(), 3);
        assert_eq!(repository.fetched.borrow().as_slice(), &[source]);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_error_chain() {
        let tmp = tempfile::TempDir::new().unwrap();
        let repository = FakeRepository {
            fail_fetches: usize::MAX,
            ..Default::default()
        };
        let source = ExampleSource::Named("blog-starter".to_string());

        let err = fetch_example(&repository, tmp.path(), &source, RetryPolicy::immediate(3))
            .await
            .unwrap_err();

        assert_eq!(repository.fetch_calls.get(), 3);
        match err {
            CreateError::DownloadFailed(message) => {
                assert_eq!(
                    message,
                    "Failed to download example archive: socket hang up (attempt 3)"
                )
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
