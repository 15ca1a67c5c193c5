//! Product configuration trait for CLI binaries
//!
//! The pipeline itself is product-agnostic. A binary implements this trait to
//! name itself, point at its examples catalog, embed its built-in templates, and
//! decide which pre-existing files an "empty" directory may contain.

use crate::dirs::DirectoryPolicy;
use crate::templates::BundledFile;

/// Where named examples live: `{owner}/{name}` at `branch`, under `directory`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamplesCatalog {
    pub owner: &'static str,
    pub name: &'static str,
    pub branch: &'static str,
    pub directory: &'static str,
}

/// Configuration trait for different CLI products
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for env vars and the user agent)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Repository holding the curated named examples
    fn examples_catalog(&self) -> ExamplesCatalog;

    /// Built-in templates compiled into the binary
    fn bundled_templates(&self) -> &'static [BundledFile];

    /// Environment variable naming a remote URL to fetch template zips from instead
    fn template_url_env(&self) -> &'static str;

    /// Environment variable listing extra names tolerated in the target directory
    fn allowed_files_env(&self) -> &'static str;

    /// Message of the commit made after version control is initialized
    fn initial_commit_message(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// Upgrade/install command shown in version warnings
    fn upgrade_command(&self) -> &'static str;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }

    /// Allow-list for the emptiness check, extended from the environment
    fn directory_policy(&self) -> DirectoryPolicy {
        let mut policy = DirectoryPolicy::default();
        if let Ok(extra) = std::env::var(self.allowed_files_env()) {
            policy.extend_from_list(&extra);
        }
        policy
    }
}
