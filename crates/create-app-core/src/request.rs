//! The immutable description of one app creation run

use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;

/// Package manager used to install dependencies and shown in run instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    /// Detect the package manager that launched us from `npm_config_user_agent`
    pub fn detect() -> Self {
        Self::from_user_agent(std::env::var("npm_config_user_agent").ok().as_deref())
    }

    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(agent) if agent.starts_with("yarn") => PackageManager::Yarn,
            Some(agent) if agent.starts_with("pnpm") => PackageManager::Pnpm,
            _ => PackageManager::Npm,
        }
    }

    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    /// Command prefix for package scripts (`npm run dev` vs `yarn dev`)
    pub fn run_prefix(&self) -> String {
        match self {
            PackageManager::Yarn => "yarn ".to_string(),
            other => format!("{} run ", other.command()),
        }
    }

    /// Whether installs need to know if the registry is reachable
    pub fn needs_connectivity(&self) -> bool {
        matches!(self, PackageManager::Yarn)
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// Language variant of a built-in template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum LanguageMode {
    Ts,
    Js,
}

impl LanguageMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageMode::Ts => "TypeScript",
            LanguageMode::Js => "JavaScript",
        }
    }
}

impl fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Which built-in starter structure to materialize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum TemplateKind {
    /// Pages router starter
    Default,
    /// Experimental app directory starter
    App,
}

impl TemplateKind {
    /// Template directory name in the root manifest
    pub fn template_name(&self) -> &'static str {
        match self {
            TemplateKind::Default => "default",
            TemplateKind::App => "app",
        }
    }
}

/// Everything one run needs to know. Never mutated once built.
#[derive(Debug, Clone)]
pub struct AppCreationRequest {
    /// Project directory, relative to the working directory or absolute
    pub app_path: PathBuf,

    pub package_manager: PackageManager,

    /// Example name or GitHub URL
    pub example: Option<String>,

    /// Subdirectory within a monorepo-style example
    pub example_path: Option<String>,

    pub language: LanguageMode,

    pub template: TemplateKind,
}

impl AppCreationRequest {
    pub fn new(app_path: impl Into<PathBuf>) -> Self {
        Self {
            app_path: app_path.into(),
            package_manager: PackageManager::Npm,
            example: None,
            example_path: None,
            language: LanguageMode::Ts,
            template: TemplateKind::Default,
        }
    }
}

const MAX_NAME_LENGTH: usize = 214;
const RESERVED_NAMES: &[&str] = &["node_modules", "favicon.ico"];

/// Check a project name against npm package naming rules
///
/// Returns the list of problems, empty when the name is usable.
pub fn validate_project_name(name: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if name.is_empty() {
        problems.push("name length must be greater than zero".to_string());
        return problems;
    }
    if name.trim() != name {
        problems.push("name cannot contain leading or trailing spaces".to_string());
    }
    if name.starts_with('.') {
        problems.push("name cannot start with a period".to_string());
    }
    if name.starts_with('_') {
        problems.push("name cannot start with an underscore".to_string());
    }
    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name)) {
        problems.push(format!("{} is a blacklisted name", name));
    }
    if name.len() > MAX_NAME_LENGTH {
        problems.push(format!(
            "name can no longer contain more than {} characters",
            MAX_NAME_LENGTH
        ));
    }
    if name.to_lowercase() != name {
        problems.push("name can no longer contain capital letters".to_string());
    }
    if name.chars().any(|c| "~'!()*".contains(c)) {
        problems.push("name can no longer contain special characters (\"~'!()*\")".to_string());
    }

    // Scoped names (@scope/name) are checked segment by segment
    let bare = name
        .strip_prefix('@')
        .and_then(|scoped| scoped.split_once('/'))
        .map(|(scope, pkg)| vec![scope, pkg])
        .unwrap_or_else(|| vec![name]);
    if bare.iter().any(|part| !is_url_safe(part)) {
        problems.push("name can only contain URL-friendly characters".to_string());
    }

    problems
}

fn is_url_safe(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-._~!$&'()*+,;=:@".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_manager_from_user_agent() {
        assert_eq!(
            PackageManager::from_user_agent(Some("yarn/1.22.19 npm/? node/v18.12.0")),
            PackageManager::Yarn
        );
        assert_eq!(
            PackageManager::from_user_agent(Some("pnpm/7.14.0 npm/? node/v18.12.0")),
            PackageManager::Pnpm
        );
        assert_eq!(
            PackageManager::from_user_agent(Some("npm/8.19.2 node/v18.12.0")),
            PackageManager::Npm
        );
        assert_eq!(PackageManager::from_user_agent(None), PackageManager::Npm);
    }

    #[test]
    fn test_run_prefix() {
        assert_eq!(PackageManager::Yarn.run_prefix(), "yarn ");
        assert_eq!(PackageManager::Npm.run_prefix(), "npm run ");
        assert_eq!(PackageManager::Pnpm.run_prefix(), "pnpm run ");
    }

    #[test]
    fn test_only_yarn_needs_connectivity() {
        assert!(PackageManager::Yarn.needs_connectivity());
        assert!(!PackageManager::Npm.needs_connectivity());
        assert!(!PackageManager::Pnpm.needs_connectivity());
    }

    #[test]
    fn test_valid_project_names() {
        assert!(validate_project_name("my-app").is_empty());
        assert!(validate_project_name("blog.v2").is_empty());
        assert!(validate_project_name("@acme/site").is_empty());
    }

    #[test]
    fn test_invalid_project_names() {
        assert!(!validate_project_name("").is_empty());
        assert!(!validate_project_name("My-App").is_empty());
        assert!(!validate_project_name(".hidden").is_empty());
        assert!(!validate_project_name("_private").is_empty());
        assert!(!validate_project_name("node_modules").is_empty());
        assert!(!validate_project_name("my app").is_empty());
        assert!(!validate_project_name(&"a".repeat(215)).is_empty());
    }
}
