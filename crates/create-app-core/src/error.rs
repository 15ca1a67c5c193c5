//! Error taxonomy for app creation
//!
//! Every variant except `Io` and `Other` is a decision the pipeline makes on
//! purpose. Input and resolution errors are never retried; only the example
//! download is, and it surfaces as `DownloadFailed` once attempts run out.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CreateError {
    #[error("Invalid example URL '{example}': only https://github.com URLs are supported.")]
    InvalidExampleHost { example: String },

    #[error("Could not parse example '{example}' as a URL: {reason}")]
    InvalidExampleUrl { example: String, reason: String },

    #[error("Found invalid GitHub URL: '{example}'. Please fix the URL and try again.")]
    InvalidGithubUrl { example: String },

    #[error(
        "Could not locate the repository for '{example}'. \
         Please check that the repository exists and try again."
    )]
    RepoNotFound { example: String },

    #[error(
        "Could not locate an example named '{name}'. It could be due to the following:\n  \
         1. Your spelling of example '{name}' might be incorrect.\n  \
         2. You might not be connected to the internet or you are behind a proxy."
    )]
    ExampleNotFound { name: String },

    #[error(
        "Could not create a project called '{name}' because of npm naming restrictions:\n{}",
        bullet_list(.problems, "  * ")
    )]
    InvalidProjectName { name: String, problems: Vec<String> },

    #[error(
        "The application path '{}' is not writable, please check folder permissions and try again.\n\
         It is likely you do not have write permissions for this folder.",
        .path.display()
    )]
    NotWritable { path: PathBuf },

    #[error(
        "The directory '{name}' contains files that could conflict:\n{}\n\
         Either try using a new directory name, or remove the files listed above.",
        bullet_list(.conflicts, "  ")
    )]
    DirectoryNotEmpty { name: String, conflicts: Vec<String> },

    /// Carries the message of the last failed attempt
    #[error("Failed to download example: {0}")]
    DownloadFailed(String),

    #[error("`{command}` failed: {reason}")]
    InstallFailed { command: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CreateError>;

fn bullet_list(items: &[String], marker: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", marker, item))
        .collect::<Vec<_>>()
        .join("\n")
}
