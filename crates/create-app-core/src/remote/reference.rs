//! Example identifiers: GitHub URLs versus catalog names

use crate::error::{CreateError, Result};
use std::fmt;
use url::Url;

const GITHUB_ORIGIN: &str = "https://github.com";

/// A location inside a GitHub repository to use as the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReference {
    pub owner: String,
    pub name: String,
    pub branch: String,
    /// Subdirectory acting as the example root, empty for the repository root
    pub file_path: String,
}

impl fmt::Display for RepoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.name, self.branch)?;
        if !self.file_path.is_empty() {
            write!(f, ":{}", self.file_path)?;
        }
        Ok(())
    }
}

/// A resolved example. "No example" is `Option::<ExampleSource>::None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExampleSource {
    Repo(RepoReference),
    Named(String),
}

/// What the raw example string looks like before any network access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExampleInput {
    Url(Url),
    Name(String),
}

/// Classify the raw example string
///
/// Strings without a scheme are catalog names. Strings that are URLs must
/// point at github.com. Strings that look like URLs but fail to parse are
/// rejected outright rather than guessed at.
pub fn classify_example(example: &str) -> Result<ExampleInput> {
    match Url::parse(example) {
        Ok(url) => {
            if url.origin().ascii_serialization() != GITHUB_ORIGIN {
                return Err(CreateError::InvalidExampleHost {
                    example: example.to_string(),
                });
            }
            Ok(ExampleInput::Url(url))
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(ExampleInput::Name(example.to_string())),
        Err(e) => Err(CreateError::InvalidExampleUrl {
            example: example.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Owner, name, and path from a GitHub URL; `branch` is `None` when the URL
/// does not name one and the repository default applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRepoUrl {
    pub owner: String,
    pub name: String,
    pub branch: Option<String>,
    pub file_path: String,
}

impl ParsedRepoUrl {
    pub fn with_branch(self, branch: String) -> RepoReference {
        RepoReference {
            owner: self.owner,
            name: self.name,
            branch,
            file_path: self.file_path,
        }
    }
}

/// Split a GitHub URL into its repository reference parts
///
/// Accepts `/{owner}/{name}`, `/{owner}/{name}/` and
/// `/{owner}/{name}/tree/{branch}/{path...}`. With `example_path` set, the
/// path comes from it and everything before it after `tree/` is the branch,
/// so branch names may contain `/`.
pub fn parse_github_url(url: &Url, example_path: Option<&str>) -> Option<ParsedRepoUrl> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    let owner = segments.first().copied().filter(|s| !s.is_empty())?;
    let name = segments.get(1).copied().filter(|s| !s.is_empty())?;
    let marker = segments.get(2).copied();
    let branch = segments.get(3).copied();
    let file: Vec<&str> = segments.iter().skip(4).copied().collect();

    let example_path = example_path
        .map(|p| p.trim_start_matches('/'))
        .filter(|p| !p.is_empty());
    let file_path = match example_path {
        Some(path) => path.to_string(),
        None => file.join("/"),
    };

    let default_branch = match (marker, branch) {
        (None, _) => true,
        (Some(""), None) => true,
        _ => false,
    };
    if default_branch {
        return Some(ParsedRepoUrl {
            owner: owner.to_string(),
            name: name.to_string(),
            branch: None,
            file_path,
        });
    }

    let branch = branch.filter(|b| !b.is_empty())?;
    if marker != Some("tree") {
        return None;
    }

    let branch = match example_path {
        Some(path) => strip_example_path(&format!("{}/{}", branch, file.join("/")), path),
        None => branch.to_string(),
    };

    Some(ParsedRepoUrl {
        owner: owner.to_string(),
        name: name.to_string(),
        branch: Some(branch),
        file_path,
    })
}

/// Drop the first `/{path}` from `joined`, or else a trailing `/`
fn strip_example_path(joined: &str, path: &str) -> String {
    let needle = format!("/{}", path);
    if let Some(idx) = joined.find(&needle) {
        let mut out = joined[..idx].to_string();
        out.push_str(&joined[idx + needle.len()..]);
        out
    } else {
        joined.strip_suffix('/').unwrap_or(joined).to_string()
    }
}
