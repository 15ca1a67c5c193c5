//! Template manifest types and parsing

use crate::request::LanguageMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File patterns deciding which language variant a file belongs to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageFiles {
    /// Files included in both variants
    #[serde(default)]
    pub common: Vec<String>,

    /// Files only in the TypeScript variant
    #[serde(default)]
    pub typescript: Vec<String>,

    /// Files only in the JavaScript variant
    #[serde(default)]
    pub javascript: Vec<String>,
}

impl LanguageFiles {
    /// Append another set of patterns (template-level additions to the root set)
    pub fn merge(&mut self, other: &LanguageFiles) {
        self.common.extend(other.common.iter().cloned());
        self.typescript.extend(other.typescript.iter().cloned());
        self.javascript.extend(other.javascript.iter().cloned());
    }

    /// `*.ext` matches by suffix, `name*` by prefix, anything else exactly
    fn matches_any(filename: &str, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| {
            if let Some(suffix) = pattern.strip_prefix('*') {
                filename.ends_with(suffix)
            } else if let Some(prefix) = pattern.strip_suffix('*') {
                filename.starts_with(prefix)
            } else {
                filename == pattern
            }
        })
    }

    /// Which variant a file belongs to; `None` means it is never copied
    ///
    /// Common patterns win, so `next.config.js` can be shared even though
    /// `*.js` is JavaScript-only.
    pub fn language_for_file(&self, file_path: &str) -> Option<FileLanguage> {
        let filename = file_path.rsplit('/').next().unwrap_or(file_path);

        if Self::matches_any(filename, &self.common) {
            return Some(FileLanguage::Common);
        }
        if Self::matches_any(filename, &self.typescript) {
            return Some(FileLanguage::TypeScript);
        }
        if Self::matches_any(filename, &self.javascript) {
            return Some(FileLanguage::JavaScript);
        }

        None
    }
}

/// Which variant a file is associated with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileLanguage {
    Common,
    TypeScript,
    JavaScript,
}

impl FileLanguage {
    pub fn included_in(&self, mode: LanguageMode) -> bool {
        match self {
            FileLanguage::Common => true,
            FileLanguage::TypeScript => mode == LanguageMode::Ts,
            FileLanguage::JavaScript => mode == LanguageMode::Js,
        }
    }
}

/// A file from the root templates directory bundled into every template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedFile {
    /// Source path relative to templates/ directory
    pub source: String,

    /// Destination path in each template (defaults to source if not specified)
    #[serde(default)]
    pub dest: Option<String>,
}

impl SharedFile {
    pub fn destination(&self) -> &str {
        self.dest.as_deref().unwrap_or(&self.source)
    }
}

/// Root template manifest (templates/template.yaml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootManifest {
    /// Template directory names
    pub templates: Vec<String>,

    /// Language patterns shared by every template
    #[serde(default)]
    pub language_files: LanguageFiles,

    /// Root files copied into every template, with optional renaming
    #[serde(default)]
    pub shared_files: Vec<SharedFile>,
}

/// Per-template manifest (templates/<name>/template.yaml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    pub name: String,

    pub description: String,

    /// Semver version for CLI compatibility checking
    pub version: String,

    /// Explicit list of files to copy
    pub files: Vec<String>,

    /// Template-specific language patterns (merged with root)
    #[serde(default)]
    pub language_files: LanguageFiles,

    /// Scripts written into the generated package.json
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,

    /// Packages installed for both variants
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Extra packages installed for the TypeScript variant
    #[serde(default)]
    pub typescript_dependencies: Vec<String>,
}

impl TemplateManifest {
    /// Packages to install for the given variant
    pub fn dependencies_for(&self, mode: LanguageMode) -> Vec<String> {
        let mut deps = self.dependencies.clone();
        if mode == LanguageMode::Ts {
            deps.extend(self.typescript_dependencies.iter().cloned());
        }
        deps
    }
}
