//! Template file copying with language filtering

use crate::request::LanguageMode;
use crate::templates::fetcher::TemplateFetcher;
use crate::templates::manifest::{LanguageFiles, TemplateManifest};
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Where a template file lands in the project
///
/// Templates store dotfiles without the dot (`gitignore`) so publishing
/// tools don't strip or apply them.
pub fn target_name(file_path: &str) -> String {
    match file_path.rsplit_once('/') {
        Some((dir, "gitignore")) => format!("{}/.gitignore", dir),
        None if file_path == "gitignore" => ".gitignore".to_string(),
        _ => file_path.to_string(),
    }
}

/// Copy the files of one language variant into the target directory
///
/// Returns the project-relative paths written.
pub async fn copy_template(
    fetcher: &mut TemplateFetcher,
    template_name: &str,
    manifest: &TemplateManifest,
    target_dir: &Path,
    mode: LanguageMode,
    language_files: &LanguageFiles,
) -> Result<Vec<String>> {
    let mut copied_files = Vec::new();

    for file_path in &manifest.files {
        if !should_include_file(file_path, mode, language_files) {
            continue;
        }

        let relative = target_name(file_path);
        let target_path = target_dir.join(&relative);
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = fetcher.fetch_file_bytes(template_name, file_path).await?;
        fs::write(&target_path, &content)
            .await
            .with_context(|| format!("Failed to write file: {}", target_path.display()))?;

        copied_files.push(relative);
    }

    Ok(copied_files)
}

/// Files not matched by any pattern are left out
pub fn should_include_file(
    file_path: &str,
    mode: LanguageMode,
    language_files: &LanguageFiles,
) -> bool {
    language_files
        .language_for_file(file_path)
        .is_some_and(|language| language.included_in(mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::fetcher::tests::local_templates;
    use crate::templates::manifest::RootManifest;
    use tempfile::TempDir;

    fn test_language_files() -> LanguageFiles {
        LanguageFiles {
            common: vec![
                "gitignore".to_string(),
                "*.css".to_string(),
                "next.config.js".to_string(),
            ],
            typescript: vec![
                "*.ts".to_string(),
                "*.tsx".to_string(),
                "tsconfig.json".to_string(),
            ],
            javascript: vec![
                "*.js".to_string(),
                "*.jsx".to_string(),
                "jsconfig.json".to_string(),
            ],
        }
    }

    #[test]
    fn test_typescript_variant() {
        let lf = test_language_files();
        assert!(should_include_file("pages/index.tsx", LanguageMode::Ts, &lf));
        assert!(should_include_file("next-env.d.ts", LanguageMode::Ts, &lf));
        assert!(should_include_file("tsconfig.json", LanguageMode::Ts, &lf));
        assert!(!should_include_file("pages/index.js", LanguageMode::Ts, &lf));
        assert!(!should_include_file("jsconfig.json", LanguageMode::Ts, &lf));
    }

    #[test]
    fn test_javascript_variant() {
        let lf = test_language_files();
        assert!(should_include_file("pages/_app.js", LanguageMode::Js, &lf));
        assert!(!should_include_file("pages/_app.tsx", LanguageMode::Js, &lf));
        assert!(!should_include_file("tsconfig.json", LanguageMode::Js, &lf));
    }

    #[test]
    fn test_common_files_in_both_variants() {
        let lf = test_language_files();
        for mode in [LanguageMode::Ts, LanguageMode::Js] {
            assert!(should_include_file("gitignore", mode, &lf));
            assert!(should_include_file("styles/globals.css", mode, &lf));
            assert!(should_include_file("next.config.js", mode, &lf));
            assert!(!should_include_file("notes.txt", mode, &lf));
        }
    }

    #[test]
    fn test_gitignore_is_renamed() {
        assert_eq!(target_name("gitignore"), ".gitignore");
        assert_eq!(target_name("app/gitignore"), "app/.gitignore");
        assert_eq!(target_name("pages/index.tsx"), "pages/index.tsx");
    }

    #[tokio::test]
    async fn test_copy_javascript_variant() {
        let templates = local_templates();
        let target = TempDir::new().unwrap();
        let mut fetcher = TemplateFetcher::from_local(templates.path().to_path_buf(), "test");
        let root: RootManifest = fetcher.fetch_root_manifest().await.unwrap();
        let manifest = fetcher.fetch_template_manifest("default").await.unwrap();

        let copied = copy_template(
            &mut fetcher,
            "default",
            &manifest,
            target.path(),
            LanguageMode::Js,
            &root.language_files,
        )
        .await
        .unwrap();

        assert!(copied.contains(&"pages/index.js".to_string()));
        assert!(copied.contains(&".gitignore".to_string()));
        assert!(target.path().join(".gitignore").exists());
        assert!(target.path().join("jsconfig.json").exists());
        assert!(!target.path().join("tsconfig.json").exists());
        assert!(!target.path().join("next-env.d.ts").exists());
    }
}
