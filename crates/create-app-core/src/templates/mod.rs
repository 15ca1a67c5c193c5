//! Built-in templates: fetching, filtering, copying, and materializing
//!
//! This module provides:
//! - Template manifest types (RootManifest, TemplateManifest)
//! - Template fetching from the bundled tree, remote zip URLs, or local directories
//! - Template copying filtered to one language variant
//! - The `TemplateMaterializer` seam used when no example is requested

pub mod copier;
pub mod fetcher;
pub mod manifest;
pub mod version;

use crate::error::Result as CreateResult;
use crate::product::ProductConfig;
use crate::request::{LanguageMode, PackageManager, TemplateKind};
use crate::tooling::{DependencyInstaller, InstallOptions};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

pub use copier::copy_template;
pub use fetcher::{BundledFile, TemplateFetcher, TemplateSource};
pub use manifest::{LanguageFiles, RootManifest, SharedFile, TemplateManifest};
pub use version::check_compatibility;

/// Everything the materializer needs for one project
#[derive(Debug, Clone)]
pub struct TemplateJob<'a> {
    pub app_name: &'a str,
    pub root: &'a Path,
    pub kind: TemplateKind,
    pub mode: LanguageMode,
    pub package_manager: PackageManager,
    pub is_online: bool,
}

/// Writes starter files when no example was requested
#[allow(async_fn_in_trait)]
pub trait TemplateMaterializer {
    /// Raw contents of one template file from the given variant
    async fn template_file(
        &mut self,
        kind: TemplateKind,
        mode: LanguageMode,
        file: &str,
    ) -> Result<Vec<u8>>;

    /// Write the template into `job.root` and install its dependencies
    async fn materialize<I: DependencyInstaller>(
        &mut self,
        job: &TemplateJob<'_>,
        installer: &I,
    ) -> CreateResult<()>;
}

/// Templates described by `template.yaml` manifests
pub struct BuiltinTemplates {
    fetcher: TemplateFetcher,
    root: Option<RootManifest>,
    cli_version: String,
    upgrade_command: String,
}

impl BuiltinTemplates {
    pub fn new(fetcher: TemplateFetcher, cli_version: &str, upgrade_command: &str) -> Self {
        Self {
            fetcher,
            root: None,
            cli_version: cli_version.to_string(),
            upgrade_command: upgrade_command.to_string(),
        }
    }

    /// Local templates when a directory is given, the product's bundled (or overridden remote) ones otherwise
    pub fn from_config<C: ProductConfig>(
        config: &C,
        template_dir: Option<PathBuf>,
        cli_version: &str,
    ) -> Result<Self> {
        let fetcher = match template_dir {
            Some(dir) => TemplateFetcher::from_local(dir, config.user_agent()),
            None => TemplateFetcher::from_config(config)?,
        };
        Ok(Self::new(fetcher, cli_version, config.upgrade_command()))
    }

    async fn root_manifest(&mut self) -> Result<&RootManifest> {
        if self.root.is_none() {
            self.root = Some(self.fetcher.fetch_root_manifest().await?);
        }
        self.root
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Root template manifest not loaded"))
    }

    /// Manifest of `kind` plus the root and template language patterns merged
    async fn load(&mut self, kind: TemplateKind) -> Result<(TemplateManifest, LanguageFiles)> {
        let name = kind.template_name();
        let root = self.root_manifest().await?;
        if !root.templates.iter().any(|t| t == name) {
            anyhow::bail!(
                "Template '{}' not found. Available templates: {}",
                name,
                root.templates.join(", ")
            );
        }
        let mut language_files = root.language_files.clone();

        let manifest = self.fetcher.fetch_template_manifest(name).await?;
        language_files.merge(&manifest.language_files);
        Ok((manifest, language_files))
    }
}

impl TemplateMaterializer for BuiltinTemplates {
    async fn template_file(
        &mut self,
        kind: TemplateKind,
        mode: LanguageMode,
        file: &str,
    ) -> Result<Vec<u8>> {
        let (_, language_files) = self.load(kind).await?;
        if !copier::should_include_file(file, mode, &language_files) {
            anyhow::bail!(
                "'{}' is not part of the {} variant of the '{}' template",
                file,
                mode,
                kind.template_name()
            );
        }
        self.fetcher
            .fetch_file_bytes(kind.template_name(), file)
            .await
    }

    async fn materialize<I: DependencyInstaller>(
        &mut self,
        job: &TemplateJob<'_>,
        installer: &I,
    ) -> CreateResult<()> {
        println!("Using {}.", job.package_manager.to_string().cyan());

        let (manifest, language_files) = self.load(job.kind).await?;
        if let Some(warning) =
            check_compatibility(&self.cli_version, &manifest.version, &self.upgrade_command)
        {
            eprintln!("{} {}", "Warning:".yellow(), warning);
        }

        println!();
        println!("Initializing project with template: {}", manifest.name.cyan());
        let copied = copy_template(
            &mut self.fetcher,
            job.kind.template_name(),
            &manifest,
            job.root,
            job.mode,
            &language_files,
        )
        .await?;
        println!("{}", format!("Copied {} files.", copied.len()).dimmed());

        write_package_json(job.root, job.app_name, &manifest).await?;

        let dependencies = manifest.dependencies_for(job.mode);
        if dependencies.is_empty() {
            return Ok(());
        }

        println!();
        println!("Installing dependencies:");
        for dependency in &dependencies {
            println!("- {}", dependency.cyan());
        }
        println!();

        installer
            .install(
                job.root,
                Some(dependencies.as_slice()),
                InstallOptions {
                    package_manager: job.package_manager,
                    is_online: job.is_online,
                },
            )
            .await
    }
}

/// Write the project's package.json from the template's scripts
pub async fn write_package_json(
    root: &Path,
    app_name: &str,
    manifest: &TemplateManifest,
) -> Result<()> {
    let package = serde_json::json!({
        "name": app_name,
        "version": "0.1.0",
        "private": true,
        "scripts": manifest.scripts,
    });
    let mut content =
        serde_json::to_string_pretty(&package).context("Failed to serialize package.json")?;
    content.push('\n');

    let path = root.join("package.json");
    tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Build zip files for all templates in a directory
pub async fn build_zips<C: ProductConfig>(
    config: &C,
    template_dir: &Option<PathBuf>,
) -> Result<()> {
    let dir = template_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("templates"));

    let manifest_path = dir.join("template.yaml");
    let manifest_content = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("Root template.yaml not found in {}", dir.display()))?;
    let root_manifest: RootManifest =
        serde_yaml::from_str(&manifest_content).context("Failed to parse root template.yaml")?;

    println!(
        "{}",
        format!("Building {} template zips...", config.display_name())
            .cyan()
            .bold()
    );
    println!();

    let mut built = 0;
    for template_name in &root_manifest.templates {
        print!("  {} {}...", "->".blue(), template_name);

        match TemplateFetcher::build_local_zip(&dir, template_name, &root_manifest.shared_files) {
            Ok(zip_bytes) => {
                let zip_path = dir.join(format!("{}.zip", template_name));
                std::fs::write(&zip_path, &zip_bytes)
                    .with_context(|| format!("Failed to write {}", zip_path.display()))?;
                println!(" {} ({} bytes)", "done".green(), zip_bytes.len());
                built += 1;
            }
            Err(e) => {
                println!(" {}", "failed".red());
                eprintln!("    Error: {:#}", e);
            }
        }
    }

    println!();
    println!(
        "{} {} template zip(s) in {}",
        "Built".green().bold(),
        built,
        dir.display()
    );

    Ok(())
}
