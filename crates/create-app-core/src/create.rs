//! The app creation pipeline
//!
//! `AppCreator` drives one request through validation, example resolution,
//! directory preparation, fetching or template materialization, dependency
//! installation and version control, then hands back an [`Outcome`] for
//! the final report. Every collaborator is a trait so the whole pipeline can
//! run against fakes.

use crate::dirs::{self, DirectoryPolicy};
use crate::error::{CreateError, Result};
use crate::product::ProductConfig;
use crate::remote::{
    fetch_example, resolve_example, ExampleRepository, ExampleSource, GithubExamples, RetryPolicy,
};
use crate::request::{AppCreationRequest, LanguageMode, PackageManager, TemplateKind};
use crate::templates::{BuiltinTemplates, TemplateJob, TemplateMaterializer};
use crate::tooling::{
    DependencyInstaller, GitInitializer, InstallOptions, PackageManagerInstaller, VersionControl,
};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// What a finished run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub app_name: String,
    pub app_path: PathBuf,
    /// Path to show in the `cd` hint, relative when possible
    pub cd_path: String,
    pub has_package_json: bool,
    pub package_manager: PackageManager,
    pub git_initialized: bool,
}

impl Outcome {
    /// Commands a user runs next, with a description of each
    pub fn next_steps(&self) -> Vec<(String, &'static str)> {
        if !self.has_package_json {
            return Vec::new();
        }
        let prefix = self.package_manager.run_prefix();
        vec![
            (
                format!("{}dev", prefix),
                "Starts the development server.",
            ),
            (
                format!("{}build", prefix),
                "Builds the app for production.",
            ),
            (
                format!("{}start", prefix),
                "Runs the built app in production mode.",
            ),
        ]
    }

    pub fn print_report(&self) {
        println!();
        println!(
            "{} Created {} at {}",
            "Success!".green(),
            self.app_name,
            self.app_path.display()
        );

        let steps = self.next_steps();
        if steps.is_empty() {
            println!();
            return;
        }

        println!("Inside that directory, you can run several commands:");
        for (command, description) in &steps {
            println!();
            println!("  {}", command.cyan());
            println!("    {}", description);
        }

        println!();
        println!("We suggest that you begin by typing:");
        println!();
        println!("  {} {}", "cd".cyan(), self.cd_path);
        println!("  {}", steps[0].0.cyan());
        println!();
    }
}

/// Where the files come from once the directory is ready
enum ProjectSource {
    Example(ExampleSource),
    Template,
}

pub struct AppCreator<R, T, I, V> {
    repository: R,
    templates: T,
    installer: I,
    vcs: V,
    policy: DirectoryPolicy,
    retry: RetryPolicy,
    working_dir: PathBuf,
}

impl<R, T, I, V> AppCreator<R, T, I, V>
where
    R: ExampleRepository,
    T: TemplateMaterializer,
    I: DependencyInstaller,
    V: VersionControl,
{
    pub fn new(
        repository: R,
        templates: T,
        installer: I,
        vcs: V,
        policy: DirectoryPolicy,
        working_dir: PathBuf,
    ) -> Self {
        Self {
            repository,
            templates,
            installer,
            vcs,
            policy,
            retry: RetryPolicy::default(),
            working_dir,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_working_dir(mut self, working_dir: PathBuf) -> Self {
        self.working_dir = working_dir;
        self
    }

    /// Run the whole pipeline for one request
    pub async fn create(&mut self, request: &AppCreationRequest) -> Result<Outcome> {
        let root = dirs::resolve_app_path(&self.working_dir, &request.app_path);
        let app_name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| CreateError::NotWritable { path: root.clone() })?;

        self.validate(&root)?;
        let source = self.resolve(request).await?;
        self.prepare_directory(&root, &app_name)?;

        let has_package_json = match source {
            ProjectSource::Example(example) => {
                self.fetch(&root, &example).await?;
                let has_package_json = self.normalize(&root, request.template).await?;
                if has_package_json {
                    self.install(&root, request.package_manager).await?;
                }
                has_package_json
            }
            ProjectSource::Template => {
                self.materialize(&root, &app_name, request).await?;
                true
            }
        };

        let git_initialized = self.vcs.try_init(&root);
        if git_initialized {
            println!("Initialized a git repository.");
            println!();
        }

        let cd_path = if self.working_dir.join(&app_name) == root {
            app_name.clone()
        } else {
            root.display().to_string()
        };

        Ok(Outcome {
            app_name,
            app_path: root,
            cd_path,
            has_package_json,
            package_manager: request.package_manager,
            git_initialized,
        })
    }

    fn validate(&self, root: &Path) -> Result<()> {
        let parent = root.parent().unwrap_or(root);
        if !dirs::is_writable(parent) {
            return Err(CreateError::NotWritable {
                path: parent.to_path_buf(),
            });
        }
        Ok(())
    }

    async fn resolve(&self, request: &AppCreationRequest) -> Result<ProjectSource> {
        match &request.example {
            Some(example) => {
                let source = resolve_example(
                    &self.repository,
                    example,
                    request.example_path.as_deref(),
                )
                .await?;
                Ok(ProjectSource::Example(source))
            }
            None => Ok(ProjectSource::Template),
        }
    }

    fn prepare_directory(&self, root: &Path, app_name: &str) -> Result<()> {
        dirs::make_dir(root)?;
        dirs::check_empty(root, &self.policy)?.map_err(|conflicts| {
            CreateError::DirectoryNotEmpty {
                name: app_name.to_string(),
                conflicts,
            }
        })?;

        println!();
        println!("Creating a new app in {}.", root.display().to_string().green());
        println!();
        Ok(())
    }

    async fn fetch(&self, root: &Path, source: &ExampleSource) -> Result<()> {
        match source {
            ExampleSource::Repo(reference) => println!(
                "Downloading files from repo {}. This might take a moment.",
                reference.to_string().cyan()
            ),
            ExampleSource::Named(name) => println!(
                "Downloading files for example {}. This might take a moment.",
                name.cyan()
            ),
        }
        println!();
        fetch_example(&self.repository, root, source, self.retry).await
    }

    /// Fill in what examples commonly leave out; returns whether a manifest exists
    async fn normalize(&mut self, root: &Path, kind: TemplateKind) -> Result<bool> {
        let gitignore = root.join(".gitignore");
        if !gitignore.exists() {
            let content = self
                .templates
                .template_file(kind, LanguageMode::Ts, "gitignore")
                .await?;
            tokio::fs::write(&gitignore, content).await?;
        }

        let next_env = root.join("next-env.d.ts");
        if root.join("tsconfig.json").exists() && !next_env.exists() {
            let content = self
                .templates
                .template_file(kind, LanguageMode::Ts, "next-env.d.ts")
                .await?;
            tokio::fs::write(&next_env, content).await?;
        }

        Ok(root.join("package.json").exists())
    }

    async fn install(&self, root: &Path, package_manager: PackageManager) -> Result<()> {
        let is_online = if package_manager.needs_connectivity() {
            self.installer.is_online().await
        } else {
            true
        };

        println!("Installing packages. This might take a couple of minutes.");
        println!();
        self.installer
            .install(
                root,
                None,
                InstallOptions {
                    package_manager,
                    is_online,
                },
            )
            .await?;
        println!();
        Ok(())
    }

    async fn materialize(
        &mut self,
        root: &Path,
        app_name: &str,
        request: &AppCreationRequest,
    ) -> Result<()> {
        let is_online = if request.package_manager.needs_connectivity() {
            self.installer.is_online().await
        } else {
            true
        };

        let job = TemplateJob {
            app_name,
            root,
            kind: request.template,
            mode: request.language,
            package_manager: request.package_manager,
            is_online,
        };
        self.templates.materialize(&job, &self.installer).await
    }
}

/// The production pipeline: GitHub examples, built-in templates, real tools
pub type StandardCreator =
    AppCreator<GithubExamples, BuiltinTemplates, PackageManagerInstaller, GitInitializer>;

impl StandardCreator {
    pub fn from_config<C: ProductConfig>(
        config: &C,
        template_dir: Option<PathBuf>,
        cli_version: &str,
    ) -> anyhow::Result<Self> {
        Ok(Self::new(
            GithubExamples::from_config(config),
            BuiltinTemplates::from_config(config, template_dir, cli_version)?,
            PackageManagerInstaller,
            GitInitializer::new(config.initial_commit_message()),
            config.directory_policy(),
            std::env::current_dir()?,
        ))
    }
}
