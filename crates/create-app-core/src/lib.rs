//! Create App Core - Shared library for bootstrapping web applications
//!
//! This library turns an [`AppCreationRequest`] into a ready project directory:
//! either a remote example (a named example from a curated catalog, or any
//! GitHub repository path) or one of the built-in templates. Product identity
//! comes from a [`ProductConfig`] implementation, so a binary only supplies
//! names, URLs, environment variables and its embedded templates.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Example resolution and download (`remote`),
//!   template fetching and copying (`templates`), directory checks (`dirs`),
//!   package managers and git (`tooling`)
//! - **Layer 2: Workflow Orchestration** - `AppCreator`, generic over the
//!   collaborator traits, and the `Outcome` report
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use create_app_core::{AppCreationRequest, StandardCreator};
//!
//! let mut creator = StandardCreator::from_config(&MyConfig, None, "0.1.0")?;
//! let request = AppCreationRequest {
//!     example: Some("with-tailwindcss".to_string()),
//!     ..AppCreationRequest::new("my-app")
//! };
//! let outcome = creator.create(&request).await?;
//! outcome.print_report();
//! ```

pub mod create;
pub mod dirs;
pub mod error;
pub mod product;
pub mod remote;
pub mod request;
pub mod templates;
pub mod tooling;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use create::{AppCreator, Outcome, StandardCreator};
pub use dirs::DirectoryPolicy;
pub use error::{CreateError, Result};
pub use product::{ExamplesCatalog, ProductConfig};
pub use remote::{ExampleRepository, ExampleSource, GithubExamples, RepoReference, RetryPolicy};
pub use request::{AppCreationRequest, LanguageMode, PackageManager, TemplateKind};
pub use templates::{build_zips, BuiltinTemplates, BundledFile, TemplateMaterializer};
pub use tooling::{DependencyInstaller, GitInitializer, PackageManagerInstaller, VersionControl};

#[cfg(feature = "tui")]
pub use tui::run;
