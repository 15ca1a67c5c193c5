//! External tools the pipeline drives
//!
//! - Package manager installs and the registry connectivity check
//! - Git repository initialization

pub mod git;
pub mod install;

pub use git::{GitInitializer, VersionControl};
pub use install::{install_args, DependencyInstaller, InstallOptions, PackageManagerInstaller};
