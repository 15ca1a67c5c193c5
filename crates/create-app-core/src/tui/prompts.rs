//! Charm-style CLI prompts using cliclack

use crate::create::StandardCreator;
use crate::dirs::resolve_app_path;
use crate::error::CreateError;
use crate::product::ProductConfig;
use crate::request::{
    validate_project_name, AppCreationRequest, LanguageMode, PackageManager, TemplateKind,
};
use anyhow::Result;
use std::path::{Path, PathBuf};

const DEFAULT_PROJECT_NAME: &str = "my-app";

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project directory to create
    pub directory: Option<PathBuf>,

    pub typescript: bool,

    pub javascript: bool,

    /// Use the experimental app directory template
    pub app: bool,

    pub use_npm: bool,

    pub use_pnpm: bool,

    /// Example name or GitHub URL to bootstrap from
    pub example: Option<String>,

    /// Subdirectory of the example repository
    pub example_path: Option<String>,

    /// Local directory to use for templates instead of fetching from remote
    pub template_dir: Option<PathBuf>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Run the CLI with interactive prompts
pub async fn run<C: ProductConfig>(config: &C, args: CreateArgs, cli_version: &str) -> Result<()> {
    cliclack::intro(config.display_name())?;

    let app_path = select_directory(&args)?;
    check_project_name(&std::env::current_dir()?, &app_path)?;

    let language = select_language(&args)?;
    let package_manager = select_package_manager(&args);
    cliclack::log::info(format!("Package manager: {}", package_manager))?;

    if let Some(template_dir) = &args.template_dir {
        cliclack::log::info(format!(
            "Using local templates from {}",
            template_dir.display()
        ))?;
    }

    let request = AppCreationRequest {
        app_path,
        package_manager,
        example: args.example.clone(),
        example_path: args.example_path.clone(),
        language,
        template: if args.app {
            TemplateKind::App
        } else {
            TemplateKind::Default
        },
    };

    let mut creator = StandardCreator::from_config(config, args.template_dir.clone(), cli_version)?;
    let outcome = creator.create(&request).await?;

    outcome.print_report();

    cliclack::outro(format!("Learn more at {}", config.docs_url()))?;

    Ok(())
}

fn select_directory(args: &CreateArgs) -> Result<PathBuf> {
    if let Some(dir) = &args.directory {
        return Ok(dir.clone());
    }
    if args.yes {
        return Ok(PathBuf::from(DEFAULT_PROJECT_NAME));
    }

    let input: String = cliclack::input("What is your project named?")
        .placeholder(DEFAULT_PROJECT_NAME)
        .default_input(DEFAULT_PROJECT_NAME)
        .interact()?;

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(PathBuf::from(DEFAULT_PROJECT_NAME));
    }
    Ok(PathBuf::from(trimmed))
}

/// The last component of the resolved path becomes the package name
fn check_project_name(working_dir: &Path, app_path: &Path) -> Result<()> {
    let name = resolve_app_path(working_dir, app_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let problems = validate_project_name(&name);
    if !problems.is_empty() {
        return Err(CreateError::InvalidProjectName { name, problems }.into());
    }
    Ok(())
}

fn select_language(args: &CreateArgs) -> Result<LanguageMode> {
    if args.typescript {
        return Ok(LanguageMode::Ts);
    }
    if args.javascript {
        return Ok(LanguageMode::Js);
    }
    // Examples bring their own language; the mode only matters for templates
    if args.example.is_some() || args.yes {
        return Ok(LanguageMode::Ts);
    }

    let typescript: bool = cliclack::confirm("Would you like to use TypeScript with this project?")
        .initial_value(true)
        .interact()?;

    Ok(if typescript {
        LanguageMode::Ts
    } else {
        LanguageMode::Js
    })
}

fn select_package_manager(args: &CreateArgs) -> PackageManager {
    if args.use_npm {
        PackageManager::Npm
    } else if args.use_pnpm {
        PackageManager::Pnpm
    } else {
        PackageManager::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_language_flags() {
        let args = CreateArgs {
            javascript: true,
            ..Default::default()
        };
        assert_eq!(select_language(&args).unwrap(), LanguageMode::Js);

        let args = CreateArgs {
            typescript: true,
            javascript: true,
            ..Default::default()
        };
        assert_eq!(select_language(&args).unwrap(), LanguageMode::Ts);
    }

    #[test]
    fn test_yes_defaults_to_typescript_and_my_app() {
        let args = CreateArgs {
            yes: true,
            ..Default::default()
        };
        assert_eq!(select_language(&args).unwrap(), LanguageMode::Ts);
        assert_eq!(select_directory(&args).unwrap(), PathBuf::from("my-app"));
    }

    #[test]
    fn test_package_manager_flags_win() {
        let args = CreateArgs {
            use_pnpm: true,
            ..Default::default()
        };
        assert_eq!(select_package_manager(&args), PackageManager::Pnpm);
    }

    #[test]
    fn test_project_name_from_last_component() {
        let cwd = Path::new("/work");
        assert!(check_project_name(cwd, Path::new("apps/my-app")).is_ok());
        let err = check_project_name(cwd, Path::new("apps/My App")).unwrap_err();
        assert!(err.to_string().contains("npm naming restrictions"));
    }

    #[test]
    fn test_current_directory_is_named_after_itself() {
        let cwd = Path::new("/work/my-app");
        assert!(check_project_name(cwd, Path::new(".")).is_ok());
        assert!(check_project_name(cwd, Path::new("./")).is_ok());

        let err = check_project_name(Path::new("/work/My App"), Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("My App"));
    }
}
