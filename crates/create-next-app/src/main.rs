//! create-next-app - Bootstrap Next.js apps from examples or built-in templates

mod bundled;

use anyhow::Result;
use clap::{Parser, Subcommand};
use create_app_core::templates::BundledFile;
use create_app_core::tui::CreateArgs;
use create_app_core::{ExamplesCatalog, ProductConfig};
use std::path::PathBuf;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Next.js product configuration
#[derive(Clone)]
pub struct NextAppConfig;

impl ProductConfig for NextAppConfig {
    fn name(&self) -> &'static str {
        "create-next-app"
    }

    fn display_name(&self) -> &'static str {
        "Create Next App"
    }

    fn examples_catalog(&self) -> ExamplesCatalog {
        ExamplesCatalog {
            owner: "vercel",
            name: "next.js",
            branch: "canary",
            directory: "examples",
        }
    }

    fn bundled_templates(&self) -> &'static [BundledFile] {
        bundled::TEMPLATES
    }

    fn template_url_env(&self) -> &'static str {
        "CREATE_NEXT_APP_TEMPLATE_URL"
    }

    fn allowed_files_env(&self) -> &'static str {
        "CREATE_NEXT_APP_ALLOWED_FILES"
    }

    fn initial_commit_message(&self) -> &'static str {
        "Initial commit from Create Next App"
    }

    fn docs_url(&self) -> &'static str {
        "https://nextjs.org/docs"
    }

    fn upgrade_command(&self) -> &'static str {
        "cargo install create-next-app --force"
    }
}

#[derive(Parser, Debug)]
#[command(name = "create-next-app")]
#[command(about = "Create Next.js apps with one command")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub create: CliCreateArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build zip files for all templates in the template directory (for development use)
    BuildZips(BuildZipsArgs),
}

#[derive(clap::Args, Debug)]
pub struct CliCreateArgs {
    /// Project directory to create
    #[arg(value_name = "project-directory")]
    pub directory: Option<PathBuf>,

    /// Initialize as a TypeScript project
    #[arg(long = "ts", visible_alias = "typescript", conflicts_with = "javascript")]
    pub typescript: bool,

    /// Initialize as a JavaScript project
    #[arg(long = "js", visible_alias = "javascript")]
    pub javascript: bool,

    /// Initialize with the experimental app directory template
    #[arg(long)]
    pub app: bool,

    /// Bootstrap the application using npm
    #[arg(long = "use-npm", conflicts_with = "use_pnpm")]
    pub use_npm: bool,

    /// Bootstrap the application using pnpm
    #[arg(long = "use-pnpm")]
    pub use_pnpm: bool,

    /// An example to bootstrap the app with: a name from the Next.js repo or a GitHub URL
    #[arg(short, long)]
    pub example: Option<String>,

    /// Path of the example inside the repository, when its branch name contains a slash
    #[arg(long = "example-path", requires = "example")]
    pub example_path: Option<String>,

    /// Local directory to use for templates instead of fetching from remote (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            directory: args.directory,
            typescript: args.typescript,
            javascript: args.javascript,
            app: args.app,
            use_npm: args.use_npm,
            use_pnpm: args.use_pnpm,
            example: args.example,
            example_path: args.example_path,
            template_dir: args.template_dir,
            yes: args.yes,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct BuildZipsArgs {
    /// Local directory containing templates to build zips from (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let config = NextAppConfig;

    match args.command {
        Some(Command::BuildZips(build_args)) => {
            create_app_core::templates::build_zips(&config, &build_args.template_dir).await
        }
        None => {
            let result = create_app_core::run(&config, args.create.into(), CLI_VERSION).await;

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result
        }
    }
}
