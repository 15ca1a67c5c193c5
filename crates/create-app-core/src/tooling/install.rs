//! Dependency installation through npm, yarn or pnpm

use crate::error::{CreateError, Result};
use crate::request::PackageManager;
use colored::Colorize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

/// Registry looked up to decide whether yarn may go to the network
const YARN_REGISTRY_HOST: &str = "registry.yarnpkg.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOptions {
    pub package_manager: PackageManager,
    pub is_online: bool,
}

/// Installs packages into a project directory
#[allow(async_fn_in_trait)]
pub trait DependencyInstaller {
    /// Install `dependencies`, or everything in the manifest when `None`
    async fn install(
        &self,
        root: &Path,
        dependencies: Option<&[String]>,
        options: InstallOptions,
    ) -> Result<()>;

    /// Whether the package registry is reachable
    async fn is_online(&self) -> bool;
}

/// Arguments for the package manager invocation
pub fn install_args(
    root: &Path,
    dependencies: Option<&[String]>,
    options: InstallOptions,
) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    let offline = !options.is_online;

    match (options.package_manager, dependencies) {
        (PackageManager::Yarn, Some(deps)) => {
            args.extend(["add", "--exact"].map(String::from));
            if offline {
                args.push("--offline".to_string());
            }
            args.push("--cwd".to_string());
            args.push(root.display().to_string());
            args.extend(deps.iter().cloned());
        }
        (PackageManager::Yarn, None) => {
            if offline {
                args.push("--offline".to_string());
            }
        }
        (manager, Some(deps)) => {
            let verb = if manager == PackageManager::Pnpm { "add" } else { "install" };
            args.extend([verb, "--save-exact", "--save"].map(String::from));
            args.extend(deps.iter().cloned());
        }
        (_, None) => args.push("install".to_string()),
    }

    args
}

/// Runs the real package manager binary with inherited output
#[derive(Debug, Clone, Default)]
pub struct PackageManagerInstaller;

impl DependencyInstaller for PackageManagerInstaller {
    async fn install(
        &self,
        root: &Path,
        dependencies: Option<&[String]>,
        options: InstallOptions,
    ) -> Result<()> {
        let program = options.package_manager.command();
        let args = install_args(root, dependencies, options);
        let command_line = format!("{} {}", program, args.join(" ")).trim().to_string();

        if !options.is_online {
            println!(
                "{}",
                "You appear to be offline.\nFalling back to the local cache.".yellow()
            );
        }

        let status = TokioCommand::new(program)
            .args(&args)
            .current_dir(root)
            .env("ADBLOCK", "1")
            .env("NODE_ENV", "development")
            .env("DISABLE_OPENCOLLECTIVE", "1")
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| CreateError::InstallFailed {
                command: command_line.clone(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(CreateError::InstallFailed {
                command: command_line,
                reason: match status.code() {
                    Some(code) => format!("exited with code {}", code),
                    None => "terminated by signal".to_string(),
                },
            });
        }
        Ok(())
    }

    async fn is_online(&self) -> bool {
        if resolves(YARN_REGISTRY_HOST).await {
            return true;
        }
        match proxy_host().await {
            Some(host) => resolves(&host).await,
            None => false,
        }
    }
}

async fn resolves(host: &str) -> bool {
    tokio::net::lookup_host((host, 443))
        .await
        .map(|mut addrs| addrs.next().is_some())
        .unwrap_or(false)
}

/// Host of the configured HTTPS proxy, from the environment or npm config
async fn proxy_host() -> Option<String> {
    let from_env = ["https_proxy", "HTTPS_PROXY"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .and_then(|proxy| parse_proxy_host(&proxy));
    if from_env.is_some() {
        return from_env;
    }

    let output = TokioCommand::new("npm")
        .args(["config", "get", "https-proxy"])
        .output()
        .await
        .ok()
        .filter(|out| out.status.success())?;
    parse_proxy_host(&String::from_utf8_lossy(&output.stdout))
}

/// npm prints `null` when no proxy is set
fn parse_proxy_host(proxy: &str) -> Option<String> {
    let proxy = proxy.trim();
    if proxy.is_empty() || proxy == "null" {
        return None;
    }
    url::Url::parse(proxy)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}
