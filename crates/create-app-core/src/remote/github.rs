//! GitHub-backed example repository
//!
//! Existence checks go through the GitHub contents API. Downloads use the
//! codeload zip archive of a branch, spooled to a temporary file that is
//! removed once the requested subtree has been extracted.

use super::reference::RepoReference;
use super::ExampleRepository;
use crate::product::{ExamplesCatalog, ProductConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use url::Url;
use zip::ZipArchive;

const API_BASE: &str = "https://api.github.com";
const CODELOAD_BASE: &str = "https://codeload.github.com";

/// Optional token for the GitHub API, raising its rate limit
const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: String,
}

/// Example repository backed by github.com
pub struct GithubExamples {
    client: reqwest::Client,
    catalog: ExamplesCatalog,
    token: Option<String>,
}

impl GithubExamples {
    /// Create a new repository client with a custom user agent
    pub fn new(catalog: ExamplesCatalog, user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            catalog,
            token: std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()),
        }
    }

    /// Create a repository client from a product config
    pub fn from_config<C: ProductConfig>(config: &C) -> Self {
        Self::new(config.examples_catalog(), config.user_agent())
    }

    /// Catalog examples are subtrees of the catalog repository
    pub fn catalog_reference(&self, name: &str) -> RepoReference {
        RepoReference {
            owner: self.catalog.owner.to_string(),
            name: self.catalog.name.to_string(),
            branch: self.catalog.branch.to_string(),
            file_path: format!("{}/{}", self.catalog.directory, name),
        }
    }

    /// Build a URL from a base and path segments; each segment may contain `/`
    fn build_url(base: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(base).with_context(|| format!("Invalid base URL: {}", base))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?
            .pop_if_empty()
            .extend(
                segments
                    .iter()
                    .flat_map(|s| s.split('/'))
                    .filter(|s| !s.is_empty()),
            );
        Ok(url)
    }

    fn contents_url(reference: &RepoReference) -> Result<Url> {
        let mut url = Self::build_url(
            API_BASE,
            &[
                "repos",
                reference.owner.as_str(),
                reference.name.as_str(),
                "contents",
                reference.file_path.as_str(),
            ],
        )?;
        url.query_pairs_mut().append_pair("ref", &reference.branch);
        Ok(url)
    }

    fn archive_url(reference: &RepoReference) -> Result<Url> {
        Self::build_url(
            CODELOAD_BASE,
            &[
                reference.owner.as_str(),
                reference.name.as_str(),
                "zip",
                reference.branch.as_str(),
            ],
        )
    }

    fn api_request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let request = self
            .client
            .request(method, url)
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// HEAD the URL; only a 2xx answer counts
    async fn is_url_ok(&self, url: Url) -> bool {
        self.api_request(reqwest::Method::HEAD, url)
            .send()
            .await
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }

    /// Stream the branch archive into an anonymous temporary file
    async fn download_archive(&self, reference: &RepoReference) -> Result<File> {
        let url = Self::archive_url(reference)?;
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch archive from {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            );
        }

        let spool = tempfile::tempfile().context("Failed to create temporary archive file")?;
        let mut file = tokio::fs::File::from_std(spool);
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        file.seek(SeekFrom::Start(0)).await?;
        Ok(file.into_std().await)
    }
}

impl ExampleRepository for GithubExamples {
    async fn default_branch(&self, owner: &str, name: &str) -> Result<String> {
        let url = Self::build_url(API_BASE, &["repos", owner, name])?;
        let response = self
            .api_request(reqwest::Method::GET, url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch repository info from {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch {}: HTTP {}", url, response.status());
        }

        let info: RepoInfo = response
            .json()
            .await
            .context("Failed to parse repository info")?;
        Ok(info.default_branch)
    }

    async fn repo_exists(&self, reference: &RepoReference) -> bool {
        match Self::contents_url(reference) {
            Ok(url) => self.is_url_ok(url).await,
            Err(_) => false,
        }
    }

    async fn named_example_exists(&self, name: &str) -> bool {
        self.repo_exists(&self.catalog_reference(name)).await
    }

    async fn fetch_repo_subtree(&self, root: &Path, reference: &RepoReference) -> Result<()> {
        let archive = self.download_archive(reference).await?;
        let written = extract_in_background(archive, root, &reference.file_path).await?;
        if written == 0 {
            anyhow::bail!(
                "Archive for {} contained no files under '{}'",
                reference,
                reference.file_path
            );
        }
        Ok(())
    }

    async fn fetch_named_example(&self, root: &Path, name: &str) -> Result<()> {
        self.fetch_repo_subtree(root, &self.catalog_reference(name))
            .await
    }
}

/// Path of an archive entry relative to `sub_path`, without the archive's
/// top-level folder; `None` for entries outside the subtree
fn subtree_relative(entry: &Path, sub_path: &str) -> Option<PathBuf> {
    let mut components = entry.components();
    // codeload archives wrap everything in `{name}-{branch}/`
    components.next()?;
    let inside: PathBuf = components.collect();
    let sub_path = Path::new(sub_path.trim_matches('/'));
    let relative = inside.strip_prefix(sub_path).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(relative.to_path_buf())
}

/// `extract_subtree` on the blocking pool
async fn extract_in_background(archive: File, root: &Path, sub_path: &str) -> Result<usize> {
    let root = root.to_path_buf();
    let sub_path = sub_path.to_string();
    tokio::task::spawn_blocking(move || extract_subtree(archive, &root, &sub_path))
        .await
        .context("Archive extraction task failed")?
}

/// Extract every file below `sub_path` into `root`; returns the file count
pub fn extract_subtree<R: Read + Seek>(reader: R, root: &Path, sub_path: &str) -> Result<usize> {
    let mut archive = ZipArchive::new(reader).context("Failed to read example archive")?;
    let mut written = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        // Skips absolute paths and `..` escapes
        let Some(entry_path) = entry.enclosed_name() else {
            continue;
        };
        if entry_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            continue;
        }
        let Some(relative) = subtree_relative(&entry_path, sub_path) else {
            continue;
        };

        let target = root.join(&relative);
        if entry.is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory: {}", target.display()))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let mut out = File::create(&target)
            .with_context(|| format!("Failed to write file: {}", target.display()))?;
        std::io::copy(&mut entry, &mut out)?;
        apply_mode(&target, entry.unix_mode())?;

        written += 1;
    }

    Ok(written)
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if let Some(mode) = mode {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode & 0o777))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}
