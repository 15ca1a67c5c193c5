//! Built-in template retrieval from files compiled into the binary, a remote
//! zip URL, or a local directory
//!
//! Every source goes through a zip: remote templates are published as
//! `<name>.zip` next to the root `template.yaml`, bundled and local templates
//! are zipped in memory on first use. Either way the extracted bundle is
//! cached per template for the rest of the run.

use super::manifest::{RootManifest, SharedFile, TemplateManifest};
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use url::Url;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const MANIFEST_FILE: &str = "template.yaml";

/// One file of the templates tree, embedded with `include_bytes!`
#[derive(Debug, Clone, Copy)]
pub struct BundledFile {
    /// Path relative to the templates root, e.g. `default/template.yaml`
    pub path: &'static str,
    pub contents: &'static [u8],
}

/// Template source - compiled in, remote URL, or local directory
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Bundled(&'static [BundledFile]),
    Remote(Url),
    Local(PathBuf),
}

impl TemplateSource {
    /// The product's bundled templates, unless its env var names a remote URL
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        match std::env::var(config.template_url_env()) {
            Ok(url_str) if !url_str.trim().is_empty() => {
                let url = Url::parse(url_str.trim())
                    .with_context(|| format!("Invalid template URL: {}", url_str))?;
                Ok(Self::Remote(url))
            }
            _ => Ok(Self::Bundled(config.bundled_templates())),
        }
    }
}

fn bundled_file(files: &[BundledFile], path: &str) -> Option<Vec<u8>> {
    files
        .iter()
        .find(|file| file.path == path)
        .map(|file| file.contents.to_vec())
}

/// A template's manifest plus every file in its zip, keyed by relative path
#[derive(Debug, Clone)]
struct TemplateBundle {
    manifest: TemplateManifest,
    files: HashMap<String, Vec<u8>>,
}

pub struct TemplateFetcher {
    source: TemplateSource,
    client: reqwest::Client,
    bundles: HashMap<String, TemplateBundle>,
}

impl TemplateFetcher {
    pub fn new(source: TemplateSource, user_agent: &str) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            bundles: HashMap::new(),
        }
    }

    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        Ok(Self::new(TemplateSource::from_config(config)?, config.user_agent()))
    }

    pub fn from_local(path: PathBuf, user_agent: &str) -> Self {
        Self::new(TemplateSource::Local(path), user_agent)
    }

    pub fn from_bundle(files: &'static [BundledFile], user_agent: &str) -> Self {
        Self::new(TemplateSource::Bundled(files), user_agent)
    }

    /// Append a path segment, preserving query parameters
    fn join_url(base: &Url, segment: &str) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    async fn get_remote(&self, base: &Url, segment: &str) -> Result<reqwest::Response> {
        let url = Self::join_url(base, segment)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch {}: HTTP {}", url, response.status());
        }
        Ok(response)
    }

    /// Fetch the root manifest listing available templates
    pub async fn fetch_root_manifest(&self) -> Result<RootManifest> {
        let content = match &self.source {
            TemplateSource::Remote(base) => self.get_remote(base, MANIFEST_FILE).await?.text().await?,
            TemplateSource::Local(dir) => read_root_manifest_text(dir)?,
            TemplateSource::Bundled(files) => {
                let bytes = bundled_file(files, MANIFEST_FILE)
                    .ok_or_else(|| anyhow::anyhow!("Bundled templates have no {}", MANIFEST_FILE))?;
                String::from_utf8(bytes).context("Root template manifest is not UTF-8")?
            }
        };
        serde_yaml::from_str(&content).context("Failed to parse root template manifest")
    }

    /// Zip one local template directory, shared root files included
    pub fn build_local_zip(
        templates_dir: &Path,
        template_name: &str,
        shared_files: &[SharedFile],
    ) -> Result<Vec<u8>> {
        Self::zip_template(
            |relative| std::fs::read(templates_dir.join(relative)).ok(),
            template_name,
            shared_files,
        )
        .with_context(|| format!("In templates directory {}", templates_dir.display()))
    }

    /// Zip one template read through `read`, which takes paths relative to
    /// the templates root
    ///
    /// The bundled `template.yaml` lists the shared files' destinations so
    /// they take part in language filtering like any other file.
    fn zip_template<F>(read: F, template_name: &str, shared_files: &[SharedFile]) -> Result<Vec<u8>>
    where
        F: Fn(&str) -> Option<Vec<u8>>,
    {
        let manifest_path = format!("{}/{}", template_name, MANIFEST_FILE);
        let manifest_bytes =
            read(&manifest_path).ok_or_else(|| anyhow::anyhow!("Failed to read {}", manifest_path))?;
        let mut manifest: TemplateManifest = serde_yaml::from_slice(&manifest_bytes)
            .with_context(|| format!("Failed to parse template '{}' manifest", template_name))?;

        let own_files = manifest.files.clone();
        for shared in shared_files {
            let dest = shared.destination().to_string();
            if !manifest.files.contains(&dest) {
                manifest.files.push(dest);
            }
        }

        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            let mut add = |relative: &str, content: &[u8]| -> Result<()> {
                zip.start_file(format!("{}/{}", template_name, relative), options)?;
                zip.write_all(content)?;
                Ok(())
            };

            let manifest_text =
                serde_yaml::to_string(&manifest).context("Failed to serialize template manifest")?;
            add(MANIFEST_FILE, manifest_text.as_bytes())?;

            for shared in shared_files {
                match read(&shared.source) {
                    Some(content) => add(shared.destination(), &content)?,
                    None => eprintln!("Warning: Shared file '{}' not found", shared.source),
                }
            }

            let shared_dests: HashSet<&str> =
                shared_files.iter().map(SharedFile::destination).collect();
            for relative in own_files.iter().filter(|f| !shared_dests.contains(f.as_str())) {
                match read(&format!("{}/{}", template_name, relative)) {
                    Some(content) => add(relative, &content)?,
                    None => eprintln!(
                        "Warning: File '{}' not found (listed in {})",
                        relative, manifest_path
                    ),
                }
            }

            zip.finish()?;
        }

        Ok(buffer)
    }

    /// Unpack a template zip, stripping the `{template_name}/` prefix
    fn read_bundle(zip_bytes: &[u8], template_name: &str) -> Result<TemplateBundle> {
        let mut archive = ZipArchive::new(Cursor::new(zip_bytes)).with_context(|| {
            format!("Failed to read zip archive for template '{}'", template_name)
        })?;
        let prefix = format!("{}/", template_name);
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let relative = name.strip_prefix(&prefix).unwrap_or(&name).to_string();
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            files.insert(relative, contents);
        }

        let manifest_bytes = files.get(MANIFEST_FILE).ok_or_else(|| {
            anyhow::anyhow!("Template '{}' zip missing {}", template_name, MANIFEST_FILE)
        })?;
        let manifest = serde_yaml::from_slice(manifest_bytes)
            .with_context(|| format!("Failed to parse template '{}' manifest", template_name))?;

        Ok(TemplateBundle { manifest, files })
    }

    async fn bundle(&mut self, template_name: &str) -> Result<&TemplateBundle> {
        if !self.bundles.contains_key(template_name) {
            let zip_bytes = match &self.source {
                TemplateSource::Remote(base) => self
                    .get_remote(base, &format!("{}.zip", template_name))
                    .await
                    .with_context(|| format!("Failed to fetch template '{}'", template_name))?
                    .bytes()
                    .await?
                    .to_vec(),
                TemplateSource::Local(dir) => {
                    let root: RootManifest = serde_yaml::from_str(&read_root_manifest_text(dir)?)
                        .context("Failed to parse root template manifest")?;
                    Self::build_local_zip(dir, template_name, &root.shared_files)?
                }
                TemplateSource::Bundled(files) => {
                    let root = self.fetch_root_manifest().await?;
                    Self::zip_template(
                        |relative| bundled_file(files, relative),
                        template_name,
                        &root.shared_files,
                    )?
                }
            };
            let bundle = Self::read_bundle(&zip_bytes, template_name)?;
            self.bundles.insert(template_name.to_string(), bundle);
        }

        self.bundles
            .get(template_name)
            .ok_or_else(|| anyhow::anyhow!("Template '{}' not found in cache", template_name))
    }

    pub async fn fetch_template_manifest(&mut self, template_name: &str) -> Result<TemplateManifest> {
        Ok(self.bundle(template_name).await?.manifest.clone())
    }

    pub async fn fetch_file_bytes(&mut self, template_name: &str, file_path: &str) -> Result<Vec<u8>> {
        self.bundle(template_name)
            .await?
            .files
            .get(file_path)
            .cloned()
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "File '{}' not found in template '{}'",
                    file_path,
                    template_name
                )
            })
    }
}

fn read_root_manifest_text(dir: &Path) -> Result<String> {
    let path = dir.join(MANIFEST_FILE);
    std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// A two-file local template tree with a shared, renamed gitignore
    pub(crate) fn local_templates() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::write(
            root.join("template.yaml"),
            r#"
templates: [default]
language_files:
  common: ["gitignore", "*.css", "next.config.js"]
  typescript: ["*.ts", "*.tsx", "tsconfig.json"]
  javascript: ["*.js", "*.jsx", "jsconfig.json"]
shared_files:
  - source: gitignore-shared
    dest: gitignore
"#,
        )
        .unwrap();
        std::fs::write(root.join("gitignore-shared"), "/node_modules\n/.next\n").unwrap();

        let default = root.join("default");
        std::fs::create_dir_all(default.join("pages")).unwrap();
        std::fs::write(
            default.join("template.yaml"),
            r#"
name: Default
description: Pages router starter
version: 0.1.0
files:
  - pages/index.tsx
  - pages/index.js
  - next-env.d.ts
  - tsconfig.json
  - jsconfig.json
  - next.config.js
scripts:
  dev: next dev
  build: next build
dependencies: [react, react-dom, next]
typescript_dependencies: [typescript]
"#,
        )
        .unwrap();
        std::fs::write(default.join("pages/index.tsx"), "export default function Home() {}").unwrap();
        std::fs::write(default.join("pages/index.js"), "export default function Home() {}").unwrap();
        std::fs::write(default.join("next-env.d.ts"), "/// <reference types=\"next\" />").unwrap();
        std::fs::write(default.join("tsconfig.json"), "{}").unwrap();
        std::fs::write(default.join("jsconfig.json"), "{}").unwrap();
        std::fs::write(default.join("next.config.js"), "module.exports = {}").unwrap();
        tmp
    }

    /// The same starter as `local_templates`, compiled in
    pub(crate) static BUNDLED_TEMPLATES: &[BundledFile] = &[
        BundledFile {
            path: "template.yaml",
            contents: b"templates: [default]
language_files:
  common: [gitignore, next.config.js]
  typescript: [\"*.ts\", \"*.tsx\", tsconfig.json]
  javascript: [\"*.js\", \"*.jsx\", jsconfig.json]
shared_files:
  - source: gitignore
",
        },
        BundledFile {
            path: "gitignore",
            contents: b"/node_modules\n/.next\n",
        },
        BundledFile {
            path: "default/template.yaml",
            contents: b"name: Default
description: Pages router starter
version: 0.1.0
files: [pages/index.tsx, pages/index.js, next-env.d.ts, tsconfig.json]
scripts:
  dev: next dev
dependencies: [react, react-dom, next]
",
        },
        BundledFile {
            path: "default/pages/index.tsx",
            contents: b"export default function Home() {}",
        },
        BundledFile {
            path: "default/pages/index.js",
            contents: b"export default function Home() {}",
        },
        BundledFile {
            path: "default/next-env.d.ts",
            contents: b"/// <reference types=\"next\" />",
        },
        BundledFile {
            path: "default/tsconfig.json",
            contents: b"{}",
        },
    ];

    #[tokio::test]
    async fn test_bundled_fetcher_needs_no_network() {
        let mut fetcher = TemplateFetcher::from_bundle(BUNDLED_TEMPLATES, "test");

        let root = fetcher.fetch_root_manifest().await.unwrap();
        assert_eq!(root.templates, vec!["default"]);

        let manifest = fetcher.fetch_template_manifest("default").await.unwrap();
        assert!(manifest.files.contains(&"gitignore".to_string()));

        let gitignore = fetcher.fetch_file_bytes("default", "gitignore").await.unwrap();
        assert_eq!(gitignore, b"/node_modules\n/.next\n");
        let next_env = fetcher.fetch_file_bytes("default", "next-env.d.ts").await.unwrap();
        assert!(next_env.starts_with(b"/// <reference"));
    }

    #[test]
    fn test_local_zip_includes_shared_files() {
        let templates = local_templates();
        let shared = vec![SharedFile {
            source: "gitignore-shared".to_string(),
            dest: Some("gitignore".to_string()),
        }];

        let zip = TemplateFetcher::build_local_zip(templates.path(), "default", &shared).unwrap();
        let bundle = TemplateFetcher::read_bundle(&zip, "default").unwrap();

        assert!(bundle.manifest.files.contains(&"gitignore".to_string()));
        assert_eq!(
            bundle.files.get("gitignore").map(Vec::as_slice),
            Some("/node_modules\n/.next\n".as_bytes())
        );
        assert!(bundle.files.contains_key("pages/index.tsx"));
        assert!(bundle.files.contains_key(MANIFEST_FILE));
    }

    #[tokio::test]
    async fn test_local_fetcher_serves_files() {
        let templates = local_templates();
        let mut fetcher = TemplateFetcher::from_local(templates.path().to_path_buf(), "test");

        let root = fetcher.fetch_root_manifest().await.unwrap();
        assert_eq!(root.templates, vec!["default"]);

        let manifest = fetcher.fetch_template_manifest("default").await.unwrap();
        assert_eq!(manifest.name, "Default");

        let bytes = fetcher.fetch_file_bytes("default", "tsconfig.json").await.unwrap();
        assert_eq!(bytes, b"{}");

        assert!(fetcher
            .fetch_file_bytes("default", "missing.txt")
            .await
            .is_err());
    }

    #[test]
    fn test_join_url_keeps_query() {
        let base = Url::parse("https://example.com/templates?token=abc").unwrap();
        let url = TemplateFetcher::join_url(&base, "default.zip").unwrap();
        assert_eq!(url.as_str(), "https://example.com/templates/default.zip?token=abc");
    }
}
