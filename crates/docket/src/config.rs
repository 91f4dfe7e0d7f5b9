//! `docket.toml` configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use docket_playground::PlaygroundDefaults;
use docket_static::BuildConfig;

/// Configuration file structure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub docs: DocsConfig,
    pub build: BuildSettings,
    pub playground: PlaygroundSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Content root
    pub dir: PathBuf,
    /// Manifest path, relative to the content root
    pub manifest: PathBuf,
    pub output: PathBuf,
    pub lang: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            manifest: PathBuf::from("docs.json"),
            output: PathBuf::from("build"),
            lang: "en".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    pub minify: bool,
    pub clean: bool,
    /// Directories copied verbatim
    pub assets: Vec<String>,
    /// Files copied verbatim
    pub files: Vec<String>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        let defaults = BuildConfig::default();
        Self {
            minify: defaults.minify,
            clean: defaults.clean,
            assets: defaults.asset_dirs,
            files: defaults.asset_files,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlaygroundSettings {
    /// Overrides the manifest's `api.baseUrl`
    pub base_url: Option<String>,
    pub authorization: Option<String>,
    pub example_body: Option<String>,
}

impl ConfigFile {
    /// Load configuration from `path` if it exists.
    ///
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Path of the manifest file.
    pub fn manifest_path(&self) -> PathBuf {
        self.docs.dir.join(&self.docs.manifest)
    }

    /// Seed values for playground requests and request examples.
    pub fn playground_defaults(&self) -> PlaygroundDefaults {
        let mut defaults = PlaygroundDefaults::default();
        if let Some(authorization) = &self.playground.authorization {
            defaults.authorization = authorization.clone();
        }
        if let Some(body) = &self.playground.example_body {
            defaults.example_body = body.clone();
        }
        defaults
    }

    /// Site build settings.
    pub fn build_config(&self) -> BuildConfig {
        BuildConfig {
            content_dir: self.docs.dir.clone(),
            manifest_path: self.docs.manifest.clone(),
            output_dir: self.docs.output.clone(),
            minify: self.build.minify,
            clean: self.build.clean,
            asset_dirs: self.build.assets.clone(),
            asset_files: self.build.files.clone(),
            lang: self.docs.lang.clone(),
            api_base_url: self.playground.base_url.clone(),
            playground: self.playground_defaults(),
            live_reload: false,
        }
    }
}
