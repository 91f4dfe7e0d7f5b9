//! Navigation manifest (`docs.json`).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Primary color used when the manifest has none or an invalid one.
pub const DEFAULT_PRIMARY: &str = "#16A34A";

/// The site manifest: name, colors and the tab/group/page hierarchy.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub colors: Colors,

    /// Favicon path relative to the content root, or an absolute URL
    #[serde(default)]
    pub favicon: Option<String>,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub navigation: Navigation,

    /// Tabs given at the top level instead of under `navigation`
    #[serde(default)]
    tabs: Vec<Tab>,
}

fn default_name() -> String {
    "Documentation".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Colors {
    #[serde(default)]
    pub primary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSettings {
    /// Base URL joined with page `api` paths
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Navigation {
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tab {
    pub tab: String,
    #[serde(default)]
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub group: String,
    /// Page paths relative to the content root, without extension
    #[serde(default)]
    pub pages: Vec<String>,
}

/// Errors that can occur when loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid page path '{page}': {reason}")]
    InvalidPagePath { page: String, reason: &'static str },

    #[error("Invalid favicon '{0}': contains characters not allowed in a link")]
    InvalidFavicon(String),
}

/// Where the site favicon comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Favicon<'a> {
    /// File under the content root, copied into the output
    File(&'a str),
    /// URL with a scheme (or protocol-relative), linked as-is
    Url(&'a str),
}

impl<'a> Favicon<'a> {
    /// Link target from a page whose root prefix is `root`.
    pub fn href(&self, root: &str) -> String {
        match self {
            Favicon::File(path) => format!("{}{}", root, path),
            Favicon::Url(url) => url.to_string(),
        }
    }

    /// Content-root path to copy, if the favicon is a local file.
    pub fn file(self) -> Option<&'a str> {
        match self {
            Favicon::File(path) => Some(path),
            Favicon::Url(_) => None,
        }
    }
}

impl Manifest {
    /// Read and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate manifest JSON.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Navigation tabs, from `navigation.tabs` or the top-level `tabs`.
    pub fn tabs(&self) -> &[Tab] {
        if self.navigation.tabs.is_empty() {
            &self.tabs
        } else {
            &self.navigation.tabs
        }
    }

    /// Distinct page paths in navigation order.
    pub fn pages(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.tabs()
            .iter()
            .flat_map(|tab| &tab.groups)
            .flat_map(|group| &group.pages)
            .map(String::as_str)
            .filter(|page| seen.insert(*page))
            .collect()
    }

    /// Validated primary color, or [`DEFAULT_PRIMARY`].
    pub fn primary_color(&self) -> &str {
        match self.colors.primary.as_deref() {
            Some(color) if is_hex_color(color) => color,
            Some(color) => {
                tracing::warn!("Ignoring invalid primary color '{}'", color);
                DEFAULT_PRIMARY
            }
            None => DEFAULT_PRIMARY,
        }
    }

    /// The favicon, classified as a local file or a remote URL.
    pub fn favicon(&self) -> Option<Favicon<'_>> {
        let favicon = self.favicon.as_deref()?.trim();
        if favicon.is_empty() {
            return None;
        }

        if is_url(favicon) {
            Some(Favicon::Url(favicon))
        } else {
            Some(Favicon::File(favicon.trim_start_matches('/')))
        }
    }

    fn validate(&self) -> Result<(), ManifestError> {
        for page in self.pages() {
            validate_page_path(page)?;
        }
        if let Some(favicon) = &self.favicon {
            if favicon
                .chars()
                .any(|c| c.is_control() || "\\\"'<>".contains(c))
            {
                return Err(ManifestError::InvalidFavicon(favicon.clone()));
            }
        }
        Ok(())
    }
}

fn validate_page_path(page: &str) -> Result<(), ManifestError> {
    let invalid = |reason| ManifestError::InvalidPagePath {
        page: page.to_string(),
        reason,
    };

    if page.is_empty() {
        return Err(invalid("empty path"));
    }
    if page.starts_with('/') {
        return Err(invalid("must be relative to the content root"));
    }
    if page
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || "\\\"'<>&?#".contains(c))
    {
        return Err(invalid("contains characters not allowed in a page path"));
    }
    if page
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(invalid("contains an empty, '.' or '..' segment"));
    }

    Ok(())
}

fn is_url(link: &str) -> bool {
    if link.starts_with("//") || link.starts_with("data:") {
        return true;
    }
    link.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c))
    })
}

fn is_hex_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}
