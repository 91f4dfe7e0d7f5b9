//! Static site builder.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use docket_mdx::{highlight_code, parse_mdx, render_markdown, ParsedDoc, RenderOptions};
use docket_playground::{endpoint_url, Method, PlaygroundDefaults, RequestDescriptor, SnippetRenderer};

use crate::assets::AssetPipeline;
use crate::manifest::{Favicon, Manifest, ManifestError};
use crate::templates::{
    with_active, Context, Endpoint, NavGroup, NavItem, NavTab, SnippetView, TemplateEngine, TocEntry,
};

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Content root; page paths and assets resolve against it
    pub content_dir: PathBuf,

    /// Manifest file, relative to the content root unless absolute
    pub manifest_path: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Minify the generated stylesheet
    pub minify: bool,

    /// Remove the output directory before building
    pub clean: bool,

    /// Directories under the content root copied verbatim
    pub asset_dirs: Vec<String>,

    /// Files under the content root copied verbatim
    pub asset_files: Vec<String>,

    /// `lang` attribute of generated pages
    pub lang: String,

    /// Overrides the manifest's `api.baseUrl`
    pub api_base_url: Option<String>,

    /// Seed values for request examples
    pub playground: PlaygroundDefaults,

    /// Include the dev server's live reload client
    pub live_reload: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("."),
            manifest_path: PathBuf::from("docs.json"),
            output_dir: PathBuf::from("build"),
            minify: true,
            clean: true,
            asset_dirs: vec!["images".to_string(), "logo".to_string(), "icons".to_string()],
            asset_files: vec!["favicon.svg".to_string()],
            lang: "en".to_string(),
            api_base_url: None,
            playground: PlaygroundDefaults::default(),
            live_reload: false,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of HTML pages written, including the index
    pub pages: usize,

    /// Number of asset files copied
    pub assets: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("No content file for manifest pages: {}", .0.join(", "))]
    MissingPages(Vec<String>),

    #[error("Failed to read content: {0}")]
    ReadError(String),

    #[error("Failed to parse page: {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Failed to render request examples: {0}")]
    SnippetError(String),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Refusing to clean {0}: it contains the content directory")]
    UnsafeOutput(PathBuf),
}

/// A manifest page read from disk.
#[derive(Debug)]
struct PageSource {
    /// Manifest page path, e.g. `auth/login`
    page: String,

    /// Source file path
    source_path: PathBuf,

    /// Parsed document
    doc: ParsedDoc,
}

/// A page rendered to its final HTML body.
#[derive(Debug)]
struct RenderedPage {
    page: String,
    title: String,
    nav_title: String,
    description: Option<String>,
    root: String,
    content: String,
    toc: Vec<TocEntry>,
    endpoint: Option<Endpoint>,
    snippets: Vec<SnippetView>,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
    snippets: SnippetRenderer,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            templates: TemplateEngine::new(),
            snippets: SnippetRenderer::new(),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Path of the manifest file.
    pub fn manifest_path(&self) -> PathBuf {
        self.config.content_dir.join(&self.config.manifest_path)
    }

    /// Build the static site.
    ///
    /// Every page is read and rendered before anything is written, so a
    /// missing or malformed page leaves the output directory untouched.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let manifest = Manifest::load(&self.manifest_path())?;
        let sources = self.load_pages(&manifest)?;

        let base_url = self
            .config
            .api_base_url
            .as_deref()
            .or(manifest.api.base_url.as_deref());

        let pages = sources
            .iter()
            .map(|source| self.render_page(source, base_url))
            .collect::<Result<Vec<_>, _>>()?;

        let nav = build_navigation(&manifest, &pages);
        let favicon = manifest.favicon();

        let mut outputs: Vec<(PathBuf, String)> = Vec::with_capacity(pages.len() + 1);
        for page in &pages {
            let context = Context {
                title: page.title.clone(),
                description: page.description.clone(),
                site_title: manifest.name.clone(),
                lang: self.config.lang.clone(),
                root: page.root.clone(),
                favicon: favicon.map(|f| f.href(&page.root)),
                content: page.content.clone(),
                nav: with_active(&nav, &page.page),
                toc: page.toc.clone(),
                endpoint: page.endpoint.clone(),
                snippets: page.snippets.clone(),
                live_reload: self.config.live_reload,
            };
            let html = self
                .templates
                .render_page("doc.html", &context)
                .map_err(|e| BuildError::TemplateError(format!("{}: {}", page.page, e)))?;
            outputs.push((PathBuf::from(format!("{}.html", page.page)), html));
        }

        if !pages.iter().any(|page| page.page == "index") {
            let context = Context {
                title: manifest.name.clone(),
                description: manifest.description.clone(),
                site_title: manifest.name.clone(),
                lang: self.config.lang.clone(),
                favicon: favicon.map(|f| f.href("")),
                nav: nav.clone(),
                live_reload: self.config.live_reload,
                ..Default::default()
            };
            let html = self
                .templates
                .render_page("index.html", &context)
                .map_err(|e| BuildError::TemplateError(format!("index: {}", e)))?;
            outputs.push((PathBuf::from("index.html"), html));
        }

        self.prepare_output()?;

        for (relative, html) in &outputs {
            let path = self.config.output_dir.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
            }
            fs::write(&path, html).map_err(|e| write_error(&path, e))?;
            tracing::debug!("Wrote {}", path.display());
        }

        self.generate_assets(manifest.primary_color())?;
        let assets = self.copy_assets(favicon.and_then(Favicon::file))?;

        self.report_orphans(&sources);

        Ok(BuildResult {
            pages: outputs.len(),
            assets,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Resolve and parse every manifest page, failing if any is missing.
    fn load_pages(&self, manifest: &Manifest) -> Result<Vec<PageSource>, BuildError> {
        let mut found = Vec::new();
        let mut missing = Vec::new();

        for page in manifest.pages() {
            match self.resolve_page(page) {
                Some(path) => found.push((page, path)),
                None => missing.push(page.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(BuildError::MissingPages(missing));
        }

        found
            .into_iter()
            .map(|(page, source_path)| {
                let content = fs::read_to_string(&source_path)
                    .map_err(|e| BuildError::ReadError(format!("{}: {}", source_path.display(), e)))?;

                let doc = parse_mdx(&content).map_err(|e| BuildError::ParseError {
                    path: source_path.display().to_string(),
                    message: e.to_string(),
                })?;

                Ok(PageSource {
                    page: page.to_string(),
                    source_path,
                    doc,
                })
            })
            .collect()
    }

    /// Content file for a page: `<page>.mdx`, else `<page>.md`.
    fn resolve_page(&self, page: &str) -> Option<PathBuf> {
        ["mdx", "md"]
            .iter()
            .map(|ext| self.config.content_dir.join(format!("{}.{}", page, ext)))
            .find(|path| path.is_file())
    }

    fn render_page(&self, source: &PageSource, base_url: Option<&str>) -> Result<RenderedPage, BuildError> {
        let root = "../".repeat(source.page.matches('/').count());
        let rendered = render_markdown(
            &source.doc.content,
            &RenderOptions { root: root.clone() },
        );

        let title = source
            .doc
            .title()
            .map(str::to_string)
            .or(rendered.first_heading)
            .unwrap_or_else(|| last_segment(&source.page).to_string());

        let nav_title = source
            .doc
            .sidebar_title()
            .map(str::to_string)
            .unwrap_or_else(|| title.clone());

        let (endpoint, snippets) = match source.doc.frontmatter.as_ref().and_then(|f| f.endpoint()) {
            Some((method, path)) => self.request_examples(source, method, path, base_url)?,
            None => (None, Vec::new()),
        };

        tracing::debug!("Rendered {} from {}", source.page, source.source_path.display());

        Ok(RenderedPage {
            page: source.page.clone(),
            title,
            nav_title,
            description: source.doc.description().map(str::to_string),
            root,
            content: rendered.html,
            toc: rendered
                .toc
                .into_iter()
                .map(|e| TocEntry {
                    title: e.title,
                    id: e.id,
                    level: e.level,
                })
                .collect(),
            endpoint,
            snippets,
        })
    }

    /// Endpoint badge and request snippets for a page's `api` front-matter.
    fn request_examples(
        &self,
        source: &PageSource,
        method: &str,
        path: &str,
        base_url: Option<&str>,
    ) -> Result<(Option<Endpoint>, Vec<SnippetView>), BuildError> {
        let method: Method = method.parse().map_err(|e: docket_playground::RequestError| {
            BuildError::ParseError {
                path: source.source_path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        let url = endpoint_url(base_url, path);

        let request = RequestDescriptor::seeded(method, url.clone(), &self.config.playground);
        let snippets = self
            .snippets
            .render_all(&request.prepare())
            .map_err(|e| BuildError::SnippetError(format!("{}: {}", source.page, e)))?
            .into_iter()
            .map(|snippet| {
                let lang = snippet.language.highlight();
                SnippetView {
                    label: snippet.language.label().to_string(),
                    lang: lang.to_string(),
                    html: highlight_code(&snippet.code, lang),
                }
            })
            .collect();

        Ok((
            Some(Endpoint {
                method: method.to_string(),
                url,
            }),
            snippets,
        ))
    }

    /// Clean (if configured) and create the output directory.
    fn prepare_output(&self) -> Result<(), BuildError> {
        let output = &self.config.output_dir;

        if self.config.clean && output.exists() {
            let output_abs = fs::canonicalize(output).map_err(|e| write_error(output, e))?;
            let content_abs = fs::canonicalize(&self.config.content_dir)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", self.config.content_dir.display(), e)))?;

            if content_abs.starts_with(&output_abs) {
                return Err(BuildError::UnsafeOutput(output.clone()));
            }

            fs::remove_dir_all(output).map_err(|e| write_error(output, e))?;
        }

        fs::create_dir_all(output).map_err(|e| write_error(output, e))
    }

    /// Write `styles.css` and `main.js`.
    fn generate_assets(&self, primary: &str) -> Result<(), BuildError> {
        let css = AssetPipeline::generate_css(primary);
        let css = if self.config.minify {
            match AssetPipeline::minify_css(&css) {
                Ok(minified) => minified,
                Err(e) => {
                    tracing::warn!("Writing unminified stylesheet: {}", e);
                    css
                }
            }
        } else {
            css
        };

        let styles = self.config.output_dir.join("styles.css");
        fs::write(&styles, css).map_err(|e| write_error(&styles, e))?;

        let script = self.config.output_dir.join("main.js");
        fs::write(&script, AssetPipeline::generate_js()).map_err(|e| write_error(&script, e))?;

        Ok(())
    }

    /// Copy configured asset directories and files. Returns the file count.
    fn copy_assets(&self, favicon: Option<&str>) -> Result<usize, BuildError> {
        let content = &self.config.content_dir;
        let output = &self.config.output_dir;
        let mut copied = 0;

        for dir in &self.config.asset_dirs {
            let src = content.join(dir);
            if src.is_dir() {
                let dest = output.join(dir);
                copied += AssetPipeline::copy_dir(&src, &dest).map_err(|e| write_error(&dest, e))?;
                tracing::debug!("Copied {}", src.display());
            }
        }

        let favicon = favicon.filter(|f| {
            !f.split('/').any(|segment| segment == "..") && !self.config.asset_files.iter().any(|a| a == f)
        });

        for file in self.config.asset_files.iter().map(String::as_str).chain(favicon) {
            let src = content.join(file);
            if src.is_file() {
                let dest = output.join(file);
                AssetPipeline::copy_file(&src, &dest).map_err(|e| write_error(&dest, e))?;
                copied += 1;
            }
        }

        Ok(copied)
    }

    /// Warn about content files no manifest page refers to.
    fn report_orphans(&self, sources: &[PageSource]) {
        let built: HashSet<&Path> = sources.iter().map(|s| s.source_path.as_path()).collect();
        let output = fs::canonicalize(&self.config.output_dir).ok();

        let entries = WalkDir::new(&self.config.content_dir)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                if name.starts_with('.') || name == "node_modules" {
                    return false;
                }
                if entry.file_type().is_dir() {
                    if let (Some(output), Ok(path)) = (&output, fs::canonicalize(entry.path())) {
                        return &path != output;
                    }
                }
                true
            })
            .filter_map(|e| e.ok());

        for entry in entries {
            let path = entry.path();
            let is_page = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("mdx") | Some("md")
            );

            if entry.file_type().is_file() && is_page && !built.contains(path) {
                tracing::warn!("{} is not listed in the manifest and was not built", path.display());
            }
        }
    }
}

/// Sidebar tree from the manifest, labelled with rendered page titles.
fn build_navigation(manifest: &Manifest, pages: &[RenderedPage]) -> Vec<NavTab> {
    let label = |page: &str| {
        pages
            .iter()
            .find(|p| p.page == page)
            .map(|p| p.nav_title.clone())
            .unwrap_or_else(|| last_segment(page).to_string())
    };

    manifest
        .tabs()
        .iter()
        .map(|tab| NavTab {
            title: tab.tab.clone(),
            groups: tab
                .groups
                .iter()
                .map(|group| NavGroup {
                    title: group.group.clone(),
                    pages: group
                        .pages
                        .iter()
                        .map(|page| NavItem {
                            title: label(page),
                            path: format!("{}.html", page),
                            page: page.clone(),
                            active: false,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

fn last_segment(page: &str) -> &str {
    page.rsplit('/').next().unwrap_or(page)
}

fn write_error(path: &Path, e: std::io::Error) -> BuildError {
    BuildError::WriteError(format!("{}: {}", path.display(), e))
}
