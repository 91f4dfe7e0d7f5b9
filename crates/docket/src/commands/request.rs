//! Send a request to a documented endpoint (`docket try`).

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use reqwest::Client;

use docket_mdx::parse_mdx;
use docket_playground::{endpoint_url, parse_header, Method, Playground, RequestDescriptor};
use docket_static::Manifest;

use crate::config::ConfigFile;

const USER_AGENT: &str = concat!("docket/", env!("CARGO_PKG_VERSION"));

/// Arguments describing a request, shared by `try` and `snippet`.
#[derive(Debug, Clone, Default, Args)]
pub struct RequestArgs {
    /// Page whose `api` front-matter names the endpoint, e.g. api-reference/ping
    #[arg(long)]
    pub page: Option<String>,

    /// HTTP method: GET, POST, PUT or DELETE
    #[arg(short = 'X', long)]
    pub method: Option<String>,

    /// Request URL, absolute or relative to the API base URL
    #[arg(long)]
    pub url: Option<String>,

    /// Header as "Name: Value"; repeatable, overrides the defaults.
    /// "Name:" with no value removes the header
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,
}

impl RequestArgs {
    /// Build the request: seeded defaults, then page endpoint, then explicit flags.
    pub fn resolve(&self, config: &ConfigFile) -> Result<RequestDescriptor> {
        let endpoint = match &self.page {
            Some(page) => Some(page_endpoint(&config.docs.dir, page)?),
            None => None,
        };

        let method: Method = self
            .method
            .as_deref()
            .or(endpoint.as_ref().map(|(method, _)| method.as_str()))
            .unwrap_or("GET")
            .parse()?;

        let target = match (&self.url, &endpoint) {
            (Some(url), _) => url.clone(),
            (None, Some((_, path))) => path.clone(),
            (None, None) => bail!("Pass --page <path> or --url <url>"),
        };

        let base_url = match self.base_url.clone().or_else(|| config.playground.base_url.clone()) {
            Some(base_url) => Some(base_url),
            None => manifest_base_url(config)?,
        };

        let url = endpoint_url(base_url.as_deref(), &target);
        let mut request = RequestDescriptor::seeded(method, url, &config.playground_defaults());

        for raw in &self.headers {
            let (name, value) = parse_header(raw)?;
            if value.is_empty() {
                request.remove_header(&name);
            } else {
                request.set_header(&name, &value);
            }
        }
        if let Some(data) = &self.data {
            request.set_body(data.clone());
        }

        Ok(request)
    }
}

/// Method and path from a page's `api` front-matter.
fn page_endpoint(content_dir: &Path, page: &str) -> Result<(String, String)> {
    let path = ["mdx", "md"]
        .iter()
        .map(|ext| content_dir.join(format!("{}.{}", page, ext)))
        .find(|path| path.is_file())
        .with_context(|| format!("No content file for page '{}'", page))?;

    let source =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = parse_mdx(&source).with_context(|| format!("Failed to parse {}", path.display()))?;

    doc.frontmatter
        .as_ref()
        .and_then(|f| f.endpoint())
        .map(|(method, path)| (method.to_string(), path.to_string()))
        .with_context(|| format!("{} has no `api` front-matter", path.display()))
}

fn manifest_base_url(config: &ConfigFile) -> Result<Option<String>> {
    let path = config.manifest_path();
    if !path.is_file() {
        return Ok(None);
    }
    Ok(Manifest::load(&path)?.api.base_url)
}

/// Run the try command.
pub async fn run(config: &ConfigFile, args: &RequestArgs, show_headers: bool) -> Result<()> {
    let request = args.resolve(config)?;

    if !request.url().starts_with("http://") && !request.url().starts_with("https://") {
        bail!(
            "'{}' is not an absolute URL; pass --base-url or set api.baseUrl in the manifest",
            request.url()
        );
    }

    tracing::info!("{} {}", request.method(), request.url());

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")?;

    let mut playground = Playground::from_request(request).with_client(client);
    let response = playground.submit().await;

    println!("{} {}", response.status, response.status_text);
    if show_headers {
        println!("{}", response.display_headers());
    }
    println!("{}", response.display_body());

    if response.is_network_error() {
        bail!("Request did not complete");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    fn site() -> (TempDir, ConfigFile) {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("docs.json"),
            r#"{ "name": "Acme", "api": { "baseUrl": "https://api.acme.test" } }"#,
        )
        .unwrap();
        fs::create_dir_all(temp.path().join("api")).unwrap();
        fs::write(
            temp.path().join("api/chat.mdx"),
            "---\ntitle: Chat\napi: POST /v1/chat\n---\n# Chat\n",
        )
        .unwrap();
        fs::write(temp.path().join("api/notes.md"), "# Notes\n").unwrap();

        let mut config = ConfigFile::default();
        config.docs.dir = temp.path().to_path_buf();
        (temp, config)
    }

    #[test]
    fn resolves_page_endpoint() {
        let (_temp, config) = site();
        let args = RequestArgs {
            page: Some("api/chat".to_string()),
            ..Default::default()
        };

        let request = args.resolve(&config).unwrap();

        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.url(), "https://api.acme.test/v1/chat");
        assert_eq!(request.header("authorization"), Some("Bearer YOUR_API_KEY"));
        assert!(!request.body().is_empty());
    }

    #[test]
    fn flags_override_page_and_defaults() {
        let (_temp, mut config) = site();
        config.playground.base_url = Some("https://staging.acme.test/".to_string());
        let args = RequestArgs {
            page: Some("api/chat".to_string()),
            method: Some("put".to_string()),
            headers: vec!["authorization: Bearer real".to_string(), "X-Trace: 1".to_string()],
            data: Some(r#"{"message":"hi"}"#.to_string()),
            ..Default::default()
        };

        let request = args.resolve(&config).unwrap();

        assert_eq!(request.method(), Method::Put);
        assert_eq!(request.url(), "https://staging.acme.test/v1/chat");
        assert_eq!(request.header("Authorization"), Some("Bearer real"));
        assert_eq!(request.header("x-trace"), Some("1"));
        assert_eq!(request.body(), r#"{"message":"hi"}"#);
    }

    #[test]
    fn explicit_url_without_page() {
        let config = ConfigFile {
            docs: crate::config::DocsConfig {
                dir: PathBuf::from("/nonexistent"),
                ..Default::default()
            },
            ..Default::default()
        };
        let args = RequestArgs {
            url: Some("http://localhost:8080/health".to_string()),
            ..Default::default()
        };

        let request = args.resolve(&config).unwrap();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.url(), "http://localhost:8080/health");
        assert_eq!(request.prepare().body, None);
    }

    #[test]
    fn rejects_missing_target() {
        let (_temp, config) = site();

        assert!(RequestArgs::default().resolve(&config).is_err());
    }

    #[test]
    fn rejects_page_without_endpoint() {
        let (_temp, config) = site();
        let args = RequestArgs {
            page: Some("api/notes".to_string()),
            ..Default::default()
        };

        let err = args.resolve(&config).unwrap_err();

        assert!(err.to_string().contains("no `api` front-matter"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let args = RequestArgs {
            url: Some(format!("http://{}/v1/ping", addr)),
            ..Default::default()
        };

        assert!(run(&ConfigFile::default(), &args, false).await.is_err());
    }

    #[tokio::test]
    async fn sends_request_to_server() {
        let app = axum::Router::new().route(
            "/v1/ping",
            axum::routing::get(|| async { axum::Json(serde_json::json!({ "ok": true })) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let args = RequestArgs {
            url: Some(format!("http://{}/v1/ping", addr)),
            ..Default::default()
        };

        run(&ConfigFile::default(), &args, true).await.unwrap();
    }

    #[test]
    fn empty_header_value_removes_default() {
        let (_temp, config) = site();
        let args = RequestArgs {
            page: Some("api/chat".to_string()),
            headers: vec!["Authorization:".to_string()],
            ..Default::default()
        };

        let request = args.resolve(&config).unwrap();

        assert_eq!(request.header("authorization"), None);
        assert_eq!(request.header("content-type"), Some("application/json"));
    }
}
