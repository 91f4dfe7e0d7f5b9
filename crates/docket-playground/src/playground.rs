//! Interactive playground state.

use reqwest::Client;

use crate::client::{send, PlaygroundResponse};
use crate::request::{Method, PlaygroundDefaults, RequestDescriptor};
use crate::snippet::{SnippetError, SnippetLanguage, SnippetRenderer};

/// A request console bound to one documented endpoint.
///
/// Submitting takes `&mut self`, so a playground never has more than one
/// request in flight and a late response cannot overwrite a newer one.
#[derive(Debug)]
pub struct Playground {
    request: RequestDescriptor,
    client: Client,
    response: Option<PlaygroundResponse>,
}

impl Playground {
    /// Create a playground seeded with the default headers and body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self::with_defaults(method, url, &PlaygroundDefaults::default())
    }

    pub fn with_defaults(method: Method, url: impl Into<String>, defaults: &PlaygroundDefaults) -> Self {
        Self::from_request(RequestDescriptor::seeded(method, url, defaults))
    }

    pub fn from_request(request: RequestDescriptor) -> Self {
        Self {
            request,
            client: Client::new(),
            response: None,
        }
    }

    /// Use a preconfigured HTTP client (user agent, proxies, TLS roots).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut RequestDescriptor {
        &mut self.request
    }

    /// The response of the last completed submission.
    pub fn response(&self) -> Option<&PlaygroundResponse> {
        self.response.as_ref()
    }

    /// Send the current request and record its response.
    pub async fn submit(&mut self) -> &PlaygroundResponse {
        self.response = None;
        let prepared = self.request.prepare();
        let response = send(&self.client, &prepared).await;
        self.response.insert(response)
    }

    /// Render the current request as a code snippet.
    pub fn snippet(&self, language: SnippetLanguage) -> Result<String, SnippetError> {
        SnippetRenderer::new().render(language, &self.request.prepare())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_without_response() {
        let playground = Playground::new(Method::Post, "https://api.example.com/v1/chat");

        assert!(playground.response().is_none());
        assert_eq!(playground.request().method(), Method::Post);
        assert!(!playground.request().body().is_empty());
    }

    #[test]
    fn snippets_follow_edits() {
        let mut playground = Playground::new(Method::Get, "https://api.example.com/v1/ping");
        playground
            .request_mut()
            .set_url("https://staging.example.com/v1/ping");

        let code = playground.snippet(SnippetLanguage::Curl).unwrap();

        assert!(code.contains("https://staging.example.com/v1/ping"));
    }

    #[tokio::test]
    async fn submits_with_configured_client() {
        let app = axum::Router::new().route(
            "/agent",
            axum::routing::get(|headers: axum::http::HeaderMap| async move {
                headers
                    .get("user-agent")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Client::builder().user_agent("docket-test").build().unwrap();
        let mut playground =
            Playground::new(Method::Get, format!("http://{}/agent", addr)).with_client(client);

        assert_eq!(playground.submit().await.display_body(), "docket-test");
    }

    #[tokio::test]
    async fn records_network_errors() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut playground = Playground::new(Method::Get, format!("http://{}/", addr));
        let status = playground.submit().await.status;

        assert_eq!(status, 0);
        assert_eq!(
            playground.response().map(|r| r.status_text.as_str()),
            Some("Network Error")
        );
    }
}
