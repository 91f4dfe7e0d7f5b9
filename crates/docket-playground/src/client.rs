//! Sending prepared requests and capturing responses.

use std::collections::BTreeMap;

use reqwest::Client;
use serde_json::{json, Value};

use crate::request::PreparedRequest;

/// Response body as captured for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

/// A captured response, or the synthetic network-error response.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaygroundResponse {
    /// HTTP status code, 0 for network errors
    pub status: u16,
    pub status_text: String,
    /// Response headers; repeated headers are joined with `, `
    pub headers: BTreeMap<String, String>,
    pub body: ResponseBody,
}

impl PlaygroundResponse {
    /// Synthetic response shown when the request could not complete.
    pub fn network_error(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            status_text: "Network Error".to_string(),
            headers: BTreeMap::new(),
            body: ResponseBody::Json(json!({ "error": message.into() })),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_network_error(&self) -> bool {
        self.status == 0
    }

    /// Body formatted for display: pretty JSON or the raw text.
    pub fn display_body(&self) -> String {
        match &self.body {
            ResponseBody::Json(value) => pretty_json(value),
            ResponseBody::Text(text) => text.clone(),
        }
    }

    /// Headers formatted as a pretty JSON object.
    pub fn display_headers(&self) -> String {
        pretty_json(&json!(self.headers))
    }
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[derive(Debug, thiserror::Error)]
enum SendError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON response: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Send a prepared request.
///
/// Never fails: transport and JSON decoding failures are reported as a
/// [`PlaygroundResponse::network_error`].
pub async fn send(client: &Client, request: &PreparedRequest) -> PlaygroundResponse {
    match try_send(client, request).await {
        Ok(response) => {
            tracing::debug!(
                "{} {} -> {} {}",
                request.method,
                request.url,
                response.status,
                response.status_text
            );
            response
        }
        Err(e) => {
            tracing::warn!("{} {} failed: {}", request.method, request.url, e);
            PlaygroundResponse::network_error(e.to_string())
        }
    }
}

async fn try_send(client: &Client, request: &PreparedRequest) -> Result<PlaygroundResponse, SendError> {
    let method = match request.method {
        crate::Method::Get => reqwest::Method::GET,
        crate::Method::Post => reqwest::Method::POST,
        crate::Method::Put => reqwest::Method::PUT,
        crate::Method::Delete => reqwest::Method::DELETE,
    };

    let mut builder = client.request(method, &request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &request.body {
        builder = builder.body(body.clone());
    }

    let response = builder.send().await?;

    let status = response.status();
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in response.headers() {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    let is_json = headers
        .get("content-type")
        .is_some_and(|ct| ct.contains("application/json"));

    let text = response.text().await?;
    let body = if is_json {
        ResponseBody::Json(serde_json::from_str(&text)?)
    } else {
        ResponseBody::Text(text)
    };

    Ok(PlaygroundResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        headers,
        body,
    })
}
