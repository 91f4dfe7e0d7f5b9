//! Request descriptors and their preparation for sending.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// HTTP method supported by the playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether a request body is ever sent with this method.
    pub fn allows_body(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(RequestError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Errors raised while building a request.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Unsupported HTTP method: {0} (expected GET, POST, PUT or DELETE)")]
    UnsupportedMethod(String),

    #[error("Invalid header '{0}': expected 'Name: Value'")]
    InvalidHeader(String),
}

const DEFAULT_EXAMPLE_BODY: &str = r#"{
  "model": "default",
  "messages": [
    {
      "role": "user",
      "content": "Hello, how are you?"
    }
  ]
}"#;

/// Values a fresh playground is seeded with.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaygroundDefaults {
    pub content_type: String,
    pub authorization: String,
    /// Body used for methods other than GET
    pub example_body: String,
}

impl Default for PlaygroundDefaults {
    fn default() -> Self {
        Self {
            content_type: "application/json".to_string(),
            authorization: "Bearer YOUR_API_KEY".to_string(),
            example_body: DEFAULT_EXAMPLE_BODY.to_string(),
        }
    }
}

/// Editable state of a playground request.
///
/// The method is fixed at construction; URL, headers and body are editable.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl RequestDescriptor {
    /// Create an empty descriptor with no headers and no body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Create a descriptor seeded with content type, authorization and,
    /// for methods that carry one, an example body.
    pub fn seeded(method: Method, url: impl Into<String>, defaults: &PlaygroundDefaults) -> Self {
        let mut request = Self::new(method, url);
        request.set_header("Content-Type", &defaults.content_type);
        request.set_header("Authorization", &defaults.authorization);
        if method.allows_body() {
            request.body = defaults.example_body.clone();
        }
        request
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Look up a header value, ignoring name case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a header, replacing any existing header with the same name
    /// regardless of case.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(entry) => *entry = (name.to_string(), value.to_string()),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Remove a header regardless of case.
    pub fn remove_header(&mut self, name: &str) {
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
    }

    /// Resolve the editable state into the request that is actually sent.
    ///
    /// Headers with blank values are dropped. The body is omitted for GET
    /// and when empty.
    pub fn prepare(&self) -> PreparedRequest {
        let headers = self
            .headers
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .cloned()
            .collect();

        let body = if self.method.allows_body() && !self.body.is_empty() {
            Some(self.body.clone())
        } else {
            None
        };

        PreparedRequest {
            method: self.method,
            url: self.url.clone(),
            headers,
            body,
        }
    }
}

/// A request ready to be sent or rendered as a snippet.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Join an API base URL and an endpoint path.
///
/// Absolute endpoint URLs are returned unchanged.
pub fn endpoint_url(base_url: Option<&str>, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    match base_url {
        Some(base) if !base.is_empty() => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ),
        _ => path.to_string(),
    }
}

/// Parse a `Name: Value` header argument.
pub fn parse_header(raw: &str) -> Result<(String, String), RequestError> {
    let Some((name, value)) = raw.split_once(':') else {
        return Err(RequestError::InvalidHeader(raw.to_string()));
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(RequestError::InvalidHeader(raw.to_string()));
    }

    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_methods_case_insensitively() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("Delete".parse::<Method>().unwrap(), Method::Delete);
        assert!(matches!(
            "PATCH".parse::<Method>(),
            Err(RequestError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn seeds_headers_and_body() {
        let defaults = PlaygroundDefaults::default();
        let request = RequestDescriptor::seeded(Method::Post, "https://api.example.com", &defaults);

        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("Authorization"), Some("Bearer YOUR_API_KEY"));
        assert_eq!(request.body(), defaults.example_body);
    }

    #[test]
    fn get_is_seeded_without_body() {
        let request = RequestDescriptor::seeded(
            Method::Get,
            "https://api.example.com",
            &PlaygroundDefaults::default(),
        );

        assert_eq!(request.body(), "");
    }

    #[test]
    fn get_never_carries_a_body() {
        let mut request = RequestDescriptor::new(Method::Get, "https://api.example.com/v1/ping");
        request.set_body(r#"{"ignored":true}"#);

        assert_eq!(request.prepare().body, None);
    }

    #[test]
    fn empty_body_is_omitted() {
        let request = RequestDescriptor::new(Method::Post, "https://api.example.com");

        assert_eq!(request.prepare().body, None);
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut request = RequestDescriptor::seeded(
            Method::Post,
            "https://api.example.com",
            &PlaygroundDefaults::default(),
        );
        request.set_header("authorization", "Bearer real-token");

        assert_eq!(request.headers().len(), 2);
        assert_eq!(request.header("Authorization"), Some("Bearer real-token"));
    }

    #[test]
    fn remove_header_ignores_case() {
        let mut request = RequestDescriptor::seeded(
            Method::Post,
            "https://api.example.com",
            &PlaygroundDefaults::default(),
        );
        request.remove_header("AUTHORIZATION");

        assert_eq!(request.header("Authorization"), None);
        assert_eq!(request.headers().len(), 1);
    }

    #[test]
    fn prepare_drops_blank_headers() {
        let mut request = RequestDescriptor::new(Method::Post, "https://api.example.com");
        request.set_header("Content-Type", "application/json");
        request.set_header("X-Trace", "   ");

        let prepared = request.prepare();

        assert_eq!(
            prepared.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn joins_endpoint_urls() {
        assert_eq!(
            endpoint_url(Some("https://api.example.com/"), "/v1/ping"),
            "https://api.example.com/v1/ping"
        );
        assert_eq!(endpoint_url(None, "/v1/ping"), "/v1/ping");
        assert_eq!(
            endpoint_url(Some("https://api.example.com"), "http://other.test/x"),
            "http://other.test/x"
        );
    }

    #[test]
    fn parses_header_arguments() {
        assert_eq!(
            parse_header("Authorization: Bearer abc").unwrap(),
            ("Authorization".to_string(), "Bearer abc".to_string())
        );
        assert_eq!(
            parse_header("Accept:").unwrap(),
            ("Accept".to_string(), String::new())
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(": value").is_err());
    }
}
