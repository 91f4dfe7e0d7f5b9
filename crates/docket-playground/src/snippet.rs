//! Code snippet generation.
//!
//! Each target language is a single template rendered from a
//! [`PreparedRequest`]. Values are escaped for the target language by the
//! `sq` (POSIX single-quoted) and `quote` (JSON string literal) filters.

use std::fmt;
use std::str::FromStr;

use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;

use crate::request::PreparedRequest;

/// Target language of a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetLanguage {
    Curl,
    Python,
    JavaScript,
    Go,
    Java,
}

impl SnippetLanguage {
    pub const ALL: [SnippetLanguage; 5] = [
        Self::Curl,
        Self::Python,
        Self::JavaScript,
        Self::Go,
        Self::Java,
    ];

    /// Stable identifier, also the template name.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Curl => "curl",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Go => "go",
            Self::Java => "java",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Curl => "cURL",
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
            Self::Go => "Go",
            Self::Java => "Java",
        }
    }

    /// Language name for `language-*` highlighting classes.
    pub fn highlight(&self) -> &'static str {
        match self {
            Self::Curl => "bash",
            other => other.id(),
        }
    }

    fn template(&self) -> &'static str {
        match self {
            Self::Curl => CURL_TEMPLATE,
            Self::Python => PYTHON_TEMPLATE,
            Self::JavaScript => JAVASCRIPT_TEMPLATE,
            Self::Go => GO_TEMPLATE,
            Self::Java => JAVA_TEMPLATE,
        }
    }
}

impl fmt::Display for SnippetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SnippetLanguage {
    type Err = SnippetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "curl" | "shell" | "bash" => Ok(Self::Curl),
            "python" | "py" => Ok(Self::Python),
            "javascript" | "js" => Ok(Self::JavaScript),
            "go" | "golang" => Ok(Self::Go),
            "java" => Ok(Self::Java),
            _ => Err(SnippetError::UnknownLanguage(s.to_string())),
        }
    }
}

/// Errors that can occur when rendering snippets.
#[derive(Debug, thiserror::Error)]
pub enum SnippetError {
    #[error("Unknown snippet language: {0}")]
    UnknownLanguage(String),

    #[error("Failed to render snippet: {0}")]
    Template(#[from] minijinja::Error),
}

/// A rendered snippet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snippet {
    pub language: SnippetLanguage,
    pub code: String,
}

#[derive(Debug, Serialize)]
struct HeaderContext<'a> {
    name: &'a str,
    value: &'a str,
}

/// Renders requests with the per-language templates.
pub struct SnippetRenderer {
    env: Environment<'static>,
}

impl SnippetRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.set_loader(|name| {
            Ok(SnippetLanguage::ALL
                .iter()
                .find(|lang| lang.id() == name)
                .map(|lang| lang.template().to_string()))
        });
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("sq", shell_quote);
        env.add_filter("quote", string_literal);

        Self { env }
    }

    /// Render a request in one language.
    pub fn render(
        &self,
        language: SnippetLanguage,
        request: &PreparedRequest,
    ) -> Result<String, SnippetError> {
        let headers: Vec<HeaderContext> = request
            .headers
            .iter()
            .map(|(name, value)| HeaderContext { name, value })
            .collect();

        let tmpl = self.env.get_template(language.id())?;
        let code = tmpl.render(context! {
            method => request.method.as_str(),
            url => &request.url,
            headers => headers,
            body => &request.body,
        })?;

        Ok(code)
    }

    /// Render a request in every supported language.
    pub fn render_all(&self, request: &PreparedRequest) -> Result<Vec<Snippet>, SnippetError> {
        SnippetLanguage::ALL
            .iter()
            .map(|&language| {
                Ok(Snippet {
                    language,
                    code: self.render(language, request)?,
                })
            })
            .collect()
    }
}

impl Default for SnippetRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// POSIX shell single-quoting.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Double-quoted string literal, valid in Python, JavaScript, Go and Java.
fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

const CURL_TEMPLATE: &str = r#"curl --request {{ method }} \
  --url {{ url | sq }}
{%- for header in headers %} \
  --header {{ (header.name ~ ": " ~ header.value) | sq }}
{%- endfor %}
{%- if body %} \
  --data {{ body | sq }}
{%- endif %}"#;

const PYTHON_TEMPLATE: &str = r#"import requests

url = {{ url | quote }}

headers = {
{%- for header in headers %}
    {{ header.name | quote }}: {{ header.value | quote }},
{%- endfor %}
}
{%- if body %}

payload = {{ body | quote }}

response = requests.request({{ method | quote }}, url, headers=headers, data=payload)
{%- else %}

response = requests.request({{ method | quote }}, url, headers=headers)
{%- endif %}

print(response.status_code)
print(response.text)"#;

const JAVASCRIPT_TEMPLATE: &str = r#"const url = {{ url | quote }};

const options = {
  method: {{ method | quote }},
  headers: {
{%- for header in headers %}
    {{ header.name | quote }}: {{ header.value | quote }},
{%- endfor %}
  },
{%- if body %}
  body: {{ body | quote }},
{%- endif %}
};

fetch(url, options)
  .then((res) => res.text())
  .then((text) => console.log(text))
  .catch((err) => console.error(err));"#;

const GO_TEMPLATE: &str = r#"package main

import (
	"fmt"
	"io"
	"net/http"
{%- if body %}
	"strings"
{%- endif %}
)

func main() {
	url := {{ url | quote }}
{%- if body %}
	payload := strings.NewReader({{ body | quote }})

	req, err := http.NewRequest({{ method | quote }}, url, payload)
{%- else %}

	req, err := http.NewRequest({{ method | quote }}, url, nil)
{%- endif %}
	if err != nil {
		fmt.Println(err)
		return
	}
{%- for header in headers %}
	req.Header.Add({{ header.name | quote }}, {{ header.value | quote }})
{%- endfor %}

	res, err := http.DefaultClient.Do(req)
	if err != nil {
		fmt.Println(err)
		return
	}
	defer res.Body.Close()

	body, _ := io.ReadAll(res.Body)
	fmt.Println(res.StatusCode)
	fmt.Println(string(body))
}"#;

const JAVA_TEMPLATE: &str = r#"import java.net.URI;
import java.net.http.HttpClient;
import java.net.http.HttpRequest;
import java.net.http.HttpResponse;

public class ApiRequest {
    public static void main(String[] args) throws Exception {
        HttpClient client = HttpClient.newHttpClient();

        HttpRequest request = HttpRequest.newBuilder()
                .uri(URI.create({{ url | quote }}))
{%- for header in headers %}
                .header({{ header.name | quote }}, {{ header.value | quote }})
{%- endfor %}
{%- if body %}
                .method({{ method | quote }}, HttpRequest.BodyPublishers.ofString({{ body | quote }}))
{%- else %}
                .method({{ method | quote }}, HttpRequest.BodyPublishers.noBody())
{%- endif %}
                .build();

        HttpResponse<String> response = client.send(request, HttpResponse.BodyHandlers.ofString());

        System.out.println(response.statusCode());
        System.out.println(response.body());
    }
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Method, RequestDescriptor};
    use pretty_assertions::assert_eq;

    fn post_request(body: &str) -> PreparedRequest {
        let mut request = RequestDescriptor::new(Method::Post, "https://api.example.com/v1/chat");
        request.set_header("Content-Type", "application/json");
        request.set_header("Authorization", "Bearer YOUR_API_KEY");
        request.set_body(body);
        request.prepare()
    }

    #[test]
    fn renders_curl() {
        let code = SnippetRenderer::new()
            .render(SnippetLanguage::Curl, &post_request(r#"{"a":1}"#))
            .unwrap();

        assert_eq!(
            code,
            "curl --request POST \\\n  --url 'https://api.example.com/v1/chat' \\\n  --header 'Content-Type: application/json' \\\n  --header 'Authorization: Bearer YOUR_API_KEY' \\\n  --data '{\"a\":1}'"
        );
    }

    #[test]
    fn curl_without_body_has_no_data_flag() {
        let request = RequestDescriptor::new(Method::Get, "https://api.example.com/v1/ping").prepare();

        let code = SnippetRenderer::new()
            .render(SnippetLanguage::Curl, &request)
            .unwrap();

        assert_eq!(
            code,
            "curl --request GET \\\n  --url 'https://api.example.com/v1/ping'"
        );
    }

    #[test]
    fn renders_python_headers_block() {
        let code = SnippetRenderer::new()
            .render(SnippetLanguage::Python, &post_request("{}"))
            .unwrap();

        assert!(code.contains(
            "headers = {\n    \"Content-Type\": \"application/json\",\n    \"Authorization\": \"Bearer YOUR_API_KEY\",\n}"
        ));
        assert!(code.contains("payload = \"{}\""));
        assert!(code.contains("requests.request(\"POST\", url, headers=headers, data=payload)"));
    }

    #[test]
    fn go_imports_strings_only_with_body() {
        let renderer = SnippetRenderer::new();
        let with_body = renderer.render(SnippetLanguage::Go, &post_request("{}")).unwrap();
        let without_body = renderer
            .render(
                SnippetLanguage::Go,
                &RequestDescriptor::new(Method::Delete, "https://api.example.com/v1/item").prepare(),
            )
            .unwrap();

        assert!(with_body.contains("\"strings\""));
        assert!(!without_body.contains("\"strings\""));
        assert!(without_body.contains("http.NewRequest(\"DELETE\", url, nil)"));
    }

    #[test]
    fn escapes_template_delimiters_in_body() {
        let body = "it's \"quoted\" `ticked` \"\"\" \\ done\nnext";
        let snippets = SnippetRenderer::new()
            .render_all(&post_request(body))
            .unwrap();

        assert_eq!(snippets.len(), 5);

        let curl = &snippets[0].code;
        assert!(curl.contains(r#"--data 'it'\''s "quoted" `ticked` """ \ done"#));

        let literal = r#""it's \"quoted\" `ticked` \"\"\" \\ done\nnext""#;
        for snippet in &snippets[1..] {
            assert!(
                snippet.code.contains(literal),
                "{} snippet did not escape body:\n{}",
                snippet.language,
                snippet.code
            );
        }
    }

    #[test]
    fn every_language_mentions_method_and_url() {
        let request = post_request("{}");
        for snippet in SnippetRenderer::new().render_all(&request).unwrap() {
            assert!(snippet.code.contains("https://api.example.com/v1/chat"));
            assert!(snippet.code.contains("POST"));
        }
    }

    #[test]
    fn parses_language_names() {
        assert_eq!("JS".parse::<SnippetLanguage>().unwrap(), SnippetLanguage::JavaScript);
        assert_eq!("golang".parse::<SnippetLanguage>().unwrap(), SnippetLanguage::Go);
        assert!("ruby".parse::<SnippetLanguage>().is_err());
    }

    #[test]
    fn string_literal_escapes_control_characters() {
        assert_eq!(string_literal("a\u{1}b"), "\"a\\u0001b\"");
    }
}
