//! Frontmatter extraction and parsing.

use serde::Deserialize;

/// Parsed frontmatter from a content page.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    /// Page title
    #[serde(default)]
    pub title: Option<String>,

    /// Page description, emitted as a meta tag
    #[serde(default)]
    pub description: Option<String>,

    /// Shorter label used in the sidebar
    #[serde(default)]
    pub sidebar_title: Option<String>,

    /// Documented endpoint, e.g. `POST /v1/chat/completions`
    #[serde(default)]
    pub api: Option<String>,
}

impl Frontmatter {
    /// Split the `api` field into its method and path parts.
    ///
    /// A bare path without a method is treated as `GET`.
    pub fn endpoint(&self) -> Option<(&str, &str)> {
        let api = self.api.as_deref()?.trim();
        if api.is_empty() {
            return None;
        }

        match api.split_once(char::is_whitespace) {
            Some((method, path)) => Some((method, path.trim())),
            None => Some(("GET", api)),
        }
    }
}

/// Extract frontmatter from page content.
///
/// A block is recognised only when the first line is exactly `---` and a
/// later line is exactly `---`. Anything else, such as a page opening with
/// a thematic break, is returned unchanged as body content.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let Some(block) = after_opening_fence(source) else {
        return Ok((None, source));
    };

    let mut offset = 0;
    for line in block.split_inclusive('\n') {
        if is_fence(line) {
            let yaml_content = block[..offset].trim();
            let remaining = &block[offset + line.len()..];

            // Empty and comment-only blocks deserialize as YAML null.
            let frontmatter = if yaml_content.is_empty() {
                Frontmatter::default()
            } else {
                serde_yaml::from_str::<Option<Frontmatter>>(yaml_content)
                    .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?
                    .unwrap_or_default()
            };

            return Ok((Some(frontmatter), remaining.trim_start()));
        }
        offset += line.len();
    }

    Ok((None, source))
}

fn after_opening_fence(source: &str) -> Option<&str> {
    let (first, rest) = source.split_once('\n')?;
    is_fence(first).then_some(rest)
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
title: Login
description: Exchange credentials for a token
sidebarTitle: Log in
api: POST /v1/auth/login
---

# Login
"#;

        let (fm, content) = extract_frontmatter(source).unwrap();
        let fm = fm.unwrap();

        assert_eq!(fm.title.as_deref(), Some("Login"));
        assert_eq!(
            fm.description.as_deref(),
            Some("Exchange credentials for a token")
        );
        assert_eq!(fm.sidebar_title.as_deref(), Some("Log in"));
        assert_eq!(fm.endpoint(), Some(("POST", "/v1/auth/login")));
        assert!(content.starts_with("# Login"));
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert!(fm.is_none());
        assert_eq!(content, source);
    }

    #[test]
    fn all_keys_are_optional() {
        let (fm, content) = extract_frontmatter("---\n---\nBody").unwrap();

        assert_eq!(fm, Some(Frontmatter::default()));
        assert_eq!(content, "Body");
    }

    #[test]
    fn bare_api_path_defaults_to_get() {
        let fm = Frontmatter {
            api: Some("/v1/ping".to_string()),
            ..Default::default()
        };

        assert_eq!(fm.endpoint(), Some(("GET", "/v1/ping")));
    }

    #[test]
    fn leading_thematic_break_is_body_content() {
        let source = "---\n\n# Title\n\nBody\n";

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert!(fm.is_none());
        assert_eq!(content, source);
    }

    #[test]
    fn closing_marker_must_be_exactly_three_dashes() {
        let source = "---\ntitle: Test\n----\nBody";

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert!(fm.is_none());
        assert_eq!(content, source);
    }

    #[test]
    fn opening_marker_must_be_exactly_three_dashes() {
        let source = "----\ntitle: Test\n---\nBody";

        let (fm, _) = extract_frontmatter(source).unwrap();

        assert!(fm.is_none());
    }

    #[test]
    fn accepts_crlf_line_endings() {
        let (fm, content) = extract_frontmatter("---\r\ntitle: Test\r\n---\r\nBody").unwrap();

        assert_eq!(fm.unwrap().title.as_deref(), Some("Test"));
        assert_eq!(content, "Body");
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }
}
