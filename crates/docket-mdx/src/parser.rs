//! Page parsing and Markdown rendering.

use std::collections::HashSet;

use pulldown_cmark::{html, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
use crate::highlight::code_block;
use crate::slug::HeadingIds;

/// A parsed content page.
#[derive(Debug, Clone)]
pub struct ParsedDoc {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Markdown body without frontmatter and ESM lines
    pub content: String,
}

impl ParsedDoc {
    /// Title declared in frontmatter.
    pub fn title(&self) -> Option<&str> {
        self.frontmatter.as_ref().and_then(|f| f.title.as_deref())
    }

    /// Sidebar label declared in frontmatter, falling back to the title.
    pub fn sidebar_title(&self) -> Option<&str> {
        self.frontmatter
            .as_ref()
            .and_then(|f| f.sidebar_title.as_deref())
            .or_else(|| self.title())
    }

    pub fn description(&self) -> Option<&str> {
        self.frontmatter.as_ref().and_then(|f| f.description.as_deref())
    }
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (2 or 3)
    pub level: u8,
}

/// Options controlling how a page body is rendered.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Relative prefix from the page back to the site root, e.g. `../`.
    pub root: String,
}

/// Rendered page body.
#[derive(Debug, Clone)]
pub struct RenderedDoc {
    pub html: String,
    /// Entries for every h2/h3 heading, in document order
    pub toc: Vec<TocEntry>,
    /// Text of the first h1 heading
    pub first_heading: Option<String>,
}

/// Errors that can occur when parsing a page.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Parse a Markdown/MDX page.
pub fn parse_mdx(source: &str) -> Result<ParsedDoc, ParseError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    Ok(ParsedDoc {
        frontmatter,
        content: strip_esm(content),
    })
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Render a Markdown body to HTML.
///
/// h2 and h3 headings get unique anchor ids and are collected into the
/// table of contents. Fenced code blocks with a language are highlighted.
/// Root-relative links are rewritten relative to `options.root`.
pub fn render_markdown(content: &str, options: &RenderOptions) -> RenderedDoc {
    let events: Vec<Event> = Parser::new_ext(content, markdown_options())
        .map(|event| rewrite_event(event, &options.root))
        .collect();
    let mut events = highlight_code_blocks(events);

    let mut ids = HeadingIds::new();
    for event in &events {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            ids.reserve(id);
        }
    }

    let mut explicit = HashSet::new();
    let mut toc = Vec::new();
    let mut first_heading = None;
    let mut ordinal = 0;
    let mut i = 0;

    while i < events.len() {
        let level = match &events[i] {
            Event::Start(Tag::Heading { level, .. }) => *level,
            _ => {
                i += 1;
                continue;
            }
        };
        ordinal += 1;

        let mut text = String::new();
        let mut end = i + 1;
        while end < events.len() {
            match &events[end] {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
            end += 1;
        }
        let text = text.trim().to_string();

        if level == HeadingLevel::H1 && first_heading.is_none() && !text.is_empty() {
            first_heading = Some(text.clone());
        }

        let in_toc = matches!(level, HeadingLevel::H2 | HeadingLevel::H3) && !text.is_empty();
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            // The first heading with an explicit id keeps it; repeats are suffixed.
            let anchor = match id.as_deref() {
                Some(existing) if explicit.insert(existing.to_string()) => {
                    Some(existing.to_string())
                }
                Some(existing) => Some(ids.claim(existing)),
                None if in_toc => Some(ids.assign(&text, ordinal)),
                None => None,
            };

            if let Some(anchor) = anchor {
                *id = Some(anchor.clone().into());
                if in_toc {
                    toc.push(TocEntry {
                        title: text,
                        id: anchor,
                        level: level as u8,
                    });
                }
            }
        }

        i = end + 1;
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    RenderedDoc {
        html: html_output,
        toc,
        first_heading,
    }
}

/// Replace fenced code blocks that name a language with highlighted HTML.
fn highlight_code_blocks(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut block: Option<(String, String)> = None;

    for event in events {
        if let Some((lang, code)) = &mut block {
            match event {
                Event::Text(text) => code.push_str(&text),
                Event::End(TagEnd::CodeBlock) => {
                    out.push(Event::Html(code_block(code, lang).into()));
                    block = None;
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                if !fence_language(&info).is_empty() =>
            {
                block = Some((fence_language(&info).to_string(), String::new()));
            }
            other => out.push(other),
        }
    }

    out
}

/// Language token of a fence info string, e.g. `bash` for "bash {1,3}".
fn fence_language(info: &str) -> &str {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .unwrap_or("")
}

fn rewrite_event<'a>(event: Event<'a>, root: &str) -> Event<'a> {
    match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = match rewrite_link(&dest_url, root) {
                Some(rewritten) => rewritten.into(),
                None => dest_url,
            };
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = match rewrite_asset(&dest_url, root) {
                Some(rewritten) => rewritten.into(),
                None => dest_url,
            };
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        other => other,
    }
}

/// Rewrite a root-relative page link (`/auth/login?tab=curl#errors`) to a
/// relative `.html` link. Returns `None` for links that are left untouched.
pub fn rewrite_link(dest: &str, root: &str) -> Option<String> {
    let path = dest.strip_prefix('/')?;
    if path.starts_with('/') {
        return None;
    }

    let (path, fragment) = match path.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (path, None),
    };
    let (path, query) = match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    };

    let mut rewritten = String::from(root);
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        rewritten.push_str("index.html");
    } else {
        rewritten.push_str(path);
        let last = path.rsplit('/').next().unwrap_or(path);
        if !last.contains('.') {
            rewritten.push_str(".html");
        }
    }

    if let Some(query) = query {
        rewritten.push('?');
        rewritten.push_str(query);
    }
    if let Some(fragment) = fragment {
        rewritten.push('#');
        rewritten.push_str(fragment);
    }

    Some(rewritten)
}

fn rewrite_asset(dest: &str, root: &str) -> Option<String> {
    let path = dest.strip_prefix('/')?;
    if path.starts_with('/') {
        return None;
    }
    Some(format!("{}{}", root, path))
}

/// Drop top-level MDX `import`/`export` statements outside code fences.
fn strip_esm(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut fence: Option<&str> = None;
    let mut depth = 0;

    for line in content.lines() {
        let trimmed = line.trim_start();

        if depth > 0 {
            depth += brace_balance(line);
            continue;
        }

        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
        } else if trimmed.starts_with("```") {
            fence = Some("```");
        } else if trimmed.starts_with("~~~") {
            fence = Some("~~~");
        } else if line.starts_with("import ") || line.starts_with("export ") {
            depth = brace_balance(line).max(0);
            continue;
        }

        out.push_str(line);
        out.push('\n');
    }

    out
}

/// Opening minus closing braces on a line.
fn brace_balance(line: &str) -> i32 {
    line.chars().fold(0, |balance, c| match c {
        '{' => balance + 1,
        '}' => balance - 1,
        _ => balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(content: &str) -> RenderedDoc {
        render_markdown(content, &RenderOptions::default())
    }

    #[test]
    fn parses_complete_page() {
        let source = r#"---
title: Login
description: Authenticate a user
---

# Login

Exchange credentials for a token.

## Request

```bash
curl -X POST /v1/auth/login
```

### Errors
"#;

        let doc = parse_mdx(source).unwrap();
        assert_eq!(doc.title(), Some("Login"));
        assert_eq!(doc.description(), Some("Authenticate a user"));

        let rendered = render(&doc.content);
        assert!(rendered.html.contains("<h1>Login</h1>"));
        assert!(rendered.html.contains(r#"<h2 id="request">Request</h2>"#));
        assert!(rendered.html.contains(r#"<h3 id="errors">Errors</h3>"#));
        assert_eq!(rendered.first_heading.as_deref(), Some("Login"));

        assert_eq!(rendered.toc.len(), 2);
        assert_eq!(rendered.toc[0].id, "request");
        assert_eq!(rendered.toc[0].level, 2);
        assert_eq!(rendered.toc[1].title, "Errors");
        assert_eq!(rendered.toc[1].level, 3);
    }

    #[test]
    fn toc_skips_other_heading_levels() {
        let rendered = render("# Title\n\n#### Deep\n\n## Shallow");

        assert_eq!(rendered.toc.len(), 1);
        assert_eq!(rendered.toc[0].title, "Shallow");
        assert!(rendered.html.contains("<h4>Deep</h4>"));
    }

    #[test]
    fn duplicate_headings_get_unique_ids() {
        let rendered = render("## FAQ\n\n## FAQ\n\n### FAQ");

        let ids: Vec<_> = rendered.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["faq", "faq-1", "faq-2"]);
        assert!(rendered.html.contains(r#"<h2 id="faq-1">FAQ</h2>"#));
    }

    #[test]
    fn heading_text_includes_inline_code() {
        let rendered = render("## Install `docket`");

        assert_eq!(rendered.toc[0].title, "Install docket");
        assert_eq!(rendered.toc[0].id, "install-docket");
    }

    #[test]
    fn keeps_explicit_heading_ids() {
        let rendered = render("## Setup {#setup}\n\n## Setup");

        assert_eq!(rendered.toc[0].id, "setup");
        assert_eq!(rendered.toc[1].id, "setup-1");
    }

    #[test]
    fn repeated_explicit_ids_are_suffixed() {
        let rendered = render("## A {#x}\n\n## B {#x}\n\n## C");

        let ids: Vec<_> = rendered.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "x-1", "c"]);
        assert!(rendered.html.contains(r#"<h2 id="x">A</h2>"#));
        assert!(rendered.html.contains(r#"<h2 id="x-1">B</h2>"#));
    }

    #[test]
    fn fallback_ids_count_every_heading() {
        let rendered = render("# Title\n\n## 🎉\n\n#### Deep\n\n### ✨");

        let ids: Vec<_> = rendered.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["heading-2", "heading-4"]);
    }

    #[test]
    fn hyphens_are_dropped_from_anchor_ids() {
        let rendered = render("## Rate-limit errors");

        assert_eq!(rendered.toc[0].id, "ratelimit-errors");
    }

    #[test]
    fn highlights_fenced_code_with_language() {
        let rendered = render("```json\n{\"ok\": true}\n```\n\n```\nplain <text>\n```");

        assert!(rendered.html.contains(r#"<pre><code class="language-json"><span class="hl-"#));
        assert!(rendered.html.contains("<pre><code>plain &lt;text&gt;\n</code></pre>"));
    }

    #[test]
    fn fence_language_ignores_attributes() {
        assert_eq!(fence_language("bash {1,3}"), "bash");
        assert_eq!(fence_language("js,title=x"), "js");
        assert_eq!(fence_language(""), "");
    }

    #[test]
    fn rewrites_root_relative_links() {
        let options = RenderOptions {
            root: "../".to_string(),
        };
        let rendered = render_markdown(
            "[Login](/auth/login#errors) [Home](/) [Site](https://example.com) ![Logo](/images/logo.png)",
            &options,
        );

        assert!(rendered.html.contains(r#"href="../auth/login.html#errors""#));
        assert!(rendered.html.contains(r#"href="../index.html""#));
        assert!(rendered.html.contains(r#"href="https://example.com""#));
        assert!(rendered.html.contains(r#"src="../images/logo.png""#));
    }

    #[test]
    fn rewrite_link_keeps_query_strings() {
        assert_eq!(
            rewrite_link("/auth/login?tab=curl#errors", "../"),
            Some("../auth/login.html?tab=curl#errors".to_string())
        );
        assert_eq!(
            rewrite_link("/?lang=go", ""),
            Some("index.html?lang=go".to_string())
        );
    }

    #[test]
    fn rewrite_link_keeps_file_extensions() {
        assert_eq!(
            rewrite_link("/openapi.json", ""),
            Some("openapi.json".to_string())
        );
        assert_eq!(rewrite_link("//cdn.example.com/x", ""), None);
        assert_eq!(rewrite_link("relative/page", ""), None);
    }

    #[test]
    fn strips_esm_statements_outside_fences() {
        let source = "import { Card } from '@/components'\nexport const meta = {}\n\n# Page\n\n```js\nimport x from 'y'\n```\n";

        let doc = parse_mdx(source).unwrap();

        assert!(!doc.content.contains("@/components"));
        assert!(!doc.content.contains("export const"));
        assert!(doc.content.contains("import x from 'y'"));
    }

    #[test]
    fn strips_multiline_imports() {
        let source = "import {\n  Card,\n  Tabs,\n} from '@/components'\n\nBody text\n";

        let doc = parse_mdx(source).unwrap();

        assert_eq!(doc.content.trim(), "Body text");
    }

    #[test]
    fn strips_exports_with_nested_objects() {
        let source = "export const meta = {\n  author: { name: \"x\" },\n  tags: []\n}\n\n# Page\n";

        let doc = parse_mdx(source).unwrap();

        assert_eq!(doc.content, "\n# Page\n");
    }

    #[test]
    fn page_opening_with_thematic_break_parses() {
        let doc = parse_mdx("---\n\n# Title\n\nBody\n").unwrap();

        assert!(doc.frontmatter.is_none());
        let rendered = render(&doc.content);
        assert!(rendered.html.starts_with("<hr />"));
        assert_eq!(rendered.first_heading.as_deref(), Some("Title"));
    }

    #[test]
    fn parses_without_frontmatter() {
        let doc = parse_mdx("# Just Markdown\n\nNo frontmatter.").unwrap();

        assert!(doc.frontmatter.is_none());
        assert_eq!(doc.title(), None);
        assert_eq!(
            render(&doc.content).first_heading.as_deref(),
            Some("Just Markdown")
        );
    }
}
