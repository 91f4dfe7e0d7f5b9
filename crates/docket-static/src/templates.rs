//! Template engine for rendering documentation pages.

use minijinja::Environment;

/// A page link in the sidebar.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NavItem {
    /// Display title
    pub title: String,
    /// Output path relative to the site root, e.g. `auth/login.html`
    pub path: String,
    /// Manifest page path
    #[serde(skip)]
    pub page: String,
    /// Whether this is the active page
    pub active: bool,
}

/// A titled group of page links.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NavGroup {
    pub title: String,
    pub pages: Vec<NavItem>,
}

/// A top-level navigation tab.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NavTab {
    pub title: String,
    pub groups: Vec<NavGroup>,
}

/// Mark every sidebar entry for `page` as active.
pub fn with_active(nav: &[NavTab], page: &str) -> Vec<NavTab> {
    let mut nav = nav.to_vec();
    for item in nav
        .iter_mut()
        .flat_map(|tab| tab.groups.iter_mut())
        .flat_map(|group| group.pages.iter_mut())
    {
        item.active = item.page == page;
    }
    nav
}

/// A table of contents entry.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (2 or 3)
    pub level: u8,
}

/// The endpoint a page documents.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Endpoint {
    pub method: String,
    pub url: String,
}

/// A request example shown on an endpoint page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SnippetView {
    pub label: String,
    /// Highlighting language
    pub lang: String,
    /// Highlighted snippet markup
    pub html: String,
}

/// Context for rendering a page template.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Context {
    /// Page title
    pub title: String,
    /// Page description
    pub description: Option<String>,
    /// Site title
    pub site_title: String,
    /// Document language
    pub lang: String,
    /// Relative prefix back to the site root (`""`, `"../"`, ...)
    pub root: String,
    /// Favicon link target
    pub favicon: Option<String>,
    /// Rendered content HTML
    pub content: String,
    /// Navigation tabs
    pub nav: Vec<NavTab>,
    /// Table of contents
    pub toc: Vec<TocEntry>,
    /// Documented endpoint
    pub endpoint: Option<Endpoint>,
    /// Request examples
    pub snippets: Vec<SnippetView>,
    /// Include the dev server's live reload client
    pub live_reload: bool,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.set_loader(|name| {
            Ok(match name {
                "base.html" => Some(BASE_TEMPLATE.to_string()),
                "doc.html" => Some(DOC_TEMPLATE.to_string()),
                "index.html" => Some(INDEX_TEMPLATE.to_string()),
                "nav.html" => Some(NAV_TEMPLATE.to_string()),
                _ => None,
            })
        });

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render_page(&self, template: &str, context: &Context) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;
        tmpl.render(context)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

// `root`, nav paths and the favicon are built from validated manifest values
// and are emitted unescaped so hrefs stay readable. Rendered content and
// snippet markup are already HTML.
const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% if title and title != site_title %}{{ title }} - {% endif %}{{ site_title }}</title>
  {% if description %}<meta name="description" content="{{ description }}">
  {% endif %}<link rel="stylesheet" href="{{ root|safe }}styles.css">
  {% if favicon %}<link rel="icon" href="{{ favicon|safe }}">
  {% endif %}
</head>
<body>
  <div class="container">
    <nav class="sidebar">
      {% include "nav.html" %}
    </nav>
    <main class="content">
      {% block content %}{% endblock %}
    </main>
  </div>
  <script src="{{ root|safe }}main.js"></script>
  {% if live_reload %}<script src="/__livereload.js"></script>
  {% endif %}
</body>
</html>"##;

const DOC_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="doc">
  {% if endpoint %}
  <div class="api-endpoint">
    <span class="method method-{{ endpoint.method|lower }}">{{ endpoint.method }}</span>
    <code>{{ endpoint.url }}</code>
  </div>
  {% endif %}
  {{ content | safe }}
  {% if snippets %}
  <section class="request-examples">
    <h2>Request examples</h2>
    {% for snippet in snippets %}
    <div class="snippet">
      <div class="snippet-label">{{ snippet.label }}</div>
      <pre><code class="language-{{ snippet.lang }}">{{ snippet.html|safe }}</code></pre>
    </div>
    {% endfor %}
  </section>
  {% endif %}
</article>

{% if toc %}
<aside class="toc">
  <h2>On this page</h2>
  <ul>
  {% for entry in toc %}
    <li class="toc-level-{{ entry.level }}">
      <a href="#{{ entry.id }}">{{ entry.title }}</a>
    </li>
  {% endfor %}
  </ul>
</aside>
{% endif %}
{% endblock %}"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="doc landing">
  <h1>{{ site_title }}</h1>
  {% if description %}<p>{{ description }}</p>{% endif %}
  {% for tab in nav %}
  <section class="landing-tab">
    <h2>{{ tab.title }}</h2>
    {% for group in tab.groups %}
    <h3>{{ group.title }}</h3>
    <ul>
      {% for item in group.pages %}
      <li><a href="{{ root|safe }}{{ item.path|safe }}">{{ item.title }}</a></li>
      {% endfor %}
    </ul>
    {% endfor %}
  </section>
  {% endfor %}
</article>
{% endblock %}"##;

const NAV_TEMPLATE: &str = r##"<div class="nav-header">
  <a href="{{ root|safe }}index.html" class="nav-logo">{{ site_title }}</a>
</div>
{% for tab in nav %}
<div class="tab-section">
  <h2>{{ tab.title }}</h2>
  {% for group in tab.groups %}
  <div class="group">
    <h3>{{ group.title }}</h3>
    <ul class="nav-list">
    {% for item in group.pages %}
      <li class="nav-item{% if item.active %} active{% endif %}"><a href="{{ root|safe }}{{ item.path|safe }}"{% if item.active %} aria-current="page"{% endif %}>{{ item.title }}</a></li>
    {% endfor %}
    </ul>
  </div>
  {% endfor %}
</div>
{% endfor %}"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn nav() -> Vec<NavTab> {
        vec![NavTab {
            title: "API".to_string(),
            groups: vec![NavGroup {
                title: "Auth".to_string(),
                pages: vec![
                    NavItem {
                        title: "Login".to_string(),
                        path: "auth/login.html".to_string(),
                        page: "auth/login".to_string(),
                        active: false,
                    },
                    NavItem {
                        title: "Logout".to_string(),
                        path: "auth/logout.html".to_string(),
                        page: "auth/logout".to_string(),
                        active: false,
                    },
                ],
            }],
        }]
    }

    #[test]
    fn renders_basic_page() {
        let engine = TemplateEngine::new();

        let context = Context {
            title: "Login".to_string(),
            site_title: "My Docs".to_string(),
            lang: "en".to_string(),
            content: "<p>Hello world</p>".to_string(),
            ..Default::default()
        };

        let html = engine.render_page("doc.html", &context).unwrap();

        assert!(html.contains("<title>Login - My Docs</title>"));
        assert!(html.contains("<p>Hello world</p>"));
        assert!(html.contains(r#"<html lang="en">"#));
        assert!(!html.contains("__livereload"));
    }

    #[test]
    fn renders_navigation_with_active_page() {
        let engine = TemplateEngine::new();

        let context = Context {
            title: "Login".to_string(),
            site_title: "Docs".to_string(),
            root: "../".to_string(),
            nav: with_active(&nav(), "auth/login"),
            ..Default::default()
        };

        let html = engine.render_page("doc.html", &context).unwrap();

        assert!(html.contains("<h2>API</h2>"));
        assert!(html.contains("<h3>Auth</h3>"));
        assert!(html.contains(
            r#"<li class="nav-item active"><a href="../auth/login.html" aria-current="page">Login</a></li>"#
        ));
        assert!(html.contains(
            r#"<li class="nav-item"><a href="../auth/logout.html">Logout</a></li>"#
        ));
        assert!(html.contains(r#"href="../styles.css""#));
    }

    #[test]
    fn renders_toc_and_snippets() {
        let engine = TemplateEngine::new();

        let context = Context {
            title: "Ping".to_string(),
            site_title: "Docs".to_string(),
            toc: vec![TocEntry {
                title: "Response".to_string(),
                id: "response".to_string(),
                level: 2,
            }],
            endpoint: Some(Endpoint {
                method: "GET".to_string(),
                url: "https://api.example.com/v1/ping".to_string(),
            }),
            snippets: vec![SnippetView {
                label: "cURL".to_string(),
                lang: "bash".to_string(),
                html: r#"<span class="hl-source">curl --url &#39;x&#39;</span>"#.to_string(),
            }],
            ..Default::default()
        };

        let html = engine.render_page("doc.html", &context).unwrap();

        assert!(html.contains(r##"<a href="#response">Response</a>"##));
        assert!(html.contains(r#"<span class="method method-get">GET</span>"#));
        assert!(html.contains(
            r#"<code class="language-bash"><span class="hl-source">curl --url &#39;x&#39;</span></code>"#
        ));
    }

    #[test]
    fn includes_live_reload_client_when_enabled() {
        let engine = TemplateEngine::new();

        let context = Context {
            live_reload: true,
            ..Default::default()
        };

        let html = engine.render_page("index.html", &context).unwrap();

        assert!(html.contains(r#"<script src="/__livereload.js"></script>"#));
    }

    #[test]
    fn links_favicon_target_verbatim() {
        let engine = TemplateEngine::new();

        let context = Context {
            root: "../".to_string(),
            favicon: Some("https://cdn.acme.test/x.ico".to_string()),
            ..Default::default()
        };

        let html = engine.render_page("doc.html", &context).unwrap();

        assert!(html.contains(r#"<link rel="icon" href="https://cdn.acme.test/x.ico">"#));
    }

    #[test]
    fn escapes_page_titles() {
        let engine = TemplateEngine::new();

        let context = Context {
            title: "<script>".to_string(),
            site_title: "Docs".to_string(),
            ..Default::default()
        };

        let html = engine.render_page("doc.html", &context).unwrap();

        assert!(html.contains("&lt;script&gt; - Docs"));
    }
}
