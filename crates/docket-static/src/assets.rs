//! Stylesheet, script and static asset handling.

use std::fs;
use std::io;
use std::path::Path;

use docket_mdx::theme_css;
use walkdir::WalkDir;

const PRIMARY_PLACEHOLDER: &str = "__PRIMARY__";

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the site stylesheet themed with `primary`, followed by the
    /// code highlighting rules.
    pub fn generate_css(primary: &str) -> String {
        let mut css = DEFAULT_CSS.replace(PRIMARY_PLACEHOLDER, primary);
        match theme_css() {
            Ok(highlight) => {
                css.push('\n');
                css.push_str(&highlight);
            }
            Err(e) => tracing::warn!("Skipping code highlighting styles: {}", e),
        }
        css
    }

    /// Generate the site script.
    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }

    /// Copy a directory tree byte-for-byte. Returns the number of files copied.
    pub fn copy_dir(src: &Path, dest: &Path) -> io::Result<usize> {
        let mut copied = 0;

        for entry in WalkDir::new(src).follow_links(true) {
            let entry = entry.map_err(io::Error::other)?;
            let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;
            let target = dest.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else if entry.file_type().is_file() {
                Self::copy_file(entry.path(), &target)?;
                copied += 1;
            }
        }

        Ok(copied)
    }

    /// Copy a single file, creating parent directories as needed.
    pub fn copy_file(src: &Path, dest: &Path) -> io::Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dest)?;
        Ok(())
    }
}

const DEFAULT_CSS: &str = r#"/* docket theme */

:root {
  --primary: __PRIMARY__;
  --background: #ffffff;
  --foreground: #111827;
  --muted: #f9fafb;
  --muted-foreground: #6b7280;
  --border: #e5e7eb;
  --code-background: #0f172a;
  --code-foreground: #e2e8f0;
  --radius: 0.375rem;
  --sidebar-width: 280px;
  --toc-width: 220px;
  --content-max-width: 820px;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

.container {
  display: grid;
  grid-template-columns: var(--sidebar-width) 1fr;
  min-height: 100vh;
}

/* Sidebar */
.sidebar {
  background: var(--muted);
  border-right: 1px solid var(--border);
  padding: 1.5rem;
  position: sticky;
  top: 0;
  height: 100vh;
  overflow-y: auto;
}

.nav-header {
  margin-bottom: 1.5rem;
}

.nav-logo {
  font-weight: 700;
  font-size: 1.25rem;
  color: var(--foreground);
  text-decoration: none;
}

.tab-section h2 {
  font-size: 0.75rem;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--muted-foreground);
  margin: 1.25rem 0 0.5rem;
}

.group h3 {
  font-size: 0.875rem;
  font-weight: 600;
  margin: 0.75rem 0 0.25rem;
}

.nav-list {
  list-style: none;
}

.nav-item a {
  display: block;
  padding: 0.375rem 0.75rem;
  color: var(--muted-foreground);
  text-decoration: none;
  border-radius: var(--radius);
  border-left: 2px solid transparent;
}

.nav-item a:hover {
  color: var(--foreground);
}

.nav-item.active > a {
  color: var(--primary);
  border-left-color: var(--primary);
  font-weight: 600;
}

/* Content */
.content {
  display: grid;
  grid-template-columns: minmax(0, 1fr) var(--toc-width);
  gap: 2rem;
  padding: 2rem 3rem;
}

.doc {
  max-width: var(--content-max-width);
}

.doc h1 {
  font-size: 2.25rem;
  margin-bottom: 1.5rem;
}

.doc h2 {
  font-size: 1.5rem;
  margin: 2rem 0 1rem;
  padding-bottom: 0.5rem;
  border-bottom: 1px solid var(--border);
}

.doc h3 {
  font-size: 1.25rem;
  margin: 1.5rem 0 0.75rem;
}

.doc p,
.doc ul,
.doc ol,
.doc table {
  margin-bottom: 1rem;
}

.doc ul,
.doc ol {
  padding-left: 1.5rem;
}

.doc a {
  color: var(--primary);
  text-underline-offset: 4px;
}

.doc table {
  border-collapse: collapse;
  width: 100%;
}

.doc th,
.doc td {
  border: 1px solid var(--border);
  padding: 0.5rem 0.75rem;
  text-align: left;
}

/* Code */
.doc pre {
  background: var(--code-background);
  color: var(--code-foreground);
  border-radius: var(--radius);
  padding: 1rem;
  overflow-x: auto;
  font-size: 0.875rem;
  margin-bottom: 1rem;
  position: relative;
}

.doc code {
  font-family: ui-monospace, SFMono-Regular, Menlo, monospace;
  font-size: 0.875em;
}

.doc :not(pre) > code {
  background: var(--muted);
  border: 1px solid var(--border);
  padding: 0.125rem 0.375rem;
  border-radius: 0.25rem;
}

.copy-btn {
  position: absolute;
  top: 0.5rem;
  right: 0.5rem;
  padding: 0.25rem 0.75rem;
  font-size: 0.75rem;
  background: var(--primary);
  color: #ffffff;
  border: none;
  border-radius: var(--radius);
  cursor: pointer;
  opacity: 0.8;
}

.copy-btn:hover {
  opacity: 1;
}

/* Endpoint pages */
.api-endpoint {
  display: flex;
  align-items: center;
  gap: 0.75rem;
  padding: 0.75rem 1rem;
  margin-bottom: 1.5rem;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  background: var(--muted);
}

.method {
  font-size: 0.75rem;
  font-weight: 700;
  padding: 0.125rem 0.5rem;
  border-radius: var(--radius);
  color: #ffffff;
  background: var(--primary);
}

.method-post {
  background: #2563eb;
}

.method-put {
  background: #d97706;
}

.method-delete {
  background: #dc2626;
}

.snippet-label {
  font-size: 0.75rem;
  font-weight: 600;
  color: var(--muted-foreground);
  margin-bottom: 0.25rem;
}

/* Table of contents */
.toc {
  position: sticky;
  top: 2rem;
  align-self: start;
}

.toc h2 {
  font-size: 0.75rem;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--muted-foreground);
  margin-bottom: 0.75rem;
}

.toc ul {
  list-style: none;
}

.toc a {
  font-size: 0.875rem;
  color: var(--muted-foreground);
  text-decoration: none;
}

.toc a:hover {
  color: var(--primary);
}

.toc-level-3 {
  padding-left: 1rem;
}

@media (max-width: 1024px) {
  .container {
    grid-template-columns: 1fr;
  }

  .sidebar {
    position: static;
    height: auto;
  }

  .content {
    grid-template-columns: 1fr;
    padding: 1.5rem;
  }

  .toc {
    display: none;
  }
}
"#;

const DEFAULT_JS: &str = r#"(function() {
  'use strict';

  document.querySelectorAll('.doc pre').forEach(pre => {
    if (pre.querySelector('.copy-btn')) return;

    const btn = document.createElement('button');
    btn.className = 'copy-btn';
    btn.textContent = 'Copy';
    btn.setAttribute('type', 'button');

    btn.addEventListener('click', async () => {
      const code = pre.querySelector('code');
      const text = code ? code.textContent : pre.textContent;

      try {
        await navigator.clipboard.writeText(text || '');
        btn.textContent = 'Copied!';
      } catch (err) {
        btn.textContent = 'Error';
      }
      setTimeout(() => { btn.textContent = 'Copy'; }, 2000);
    });

    pre.appendChild(btn);
  });

  const active = document.querySelector('.nav-item.active');
  if (active) {
    active.scrollIntoView({ block: 'nearest' });
  }
})();
"#;
