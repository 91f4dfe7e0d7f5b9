//! Scaffold a documentation site.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Files written by `docket init`, relative to the target directory.
const SCAFFOLD: &[(&str, &str)] = &[
    ("docket.toml", DEFAULT_CONFIG),
    ("docs.json", DEFAULT_MANIFEST),
    ("index.mdx", DEFAULT_INDEX),
    ("quickstart.mdx", DEFAULT_QUICKSTART),
    ("api-reference/ping.mdx", DEFAULT_PING),
];

/// Run the init command in the current directory.
pub fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing docket...");

    let written = scaffold(Path::new("."), yes)?;

    if written == 0 {
        tracing::warn!("All files already exist. Use --yes to overwrite.");
        return Ok(());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'docket dev' to start the development server.");

    Ok(())
}

/// Write the starter files into `dir`. Existing files are kept unless
/// `overwrite` is set. Returns the number of files written.
fn scaffold(dir: &Path, overwrite: bool) -> Result<usize> {
    let mut written = 0;

    for (name, content) in SCAFFOLD {
        let path = dir.join(name);
        if path.exists() && !overwrite {
            tracing::info!("Skipped {} (exists)", name);
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", name))?;
        tracing::info!("Created {}", name);
        written += 1;
    }

    Ok(written)
}

const DEFAULT_CONFIG: &str = r#"# docket configuration

[docs]
# Content root: pages and assets resolve against it
dir = "."

# Navigation manifest, relative to the content root
manifest = "docs.json"

# Output directory for the built site
output = "build"

lang = "en"

[build]
minify = true

# Remove the output directory before each build
clean = true

# Copied verbatim into the output when present
assets = ["images", "logo", "icons"]
files = ["favicon.svg"]

[playground]
# Overrides api.baseUrl from docs.json
# base_url = "http://localhost:8080"
authorization = "Bearer YOUR_API_KEY"
"#;

const DEFAULT_MANIFEST: &str = r##"{
  "name": "My API",
  "description": "Reference and guides for My API.",
  "colors": {
    "primary": "#16A34A"
  },
  "favicon": "favicon.svg",
  "api": {
    "baseUrl": "https://api.example.com"
  },
  "navigation": {
    "tabs": [
      {
        "tab": "Guides",
        "groups": [
          {
            "group": "Getting started",
            "pages": ["index", "quickstart"]
          }
        ]
      },
      {
        "tab": "API Reference",
        "groups": [
          {
            "group": "Endpoints",
            "pages": ["api-reference/ping"]
          }
        ]
      }
    ]
  }
}
"##;

const DEFAULT_INDEX: &str = r#"---
title: Introduction
description: Welcome to the My API documentation.
---

# Introduction

This site is built with **docket** from the pages listed in `docs.json`.

## Next steps

- Follow the [Quickstart](/quickstart) to make your first request.
- Browse the [API reference](/api-reference/ping).
"#;

const DEFAULT_QUICKSTART: &str = r#"---
title: Quickstart
sidebarTitle: Quickstart
---

# Quickstart

## Get an API key

Every request is authenticated with a bearer token:

```bash
curl https://api.example.com/v1/ping \
  --header 'Authorization: Bearer YOUR_API_KEY'
```

## Try it from the terminal

```bash
docket try --page api-reference/ping
```

## Generate client code

```bash
docket snippet --page api-reference/ping --lang python
```
"#;

const DEFAULT_PING: &str = r#"---
title: Ping
description: Check that the API is reachable.
api: GET /v1/ping
---

Returns `{"ok": true}` when the service is up.

## Response

| Field | Type    | Description           |
|-------|---------|-----------------------|
| `ok`  | boolean | Always `true`         |
"#;
