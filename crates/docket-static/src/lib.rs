//! Static site generator for docket documentation.
//!
//! Builds a static site from a `docs.json` manifest and the Markdown/MDX
//! pages it lists. Output uses relative links only, so it can be opened
//! from disk or hosted under any path.

pub mod assets;
pub mod builder;
pub mod manifest;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use manifest::{Favicon, Manifest, ManifestError, DEFAULT_PRIMARY};
