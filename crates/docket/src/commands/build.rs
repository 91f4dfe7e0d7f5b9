//! Static site build command.

use std::path::PathBuf;

use anyhow::Result;
use docket_static::StaticBuilder;

use crate::config::ConfigFile;

/// Run the build command.
pub fn run(config: &ConfigFile, output: Option<PathBuf>, no_minify: bool) -> Result<()> {
    tracing::info!("Building static site...");

    let mut build = config.build_config();
    if let Some(output) = output {
        build.output_dir = output;
    }
    if no_minify {
        build.minify = false;
    }

    let result = StaticBuilder::new(build).build()?;

    tracing::info!(
        "Built {} pages and copied {} assets in {}ms",
        result.pages,
        result.assets,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
