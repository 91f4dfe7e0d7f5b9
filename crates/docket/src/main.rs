//! docket CLI - API documentation site builder and request playground.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use commands::request::RequestArgs;
use config::ConfigFile;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "docket")]
#[command(about = "API documentation site builder and request playground")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to docket.toml config file
    #[arg(short, long, default_value = "docket.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a documentation site in the current directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Start development server with live reload
    Dev {
        /// Port to listen on
        #[arg(short, long, default_value = "3333")]
        port: u16,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Build static documentation site
    Build {
        /// Output directory (defaults to config or "build")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip stylesheet minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Preview built documentation
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve (defaults to config or "build")
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Send a request to a documented endpoint and print the response
    Try {
        #[command(flatten)]
        request: RequestArgs,

        /// Print response headers
        #[arg(long)]
        show_headers: bool,
    },

    /// Print code snippets for a request
    Snippet {
        #[command(flatten)]
        request: RequestArgs,

        /// curl, python, javascript, go, java or all
        #[arg(short, long, default_value = "all")]
        lang: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ConfigFile::load(&cli.config)?;

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(yes)?;
        }
        Commands::Dev { port, no_open } => {
            commands::dev::run(&config, port, !no_open).await?;
        }
        Commands::Build { output, no_minify } => {
            commands::build::run(&config, output, no_minify)?;
        }
        Commands::Serve { port, dir } => {
            let dir = dir.unwrap_or_else(|| config.docs.output.clone());
            commands::serve::run(port, dir).await?;
        }
        Commands::Try {
            request,
            show_headers,
        } => {
            commands::request::run(&config, &request, show_headers).await?;
        }
        Commands::Snippet { request, lang } => {
            commands::snippet::run(&config, &request, &lang)?;
        }
    }

    Ok(())
}
