//! Development server with live reload for docket docs.
//!
//! Builds the site, serves the output directory, watches the content root
//! and rebuilds on change, telling connected browsers to reload over a
//! WebSocket.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent, WatchFilter};
pub use websocket::{live_reload_script, ReloadHub, ReloadMessage};
