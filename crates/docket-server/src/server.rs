//! Development server implementation.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::broadcast::error::RecvError;
use tower_http::services::ServeDir;

use docket_static::{BuildConfig, StaticBuilder};

use crate::watcher::FileWatcher;
use crate::websocket::{live_reload_script, ReloadHub, ReloadMessage, LIVE_RELOAD_PATH, LIVE_RELOAD_SCRIPT_PATH};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Site build settings; live reload is always enabled
    pub build: BuildConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            port: 3333,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Server error: {0}")]
    Serve(String),
}

/// Shared server state.
struct ServerState {
    hub: ReloadHub,
}

/// Development server: builds the site, serves it and rebuilds on change.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    pub fn new(mut config: DevServerConfig) -> Self {
        config.build.live_reload = true;
        Self { config }
    }

    pub fn config(&self) -> &DevServerConfig {
        &self.config
    }

    /// Start the development server. Runs until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr_str = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|_| ServerError::InvalidAddress(addr_str.clone()))?;

        let content_dir = self.config.build.content_dir.clone();
        let output_dir = self.config.build.output_dir.clone();

        let builder = Arc::new(StaticBuilder::new(self.config.build));
        let hub = ReloadHub::new();

        // A broken initial build still starts the server so the fix can be picked up.
        rebuild(&builder, &hub).await;
        std::fs::create_dir_all(&output_dir).map_err(|e| ServerError::Serve(e.to_string()))?;

        let (watcher, mut rx) = FileWatcher::new(&content_dir, &[output_dir.clone()])
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let watch_builder = Arc::clone(&builder);
        let watch_hub = hub.clone();
        tokio::spawn(async move {
            // Keep watcher alive for the lifetime of the task
            let _watcher = watcher;
            while let Some(event) = rx.recv().await {
                tracing::info!("Changed: {}", event.path().display());
                while let Ok(event) = rx.try_recv() {
                    tracing::debug!("Changed: {}", event.path().display());
                }
                rebuild(&watch_builder, &watch_hub).await;
            }
        });

        let app = router(Arc::new(ServerState { hub }), &output_dir);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        let url = format!("http://{}", addr);
        tracing::info!("Dev server running at {}", url);

        if self.config.open {
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        Ok(())
    }
}

fn router(state: Arc<ServerState>, output_dir: &Path) -> Router {
    Router::new()
        .route(LIVE_RELOAD_PATH, get(ws_handler))
        .route(LIVE_RELOAD_SCRIPT_PATH, get(script_handler))
        .fallback_service(ServeDir::new(output_dir))
        .with_state(state)
}

/// Rebuild the site on the blocking pool and notify browsers of the outcome.
async fn rebuild(builder: &Arc<StaticBuilder>, hub: &ReloadHub) {
    let task = Arc::clone(builder);
    match tokio::task::spawn_blocking(move || task.build()).await {
        Ok(Ok(result)) => {
            tracing::info!("Built {} pages in {}ms", result.pages, result.duration_ms);
            hub.send(ReloadMessage::Reload);
        }
        Ok(Err(e)) => {
            tracing::error!("Build failed: {}", e);
            hub.send(ReloadMessage::BuildFailed {
                message: e.to_string(),
            });
        }
        Err(e) => {
            tracing::error!("Build task failed: {}", e);
        }
    }
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let rx = state.hub.subscribe();
    ws.on_upgrade(move |socket| handle_ws(socket, rx))
}

/// Forward reload messages to one browser until it disconnects.
async fn handle_ws(mut socket: WebSocket, mut rx: tokio::sync::broadcast::Receiver<ReloadMessage>) {
    if send_message(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    loop {
        match rx.recv().await {
            Ok(msg) => {
                if send_message(&mut socket, &msg).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!("Live reload client skipped {} messages", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Failed to encode reload message: {}", e);
            return Ok(());
        }
    };
    socket.send(Message::Text(json.into())).await
}

/// Handler for the live reload client script.
async fn script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        live_reload_script(),
    )
}
