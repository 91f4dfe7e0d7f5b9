//! WebSocket-based live reload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Path of the live reload WebSocket endpoint.
pub const LIVE_RELOAD_PATH: &str = "/__livereload";

/// Path of the live reload client script.
pub const LIVE_RELOAD_SCRIPT_PATH: &str = "/__livereload.js";

/// Messages sent to connected browsers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Connection established
    Connected,

    /// The site was rebuilt; reload the page
    Reload,

    /// A rebuild failed; the page stays as it is
    BuildFailed {
        /// Build error message
        message: String,
    },
}

/// Hub for broadcasting reload messages to all connected browsers.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }

    /// Send a message to all connected browsers.
    pub fn send(&self, msg: ReloadMessage) {
        // No receivers just means no browser is open.
        let _ = self.sender.send(msg);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    /// Number of connected browsers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Client-side live reload script, served at [`LIVE_RELOAD_SCRIPT_PATH`].
///
/// Connects back to whatever host served the page and reloads when the
/// server reports a rebuild. After the server restarts, the first
/// successful reconnect also reloads.
pub fn live_reload_script() -> &'static str {
    LIVE_RELOAD_SCRIPT
}

const LIVE_RELOAD_SCRIPT: &str = r#"(function() {
  'use strict';

  var protocol = location.protocol === 'https:' ? 'wss:' : 'ws:';
  var url = protocol + '//' + location.host + '/__livereload';
  var maxAttempts = 10;

  function connect(attempt) {
    var ws = new WebSocket(url);

    ws.onopen = function() {
      if (attempt > 0) {
        location.reload();
      }
    };

    ws.onmessage = function(event) {
      var msg = JSON.parse(event.data);
      switch (msg.type) {
        case 'reload':
          location.reload();
          break;
        case 'build_failed':
          console.error('[docket] Build failed:', msg.message);
          break;
      }
    };

    ws.onclose = function() {
      if (attempt < maxAttempts) {
        setTimeout(function() { connect(attempt + 1); }, 1000 * (attempt + 1));
      }
    };
  }

  connect(0);
})();
"#;
