//! Page-reload bridge
//!
//! The device does not implement `Page.reload`. Reloads are signalled to the
//! bundler over its control WebSocket instead. The debugger gets its
//! acknowledgement before any of that starts and never hears about failures,
//! but the session does not move on until caches are cleared and the signal
//! has been sent or has timed out.

use async_trait::async_trait;
use futures_util::SinkExt;
use serde::Serialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::cdp::methods::PageReload;
use crate::cdp::protocol::EmptyResult;
use crate::cdp::DebuggerRequest;
use crate::error::Result;
use crate::handler::InspectorHandler;
use crate::respond::respond;
use crate::session::DebuggerSession;

/// Control protocol version understood by the bundler
pub const CONTROL_PROTOCOL_VERSION: u32 = 2;

/// Upper bound on the control connection: connect, handshake, send, close
pub const DEFAULT_SIGNAL_TIMEOUT: Duration = Duration::from_secs(10);

/// A bundler cache that can be wiped before a clean reload
#[async_trait]
pub trait BundlerCache: Send + Sync {
    fn name(&self) -> &str;

    async fn clear(&self) -> Result<()>;
}

/// Cache stored in a directory; clearing empties it
pub struct DirectoryCache {
    name: String,
    dir: PathBuf,
}

impl DirectoryCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            name: dir.display().to_string(),
            dir,
        }
    }
}

#[async_trait]
impl BundlerCache for DirectoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ControlMessage {
    version: u32,
    method: &'static str,
}

/// Open a short-lived control connection and ask the bundler to reload
pub async fn signal_reload(control_url: &str) -> Result<()> {
    let (mut ws, _) = connect_async(control_url).await?;
    let payload = serde_json::to_string(&ControlMessage {
        version: CONTROL_PROTOCOL_VERSION,
        method: "reload",
    })?;
    ws.send(Message::Text(payload)).await?;
    ws.close(None).await?;
    Ok(())
}

pub struct PageReloadHandler {
    control_url: String,
    caches: Vec<Arc<dyn BundlerCache>>,
    signal_timeout: Duration,
}

impl PageReloadHandler {
    pub fn new(control_url: impl Into<String>, caches: Vec<Arc<dyn BundlerCache>>) -> Self {
        Self {
            control_url: control_url.into(),
            caches,
            signal_timeout: DEFAULT_SIGNAL_TIMEOUT,
        }
    }

    pub fn with_signal_timeout(mut self, timeout: Duration) -> Self {
        self.signal_timeout = timeout;
        self
    }

    async fn clear_caches(&self) {
        for cache in &self.caches {
            match cache.clear().await {
                Ok(()) => tracing::debug!("[PageReloadHandler] Cleared cache {}", cache.name()),
                Err(e) => tracing::warn!("[PageReloadHandler] Failed to clear cache {}: {}", cache.name(), e),
            }
        }
    }

    async fn signal(&self) {
        match tokio::time::timeout(self.signal_timeout, signal_reload(&self.control_url)).await {
            Ok(Ok(())) => tracing::debug!("[PageReloadHandler] Reload signalled to {}", self.control_url),
            Ok(Err(e)) => tracing::warn!("[PageReloadHandler] Reload signal to {} failed: {}", self.control_url, e),
            Err(_) => tracing::warn!(
                "[PageReloadHandler] Reload signal to {} timed out after {:?}",
                self.control_url,
                self.signal_timeout
            ),
        }
    }
}

#[async_trait]
impl InspectorHandler for PageReloadHandler {
    fn name(&self) -> &str {
        "PageReloadHandler"
    }

    async fn on_debugger_message(&mut self, message: &mut Value, session: &mut DebuggerSession) -> bool {
        let Some(request) = DebuggerRequest::<PageReload>::parse(message) else {
            return false;
        };
        tracing::debug!(
            "[PageReloadHandler] Reload requested (ignoreCache: {})",
            request.params.ignore_cache
        );

        let claimed = respond(session.socket.as_ref(), request.id, EmptyResult {});

        if request.params.ignore_cache {
            self.clear_caches().await;
        }
        self.signal().await;

        claimed
    }
}
