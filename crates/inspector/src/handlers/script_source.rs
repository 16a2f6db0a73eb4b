//! Script-source resolver
//!
//! Answers `Debugger.getScriptSource` for scripts the device did not retain,
//! instead of taking the slow (or missing) on-device path. Sources come from
//! the bundler over HTTP or from the project directory.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use url::Url;

use crate::cdp::methods::{
    ConsoleApiCalled, ConsoleApiCalledParams, GetScriptSource, GetScriptSourceResult, ScriptParsed,
};
use crate::cdp::{CdpMessage, DebuggerRequest, DebuggerSocket, DeviceRequest};
use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use crate::handler::InspectorHandler;
use crate::handlers::address::replace_emulator_address;
use crate::respond::{respond, respond_error};
use crate::session::DebuggerSession;

/// Stay well below what the debugger accepts in a single frame
const MAX_FETCHED_SOURCE_BYTES: usize = 350_000_000;

const LOOPBACK_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

pub struct ScriptSourceHandler {
    /// scriptId -> url or project-relative path
    scripts: HashMap<String, String>,
    project_root: PathBuf,
    client: reqwest::Client,
    restrict_to_loopback: bool,
}

impl ScriptSourceHandler {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()?;

        Ok(Self {
            scripts: HashMap::new(),
            project_root: config.project_root.clone(),
            client,
            restrict_to_loopback: config.restrict_fetch_to_loopback,
        })
    }

    /// Record where the source of `script_id` can be loaded from
    pub fn insert_script(&mut self, script_id: impl Into<String>, path_or_url: impl Into<String>) {
        self.scripts.insert(script_id.into(), path_or_url.into());
    }

    pub fn script_location(&self, script_id: &str) -> Option<&str> {
        self.scripts.get(script_id).map(String::as_str)
    }

    /// Load a script source, with a debugger-facing message on failure
    async fn load_source(&self, path_or_url: &str) -> std::result::Result<String, String> {
        match parse_http_url(path_or_url) {
            Some(url) => self
                .fetch_text(url)
                .await
                .map_err(|e| format!("Failed to fetch source url {}: {}", path_or_url, e)),
            None => {
                // Absolute paths replace the root on join
                let path = self.project_root.join(path_or_url);
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| format!("Failed to fetch source file {}: {}", path_or_url, e))
            }
        }
    }

    async fn fetch_text(&self, url: Url) -> Result<String> {
        let is_loopback = url
            .host_str()
            .is_some_and(|host| LOOPBACK_HOSTS.iter().any(|loopback| *loopback == host));
        if self.restrict_to_loopback && !is_loopback {
            return Err(ProxyError::RemoteFetchForbidden);
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        if response
            .content_length()
            .is_some_and(|len| len > MAX_FETCHED_SOURCE_BYTES as u64)
        {
            return Err(ProxyError::TooLarge);
        }

        let text = response.text().await?;
        if text.len() > MAX_FETCHED_SOURCE_BYTES {
            return Err(ProxyError::TooLarge);
        }
        Ok(text)
    }
}

fn parse_http_url(candidate: &str) -> Option<Url> {
    Url::parse(candidate)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Mirror a failure into the debugger console so the user sees it
fn send_error_to_debugger(socket: &dyn DebuggerSocket, message: &str) {
    let params = ConsoleApiCalledParams {
        kind: "error".to_string(),
        args: vec![json!({ "type": "string", "value": message })],
        execution_context_id: 0,
    };
    socket.send(json!({ "method": ConsoleApiCalled::METHOD, "params": params }).to_string());
}

#[async_trait]
impl InspectorHandler for ScriptSourceHandler {
    fn name(&self) -> &str {
        "ScriptSourceHandler"
    }

    async fn on_device_message(&mut self, message: &mut Value, _session: &mut DebuggerSession) -> bool {
        if let Some(event) = DeviceRequest::<ScriptParsed>::parse(message) {
            if let (Some(script_id), Some(url)) = (event.params.script_id, event.params.url) {
                // Fetched from the host, so emulator addresses must point at localhost
                let location = match replace_emulator_address(&url) {
                    Some((rewritten, _)) => rewritten,
                    None => url,
                };
                self.scripts.insert(script_id.to_string(), location);
            }
        }
        false
    }

    async fn on_debugger_message(&mut self, message: &mut Value, session: &mut DebuggerSession) -> bool {
        let Some(request) = DebuggerRequest::<GetScriptSource>::parse(message) else {
            return false;
        };
        let Some(path_or_url) = self.scripts.get(&request.params.script_id.to_string()).cloned() else {
            return false;
        };

        tracing::debug!(
            "[ScriptSourceHandler] Resolving script {} from {}",
            request.params.script_id,
            path_or_url
        );

        let socket = session.socket.as_ref();
        match self.load_source(&path_or_url).await {
            Ok(script_source) => respond(socket, request.id, GetScriptSourceResult { script_source }),
            Err(error) => {
                tracing::warn!("[ScriptSourceHandler] {}", error);
                send_error_to_debugger(socket, &error);
                respond_error(socket, request.id, error)
            }
        }
    }
}
