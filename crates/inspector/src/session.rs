//! Debugger Session - per-connection context shared by all handlers
//!
//! One session exists per attached debugger. It is created on attach,
//! dropped on disconnect, and never shared across connections.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::cdp::DebuggerSocket;

/// Which debugger client is attached
///
/// Only `Vscode` changes handler behaviour. `Chrome` is detected so the
/// attach log names the client; handlers treat it like `Generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebuggerType {
    #[default]
    Generic,
    Vscode,
    Chrome,
}

impl DebuggerType {
    /// Derive the client kind from the debugger's User-Agent header
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) if ua.contains("VSCode") => DebuggerType::Vscode,
            Some(ua) if ua.contains("Chrome") => DebuggerType::Chrome,
            _ => DebuggerType::Generic,
        }
    }
}

/// Mutable context of one debugger <-> device pairing
pub struct DebuggerSession {
    pub id: String,

    /// Where synthesized replies go
    pub socket: Arc<dyn DebuggerSocket>,

    pub debugger_type: DebuggerType,

    /// Emulator loopback address rewritten to `localhost` in script urls
    pub original_source_url_address: Option<String>,

    /// Whether bare script urls got a `file://` prefix
    pub prepended_file_prefix: bool,
}

impl DebuggerSession {
    pub fn new(socket: Arc<dyn DebuggerSocket>, debugger_type: DebuggerType) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            socket,
            debugger_type,
            original_source_url_address: None,
            prepended_file_prefix: false,
        }
    }

    pub fn is_vscode(&self) -> bool {
        self.debugger_type == DebuggerType::Vscode
    }
}
