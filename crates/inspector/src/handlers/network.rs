//! Network-response cache
//!
//! The engine pushes response bodies out of band with a custom
//! `Expo(Network.receivedResponseBody)` event, because its network reporting
//! does not fit CDP's request/response lifecycle. Bodies are kept here and
//! served when the debugger asks with `Network.getResponseBody`.
//!
//! No expiry: a session's network log is bounded by user interaction.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use crate::cdp::methods::{GetResponseBody, GetResponseBodyResult, ReceivedResponseBody};
use crate::cdp::protocol::method_of;
use crate::cdp::{CdpMessage, DebuggerRequest, DeviceRequest};
use crate::handler::InspectorHandler;
use crate::respond::respond;
use crate::session::DebuggerSession;

#[derive(Debug, Default)]
pub struct NetworkResponseHandler {
    /// requestId -> body payload, latest event wins
    storage: HashMap<String, GetResponseBodyResult>,
}

impl NetworkResponseHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, request_id: &str) -> Option<&GetResponseBodyResult> {
        self.storage.get(request_id)
    }
}

#[async_trait]
impl InspectorHandler for NetworkResponseHandler {
    fn name(&self) -> &str {
        "NetworkResponseHandler"
    }

    async fn on_device_message(&mut self, message: &mut Value, _session: &mut DebuggerSession) -> bool {
        if method_of(message) != Some(ReceivedResponseBody::METHOD) {
            return false;
        }

        match DeviceRequest::<ReceivedResponseBody>::parse(message) {
            Some(event) => {
                tracing::debug!("[NetworkResponseHandler] Cached body for request {}", event.params.request_id);
                self.storage.insert(event.params.request_id, event.params.response);
            }
            None => tracing::debug!("[NetworkResponseHandler] Ignoring malformed response body event"),
        }
        // The debugger does not know this method; never forward it
        true
    }

    async fn on_debugger_message(&mut self, message: &mut Value, session: &mut DebuggerSession) -> bool {
        let Some(request) = DebuggerRequest::<GetResponseBody>::parse(message) else {
            return false;
        };
        match self.storage.get(&request.params.request_id) {
            Some(response) => respond(session.socket.as_ref(), request.id, response),
            None => false,
        }
    }
}
