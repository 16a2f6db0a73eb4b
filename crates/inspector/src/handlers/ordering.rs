//! Script-parse ordering guard
//!
//! After a hot reload some engines replay `Debugger.scriptParsed` for scripts
//! older than the newest one already announced. Those stale events are
//! dropped. This is a watermark filter, not a reordering buffer.

use async_trait::async_trait;
use serde_json::Value;

use crate::cdp::methods::ScriptParsed;
use crate::cdp::DeviceRequest;
use crate::handler::InspectorHandler;
use crate::session::DebuggerSession;

#[derive(Debug, Default)]
pub struct ScriptParsedOrderingHandler {
    /// Highest integer script id seen, `None` until the first one
    highest_known_script_id: Option<i64>,
}

impl ScriptParsedOrderingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highest_known_script_id(&self) -> Option<i64> {
        self.highest_known_script_id
    }
}

#[async_trait]
impl InspectorHandler for ScriptParsedOrderingHandler {
    fn name(&self) -> &str {
        "ScriptParsedOrderingHandler"
    }

    async fn on_device_message(&mut self, message: &mut Value, _session: &mut DebuggerSession) -> bool {
        let Some(event) = DeviceRequest::<ScriptParsed>::parse(message) else {
            return false;
        };
        // Ids without an integer value never move the watermark
        let Some(script_id) = event.params.script_id.as_ref().and_then(|id| id.as_integer()) else {
            return false;
        };

        match self.highest_known_script_id {
            Some(highest) if script_id < highest => {
                tracing::debug!(
                    "[ScriptParsedOrderingHandler] Dropping stale scriptParsed {} (highest {})",
                    script_id,
                    highest
                );
                true
            }
            _ => {
                self.highest_known_script_id = Some(script_id);
                false
            }
        }
    }
}
