//! VS Code debug adapter compatibility shims
//!
//! Each handler is inert unless the session's debugger is VS Code. They never
//! fail: a missing field leaves the message as it is.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;

use crate::cdp::methods::{
    CallFunctionOn, CallFunctionOnResult, GetPossibleBreakpoints, GetPossibleBreakpointsResult, GetProperties,
    SetBreakpointByUrl,
};
use crate::cdp::protocol::params_mut;
use crate::cdp::{DebuggerRequest, Direction, Envelope, RequestId};
use crate::handler::InspectorHandler;
use crate::respond::respond;
use crate::session::DebuggerSession;

/// Url no script will ever match, so the engine creates an unbound breakpoint
pub const UNBOUND_BREAKPOINT_URL: &str = "file://__invalid_url__";

/// The engine never answers `Debugger.getPossibleBreakpoints`; reply with none
#[derive(Debug, Default)]
pub struct VscodeGetPossibleBreakpointsHandler;

#[async_trait]
impl InspectorHandler for VscodeGetPossibleBreakpointsHandler {
    fn name(&self) -> &str {
        "VscodeGetPossibleBreakpointsHandler"
    }

    async fn on_debugger_message(&mut self, message: &mut Value, session: &mut DebuggerSession) -> bool {
        if !session.is_vscode() {
            return false;
        }
        match DebuggerRequest::<GetPossibleBreakpoints>::parse(message) {
            Some(request) => respond(
                session.socket.as_ref(),
                request.id,
                GetPossibleBreakpointsResult::default(),
            ),
            None => false,
        }
    }
}

/// Regex breakpoints are turned into unbound ones; the adapter rebinds them
/// once source maps are loaded
#[derive(Debug, Default)]
pub struct VscodeSetBreakpointByUrlHandler;

#[async_trait]
impl InspectorHandler for VscodeSetBreakpointByUrlHandler {
    fn name(&self) -> &str {
        "VscodeSetBreakpointByUrlHandler"
    }

    async fn on_debugger_message(&mut self, message: &mut Value, session: &mut DebuggerSession) -> bool {
        if !session.is_vscode() {
            return false;
        }
        let Some(params) = params_mut::<SetBreakpointByUrl>(message) else {
            return false;
        };
        if params.remove("urlRegex").is_some() {
            params.insert("url".to_string(), Value::String(UNBOUND_BREAKPOINT_URL.to_string()));
        }
        false
    }
}

/// Sanitizes `Runtime.getProperties` responses: descriptions are always
/// strings, and symbols lose their `objectId` since inspecting one crashes
/// the engine
#[derive(Debug, Default)]
pub struct VscodeGetPropertiesHandler {
    intercepted: HashSet<RequestId>,
}

impl VscodeGetPropertiesHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.intercepted.len()
    }
}

fn sanitize_property(property: &mut Value) {
    let Some(value) = property.get_mut("value").and_then(Value::as_object_mut) else {
        return;
    };
    if value.get("description").map_or(true, Value::is_null) {
        value.insert("description".to_string(), Value::String(String::new()));
    }
    if value.get("type").and_then(Value::as_str) == Some("symbol") {
        value.remove("objectId");
    }
}

#[async_trait]
impl InspectorHandler for VscodeGetPropertiesHandler {
    fn name(&self) -> &str {
        "VscodeGetPropertiesHandler"
    }

    async fn on_debugger_message(&mut self, message: &mut Value, session: &mut DebuggerSession) -> bool {
        if session.is_vscode() {
            if let Some(request) = DebuggerRequest::<GetProperties>::parse(message) {
                self.intercepted.insert(request.id);
            }
        }
        false
    }

    async fn on_device_message(&mut self, message: &mut Value, _session: &mut DebuggerSession) -> bool {
        let Some(Envelope::DeviceResponse { id }) = Envelope::classify(Direction::FromDevice, message) else {
            return false;
        };
        if !self.intercepted.remove(&id) {
            return false;
        }
        if let Some(properties) = message.pointer_mut("/result/result").and_then(Value::as_array_mut) {
            properties.iter_mut().for_each(sanitize_property);
        }
        false
    }
}

/// The adapter probes objects with `Runtime.callFunctionOn`, which the engine
/// cannot evaluate; answer with an empty remote object
#[derive(Debug, Default)]
pub struct VscodeCallFunctionOnHandler;

#[async_trait]
impl InspectorHandler for VscodeCallFunctionOnHandler {
    fn name(&self) -> &str {
        "VscodeCallFunctionOnHandler"
    }

    async fn on_debugger_message(&mut self, message: &mut Value, session: &mut DebuggerSession) -> bool {
        if !session.is_vscode() {
            return false;
        }
        match DebuggerRequest::<CallFunctionOn>::parse(message) {
            Some(request) => respond(session.socket.as_ref(), request.id, CallFunctionOnResult::default()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DebuggerType;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn new_session(debugger_type: DebuggerType) -> (DebuggerSession, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        (DebuggerSession::new(Arc::new(tx), debugger_type), rx)
    }

    fn set_breakpoint_by_regex() -> Value {
        json!({
            "id": 2,
            "method": "Debugger.setBreakpointByUrl",
            "params": {"lineNumber": 10, "columnNumber": 0, "urlRegex": "[Aa]pp\\.js$"}
        })
    }

    #[tokio::test]
    async fn test_possible_breakpoints_stub() {
        let mut handler = VscodeGetPossibleBreakpointsHandler;
        let (mut session, mut rx) = new_session(DebuggerType::Vscode);

        let mut message = json!({"id": 8, "method": "Debugger.getPossibleBreakpoints", "params": {"start": {}}});
        assert!(handler.on_debugger_message(&mut message, &mut session).await);
        let reply: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(reply, json!({"id": 8, "result": {"locations": []}}));

        let (mut generic, mut generic_rx) = new_session(DebuggerType::Generic);
        assert!(!handler.on_debugger_message(&mut message, &mut generic).await);
        assert!(generic_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_breakpoint_regex_becomes_unbound() {
        let mut handler = VscodeSetBreakpointByUrlHandler;
        let (mut session, mut rx) = new_session(DebuggerType::Vscode);

        let mut message = set_breakpoint_by_regex();
        assert!(!handler.on_debugger_message(&mut message, &mut session).await);
        assert!(message["params"].get("urlRegex").is_none());
        assert_eq!(message["params"]["url"], UNBOUND_BREAKPOINT_URL);
        assert_eq!(message["params"]["lineNumber"], 10);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_breakpoint_unchanged_for_other_debuggers() {
        let mut handler = VscodeSetBreakpointByUrlHandler;
        for debugger_type in [DebuggerType::Generic, DebuggerType::Chrome] {
            let (mut session, _rx) = new_session(debugger_type);
            let mut message = set_breakpoint_by_regex();
            assert!(!handler.on_debugger_message(&mut message, &mut session).await);
            assert_eq!(message, set_breakpoint_by_regex());
        }

        // Plain url breakpoints are not touched either
        let (mut session, _rx) = new_session(DebuggerType::Vscode);
        let original = json!({
            "id": 3,
            "method": "Debugger.setBreakpointByUrl",
            "params": {"lineNumber": 1, "url": "http://localhost:8081/index.bundle"}
        });
        let mut message = original.clone();
        handler.on_debugger_message(&mut message, &mut session).await;
        assert_eq!(message, original);
    }

    #[tokio::test]
    async fn test_properties_sanitized() {
        let mut handler = VscodeGetPropertiesHandler::new();
        let (mut session, _rx) = new_session(DebuggerType::Vscode);

        let mut request = json!({"id": 40, "method": "Runtime.getProperties", "params": {"objectId": "1"}});
        assert!(!handler.on_debugger_message(&mut request, &mut session).await);
        assert_eq!(handler.pending(), 1);

        let mut response = json!({
            "id": 40,
            "result": {"result": [
                {"name": "a", "value": {"type": "object", "objectId": "2"}},
                {"name": "b", "value": {"type": "string", "description": null, "value": "x"}},
                {"name": "c", "value": {"type": "symbol", "description": "Symbol(c)", "objectId": "3"}},
                {"name": "d", "get": {"type": "function"}}
            ]}
        });
        assert!(!handler.on_device_message(&mut response, &mut session).await);
        assert_eq!(handler.pending(), 0);

        let properties = &response["result"]["result"];
        assert_eq!(properties[0]["value"]["description"], "");
        assert_eq!(properties[0]["value"]["objectId"], "2");
        assert_eq!(properties[1]["value"]["description"], "");
        assert_eq!(properties[2]["value"]["description"], "Symbol(c)");
        assert!(properties[2]["value"].get("objectId").is_none());
        assert!(properties[3].get("value").is_none());
    }

    #[tokio::test]
    async fn test_unknown_response_id_untouched() {
        let mut handler = VscodeGetPropertiesHandler::new();
        let (mut session, _rx) = new_session(DebuggerType::Vscode);

        let original = json!({
            "id": 99,
            "result": {"result": [{"name": "a", "value": {"type": "symbol", "objectId": "3"}}]}
        });
        let mut response = original.clone();
        assert!(!handler.on_device_message(&mut response, &mut session).await);
        assert_eq!(response, original);
    }

    #[tokio::test]
    async fn test_properties_not_tracked_for_generic() {
        let mut handler = VscodeGetPropertiesHandler::new();
        let (mut session, _rx) = new_session(DebuggerType::Generic);

        let mut request = json!({"id": 41, "method": "Runtime.getProperties", "params": {"objectId": "1"}});
        handler.on_debugger_message(&mut request, &mut session).await;
        assert_eq!(handler.pending(), 0);
    }

    #[tokio::test]
    async fn test_call_function_on_stub() {
        let mut handler = VscodeCallFunctionOnHandler;
        let (mut session, mut rx) = new_session(DebuggerType::Vscode);

        let mut message = json!({
            "id": 50,
            "method": "Runtime.callFunctionOn",
            "params": {"functionDeclaration": "function() { return this.constructor.name }"}
        });
        assert!(handler.on_debugger_message(&mut message, &mut session).await);
        let reply: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(reply, json!({"id": 50, "result": {"result": {}}}));
    }
}
