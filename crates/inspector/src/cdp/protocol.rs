//! CDP Protocol Types
//!
//! The proxy never owns a message: it borrows the mutable JSON envelope the
//! transport handed it. Typed views are parsed from that envelope on demand,
//! handlers that rewrite a message edit the envelope itself.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Request ID - chosen by the debugger, echoed in every reply
pub type RequestId = u64;

/// Which side of the proxy a message arrived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    FromDevice,
    FromDebugger,
}

/// A CDP method, described at the type level only.
///
/// Implementors are zero-sized markers; `Params` and `Result` give handlers
/// a precisely typed view of one method.
pub trait CdpMessage {
    const METHOD: &'static str;
    type Params: DeserializeOwned;
    type Result: Serialize;
}

/// Script ids are strings on the wire, but some engines emit bare integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptId {
    Number(i64),
    Text(String),
}

impl ScriptId {
    /// Integer value of the id, if it has one
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ScriptId::Number(n) => Some(*n),
            ScriptId::Text(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptId::Number(n) => write!(f, "{}", n),
            ScriptId::Text(s) => f.write_str(s),
        }
    }
}

/// Runtime classification of a raw envelope.
///
/// The same JSON shape means different things depending on who sent it,
/// so classification needs the direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// Device event or id-less request, e.g. `Debugger.scriptParsed`
    DeviceRequest { method: String },
    /// Device answer to an earlier debugger request
    DeviceResponse { id: RequestId },
    /// Debugger request, its id must be echoed back
    DebuggerRequest { id: RequestId, method: String },
    /// Debugger answer to a device request (rare)
    DebuggerResponse { id: RequestId },
}

impl Envelope {
    /// Classify a message, `None` for anything that is not a CDP envelope
    pub fn classify(direction: Direction, message: &Value) -> Option<Self> {
        let id = message.get("id").and_then(Value::as_u64);
        let method = method_of(message).map(str::to_string);

        match (direction, id, method) {
            (Direction::FromDevice, None, Some(method)) => Some(Envelope::DeviceRequest { method }),
            (Direction::FromDevice, Some(id), None) => Some(Envelope::DeviceResponse { id }),
            // Some engines answer with the method echoed back
            (Direction::FromDevice, Some(id), Some(_)) => Some(Envelope::DeviceResponse { id }),
            (Direction::FromDebugger, Some(id), Some(method)) => {
                Some(Envelope::DebuggerRequest { id, method })
            }
            (Direction::FromDebugger, Some(id), None) => Some(Envelope::DebuggerResponse { id }),
            _ => None,
        }
    }
}

/// Method name of a message, if it carries one
pub fn method_of(message: &Value) -> Option<&str> {
    message.get("method").and_then(Value::as_str)
}

/// Mutable params object of a message for method `M`.
///
/// `None` when the method differs or params is not an object.
pub fn params_mut<M: CdpMessage>(message: &mut Value) -> Option<&mut serde_json::Map<String, Value>> {
    if method_of(message) != Some(M::METHOD) {
        return None;
    }
    message.get_mut("params").and_then(Value::as_object_mut)
}

fn parse_params<M: CdpMessage>(message: &Value) -> Option<M::Params> {
    let params = message.get("params").cloned().unwrap_or_else(|| json!({}));
    serde_json::from_value(params).ok()
}

/// Typed view of a device-originated request or event (no id)
pub struct DeviceRequest<M: CdpMessage> {
    pub params: M::Params,
}

impl<M: CdpMessage> DeviceRequest<M> {
    /// Parse if the message is `M` and its params fit the typed shape
    pub fn parse(message: &Value) -> Option<Self> {
        if method_of(message) != Some(M::METHOD) {
            return None;
        }
        Some(Self {
            params: parse_params::<M>(message)?,
        })
    }
}

/// Typed view of a debugger-originated request
pub struct DebuggerRequest<M: CdpMessage> {
    pub id: RequestId,
    pub params: M::Params,
}

impl<M: CdpMessage> DebuggerRequest<M> {
    /// Parse if the message is `M`, carries an id, and its params fit
    pub fn parse(message: &Value) -> Option<Self> {
        if method_of(message) != Some(M::METHOD) {
            return None;
        }
        let id = message.get("id")?.as_u64()?;
        Some(Self {
            id,
            params: parse_params::<M>(message)?,
        })
    }
}

/// Empty `{}` result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyResult {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::methods::{GetScriptSource, ScriptParsed};

    #[test]
    fn test_classify_by_direction() {
        let event = json!({"method": "Debugger.scriptParsed", "params": {}});
        let response = json!({"id": 4, "result": {}});
        let request = json!({"id": 4, "method": "Debugger.enable"});

        assert_eq!(
            Envelope::classify(Direction::FromDevice, &event),
            Some(Envelope::DeviceRequest {
                method: "Debugger.scriptParsed".to_string()
            })
        );
        assert_eq!(
            Envelope::classify(Direction::FromDevice, &response),
            Some(Envelope::DeviceResponse { id: 4 })
        );
        assert_eq!(
            Envelope::classify(Direction::FromDebugger, &request),
            Some(Envelope::DebuggerRequest {
                id: 4,
                method: "Debugger.enable".to_string()
            })
        );
        assert_eq!(
            Envelope::classify(Direction::FromDebugger, &response),
            Some(Envelope::DebuggerResponse { id: 4 })
        );
        assert_eq!(Envelope::classify(Direction::FromDebugger, &json!([1, 2])), None);
    }

    #[test]
    fn test_typed_views() {
        let request = json!({
            "id": 10,
            "method": "Debugger.getScriptSource",
            "params": {"scriptId": "abc"}
        });
        let parsed = DebuggerRequest::<GetScriptSource>::parse(&request).unwrap();
        assert_eq!(parsed.id, 10);
        assert_eq!(parsed.params.script_id, ScriptId::Text("abc".to_string()));

        // Wrong method and missing id are both rejected
        assert!(DeviceRequest::<ScriptParsed>::parse(&request).is_none());
        let no_id = json!({"method": "Debugger.getScriptSource", "params": {"scriptId": "1"}});
        assert!(DebuggerRequest::<GetScriptSource>::parse(&no_id).is_none());
    }

    #[test]
    fn test_script_id_integer_value() {
        assert_eq!(ScriptId::Text("42".into()).as_integer(), Some(42));
        assert_eq!(ScriptId::Number(7).as_integer(), Some(7));
        assert_eq!(ScriptId::Text("abc".into()).as_integer(), None);
        assert_eq!(ScriptId::Number(7).to_string(), "7");
    }
}
