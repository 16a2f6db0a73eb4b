//! Reply helper - the only place CDP response envelopes are built
//!
//! Returns `true` so a handler can claim a message with
//! `return respond(...)`.

use serde::Serialize;
use serde_json::{json, Value};

use crate::cdp::{DebuggerSocket, RequestId};

/// Error payload understood by [`respond`]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub error: String,
}

/// Send a reply correlated to request `id`.
///
/// A payload with an `error` key becomes `{id, error: {message}}`,
/// anything else `{id, result: payload}`.
pub fn respond(socket: &dyn DebuggerSocket, id: RequestId, payload: impl Serialize) -> bool {
    let payload = serde_json::to_value(payload).unwrap_or_else(|e| json!({ "error": e.to_string() }));

    let envelope = match payload.get("error") {
        Some(error) => json!({ "id": id, "error": { "message": error_message(error) } }),
        None => json!({ "id": id, "result": payload }),
    };

    socket.send(envelope.to_string());
    true
}

/// Send `{id, error: {message}}`
pub fn respond_error(socket: &dyn DebuggerSocket, id: RequestId, message: impl Into<String>) -> bool {
    respond(
        socket,
        id,
        ErrorPayload {
            error: message.into(),
        },
    )
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}
