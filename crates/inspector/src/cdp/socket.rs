//! Outbound socket capability
//!
//! Handlers only ever need to push text towards the debugger. The relay backs
//! this with an unbounded channel drained by a single writer task, so replies
//! and forwarded device messages share one ordered queue.

use tokio::sync::mpsc::UnboundedSender;

/// Minimal `send(text)` capability of the debugger connection
pub trait DebuggerSocket: Send + Sync {
    fn send(&self, text: String);
}

impl DebuggerSocket for UnboundedSender<String> {
    fn send(&self, text: String) {
        if UnboundedSender::send(self, text).is_err() {
            // Writer gone means the debugger disconnected; nothing to deliver to
            tracing::debug!("[DebuggerSocket] Dropping message for closed debugger connection");
        }
    }
}
