//! CDP (Chrome DevTools Protocol) message model
//!
//! Envelope taxonomy, typed method views, and the outbound socket capability.
//! No transport here - the proxy is handed parsed JSON and a sink.

pub mod methods;
pub mod protocol;
pub mod socket;

pub use protocol::{CdpMessage, DebuggerRequest, DeviceRequest, Direction, Envelope, RequestId, ScriptId};
pub use socket::DebuggerSocket;
