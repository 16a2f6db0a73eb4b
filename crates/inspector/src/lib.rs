//! Inspector Proxy - CDP message interception between debugger and device
//!
//! Sits between a debugger client (IDE or browser) and a JavaScript engine,
//! both speaking the Chrome DevTools Protocol. For every message in either
//! direction it decides whether to forward, rewrite, swallow, or answer it,
//! without either side noticing.
//!
//! # Architecture
//!
//! ```text
//! device ──► ProxyConnection ──► InspectorPipeline ──► [handler, handler, ...]
//!                 │                     │                       │
//!                 │               first claim wins        respond() ──► debugger
//!                 └── unclaimed (possibly mutated) ──► other side
//! ```
//!
//! 1. **Data structures first**: handler state is owned per session, no globals
//! 2. **Explicit order**: the handler chain is a `Vec` built at attach time
//! 3. **Never crash the session**: failures become CDP `{error}` replies

pub mod cdp;
pub mod config;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod proxy;
pub mod respond;
pub mod session;

pub use cdp::{DebuggerSocket, Direction};
pub use config::ProxyConfig;
pub use error::{ProxyError, Result};
pub use handler::{InspectorHandler, InspectorPipeline};
pub use handlers::create_handlers;
pub use proxy::{serve, ProxyConnection};
pub use respond::{respond, respond_error};
pub use session::{DebuggerSession, DebuggerType};
