//! Error types for the inspector proxy
//!
//! Flat hierarchy. Handlers never let these escape to the pipeline:
//! a failure while answering a claimed request becomes a CDP `{error}` reply.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProxyError>;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("remote fetches not permitted")]
    RemoteFetchForbidden,

    #[error("file too large to fetch via HTTP")]
    TooLarge,
}
