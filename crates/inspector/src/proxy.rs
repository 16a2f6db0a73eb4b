//! Connection relay - drives one pipeline over a device/debugger pair
//!
//! Design decisions:
//! 1. One `ProxyConnection` per debugger attach; handler state dies with it
//! 2. Each message is dispatched to completion before the next one is read,
//!    so replies can never overtake each other within a pair
//! 3. Everything headed to the debugger goes through one channel: forwarded
//!    device messages and synthesized replies keep their relative order
//! 4. Frames that are not JSON are forwarded verbatim

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::cdp::{DebuggerSocket, Direction};
use crate::config::ProxyConfig;
use crate::error::Result;
use crate::handler::InspectorPipeline;
use crate::handlers::create_handlers;
use crate::session::{DebuggerSession, DebuggerType};

/// Session context plus its handler chain
pub struct ProxyConnection {
    session: DebuggerSession,
    pipeline: InspectorPipeline,
}

impl ProxyConnection {
    pub fn new(config: &ProxyConfig, debugger_type: DebuggerType, socket: Arc<dyn DebuggerSocket>) -> Result<Self> {
        Ok(Self {
            session: DebuggerSession::new(socket, debugger_type),
            pipeline: InspectorPipeline::with_handlers(create_handlers(config)?),
        })
    }

    pub fn session(&self) -> &DebuggerSession {
        &self.session
    }

    /// Returns the text to forward to the debugger, `None` if claimed
    pub async fn handle_device_message(&mut self, text: &str) -> Option<String> {
        self.intercept(Direction::FromDevice, text).await
    }

    /// Returns the text to forward to the device, `None` if claimed
    pub async fn handle_debugger_message(&mut self, text: &str) -> Option<String> {
        self.intercept(Direction::FromDebugger, text).await
    }

    async fn intercept(&mut self, direction: Direction, text: &str) -> Option<String> {
        let mut message: Value = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::trace!("[InspectorProxy] Forwarding non-JSON {:?} frame: {}", direction, e);
                return Some(text.to_string());
            }
        };

        if self
            .pipeline
            .dispatch(direction, &mut message, &mut self.session)
            .await
        {
            return None;
        }
        Some(message.to_string())
    }
}

/// Relay messages between an attached device and debugger until either
/// side closes.
pub async fn serve<D, G>(
    config: &ProxyConfig,
    debugger_type: DebuggerType,
    device: WebSocketStream<D>,
    debugger: WebSocketStream<G>,
) -> Result<()>
where
    D: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    G: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut device_sink, mut device_stream) = device.split();
    let (mut debugger_sink, mut debugger_stream) = debugger.split();

    let (to_debugger, mut outbox) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        while let Some(text) = outbox.recv().await {
            if let Err(e) = debugger_sink.send(Message::Text(text)).await {
                tracing::warn!("[InspectorProxy] Debugger write failed: {}", e);
                break;
            }
        }
        let _ = debugger_sink.close().await;
    });

    let mut connection = ProxyConnection::new(config, debugger_type, Arc::new(to_debugger.clone()))?;
    let session_id = connection.session().id.clone();
    tracing::info!("[InspectorProxy] Session {} attached ({:?})", session_id, debugger_type);

    let result = loop {
        tokio::select! {
            msg = device_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(forward) = connection.handle_device_message(&text).await {
                            let _ = to_debugger.send(forward);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("[InspectorProxy] Device closed connection");
                        break Ok(());
                    }
                    Some(Err(e)) => break Err(e.into()),
                    _ => {}
                }
            }
            msg = debugger_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(forward) = connection.handle_debugger_message(&text).await {
                            if let Err(e) = device_sink.send(Message::Text(forward)).await {
                                break Err(e.into());
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("[InspectorProxy] Debugger closed connection");
                        break Ok(());
                    }
                    Some(Err(e)) => break Err(e.into()),
                    _ => {}
                }
            }
        }
    };

    // Handler state goes with the session
    drop(connection);
    drop(to_debugger);
    let _ = writer.await;
    let _ = device_sink.close().await;
    tracing::info!("[InspectorProxy] Session {} detached", session_id);

    result
}
