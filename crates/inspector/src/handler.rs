//! Handler System - ordered message interception
//!
//! Every handler sees a message in turn and may mutate it, answer it, or
//! claim it. The first claim stops the chain.
//!
//! Contract:
//! - Handlers run one after another on the *same* message, so a handler
//!   observes every mutation made by handlers registered before it.
//! - Order is an explicit `Vec`, fixed when the session starts.
//! - The pipeline never writes to sockets; handlers reply through the session.

use async_trait::async_trait;
use serde_json::Value;

use crate::cdp::Direction;
use crate::session::DebuggerSession;

/// Handler trait - inspects messages flowing through one session
///
/// Both capability methods decline by default, so a handler only
/// implements the direction it cares about.
#[async_trait]
pub trait InspectorHandler: Send {
    /// Human-readable name for logging
    fn name(&self) -> &str;

    /// Message travelling device -> debugger. Return `true` to claim it.
    async fn on_device_message(&mut self, message: &mut Value, session: &mut DebuggerSession) -> bool {
        let _ = (message, session);
        false
    }

    /// Message travelling debugger -> device. Return `true` to claim it.
    async fn on_debugger_message(&mut self, message: &mut Value, session: &mut DebuggerSession) -> bool {
        let _ = (message, session);
        false
    }
}

/// Ordered handler chain for one session
pub struct InspectorPipeline {
    handlers: Vec<Box<dyn InspectorHandler>>,
}

impl InspectorPipeline {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    pub fn with_handlers(handlers: Vec<Box<dyn InspectorHandler>>) -> Self {
        Self { handlers }
    }

    /// Append a handler at the end of the chain
    pub fn register(&mut self, handler: Box<dyn InspectorHandler>) {
        tracing::debug!("Registered handler: {}", handler.name());
        self.handlers.push(handler);
    }

    /// Handler names in dispatch order
    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Offer a message to every handler in order.
    ///
    /// Returns `true` when a handler claimed it; the caller must not forward
    /// it. On `false` the caller forwards the (possibly mutated) message.
    pub async fn dispatch(
        &mut self,
        direction: Direction,
        message: &mut Value,
        session: &mut DebuggerSession,
    ) -> bool {
        for handler in self.handlers.iter_mut() {
            let handled = match direction {
                Direction::FromDevice => handler.on_device_message(message, session).await,
                Direction::FromDebugger => handler.on_debugger_message(message, session).await,
            };

            if handled {
                tracing::trace!("[InspectorPipeline] {} claimed {:?} message", handler.name(), direction);
                return true;
            }
        }
        false
    }
}

impl Default for InspectorPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DebuggerType;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts calls, claims debugger messages when `claim` is set
    struct CountingHandler {
        name: String,
        claim: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl InspectorHandler for CountingHandler {
        fn name(&self) -> &str {
            &self.name
        }

        async fn on_debugger_message(&mut self, _message: &mut Value, _session: &mut DebuggerSession) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.claim
        }
    }

    /// Tags the message, then records what it saw
    struct TaggingHandler;

    #[async_trait]
    impl InspectorHandler for TaggingHandler {
        fn name(&self) -> &str {
            "TaggingHandler"
        }

        async fn on_device_message(&mut self, message: &mut Value, _session: &mut DebuggerSession) -> bool {
            message["tag"] = json!("seen");
            false
        }
    }

    struct ObservingHandler {
        observed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl InspectorHandler for ObservingHandler {
        fn name(&self) -> &str {
            "ObservingHandler"
        }

        async fn on_device_message(&mut self, message: &mut Value, _session: &mut DebuggerSession) -> bool {
            if message["tag"] == json!("seen") {
                self.observed.fetch_add(1, Ordering::SeqCst);
            }
            false
        }
    }

    fn session() -> DebuggerSession {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        DebuggerSession::new(Arc::new(tx), DebuggerType::Generic)
    }

    #[tokio::test]
    async fn test_first_claim_stops_dispatch() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let third = Arc::new(AtomicUsize::new(0));

        let mut pipeline = InspectorPipeline::new();
        pipeline.register(Box::new(CountingHandler {
            name: "first".into(),
            claim: false,
            calls: first.clone(),
        }));
        pipeline.register(Box::new(CountingHandler {
            name: "second".into(),
            claim: true,
            calls: second.clone(),
        }));
        pipeline.register(Box::new(CountingHandler {
            name: "third".into(),
            claim: true,
            calls: third.clone(),
        }));
        assert_eq!(pipeline.names(), vec!["first", "second", "third"]);

        let mut session = session();
        let mut message = json!({"id": 1, "method": "Debugger.enable"});
        assert!(
            pipeline
                .dispatch(Direction::FromDebugger, &mut message, &mut session)
                .await
        );

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unclaimed_message_is_forwarded() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handlers: Vec<Box<dyn InspectorHandler>> = vec![Box::new(CountingHandler {
            name: "debugger-only".into(),
            claim: true,
            calls: calls.clone(),
        })];
        let mut pipeline = InspectorPipeline::with_handlers(handlers);

        // Device direction uses the declining default
        let mut session = session();
        let mut message = json!({"method": "Runtime.executionContextCreated"});
        assert!(
            !pipeline
                .dispatch(Direction::FromDevice, &mut message, &mut session)
                .await
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_later_handlers_observe_earlier_mutations() {
        let observed = Arc::new(AtomicUsize::new(0));
        let handlers: Vec<Box<dyn InspectorHandler>> = vec![
            Box::new(TaggingHandler),
            Box::new(ObservingHandler {
                observed: observed.clone(),
            }),
        ];
        let mut pipeline = InspectorPipeline::with_handlers(handlers);

        let mut session = session();
        let mut message = json!({"method": "Debugger.paused"});
        assert!(
            !pipeline
                .dispatch(Direction::FromDevice, &mut message, &mut session)
                .await
        );

        assert_eq!(observed.load(Ordering::SeqCst), 1);
        assert_eq!(message["tag"], json!("seen"));
    }
}
