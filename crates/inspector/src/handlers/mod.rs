//! Concrete Handler Implementations
//!
//! Each handler is a separate module. `create_handlers` is the registry: it
//! builds a fresh, ordered set for every debugger session.

pub mod address;
pub mod network;
pub mod ordering;
pub mod page_reload;
pub mod script_source;
pub mod vscode;

use std::sync::Arc;

pub use address::AddressNormalizationHandler;
pub use network::NetworkResponseHandler;
pub use ordering::ScriptParsedOrderingHandler;
pub use page_reload::{BundlerCache, DirectoryCache, PageReloadHandler};
pub use script_source::ScriptSourceHandler;
pub use vscode::{
    VscodeCallFunctionOnHandler, VscodeGetPossibleBreakpointsHandler, VscodeGetPropertiesHandler,
    VscodeSetBreakpointByUrlHandler,
};

use crate::config::ProxyConfig;
use crate::error::Result;
use crate::handler::InspectorHandler;

/// Build the handler chain for one session.
///
/// Order matters: handlers that answer or drop messages come first, so the
/// compatibility shims only ever see messages that survived them, and the
/// vscode shims see urls already normalized.
pub fn create_handlers(config: &ProxyConfig) -> Result<Vec<Box<dyn InspectorHandler>>> {
    let caches: Vec<Arc<dyn BundlerCache>> = config
        .cache_dirs
        .iter()
        .map(|dir| Arc::new(DirectoryCache::new(dir)) as Arc<dyn BundlerCache>)
        .collect();

    let handlers: Vec<Box<dyn InspectorHandler>> = vec![
        Box::new(ScriptParsedOrderingHandler::new()),
        Box::new(ScriptSourceHandler::new(config)?),
        Box::new(NetworkResponseHandler::new()),
        Box::new(
            PageReloadHandler::new(config.control_url.clone(), caches)
                .with_signal_timeout(config.reload_signal_timeout()),
        ),
        Box::new(AddressNormalizationHandler::new()),
        Box::new(VscodeGetPossibleBreakpointsHandler),
        Box::new(VscodeSetBreakpointByUrlHandler),
        Box::new(VscodeGetPropertiesHandler::new()),
        Box::new(VscodeCallFunctionOnHandler),
    ];
    Ok(handlers)
}
