//! URL/address normalization
//!
//! Android emulators reach the host through special loopback addresses. The
//! debugger runs on the host, so script and source map urls are rewritten to
//! `localhost`, and the substitution is recorded on the session so breakpoint
//! urls coming back from the debugger can be mapped to what the device knows.
//!
//! Bare alphanumeric script urls are not valid urls to the debugger; they get
//! a `file://` prefix, which is stripped again on the way back.
//!
//! Active for every debugger kind.

use async_trait::async_trait;
use serde_json::Value;

use crate::cdp::methods::{ScriptParsed, SetBreakpointByUrl};
use crate::cdp::protocol::params_mut;
use crate::handler::InspectorHandler;
use crate::session::DebuggerSession;

/// Host addresses as seen from inside Android emulators
pub const EMULATOR_LOCALHOST_ADDRESSES: [&str; 2] = ["10.0.2.2", "10.0.3.2"];

pub const FILE_PREFIX: &str = "file://";

/// Rewrite the first emulator address in `url` to `localhost`.
///
/// Returns the rewritten url and the address that was replaced.
pub fn replace_emulator_address(url: &str) -> Option<(String, &'static str)> {
    EMULATOR_LOCALHOST_ADDRESSES
        .iter()
        .find(|address| url.contains(*address))
        .map(|address| (url.replacen(address, "localhost", 1), *address))
}

fn is_bare_script_url(url: &str) -> bool {
    !url.is_empty() && url.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
}

#[derive(Debug, Default)]
pub struct AddressNormalizationHandler;

impl AddressNormalizationHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InspectorHandler for AddressNormalizationHandler {
    fn name(&self) -> &str {
        "AddressNormalizationHandler"
    }

    async fn on_device_message(&mut self, message: &mut Value, session: &mut DebuggerSession) -> bool {
        let Some(params) = params_mut::<ScriptParsed>(message) else {
            return false;
        };

        for key in ["sourceMapURL", "url"] {
            if let Some(Value::String(url)) = params.get_mut(key) {
                if let Some((rewritten, address)) = replace_emulator_address(url) {
                    *url = rewritten;
                    session.original_source_url_address = Some(address.to_string());
                }
            }
        }

        if let Some(Value::String(url)) = params.get_mut("url") {
            if is_bare_script_url(url) {
                *url = format!("{}{}", FILE_PREFIX, url);
                session.prepended_file_prefix = true;
            }
        }

        false
    }

    async fn on_debugger_message(&mut self, message: &mut Value, session: &mut DebuggerSession) -> bool {
        let Some(params) = params_mut::<SetBreakpointByUrl>(message) else {
            return false;
        };

        if let Some(address) = session.original_source_url_address.as_deref() {
            if let Some(Value::String(url)) = params.get_mut("url") {
                *url = url.replacen("localhost", address, 1);
            }
            if let Some(Value::String(url_regex)) = params.get_mut("urlRegex") {
                *url_regex = url_regex.replace("localhost", address);
            }
        }

        if session.prepended_file_prefix {
            if let Some(Value::String(url)) = params.get_mut("url") {
                if let Some(stripped) = url.strip_prefix(FILE_PREFIX) {
                    *url = stripped.to_string();
                }
            }
        }

        false
    }
}
