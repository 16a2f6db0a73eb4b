//! CDP methods the proxy inspects
//!
//! Only the fields handlers actually read are typed. Everything else in a
//! message passes through untouched.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::protocol::{CdpMessage, EmptyResult, ScriptId};

/// `Debugger.scriptParsed` (device event)
pub struct ScriptParsed;

/// A field of the wrong type reads as absent instead of failing the event
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptParsedParams {
    #[serde(rename = "scriptId", default, deserialize_with = "lenient")]
    pub script_id: Option<ScriptId>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(rename = "sourceMapURL", default, deserialize_with = "lenient")]
    pub source_map_url: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl CdpMessage for ScriptParsed {
    const METHOD: &'static str = "Debugger.scriptParsed";
    type Params = ScriptParsedParams;
    type Result = EmptyResult;
}

/// `Debugger.getScriptSource`
pub struct GetScriptSource;

#[derive(Debug, Clone, Deserialize)]
pub struct GetScriptSourceParams {
    #[serde(rename = "scriptId")]
    pub script_id: ScriptId,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetScriptSourceResult {
    #[serde(rename = "scriptSource")]
    pub script_source: String,
}

impl CdpMessage for GetScriptSource {
    const METHOD: &'static str = "Debugger.getScriptSource";
    type Params = GetScriptSourceParams;
    type Result = GetScriptSourceResult;
}

/// `Debugger.getPossibleBreakpoints`
pub struct GetPossibleBreakpoints;

#[derive(Debug, Clone, Default, Serialize)]
pub struct GetPossibleBreakpointsResult {
    pub locations: Vec<Value>,
}

impl CdpMessage for GetPossibleBreakpoints {
    const METHOD: &'static str = "Debugger.getPossibleBreakpoints";
    type Params = IgnoredAny;
    type Result = GetPossibleBreakpointsResult;
}

/// `Debugger.setBreakpointByUrl`, rewritten in place, never answered
pub struct SetBreakpointByUrl;

impl CdpMessage for SetBreakpointByUrl {
    const METHOD: &'static str = "Debugger.setBreakpointByUrl";
    type Params = IgnoredAny;
    type Result = Value;
}

/// `Runtime.getProperties`, the response is sanitized in place
pub struct GetProperties;

impl CdpMessage for GetProperties {
    const METHOD: &'static str = "Runtime.getProperties";
    type Params = IgnoredAny;
    type Result = Value;
}

/// `Runtime.callFunctionOn`
pub struct CallFunctionOn;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CallFunctionOnResult {
    /// Empty remote object, reads as `undefined` on the debugger side
    pub result: EmptyResult,
}

impl CdpMessage for CallFunctionOn {
    const METHOD: &'static str = "Runtime.callFunctionOn";
    type Params = IgnoredAny;
    type Result = CallFunctionOnResult;
}

/// `Network.getResponseBody`
pub struct GetResponseBody;

#[derive(Debug, Clone, Deserialize)]
pub struct GetResponseBodyParams {
    #[serde(rename = "requestId")]
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetResponseBodyResult {
    pub body: String,
    #[serde(rename = "base64Encoded", default)]
    pub base64_encoded: bool,
}

impl CdpMessage for GetResponseBody {
    const METHOD: &'static str = "Network.getResponseBody";
    type Params = GetResponseBodyParams;
    type Result = GetResponseBodyResult;
}

/// `Expo(Network.receivedResponseBody)`, a device-only extension event that
/// pushes a response body before the debugger asks for it
pub struct ReceivedResponseBody;

#[derive(Debug, Clone, Deserialize)]
pub struct ReceivedResponseBodyParams {
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(flatten)]
    pub response: GetResponseBodyResult,
}

impl CdpMessage for ReceivedResponseBody {
    const METHOD: &'static str = "Expo(Network.receivedResponseBody)";
    type Params = ReceivedResponseBodyParams;
    type Result = EmptyResult;
}

/// `Page.reload`
pub struct PageReload;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageReloadParams {
    #[serde(rename = "ignoreCache", default)]
    pub ignore_cache: bool,
}

impl CdpMessage for PageReload {
    const METHOD: &'static str = "Page.reload";
    type Params = PageReloadParams;
    type Result = EmptyResult;
}

/// `Runtime.consoleAPICalled` (proxy-originated event)
pub struct ConsoleApiCalled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleApiCalledParams {
    #[serde(rename = "type")]
    pub kind: String,
    pub args: Vec<Value>,
    #[serde(rename = "executionContextId")]
    pub execution_context_id: i64,
}

impl CdpMessage for ConsoleApiCalled {
    const METHOD: &'static str = "Runtime.consoleAPICalled";
    type Params = ConsoleApiCalledParams;
    type Result = EmptyResult;
}
