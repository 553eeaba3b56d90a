//! output formatting utilities for scriptable CLI output
//!
//! uses JSON-RPC 2.0 format for machine-readable output:
//! - success: {"jsonrpc": "2.0", "result": {...}, "id": null}
//! - error: {"jsonrpc": "2.0", "error": {"code": N, "message": "..."}, "id": null}

use serde::Serialize;
use std::io::IsTerminal;

use crate::conditions::RuleSet;

/// JSON-RPC version constant
const JSONRPC_VERSION: &str = "2.0";

/// output mode determines how results are formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// human-readable text output
    Text,
    /// machine-readable JSON-RPC 2.0 output
    Json,
    /// no output on success (errors still go to stderr)
    Quiet,
}

impl OutputMode {
    /// determine output mode from CLI flags and environment
    ///
    /// priority: quiet > json > no_json > auto-detect
    pub fn from_flags(json: bool, no_json: bool, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        if json {
            return Self::Json;
        }
        if no_json {
            return Self::Text;
        }
        // auto-detect: JSON when stdout is not a TTY (piped)
        if !std::io::stdout().is_terminal() {
            Self::Json
        } else {
            Self::Text
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self, Self::Quiet)
    }
}

/// JSON-RPC 2.0 success response
#[derive(Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub result: T,
    /// null for CLI responses (no request id)
    pub id: Option<String>,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result,
            id: None,
        }
    }
}

/// JSON-RPC 2.0 error response
#[derive(Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: &'static str,
    pub error: RpcError,
    pub id: Option<String>,
}

/// JSON-RPC 2.0 error object
#[derive(Serialize)]
pub struct RpcError {
    /// exit code offset by -32000 (application error range)
    pub code: i32,
    pub message: String,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            error: RpcError {
                code: to_jsonrpc_code(code),
                message: message.into(),
            },
            id: None,
        }
    }
}

/// JSON-RPC reserves -32000 to -32099 for server/application errors
fn to_jsonrpc_code(exit_code: i32) -> i32 {
    -32000 - exit_code
}

// ============================================================================
// Result data structures for different commands
// ============================================================================

/// result of `check`
#[derive(Serialize)]
pub struct CheckData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    /// rule kind id, "" when the rule set has none
    pub showfor: String,
    pub known: bool,
    pub filtered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// one occurrence reported by `scan`
#[derive(Serialize)]
pub struct OccurrenceData {
    pub start: usize,
    pub end: usize,
    pub escaped: bool,
    pub self_closing: bool,
    pub attributes: RuleSet,
    /// `None` for escaped occurrences, which are never evaluated
    pub filtered: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Serialize)]
pub struct ScanData {
    pub tag: String,
    pub occurrences: Vec<OccurrenceData>,
}

/// result of `strip` when writing in place
#[derive(Serialize)]
pub struct StripData {
    pub path: String,
    pub elements: Vec<String>,
    pub changed: bool,
}

/// result of `render`
#[derive(Serialize)]
pub struct RenderData {
    pub element: String,
    /// whether rules were checked for this element
    pub checked: bool,
    pub filtered: bool,
    pub output: String,
}

#[derive(Serialize)]
pub struct ParamData {
    pub name: Option<String>,
    pub value: Option<String>,
}

#[derive(Serialize)]
pub struct PayloadData {
    pub payload: String,
}

#[derive(Serialize)]
pub struct DeviceData {
    pub id: &'static str,
    pub title: &'static str,
}

#[derive(Serialize)]
pub struct ListResponse<T: Serialize> {
    pub items: Vec<T>,
}

// ============================================================================
// Output functions
// ============================================================================

/// print JSON-RPC success response to stdout
pub fn print_json<T: Serialize>(data: &T) {
    let response = JsonRpcResponse::new(data);
    if let Ok(json) = serde_json::to_string(&response) {
        println!("{}", json);
    }
}

/// print JSON-RPC error to stdout
pub fn print_json_error(code: i32, message: &str) {
    let error = JsonRpcError::new(code, message);
    if let Ok(json) = serde_json::to_string(&error) {
        println!("{}", json);
    }
}
