//! Line-delimited JSON-RPC 2.0 framing for the tool channel.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorKind;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Map an error classification onto the wire code. Back-pressure and
/// shutdown denials share the invalid-request code with distinct messages.
pub fn error_code(kind: ErrorKind) -> i64 {
    match kind {
        ErrorKind::MethodNotFound => METHOD_NOT_FOUND,
        ErrorKind::BadRequest | ErrorKind::RateLimited | ErrorKind::ShuttingDown => INVALID_REQUEST,
        ErrorKind::Unauthorized | ErrorKind::NotFound => INVALID_REQUEST,
        ErrorKind::Execution | ErrorKind::Internal => INTERNAL_ERROR,
    }
}

/// Inbound JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct Request {
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Parameters of a `tools/call` invocation.
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Outbound JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn to_line(&self) -> String {
        // Serialization of this shape cannot fail
        serde_json::to_string(self).expect("response serialization failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_call_request() {
        let request: Request = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"containers_list","arguments":{"all":true}}}"#,
        )
        .unwrap();
        assert_eq!(request.method, "tools/call");

        let params: ToolCallParams = serde_json::from_value(request.params).unwrap();
        assert_eq!(params.name, "containers_list");
        assert_eq!(params.arguments["all"], true);
    }

    #[test]
    fn failure_omits_result() {
        let line = Response::failure(Some(1.into()), METHOD_NOT_FOUND, "Unknown tool: x").to_line();
        assert!(line.contains("-32601"));
        assert!(!line.contains("\"result\""));
    }

    #[test]
    fn kind_to_code_mapping() {
        assert_eq!(error_code(ErrorKind::MethodNotFound), METHOD_NOT_FOUND);
        assert_eq!(error_code(ErrorKind::RateLimited), INVALID_REQUEST);
        assert_eq!(error_code(ErrorKind::ShuttingDown), INVALID_REQUEST);
        assert_eq!(error_code(ErrorKind::Execution), INTERNAL_ERROR);
    }
}
