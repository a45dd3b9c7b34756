//! Line-delimited JSON-RPC 2.0 tool server (MCP over stdio).
//!
//! One request per line in, one response per line out. Notifications
//! (requests without an id) get no response. Protocol faults are
//! answered with JSON-RPC error objects and the loop keeps reading;
//! only I/O failure on the transport ends it.

use crate::{error::GenResult, sql_tools::SqlTools};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{BufRead, Write};

pub const SERVER_NAME: &str = "demo-data";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub struct ToolServer {
    tools: SqlTools,
}

impl ToolServer {
    pub fn new(tools: SqlTools) -> Self {
        Self { tools }
    }

    /// Serve until EOF on `reader`.
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> GenResult<()> {
        let mut buffer = String::new();
        loop {
            buffer.clear();
            let bytes_read = reader.read_line(&mut buffer)?;
            if bytes_read == 0 {
                break; // EOF
            }
            if buffer.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&buffer) {
                writeln!(writer, "{}", serde_json::to_string(&response)?)?;
                writer.flush()?;
            }
        }
        log::info!("Client closed stdin, shutting down");
        Ok(())
    }

    /// Handle one raw request line. None when no response is owed.
    pub fn handle_line(&self, line: &str) -> Option<Value> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => return Some(error_response(Value::Null, RpcError::new(PARSE_ERROR, e.to_string()))),
        };
        let request: RpcRequest = match serde_json::from_value(raw.clone()) {
            Ok(r) => r,
            Err(e) => {
                let id = raw.get("id").cloned().unwrap_or(Value::Null);
                return Some(error_response(id, RpcError::new(INVALID_REQUEST, e.to_string())));
            }
        };

        let Some(id) = request.id else {
            log::debug!("notification {}", request.method);
            return None;
        };
        let response = match self.dispatch(&request.method, &request.params) {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err(e) => error_response(id, e),
        };
        Some(response)
    }

    fn dispatch(&self, method: &str, params: &Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => {
                let version = params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_PROTOCOL_VERSION);
                Ok(json!({
                    "protocolVersion": version,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }))
            }
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_definitions() })),
            "tools/call" => self.call_tool(params),
            other => {
                log::warn!("Unknown method: {other}");
                Err(RpcError::new(METHOD_NOT_FOUND, format!("Method not found: {other}")))
            }
        }
    }

    fn call_tool(&self, params: &Value) -> Result<Value, RpcError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::new(INVALID_PARAMS, "missing tool name"))?;
        let empty = json!({});
        let args = params.get("arguments").unwrap_or(&empty);

        log::debug!("tools/call {name}");
        let text = match name {
            "query" => self.tools.query(required_str(args, "sql")?),
            "list_tables" => self.tools.list_tables(),
            "describe_table" => self.tools.describe_table(required_str(args, "table_name")?),
            "get_date_range" => {
                let table = required_str(args, "table_name")?;
                let column = args.get("date_column").and_then(Value::as_str).unwrap_or("date");
                self.tools.get_date_range(table, column)
            }
            other => return Err(RpcError::new(INVALID_PARAMS, format!("Unknown tool: {other}"))),
        };
        Ok(json!({
            "content": [{ "type": "text", "text": text }],
            "isError": false,
        }))
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, RpcError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::new(INVALID_PARAMS, format!("missing string argument '{key}'")))
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": error.code, "message": error.message },
    })
}

/// Tool descriptors advertised by `tools/list`.
pub fn tool_definitions() -> Value {
    json!([
        {
            "name": "query",
            "description": "Execute a SQL query against the demo database (SELECT only). Returns rows as CSV.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "sql": { "type": "string", "description": "The SQL query to execute" }
                },
                "required": ["sql"]
            }
        },
        {
            "name": "list_tables",
            "description": "List all tables in the demo database with row counts.",
            "inputSchema": { "type": "object", "properties": {} }
        },
        {
            "name": "describe_table",
            "description": "Show column names, types, and a sample value for a table.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "table_name": { "type": "string", "description": "Name of the table to describe" }
                },
                "required": ["table_name"]
            }
        },
        {
            "name": "get_date_range",
            "description": "Get the minimum and maximum value of a date column in a table.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "table_name": { "type": "string", "description": "Name of the table" },
                    "date_column": {
                        "type": "string",
                        "description": "Name of the date column",
                        "default": "date"
                    }
                },
                "required": ["table_name"]
            }
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> ToolServer {
        ToolServer::new(SqlTools::new("/nonexistent/never.db"))
    }

    #[test]
    fn initialize_echoes_protocol_version() {
        let resp = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#)
            .unwrap();
        assert_eq!(resp["id"], 1);
        assert_eq!(resp["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(resp["result"]["serverInfo"]["name"], SERVER_NAME);
    }

    #[test]
    fn notifications_get_no_response() {
        assert!(server()
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .is_none());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let resp = server().handle_line("{not json").unwrap();
        assert_eq!(resp["error"]["code"], PARSE_ERROR);
        assert_eq!(resp["id"], Value::Null);
    }

    #[test]
    fn unknown_method_and_tool() {
        let s = server();
        let resp = s.handle_line(r#"{"jsonrpc":"2.0","id":"a","method":"resources/list"}"#).unwrap();
        assert_eq!(resp["error"]["code"], METHOD_NOT_FOUND);

        let resp = s
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"drop_all"}}"#)
            .unwrap();
        assert_eq!(resp["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn missing_argument_is_invalid_params() {
        let resp = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"query","arguments":{}}}"#)
            .unwrap();
        assert_eq!(resp["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn rejected_query_is_text_not_error() {
        let resp = server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"query","arguments":{"sql":"DELETE FROM x"}}}"#,
            )
            .unwrap();
        assert_eq!(resp["result"]["isError"], false);
        assert_eq!(resp["result"]["content"][0]["text"], crate::sql_tools::REJECTED_QUERY);
    }

    #[test]
    fn lists_four_tools() {
        let names: Vec<String> = tool_definitions()
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["query", "list_tables", "describe_table", "get_date_range"]);
    }
}
