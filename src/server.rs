//! MCP tool server over stdio: newline-delimited JSON-RPC on stdin/stdout.
//!
//! ## Tools
//!
//! - `mcp_auto_install_getAvailableServers` - list registered servers
//! - `mcp_auto_install_removeServer` - unregister a server by exact name
//! - `mcp_auto_install_configureServer` - README-based configuration guide
//! - `mcp_auto_install_saveCommand` - write a command into the LLM client config

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use serde_json::{json, Value};

use crate::config::save_command;
use crate::models::SaveCommandRequest;
use crate::operations;
use crate::package_index::PackageIndex;
use crate::paths::Paths;
use crate::preload::preload;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
use crate::registry::{RegistryError, RegistryStore};
use crate::response::OperationResult;
use crate::schema::ArgSchema;

pub const SERVER_NAME: &str = "mcp-auto-install";

pub const TOOL_GET_AVAILABLE_SERVERS: &str = "mcp_auto_install_getAvailableServers";
pub const TOOL_REMOVE_SERVER: &str = "mcp_auto_install_removeServer";
pub const TOOL_CONFIGURE_SERVER: &str = "mcp_auto_install_configureServer";
pub const TOOL_SAVE_COMMAND: &str = "mcp_auto_install_saveCommand";

/// Load the registry, merge packages from `scopes`, then serve stdin/stdout
/// until stdin closes.
pub fn start(
    store: &mut RegistryStore,
    paths: &Paths,
    index: &dyn PackageIndex,
    scopes: &[String],
    json_only: bool,
) -> Result<(), ServerError> {
    tracing::info!("initializing MCP server");
    store.load()?;

    tracing::info!(scopes = ?scopes, "loading MCP packages");
    if let Err(e) = preload(store, index, scopes) {
        tracing::warn!(error = %e, "package preload failed");
    }

    let mut server = ToolServer::new(store, paths, json_only);
    tracing::info!("MCP server started and ready");
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    server.serve(stdin.lock(), stdout.lock())?;
    Ok(())
}

/// Dispatches tool-server requests against one registry.
pub struct ToolServer<'a> {
    store: &'a mut RegistryStore,
    paths: &'a Paths,
    json_only: bool,
}

impl<'a> ToolServer<'a> {
    pub fn new(store: &'a mut RegistryStore, paths: &'a Paths, json_only: bool) -> Self {
        Self {
            store,
            paths,
            json_only,
        }
    }

    /// Read one request per line, write one response per line. Notifications
    /// and blank lines produce no output.
    pub fn serve<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> std::io::Result<()> {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line) {
                let frame = serde_json::to_string(&response)?;
                writeln!(writer, "{}", frame)?;
                writer.flush()?;
            }
        }
        tracing::debug!("stdin closed, stopping MCP server");
        Ok(())
    }

    pub fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::new(JsonRpcError::PARSE_ERROR, format!("Parse error: {}", e)),
                ))
            }
        };
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request),
            Err(e) => Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::new(JsonRpcError::INVALID_REQUEST, e.to_string()),
            )),
        }
    }

    pub fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %request.method, "request");
        if request.is_notification() {
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);
        let params = request.params.unwrap_or(Value::Null);

        let result = match request.method.as_str() {
            "initialize" => Ok(json!({
                "protocolVersion": MCP_PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")},
            })),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({"tools": tool_definitions()})),
            "tools/call" => self.call_tool(&params),
            other => Err(JsonRpcError::new(
                JsonRpcError::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn call_tool(&mut self, params: &Value) -> Result<Value, JsonRpcError> {
        let name = params
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| JsonRpcError::new(JsonRpcError::INVALID_PARAMS, "Missing tool name"))?;
        let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let result = match name {
            TOOL_GET_AVAILABLE_SERVERS => self.available_servers(),
            TOOL_REMOVE_SERVER => operations::remove(self.store, str_arg(&args, "serverName")),
            TOOL_CONFIGURE_SERVER => {
                operations::configure(self.store, str_arg(&args, "serverName"))
            }
            TOOL_SAVE_COMMAND => {
                let request = save_command_request(&args);
                save_command(self.store, self.paths, request, self.json_only)
            }
            other => {
                return Err(JsonRpcError::new(
                    JsonRpcError::METHOD_NOT_FOUND,
                    format!("Unknown tool: {}", other),
                ))
            }
        };

        Ok(tool_reply(&result, self.json_only))
    }

    fn available_servers(&mut self) -> OperationResult {
        if let Err(e) = self.store.load() {
            return OperationResult::error(e.to_string());
        }
        let servers = self.store.servers();
        let lines = servers
            .iter()
            .map(|s| {
                if s.description.is_empty() {
                    format!("• {}", s.name)
                } else {
                    format!("• {}: {}", s.name, s.description)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        OperationResult::ok_lines(vec![format!("Found {} MCP servers", servers.len()), lines])
    }
}

/// Tool-call result: text content plus the success flag; `data` only in JSON mode.
pub fn tool_reply(result: &OperationResult, json_only: bool) -> Value {
    let content: Vec<Value> = result
        .text_items()
        .into_iter()
        .map(|text| json!({"type": "text", "text": text}))
        .collect();

    let mut reply = json!({
        "content": content,
        "success": result.success,
        "isError": !result.success,
    });
    if json_only {
        if let Some(ref data) = result.data {
            reply["data"] = data.clone();
        }
    }
    reply
}

/// Tool descriptors advertised by `tools/list`.
pub fn tool_definitions() -> Vec<Value> {
    let server_name_only = ArgSchema::Object(vec![("serverName", ArgSchema::String)]);
    vec![
        json!({
            "name": TOOL_GET_AVAILABLE_SERVERS,
            "description": "List all available MCP servers that can be installed. Returns a list of server names and their basic information. Use this to discover what MCP servers are available before installing or configuring them.",
            "inputSchema": ArgSchema::Object(vec![("random_string", ArgSchema::String)]).to_json_schema(),
        }),
        json!({
            "name": TOOL_REMOVE_SERVER,
            "description": "Remove a registered MCP server from the local registry. This will unregister the server but won't uninstall it. Provide the exact server name to remove. Use getAvailableServers first to see registered servers.",
            "inputSchema": server_name_only.to_json_schema(),
        }),
        json!({
            "name": TOOL_CONFIGURE_SERVER,
            "description": "Get detailed configuration help for a specific MCP server. Provides README content, configuration instructions, and suggested commands.",
            "inputSchema": server_name_only.to_json_schema(),
        }),
        json!({
            "name": TOOL_SAVE_COMMAND,
            "description": "Save an npx command configuration for an MCP server. This stores the command, arguments and environment variables in both the MCP settings and LLM configuration files. Use this to persist server-specific command configurations.",
            "inputSchema": ArgSchema::Object(vec![
                ("serverName", ArgSchema::String),
                ("command", ArgSchema::String),
                ("args", ArgSchema::array(ArgSchema::String)),
                ("env", ArgSchema::optional(ArgSchema::record(ArgSchema::String))),
                ("description", ArgSchema::String),
            ])
            .to_json_schema(),
        }),
    ]
}

fn str_arg<'v>(args: &'v Value, key: &str) -> &'v str {
    args.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn save_command_request(args: &Value) -> SaveCommandRequest {
    let string_list = |v: &Value| -> Vec<String> {
        v.as_array()
            .map(|a| a.iter().filter_map(|s| s.as_str()).map(String::from).collect())
            .unwrap_or_default()
    };
    let env: BTreeMap<String, String> = args
        .get("env")
        .and_then(|e| e.as_object())
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    SaveCommandRequest {
        server_name: str_arg(args, "serverName").to_string(),
        command: str_arg(args, "command").to_string(),
        args: args.get("args").map(string_list).unwrap_or_default(),
        env,
        description: args
            .get("description")
            .and_then(|d| d.as_str())
            .map(String::from),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("stdio transport error: {0}")]
    Io(#[from] std::io::Error),
}
