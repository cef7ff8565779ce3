//! Writes command descriptors into the LLM client's config file.
//! Works on raw JSON so every key this tool does not own survives the rewrite.

use serde_json::{Map, Value};

use crate::error::OpError;
use crate::json_file::{self, JsonFileError};
use crate::models::{CommandConfig, SaveCommandRequest};
use crate::paths::{Paths, SETTINGS_PATH_VAR};
use crate::registry::RegistryStore;
use crate::response::OperationResult;

pub const MCP_SERVERS_KEY: &str = "mcpServers";

/// Save a command for a registered server into `mcpServers.<server_name>` of
/// the external config, then mirror it onto the registry record.
///
/// With `report_only` the computed [`CommandConfig`] is returned as `data` and
/// no file is touched. The external config write and the registry save are
/// not transactional; a failure in the latter leaves the former in place.
pub fn save_command(
    store: &mut RegistryStore,
    paths: &Paths,
    request: SaveCommandRequest,
    report_only: bool,
) -> OperationResult {
    try_save_command(store, paths, request, report_only).into()
}

fn try_save_command(
    store: &mut RegistryStore,
    paths: &Paths,
    request: SaveCommandRequest,
    report_only: bool,
) -> Result<OperationResult, OpError> {
    if request.command.trim().is_empty() {
        return Err(OpError::Validation("Command cannot be empty".to_string()));
    }

    store.load()?;
    let server = store
        .find(&request.server_name)
        .ok_or_else(|| OpError::NotFound(request.server_name.clone()))?;

    let description = request.description.filter(|d| !d.is_empty());
    let command_config = CommandConfig {
        name: server.name.clone(),
        command: request.command,
        args: request.args,
        env: request.env,
        description: description
            .clone()
            .unwrap_or_else(|| server.description.clone()),
    };
    let entry = serde_json::to_value(&command_config).map_err(JsonFileError::Serialize)?;

    if report_only {
        return Ok(OperationResult::ok_with("Command config generated", entry));
    }

    let config_path = paths
        .external_config_path()
        .ok_or(OpError::ConfigurationMissing {
            var: SETTINGS_PATH_VAR,
        })?;

    let mut config = json_file::read_object(config_path)?.unwrap_or_default();
    mcp_servers_mut(&mut config)?.insert(request.server_name.clone(), entry);
    json_file::write_pretty(config_path, &config)?;
    tracing::info!(server = %request.server_name, config = %config_path.display(), "command saved");

    if let Some(record) = store.find_mut(&request.server_name) {
        record.command_config = Some(command_config);
        if let Some(d) = description {
            record.description = d;
        }
    }
    store.save()?;

    Ok(OperationResult::ok(format!(
        "Command saved for '{}'",
        request.server_name
    )))
}

/// Validate a user-supplied `{ "mcpServers": { ... } }` document and merge its
/// servers into the external config. New entries win on name collision.
///
/// With `report_only` the validated document is returned as `data` and no file
/// is touched.
pub fn parse_config(paths: &Paths, config_json: &str, report_only: bool) -> OperationResult {
    try_parse_config(paths, config_json, report_only).into()
}

fn try_parse_config(
    paths: &Paths,
    config_json: &str,
    report_only: bool,
) -> Result<OperationResult, OpError> {
    let parsed: Value = serde_json::from_str(config_json)
        .map_err(|e| OpError::Validation(format!("Parse error: {}", e)))?;
    let mut user_config = match parsed {
        Value::Object(map) => map,
        _ => {
            return Err(OpError::Validation(
                "Config must be a JSON object".to_string(),
            ))
        }
    };

    let servers = mcp_servers_mut(&mut user_config)?;
    for (name, entry) in servers.iter() {
        validate_server_entry(name, entry)?;
    }
    let new_servers = servers.clone();

    if report_only {
        return Ok(OperationResult::ok_with(
            "Config parsed",
            Value::Object(user_config),
        ));
    }

    let config_path = paths
        .external_config_path()
        .ok_or(OpError::ConfigurationMissing {
            var: SETTINGS_PATH_VAR,
        })?;

    let mut existing = json_file::read_object(config_path)?.unwrap_or_default();
    let merged = mcp_servers_mut(&mut existing)?;
    let count = new_servers.len();
    for (name, entry) in new_servers {
        merged.insert(name, entry);
    }
    json_file::write_pretty(config_path, &existing)?;
    tracing::info!(servers = count, config = %config_path.display(), "config merged");

    Ok(OperationResult::ok("Config saved"))
}

/// Every server entry needs a non-empty `command` string and an `args` array.
fn validate_server_entry(name: &str, entry: &Value) -> Result<(), OpError> {
    let has_command = entry
        .get("command")
        .and_then(|c| c.as_str())
        .is_some_and(|c| !c.is_empty());
    let has_args = entry.get("args").is_some_and(|a| a.is_array());
    if has_command && has_args {
        Ok(())
    } else {
        Err(OpError::Validation(format!(
            "Invalid config for '{}'. Require 'command' and 'args' fields.",
            name
        )))
    }
}

/// The `mcpServers` object, created when absent or null.
fn mcp_servers_mut(config: &mut Map<String, Value>) -> Result<&mut Map<String, Value>, OpError> {
    let servers = config
        .entry(MCP_SERVERS_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    if servers.is_null() {
        *servers = Value::Object(Map::new());
    }
    servers.as_object_mut().ok_or_else(|| {
        OpError::Validation(format!("'{}' must be a JSON object", MCP_SERVERS_KEY))
    })
}
