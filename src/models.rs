//! Data structures for the registry file and command descriptors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Registry file at `MCP_REGISTRY_PATH` (default `~/mcp/mcp-registry.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySettings {
    #[serde(default)]
    pub servers: Vec<ServerRecord>,
}

/// A known MCP server package. `name` is unique within the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    pub name: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_commands: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_config: Option<CommandConfig>,
}

/// Command descriptor written under `mcpServers.<name>` in the LLM client config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub description: String,
}

/// Caller input for `save_command`.
#[derive(Debug, Clone, Default)]
pub struct SaveCommandRequest {
    pub server_name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_optional_fields_are_omitted() {
        let record = ServerRecord {
            name: "demo".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("readme"));
        assert!(!obj.contains_key("installCommands"));
        assert!(!obj.contains_key("commandConfig"));
    }

    #[test]
    fn record_reads_camel_case_fields() {
        let record: ServerRecord = serde_json::from_str(
            r#"{"name":"x","repo":"r","command":"c","description":"d","keywords":[],
                "installCommands":["npm run build"]}"#,
        )
        .unwrap();
        assert_eq!(
            record.install_commands,
            Some(vec!["npm run build".to_string()])
        );
    }
}
