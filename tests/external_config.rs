mod support;

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tempfile::TempDir;

use mcp_auto_install::{
    parse_config, register, save_command, RegistryStore, SaveCommandRequest,
};

use support::{demo_record, paths_in};

fn request(server_name: &str) -> SaveCommandRequest {
    SaveCommandRequest {
        server_name: server_name.to_string(),
        command: "npx".to_string(),
        args: vec!["-y".to_string(), "demo".to_string()],
        env: BTreeMap::from([("DEBUG".to_string(), "true".to_string())]),
        description: None,
    }
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn save_command_preserves_unrelated_keys() {
    let temp = TempDir::new().unwrap();
    let paths = paths_in(temp.path(), true);
    let config_path = paths.external_config_path().unwrap().to_path_buf();
    std::fs::write(
        &config_path,
        r#"{"foo": 1, "mcpServers": {"existing": {"command": "node", "args": []}}}"#,
    )
    .unwrap();
    let mut store = RegistryStore::new(paths.registry_path());
    register(&mut store, demo_record());

    let result = save_command(&mut store, &paths, request("demo"), false);

    assert!(result.success, "{:?}", result.message);
    let written = read_json(&config_path);
    assert_eq!(written["foo"], json!(1));
    assert_eq!(written["mcpServers"]["existing"]["command"], "node");
    assert_eq!(
        written["mcpServers"]["demo"],
        json!({
            "name": "demo",
            "command": "npx",
            "args": ["-y", "demo"],
            "env": {"DEBUG": "true"},
            "description": "d"
        })
    );
}

#[test]
fn save_command_mirrors_config_onto_registry_record() {
    let temp = TempDir::new().unwrap();
    let paths = paths_in(temp.path(), true);
    let mut store = RegistryStore::new(paths.registry_path());
    register(&mut store, demo_record());
    let mut req = request("DEMO");
    req.description = Some("Demo server".to_string());

    let result = save_command(&mut store, &paths, req, false);

    assert!(result.success, "{:?}", result.message);
    let reloaded = RegistryStore::open(paths.registry_path()).unwrap();
    let record = reloaded.get("demo").unwrap();
    assert_eq!(record.description, "Demo server");
    let saved = record.command_config.as_ref().unwrap();
    assert_eq!(saved.command, "npx");
    assert_eq!(saved.description, "Demo server");

    let written = read_json(paths.external_config_path().unwrap());
    assert!(written["mcpServers"].get("DEMO").is_some());
}

#[test]
fn save_command_report_only_leaves_file_untouched() {
    let temp = TempDir::new().unwrap();
    let paths = paths_in(temp.path(), true);
    let config_path = paths.external_config_path().unwrap().to_path_buf();
    let original = "{\n  \"foo\": 1\n}";
    std::fs::write(&config_path, original).unwrap();
    let mut store = RegistryStore::new(paths.registry_path());
    register(&mut store, demo_record());

    let ok = save_command(&mut store, &paths, request("demo"), true);
    let failed = save_command(&mut store, &paths, request("missing"), true);

    assert!(ok.success);
    assert_eq!(ok.data.unwrap()["command"], "npx");
    assert!(!failed.success);
    assert_eq!(std::fs::read_to_string(&config_path).unwrap(), original);
    assert!(store.get("demo").unwrap().command_config.is_none());
}

#[test]
fn save_command_rejects_empty_command() {
    let temp = TempDir::new().unwrap();
    let paths = paths_in(temp.path(), true);
    let mut store = RegistryStore::new(paths.registry_path());
    register(&mut store, demo_record());
    let mut req = request("demo");
    req.command = String::new();

    let result = save_command(&mut store, &paths, req, false);

    assert!(!result.success);
    assert_eq!(result.message, vec!["Command cannot be empty"]);
    assert!(!paths.external_config_path().unwrap().exists());
}

#[test]
fn save_command_without_settings_path_is_a_configuration_error() {
    let temp = TempDir::new().unwrap();
    let paths = paths_in(temp.path(), false);
    let mut store = RegistryStore::new(paths.registry_path());
    register(&mut store, demo_record());

    let result = save_command(&mut store, &paths, request("demo"), false);

    assert!(!result.success);
    assert!(result.message[0].contains("MCP_SETTINGS_PATH"));
}

#[test]
fn save_command_refuses_to_repair_invalid_json() {
    let temp = TempDir::new().unwrap();
    let paths = paths_in(temp.path(), true);
    let config_path = paths.external_config_path().unwrap().to_path_buf();
    std::fs::write(&config_path, "{ broken").unwrap();
    let mut store = RegistryStore::new(paths.registry_path());
    register(&mut store, demo_record());

    let result = save_command(&mut store, &paths, request("demo"), false);

    assert!(!result.success);
    assert!(result.message[0].starts_with("Config file error"));
    assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "{ broken");
    assert!(RegistryStore::open(paths.registry_path())
        .unwrap()
        .get("demo")
        .unwrap()
        .command_config
        .is_none());
}

#[test]
fn parse_config_names_server_missing_args() {
    let temp = TempDir::new().unwrap();
    let paths = paths_in(temp.path(), true);

    let result = parse_config(
        &paths,
        r#"{"mcpServers": {"ok": {"command": "npx", "args": []}, "weather": {"command": "npx"}}}"#,
        true,
    );

    assert!(!result.success);
    assert!(result.message[0].contains("'weather'"));
}

#[test]
fn parse_config_report_only_returns_document() {
    let temp = TempDir::new().unwrap();
    let paths = paths_in(temp.path(), true);

    let result = parse_config(&paths, r#"{"other": true}"#, true);

    assert!(result.success);
    assert_eq!(result.data.unwrap(), json!({"other": true, "mcpServers": {}}));
    assert!(!paths.external_config_path().unwrap().exists());
}

#[test]
fn parse_config_merges_with_new_entries_winning() {
    let temp = TempDir::new().unwrap();
    let paths = paths_in(temp.path(), true);
    let config_path = paths.external_config_path().unwrap().to_path_buf();
    std::fs::write(
        &config_path,
        r#"{"theme": "dark", "mcpServers": {"a": {"command": "old", "args": []}, "b": {"command": "keep", "args": []}}}"#,
    )
    .unwrap();

    let result = parse_config(
        &paths,
        r#"{"mcpServers": {"a": {"command": "new", "args": ["--x"]}, "c": {"command": "npx", "args": []}}}"#,
        false,
    );

    assert!(result.success, "{:?}", result.message);
    let written = read_json(&config_path);
    assert_eq!(written["theme"], "dark");
    assert_eq!(written["mcpServers"]["a"]["command"], "new");
    assert_eq!(written["mcpServers"]["b"]["command"], "keep");
    assert_eq!(written["mcpServers"]["c"]["command"], "npx");
}

#[test]
fn parse_config_rejects_malformed_json() {
    let temp = TempDir::new().unwrap();
    let paths = paths_in(temp.path(), true);

    let result = parse_config(&paths, "not json", false);

    assert!(!result.success);
    assert!(result.message[0].starts_with("Parse error"));
}

#[test]
fn save_command_keeps_key_order() {
    let temp = TempDir::new().unwrap();
    let paths = paths_in(temp.path(), true);
    let config_path = paths.external_config_path().unwrap().to_path_buf();
    std::fs::write(
        &config_path,
        r#"{"zeta": 1, "mcpServers": {"b": {"command": "node", "args": []}}, "alpha": 2}"#,
    )
    .unwrap();
    let mut store = RegistryStore::new(paths.registry_path());
    register(&mut store, demo_record());

    let result = save_command(&mut store, &paths, request("demo"), false);

    assert!(result.success, "{:?}", result.message);
    let text = std::fs::read_to_string(&config_path).unwrap();
    let position = |key: &str| text.find(&format!("\"{}\"", key)).unwrap();
    assert!(position("zeta") < position("mcpServers"));
    assert!(position("mcpServers") < position("alpha"));
    assert!(position("b") < position("demo"));
}

#[cfg(unix)]
#[test]
fn save_command_follows_symlinked_config_and_keeps_mode() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let paths = paths_in(temp.path(), true);
    let link = paths.external_config_path().unwrap().to_path_buf();
    let real = temp.path().join("dotfiles").join("claude_desktop_config.json");
    std::fs::create_dir_all(real.parent().unwrap()).unwrap();
    std::fs::write(&real, r#"{"foo": 1}"#).unwrap();
    std::fs::set_permissions(&real, std::fs::Permissions::from_mode(0o600)).unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();
    let mut store = RegistryStore::new(paths.registry_path());
    register(&mut store, demo_record());
    let mut req = request("demo");
    req.env = BTreeMap::from([("API_KEY".to_string(), "secret".to_string())]);

    let result = save_command(&mut store, &paths, req, false);

    assert!(result.success, "{:?}", result.message);
    assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    let written = read_json(&real);
    assert_eq!(written["foo"], json!(1));
    assert_eq!(written["mcpServers"]["demo"]["env"]["API_KEY"], "secret");
    let mode = std::fs::metadata(&real).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
