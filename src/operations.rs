//! Registry operations: register, remove, list, readme, configure.

use crate::error::OpError;
use crate::models::ServerRecord;
use crate::registry::{RegistryStore, Upsert};
use crate::response::OperationResult;

const NO_README: &str = "No README content available for this server.";

const README_PROMPT: &str = "\
---
<CURRENT_CURSOR_POSITION>

Summary: What does this MCP server do? (1-2 sentences)

Setup: List required/optional parameters, env vars needed.

Examples:
- Working npx command example
- JSON config example for integration

Next steps: How to get started quickly?

Note any unclear/missing information.
";

/// Insert or replace a record by exact name.
pub fn register(store: &mut RegistryStore, record: ServerRecord) -> OperationResult {
    try_register(store, record).into()
}

fn try_register(store: &mut RegistryStore, record: ServerRecord) -> Result<OperationResult, OpError> {
    store.load()?;
    let name = record.name.clone();
    let action = match store.upsert(record) {
        Upsert::Inserted => "registered",
        Upsert::Updated => "updated",
    };
    store.save()?;
    Ok(OperationResult::ok(format!(
        "Server '{}' {} successfully.",
        name, action
    )))
}

/// Delete the record with exactly this name.
pub fn remove(store: &mut RegistryStore, name: &str) -> OperationResult {
    try_remove(store, name).into()
}

fn try_remove(store: &mut RegistryStore, name: &str) -> Result<OperationResult, OpError> {
    store.load()?;
    if !store.remove(name) {
        return Err(OpError::NotFound(name.to_string()));
    }
    store.save()?;
    Ok(OperationResult::ok(format!("Server '{}' removed.", name)))
}

/// All registered servers; `data` holds the records.
pub fn list(store: &mut RegistryStore) -> OperationResult {
    if let Err(e) = store.load() {
        return OpError::from(e).into();
    }
    let servers = store.servers();
    let data = serde_json::to_value(servers).unwrap_or_default();
    OperationResult::ok_with(format!("Found {} MCP servers", servers.len()), data)
}

/// README help document for a server; `data` holds the document text.
pub fn readme(store: &mut RegistryStore, name: &str) -> OperationResult {
    try_readme(store, name).into()
}

fn try_readme(store: &mut RegistryStore, name: &str) -> Result<OperationResult, OpError> {
    store.load()?;
    let server = store
        .find(name)
        .ok_or_else(|| OpError::NotFound(name.to_string()))?;
    Ok(OperationResult::ok_with(
        "README fetch successful",
        readme_document(name, server).into(),
    ))
}

/// Configuration guide: a heading, the description, and the README document.
/// Fails when the server has no README text.
pub fn configure(store: &mut RegistryStore, name: &str) -> OperationResult {
    try_configure(store, name).into()
}

fn try_configure(store: &mut RegistryStore, name: &str) -> Result<OperationResult, OpError> {
    store.load()?;
    let server = store
        .find(name)
        .ok_or_else(|| OpError::NotFound(name.to_string()))?;
    if server.readme.as_deref().map_or(true, |r| r.trim().is_empty()) {
        return Err(OpError::Validation(format!(
            "README not available for '{}'",
            name
        )));
    }

    let mut lines = vec![format!("Config guide for '{}'", name)];
    if !server.description.is_empty() {
        lines.push(format!("Description: {}", server.description));
    }
    lines.push(readme_document(name, server));
    Ok(OperationResult::ok_lines(lines))
}

/// README text wrapped with a heading and prompts that guide an LLM through setup.
pub fn readme_document(name: &str, server: &ServerRecord) -> String {
    let mut doc = format!("# {} README\n", name);
    if !server.description.is_empty() {
        doc.push_str(&format!("\n> {}\n", server.description));
    }
    doc.push('\n');
    doc.push_str(
        server
            .readme
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(NO_README),
    );
    doc.push_str("\n\n");
    doc.push_str(README_PROMPT);
    doc
}
