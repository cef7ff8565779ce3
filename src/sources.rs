//! Package scopes queried during preload.

pub const PACKAGE_SCOPES_VAR: &str = "MCP_PACKAGE_SCOPES";

/// Scope used when `MCP_PACKAGE_SCOPES` is unset.
pub const DEFAULT_PACKAGE_SCOPES: &[&str] = &["@modelcontextprotocol"];

/// Load package scopes from the environment, falling back to the default scope.
pub fn package_scopes() -> Vec<String> {
    match std::env::var(PACKAGE_SCOPES_VAR) {
        Ok(val) if !val.trim().is_empty() => parse_scopes(&val),
        _ => DEFAULT_PACKAGE_SCOPES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Split a comma-separated scope list, trimming entries and dropping empties.
pub fn parse_scopes(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
