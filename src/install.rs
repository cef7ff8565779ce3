//! Clone and install registered MCP servers.

use std::path::Path;

use serde_json::json;

use crate::error::OpError;
use crate::paths::Paths;
use crate::registry::RegistryStore;
use crate::response::OperationResult;
use crate::runner::{CommandRunner, ShellCommand};

/// Install a server by (fuzzy) name: clone its repository under the servers
/// directory, run `npm install`, then any custom install commands. Steps run
/// in order and the first failure aborts the rest.
pub fn install(
    store: &mut RegistryStore,
    paths: &Paths,
    runner: &dyn CommandRunner,
    name: &str,
) -> OperationResult {
    try_install(store, paths, runner, name).into()
}

fn try_install(
    store: &mut RegistryStore,
    paths: &Paths,
    runner: &dyn CommandRunner,
    name: &str,
) -> Result<OperationResult, OpError> {
    store.load()?;
    let server = store
        .find(name)
        .cloned()
        .ok_or_else(|| OpError::NotFound(name.to_string()))?;

    if server.repo.trim().is_empty() {
        return Err(OpError::Validation(format!(
            "Server '{}' has no repository URL",
            server.name
        )));
    }

    let dir_name = install_dir_name(&server.repo).unwrap_or_else(|| sanitize(name));
    let servers_dir = paths.servers_dir();
    std::fs::create_dir_all(servers_dir).map_err(|e| OpError::CreateDir {
        path: servers_dir.to_path_buf(),
        source: e,
    })?;
    let clone_dir = servers_dir.join(dir_name);

    for step in install_steps(&server.repo, &clone_dir, server.install_commands.as_deref()) {
        runner.run(&step)?;
    }

    tracing::info!(server = %server.name, path = %clone_dir.display(), "server installed");
    Ok(OperationResult::ok_with(
        format!("Installed '{}'. Path: {}", name, clone_dir.display()),
        json!({
            "installPath": clone_dir.to_string_lossy(),
            "serverName": server.name,
            "description": server.description,
        }),
    ))
}

/// Clone, dependency install, then custom commands, all but the clone run inside `clone_dir`.
pub fn install_steps(
    repo: &str,
    clone_dir: &Path,
    custom: Option<&[String]>,
) -> Vec<ShellCommand> {
    let mut steps = vec![
        ShellCommand::new(
            "git",
            [
                "clone".to_string(),
                repo.to_string(),
                clone_dir.to_string_lossy().into_owned(),
            ],
        ),
        ShellCommand::shell("npm install").current_dir(clone_dir),
    ];
    for cmd in custom.unwrap_or_default() {
        steps.push(ShellCommand::shell(cmd).current_dir(clone_dir));
    }
    steps
}

/// Directory name for a repository URL: its last path segment without `.git`,
/// restricted to filesystem-safe characters.
pub fn install_dir_name(repo: &str) -> Option<String> {
    let last = repo.trim().trim_end_matches('/').rsplit('/').next()?;
    let last = last.strip_suffix(".git").unwrap_or(last);
    let name = sanitize(last);
    if name.is_empty() || name.chars().all(|c| c == '.') {
        None
    } else {
        Some(name)
    }
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
