//! Merge packages discovered in the package index into the registry.

use crate::models::ServerRecord;
use crate::package_index::{PackageIndex, PackageInfo};
use crate::registry::{RegistryError, RegistryStore};

/// The SDK is published under the default scope but is not a server.
pub const SDK_PACKAGE: &str = "@modelcontextprotocol/sdk";

/// Counts reported by [`preload`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadSummary {
    pub added: usize,
    pub readmes_backfilled: usize,
}

/// Fetch each scope and merge new servers into `store`.
///
/// A failing scope contributes no packages. Existing records are never
/// overwritten; they only receive a README when they had none. The registry is
/// saved at the end regardless of per-scope failures.
pub fn preload(
    store: &mut RegistryStore,
    index: &dyn PackageIndex,
    scopes: &[String],
) -> Result<PreloadSummary, RegistryError> {
    let mut summary = PreloadSummary::default();

    for scope in scopes {
        let packages = index.scope_packages(scope).unwrap_or_else(|e| {
            tracing::warn!(scope = %scope, error = %e, "failed to fetch packages for scope");
            Vec::new()
        });

        for pkg in packages {
            if pkg.name.is_empty() || pkg.name == SDK_PACKAGE {
                continue;
            }
            let record = record_from_package(pkg);

            match store.get_mut(&record.name) {
                Some(existing) => {
                    if existing.readme.is_none() && record.readme.is_some() {
                        existing.readme = record.readme;
                        summary.readmes_backfilled += 1;
                    }
                }
                None => {
                    store.upsert(record);
                    summary.added += 1;
                }
            }
        }
    }

    store.save()?;
    tracing::info!(
        added = summary.added,
        readmes = summary.readmes_backfilled,
        "package preload finished"
    );
    Ok(summary)
}

/// Build a registry record for a published package.
pub fn record_from_package(pkg: PackageInfo) -> ServerRecord {
    let server_type = server_type(&pkg.name);

    let mut keywords = pkg.keywords;
    keywords.push(server_type.clone());
    keywords.push("mcp".to_string());

    ServerRecord {
        command: format!("npx {}", pkg.name),
        description: pkg
            .description
            .unwrap_or_else(|| format!("MCP {} server", server_type)),
        repo: pkg.repository.unwrap_or_default(),
        keywords,
        readme: pkg.readme,
        name: pkg.name,
        install_commands: None,
        command_config: None,
    }
}

/// Trailing path segment of a package name with the first `mcp-` removed.
fn server_type(package_name: &str) -> String {
    let last = package_name.rsplit('/').next().unwrap_or(package_name);
    last.replacen("mcp-", "", 1)
}
