//! Package index client: lists the packages published under an npm scope.

use std::error::Error;
use std::time::Duration;

use serde_json::Value;

pub const NPM_REGISTRY_VAR: &str = "MCP_NPM_REGISTRY";
pub const DEFAULT_NPM_REGISTRY: &str = "https://registry.npmjs.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);
const PAGE_SIZE: usize = 250;

/// A published package as reported by the index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageInfo {
    pub name: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub repository: Option<String>,
    pub readme: Option<String>,
}

/// Source of package metadata for a scope.
pub trait PackageIndex {
    fn scope_packages(&self, scope: &str) -> Result<Vec<PackageInfo>, IndexError>;
}

/// npm registry search API over blocking HTTP.
#[derive(Debug, Clone)]
pub struct NpmIndex {
    client: reqwest::blocking::Client,
    base_url: String,
    retries: u32,
    retry_delay: Duration,
}

impl NpmIndex {
    /// Client for `MCP_NPM_REGISTRY`, or the public npm registry.
    pub fn from_env() -> Result<Self, IndexError> {
        let base = std::env::var(NPM_REGISTRY_VAR)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_NPM_REGISTRY.to_string());
        Self::new(&base)
    }

    pub fn new(base_url: &str) -> Result<Self, IndexError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("mcp-auto-install/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(IndexError::HttpClient)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retries: RETRIES,
            retry_delay: RETRY_DELAY,
        })
    }

    fn get_json(&self, url: &str) -> Result<Value, IndexError> {
        let mut attempt = 0;
        loop {
            let result = self
                .client
                .get(url)
                .send()
                .and_then(|resp| resp.error_for_status())
                .and_then(|resp| resp.json::<Value>());
            match result {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(url, attempt, error = %e, "index request failed, retrying");
                    std::thread::sleep(self.retry_delay);
                }
                Err(e) => {
                    return Err(IndexError::FetchFailed {
                        url: url.to_string(),
                        cause: e,
                    })
                }
            }
        }
    }

    fn package_readme(&self, name: &str) -> Option<String> {
        let url = format!("{}/{}", self.base_url, name.replace('/', "%2F"));
        match self.get_json(&url) {
            Ok(doc) => doc
                .get("readme")
                .and_then(|r| r.as_str())
                .filter(|r| !r.trim().is_empty())
                .map(String::from),
            Err(e) => {
                tracing::debug!(package = name, error = %e, "readme unavailable");
                None
            }
        }
    }
}

impl PackageIndex for NpmIndex {
    fn scope_packages(&self, scope: &str) -> Result<Vec<PackageInfo>, IndexError> {
        let scope_name = scope.trim_start_matches('@');
        let prefix = format!("@{}/", scope_name);
        let mut packages: Vec<PackageInfo> = Vec::new();
        let mut from = 0;

        loop {
            let url = format!(
                "{}/-/v1/search?text=scope:{}&size={}&from={}",
                self.base_url, scope_name, PAGE_SIZE, from
            );
            let page = self.get_json(&url)?;
            let (hits, total) = parse_search_page(&page)?;
            let fetched = hits.len();
            packages.extend(hits.into_iter().filter(|p| p.name.starts_with(&prefix)));
            from += fetched;
            if fetched == 0 || from >= total {
                break;
            }
        }

        for pkg in &mut packages {
            pkg.readme = self.package_readme(&pkg.name);
        }

        tracing::debug!(scope, count = packages.len(), "scope packages fetched");
        Ok(packages)
    }
}

/// Parse one page of `/-/v1/search` into packages and the reported total.
pub fn parse_search_page(page: &Value) -> Result<(Vec<PackageInfo>, usize), IndexError> {
    let objects = page
        .get("objects")
        .and_then(|o| o.as_array())
        .ok_or(IndexError::InvalidResponse)?;
    let total = page
        .get("total")
        .and_then(|t| t.as_u64())
        .map(|t| t as usize)
        .unwrap_or(objects.len());

    let packages = objects
        .iter()
        .filter_map(|obj| obj.get("package"))
        .filter_map(package_from_value)
        .collect();

    Ok((packages, total))
}

fn package_from_value(pkg: &Value) -> Option<PackageInfo> {
    let name = pkg.get("name").and_then(|n| n.as_str())?.to_string();
    let description = pkg
        .get("description")
        .and_then(|d| d.as_str())
        .filter(|d| !d.is_empty())
        .map(String::from);
    let keywords = pkg
        .get("keywords")
        .and_then(|k| k.as_array())
        .map(|k| {
            k.iter()
                .filter_map(|v| v.as_str())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    let repository = pkg
        .get("links")
        .and_then(|l| l.get("repository"))
        .and_then(|r| r.as_str())
        .filter(|r| !r.is_empty())
        .map(String::from);

    Some(PackageInfo {
        name,
        description,
        keywords,
        repository,
        readme: None,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("Failed to fetch {url}: {}", error_chain(.cause))]
    FetchFailed { url: String, cause: reqwest::Error },
    #[error("Unexpected package index response")]
    InvalidResponse,
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut out = err.to_string();
    let mut source: Option<&(dyn Error + '_)> = err.source();
    while let Some(s) = source {
        out.push_str("\n  Caused by: ");
        out.push_str(&s.to_string());
        source = s.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_search_hits() {
        let page = json!({
            "total": 2,
            "objects": [
                {"package": {
                    "name": "@modelcontextprotocol/server-git",
                    "description": "Git tools",
                    "keywords": ["git"],
                    "links": {"repository": "https://github.com/x/servers"}
                }},
                {"package": {"name": "@modelcontextprotocol/sdk"}}
            ]
        });

        let (packages, total) = parse_search_page(&page).unwrap();

        assert_eq!(total, 2);
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].keywords, vec!["git".to_string()]);
        assert_eq!(
            packages[0].repository.as_deref(),
            Some("https://github.com/x/servers")
        );
        assert!(packages[1].description.is_none());
        assert!(packages[1].keywords.is_empty());
    }

    #[test]
    fn missing_objects_is_invalid() {
        assert!(matches!(
            parse_search_page(&json!({"total": 0})),
            Err(IndexError::InvalidResponse)
        ));
    }
}
