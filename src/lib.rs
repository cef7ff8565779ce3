//! mcp-auto-install - MCP server registry manager
//!
//! Discovers MCP server packages, keeps a local JSON registry of them,
//! installs their repositories, and writes their launch commands into an
//! LLM client's config file.

pub mod config;
pub mod error;
pub mod install;
pub mod json_file;
pub mod models;
pub mod operations;
pub mod package_index;
pub mod paths;
pub mod preload;
pub mod protocol;
pub mod registry;
pub mod response;
pub mod runner;
pub mod schema;
pub mod server;
pub mod sources;

pub use config::{parse_config, save_command};
pub use error::OpError;
pub use install::install;
pub use models::{CommandConfig, RegistrySettings, SaveCommandRequest, ServerRecord};
pub use operations::{configure, list, readme, register, remove};
pub use package_index::{NpmIndex, PackageIndex, PackageInfo};
pub use paths::Paths;
pub use preload::preload;
pub use registry::{RegistryStore, Upsert};
pub use response::OperationResult;
pub use runner::{CommandRunner, ProcessRunner, ShellCommand};
pub use sources::package_scopes;
