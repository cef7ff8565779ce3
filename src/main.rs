//! mcp-auto-install CLI

use std::collections::BTreeMap;

use clap::{ArgAction, Parser, Subcommand};
use mcp_auto_install::{
    configure, install, list, package_scopes, parse_config, readme, register, remove,
    save_command, server, NpmIndex, OperationResult, Paths, ProcessRunner, RegistryStore,
    SaveCommandRequest, ServerRecord,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mcp-auto-install", version)]
#[command(about = "A tool for managing MCP server sources and installing MCP servers from GitHub")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP Auto Install server on stdio
    #[command(visible_alias = "connect")]
    Start {
        /// Return responses in JSON format (for programmatic use)
        #[arg(long)]
        json: bool,
    },

    /// Add or update an MCP server source in the registry
    AddSource {
        /// Server name
        name: String,

        /// GitHub repository URL
        #[arg(short, long)]
        repo: String,

        /// Command to run the server
        #[arg(short, long)]
        command: String,

        /// Description of the server
        #[arg(short, long, default_value = "")]
        description: String,

        /// Comma-separated keywords
        #[arg(short, long)]
        keywords: Option<String>,

        /// Comma-separated custom installation commands
        #[arg(short, long)]
        install_commands: Option<String>,
    },

    /// Install an MCP server from its repository
    Install {
        /// Server name (partial, case-insensitive match)
        name: String,
    },

    /// List all registered MCP server sources
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Get the README content for an MCP server
    Readme {
        /// Server name (partial, case-insensitive match)
        name: String,
    },

    /// Get configuration help for an MCP server
    ConfigureServer {
        /// Server name (partial, case-insensitive match)
        name: String,
    },

    /// Remove a registered MCP server
    Remove {
        /// Exact server name
        name: String,
    },

    /// Parse and save JSON configuration for MCP servers
    ParseConfig {
        /// JSON of the form {"mcpServers": {"name": {"command": "...", "args": [...]}}}
        config: String,

        /// Return result as JSON without modifying config files
        #[arg(long)]
        json: bool,
    },

    /// Save a command for a server to the external config file
    SaveCommand {
        /// Server name (partial, case-insensitive match)
        server_name: String,

        /// Command to execute (e.g. npx)
        command: String,

        /// Argument for the command being saved (repeat for each one, e.g. -p -y -p pkg)
        #[arg(short, long, num_args = 1, action = ArgAction::Append, allow_hyphen_values = true)]
        params: Vec<String>,

        /// Environment variable as KEY=VALUE (repeatable)
        #[arg(short, long)]
        env: Vec<String>,

        /// A description of what this MCP service does
        #[arg(long)]
        description: Option<String>,

        /// Return result as JSON without modifying config files
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug, matches!(cli.command, Commands::Start { .. }));

    let paths = Paths::resolve();
    let mut store = RegistryStore::new(paths.registry_path());

    match cli.command {
        Commands::Start { json } => {
            paths.check_settings();
            let index = match NpmIndex::from_env() {
                Ok(i) => i,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            let scopes = package_scopes();
            if let Err(e) = server::start(&mut store, &paths, &index, &scopes, json) {
                eprintln!("Failed to start server: {}", e);
                std::process::exit(1);
            }
        }
        Commands::AddSource {
            name,
            repo,
            command,
            description,
            keywords,
            install_commands,
        } => {
            let record = ServerRecord {
                name,
                repo,
                command,
                description,
                keywords: split_list(keywords.as_deref()),
                install_commands: install_commands.as_deref().map(|c| split_list(Some(c))),
                ..Default::default()
            };
            print_result(&register(&mut store, record), false);
        }
        Commands::Install { name } => {
            print_result(&install(&mut store, &paths, &ProcessRunner, &name), false);
        }
        Commands::List { json } => {
            let result = list(&mut store);
            if json || !result.success {
                print_result(&result, json);
                return;
            }
            let servers: Vec<ServerRecord> = result
                .data
                .and_then(|d| serde_json::from_value(d).ok())
                .unwrap_or_default();
            print_server_list(&servers);
        }
        Commands::Readme { name } => {
            let result = readme(&mut store, &name);
            if !result.success {
                print_result(&result, false);
                return;
            }
            println!("README for {}:", name);
            println!();
            println!(
                "{}",
                result
                    .data
                    .as_ref()
                    .and_then(|d| d.as_str())
                    .unwrap_or("No README content available.")
            );
        }
        Commands::ConfigureServer { name } => {
            let result = configure(&mut store, &name);
            if result.success {
                println!("Configuration for {}:", name);
                println!();
            }
            print_result(&result, false);
        }
        Commands::Remove { name } => {
            print_result(&remove(&mut store, &name), false);
        }
        Commands::ParseConfig { config, json } => {
            paths.check_settings();
            print_result(&parse_config(&paths, &config, json), json);
        }
        Commands::SaveCommand {
            server_name,
            command,
            params,
            env,
            description,
            json,
        } => {
            paths.check_settings();
            let request = SaveCommandRequest {
                server_name,
                command,
                args: params,
                env: parse_env(&env),
                description,
            };
            print_result(&save_command(&mut store, &paths, request, json), json);
        }
    }
}

fn init_tracing(debug: bool, serving: bool) {
    let default_filter = if debug {
        "mcp_auto_install=debug,info"
    } else if serving {
        "info"
    } else {
        "warn"
    };
    // stdout is reserved for protocol frames and command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_result(result: &OperationResult, json: bool) {
    if json {
        match serde_json::to_string_pretty(result) {
            Ok(output) => println!("{output}"),
            Err(e) => eprintln!("Error: {}", e),
        }
    } else if result.success {
        for line in &result.message {
            println!("{}", line);
        }
    } else {
        for line in &result.message {
            eprintln!("Error: {}", line);
        }
    }
    if !result.success {
        std::process::exit(1);
    }
}

fn split_list(list: Option<&str>) -> Vec<String> {
    list.map(|l| {
        l.split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_env(entries: &[String]) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    for entry in entries {
        match entry.split_once('=') {
            Some((key, value)) if !key.is_empty() && !value.is_empty() => {
                env.insert(key.to_string(), value.to_string());
            }
            _ => tracing::warn!(entry = %entry, "ignoring env entry, expected KEY=VALUE"),
        }
    }
    env
}

fn print_server_list(servers: &[ServerRecord]) {
    const INDENT: &str = "  ";

    if servers.is_empty() {
        println!("No MCP server sources registered.");
        return;
    }

    println!("Registered MCP server sources:");
    for s in servers {
        println!();
        println!("{}", s.name);
        println!("{}Description: {}", INDENT, s.description);
        println!("{}Repository:  {}", INDENT, s.repo);
        println!("{}Command:     {}", INDENT, s.command);
        if !s.keywords.is_empty() {
            println!("{}Keywords:    {}", INDENT, s.keywords.join(", "));
        }
    }
}
