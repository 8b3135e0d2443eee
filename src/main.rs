use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use govulndb::{
    affected_components,
    config::Config,
    output::{print_components, print_entries, print_entry, ComponentReport, OutputFormat},
    Client, Entry, Error, PackageRequest,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const VULNERABLE: u8 = 2;
    pub const NOT_FOUND: u8 = 3;
}

#[derive(Parser)]
#[command(name = "govulndb")]
#[command(
    author,
    version,
    about = "Look up known vulnerabilities in a Go vulnerability database"
)]
struct Cli {
    /// Database to read (http(s):// URL, file:// URL or directory)
    #[arg(long, global = true)]
    source: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Read configuration from this file instead of the default location
    #[arg(long = "config-file", global = true, value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Log debug information to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List vulnerabilities affecting a module
    Package {
        /// Module path ("std" for the standard library)
        module: String,

        /// Only report vulnerabilities affecting this package
        #[arg(short, long)]
        package: Option<String>,

        /// Only report vulnerabilities affecting this version (v1.2.3, go1.21.4)
        #[arg(long = "module-version", value_name = "VERSION")]
        module_version: Option<String>,
    },

    /// Show one vulnerability
    Id {
        /// Vulnerability ID, e.g. GO-2022-0969
        id: String,
    },

    /// Find the vulnerability with an alias (CVE or GHSA ID)
    Alias {
        /// Alias, e.g. CVE-2022-27664
        alias: String,
    },

    /// List every vulnerability in the database
    List,

    /// Show the packages, symbols and versions a vulnerability affects
    Components {
        /// Vulnerability ID, e.g. GO-2022-0969
        id: String,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "govulndb=debug"
    } else {
        "govulndb=info"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    let config = match &cli.config_file {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };

    let format_str = cli.format.unwrap_or_else(|| config.default_format.clone());
    let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table;

    let source = cli.source.unwrap_or_else(|| config.source.clone());
    let open_client = || {
        debug!(%source, "opening vulnerability database");
        Client::new(&source, config.client_config())
    };

    match cli.command {
        Commands::Package {
            module,
            package,
            module_version,
        } => {
            let module = if module == govulndb::model::GO_STD_MODULE_PATH {
                govulndb::model::STDLIB_MODULE_PATH.to_string()
            } else {
                module
            };
            let req = PackageRequest::new(module)
                .with_package(package.unwrap_or_default())
                .with_version(module_version.unwrap_or_default());

            let client = open_client()?;
            let entries = with_spinner(
                is_interactive,
                format!("Looking up {}...", req),
                client.by_package(&req),
            )
            .await?;
            let entries = without_ignored(entries, &config);

            print_entries(&entries, format)?;
            Ok(if entries.is_empty() {
                exit_codes::SUCCESS
            } else {
                exit_codes::VULNERABLE
            })
        }
        Commands::Id { id } => match open_client()?.by_id(&id).await? {
            Some(entry) => {
                print_entry(&entry, format)?;
                Ok(exit_codes::SUCCESS)
            }
            None => {
                eprintln!("No vulnerability with ID {}.", id);
                Ok(exit_codes::NOT_FOUND)
            }
        },
        Commands::Alias { alias } => match open_client()?.by_alias(&alias).await {
            Ok(id) => {
                println!("{}", id);
                Ok(exit_codes::SUCCESS)
            }
            Err(e @ Error::AliasNotFound { .. }) => {
                eprintln!("{}.", e);
                Ok(exit_codes::NOT_FOUND)
            }
            Err(e) => Err(e).context("looking up alias"),
        },
        Commands::List => {
            let client = open_client()?;
            let entries = with_spinner(
                is_interactive,
                "Fetching all vulnerabilities...".to_string(),
                client.entries(),
            )
            .await?;
            let entries = without_ignored(entries, &config);
            print_entries(&entries, format)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Components { id } => match open_client()?.by_id(&id).await? {
            Some(entry) => {
                let (packages, modules) = affected_components(&entry);
                let report = ComponentReport {
                    id: &entry.id,
                    packages: &packages,
                    modules: &modules,
                };
                print_components(&report, format)?;
                Ok(exit_codes::SUCCESS)
            }
            None => {
                eprintln!("No vulnerability with ID {}.", id);
                Ok(exit_codes::NOT_FOUND)
            }
        },
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn without_ignored(entries: Vec<Entry>, config: &Config) -> Vec<Entry> {
    entries
        .into_iter()
        .filter(|e| {
            let ignored = config.ignore.should_ignore(&e.id, &e.aliases);
            if ignored {
                debug!(id = %e.id, "ignoring vulnerability");
            }
            !ignored
        })
        .collect()
}

/// Runs `task` while showing a spinner with `message` in interactive mode.
async fn with_spinner<T>(
    is_interactive: bool,
    message: String,
    task: impl Future<Output = govulndb::Result<T>>,
) -> govulndb::Result<T> {
    if !is_interactive {
        return task.await;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);

    let result = task.await;
    pb.finish_and_clear();
    result
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            println!("Delete it first if you want to regenerate.");
        } else {
            Config::default().save()?;
            println!("Created config file at: {}", config_path.display());
        }
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("# Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("# No config file found. Default configuration:");
        println!("# Create with: govulndb config --init");
        println!();
        println!("{}", Config::generate_default_config());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_shows_errors() {
        assert_eq!(default_filter(false), "govulndb=info");
        assert_eq!(default_filter(true), "govulndb=debug");
    }

    #[test]
    fn test_cli_parses_package_lookup() {
        let cli = Cli::try_parse_from([
            "govulndb",
            "package",
            "std",
            "-p",
            "net/http",
            "--module-version",
            "go1.21.4",
        ])
        .unwrap();

        match cli.command {
            Commands::Package {
                module,
                package,
                module_version,
            } => {
                assert_eq!(module, "std");
                assert_eq!(package.as_deref(), Some("net/http"));
                assert_eq!(module_version.as_deref(), Some("go1.21.4"));
            }
            _ => panic!("expected package command"),
        }
    }
}
