//! Service bootstrap and initialization
//!
//! Command-line parsing, config resolution and logging setup for the
//! escalation service.

use clap::Parser;
use tracing::info;

use common::DEFAULT_API_HOST;

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::error::{EscSrvError, Result};

/// Command-line arguments for escsrv
#[derive(Parser, Clone)]
#[command(
    name = "escsrv",
    version = env!("CARGO_PKG_VERSION"),
    about = "Cascade Escalation Alerting Service",
    long_about = None
)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long)]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long)]
    pub log_level: Option<String>,

    /// Bind address for API server
    #[arg(short = 'b', long)]
    pub bind_address: Option<String>,

    /// Validation mode - only validate configuration without starting service
    #[arg(long)]
    pub validate: bool,
}

impl Args {
    /// Resolve the config file path: CLI flag, then `CONFIG_FILE` env,
    /// then the default location.
    pub fn config_path(&self) -> String {
        self.config
            .clone()
            .or_else(|| std::env::var("CONFIG_FILE").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }
}

/// Load and validate configuration per the resolved path
pub fn load_config(args: &Args) -> Result<Config> {
    let path = args.config_path();
    let config = Config::from_file(&path)?;
    config.validate()?;
    info!("Configuration loaded from {}", path);
    Ok(config)
}

/// Initialize logging, with the CLI flag winning over the config file
pub fn initialize_logging(args: &Args, config: &Config) -> Result<()> {
    let level = args.log_level.as_deref().unwrap_or(&config.log.level);
    common::logging::init(level)
        .map_err(|e| EscSrvError::config(format!("Failed to init logging: {}", e)))
}

/// Resolve the socket address the API server binds to
pub fn determine_bind_address(args: &Args, config: &Config) -> String {
    match &args.bind_address {
        Some(addr) if addr.contains(':') => addr.clone(),
        Some(addr) => format!("{}:{}", addr, config.api.port),
        None => {
            let host = if config.api.host.is_empty() {
                DEFAULT_API_HOST
            } else {
                &config.api.host
            };
            format!("{}:{}", host, config.api.port)
        },
    }
}
