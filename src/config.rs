//! Operator command line and environment configuration
//!
//! Every Pingdom setting can be given as a flag or through the environment;
//! a flag always wins. Empty values count as missing.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::error::{Error, Result};
use crate::pingdom::{PingdomConfig, DEFAULT_BASE_URL};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "pingdom-operator")]
#[command(about = "Keeps Pingdom HTTP checks in sync with HttpCheck resources", long_about = None)]
#[command(version)]
pub struct OperatorArgs {
    /// The address the metrics endpoint binds to
    #[arg(long, default_value = "0.0.0.0:8080", env = "METRICS_ADDR")]
    pub metrics_addr: SocketAddr,

    /// The Pingdom username (account e-mail)
    #[arg(long, env = "PINGDOM_USERNAME", hide_env_values = true)]
    pub pingdom_username: Option<String>,

    /// The Pingdom password
    #[arg(long, env = "PINGDOM_PASSWORD", hide_env_values = true)]
    pub pingdom_password: Option<String>,

    /// The Pingdom API key
    #[arg(long, env = "PINGDOM_API_KEY", hide_env_values = true)]
    pub pingdom_api_key: Option<String>,

    /// Base URL of the Pingdom API
    #[arg(long, default_value = DEFAULT_BASE_URL, env = "PINGDOM_BASE_URL")]
    pub pingdom_base_url: String,

    /// Timeout for a single Pingdom API request, in seconds
    #[arg(long, default_value_t = 30)]
    pub pingdom_timeout_secs: u64,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl OperatorArgs {
    /// Assemble the Pingdom client configuration, failing on missing credentials
    pub fn pingdom_config(&self) -> Result<PingdomConfig> {
        let username = required(&self.pingdom_username, "username")?;
        let password = required(&self.pingdom_password, "password")?;
        let api_key = required(&self.pingdom_api_key, "api key")?;

        if self.pingdom_timeout_secs == 0 {
            return Err(Error::ConfigError(
                "pingdom timeout must be at least one second".to_string(),
            ));
        }

        Ok(PingdomConfig {
            username,
            password,
            api_key,
            base_url: self.pingdom_base_url.clone(),
            timeout: Duration::from_secs(self.pingdom_timeout_secs),
        })
    }
}

fn required(value: &Option<String>, what: &str) -> Result<String> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(Error::ConfigError(format!("could not find pingdom {}", what))),
    }
}
