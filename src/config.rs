//! Runtime configuration.
//!
//! Constants for the Azure Resource Manager API plus [`Config`], which is read
//! from the environment (a `.env` file is loaded by the binaries first).

use crate::error::BastionError;
use std::env;
use std::time::Duration;

/// Reserved subnet name the Bastion service requires inside its virtual network.
pub const BASTION_SUBNET_NAME: &str = "AzureBastionSubnet";

/// API version used for `Microsoft.Network` resources.
pub const NETWORK_API_VERSION: &str = "2021-05-01";

/// API version used for the resource group lookup.
pub const RESOURCE_GROUP_API_VERSION: &str = "2021-04-01";

/// Public Azure cloud Resource Manager endpoint.
pub const DEFAULT_RESOURCE_MANAGER: &str = "https://management.azure.com";

/// Pause between long running operation polls.
pub const SLEEP_MSEC: u64 = 5_000;

pub const POLL_TIMEOUT_SECS: u64 = 1_800;
pub const HTTP_TIMEOUT_SECS: u64 = 60;

/// Where the bearer token for Resource Manager comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthSource {
    /// `azure_identity` credential chain (environment, managed identity, az cli).
    #[default]
    Auto,
    /// `az account get-access-token`.
    Cli,
    /// Pre-issued token in `AZURE_ACCESS_TOKEN`.
    Token,
}

impl AuthSource {
    pub fn parse(value: &str) -> Result<AuthSource, BastionError> {
        match value.trim().to_lowercase().as_str() {
            "auto" | "" => Ok(AuthSource::Auto),
            "cli" => Ok(AuthSource::Cli),
            "token" => Ok(AuthSource::Token),
            other => Err(BastionError::Configuration(format!(
                "value of auth_source must be one of: auto, cli, token, got: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub resource_manager_endpoint: String,
    pub subscription_id: Option<String>,
    pub auth_source: AuthSource,
    pub access_token: Option<String>,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            resource_manager_endpoint: DEFAULT_RESOURCE_MANAGER.to_string(),
            subscription_id: None,
            auth_source: AuthSource::Auto,
            access_token: None,
            poll_interval: Duration::from_millis(SLEEP_MSEC),
            poll_timeout: Duration::from_secs(POLL_TIMEOUT_SECS),
            http_timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Build the configuration from `AZURE_*` environment variables.
    pub fn from_env() -> Result<Config, BastionError> {
        let mut config = Config::default();

        if let Some(endpoint) = non_empty_var("AZURE_RESOURCE_MANAGER_ENDPOINT") {
            config.resource_manager_endpoint = endpoint.trim_end_matches('/').to_string();
        }
        config.subscription_id = non_empty_var("AZURE_SUBSCRIPTION_ID");
        if let Some(source) = non_empty_var("AZURE_AUTH_SOURCE") {
            config.auth_source = AuthSource::parse(&source)?;
        }
        config.access_token = non_empty_var("AZURE_ACCESS_TOKEN");
        if let Some(msec) = numeric_var("AZURE_POLL_INTERVAL_MSEC")? {
            config.poll_interval = Duration::from_millis(msec);
        }
        if let Some(secs) = numeric_var("AZURE_POLL_TIMEOUT_SECS")? {
            config.poll_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = numeric_var("AZURE_HTTP_TIMEOUT_SECS")? {
            config.http_timeout = Duration::from_secs(secs);
        }

        log::debug!(
            "config endpoint={} auth_source={:?} subscription_set={}",
            config.resource_manager_endpoint,
            config.auth_source,
            config.subscription_id.is_some()
        );
        Ok(config)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn numeric_var(key: &str) -> Result<Option<u64>, BastionError> {
    match non_empty_var(key) {
        None => Ok(None),
        Some(value) => value.parse::<u64>().map(Some).map_err(|e| {
            BastionError::Configuration(format!("{key} must be a whole number, got '{value}': {e}"))
        }),
    }
}
