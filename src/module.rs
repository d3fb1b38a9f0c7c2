//! Module invocation: arguments file in, result document out.

use crate::azure::{acquire, ArmClient, RestGateway, SdkGateway};
use crate::config::{AuthSource, Config};
use crate::error::BastionError;
use crate::models::BastionParams;
use crate::output::ModuleResult;
use crate::processing::{Aborted, Outcome, Provisioner};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Command line shared by both module binaries.
#[derive(Parser, Debug)]
#[command(version, about = "Create or delete an Azure Bastion host (Ansible binary module)")]
pub struct Cli {
    /// JSON arguments file written by Ansible
    pub args_file: PathBuf,
    /// Compute changes without applying them
    #[arg(long)]
    pub check: bool,
    /// log4rs configuration file
    #[arg(long, env = "AZURE_BASTION_LOG_CONFIG", default_value = crate::logging::DEFAULT_LOG_CONFIG)]
    pub log_config: String,
}

/// Which gateway backs the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// `azure_rm_bastion`: pinned API versions, long running operations awaited.
    Sdk,
    /// `azure_rm_bastion_rest`: raw REST calls, optional `api_version`.
    Rest,
}

/// Everything Ansible writes into the arguments file that this module reads.
#[derive(Deserialize, Debug, Default)]
pub struct ModuleArgs {
    #[serde(flatten)]
    pub params: BastionParams,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub auth_source: Option<String>,
    #[serde(default, rename = "_ansible_check_mode")]
    pub check_mode: bool,
}

pub fn read_args(path: &Path) -> Result<ModuleArgs, BastionError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        BastionError::Configuration(format!("Error reading arguments file {}: {e}", path.display()))
    })?;
    parse_args(&json)
}

pub fn parse_args(json: &str) -> Result<ModuleArgs, BastionError> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        BastionError::Configuration(format!(
            "Error parsing module arguments: path={} error={}",
            e.path(),
            e
        ))
    })
}

/// Load the arguments file and configuration from the environment, then run.
pub async fn run(transport: Transport, args_file: &Path, force_check: bool) -> ModuleResult {
    let args = match read_args(args_file) {
        Ok(args) => args,
        Err(e) => return ModuleResult::failure(false, e.to_string()),
    };
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => return ModuleResult::failure(false, e.to_string()),
    };
    match execute(transport, args, config, force_check).await {
        Ok(outcome) => outcome.into(),
        Err(aborted) => aborted.into(),
    }
}

/// Binary entry point: parse the command line, run, print the result document.
pub async fn main(transport: Transport) -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    if let Err(e) = crate::logging::init_logging(&cli.log_config) {
        eprintln!("Error initializing log4rs: {e}");
    }
    log::info!("#Start {transport:?} module, args={}", cli.args_file.display());

    let result = run(transport, &cli.args_file, cli.check).await;
    println!("{}", result.to_json());
    if result.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Validate, authenticate and reconcile with an explicit configuration.
pub async fn execute(
    transport: Transport,
    args: ModuleArgs,
    mut config: Config,
    force_check: bool,
) -> Result<Outcome, Aborted> {
    let not_started = |error: BastionError| Aborted {
        changed: false,
        error,
    };

    if transport == Transport::Sdk && args.params.api_version.is_some() {
        return Err(not_started(BastionError::Configuration(
            "Unsupported parameters: api_version".to_string(),
        )));
    }
    args.params.validate().map_err(not_started)?;
    if let Some(source) = args.auth_source.as_deref() {
        config.auth_source = AuthSource::parse(source).map_err(not_started)?;
    }

    let token = acquire(&config).await.map_err(not_started)?;
    let subscription_id = args
        .subscription_id
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or(config.subscription_id.clone())
        .or(token.subscription_id.clone())
        .ok_or_else(|| {
            not_started(BastionError::Configuration(
                "subscription_id is required: pass subscription_id or set AZURE_SUBSCRIPTION_ID"
                    .to_string(),
            ))
        })?;
    let client = ArmClient::new(
        &config.resource_manager_endpoint,
        &token.bearer,
        config.http_timeout,
    )
    .map_err(not_started)?;

    let check_mode = args.check_mode || force_check;
    log::info!(
        "{transport:?} run for bastion {} in {} (check_mode={check_mode})",
        args.params.name,
        args.params.resource_group
    );
    match transport {
        Transport::Sdk => {
            let gateway = SdkGateway::new(client, config.poll_interval, config.poll_timeout);
            Provisioner::new(gateway, subscription_id)
                .check_mode(check_mode)
                .reconcile(&args.params)
                .await
        }
        Transport::Rest => {
            let gateway = RestGateway::new(client, args.params.api_version.clone());
            Provisioner::new(gateway, subscription_id)
                .check_mode(check_mode)
                .reconcile(&args.params)
                .await
        }
    }
}
