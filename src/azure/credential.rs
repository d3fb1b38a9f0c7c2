//! Bearer token acquisition for Resource Manager.

use super::cli;
use crate::config::{AuthSource, Config};
use crate::error::BastionError;
use azure_core::auth::TokenCredential;
use azure_identity::DefaultAzureCredential;

/// Token plus whatever subscription the credential source knows about.
#[derive(Debug, Clone)]
pub struct Token {
    pub bearer: String,
    pub subscription_id: Option<String>,
}

/// Acquire a token for `config.resource_manager_endpoint` from the configured source.
pub async fn acquire(config: &Config) -> Result<Token, BastionError> {
    let endpoint = config.resource_manager_endpoint.trim_end_matches('/');
    match config.auth_source {
        AuthSource::Token => {
            let bearer = config.access_token.clone().ok_or_else(|| {
                BastionError::Credential("auth_source=token but AZURE_ACCESS_TOKEN is not set".into())
            })?;
            Ok(Token {
                bearer,
                subscription_id: None,
            })
        }
        AuthSource::Cli => {
            let token = cli::get_access_token(&format!("{endpoint}/"))?;
            log::info!(
                "Using az cli token, tenant={}",
                token.tenant.as_deref().unwrap_or("unknown")
            );
            Ok(Token {
                bearer: token.access_token,
                subscription_id: token.subscription,
            })
        }
        AuthSource::Auto => {
            let credential = default_credential();
            let scope = format!("{endpoint}/.default");
            let token = credential
                .get_token(&[scope.as_str()])
                .await
                .map_err(|e| BastionError::Credential(e.to_string()))?;
            log::info!("Using azure_identity token, expires_on={}", token.expires_on);
            Ok(Token {
                bearer: token.token.secret().to_string(),
                subscription_id: None,
            })
        }
    }
}

/// Environment, managed identity, then az CLI credential chain.
fn default_credential() -> DefaultAzureCredential {
    DefaultAzureCredential::default()
}
