//! Raw REST transport.
//!
//! Hand-built ARM URLs with per-resource API versions. Only the documented
//! success codes are accepted and long running operations are not followed.

use super::arm::ArmClient;
use super::gateway::{decode, Lookup, ResourceGateway};
use crate::error::{BastionError, Operation};
use crate::models::{ResourceKind, ResourceRef};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub struct RestGateway {
    client: ArmClient,
    /// Overrides the network API version; the resource group lookup keeps its own.
    api_version: Option<String>,
}

impl RestGateway {
    pub fn new(client: ArmClient, api_version: Option<String>) -> RestGateway {
        let api_version = api_version.filter(|v| !v.trim().is_empty());
        if let Some(version) = &api_version {
            log::info!("Using api-version {version} for network resources");
        }
        RestGateway {
            client,
            api_version,
        }
    }

    pub fn api_version(&self, kind: &ResourceKind) -> &str {
        match &self.api_version {
            Some(version) if kind.is_network() => version,
            _ => kind.default_api_version(),
        }
    }

    async fn send(
        &self,
        operation: Operation,
        method: Method,
        resource: &ResourceRef,
        body: Option<Vec<u8>>,
    ) -> Result<super::arm::ArmResponse, BastionError> {
        let url = self.client.url(&resource.path());
        self.client
            .send(method, &url, Some(self.api_version(&resource.kind)), body)
            .await
            .map_err(|e| BastionError::remote(operation, resource.to_string(), None, e.to_string()))
    }
}

impl ResourceGateway for RestGateway {
    async fn get<T>(&self, resource: &ResourceRef) -> Result<Lookup<T>, BastionError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(Operation::Get, Method::GET, resource, None).await?;
        match response.status {
            StatusCode::OK => decode(&response.text, resource, Operation::Get).map(Lookup::Found),
            StatusCode::NOT_FOUND => {
                log::debug!("{resource} not found");
                Ok(Lookup::NotFound)
            }
            status => Err(BastionError::remote(
                Operation::Get,
                resource.to_string(),
                Some(status.as_u16()),
                response.error_message(),
            )),
        }
    }

    async fn create_or_update<B, T>(
        &self,
        resource: &ResourceRef,
        body: &B,
    ) -> Result<T, BastionError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_vec(body).map_err(|e| {
            BastionError::remote(Operation::CreateOrUpdate, resource.to_string(), None, e.to_string())
        })?;
        log::info!("PUT {resource}");
        let response = self
            .send(Operation::CreateOrUpdate, Method::PUT, resource, Some(body))
            .await?;
        match response.status {
            StatusCode::OK | StatusCode::CREATED => {
                decode(&response.text, resource, Operation::CreateOrUpdate)
            }
            status => Err(BastionError::remote(
                Operation::CreateOrUpdate,
                resource.to_string(),
                Some(status.as_u16()),
                response.error_message(),
            )),
        }
    }

    async fn delete(&self, resource: &ResourceRef) -> Result<(), BastionError> {
        log::info!("DELETE {resource}");
        let response = self
            .send(Operation::Delete, Method::DELETE, resource, None)
            .await?;
        match response.status {
            StatusCode::OK => Ok(()),
            status => Err(BastionError::remote(
                Operation::Delete,
                resource.to_string(),
                Some(status.as_u16()),
                response.error_message(),
            )),
        }
    }
}
