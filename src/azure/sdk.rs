//! Typed transport.
//!
//! Same wire resources as the REST transport but with pinned API versions and
//! long running operations awaited to completion, the way the Azure SDK
//! pollers behave: `Azure-AsyncOperation` is preferred, `Location` is the
//! fallback for 202 responses.

use super::arm::{ArmClient, ArmResponse};
use super::gateway::{decode, Lookup, ResourceGateway};
use crate::error::{BastionError, Operation};
use crate::models::ResourceRef;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Deserialize, Debug)]
struct OperationStatus {
    status: String,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Deserialize, Debug)]
struct OperationError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct SdkGateway {
    client: ArmClient,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl SdkGateway {
    pub fn new(client: ArmClient, poll_interval: Duration, poll_timeout: Duration) -> SdkGateway {
        SdkGateway {
            client,
            poll_interval,
            poll_timeout,
        }
    }

    async fn send(
        &self,
        operation: Operation,
        method: Method,
        resource: &ResourceRef,
        body: Option<Vec<u8>>,
    ) -> Result<ArmResponse, BastionError> {
        let url = self.client.url(&resource.path());
        self.client
            .send(method, &url, Some(resource.kind.default_api_version()), body)
            .await
            .map_err(|e| BastionError::remote(operation, resource.to_string(), None, e.to_string()))
    }

    /// Server hint or configured interval, never past the poll deadline.
    fn next_delay(&self, started: Instant, retry_after: Option<Duration>) -> Duration {
        let remaining = self.poll_timeout.saturating_sub(started.elapsed());
        retry_after.unwrap_or(self.poll_interval).min(remaining)
    }

    fn is_long_running(response: &ArmResponse) -> bool {
        response.async_operation.is_some()
            || (response.status == StatusCode::ACCEPTED && response.location.is_some())
    }

    /// Block until the operation started by `response` reaches a terminal state.
    async fn wait_for_completion(
        &self,
        operation: Operation,
        resource: &ResourceRef,
        response: &ArmResponse,
    ) -> Result<(), BastionError> {
        let started = Instant::now();
        let fail = |status: Option<u16>, message: String| {
            BastionError::remote(operation, resource.to_string(), status, message)
        };
        let mut delay = self.next_delay(started, response.retry_after);

        if let Some(url) = &response.async_operation {
            log::info!("Waiting for {resource} ({operation}) to complete");
            loop {
                if started.elapsed() > self.poll_timeout {
                    return Err(fail(None, format!("timed out after {:?}", self.poll_timeout)));
                }
                tokio::time::sleep(delay).await;
                let poll = self
                    .client
                    .send(Method::GET, url, None, None)
                    .await
                    .map_err(|e| fail(None, e.to_string()))?;
                if !poll.status.is_success() {
                    return Err(fail(Some(poll.status.as_u16()), poll.error_message()));
                }
                let status: OperationStatus = decode(&poll.text, resource, operation)?;
                log::debug!("{resource} operation status={}", status.status);
                match status.status.as_str() {
                    "Succeeded" => return Ok(()),
                    "Failed" | "Canceled" | "Cancelled" => {
                        let detail = status
                            .error
                            .map(|e| {
                                format!(
                                    "{}: {}",
                                    e.code.unwrap_or_default(),
                                    e.message.unwrap_or_default()
                                )
                            })
                            .unwrap_or_default();
                        return Err(fail(
                            None,
                            format!("operation {} {detail}", status.status).trim().to_string(),
                        ));
                    }
                    _ => delay = self.next_delay(started, poll.retry_after),
                }
            }
        }

        if let (StatusCode::ACCEPTED, Some(url)) = (response.status, &response.location) {
            log::info!("Waiting for {resource} ({operation}) to complete");
            loop {
                if started.elapsed() > self.poll_timeout {
                    return Err(fail(None, format!("timed out after {:?}", self.poll_timeout)));
                }
                tokio::time::sleep(delay).await;
                let poll = self
                    .client
                    .send(Method::GET, url, None, None)
                    .await
                    .map_err(|e| fail(None, e.to_string()))?;
                match poll.status {
                    StatusCode::ACCEPTED => delay = self.next_delay(started, poll.retry_after),
                    StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => return Ok(()),
                    StatusCode::NOT_FOUND if operation == Operation::Delete => return Ok(()),
                    status => return Err(fail(Some(status.as_u16()), poll.error_message())),
                }
            }
        }
        Ok(())
    }
}

impl ResourceGateway for SdkGateway {
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
        log::info!("Creating {resource}");
        let response = self
            .send(Operation::CreateOrUpdate, Method::PUT, resource, Some(body))
            .await?;
        if !matches!(
            response.status,
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED
        ) {
            return Err(BastionError::remote(
                Operation::CreateOrUpdate,
                resource.to_string(),
                Some(response.status.as_u16()),
                response.error_message(),
            ));
        }

        if !Self::is_long_running(&response) && !response.text.trim().is_empty() {
            return decode(&response.text, resource, Operation::CreateOrUpdate);
        }
        self.wait_for_completion(Operation::CreateOrUpdate, resource, &response)
            .await?;
        match self.get(resource).await? {
            Lookup::Found(created) => Ok(created),
            Lookup::NotFound => Err(BastionError::remote(
                Operation::CreateOrUpdate,
                resource.to_string(),
                None,
                "resource missing after the operation completed",
            )),
        }
    }

    async fn delete(&self, resource: &ResourceRef) -> Result<(), BastionError> {
        log::info!("Deleting {resource}");
        let response = self
            .send(Operation::Delete, Method::DELETE, resource, None)
            .await?;
        match response.status {
            StatusCode::OK | StatusCode::ACCEPTED | StatusCode::NO_CONTENT => {
                self.wait_for_completion(Operation::Delete, resource, &response)
                    .await
            }
            StatusCode::NOT_FOUND => {
                log::warn!("{resource} already gone");
                Ok(())
            }
            status => Err(BastionError::remote(
                Operation::Delete,
                resource.to_string(),
                Some(status.as_u16()),
                response.error_message(),
            )),
        }
    }
}
