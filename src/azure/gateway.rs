//! The boundary the provisioner talks to.
//!
//! A [`ResourceGateway`] reads, writes and deletes one ARM resource at a time.
//! Writes return only once the resource has settled.

use crate::error::BastionError;
use crate::models::{DesiredState, Provisioned, ResourceRef, SUCCEEDED};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Outcome of a lookup. A missing resource is an expected answer, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(resource) => Some(resource),
            Lookup::NotFound => None,
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait ResourceGateway {
    /// Fetch a resource; 404 maps to [`Lookup::NotFound`].
    async fn get<T>(&self, resource: &ResourceRef) -> Result<Lookup<T>, BastionError>
    where
        T: DeserializeOwned;

    /// Create or replace a resource and return its final representation.
    async fn create_or_update<B, T>(
        &self,
        resource: &ResourceRef,
        body: &B,
    ) -> Result<T, BastionError>
    where
        B: Serialize,
        T: DeserializeOwned;

    async fn delete(&self, resource: &ResourceRef) -> Result<(), BastionError>;

    /// Refuse to work with a resource whose last operation did not succeed.
    ///
    /// Removing a resource is allowed whatever its state.
    fn check_provisioning_state<R: Provisioned>(
        &self,
        resource: &R,
        requested: DesiredState,
    ) -> Result<(), BastionError> {
        check_provisioning_state(resource, requested)
    }
}

pub fn check_provisioning_state<R: Provisioned>(
    resource: &R,
    requested: DesiredState,
) -> Result<(), BastionError> {
    match resource.provisioning_state() {
        Some(state) if state != SUCCEEDED && requested != DesiredState::Absent => {
            Err(BastionError::ProvisioningState {
                name: resource.display_name().to_string(),
                state: state.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Decode a response body, naming the JSON path on failure.
pub(crate) fn decode<T: DeserializeOwned>(
    text: &str,
    resource: &ResourceRef,
    operation: crate::error::Operation,
) -> Result<T, BastionError> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::error!("RESPONSE START:\n\n{text}\n\nRESPONSE END\n");
        BastionError::remote(
            operation,
            resource.to_string(),
            None,
            format!("unexpected response at path={} error={}", e.path(), e),
        )
    })
}
