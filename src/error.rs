//! Error taxonomy for the bastion modules.
//!
//! A 404 on a lookup is not an error: gateways report it as
//! [`Lookup::NotFound`](crate::azure::Lookup).

use std::fmt;
use thiserror::Error;

/// Remote call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    CreateOrUpdate,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let verb = match self {
            Operation::Get => "fetching",
            Operation::CreateOrUpdate => "creating",
            Operation::Delete => "deleting",
        };
        write!(f, "{verb}")
    }
}

#[derive(Debug, Error)]
pub enum BastionError {
    /// A parameter required by the requested state or path is missing or malformed.
    #[error("{0}")]
    Configuration(String),

    /// Existing resource is failed or still in flight.
    #[error("Error {name} has a provisioning state of {state}. Expecting state to be Succeeded.")]
    ProvisioningState { name: String, state: String },

    /// Any other failure talking to Resource Manager.
    #[error("Error {operation} {resource}: {message}")]
    Remote {
        operation: Operation,
        resource: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Failed to obtain an Azure access token: {0}")]
    Credential(String),
}

impl BastionError {
    pub fn remote(
        operation: Operation,
        resource: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> BastionError {
        BastionError::Remote {
            operation,
            resource: resource.into(),
            status,
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, BastionError::Configuration(_))
    }
}
