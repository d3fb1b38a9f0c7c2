//! Provisioning logic.
//!
//! - [`provisioner`] - the reconcile sequence over a [`ResourceGateway`](crate::azure::ResourceGateway)
//! - [`summary`] - projection of a bastion host onto the module output

mod provisioner;
mod summary;

// Re-export public types and functions
pub use provisioner::{Aborted, Outcome, Provisioner};
pub use summary::{summarize, BastionSummary, IpConfigurationSummary};
