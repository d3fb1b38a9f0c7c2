//! Ansible binary modules that create and delete an Azure Bastion host together
//! with its `AzureBastionSubnet` and public IP.
//!
//! One [`Provisioner`](processing::Provisioner) drives either transport through
//! the [`ResourceGateway`](azure::ResourceGateway) trait.

pub mod azure;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod module;
pub mod output;
pub mod processing;

pub use error::{BastionError, Operation};
pub use module::{run, Transport};
pub use output::ModuleResult;
pub use processing::{BastionSummary, Outcome, Provisioner};
