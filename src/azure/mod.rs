//! Azure Resource Manager interaction.
//!
//! - [`cli`] - Azure CLI execution, used for `az` tokens
//! - [`credential`] - bearer token acquisition
//! - [`arm`] - authenticated HTTP client
//! - [`gateway`] - the [`ResourceGateway`] seam the provisioner depends on
//! - [`sdk`], [`rest`] - gateway implementations

mod arm;
mod cli;
mod credential;
mod gateway;
mod rest;
mod sdk;

// Re-export public types and functions
pub use arm::{ArmClient, ArmResponse, ASYNC_OPERATION_HEADER};
pub use cli::{get_access_token, run, CliToken};
pub use credential::{acquire, Token};
pub use gateway::{check_provisioning_state, Lookup, ResourceGateway};
pub use rest::RestGateway;
pub use sdk::SdkGateway;
