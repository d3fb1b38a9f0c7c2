//! Domain models for the bastion modules.
//!
//! - [`Ipv4`] - CIDR parsing for the bastion subnet prefix
//! - [`ResourceRef`] - Resource Manager addressing
//! - [`BastionHost`], [`Subnet`], [`PublicIpAddress`], [`ResourceGroup`] - ARM resources
//! - [`BastionParams`] - module parameters

mod ipv4;
mod network;
mod params;
mod resource;

// Re-export public types
pub use ipv4::{cut_addr, get_cidr_mask, num_az_hosts, Ipv4, BASTION_MAX_PREFIX, MAX_LENGTH};
pub use network::{
    BastionHost, BastionHostIpConfiguration, BastionHostIpConfigurationProperties,
    BastionHostProperties, Provisioned, PublicIpAddress, PublicIpAddressProperties,
    ResourceGroup, ResourceGroupProperties, Sku, SubResource, Subnet, SubnetProperties,
    SUCCEEDED,
};
pub use params::{BastionParams, DesiredState};
pub use resource::{ResourceKind, ResourceRef};
