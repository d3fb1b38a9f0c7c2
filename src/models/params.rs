//! Module parameters.

use super::{num_az_hosts, Ipv4, BASTION_MAX_PREFIX};
use crate::error::BastionError;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    #[default]
    Present,
    Absent,
}

/// Desired bastion configuration, fixed for the whole run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BastionParams {
    #[serde(default)]
    pub resource_group: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub virtual_network_name: Option<String>,
    #[serde(default)]
    pub public_ip_name: Option<String>,
    /// Defaults to the resource group location.
    #[serde(default)]
    pub location: Option<String>,
    /// Only needed when `AzureBastionSubnet` does not exist yet.
    #[serde(default)]
    pub subnet_address_prefix_cidr: Option<String>,
    #[serde(default)]
    pub state: DesiredState,
    /// Network API version override (REST transport only).
    #[serde(default)]
    pub api_version: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl BastionParams {
    /// Check required parameters for the requested state, before any remote call.
    pub fn validate(&self) -> Result<(), BastionError> {
        let mut missing = vec![];
        if self.resource_group.trim().is_empty() {
            missing.push("resource_group");
        }
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if !missing.is_empty() {
            return Err(BastionError::Configuration(format!(
                "missing required arguments: {}",
                missing.join(", ")
            )));
        }

        if self.state == DesiredState::Present {
            let mut missing = vec![];
            if is_blank(&self.virtual_network_name) {
                missing.push("virtual_network_name");
            }
            if is_blank(&self.public_ip_name) {
                missing.push("public_ip_name");
            }
            if !missing.is_empty() {
                return Err(BastionError::Configuration(format!(
                    "state is present but all of the following are missing: {}",
                    missing.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// Parsed bastion subnet prefix, if one was supplied.
    ///
    /// Only read when the subnet has to be created, so a stale or malformed
    /// value is harmless for `absent` runs or an existing subnet.
    pub fn subnet_prefix(&self) -> Result<Option<Ipv4>, BastionError> {
        if is_blank(&self.subnet_address_prefix_cidr) {
            return Ok(None);
        }
        let raw = self.subnet_address_prefix_cidr.as_deref().unwrap_or_default();
        let cidr = Ipv4::new(raw.trim()).map_err(|e| {
            BastionError::Configuration(format!(
                "subnet_address_prefix_cidr '{raw}' is not a valid IPv4 CIDR: {e}"
            ))
        })?;
        if !cidr.is_aligned() {
            log::warn!(
                "subnet_address_prefix_cidr {cidr} has host bits set, network is {}",
                cidr.network()
            );
        }
        if !cidr.fits_bastion() {
            let hosts = num_az_hosts(cidr.mask)
                .map(|n| n.to_string())
                .unwrap_or_else(|_| "no".to_string());
            log::warn!(
                "subnet_address_prefix_cidr {cidr} leaves {hosts} usable addresses, Azure Bastion needs /{BASTION_MAX_PREFIX} or larger"
            );
        }
        Ok(Some(cidr))
    }

    pub fn virtual_network(&self) -> Result<&str, BastionError> {
        required(&self.virtual_network_name, "virtual_network_name")
    }

    pub fn public_ip(&self) -> Result<&str, BastionError> {
        required(&self.public_ip_name, "public_ip_name")
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, BastionError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BastionError::Configuration(format!("{key} is required")))
}
