//! Projection of a bastion host onto the module's `state` output.

use crate::models::BastionHost;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct IpConfigurationSummary {
    pub name: String,
    pub subnet_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BastionSummary {
    /// FQDN the bastion is reachable on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
    pub ip_configurations: Vec<IpConfigurationSummary>,
}

pub fn summarize(host: &BastionHost) -> BastionSummary {
    BastionSummary {
        dns_name: host
            .properties
            .dns_name
            .clone()
            .filter(|dns| !dns.is_empty()),
        ip_configurations: host
            .properties
            .ip_configurations
            .iter()
            .map(|conf| IpConfigurationSummary {
                name: conf.name.clone().unwrap_or_default(),
                subnet_id: conf.properties.subnet.id.clone().unwrap_or_default(),
            })
            .collect(),
    }
}
