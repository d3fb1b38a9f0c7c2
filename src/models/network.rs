//! Resource Manager representations of the resources a bastion depends on.
//!
//! Field names follow the ARM JSON; absent optional fields are not serialized
//! so the same structs double as PUT bodies.

use serde::{Deserialize, Serialize};

/// Provisioning state Azure reports once the last operation completed.
pub const SUCCEEDED: &str = "Succeeded";

/// Resource that reports a provisioning state.
pub trait Provisioned {
    fn display_name(&self) -> &str;
    fn provisioning_state(&self) -> Option<&str>;
}

/// Reference to another resource by id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SubResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SubResource {
    pub fn new(id: Option<String>) -> SubResource {
        SubResource { id }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ResourceGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ResourceGroupProperties>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ResourceGroupProperties {
    #[serde(
        rename = "provisioningState",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provisioning_state: Option<String>,
}

/// Virtual network subnet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Subnet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: SubnetProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SubnetProperties {
    /// CIDR of the subnet.
    #[serde(
        rename = "addressPrefix",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub address_prefix: Option<String>,
    #[serde(
        rename = "provisioningState",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provisioning_state: Option<String>,
}

impl Subnet {
    /// Create body: the prefix is the only property sent.
    pub fn with_prefix(cidr: &str) -> Subnet {
        Subnet {
            properties: SubnetProperties {
                address_prefix: Some(cidr.to_string()),
                provisioning_state: None,
            },
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PublicIpAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: PublicIpAddressProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PublicIpAddressProperties {
    #[serde(
        rename = "publicIPAllocationMethod",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub allocation_method: Option<String>,
    #[serde(
        rename = "publicIPAddressVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub address_version: Option<String>,
    /// Assigned address, only present in responses.
    #[serde(rename = "ipAddress", default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(
        rename = "provisioningState",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provisioning_state: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Sku {
    pub name: String,
}

impl PublicIpAddress {
    /// Static IPv4 address on the Standard SKU, the only kind Bastion accepts.
    pub fn standard_static(location: &str) -> PublicIpAddress {
        PublicIpAddress {
            properties: PublicIpAddressProperties {
                allocation_method: Some("Static".to_string()),
                address_version: Some("IPv4".to_string()),
                ..Default::default()
            },
            sku: Some(Sku {
                name: "Standard".to_string(),
            }),
            location: Some(location.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BastionHost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub properties: BastionHostProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BastionHostProperties {
    /// FQDN the bastion is reachable on.
    #[serde(rename = "dnsName", default, skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
    #[serde(rename = "ipConfigurations", default)]
    pub ip_configurations: Vec<BastionHostIpConfiguration>,
    #[serde(
        rename = "provisioningState",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provisioning_state: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BastionHostIpConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: BastionHostIpConfigurationProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BastionHostIpConfigurationProperties {
    #[serde(default)]
    pub subnet: SubResource,
    #[serde(rename = "publicIPAddress", default)]
    pub public_ip_address: SubResource,
    #[serde(
        rename = "provisioningState",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provisioning_state: Option<String>,
}

impl BastionHost {
    /// Create body with a single IP configuration named `ip_configuration_name`.
    pub fn with_ip_configuration(
        location: &str,
        ip_configuration_name: &str,
        subnet_id: Option<String>,
        public_ip_id: Option<String>,
    ) -> BastionHost {
        BastionHost {
            location: Some(location.to_string()),
            properties: BastionHostProperties {
                ip_configurations: vec![BastionHostIpConfiguration {
                    name: Some(ip_configuration_name.to_string()),
                    properties: BastionHostIpConfigurationProperties {
                        subnet: SubResource::new(subnet_id),
                        public_ip_address: SubResource::new(public_ip_id),
                        provisioning_state: None,
                    },
                    ..Default::default()
                }],
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

impl Provisioned for Subnet {
    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
    fn provisioning_state(&self) -> Option<&str> {
        self.properties.provisioning_state.as_deref()
    }
}

impl Provisioned for PublicIpAddress {
    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
    fn provisioning_state(&self) -> Option<&str> {
        self.properties.provisioning_state.as_deref()
    }
}

impl Provisioned for BastionHost {
    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
    fn provisioning_state(&self) -> Option<&str> {
        self.properties.provisioning_state.as_deref()
    }
}
