//! Resource Manager addressing.

use crate::config::{NETWORK_API_VERSION, RESOURCE_GROUP_API_VERSION};
use std::fmt;

/// The resource types the bastion modules touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    ResourceGroup,
    /// Subnet inside the named virtual network.
    Subnet { virtual_network: String },
    PublicIpAddress,
    BastionHost,
}

impl ResourceKind {
    /// API version pinned for this resource type.
    pub fn default_api_version(&self) -> &'static str {
        match self {
            ResourceKind::ResourceGroup => RESOURCE_GROUP_API_VERSION,
            _ => NETWORK_API_VERSION,
        }
    }

    pub fn is_network(&self) -> bool {
        !matches!(self, ResourceKind::ResourceGroup)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::ResourceGroup => "resource group",
            ResourceKind::Subnet { .. } => "subnet",
            ResourceKind::PublicIpAddress => "public ip",
            ResourceKind::BastionHost => "bastion host",
        }
    }
}

/// Fully qualified pointer to one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub subscription_id: String,
    pub resource_group: String,
    pub kind: ResourceKind,
    pub name: String,
}

impl ResourceRef {
    pub fn resource_group(subscription_id: &str, resource_group: &str) -> ResourceRef {
        ResourceRef {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            kind: ResourceKind::ResourceGroup,
            name: resource_group.to_string(),
        }
    }

    pub fn subnet(
        subscription_id: &str,
        resource_group: &str,
        virtual_network: &str,
        name: &str,
    ) -> ResourceRef {
        ResourceRef {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            kind: ResourceKind::Subnet {
                virtual_network: virtual_network.to_string(),
            },
            name: name.to_string(),
        }
    }

    pub fn public_ip(subscription_id: &str, resource_group: &str, name: &str) -> ResourceRef {
        ResourceRef {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            kind: ResourceKind::PublicIpAddress,
            name: name.to_string(),
        }
    }

    pub fn bastion_host(subscription_id: &str, resource_group: &str, name: &str) -> ResourceRef {
        ResourceRef {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            kind: ResourceKind::BastionHost,
            name: name.to_string(),
        }
    }

    /// ARM path, without host or query string.
    ///
    /// The resource group lookup uses the lowercase `resourcegroups` segment.
    pub fn path(&self) -> String {
        let sub = &self.subscription_id;
        let rg = &self.resource_group;
        match &self.kind {
            ResourceKind::ResourceGroup => format!("/subscriptions/{sub}/resourcegroups/{rg}"),
            ResourceKind::Subnet { virtual_network } => format!(
                "/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/virtualNetworks/{virtual_network}/subnets/{name}",
                name = self.name
            ),
            ResourceKind::PublicIpAddress => format!(
                "/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/publicIPAddresses/{name}",
                name = self.name
            ),
            ResourceKind::BastionHost => format!(
                "/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/bastionHosts/{name}",
                name = self.name
            ),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.kind.label(), self.name)
    }
}
