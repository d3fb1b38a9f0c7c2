//! Reconcile a bastion host and its prerequisites toward the requested state.
//!
//! Order is fixed: resource group lookup, then for `present` the
//! `AzureBastionSubnet`, the public IP and the bastion host; for `absent`
//! only the bastion host. Subnet and public IP are never removed.
//! An existing bastion host is left as is, its configuration is not compared.

use super::summary::{summarize, BastionSummary};
use crate::azure::{Lookup, ResourceGateway};
use crate::config::BASTION_SUBNET_NAME;
use crate::error::BastionError;
use crate::models::{
    BastionHost, BastionParams, DesiredState, PublicIpAddress, ResourceGroup, ResourceRef, Subnet,
};

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
    pub changed: bool,
    pub state: Option<BastionSummary>,
}

/// A run that stopped on an error. Earlier changes are not rolled back.
#[derive(Debug)]
pub struct Aborted {
    pub changed: bool,
    pub error: BastionError,
}

pub struct Provisioner<G> {
    gateway: G,
    subscription_id: String,
    check_mode: bool,
}

impl<G: ResourceGateway> Provisioner<G> {
    pub fn new(gateway: G, subscription_id: impl Into<String>) -> Provisioner<G> {
        Provisioner {
            gateway,
            subscription_id: subscription_id.into(),
            check_mode: false,
        }
    }

    /// In check mode every decision is made but nothing is written.
    pub fn check_mode(mut self, check_mode: bool) -> Provisioner<G> {
        self.check_mode = check_mode;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub async fn reconcile(&self, params: &BastionParams) -> Result<Outcome, Aborted> {
        let mut outcome = Outcome::default();
        match self.apply(params, &mut outcome).await {
            Ok(()) => Ok(outcome),
            Err(error) => {
                log::error!("Aborting {}: {error}", params.name);
                Err(Aborted {
                    changed: outcome.changed,
                    error,
                })
            }
        }
    }

    async fn apply(&self, params: &BastionParams, outcome: &mut Outcome) -> Result<(), BastionError> {
        params.validate()?;

        let group = self.resource_group(params).await?;
        let location = params
            .location
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(group.location);
        log::debug!(
            "reconcile bastion {} state={:?} location={location} check_mode={}",
            params.name,
            params.state,
            self.check_mode
        );

        match params.state {
            DesiredState::Present => {
                let subnet_id = self.ensure_subnet(params, outcome).await?;
                let public_ip_id = self.ensure_public_ip(params, &location, outcome).await?;
                self.ensure_bastion(params, &location, subnet_id, public_ip_id, outcome)
                    .await
            }
            DesiredState::Absent => self.remove_bastion(params, outcome).await,
        }
    }

    async fn resource_group(&self, params: &BastionParams) -> Result<ResourceGroup, BastionError> {
        let resource = ResourceRef::resource_group(&self.subscription_id, &params.resource_group);
        match self.gateway.get::<ResourceGroup>(&resource).await? {
            Lookup::Found(group) => Ok(group),
            Lookup::NotFound => Err(BastionError::remote(
                crate::error::Operation::Get,
                resource.to_string(),
                Some(404),
                format!("Resource group {} not found", params.resource_group),
            )),
        }
    }

    /// Returns the subnet id, unknown when the subnet would only be created in check mode.
    async fn ensure_subnet(
        &self,
        params: &BastionParams,
        outcome: &mut Outcome,
    ) -> Result<Option<String>, BastionError> {
        let resource = ResourceRef::subnet(
            &self.subscription_id,
            &params.resource_group,
            params.virtual_network()?,
            BASTION_SUBNET_NAME,
        );
        log::debug!("Fetching {resource}");

        let subnet = match self.gateway.get::<Subnet>(&resource).await? {
            Lookup::Found(subnet) => {
                self.gateway
                    .check_provisioning_state(&subnet, params.state)?;
                subnet
            }
            Lookup::NotFound => {
                let cidr = params.subnet_prefix()?.ok_or_else(|| {
                    BastionError::Configuration(format!(
                        "subnet_address_prefix_cidr is required to create bastion subnet {BASTION_SUBNET_NAME}"
                    ))
                })?;
                outcome.changed = true;
                if self.check_mode {
                    log::info!("check mode: would create {resource} with prefix {cidr}");
                    return Ok(None);
                }
                log::info!("Creating {resource} with prefix {cidr}");
                let prefix = params
                    .subnet_address_prefix_cidr
                    .as_deref()
                    .unwrap_or_default()
                    .trim();
                self.gateway
                    .create_or_update(&resource, &Subnet::with_prefix(prefix))
                    .await?
            }
        };
        Ok(subnet.id)
    }

    async fn ensure_public_ip(
        &self,
        params: &BastionParams,
        location: &str,
        outcome: &mut Outcome,
    ) -> Result<Option<String>, BastionError> {
        let resource = ResourceRef::public_ip(
            &self.subscription_id,
            &params.resource_group,
            params.public_ip()?,
        );
        log::debug!("Fetching {resource}");

        let public_ip = match self.gateway.get::<PublicIpAddress>(&resource).await? {
            Lookup::Found(public_ip) => {
                self.gateway
                    .check_provisioning_state(&public_ip, params.state)?;
                log::debug!("{resource} exists");
                public_ip
            }
            Lookup::NotFound => {
                outcome.changed = true;
                if self.check_mode {
                    log::info!("check mode: would create {resource}");
                    return Ok(None);
                }
                log::info!("Creating {resource} in {location}");
                let body = PublicIpAddress::standard_static(location);
                self.gateway.create_or_update(&resource, &body).await?
            }
        };
        Ok(public_ip.id)
    }

    async fn ensure_bastion(
        &self,
        params: &BastionParams,
        location: &str,
        subnet_id: Option<String>,
        public_ip_id: Option<String>,
        outcome: &mut Outcome,
    ) -> Result<(), BastionError> {
        let resource = self.bastion_ref(params);
        log::debug!("Fetching {resource}");

        match self.gateway.get::<BastionHost>(&resource).await? {
            Lookup::Found(host) => {
                self.gateway.check_provisioning_state(&host, params.state)?;
                outcome.state = Some(summarize(&host));
            }
            Lookup::NotFound => {
                outcome.changed = true;
                if self.check_mode {
                    log::info!("check mode: would create {resource}");
                    return Ok(());
                }
                log::info!("Creating {resource}");
                let body = BastionHost::with_ip_configuration(
                    location,
                    params.public_ip()?,
                    subnet_id,
                    public_ip_id,
                );
                let host: BastionHost = self.gateway.create_or_update(&resource, &body).await?;
                outcome.state = Some(summarize(&host));
            }
        }
        Ok(())
    }

    async fn remove_bastion(
        &self,
        params: &BastionParams,
        outcome: &mut Outcome,
    ) -> Result<(), BastionError> {
        let resource = self.bastion_ref(params);
        log::debug!("Fetching {resource}");

        match self.gateway.get::<BastionHost>(&resource).await? {
            Lookup::Found(host) => {
                self.gateway.check_provisioning_state(&host, params.state)?;
                outcome.changed = true;
                if self.check_mode {
                    log::info!("check mode: would delete {resource}");
                    return Ok(());
                }
                log::info!("Deleting {resource}");
                self.gateway.delete(&resource).await
            }
            Lookup::NotFound => {
                log::debug!("{resource} already absent");
                Ok(())
            }
        }
    }

    fn bastion_ref(&self, params: &BastionParams) -> ResourceRef {
        ResourceRef::bastion_host(&self.subscription_id, &params.resource_group, &params.name)
    }
}
