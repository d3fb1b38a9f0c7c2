//! Integration tests for azure-bastion
//!
//! These tests run the full provisioning sequence against the in-memory gateway.

mod common;

use azure_bastion::azure::{Lookup, ResourceGateway};
use azure_bastion::models::{BastionHost, BastionParams, DesiredState, ResourceRef, Subnet};
use azure_bastion::{BastionError, Operation, Provisioner};
use common::{Call, MemoryGateway};
use serde_json::json;

const SUB: &str = "00000000-0000-0000-0000-000000000001";

fn rg() -> ResourceRef {
    ResourceRef::resource_group(SUB, "rg1")
}
fn subnet() -> ResourceRef {
    ResourceRef::subnet(SUB, "rg1", "vnet1", "AzureBastionSubnet")
}
fn pip() -> ResourceRef {
    ResourceRef::public_ip(SUB, "rg1", "pip1")
}
fn bastion() -> ResourceRef {
    ResourceRef::bastion_host(SUB, "rg1", "bh1")
}

/// Resource group `rg1` with no bastion related resources.
fn empty_env() -> MemoryGateway {
    MemoryGateway::new().with_resource(
        &rg(),
        json!({"location": "westeurope", "properties": {"provisioningState": "Succeeded"}}),
    )
}

/// Subnet, public IP and bastion host all present.
fn full_env() -> MemoryGateway {
    empty_env()
        .with_resource(
            &subnet(),
            json!({"properties": {"addressPrefix": "10.0.1.0/26", "provisioningState": "Succeeded"}}),
        )
        .with_resource(
            &pip(),
            json!({
                "location": "westeurope",
                "sku": {"name": "Standard"},
                "properties": {"publicIPAllocationMethod": "Static", "provisioningState": "Succeeded"}
            }),
        )
        .with_resource(
            &bastion(),
            json!({
                "location": "westeurope",
                "properties": {
                    "provisioningState": "Succeeded",
                    "dnsName": "bst-existing.bastion.azure.com",
                    "ipConfigurations": [{
                        "name": "pip1",
                        "properties": {
                            "subnet": {"id": subnet().path()},
                            "publicIPAddress": {"id": pip().path()}
                        }
                    }]
                }
            }),
        )
}

fn present() -> BastionParams {
    BastionParams {
        resource_group: "rg1".to_string(),
        name: "bh1".to_string(),
        virtual_network_name: Some("vnet1".to_string()),
        public_ip_name: Some("pip1".to_string()),
        subnet_address_prefix_cidr: Some("10.0.1.0/26".to_string()),
        state: DesiredState::Present,
        ..Default::default()
    }
}

fn absent() -> BastionParams {
    BastionParams {
        resource_group: "rg1".to_string(),
        name: "bh1".to_string(),
        state: DesiredState::Absent,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_everything_from_scratch() {
    let provisioner = Provisioner::new(empty_env(), SUB);
    let outcome = provisioner.reconcile(&present()).await.expect("reconcile failed");
    assert!(outcome.changed);

    let gw = provisioner.gateway();
    let mutations = gw.mutations();
    assert_eq!(mutations.len(), 3, "{mutations:?}");
    assert_eq!(
        mutations[0],
        Call::CreateOrUpdate(
            subnet().path(),
            json!({"properties": {"addressPrefix": "10.0.1.0/26"}})
        )
    );
    assert_eq!(
        mutations[1],
        Call::CreateOrUpdate(
            pip().path(),
            json!({
                "properties": {"publicIPAllocationMethod": "Static", "publicIPAddressVersion": "IPv4"},
                "sku": {"name": "Standard"},
                "location": "westeurope"
            })
        )
    );
    assert_eq!(
        mutations[2],
        Call::CreateOrUpdate(
            bastion().path(),
            json!({
                "location": "westeurope",
                "properties": {"ipConfigurations": [{
                    "name": "pip1",
                    "properties": {
                        "subnet": {"id": subnet().path()},
                        "publicIPAddress": {"id": pip().path()}
                    }
                }]}
            })
        )
    );

    let state = outcome.state.expect("state should be reported");
    assert_eq!(state.ip_configurations.len(), 1);
    assert_eq!(state.ip_configurations[0].name, "pip1");
    assert_eq!(state.ip_configurations[0].subnet_id, subnet().path());
}

#[tokio::test]
async fn test_lookups_run_in_dependency_order() {
    let provisioner = Provisioner::new(full_env(), SUB);
    provisioner.reconcile(&present()).await.unwrap();
    let order: Vec<String> = provisioner
        .gateway()
        .calls()
        .iter()
        .map(|c| c.path().to_string())
        .collect();
    assert_eq!(
        order,
        vec![rg().path(), subnet().path(), pip().path(), bastion().path()]
    );
}

#[tokio::test]
async fn test_present_when_everything_exists() {
    let provisioner = Provisioner::new(full_env(), SUB);
    let outcome = provisioner.reconcile(&present()).await.unwrap();
    assert!(!outcome.changed);
    assert!(provisioner.gateway().mutations().is_empty());
    let state = outcome.state.unwrap();
    assert_eq!(
        state.dns_name.as_deref(),
        Some("bst-existing.bastion.azure.com")
    );
    assert_eq!(state.ip_configurations[0].subnet_id, subnet().path());
}

#[tokio::test]
async fn test_existing_subnet_needs_no_cidr() {
    let gw = empty_env().with_resource(
        &subnet(),
        json!({"properties": {"addressPrefix": "10.0.1.0/26", "provisioningState": "Succeeded"}}),
    );
    let provisioner = Provisioner::new(gw, SUB);
    let params = BastionParams {
        subnet_address_prefix_cidr: None,
        ..present()
    };
    let outcome = provisioner.reconcile(&params).await.unwrap();
    assert!(outcome.changed);
    let created: Vec<String> = provisioner
        .gateway()
        .mutations()
        .iter()
        .map(|c| c.path().to_string())
        .collect();
    assert_eq!(created, vec![pip().path(), bastion().path()]);
}

#[tokio::test]
async fn test_missing_subnet_without_cidr_fails_before_create() {
    let provisioner = Provisioner::new(empty_env(), SUB);
    let params = BastionParams {
        subnet_address_prefix_cidr: None,
        ..present()
    };
    let aborted = provisioner.reconcile(&params).await.unwrap_err();
    assert!(aborted.error.is_configuration());
    assert_eq!(
        aborted.error.to_string(),
        "subnet_address_prefix_cidr is required to create bastion subnet AzureBastionSubnet"
    );
    assert!(!aborted.changed);
    assert!(provisioner.gateway().mutations().is_empty());
}

#[tokio::test]
async fn test_present_twice_is_idempotent() {
    let provisioner = Provisioner::new(empty_env(), SUB);
    let first = provisioner.reconcile(&present()).await.unwrap();
    let second = provisioner.reconcile(&present()).await.unwrap();
    assert!(first.changed);
    assert!(!second.changed);
    assert!(first.state.is_some());
    assert_eq!(first.state, second.state);
    assert_eq!(provisioner.gateway().mutations().len(), 3);
}

#[tokio::test]
async fn test_absent_when_never_created() {
    let provisioner = Provisioner::new(empty_env(), SUB);
    let outcome = provisioner.reconcile(&absent()).await.unwrap();
    assert!(!outcome.changed);
    assert!(outcome.state.is_none());
    assert!(provisioner.gateway().mutations().is_empty());
}

#[tokio::test]
async fn test_absent_deletes_only_the_bastion() {
    let provisioner = Provisioner::new(full_env(), SUB);
    let outcome = provisioner.reconcile(&absent()).await.unwrap();
    assert!(outcome.changed);
    assert_eq!(
        provisioner.gateway().mutations(),
        vec![Call::Delete(bastion().path())]
    );
    assert!(!provisioner.gateway().contains(&bastion()));
    assert!(provisioner.gateway().contains(&subnet()));
    assert!(provisioner.gateway().contains(&pip()));
}

#[tokio::test]
async fn test_absent_removes_failed_bastion() {
    let gw = empty_env().with_resource(
        &bastion(),
        json!({"properties": {"provisioningState": "Failed"}}),
    );
    let provisioner = Provisioner::new(gw, SUB);
    let outcome = provisioner.reconcile(&absent()).await.unwrap();
    assert!(outcome.changed);
    assert_eq!(provisioner.gateway().mutations().len(), 1);
}

#[tokio::test]
async fn test_check_mode_matches_real_run_without_writes() {
    let cases: [(BastionParams, fn() -> MemoryGateway); 4] = [
        (present(), empty_env),
        (present(), full_env),
        (absent(), empty_env),
        (absent(), full_env),
    ];
    for (params, env) in cases {
        let real = Provisioner::new(env(), SUB).reconcile(&params).await.unwrap();
        let dry = Provisioner::new(env(), SUB).check_mode(true);
        let planned = dry.reconcile(&params).await.unwrap();
        assert_eq!(planned.changed, real.changed, "{:?}", params.state);
        assert!(dry.gateway().mutations().is_empty());
    }
}

#[tokio::test]
async fn test_check_mode_from_scratch_reports_no_state() {
    let provisioner = Provisioner::new(empty_env(), SUB).check_mode(true);
    let outcome = provisioner.reconcile(&present()).await.unwrap();
    assert!(outcome.changed);
    assert!(outcome.state.is_none());
}

#[tokio::test]
async fn test_failed_public_ip_aborts_after_subnet() {
    let gw = empty_env().with_resource(
        &pip(),
        json!({"properties": {"provisioningState": "Failed"}}),
    );
    let provisioner = Provisioner::new(gw, SUB);
    let aborted = provisioner.reconcile(&present()).await.unwrap_err();
    assert!(matches!(
        aborted.error,
        BastionError::ProvisioningState { ref name, ref state } if name == "pip1" && state == "Failed"
    ));
    // The subnet was created before the failure and stays.
    assert!(aborted.changed);
    assert_eq!(
        provisioner.gateway().mutations(),
        vec![Call::CreateOrUpdate(
            subnet().path(),
            json!({"properties": {"addressPrefix": "10.0.1.0/26"}})
        )]
    );
}

#[tokio::test]
async fn test_updating_bastion_is_rejected_when_present() {
    let gw = full_env().with_resource(
        &bastion(),
        json!({"properties": {"provisioningState": "Updating"}}),
    );
    let provisioner = Provisioner::new(gw, SUB);
    let aborted = provisioner.reconcile(&present()).await.unwrap_err();
    assert!(!aborted.changed);
    assert!(matches!(aborted.error, BastionError::ProvisioningState { .. }));
}

#[tokio::test]
async fn test_remote_failure_on_bastion_create() {
    let gw = empty_env().with_failure(Operation::CreateOrUpdate, &bastion());
    let provisioner = Provisioner::new(gw, SUB);
    let aborted = provisioner.reconcile(&present()).await.unwrap_err();
    assert!(aborted.changed);
    assert_eq!(
        aborted.error.to_string(),
        "Error creating bastion host bh1: InternalServerError: injected failure"
    );
    assert!(provisioner.gateway().contains(&subnet()));
    assert!(provisioner.gateway().contains(&pip()));
    assert!(!provisioner.gateway().contains(&bastion()));
}

#[tokio::test]
async fn test_remote_failure_on_lookup() {
    let gw = full_env().with_failure(Operation::Get, &bastion());
    let provisioner = Provisioner::new(gw, SUB);
    let aborted = provisioner.reconcile(&absent()).await.unwrap_err();
    assert!(!aborted.changed);
    assert!(matches!(
        aborted.error,
        BastionError::Remote {
            operation: Operation::Get,
            status: Some(500),
            ..
        }
    ));
}

#[tokio::test]
async fn test_absent_ignores_malformed_cidr() {
    let params = BastionParams {
        subnet_address_prefix_cidr: Some("10.0.1.0".to_string()),
        ..absent()
    };
    let provisioner = Provisioner::new(empty_env(), SUB);
    let outcome = provisioner.reconcile(&params).await.unwrap();
    assert!(!outcome.changed);
    assert!(provisioner.gateway().mutations().is_empty());
}

#[tokio::test]
async fn test_existing_subnet_ignores_non_ipv4_cidr() {
    let params = BastionParams {
        subnet_address_prefix_cidr: Some("fd00::/64".to_string()),
        ..present()
    };
    let provisioner = Provisioner::new(full_env(), SUB);
    let outcome = provisioner.reconcile(&params).await.unwrap();
    assert!(!outcome.changed);
    assert!(outcome.state.is_some());
}

#[tokio::test]
async fn test_malformed_cidr_fails_when_subnet_is_created() {
    let params = BastionParams {
        subnet_address_prefix_cidr: Some("fd00::/64".to_string()),
        ..present()
    };
    let provisioner = Provisioner::new(empty_env(), SUB);
    let aborted = provisioner.reconcile(&params).await.unwrap_err();
    assert!(aborted.error.is_configuration());
    assert!(aborted.error.to_string().contains("fd00::/64"));
    assert!(!aborted.changed);
    assert!(provisioner.gateway().mutations().is_empty());
}

#[tokio::test]
async fn test_unsettled_subnet_is_rejected_when_present() {
    for state in ["Failed", "Updating"] {
        let gw = empty_env().with_resource(
            &subnet(),
            json!({"properties": {"addressPrefix": "10.0.1.0/26", "provisioningState": state}}),
        );
        let provisioner = Provisioner::new(gw, SUB);
        let aborted = provisioner.reconcile(&present()).await.unwrap_err();
        assert!(!aborted.changed);
        assert!(matches!(
            aborted.error,
            BastionError::ProvisioningState { ref name, state: ref s }
                if name == "AzureBastionSubnet" && s == state
        ));
        assert_eq!(
            aborted.error.to_string(),
            format!(
                "Error AzureBastionSubnet has a provisioning state of {state}. Expecting state to be Succeeded."
            )
        );
        assert!(provisioner.gateway().mutations().is_empty());
    }
}

#[tokio::test]
async fn test_location_defaults_to_resource_group() {
    let provisioner = Provisioner::new(empty_env(), SUB);
    provisioner.reconcile(&present()).await.unwrap();
    let created = provisioner.gateway().resource(&pip()).unwrap();
    assert_eq!(created["location"], "westeurope");
}

#[tokio::test]
async fn test_explicit_location_wins() {
    let provisioner = Provisioner::new(empty_env(), SUB);
    let params = BastionParams {
        location: Some("northeurope".to_string()),
        ..present()
    };
    provisioner.reconcile(&params).await.unwrap();
    let host = provisioner.gateway().resource(&bastion()).unwrap();
    assert_eq!(host["location"], "northeurope");
}

#[tokio::test]
async fn test_missing_resource_group_is_fatal() {
    let provisioner = Provisioner::new(MemoryGateway::new(), SUB);
    let aborted = provisioner.reconcile(&present()).await.unwrap_err();
    assert!(!aborted.changed);
    assert!(aborted.error.to_string().contains("Resource group rg1 not found"));
    assert!(provisioner.gateway().mutations().is_empty());
}

#[tokio::test]
async fn test_invalid_params_make_no_calls() {
    let provisioner = Provisioner::new(empty_env(), SUB);
    let params = BastionParams {
        public_ip_name: None,
        ..present()
    };
    let aborted = provisioner.reconcile(&params).await.unwrap_err();
    assert!(aborted.error.is_configuration());
    assert!(provisioner.gateway().calls().is_empty());
}

#[tokio::test]
async fn test_memory_gateway_create_then_get() {
    let gw = MemoryGateway::new();
    let missing: Lookup<BastionHost> = gw.get(&bastion()).await.unwrap();
    assert_eq!(missing, Lookup::NotFound);

    let body = BastionHost::with_ip_configuration("westeurope", "pip1", None, None);
    let created: BastionHost = gw.create_or_update(&bastion(), &body).await.unwrap();
    assert_eq!(created.id.as_deref(), Some(bastion().path().as_str()));
    assert_eq!(
        created.properties.dns_name.as_deref(),
        Some("bst-bh1.bastion.azure.com")
    );

    let found: Lookup<BastionHost> = gw.get(&bastion()).await.unwrap();
    assert_eq!(found, Lookup::Found(created));
    assert_eq!(gw.calls().len(), 3);
    assert_eq!(gw.mutations().len(), 1);
}

#[tokio::test]
async fn test_memory_gateway_seeded_resource_gets_id() {
    let gw = MemoryGateway::new().with_resource(
        &subnet(),
        json!({"properties": {"addressPrefix": "10.0.1.0/26"}}),
    );
    let found: Subnet = gw.get(&subnet()).await.unwrap().found().unwrap();
    assert_eq!(found.id, Some(subnet().path()));
    assert_eq!(found.name.as_deref(), Some("AzureBastionSubnet"));
}

#[tokio::test]
async fn test_memory_gateway_failure_fires_once() {
    let gw = MemoryGateway::new().with_failure(Operation::Delete, &bastion());
    assert!(gw.delete(&bastion()).await.is_err());
    assert!(gw.delete(&bastion()).await.is_ok());
}
