//! In-process gateway for provisioning tests.
//!
//! Keeps resources as JSON keyed by ARM path and records every call, so a
//! provisioning run can be replayed and inspected without Azure.

use azure_bastion::azure::{Lookup, ResourceGateway};
use azure_bastion::models::{ResourceKind, ResourceRef, SUCCEEDED};
use azure_bastion::{BastionError, Operation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(String),
    CreateOrUpdate(String, Value),
    Delete(String),
}

impl Call {
    pub fn path(&self) -> &str {
        match self {
            Call::Get(path) | Call::CreateOrUpdate(path, _) | Call::Delete(path) => path,
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::Get(_))
    }
}

#[derive(Debug, Default)]
pub struct MemoryGateway {
    resources: Mutex<BTreeMap<String, Value>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<Vec<(Operation, String)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryGateway {
    pub fn new() -> MemoryGateway {
        MemoryGateway::default()
    }

    /// Seed a resource; `id` and `name` are filled in when absent.
    pub fn with_resource(self, resource: &ResourceRef, value: Value) -> MemoryGateway {
        self.insert(resource, value);
        self
    }

    /// Make the next `operation` on `resource` fail with a 500.
    pub fn with_failure(self, operation: Operation, resource: &ResourceRef) -> MemoryGateway {
        lock(&self.failures).push((operation, resource.path()));
        self
    }

    pub fn insert(&self, resource: &ResourceRef, mut value: Value) {
        if let Some(object) = value.as_object_mut() {
            object
                .entry("id")
                .or_insert_with(|| Value::String(resource.path()));
            object
                .entry("name")
                .or_insert_with(|| Value::String(resource.name.clone()));
        }
        lock(&self.resources).insert(resource.path(), value);
    }

    pub fn resource(&self, resource: &ResourceRef) -> Option<Value> {
        lock(&self.resources).get(&resource.path()).cloned()
    }

    pub fn contains(&self, resource: &ResourceRef) -> bool {
        lock(&self.resources).contains_key(&resource.path())
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    fn record(&self, call: Call) {
        lock(&self.calls).push(call);
    }

    fn injected_failure(
        &self,
        operation: Operation,
        resource: &ResourceRef,
    ) -> Result<(), BastionError> {
        let mut failures = lock(&self.failures);
        let path = resource.path();
        match failures.iter().position(|(op, p)| *op == operation && *p == path) {
            Some(index) => {
                failures.remove(index);
                Err(BastionError::remote(
                    operation,
                    resource.to_string(),
                    Some(500),
                    "InternalServerError: injected failure",
                ))
            }
            None => Ok(()),
        }
    }

    /// What Azure would hand back after a successful PUT.
    fn settle(resource: &ResourceRef, body: &Value) -> Value {
        let mut value = body.clone();
        if !value.is_object() {
            value = json!({});
        }
        if let Some(object) = value.as_object_mut() {
            object.insert("id".to_string(), Value::String(resource.path()));
            object.insert("name".to_string(), Value::String(resource.name.clone()));
            let properties = object
                .entry("properties")
                .or_insert_with(|| json!({}));
            if let Some(properties) = properties.as_object_mut() {
                properties.insert(
                    "provisioningState".to_string(),
                    Value::String(SUCCEEDED.to_string()),
                );
                if resource.kind == ResourceKind::BastionHost {
                    properties
                        .entry("dnsName")
                        .or_insert_with(|| json!(format!("bst-{}.bastion.azure.com", resource.name)));
                }
            }
        }
        value
    }
}

fn from_value<T: DeserializeOwned>(
    value: Value,
    resource: &ResourceRef,
    operation: Operation,
) -> Result<T, BastionError> {
    serde_json::from_value(value)
        .map_err(|e| BastionError::remote(operation, resource.to_string(), None, e.to_string()))
}

impl ResourceGateway for MemoryGateway {
    async fn get<T>(&self, resource: &ResourceRef) -> Result<Lookup<T>, BastionError>
    where
        T: DeserializeOwned,
    {
        self.record(Call::Get(resource.path()));
        self.injected_failure(Operation::Get, resource)?;
        match self.resource(resource) {
            Some(value) => from_value(value, resource, Operation::Get).map(Lookup::Found),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn create_or_update<B, T>(
        &self,
        resource: &ResourceRef,
        body: &B,
    ) -> Result<T, BastionError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| {
            BastionError::remote(Operation::CreateOrUpdate, resource.to_string(), None, e.to_string())
        })?;
        self.record(Call::CreateOrUpdate(resource.path(), body.clone()));
        self.injected_failure(Operation::CreateOrUpdate, resource)?;
        let settled = Self::settle(resource, &body);
        lock(&self.resources).insert(resource.path(), settled.clone());
        from_value(settled, resource, Operation::CreateOrUpdate)
    }

    async fn delete(&self, resource: &ResourceRef) -> Result<(), BastionError> {
        self.record(Call::Delete(resource.path()));
        self.injected_failure(Operation::Delete, resource)?;
        lock(&self.resources).remove(&resource.path());
        Ok(())
    }
}
