//! The control API seam every service talks through.

use crate::core::{
    domain::{
        error::{VsphereError, VsphereResult},
        model::{ManagedObjectReference, ObjectKind, ServiceContent},
    },
    infrastructure::api_client::ApiClient,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Reads properties of and invokes methods on managed objects.
///
/// Implemented over HTTP by [`ApiClient`]; services only depend on this
/// trait so that they can run against any inventory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VimApi: Send + Sync {
    /// `ServiceInstance.content`.
    async fn service_content(&self) -> VsphereResult<ServiceContent>;

    /// The value of one top-level property. Unset properties read as `null`.
    async fn retrieve_property(
        &self,
        object: &ManagedObjectReference,
        property: &str,
    ) -> VsphereResult<Value>;

    /// Calls `method` on `object`. Void methods return `null`.
    async fn invoke(
        &self,
        object: &ManagedObjectReference,
        method: &str,
        body: Value,
    ) -> VsphereResult<Value>;

    /// All objects of `kind` below `container`, depth first in inventory
    /// order. Descends into nested folders, into the matching folder of each
    /// datacenter, and into compute resources when looking for hosts.
    async fn find_objects(
        &self,
        container: &ManagedObjectReference,
        kind: ObjectKind,
    ) -> VsphereResult<Vec<ManagedObjectReference>> {
        let mut found = Vec::new();
        let mut pending: Vec<ManagedObjectReference> =
            children(self, container, "childEntity").await?;
        pending.reverse();

        while let Some(entry) = pending.pop() {
            if entry.is(kind) {
                found.push(entry.clone());
            }
            let nested = if entry.is(ObjectKind::Folder) {
                children(self, &entry, "childEntity").await?
            } else if kind == ObjectKind::HostSystem && entry.is(ObjectKind::ComputeResource) {
                children(self, &entry, "host").await?
            } else if entry.is(ObjectKind::Datacenter) {
                let Some(member) = kind.datacenter_folder() else {
                    continue;
                };
                let folder: Option<ManagedObjectReference> =
                    decode(&entry, member, self.retrieve_property(&entry, member).await?)?;
                folder.into_iter().collect()
            } else {
                continue;
            };
            pending.extend(nested.into_iter().rev());
        }

        debug!(%container, ?kind, count = found.len(), "inventory traversal");
        Ok(found)
    }
}

async fn children<A: VimApi + ?Sized>(
    api: &A,
    object: &ManagedObjectReference,
    property: &str,
) -> VsphereResult<Vec<ManagedObjectReference>> {
    let value = api.retrieve_property(object, property).await?;
    let children: Option<Vec<ManagedObjectReference>> = decode(object, property, value)?;
    Ok(children.unwrap_or_default())
}

fn decode<T: DeserializeOwned>(
    object: &ManagedObjectReference,
    member: &str,
    value: Value,
) -> VsphereResult<T> {
    serde_json::from_value(value).map_err(|e| {
        VsphereError::Connection(format!("Failed to parse {member} of {object}: {e}"))
    })
}

/// Reads and decodes one property.
pub async fn property<T: DeserializeOwned>(
    api: &dyn VimApi,
    object: &ManagedObjectReference,
    name: &str,
) -> VsphereResult<T> {
    let value = api.retrieve_property(object, name).await?;
    decode(object, name, value)
}

/// Invokes a method and decodes its return value.
pub async fn call<T: DeserializeOwned>(
    api: &dyn VimApi,
    object: &ManagedObjectReference,
    method: &str,
    body: Value,
) -> VsphereResult<T> {
    let value = api.invoke(object, method, body).await?;
    decode(object, method, value)
}

#[async_trait]
impl VimApi for ApiClient {
    async fn service_content(&self) -> VsphereResult<ServiceContent> {
        self.get("ServiceInstance/ServiceInstance/content").await
    }

    async fn retrieve_property(
        &self,
        object: &ManagedObjectReference,
        property: &str,
    ) -> VsphereResult<Value> {
        self.get(&object.path(property)).await
    }

    async fn invoke(
        &self,
        object: &ManagedObjectReference,
        method: &str,
        body: Value,
    ) -> VsphereResult<Value> {
        self.post(&object.path(method), &body).await
    }
}
