//! Datacenters, compute resources and the service entry point.

use crate::core::domain::model::managed_object::ManagedObjectReference;
use serde::Deserialize;

/// Subset of `ServiceInstance.content` needed to start traversal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContent {
    pub root_folder: ManagedObjectReference,
    pub about: AboutInfo,
}

/// Product information of the endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
    #[serde(default)]
    pub full_name: String,
    /// `VirtualCenter` for vCenter, `HostAgent` for a standalone ESXi host.
    pub api_type: String,
    #[serde(default)]
    pub api_version: String,
}

impl AboutInfo {
    /// True when connected to a central manager rather than a single host.
    #[must_use]
    pub fn is_managed(&self) -> bool {
        self.api_type == "VirtualCenter"
    }
}

/// A datacenter together with the folders hanging off it.
#[derive(Debug, Clone, PartialEq)]
pub struct Datacenter {
    pub reference: ManagedObjectReference,
    pub name: String,
    pub host_folder: ManagedObjectReference,
    pub vm_folder: ManagedObjectReference,
    pub network_folder: ManagedObjectReference,
}

/// A cluster or standalone compute resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeResource {
    pub reference: ManagedObjectReference,
    pub name: String,
    pub hosts: Vec<ManagedObjectReference>,
    pub resource_pool: Option<ManagedObjectReference>,
    pub environment_browser: Option<ManagedObjectReference>,
    pub num_effective_hosts: i32,
}

impl ComputeResource {
    /// A compute resource can take VMs once at least one host is effective.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.num_effective_hosts > 0
    }

    #[must_use]
    pub fn is_cluster(&self) -> bool {
        self.reference.kind == "ClusterComputeResource"
    }
}

/// `ComputeResource.summary` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResourceSummary {
    #[serde(default)]
    pub num_hosts: i32,
    #[serde(default)]
    pub num_effective_hosts: i32,
}
