//! `EnvironmentBrowser.QueryConfigTarget` results: the datastores and
//! networks a compute resource can place VMs on.

use crate::core::domain::model::managed_object::ManagedObjectReference;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigTarget {
    #[serde(default)]
    pub datastore: Vec<VirtualMachineDatastoreInfo>,
    #[serde(default)]
    pub network: Vec<VirtualMachineNetworkInfo>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VirtualMachineDatastoreInfo {
    pub datastore: DatastoreSummary,
}

/// A datastore candidate. Only accessible ones are eligible for placement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatastoreSummary {
    pub datastore: ManagedObjectReference,
    pub name: String,
    /// Free space in bytes.
    #[serde(default)]
    pub free_space: i64,
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    pub accessible: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VirtualMachineNetworkInfo {
    pub network: NetworkSummary,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetworkSummary {
    #[serde(default)]
    pub network: Option<ManagedObjectReference>,
    pub name: String,
    #[serde(default)]
    pub accessible: bool,
}
