//! Specs for creating and reconfiguring distributed switches and their port
//! groups.

use crate::core::domain::{
    model::{device::ConfigOperation, managed_object::ManagedObjectReference},
    value_object::VlanId,
};
use serde::Serialize;

/// `DVSCreateSpec` for `Folder.CreateDVS_Task`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "_typeName", rename = "DVSCreateSpec")]
pub struct DvsCreateSpec {
    pub config_spec: DvsConfigSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "_typeName", rename = "DVSConfigSpec")]
pub struct DvsConfigSpec {
    pub name: String,
    pub uplink_port_policy: UplinkPortPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    rename_all = "camelCase",
    tag = "_typeName",
    rename = "DVSNameArrayUplinkPortPolicy"
)]
pub struct UplinkPortPolicy {
    pub uplink_port_name: Vec<String>,
}

impl DvsCreateSpec {
    /// A switch with uplinks named `Uplink1` to `UplinkN`.
    #[must_use]
    pub fn new(name: impl Into<String>, uplinks: u32) -> Self {
        Self {
            config_spec: DvsConfigSpec {
                name: name.into(),
                uplink_port_policy: UplinkPortPolicy {
                    uplink_port_name: (1..=uplinks).map(|n| format!("Uplink{n}")).collect(),
                },
            },
        }
    }
}

/// `DVPortgroupConfigSpec` for `AddDVPortgroup_Task`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "_typeName", rename = "DVPortgroupConfigSpec")]
pub struct DvPortgroupConfigSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub binding: String,
    pub num_ports: i32,
    pub default_port_config: DvsPortSetting,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "_typeName", rename = "VMwareDVSPortSetting")]
pub struct DvsPortSetting {
    pub vlan: VlanIdSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    rename_all = "camelCase",
    tag = "_typeName",
    rename = "VmwareDistributedVirtualSwitchVlanIdSpec"
)]
pub struct VlanIdSpec {
    pub inherited: bool,
    pub vlan_id: i32,
}

impl DvPortgroupConfigSpec {
    /// An early-binding port group tagged with `vlan`. Ports are added on
    /// demand, so the group starts empty.
    #[must_use]
    pub fn tagged(name: impl Into<String>, vlan: VlanId) -> Self {
        Self {
            name: name.into(),
            binding: "earlyBinding".to_string(),
            num_ports: 0,
            default_port_config: DvsPortSetting {
                vlan: VlanIdSpec {
                    inherited: false,
                    vlan_id: i32::from(vlan.get()),
                },
            },
        }
    }
}

/// `VMwareDVSConfigSpec` for `ReconfigureDvs_Task`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "_typeName", rename = "VMwareDVSConfigSpec")]
pub struct DvsReconfigureSpec {
    /// Must match the switch's current `configVersion`.
    pub config_version: String,
    pub host: Vec<DvsHostMemberConfigSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    rename_all = "camelCase",
    tag = "_typeName",
    rename = "DistributedVirtualSwitchHostMemberConfigSpec"
)]
pub struct DvsHostMemberConfigSpec {
    pub operation: ConfigOperation,
    pub host: ManagedObjectReference,
    pub backing: PnicBacking,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    rename_all = "camelCase",
    tag = "_typeName",
    rename = "DistributedVirtualSwitchHostMemberPnicBacking"
)]
pub struct PnicBacking {
    pub pnic_spec: Vec<PnicSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    rename_all = "camelCase",
    tag = "_typeName",
    rename = "DistributedVirtualSwitchHostMemberPnicSpec"
)]
pub struct PnicSpec {
    pub pnic_device: String,
}

impl DvsReconfigureSpec {
    /// Adds `host` to the switch with `pnic` as its uplink.
    #[must_use]
    pub fn add_host(
        config_version: impl Into<String>,
        host: ManagedObjectReference,
        pnic: impl Into<String>,
    ) -> Self {
        Self {
            config_version: config_version.into(),
            host: vec![DvsHostMemberConfigSpec {
                operation: ConfigOperation::Add,
                host,
                backing: PnicBacking {
                    pnic_spec: vec![PnicSpec {
                        pnic_device: pnic.into(),
                    }],
                },
            }],
        }
    }
}
