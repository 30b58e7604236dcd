//! Distributed switches, their port groups, and the attachment point a NIC
//! ends up backed by.

use crate::core::domain::model::managed_object::ManagedObjectReference;
use crate::core::domain::value_object::VlanId;
use serde::Deserialize;
use serde_json::Value;

/// Name fragment vSphere gives the uplink port group of every switch.
const UPLINK_MARKER: &str = "dvuplinks";

/// A distributed virtual switch.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributedSwitch {
    pub reference: ManagedObjectReference,
    pub uuid: String,
    pub name: String,
    pub num_ports: i32,
    /// Port groups the switch claims as members.
    pub portgroups: Vec<ManagedObjectReference>,
}

impl DistributedSwitch {
    /// A switch with no ports has never had hosts attached and cannot carry
    /// traffic.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.num_ports > 0
    }
}

/// `DistributedVirtualSwitch.summary` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DvsSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub num_ports: i32,
}

/// `DistributedVirtualSwitch.config`, reduced to what reconfiguration needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DvsConfigInfo {
    pub config_version: String,
    #[serde(default)]
    pub name: String,
}

/// The VLAN setting of a distributed port group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortgroupVlan {
    /// A single tagged VLAN.
    Id(u16),
    /// Anything that is not a plain id: trunk ranges, private VLANs.
    Trunk,
    /// No VLAN id present. Counts as non-plain for the trunk sentinel.
    Unset,
}

impl PortgroupVlan {
    /// Interprets a `defaultPortConfig.vlan` object.
    #[must_use]
    pub fn from_vlan_spec(vlan: Option<&Value>) -> Self {
        match vlan.and_then(|v| v.get("vlanId")) {
            None | Some(Value::Null) => PortgroupVlan::Unset,
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|id| u16::try_from(id).ok())
                .map(PortgroupVlan::Id)
                .unwrap_or(PortgroupVlan::Trunk),
            Some(_) => PortgroupVlan::Trunk,
        }
    }

    /// Whether a port group with this setting carries `vlan`. The trunk
    /// sentinel is served by the first non-plain port group.
    #[must_use]
    pub fn carries(&self, vlan: VlanId) -> bool {
        match self {
            PortgroupVlan::Id(id) => *id == vlan.get(),
            PortgroupVlan::Trunk | PortgroupVlan::Unset => vlan.is_trunk(),
        }
    }
}

/// A distributed port group.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributedPortgroup {
    pub reference: ManagedObjectReference,
    pub key: String,
    pub name: String,
    pub vlan: PortgroupVlan,
}

impl DistributedPortgroup {
    /// Uplink port groups carry no VM traffic. vSphere exposes no flag for
    /// them, only the generated name.
    #[must_use]
    pub fn is_uplink(&self) -> bool {
        self.name.to_lowercase().contains(UPLINK_MARKER)
    }
}

/// `DistributedVirtualPortgroup.config` on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DvPortgroupConfigInfo {
    pub name: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub default_port_config: Option<Value>,
}

impl DvPortgroupConfigInfo {
    #[must_use]
    pub fn vlan(&self) -> PortgroupVlan {
        PortgroupVlan::from_vlan_spec(
            self.default_port_config
                .as_ref()
                .and_then(|config| config.get("vlan")),
        )
    }
}

/// Where a NIC gets attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkBacking {
    /// A standard switch port group, addressed by network name.
    Standard { device_name: String },
    /// A distributed switch port group.
    Distributed {
        switch_uuid: String,
        portgroup_key: String,
    },
}
