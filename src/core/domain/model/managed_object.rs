//! Managed-object references and the object kinds the inventory traversal
//! understands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque handle to a server-side inventory object.
///
/// It is never dereferenced locally, only passed back to the control API.
/// On the wire it is `{"type": "Datacenter", "value": "datacenter-3"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ManagedObjectReference {
    /// The managed object type (`Folder`, `VirtualMachine`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// The server-assigned identifier (`group-d1`, `vm-42`, ...).
    pub value: String,
}

impl ManagedObjectReference {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// Path of a property or method relative to the API root,
    /// e.g. `Datacenter/datacenter-3/hostFolder`.
    #[must_use]
    pub fn path(&self, member: &str) -> String {
        format!("{}/{}/{}", self.kind, self.value, member)
    }

    #[must_use]
    pub fn is(&self, kind: ObjectKind) -> bool {
        kind.matches(&self.kind)
    }
}

impl fmt::Display for ManagedObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// Object families looked up by inventory traversal. Some families span
/// several concrete managed object types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Folder,
    Datacenter,
    ComputeResource,
    HostSystem,
    DistributedSwitch,
    VirtualMachine,
}

impl ObjectKind {
    #[must_use]
    pub fn matches(&self, type_name: &str) -> bool {
        match self {
            ObjectKind::Folder => type_name == "Folder",
            ObjectKind::Datacenter => type_name == "Datacenter",
            ObjectKind::ComputeResource => {
                matches!(type_name, "ComputeResource" | "ClusterComputeResource")
            }
            ObjectKind::HostSystem => type_name == "HostSystem",
            ObjectKind::DistributedSwitch => matches!(
                type_name,
                "DistributedVirtualSwitch" | "VmwareDistributedVirtualSwitch"
            ),
            ObjectKind::VirtualMachine => type_name == "VirtualMachine",
        }
    }

    /// The datacenter property holding the root folder for this kind.
    #[must_use]
    pub fn datacenter_folder(&self) -> Option<&'static str> {
        match self {
            ObjectKind::ComputeResource | ObjectKind::HostSystem => Some("hostFolder"),
            ObjectKind::VirtualMachine => Some("vmFolder"),
            ObjectKind::DistributedSwitch => Some("networkFolder"),
            ObjectKind::Folder | ObjectKind::Datacenter => None,
        }
    }
}
