//! Virtual hardware devices and the device-change entries of a VM config spec.
//!
//! Device and backing payloads are polymorphic on the wire, so they are
//! modelled as enums tagged by `_typeName`.

use crate::core::domain::{
    error::ProfileError,
    model::network::NetworkBacking,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Operation of a device-change entry or a host member spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOperation {
    Add,
    Edit,
}

/// File operation attached to a device change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    Create,
}

/// SCSI controller families supported for new VMs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScsiControllerType {
    Paravirtual,
    LsiSas,
}

impl ScsiControllerType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ScsiControllerType::Paravirtual => "paravirtual",
            ScsiControllerType::LsiSas => "lsi_sas",
        }
    }
}

impl FromStr for ScsiControllerType {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paravirtual" => Ok(ScsiControllerType::Paravirtual),
            "lsi_sas" => Ok(ScsiControllerType::LsiSas),
            other => Err(ProfileError::ScsiControllerNotFound(other.to_string())),
        }
    }
}

/// How a new disk's blocks are allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiskProvisioning {
    #[default]
    Thick,
    Thin,
}

impl DiskProvisioning {
    /// Anything other than `thick` means thin.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label == "thick" {
            DiskProvisioning::Thick
        } else {
            DiskProvisioning::Thin
        }
    }
}

/// A virtual device as sent to and read from the server. Types this crate
/// does not manage deserialize to `Unsupported`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "_typeName")]
pub enum VirtualDevice {
    #[serde(rename = "ParaVirtualSCSIController")]
    ParaVirtualScsiController(ScsiController),
    #[serde(rename = "VirtualLsiLogicSASController")]
    LsiLogicSasController(ScsiController),
    VirtualDisk(VirtualDisk),
    VirtualVmxnet3(VirtualEthernetCard),
    VirtualE1000(VirtualEthernetCard),
    #[serde(other)]
    Unsupported,
}

impl VirtualDevice {
    #[must_use]
    pub fn scsi_controller(kind: ScsiControllerType, controller: ScsiController) -> Self {
        match kind {
            ScsiControllerType::Paravirtual => VirtualDevice::ParaVirtualScsiController(controller),
            ScsiControllerType::LsiSas => VirtualDevice::LsiLogicSasController(controller),
        }
    }

    /// The device key, when the device type is one this crate models.
    #[must_use]
    pub fn key(&self) -> Option<i32> {
        match self {
            VirtualDevice::ParaVirtualScsiController(c)
            | VirtualDevice::LsiLogicSasController(c) => Some(c.key),
            VirtualDevice::VirtualDisk(d) => Some(d.key),
            VirtualDevice::VirtualVmxnet3(n) | VirtualDevice::VirtualE1000(n) => Some(n.key),
            VirtualDevice::Unsupported => None,
        }
    }

    #[must_use]
    pub fn is_scsi_controller(&self) -> bool {
        matches!(
            self,
            VirtualDevice::ParaVirtualScsiController(_) | VirtualDevice::LsiLogicSasController(_)
        )
    }

    #[must_use]
    pub fn is_nic(&self) -> bool {
        matches!(
            self,
            VirtualDevice::VirtualVmxnet3(_) | VirtualDevice::VirtualE1000(_)
        )
    }

    /// The network card, for the supported NIC family.
    pub fn as_nic_mut(&mut self) -> Option<&mut VirtualEthernetCard> {
        match self {
            VirtualDevice::VirtualVmxnet3(n) | VirtualDevice::VirtualE1000(n) => Some(n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScsiController {
    pub key: i32,
    pub bus_number: i32,
    #[serde(default = "no_sharing")]
    pub shared_bus: String,
}

fn no_sharing() -> String {
    "noSharing".to_string()
}

impl ScsiController {
    #[must_use]
    pub fn new(bus_number: i32, key: i32) -> Self {
        Self {
            key,
            bus_number,
            shared_bus: no_sharing(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualDisk {
    pub key: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_key: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<i32>,
    #[serde(rename = "capacityInKB", default)]
    pub capacity_in_kb: i64,
    pub backing: DiskBacking,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "_typeName")]
pub enum DiskBacking {
    #[serde(rename = "VirtualDiskFlatVer2BackingInfo")]
    FlatVer2(FlatVer2Backing),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatVer2Backing {
    pub file_name: String,
    pub disk_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thin_provisioned: Option<bool>,
}

/// A network adapter. Properties this crate does not model (MAC address,
/// connectable state, slot info) are carried through untouched so that an
/// `edit` only changes what was meant to change.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualEthernetCard {
    pub key: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backing: Option<EthernetCardBacking>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VirtualEthernetCard {
    /// A fresh adapter with a server-generated MAC address.
    #[must_use]
    pub fn generated(key: i32, backing: NetworkBacking) -> Self {
        Self {
            key,
            address_type: Some("generated".to_string()),
            backing: Some(backing.into()),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "_typeName")]
pub enum EthernetCardBacking {
    #[serde(
        rename = "VirtualEthernetCardNetworkBackingInfo",
        rename_all = "camelCase"
    )]
    Network { device_name: String },
    #[serde(rename = "VirtualEthernetCardDistributedVirtualPortBackingInfo")]
    DistributedPort {
        port: DistributedVirtualSwitchPortConnection,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributedVirtualSwitchPortConnection {
    pub switch_uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portgroup_key: Option<String>,
}

impl From<NetworkBacking> for EthernetCardBacking {
    fn from(backing: NetworkBacking) -> Self {
        match backing {
            NetworkBacking::Standard { device_name } => EthernetCardBacking::Network { device_name },
            NetworkBacking::Distributed {
                switch_uuid,
                portgroup_key,
            } => EthernetCardBacking::DistributedPort {
                port: DistributedVirtualSwitchPortConnection {
                    switch_uuid,
                    portgroup_key: Some(portgroup_key),
                },
            },
        }
    }
}

/// One entry of `VirtualMachineConfigSpec.deviceChange`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualDeviceConfigSpec {
    pub operation: ConfigOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_operation: Option<FileOperation>,
    pub device: VirtualDevice,
}

impl VirtualDeviceConfigSpec {
    #[must_use]
    pub fn add(device: VirtualDevice) -> Self {
        Self {
            operation: ConfigOperation::Add,
            file_operation: None,
            device,
        }
    }

    #[must_use]
    pub fn edit(device: VirtualDevice) -> Self {
        Self {
            operation: ConfigOperation::Edit,
            file_operation: None,
            device,
        }
    }

    #[must_use]
    pub fn with_file_operation(mut self, operation: FileOperation) -> Self {
        self.file_operation = Some(operation);
        self
    }
}
