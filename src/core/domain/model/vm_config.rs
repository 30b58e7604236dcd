//! VM configuration specs and the `CreateVM_Task` request.

use crate::core::domain::{
    error::ValidationError,
    model::{
        device::VirtualDeviceConfigSpec,
        inventory::AboutInfo,
        managed_object::ManagedObjectReference,
    },
};
use serde::Serialize;
use std::collections::HashSet;

/// Key of the single SCSI controller of a new VM.
pub const SCSI_CONTROLLER_KEY: i32 = 0;

/// Hardware version used when none is configured.
pub const DEFAULT_HARDWARE_VERSION: &str = "vmx-13";

/// Virtual hardware versions per endpoint family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareVersions {
    /// Used when talking to a standalone host.
    pub standalone: String,
    /// Used when talking to a central manager.
    pub managed: String,
}

impl Default for HardwareVersions {
    fn default() -> Self {
        Self {
            standalone: DEFAULT_HARDWARE_VERSION.to_string(),
            managed: DEFAULT_HARDWARE_VERSION.to_string(),
        }
    }
}

impl HardwareVersions {
    #[must_use]
    pub fn for_endpoint(&self, about: &AboutInfo) -> &str {
        if about.is_managed() {
            &self.managed
        } else {
            &self.standalone
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineFileInfo {
    pub vm_path_name: String,
}

/// `VirtualMachineConfigSpec`. Fields are optional because the same type
/// serves creation and partial reconfiguration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "_typeName")]
pub struct VirtualMachineConfigSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<VirtualMachineFileInfo>,
    #[serde(rename = "memoryMB", skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<i64>,
    #[serde(rename = "numCPUs", skip_serializing_if = "Option::is_none")]
    pub num_cpus: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub device_change: Vec<VirtualDeviceConfigSpec>,
}

impl VirtualMachineConfigSpec {
    /// A spec that only changes devices, as sent with `ReconfigVM_Task`.
    #[must_use]
    pub fn device_changes(device_change: Vec<VirtualDeviceConfigSpec>) -> Self {
        Self {
            device_change,
            ..Self::default()
        }
    }
}

/// Everything `CreateVM_Task` needs besides the device list.
#[derive(Debug, Clone, PartialEq)]
pub struct VmPlacement {
    /// VM folder the new VM is registered in.
    pub folder: ManagedObjectReference,
    pub pool: ManagedObjectReference,
    /// Datastore path prefix, e.g. `[ds1]`.
    pub datastore_path: String,
    pub hardware_version: String,
}

/// A `CreateVM_Task` call, issued against the VM folder.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateVmRequest {
    pub folder: ManagedObjectReference,
    pub pool: ManagedObjectReference,
    pub config: VirtualMachineConfigSpec,
}

#[derive(Serialize)]
struct CreateVmBody<'a> {
    config: &'a VirtualMachineConfigSpec,
    pool: &'a ManagedObjectReference,
}

impl CreateVmRequest {
    /// Installs the device list. A create request carries exactly one SCSI
    /// controller, keyed [`SCSI_CONTROLLER_KEY`], and no two devices share a
    /// key.
    pub fn with_devices(
        mut self,
        devices: Vec<VirtualDeviceConfigSpec>,
    ) -> Result<Self, ValidationError> {
        let controllers: Vec<Option<i32>> = devices
            .iter()
            .filter(|spec| spec.device.is_scsi_controller())
            .map(|spec| spec.device.key())
            .collect();
        match controllers.as_slice() {
            [Some(SCSI_CONTROLLER_KEY)] => {}
            [Some(key)] => {
                return Err(ValidationError::ConstraintViolation(format!(
                    "SCSI controller must use key {SCSI_CONTROLLER_KEY}, found {key}"
                )));
            }
            _ => {
                return Err(ValidationError::ConstraintViolation(format!(
                    "Expected exactly one SCSI controller, found {}",
                    controllers.len()
                )));
            }
        }

        let mut seen = HashSet::new();
        for key in devices.iter().filter_map(|spec| spec.device.key()) {
            if !seen.insert(key) {
                return Err(ValidationError::ConstraintViolation(format!(
                    "Device key {key} is used more than once"
                )));
            }
        }

        self.config.device_change = devices;
        Ok(self)
    }

    /// The JSON body of the method call.
    pub fn body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(CreateVmBody {
            config: &self.config,
            pool: &self.pool,
        })
    }
}
