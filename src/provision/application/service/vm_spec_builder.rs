//! Composes the device list and the creation request of a new VM.

use crate::{
    core::domain::{
        error::{ProfileError, VsphereResult},
        model::{
            CreateVmRequest, Datacenter, OsProfile, VmPlacement,
            device::{
                DiskBacking, DiskProvisioning, FileOperation, FlatVer2Backing, ScsiController,
                ScsiControllerType, VirtualDevice, VirtualDeviceConfigSpec, VirtualDisk,
                VirtualEthernetCard,
            },
            vm_config::{VirtualMachineConfigSpec, VirtualMachineFileInfo},
        },
        value_object::VlanId,
    },
    provision::application::service::network_backing_resolver::NetworkBackingResolver,
};

/// Device keys of a freshly created VM.
pub use crate::core::domain::model::vm_config::SCSI_CONTROLLER_KEY;
pub const DISK_KEY: i32 = 1;
pub const NIC_KEY: i32 = 2;

const BYTES_PER_KB: u64 = 1024;
const BYTES_PER_MB: u64 = 1024 * 1024;

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone)]
pub struct VmSpecBuilder {
    resolver: NetworkBackingResolver,
}

impl VmSpecBuilder {
    pub fn new(resolver: NetworkBackingResolver) -> Self {
        Self { resolver }
    }

    /// The request without devices; add them with
    /// [`CreateVmRequest::with_devices`].
    pub fn build_create_request(
        &self,
        placement: &VmPlacement,
        name: &str,
        memory_bytes: u64,
        num_cpus: i32,
        profile: &OsProfile,
    ) -> CreateVmRequest {
        CreateVmRequest {
            folder: placement.folder.clone(),
            pool: placement.pool.clone(),
            config: VirtualMachineConfigSpec {
                name: Some(name.to_string()),
                version: Some(placement.hardware_version.clone()),
                files: Some(VirtualMachineFileInfo {
                    vm_path_name: placement.datastore_path.clone(),
                }),
                memory_mb: Some(saturating_i64(memory_bytes / BYTES_PER_MB)),
                num_cpus: Some(num_cpus),
                guest_id: Some(profile.guest_id.to_string()),
                device_change: Vec::new(),
            },
        }
    }

    pub fn add_scsi_controller(
        &self,
        controller_type: &str,
        bus_number: i32,
        key: i32,
    ) -> Result<VirtualDeviceConfigSpec, ProfileError> {
        let kind: ScsiControllerType = controller_type.parse()?;
        Ok(VirtualDeviceConfigSpec::add(VirtualDevice::scsi_controller(
            kind,
            ScsiController::new(bus_number, key),
        )))
    }

    /// A new persistent disk in `datastore_path`, sized in whole kilobytes.
    pub fn add_disk(
        &self,
        datastore_path: &str,
        size_bytes: u64,
        provisioning: DiskProvisioning,
        controller_key: i32,
        unit_number: i32,
        key: i32,
    ) -> VirtualDeviceConfigSpec {
        let disk = VirtualDisk {
            key,
            controller_key: Some(controller_key),
            unit_number: Some(unit_number),
            capacity_in_kb: saturating_i64(size_bytes / BYTES_PER_KB),
            backing: DiskBacking::FlatVer2(FlatVer2Backing {
                file_name: datastore_path.to_string(),
                disk_mode: "persistent".to_string(),
                thin_provisioned: (provisioning == DiskProvisioning::Thin).then_some(true),
            }),
        };
        VirtualDeviceConfigSpec::add(VirtualDevice::VirtualDisk(disk))
            .with_file_operation(FileOperation::Create)
    }

    /// A VMXNET3 adapter with a generated MAC, attached to `vlan`.
    pub async fn add_nic(
        &self,
        vlan: VlanId,
        datacenter: &Datacenter,
        key: i32,
    ) -> VsphereResult<VirtualDeviceConfigSpec> {
        let backing = self.resolver.resolve(vlan, datacenter).await?;
        Ok(VirtualDeviceConfigSpec::add(VirtualDevice::VirtualVmxnet3(
            VirtualEthernetCard::generated(key, backing),
        )))
    }
}
