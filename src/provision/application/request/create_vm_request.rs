use crate::core::domain::{
    model::{DEFAULT_OS, device::DiskProvisioning},
    value_object::VlanId,
};

pub const DEFAULT_DISK_SIZE: u64 = 16 * 1024 * 1024 * 1024;
pub const DEFAULT_MEMORY: u64 = 1024 * 1024 * 1024;
pub const DEFAULT_CPUS: i32 = 1;

/// Parameters of a VM creation. Sizes are in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVmParams {
    pub name: String,
    pub vlan: VlanId,
    pub disk_size: u64,
    pub num_cpus: i32,
    pub memory: u64,
    pub os: String,
    /// Datacenter name; the first datacenter when unset.
    pub datacenter: Option<String>,
    /// Datastore name; the one with the most free space when unset.
    pub datastore: Option<String>,
    pub disk_provisioning: DiskProvisioning,
}

impl CreateVmParams {
    /// A 16 GiB disk, one CPU, 1 GiB of memory and the default OS.
    pub fn new(name: impl Into<String>, vlan: VlanId) -> Self {
        Self {
            name: name.into(),
            vlan,
            disk_size: DEFAULT_DISK_SIZE,
            num_cpus: DEFAULT_CPUS,
            memory: DEFAULT_MEMORY,
            os: DEFAULT_OS.to_string(),
            datacenter: None,
            datastore: None,
            disk_provisioning: DiskProvisioning::Thick,
        }
    }

    #[must_use]
    pub fn disk_size(mut self, bytes: u64) -> Self {
        self.disk_size = bytes;
        self
    }

    #[must_use]
    pub fn num_cpus(mut self, cpus: i32) -> Self {
        self.num_cpus = cpus;
        self
    }

    #[must_use]
    pub fn memory(mut self, bytes: u64) -> Self {
        self.memory = bytes;
        self
    }

    #[must_use]
    pub fn os(mut self, os: impl Into<String>) -> Self {
        self.os = os.into();
        self
    }

    #[must_use]
    pub fn datacenter(mut self, name: impl Into<String>) -> Self {
        self.datacenter = Some(name.into());
        self
    }

    #[must_use]
    pub fn datastore(mut self, name: impl Into<String>) -> Self {
        self.datastore = Some(name.into());
        self
    }

    #[must_use]
    pub fn disk_provisioning(mut self, provisioning: DiskProvisioning) -> Self {
        self.disk_provisioning = provisioning;
        self
    }
}
