pub mod client_config;
pub mod cluster;
pub mod config_target;
pub mod device;
pub mod dvs;
pub mod host;
pub mod inventory;
pub mod managed_object;
pub mod network;
pub mod os_profile;
pub mod task;
pub mod vcsa_install;
pub mod vm_config;
pub mod vsphere_connection;

pub use client_config::{ClientConfig, DEFAULT_API_RELEASE, RateLimitConfig};
pub use config_target::{ConfigTarget, DatastoreSummary};
pub use host::{HostConfigInfo, HostEnrollment};
pub use inventory::{AboutInfo, ComputeResource, Datacenter, ServiceContent};
pub use managed_object::{ManagedObjectReference, ObjectKind};
pub use network::{DistributedPortgroup, DistributedSwitch, NetworkBacking, PortgroupVlan};
pub use os_profile::{DEFAULT_OS, OsProfile};
pub use task::{TaskHandle, TaskInfo, TaskOutcome, TaskState};
pub use vm_config::{CreateVmRequest, HardwareVersions, VmPlacement};
pub use vsphere_connection::VsphereConnection;
