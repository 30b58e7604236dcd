//! One entry point per provisioning use case.
//!
//! Every use case runs as a single ordered chain of lookups followed by at
//! most one mutating call. Remote tasks are awaited through
//! [`TaskOrchestrator`]; a failed task surfaces as the [`OperationError`]
//! variant of its use case. Nothing already applied is rolled back.

use crate::{
    core::{
        domain::{
            error::{LookupError, OperationError, VsphereError, VsphereResult},
            model::{
                ClientConfig, ComputeResource, Datacenter, HardwareVersions, HostEnrollment,
                ManagedObjectReference, OsProfile, TaskHandle, VmPlacement,
                cluster::{ClusterConfigSpecEx, DrsBehavior},
                device::{VirtualDevice, VirtualDeviceConfigSpec},
                dvs::{DvPortgroupConfigSpec, DvsCreateSpec, DvsReconfigureSpec},
                network::DvsConfigInfo,
                vm_config::VirtualMachineConfigSpec,
            },
            value_object::VlanId,
        },
        infrastructure::vim_api::{VimApi, call, property},
    },
    provision::application::{
        request::create_vm_request::CreateVmParams,
        service::{
            datastore_selector::DatastoreSelector,
            network_backing_resolver::NetworkBackingResolver,
            task_orchestrator::TaskOrchestrator,
            topology_service::TopologyService,
            vm_spec_builder::{DISK_KEY, NIC_KEY, SCSI_CONTROLLER_KEY, VmSpecBuilder},
        },
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Uplink count of a new distributed switch when the caller has no opinion.
pub const DEFAULT_UPLINKS: u32 = 2;

#[derive(Debug, Default, Deserialize)]
struct VmConfigInfo {
    #[serde(default)]
    hardware: VmHardware,
}

#[derive(Debug, Default, Deserialize)]
struct VmHardware {
    #[serde(default)]
    device: Vec<VirtualDevice>,
}

fn encode<T: Serialize>(method: &str, body: &T) -> VsphereResult<Value> {
    serde_json::to_value(body)
        .map_err(|e| VsphereError::Connection(format!("Failed to encode {method} request: {e}")))
}

fn switch_not_found(name: &str) -> VsphereError {
    OperationError::CreateDvSwitch(format!("Switch {name} not found")).into()
}

#[derive(Debug, Clone)]
pub struct VmLifecycleService {
    topology: TopologyService,
    resolver: NetworkBackingResolver,
    selector: DatastoreSelector,
    builder: VmSpecBuilder,
    tasks: TaskOrchestrator,
    hardware_versions: HardwareVersions,
}

impl VmLifecycleService {
    pub fn new(topology: TopologyService, config: &ClientConfig) -> Self {
        let resolver = NetworkBackingResolver::new(topology.clone());
        Self {
            tasks: TaskOrchestrator::new(
                topology.api().clone(),
                config.task_poll_interval,
                config.task_timeout,
            ),
            builder: VmSpecBuilder::new(resolver.clone()),
            selector: DatastoreSelector,
            resolver,
            hardware_versions: config.hardware_versions.clone(),
            topology,
        }
    }

    fn api(&self) -> &dyn VimApi {
        self.topology.api().as_ref()
    }

    pub fn tasks(&self) -> &TaskOrchestrator {
        &self.tasks
    }

    /// Creates a VM with one SCSI controller, one disk and one NIC on the
    /// first active cluster of the datacenter, and returns it.
    ///
    /// The OS is checked before anything is read from the server.
    pub async fn create_vm(&self, params: &CreateVmParams) -> VsphereResult<ManagedObjectReference> {
        let profile = OsProfile::lookup(&params.os)?;

        let datacenter = self
            .topology
            .find_datacenter(params.datacenter.as_deref())
            .await?;
        let cluster = self.topology.first_active_cluster(&datacenter).await?;
        if cluster.hosts.is_empty() {
            return Err(LookupError::NoHostsInCluster(
                "Tried to create VM, but no ESXi servers exists in the cluster".to_string(),
            )
            .into());
        }
        let pool = resource_pool(&cluster)?;
        let target = self.topology.query_config_target(&cluster).await?;
        let datastore = self.selector.select(&target, params.datastore.as_deref())?;
        let content = self.topology.service_content().await?;

        let placement = VmPlacement {
            folder: datacenter.vm_folder.clone(),
            pool,
            datastore_path: datastore.path.clone(),
            hardware_version: self.hardware_versions.for_endpoint(&content.about).to_string(),
        };
        let devices = vec![
            self.builder
                .add_scsi_controller(profile.scsi.as_str(), 0, SCSI_CONTROLLER_KEY)?,
            self.builder.add_disk(
                &datastore.path,
                params.disk_size,
                params.disk_provisioning,
                SCSI_CONTROLLER_KEY,
                0,
                DISK_KEY,
            ),
            self.builder.add_nic(params.vlan, &datacenter, NIC_KEY).await?,
        ];
        let request = self
            .builder
            .build_create_request(&placement, &params.name, params.memory, params.num_cpus, profile)
            .with_devices(devices)?;
        let body = request
            .body()
            .map_err(|e| VsphereError::Connection(format!("Failed to encode CreateVM_Task request: {e}")))?;

        let vm = self
            .tasks
            .run(&request.folder, "CreateVM_Task", body, OperationError::CreateVm)
            .await?
            .ok_or_else(|| OperationError::CreateVm("Task returned no virtual machine".to_string()))?;
        info!(%vm, name = %params.name, datastore = %datastore.name, os = profile.name, "created VM");
        Ok(vm)
    }

    /// Moves the first NIC of `vm` to the network carrying `vlan`. Other
    /// properties of the NIC are sent back unchanged.
    pub async fn reconfigure_vm_network(
        &self,
        vm: &ManagedObjectReference,
        vlan: VlanId,
        datacenter: Option<&str>,
    ) -> VsphereResult<()> {
        let config: Option<VmConfigInfo> = property(self.api(), vm, "config").await?;
        let mut device = config
            .unwrap_or_default()
            .hardware
            .device
            .into_iter()
            .find(VirtualDevice::is_nic)
            .ok_or_else(|| LookupError::NicNotFound(vm.to_string()))?;

        let datacenter = self.topology.find_datacenter(datacenter).await?;
        let backing = self.resolver.resolve(vlan, &datacenter).await?;
        if let Some(nic) = device.as_nic_mut() {
            debug!(%vm, key = nic.key, "replacing NIC backing");
            nic.backing = Some(backing.into());
        }

        let spec = VirtualMachineConfigSpec::device_changes(vec![VirtualDeviceConfigSpec::edit(device)]);
        let body = json!({ "spec": encode("ReconfigVM_Task", &spec)? });
        self.tasks
            .run(vm, "ReconfigVM_Task", body, OperationError::ProvisionVm)
            .await?;
        info!(%vm, %vlan, "reconfigured VM network");
        Ok(())
    }

    /// Starts the VM without waiting for it to come up.
    pub async fn power_on(&self, vm: &ManagedObjectReference) -> VsphereResult<TaskHandle> {
        self.tasks.submit(vm, "PowerOnVM_Task", json!({})).await
    }

    /// Adds a host to a cluster and returns the new host object.
    pub async fn add_host_to_cluster(
        &self,
        cluster: &ManagedObjectReference,
        enrollment: &HostEnrollment,
    ) -> VsphereResult<ManagedObjectReference> {
        let body = json!({
            "spec": encode("AddHost_Task", &enrollment.connect_spec())?,
            "asConnected": true
        });
        let host = self
            .tasks
            .run(cluster, "AddHost_Task", body, OperationError::AddHostToVsphere)
            .await?
            .ok_or_else(|| OperationError::AddHostToVsphere("Task returned no host".to_string()))?;
        info!(%host, %cluster, fqdn = %enrollment.fqdn, "added host to cluster");
        Ok(host)
    }

    pub async fn create_distributed_switch(
        &self,
        datacenter: Option<&str>,
        name: &str,
        uplinks: u32,
    ) -> VsphereResult<ManagedObjectReference> {
        let datacenter = self.topology.find_datacenter(datacenter).await?;
        let spec = encode("CreateDVS_Task", &DvsCreateSpec::new(name, uplinks))?;
        let switch = self
            .tasks
            .run(
                &datacenter.network_folder,
                "CreateDVS_Task",
                json!({ "spec": spec }),
                OperationError::CreateDvSwitch,
            )
            .await?
            .ok_or_else(|| OperationError::CreateDvSwitch("Task returned no switch".to_string()))?;
        info!(%switch, %name, uplinks, "created distributed switch");
        Ok(switch)
    }

    /// Adds one port group per named VLAN. Names mapped to no VLAN are
    /// skipped.
    pub async fn create_port_groups(
        &self,
        datacenter: Option<&str>,
        switch_name: &str,
        port_groups: &BTreeMap<String, Option<VlanId>>,
    ) -> VsphereResult<()> {
        let datacenter = self.topology.find_datacenter(datacenter).await?;
        let switch = self
            .topology
            .find_switch_by_name(&datacenter, switch_name)
            .await?
            .ok_or_else(|| switch_not_found(switch_name))?;

        let specs: Vec<DvPortgroupConfigSpec> = port_groups
            .iter()
            .filter_map(|(name, vlan)| vlan.map(|vlan| DvPortgroupConfigSpec::tagged(name, vlan)))
            .collect();
        if specs.is_empty() {
            debug!(switch = %switch_name, "no port groups with a VLAN to add");
            return Ok(());
        }

        let count = specs.len();
        let body = json!({ "spec": encode("AddDVPortgroup_Task", &specs)? });
        self.tasks
            .run(
                &switch.reference,
                "AddDVPortgroup_Task",
                body,
                OperationError::CreateDvPortgroup,
            )
            .await?;
        info!(switch = %switch_name, count, "created distributed port groups");
        Ok(())
    }

    /// Joins a host to a distributed switch with `pnic` as its uplink.
    pub async fn add_host_uplink_to_switch(
        &self,
        datacenter: Option<&str>,
        host_name: &str,
        switch_name: &str,
        pnic: &str,
    ) -> VsphereResult<()> {
        let datacenter = self.topology.find_datacenter(datacenter).await?;
        let host = self
            .topology
            .find_host_by_name(&datacenter, host_name)
            .await?
            .ok_or_else(|| LookupError::HostNotFound(host_name.to_string()))?;
        let switch = self
            .topology
            .find_switch_by_name(&datacenter, switch_name)
            .await?
            .ok_or_else(|| switch_not_found(switch_name))?;

        let config: DvsConfigInfo = property(self.api(), &switch.reference, "config").await?;
        let spec = DvsReconfigureSpec::add_host(config.config_version, host.clone(), pnic);
        let body = json!({ "spec": encode("ReconfigureDvs_Task", &spec)? });
        self.tasks
            .run(
                &switch.reference,
                "ReconfigureDvs_Task",
                body,
                OperationError::CreateDvSwitch,
            )
            .await?;
        info!(%host, switch = %switch_name, %pnic, "added host uplink to switch");
        Ok(())
    }

    /// The datacenter named `name`, created under the root folder if absent.
    pub async fn get_or_create_datacenter(&self, name: &str) -> VsphereResult<ManagedObjectReference> {
        match self.topology.find_datacenter(Some(name)).await {
            Ok(datacenter) => {
                debug!(%name, "datacenter exists");
                return Ok(datacenter.reference);
            }
            Err(VsphereError::Lookup(LookupError::DatacenterNotFound(_))) => {}
            Err(e) => return Err(e),
        }

        let content = self.topology.service_content().await?;
        let datacenter: ManagedObjectReference = call(
            self.api(),
            &content.root_folder,
            "CreateDatacenter",
            json!({ "name": name }),
        )
        .await?;
        info!(%datacenter, %name, "created datacenter");
        Ok(datacenter)
    }

    /// The cluster named `name`, created with DRS enabled if absent. An
    /// existing cluster keeps its DRS settings.
    pub async fn get_or_create_cluster(
        &self,
        datacenter: Option<&str>,
        name: &str,
        drs: DrsBehavior,
    ) -> VsphereResult<ManagedObjectReference> {
        let datacenter = self.topology.find_datacenter(datacenter).await?;
        if let Some(cluster) = self.topology.find_cluster_by_name(&datacenter, name).await? {
            debug!(%name, "cluster exists");
            return Ok(cluster.reference);
        }

        let body = json!({
            "name": name,
            "spec": encode("CreateClusterEx", &ClusterConfigSpecEx::with_drs(drs))?
        });
        let cluster: ManagedObjectReference =
            call(self.api(), &datacenter.host_folder, "CreateClusterEx", body)
                .await
                .map_err(|e| match e {
                    VsphereError::Api { message, .. } => OperationError::CreateCluster(message).into(),
                    other => other,
                })?;
        info!(%cluster, %name, ?drs, "created cluster");
        Ok(cluster)
    }

    pub async fn find_vm_by_name(
        &self,
        name: &str,
        datacenter: Option<&str>,
    ) -> VsphereResult<Option<ManagedObjectReference>> {
        let datacenter: Datacenter = self.topology.find_datacenter(datacenter).await?;
        self.topology.find_vm_by_name(&datacenter, name).await
    }
}

fn resource_pool(cluster: &ComputeResource) -> VsphereResult<ManagedObjectReference> {
    cluster.resource_pool.clone().ok_or_else(|| {
        VsphereError::Connection(format!("Compute resource {} has no resource pool", cluster.name))
    })
}
