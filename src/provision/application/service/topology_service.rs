//! Read-only inventory traversal.

use crate::core::{
    domain::{
        error::{LookupError, VsphereResult},
        model::{
            ComputeResource, ConfigTarget, Datacenter, DistributedPortgroup, DistributedSwitch,
            HostConfigInfo, ManagedObjectReference, ObjectKind, ServiceContent,
            inventory::ComputeResourceSummary,
            network::{DvPortgroupConfigInfo, DvsSummary},
        },
    },
    infrastructure::vim_api::{VimApi, call, property},
};
use serde_json::json;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Comparator over managed-object references, applied to every listing.
pub type InventoryOrder =
    Arc<dyn Fn(&ManagedObjectReference, &ManagedObjectReference) -> Ordering + Send + Sync>;

/// Lists and reads inventory objects. Listings come back in inventory order
/// unless a comparator is installed with [`TopologyService::with_order`];
/// "first" always means first in that order.
#[derive(Clone)]
pub struct TopologyService {
    api: Arc<dyn VimApi>,
    order: Option<InventoryOrder>,
}

impl fmt::Debug for TopologyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopologyService")
            .field("ordered", &self.order.is_some())
            .finish()
    }
}

impl TopologyService {
    pub fn new(api: Arc<dyn VimApi>) -> Self {
        Self { api, order: None }
    }

    /// Sorts every listing with `order`. The sort is stable, so objects the
    /// comparator considers equal keep their inventory order.
    #[must_use]
    pub fn with_order<F>(mut self, order: F) -> Self
    where
        F: Fn(&ManagedObjectReference, &ManagedObjectReference) -> Ordering + Send + Sync + 'static,
    {
        self.order = Some(Arc::new(order));
        self
    }

    pub fn api(&self) -> &Arc<dyn VimApi> {
        &self.api
    }

    fn ordered(&self, mut references: Vec<ManagedObjectReference>) -> Vec<ManagedObjectReference> {
        if let Some(order) = &self.order {
            references.sort_by(|a, b| order(a, b));
        }
        references
    }

    async fn list(
        &self,
        container: &ManagedObjectReference,
        kind: ObjectKind,
    ) -> VsphereResult<Vec<ManagedObjectReference>> {
        let found = self.api.find_objects(container, kind).await?;
        Ok(self.ordered(found))
    }

    pub async fn service_content(&self) -> VsphereResult<ServiceContent> {
        self.api.service_content().await
    }

    pub async fn datacenters(&self) -> VsphereResult<Vec<ManagedObjectReference>> {
        let content = self.api.service_content().await?;
        self.list(&content.root_folder, ObjectKind::Datacenter).await
    }

    /// The datacenter named `name`, or the first one when no name is given.
    pub async fn find_datacenter(&self, name: Option<&str>) -> VsphereResult<Datacenter> {
        for reference in self.datacenters().await? {
            let datacenter_name: String = property(self.api.as_ref(), &reference, "name").await?;
            if name.is_none_or(|wanted| wanted == datacenter_name) {
                return self.datacenter(reference, datacenter_name).await;
            }
        }
        Err(LookupError::DatacenterNotFound(name.unwrap_or_default().to_string()).into())
    }

    async fn datacenter(
        &self,
        reference: ManagedObjectReference,
        name: String,
    ) -> VsphereResult<Datacenter> {
        let api = self.api.as_ref();
        Ok(Datacenter {
            host_folder: property(api, &reference, "hostFolder").await?,
            vm_folder: property(api, &reference, "vmFolder").await?,
            network_folder: property(api, &reference, "networkFolder").await?,
            reference,
            name,
        })
    }

    pub async fn compute_resource(
        &self,
        reference: &ManagedObjectReference,
    ) -> VsphereResult<ComputeResource> {
        let api = self.api.as_ref();
        let summary: Option<ComputeResourceSummary> = property(api, reference, "summary").await?;
        let hosts: Option<Vec<ManagedObjectReference>> = property(api, reference, "host").await?;
        Ok(ComputeResource {
            reference: reference.clone(),
            name: property(api, reference, "name").await?,
            hosts: hosts.unwrap_or_default(),
            resource_pool: property(api, reference, "resourcePool").await?,
            environment_browser: property(api, reference, "environmentBrowser").await?,
            num_effective_hosts: summary.unwrap_or_default().num_effective_hosts,
        })
    }

    /// Clusters and standalone compute resources under the host folder.
    pub async fn clusters(&self, datacenter: &Datacenter) -> VsphereResult<Vec<ComputeResource>> {
        let mut clusters = Vec::new();
        for reference in self
            .list(&datacenter.host_folder, ObjectKind::ComputeResource)
            .await?
        {
            clusters.push(self.compute_resource(&reference).await?);
        }
        Ok(clusters)
    }

    pub async fn find_cluster_by_name(
        &self,
        datacenter: &Datacenter,
        name: &str,
    ) -> VsphereResult<Option<ComputeResource>> {
        Ok(self
            .clusters(datacenter)
            .await?
            .into_iter()
            .find(|cluster| cluster.name == name))
    }

    /// The first compute resource with at least one effective host.
    pub async fn first_active_cluster(&self, datacenter: &Datacenter) -> VsphereResult<ComputeResource> {
        for reference in self
            .list(&datacenter.host_folder, ObjectKind::ComputeResource)
            .await?
        {
            let summary: Option<ComputeResourceSummary> =
                property(self.api.as_ref(), &reference, "summary").await?;
            if summary.is_some_and(|s| s.num_effective_hosts > 0) {
                return self.compute_resource(&reference).await;
            }
            debug!(cluster = %reference, "skipping compute resource without effective hosts");
        }
        Err(LookupError::NoHostsInCluster(
            "Tried to create VM, but no available clusters could be found".to_string(),
        )
        .into())
    }

    /// Datastores and networks the compute resource can place VMs on.
    pub async fn query_config_target(&self, cluster: &ComputeResource) -> VsphereResult<ConfigTarget> {
        let Some(browser) = &cluster.environment_browser else {
            warn!(cluster = %cluster.name, "compute resource has no environment browser");
            return Ok(ConfigTarget::default());
        };
        let target: Option<ConfigTarget> =
            call(self.api.as_ref(), browser, "QueryConfigTarget", json!({})).await?;
        Ok(target.unwrap_or_default())
    }

    /// Every distributed switch in the network folder, initialized or not.
    pub async fn distributed_switches(
        &self,
        datacenter: &Datacenter,
    ) -> VsphereResult<Vec<DistributedSwitch>> {
        let api = self.api.as_ref();
        let mut switches = Vec::new();
        for reference in self
            .list(&datacenter.network_folder, ObjectKind::DistributedSwitch)
            .await?
        {
            let summary: Option<DvsSummary> = property(api, &reference, "summary").await?;
            let summary = summary.unwrap_or_default();
            let uuid: String = match summary.uuid {
                Some(uuid) => uuid,
                None => property(api, &reference, "uuid").await?,
            };
            let portgroups: Option<Vec<ManagedObjectReference>> =
                property(api, &reference, "portgroup").await?;
            switches.push(DistributedSwitch {
                reference,
                uuid,
                name: summary.name,
                num_ports: summary.num_ports,
                portgroups: self.ordered(portgroups.unwrap_or_default()),
            });
        }
        Ok(switches)
    }

    pub async fn find_switch_by_name(
        &self,
        datacenter: &Datacenter,
        name: &str,
    ) -> VsphereResult<Option<DistributedSwitch>> {
        Ok(self
            .distributed_switches(datacenter)
            .await?
            .into_iter()
            .find(|switch| switch.name == name))
    }

    /// Port groups the switch lists as members.
    pub async fn port_groups(
        &self,
        switch: &DistributedSwitch,
    ) -> VsphereResult<Vec<DistributedPortgroup>> {
        let mut portgroups = Vec::new();
        for reference in &switch.portgroups {
            let config: DvPortgroupConfigInfo =
                property(self.api.as_ref(), reference, "config").await?;
            portgroups.push(DistributedPortgroup {
                key: config.key.clone().unwrap_or_else(|| reference.value.clone()),
                vlan: config.vlan(),
                name: config.name,
                reference: reference.clone(),
            });
        }
        Ok(portgroups)
    }

    /// Hosts of every compute resource in the datacenter.
    pub async fn hosts(&self, datacenter: &Datacenter) -> VsphereResult<Vec<ManagedObjectReference>> {
        self.list(&datacenter.host_folder, ObjectKind::HostSystem).await
    }

    /// Hosts visible to the endpoint, across all datacenters.
    pub async fn all_hosts(&self) -> VsphereResult<Vec<ManagedObjectReference>> {
        let content = self.api.service_content().await?;
        self.list(&content.root_folder, ObjectKind::HostSystem).await
    }

    pub async fn host_config(&self, host: &ManagedObjectReference) -> VsphereResult<HostConfigInfo> {
        let config: Option<HostConfigInfo> = property(self.api.as_ref(), host, "config").await?;
        Ok(config.unwrap_or_default())
    }

    pub async fn find_host_by_name(
        &self,
        datacenter: &Datacenter,
        name: &str,
    ) -> VsphereResult<Option<ManagedObjectReference>> {
        for host in self.hosts(datacenter).await? {
            let host_name: String = property(self.api.as_ref(), &host, "name").await?;
            if host_name == name {
                return Ok(Some(host));
            }
        }
        Ok(None)
    }

    /// Depth-first search of the datacenter's VM folder.
    pub async fn find_vm_by_name(
        &self,
        datacenter: &Datacenter,
        name: &str,
    ) -> VsphereResult<Option<ManagedObjectReference>> {
        for vm in self
            .list(&datacenter.vm_folder, ObjectKind::VirtualMachine)
            .await?
        {
            let vm_name: String = property(self.api.as_ref(), &vm, "name").await?;
            if vm_name == name {
                return Ok(Some(vm));
            }
        }
        Ok(None)
    }
}
