use crate::{
    core::domain::{
        error::VsphereResult,
        model::vcsa_install::{ApplianceTarget, VcsaInstallConfig},
    },
    provision::application::{
        request::vcsa_install_request::VcsaInstallParams,
        service::{
            datastore_selector::DatastoreSelector, host_identity_service::HostIdentityService,
            network_backing_resolver::NetworkBackingResolver, topology_service::TopologyService,
        },
    },
};
use tracing::info;

/// Renders the deployment template for installing a vCenter appliance onto
/// the standalone host the connection points at.
#[derive(Debug, Clone)]
pub struct VcsaInstallService {
    topology: TopologyService,
    identity: HostIdentityService,
    resolver: NetworkBackingResolver,
}

impl VcsaInstallService {
    pub fn new(topology: TopologyService) -> Self {
        Self {
            identity: HostIdentityService::new(topology.clone()),
            resolver: NetworkBackingResolver::new(topology.clone()),
            topology,
        }
    }

    /// `username` and `password` are the host credentials the installer
    /// logs in with.
    pub async fn install_config(
        &self,
        params: &VcsaInstallParams,
        username: &str,
        password: &str,
    ) -> VsphereResult<VcsaInstallConfig> {
        let identity = self.identity.identify().await?;
        let datacenter = self.topology.find_datacenter(params.datacenter.as_deref()).await?;
        let network = self.resolver.standard_network(params.vlan, &datacenter).await?;

        let cluster = self.topology.first_active_cluster(&datacenter).await?;
        let target = self.topology.query_config_target(&cluster).await?;
        let datastore = DatastoreSelector.select(&target, params.datastore.as_deref())?;

        info!(
            host = %identity.management_ip,
            %network,
            datastore = %datastore.name,
            appliance = %params.appliance.name,
            "rendering appliance deployment template"
        );
        Ok(VcsaInstallConfig::new(
            ApplianceTarget {
                host_ip: identity.management_ip,
                username: username.to_string(),
                password: password.to_string(),
                network,
                datastore: datastore.name,
            },
            params.appliance.clone(),
        ))
    }
}
