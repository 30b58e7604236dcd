//! Resolves a VLAN to the network a NIC should be attached to.

use crate::{
    core::domain::{
        error::{LookupError, VsphereResult},
        model::{Datacenter, DistributedSwitch, NetworkBacking},
        value_object::VlanId,
    },
    provision::application::service::topology_service::TopologyService,
};
use tracing::{debug, info, warn};

/// Maps a VLAN onto a distributed port group when the datacenter runs an
/// initialized distributed switch, and onto a standard switch network name
/// otherwise.
///
/// Once an initialized distributed switch is present, a VLAN it does not
/// carry is an error; standard networks are not consulted. When several
/// port groups carry the VLAN the first one wins, switches first, then
/// port groups, in listing order.
#[derive(Debug, Clone)]
pub struct NetworkBackingResolver {
    topology: TopologyService,
}

impl NetworkBackingResolver {
    pub fn new(topology: TopologyService) -> Self {
        Self { topology }
    }

    pub async fn resolve(&self, vlan: VlanId, datacenter: &Datacenter) -> VsphereResult<NetworkBacking> {
        let switches: Vec<DistributedSwitch> = self
            .topology
            .distributed_switches(datacenter)
            .await?
            .into_iter()
            .filter(|switch| {
                if !switch.is_initialized() {
                    warn!(switch = %switch.name, "skipping distributed switch without ports");
                }
                switch.is_initialized()
            })
            .collect();

        if switches.is_empty() {
            let device_name = self.standard_network(vlan, datacenter).await?;
            return Ok(NetworkBacking::Standard { device_name });
        }
        self.resolve_distributed(vlan, &switches).await
    }

    async fn resolve_distributed(
        &self,
        vlan: VlanId,
        switches: &[DistributedSwitch],
    ) -> VsphereResult<NetworkBacking> {
        for switch in switches {
            for portgroup in self.topology.port_groups(switch).await? {
                if portgroup.is_uplink() {
                    debug!(portgroup = %portgroup.name, "ignoring uplink port group");
                    continue;
                }
                if portgroup.vlan.carries(vlan) {
                    info!(
                        %vlan,
                        portgroup = %portgroup.name,
                        switch = %switch.name,
                        "using distributed port group"
                    );
                    return Ok(NetworkBacking::Distributed {
                        switch_uuid: switch.uuid.clone(),
                        portgroup_key: portgroup.key,
                    });
                }
            }
        }
        Err(LookupError::SwitchPortNotFound(format!(
            "Uses dvSwitch, but could not find a port with VLAN {vlan}"
        ))
        .into())
    }

    /// The standard network carrying `vlan`, read from the port groups of
    /// the first host. The same VLAN on two standard switches resolves to
    /// whichever port group is listed first.
    pub async fn standard_network(&self, vlan: VlanId, datacenter: &Datacenter) -> VsphereResult<String> {
        let host = self
            .topology
            .hosts(datacenter)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NoHostsInDatacenter(datacenter.name.clone()))?;

        let config = self.topology.host_config(&host).await?;
        let network = config
            .port_groups()
            .iter()
            .find(|portgroup| portgroup.spec.vlan_id == i32::from(vlan.get()))
            .map(|portgroup| portgroup.spec.name.clone())
            .ok_or(LookupError::UnknownVlan(vlan.get()))?;

        info!(%vlan, %network, %host, "using standard network");
        Ok(network)
    }
}
