use crate::core::domain::{model::vcsa_install::ApplianceSettings, value_object::VlanId};

/// Input for rendering an appliance deployment template against a
/// standalone host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsaInstallParams {
    pub appliance: ApplianceSettings,
    /// VLAN of the standard network the appliance is attached to.
    pub vlan: VlanId,
    /// Datastore name; the one with the most free space when unset.
    pub datastore: Option<String>,
    /// Datacenter name; the first one when unset.
    pub datacenter: Option<String>,
}
