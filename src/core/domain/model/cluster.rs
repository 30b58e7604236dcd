//! Cluster creation specs.

use serde::Serialize;

/// DRS automation level applied to VMs that do not override it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DrsBehavior {
    Manual,
    PartiallyAutomated,
    #[default]
    FullyAutomated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "_typeName")]
pub struct ClusterDrsConfigInfo {
    pub enabled: bool,
    pub default_vm_behavior: DrsBehavior,
}

/// The spec sent with `Folder.CreateClusterEx`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "_typeName")]
pub struct ClusterConfigSpecEx {
    pub drs_config: ClusterDrsConfigInfo,
}

impl ClusterConfigSpecEx {
    /// DRS enabled with the given default behavior.
    #[must_use]
    pub fn with_drs(behavior: DrsBehavior) -> Self {
        Self {
            drs_config: ClusterDrsConfigInfo {
                enabled: true,
                default_vm_behavior: behavior,
            },
        }
    }
}

impl Default for ClusterConfigSpecEx {
    fn default() -> Self {
        Self::with_drs(DrsBehavior::default())
    }
}
