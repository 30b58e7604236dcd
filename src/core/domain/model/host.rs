//! Host configuration as read from `HostSystem.config`, and the spec used to
//! enroll a host into a central manager.

use crate::core::domain::{
    error::ValidationError,
    value_object::{SslThumbprint, VspherePassword, serde_helpers, validate_password},
};
use serde::{Deserialize, Serialize};

/// The parts of `HostConfigInfo` the provisioning flows need.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfigInfo {
    /// PEM encoded TLS certificate.
    #[serde(default, with = "serde_helpers::byte_array")]
    pub certificate: Vec<u8>,
    #[serde(default)]
    pub network: Option<HostNetworkInfo>,
}

impl HostConfigInfo {
    /// `hostName.domainName` from the DNS configuration.
    #[must_use]
    pub fn fqdn(&self) -> Option<String> {
        let dns = self.network.as_ref()?.dns_config.as_ref()?;
        if dns.domain_name.is_empty() {
            return Some(dns.host_name.clone());
        }
        Some(format!("{}.{}", dns.host_name, dns.domain_name))
    }

    /// Address of the first VMkernel adapter.
    #[must_use]
    pub fn management_ip(&self) -> Option<&str> {
        self.network
            .as_ref()?
            .vnic
            .first()?
            .spec
            .ip
            .as_ref()?
            .ip_address
            .as_deref()
    }

    /// Standard switch port groups, in configuration order.
    #[must_use]
    pub fn port_groups(&self) -> &[HostPortGroup] {
        self.network
            .as_ref()
            .map(|n| n.portgroup.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostNetworkInfo {
    #[serde(default)]
    pub portgroup: Vec<HostPortGroup>,
    #[serde(default)]
    pub vnic: Vec<HostVirtualNic>,
    #[serde(default)]
    pub dns_config: Option<HostDnsConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HostPortGroup {
    pub spec: HostPortGroupSpec,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostPortGroupSpec {
    pub name: String,
    pub vlan_id: i32,
    #[serde(default)]
    pub vswitch_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HostVirtualNic {
    #[serde(default)]
    pub device: String,
    pub spec: HostVirtualNicSpec,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HostVirtualNicSpec {
    #[serde(default)]
    pub ip: Option<HostIpConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostIpConfig {
    #[serde(default)]
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDnsConfig {
    pub host_name: String,
    #[serde(default)]
    pub domain_name: String,
}

/// Everything a central manager needs to take over a host.
#[derive(Debug, Clone)]
pub struct HostEnrollment {
    pub fqdn: String,
    pub username: String,
    pub password: VspherePassword,
    pub thumbprint: SslThumbprint,
}

impl HostEnrollment {
    pub fn new(
        fqdn: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        thumbprint: SslThumbprint,
    ) -> Result<Self, ValidationError> {
        let password = password.into();
        validate_password(&password)?;
        Ok(Self {
            fqdn: fqdn.into(),
            username: username.into(),
            password: VspherePassword::new_unchecked(password),
            thumbprint,
        })
    }

    /// The `HostConnectSpec` sent with `AddHost_Task`. Always forced, so a
    /// host still managed by another vCenter is taken over.
    #[must_use]
    pub fn connect_spec(&self) -> HostConnectSpec {
        HostConnectSpec {
            force: true,
            host_name: self.fqdn.clone(),
            user_name: self.username.clone(),
            password: self.password.as_str().to_string(),
            ssl_thumbprint: self.thumbprint.as_str().to_string(),
        }
    }
}

#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConnectSpec {
    pub force: bool,
    pub host_name: String,
    pub user_name: String,
    pub password: String,
    pub ssl_thumbprint: String,
}
