use crate::{
    core::domain::{
        error::{LookupError, ValidationError, VsphereResult},
        model::HostEnrollment,
        value_object::SslThumbprint,
    },
    provision::application::service::topology_service::TopologyService,
};
use tracing::info;

/// How a host identifies itself to a central manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub fqdn: String,
    pub management_ip: String,
    pub thumbprint: SslThumbprint,
}

impl HostIdentity {
    /// Pairs the identity with the host's root credentials.
    pub fn enrollment(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<HostEnrollment, ValidationError> {
        HostEnrollment::new(
            self.fqdn.clone(),
            username,
            password,
            self.thumbprint.clone(),
        )
    }
}

/// Reads the identity of the first host visible to the connection. Meant for
/// a connection made directly to a standalone host.
#[derive(Debug, Clone)]
pub struct HostIdentityService {
    topology: TopologyService,
}

impl HostIdentityService {
    pub fn new(topology: TopologyService) -> Self {
        Self { topology }
    }

    pub async fn identify(&self) -> VsphereResult<HostIdentity> {
        let host = self
            .topology
            .all_hosts()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::HostNotFound("(no host on this endpoint)".to_string()))?;
        let config = self.topology.host_config(&host).await?;

        let incomplete = |missing| LookupError::HostIdentityIncomplete {
            host: host.to_string(),
            missing,
        };
        let fqdn = config.fqdn().ok_or_else(|| incomplete("DNS configuration"))?;
        let management_ip = config
            .management_ip()
            .ok_or_else(|| incomplete("VMkernel address"))?
            .to_string();
        let thumbprint = SslThumbprint::from_pem(&config.certificate)?;

        info!(%fqdn, %management_ip, %thumbprint, "identified host");
        Ok(HostIdentity {
            fqdn,
            management_ip,
            thumbprint,
        })
    }
}
