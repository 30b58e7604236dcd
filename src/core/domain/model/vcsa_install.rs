//! Deployment template consumed by the vCenter Server Appliance CLI
//! installer when deploying onto a standalone host.

use serde::Serialize;

const TEMPLATE_VERSION: &str = "2.3.0";
const SITE_NAME: &str = "Dreamhack-vSphere";
const DNS_SERVERS: [&str; 2] = ["8.8.8.8", "8.8.4.4"];

/// Where the appliance is deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplianceTarget {
    /// Management address of the standalone host.
    pub host_ip: String,
    pub username: String,
    pub password: String,
    /// Standard network name the appliance is attached to.
    pub network: String,
    /// Datastore name, without brackets.
    pub datastore: String,
}

/// Identity and addressing of the appliance itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplianceSettings {
    /// System name, also used as the VM name.
    pub name: String,
    pub ip: String,
    pub prefix: String,
    pub gateway: String,
    /// Root and SSO administrator password.
    pub password: String,
    pub sso_domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VcsaInstallConfig {
    #[serde(rename = "__version")]
    version: &'static str,
    #[serde(rename = "__comments")]
    comments: String,
    #[serde(rename = "new.vcsa")]
    new_vcsa: NewVcsa,
    ceip: Ceip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct NewVcsa {
    esxi: EsxiSection,
    appliance: ApplianceSection,
    network: NetworkSection,
    os: OsSection,
    sso: SsoSection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct EsxiSection {
    hostname: String,
    username: String,
    password: String,
    #[serde(rename = "deployment.network")]
    deployment_network: String,
    datastore: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ApplianceSection {
    #[serde(rename = "thin.disk.mode")]
    thin_disk_mode: bool,
    #[serde(rename = "deployment.option")]
    deployment_option: &'static str,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct NetworkSection {
    #[serde(rename = "ip.family")]
    ip_family: &'static str,
    mode: &'static str,
    ip: String,
    #[serde(rename = "dns.servers")]
    dns_servers: [&'static str; 2],
    prefix: String,
    gateway: String,
    #[serde(rename = "system.name")]
    system_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct OsSection {
    password: String,
    #[serde(rename = "ssh.enable")]
    ssh_enable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct SsoSection {
    password: String,
    #[serde(rename = "domain-name")]
    domain_name: String,
    #[serde(rename = "site-name")]
    site_name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Ceip {
    settings: CeipSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct CeipSettings {
    #[serde(rename = "ceip.enabled")]
    enabled: bool,
}

impl VcsaInstallConfig {
    #[must_use]
    pub fn new(target: ApplianceTarget, appliance: ApplianceSettings) -> Self {
        Self {
            version: TEMPLATE_VERSION,
            comments: appliance.name.clone(),
            new_vcsa: NewVcsa {
                esxi: EsxiSection {
                    hostname: target.host_ip,
                    username: target.username,
                    password: target.password,
                    deployment_network: target.network,
                    datastore: target.datastore,
                },
                appliance: ApplianceSection {
                    thin_disk_mode: true,
                    deployment_option: "tiny",
                    name: appliance.name.clone(),
                },
                network: NetworkSection {
                    ip_family: "ipv4",
                    mode: "static",
                    ip: appliance.ip,
                    dns_servers: DNS_SERVERS,
                    prefix: appliance.prefix,
                    gateway: appliance.gateway,
                    system_name: appliance.name,
                },
                os: OsSection {
                    password: appliance.password.clone(),
                    ssh_enable: true,
                },
                sso: SsoSection {
                    password: appliance.password,
                    domain_name: appliance.sso_domain,
                    site_name: SITE_NAME,
                },
            },
            ceip: Ceip {
                settings: CeipSettings { enabled: false },
            },
        }
    }

    /// Pretty-printed JSON, as the installer expects it on disk.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
