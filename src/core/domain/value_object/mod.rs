pub mod serde_helpers;
mod ssl_thumbprint;
mod vlan_id;
mod vsphere_host;
mod vsphere_password;
mod vsphere_port;
mod vsphere_session;
mod vsphere_url;
mod vsphere_username;

pub use ssl_thumbprint::SslThumbprint;
pub use vlan_id::VlanId;
pub use vsphere_host::VsphereHost;
pub use vsphere_password::VspherePassword;
pub use vsphere_port::{DEFAULT_PORT, VspherePort};
pub use vsphere_session::{SESSION_HEADER, VsphereSessionId};
pub use vsphere_url::VsphereUrl;
pub use vsphere_username::VsphereUsername;

// Re-export validation functions for internal use
pub(crate) use vsphere_host::validate_host;
pub(crate) use vsphere_password::validate_password;
pub(crate) use vsphere_port::validate_port;
pub(crate) use vsphere_session::validate_session_id;
pub(crate) use vsphere_username::validate_username;
