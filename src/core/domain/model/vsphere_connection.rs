use crate::core::domain::value_object::{
    VsphereHost, VspherePassword, VspherePort, VsphereUrl, VsphereUsername,
};

/// Validated connection parameters of one endpoint.
#[derive(Debug, Clone)]
pub struct VsphereConnection {
    host: VsphereHost,
    port: VspherePort,
    username: VsphereUsername,
    password: VspherePassword,
    secure: bool,
    accept_invalid_certs: bool,
    url: VsphereUrl,
}

impl VsphereConnection {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host: VsphereHost,
        port: VspherePort,
        username: VsphereUsername,
        password: VspherePassword,
        secure: bool,
        accept_invalid_certs: bool,
        url: VsphereUrl,
    ) -> Self {
        Self {
            host,
            port,
            username,
            password,
            secure,
            accept_invalid_certs,
            url,
        }
    }

    pub fn host(&self) -> &VsphereHost {
        &self.host
    }

    pub fn port(&self) -> &VspherePort {
        &self.port
    }

    pub fn username(&self) -> &VsphereUsername {
        &self.username
    }

    pub fn password(&self) -> &VspherePassword {
        &self.password
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    /// Base URL of the VI/JSON API, ending with a slash.
    pub fn url(&self) -> &VsphereUrl {
        &self.url
    }
}
