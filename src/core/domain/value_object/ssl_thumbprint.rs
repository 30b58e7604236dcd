use crate::core::domain::error::ValidationError;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha1::{Digest, Sha1};
use std::fmt;

/// The SHA-1 fingerprint of a host's TLS certificate, formatted the way
/// vCenter expects it in `HostConnectSpec.sslThumbprint`
/// (`AB:CD:...`, upper case).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SslThumbprint(String);

impl SslThumbprint {
    /// Computes the thumbprint of a PEM encoded certificate.
    pub fn from_pem(pem: &[u8]) -> Result<Self, ValidationError> {
        let text = std::str::from_utf8(pem)
            .map_err(|e| ValidationError::Format(format!("Certificate is not UTF-8: {}", e)))?;
        let body: String = text
            .lines()
            .filter(|line| !line.starts_with("--"))
            .map(str::trim)
            .collect();
        if body.is_empty() {
            return Err(ValidationError::Field {
                field: "certificate".to_string(),
                message: "Certificate is empty".to_string(),
            });
        }
        let der = STANDARD
            .decode(body)
            .map_err(|e| ValidationError::Format(format!("Invalid certificate body: {}", e)))?;
        Ok(Self::from_der(&der))
    }

    /// Computes the thumbprint of a DER encoded certificate.
    #[must_use]
    pub fn from_der(der: &[u8]) -> Self {
        let digest = Sha1::digest(der);
        let hex: Vec<String> = digest.iter().map(|b| format!("{:02X}", b)).collect();
        Self(hex.join(":"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SslThumbprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
