use crate::core::domain::error::ValidationError;
use crate::core::domain::value_object::{VsphereHost, VspherePort};
use std::net::Ipv6Addr;

const MAX_URL_LENGTH: usize = 2083;
const API_ROOT: &str = "/sdk/vim25";

/// The validated base URL of the VI/JSON endpoint,
/// e.g. `https://vc.example.com:443/sdk/vim25/8.0.1.0/`.
///
/// Always ends with a slash so that object paths can be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VsphereUrl(String);

impl VsphereUrl {
    /// Creates a new URL without validation.
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    /// Composes the endpoint URL from connection parts and validates it.
    pub(crate) fn from_parts(
        host: &VsphereHost,
        port: &VspherePort,
        secure: bool,
        release: &str,
    ) -> Result<Self, ValidationError> {
        let scheme = if secure { "https" } else { "http" };
        let host = match host.as_str().parse::<Ipv6Addr>() {
            Ok(_) => format!("[{}]", host.as_str()),
            Err(_) => host.as_str().to_string(),
        };
        let url = format!(
            "{}://{}:{}{}/{}/",
            scheme,
            host,
            port.get(),
            API_ROOT,
            release.trim_matches('/')
        );
        validate_url(&url)?;
        Ok(Self(url))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends a relative object path (`Folder/group-d1/childEntity`).
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Validates scheme, length and API root of an endpoint URL.
pub(crate) fn validate_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Field {
            field: "url".to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }
    if value.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }
    let parsed = url::Url::parse(value)
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::ConstraintViolation(
            "Invalid scheme. Must be one of: http, https".to_string(),
        ));
    }
    if !parsed.path().starts_with(API_ROOT) {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid API path. Must start with {}",
            API_ROOT
        )));
    }
    Ok(())
}
