use crate::core::domain::error::ValidationError;

/// Default HTTPS port of both vCenter and ESXi.
pub const DEFAULT_PORT: u16 = 443;

/// A validated API port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VspherePort(u16);

impl VspherePort {
    /// Creates a new port without validation.
    pub(crate) fn new_unchecked(port: u16) -> Self {
        Self(port)
    }

    /// Returns the port number.
    #[must_use]
    pub fn get(&self) -> u16 {
        self.0
    }
}

impl Default for VspherePort {
    fn default() -> Self {
        Self(DEFAULT_PORT)
    }
}

/// Validates a port number.
pub(crate) fn validate_port(port: u16) -> Result<(), ValidationError> {
    if port == 0 {
        return Err(ValidationError::Field {
            field: "port".to_string(),
            message: "Port cannot be 0".to_string(),
        });
    }
    Ok(())
}
