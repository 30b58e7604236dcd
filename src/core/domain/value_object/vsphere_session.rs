use crate::core::domain::error::ValidationError;
use std::time::SystemTime;

/// Name of the header carrying the session token, both ways.
pub const SESSION_HEADER: &str = "vmware-api-session-id";

/// A session token returned by `SessionManager.Login`.
#[derive(Debug, Clone)]
pub struct VsphereSessionId {
    value: String,
    created_at: SystemTime,
}

impl VsphereSessionId {
    /// Creates a new session id without validation.
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self {
            value,
            created_at: SystemTime::now(),
        }
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the time the session was established.
    #[must_use]
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
}

/// Validates the format of a session token.
pub(crate) fn validate_session_id(session: &str) -> Result<(), ValidationError> {
    if session.is_empty() {
        return Err(ValidationError::Field {
            field: "session".to_string(),
            message: "Session id cannot be empty".to_string(),
        });
    }
    if session.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::Format(
            "Session id cannot contain whitespace".to_string(),
        ));
    }
    Ok(())
}
