use crate::core::domain::{error::ValidationError, model::vm_config::HardwareVersions};
use std::time::Duration;

/// API release used in request paths when none is configured.
pub const DEFAULT_API_RELEASE: &str = "8.0.1.0";

/// Client-side request throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Tunables of a client. The defaults match an interactive operator
/// driving one invocation at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Release segment of `/sdk/vim25/{release}/`.
    pub api_release: String,
    pub rate_limit: Option<RateLimitConfig>,
    /// Delay between two reads of a pending task.
    pub task_poll_interval: Duration,
    /// Upper bound on waiting for a task. `None` waits until the task ends.
    pub task_timeout: Option<Duration>,
    pub hardware_versions: HardwareVersions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_release: DEFAULT_API_RELEASE.to_string(),
            rate_limit: None,
            task_poll_interval: Duration::from_secs(1),
            task_timeout: None,
            hardware_versions: HardwareVersions::default(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_release.trim_matches('/').is_empty() {
            return Err(ValidationError::Field {
                field: "api_release".to_string(),
                message: "API release cannot be empty".to_string(),
            });
        }
        if let Some(rate_limit) = &self.rate_limit {
            if rate_limit.requests_per_second == 0 || rate_limit.burst_size == 0 {
                return Err(ValidationError::Field {
                    field: "rate_limit".to_string(),
                    message: "Rate and burst must be greater than zero".to_string(),
                });
            }
        }
        if self.task_poll_interval.is_zero() {
            return Err(ValidationError::Field {
                field: "task_poll_interval".to_string(),
                message: "Poll interval must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
