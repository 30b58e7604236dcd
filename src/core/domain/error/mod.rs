use std::time::Duration;
use thiserror::Error;

/// The main error type for vSphere provisioning operations.
///
/// Every failure is terminal for the invocation that produced it. Nothing is
/// retried and nothing already applied on the server is rolled back.
#[derive(Error, Debug)]
pub enum VsphereError {
    /// Represents errors that occur while talking to the endpoint
    ///
    /// # Fields
    /// * `0` - A description of what went wrong on the wire
    #[error("Connection error: {0}")]
    Connection(String),

    /// Represents authentication failures
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The server answered with a non-success status (usually a SOAP fault
    /// rendered as JSON)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Represents validation failures with detailed context
    ///
    /// # Fields
    /// * `source` - The underlying validation error
    #[error("Validation error: {source}")]
    Validation { source: ValidationError },

    /// A requested inventory element does not exist or does not qualify
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// An input did not match a known hardware profile
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// A remote task reached the error state
    #[error("Remote operation failed: {0}")]
    Operation(#[from] OperationError),

    /// A task was still pending when the caller-supplied deadline expired
    #[error("Task {task} did not reach a terminal state within {timeout:?}")]
    TaskTimeout { task: String, timeout: Duration },
}

impl From<ValidationError> for VsphereError {
    fn from(error: ValidationError) -> Self {
        VsphereError::Validation { source: error }
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Topology lookups that came back empty.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("Found no datacenter named \"{0}\"")]
    DatacenterNotFound(String),

    #[error("{0}")]
    NoHostsInCluster(String),

    #[error("Datacenter {0} has no hosts")]
    NoHostsInDatacenter(String),

    #[error("Datastore {0} does not appear to exist")]
    DatastoreNotFound(String),

    #[error("VLAN {0} not found in any networks")]
    UnknownVlan(u16),

    #[error("{0}")]
    SwitchPortNotFound(String),

    #[error("No NIC found on {0}")]
    NicNotFound(String),

    #[error("Host {0} not found")]
    HostNotFound(String),

    /// The host exists but does not report enough to identify it.
    #[error("Host {host} has no {missing}")]
    HostIdentityIncomplete { host: String, missing: &'static str },
}

/// Inputs that do not map onto a supported hardware configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("OS {0} not supported")]
    OsNotSupported(String),

    #[error("SCSI controller type {0} is not supported")]
    ScsiControllerNotFound(String),
}

/// Remote operations that finished in the error state. The message is the
/// one reported by the server, unmodified.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("Creating VM failed: {0}")]
    CreateVm(String),

    #[error("Provisioning VM failed: {0}")]
    ProvisionVm(String),

    #[error("Creating cluster failed: {0}")]
    CreateCluster(String),

    #[error("Adding host to vSphere failed: {0}")]
    AddHostToVsphere(String),

    #[error("Distributed switch operation failed: {0}")]
    CreateDvSwitch(String),

    #[error("Creating distributed port group failed: {0}")]
    CreateDvPortgroup(String),
}

impl OperationError {
    /// Returns the message reported by the server.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            OperationError::CreateVm(m)
            | OperationError::ProvisionVm(m)
            | OperationError::CreateCluster(m)
            | OperationError::AddHostToVsphere(m)
            | OperationError::CreateDvSwitch(m)
            | OperationError::CreateDvPortgroup(m) => m,
        }
    }
}

/// Type alias for Results that may fail with a VsphereError
pub type VsphereResult<T> = Result<T, VsphereError>;
