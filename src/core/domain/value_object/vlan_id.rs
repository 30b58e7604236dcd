use crate::core::domain::error::ValidationError;
use std::fmt;

/// An 802.1Q VLAN identifier.
///
/// `4095` is reserved by vSphere to mean "all VLANs" and is used here as the
/// trunk sentinel: asking for it binds to whichever trunk port group exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VlanId(u16);

impl VlanId {
    /// The trunk sentinel.
    pub const TRUNK: VlanId = VlanId(4095);

    /// Creates a validated VLAN id.
    pub fn new(vlan: u16) -> Result<Self, ValidationError> {
        validate_vlan(vlan)?;
        Ok(Self(vlan))
    }

    /// Returns the numeric id.
    #[must_use]
    pub fn get(&self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn is_trunk(&self) -> bool {
        *self == Self::TRUNK
    }
}

impl TryFrom<u16> for VlanId {
    type Error = ValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validates a VLAN id (0..=4095).
pub(crate) fn validate_vlan(vlan: u16) -> Result<(), ValidationError> {
    if vlan > 4095 {
        return Err(ValidationError::ConstraintViolation(format!(
            "VLAN id must be between 0 and 4095 (got {})",
            vlan
        )));
    }
    Ok(())
}
