use crate::core::domain::{error::ProfileError, model::device::ScsiControllerType};

/// OS used when the caller does not name one.
pub const DEFAULT_OS: &str = "debian";

/// Guest OS identifier and SCSI controller family for a logical OS name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsProfile {
    pub name: &'static str,
    pub guest_id: &'static str,
    pub scsi: ScsiControllerType,
}

const PROFILES: &[OsProfile] = &[
    OsProfile {
        name: "debian",
        guest_id: "debian10_64Guest",
        scsi: ScsiControllerType::Paravirtual,
    },
    OsProfile {
        name: "ubuntu",
        guest_id: "ubuntu64Guest",
        scsi: ScsiControllerType::Paravirtual,
    },
    OsProfile {
        name: "openbsd",
        guest_id: "otherGuest64",
        scsi: ScsiControllerType::LsiSas,
    },
    OsProfile {
        name: "coreos",
        guest_id: "otherGuest64",
        scsi: ScsiControllerType::Paravirtual,
    },
];

impl OsProfile {
    pub fn lookup(os: &str) -> Result<&'static OsProfile, ProfileError> {
        PROFILES
            .iter()
            .find(|profile| profile.name == os)
            .ok_or_else(|| ProfileError::OsNotSupported(os.to_string()))
    }

    #[must_use]
    pub fn all() -> &'static [OsProfile] {
        PROFILES
    }
}
