//! Typed identifiers for backend entities.
//!
//! Every entity is keyed by a positive integer assigned by the backend. The
//! newtypes keep a request ID from being passed where a unit ID is expected.

use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw backend identifier.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw backend identifier.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

id_type!(
    /// Identifier of a blood request.
    RequestId
);
id_type!(
    /// Identifier of a blood unit.
    UnitId
);
id_type!(
    /// Identifier of an allocation record.
    AllocationId
);
id_type!(
    /// Identifier of a patient.
    PatientId
);
id_type!(
    /// Identifier of a blood bank.
    BloodBankId
);
id_type!(
    /// Identifier of a donor.
    DonorId
);
id_type!(
    /// Identifier of a hospital.
    HospitalId
);
