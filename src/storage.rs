//! Client-side caching of backend collections.
//!
//! Every collection is a cache of the backend's copy. Rows are replaced
//! wholesale by refetches after each mutation, never merged by hand.

use std::fmt;

mod cache;
pub use cache::{Cache, Collection, Optimistic};

mod repository;
pub use repository::{RefreshError, Repository};

/// A backend collection the cache holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    /// Blood requests.
    Requests,
    /// Blood units.
    Units,
    /// Unit-to-request allocations.
    Allocations,
    /// The per-bank stock summary.
    Inventory,
    /// Dashboard figures.
    Statistics,
    /// Donors.
    Donors,
    /// Patients.
    Patients,
    /// Hospitals.
    Hospitals,
    /// Blood banks.
    BloodBanks,
}

impl Resource {
    /// Every collection.
    pub const ALL: [Self; 9] = [
        Self::Requests,
        Self::Units,
        Self::Allocations,
        Self::Inventory,
        Self::Statistics,
        Self::Donors,
        Self::Patients,
        Self::Hospitals,
        Self::BloodBanks,
    ];

    /// What an allocation attempt can change, whatever its outcome.
    pub const AFTER_ALLOCATION: [Self; 5] = [
        Self::Requests,
        Self::Units,
        Self::Allocations,
        Self::Inventory,
        Self::Statistics,
    ];

    /// What a request edit, delete or status change can change.
    pub const AFTER_REQUEST_CHANGE: [Self; 2] = [Self::Requests, Self::Statistics];

    /// What a recorded donation can change.
    pub const AFTER_DONATION: [Self; 4] = [
        Self::Units,
        Self::Inventory,
        Self::Statistics,
        Self::Donors,
    ];
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Requests => "requests",
            Self::Units => "blood units",
            Self::Allocations => "allocations",
            Self::Inventory => "inventory",
            Self::Statistics => "statistics",
            Self::Donors => "donors",
            Self::Patients => "patients",
            Self::Hospitals => "hospitals",
            Self::BloodBanks => "blood banks",
        })
    }
}
