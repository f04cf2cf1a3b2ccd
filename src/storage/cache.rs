use chrono::{DateTime, Utc};

use crate::{
    domain::{
        Allocation, BloodBank, BloodUnit, DashboardStats, Donor, Hospital, InventoryLine, Patient,
        PatientId, Request, RequestId, RequestPatch, UnitId, people::PatientPatch,
    },
    storage::Resource,
};

/// The client-side copy of one backend collection.
///
/// Starts empty and stale. Only [`Collection::replace`] clears the stale
/// flag, and it is only ever called with the result of a fetch, so a
/// collection that is not stale holds exactly what the backend last
/// returned plus any optimistic patches applied since.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    stale: bool,
    generation: u64,
    fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            stale: true,
            generation: 0,
            fetched_at: None,
        }
    }
}

impl<T> Collection<T> {
    /// The cached rows.
    #[must_use]
    pub fn list(&self) -> &[T] {
        &self.items
    }

    /// Whether the rows may no longer match the backend.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// When the rows were last fetched, if ever.
    #[must_use]
    pub const fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Marks the rows as needing a refetch.
    pub const fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Replaces the rows with a fresh backend result.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.stale = false;
        self.generation += 1;
        self.fetched_at = Some(Utc::now());
    }

    fn find_mut(&mut self, predicate: impl Fn(&T) -> bool) -> Option<&mut T> {
        self.items.iter_mut().find(|item| predicate(item))
    }
}

/// The local half of a two-phase update.
///
/// Holds the row as it was before an optimistic patch, so the patch can be
/// rolled back if the backend refuses it. A rollback is skipped once the
/// collection has been refetched, since the backend's copy then wins.
#[derive(Debug, Clone)]
#[must_use]
pub struct Optimistic<T> {
    previous: T,
    generation: u64,
}

/// Client-side copies of every collection the workflow reads.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    pub(crate) requests: Collection<Request>,
    pub(crate) units: Collection<BloodUnit>,
    pub(crate) allocations: Collection<Allocation>,
    pub(crate) inventory: Collection<InventoryLine>,
    pub(crate) statistics: Collection<DashboardStats>,
    pub(crate) donors: Collection<Donor>,
    pub(crate) patients: Collection<Patient>,
    pub(crate) hospitals: Collection<Hospital>,
    pub(crate) blood_banks: Collection<BloodBank>,
}

impl Cache {
    /// The cached blood requests.
    #[must_use]
    pub const fn requests(&self) -> &Collection<Request> {
        &self.requests
    }

    /// A cached request by id.
    #[must_use]
    pub fn request(&self, id: RequestId) -> Option<&Request> {
        self.requests.list().iter().find(|request| request.id() == id)
    }

    /// The cached blood units.
    #[must_use]
    pub const fn units(&self) -> &Collection<BloodUnit> {
        &self.units
    }

    /// A cached unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&BloodUnit> {
        self.units.list().iter().find(|unit| unit.id == id)
    }

    /// The cached allocations.
    #[must_use]
    pub const fn allocations(&self) -> &Collection<Allocation> {
        &self.allocations
    }

    /// The cached inventory summary.
    #[must_use]
    pub const fn inventory(&self) -> &Collection<InventoryLine> {
        &self.inventory
    }

    /// The cached dashboard figures, if they have been fetched.
    #[must_use]
    pub fn statistics(&self) -> Option<&DashboardStats> {
        self.statistics.list().first()
    }

    /// The cached donors.
    #[must_use]
    pub const fn donors(&self) -> &Collection<Donor> {
        &self.donors
    }

    /// The cached patients.
    #[must_use]
    pub const fn patients(&self) -> &Collection<Patient> {
        &self.patients
    }

    /// A cached patient by id.
    #[must_use]
    pub fn patient(&self, id: PatientId) -> Option<&Patient> {
        self.patients.list().iter().find(|patient| patient.id == id)
    }

    /// The cached hospitals.
    #[must_use]
    pub const fn hospitals(&self) -> &Collection<Hospital> {
        &self.hospitals
    }

    /// The cached blood banks.
    #[must_use]
    pub const fn blood_banks(&self) -> &Collection<BloodBank> {
        &self.blood_banks
    }

    /// Whether a collection needs a refetch.
    #[must_use]
    pub const fn is_stale(&self, resource: Resource) -> bool {
        match resource {
            Resource::Requests => self.requests.is_stale(),
            Resource::Units => self.units.is_stale(),
            Resource::Allocations => self.allocations.is_stale(),
            Resource::Inventory => self.inventory.is_stale(),
            Resource::Statistics => self.statistics.is_stale(),
            Resource::Donors => self.donors.is_stale(),
            Resource::Patients => self.patients.is_stale(),
            Resource::Hospitals => self.hospitals.is_stale(),
            Resource::BloodBanks => self.blood_banks.is_stale(),
        }
    }

    /// Marks a collection as needing a refetch.
    pub const fn invalidate(&mut self, resource: Resource) {
        match resource {
            Resource::Requests => self.requests.invalidate(),
            Resource::Units => self.units.invalidate(),
            Resource::Allocations => self.allocations.invalidate(),
            Resource::Inventory => self.inventory.invalidate(),
            Resource::Statistics => self.statistics.invalidate(),
            Resource::Donors => self.donors.invalidate(),
            Resource::Patients => self.patients.invalidate(),
            Resource::Hospitals => self.hospitals.invalidate(),
            Resource::BloodBanks => self.blood_banks.invalidate(),
        }
    }

    /// Optimistically applies a request edit to the cached row.
    ///
    /// The collection is marked stale until the authoritative copy is
    /// refetched. Returns `None` if the request is not cached.
    pub fn patch_request(
        &mut self,
        id: RequestId,
        patch: &RequestPatch,
    ) -> Option<Optimistic<Request>> {
        let generation = self.requests.generation;
        let row = self.requests.find_mut(|request| request.id() == id)?;
        let previous = row.clone();
        row.apply_patch(patch);
        self.requests.invalidate();
        Some(Optimistic {
            previous,
            generation,
        })
    }

    /// Restores a request row patched by [`Cache::patch_request`].
    pub fn rollback_request(&mut self, token: Optimistic<Request>) {
        if self.requests.generation != token.generation {
            return;
        }
        let id = token.previous.id();
        if let Some(row) = self.requests.find_mut(|request| request.id() == id) {
            *row = token.previous;
        }
    }

    /// Optimistically applies a patient edit to the cached row.
    ///
    /// The collection is marked stale until the authoritative copy is
    /// refetched. Returns `None` if the patient is not cached.
    pub fn patch_patient(
        &mut self,
        id: PatientId,
        patch: &PatientPatch,
    ) -> Option<Optimistic<Patient>> {
        let generation = self.patients.generation;
        let row = self.patients.find_mut(|patient| patient.id == id)?;
        let previous = row.clone();
        row.apply_patch(patch);
        self.patients.invalidate();
        Some(Optimistic {
            previous,
            generation,
        })
    }

    /// Restores a patient row patched by [`Cache::patch_patient`].
    pub fn rollback_patient(&mut self, token: Optimistic<Patient>) {
        if self.patients.generation != token.generation {
            return;
        }
        let id = token.previous.id;
        if let Some(row) = self.patients.find_mut(|patient| patient.id == id) {
            *row = token.previous;
        }
    }
}
