use std::future::Future;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::instrument;

use crate::{
    api::{ApiError, Backend},
    domain::{Patient, PatientId, people::PatientPatch},
    storage::{
        Resource,
        cache::{Cache, Collection, Optimistic},
    },
};

/// A collection that could not be refreshed.
///
/// The collection keeps its previous rows and stays stale.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("failed to refresh {resource}: {error}")]
pub struct RefreshError {
    /// The collection that failed.
    pub resource: Resource,
    /// Why the fetch failed.
    #[source]
    pub error: ApiError,
}

/// A backend paired with the client-side cache of its collections.
///
/// The cache is only ever written with the results of fetches from the
/// backend, and with optimistic patches that a later fetch overwrites.
#[derive(Debug)]
pub struct Repository<B> {
    backend: B,
    cache: RwLock<Cache>,
}

impl<B: Backend> Repository<B> {
    /// Wraps a backend with an empty, fully stale cache.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: RwLock::new(Cache::default()),
        }
    }

    /// The underlying backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Read access to the cache.
    pub async fn cache(&self) -> RwLockReadGuard<'_, Cache> {
        self.cache.read().await
    }

    pub(crate) async fn cache_mut(&self) -> RwLockWriteGuard<'_, Cache> {
        self.cache.write().await
    }

    /// Patches the cached patient row ahead of the backend's answer.
    ///
    /// The returned token must be passed to [`Repository::reconcile`] once
    /// the backend has answered. Returns `None` if the patient is not cached.
    pub async fn apply_optimistic(
        &self,
        id: PatientId,
        patch: &PatientPatch,
    ) -> Option<Optimistic<Patient>> {
        self.cache.write().await.patch_patient(id, patch)
    }

    /// Completes an optimistic patient update.
    ///
    /// A patch the backend refused is rolled back. Either way the patients
    /// are refetched, and the fetched rows replace whatever the patch left.
    pub async fn reconcile(
        &self,
        token: Option<Optimistic<Patient>>,
        accepted: bool,
    ) -> Vec<RefreshError> {
        if let Some(token) = token.filter(|_| !accepted) {
            self.cache.write().await.rollback_patient(token);
        }
        self.refresh(&[Resource::Patients]).await
    }

    /// Refetches every collection.
    pub async fn refresh_all(&self) -> Vec<RefreshError> {
        self.refresh(&Resource::ALL).await
    }

    /// Refetches the named collections concurrently.
    ///
    /// Each collection that fetches successfully is replaced. A failed fetch
    /// is logged and reported, and leaves that collection's previous rows in
    /// place, marked stale.
    #[instrument(skip(self))]
    pub async fn refresh(&self, resources: &[Resource]) -> Vec<RefreshError> {
        let wants = |resource| resources.contains(&resource);
        let backend = &self.backend;

        let (
            requests,
            units,
            allocations,
            inventory,
            statistics,
            donors,
            patients,
            hospitals,
            blood_banks,
        ) = tokio::join!(
            fetch(wants(Resource::Requests), backend.list_requests()),
            fetch(wants(Resource::Units), backend.list_units()),
            fetch(wants(Resource::Allocations), backend.list_allocations()),
            fetch(wants(Resource::Inventory), backend.inventory()),
            fetch(wants(Resource::Statistics), backend.dashboard()),
            fetch(wants(Resource::Donors), backend.list_donors()),
            fetch(wants(Resource::Patients), backend.list_patients()),
            fetch(wants(Resource::Hospitals), backend.list_hospitals()),
            fetch(wants(Resource::BloodBanks), backend.list_blood_banks()),
        );

        let mut failures = Vec::new();
        let mut cache = self.cache.write().await;
        store(&mut cache.requests, Resource::Requests, requests, &mut failures);
        store(&mut cache.units, Resource::Units, units, &mut failures);
        store(
            &mut cache.allocations,
            Resource::Allocations,
            allocations,
            &mut failures,
        );
        store(
            &mut cache.inventory,
            Resource::Inventory,
            inventory,
            &mut failures,
        );
        store(
            &mut cache.statistics,
            Resource::Statistics,
            statistics.map(|result| result.map(|stats| vec![stats])),
            &mut failures,
        );
        store(&mut cache.donors, Resource::Donors, donors, &mut failures);
        store(&mut cache.patients, Resource::Patients, patients, &mut failures);
        store(
            &mut cache.hospitals,
            Resource::Hospitals,
            hospitals,
            &mut failures,
        );
        store(
            &mut cache.blood_banks,
            Resource::BloodBanks,
            blood_banks,
            &mut failures,
        );
        failures
    }
}

async fn fetch<T>(
    wanted: bool,
    call: impl Future<Output = Result<T, ApiError>>,
) -> Option<Result<T, ApiError>> {
    if wanted { Some(call.await) } else { None }
}

fn store<T>(
    collection: &mut Collection<T>,
    resource: Resource,
    fetched: Option<Result<Vec<T>, ApiError>>,
    failures: &mut Vec<RefreshError>,
) {
    match fetched {
        None => {}
        Some(Ok(items)) => {
            tracing::debug!(%resource, rows = items.len(), "refreshed");
            collection.replace(items);
        }
        Some(Err(error)) => {
            tracing::warn!(%resource, %error, "refresh failed, keeping stale rows");
            collection.invalidate();
            failures.push(RefreshError { resource, error });
        }
    }
}
