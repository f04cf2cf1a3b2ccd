//! The REST backend boundary.
//!
//! [`Backend`] is the seam between the workflow and the network: the
//! workflow only ever talks to a `Backend`, and [`HttpBackend`] is the
//! implementation that speaks JSON over HTTP. Every response is wrapped in a
//! `{success, data, detail, message}` envelope whose decoding rules live in
//! one place.

use async_trait::async_trait;

mod envelope;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod http;

pub use error::ApiError;
pub use http::HttpBackend;

use crate::domain::{
    Allocation, AllocationId, BloodBank, BloodBankId, BloodUnit, DashboardStats, Donor, DonorId,
    Hospital, HospitalId, InventoryLine, NewAllocation, NewBloodBank, NewDonation, NewHospital,
    NewRequest, Patient, PatientId, Request, RequestId, RequestPatch, RequestStatus,
    people::{DonorPatch, NewDonor, NewPatient, PatientPatch},
};

/// The operations the blood bank backend exposes.
///
/// Create operations return the backend-assigned identifier when the
/// response includes one.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /requests`
    async fn list_requests(&self) -> Result<Vec<Request>, ApiError>;

    /// `POST /requests`
    async fn create_request(&self, request: &NewRequest) -> Result<Option<RequestId>, ApiError>;

    /// `PUT /requests/{id}`
    async fn edit_request(&self, id: RequestId, patch: &RequestPatch) -> Result<(), ApiError>;

    /// `DELETE /requests/{id}`
    ///
    /// The backend soft-deletes by marking the request `Denied`.
    async fn delete_request(&self, id: RequestId) -> Result<(), ApiError>;

    /// `PUT /requests/{id}/status`
    async fn set_request_status(
        &self,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<(), ApiError>;

    /// `GET /bloodunits`
    async fn list_units(&self) -> Result<Vec<BloodUnit>, ApiError>;

    /// `POST /allocations`
    ///
    /// On success the backend has reserved the unit and recorded the
    /// allocation.
    async fn create_allocation(
        &self,
        allocation: &NewAllocation,
    ) -> Result<Option<AllocationId>, ApiError>;

    /// `GET /allocations`
    async fn list_allocations(&self) -> Result<Vec<Allocation>, ApiError>;

    /// `GET /inventory`
    async fn inventory(&self) -> Result<Vec<InventoryLine>, ApiError>;

    /// `GET /statistics/dashboard`
    async fn dashboard(&self) -> Result<DashboardStats, ApiError>;

    /// `GET /donors`
    async fn list_donors(&self) -> Result<Vec<Donor>, ApiError>;

    /// `POST /donors`
    async fn create_donor(&self, donor: &NewDonor) -> Result<Option<DonorId>, ApiError>;

    /// `PUT /donors/{id}`
    async fn update_donor(&self, id: DonorId, patch: &DonorPatch) -> Result<(), ApiError>;

    /// `GET /patients`
    async fn list_patients(&self) -> Result<Vec<Patient>, ApiError>;

    /// `POST /patients`
    async fn create_patient(&self, patient: &NewPatient) -> Result<Option<PatientId>, ApiError>;

    /// `PUT /patients/{id}`
    async fn update_patient(&self, id: PatientId, patch: &PatientPatch) -> Result<(), ApiError>;

    /// `GET /hospitals`
    async fn list_hospitals(&self) -> Result<Vec<Hospital>, ApiError>;

    /// `POST /hospitals`
    async fn create_hospital(&self, hospital: &NewHospital) -> Result<Option<HospitalId>, ApiError>;

    /// `GET /bloodbanks`
    async fn list_blood_banks(&self) -> Result<Vec<BloodBank>, ApiError>;

    /// `POST /bloodbanks`
    async fn create_blood_bank(&self, bank: &NewBloodBank) -> Result<Option<BloodBankId>, ApiError>;

    /// `POST /donations`
    async fn record_donation(&self, donation: &NewDonation) -> Result<(), ApiError>;
}
