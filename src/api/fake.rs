//! An in-memory [`Backend`] for tests.
//!
//! Records every call so tests can assert on exactly which requests went
//! out, and can be scripted to reject or fail specific operations.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::Notify;

use crate::{
    api::{ApiError, Backend},
    domain::{
        Allocation, AllocationId, BloodBank, BloodBankId, BloodUnit, DashboardStats, Donor,
        DonorId, Hospital, HospitalId, InventoryLine, NewAllocation, NewBloodBank, NewDonation,
        NewHospital, NewRequest, Patient, PatientId, Request, RequestId, RequestPatch,
        RequestStatus, UnitStatus,
        people::{DonorPatch, NewDonor, NewPatient, PatientPatch},
    },
};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ListRequests,
    CreateRequest(NewRequest),
    EditRequest(RequestId, RequestPatch),
    DeleteRequest(RequestId),
    SetStatus(RequestId, RequestStatus),
    ListUnits,
    CreateAllocation(NewAllocation),
    ListAllocations,
    Inventory,
    Dashboard,
    ListDonors,
    CreateDonor,
    UpdateDonor(DonorId),
    ListPatients,
    CreatePatient,
    UpdatePatient(PatientId),
    ListHospitals,
    CreateHospital(NewHospital),
    ListBloodBanks,
    CreateBloodBank(NewBloodBank),
    RecordDonation,
}

impl Call {
    pub(crate) const fn is_read(&self) -> bool {
        matches!(
            self,
            Self::ListRequests
                | Self::ListUnits
                | Self::ListAllocations
                | Self::Inventory
                | Self::Dashboard
                | Self::ListDonors
                | Self::ListPatients
                | Self::ListHospitals
                | Self::ListBloodBanks
        )
    }
}

/// How the fake answers `POST /allocations`.
#[derive(Debug, Clone, Default)]
pub(crate) enum AllocationReply {
    #[default]
    Succeed,
    Fail(ApiError),
}

#[derive(Debug, Default)]
struct State {
    requests: Vec<Request>,
    units: Vec<BloodUnit>,
    allocations: Vec<Allocation>,
    patients: Vec<Patient>,
    donors: Vec<Donor>,
    hospitals: Vec<Hospital>,
    blood_banks: Vec<BloodBank>,
    calls: Vec<Call>,
    allocation_reply: AllocationReply,
    status_failure: Option<ApiError>,
    update_failure: Option<ApiError>,
    lists_fail: bool,
    next_id: u64,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        100 + self.next_id
    }

    fn list<T: Clone>(&self, rows: &[T]) -> Result<Vec<T>, ApiError> {
        if self.lists_fail {
            Err(unreachable_backend())
        } else {
            Ok(rows.to_vec())
        }
    }
}

pub(crate) fn unreachable_backend() -> ApiError {
    ApiError::Transport("connection refused".to_string())
}

#[derive(Debug, Default)]
pub(crate) struct FakeBackend {
    state: Mutex<State>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn with_requests(self, requests: impl IntoIterator<Item = Request>) -> Self {
        self.state().requests.extend(requests);
        self
    }

    pub(crate) fn with_units(self, units: impl IntoIterator<Item = BloodUnit>) -> Self {
        self.state().units.extend(units);
        self
    }

    pub(crate) fn with_patients(self, patients: impl IntoIterator<Item = Patient>) -> Self {
        self.state().patients.extend(patients);
        self
    }

    pub(crate) fn reply_to_allocations(&self, reply: AllocationReply) {
        self.state().allocation_reply = reply;
    }

    pub(crate) fn fail_status_updates(&self, error: ApiError) {
        self.state().status_failure = Some(error);
    }

    pub(crate) fn fail_updates(&self, error: ApiError) {
        self.state().update_failure = Some(error);
    }

    pub(crate) fn fail_lists(&self, fail: bool) {
        self.state().lists_fail = fail;
    }

    /// Makes allocation calls wait until the returned handle is notified.
    pub(crate) fn hold_allocations(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&notify));
        notify
    }

    /// Edits a row behind the client's back, as another user would.
    pub(crate) fn set_status(&self, id: RequestId, status: RequestStatus) {
        if let Some(request) = self.state().requests.iter_mut().find(|r| r.id() == id) {
            request.status = status;
        }
    }

    pub(crate) fn rename_patient(&self, id: PatientId, name: &str) {
        if let Some(patient) = self.state().patients.iter_mut().find(|p| p.id == id) {
            patient.name = name.to_string();
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Calls other than list fetches.
    pub(crate) fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|call| !call.is_read()).collect()
    }

    pub(crate) fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub(crate) fn request(&self, id: RequestId) -> Option<Request> {
        self.state().requests.iter().find(|r| r.id() == id).cloned()
    }

    pub(crate) fn allocations(&self) -> Vec<Allocation> {
        self.state().allocations.clone()
    }

    fn record(&self, call: Call) -> MutexGuard<'_, State> {
        let mut state = self.state();
        state.calls.push(call);
        state
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_requests(&self) -> Result<Vec<Request>, ApiError> {
        let state = self.record(Call::ListRequests);
        state.list(&state.requests)
    }

    async fn create_request(&self, request: &NewRequest) -> Result<Option<RequestId>, ApiError> {
        let mut state = self.record(Call::CreateRequest(*request));
        let id = RequestId::new(state.next_id());
        state
            .requests
            .push(Request::new(id, request, NaiveDateTime::default()));
        Ok(Some(id))
    }

    async fn edit_request(&self, id: RequestId, patch: &RequestPatch) -> Result<(), ApiError> {
        let mut state = self.record(Call::EditRequest(id, *patch));
        if let Some(error) = state.update_failure.clone() {
            return Err(error);
        }
        if let Some(request) = state.requests.iter_mut().find(|r| r.id() == id) {
            request.apply_patch(patch);
        }
        Ok(())
    }

    async fn delete_request(&self, id: RequestId) -> Result<(), ApiError> {
        let mut state = self.record(Call::DeleteRequest(id));
        if let Some(request) = state.requests.iter_mut().find(|r| r.id() == id) {
            request.status = RequestStatus::Denied;
        }
        Ok(())
    }

    async fn set_request_status(
        &self,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<(), ApiError> {
        let mut state = self.record(Call::SetStatus(id, status));
        if let Some(error) = state.status_failure.clone() {
            return Err(error);
        }
        if let Some(request) = state.requests.iter_mut().find(|r| r.id() == id) {
            request.status = status;
        }
        Ok(())
    }

    async fn list_units(&self) -> Result<Vec<BloodUnit>, ApiError> {
        let state = self.record(Call::ListUnits);
        state.list(&state.units)
    }

    async fn create_allocation(
        &self,
        allocation: &NewAllocation,
    ) -> Result<Option<AllocationId>, ApiError> {
        self.record(Call::CreateAllocation(*allocation));

        let gate = self
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state();
        if let AllocationReply::Fail(error) = &state.allocation_reply {
            return Err(error.clone());
        }
        let id = AllocationId::new(state.next_id());
        if let Some(unit) = state
            .units
            .iter_mut()
            .find(|unit| unit.id == allocation.unit_id)
        {
            unit.status = UnitStatus::Other("Reserved".to_string());
        }
        state.allocations.push(Allocation {
            id,
            request_id: allocation.request_id,
            unit_id: allocation.unit_id,
            allocation_date: NaiveDateTime::default(),
            patient_name: None,
            blood_group: None,
            component: None,
            blood_bank_name: None,
        });
        Ok(Some(id))
    }

    async fn list_allocations(&self) -> Result<Vec<Allocation>, ApiError> {
        let state = self.record(Call::ListAllocations);
        state.list(&state.allocations)
    }

    async fn inventory(&self) -> Result<Vec<InventoryLine>, ApiError> {
        let state = self.record(Call::Inventory);
        state.list(&[])
    }

    async fn dashboard(&self) -> Result<DashboardStats, ApiError> {
        let state = self.record(Call::Dashboard);
        if state.lists_fail {
            return Err(unreachable_backend());
        }
        Ok(DashboardStats::default())
    }

    async fn list_donors(&self) -> Result<Vec<Donor>, ApiError> {
        let state = self.record(Call::ListDonors);
        state.list(&state.donors)
    }

    async fn create_donor(&self, _donor: &NewDonor) -> Result<Option<DonorId>, ApiError> {
        let mut state = self.record(Call::CreateDonor);
        Ok(Some(DonorId::new(state.next_id())))
    }

    async fn update_donor(&self, id: DonorId, _patch: &DonorPatch) -> Result<(), ApiError> {
        let state = self.record(Call::UpdateDonor(id));
        state.update_failure.clone().map_or(Ok(()), Err)
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, ApiError> {
        let state = self.record(Call::ListPatients);
        state.list(&state.patients)
    }

    async fn create_patient(&self, _patient: &NewPatient) -> Result<Option<PatientId>, ApiError> {
        let mut state = self.record(Call::CreatePatient);
        Ok(Some(PatientId::new(state.next_id())))
    }

    async fn update_patient(&self, id: PatientId, patch: &PatientPatch) -> Result<(), ApiError> {
        let mut state = self.record(Call::UpdatePatient(id));
        if let Some(error) = state.update_failure.clone() {
            return Err(error);
        }
        if let Some(patient) = state.patients.iter_mut().find(|p| p.id == id) {
            patient.apply_patch(patch);
        }
        Ok(())
    }

    async fn list_hospitals(&self) -> Result<Vec<Hospital>, ApiError> {
        let state = self.record(Call::ListHospitals);
        state.list(&state.hospitals)
    }

    async fn create_hospital(&self, hospital: &NewHospital) -> Result<Option<HospitalId>, ApiError> {
        let mut state = self.record(Call::CreateHospital(hospital.clone()));
        let id = HospitalId::new(state.next_id());
        state.hospitals.push(Hospital {
            id,
            name: hospital.name.clone(),
            location: hospital.location.clone(),
            contact: hospital.contact.clone(),
            email: hospital.email.clone(),
        });
        Ok(Some(id))
    }

    async fn list_blood_banks(&self) -> Result<Vec<BloodBank>, ApiError> {
        let state = self.record(Call::ListBloodBanks);
        state.list(&state.blood_banks)
    }

    async fn create_blood_bank(&self, bank: &NewBloodBank) -> Result<Option<BloodBankId>, ApiError> {
        let mut state = self.record(Call::CreateBloodBank(bank.clone()));
        let id = BloodBankId::new(state.next_id());
        state.blood_banks.push(BloodBank {
            id,
            name: bank.name.clone(),
            location: bank.location.clone(),
            contact: bank.contact.clone(),
            capacity: Some(bank.capacity),
        });
        Ok(Some(id))
    }

    async fn record_donation(&self, _donation: &NewDonation) -> Result<(), ApiError> {
        self.record(Call::RecordDonation);
        Ok(())
    }
}
