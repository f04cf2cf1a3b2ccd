use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{
    api::{ApiError, Backend, envelope},
    domain::{
        Allocation, AllocationId, BloodBank, BloodBankId, BloodUnit, Config, DashboardStats, Donor,
        DonorId, Hospital, HospitalId, InventoryLine, NewAllocation, NewBloodBank, NewDonation,
        NewHospital, NewRequest, Patient, PatientId, Request, RequestId, RequestPatch,
        RequestStatus,
        people::{DonorPatch, NewDonor, NewPatient, PatientPatch},
    },
};

/// A [`Backend`] speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: String,
}

impl HttpBackend {
    /// Builds a client for the backend named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be
    /// initialised.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base: config.api_url().to_string(),
        })
    }

    /// The base URL endpoint paths are appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<envelope::Envelope<T>, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!(url = %response.url(), %status, "backend responded");
        let body = response.bytes().await?;
        envelope::interpret(status.as_u16(), &body)
    }

    async fn get<T: DeserializeOwned + Default>(&self, path: &str) -> Result<T, ApiError> {
        let envelope = self.send(self.client.get(self.url(path))).await?;
        Ok(envelope.into_data().unwrap_or_default())
    }

    async fn post(
        &self,
        path: &str,
        body: &impl Serialize,
        id_key: &str,
    ) -> Result<Option<u64>, ApiError> {
        let envelope = self
            .send::<Value>(self.client.post(self.url(path)).json(body))
            .await?;
        Ok(envelope.id(id_key))
    }

    async fn put(&self, path: &str, body: &impl Serialize) -> Result<(), ApiError> {
        self.send::<Value>(self.client.put(self.url(path)).json(body))
            .await
            .map(drop)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_requests(&self) -> Result<Vec<Request>, ApiError> {
        self.get("/requests").await
    }

    async fn create_request(&self, request: &NewRequest) -> Result<Option<RequestId>, ApiError> {
        let id = self.post("/requests", request, "request_id").await?;
        Ok(id.map(RequestId::from))
    }

    async fn edit_request(&self, id: RequestId, patch: &RequestPatch) -> Result<(), ApiError> {
        self.put(&format!("/requests/{id}"), patch).await
    }

    async fn delete_request(&self, id: RequestId) -> Result<(), ApiError> {
        self.send::<Value>(self.client.delete(self.url(&format!("/requests/{id}"))))
            .await
            .map(drop)
    }

    async fn set_request_status(
        &self,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<(), ApiError> {
        self.put(
            &format!("/requests/{id}/status"),
            &json!({ "status": status }),
        )
        .await
    }

    async fn list_units(&self) -> Result<Vec<BloodUnit>, ApiError> {
        self.get("/bloodunits").await
    }

    async fn create_allocation(
        &self,
        allocation: &NewAllocation,
    ) -> Result<Option<AllocationId>, ApiError> {
        let id = self
            .post("/allocations", allocation, "allocation_id")
            .await?;
        Ok(id.map(AllocationId::from))
    }

    async fn list_allocations(&self) -> Result<Vec<Allocation>, ApiError> {
        self.get("/allocations").await
    }

    async fn inventory(&self) -> Result<Vec<InventoryLine>, ApiError> {
        self.get("/inventory").await
    }

    async fn dashboard(&self) -> Result<DashboardStats, ApiError> {
        self.get("/statistics/dashboard").await
    }

    async fn list_donors(&self) -> Result<Vec<Donor>, ApiError> {
        self.get("/donors").await
    }

    async fn create_donor(&self, donor: &NewDonor) -> Result<Option<DonorId>, ApiError> {
        let id = self.post("/donors", donor, "donor_id").await?;
        Ok(id.map(DonorId::from))
    }

    async fn update_donor(&self, id: DonorId, patch: &DonorPatch) -> Result<(), ApiError> {
        self.put(&format!("/donors/{id}"), patch).await
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, ApiError> {
        self.get("/patients").await
    }

    async fn create_patient(&self, patient: &NewPatient) -> Result<Option<PatientId>, ApiError> {
        let id = self.post("/patients", patient, "patient_id").await?;
        Ok(id.map(PatientId::from))
    }

    async fn update_patient(&self, id: PatientId, patch: &PatientPatch) -> Result<(), ApiError> {
        self.put(&format!("/patients/{id}"), patch).await
    }

    async fn list_hospitals(&self) -> Result<Vec<Hospital>, ApiError> {
        self.get("/hospitals").await
    }

    async fn create_hospital(&self, hospital: &NewHospital) -> Result<Option<HospitalId>, ApiError> {
        let id = self.post("/hospitals", hospital, "hospital_id").await?;
        Ok(id.map(HospitalId::from))
    }

    async fn list_blood_banks(&self) -> Result<Vec<BloodBank>, ApiError> {
        self.get("/bloodbanks").await
    }

    async fn create_blood_bank(&self, bank: &NewBloodBank) -> Result<Option<BloodBankId>, ApiError> {
        let id = self.post("/bloodbanks", bank, "blood_bank_id").await?;
        Ok(id.map(BloodBankId::from))
    }

    async fn record_donation(&self, donation: &NewDonation) -> Result<(), ApiError> {
        self.post("/donations", donation, "donation_id")
            .await
            .map(drop)
    }
}
