//! Donor, patient, facility and donation operations.
//!
//! These share the request workflow's shape: validate, call the backend,
//! refresh what changed.

use tracing::instrument;

use crate::{
    api::Backend,
    domain::{
        BloodBankForm, BloodBankId, DonationForm, DonorId, HospitalForm, HospitalId, PatientId,
        people::{DonorEdit, DonorForm, PatientEdit, PatientForm},
    },
    lifecycle::{LifecycleError, RequestLifecycle},
    storage::Resource,
};

impl<B: Backend> RequestLifecycle<B> {
    /// Registers a donor.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Invalid`], without any network call, if a
    /// field fails validation. Returns [`LifecycleError::Api`] if the backend
    /// refuses or cannot be reached.
    #[instrument(skip_all)]
    pub async fn add_donor(&self, form: &DonorForm) -> Result<Option<DonorId>, LifecycleError> {
        let donor = form.validate()?;
        let id = self.repository.backend().create_donor(&donor).await?;
        tracing::info!(?id, "donor added");
        self.repository
            .refresh(&[Resource::Donors, Resource::Statistics])
            .await;
        Ok(id)
    }

    /// Updates a donor's details.
    ///
    /// # Errors
    ///
    /// As for [`RequestLifecycle::add_donor`].
    #[instrument(skip(self, edit))]
    pub async fn edit_donor(&self, id: DonorId, edit: &DonorEdit) -> Result<(), LifecycleError> {
        let patch = edit.validate()?;
        self.repository.backend().update_donor(id, &patch).await?;
        tracing::info!("donor updated");
        self.repository.refresh(&[Resource::Donors]).await;
        Ok(())
    }

    /// Registers a patient.
    ///
    /// # Errors
    ///
    /// As for [`RequestLifecycle::add_donor`].
    #[instrument(skip_all)]
    pub async fn add_patient(
        &self,
        form: &PatientForm,
    ) -> Result<Option<PatientId>, LifecycleError> {
        let patient = form.validate()?;
        let id = self.repository.backend().create_patient(&patient).await?;
        tracing::info!(?id, "patient added");
        self.repository.refresh(&[Resource::Patients]).await;
        Ok(id)
    }

    /// Updates a patient's details.
    ///
    /// The cached row is patched straight away, then reconciled with the
    /// backend's copy: rolled back if the update is refused, and replaced by
    /// the refetched row either way.
    ///
    /// # Errors
    ///
    /// As for [`RequestLifecycle::add_donor`].
    #[instrument(skip(self, edit))]
    pub async fn edit_patient(
        &self,
        id: PatientId,
        edit: &PatientEdit,
    ) -> Result<(), LifecycleError> {
        let patch = edit.validate()?;
        let token = self.repository.apply_optimistic(id, &patch).await;
        let result = self.repository.backend().update_patient(id, &patch).await;
        self.repository.reconcile(token, result.is_ok()).await;
        result?;
        tracing::info!("patient updated");
        Ok(())
    }

    /// Registers a hospital.
    ///
    /// # Errors
    ///
    /// As for [`RequestLifecycle::add_donor`].
    #[instrument(skip_all)]
    pub async fn add_hospital(
        &self,
        form: &HospitalForm,
    ) -> Result<Option<HospitalId>, LifecycleError> {
        let hospital = form.validate()?;
        let id = self.repository.backend().create_hospital(&hospital).await?;
        tracing::info!(?id, "hospital added");
        self.repository.refresh(&[Resource::Hospitals]).await;
        Ok(id)
    }

    /// Registers a blood bank. The capacity must be at least 100 units.
    ///
    /// # Errors
    ///
    /// As for [`RequestLifecycle::add_donor`].
    #[instrument(skip_all)]
    pub async fn add_blood_bank(
        &self,
        form: &BloodBankForm,
    ) -> Result<Option<BloodBankId>, LifecycleError> {
        let bank = form.validate()?;
        let id = self.repository.backend().create_blood_bank(&bank).await?;
        tracing::info!(?id, capacity = bank.capacity, "blood bank added");
        self.repository
            .refresh(&[Resource::BloodBanks, Resource::Statistics])
            .await;
        Ok(id)
    }

    /// Records a donation, which creates new blood units.
    ///
    /// # Errors
    ///
    /// As for [`RequestLifecycle::add_donor`].
    #[instrument(skip_all)]
    pub async fn record_donation(&self, form: &DonationForm) -> Result<(), LifecycleError> {
        let donation = form.validate()?;
        self.repository.backend().record_donation(&donation).await?;
        tracing::info!(quantity = donation.quantity, "donation recorded");
        self.repository.refresh(&Resource::AFTER_DONATION).await;
        Ok(())
    }
}
