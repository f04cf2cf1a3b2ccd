//! Domain models for the blood request workflow.
//!
//! This module contains the request state machine, the entity types the
//! backend returns, shared field validation, and configuration.

mod allocation;
pub use allocation::{Allocation, NewAllocation};

mod blood_unit;
pub use blood_unit::{BloodUnit, DonationForm, NewDonation, UnitStatus};

mod config;
pub use config::{API_URL_ENV, CONFIG_DIR, Config, DEFAULT_API_URL};

mod facility;
pub use facility::{
    BloodBank, BloodBankForm, DEFAULT_BANK_CAPACITY, Hospital, HospitalForm, NewBloodBank,
    NewHospital,
};

mod ids;
pub use ids::{AllocationId, BloodBankId, DonorId, HospitalId, PatientId, RequestId, UnitId};

pub mod people;
pub use people::{Donor, Patient};

mod request;
pub use request::{ActionRefused, NewRequest, Request, RequestPatch, RequiredUnits};

pub mod selection;

pub mod stats;
pub use stats::{DashboardStats, InventoryLine};

pub mod status;
pub use status::{Action, ManualStatus, RequestStatus, TransitionError, Trigger};

pub mod validation;
pub use validation::ValidationError;
