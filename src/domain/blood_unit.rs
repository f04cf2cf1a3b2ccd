use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    BloodBankId, DonorId, UnitId,
    validation::{self, ValidationError},
};

/// A discrete, trackable quantity of a blood component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodUnit {
    /// Backend-assigned identifier.
    #[serde(rename = "UnitID")]
    pub id: UnitId,
    /// ABO/Rh group, e.g. `O+`.
    #[serde(rename = "BloodGroup")]
    pub blood_group: String,
    /// Component, e.g. `Whole Blood` or `Plasma`.
    #[serde(rename = "Component")]
    pub component: String,
    /// Availability status.
    #[serde(rename = "Status")]
    pub status: UnitStatus,
    /// The blood bank holding the unit.
    #[serde(rename = "BloodBankID", default, skip_serializing_if = "Option::is_none")]
    pub blood_bank_id: Option<BloodBankId>,
    /// When the unit expires.
    #[serde(rename = "ExpirationDate", default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
}

impl BloodUnit {
    /// Whether the unit may be offered for allocation.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self.status, UnitStatus::Available)
    }
}

/// The availability of a blood unit.
///
/// The backend owns the full set of statuses (`Reserved`, `Used`, `Expired`
/// and so on). Only `Available` matters here, so everything else is kept
/// verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UnitStatus {
    /// The unit can be allocated.
    Available,
    /// Any other backend status.
    Other(String),
}

impl From<String> for UnitStatus {
    fn from(status: String) -> Self {
        if status == "Available" {
            Self::Available
        } else {
            Self::Other(status)
        }
    }
}

impl From<UnitStatus> for String {
    fn from(status: UnitStatus) -> Self {
        match status {
            UnitStatus::Available => "Available".to_string(),
            UnitStatus::Other(other) => other,
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => f.write_str("Available"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// Raw input from the "record donation" form.
#[derive(Debug, Clone)]
pub struct DonationForm {
    /// The donating donor.
    pub donor_id: i64,
    /// The bank receiving the donation.
    pub blood_bank_id: i64,
    /// The component collected.
    pub component: String,
    /// How many units were collected.
    pub quantity: i64,
}

impl DonationForm {
    /// Validates the form into a `POST /donations` body.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<NewDonation, ValidationError> {
        Ok(NewDonation {
            donor_id: validation::positive_id("donor_id", self.donor_id)?.into(),
            blood_bank_id: validation::positive_id("blood_bank_id", self.blood_bank_id)?.into(),
            component: validation::component(&self.component)?,
            quantity: validation::positive_quantity("quantity", self.quantity)?.get(),
        })
    }
}

/// The body of `POST /donations`. A recorded donation produces new blood
/// units on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDonation {
    /// The donating donor.
    pub donor_id: DonorId,
    /// The bank receiving the donation.
    pub blood_bank_id: BloodBankId,
    /// The component collected.
    pub component: String,
    /// How many units were collected.
    pub quantity: u32,
}
