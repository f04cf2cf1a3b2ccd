//! Hospitals and blood banks, with their registration forms.

use serde::{Deserialize, Serialize};

use crate::domain::{
    BloodBankId, HospitalId,
    validation::{self, ValidationError},
};

const NAME_MAX: usize = 100;
const LOCATION_MAX: usize = 100;

/// Capacity offered when a blood bank is registered without one.
pub const DEFAULT_BANK_CAPACITY: i64 = 1000;

/// A hospital treating patients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hospital {
    /// Backend-assigned identifier.
    #[serde(rename = "HospitalID")]
    pub id: HospitalId,
    /// Display name.
    #[serde(rename = "HospitalName")]
    pub name: String,
    /// Where it is.
    #[serde(rename = "Location", default)]
    pub location: String,
    /// Contact phone number.
    #[serde(rename = "ContactNo", default)]
    pub contact: String,
    /// Email address.
    #[serde(rename = "Email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A blood bank holding units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodBank {
    /// Backend-assigned identifier.
    #[serde(rename = "BloodBankID")]
    pub id: BloodBankId,
    /// Display name.
    #[serde(rename = "BloodBankName")]
    pub name: String,
    /// Where it is.
    #[serde(rename = "Location", default)]
    pub location: String,
    /// Contact phone number.
    #[serde(rename = "ContactNo", default)]
    pub contact: String,
    /// Storage capacity in units.
    #[serde(rename = "Capacity", default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

/// Raw input from the "add hospital" form.
#[derive(Debug, Clone, Default)]
pub struct HospitalForm {
    /// Display name.
    pub name: String,
    /// Where it is.
    pub location: String,
    /// Contact phone number.
    pub contact: String,
    /// Optional email address.
    pub email: Option<String>,
}

impl HospitalForm {
    /// Validates the form into a `POST /hospitals` body.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<NewHospital, ValidationError> {
        Ok(NewHospital {
            name: validation::required_text("name", &self.name, NAME_MAX)?,
            location: validation::required_text("location", &self.location, LOCATION_MAX)?,
            contact: validation::phone(&self.contact)?,
            email: validation::optional_email(self.email.as_deref())?,
        })
    }
}

/// The body of `POST /hospitals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewHospital {
    /// Display name.
    pub name: String,
    /// Where it is.
    pub location: String,
    /// Contact phone number.
    pub contact: String,
    /// Email address.
    pub email: Option<String>,
}

/// Raw input from the "add blood bank" form.
#[derive(Debug, Clone)]
pub struct BloodBankForm {
    /// Display name.
    pub name: String,
    /// Where it is.
    pub location: String,
    /// Contact phone number.
    pub contact: String,
    /// Storage capacity in units.
    pub capacity: i64,
}

impl Default for BloodBankForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            location: String::new(),
            contact: String::new(),
            capacity: DEFAULT_BANK_CAPACITY,
        }
    }
}

impl BloodBankForm {
    /// Validates the form into a `POST /bloodbanks` body.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<NewBloodBank, ValidationError> {
        Ok(NewBloodBank {
            name: validation::required_text("name", &self.name, NAME_MAX)?,
            location: validation::required_text("location", &self.location, LOCATION_MAX)?,
            contact: validation::phone(&self.contact)?,
            capacity: validation::capacity(self.capacity)?,
        })
    }
}

/// The body of `POST /bloodbanks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBloodBank {
    /// Display name.
    pub name: String,
    /// Where it is.
    pub location: String,
    /// Contact phone number.
    pub contact: String,
    /// Storage capacity in units.
    pub capacity: u32,
}
