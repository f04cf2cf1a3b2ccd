//! Donors and patients.
//!
//! Both have an "add" form and an "edit" form. The forms hold raw input and
//! validate into request bodies using the shared rules in
//! [`crate::domain::validation`], so adding and editing can never disagree.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    DonorId, HospitalId, PatientId,
    validation::{self, ValidationError},
};

const NAME_MAX: usize = 100;
const ADDRESS_MAX: usize = 255;

/// A registered blood donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
    /// Backend-assigned identifier.
    #[serde(rename = "DonorID")]
    pub id: DonorId,
    /// Full name.
    #[serde(rename = "DonorName")]
    pub name: String,
    /// Age in years.
    #[serde(rename = "Age")]
    pub age: u32,
    /// Gender code (`M`, `F`, `O`).
    #[serde(rename = "Gender", default)]
    pub gender: String,
    /// ABO/Rh group.
    #[serde(rename = "BloodGroup")]
    pub blood_group: String,
    /// Contact phone number.
    #[serde(rename = "ContactNo", default)]
    pub contact: String,
    /// Email address.
    #[serde(rename = "Email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Postal address.
    #[serde(rename = "Address", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Number of recorded donations.
    #[serde(rename = "TotalDonations", default)]
    pub total_donations: u32,
    /// Date of the most recent donation.
    #[serde(rename = "LastDonationDate", default, skip_serializing_if = "Option::is_none")]
    pub last_donation_date: Option<NaiveDate>,
}

/// Raw input from the "add donor" form.
#[derive(Debug, Clone, Default)]
pub struct DonorForm {
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Gender code.
    pub gender: String,
    /// ABO/Rh group.
    pub blood_group: String,
    /// Contact phone number.
    pub contact: String,
    /// Optional email address.
    pub email: Option<String>,
    /// Optional postal address.
    pub address: Option<String>,
}

impl DonorForm {
    /// Validates the form into a `POST /donors` body.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<NewDonor, ValidationError> {
        Ok(NewDonor {
            name: validation::required_text("name", &self.name, NAME_MAX)?,
            age: validation::donor_age(self.age)?,
            gender: validation::gender(&self.gender)?,
            blood_group: validation::blood_group(&self.blood_group)?,
            contact: validation::phone(&self.contact)?,
            email: validation::optional_email(self.email.as_deref())?,
            address: optional_text("address", self.address.as_deref(), ADDRESS_MAX)?,
        })
    }
}

/// The body of `POST /donors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDonor {
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: u8,
    /// Gender code.
    pub gender: String,
    /// ABO/Rh group.
    pub blood_group: String,
    /// Contact phone number.
    pub contact: String,
    /// Email address.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

/// Raw input from the "edit donor" form. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct DonorEdit {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement age.
    pub age: Option<i64>,
    /// Replacement gender code.
    pub gender: Option<String>,
    /// Replacement phone number.
    pub contact: Option<String>,
    /// Replacement email address.
    pub email: Option<String>,
    /// Replacement postal address.
    pub address: Option<String>,
}

impl DonorEdit {
    /// Validates the form into a `PUT /donors/{id}` body.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation, or an error if nothing
    /// was changed.
    pub fn validate(&self) -> Result<DonorPatch, ValidationError> {
        let patch = DonorPatch {
            name: self
                .name
                .as_deref()
                .map(|name| validation::required_text("name", name, NAME_MAX))
                .transpose()?,
            age: self.age.map(validation::donor_age).transpose()?,
            gender: self.gender.as_deref().map(validation::gender).transpose()?,
            contact: self.contact.as_deref().map(validation::phone).transpose()?,
            email: self.email.as_deref().map(validation::email).transpose()?,
            address: optional_text("address", self.address.as_deref(), ADDRESS_MAX)?,
        };
        if patch == DonorPatch::default() {
            return Err(ValidationError::new("donor", "No changes to update"));
        }
        Ok(patch)
    }
}

/// The body of `PUT /donors/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DonorPatch {
    /// Replacement name.
    #[serde(rename = "DonorName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement age.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    /// Replacement gender code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Replacement phone number.
    #[serde(rename = "ContactNo", skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// Replacement email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Replacement postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A patient who may need blood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Backend-assigned identifier.
    #[serde(rename = "PatientID")]
    pub id: PatientId,
    /// Full name.
    #[serde(rename = "PatientName")]
    pub name: String,
    /// Age in years.
    #[serde(rename = "Age")]
    pub age: u32,
    /// Gender code.
    #[serde(rename = "Gender", default)]
    pub gender: String,
    /// The blood group the patient needs.
    #[serde(rename = "BloodGroupRequired")]
    pub blood_group: String,
    /// The treating hospital.
    #[serde(rename = "HospitalID")]
    pub hospital_id: HospitalId,
    /// Contact phone number.
    #[serde(rename = "ContactNo", default)]
    pub contact: String,
    /// Medical condition notes.
    #[serde(rename = "MedicalCondition", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// The hospital's name, when the backend joined it in.
    #[serde(rename = "HospitalName", default, skip_serializing_if = "Option::is_none")]
    pub hospital_name: Option<String>,
}

impl Patient {
    /// Applies a validated patch to the local copy.
    pub fn apply_patch(&mut self, patch: &PatientPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(age) = patch.age {
            self.age = u32::from(age);
        }
        if let Some(gender) = &patch.gender {
            self.gender.clone_from(gender);
        }
        if let Some(blood_group) = &patch.blood_group {
            self.blood_group.clone_from(blood_group);
        }
        if let Some(hospital_id) = patch.hospital_id {
            self.hospital_id = hospital_id;
            // The joined name belongs to the old hospital.
            self.hospital_name = None;
        }
        if let Some(contact) = &patch.contact {
            self.contact.clone_from(contact);
        }
        if let Some(condition) = &patch.condition {
            self.condition = Some(condition.clone());
        }
    }
}

/// Raw input from the "add patient" form.
#[derive(Debug, Clone, Default)]
pub struct PatientForm {
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Gender code.
    pub gender: String,
    /// The blood group the patient needs.
    pub blood_group: String,
    /// The treating hospital.
    pub hospital_id: i64,
    /// Contact phone number.
    pub contact: String,
    /// Optional medical condition notes.
    pub condition: Option<String>,
}

impl PatientForm {
    /// Validates the form into a `POST /patients` body.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<NewPatient, ValidationError> {
        Ok(NewPatient {
            name: validation::required_text("name", &self.name, NAME_MAX)?,
            age: validation::patient_age(self.age)?,
            gender: validation::gender(&self.gender)?,
            blood_group: validation::blood_group(&self.blood_group)?,
            hospital_id: validation::positive_id("hospital_id", self.hospital_id)?.into(),
            contact: validation::phone(&self.contact)?,
            condition: optional_text("condition", self.condition.as_deref(), ADDRESS_MAX)?,
        })
    }
}

/// The body of `POST /patients`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPatient {
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: u8,
    /// Gender code.
    pub gender: String,
    /// The blood group the patient needs.
    pub blood_group: String,
    /// The treating hospital.
    pub hospital_id: HospitalId,
    /// Contact phone number.
    pub contact: String,
    /// Medical condition notes.
    pub condition: Option<String>,
}

/// Raw input from the "edit patient" form. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct PatientEdit {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement age.
    pub age: Option<i64>,
    /// Replacement gender code.
    pub gender: Option<String>,
    /// Replacement blood group.
    pub blood_group: Option<String>,
    /// Replacement hospital.
    pub hospital_id: Option<i64>,
    /// Replacement phone number.
    pub contact: Option<String>,
    /// Replacement condition notes.
    pub condition: Option<String>,
}

impl PatientEdit {
    /// Validates the form into a `PUT /patients/{id}` body.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation, or an error if nothing
    /// was changed.
    pub fn validate(&self) -> Result<PatientPatch, ValidationError> {
        let patch = PatientPatch {
            name: self
                .name
                .as_deref()
                .map(|name| validation::required_text("name", name, NAME_MAX))
                .transpose()?,
            age: self.age.map(validation::patient_age).transpose()?,
            gender: self.gender.as_deref().map(validation::gender).transpose()?,
            blood_group: self
                .blood_group
                .as_deref()
                .map(validation::blood_group)
                .transpose()?,
            hospital_id: self
                .hospital_id
                .map(|id| validation::positive_id("hospital_id", id).map(HospitalId::from))
                .transpose()?,
            contact: self.contact.as_deref().map(validation::phone).transpose()?,
            condition: optional_text("condition", self.condition.as_deref(), ADDRESS_MAX)?,
        };
        if patch == PatientPatch::default() {
            return Err(ValidationError::new("patient", "No changes to update"));
        }
        Ok(patch)
    }
}

/// The body of `PUT /patients/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PatientPatch {
    /// Replacement name.
    #[serde(rename = "PatientName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement age.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    /// Replacement gender code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Replacement blood group.
    #[serde(rename = "BloodGroupRequired", skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    /// Replacement hospital.
    #[serde(rename = "HospitalID", skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<HospitalId>,
    /// Replacement phone number.
    #[serde(rename = "ContactNo", skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// Replacement condition notes.
    #[serde(rename = "MedicalCondition", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Blank optional text counts as absent.
fn optional_text(
    field: &'static str,
    raw: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => validation::required_text(field, text, max).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn donor_form(age: i64) -> DonorForm {
        DonorForm {
            name: "John Doe".to_string(),
            age,
            gender: "M".to_string(),
            blood_group: "O+".to_string(),
            contact: "9876543210".to_string(),
            email: Some("john@example.com".to_string()),
            address: Some("123 Main St".to_string()),
        }
    }

    #[test_case(17, false; "seventeen rejected")]
    #[test_case(18, true; "eighteen accepted")]
    #[test_case(65, true; "sixty five accepted")]
    #[test_case(66, false; "sixty six rejected")]
    fn donor_age_is_checked_on_add(age: i64, accepted: bool) {
        let result = donor_form(age).validate();
        assert_eq!(result.is_ok(), accepted);
        if let Err(error) = result {
            assert!(error.message.starts_with("Age must be between 18 and 65"));
        }
    }

    #[test_case(17, false; "seventeen rejected")]
    #[test_case(18, true; "eighteen accepted")]
    #[test_case(65, true; "sixty five accepted")]
    #[test_case(66, false; "sixty six rejected")]
    fn donor_age_is_checked_on_edit(age: i64, accepted: bool) {
        let edit = DonorEdit {
            age: Some(age),
            ..DonorEdit::default()
        };
        assert_eq!(edit.validate().is_ok(), accepted);
    }

    #[test]
    fn add_and_edit_share_phone_and_email_rules() {
        let mut form = donor_form(30);
        form.contact = "12345".to_string();
        let add_error = form.validate().unwrap_err();

        let edit_error = DonorEdit {
            contact: Some("12345".to_string()),
            ..DonorEdit::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(add_error, edit_error);

        let mut form = donor_form(30);
        form.email = Some("not-an-email".to_string());
        assert_eq!(form.validate().unwrap_err().field, "email");
    }

    #[test]
    fn donor_patch_uses_backend_column_names() {
        let patch = DonorEdit {
            name: Some("Jane".to_string()),
            contact: Some("1234567890".to_string()),
            ..DonorEdit::default()
        }
        .validate()
        .unwrap();

        assert_eq!(
            serde_json::to_value(patch).unwrap(),
            serde_json::json!({"DonorName": "Jane", "ContactNo": "1234567890"})
        );
    }

    #[test]
    fn patient_form_validates_every_field() {
        let form = PatientForm {
            name: "Asha".to_string(),
            age: 130,
            gender: "F".to_string(),
            blood_group: "AB-".to_string(),
            hospital_id: 2,
            contact: "9876543210".to_string(),
            condition: None,
        };
        assert_eq!(form.validate().unwrap_err().field, "age");

        let form = PatientForm { age: 40, ..form };
        let new = form.validate().unwrap();
        assert_eq!(new.hospital_id, HospitalId::new(2));
    }

    #[test]
    fn empty_patient_edit_is_rejected() {
        assert!(PatientEdit::default().validate().is_err());
    }

    #[test]
    fn patient_patch_applies_locally() {
        let mut patient: Patient = serde_json::from_str(
            r#"{"PatientID": 3, "PatientName": "Asha", "Age": 40, "Gender": "F",
                "BloodGroupRequired": "O+", "HospitalID": 1, "ContactNo": "9876543210",
                "HospitalName": "City General"}"#,
        )
        .unwrap();

        let patch = PatientEdit {
            name: Some("Asha K".to_string()),
            hospital_id: Some(2),
            ..PatientEdit::default()
        }
        .validate()
        .unwrap();
        patient.apply_patch(&patch);

        assert_eq!(patient.name, "Asha K");
        assert_eq!(patient.hospital_id, HospitalId::new(2));
        assert_eq!(patient.hospital_name, None);
        assert_eq!(patient.age, 40);
    }
}
