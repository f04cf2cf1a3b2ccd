use std::{fmt, num::NonZeroU32};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{
    BloodBankId, PatientId, RequestId,
    status::{Action, RequestStatus},
    validation::{self, ValidationError},
};

/// A standing ask for blood units on behalf of a patient, tracked against a
/// specific blood bank.
///
/// Rows come from the backend with PascalCase column names. The status is
/// never written locally: the lifecycle checks each change with
/// [`RequestStatus::apply`] before sending it, and the cache takes whatever
/// status the backend returns on the next refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(rename = "RequestID")]
    pub(crate) id: RequestId,
    #[serde(rename = "PatientID")]
    pub(crate) patient_id: PatientId,
    #[serde(rename = "BloodBankID")]
    pub(crate) blood_bank_id: BloodBankId,
    #[serde(rename = "RequiredUnits")]
    pub(crate) required_units: RequiredUnits,
    #[serde(rename = "Status")]
    pub(crate) status: RequestStatus,
    #[serde(rename = "RequestDate")]
    pub(crate) request_date: NaiveDateTime,
    #[serde(rename = "PatientName", default, skip_serializing_if = "Option::is_none")]
    pub(crate) patient_name: Option<String>,
    #[serde(
        rename = "BloodGroupRequired",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) blood_group: Option<String>,
    #[serde(rename = "BloodBankName", default, skip_serializing_if = "Option::is_none")]
    pub(crate) blood_bank_name: Option<String>,
    #[serde(rename = "HospitalName", default, skip_serializing_if = "Option::is_none")]
    pub(crate) hospital_name: Option<String>,
}

impl Request {
    /// Constructs a freshly created request. New requests are always
    /// `Pending`.
    #[must_use]
    pub const fn new(id: RequestId, new: &NewRequest, request_date: NaiveDateTime) -> Self {
        Self {
            id,
            patient_id: new.patient_id,
            blood_bank_id: new.blood_bank_id,
            required_units: new.required_units,
            status: RequestStatus::Pending,
            request_date,
            patient_name: None,
            blood_group: None,
            blood_bank_name: None,
            hospital_name: None,
        }
    }

    /// The backend-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// The patient the blood is for.
    #[must_use]
    pub const fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    /// The blood bank the request is tracked against.
    #[must_use]
    pub const fn blood_bank_id(&self) -> BloodBankId {
        self.blood_bank_id
    }

    /// How many units were asked for.
    #[must_use]
    pub const fn required_units(&self) -> RequiredUnits {
        self.required_units
    }

    /// The current status.
    #[must_use]
    pub const fn status(&self) -> RequestStatus {
        self.status
    }

    /// When the request was created. Never changes.
    #[must_use]
    pub const fn request_date(&self) -> NaiveDateTime {
        self.request_date
    }

    /// The patient's name, when the backend joined it in.
    #[must_use]
    pub fn patient_name(&self) -> Option<&str> {
        self.patient_name.as_deref()
    }

    /// The blood group the patient needs, when the backend joined it in.
    #[must_use]
    pub fn blood_group(&self) -> Option<&str> {
        self.blood_group.as_deref()
    }

    /// The blood bank's name, when the backend joined it in.
    #[must_use]
    pub fn blood_bank_name(&self) -> Option<&str> {
        self.blood_bank_name.as_deref()
    }

    /// The hospital's name, when the backend joined it in.
    #[must_use]
    pub fn hospital_name(&self) -> Option<&str> {
        self.hospital_name.as_deref()
    }

    /// Checks whether `action` may be initiated against this request.
    ///
    /// # Errors
    ///
    /// Returns [`ActionRefused`] naming the current status if it may not.
    pub const fn ensure(&self, action: Action) -> Result<(), ActionRefused> {
        if self.status.permits(action) {
            Ok(())
        } else {
            Err(ActionRefused {
                request: self.id,
                action,
                status: self.status,
            })
        }
    }

    /// Applies a validated patch to the local copy.
    pub(crate) fn apply_patch(&mut self, patch: &RequestPatch) {
        if let Some(patient_id) = patch.patient_id {
            self.patient_id = patient_id;
        }
        if let Some(blood_bank_id) = patch.blood_bank_id {
            self.blood_bank_id = blood_bank_id;
        }
        if let Some(required_units) = patch.required_units {
            self.required_units = required_units;
        }
    }
}

/// An action refused because of the request's current status.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Cannot {action} request {request}: it is already {status}")]
pub struct ActionRefused {
    /// The request the action was aimed at.
    pub request: RequestId,
    /// The refused action.
    pub action: Action,
    /// The status that caused the refusal.
    pub status: RequestStatus,
}

/// A positive number of blood units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct RequiredUnits(NonZeroU32);

impl RequiredUnits {
    /// Creates a unit count.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for zero or negative counts.
    pub fn new(units: i64) -> Result<Self, ValidationError> {
        validation::positive_quantity("required_units", units).map(Self)
    }

    /// Returns the count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<i64> for RequiredUnits {
    type Error = ValidationError;

    fn try_from(units: i64) -> Result<Self, Self::Error> {
        Self::new(units)
    }
}

impl From<RequiredUnits> for u32 {
    fn from(units: RequiredUnits) -> Self {
        units.get()
    }
}

impl fmt::Display for RequiredUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The body of `POST /requests`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewRequest {
    /// The patient the blood is for.
    pub patient_id: PatientId,
    /// The blood bank to draw from.
    pub blood_bank_id: BloodBankId,
    /// How many units are needed.
    pub required_units: RequiredUnits,
}

impl NewRequest {
    /// Validates raw form input into a new request.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn from_form(
        patient_id: i64,
        blood_bank_id: i64,
        required_units: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            patient_id: validation::positive_id("patient_id", patient_id)?.into(),
            blood_bank_id: validation::positive_id("blood_bank_id", blood_bank_id)?.into(),
            required_units: RequiredUnits::new(required_units)?,
        })
    }
}

/// The body of `PUT /requests/{id}`.
///
/// Each field is optional and re-validated independently before submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestPatch {
    /// A replacement patient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<PatientId>,
    /// A replacement blood bank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_bank_id: Option<BloodBankId>,
    /// A replacement unit count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_units: Option<RequiredUnits>,
}

impl RequestPatch {
    /// Validates raw form input into a patch.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation, or an error if no
    /// field was supplied at all.
    pub fn from_form(
        patient_id: Option<i64>,
        blood_bank_id: Option<i64>,
        required_units: Option<i64>,
    ) -> Result<Self, ValidationError> {
        let patch = Self {
            patient_id: patient_id
                .map(|id| validation::positive_id("patient_id", id).map(PatientId::from))
                .transpose()?,
            blood_bank_id: blood_bank_id
                .map(|id| validation::positive_id("blood_bank_id", id).map(BloodBankId::from))
                .transpose()?,
            required_units: required_units.map(RequiredUnits::new).transpose()?,
        };
        if patch.is_empty() {
            return Err(ValidationError::new("request", "No changes to update"));
        }
        Ok(patch)
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.patient_id.is_none() && self.blood_bank_id.is_none() && self.required_units.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> String {
        format!(
            r#"{{
                "RequestID": 11,
                "PatientID": 3,
                "BloodBankID": 1,
                "RequiredUnits": 2,
                "Status": "{status}",
                "RequestDate": "2024-03-01T09:30:00",
                "PatientName": "Asha",
                "BloodGroupRequired": "O+",
                "BloodBankName": "Central",
                "HospitalName": "City General"
            }}"#
        )
    }

    #[test]
    fn decodes_a_backend_row() {
        let request: Request = serde_json::from_str(&row("Pending")).unwrap();

        assert_eq!(request.id(), RequestId::new(11));
        assert_eq!(request.patient_id(), PatientId::new(3));
        assert_eq!(request.required_units().get(), 2);
        assert_eq!(request.status(), RequestStatus::Pending);
        assert_eq!(request.patient_name(), Some("Asha"));
        assert_eq!(request.hospital_name(), Some("City General"));
    }

    #[test]
    fn rejects_rows_with_unknown_status() {
        assert!(serde_json::from_str::<Request>(&row("Processing")).is_err());
    }

    #[test]
    fn rejects_rows_with_non_positive_units() {
        let json = row("Pending").replace("\"RequiredUnits\": 2", "\"RequiredUnits\": 0");
        assert!(serde_json::from_str::<Request>(&json).is_err());
    }

    #[test]
    fn terminal_request_refuses_edit_with_its_status() {
        let request: Request = serde_json::from_str(&row("Denied")).unwrap();

        let refused = request.ensure(Action::Edit).unwrap_err();
        assert_eq!(refused.status, RequestStatus::Denied);
        assert_eq!(refused.to_string(), "Cannot edit request 11: it is already Denied");
    }

    #[test]
    fn new_requests_start_pending() {
        let new = NewRequest::from_form(3, 1, 2).unwrap();
        let request = Request::new(RequestId::new(1), &new, NaiveDateTime::default());
        assert_eq!(request.status(), RequestStatus::Pending);
    }

    #[test]
    fn new_request_body_uses_snake_case() {
        let new = NewRequest::from_form(3, 1, 2).unwrap();
        let body = serde_json::to_value(new).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"patient_id": 3, "blood_bank_id": 1, "required_units": 2})
        );
    }

    #[test]
    fn new_request_rejects_zero_units() {
        let error = NewRequest::from_form(3, 1, 0).unwrap_err();
        assert_eq!(error.field, "required_units");
    }

    #[test]
    fn patch_validates_each_field() {
        assert!(RequestPatch::from_form(Some(-1), None, None).is_err());
        assert!(RequestPatch::from_form(None, Some(0), None).is_err());
        assert!(RequestPatch::from_form(None, None, Some(0)).is_err());

        let patch = RequestPatch::from_form(None, None, Some(4)).unwrap();
        assert_eq!(
            serde_json::to_value(patch).unwrap(),
            serde_json::json!({"required_units": 4})
        );
    }

    #[test]
    fn empty_patch_is_rejected() {
        let error = RequestPatch::from_form(None, None, None).unwrap_err();
        assert_eq!(error.message, "No changes to update");
    }
}
