use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{AllocationId, RequestId, UnitId};

/// The record linking one blood unit to one request.
///
/// Created by the backend on a successful allocation attempt. Allocations are
/// immutable and never deleted from this side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Backend-assigned identifier.
    #[serde(rename = "AllocationID")]
    pub id: AllocationId,
    /// The request the unit was allocated to.
    #[serde(rename = "RequestID")]
    pub request_id: RequestId,
    /// The allocated unit.
    #[serde(rename = "UnitID")]
    pub unit_id: UnitId,
    /// When the allocation was made.
    #[serde(rename = "AllocationDate")]
    pub allocation_date: NaiveDateTime,
    /// The patient's name, when the backend joined it in.
    #[serde(rename = "PatientName", default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    /// The unit's blood group, when the backend joined it in.
    #[serde(rename = "BloodGroup", default, skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    /// The unit's component, when the backend joined it in.
    #[serde(rename = "Component", default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// The blood bank's name, when the backend joined it in.
    #[serde(rename = "BloodBankName", default, skip_serializing_if = "Option::is_none")]
    pub blood_bank_name: Option<String>,
}

/// The body of `POST /allocations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAllocation {
    /// The request to allocate to.
    pub request_id: RequestId,
    /// The unit to allocate.
    pub unit_id: UnitId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_joined_rows() {
        let allocation: Allocation = serde_json::from_str(
            r#"{"AllocationID": 5, "RequestID": 11, "UnitID": 7,
                "AllocationDate": "2024-03-02T12:00:00", "RequiredUnits": 2,
                "BloodGroup": "O+", "Component": "RBC", "PatientName": "Asha",
                "BloodBankName": "Central"}"#,
        )
        .unwrap();

        assert_eq!(allocation.request_id, RequestId::new(11));
        assert_eq!(allocation.unit_id, UnitId::new(7));
        assert_eq!(allocation.patient_name.as_deref(), Some("Asha"));
    }

    #[test]
    fn new_allocation_body() {
        let body = NewAllocation {
            request_id: RequestId::new(11),
            unit_id: UnitId::new(7),
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({"request_id": 11, "unit_id": 7})
        );
    }
}
