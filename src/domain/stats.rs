//! Aggregate views computed by the backend.
//!
//! These are display-only. Every field is optional or defaulted because the
//! backend builds them from SQL views whose columns drift between schema
//! versions.

use serde::{Deserialize, Serialize};

use crate::domain::{BloodBankId, RequestStatus};

/// One row of `GET /inventory`: available stock for a bank and blood group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryLine {
    /// The bank holding the stock.
    #[serde(rename = "BloodBankID", default, skip_serializing_if = "Option::is_none")]
    pub blood_bank_id: Option<BloodBankId>,
    /// The bank's name.
    #[serde(rename = "BloodBankName", default)]
    pub blood_bank_name: String,
    /// ABO/Rh group.
    #[serde(rename = "BloodGroup", default)]
    pub blood_group: String,
    /// Number of available units.
    #[serde(rename = "TotalUnits", default)]
    pub total_units: u64,
    /// Summed quantity across those units.
    #[serde(rename = "TotalQuantity", default)]
    pub total_quantity: u64,
    /// Days until the earliest unit expires.
    #[serde(rename = "DaysUntilExpiry", default, skip_serializing_if = "Option::is_none")]
    pub days_until_expiry: Option<i64>,
}

/// The body of `GET /statistics/dashboard`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Donor figures.
    #[serde(default)]
    pub donors: DonorStats,
    /// Blood bank figures.
    #[serde(default)]
    pub blood_banks: BloodBankStats,
    /// Request figures.
    #[serde(default)]
    pub requests: RequestStats,
}

/// Donor figures on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorStats {
    /// Active donors.
    #[serde(default)]
    pub total_donors: u64,
    /// Donations across all active donors.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_donations: u64,
    /// Active donors per blood group.
    #[serde(default)]
    pub by_blood_group: Vec<GroupCount>,
}

/// Blood bank figures on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodBankStats {
    /// Registered blood banks.
    #[serde(default)]
    pub total_banks: u64,
    /// Units currently available.
    #[serde(default)]
    pub available_units: u64,
    /// Available units expiring within seven days.
    #[serde(default)]
    pub expiring_soon: u64,
}

/// Request figures on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStats {
    /// Requests still pending.
    #[serde(default)]
    pub pending_requests: u64,
    /// Request counts per status.
    #[serde(default)]
    pub by_status: Vec<StatusCount>,
}

impl RequestStats {
    /// The count for `status`, or zero if the backend reported none.
    #[must_use]
    pub fn count(&self, status: RequestStatus) -> u64 {
        self.by_status
            .iter()
            .filter(|entry| entry.status == status)
            .map(|entry| entry.count)
            .sum()
    }
}

/// A blood group and how many donors have it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    /// ABO/Rh group.
    #[serde(rename = "BloodGroup")]
    pub blood_group: String,
    /// Number of donors.
    pub count: u64,
}

/// A request status and how many requests have it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    /// The status.
    #[serde(rename = "Status")]
    pub status: RequestStatus,
    /// Number of requests.
    pub count: u64,
}

/// SQL `SUM` over no rows yields `NULL`.
fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}
