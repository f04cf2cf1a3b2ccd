use std::fmt;

use crate::{
    api::ApiError,
    domain::{ActionRefused, AllocationId, RequestId, TransitionError, UnitId, ValidationError},
};

/// Shown when an allocation fails for reasons the backend did not explain.
pub const ALLOCATION_FAILED: &str = "Error allocating blood";

/// How an allocation attempt ended.
///
/// Every variant means the attempt ran to completion and the affected
/// collections were refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationOutcome {
    /// The unit was allocated and the request approved.
    Allocated {
        /// The new allocation record, if the backend reported its id.
        allocation: Option<AllocationId>,
    },

    /// The unit was allocated but approving the request failed.
    ///
    /// The allocation record stands and the request is still `Pending`.
    PartiallyAllocated {
        /// The new allocation record, if the backend reported its id.
        allocation: Option<AllocationId>,
        /// Why the status update failed.
        detail: String,
    },

    /// The backend refused the allocation.
    Rejected {
        /// The backend's explanation.
        detail: String,
        /// Whether the request was marked `Denied`.
        denied: bool,
    },

    /// The allocation call failed without an explanation.
    Failed {
        /// Whether the request was marked `Denied`.
        denied: bool,
    },
}

impl AllocationOutcome {
    /// Whether the request ended up approved with a unit allocated.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Allocated { .. })
    }

    /// The allocation record created by the attempt, if any.
    #[must_use]
    pub const fn allocation(&self) -> Option<AllocationId> {
        match self {
            Self::Allocated { allocation } | Self::PartiallyAllocated { allocation, .. } => {
                *allocation
            }
            Self::Rejected { .. } | Self::Failed { .. } => None,
        }
    }
}

impl fmt::Display for AllocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocated { .. } => f.write_str("Blood allocated successfully!"),
            Self::PartiallyAllocated { detail, .. } => write!(
                f,
                "Blood unit allocated, but the request could not be approved: {detail}"
            ),
            Self::Rejected { detail, .. } => f.write_str(detail),
            Self::Failed { .. } => f.write_str(ALLOCATION_FAILED),
        }
    }
}

/// Why a lifecycle operation did not run, or did not complete.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// A field failed validation. Nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The request's status forbids the action. Nothing was sent.
    #[error(transparent)]
    Refused(#[from] ActionRefused),

    /// The requested status change is not a legal transition. Nothing was
    /// sent.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Another allocation attempt for the request has not finished yet.
    #[error("An allocation for request {0} is already in progress")]
    AllocationInFlight(RequestId),

    /// The request is not in the local cache.
    #[error("Request {0} was not found")]
    UnknownRequest(RequestId),

    /// The unit is known not to be available.
    #[error("Blood unit {unit} is not available (status: {status})")]
    UnitUnavailable {
        /// The unit.
        unit: UnitId,
        /// Its current status.
        status: String,
    },

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl LifecycleError {
    /// Whether the operation was stopped before any network call.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        !matches!(self, Self::Api(_))
    }

    /// The text to show the user.
    ///
    /// Infrastructure failures are replaced by `fallback`. Everything else,
    /// including the backend's own explanations, is shown verbatim.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(error) if !error.is_rejection() => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, RequestStatus};

    #[test]
    fn outcome_messages() {
        let allocated = AllocationOutcome::Allocated {
            allocation: Some(AllocationId::new(3)),
        };
        assert!(allocated.is_success());
        assert_eq!(allocated.to_string(), "Blood allocated successfully!");

        let rejected = AllocationOutcome::Rejected {
            detail: "No matching unit".to_string(),
            denied: true,
        };
        assert_eq!(rejected.to_string(), "No matching unit");
        assert_eq!(rejected.allocation(), None);

        let failed = AllocationOutcome::Failed { denied: true };
        assert_eq!(failed.to_string(), "Error allocating blood");
    }

    #[test]
    fn partial_allocation_keeps_the_record() {
        let partial = AllocationOutcome::PartiallyAllocated {
            allocation: Some(AllocationId::new(8)),
            detail: "Request failed with status 500".to_string(),
        };
        assert!(!partial.is_success());
        assert_eq!(partial.allocation(), Some(AllocationId::new(8)));
        assert!(partial.to_string().ends_with("Request failed with status 500"));
    }

    #[test]
    fn infrastructure_failures_use_the_fallback() {
        let transport = LifecycleError::Api(ApiError::Transport("connection refused".into()));
        assert_eq!(transport.user_message("Error adding donor"), "Error adding donor");
        assert!(!transport.is_local());

        let rejected = LifecycleError::Api(ApiError::Rejected {
            detail: "Failed to add donor".into(),
        });
        assert_eq!(rejected.user_message("Error adding donor"), "Failed to add donor");

        let refused = LifecycleError::Refused(ActionRefused {
            request: RequestId::new(2),
            action: Action::Delete,
            status: RequestStatus::Fulfilled,
        });
        assert!(refused.is_local());
        assert_eq!(
            refused.user_message("Error deleting request"),
            "Cannot delete request 2: it is already Fulfilled"
        );
    }
}
