//! The blood request state machine.
//!
//! A request is created `Pending`. It becomes `Approved` only as the side
//! effect of a successful allocation, and `Denied` either because an
//! allocation attempt failed or because an administrator denied it.
//! `Fulfilled` is reachable only through the administrative path, which like
//! every other action starts from `Pending`.
//!
//! `Fulfilled` and `Denied` are terminal: nothing may be initiated against a
//! request once it reaches either of them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The status of a blood request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Created and awaiting an allocation or an administrative decision.
    Pending,
    /// A unit was allocated to the request.
    Approved,
    /// Marked fulfilled by an administrator.
    Fulfilled,
    /// Denied, either administratively or by a failed allocation.
    Denied,
}

impl RequestStatus {
    /// Every legal status, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Approved, Self::Fulfilled, Self::Denied];

    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Fulfilled => "Fulfilled",
            Self::Denied => "Denied",
        }
    }

    /// Whether the status is terminal (`Fulfilled` or `Denied`).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Denied)
    }

    /// Applies a trigger to the status, returning the next status.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if the trigger is not legal from the
    /// current status. The status is left unchanged in that case.
    pub const fn apply(self, trigger: Trigger) -> Result<Self, TransitionError> {
        let next = match (self, trigger) {
            (Self::Pending, Trigger::AllocationSucceeded) => Self::Approved,
            (
                Self::Pending,
                Trigger::AllocationRejected | Trigger::AllocationFailed | Trigger::ManualDeny,
            ) => Self::Denied,
            (Self::Pending, Trigger::ManualFulfil) => Self::Fulfilled,
            (from, trigger) => return Err(TransitionError { from, trigger }),
        };
        Ok(next)
    }

    /// Whether the presentation layer may initiate `action` against a request
    /// in this status.
    ///
    /// Every action, including administrative status updates, is only
    /// offered while the request is `Pending`.
    #[must_use]
    pub const fn permits(self, action: Action) -> bool {
        match action {
            Action::Edit | Action::Delete | Action::Allocate | Action::UpdateStatus => {
                matches!(self, Self::Pending)
            }
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Error returned when parsing a string that is not a legal request status.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unknown request status '{0}': expected one of Pending, Approved, Fulfilled, Denied")]
pub struct UnknownStatus(String);

/// An event that moves a request between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The allocation create-call returned success.
    AllocationSucceeded,
    /// The allocation create-call returned an explicit failure payload.
    AllocationRejected,
    /// The allocation create-call failed in transport or returned garbage.
    AllocationFailed,
    /// An administrator marked the request fulfilled.
    ManualFulfil,
    /// An administrator denied the request.
    ManualDeny,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AllocationSucceeded => "successful allocation",
            Self::AllocationRejected => "rejected allocation",
            Self::AllocationFailed => "failed allocation",
            Self::ManualFulfil => "manual fulfilment",
            Self::ManualDeny => "manual denial",
        };
        f.write_str(name)
    }
}

/// Error returned when a trigger is not legal from the current status.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("a {trigger} cannot move a request out of {from}")]
pub struct TransitionError {
    /// The status the request was in.
    pub from: RequestStatus,
    /// The trigger that was refused.
    pub trigger: Trigger,
}

/// An action the presentation layer can initiate against a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Change the patient, blood bank or unit count.
    Edit,
    /// Remove the request.
    Delete,
    /// Allocate a blood unit to the request.
    Allocate,
    /// Set the status administratively.
    UpdateStatus,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Allocate => "allocate against",
            Self::UpdateStatus => "update the status of",
        };
        f.write_str(verb)
    }
}

/// The statuses the administrative shortcut may set directly.
///
/// `Approved` is only reachable through allocation and `Pending` only through
/// creation, so neither can be expressed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManualStatus {
    /// Mark the request fulfilled.
    Fulfilled,
    /// Deny the request.
    Denied,
}

impl ManualStatus {
    /// The trigger this administrative action fires.
    #[must_use]
    pub const fn trigger(self) -> Trigger {
        match self {
            Self::Fulfilled => Trigger::ManualFulfil,
            Self::Denied => Trigger::ManualDeny,
        }
    }
}

impl From<ManualStatus> for RequestStatus {
    fn from(status: ManualStatus) -> Self {
        match status {
            ManualStatus::Fulfilled => Self::Fulfilled,
            ManualStatus::Denied => Self::Denied,
        }
    }
}
