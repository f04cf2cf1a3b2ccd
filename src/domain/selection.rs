//! Which requests and units may be offered as allocation choices.
//!
//! Any screen that lets a user pick a request and a unit to allocate must
//! build its options from these functions. They are the practical
//! precondition check for an allocation attempt.

use crate::domain::{BloodUnit, Request, RequestStatus};

/// The requests that may be chosen for allocation: only `Pending` ones.
pub fn selectable_requests(requests: &[Request]) -> impl Iterator<Item = &Request> {
    requests
        .iter()
        .filter(|request| request.status() == RequestStatus::Pending)
}

/// The units that may be chosen for allocation: only `Available` ones.
pub fn selectable_units(units: &[BloodUnit]) -> impl Iterator<Item = &BloodUnit> {
    units.iter().filter(|unit| unit.is_available())
}
