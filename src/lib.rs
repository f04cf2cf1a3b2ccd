//! Blood Request Management
//!
//! Hospital blood requests move through a small lifecycle: created
//! `Pending`, then `Approved` when a unit is allocated, or `Denied` or
//! `Fulfilled`. This crate is the client side of that workflow. It talks to a
//! REST backend, caches the collections it reads, and refuses illegal
//! actions before they reach the network.

pub mod domain;
pub use domain::{
    Allocation, BloodUnit, Config, ManualStatus, NewRequest, Request, RequestId, RequestPatch,
    RequestStatus, UnitId,
};

pub mod api;
pub use api::{ApiError, Backend, HttpBackend};

pub mod lifecycle;
pub use lifecycle::{AllocationOutcome, LifecycleError, RequestLifecycle};

pub mod notify;
pub use notify::{Notice, Notifier};

pub mod storage;
pub use storage::{Repository, Resource};
