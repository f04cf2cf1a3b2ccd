//! The blood request lifecycle.
//!
//! [`RequestLifecycle`] is the only place request statuses are changed. It
//! checks every action against the cached status before any network call,
//! drives the allocation workflow through the status transition table, and
//! refreshes the affected collections after every mutation.

mod in_flight;
mod outcome;
mod registry;

use in_flight::InFlight;
pub use outcome::{ALLOCATION_FAILED, AllocationOutcome, LifecycleError};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    api::Backend,
    domain::{
        Action, AllocationId, ManualStatus, NewAllocation, NewRequest, Request, RequestId,
        RequestPatch, RequestStatus, Trigger, UnitId, ValidationError,
    },
    storage::{Repository, Resource},
};

/// Runs request operations against a backend and keeps its cache current.
#[derive(Debug)]
pub struct RequestLifecycle<B> {
    repository: Repository<B>,
    in_flight: InFlight,
}

impl<B: Backend> RequestLifecycle<B> {
    /// Creates a lifecycle manager with an empty cache.
    pub fn new(backend: B) -> Self {
        Self {
            repository: Repository::new(backend),
            in_flight: InFlight::default(),
        }
    }

    /// The repository holding the cached collections.
    pub const fn repository(&self) -> &Repository<B> {
        &self.repository
    }

    /// Whether an allocation attempt for `request` is still running.
    ///
    /// Presentation layers disable the allocate control while this is true.
    pub fn is_allocating(&self, request: RequestId) -> bool {
        self.in_flight.contains(request)
    }

    /// Creates a request. New requests always start `Pending`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Api`] if the backend refuses or cannot be
    /// reached.
    #[instrument(skip(self))]
    pub async fn create_request(
        &self,
        request: NewRequest,
    ) -> Result<Option<RequestId>, LifecycleError> {
        let id = self.repository.backend().create_request(&request).await?;
        tracing::info!(?id, "request created");
        self.repository
            .refresh(&Resource::AFTER_REQUEST_CHANGE)
            .await;
        Ok(id)
    }

    /// Allocates a blood unit to a request.
    ///
    /// The allocation is created first, then the request's status is moved
    /// according to the result: `Approved` on success, `Denied` on any
    /// failure. The requests, units, allocations, inventory and statistics
    /// are refreshed before returning, whatever the outcome.
    ///
    /// A second attempt for the same request is refused while one is
    /// running.
    ///
    /// # Errors
    ///
    /// Returns an error, without any network call, if the cached request is
    /// not `Pending`, the cached unit is not available, or an attempt for the
    /// request is already running. Backend failures are reported through
    /// [`AllocationOutcome`] instead.
    #[instrument(skip(self), fields(attempt = %Uuid::new_v4()))]
    pub async fn attempt_allocation(
        &self,
        request_id: RequestId,
        unit_id: UnitId,
    ) -> Result<AllocationOutcome, LifecycleError> {
        let current = self.check_allocation(request_id, unit_id).await?;
        let Some(_claim) = self.in_flight.claim(request_id) else {
            return Err(LifecycleError::AllocationInFlight(request_id));
        };

        let allocation = NewAllocation {
            request_id,
            unit_id,
        };
        let outcome = match self
            .repository
            .backend()
            .create_allocation(&allocation)
            .await
        {
            Ok(allocation) => self.approve(request_id, current, allocation).await,
            Err(error) if error.is_rejection() => {
                tracing::info!(%error, "allocation rejected");
                let denied = self
                    .deny(request_id, current, Trigger::AllocationRejected)
                    .await;
                AllocationOutcome::Rejected {
                    detail: error.to_string(),
                    denied,
                }
            }
            Err(error) => {
                tracing::warn!(%error, "allocation failed");
                let denied = self
                    .deny(request_id, current, Trigger::AllocationFailed)
                    .await;
                AllocationOutcome::Failed { denied }
            }
        };

        self.repository.refresh(&Resource::AFTER_ALLOCATION).await;
        Ok(outcome)
    }

    /// The cached status the attempt starts from. An uncached request is
    /// assumed `Pending` and left to the backend to judge.
    async fn check_allocation(
        &self,
        request_id: RequestId,
        unit_id: UnitId,
    ) -> Result<RequestStatus, LifecycleError> {
        let cache = self.repository.cache().await;
        let current = match cache.request(request_id) {
            Some(request) => {
                request.ensure(Action::Allocate)?;
                request.status()
            }
            None => RequestStatus::Pending,
        };
        if let Some(unit) = cache.unit(unit_id).filter(|unit| !unit.is_available()) {
            return Err(LifecycleError::UnitUnavailable {
                unit: unit_id,
                status: unit.status.to_string(),
            });
        }
        Ok(current)
    }

    async fn approve(
        &self,
        request_id: RequestId,
        current: RequestStatus,
        allocation: Option<AllocationId>,
    ) -> AllocationOutcome {
        let result = match current.apply(Trigger::AllocationSucceeded) {
            Ok(next) => self
                .repository
                .backend()
                .set_request_status(request_id, next)
                .await
                .map_err(|error| error.to_string()),
            Err(error) => Err(error.to_string()),
        };
        match result {
            Ok(()) => {
                tracing::info!(?allocation, "blood allocated");
                AllocationOutcome::Allocated { allocation }
            }
            Err(detail) => {
                // No endpoint exists to undo an allocation.
                tracing::warn!(
                    ?allocation,
                    %detail,
                    "unit allocated but the request could not be approved"
                );
                AllocationOutcome::PartiallyAllocated { allocation, detail }
            }
        }
    }

    /// Returns whether the request was marked denied.
    async fn deny(&self, request_id: RequestId, current: RequestStatus, trigger: Trigger) -> bool {
        let next = match current.apply(trigger) {
            Ok(next) => next,
            Err(error) => {
                tracing::warn!(%error, "request left unchanged");
                return false;
            }
        };
        match self
            .repository
            .backend()
            .set_request_status(request_id, next)
            .await
        {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%error, "could not mark the request denied");
                false
            }
        }
    }

    /// Sets a request to `Fulfilled` or `Denied` directly.
    ///
    /// This administrative path is independent of allocation.
    ///
    /// # Errors
    ///
    /// Returns an error, without any network call, if the cached request is
    /// no longer `Pending`. Returns [`LifecycleError::Api`] if the backend
    /// refuses or cannot be reached.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        request_id: RequestId,
        status: ManualStatus,
    ) -> Result<RequestStatus, LifecycleError> {
        if let Some(request) = self.repository.cache().await.request(request_id) {
            request.ensure(Action::UpdateStatus)?;
            request.status().apply(status.trigger())?;
        }

        let target = RequestStatus::from(status);
        self.repository
            .backend()
            .set_request_status(request_id, target)
            .await?;
        tracing::info!(%target, "request status updated");
        self.repository
            .refresh(&Resource::AFTER_REQUEST_CHANGE)
            .await;
        Ok(target)
    }

    /// Refetches the requests and returns the one about to be edited.
    ///
    /// The status may have changed on the backend since the list was last
    /// fetched, so the edit guard is checked against the fresh copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the refetch fails, the request no longer exists,
    /// or it is no longer `Pending`.
    #[instrument(skip(self))]
    pub async fn open_edit(&self, request_id: RequestId) -> Result<Request, LifecycleError> {
        if let Some(failure) = self
            .repository
            .refresh(&[Resource::Requests])
            .await
            .into_iter()
            .next()
        {
            return Err(failure.error.into());
        }
        let cache = self.repository.cache().await;
        let request = cache
            .request(request_id)
            .ok_or(LifecycleError::UnknownRequest(request_id))?;
        request.ensure(Action::Edit)?;
        Ok(request.clone())
    }

    /// Edits a `Pending` request.
    ///
    /// The cached row is patched straight away and replaced by the refetched
    /// copy once the backend has answered.
    ///
    /// # Errors
    ///
    /// Returns an error, without any network call, if the request is not
    /// cached, is not `Pending`, or the patch is empty. Returns
    /// [`LifecycleError::Api`] if the backend refuses or cannot be reached.
    #[instrument(skip(self))]
    pub async fn edit_request(
        &self,
        request_id: RequestId,
        patch: RequestPatch,
    ) -> Result<(), LifecycleError> {
        self.check(request_id, Action::Edit).await?;
        if patch.is_empty() {
            return Err(ValidationError::new("request", "No changes to update").into());
        }

        let token = self
            .repository
            .cache_mut()
            .await
            .patch_request(request_id, &patch);
        let result = self
            .repository
            .backend()
            .edit_request(request_id, &patch)
            .await;
        if let Some(token) = token.filter(|_| result.is_err()) {
            self.repository.cache_mut().await.rollback_request(token);
        }
        self.repository
            .refresh(&Resource::AFTER_REQUEST_CHANGE)
            .await;
        Ok(result?)
    }

    /// Deletes a `Pending` request. The backend records deletion as
    /// `Denied`.
    ///
    /// # Errors
    ///
    /// Returns an error, without any network call, if the request is not
    /// cached or is not `Pending`. Returns [`LifecycleError::Api`] if the
    /// backend refuses or cannot be reached.
    #[instrument(skip(self))]
    pub async fn delete_request(&self, request_id: RequestId) -> Result<(), LifecycleError> {
        self.check(request_id, Action::Delete).await?;
        self.repository
            .backend()
            .delete_request(request_id)
            .await?;
        tracing::info!("request deleted");
        self.repository
            .refresh(&Resource::AFTER_REQUEST_CHANGE)
            .await;
        Ok(())
    }

    /// Checks `action` against the cached request without touching the
    /// backend.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::UnknownRequest`] if the request is not
    /// cached and [`LifecycleError::Refused`] if its status does not permit
    /// the action.
    pub async fn check(
        &self,
        request_id: RequestId,
        action: Action,
    ) -> Result<(), LifecycleError> {
        let cache = self.repository.cache().await;
        let request = cache
            .request(request_id)
            .ok_or(LifecycleError::UnknownRequest(request_id))?;
        Ok(request.ensure(action)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use test_case::test_case;

    use super::*;
    use crate::{
        api::{
            ApiError,
            fake::{AllocationReply, Call, FakeBackend, unreachable_backend},
        },
        domain::{BloodUnit, UnitStatus},
    };

    const REQUEST: RequestId = RequestId::new(11);
    const UNIT: UnitId = UnitId::new(7);

    fn request(id: RequestId, status: RequestStatus) -> Request {
        let new = NewRequest::from_form(3, 1, 2).unwrap();
        let mut request = Request::new(id, &new, NaiveDateTime::default());
        request.status = status;
        request
    }

    fn unit(id: UnitId, status: &str) -> BloodUnit {
        BloodUnit {
            id,
            blood_group: "O+".to_string(),
            component: "Whole Blood".to_string(),
            status: UnitStatus::from(status.to_string()),
            blood_bank_id: None,
            expiration_date: None,
        }
    }

    async fn lifecycle(backend: FakeBackend) -> RequestLifecycle<FakeBackend> {
        let lifecycle = RequestLifecycle::new(backend);
        assert!(lifecycle.repository().refresh_all().await.is_empty());
        lifecycle.repository().backend().clear_calls();
        lifecycle
    }

    async fn with_pending_request() -> RequestLifecycle<FakeBackend> {
        lifecycle(
            FakeBackend::new()
                .with_requests([request(REQUEST, RequestStatus::Pending)])
                .with_units([unit(UNIT, "Available")]),
        )
        .await
    }

    async fn cached_status(lifecycle: &RequestLifecycle<FakeBackend>, id: RequestId) -> RequestStatus {
        lifecycle
            .repository()
            .cache()
            .await
            .request(id)
            .map(Request::status)
            .unwrap()
    }

    #[tokio::test]
    async fn created_request_is_allocated_and_approved() {
        let lifecycle = lifecycle(FakeBackend::new().with_units([unit(UNIT, "Available")])).await;
        let new = NewRequest::from_form(3, 1, 2).unwrap();

        let id = lifecycle.create_request(new).await.unwrap().unwrap();
        assert_eq!(cached_status(&lifecycle, id).await, RequestStatus::Pending);

        let outcome = lifecycle.attempt_allocation(id, UNIT).await.unwrap();

        assert!(outcome.is_success());
        let allocations = lifecycle.repository().backend().allocations();
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].request_id, id);
        assert_eq!(allocations[0].unit_id, UNIT);
        assert_eq!(outcome.allocation(), Some(allocations[0].id));
        assert_eq!(cached_status(&lifecycle, id).await, RequestStatus::Approved);

        let cache = lifecycle.repository().cache().await;
        assert_eq!(cache.allocations().list().len(), 1);
        assert!(!cache.unit(UNIT).unwrap().is_available());
    }

    #[tokio::test]
    async fn allocation_creates_before_approving() {
        let lifecycle = with_pending_request().await;

        lifecycle.attempt_allocation(REQUEST, UNIT).await.unwrap();

        assert_eq!(
            lifecycle.repository().backend().writes(),
            vec![
                Call::CreateAllocation(NewAllocation {
                    request_id: REQUEST,
                    unit_id: UNIT,
                }),
                Call::SetStatus(REQUEST, RequestStatus::Approved),
            ]
        );
    }

    #[tokio::test]
    async fn rejected_allocation_denies_the_request() {
        let lifecycle = with_pending_request().await;
        lifecycle
            .repository()
            .backend()
            .reply_to_allocations(AllocationReply::Fail(ApiError::Rejected {
                detail: "No matching unit".to_string(),
            }));

        let outcome = lifecycle.attempt_allocation(REQUEST, UNIT).await.unwrap();

        assert_eq!(
            outcome,
            AllocationOutcome::Rejected {
                detail: "No matching unit".to_string(),
                denied: true,
            }
        );
        assert_eq!(outcome.to_string(), "No matching unit");
        assert!(lifecycle.repository().backend().allocations().is_empty());
        assert_eq!(cached_status(&lifecycle, REQUEST).await, RequestStatus::Denied);
    }

    #[test_case(unreachable_backend(); "transport")]
    #[test_case(ApiError::Transport("the request timed out".into()); "timeout")]
    #[test_case(ApiError::Malformed("expected value at line 1".into()); "malformed")]
    #[test_case(ApiError::Status { status: 502, detail: "Request failed with status 502".into(), from_body: false }; "status without body")]
    #[tokio::test]
    async fn failed_allocation_denies_with_a_generic_message(error: ApiError) {
        let lifecycle = with_pending_request().await;
        lifecycle
            .repository()
            .backend()
            .reply_to_allocations(AllocationReply::Fail(error));

        let outcome = lifecycle.attempt_allocation(REQUEST, UNIT).await.unwrap();

        assert_eq!(outcome, AllocationOutcome::Failed { denied: true });
        assert_eq!(outcome.to_string(), ALLOCATION_FAILED);
        assert!(lifecycle.repository().backend().allocations().is_empty());
        assert_eq!(cached_status(&lifecycle, REQUEST).await, RequestStatus::Denied);
    }

    #[tokio::test]
    async fn error_status_with_a_body_is_a_rejection() {
        let lifecycle = with_pending_request().await;
        lifecycle
            .repository()
            .backend()
            .reply_to_allocations(AllocationReply::Fail(ApiError::Status {
                status: 400,
                detail: "Failed to create allocation".into(),
                from_body: true,
            }));

        let outcome = lifecycle.attempt_allocation(REQUEST, UNIT).await.unwrap();

        assert_eq!(outcome.to_string(), "Failed to create allocation");
        assert_eq!(cached_status(&lifecycle, REQUEST).await, RequestStatus::Denied);
    }

    #[tokio::test]
    async fn failed_approval_keeps_the_allocation_and_the_pending_status() {
        let lifecycle = with_pending_request().await;
        lifecycle
            .repository()
            .backend()
            .fail_status_updates(unreachable_backend());

        let outcome = lifecycle.attempt_allocation(REQUEST, UNIT).await.unwrap();

        let allocations = lifecycle.repository().backend().allocations();
        assert_eq!(allocations.len(), 1);
        assert_eq!(
            outcome,
            AllocationOutcome::PartiallyAllocated {
                allocation: Some(allocations[0].id),
                detail: "could not reach the backend: connection refused".to_string(),
            }
        );
        assert_eq!(cached_status(&lifecycle, REQUEST).await, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn denial_that_cannot_be_recorded_is_reported() {
        let lifecycle = with_pending_request().await;
        let backend = lifecycle.repository().backend();
        backend.reply_to_allocations(AllocationReply::Fail(unreachable_backend()));
        backend.fail_status_updates(unreachable_backend());

        let outcome = lifecycle.attempt_allocation(REQUEST, UNIT).await.unwrap();

        assert_eq!(outcome, AllocationOutcome::Failed { denied: false });
        assert_eq!(cached_status(&lifecycle, REQUEST).await, RequestStatus::Pending);
    }

    #[test_case(AllocationReply::Succeed; "success")]
    #[test_case(AllocationReply::Fail(ApiError::Rejected { detail: "No stock".into() }); "rejection")]
    #[test_case(AllocationReply::Fail(unreachable_backend()); "failure")]
    #[tokio::test]
    async fn every_outcome_refreshes_the_affected_views(reply: AllocationReply) {
        let lifecycle = with_pending_request().await;
        lifecycle.repository().backend().reply_to_allocations(reply);

        lifecycle.attempt_allocation(REQUEST, UNIT).await.unwrap();

        let reads: Vec<_> = lifecycle
            .repository()
            .backend()
            .calls()
            .into_iter()
            .filter(Call::is_read)
            .collect();
        for expected in [
            Call::ListRequests,
            Call::ListUnits,
            Call::ListAllocations,
            Call::Inventory,
            Call::Dashboard,
        ] {
            assert!(reads.contains(&expected), "{expected:?} not refreshed");
        }
        assert_eq!(reads.len(), 5);
    }

    #[test_case(RequestStatus::Approved; "approved")]
    #[test_case(RequestStatus::Fulfilled; "fulfilled")]
    #[test_case(RequestStatus::Denied; "denied")]
    #[tokio::test]
    async fn allocation_against_a_non_pending_request_is_refused_locally(status: RequestStatus) {
        let lifecycle = lifecycle(
            FakeBackend::new()
                .with_requests([request(REQUEST, status)])
                .with_units([unit(UNIT, "Available")]),
        )
        .await;

        let error = lifecycle
            .attempt_allocation(REQUEST, UNIT)
            .await
            .unwrap_err();

        assert!(matches!(error, LifecycleError::Refused(_)));
        assert!(lifecycle.repository().backend().calls().is_empty());
    }

    #[tokio::test]
    async fn unavailable_unit_is_refused_locally() {
        let lifecycle = lifecycle(
            FakeBackend::new()
                .with_requests([request(REQUEST, RequestStatus::Pending)])
                .with_units([unit(UNIT, "Reserved")]),
        )
        .await;

        let error = lifecycle
            .attempt_allocation(REQUEST, UNIT)
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "Blood unit 7 is not available (status: Reserved)"
        );
        assert!(lifecycle.repository().backend().calls().is_empty());
    }

    #[tokio::test]
    async fn concurrent_attempt_for_the_same_request_is_refused() {
        let lifecycle = with_pending_request().await;
        let gate = lifecycle.repository().backend().hold_allocations();

        let first = lifecycle.attempt_allocation(REQUEST, UNIT);
        let second = async {
            tokio::task::yield_now().await;
            assert!(lifecycle.is_allocating(REQUEST));
            let second = lifecycle.attempt_allocation(REQUEST, UNIT).await;
            gate.notify_one();
            second
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.unwrap().is_success());
        assert_eq!(
            second.unwrap_err(),
            LifecycleError::AllocationInFlight(REQUEST)
        );
        assert!(!lifecycle.is_allocating(REQUEST));
        let creates = lifecycle
            .repository()
            .backend()
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::CreateAllocation(_)))
            .count();
        assert_eq!(creates, 1);
    }

    #[test_case(RequestStatus::Fulfilled, Action::Edit; "edit fulfilled")]
    #[test_case(RequestStatus::Denied, Action::Edit; "edit denied")]
    #[test_case(RequestStatus::Approved, Action::Edit; "edit approved")]
    #[test_case(RequestStatus::Fulfilled, Action::Delete; "delete fulfilled")]
    #[test_case(RequestStatus::Denied, Action::Delete; "delete denied")]
    #[test_case(RequestStatus::Approved, Action::Delete; "delete approved")]
    #[tokio::test]
    async fn non_pending_requests_cannot_be_edited_or_deleted(status: RequestStatus, action: Action) {
        let lifecycle = lifecycle(FakeBackend::new().with_requests([request(REQUEST, status)])).await;
        let patch = RequestPatch::from_form(None, None, Some(4)).unwrap();

        let error = match action {
            Action::Edit => lifecycle.edit_request(REQUEST, patch).await,
            _ => lifecycle.delete_request(REQUEST).await,
        }
        .unwrap_err();

        assert_eq!(
            error,
            LifecycleError::Refused(crate::domain::ActionRefused {
                request: REQUEST,
                action,
                status,
            })
        );
        assert!(lifecycle.repository().backend().calls().is_empty());
    }

    #[tokio::test]
    async fn check_answers_from_the_cache_alone() {
        let lifecycle = lifecycle(
            FakeBackend::new().with_requests([
                request(REQUEST, RequestStatus::Pending),
                request(RequestId::new(12), RequestStatus::Denied),
            ]),
        )
        .await;

        assert!(lifecycle.check(REQUEST, Action::Delete).await.is_ok());
        assert!(matches!(
            lifecycle.check(RequestId::new(12), Action::Delete).await,
            Err(LifecycleError::Refused(_))
        ));
        assert_eq!(
            lifecycle.check(RequestId::new(99), Action::Delete).await,
            Err(LifecycleError::UnknownRequest(RequestId::new(99)))
        );
        assert!(lifecycle.repository().backend().calls().is_empty());
    }

    #[tokio::test]
    async fn editing_a_denied_request_names_its_status() {
        let lifecycle =
            lifecycle(FakeBackend::new().with_requests([request(REQUEST, RequestStatus::Denied)]))
                .await;
        let patch = RequestPatch::from_form(Some(4), None, None).unwrap();

        let error = lifecycle.edit_request(REQUEST, patch).await.unwrap_err();

        assert_eq!(error.to_string(), "Cannot edit request 11: it is already Denied");
        assert!(
            !lifecycle
                .repository()
                .backend()
                .calls()
                .iter()
                .any(|call| matches!(call, Call::EditRequest(..)))
        );
    }

    #[tokio::test]
    async fn pending_request_is_edited_and_refetched() {
        let lifecycle = with_pending_request().await;
        let patch = RequestPatch::from_form(None, None, Some(5)).unwrap();

        lifecycle.edit_request(REQUEST, patch).await.unwrap();

        assert_eq!(
            lifecycle.repository().backend().writes(),
            vec![Call::EditRequest(REQUEST, patch)]
        );
        let cache = lifecycle.repository().cache().await;
        assert_eq!(cache.request(REQUEST).unwrap().required_units().get(), 5);
        assert!(!cache.is_stale(Resource::Requests));
    }

    #[tokio::test]
    async fn refused_edit_leaves_the_cached_row_alone() {
        let lifecycle = with_pending_request().await;
        let backend = lifecycle.repository().backend();
        backend.fail_updates(ApiError::Status {
            status: 404,
            detail: "Blood bank not found".into(),
            from_body: true,
        });
        backend.fail_lists(true);
        let patch = RequestPatch::from_form(None, Some(9), None).unwrap();

        let error = lifecycle.edit_request(REQUEST, patch).await.unwrap_err();

        assert_eq!(error.to_string(), "Blood bank not found");
        let cache = lifecycle.repository().cache().await;
        assert_eq!(cache.request(REQUEST).unwrap().blood_bank_id().get(), 1);
    }

    #[tokio::test]
    async fn empty_edit_is_refused() {
        let lifecycle = with_pending_request().await;

        let error = lifecycle
            .edit_request(REQUEST, RequestPatch::default())
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "No changes to update");
        assert!(lifecycle.repository().backend().calls().is_empty());
    }

    #[tokio::test]
    async fn open_edit_rechecks_the_backend() {
        let lifecycle = with_pending_request().await;
        lifecycle
            .repository()
            .backend()
            .set_status(REQUEST, RequestStatus::Denied);

        let error = lifecycle.open_edit(REQUEST).await.unwrap_err();

        assert_eq!(error.to_string(), "Cannot edit request 11: it is already Denied");
        assert_eq!(
            lifecycle.repository().backend().calls(),
            vec![Call::ListRequests]
        );
    }

    #[tokio::test]
    async fn open_edit_returns_the_fresh_pending_request() {
        let lifecycle = with_pending_request().await;

        let request = lifecycle.open_edit(REQUEST).await.unwrap();

        assert_eq!(request.id(), REQUEST);
        assert_eq!(request.status(), RequestStatus::Pending);
    }

    #[tokio::test]
    async fn pending_request_is_deleted_as_denied() {
        let lifecycle = with_pending_request().await;

        lifecycle.delete_request(REQUEST).await.unwrap();

        assert_eq!(
            lifecycle.repository().backend().writes(),
            vec![Call::DeleteRequest(REQUEST)]
        );
        assert_eq!(cached_status(&lifecycle, REQUEST).await, RequestStatus::Denied);
    }

    #[test_case(RequestStatus::Pending, ManualStatus::Fulfilled; "pending to fulfilled")]
    #[test_case(RequestStatus::Pending, ManualStatus::Denied; "pending to denied")]
    #[tokio::test]
    async fn manual_status_update(from: RequestStatus, to: ManualStatus) {
        let lifecycle = lifecycle(FakeBackend::new().with_requests([request(REQUEST, from)])).await;

        let status = lifecycle.update_status(REQUEST, to).await.unwrap();

        assert_eq!(status, RequestStatus::from(to));
        assert_eq!(
            lifecycle.repository().backend().writes(),
            vec![Call::SetStatus(REQUEST, status)]
        );
        assert_eq!(cached_status(&lifecycle, REQUEST).await, status);
    }

    #[test_case(RequestStatus::Approved, ManualStatus::Denied; "approved to denied")]
    #[test_case(RequestStatus::Approved, ManualStatus::Fulfilled; "approved to fulfilled")]
    #[test_case(RequestStatus::Fulfilled, ManualStatus::Denied; "fulfilled to denied")]
    #[test_case(RequestStatus::Denied, ManualStatus::Fulfilled; "denied to fulfilled")]
    #[tokio::test]
    async fn manual_update_of_a_settled_request_is_refused_locally(
        from: RequestStatus,
        to: ManualStatus,
    ) {
        let lifecycle = lifecycle(FakeBackend::new().with_requests([request(REQUEST, from)])).await;

        let error = lifecycle.update_status(REQUEST, to).await.unwrap_err();

        assert!(matches!(error, LifecycleError::Refused(_)));
        assert!(lifecycle.repository().backend().calls().is_empty());
        assert_eq!(cached_status(&lifecycle, REQUEST).await, from);
    }
}
