use std::{
    collections::HashSet,
    sync::{Mutex, PoisonError},
};

use crate::domain::RequestId;

/// Requests with an allocation attempt currently running.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    requests: Mutex<HashSet<RequestId>>,
}

impl InFlight {
    /// Marks `request` as busy until the returned guard drops.
    ///
    /// Returns `None` if an attempt for the request is already running.
    pub(crate) fn claim(&self, request: RequestId) -> Option<Claim<'_>> {
        let inserted = self
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(request);
        if !inserted {
            return None;
        }
        Some(Claim {
            owner: self,
            request,
        })
    }

    pub(crate) fn contains(&self, request: RequestId) -> bool {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&request)
    }
}

/// Releases its request when dropped, whatever path the attempt took.
#[derive(Debug)]
pub(crate) struct Claim<'a> {
    owner: &'a InFlight,
    request: RequestId,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.owner
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_refused_until_the_first_drops() {
        let in_flight = InFlight::default();
        let id = RequestId::new(9);

        let claim = in_flight.claim(id);
        assert!(claim.is_some());
        assert!(in_flight.claim(id).is_none());
        assert!(in_flight.claim(RequestId::new(10)).is_some());

        drop(claim);
        assert!(!in_flight.contains(id));
        assert!(in_flight.claim(id).is_some());
    }
}
