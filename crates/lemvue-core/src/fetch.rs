// ── Parameter-driven fetch controller ──
//
// One controller per data slot of a view. It remembers the parameters the
// slot was last fetched for, issues a guarded fetch when they change, and
// commits results only for the most recent request. The fetch itself runs
// elsewhere; the controller hands out a `FetchRequest` and later receives
// the result through `resolve`.

use tracing::debug;

use crate::error::RequestError;
use crate::guard::{FetchGuard, FetchToken, Slot};
use crate::params::{RouteParams, ViewDefaults};
use crate::request_state::RequestState;

/// What to fetch, and the token the result must come back with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest<K> {
    pub token: FetchToken,
    pub key: K,
}

#[derive(Debug)]
pub struct FetchController<K, T> {
    slot: Slot,
    guard: FetchGuard,
    key: Option<K>,
    state: RequestState<T>,
}

impl<K: Clone + PartialEq, T> FetchController<K, T> {
    /// Slots of one view share `guard`.
    pub fn new(slot: Slot, guard: FetchGuard) -> Self {
        Self {
            slot,
            guard,
            key: None,
            state: RequestState::Empty,
        }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn state(&self) -> &RequestState<T> {
        &self.state
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// First mount. Prefetched data is adopted as-is and no request goes
    /// out; otherwise a fetch for `key` is issued.
    pub fn mount(&mut self, key: K, prefetched: Option<T>) -> Option<FetchRequest<K>> {
        self.key = Some(key.clone());
        if let Some(data) = prefetched {
            debug!(slot = %self.slot, "adopting prefetched data");
            self.guard.invalidate(self.slot);
            self.state = RequestState::Success(data);
            return None;
        }
        Some(self.issue(key))
    }

    /// Route changed. Fetches only when the tracked key differs.
    pub fn track(&mut self, key: K) -> Option<FetchRequest<K>> {
        if self.key.as_ref() == Some(&key) {
            return None;
        }
        self.key = Some(key.clone());
        Some(self.issue(key))
    }

    /// Fetch the current key again (retry after failure, manual refresh).
    pub fn refetch(&mut self) -> Option<FetchRequest<K>> {
        let key = self.key.clone()?;
        Some(self.issue(key))
    }

    fn issue(&mut self, key: K) -> FetchRequest<K> {
        let token = self.guard.begin_fetch(self.slot);
        self.state = RequestState::Loading;
        FetchRequest { token, key }
    }

    /// Commit a result if `token` is still the slot's current one.
    pub fn resolve(&mut self, token: FetchToken, result: Result<T, RequestError>) -> bool {
        if token.slot() != self.slot {
            return false;
        }
        let state = &mut self.state;
        self.guard
            .commit_if_current(token, result, |r| *state = RequestState::from(r))
    }

    /// Replace successful data in place; see [`RequestState::update`].
    pub fn update(&mut self, f: impl FnOnce(&T) -> Option<T>) -> bool {
        self.state.update(f)
    }

    /// Drop any in-flight result for this slot.
    pub fn cancel(&mut self) {
        self.guard.invalidate(self.slot);
    }
}

impl<P: RouteParams, T> FetchController<P, T> {
    /// Query string for the current parameters with `update` applied.
    pub fn next_query(&self, defaults: &ViewDefaults, update: impl FnOnce(&mut P)) -> Option<String> {
        self.key.as_ref().map(|p| p.with(defaults, update))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::error::ErrorKind;

    const SLOT: Slot = Slot("items");

    fn controller() -> FetchController<u32, &'static str> {
        FetchController::new(SLOT, FetchGuard::new())
    }

    #[test]
    fn prefetched_mount_issues_nothing() {
        let mut c = controller();
        assert!(c.mount(1, Some("embedded")).is_none());
        assert_eq!(c.state().success(), Some(&"embedded"));
    }

    #[test]
    fn mount_without_prefetch_loads() {
        let mut c = controller();
        let req = c.mount(1, None).unwrap();
        assert!(matches!(c.state(), RequestState::Loading));
        assert!(c.resolve(req.token, Ok("one")));
        assert_eq!(c.state().success(), Some(&"one"));
    }

    #[test]
    fn unchanged_key_does_not_refetch() {
        let mut c = controller();
        c.mount(1, Some("x"));
        assert!(c.track(1).is_none());
        assert!(c.track(2).is_some());
    }

    #[test]
    fn last_issued_wins_regardless_of_arrival() {
        let mut c = controller();
        let a = c.mount(1, None).unwrap();
        let b = c.track(2).unwrap();

        assert!(c.resolve(b.token, Ok("b")));
        assert!(!c.resolve(a.token, Ok("a")));
        assert_eq!(c.state().success(), Some(&"b"));
    }

    #[test]
    fn failure_is_terminal_and_retryable() {
        let mut c = controller();
        let req = c.mount(1, None).unwrap();
        c.resolve(req.token, Err(RequestError::new(ErrorKind::Timeout)));
        assert!(c.state().is_terminal());
        assert_eq!(c.state().error().unwrap().kind, ErrorKind::Timeout);

        let retry = c.refetch().unwrap();
        assert_eq!(retry.key, 1);
        assert!(matches!(c.state(), RequestState::Loading));
    }

    #[test]
    fn cancelled_result_is_dropped() {
        let mut c = controller();
        let req = c.mount(1, None).unwrap();
        c.cancel();
        assert!(!c.resolve(req.token, Ok("late")));
        assert!(matches!(c.state(), RequestState::Loading));
    }

    #[test]
    fn tokens_from_other_slots_are_ignored() {
        let guard = FetchGuard::new();
        let mut posts: FetchController<u32, &str> = FetchController::new(Slot("post"), guard.clone());
        let mut comments: FetchController<u32, &str> = FetchController::new(Slot("comments"), guard);
        let p = posts.mount(1, None).unwrap();
        comments.mount(1, None);
        assert!(!comments.resolve(p.token, Ok("wrong slot")));
        assert!(posts.resolve(p.token, Ok("post")));
    }
}
