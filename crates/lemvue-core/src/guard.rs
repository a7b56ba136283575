// ── Fetch token guard ──
//
// Generation counter per data slot. Every fetch captures a fresh token;
// a result is committed only while its token is still the slot's current
// one, so a slow response from a superseded request can never overwrite
// newer data.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::trace;

/// Name of one independently fetched piece of view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(pub &'static str);

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Opaque marker for one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchToken {
    slot: Slot,
    id: u64,
}

impl FetchToken {
    pub fn slot(&self) -> Slot {
        self.slot
    }
}

/// Tracks the current token for every slot of one view.
///
/// Cheaply cloneable; clones share the same slot table so a spawned task
/// can check currency before doing post-processing work.
#[derive(Clone, Default)]
pub struct FetchGuard {
    inner: Arc<GuardInner>,
}

/// Token ids are unique across every guard, so a result can never be
/// committed by a view that did not issue it.
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

#[derive(Default)]
struct GuardInner {
    current: DashMap<Slot, u64>,
}

impl FetchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh token and make it current for `slot`.
    pub fn begin_fetch(&self, slot: Slot) -> FetchToken {
        let id = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        self.inner.current.insert(slot, id);
        trace!(%slot, id, "fetch issued");
        FetchToken { slot, id }
    }

    pub fn is_current(&self, token: FetchToken) -> bool {
        self.inner
            .current
            .get(&token.slot)
            .is_some_and(|id| *id == token.id)
    }

    /// Invoke `apply(result)` only if `token` is still current for its slot.
    /// Superseded results are dropped silently. Returns whether `apply` ran.
    pub fn commit_if_current<R>(
        &self,
        token: FetchToken,
        result: R,
        apply: impl FnOnce(R),
    ) -> bool {
        if self.is_current(token) {
            apply(result);
            true
        } else {
            trace!(slot = %token.slot, id = token.id, "stale fetch result dropped");
            false
        }
    }

    /// Forget the current token for `slot`; any in-flight result for it
    /// will be dropped.
    pub fn invalidate(&self, slot: Slot) {
        self.inner.current.remove(&slot);
    }

    /// Forget every slot, for views whose slots share one guard.
    pub fn invalidate_all(&self) {
        self.inner.current.clear();
    }
}

impl fmt::Debug for FetchGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchGuard")
            .field("slots", &self.inner.current.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSTS: Slot = Slot("posts");
    const COMMENTS: Slot = Slot("comments");

    #[test]
    fn later_token_wins_regardless_of_resolution_order() {
        let guard = FetchGuard::new();
        let mut state = "empty";

        let a = guard.begin_fetch(POSTS);
        let b = guard.begin_fetch(POSTS);

        // B resolves first, then A.
        assert!(guard.commit_if_current(b, "b", |r| state = r));
        assert!(!guard.commit_if_current(a, "a", |r| state = r));
        assert_eq!(state, "b");
    }

    #[test]
    fn stale_result_dropped_even_when_it_arrives_first() {
        let guard = FetchGuard::new();
        let mut state = "empty";

        let a = guard.begin_fetch(POSTS);
        let b = guard.begin_fetch(POSTS);

        assert!(!guard.commit_if_current(a, "a", |r| state = r));
        assert_eq!(state, "empty");
        assert!(guard.commit_if_current(b, "b", |r| state = r));
        assert_eq!(state, "b");
    }

    #[test]
    fn slots_are_independent() {
        let guard = FetchGuard::new();
        let posts = guard.begin_fetch(POSTS);
        let comments = guard.begin_fetch(COMMENTS);
        assert!(guard.is_current(posts));
        assert!(guard.is_current(comments));
    }

    #[test]
    fn invalidate_drops_in_flight_results() {
        let guard = FetchGuard::new();
        let token = guard.begin_fetch(POSTS);
        guard.invalidate_all();
        assert!(!guard.commit_if_current(token, (), |()| {}));
    }

    #[test]
    fn tokens_are_not_shared_between_guards() {
        let one = FetchGuard::new();
        let other = FetchGuard::new();
        let token = one.begin_fetch(POSTS);
        other.begin_fetch(POSTS);
        assert!(!other.is_current(token));
    }

    #[test]
    fn clones_share_slot_table() {
        let guard = FetchGuard::new();
        let shared = guard.clone();
        let first = guard.begin_fetch(POSTS);
        let _second = shared.begin_fetch(POSTS);
        assert!(!guard.is_current(first));
    }
}
