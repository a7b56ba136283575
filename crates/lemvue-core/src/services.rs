// ── Shared services ──
//
// The only state shared between views. Each service is built once per
// program run, handed to whoever needs it, and exposes narrow update
// methods instead of raw fields.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use tokio::sync::watch;
use tracing::debug;

use lemvue_api::endpoints::UnreadCountsResponse;
use lemvue_api::types::{MyUserInfo, PersonId, SiteView};

// ── Session ──────────────────────────────────────────────────────────

/// The signed-in account (if any) and the site it belongs to.
#[derive(Default)]
pub struct Session {
    user: ArcSwapOption<MyUserInfo>,
    site: ArcSwapOption<SiteView>,
}

impl Session {
    pub fn set_user(&self, user: MyUserInfo) {
        debug!(user = %user.local_user_view.person.name, "session user set");
        self.user.store(Some(Arc::new(user)));
    }

    pub fn set_site(&self, site: SiteView) {
        self.site.store(Some(Arc::new(site)));
    }

    pub fn clear(&self) {
        self.user.store(None);
    }

    pub fn user(&self) -> Option<Arc<MyUserInfo>> {
        self.user.load_full()
    }

    pub fn site(&self) -> Option<Arc<SiteView>> {
        self.site.load_full()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.load().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user
            .load_full()
            .is_some_and(|u| u.local_user_view.local_user.admin)
    }

    pub fn person_id(&self) -> Option<PersonId> {
        self.user.load_full().map(|u| u.local_user_view.person.id)
    }

    /// Whether the signed-in user moderates `community`.
    pub fn moderates(&self, community: lemvue_api::types::CommunityId) -> bool {
        self.user
            .load_full()
            .is_some_and(|u| u.moderates.iter().any(|c| c.id == community))
    }
}

// ── Unread counts ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unread {
    pub notifications: i64,
    pub reports: i64,
    pub applications: i64,
}

impl From<UnreadCountsResponse> for Unread {
    fn from(r: UnreadCountsResponse) -> Self {
        Self {
            notifications: r.notification_count,
            reports: r.report_count,
            applications: r.registration_application_count,
        }
    }
}

/// Badge counts, observable through a `watch` channel.
#[derive(Debug)]
pub struct UnreadCounts {
    tx: watch::Sender<Unread>,
}

impl Default for UnreadCounts {
    fn default() -> Self {
        let (tx, _) = watch::channel(Unread::default());
        Self { tx }
    }
}

impl UnreadCounts {
    pub fn get(&self) -> Unread {
        *self.tx.borrow()
    }

    pub fn set(&self, counts: Unread) {
        self.tx.send_replace(counts);
    }

    pub fn decrement_notifications(&self) {
        self.tx.send_modify(|c| c.notifications = (c.notifications - 1).max(0));
    }

    pub fn increment_notifications(&self) {
        self.tx.send_modify(|c| c.notifications += 1);
    }

    pub fn clear_notifications(&self) {
        self.tx.send_modify(|c| c.notifications = 0);
    }

    pub fn decrement_applications(&self) {
        self.tx.send_modify(|c| c.applications = (c.applications - 1).max(0));
    }

    pub fn subscribe(&self) -> watch::Receiver<Unread> {
        self.tx.subscribe()
    }
}

// ── First load ───────────────────────────────────────────────────────

/// Set until the first client-side navigation. While set, the initial
/// route may adopt its prefetched payload instead of fetching.
pub struct FirstLoad(AtomicBool);

impl Default for FirstLoad {
    fn default() -> Self {
        Self(AtomicBool::new(true))
    }
}

impl FirstLoad {
    pub fn is_first_load(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn mark_navigated(&self) {
        self.0.store(false, Ordering::Release);
    }
}

// ── Bundle ───────────────────────────────────────────────────────────

/// Every shared service, cheaply cloneable.
#[derive(Clone, Default)]
pub struct Services {
    pub session: Arc<Session>,
    pub unread: Arc<UnreadCounts>,
    pub first_load: Arc<FirstLoad>,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unread_never_goes_negative() {
        let counts = UnreadCounts::default();
        counts.decrement_notifications();
        assert_eq!(counts.get().notifications, 0);
    }

    #[test]
    fn unread_changes_reach_subscribers() {
        let counts = UnreadCounts::default();
        let mut rx = counts.subscribe();
        counts.set(Unread {
            notifications: 3,
            reports: 0,
            applications: 1,
        });
        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(rx.borrow_and_update().notifications, 3);
        counts.clear_notifications();
        assert_eq!(rx.borrow().notifications, 0);
    }

    #[test]
    fn first_load_flips_once() {
        let flag = FirstLoad::default();
        assert!(flag.is_first_load());
        flag.mark_navigated();
        flag.mark_navigated();
        assert!(!flag.is_first_load());
    }

    #[test]
    fn anonymous_session_is_not_admin() {
        let session = Session::default();
        assert!(!session.is_logged_in());
        assert!(!session.is_admin());
        assert_eq!(session.person_id(), None);
    }
}
