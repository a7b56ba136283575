// ── Routed view models ──
//
// One model per routed screen. A model owns the fetch controllers for its
// data slots and reacts to four inputs: mount, route change, a fetch
// result, and a mutation. It never performs I/O itself; it returns
// `Fetch` descriptions that the front end runs with `Fetch::run` and
// feeds back through `View::resolve`.

mod communities;
mod feed;
mod inbox;
mod modlog;
mod multi;
mod post;
mod registrations;

use std::sync::Arc;

pub use communities::CommunityListView;
pub use feed::FeedView;
pub use inbox::InboxView;
pub use modlog::ModlogView;
pub use multi::MultiCommunityListView;
pub use post::PostDetailView;
pub use registrations::RegistrationApplicationsView;

use lemvue_api::types::{
    CommunityView, ModlogEntry, MultiCommunityView, NotificationEntry, PostId, PostView,
    RegistrationApplicationView,
};

use crate::error::RequestError;
use crate::fetch::{FetchController, FetchRequest};
use crate::guard::FetchToken;
use crate::instance::Instance;
use crate::mutation::{Mutation, Thread};
use crate::pagination::{CursorPage, Paged};
use crate::params::{
    CommunityListParams, InboxParams, ModlogParams, MultiCommunityListParams, PostListParams,
    PostParams, RegistrationParams, RouteParams, ViewDefaults,
};
use crate::prefetch::RouteData;
use crate::reconcile::List;
use crate::route::Route;
use crate::tree::build_comment_tree;

// ── Fetch descriptions ───────────────────────────────────────────────

/// A request a view wants run.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch {
    Feed {
        req: FetchRequest<PostListParams>,
        community: Option<String>,
        limit: u32,
    },
    Post {
        req: FetchRequest<PostId>,
    },
    Comments {
        req: FetchRequest<(PostId, PostParams)>,
        limit: u32,
    },
    Modlog {
        req: FetchRequest<ModlogParams>,
        limit: u32,
    },
    Inbox {
        req: FetchRequest<InboxParams>,
        limit: u32,
    },
    Communities {
        req: FetchRequest<CommunityListParams>,
    },
    MultiCommunities {
        req: FetchRequest<MultiCommunityListParams>,
        limit: u32,
    },
    Registrations {
        req: FetchRequest<RegistrationParams>,
        limit: u32,
    },
}

/// A finished request, tagged with the token it was issued under.
#[derive(Debug, Clone)]
pub enum Fetched {
    Feed(FetchToken, Result<Paged<PostView>, RequestError>),
    Post(FetchToken, Result<Arc<PostView>, RequestError>),
    Comments(FetchToken, Result<Thread, RequestError>),
    Modlog(FetchToken, Result<Paged<ModlogEntry>, RequestError>),
    Inbox(FetchToken, Result<Paged<NotificationEntry>, RequestError>),
    Communities(FetchToken, Result<List<CommunityView>, RequestError>),
    MultiCommunities(FetchToken, Result<Paged<MultiCommunityView>, RequestError>),
    Registrations(FetchToken, Result<Paged<RegistrationApplicationView>, RequestError>),
}

impl Fetch {
    pub fn token(&self) -> FetchToken {
        match self {
            Self::Feed { req, .. } => req.token,
            Self::Post { req } => req.token,
            Self::Comments { req, .. } => req.token,
            Self::Modlog { req, .. } => req.token,
            Self::Inbox { req, .. } => req.token,
            Self::Communities { req } => req.token,
            Self::MultiCommunities { req, .. } => req.token,
            Self::Registrations { req, .. } => req.token,
        }
    }

    /// Perform the request. Failures come back classified, never as panics.
    pub async fn run(self, instance: &Instance) -> Fetched {
        match self {
            Self::Feed {
                req,
                community,
                limit,
            } => Fetched::Feed(
                req.token,
                instance
                    .list_posts(community.as_deref(), &req.key, limit)
                    .await
                    .map_err(RequestError::from),
            ),
            Self::Post { req } => Fetched::Post(
                req.token,
                instance
                    .get_post(req.key)
                    .await
                    .map(Arc::new)
                    .map_err(RequestError::from),
            ),
            Self::Comments { req, limit } => {
                let (post_id, params) = req.key;
                Fetched::Comments(
                    req.token,
                    instance
                        .list_comments(post_id, &params, limit)
                        .await
                        .map(|flat| Thread {
                            post_id,
                            comments: build_comment_tree(flat),
                        })
                        .map_err(RequestError::from),
                )
            }
            Self::Modlog { req, limit } => Fetched::Modlog(
                req.token,
                instance
                    .modlog(&req.key, limit)
                    .await
                    .map_err(RequestError::from),
            ),
            Self::Inbox { req, limit } => Fetched::Inbox(
                req.token,
                instance
                    .notifications(&req.key, limit)
                    .await
                    .map_err(RequestError::from),
            ),
            Self::Communities { req } => Fetched::Communities(
                req.token,
                instance
                    .communities(&req.key)
                    .await
                    .map(into_list)
                    .map_err(RequestError::from),
            ),
            Self::MultiCommunities { req, limit } => Fetched::MultiCommunities(
                req.token,
                instance
                    .multi_communities(&req.key, limit)
                    .await
                    .map_err(RequestError::from),
            ),
            Self::Registrations { req, limit } => Fetched::Registrations(
                req.token,
                instance
                    .registration_applications(&req.key, limit)
                    .await
                    .map_err(RequestError::from),
            ),
        }
    }
}

pub(crate) fn into_list<T>(items: Vec<T>) -> List<T> {
    Arc::new(items.into_iter().map(Arc::new).collect())
}

// ── View trait ───────────────────────────────────────────────────────

/// Lifecycle of a routed view model.
pub trait View {
    /// First render. `prefetched` is adopted instead of fetching when the
    /// caller already has data for exactly this route.
    fn mount(
        &mut self,
        route: &Route,
        defaults: &ViewDefaults,
        prefetched: Option<RouteData>,
    ) -> Vec<Fetch>;

    /// Same view, new route. Fetches only for slots whose parameters
    /// actually changed.
    fn route_changed(&mut self, route: &Route, defaults: &ViewDefaults) -> Vec<Fetch>;

    /// Commit a result. `false` when it was stale or meant for another view.
    fn resolve(&mut self, fetched: Fetched) -> bool;

    /// Fold a mutation into every slot. `true` when anything changed.
    fn apply(&mut self, mutation: &Mutation) -> bool;

    /// Every slot has reached success or failure.
    fn is_settled(&self) -> bool;

    /// Fetch every slot again.
    fn retry(&mut self) -> Vec<Fetch>;

    /// Drop in-flight results.
    fn unmount(&mut self);
}

// ── Cursor paging helpers ────────────────────────────────────────────

/// Route parameters that carry a cursor page.
pub trait CursorParams: RouteParams {
    fn page(&self) -> &CursorPage;
    fn set_page(&mut self, page: CursorPage);
}

macro_rules! cursor_params {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CursorParams for $ty {
                fn page(&self) -> &CursorPage {
                    &self.page
                }

                fn set_page(&mut self, page: CursorPage) {
                    self.page = page;
                }
            }
        )*
    };
}

cursor_params!(
    PostListParams,
    ModlogParams,
    InboxParams,
    MultiCommunityListParams,
    RegistrationParams,
);

/// Query string of the page after the current one, when the server
/// returned a next cursor.
pub(crate) fn next_page_query<P: CursorParams, T>(
    controller: &FetchController<P, Paged<T>>,
    defaults: &ViewDefaults,
) -> Option<String> {
    let next = controller.state().success()?.next_page()?;
    controller.next_query(defaults, |p| p.set_page(next))
}

/// Query string of the page before the current one. Never available on
/// the first page.
pub(crate) fn prev_page_query<P: CursorParams, T>(
    controller: &FetchController<P, Paged<T>>,
    defaults: &ViewDefaults,
) -> Option<String> {
    let on_first = controller.key()?.page().is_first();
    let prev = controller.state().success()?.prev_page(on_first)?;
    controller.next_query(defaults, |p| p.set_page(prev))
}

/// Changing any filter starts over from the first page.
pub(crate) fn filter_query<P: CursorParams, T>(
    controller: &FetchController<P, Paged<T>>,
    defaults: &ViewDefaults,
    update: impl FnOnce(&mut P),
) -> Option<String> {
    controller.next_query(defaults, |p| {
        update(p);
        p.set_page(CursorPage::first());
    })
}

#[cfg(test)]
pub(crate) mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;
    use wiremock::MockServer;

    use crate::config::InstanceConfig;
    use crate::instance::Instance;
    use crate::services::Services;
    use crate::storage::MemoryStorage;

    pub(crate) fn instance(server: &MockServer) -> Instance {
        let config = InstanceConfig::new(server.uri().parse().unwrap());
        Instance::new(
            config,
            Services::new(),
            std::sync::Arc::new(MemoryStorage::new()),
        )
        .unwrap()
    }

    pub(crate) fn post_json(id: i32) -> serde_json::Value {
        serde_json::to_value(crate::mutation::tests::post(id, 10, 100)).unwrap()
    }

    pub(crate) fn page_json(ids: std::ops::RangeInclusive<i32>, next: Option<&str>) -> serde_json::Value {
        let items: Vec<_> = ids.map(post_json).collect();
        json!({ "items": items, "next_page": next })
    }
}
