// ── Initial route prefetch ──
//
// Before the first paint the front end loads the data of the route it was
// started on. The result travels as an `InitialPayload` that the mounted
// view adopts instead of fetching. It is adopted at most once, only for
// the exact route it was fetched for, and only while the first-load flag
// is still set.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use lemvue_api::types::{
    CommunityView, ModlogEntry, MultiCommunityView, NotificationEntry, PostView,
    RegistrationApplicationView,
};

use crate::error::CoreError;
use crate::instance::Instance;
use crate::mutation::Thread;
use crate::pagination::Paged;
use crate::params::{
    CommunityListParams, InboxParams, ModlogParams, MultiCommunityListParams, PostListParams,
    PostParams, RegistrationParams, RouteParams, ViewDefaults,
};
use crate::reconcile::List;
use crate::route::{Route, RouteKind};
use crate::services::FirstLoad;
use crate::tree::build_comment_tree;
use crate::views::{
    CommunityListView, FeedView, InboxView, ModlogView, MultiCommunityListView, PostDetailView,
    RegistrationApplicationsView, into_list,
};

/// What a prefetch needs to know about the request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub route: Route,
    pub defaults: ViewDefaults,
}

/// Prefetched data, one variant per routed view.
#[derive(Debug, Clone)]
pub enum RouteData {
    Feed(Paged<PostView>),
    Post { post: Arc<PostView>, thread: Thread },
    Modlog(Paged<ModlogEntry>),
    Inbox(Paged<NotificationEntry>),
    Communities(List<CommunityView>),
    MultiCommunities(Paged<MultiCommunityView>),
    Registrations(Paged<RegistrationApplicationView>),
}

/// A routed view that can load its data ahead of mounting.
pub trait PrefetchRoute {
    fn fetch_initial_data(
        instance: &Instance,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<RouteData, CoreError>> + Send;
}

impl PrefetchRoute for FeedView {
    async fn fetch_initial_data(
        instance: &Instance,
        ctx: &RequestContext,
    ) -> Result<RouteData, CoreError> {
        let community = match &ctx.route.kind {
            RouteKind::Community(name) => Some(name.as_str()),
            _ => None,
        };
        let params = PostListParams::parse(&ctx.route.query, &ctx.defaults);
        let page = instance
            .list_posts(community, &params, ctx.defaults.page_size)
            .await?;
        Ok(RouteData::Feed(page))
    }
}

impl PrefetchRoute for PostDetailView {
    async fn fetch_initial_data(
        instance: &Instance,
        ctx: &RequestContext,
    ) -> Result<RouteData, CoreError> {
        let RouteKind::Post(id) = ctx.route.kind else {
            return Err(CoreError::NotFound {
                what: ctx.route.to_string(),
            });
        };
        let params = PostParams::parse(&ctx.route.query, &ctx.defaults);
        let (post, comments) = tokio::try_join!(
            instance.get_post(id),
            instance.list_comments(id, &params, ctx.defaults.page_size),
        )?;
        Ok(RouteData::Post {
            post: Arc::new(post),
            thread: Thread {
                post_id: id,
                comments: build_comment_tree(comments),
            },
        })
    }
}

impl PrefetchRoute for ModlogView {
    async fn fetch_initial_data(
        instance: &Instance,
        ctx: &RequestContext,
    ) -> Result<RouteData, CoreError> {
        let params = ModlogParams::parse(&ctx.route.query, &ctx.defaults);
        let page = instance.modlog(&params, ctx.defaults.page_size).await?;
        Ok(RouteData::Modlog(page))
    }
}

impl PrefetchRoute for InboxView {
    async fn fetch_initial_data(
        instance: &Instance,
        ctx: &RequestContext,
    ) -> Result<RouteData, CoreError> {
        let params = InboxParams::parse(&ctx.route.query, &ctx.defaults);
        let page = instance
            .notifications(&params, ctx.defaults.page_size)
            .await?;
        Ok(RouteData::Inbox(page))
    }
}

impl PrefetchRoute for CommunityListView {
    async fn fetch_initial_data(
        instance: &Instance,
        ctx: &RequestContext,
    ) -> Result<RouteData, CoreError> {
        let params = CommunityListParams::parse(&ctx.route.query, &ctx.defaults);
        let list = instance.communities(&params).await?;
        Ok(RouteData::Communities(into_list(list)))
    }
}

impl PrefetchRoute for MultiCommunityListView {
    async fn fetch_initial_data(
        instance: &Instance,
        ctx: &RequestContext,
    ) -> Result<RouteData, CoreError> {
        let params = MultiCommunityListParams::parse(&ctx.route.query, &ctx.defaults);
        let page = instance
            .multi_communities(&params, ctx.defaults.page_size)
            .await?;
        Ok(RouteData::MultiCommunities(page))
    }
}

impl PrefetchRoute for RegistrationApplicationsView {
    async fn fetch_initial_data(
        instance: &Instance,
        ctx: &RequestContext,
    ) -> Result<RouteData, CoreError> {
        let params = RegistrationParams::parse(&ctx.route.query, &ctx.defaults);
        let page = instance
            .registration_applications(&params, ctx.defaults.page_size)
            .await?;
        Ok(RouteData::Registrations(page))
    }
}

// ── Payload ──────────────────────────────────────────────────────────

/// Data fetched for the start route, waiting for its view to mount.
#[derive(Debug, Clone)]
pub struct InitialPayload {
    pub route: Route,
    pub data: RouteData,
}

impl InitialPayload {
    /// Hand the data to a view mounting `route`. Callers `take()` the
    /// payload out of its holder first, so it can be adopted only once.
    pub fn adopt(self, route: &Route, first_load: &FirstLoad) -> Option<RouteData> {
        if !first_load.is_first_load() {
            debug!("discarding prefetched data after navigation");
            return None;
        }
        if self.route != *route {
            debug!(prefetched = %self.route, mounted = %route, "prefetched route mismatch");
            return None;
        }
        Some(self.data)
    }
}

/// Fetch the data of `route`'s view. Routes without data yield `None`.
pub async fn prefetch(
    instance: &Instance,
    route: &Route,
) -> Result<Option<InitialPayload>, CoreError> {
    let ctx = RequestContext {
        route: route.clone(),
        defaults: instance.defaults(),
    };
    let data = match route.kind {
        RouteKind::Home | RouteKind::Community(_) => {
            FeedView::fetch_initial_data(instance, &ctx).await?
        }
        RouteKind::Post(_) => PostDetailView::fetch_initial_data(instance, &ctx).await?,
        RouteKind::Inbox => InboxView::fetch_initial_data(instance, &ctx).await?,
        RouteKind::Modlog => ModlogView::fetch_initial_data(instance, &ctx).await?,
        RouteKind::Communities => CommunityListView::fetch_initial_data(instance, &ctx).await?,
        RouteKind::MultiCommunities => {
            MultiCommunityListView::fetch_initial_data(instance, &ctx).await?
        }
        RouteKind::Registrations => {
            RegistrationApplicationsView::fetch_initial_data(instance, &ctx).await?
        }
        RouteKind::OAuthCallback => return Ok(None),
    };
    debug!(route = %route, "prefetched initial route");
    Ok(Some(InitialPayload {
        route: route.clone(),
        data,
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::views::View;
    use crate::views::tests::{instance, page_json};

    fn payload(route: &str) -> InitialPayload {
        InitialPayload {
            route: route.parse().unwrap(),
            data: RouteData::Feed(Paged::new(Vec::new(), None, None)),
        }
    }

    #[test]
    fn adopted_only_for_exact_route() {
        let first_load = FirstLoad::default();
        assert!(payload("/?sort=New")
            .adopt(&"/?sort=Hot".parse().unwrap(), &first_load)
            .is_none());
        assert!(payload("/?sort=New")
            .adopt(&"/?sort=New".parse().unwrap(), &first_load)
            .is_some());
    }

    #[test]
    fn ignored_after_first_navigation() {
        let first_load = FirstLoad::default();
        first_load.mark_navigated();
        assert!(payload("/").adopt(&Route::home(), &first_load).is_none());
    }

    #[tokio::test]
    async fn prefetched_feed_mounts_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/post/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(1..=3, None)))
            .expect(1)
            .mount(&server)
            .await;
        let instance = instance(&server);
        let route = Route::home();

        let mut holder = prefetch(&instance, &route).await.unwrap();
        let data = holder
            .take()
            .and_then(|p| p.adopt(&route, &instance.services().first_load));
        assert!(holder.is_none());

        let mut view = FeedView::new();
        let fetches = view.mount(&route, &instance.defaults(), data);
        assert!(fetches.is_empty());
        assert_eq!(view.posts().success().unwrap().items.len(), 3);
    }

    #[tokio::test]
    async fn oauth_callback_has_no_data() {
        let server = MockServer::start().await;
        let instance = instance(&server);
        let route: Route = "/oauth/callback?code=x&state=y".parse().unwrap();
        assert!(prefetch(&instance, &route).await.unwrap().is_none());
    }
}
