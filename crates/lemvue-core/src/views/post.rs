// ── Post detail ──
//
// Two slots sharing one guard: the post itself and its comment thread.
// The comment slot re-fetches on sort or focus changes while the post
// slot stays put.

use std::sync::Arc;

use lemvue_api::types::{PostId, PostView};

use super::{Fetch, Fetched, View};
use crate::fetch::FetchController;
use crate::guard::{FetchGuard, Slot};
use crate::mutation::{Mutation, Reconcile, Thread};
use crate::params::{PostParams, RouteParams, ViewDefaults};
use crate::prefetch::RouteData;
use crate::request_state::RequestState;
use crate::route::{Route, RouteKind};

const POST: Slot = Slot("post");
const COMMENTS: Slot = Slot("comments");

#[derive(Debug)]
pub struct PostDetailView {
    post: FetchController<PostId, Arc<PostView>>,
    comments: FetchController<(PostId, PostParams), Thread>,
    guard: FetchGuard,
    defaults: ViewDefaults,
}

impl Default for PostDetailView {
    fn default() -> Self {
        Self::new()
    }
}

impl PostDetailView {
    pub fn new() -> Self {
        let guard = FetchGuard::new();
        Self {
            post: FetchController::new(POST, guard.clone()),
            comments: FetchController::new(COMMENTS, guard.clone()),
            guard,
            defaults: ViewDefaults::default(),
        }
    }

    pub fn post(&self) -> &RequestState<Arc<PostView>> {
        self.post.state()
    }

    pub fn thread(&self) -> &RequestState<Thread> {
        self.comments.state()
    }

    pub fn params(&self) -> Option<&PostParams> {
        self.comments.key().map(|(_, params)| params)
    }

    /// Query string with a new comment sort or focus.
    pub fn comments_query(&self, update: impl FnOnce(&mut PostParams)) -> Option<String> {
        self.params().map(|p| p.with(&self.defaults, update))
    }

    fn fetch_post(req: Option<crate::fetch::FetchRequest<PostId>>) -> Option<Fetch> {
        req.map(|req| Fetch::Post { req })
    }

    fn fetch_comments(
        &self,
        req: Option<crate::fetch::FetchRequest<(PostId, PostParams)>>,
    ) -> Option<Fetch> {
        req.map(|req| Fetch::Comments {
            req,
            limit: self.defaults.page_size,
        })
    }
}

fn post_id_of(route: &Route) -> Option<PostId> {
    match route.kind {
        RouteKind::Post(id) => Some(id),
        _ => None,
    }
}

impl View for PostDetailView {
    fn mount(
        &mut self,
        route: &Route,
        defaults: &ViewDefaults,
        prefetched: Option<RouteData>,
    ) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        let Some(id) = post_id_of(route) else {
            return Vec::new();
        };
        let params = PostParams::parse(&route.query, defaults);
        let (post, thread) = match prefetched {
            Some(RouteData::Post { post, thread }) if post.post.id == id => {
                (Some(post), Some(thread))
            }
            _ => (None, None),
        };
        let post_req = self.post.mount(id, post);
        let comments_req = self.comments.mount((id, params), thread);
        Self::fetch_post(post_req)
            .into_iter()
            .chain(self.fetch_comments(comments_req))
            .collect()
    }

    fn route_changed(&mut self, route: &Route, defaults: &ViewDefaults) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        let Some(id) = post_id_of(route) else {
            return Vec::new();
        };
        let params = PostParams::parse(&route.query, defaults);
        let post_req = self.post.track(id);
        let comments_req = self.comments.track((id, params));
        Self::fetch_post(post_req)
            .into_iter()
            .chain(self.fetch_comments(comments_req))
            .collect()
    }

    fn resolve(&mut self, fetched: Fetched) -> bool {
        match fetched {
            Fetched::Post(token, result) => self.post.resolve(token, result),
            Fetched::Comments(token, result) => self.comments.resolve(token, result),
            _ => false,
        }
    }

    fn apply(&mut self, mutation: &Mutation) -> bool {
        let post = self.post.update(|p| p.reconcile(mutation));
        let comments = self.comments.update(|t| t.reconcile(mutation));
        post || comments
    }

    fn is_settled(&self) -> bool {
        self.post.state().is_terminal() && self.comments.state().is_terminal()
    }

    fn retry(&mut self) -> Vec<Fetch> {
        let post_req = self.post.refetch();
        let comments_req = self.comments.refetch();
        Self::fetch_post(post_req)
            .into_iter()
            .chain(self.fetch_comments(comments_req))
            .collect()
    }

    fn unmount(&mut self) {
        self.guard.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::ErrorKind;
    use crate::mutation::tests::post;
    use crate::tree::tests::comment;
    use crate::tree::{build_comment_tree, flatten};
    use crate::views::tests::{instance, post_json};
    use lemvue_api::types::CommentId;

    fn route() -> Route {
        "/post/1".parse().unwrap()
    }

    fn prefetched() -> RouteData {
        RouteData::Post {
            post: Arc::new(post(1, 10, 100)),
            thread: Thread {
                post_id: PostId(1),
                comments: build_comment_tree(vec![comment(5, "0.5", 10)]),
            },
        }
    }

    #[test]
    fn mount_fetches_both_slots() {
        let mut view = PostDetailView::new();
        let fetches = view.mount(&route(), &ViewDefaults::default(), None);
        assert_eq!(fetches.len(), 2);
        assert!(!view.is_settled());
    }

    #[test]
    fn sort_change_refetches_only_comments() {
        let mut view = PostDetailView::new();
        view.mount(&route(), &ViewDefaults::default(), Some(prefetched()));
        let fetches = view.route_changed(&"/post/1?sort=New".parse().unwrap(), &ViewDefaults::default());
        assert!(matches!(fetches.as_slice(), [Fetch::Comments { .. }]));
        assert!(view.post().success().is_some());
    }

    #[test]
    fn settles_only_when_both_slots_finish() {
        let mut view = PostDetailView::new();
        let fetches = view.mount(&route(), &ViewDefaults::default(), None);
        let post_token = fetches[0].token();
        let comments_token = fetches[1].token();

        assert!(view.resolve(Fetched::Post(post_token, Ok(Arc::new(post(1, 10, 100))))));
        assert!(!view.is_settled());
        assert!(view.resolve(Fetched::Comments(
            comments_token,
            Err(crate::error::RequestError::new(ErrorKind::Network))
        )));
        assert!(view.is_settled());
        assert_eq!(view.retry().len(), 2);
    }

    #[test]
    fn unmount_drops_results_for_both_slots() {
        let mut view = PostDetailView::new();
        let fetches = view.mount(&route(), &ViewDefaults::default(), None);
        let post_token = fetches[0].token();
        let comments_token = fetches[1].token();

        view.unmount();

        assert!(!view.resolve(Fetched::Post(post_token, Ok(Arc::new(post(1, 10, 100))))));
        assert!(!view.resolve(Fetched::Comments(
            comments_token,
            Ok(Thread {
                post_id: PostId(1),
                comments: build_comment_tree(Vec::new()),
            })
        )));
        assert!(view.post().success().is_none());
    }

    #[test]
    fn new_reply_lands_in_thread() {
        let mut view = PostDetailView::new();
        view.mount(&route(), &ViewDefaults::default(), Some(prefetched()));

        let reply = Arc::new(comment(6, "0.5.6", 11));
        assert!(view.apply(&Mutation::CommentCreated(reply)));
        let nodes = flatten(&view.thread().success().unwrap().comments);
        let ids: Vec<CommentId> = nodes.iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec![CommentId(5), CommentId(6)]);
    }

    #[test]
    fn ban_reaches_post_and_comments() {
        let mut view = PostDetailView::new();
        view.mount(&route(), &ViewDefaults::default(), Some(prefetched()));

        assert!(view.apply(&Mutation::CreatorBanned {
            person: lemvue_api::types::PersonId(10),
            community: None,
            banned: true,
        }));
        assert!(view.post().success().unwrap().creator.banned);
        let nodes = flatten(&view.thread().success().unwrap().comments);
        assert!(nodes[0].view.creator.banned);
    }

    #[tokio::test]
    async fn fetches_build_a_comment_tree() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/post"))
            .and(query_param("id", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "post_view": post_json(1)
            })))
            .mount(&server)
            .await;
        let comments: Vec<_> = [comment(2, "0.2", 10), comment(3, "0.2.3", 11)]
            .iter()
            .map(|c| serde_json::to_value(c).unwrap())
            .collect();
        Mock::given(method("GET"))
            .and(path("/api/v4/comment/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": comments })))
            .mount(&server)
            .await;
        let instance = instance(&server);

        let mut view = PostDetailView::new();
        for fetch in view.mount(&route(), &ViewDefaults::default(), None) {
            assert!(view.resolve(fetch.run(&instance).await));
        }
        assert!(view.is_settled());
        let thread = view.thread().success().unwrap();
        assert_eq!(thread.comments.len(), 1);
        assert_eq!(thread.comments[0].children[0].id(), CommentId(3));
    }
}
