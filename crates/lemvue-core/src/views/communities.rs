// ── Community directory ──
//
// Page-number paged. The server never says whether another page exists,
// so a short page disables forward navigation.

use lemvue_api::types::CommunityView;

use super::{Fetch, Fetched, View};
use crate::fetch::{FetchController, FetchRequest};
use crate::guard::{FetchGuard, Slot};
use crate::mutation::{Mutation, Reconcile};
use crate::params::{CommunityListParams, RouteParams, ViewDefaults};
use crate::prefetch::RouteData;
use crate::reconcile::List;
use crate::request_state::RequestState;
use crate::route::Route;

const COMMUNITIES: Slot = Slot("communities");

#[derive(Debug)]
pub struct CommunityListView {
    communities: FetchController<CommunityListParams, List<CommunityView>>,
    defaults: ViewDefaults,
}

impl Default for CommunityListView {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityListView {
    pub fn new() -> Self {
        Self {
            communities: FetchController::new(COMMUNITIES, FetchGuard::new()),
            defaults: ViewDefaults::default(),
        }
    }

    pub fn communities(&self) -> &RequestState<List<CommunityView>> {
        self.communities.state()
    }

    pub fn params(&self) -> Option<&CommunityListParams> {
        self.communities.key()
    }

    pub fn can_go_forward(&self) -> bool {
        match (self.communities.key(), self.communities.state().success()) {
            (Some(params), Some(list)) => params.page.can_go_forward(list.len()),
            _ => false,
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.communities
            .key()
            .is_some_and(|p| p.page.can_go_back())
    }

    pub fn next_page_query(&self) -> Option<String> {
        if !self.can_go_forward() {
            return None;
        }
        self.communities
            .next_query(&self.defaults, |p| p.page = p.page.next())
    }

    pub fn prev_page_query(&self) -> Option<String> {
        if !self.can_go_back() {
            return None;
        }
        self.communities
            .next_query(&self.defaults, |p| p.page = p.page.prev())
    }

    pub fn filter_query(&self, update: impl FnOnce(&mut CommunityListParams)) -> Option<String> {
        self.communities.next_query(&self.defaults, |p| {
            update(p);
            p.page = crate::pagination::OffsetPage::new(1, p.page.limit);
        })
    }

    fn request(req: Option<FetchRequest<CommunityListParams>>) -> Vec<Fetch> {
        req.map(|req| Fetch::Communities { req })
            .into_iter()
            .collect()
    }
}

impl View for CommunityListView {
    fn mount(
        &mut self,
        route: &Route,
        defaults: &ViewDefaults,
        prefetched: Option<RouteData>,
    ) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        let params = CommunityListParams::parse(&route.query, defaults);
        let data = match prefetched {
            Some(RouteData::Communities(list)) => Some(list),
            _ => None,
        };
        Self::request(self.communities.mount(params, data))
    }

    fn route_changed(&mut self, route: &Route, defaults: &ViewDefaults) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        let params = CommunityListParams::parse(&route.query, defaults);
        Self::request(self.communities.track(params))
    }

    fn resolve(&mut self, fetched: Fetched) -> bool {
        match fetched {
            Fetched::Communities(token, result) => self.communities.resolve(token, result),
            _ => false,
        }
    }

    fn apply(&mut self, mutation: &Mutation) -> bool {
        self.communities.update(|list| list.reconcile(mutation))
    }

    fn is_settled(&self) -> bool {
        self.communities.state().is_terminal()
    }

    fn retry(&mut self) -> Vec<Fetch> {
        Self::request(self.communities.refetch())
    }

    fn unmount(&mut self) {
        self.communities.cancel();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::views::into_list;
    use crate::views::tests::instance;
    use lemvue_api::types::SubscribedType;

    fn community(id: i32) -> CommunityView {
        serde_json::from_value(json!({
            "community": {
                "id": id,
                "name": format!("c{id}"),
                "title": format!("Community {id}"),
                "ap_id": format!("https://lemmy.test/c/c{id}"),
                "published": "2024-01-01T00:00:00Z"
            }
        }))
        .unwrap()
    }

    fn defaults() -> ViewDefaults {
        ViewDefaults {
            page_size: 2,
            ..ViewDefaults::default()
        }
    }

    #[test]
    fn short_page_disables_forward() {
        let mut view = CommunityListView::new();
        let list = into_list(vec![community(1)]);
        view.mount(
            &"/communities".parse().unwrap(),
            &defaults(),
            Some(RouteData::Communities(list)),
        );
        assert!(!view.can_go_forward());
        assert!(!view.can_go_back());
        assert!(view.next_page_query().is_none());
    }

    #[test]
    fn full_page_links_to_next() {
        let mut view = CommunityListView::new();
        let list = into_list(vec![community(1), community(2)]);
        view.mount(
            &"/communities?page=2".parse().unwrap(),
            &defaults(),
            Some(RouteData::Communities(list)),
        );
        assert_eq!(view.next_page_query().as_deref(), Some("page=3"));
        assert_eq!(view.prev_page_query().as_deref(), Some(""));
    }

    #[test]
    fn follow_updates_the_row() {
        let mut view = CommunityListView::new();
        let list = into_list(vec![community(1), community(2)]);
        view.mount(
            &"/communities".parse().unwrap(),
            &defaults(),
            Some(RouteData::Communities(list)),
        );
        let mut followed = community(2);
        followed.subscribed = SubscribedType::Subscribed;
        assert!(view.apply(&Mutation::CommunityUpdated(Arc::new(followed))));
        let rows = view.communities().success().unwrap();
        assert_eq!(rows[1].subscribed, SubscribedType::Subscribed);
    }

    #[tokio::test]
    async fn requests_carry_page_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/community/list"))
            .and(query_param("page", "3"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "communities": [
                    serde_json::to_value(community(5)).unwrap()
                ]
            })))
            .mount(&server)
            .await;
        let instance = instance(&server);

        let mut view = CommunityListView::new();
        let fetch = view
            .mount(&"/communities?page=3".parse().unwrap(), &defaults(), None)
            .remove(0);
        assert!(view.resolve(fetch.run(&instance).await));
        assert_eq!(view.communities().success().unwrap().len(), 1);
        assert!(!view.can_go_forward());
        assert!(view.can_go_back());
    }
}
