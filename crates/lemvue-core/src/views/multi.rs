// ── Multi-communities ──

use lemvue_api::types::MultiCommunityView;

use super::{Fetch, Fetched, View, filter_query, next_page_query, prev_page_query};
use crate::fetch::{FetchController, FetchRequest};
use crate::guard::{FetchGuard, Slot};
use crate::mutation::{Mutation, Reconcile};
use crate::pagination::Paged;
use crate::params::{MultiCommunityListParams, RouteParams, ViewDefaults};
use crate::prefetch::RouteData;
use crate::request_state::RequestState;
use crate::route::Route;

const MULTIS: Slot = Slot("multi_communities");

#[derive(Debug)]
pub struct MultiCommunityListView {
    multis: FetchController<MultiCommunityListParams, Paged<MultiCommunityView>>,
    defaults: ViewDefaults,
}

impl Default for MultiCommunityListView {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiCommunityListView {
    pub fn new() -> Self {
        Self {
            multis: FetchController::new(MULTIS, FetchGuard::new()),
            defaults: ViewDefaults::default(),
        }
    }

    pub fn multi_communities(&self) -> &RequestState<Paged<MultiCommunityView>> {
        self.multis.state()
    }

    pub fn params(&self) -> Option<&MultiCommunityListParams> {
        self.multis.key()
    }

    pub fn next_page_query(&self) -> Option<String> {
        next_page_query(&self.multis, &self.defaults)
    }

    pub fn prev_page_query(&self) -> Option<String> {
        prev_page_query(&self.multis, &self.defaults)
    }

    pub fn filter_query(
        &self,
        update: impl FnOnce(&mut MultiCommunityListParams),
    ) -> Option<String> {
        filter_query(&self.multis, &self.defaults, update)
    }

    fn request(&self, req: Option<FetchRequest<MultiCommunityListParams>>) -> Vec<Fetch> {
        req.map(|req| Fetch::MultiCommunities {
            req,
            limit: self.defaults.page_size,
        })
        .into_iter()
        .collect()
    }
}

impl View for MultiCommunityListView {
    fn mount(
        &mut self,
        route: &Route,
        defaults: &ViewDefaults,
        prefetched: Option<RouteData>,
    ) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        let params = MultiCommunityListParams::parse(&route.query, defaults);
        let data = match prefetched {
            Some(RouteData::MultiCommunities(page)) => Some(page),
            _ => None,
        };
        let req = self.multis.mount(params, data);
        self.request(req)
    }

    fn route_changed(&mut self, route: &Route, defaults: &ViewDefaults) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        let req = self
            .multis
            .track(MultiCommunityListParams::parse(&route.query, defaults));
        self.request(req)
    }

    fn resolve(&mut self, fetched: Fetched) -> bool {
        match fetched {
            Fetched::MultiCommunities(token, result) => self.multis.resolve(token, result),
            _ => false,
        }
    }

    fn apply(&mut self, mutation: &Mutation) -> bool {
        self.multis.update(|page| page.reconcile(mutation))
    }

    fn is_settled(&self) -> bool {
        self.multis.state().is_terminal()
    }

    fn retry(&mut self) -> Vec<Fetch> {
        let req = self.multis.refetch();
        self.request(req)
    }

    fn unmount(&mut self) {
        self.multis.cancel();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use lemvue_api::types::SubscribedType;

    fn multi(id: i32) -> MultiCommunityView {
        serde_json::from_value(json!({
            "multi": {
                "id": id,
                "creator_id": 1,
                "name": format!("m{id}"),
                "ap_id": format!("https://lemmy.test/m/m{id}"),
                "published": "2024-01-01T00:00:00Z"
            },
            "owner": {
                "id": 1,
                "name": "owner",
                "ap_id": "https://lemmy.test/u/owner",
                "published": "2024-01-01T00:00:00Z"
            }
        }))
        .unwrap()
    }

    #[test]
    fn followed_filter_round_trips_through_query() {
        let mut view = MultiCommunityListView::new();
        view.mount(
            &"/multi_communities".parse().unwrap(),
            &ViewDefaults::default(),
            None,
        );
        let query = view.filter_query(|p| p.followed_only = true).unwrap();
        assert_eq!(query, "followed=true");

        let fetches = view.route_changed(
            &format!("/multi_communities?{query}").parse().unwrap(),
            &ViewDefaults::default(),
        );
        match fetches.as_slice() {
            [Fetch::MultiCommunities { req, .. }] => assert!(req.key.followed_only),
            other => panic!("unexpected fetches: {other:?}"),
        }
    }

    #[test]
    fn follow_replaces_entry() {
        let mut view = MultiCommunityListView::new();
        let page = Paged::new(vec![multi(1), multi(2)], None, None);
        view.mount(
            &"/multi_communities".parse().unwrap(),
            &ViewDefaults::default(),
            Some(RouteData::MultiCommunities(page)),
        );
        let mut followed = multi(1);
        followed.follow_state = Some(SubscribedType::Subscribed);
        assert!(view.apply(&Mutation::MultiCommunityUpdated(Arc::new(followed))));
        let items = &view.multi_communities().success().unwrap().items;
        assert_eq!(items[0].follow_state, Some(SubscribedType::Subscribed));
    }
}
