// ── Moderation log ──

use lemvue_api::types::{ModlogEntry, ModlogId};

use super::{Fetch, Fetched, View, filter_query, next_page_query, prev_page_query};
use crate::fetch::{FetchController, FetchRequest};
use crate::guard::{FetchGuard, Slot};
use crate::mutation::Mutation;
use crate::pagination::Paged;
use crate::params::{ModlogParams, RouteParams, ViewDefaults};
use crate::prefetch::RouteData;
use crate::render::{Project, Projection};
use crate::request_state::RequestState;
use crate::route::Route;

const ENTRIES: Slot = Slot("modlog");

#[derive(Debug)]
pub struct ModlogView {
    entries: FetchController<ModlogParams, Paged<ModlogEntry>>,
    defaults: ViewDefaults,
}

impl Default for ModlogView {
    fn default() -> Self {
        Self::new()
    }
}

impl ModlogView {
    pub fn new() -> Self {
        Self {
            entries: FetchController::new(ENTRIES, FetchGuard::new()),
            defaults: ViewDefaults::default(),
        }
    }

    pub fn entries(&self) -> &RequestState<Paged<ModlogEntry>> {
        self.entries.state()
    }

    pub fn params(&self) -> Option<&ModlogParams> {
        self.entries.key()
    }

    /// Display rows for the current page. Unknown action kinds render as
    /// placeholders rather than failing the page.
    pub fn rows(&self) -> Vec<Projection<ModlogId>> {
        self.entries
            .state()
            .success()
            .map(|page| page.items.iter().map(|e| e.project()).collect())
            .unwrap_or_default()
    }

    pub fn next_page_query(&self) -> Option<String> {
        next_page_query(&self.entries, &self.defaults)
    }

    pub fn prev_page_query(&self) -> Option<String> {
        prev_page_query(&self.entries, &self.defaults)
    }

    pub fn filter_query(&self, update: impl FnOnce(&mut ModlogParams)) -> Option<String> {
        filter_query(&self.entries, &self.defaults, update)
    }

    fn request(&self, req: Option<FetchRequest<ModlogParams>>) -> Vec<Fetch> {
        req.map(|req| Fetch::Modlog {
            req,
            limit: self.defaults.page_size,
        })
        .into_iter()
        .collect()
    }
}

impl View for ModlogView {
    fn mount(
        &mut self,
        route: &Route,
        defaults: &ViewDefaults,
        prefetched: Option<RouteData>,
    ) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        let params = ModlogParams::parse(&route.query, defaults);
        let data = match prefetched {
            Some(RouteData::Modlog(page)) => Some(page),
            _ => None,
        };
        let req = self.entries.mount(params, data);
        self.request(req)
    }

    fn route_changed(&mut self, route: &Route, defaults: &ViewDefaults) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        let req = self
            .entries
            .track(ModlogParams::parse(&route.query, defaults));
        self.request(req)
    }

    fn resolve(&mut self, fetched: Fetched) -> bool {
        match fetched {
            Fetched::Modlog(token, result) => self.entries.resolve(token, result),
            _ => false,
        }
    }

    // The log is append-only history; writes elsewhere never edit it.
    fn apply(&mut self, _mutation: &Mutation) -> bool {
        false
    }

    fn is_settled(&self) -> bool {
        self.entries.state().is_terminal()
    }

    fn retry(&mut self) -> Vec<Fetch> {
        let req = self.entries.refetch();
        self.request(req)
    }

    fn unmount(&mut self) {
        self.entries.cancel();
    }
}
