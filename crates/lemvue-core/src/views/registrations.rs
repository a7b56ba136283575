// ── Registration applications ──
//
// Admin review queue. Defaults to unread applications only.

use lemvue_api::types::RegistrationApplicationView;

use super::{Fetch, Fetched, View, filter_query, next_page_query, prev_page_query};
use crate::fetch::{FetchController, FetchRequest};
use crate::guard::{FetchGuard, Slot};
use crate::mutation::{Mutation, Reconcile};
use crate::pagination::Paged;
use crate::params::{RegistrationParams, RouteParams, ViewDefaults};
use crate::prefetch::RouteData;
use crate::request_state::RequestState;
use crate::route::Route;

const APPLICATIONS: Slot = Slot("registration_applications");

#[derive(Debug)]
pub struct RegistrationApplicationsView {
    applications: FetchController<RegistrationParams, Paged<RegistrationApplicationView>>,
    defaults: ViewDefaults,
}

impl Default for RegistrationApplicationsView {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationApplicationsView {
    pub fn new() -> Self {
        Self {
            applications: FetchController::new(APPLICATIONS, FetchGuard::new()),
            defaults: ViewDefaults::default(),
        }
    }

    pub fn applications(&self) -> &RequestState<Paged<RegistrationApplicationView>> {
        self.applications.state()
    }

    pub fn params(&self) -> Option<&RegistrationParams> {
        self.applications.key()
    }

    pub fn next_page_query(&self) -> Option<String> {
        next_page_query(&self.applications, &self.defaults)
    }

    pub fn prev_page_query(&self) -> Option<String> {
        prev_page_query(&self.applications, &self.defaults)
    }

    pub fn filter_query(&self, update: impl FnOnce(&mut RegistrationParams)) -> Option<String> {
        filter_query(&self.applications, &self.defaults, update)
    }

    fn request(&self, req: Option<FetchRequest<RegistrationParams>>) -> Vec<Fetch> {
        req.map(|req| Fetch::Registrations {
            req,
            limit: self.defaults.page_size,
        })
        .into_iter()
        .collect()
    }
}

impl View for RegistrationApplicationsView {
    fn mount(
        &mut self,
        route: &Route,
        defaults: &ViewDefaults,
        prefetched: Option<RouteData>,
    ) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        let params = RegistrationParams::parse(&route.query, defaults);
        let data = match prefetched {
            Some(RouteData::Registrations(page)) => Some(page),
            _ => None,
        };
        let req = self.applications.mount(params, data);
        self.request(req)
    }

    fn route_changed(&mut self, route: &Route, defaults: &ViewDefaults) -> Vec<Fetch> {
        self.defaults = defaults.clone();
        let req = self
            .applications
            .track(RegistrationParams::parse(&route.query, defaults));
        self.request(req)
    }

    fn resolve(&mut self, fetched: Fetched) -> bool {
        match fetched {
            Fetched::Registrations(token, result) => self.applications.resolve(token, result),
            _ => false,
        }
    }

    fn apply(&mut self, mutation: &Mutation) -> bool {
        self.applications.update(|page| page.reconcile(mutation))
    }

    fn is_settled(&self) -> bool {
        self.applications.state().is_terminal()
    }

    fn retry(&mut self) -> Vec<Fetch> {
        let req = self.applications.refetch();
        self.request(req)
    }

    fn unmount(&mut self) {
        self.applications.cancel();
    }
}
