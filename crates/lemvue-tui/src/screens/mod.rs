//! Routed screens. Each wraps one `lemvue-core` view model and adds a
//! list viewport with scroll restoration.

pub mod communities;
pub mod feed;
pub mod inbox;
pub mod modlog;
pub mod multi;
pub mod post;
pub mod registrations;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders};
use strum::IntoEnumIterator;
use throbber_widgets_tui::ThrobberState;

use lemvue_core::{
    Fetch, Fetched, Mutation, Route, RouteData, ScrollRestorer, ScrollStore, View, ViewDefaults,
};

use crate::action::Action;
use crate::component::Component;
use crate::navigator::Entry;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::ListViewport;

/// Build every screen, keyed by id.
pub fn create_screens(services: &lemvue_core::Services) -> Vec<(ScreenId, Box<dyn Screen>)> {
    vec![
        (ScreenId::Feed, Box::new(feed::FeedScreen::new())),
        (ScreenId::Post, Box::new(post::PostScreen::new())),
        (
            ScreenId::Inbox,
            Box::new(inbox::InboxScreen::new(services.unread.clone())),
        ),
        (ScreenId::Modlog, Box::new(modlog::ModlogScreen::new())),
        (
            ScreenId::Communities,
            Box::new(communities::CommunitiesScreen::new()),
        ),
        (
            ScreenId::MultiCommunities,
            Box::new(multi::MultiCommunitiesScreen::new()),
        ),
        (
            ScreenId::Registrations,
            Box::new(registrations::RegistrationsScreen::new()),
        ),
    ]
}

// ── Page state ────────────────────────────────────────────────────────

/// What every routed screen keeps besides its view model.
#[derive(Debug, Default)]
pub struct PageState {
    /// Route of the mounted history entry.
    pub route: Option<Route>,
    pub viewport: ListViewport,
    pub restorer: ScrollRestorer,
    pub throbber: ThrobberState,
    pub focused: bool,
}

impl PageState {
    /// Navigate to the mounted route with a different query string.
    pub fn requery(&self, query: Option<String>) -> Option<Action> {
        let route = self.route.as_ref()?;
        query.map(|q| Action::Navigate(route.with_query_string(&q)))
    }

    pub fn block(&self, title: String) -> Block<'static> {
        Block::default()
            .title(Line::styled(format!(" {title} "), theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            })
    }

    /// j/k, arrows, g/G, Ctrl-d/Ctrl-u, PageUp/PageDown.
    pub fn handle_movement(&mut self, key: KeyEvent) -> bool {
        let vp = &mut self.viewport;
        match (key.modifiers, key.code) {
            (_, KeyCode::Char('j') | KeyCode::Down) => vp.move_by(1),
            (_, KeyCode::Char('k') | KeyCode::Up) => vp.move_by(-1),
            (_, KeyCode::Char('g') | KeyCode::Home) => vp.first(),
            (_, KeyCode::Char('G') | KeyCode::End) => vp.last(),
            (KeyModifiers::CONTROL, KeyCode::Char('d')) | (_, KeyCode::PageDown) => {
                vp.move_by(vp.page());
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) | (_, KeyCode::PageUp) => {
                vp.move_by(-vp.page());
            }
            _ => return false,
        }
        true
    }
}

// ── Screen lifecycle ──────────────────────────────────────────────────

/// A component bound to one routed view.
///
/// The app calls `mount` when a history entry for this screen becomes
/// current, `route_changed` when the entry changes but the screen stays,
/// and `leave` + `unmount` when another screen takes over.
pub trait Screen: Component {
    fn page(&self) -> &PageState;
    fn page_mut(&mut self) -> &mut PageState;
    fn view(&self) -> &dyn View;
    fn view_mut(&mut self) -> &mut dyn View;

    /// Rows in the list body, recomputed after data changes.
    fn row_count(&self) -> usize;

    /// Rebuild derived rows; screens with cached rows override this.
    fn sync(&mut self) {
        let rows = self.row_count();
        self.page_mut().viewport.set_len(rows);
    }

    fn mount(
        &mut self,
        entry: &Entry,
        defaults: &ViewDefaults,
        prefetched: Option<RouteData>,
    ) -> Vec<Fetch> {
        let fetches = self.view_mut().mount(&entry.route, defaults, prefetched);
        let page = self.page_mut();
        page.route = Some(entry.route.clone());
        page.restorer.on_mount(entry.key.clone());
        self.sync();
        fetches
    }

    fn route_changed(&mut self, entry: &Entry, defaults: &ViewDefaults) -> Vec<Fetch> {
        let fetches = self.view_mut().route_changed(&entry.route, defaults);
        let page = self.page_mut();
        page.route = Some(entry.route.clone());
        page.restorer.on_mount(entry.key.clone());
        self.sync();
        fetches
    }

    /// Persist the offset of the entry being left and scroll to the top.
    fn leave(&mut self, store: &ScrollStore) {
        let page = self.page_mut();
        page.restorer.on_unmount(store, &mut page.viewport);
    }

    fn unmount(&mut self) {
        self.view_mut().unmount();
        self.page_mut().route = None;
    }

    fn resolve(&mut self, fetched: Fetched) -> bool {
        let committed = self.view_mut().resolve(fetched);
        if committed {
            self.sync();
        }
        committed
    }

    fn apply(&mut self, mutation: &Mutation) -> bool {
        let changed = self.view_mut().apply(mutation);
        if changed {
            self.sync();
        }
        changed
    }

    fn retry(&mut self) -> Vec<Fetch> {
        self.view_mut().retry()
    }

    /// Restore the stored offset once every slot has settled.
    fn settle(&mut self, store: &ScrollStore) -> bool {
        let settled = self.view().is_settled();
        let page = self.page_mut();
        page.restorer.on_update(settled, store, &mut page.viewport)
    }

    fn user_input(&mut self) {
        self.page_mut().restorer.on_user_input();
    }
}

/// The value after `current`, wrapping.
pub fn cycle<T: IntoEnumIterator + PartialEq + Copy>(current: T) -> T {
    let all: Vec<T> = T::iter().collect();
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(idx + 1) % all.len()]
}

/// `None` → first → ... → last → `None`.
pub fn cycle_optional<T: IntoEnumIterator + PartialEq + Copy>(current: Option<T>) -> Option<T> {
    let mut all = T::iter();
    match current {
        None => all.next(),
        Some(value) => all.skip_while(|v| *v != value).nth(1),
    }
}
