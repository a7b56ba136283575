//! Inbox screen: replies, mentions, messages, and mod actions.

use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, Paragraph};

use lemvue_api::types::NotificationId;
use lemvue_core::{Command, InboxView, Projection, UnreadCounts, View};

use super::{PageState, Screen, cycle_optional};
use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::sub_tabs::{render_filter, render_sub_tabs};
use crate::widgets::{pager, projection_item, render_state};

pub struct InboxScreen {
    view: InboxView,
    page: PageState,
    rows: Vec<Projection<NotificationId>>,
    unread_ids: Vec<NotificationId>,
}

impl InboxScreen {
    pub fn new(unread: Arc<UnreadCounts>) -> Self {
        Self {
            view: InboxView::new(unread),
            page: PageState::default(),
            rows: Vec::new(),
            unread_ids: Vec::new(),
        }
    }

    fn selected(&self) -> Option<&Projection<NotificationId>> {
        self.rows.get(self.page.viewport.selected())
    }

    fn is_unread(&self, id: NotificationId) -> bool {
        self.unread_ids.contains(&id)
    }
}

impl Component for InboxScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.page.handle_movement(key) {
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Enter | KeyCode::Char('l') => self
                .selected()
                .and_then(|row| row.body.target.clone())
                .map(Action::Navigate),
            KeyCode::Char('m') => self.selected().map(|row| {
                Action::Execute(Command::MarkNotificationRead {
                    id: row.id,
                    read: self.is_unread(row.id),
                })
            }),
            KeyCode::Char('M') if !self.unread_ids.is_empty() => {
                Some(Action::Execute(Command::MarkAllNotificationsRead))
            }
            KeyCode::Char('u') => self
                .page
                .requery(self.view.filter_query(|p| p.unread_only = !p.unread_only)),
            KeyCode::Char('t') => self
                .page
                .requery(self.view.filter_query(|p| p.kind = cycle_optional(p.kind))),
            KeyCode::Char(']' | 'n') => self.page.requery(self.view.next_page_query()),
            KeyCode::Char('[' | 'p') => self.page.requery(self.view.prev_page_query()),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::Tick = action {
            self.page.throbber.calc_next();
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let unread = self.view.unread().notifications;
        let block = self.page.block(format!("Inbox ({unread} unread)"));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        if let Some(params) = self.view.params() {
            let active = usize::from(params.unread_only);
            let mut spans = render_sub_tabs("show", &["All", "Unread"], active).spans;
            spans.push(Span::raw("   "));
            spans.extend(render_filter(
                "kind",
                params.kind.map_or_else(|| "Any".to_owned(), |k| k.to_string()),
            ));
            frame.render_widget(Paragraph::new(Line::from(spans)), header);
        }

        if !render_state(frame, body, self.view.notifications(), &self.page.throbber) {
            return;
        }
        if self.rows.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  Nothing here.", theme::key_hint())),
                body,
            );
            return;
        }

        let now = Utc::now();
        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|row| projection_item(row, !self.is_unread(row.id), now))
            .collect();
        self.page.viewport.set_height(usize::from(body.height / 2));
        let list = List::new(items).highlight_style(theme::row_selected());
        frame.render_stateful_widget(list, body, &mut self.page.viewport.state());

        frame.render_widget(
            Paragraph::new(pager(
                self.view.prev_page_query().is_some(),
                self.view.next_page_query().is_some(),
            )),
            footer,
        );
    }

    fn focused(&self) -> bool {
        self.page.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.page.focused = focused;
    }

    fn id(&self) -> &str {
        "inbox"
    }
}

impl Screen for InboxScreen {
    fn page(&self) -> &PageState {
        &self.page
    }

    fn page_mut(&mut self) -> &mut PageState {
        &mut self.page
    }

    fn view(&self) -> &dyn View {
        &self.view
    }

    fn view_mut(&mut self) -> &mut dyn View {
        &mut self.view
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn sync(&mut self) {
        self.rows = self.view.rows();
        self.unread_ids = self.view.unread_ids();
        self.page.viewport.set_len(self.rows.len());
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use lemvue_api::types::NotificationEntry;
    use lemvue_core::{Mutation, Paged, RouteData, ViewDefaults};

    use super::*;
    use crate::screens::tests::{entry, key};

    fn notification(id: i32, read: bool) -> NotificationEntry {
        serde_json::from_value(json!({
            "id": id,
            "published": "2025-01-01T00:00:00Z",
            "read": read,
            "type_": "Poke"
        }))
        .unwrap()
    }

    fn mounted() -> InboxScreen {
        let mut screen = InboxScreen::new(Arc::new(UnreadCounts::default()));
        let page = Paged::new(vec![notification(1, false), notification(2, true)], None, None);
        screen.mount(
            &entry("/inbox"),
            &ViewDefaults::default(),
            Some(RouteData::Inbox(page)),
        );
        screen
    }

    #[test]
    fn mark_toggles_by_read_state() {
        let mut screen = mounted();
        let first = screen.handle_key_event(key(KeyCode::Char('m'))).unwrap();
        assert!(matches!(
            first,
            Some(Action::Execute(Command::MarkNotificationRead { read: true, .. }))
        ));
        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        let second = screen.handle_key_event(key(KeyCode::Char('m'))).unwrap();
        assert!(matches!(
            second,
            Some(Action::Execute(Command::MarkNotificationRead { read: false, .. }))
        ));
    }

    #[test]
    fn mark_all_is_inert_once_everything_is_read() {
        let mut screen = mounted();
        assert!(screen.apply(&Mutation::AllNotificationsRead));
        assert!(screen.handle_key_event(key(KeyCode::Char('M'))).unwrap().is_none());
    }

    #[test]
    fn unknown_kinds_render_as_placeholders() {
        let screen = mounted();
        assert_eq!(screen.rows.len(), 2);
        assert!(screen.rows.iter().all(|row| !row.recognized));
        assert!(screen.rows[0].body.target.is_none());
    }

    #[test]
    fn filters_route_through_the_query() {
        let mut screen = mounted();
        let Some(Action::Navigate(route)) =
            screen.handle_key_event(key(KeyCode::Char('u'))).unwrap()
        else {
            panic!("expected navigation");
        };
        assert_eq!(route.to_string(), "/inbox?unread=true");
        let Some(Action::Navigate(route)) =
            screen.handle_key_event(key(KeyCode::Char('t'))).unwrap()
        else {
            panic!("expected navigation");
        };
        assert_eq!(route.to_string(), "/inbox?kind=Reply");
    }
}
