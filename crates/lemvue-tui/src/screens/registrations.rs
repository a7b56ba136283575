//! Registration applications awaiting an admin decision.

use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, Paragraph};

use lemvue_api::types::RegistrationApplicationView;
use lemvue_core::{Command, RegistrationApplicationsView, View};

use super::{PageState, Screen};
use crate::action::{Action, Prompt};
use crate::component::Component;
use crate::theme;
use crate::widgets::{age, one_line, pager, render_state, sub_tabs::render_sub_tabs};

pub struct RegistrationsScreen {
    view: RegistrationApplicationsView,
    page: PageState,
}

impl RegistrationsScreen {
    pub fn new() -> Self {
        Self {
            view: RegistrationApplicationsView::new(),
            page: PageState::default(),
        }
    }

    fn items(&self) -> Option<&Arc<Vec<Arc<RegistrationApplicationView>>>> {
        self.view.applications().success().map(|page| &page.items)
    }

    fn selected(&self) -> Option<&Arc<RegistrationApplicationView>> {
        self.items()?.get(self.page.viewport.selected())
    }

    fn row(app: &RegistrationApplicationView, now: chrono::DateTime<Utc>) -> ListItem<'static> {
        let ra = &app.registration_application;
        let status = match (&app.admin, &ra.deny_reason) {
            (None, _) => Span::styled(" pending", theme::badge()),
            (Some(admin), Some(reason)) => Span::styled(
                format!(" denied by {}: {}", admin.label(), one_line(reason, 40)),
                theme::error(),
            ),
            (Some(admin), None) => Span::styled(
                format!(" approved by {}", admin.label()),
                theme::key_hint(),
            ),
        };
        let title = vec![
            Span::styled(app.creator.label().to_owned(), theme::person()),
            Span::styled(format!("  {}", age(ra.published, now)), theme::timestamp()),
            status,
        ];
        let answer = vec![
            Span::raw("  "),
            Span::styled(one_line(&ra.answer, 100), theme::row()),
        ];
        ListItem::new(vec![Line::from(title), Line::from(answer)])
    }
}

impl Default for RegistrationsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for RegistrationsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.page.handle_movement(key) {
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Char('y') => self.selected().map(|app| {
                Action::Execute(Command::ApproveRegistration {
                    id: app.registration_application.id,
                })
            }),
            KeyCode::Char('d') => self.selected().map(|app| {
                Action::OpenPrompt(Prompt::DenyReason {
                    id: app.registration_application.id,
                })
            }),
            KeyCode::Char('u') => self
                .page
                .requery(self.view.filter_query(|p| p.unread_only = !p.unread_only)),
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
        let block = self.page.block("Registration applications".to_owned());
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
            let line = render_sub_tabs("show", &["All", "Pending"], active);
            frame.render_widget(Paragraph::new(line), header);
        }

        if !render_state(frame, body, self.view.applications(), &self.page.throbber) {
            return;
        }
        let Some(items) = self.items() else {
            return;
        };
        if items.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  No applications.", theme::key_hint())),
                body,
            );
            return;
        }

        let now = Utc::now();
        let rows: Vec<ListItem> = items.iter().map(|app| Self::row(app, now)).collect();
        self.page.viewport.set_height(usize::from(body.height / 2));
        let list = List::new(rows).highlight_style(theme::row_selected());
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
        "registrations"
    }
}

impl Screen for RegistrationsScreen {
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
        self.items().map_or(0, |items| items.len())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use lemvue_api::types::RegistrationApplicationId;
    use lemvue_core::{Paged, RouteData, ViewDefaults};

    use super::*;
    use crate::screens::tests::{entry, key};

    fn application(id: i32) -> RegistrationApplicationView {
        serde_json::from_value(json!({
            "registration_application": {
                "id": id,
                "local_user_id": id,
                "answer": "I like fediverse things",
                "published": "2025-01-01T00:00:00Z"
            },
            "creator_local_user": { "id": id, "person_id": 100 + id },
            "creator": {
                "id": 100 + id,
                "name": format!("applicant{id}"),
                "ap_id": format!("https://lemmy.test/u/applicant{id}"),
                "published": "2025-01-01T00:00:00Z"
            }
        }))
        .unwrap()
    }

    fn mounted() -> RegistrationsScreen {
        let mut screen = RegistrationsScreen::new();
        let page = Paged::new(vec![application(1), application(2)], None, None);
        screen.mount(
            &entry("/registration_applications"),
            &ViewDefaults::default(),
            Some(RouteData::Registrations(page)),
        );
        screen
    }

    #[test]
    fn approve_and_deny_target_the_selection() {
        let mut screen = mounted();
        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        let approve = screen.handle_key_event(key(KeyCode::Char('y'))).unwrap();
        assert!(matches!(
            approve,
            Some(Action::Execute(Command::ApproveRegistration {
                id: RegistrationApplicationId(2)
            }))
        ));
        let deny = screen.handle_key_event(key(KeyCode::Char('d'))).unwrap();
        assert!(matches!(
            deny,
            Some(Action::OpenPrompt(Prompt::DenyReason {
                id: RegistrationApplicationId(2)
            }))
        ));
    }

    #[test]
    fn showing_all_writes_the_non_default() {
        let mut screen = mounted();
        let Some(Action::Navigate(route)) =
            screen.handle_key_event(key(KeyCode::Char('u'))).unwrap()
        else {
            panic!("expected navigation");
        };
        assert_eq!(route.to_string(), "/registration_applications?unread=false");
    }
}
