//! Modlog screen: public moderation history.

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, Paragraph};

use lemvue_api::types::ModlogId;
use lemvue_core::{ModlogView, Projection, View};

use super::{PageState, Screen, cycle};
use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::sub_tabs::render_filter;
use crate::widgets::{pager, projection_item, render_state};

pub struct ModlogScreen {
    view: ModlogView,
    page: PageState,
    rows: Vec<Projection<ModlogId>>,
}

impl ModlogScreen {
    pub fn new() -> Self {
        Self {
            view: ModlogView::new(),
            page: PageState::default(),
            rows: Vec::new(),
        }
    }
}

impl Default for ModlogScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ModlogScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.page.handle_movement(key) {
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Enter | KeyCode::Char('l') => self
                .rows
                .get(self.page.viewport.selected())
                .and_then(|row| row.body.target.clone())
                .map(Action::Navigate),
            KeyCode::Char('f') => self
                .page
                .requery(self.view.filter_query(|p| p.action = cycle(p.action))),
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
        let block = self.page.block("Modlog".to_owned());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        if let Some(params) = self.view.params() {
            let spans = render_filter("action", params.action.to_string());
            frame.render_widget(Paragraph::new(Line::from(spans)), header);
        }

        if !render_state(frame, body, self.view.entries(), &self.page.throbber) {
            return;
        }
        if self.rows.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  No moderation actions.", theme::key_hint())),
                body,
            );
            return;
        }

        let now = Utc::now();
        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|row| projection_item(row, false, now))
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
        "modlog"
    }
}

impl Screen for ModlogScreen {
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
        self.page.viewport.set_len(self.rows.len());
    }
}
