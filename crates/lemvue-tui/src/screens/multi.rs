//! Multi-community directory.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, Paragraph};

use lemvue_api::types::{MultiCommunityView, SubscribedType};
use lemvue_core::{Command, MultiCommunityListView, View};

use super::{PageState, Screen};
use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::{compact, one_line, pager, render_state, sub_tabs::render_sub_tabs};

pub struct MultiCommunitiesScreen {
    view: MultiCommunityListView,
    page: PageState,
}

impl MultiCommunitiesScreen {
    pub fn new() -> Self {
        Self {
            view: MultiCommunityListView::new(),
            page: PageState::default(),
        }
    }

    fn items(&self) -> Option<&Arc<Vec<Arc<MultiCommunityView>>>> {
        self.view.multi_communities().success().map(|page| &page.items)
    }

    fn selected(&self) -> Option<&Arc<MultiCommunityView>> {
        self.items()?.get(self.page.viewport.selected())
    }

    fn row(m: &MultiCommunityView) -> ListItem<'static> {
        let following = matches!(m.follow_state, Some(SubscribedType::Subscribed));
        let mut title = vec![
            Span::styled(m.multi.name.clone(), theme::community()),
            Span::styled(
                format!("  {}", m.multi.title.as_deref().unwrap_or_default()),
                theme::row(),
            ),
        ];
        match m.follow_state {
            Some(SubscribedType::Subscribed) => {
                title.push(Span::styled(" following", theme::badge()));
            }
            Some(SubscribedType::Pending) => {
                title.push(Span::styled(" pending", theme::key_hint()));
            }
            _ => {}
        }

        let mut meta = vec![
            Span::styled("  by ", theme::key_hint()),
            Span::styled(m.owner.label().to_owned(), theme::person()),
            Span::styled(
                format!(" · {} communities", compact(m.communities)),
                theme::key_hint(),
            ),
        ];
        if let Some(desc) = &m.multi.description {
            let style = if following {
                theme::row()
            } else {
                theme::row_dim()
            };
            meta.push(Span::styled(format!(" · {}", one_line(desc, 60)), style));
        }
        ListItem::new(vec![Line::from(title), Line::from(meta)])
    }
}

impl Default for MultiCommunitiesScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for MultiCommunitiesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.page.handle_movement(key) {
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Char('f') => self.selected().map(|m| {
                Action::Execute(Command::FollowMultiCommunity {
                    multi_community_id: m.multi.id,
                    follow: m.follow_state.is_none_or(|s| s == SubscribedType::NotSubscribed),
                })
            }),
            KeyCode::Char('o') => self
                .page
                .requery(self.view.filter_query(|p| p.followed_only = !p.followed_only)),
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
        let block = self.page.block("Multi-communities".to_owned());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        if let Some(params) = self.view.params() {
            let line = render_sub_tabs(
                "show",
                &["All", "Followed"],
                usize::from(params.followed_only),
            );
            frame.render_widget(Paragraph::new(line), header);
        }

        if !render_state(frame, body, self.view.multi_communities(), &self.page.throbber) {
            return;
        }
        let Some(items) = self.items() else {
            return;
        };

        let rows: Vec<ListItem> = items.iter().map(|m| Self::row(m)).collect();
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
        "multi_communities"
    }
}

impl Screen for MultiCommunitiesScreen {
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
