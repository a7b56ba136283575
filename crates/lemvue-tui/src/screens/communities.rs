//! Community directory, paged by page number.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, Paragraph};

use lemvue_api::types::{CommunityView, SubscribedType};
use lemvue_core::{Command, CommunityListView, Route, RouteKind, View};

use super::{PageState, Screen, cycle};
use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::{compact, one_line, pager, render_state, sub_tabs::render_filter};

pub struct CommunitiesScreen {
    view: CommunityListView,
    page: PageState,
}

impl CommunitiesScreen {
    pub fn new() -> Self {
        Self {
            view: CommunityListView::new(),
            page: PageState::default(),
        }
    }

    fn selected(&self) -> Option<&Arc<CommunityView>> {
        self.view
            .communities()
            .success()?
            .get(self.page.viewport.selected())
    }

    fn row(c: &CommunityView) -> ListItem<'static> {
        let badge = match c.subscribed {
            SubscribedType::Subscribed => Span::styled(" joined", theme::badge()),
            SubscribedType::Pending => Span::styled(" pending", theme::key_hint()),
            SubscribedType::NotSubscribed => Span::raw(""),
        };
        let mut title = vec![
            Span::styled(format!("!{}", c.community.name), theme::community()),
            Span::styled(format!("  {}", c.community.title), theme::row()),
            badge,
        ];
        if c.community.nsfw {
            title.push(Span::styled("  nsfw", theme::error()));
        }
        if c.blocked {
            title.push(Span::styled("  blocked", theme::error()));
        }

        let mut meta = vec![Span::styled(
            format!(
                "  {} subscribers · {} posts",
                compact(c.community.subscribers),
                compact(c.community.posts)
            ),
            theme::key_hint(),
        )];
        if let Some(desc) = &c.community.description {
            meta.push(Span::styled(
                format!(" · {}", one_line(desc, 60)),
                theme::row_dim(),
            ));
        }
        ListItem::new(vec![Line::from(title), Line::from(meta)])
    }
}

impl Default for CommunitiesScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for CommunitiesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.page.handle_movement(key) {
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Enter | KeyCode::Char('l') => self.selected().map(|c| {
                Action::Navigate(Route::new(RouteKind::Community(c.community.name.clone())))
            }),
            KeyCode::Char('f') => self.selected().map(|c| {
                Action::Execute(Command::FollowCommunity {
                    community_id: c.community.id,
                    follow: c.subscribed == SubscribedType::NotSubscribed,
                })
            }),
            KeyCode::Char('s') => self
                .page
                .requery(self.view.filter_query(|p| p.sort = cycle(p.sort))),
            KeyCode::Char('t') => self
                .page
                .requery(self.view.filter_query(|p| p.listing = cycle(p.listing))),
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
        let block = self.page.block("Communities".to_owned());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        if let Some(params) = self.view.params() {
            let mut spans = render_filter("sort", params.sort.to_string());
            spans.extend(render_filter("listing", params.listing.to_string()));
            spans.extend(render_filter("page", params.page.page.to_string()));
            frame.render_widget(Paragraph::new(Line::from(spans)), header);
        }

        if !render_state(frame, body, self.view.communities(), &self.page.throbber) {
            return;
        }
        let Some(list) = self.view.communities().success() else {
            return;
        };

        let items: Vec<ListItem> = list.iter().map(|c| Self::row(c)).collect();
        self.page.viewport.set_height(usize::from(body.height / 2));
        let widget = List::new(items).highlight_style(theme::row_selected());
        frame.render_stateful_widget(widget, body, &mut self.page.viewport.state());

        frame.render_widget(
            Paragraph::new(pager(self.view.can_go_back(), self.view.can_go_forward())),
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
        "communities"
    }
}

impl Screen for CommunitiesScreen {
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
        self.view.communities().success().map_or(0, |list| list.len())
    }
}
