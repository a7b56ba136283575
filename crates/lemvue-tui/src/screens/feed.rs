//! Feed screen: front page or one community's posts.

use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, Paragraph};

use lemvue_api::types::{PostView, SubscribedType};
use lemvue_core::{Command, FeedView, Route, RouteKind, View, Vote};

use super::{PageState, Screen, cycle};
use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::{age, compact, pager, render_state, sub_tabs::render_filter};

pub struct FeedScreen {
    view: FeedView,
    page: PageState,
}

impl FeedScreen {
    pub fn new() -> Self {
        Self {
            view: FeedView::new(),
            page: PageState::default(),
        }
    }

    fn posts(&self) -> Option<&Arc<Vec<Arc<PostView>>>> {
        self.view.posts().success().map(|page| &page.items)
    }

    fn selected(&self) -> Option<&Arc<PostView>> {
        self.posts()?.get(self.page.viewport.selected())
    }

    fn vote(&self, pressed: Vote) -> Option<Action> {
        let post = self.selected()?;
        Some(Action::Execute(Command::VotePost {
            post_id: post.post.id,
            vote: Vote::toggle(post.my_vote, pressed),
        }))
    }

    fn row(post: &PostView, now: chrono::DateTime<Utc>) -> ListItem<'static> {
        let title_style = if post.read {
            theme::row_dim()
        } else {
            theme::row()
        };
        let mut title = vec![
            Span::styled(
                format!("{:>6} ", compact(post.post.score)),
                theme::score(post.my_vote),
            ),
            Span::styled(post.post.name.clone(), title_style),
        ];
        if post.post.featured_local || post.post.featured_community {
            title.push(Span::styled("  pinned", theme::community()));
        }
        if post.post.locked {
            title.push(Span::styled("  locked", theme::error()));
        }
        if post.post.nsfw {
            title.push(Span::styled("  nsfw", theme::error()));
        }

        let mut meta = vec![
            Span::raw("       "),
            Span::styled(format!("!{}", post.community.name), theme::community()),
            Span::styled(" · ", theme::key_hint()),
            Span::styled(post.creator.label().to_owned(), theme::person()),
            Span::styled(" · ", theme::key_hint()),
            Span::styled(age(post.post.published, now), theme::timestamp()),
            Span::styled(
                format!(" · {} comments", compact(post.post.comments)),
                theme::key_hint(),
            ),
        ];
        if post.creator_banned_from_community || post.creator.banned {
            meta.push(Span::styled("  banned", theme::error()));
        }

        ListItem::new(vec![Line::from(title), Line::from(meta)])
    }
}

impl Default for FeedScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for FeedScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.page.handle_movement(key) {
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Enter | KeyCode::Char('l') => self
                .selected()
                .map(|p| Action::Navigate(Route::new(RouteKind::Post(p.post.id)))),
            KeyCode::Char('c') => self.selected().map(|p| {
                Action::Navigate(Route::new(RouteKind::Community(p.community.name.clone())))
            }),
            KeyCode::Char('a') => self.vote(Vote::Up),
            KeyCode::Char('z') => self.vote(Vote::Down),
            KeyCode::Char('r') => self.selected().map(|p| {
                Action::Execute(Command::MarkPostsRead {
                    post_ids: vec![p.post.id],
                    read: !p.read,
                })
            }),
            KeyCode::Char('f') => self.selected().map(|p| {
                Action::Execute(Command::FollowCommunity {
                    community_id: p.community.id,
                    follow: p.subscribed == SubscribedType::NotSubscribed,
                })
            }),
            KeyCode::Char('B') => self.selected().map(|p| {
                Action::Execute(Command::BanFromCommunity {
                    community_id: p.community.id,
                    person_id: p.creator.id,
                    ban: !p.creator_banned_from_community,
                    reason: None,
                    expires_at: None,
                })
            }),
            KeyCode::Char('X') => self.selected().map(|p| {
                Action::Execute(Command::BlockPerson {
                    person_id: p.creator.id,
                    block: !p.creator_blocked,
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
        let title = match self.view.community() {
            Some(name) => format!("!{name}"),
            None => "Feed".to_owned(),
        };
        let block = self.page.block(title);
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
            if self.view.community().is_none() {
                spans.extend(render_filter("listing", params.listing.to_string()));
            }
            frame.render_widget(Paragraph::new(Line::from(spans)), header);
        }

        if !render_state(frame, body, self.view.posts(), &self.page.throbber) {
            return;
        }
        let Some(posts) = self.posts() else {
            return;
        };

        let now = Utc::now();
        let items: Vec<ListItem> = posts.iter().map(|p| Self::row(p, now)).collect();
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
        "feed"
    }
}

impl Screen for FeedScreen {
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
        self.posts().map_or(0, |posts| posts.len())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use lemvue_api::types::PostId;
    use lemvue_core::{Paged, RouteData, ViewDefaults};

    use super::*;
    use crate::screens::tests::{entry, feed_page, key, post};

    fn mounted(raw: &str) -> FeedScreen {
        let mut screen = FeedScreen::new();
        screen.mount(&entry(raw), &ViewDefaults::default(), Some(feed_page(1..=5)));
        screen
    }

    #[test]
    fn enter_opens_the_selected_post() {
        let mut screen = mounted("/");
        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        let Some(Action::Navigate(route)) = action else {
            panic!("expected navigation");
        };
        assert_eq!(route.kind, RouteKind::Post(PostId(2)));
    }

    #[test]
    fn vote_toggles_off_an_existing_upvote() {
        let mut screen = FeedScreen::new();
        let mut upvoted = post(1);
        upvoted.my_vote = Some(1);
        screen.mount(
            &entry("/"),
            &ViewDefaults::default(),
            Some(RouteData::Feed(Paged::new(vec![upvoted], None, None))),
        );
        let action = screen.handle_key_event(key(KeyCode::Char('a'))).unwrap();
        assert!(matches!(
            action,
            Some(Action::Execute(Command::VotePost { vote: Vote::Clear, .. }))
        ));
    }

    #[test]
    fn sort_key_navigates_to_the_filtered_route() {
        let mut screen = mounted("/c/rust");
        let action = screen.handle_key_event(key(KeyCode::Char('s'))).unwrap();
        let Some(Action::Navigate(route)) = action else {
            panic!("expected navigation");
        };
        assert_eq!(route.to_string(), "/c/rust?sort=Hot");
    }

    #[test]
    fn paging_is_inert_without_cursors() {
        let mut screen = mounted("/");
        assert!(screen.handle_key_event(key(KeyCode::Char(']'))).unwrap().is_none());
        assert!(screen.handle_key_event(key(KeyCode::Char('['))).unwrap().is_none());
    }

    #[test]
    fn mutations_update_rows() {
        let mut screen = mounted("/");
        let mut read = post(3);
        read.read = true;
        let changed = screen.apply(&lemvue_core::Mutation::PostUpdated(Arc::new(read)));
        assert!(changed);
        assert!(screen.posts().unwrap()[2].read);
        assert_eq!(screen.row_count(), 5);
    }
}
