//! Post screen: the post on top, its comment tree below.

use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use lemvue_api::types::PostView;
use lemvue_core::{Command, CommentNode, CommentTree, PostDetailView, View, Vote};

use super::{PageState, Screen, cycle};
use crate::action::{Action, Prompt};
use crate::component::Component;
use crate::theme;
use crate::widgets::{age, compact, one_line, render_state, sub_tabs::render_filter};

/// Lines of post body shown above the comments.
const BODY_LINES: u16 = 8;

pub struct PostScreen {
    view: PostDetailView,
    page: PageState,
    /// Comment tree in display order.
    rows: Vec<Arc<CommentNode>>,
}

impl PostScreen {
    pub fn new() -> Self {
        Self {
            view: PostDetailView::new(),
            page: PageState::default(),
            rows: Vec::new(),
        }
    }

    fn post(&self) -> Option<&Arc<PostView>> {
        self.view.post().success()
    }

    fn selected(&self) -> Option<&Arc<CommentNode>> {
        self.rows.get(self.page.viewport.selected())
    }

    fn flatten(tree: &CommentTree, out: &mut Vec<Arc<CommentNode>>) {
        for node in tree.iter() {
            out.push(Arc::clone(node));
            Self::flatten(&node.children, out);
        }
    }

    fn render_post(&self, frame: &mut Frame, area: Rect, post: &PostView) {
        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    format!("{} ", compact(post.post.score)),
                    theme::score(post.my_vote),
                ),
                Span::styled(post.post.name.clone(), theme::title_style()),
            ]),
            Line::from(vec![
                Span::styled(format!("!{}", post.community.name), theme::community()),
                Span::styled(" · ", theme::key_hint()),
                Span::styled(post.creator.label().to_owned(), theme::person()),
                Span::styled(" · ", theme::key_hint()),
                Span::styled(age(post.post.published, Utc::now()), theme::timestamp()),
            ]),
        ];
        if let Some(url) = &post.post.url {
            lines.push(Line::styled(url.to_string(), theme::key_hint()));
        }
        if let Some(body) = &post.post.body {
            lines.push(Line::from(""));
            lines.extend(body.lines().map(|l| Line::styled(l.to_owned(), theme::row())));
        }
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(theme::border_default());
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(block),
            area,
        );
    }

    fn comment_row(node: &CommentNode, width: usize) -> ListItem<'static> {
        let c = &node.view;
        let indent = "  ".repeat(node.depth);
        let gutter = Span::styled(format!("{indent}│ "), theme::depth(node.depth));

        let text = if c.comment.removed {
            Span::styled("[removed]", theme::placeholder())
        } else if c.comment.deleted {
            Span::styled("[deleted]", theme::placeholder())
        } else {
            let room = width.saturating_sub(indent.len() + 2);
            Span::styled(one_line(&c.comment.content, room), theme::row())
        };

        let mut meta = vec![
            gutter.clone(),
            Span::styled(c.creator.label().to_owned(), theme::person()),
            Span::styled(
                format!(" {} ", compact(c.comment.score)),
                theme::score(c.my_vote),
            ),
            Span::styled(age(c.comment.published, Utc::now()), theme::timestamp()),
        ];
        if c.creator_banned_from_community || c.creator.banned {
            meta.push(Span::styled("  banned", theme::error()));
        }
        if c.comment.child_count > 0 && node.children.is_empty() {
            meta.push(Span::styled(
                format!("  +{} more", c.comment.child_count),
                theme::key_hint(),
            ));
        }

        ListItem::new(vec![Line::from(meta), Line::from(vec![gutter, text])])
    }
}

impl Default for PostScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for PostScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.page.handle_movement(key) {
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Char('A' | 'Z') => self.post().map(|p| {
                let pressed = if key.code == KeyCode::Char('A') {
                    Vote::Up
                } else {
                    Vote::Down
                };
                Action::Execute(Command::VotePost {
                    post_id: p.post.id,
                    vote: Vote::toggle(p.my_vote, pressed),
                })
            }),
            KeyCode::Char('a' | 'z') => self.selected().map(|node| {
                let pressed = if key.code == KeyCode::Char('a') {
                    Vote::Up
                } else {
                    Vote::Down
                };
                Action::Execute(Command::VoteComment {
                    comment_id: node.view.comment.id,
                    vote: Vote::toggle(node.view.my_vote, pressed),
                })
            }),
            KeyCode::Char('c') => self.post().map(|p| {
                Action::OpenPrompt(Prompt::Reply {
                    post_id: p.post.id,
                    parent_id: None,
                })
            }),
            KeyCode::Char('r') => self.selected().map(|node| {
                Action::OpenPrompt(Prompt::Reply {
                    post_id: node.view.comment.post_id,
                    parent_id: Some(node.view.comment.id),
                })
            }),
            KeyCode::Char('B') => self.selected().map(|node| {
                Action::Execute(Command::BanFromCommunity {
                    community_id: node.view.community.id,
                    person_id: node.view.creator.id,
                    ban: !node.view.creator_banned_from_community,
                    reason: None,
                    expires_at: None,
                })
            }),
            KeyCode::Char('X') => self.selected().map(|node| {
                Action::Execute(Command::BlockPerson {
                    person_id: node.view.creator.id,
                    block: !node.view.creator_blocked,
                })
            }),
            KeyCode::Char('s') => self
                .page
                .requery(self.view.comments_query(|p| p.sort = cycle(p.sort))),
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
        let block = self.page.block("Post".to_owned());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [post_area, header, body] = Layout::vertical([
            Constraint::Max(BODY_LINES + 4),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .areas(inner);

        if !render_state(frame, post_area, self.view.post(), &self.page.throbber) {
            return;
        }
        if let Some(post) = self.post() {
            self.render_post(frame, post_area, post);
        }

        if let Some(params) = self.view.params() {
            let mut spans = render_filter("comments", params.sort.to_string());
            spans.push(Span::styled(format!("{} shown", self.rows.len()), theme::key_hint()));
            frame.render_widget(Paragraph::new(Line::from(spans)), header);
        }

        if !render_state(frame, body, self.view.thread(), &self.page.throbber) {
            return;
        }
        let width = usize::from(body.width);
        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|node| Self::comment_row(node, width))
            .collect();
        self.page.viewport.set_height(usize::from(body.height / 2));
        let list = List::new(items).highlight_style(theme::row_selected());
        frame.render_stateful_widget(list, body, &mut self.page.viewport.state());
    }

    fn focused(&self) -> bool {
        self.page.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.page.focused = focused;
    }

    fn id(&self) -> &str {
        "post"
    }
}

impl Screen for PostScreen {
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
        let mut rows = Vec::new();
        if let Some(thread) = self.view.thread().success() {
            Self::flatten(&thread.comments, &mut rows);
        }
        self.rows = rows;
        self.page.viewport.set_len(self.rows.len());
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use lemvue_api::types::{CommentId, CommentView, PostId};
    use lemvue_core::tree::build_comment_tree;
    use lemvue_core::{Mutation, RouteData, Thread, ViewDefaults};

    use super::*;
    use crate::screens::tests::{entry, key, post};

    fn comment(id: i32, path: &str) -> CommentView {
        let base = serde_json::to_value(post(1)).unwrap();
        serde_json::from_value(json!({
            "comment": {
                "id": id,
                "creator_id": 20,
                "post_id": 1,
                "content": format!("comment {id}"),
                "path": path,
                "ap_id": format!("https://lemmy.test/comment/{id}"),
                "published": "2025-01-02T00:00:00Z"
            },
            "creator": {
                "id": 20,
                "name": "user20",
                "ap_id": "https://lemmy.test/u/user20",
                "published": "2024-01-01T00:00:00Z"
            },
            "post": base["post"],
            "community": base["community"]
        }))
        .unwrap()
    }

    fn mounted() -> PostScreen {
        let comments = vec![comment(1, "0.1"), comment(2, "0.1.2"), comment(3, "0.3")];
        let data = RouteData::Post {
            post: Arc::new(post(1)),
            thread: Thread {
                post_id: PostId(1),
                comments: build_comment_tree(comments),
            },
        };
        let mut screen = PostScreen::new();
        let fetches = screen.mount(&entry("/post/1"), &ViewDefaults::default(), Some(data));
        assert!(fetches.is_empty());
        screen
    }

    #[test]
    fn tree_flattens_depth_first() {
        let screen = mounted();
        let ids: Vec<(i32, usize)> = screen
            .rows
            .iter()
            .map(|n| (n.view.comment.id.0, n.depth))
            .collect();
        assert_eq!(ids, vec![(1, 0), (2, 1), (3, 0)]);
    }

    #[test]
    fn reply_targets_the_selected_comment() {
        let mut screen = mounted();
        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Char('r'))).unwrap();
        assert!(matches!(
            action,
            Some(Action::OpenPrompt(Prompt::Reply {
                post_id: PostId(1),
                parent_id: Some(CommentId(2)),
            }))
        ));
    }

    #[test]
    fn new_reply_appears_under_its_parent() {
        let mut screen = mounted();
        let reply = comment(4, "0.3.4");
        assert!(screen.apply(&Mutation::CommentCreated(Arc::new(reply))));
        let ids: Vec<i32> = screen.rows.iter().map(|n| n.view.comment.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(screen.rows[3].depth, 1);
        assert_eq!(screen.page.viewport.len(), 4);
    }

    #[test]
    fn comment_sort_navigates_within_the_post() {
        let mut screen = mounted();
        let Some(Action::Navigate(route)) =
            screen.handle_key_event(key(KeyCode::Char('s'))).unwrap()
        else {
            panic!("expected navigation");
        };
        assert_eq!(route.to_string(), "/post/1?sort=Top");
    }
}
