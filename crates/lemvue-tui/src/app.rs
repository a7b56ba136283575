//! Application core: event loop, history, screen lifecycle, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use lemvue_core::{
    Command, ConnectionState, InitialPayload, Instance, RequestError, Route, RouteData, RouteKind,
    ScrollRestorer, ScrollStore, Unread,
};

use crate::action::{Action, Notification, NotificationLevel, Prompt};
use crate::event::{Event, EventReader};
use crate::loader::Loader;
use crate::navigator::Navigator;
use crate::screen::ScreenId;
use crate::screens::{Screen, create_screens};
use crate::theme;
use crate::tui::Tui;

/// How long a toast stays up.
const TOAST_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    instance: Instance,
    loader: Loader,
    navigator: Navigator,
    /// Every routed screen. Only `active` is mounted.
    screens: HashMap<ScreenId, Box<dyn Screen>>,
    active: ScreenId,
    scroll_store: ScrollStore,
    /// Data fetched before the first paint, adopted once by the start view.
    payload: Option<InitialPayload>,
    unread: Unread,
    connection: ConnectionState,
    help_visible: bool,
    /// Open prompt and the text typed so far.
    prompt: Option<(Prompt, String)>,
    notification: Option<(Notification, Instant)>,
    running: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Stops the background watchers.
    cancel: CancellationToken,
}

impl App {
    pub fn new(instance: Instance, start: Route, payload: Option<InitialPayload>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens = create_screens(instance.services()).into_iter().collect();
        let scroll_store = ScrollStore::new(instance.storage().clone());
        let loader = Loader::new(instance.clone(), action_tx.clone());

        Self {
            instance,
            loader,
            navigator: Navigator::new(start),
            screens,
            active: ScreenId::default(),
            scroll_store,
            payload,
            unread: Unread::default(),
            connection: ConnectionState::Disconnected,
            help_visible: false,
            prompt: None,
            notification: None,
            running: true,
            action_tx,
            action_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        let (width, height) = tui.size().unwrap_or((80, 24));
        debug!(width, height, "terminal ready");

        self.start();
        self.loader.spawn_watchers(self.cancel.clone());

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(action) = self.handle_mouse_event(mouse)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Paste(text) => self.paste(&text),
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            // Drain everything queued, including background results
            while let Ok(action) = self.action_rx.try_recv() {
                let render = matches!(action, Action::Render);
                self.process_action(action)?;
                if render {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.cancel.cancel();
        events.stop();
        ScrollRestorer::on_unload(&self.scroll_store);
        tui.exit();
        info!("event loop ended");
        Ok(())
    }

    // ── History ──────────────────────────────────────────────────────

    /// Mount the start entry. An OAuth callback start route is finished in
    /// the background while the feed shows.
    fn start(&mut self) {
        let route = self.navigator.current().route.clone();
        if route.kind == RouteKind::OAuthCallback {
            self.payload = None;
            self.oauth_callback(&route);
            self.navigator.replace(Route::home());
        }
        let prefetched = self.payload.take().and_then(|payload| {
            payload.adopt(
                &self.navigator.current().route,
                &self.instance.services().first_load,
            )
        });
        self.show_current(prefetched);
    }

    /// Bring the current history entry on screen.
    fn show_current(&mut self, prefetched: Option<RouteData>) {
        let entry = self.navigator.current().clone();
        let Some(target) = ScreenId::for_route(&entry.route) else {
            return;
        };
        let defaults = self.instance.defaults();

        if target != self.active {
            if let Some(old) = self.screens.get_mut(&self.active) {
                old.unmount();
                old.set_focused(false);
            }
            self.active = target;
        }

        let Some(screen) = self.screens.get_mut(&target) else {
            return;
        };
        if !screen.focused() {
            screen.set_focused(true);
        }
        let fetches = if screen.page().route.is_some() {
            screen.route_changed(&entry, &defaults)
        } else {
            screen.mount(&entry, &defaults, prefetched)
        };
        screen.settle(&self.scroll_store);
        debug!(
            route = %entry.route,
            screen = screen.id(),
            fetches = fetches.len(),
            "showing entry"
        );
        self.loader.fetch(fetches);
    }

    /// Leave the current entry, move through history, show the result.
    fn go(&mut self, step: impl FnOnce(&mut Navigator)) {
        self.instance.services().first_load.mark_navigated();
        if let Some(screen) = self.screens.get_mut(&self.active) {
            screen.leave(&self.scroll_store);
        }
        step(&mut self.navigator);
        self.show_current(None);
    }

    fn navigate(&mut self, route: Route) {
        if route.kind == RouteKind::OAuthCallback {
            self.oauth_callback(&route);
            return;
        }
        self.go(|nav| {
            nav.push(route);
        });
    }

    // ── Sign-in ──────────────────────────────────────────────────────

    /// Drop the session for this run. Views keep what they loaded until
    /// their next fetch.
    fn sign_out(&mut self) {
        if !self.instance.services().session.is_logged_in() {
            self.notify(Notification::info("Not signed in"));
            return;
        }
        self.instance.logout();
        self.unread = Unread::default();
        self.notify(Notification::info("Signed out"));
    }

    fn begin_oauth(&mut self) {
        let providers = self.instance.oauth_providers();
        let Some(provider) = providers.first() else {
            self.notify(Notification::info("This instance offers no OAuth sign-in"));
            return;
        };
        let redirect = self.navigator.current().route.to_string();
        match self.instance.begin_oauth(provider.id, &redirect, Utc::now()) {
            Ok(url) => {
                info!(provider = %provider.display_name, "oauth handshake started");
                let prompt = Prompt::OAuthCallback {
                    authorize_url: url.to_string(),
                };
                self.prompt = Some((prompt, String::new()));
            }
            Err(e) => {
                self.notify(Notification::error(RequestError::from(e).user_message()));
            }
        }
    }

    /// Hand the callback's `code` and `state` to the loader.
    fn oauth_callback(&mut self, route: &Route) {
        match (route.query.get("code"), route.query.get("state")) {
            (Some(code), Some(state)) => {
                self.loader
                    .complete_oauth(code.to_owned(), state.to_owned());
                self.notify(Notification::info("Signing in\u{2026}"));
            }
            _ => {
                let message = route
                    .query
                    .get("error")
                    .map_or("Sign-in was cancelled", |_| "The provider refused sign-in");
                self.notify(Notification::error(message));
            }
        }
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Global keys first, then the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // An open prompt captures all input
        if let Some((prompt, input)) = &mut self.prompt {
            return Ok(match key.code {
                KeyCode::Esc => Some(Action::ClosePrompt),
                KeyCode::Enter if input.trim().is_empty() && !prompt.allows_empty() => None,
                KeyCode::Enter => Some(Action::SubmitPrompt(prompt.clone(), input.clone())),
                KeyCode::Backspace => {
                    input.pop();
                    None
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    input.push(c);
                    None
                }
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        if self.notification.is_some() && key.code == KeyCode::Esc {
            return Ok(Some(Action::DismissNotification));
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
                return Ok(Some(Action::Quit));
            }
            (_, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (_, KeyCode::Char(':')) => return Ok(Some(Action::OpenPrompt(Prompt::GoTo))),
            (_, KeyCode::Char('O')) => return Ok(Some(Action::BeginOAuth)),
            (_, KeyCode::Char('S')) => return Ok(Some(Action::SignOut)),
            (_, KeyCode::Char('R')) => return Ok(Some(Action::Retry)),
            (_, KeyCode::Char('L')) => return Ok(Some(Action::Forward)),
            (_, KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h')) => {
                return Ok(Some(Action::Back));
            }
            (_, KeyCode::Char(c @ '1'..='9')) => {
                let tab = c
                    .to_digit(10)
                    .and_then(|d| u8::try_from(d).ok())
                    .and_then(ScreenId::from_number);
                if let Some(tab) = tab {
                    return Ok(tab.home_route().map(Action::Navigate));
                }
            }
            (_, KeyCode::Tab) => return Ok(self.active.next().home_route().map(Action::Navigate)),
            (_, KeyCode::BackTab) => {
                return Ok(self.active.prev().home_route().map(Action::Navigate));
            }
            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active) {
            screen.user_input();
            return screen.handle_key_event(key);
        }
        Ok(None)
    }

    /// Mouse wheel scrolls the active list.
    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.prompt.is_some() || self.help_visible {
            return Ok(None);
        }
        let Some(screen) = self.screens.get_mut(&self.active) else {
            return Ok(None);
        };
        let code = match mouse.kind {
            MouseEventKind::ScrollDown => KeyCode::Down,
            MouseEventKind::ScrollUp => KeyCode::Up,
            _ => return Ok(None),
        };
        screen.user_input();
        screen.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// Pasted text goes into the open prompt, if any.
    fn paste(&mut self, text: &str) {
        if let Some((_, input)) = &mut self.prompt {
            input.push_str(text.trim_end_matches(['\r', '\n']));
        }
    }

    fn submit_prompt(&mut self, prompt: &Prompt, text: &str) -> Result<()> {
        let text = text.trim();
        match prompt {
            Prompt::GoTo => match text.parse::<Route>() {
                Ok(route) => self.action_tx.send(Action::Navigate(route))?,
                Err(e) => self.notify(Notification::error(e.to_string())),
            },
            Prompt::Reply { post_id, parent_id } => {
                self.action_tx.send(Action::Execute(Command::CreateComment {
                    post_id: *post_id,
                    parent_id: *parent_id,
                    content: text.to_owned(),
                }))?;
            }
            Prompt::DenyReason { id } => {
                let reason = (!text.is_empty()).then(|| text.to_owned());
                self.action_tx
                    .send(Action::Execute(Command::DenyRegistration { id: *id, reason }))?;
            }
            Prompt::OAuthCallback { .. } => match callback_route(text) {
                Some(route) => self.oauth_callback(&route),
                None => self.notify(Notification::error("That is not an OAuth callback URL")),
            },
        }
        Ok(())
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    fn process_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Render => {}

            Action::Resize(w, h) => debug!(w, h, "terminal resized"),

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > TOAST_TTL)
                {
                    self.notification = None;
                }
                if let Some(screen) = self.screens.get_mut(&self.active) {
                    if let Some(follow_up) = screen.update(&Action::Tick)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            Action::Navigate(route) => self.navigate(route),

            Action::Back => {
                if self.navigator.can_go_back() {
                    self.go(|nav| {
                        nav.back();
                    });
                }
            }

            Action::Forward => {
                if self.navigator.can_go_forward() {
                    self.go(|nav| {
                        nav.forward();
                    });
                }
            }

            Action::Retry => {
                if let Some(screen) = self.screens.get_mut(&self.active) {
                    let fetches = screen.retry();
                    self.loader.fetch(fetches);
                }
            }

            // Results for screens no longer mounted fail their token check
            Action::Fetched(fetched) => {
                if let Some(screen) = self.screens.get_mut(&self.active) {
                    if screen.resolve(*fetched) {
                        screen.settle(&self.scroll_store);
                    }
                }
            }

            Action::Execute(cmd) => {
                debug!(command = cmd.name(), "executing");
                self.loader.execute(cmd);
            }

            // Every screen folds the write in, mounted or not
            Action::Mutated(mutation) => {
                for screen in self.screens.values_mut() {
                    screen.apply(&mutation);
                }
                self.notify(Notification::success(mutation.summary()));
            }

            Action::UnreadChanged(unread) => self.unread = unread,

            Action::ConnectionChanged(state) => {
                debug!(?state, "connection changed");
                self.connection = state;
            }

            Action::BeginOAuth => self.begin_oauth(),

            Action::SignOut => self.sign_out(),

            Action::OAuthFinished(Ok(redirect)) => {
                let route: Route = redirect.parse().unwrap_or_else(|_| Route::home());
                self.notify(Notification::success("Signed in"));
                self.go(|nav| {
                    nav.replace(route);
                });
            }

            Action::OAuthFinished(Err(message)) => self.notify(Notification::error(message)),

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::OpenPrompt(prompt) => self.prompt = Some((prompt, String::new())),

            Action::ClosePrompt => self.prompt = None,

            Action::SubmitPrompt(prompt, text) => {
                self.prompt = None;
                self.submit_prompt(&prompt, &text)?;
            }

            Action::Notify(notification) => self.notify(notification),

            Action::DismissNotification => self.notification = None,
        }
        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Layout: [screen content] [tab bar] [status bar]
        let [content, tabs, status] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get(&self.active) {
            screen.render(frame, content);
        }
        self.render_tab_bar(frame, tabs);
        self.render_status_bar(frame, status);

        // Overlays, last is topmost
        if let Some((notification, _)) = &self.notification {
            render_notification(frame, area, notification);
        }
        if let Some((prompt, input)) = &self.prompt {
            render_prompt(frame, area, prompt, input);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::TABS
            .iter()
            .map(|&id| {
                let style = if id == self.active {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                let mut spans = vec![Span::styled(
                    format!(" {} {}", id.number().unwrap_or_default(), id.label()),
                    style,
                )];
                let count = match id {
                    ScreenId::Inbox => self.unread.notifications,
                    ScreenId::Registrations => self.unread.applications,
                    _ => 0,
                };
                if count > 0 {
                    spans.push(Span::styled(format!(" {count}"), theme::badge()));
                }
                spans.push(Span::raw(" "));
                Line::from(spans)
            })
            .collect();

        let selected = ScreenId::TABS.iter().position(|&s| s == self.active);
        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(selected);
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let (symbol, label, color) = match self.connection {
            ConnectionState::Connected => ("●", "connected", theme::GREEN),
            ConnectionState::Connecting => ("◐", "connecting", theme::YELLOW),
            ConnectionState::Disconnected => ("○", "offline", theme::MUTED),
            ConnectionState::Failed => ("✗", "unreachable", theme::RED),
        };

        let mut spans = vec![
            Span::raw(" "),
            Span::styled(format!("{symbol} {label}"), Style::default().fg(color)),
        ];
        match self.instance.services().session.user() {
            Some(user) => spans.push(Span::styled(
                format!("  @{}", user.local_user_view.person.name),
                theme::person(),
            )),
            None => spans.push(Span::styled("  anonymous", theme::key_hint())),
        }

        let back = if self.navigator.can_go_back() { "‹" } else { " " };
        let forward = if self.navigator.can_go_forward() { "›" } else { " " };
        spans.push(Span::styled(
            format!("  {back} {} {forward}", self.navigator.current().route),
            theme::row(),
        ));
        spans.push(Span::styled(
            " │ ? help  : go  O sign in  q quit",
            theme::key_hint(),
        ));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// The route in a pasted callback URL, or `None` when it is not one.
fn callback_route(raw: &str) -> Option<Route> {
    let route = match Url::parse(raw) {
        Ok(url) => {
            let route: Route = url.path().parse().ok()?;
            route.with_query_string(url.query().unwrap_or_default())
        }
        Err(_) => raw.parse().ok()?,
    };
    (route.kind == RouteKind::OAuthCallback).then_some(route)
}

/// A rect of at most `width` x `height` centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(area.x + x, area.y + y, width, height)
}

fn overlay_block(title: &'static str) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK))
}

fn render_prompt(frame: &mut Frame, area: Rect, prompt: &Prompt, input: &str) {
    let mut lines = Vec::new();
    if let Prompt::OAuthCallback { authorize_url } = prompt {
        lines.push(Line::styled(
            "Open this URL in a browser, sign in, then paste the address you land on:",
            theme::key_hint(),
        ));
        lines.push(Line::styled(authorize_url.clone(), theme::community()));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![
        Span::styled("> ", theme::key_hint_key()),
        Span::styled(input.to_owned(), theme::row()),
        Span::styled("█", Style::default().fg(theme::CYAN)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Enter ", theme::key_hint_key()),
        Span::styled("submit  ", theme::key_hint()),
        Span::styled("Esc ", theme::key_hint_key()),
        Span::styled("cancel", theme::key_hint()),
    ]));

    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(4);
    let rect = centered(area, 80, height);
    frame.render_widget(Clear, rect);
    let block = overlay_block(prompt.title());
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    const SECTIONS: &[(&str, &[(&str, &str)])] = &[
        (
            "Navigation",
            &[
                ("1-6 Tab", "Switch screen"),
                ("j/k ↑/↓", "Move"),
                ("g/G", "Top / bottom"),
                ("Ctrl+d/u", "Page down / up"),
                ("Enter l", "Open"),
                ("Esc h", "Back"),
                ("L", "Forward"),
                ("[ ]", "Previous / next page"),
                (":", "Go to route"),
            ],
        ),
        (
            "Actions",
            &[
                ("a/z A/Z", "Vote item / post"),
                ("c r", "Comment / reply"),
                ("s t f", "Sort / listing / filter or follow"),
                ("m M", "Mark read / all read"),
                ("y d", "Approve / deny application"),
                ("B X", "Ban / block creator"),
                ("R", "Retry"),
                ("O S", "Sign in with OAuth / sign out"),
                ("q", "Quit"),
            ],
        ),
    ];

    let mut lines = Vec::new();
    for (title, keys) in SECTIONS {
        lines.push(Line::styled(format!("  {title}"), Style::default().fg(theme::CYAN)));
        for (key, what) in *keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(*what, theme::key_hint()),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::styled("  Esc or ? to close", theme::key_hint()));

    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
    let rect = centered(area, 56, height);
    frame.render_widget(Clear, rect);
    let block = overlay_block(" Keyboard Shortcuts ");
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let len = u16::try_from(notification.message.chars().count()).unwrap_or(u16::MAX);
    let width = len.saturating_add(6).clamp(20, 60).min(area.width);
    let height = 3u16;
    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let rect = Rect::new(area.x + x, area.y + y, width, height);

    let (color, icon) = match notification.level {
        NotificationLevel::Success => (theme::GREEN, "✓"),
        NotificationLevel::Error => (theme::RED, "✗"),
        NotificationLevel::Info => (theme::CYAN, "·"),
    };

    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(notification.message.clone(), Style::default().fg(theme::TEXT)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use wiremock::MockServer;

    use lemvue_api::types::{PostId, RegistrationApplicationId};
    use lemvue_core::{InstanceConfig, MemoryStorage, Services};

    use super::*;
    use crate::screens::tests::key;

    async fn app(start: &str) -> (App, MockServer) {
        let server = MockServer::start().await;
        let config = InstanceConfig::new(server.uri().parse().unwrap());
        let instance =
            Instance::new(config, Services::new(), Arc::new(MemoryStorage::new())).unwrap();
        let mut app = App::new(instance, start.parse().unwrap(), None);
        app.start();
        (app, server)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(app.handle_key_event(key(KeyCode::Char(c))).unwrap().is_none());
        }
    }

    /// Queued actions matching `pick`, ignoring background fetch results.
    fn drain<T>(app: &mut App, pick: impl Fn(Action) -> Option<T>) -> Vec<T> {
        let mut out = Vec::new();
        while let Ok(action) = app.action_rx.try_recv() {
            out.extend(pick(action));
        }
        out
    }

    #[tokio::test]
    async fn number_keys_jump_to_tabs() {
        let (mut app, _server) = app("/").await;
        let Some(Action::Navigate(route)) = app.handle_key_event(key(KeyCode::Char('4'))).unwrap()
        else {
            panic!("expected navigation");
        };
        assert_eq!(route.kind, RouteKind::Inbox);
        assert!(app.handle_key_event(key(KeyCode::Char('9'))).unwrap().is_none());
    }

    #[tokio::test]
    async fn history_swaps_the_mounted_screen() {
        let (mut app, _server) = app("/").await;
        assert_eq!(app.active, ScreenId::Feed);

        app.process_action(Action::Navigate("/modlog".parse().unwrap()))
            .unwrap();
        assert_eq!(app.active, ScreenId::Modlog);
        assert!(app.screens[&ScreenId::Feed].page().route.is_none());

        app.process_action(Action::Back).unwrap();
        assert_eq!(app.active, ScreenId::Feed);
        assert_eq!(app.navigator.current().route.to_string(), "/");
        assert!(app.screens[&ScreenId::Modlog].page().route.is_none());

        app.process_action(Action::Forward).unwrap();
        assert_eq!(app.active, ScreenId::Modlog);

        // Nothing further forward: a no-op
        app.process_action(Action::Forward).unwrap();
        assert_eq!(app.active, ScreenId::Modlog);
    }

    #[tokio::test]
    async fn goto_prompt_navigates() {
        let (mut app, _server) = app("/").await;
        app.process_action(Action::OpenPrompt(Prompt::GoTo)).unwrap();
        type_text(&mut app, "/c/rust");
        app.handle_key_event(key(KeyCode::Backspace)).unwrap();
        type_text(&mut app, "t");

        let submit = app.handle_key_event(key(KeyCode::Enter)).unwrap().unwrap();
        app.process_action(submit).unwrap();
        assert!(app.prompt.is_none());

        let routes = drain(&mut app, |a| match a {
            Action::Navigate(route) => Some(route.to_string()),
            _ => None,
        });
        assert_eq!(routes, vec!["/c/rust".to_owned()]);
    }

    #[tokio::test]
    async fn empty_replies_are_not_submitted_but_empty_denials_are() {
        let (mut app, _server) = app("/").await;
        app.process_action(Action::OpenPrompt(Prompt::Reply {
            post_id: PostId(1),
            parent_id: None,
        }))
        .unwrap();
        type_text(&mut app, "  ");
        assert!(app.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
        app.process_action(Action::ClosePrompt).unwrap();

        app.process_action(Action::OpenPrompt(Prompt::DenyReason {
            id: RegistrationApplicationId(3),
        }))
        .unwrap();
        let submit = app.handle_key_event(key(KeyCode::Enter)).unwrap().unwrap();
        app.process_action(submit).unwrap();

        let commands = drain(&mut app, |a| match a {
            Action::Execute(cmd) => Some(cmd),
            _ => None,
        });
        assert!(matches!(
            commands.as_slice(),
            [Command::DenyRegistration {
                id: RegistrationApplicationId(3),
                reason: None
            }]
        ));
    }

    #[tokio::test]
    async fn esc_dismisses_a_toast_before_going_back() {
        let (mut app, _server) = app("/").await;
        app.notify(Notification::info("hello"));
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::DismissNotification)
        ));
        app.process_action(Action::DismissNotification).unwrap();
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::Back)
        ));
    }

    #[tokio::test]
    async fn signing_out_without_a_session_only_reports_it() {
        let (mut app, _server) = app("/").await;
        let action = app.handle_key_event(key(KeyCode::Char('S'))).unwrap().unwrap();
        assert!(matches!(action, Action::SignOut));
        app.process_action(action).unwrap();
        let (toast, _) = app.notification.as_ref().unwrap();
        assert_eq!(toast.message, "Not signed in");
        assert!(!app.instance.services().session.is_logged_in());
    }

    #[tokio::test]
    async fn pasting_a_foreign_url_is_rejected() {
        let (mut app, _server) = app("/").await;
        let prompt = Prompt::OAuthCallback {
            authorize_url: "https://auth.test/authorize".into(),
        };
        app.process_action(Action::OpenPrompt(prompt.clone())).unwrap();
        app.paste("https://lemmy.test/c/rust\n");
        assert_eq!(
            app.prompt.as_ref().map(|(_, input)| input.as_str()),
            Some("https://lemmy.test/c/rust")
        );
        let submit = app.handle_key_event(key(KeyCode::Enter)).unwrap().unwrap();
        app.process_action(submit).unwrap();
        let (toast, _) = app.notification.as_ref().unwrap();
        assert_eq!(toast.level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn callback_without_a_code_reports_cancellation() {
        let (mut app, _server) = app("/").await;
        app.process_action(Action::Navigate(
            "/oauth/callback?error=access_denied".parse().unwrap(),
        ))
        .unwrap();
        // Callbacks never enter history
        assert_eq!(app.navigator.current().route.to_string(), "/");
        let (toast, _) = app.notification.as_ref().unwrap();
        assert_eq!(toast.message, "The provider refused sign-in");
    }

    #[test]
    fn callback_urls_parse_into_routes() {
        let route = callback_route("https://lemmy.test/oauth/callback?code=abc&state=xyz").unwrap();
        assert_eq!(route.kind, RouteKind::OAuthCallback);
        assert_eq!(route.query.get("code"), Some("abc"));
        assert_eq!(route.query.get("state"), Some("xyz"));

        let bare = callback_route("/oauth/callback?code=1&state=2").unwrap();
        assert_eq!(bare.query.get("state"), Some("2"));

        assert!(callback_route("https://lemmy.test/c/rust").is_none());
        assert!(callback_route("not a url").is_none());
    }
}
