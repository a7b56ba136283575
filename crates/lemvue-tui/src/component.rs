//! Input and drawing hooks shared by every screen.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::action::Action;

/// Routing lives on [`Screen`](crate::screens::Screen); this trait only
/// covers what the event loop feeds the active screen. Mouse wheel input
/// reaches screens as arrow keys.
pub trait Component: Send {
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Periodic tick. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    fn focused(&self) -> bool;

    fn set_focused(&mut self, focused: bool);

    /// Name used in log lines.
    fn id(&self) -> &str;
}
