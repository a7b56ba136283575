//! Palette and semantic styles.

use ratatui::style::{Color, Modifier, Style};

// ── Palette ───────────────────────────────────────────────────────────

pub const ACCENT: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const RED: Color = Color::Rgb(255, 99, 99); // #ff6363
pub const ORANGE: Color = Color::Rgb(255, 184, 108); // #ffb86c

pub const TEXT: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const MUTED: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29

/// Gutter colors for comment depth, cycling.
pub const DEPTH: &[Color] = &[CYAN, CORAL, ACCENT, GREEN, YELLOW, ORANGE];

// ── Semantic styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ACCENT)
}

pub fn border_default() -> Style {
    Style::default().fg(MUTED)
}

pub fn row() -> Style {
    Style::default().fg(TEXT)
}

/// Posts already read and notifications already handled.
pub fn row_dim() -> Style {
    Style::default().fg(MUTED)
}

pub fn row_selected() -> Style {
    Style::default()
        .fg(ACCENT)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(TEXT)
}

pub fn key_hint() -> Style {
    Style::default().fg(MUTED)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

pub fn badge() -> Style {
    Style::default().fg(BG_DARK).bg(CORAL).add_modifier(Modifier::BOLD)
}

pub fn community() -> Style {
    Style::default().fg(GREEN)
}

pub fn person() -> Style {
    Style::default().fg(CYAN)
}

pub fn timestamp() -> Style {
    Style::default().fg(MUTED)
}

/// Score colored by the signed-in user's own vote.
pub fn score(my_vote: Option<i16>) -> Style {
    match my_vote {
        Some(v) if v > 0 => Style::default().fg(ORANGE).add_modifier(Modifier::BOLD),
        Some(v) if v < 0 => Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(TEXT),
    }
}

/// Rows from a newer server that this client can't describe.
pub fn placeholder() -> Style {
    Style::default().fg(MUTED).add_modifier(Modifier::ITALIC)
}

pub fn error() -> Style {
    Style::default().fg(RED)
}

pub fn depth(depth: usize) -> Style {
    Style::default().fg(DEPTH[depth % DEPTH.len()])
}
