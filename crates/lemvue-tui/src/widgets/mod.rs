//! Small rendering helpers shared by screens.

pub mod sub_tabs;
pub mod viewport;

use std::time::Duration;

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{ListItem, Paragraph};

use lemvue_core::{Projection, RequestState};

use crate::theme;

pub use viewport::ListViewport;

/// Coarse age like `5m`, `3h`, `12d`.
pub fn age(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - published).num_seconds().max(0).unsigned_abs();
    let rounded = match secs {
        0..60 => secs,
        60..3_600 => secs / 60 * 60,
        3_600..86_400 => secs / 3_600 * 3_600,
        _ => secs / 86_400 * 86_400,
    };
    humantime::format_duration(Duration::from_secs(rounded)).to_string()
}

/// `1234` → `1.2k`.
#[allow(clippy::cast_precision_loss)]
pub fn compact(n: i64) -> String {
    match n.unsigned_abs() {
        0..1_000 => n.to_string(),
        1_000..1_000_000 => format!("{:.1}k", n as f64 / 1_000.0),
        _ => format!("{:.1}M", n as f64 / 1_000_000.0),
    }
}

/// Cut `text` to one line of at most `max` chars.
pub fn one_line(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max {
        return line.to_owned();
    }
    let mut cut: String = line.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Draw the non-success states of a slot. Returns `true` when the caller
/// should draw its data instead.
pub fn render_state<T>(
    frame: &mut Frame,
    area: Rect,
    state: &RequestState<T>,
    throbber: &throbber_widgets_tui::ThrobberState,
) -> bool {
    match state {
        RequestState::Success(_) => true,
        RequestState::Empty => false,
        RequestState::Loading => {
            let throbber_widget = throbber_widgets_tui::Throbber::default()
                .label(" Loading…")
                .style(theme::row())
                .throbber_style(theme::border_focused());
            frame.render_stateful_widget(throbber_widget, area, &mut throbber.clone());
            false
        }
        RequestState::Failed(err) => {
            let text = vec![
                Line::from(""),
                Line::from(Span::styled(err.user_message(), theme::error())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("R ", theme::key_hint_key()),
                    Span::styled("retry", theme::key_hint()),
                ]),
            ];
            frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
            false
        }
    }
}

/// `[ prev ]  page hint  [ next ]` footer.
pub fn pager(has_prev: bool, has_next: bool) -> Line<'static> {
    let style = |on: bool| if on { theme::key_hint_key() } else { theme::row_dim() };
    Line::from(vec![
        Span::styled("[ ", theme::key_hint()),
        Span::styled("prev", style(has_prev)),
        Span::styled("   ", theme::key_hint()),
        Span::styled("next", style(has_next)),
        Span::styled(" ]", theme::key_hint()),
    ])
}

/// Two-line row for a modlog entry or notification.
pub fn projection_item<Id>(
    row: &Projection<Id>,
    dim: bool,
    now: DateTime<Utc>,
) -> ListItem<'static> {
    let text_style = if !row.recognized {
        theme::placeholder()
    } else if dim {
        theme::row_dim()
    } else {
        theme::row()
    };

    let mut first = Vec::with_capacity(3);
    if let Some(user) = &row.acting_user {
        first.push(Span::styled(format!("{user} "), theme::person()));
    }
    first.push(Span::styled(row.body.text.clone(), text_style));

    let mut second = vec![
        Span::raw("  "),
        Span::styled(age(row.published_at, now), theme::timestamp()),
    ];
    if let Some(reason) = &row.body.reason {
        second.push(Span::styled(" · reason: ", theme::key_hint()));
        second.push(Span::styled(one_line(reason, 80), theme::row()));
    }
    if let Some(expires) = row.body.expires_at {
        second.push(Span::styled(
            format!(" · expires {}", expires.format("%Y-%m-%d")),
            theme::key_hint(),
        ));
    }

    ListItem::new(vec![Line::from(first), Line::from(second)])
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn ages_round_to_the_largest_unit() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).single().unwrap_or_default();
        let ago = |secs: i64| age(now - chrono::Duration::seconds(secs), now);
        assert_eq!(ago(42), "42s");
        assert_eq!(ago(5 * 60 + 13), "5m");
        assert_eq!(ago(3 * 3_600 + 59), "3h");
        assert_eq!(ago(12 * 86_400 + 7_000), "12days");
        assert_eq!(ago(-30), "0s");
    }

    #[test]
    fn counts_compact() {
        assert_eq!(compact(999), "999");
        assert_eq!(compact(1_234), "1.2k");
        assert_eq!(compact(-2_500), "-2.5k");
        assert_eq!(compact(3_400_000), "3.4M");
    }

    #[test]
    fn one_line_truncates() {
        assert_eq!(one_line("short\nsecond", 10), "short");
        assert_eq!(one_line("abcdefghij", 5), "abcd…");
    }
}
