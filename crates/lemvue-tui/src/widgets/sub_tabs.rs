//! Inline filter tabs (sort, listing, notification kind...).

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use crate::theme;

/// `label: [Active]  Hot  New` with the active entry highlighted.
pub fn render_sub_tabs<'a>(label: &'a str, options: &[&'a str], active: usize) -> Line<'a> {
    let mut spans = Vec::with_capacity(options.len() * 2 + 1);
    spans.push(Span::styled(format!("{label}: "), theme::key_hint()));

    for (i, option) in options.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", theme::key_hint()));
        }
        if i == active {
            spans.push(Span::styled(
                format!("[{option}]"),
                theme::tab_active().add_modifier(Modifier::UNDERLINED),
            ));
        } else {
            spans.push(Span::styled(*option, theme::tab_inactive()));
        }
    }

    Line::from(spans)
}

/// Single-value filter display, for enums too long to list inline.
pub fn render_filter<'a>(label: &'a str, value: String) -> Vec<Span<'a>> {
    vec![
        Span::styled(format!("{label}: "), theme::key_hint()),
        Span::styled(value, theme::tab_active()),
        Span::raw("   "),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_tab_is_bracketed() {
        let line = render_sub_tabs("show", &["All", "Unread"], 1);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "show: All  [Unread]");
    }
}
