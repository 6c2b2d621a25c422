use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use rapyd_core::{parse_color, Theme};

/// Key bindings listed by the help popup.
pub const HELP_LINES: &[(&str, &str)] = &[
    ("j / k, arrows", "move cursor"),
    ("gg / G", "first / last entry"),
    ("Enter / l", "open folder or preview file"),
    ("h / Backspace", "parent folder"),
    ("r", "reload"),
    ("/", "filter by name (Esc clears)"),
    ("d", "download selection"),
    ("v", "list / detail view"),
    ("t", "light / dark theme"),
    ("?", "this help"),
    ("q", "quit (closes preview first)"),
];

/// Renders a centered popup with the given title and lines.
pub fn render_popup(f: &mut Frame, title: &str, lines: Vec<Line<'static>>, theme: &Theme) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let popup = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "))
            .border_style(Style::default().fg(parse_color(&theme.popup.border_fg))),
    );
    f.render_widget(popup, area);
}

/// The help popup body, one binding per line.
pub fn help_lines() -> Vec<Line<'static>> {
    let width = HELP_LINES.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    HELP_LINES
        .iter()
        .map(|(keys, what)| Line::from(format!(" {keys:<width$}  {what}")))
        .collect()
}

/// A rectangle of the given percentage size centered within `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_inside_parent() {
        let parent = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 60, parent);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 30);
        assert_eq!(inner.x, 20);
        assert_eq!(inner.y, 10);
    }

    #[test]
    fn help_lines_are_aligned() {
        let lines = help_lines();
        assert_eq!(lines.len(), HELP_LINES.len());
        let column = |l: &Line| {
            let text: String = l.spans.iter().map(|s| s.content.as_ref()).collect();
            text.find("  ").map(|i| i + text[i..].chars().take_while(|c| *c == ' ').count())
        };
        let first = column(&lines[0]);
        assert!(lines.iter().all(|l| column(l) == first));
    }
}
