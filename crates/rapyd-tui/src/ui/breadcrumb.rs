use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use rapyd_core::{parse_color, Theme};

/// Label shown for the store root.
pub const ROOT_LABEL: &str = "Home";

/// Splits a store-relative path into its non-empty segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Renders the trail for `path` with an optional right-aligned indicator.
///
/// Example: ` Home / photos / 2024                     loading…`
pub fn render_breadcrumb(
    f: &mut Frame,
    area: Rect,
    path: &str,
    indicator: Option<&str>,
    theme: &Theme,
) {
    let bg = parse_color(&theme.breadcrumb.bg);
    let sep_fg = parse_color(&theme.breadcrumb.separator_fg);
    let comp_fg = parse_color(&theme.breadcrumb.component_fg);

    let mut parts: Vec<Span> = vec![Span::styled(
        format!(" {ROOT_LABEL}"),
        Style::default()
            .fg(parse_color(&theme.breadcrumb.home_fg))
            .add_modifier(Modifier::BOLD),
    )];
    for segment in segments(path) {
        parts.push(Span::styled(" / ", Style::default().fg(sep_fg)));
        parts.push(Span::styled(segment.to_owned(), Style::default().fg(comp_fg)));
    }

    if let Some(text) = indicator {
        let label = format!(" {text} ");
        let used: usize = parts.iter().map(|s| s.width()).sum();
        let spacer = (area.width as usize).saturating_sub(used + label.chars().count());
        if spacer > 0 {
            parts.push(Span::raw(" ".repeat(spacer)));
        }
        parts.push(Span::styled(
            label,
            Style::default()
                .fg(parse_color(&theme.statusbar.loading_fg))
                .add_modifier(Modifier::BOLD),
        ));
    }

    let trail = Paragraph::new(Line::from(parts)).style(Style::default().bg(bg));
    f.render_widget(trail, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_no_segments() {
        assert!(segments("").is_empty());
    }

    #[test]
    fn nested_path_segments() {
        assert_eq!(segments("photos/2024/summer"), vec!["photos", "2024", "summer"]);
    }

    #[test]
    fn stray_slashes_are_ignored() {
        assert_eq!(segments("/a//b/"), vec!["a", "b"]);
    }
}
