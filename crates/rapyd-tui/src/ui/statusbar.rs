//! Status bar rendering.
//!
//! A single row at the bottom of the terminal: cursor position, the
//! selected entry, view/theme indicators, and the latest notice.

use std::time::SystemTime;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use rapyd_core::{parse_color, FileEntry, Theme, ThemeMode, ViewMode};

use crate::ui::format::{format_age, format_size};

/// A notice shown at the right of the bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

/// Data needed to render the status bar.
pub struct StatusBarProps<'a> {
    pub entry_count: usize,
    pub selected_index: usize,
    pub selected_entry: Option<&'a FileEntry>,
    pub view_mode: ViewMode,
    pub theme_mode: ThemeMode,
    pub notice: Option<&'a Notice>,
}

pub fn render_statusbar(f: &mut Frame, area: Rect, props: &StatusBarProps<'_>, theme: &Theme) {
    let bg = parse_color(&theme.statusbar.bg);
    let base = Style::default().fg(parse_color(&theme.statusbar.position_fg)).bg(bg);

    let mut spans = vec![
        Span::styled(
            position_label(props.selected_index, props.entry_count),
            base.add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            props
                .selected_entry
                .map(|e| entry_info(e, SystemTime::now()))
                .unwrap_or_default(),
            base,
        ),
        Span::styled(
            format!("  [{} | {}]", props.view_mode.label(), props.theme_mode.label()),
            base,
        ),
    ];

    if let Some(notice) = props.notice {
        let fg = if notice.is_error {
            parse_color(&theme.statusbar.error_fg)
        } else {
            parse_color(&theme.statusbar.message_fg)
        };
        spans.push(Span::styled(
            format!("  {}", notice.text),
            Style::default().fg(fg).bg(bg).add_modifier(Modifier::ITALIC),
        ));
    }

    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    f.render_widget(bar, area);
}

fn position_label(selected: usize, count: usize) -> String {
    if count == 0 {
        " 0/0".to_owned()
    } else {
        format!(" {}/{}", selected.min(count - 1) + 1, count)
    }
}

fn entry_info(entry: &FileEntry, now: SystemTime) -> String {
    if entry.is_dir() {
        return format!("  [DIR] {}", entry.name());
    }
    match entry.modified() {
        Some(t) => format!(
            "  {} ({}, {})",
            entry.name(),
            format_size(entry.size()),
            format_age(t, now)
        ),
        None => format!("  {} ({})", entry.name(), format_size(entry.size())),
    }
}
