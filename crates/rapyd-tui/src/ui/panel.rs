//! File list rendering.
//!
//! Shows the filtered, sorted view as a scrollable `List`. Detail view adds
//! a size column and the modification date.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use rapyd_core::{parse_color, EntryKind, FileEntry, Theme, ViewMode};

use crate::icons::icon_for_entry;
use crate::ui::format::{format_date, format_size};

/// Width of the size column in detail view.
const SIZE_COLUMN: usize = 9;

/// Everything the list needs from the app.
pub struct PanelProps<'a> {
    pub entries: &'a [FileEntry],
    pub selected: usize,
    pub view_mode: ViewMode,
    pub show_icons: bool,
    pub date_format: &'a str,
    pub query: &'a str,
    pub is_loading: bool,
}

pub fn render_file_list(f: &mut Frame, area: Rect, props: &PanelProps<'_>, theme: &Theme) {
    let title = if props.query.is_empty() {
        " Files ".to_owned()
    } else {
        format!(" Files  filter: {} ", props.query)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(parse_color(&theme.preview.border_fg)))
        .style(Style::default().bg(parse_color(&theme.panel.bg)));

    if props.entries.is_empty() {
        let notice = Paragraph::new(Line::from(Span::styled(
            empty_notice(props.query, props.is_loading),
            Style::default()
                .fg(parse_color(&theme.panel.meta_fg))
                .add_modifier(Modifier::ITALIC),
        )))
        .block(block);
        f.render_widget(notice, area);
        return;
    }

    // borders and the "> " highlight symbol
    let row_width = (area.width as usize).saturating_sub(4);
    let items: Vec<ListItem> = props
        .entries
        .iter()
        .map(|entry| ListItem::new(entry_line(entry, props, row_width, theme)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .fg(parse_color(&theme.panel.selected_fg)),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(props.selected.min(props.entries.len() - 1)));
    f.render_stateful_widget(list, area, &mut state);
}

fn empty_notice(query: &str, is_loading: bool) -> String {
    if is_loading {
        "Loading…".to_owned()
    } else if query.is_empty() {
        "This folder is empty".to_owned()
    } else {
        format!("No names match \"{query}\"")
    }
}

fn entry_line(
    entry: &FileEntry,
    props: &PanelProps<'_>,
    row_width: usize,
    theme: &Theme,
) -> Line<'static> {
    let icon = if props.show_icons {
        icon_for_entry(entry)
    } else if entry.is_dir() {
        "/"
    } else {
        " "
    };
    let name_style = entry_style(entry, theme);

    match props.view_mode {
        ViewMode::List => Line::from(Span::styled(format!("{icon}{}", entry.name()), name_style)),
        ViewMode::Detail => {
            let date = entry
                .modified()
                .map(|t| format_date(t, props.date_format))
                .unwrap_or_default();
            let meta = format!("{:>SIZE_COLUMN$}  {date}", size_label(entry));
            let name_width = row_width
                .saturating_sub(meta.chars().count() + icon.chars().count() + 1)
                .max(8);
            Line::from(vec![
                Span::styled(
                    format!("{icon}{} ", fit(entry.name(), name_width)),
                    name_style,
                ),
                Span::styled(meta, Style::default().fg(parse_color(&theme.panel.meta_fg))),
            ])
        }
    }
}

fn size_label(entry: &FileEntry) -> String {
    if entry.is_dir() {
        "Folder".to_owned()
    } else {
        format_size(entry.size())
    }
}

/// Pads or truncates `name` to exactly `width` characters.
fn fit(name: &str, width: usize) -> String {
    let count = name.chars().count();
    if count <= width {
        format!("{name:<width$}")
    } else {
        let kept: String = name.chars().take(width.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn entry_style(entry: &FileEntry, theme: &Theme) -> Style {
    match entry.kind() {
        EntryKind::Directory => Style::default()
            .fg(parse_color(&theme.panel.dir_fg))
            .add_modifier(Modifier::BOLD),
        EntryKind::Image => Style::default().fg(parse_color(&theme.panel.image_fg)),
        EntryKind::Video => Style::default().fg(parse_color(&theme.panel.video_fg)),
        EntryKind::File => Style::default().fg(parse_color(&theme.panel.fg)),
    }
}
