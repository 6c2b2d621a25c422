use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use rapyd_core::{parse_color, Theme};

use crate::app::{App, AppMode};
use crate::image_preview::ImagePreviewState;
use crate::ui::breadcrumb::render_breadcrumb;
use crate::ui::panel::{render_file_list, PanelProps};
use crate::ui::popup::{centered_rect, help_lines, render_popup};
use crate::ui::preview::render_preview;
use crate::ui::statusbar::{render_statusbar, StatusBarProps};

/// Main render function: composes the full UI layout each frame.
pub fn render(f: &mut Frame, app: &App, image_state: Option<&mut ImagePreviewState>) {
    let theme = app.theme();
    let searching = app.mode() == AppMode::Search;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(u16::from(searching)),
            Constraint::Length(1),
        ])
        .split(f.area());

    let indicator = app.is_loading().then_some("loading…");
    render_breadcrumb(f, chunks[0], app.current_path(), indicator, theme);

    let prefs = app.prefs();
    let panel = PanelProps {
        entries: app.visible(),
        selected: app.cursor(),
        view_mode: prefs.view_mode,
        show_icons: app.show_icons(),
        date_format: app.date_format(),
        query: app.query(),
        is_loading: app.is_loading(),
    };
    render_file_list(f, chunks[1], &panel, theme);

    if searching {
        render_search_line(f, chunks[2], app.query(), theme);
    }

    let status = StatusBarProps {
        entry_count: app.visible().len(),
        selected_index: app.cursor(),
        selected_entry: app.selected_entry(),
        view_mode: prefs.view_mode,
        theme_mode: prefs.theme,
        notice: app.notice(),
    };
    render_statusbar(f, chunks[3], &status, theme);

    match app.mode() {
        AppMode::Preview => {
            if let Some(session) = app.preview() {
                let area = centered_rect(90, 85, f.area());
                render_preview(f, area, session, theme, image_state);
            }
        }
        AppMode::Help => render_popup(f, "Help", help_lines(), theme),
        AppMode::Normal | AppMode::Search => {}
    }
}

fn render_search_line(f: &mut Frame, area: Rect, query: &str, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(
            "/",
            Style::default()
                .fg(parse_color(&theme.statusbar.loading_fg))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(query.to_owned()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(parse_color(&theme.statusbar.bg))),
        area,
    );
}
