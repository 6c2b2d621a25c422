//! Preview overlay rendering.
//!
//! Draws the active [`PreviewSession`] on top of the file list. Text is
//! syntax-highlighted via `syntect` (markdown is styled instead), images are
//! drawn through the terminal graphics protocol when one is available, and
//! the remaining modalities show what the preview would load and where.

use std::sync::OnceLock;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use rapyd_core::fs::preview::{ImageInfo, PdfInfo, TextPreview};
use rapyd_core::{parse_color, FileEntry, ModalityKind, PreviewModality, Theme};
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::app::{ContentState, PreviewSession};
use crate::background::LoadedContent;
use crate::image_preview::ImagePreviewState;
use crate::ui::format::format_size;
use crate::ui::markdown::{render_markdown, MarkdownPalette};

/// Lazily initialised syntax set.
fn syntax_set() -> &'static SyntaxSet {
    static SS: OnceLock<SyntaxSet> = OnceLock::new();
    SS.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Lazily initialised theme set.
fn theme_set() -> &'static ThemeSet {
    static TS: OnceLock<ThemeSet> = OnceLock::new();
    TS.get_or_init(ThemeSet::load_defaults)
}

/// Rendered body lines plus the syntax theme's background, if any.
struct PreviewContent {
    lines: Vec<Line<'static>>,
    theme_bg: Option<Color>,
}

impl PreviewContent {
    fn plain(lines: Vec<Line<'static>>) -> Self {
        Self {
            lines,
            theme_bg: None,
        }
    }
}

/// Renders the preview overlay into `area`.
pub fn render_preview(
    f: &mut Frame,
    area: Rect,
    session: &PreviewSession,
    theme: &Theme,
    image_state: Option<&mut ImagePreviewState>,
) {
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title(session.entry(), session.modality().kind()))
        .title_style(
            Style::default()
                .fg(parse_color(&theme.preview.title_fg))
                .add_modifier(Modifier::BOLD),
        )
        .border_style(Style::default().fg(parse_color(&theme.preview.border_fg)));

    if let (ContentState::Ready(LoadedContent::Image { info, image }), Some(state)) =
        (session.content(), image_state)
    {
        let inner = block.inner(area);
        f.render_widget(block, area);
        render_image(f, inner, session, info, image, theme, state);
        return;
    }

    let content = body(session, theme);
    let max_scroll = u16::try_from(content.lines.len().saturating_sub(1)).unwrap_or(u16::MAX);
    let style = content
        .theme_bg
        .map(|bg| Style::default().bg(bg))
        .unwrap_or_default();
    let paragraph = Paragraph::new(content.lines)
        .block(block)
        .style(style)
        .scroll((session.scroll().min(max_scroll), 0));
    f.render_widget(paragraph, area);
}

fn title(entry: &FileEntry, kind: ModalityKind) -> String {
    format!(" {} · {} ", entry.name(), modality_label(kind))
}

fn modality_label(kind: ModalityKind) -> &'static str {
    match kind {
        ModalityKind::Error => "error",
        ModalityKind::Image => "image",
        ModalityKind::Video => "video",
        ModalityKind::EmbeddedDocument => "document",
        ModalityKind::EmbeddedText => "text",
        ModalityKind::Unsupported => "no preview",
    }
}

/// Body lines for everything except a drawable image.
fn body(session: &PreviewSession, theme: &Theme) -> PreviewContent {
    let entry = session.entry();
    match (session.modality(), session.content()) {
        (PreviewModality::Error, _) => PreviewContent::plain(error_lines(entry, theme)),
        (_, ContentState::Loading) => PreviewContent::plain(vec![Line::from(Span::styled(
            "Loading…",
            muted(theme).add_modifier(Modifier::ITALIC),
        ))]),
        (_, ContentState::Ready(LoadedContent::Text(text))) if is_markdown(entry.name()) => {
            PreviewContent::plain(markdown_lines(text, theme))
        }
        (_, ContentState::Ready(LoadedContent::Text(text))) => text_lines(entry.name(), text, theme),
        (_, ContentState::Ready(LoadedContent::Image { info, .. })) => {
            PreviewContent::plain(image_lines(info, theme))
        }
        (_, ContentState::Ready(LoadedContent::Document(info))) => {
            PreviewContent::plain(document_lines(info, session.modality(), theme))
        }
        (
            PreviewModality::Video {
                source,
                autoplay,
                controls,
            },
            ContentState::NotNeeded,
        ) => PreviewContent::plain(video_lines(entry, source.as_str(), *autoplay, *controls, theme)),
        (PreviewModality::Unsupported { download }, ContentState::NotNeeded) => {
            PreviewContent::plain(unsupported_lines(entry, download.as_str(), theme))
        }
        (modality, ContentState::NotNeeded) => {
            tracing::debug!(kind = ?modality.kind(), "preview has nothing to show");
            PreviewContent::plain(Vec::new())
        }
    }
}

fn muted(theme: &Theme) -> Style {
    Style::default().fg(parse_color(&theme.preview.line_number_fg))
}

fn heading(theme: &Theme) -> Style {
    Style::default()
        .fg(parse_color(&theme.preview.title_fg))
        .add_modifier(Modifier::BOLD)
}

fn field(label: &str, value: impl Into<String>, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<11}"), muted(theme)),
        Span::raw(value.into()),
    ])
}

fn is_markdown(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| matches!(ext.to_lowercase().as_str(), "md" | "markdown" | "mdx"))
        .unwrap_or(false)
}

fn truncation_note(text: &TextPreview, theme: &Theme) -> Option<Line<'static>> {
    text.is_truncated.then(|| {
        Line::from(Span::styled(
            format!(
                "[showing first {} of {} lines]",
                text.lines.len(),
                text.total_lines
            ),
            Style::default()
                .fg(parse_color(&theme.preview.truncation_fg))
                .add_modifier(Modifier::ITALIC),
        ))
    })
}

fn error_lines(entry: &FileEntry, theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "Preview failed to load.",
            Style::default()
                .fg(parse_color(&theme.preview.error_fg))
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            format!("Press d to download {} instead.", entry.name()),
            muted(theme),
        )),
    ]
}

fn markdown_lines(text: &TextPreview, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = render_markdown(&text.lines.join("\n"), &MarkdownPalette::from_theme(theme));
    if let Some(note) = truncation_note(text, theme) {
        lines.push(Line::default());
        lines.push(note);
    }
    lines
}

/// Syntax-highlighted text with a line-number gutter.
fn text_lines(name: &str, text: &TextPreview, theme: &Theme) -> PreviewContent {
    let (highlighted, theme_bg) = highlight_lines(name, &text.lines, &theme.preview.syntax_theme);
    let width = text.total_lines.to_string().len().max(3);
    let gutter = theme_bg
        .map(|bg| muted(theme).bg(bg))
        .unwrap_or_else(|| muted(theme));

    let mut lines: Vec<Line<'static>> = highlighted
        .into_iter()
        .enumerate()
        .map(|(i, spans)| {
            let mut all = vec![Span::styled(format!("{:>width$} ", i + 1), gutter)];
            all.extend(spans);
            Line::from(all)
        })
        .collect();

    if let Some(note) = truncation_note(text, theme) {
        lines.push(Line::default());
        lines.push(note);
    }
    PreviewContent { lines, theme_bg }
}

/// Applies syntect highlighting, returning spans per line and the theme's
/// background colour.
fn highlight_lines(
    name: &str,
    lines: &[String],
    syntax_theme_name: &str,
) -> (Vec<Vec<Span<'static>>>, Option<Color>) {
    let ss = syntax_set();
    let ts = theme_set();

    let Some(th) = ts
        .themes
        .get(syntax_theme_name)
        .or_else(|| ts.themes.get("base16-ocean.dark"))
        .or_else(|| ts.themes.values().next())
    else {
        return (
            lines.iter().map(|l| vec![Span::raw(l.clone())]).collect(),
            None,
        );
    };

    let theme_bg = th.settings.background.map(|c| Color::Rgb(c.r, c.g, c.b));
    let syntax = name
        .rsplit_once('.')
        .and_then(|(_, ext)| ss.find_syntax_by_extension(ext))
        .or_else(|| ss.find_syntax_by_extension(name))
        .unwrap_or_else(|| ss.find_syntax_plain_text());

    let mut highlighter = syntect::easy::HighlightLines::new(syntax, th);
    let highlighted = lines
        .iter()
        .map(|line| match highlighter.highlight_line(line, ss) {
            Ok(regions) => regions
                .into_iter()
                .map(|(style, text)| {
                    let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                    let mut modifier = Modifier::empty();
                    if style.font_style.contains(FontStyle::BOLD) {
                        modifier |= Modifier::BOLD;
                    }
                    if style.font_style.contains(FontStyle::ITALIC) {
                        modifier |= Modifier::ITALIC;
                    }
                    if style.font_style.contains(FontStyle::UNDERLINE) {
                        modifier |= Modifier::UNDERLINED;
                    }
                    Span::styled(text.to_string(), Style::default().fg(fg).add_modifier(modifier))
                })
                .collect(),
            Err(_) => vec![Span::raw(line.clone())],
        })
        .collect();

    (highlighted, theme_bg)
}

fn image_lines(info: &ImageInfo, theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled("Image", heading(theme))),
        Line::default(),
        field("Format", info.format.clone(), theme),
        field("Dimensions", format!("{}x{} px", info.width, info.height), theme),
        field("Size", format_size(info.byte_size), theme),
    ]
}

fn document_lines(info: &PdfInfo, modality: &PreviewModality, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled("PDF document", heading(theme))),
        Line::default(),
        field("Pages", info.page_count.to_string(), theme),
    ];
    if let Some(title) = info.title.as_deref().filter(|t| !t.is_empty()) {
        lines.push(field("Title", title, theme));
    }
    if let Some(author) = info.author.as_deref().filter(|a| !a.is_empty()) {
        lines.push(field("Author", author, theme));
    }
    lines.push(field("Size", format_size(info.byte_size), theme));
    if let Some(source) = modality.source() {
        lines.push(Line::default());
        lines.push(field("Open", source.as_str(), theme));
    }
    lines
}

fn video_lines(
    entry: &FileEntry,
    source: &str,
    autoplay: bool,
    controls: bool,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let on_off = |flag: bool| if flag { "on" } else { "off" };
    vec![
        Line::from(Span::styled("Video", heading(theme))),
        Line::default(),
        field("Stream", source, theme),
        field("Autoplay", on_off(autoplay), theme),
        field("Controls", on_off(controls), theme),
        field("Size", format_size(entry.size()), theme),
        Line::default(),
        Line::from(Span::styled(
            "Open the stream URL in a media player to watch.",
            muted(theme),
        )),
    ]
}

fn unsupported_lines(entry: &FileEntry, download: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled("No preview available", heading(theme))),
        Line::default(),
    ];
    if let Some(mime) = entry.mime() {
        lines.push(field("Type", mime, theme));
    }
    lines.push(field("Size", format_size(entry.size()), theme));
    lines.push(field("Download", download, theme));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Press d to download.", muted(theme))));
    lines
}

/// Draws the image with a one-line summary beneath it, falling back to
/// metadata when the area is too small.
fn render_image(
    f: &mut Frame,
    inner: Rect,
    session: &PreviewSession,
    info: &ImageInfo,
    image: &image::DynamicImage,
    theme: &Theme,
    state: &mut ImagePreviewState,
) {
    let metadata_height: u16 = 1;
    let image_height = inner.height.saturating_sub(metadata_height);
    if image_height < 3 {
        f.render_widget(Paragraph::new(image_lines(info, theme)), inner);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(image_height),
            Constraint::Length(metadata_height),
        ])
        .split(inner);

    let protocol = state.get_or_encode(
        session.state().id(),
        image,
        chunks[0].width,
        chunks[0].height,
    );
    f.render_stateful_widget(ratatui_image::StatefulImage::default(), chunks[0], protocol);
    f.render_widget(Paragraph::new(compact_metadata(info, theme)), chunks[1]);
}

fn compact_metadata(info: &ImageInfo, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        format!(
            "{}x{} | {} | {}",
            info.width,
            info.height,
            info.format,
            format_size(info.byte_size)
        ),
        muted(theme),
    ))
}
