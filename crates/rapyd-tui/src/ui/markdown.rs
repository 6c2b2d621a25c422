//! Markdown rendering for text previews.
//!
//! Converts markdown to styled ratatui [`Line`]s using `pulldown-cmark`.
//! Colours come from the active [`Theme`] so the light palette stays legible.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use rapyd_core::{parse_color, Theme};

/// Colours used by [`render_markdown`].
#[derive(Debug, Clone, Copy)]
pub struct MarkdownPalette {
    pub heading: Color,
    pub subheading: Color,
    pub link: Color,
    pub muted: Color,
    pub code_bg: Color,
}

impl MarkdownPalette {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            heading: parse_color(&theme.preview.title_fg),
            subheading: parse_color(&theme.panel.dir_fg),
            link: parse_color(&theme.breadcrumb.home_fg),
            muted: parse_color(&theme.preview.line_number_fg),
            code_bg: parse_color(&theme.breadcrumb.bg),
        }
    }
}

/// Ordered lists carry their next number; bullets carry `None`.
struct ListFrame {
    next: Option<u64>,
}

/// Renders markdown text as styled lines.
pub fn render_markdown(text: &str, palette: &MarkdownPalette) -> Vec<Line<'static>> {
    let parser = Parser::new_ext(text, Options::all());

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut styles: Vec<Style> = vec![Style::default()];
    let mut lists: Vec<ListFrame> = Vec::new();
    let mut in_code_block = false;
    let mut quote_depth = 0usize;

    let code_style = Style::default().bg(palette.code_bg);

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. } => {
                    flush(&mut lines, &mut spans);
                    styles.push(heading_style(level, palette));
                }
                Tag::Emphasis => push_modifier(&mut styles, Modifier::ITALIC),
                Tag::Strong => push_modifier(&mut styles, Modifier::BOLD),
                Tag::Strikethrough => push_modifier(&mut styles, Modifier::CROSSED_OUT),
                Tag::Link { .. } => styles.push(
                    Style::default()
                        .fg(palette.link)
                        .add_modifier(Modifier::UNDERLINED),
                ),
                Tag::CodeBlock(_) => {
                    flush(&mut lines, &mut spans);
                    in_code_block = true;
                }
                Tag::BlockQuote(_) => quote_depth += 1,
                Tag::List(start) => {
                    flush(&mut lines, &mut spans);
                    lists.push(ListFrame { next: start });
                }
                Tag::Item => {
                    flush(&mut lines, &mut spans);
                    let indent = "  ".repeat(lists.len().saturating_sub(1));
                    let marker = match lists.last_mut() {
                        Some(ListFrame { next: Some(n) }) => {
                            let marker = format!("{n}. ");
                            *n += 1;
                            marker
                        }
                        _ => "\u{2022} ".to_string(),
                    };
                    spans.push(Span::raw(format!("{indent}{marker}")));
                }
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Heading(_) => {
                    styles.pop();
                    flush(&mut lines, &mut spans);
                }
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                    styles.pop();
                }
                TagEnd::CodeBlock => {
                    in_code_block = false;
                    flush(&mut lines, &mut spans);
                }
                TagEnd::BlockQuote(_) => quote_depth = quote_depth.saturating_sub(1),
                TagEnd::List(_) => {
                    lists.pop();
                    flush(&mut lines, &mut spans);
                }
                TagEnd::Item => flush(&mut lines, &mut spans),
                TagEnd::Paragraph => {
                    flush(&mut lines, &mut spans);
                    lines.push(Line::default());
                }
                _ => {}
            },
            Event::Text(text) if in_code_block => {
                for line in text.lines() {
                    spans.push(Span::styled(line.to_string(), code_style));
                    flush(&mut lines, &mut spans);
                }
            }
            Event::Text(text) if quote_depth > 0 => {
                let bar = "\u{2502} ".repeat(quote_depth);
                for line in text.lines() {
                    spans.push(Span::styled(bar.clone(), Style::default().fg(palette.muted)));
                    spans.push(Span::styled(
                        line.to_string(),
                        Style::default().fg(palette.muted),
                    ));
                    flush(&mut lines, &mut spans);
                }
            }
            Event::Text(text) => {
                spans.push(Span::styled(text.to_string(), current(&styles)));
            }
            Event::Code(code) => spans.push(Span::styled(code.to_string(), code_style)),
            Event::TaskListMarker(done) => {
                spans.push(Span::raw(if done { "[x] " } else { "[ ] " }));
            }
            Event::SoftBreak => spans.push(Span::raw(" ")),
            Event::HardBreak => flush(&mut lines, &mut spans),
            Event::Rule => {
                flush(&mut lines, &mut spans);
                lines.push(Line::from(Span::styled(
                    "\u{2500}".repeat(40),
                    Style::default().fg(palette.muted),
                )));
            }
            _ => {}
        }
    }

    flush(&mut lines, &mut spans);
    while lines.last().is_some_and(|l| l.width() == 0) {
        lines.pop();
    }
    lines
}

fn current(stack: &[Style]) -> Style {
    stack.last().copied().unwrap_or_default()
}

fn push_modifier(stack: &mut Vec<Style>, modifier: Modifier) {
    let base = current(stack);
    stack.push(base.add_modifier(modifier));
}

fn heading_style(level: HeadingLevel, palette: &MarkdownPalette) -> Style {
    let fg = match level {
        HeadingLevel::H1 => palette.heading,
        HeadingLevel::H2 => palette.subheading,
        _ => Color::Reset,
    };
    Style::default().fg(fg).add_modifier(Modifier::BOLD)
}

fn flush(lines: &mut Vec<Line<'static>>, spans: &mut Vec<Span<'static>>) {
    if !spans.is_empty() {
        lines.push(Line::from(std::mem::take(spans)));
    }
}
