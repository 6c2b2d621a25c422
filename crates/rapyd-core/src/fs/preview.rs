//! Preview sessions and modality dispatch.
//!
//! A [`PreviewState`] is the single active preview session; the
//! [`PreviewDispatcher`] decides how it is rendered. The helpers at the
//! bottom inspect fetched bytes (text, image, PDF) for the frontend.

use std::io::Cursor;

use url::Url;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::{EntryKind, FileEntry};
use crate::remote::endpoints::ApiEndpoints;

/// The number of bytes to inspect for binary (null-byte) detection.
const BINARY_CHECK_SIZE: usize = 8192;

/// Extensions previewed as text when the server reports no `text/*` type.
pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "log", "csv", "json", "toml", "yaml", "yml", "ini", "cfg", "conf",
    "xml", "html", "css", "py", "js", "ts", "tsx", "jsx", "rs", "go", "c", "h", "cpp", "hpp",
    "java", "kt", "rb", "php", "sh", "bash", "zsh", "sql", "lua",
];

/// Mime type rendered as an embedded document.
const PDF_MIME: &str = "application/pdf";

/// The active preview session.
///
/// `failed` flips to `true` at most once and never back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewState {
    id: u64,
    entry: FileEntry,
    failed: bool,
}

impl PreviewState {
    /// Opens a session for `entry`. `id` must be unique per session so that
    /// content loads belonging to a discarded preview can be recognised.
    pub fn open(id: u64, entry: FileEntry) -> Self {
        Self {
            id,
            entry,
            failed: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn entry(&self) -> &FileEntry {
        &self.entry
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Records a content-load failure for session `id`.
    ///
    /// Returns `false` (and changes nothing) when `id` belongs to another
    /// session.
    pub fn fail(&mut self, id: u64) -> bool {
        if id != self.id {
            tracing::debug!(active = self.id, stale = id, "ignoring failure for closed preview");
            return false;
        }
        if !self.failed {
            tracing::warn!(path = %self.entry.path(), "preview content failed to load");
        }
        self.failed = true;
        true
    }
}

/// How a preview is rendered, without URLs attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalityKind {
    Error,
    Image,
    Video,
    EmbeddedDocument,
    EmbeddedText,
    Unsupported,
}

/// A resolved preview, carrying the URLs the renderer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewModality {
    Error,
    Image { source: Url },
    Video {
        source: Url,
        autoplay: bool,
        controls: bool,
    },
    EmbeddedDocument { source: Url },
    EmbeddedText { source: Url },
    Unsupported { download: Url },
}

impl PreviewModality {
    pub fn kind(&self) -> ModalityKind {
        match self {
            Self::Error => ModalityKind::Error,
            Self::Image { .. } => ModalityKind::Image,
            Self::Video { .. } => ModalityKind::Video,
            Self::EmbeddedDocument { .. } => ModalityKind::EmbeddedDocument,
            Self::EmbeddedText { .. } => ModalityKind::EmbeddedText,
            Self::Unsupported { .. } => ModalityKind::Unsupported,
        }
    }

    /// URL of the content to load, if this modality loads any.
    pub fn source(&self) -> Option<&Url> {
        match self {
            Self::Image { source }
            | Self::Video { source, .. }
            | Self::EmbeddedDocument { source }
            | Self::EmbeddedText { source } => Some(source),
            Self::Error | Self::Unsupported { .. } => None,
        }
    }
}

/// Maps a preview session to its rendering modality.
#[derive(Debug, Clone)]
pub struct PreviewDispatcher {
    endpoints: ApiEndpoints,
    text_extensions: Vec<String>,
}

impl PreviewDispatcher {
    /// Extensions are matched case-insensitively; a leading `.` is ignored.
    pub fn new<S: AsRef<str>>(endpoints: ApiEndpoints, text_extensions: &[S]) -> Self {
        Self {
            endpoints,
            text_extensions: normalize_extensions(text_extensions),
        }
    }

    /// Uses [`DEFAULT_TEXT_EXTENSIONS`].
    pub fn with_default_extensions(endpoints: ApiEndpoints) -> Self {
        Self::new(endpoints, DEFAULT_TEXT_EXTENSIONS)
    }

    pub fn text_extensions(&self) -> &[String] {
        &self.text_extensions
    }

    pub fn resolve(&self, state: &PreviewState) -> PreviewModality {
        let entry = state.entry();
        let source = || self.endpoints.view(entry.path());
        match resolve_kind(entry, state.is_failed(), &self.text_extensions) {
            ModalityKind::Error => PreviewModality::Error,
            ModalityKind::Image => PreviewModality::Image { source: source() },
            ModalityKind::Video => PreviewModality::Video {
                source: source(),
                autoplay: true,
                controls: true,
            },
            ModalityKind::EmbeddedDocument => PreviewModality::EmbeddedDocument { source: source() },
            ModalityKind::EmbeddedText => PreviewModality::EmbeddedText { source: source() },
            ModalityKind::Unsupported => PreviewModality::Unsupported {
                download: self.endpoints.download(entry.path()),
            },
        }
    }
}

/// The dispatch table. First matching rule wins.
///
/// `extensions` are expected lowercase without a leading dot.
pub fn resolve_kind(entry: &FileEntry, failed: bool, extensions: &[String]) -> ModalityKind {
    if failed {
        return ModalityKind::Error;
    }
    match entry.kind() {
        EntryKind::Image => return ModalityKind::Image,
        EntryKind::Video => return ModalityKind::Video,
        _ => {}
    }
    let mime = entry.mime().map(|m| m.trim().to_ascii_lowercase());
    if mime.as_deref() == Some(PDF_MIME) {
        return ModalityKind::EmbeddedDocument;
    }
    if mime.as_deref().is_some_and(|m| m.starts_with("text/"))
        || has_text_extension(entry.name(), extensions)
    {
        return ModalityKind::EmbeddedText;
    }
    ModalityKind::Unsupported
}

fn has_text_extension(name: &str, extensions: &[String]) -> bool {
    let lower = name.to_lowercase();
    extensions.iter().any(|ext| {
        lower
            .strip_suffix(ext.as_str())
            .is_some_and(|stem| stem.ends_with('.'))
    })
}

fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Strips ANSI escape sequences and other control characters from a string.
///
/// Handles CSI sequences (`\x1b[...`), OSC sequences (`\x1b]...\x07`),
/// single-character escape codes, and stray control characters.
fn strip_ansi_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    for next in chars.by_ref() {
                        if next.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next == '\x07' {
                            break;
                        }
                        if next == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                Some(_) => {
                    chars.next();
                }
                None => {}
            }
        } else if c == '\t' {
            // ratatui renders \t with zero width
            result.push_str("    ");
        } else if !c.is_control() {
            result.push(c);
        }
    }

    result
}

/// A truncated text preview of fetched content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPreview {
    /// The preview lines (up to `max_lines`), sanitised for the terminal.
    pub lines: Vec<String>,
    /// Total number of lines in the content.
    pub total_lines: usize,
    /// `true` when the content has more lines than were kept.
    pub is_truncated: bool,
}

/// Returns `true` if the bytes look binary (a null byte in the first 8 KB).
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(BINARY_CHECK_SIZE)].contains(&0)
}

/// Builds a text preview of at most `max_lines` lines.
///
/// Invalid UTF-8 is replaced rather than rejected.
///
/// # Errors
///
/// Returns [`CoreError::UndecodableContent`] if the bytes look binary.
pub fn text_preview(bytes: &[u8], max_lines: usize) -> CoreResult<TextPreview> {
    if is_binary(bytes) {
        return Err(CoreError::UndecodableContent(
            "binary content cannot be previewed as text".to_string(),
        ));
    }

    let text = String::from_utf8_lossy(bytes);
    let mut lines = Vec::with_capacity(max_lines.min(256));
    let mut total_lines = 0usize;
    for line in text.lines() {
        total_lines += 1;
        if lines.len() < max_lines {
            lines.push(strip_ansi_escapes(line));
        }
    }

    Ok(TextPreview {
        lines,
        total_lines,
        is_truncated: total_lines > max_lines,
    })
}

/// Dimensions and format of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub byte_size: u64,
}

/// Reads image dimensions from encoded bytes without decoding pixels.
///
/// # Errors
///
/// Returns [`CoreError::UndecodableContent`] when the format is unknown or
/// the header is corrupt.
pub fn read_image_info(bytes: &[u8]) -> CoreResult<ImageInfo> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoreError::UndecodableContent(format!("image: {e}")))?;
    let format = reader
        .format()
        .map(|f| format!("{f:?}").to_uppercase())
        .ok_or_else(|| CoreError::UndecodableContent("unknown image format".to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| CoreError::UndecodableContent(format!("image: {e}")))?;

    Ok(ImageInfo {
        width,
        height,
        format,
        byte_size: bytes.len() as u64,
    })
}

/// Metadata extracted from a PDF document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInfo {
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub byte_size: u64,
}

/// Reads PDF metadata (page count, title, author) from in-memory bytes.
///
/// # Errors
///
/// Returns [`CoreError::UndecodableContent`] if the PDF cannot be parsed.
pub fn read_pdf_info(bytes: &[u8]) -> CoreResult<PdfInfo> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| CoreError::UndecodableContent(format!("pdf: {e}")))?;

    let page_count = doc.get_pages().len();

    let (title, author) = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|info| match info {
            lopdf::Object::Reference(r) => doc.get_object(*r).ok(),
            other => Some(other),
        })
        .and_then(|obj| match obj {
            lopdf::Object::Dictionary(dict) => Some((
                dict.get(b"Title").ok().and_then(pdf_object_to_string),
                dict.get(b"Author").ok().and_then(pdf_object_to_string),
            )),
            _ => None,
        })
        .unwrap_or((None, None));

    Ok(PdfInfo {
        page_count,
        title,
        author,
        byte_size: bytes.len() as u64,
    })
}

fn pdf_object_to_string(obj: &lopdf::Object) -> Option<String> {
    match obj {
        lopdf::Object::String(bytes, _) | lopdf::Object::Name(bytes) => {
            String::from_utf8(bytes.clone()).ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> ApiEndpoints {
        ApiEndpoints::new("http://127.0.0.1:8000").unwrap()
    }

    fn dispatcher() -> PreviewDispatcher {
        PreviewDispatcher::with_default_extensions(endpoints())
    }

    fn file(name: &str, mime: Option<&str>) -> FileEntry {
        FileEntry::new(
            format!("docs/{name}"),
            name,
            false,
            10,
            None,
            mime.map(str::to_string),
        )
    }

    fn kind_of(entry: &FileEntry, failed: bool) -> ModalityKind {
        resolve_kind(entry, failed, dispatcher().text_extensions())
    }

    // === dispatch table ===

    #[test]
    fn failed_wins_over_everything() {
        for entry in [
            file("a.png", Some("image/png")),
            file("a.mp4", Some("video/mp4")),
            file("a.pdf", Some("application/pdf")),
            file("a.txt", Some("text/plain")),
            file("a.bin", None),
        ] {
            assert_eq!(kind_of(&entry, true), ModalityKind::Error);
        }
    }

    #[test]
    fn image_kind_resolves_to_image() {
        let entry = file("a.png", Some("image/png"));
        let state = PreviewState::open(1, entry);
        assert_eq!(
            dispatcher().resolve(&state),
            PreviewModality::Image {
                source: endpoints().view("docs/a.png")
            }
        );
    }

    #[test]
    fn video_resolves_with_autoplay_and_controls() {
        let state = PreviewState::open(1, file("clip.mp4", Some("video/mp4")));
        match dispatcher().resolve(&state) {
            PreviewModality::Video {
                source,
                autoplay,
                controls,
            } => {
                assert_eq!(source, endpoints().view("docs/clip.mp4"));
                assert!(autoplay);
                assert!(controls);
            }
            other => panic!("expected video, got {other:?}"),
        }
    }

    #[test]
    fn pdf_mime_resolves_to_document() {
        let entry = file("report.pdf", Some("application/pdf"));
        assert_eq!(kind_of(&entry, false), ModalityKind::EmbeddedDocument);
    }

    #[test]
    fn pdf_mime_match_ignores_case_and_padding() {
        let entry = file("report.pdf", Some(" Application/PDF "));
        assert_eq!(kind_of(&entry, false), ModalityKind::EmbeddedDocument);
    }

    #[test]
    fn pdf_extension_without_mime_is_unsupported() {
        let entry = file("report.pdf", None);
        assert_eq!(kind_of(&entry, false), ModalityKind::Unsupported);
    }

    #[test]
    fn text_mime_resolves_to_text() {
        let entry = file("notes", Some("text/x-readme"));
        assert_eq!(kind_of(&entry, false), ModalityKind::EmbeddedText);
    }

    #[test]
    fn text_extension_resolves_to_text_without_mime() {
        assert_eq!(kind_of(&file("notes.md", None), false), ModalityKind::EmbeddedText);
        assert_eq!(kind_of(&file("main.RS", None), false), ModalityKind::EmbeddedText);
    }

    #[test]
    fn extension_must_follow_a_dot() {
        assert_eq!(kind_of(&file("readmetxt", None), false), ModalityKind::Unsupported);
    }

    #[test]
    fn unknown_type_is_unsupported_with_download() {
        let state = PreviewState::open(1, file("archive.7z", Some("application/x-7z")));
        assert_eq!(
            dispatcher().resolve(&state),
            PreviewModality::Unsupported {
                download: endpoints().download("docs/archive.7z")
            }
        );
    }

    #[test]
    fn server_image_type_resolves_to_image_without_mime() {
        let entry: FileEntry = serde_json::from_value(serde_json::json!({
            "name": "IMG_0001", "path": "camera/IMG_0001", "is_dir": false,
            "size": 2048, "mtime": 1.0, "type": "image", "mime": null
        }))
        .unwrap();
        let state = PreviewState::open(4, entry);
        assert_eq!(
            dispatcher().resolve(&state),
            PreviewModality::Image {
                source: endpoints().view("camera/IMG_0001")
            }
        );
    }

    #[test]
    fn octet_stream_without_text_extension_is_unsupported() {
        let state = PreviewState::open(2, file("disk.img", Some("application/octet-stream")));
        assert_eq!(
            dispatcher().resolve(&state),
            PreviewModality::Unsupported {
                download: endpoints().download("docs/disk.img")
            }
        );
    }

    #[test]
    fn octet_stream_with_text_extension_is_text() {
        let entry = file("build.log", Some("application/octet-stream"));
        assert_eq!(kind_of(&entry, false), ModalityKind::EmbeddedText);
    }

    #[test]
    fn image_kind_precedes_text_extension() {
        let entry = file("diagram.svg.txt", Some("image/svg+xml"));
        assert_eq!(kind_of(&entry, false), ModalityKind::Image);
    }

    #[test]
    fn configured_extensions_replace_defaults() {
        let d = PreviewDispatcher::new(endpoints(), &[".LOG"]);
        assert_eq!(d.text_extensions(), ["log".to_string()]);
        let state = PreviewState::open(1, file("a.md", None));
        assert_eq!(d.resolve(&state).kind(), ModalityKind::Unsupported);
        let state = PreviewState::open(2, file("server.Log", None));
        assert_eq!(d.resolve(&state).kind(), ModalityKind::EmbeddedText);
    }

    #[test]
    fn resolve_agrees_with_resolve_kind() {
        let d = dispatcher();
        for (entry, failed) in [
            (file("a.png", Some("image/png")), false),
            (file("a.webm", Some("video/webm")), false),
            (file("a.pdf", Some("application/pdf")), false),
            (file("a.py", None), false),
            (file("a.bin", None), false),
            (file("a.png", Some("image/png")), true),
        ] {
            let mut state = PreviewState::open(7, entry.clone());
            if failed {
                state.fail(7);
            }
            assert_eq!(d.resolve(&state).kind(), kind_of(&entry, failed));
        }
    }

    #[test]
    fn source_is_present_only_for_loading_modalities() {
        let d = dispatcher();
        let text = d.resolve(&PreviewState::open(1, file("a.txt", None)));
        assert_eq!(text.source(), Some(&endpoints().view("docs/a.txt")));
        let unsupported = d.resolve(&PreviewState::open(2, file("a.bin", None)));
        assert_eq!(unsupported.source(), None);
        assert_eq!(PreviewModality::Error.source(), None);
    }

    // === PreviewState ===

    #[test]
    fn fail_with_matching_id_is_terminal() {
        let mut state = PreviewState::open(3, file("a.png", Some("image/png")));
        assert!(!state.is_failed());
        assert!(state.fail(3));
        assert!(state.is_failed());
        assert!(state.fail(3));
        assert!(state.is_failed());
        assert_eq!(dispatcher().resolve(&state), PreviewModality::Error);
    }

    #[test]
    fn fail_with_stale_id_is_ignored() {
        let mut state = PreviewState::open(4, file("a.png", Some("image/png")));
        assert!(!state.fail(3));
        assert!(!state.is_failed());
        assert_eq!(dispatcher().resolve(&state).kind(), ModalityKind::Image);
    }

    // === byte helpers ===

    #[test]
    fn text_preview_truncates() {
        let content = (1..=10).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let preview = text_preview(content.as_bytes(), 3).unwrap();
        assert_eq!(preview.lines, vec!["line 1", "line 2", "line 3"]);
        assert_eq!(preview.total_lines, 10);
        assert!(preview.is_truncated);
    }

    #[test]
    fn text_preview_short_content_not_truncated() {
        let preview = text_preview(b"a\nb\n", 10).unwrap();
        assert_eq!(preview.lines, vec!["a", "b"]);
        assert_eq!(preview.total_lines, 2);
        assert!(!preview.is_truncated);
    }

    #[test]
    fn text_preview_rejects_binary() {
        let err = text_preview(b"PK\x03\x04\x00\x00", 10).unwrap_err();
        assert!(matches!(err, CoreError::UndecodableContent(_)));
    }

    #[test]
    fn text_preview_replaces_invalid_utf8() {
        let preview = text_preview(b"caf\xe9", 10).unwrap();
        assert_eq!(preview.lines, vec!["caf\u{fffd}"]);
    }

    #[test]
    fn text_preview_strips_escapes_and_expands_tabs() {
        let preview = text_preview(b"\x1b[31mred\x1b[0m\tx\x07", 10).unwrap();
        assert_eq!(preview.lines, vec!["red    x"]);
    }

    #[test]
    fn strip_osc_sequence() {
        assert_eq!(strip_ansi_escapes("\x1b]0;title\x07ok"), "ok");
        assert_eq!(strip_ansi_escapes("\x1b]0;title\x1b\\ok"), "ok");
    }

    #[test]
    fn binary_check_only_looks_at_prefix() {
        let mut bytes = vec![b'a'; BINARY_CHECK_SIZE];
        bytes.push(0);
        assert!(!is_binary(&bytes));
        assert!(is_binary(&[0u8]));
        assert!(!is_binary(&[]));
    }

    #[test]
    fn image_info_reads_png_dimensions() {
        let img = image::RgbImage::new(3, 2);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        let bytes = buf.into_inner();

        let info = read_image_info(&bytes).unwrap();
        assert_eq!((info.width, info.height), (3, 2));
        assert_eq!(info.format, "PNG");
        assert_eq!(info.byte_size, bytes.len() as u64);
    }

    #[test]
    fn image_info_rejects_garbage() {
        assert!(matches!(
            read_image_info(b"definitely not an image"),
            Err(CoreError::UndecodableContent(_))
        ));
    }

    #[test]
    fn pdf_info_reads_pages_and_title() {
        use lopdf::{dictionary, Document, Object};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Quarterly"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let info = read_pdf_info(&bytes).unwrap();
        assert_eq!(info.page_count, 1);
        assert_eq!(info.title.as_deref(), Some("Quarterly"));
        assert_eq!(info.author, None);
    }

    #[test]
    fn pdf_info_rejects_garbage() {
        assert!(matches!(
            read_pdf_info(b"%PDF-garbage"),
            Err(CoreError::UndecodableContent(_))
        ));
    }
}
