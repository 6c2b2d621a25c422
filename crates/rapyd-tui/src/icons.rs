//! Nerd Font glyphs for listing rows.
//!
//! The server-reported kind wins for media, then well-known file names,
//! then the extension, and finally the MIME family.

use rapyd_core::{EntryKind, FileEntry};

const FOLDER: &str = "\u{f07b} ";
const IMAGE: &str = "\u{f1c5} ";
const VIDEO: &str = "\u{f03d} ";
const AUDIO: &str = "\u{f001} ";
const TEXT: &str = "\u{f15c} ";
const GENERIC: &str = "\u{f15b} ";

/// Returns the glyph (with trailing space) for `entry`.
pub fn icon_for_entry(entry: &FileEntry) -> &'static str {
    match entry.kind() {
        EntryKind::Directory => FOLDER,
        EntryKind::Image => IMAGE,
        EntryKind::Video => VIDEO,
        EntryKind::File => icon_for_name(entry.name())
            .or_else(|| entry.mime().and_then(icon_for_mime))
            .unwrap_or(GENERIC),
    }
}

fn icon_for_name(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    let special = match lower.as_str() {
        "makefile" | "gnumakefile" => Some("\u{e779} "),
        "dockerfile" => Some("\u{f308} "),
        "license" | "licence" => Some("\u{f0219} "),
        "readme" => Some("\u{e73e} "),
        ".gitignore" | ".gitattributes" => Some("\u{e702} "),
        _ => None,
    };
    if special.is_some() {
        return special;
    }

    let ext = lower.rsplit_once('.').map(|(_, ext)| ext)?;
    let icon = match ext {
        "rs" => "\u{e7a8} ",
        "py" | "pyi" => "\u{e73c} ",
        "js" | "mjs" | "cjs" => "\u{e74e} ",
        "ts" | "tsx" => "\u{e628} ",
        "go" => "\u{e724} ",
        "c" | "h" => "\u{e61e} ",
        "cpp" | "cc" | "hpp" => "\u{e61d} ",
        "java" => "\u{e738} ",
        "sh" | "bash" | "zsh" => "\u{f489} ",
        "html" | "htm" => "\u{e736} ",
        "css" | "scss" => "\u{e749} ",
        "json" => "\u{e60b} ",
        "toml" | "ini" | "cfg" | "conf" => "\u{e615} ",
        "yaml" | "yml" => "\u{e6a8} ",
        "xml" => "\u{e619} ",
        "md" | "markdown" => "\u{e73e} ",
        "txt" | "log" | "csv" => TEXT,
        "pdf" => "\u{f1c1} ",
        "doc" | "docx" | "odt" => "\u{f1c2} ",
        "xls" | "xlsx" | "ods" => "\u{f1c3} ",
        "ppt" | "pptx" => "\u{f1c4} ",
        "zip" | "tar" | "gz" | "bz2" | "xz" | "7z" | "rar" => "\u{f410} ",
        "mp3" | "wav" | "flac" | "ogg" | "m4a" => AUDIO,
        _ => return None,
    };
    Some(icon)
}

fn icon_for_mime(mime: &str) -> Option<&'static str> {
    let (family, subtype) = mime.split_once('/')?;
    match (family, subtype) {
        ("audio", _) => Some(AUDIO),
        ("text", _) => Some(TEXT),
        ("application", "pdf") => Some("\u{f1c1} "),
        ("application", "zip" | "gzip" | "x-tar" | "x-7z-compressed") => Some("\u{f410} "),
        _ => None,
    }
}
