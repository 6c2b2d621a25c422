//! Remote directory entry representation.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;

/// Coarse classification of an entry, used to pick an icon and a preview strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Directory,
    Image,
    Video,
    File,
}

impl EntryKind {
    /// Derives the kind from the directory flag and the reported MIME type.
    pub fn derive(is_dir: bool, mime: Option<&str>) -> Self {
        if is_dir {
            return EntryKind::Directory;
        }
        match mime {
            Some(m) if m.starts_with("image") => EntryKind::Image,
            Some(m) if m.starts_with("video") => EntryKind::Video,
            _ => EntryKind::File,
        }
    }

    /// Parses the `type` tag used by the listing service.
    pub fn from_wire(tag: &str) -> Option<Self> {
        match tag {
            "folder" | "directory" => Some(EntryKind::Directory),
            "image" => Some(EntryKind::Image),
            "video" => Some(EntryKind::Video),
            "file" => Some(EntryKind::File),
            _ => None,
        }
    }

    /// Reconciles a server-supplied kind with the directory flag.
    ///
    /// A directory is always [`EntryKind::Directory`]; a file never is, and
    /// falls back to the MIME-derived kind when the server claims otherwise.
    fn reconcile(reported: Option<Self>, is_dir: bool, mime: Option<&str>) -> Self {
        match reported {
            _ if is_dir => EntryKind::Directory,
            Some(kind) if kind != EntryKind::Directory => kind,
            _ => Self::derive(false, mime),
        }
    }
}

/// One file or directory as reported by the listing service.
///
/// `FileEntry` is immutable. `path` is the stable identity of the entry
/// across the whole tree and is the key for every service call. Directory
/// sizes are always reported as `0`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireEntry")]
pub struct FileEntry {
    path: String,
    name: String,
    size: u64,
    modified: Option<SystemTime>,
    is_dir: bool,
    mime: Option<String>,
    kind: EntryKind,
}

impl FileEntry {
    /// Creates an entry, deriving its [`EntryKind`] from `is_dir` and `mime`.
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        is_dir: bool,
        size: u64,
        modified: Option<SystemTime>,
        mime: Option<String>,
    ) -> Self {
        let kind = EntryKind::derive(is_dir, mime.as_deref());
        Self {
            path: path.into(),
            name: name.into().nfc().collect(),
            size: if is_dir { 0 } else { size },
            modified,
            is_dir,
            mime,
            kind,
        }
    }

    /// Returns a copy with a server-supplied kind, reconciled against `is_dir`.
    pub fn with_reported_kind(self, kind: EntryKind) -> Self {
        let kind = EntryKind::reconcile(Some(kind), self.is_dir, self.mime.as_deref());
        Self { kind, ..self }
    }

    /// Fully-qualified `/`-separated path relative to the store root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Display label, unique within the parent directory.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes. Always `0` for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Last-modified time, if the service reported a usable timestamp.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Server-reported content type.
    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }
}

/// JSON shape of a listing item.
#[derive(Debug, Deserialize)]
struct WireEntry {
    name: String,
    path: String,
    is_dir: bool,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    mtime: Option<f64>,
    #[serde(default)]
    mime: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl From<WireEntry> for FileEntry {
    fn from(wire: WireEntry) -> Self {
        let reported = wire.kind.as_deref().and_then(EntryKind::from_wire);
        let modified = wire.mtime.and_then(epoch_seconds);
        let entry = FileEntry::new(
            wire.path,
            wire.name,
            wire.is_dir,
            wire.size,
            modified,
            wire.mime,
        );
        match reported {
            Some(kind) => entry.with_reported_kind(kind),
            None => entry,
        }
    }
}

fn epoch_seconds(secs: f64) -> Option<SystemTime> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let offset = Duration::try_from_secs_f64(secs).ok()?;
    UNIX_EPOCH.checked_add(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> FileEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn deserialize_regular_file() {
        let entry = parse(json!({
            "name": "notes.txt",
            "path": "docs/notes.txt",
            "is_dir": false,
            "size": 42,
            "mtime": 1_700_000_000.5,
            "mime": "text/plain",
            "type": "file"
        }));

        assert_eq!(entry.name(), "notes.txt");
        assert_eq!(entry.path(), "docs/notes.txt");
        assert!(!entry.is_dir());
        assert_eq!(entry.size(), 42);
        assert_eq!(entry.mime(), Some("text/plain"));
        assert_eq!(entry.kind(), EntryKind::File);
        let secs = entry
            .modified()
            .unwrap()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs_f64();
        assert!((secs - 1_700_000_000.5).abs() < 1e-3);
    }

    #[test]
    fn deserialize_directory_forces_zero_size() {
        let entry = parse(json!({
            "name": "photos",
            "path": "photos",
            "is_dir": true,
            "size": 4096,
            "mtime": 0,
            "mime": null,
            "type": "folder"
        }));

        assert!(entry.is_dir());
        assert_eq!(entry.size(), 0, "directory size should always be 0");
        assert_eq!(entry.kind(), EntryKind::Directory);
        assert_eq!(entry.mime(), None);
    }

    #[test]
    fn kind_derived_from_mime_when_type_missing() {
        let image = parse(json!({
            "name": "a.png", "path": "a.png", "is_dir": false,
            "size": 1, "mtime": 1.0, "mime": "image/png"
        }));
        let video = parse(json!({
            "name": "b.mp4", "path": "b.mp4", "is_dir": false,
            "size": 1, "mtime": 1.0, "mime": "video/mp4"
        }));
        let other = parse(json!({
            "name": "c.bin", "path": "c.bin", "is_dir": false,
            "size": 1, "mtime": 1.0, "mime": null
        }));

        assert_eq!(image.kind(), EntryKind::Image);
        assert_eq!(video.kind(), EntryKind::Video);
        assert_eq!(other.kind(), EntryKind::File);
    }

    #[test]
    fn server_type_wins_for_files() {
        let entry = parse(json!({
            "name": "IMG_0001", "path": "IMG_0001", "is_dir": false,
            "size": 10, "mtime": 1.0, "mime": null, "type": "image"
        }));
        assert_eq!(entry.kind(), EntryKind::Image);
    }

    #[test]
    fn directory_flag_overrides_server_type() {
        let entry = parse(json!({
            "name": "clips", "path": "clips", "is_dir": true,
            "size": 0, "mtime": 1.0, "mime": null, "type": "video"
        }));
        assert_eq!(entry.kind(), EntryKind::Directory);
    }

    #[test]
    fn folder_type_on_file_falls_back_to_mime() {
        let entry = parse(json!({
            "name": "x.jpg", "path": "x.jpg", "is_dir": false,
            "size": 1, "mtime": 1.0, "mime": "image/jpeg", "type": "folder"
        }));
        assert_eq!(entry.kind(), EntryKind::Image);
    }

    #[test]
    fn unknown_type_tag_is_ignored() {
        let entry = parse(json!({
            "name": "song.mp3", "path": "song.mp3", "is_dir": false,
            "size": 1, "mtime": 1.0, "mime": "audio/mpeg", "type": "audio"
        }));
        assert_eq!(entry.kind(), EntryKind::File);
    }

    #[test]
    fn negative_mtime_yields_no_timestamp() {
        let entry = parse(json!({
            "name": "old", "path": "old", "is_dir": false,
            "size": 1, "mtime": -5.0, "mime": null
        }));
        assert!(entry.modified().is_none());
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let result: Result<FileEntry, _> =
            serde_json::from_value(json!({ "name": "a", "is_dir": false }));
        assert!(result.is_err());
    }

    #[test]
    fn name_is_normalised_to_nfc() {
        // "é" as 'e' + COMBINING ACUTE ACCENT
        let entry = FileEntry::new("cafe\u{301}", "cafe\u{301}", false, 0, None, None);
        assert_eq!(entry.name(), "caf\u{e9}");
    }

    #[test]
    fn new_directory_has_directory_kind() {
        let entry = FileEntry::new("a/b", "b", true, 99, None, Some("image/png".into()));
        assert_eq!(entry.kind(), EntryKind::Directory);
        assert_eq!(entry.size(), 0);
    }
}
