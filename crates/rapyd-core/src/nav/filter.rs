//! Filtering and ordering of a directory listing.
//!
//! [`view`] is the single entry point used by the presentation layer: it
//! keeps the entries whose name contains the query (case-insensitively) and
//! orders them directories-first, then alphabetically with a locale-aware
//! name comparison. Everything here is pure.

use feruca::Collator;
use unicode_normalization::UnicodeNormalization;

use crate::fs::entry::FileEntry;

/// Derives the displayed sequence from a listing and the live query.
///
/// Deterministic and idempotent: `view(&view(e, q), q) == view(e, q)`.
/// The input slice is never mutated.
pub fn view(entries: &[FileEntry], query: &str) -> Vec<FileEntry> {
    sort_entries(&filter_by_name(entries, query))
}

/// Keeps entries whose name contains `query`, ignoring case.
///
/// An empty query keeps every entry.
pub fn filter_by_name(entries: &[FileEntry], query: &str) -> Vec<FileEntry> {
    if query.is_empty() {
        return entries.to_vec();
    }
    let needle = fold_case(query);
    entries
        .iter()
        .filter(|e| fold_case(e.name()).contains(&needle))
        .cloned()
        .collect()
}

/// Sorts directories before files, then by name in CLDR root collation
/// order.
///
/// The collator compares letters first (`ß` as `ss`, `ø` after `o`,
/// punctuation ignored), then accents, then case with lowercase first.
/// Names that still tie fall back to the entry path so the order is total.
pub fn sort_entries(entries: &[FileEntry]) -> Vec<FileEntry> {
    let mut collator = Collator::default();
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        b.is_dir()
            .cmp(&a.is_dir())
            .then_with(|| collator.collate(a.name(), b.name()))
            .then_with(|| a.path().cmp(b.path()))
    });
    sorted
}

fn fold_case(s: &str) -> String {
    s.nfc().flat_map(char::to_lowercase).collect()
}
