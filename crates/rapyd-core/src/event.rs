//! Event system for communication between UI and Core.
//!
//! The UI translates user input into [`Command`]s and applies them to the
//! core; the core answers with [`Event`]s that the UI turns into status
//! notices and cursor resets.

use std::path::PathBuf;

/// An action the UI requests.
///
/// Commands flow **UI → Core**. The core never creates commands itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Move the cursor up by one entry.
    CursorUp,
    /// Move the cursor down by one entry.
    CursorDown,
    /// Jump to the first entry.
    CursorFirst,
    /// Jump to the last entry.
    CursorLast,
    /// Activate the selected entry (enter a directory or preview a file).
    Activate,
    /// Move to the parent directory.
    GoUp,
    /// Re-list the current directory.
    Reload,
    /// Start editing the filter query.
    BeginSearch,
    /// Replace the filter query.
    SetQuery(String),
    /// Clear the filter query and leave search mode.
    ClearQuery,
    /// Download the selected entry, or the previewed one.
    Download,
    /// Close the active preview.
    ClosePreview,
    /// Switch between list and detail view.
    ToggleViewMode,
    /// Switch between light and dark theme.
    ToggleTheme,
    /// Exit the application.
    Quit,
}

/// A notification the core sends back to the UI.
///
/// Events flow **Core → UI**.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A listing settled successfully and became the current directory.
    DirectoryLoaded {
        /// Store-relative path; `""` is the root.
        path: String,
        /// Number of entries in the listing.
        count: usize,
    },
    /// The latest listing request failed; the previous listing is kept.
    ListingFailed {
        path: String,
        error: String,
    },
    /// A download finished.
    DownloadComplete {
        name: String,
        target: PathBuf,
    },
    /// A download failed.
    DownloadFailed {
        name: String,
        error: String,
    },
}

impl Event {
    /// One-line status-bar text for this event.
    pub fn notice(&self) -> String {
        match self {
            Self::DirectoryLoaded { path, count } => {
                let shown = if path.is_empty() { "Home" } else { path.as_str() };
                format!("{shown}: {count} items")
            }
            Self::ListingFailed { path, error } => {
                let shown = if path.is_empty() { "Home" } else { path.as_str() };
                format!("Could not open {shown}: {error}")
            }
            Self::DownloadComplete { name, target } => {
                format!("Downloaded {name} to {}", target.display())
            }
            Self::DownloadFailed { name, error } => format!("Download of {name} failed: {error}"),
        }
    }

    /// `true` for events that report a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ListingFailed { .. } | Self::DownloadFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_shown_as_home() {
        let event = Event::DirectoryLoaded {
            path: String::new(),
            count: 3,
        };
        assert_eq!(event.notice(), "Home: 3 items");
        assert!(!event.is_error());
    }

    #[test]
    fn listing_failure_notice() {
        let event = Event::ListingFailed {
            path: "photos".to_string(),
            error: "listing of 'photos' failed with status 500".to_string(),
        };
        assert_eq!(
            event.notice(),
            "Could not open photos: listing of 'photos' failed with status 500"
        );
        assert!(event.is_error());
    }

    #[test]
    fn download_notices() {
        let done = Event::DownloadComplete {
            name: "a.txt".to_string(),
            target: PathBuf::from("/tmp/a.txt"),
        };
        assert_eq!(done.notice(), "Downloaded a.txt to /tmp/a.txt");

        let failed = Event::DownloadFailed {
            name: "a.txt".to_string(),
            error: "boom".to_string(),
        };
        assert_eq!(failed.notice(), "Download of a.txt failed: boom");
        assert!(failed.is_error());
    }
}
