//! RapydView core library: UI-agnostic remote file browsing logic.
//!
//! `rapyd-core` holds the state machine behind the browser: which directory
//! is shown, how its entries are filtered and ordered, and how a selected
//! file is previewed. It talks to the file service over HTTP but knows
//! nothing about terminals, so the TUI (`rapyd-tui`) is a thin shell
//! around it.
//!
//! # Modules
//!
//! - [`fs`]: [`FileEntry`] and preview sessions/modality dispatch.
//! - [`nav`]: [`NavigationController`] (last-request-wins listing) and filtering/sorting.
//! - [`remote`]: HTTP listing, content and download clients.
//! - [`config`]: TOML settings, persisted preferences and themes.
//! - [`event`]: Command and event types for UI ↔ Core communication.
//! - [`error`]: Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod config;
pub mod error;
pub mod event;
pub mod fs;
pub mod nav;
pub mod remote;

pub use config::prefs::{Preferences, ThemeMode, ViewMode};
pub use config::settings::Config;
pub use config::theme::{parse_color, Theme};
pub use error::{CoreError, CoreResult};
pub use event::{Command, Event};
pub use fs::entry::{EntryKind, FileEntry};
pub use fs::preview::{
    ModalityKind, PreviewDispatcher, PreviewModality, PreviewState, DEFAULT_TEXT_EXTENSIONS,
};
pub use nav::controller::{Activation, ListingRequest, ListingResponse, NavigationController};
pub use nav::filter::view;
pub use remote::content::ContentClient;
pub use remote::endpoints::ApiEndpoints;
pub use remote::listing::{HttpListingClient, ListingService};
