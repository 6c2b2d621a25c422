//! Directory navigation state machine.
//!
//! [`NavigationController`] owns the [`NavigationState`] and is its only
//! writer. Every navigation issues a [`ListingRequest`] tagged with a
//! generation number; the caller runs it against a [`ListingService`] and
//! hands the [`ListingResponse`] back to [`NavigationController::settle`].
//! Only the response to the most recently issued request is applied, so a
//! slow listing can never overwrite a newer one.

use crate::error::{CoreError, CoreResult};
use crate::event::Event;
use crate::fs::entry::FileEntry;
use crate::fs::preview::PreviewState;
use crate::nav::filter;
use crate::remote::listing::ListingService;

/// What the user is looking at.
///
/// `current_path` and `entries` always belong together: they are replaced
/// only by a successful, non-stale listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    current_path: String,
    entries: Vec<FileEntry>,
    is_loading: bool,
    query: String,
}

impl NavigationState {
    /// `""` is the root.
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// The last successfully listed entries, in service order.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// `true` while the most recent request has not settled.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_root(&self) -> bool {
        self.current_path.is_empty()
    }
}

/// A listing to perform. Produced by the controller, run by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    generation: u64,
    path: String,
}

impl ListingRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Performs the listing and packages the outcome for `settle`.
    pub async fn run(self, service: &dyn ListingService) -> ListingResponse {
        let result = service.list(&self.path).await;
        self.respond(result)
    }

    /// Attaches a result obtained elsewhere to this request.
    pub fn respond(self, result: CoreResult<Vec<FileEntry>>) -> ListingResponse {
        ListingResponse {
            generation: self.generation,
            path: self.path,
            result,
        }
    }
}

/// The outcome of a [`ListingRequest`].
#[derive(Debug)]
pub struct ListingResponse {
    generation: u64,
    path: String,
    result: CoreResult<Vec<FileEntry>>,
}

impl ListingResponse {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Result of activating an entry.
#[derive(Debug)]
pub enum Activation {
    /// A directory: run the request to enter it.
    Navigate(ListingRequest),
    /// A file: show this preview session.
    Preview(PreviewState),
}

/// Single writer of [`NavigationState`], implementing last-request-wins.
#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    state: NavigationState,
    latest_generation: u64,
    next_preview_id: u64,
    clear_query_on_navigate: bool,
}

impl NavigationController {
    /// Starts at the root with no entries. Nothing is requested yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// When enabled, the filter query is cleared each time a listing of a
    /// different directory succeeds.
    pub fn with_clear_query_on_navigate(self, clear: bool) -> Self {
        Self {
            clear_query_on_navigate: clear,
            ..self
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn current_path(&self) -> &str {
        self.state.current_path()
    }

    pub fn entries(&self) -> &[FileEntry] {
        self.state.entries()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn query(&self) -> &str {
        self.state.query()
    }

    /// Issues a listing request for `path`, superseding any outstanding one.
    pub fn refresh(&mut self, path: impl Into<String>) -> ListingRequest {
        self.latest_generation += 1;
        self.state.is_loading = true;
        let request = ListingRequest {
            generation: self.latest_generation,
            path: path.into(),
        };
        tracing::debug!(
            generation = request.generation,
            path = %request.path,
            "listing requested"
        );
        request
    }

    /// Applies a listing outcome.
    ///
    /// Responses to superseded requests are dropped and yield `None`. A
    /// failure keeps the current path and entries and clears the loading
    /// flag.
    pub fn settle(&mut self, response: ListingResponse) -> Option<Event> {
        if response.generation != self.latest_generation {
            tracing::debug!(
                generation = response.generation,
                latest = self.latest_generation,
                path = %response.path,
                "discarding stale listing"
            );
            return None;
        }

        self.state.is_loading = false;
        match response.result {
            Ok(entries) => {
                let count = entries.len();
                if self.clear_query_on_navigate && response.path != self.state.current_path {
                    self.state.query.clear();
                }
                self.state.current_path = response.path.clone();
                self.state.entries = entries;
                tracing::debug!(path = %response.path, count, "listing applied");
                Some(Event::DirectoryLoaded {
                    path: response.path,
                    count,
                })
            }
            Err(err) => {
                tracing::warn!(path = %response.path, error = %err, "listing failed");
                Some(Event::ListingFailed {
                    path: response.path,
                    error: err.to_string(),
                })
            }
        }
    }

    /// Requests the listing of a child directory.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotADirectory`] for a file; nothing is requested.
    pub fn enter(&mut self, entry: &FileEntry) -> CoreResult<ListingRequest> {
        if !entry.is_dir() {
            return Err(CoreError::NotADirectory(entry.path().to_string()));
        }
        Ok(self.refresh(entry.path()))
    }

    /// Requests the parent of the current directory. `None` at the root.
    pub fn up(&mut self) -> Option<ListingRequest> {
        if self.state.is_root() {
            return None;
        }
        let parent = parent_path(&self.state.current_path).to_string();
        Some(self.refresh(parent))
    }

    /// Re-lists the current directory.
    pub fn reload(&mut self) -> ListingRequest {
        let path = self.state.current_path.clone();
        self.refresh(path)
    }

    /// Enters a directory or opens a fresh preview session for a file.
    pub fn activate(&mut self, entry: &FileEntry) -> Activation {
        if entry.is_dir() {
            return Activation::Navigate(self.refresh(entry.path()));
        }
        self.next_preview_id += 1;
        Activation::Preview(PreviewState::open(self.next_preview_id, entry.clone()))
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
    }

    /// Filtered and sorted entries for display.
    pub fn view(&self) -> Vec<FileEntry> {
        filter::view(&self.state.entries, &self.state.query)
    }

    /// Lists `path` and settles the result in one step.
    pub async fn navigate(
        &mut self,
        service: &dyn ListingService,
        path: impl Into<String>,
    ) -> Option<Event> {
        let response = self.refresh(path).run(service).await;
        self.settle(response)
    }
}

/// Drops the last `/`-separated segment. A single segment's parent is the
/// root (`""`), and the root is its own parent.
pub fn parent_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => trimmed[..idx].trim_end_matches('/'),
        None => "",
    }
}
