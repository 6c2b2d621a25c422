//! Application state for the terminal frontend.
//!
//! [`App`] is updated by value: each command or background message consumes
//! the current state and returns the next one, plus the [`Effect`]s the main
//! loop must carry out (network tasks, preference writes).

use rapyd_core::{
    Activation, Command, Config, Event, FileEntry, ListingRequest, ModalityKind,
    NavigationController, Preferences, PreviewDispatcher, PreviewModality, PreviewState, Theme,
    ThemeMode,
};

use crate::background::{BackgroundMessage, ContentKind, LoadedContent, PreviewJob, FULL_IMAGE_LIMIT};
use crate::ui::statusbar::Notice;

/// Which surface receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    /// Typing edits the filter query.
    Search,
    Preview,
    Help,
}

/// Work the main loop performs on behalf of the app.
#[derive(Debug)]
pub enum Effect {
    List(ListingRequest),
    LoadPreview(PreviewJob),
    Download(FileEntry),
    SavePrefs(Preferences),
}

/// Loading progress of the active preview's content.
#[derive(Debug, Clone)]
pub enum ContentState {
    /// The modality renders from metadata alone.
    NotNeeded,
    Loading,
    Ready(LoadedContent),
}

/// The preview overlay: the session, its resolved modality and content.
#[derive(Debug, Clone)]
pub struct PreviewSession {
    state: PreviewState,
    modality: PreviewModality,
    content: ContentState,
    scroll: u16,
}

impl PreviewSession {
    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn entry(&self) -> &FileEntry {
        self.state.entry()
    }

    pub fn modality(&self) -> &PreviewModality {
        &self.modality
    }

    pub fn content(&self) -> &ContentState {
        &self.content
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Number of scrollable text rows, `0` for non-text content.
    fn scroll_limit(&self) -> u16 {
        match &self.content {
            ContentState::Ready(LoadedContent::Text(text)) => {
                u16::try_from(text.lines.len()).unwrap_or(u16::MAX)
            }
            _ => 0,
        }
    }
}

pub struct App {
    nav: NavigationController,
    visible: Vec<FileEntry>,
    cursor: usize,
    mode: AppMode,
    preview: Option<PreviewSession>,
    dispatcher: PreviewDispatcher,
    prefs: Preferences,
    theme: Theme,
    dark_theme: Theme,
    show_icons: bool,
    date_format: String,
    notice: Option<Notice>,
    should_quit: bool,
}

impl App {
    /// `dark_theme` replaces the built-in dark palette (e.g. from a theme
    /// file); the configured syntax theme is applied to it.
    pub fn new(
        dispatcher: PreviewDispatcher,
        config: &Config,
        prefs: Preferences,
        dark_theme: Theme,
    ) -> Self {
        let mut dark_theme = dark_theme;
        dark_theme.preview.syntax_theme = config.preview.syntax_theme.clone();
        let theme = palette(prefs.theme, &dark_theme);

        Self {
            nav: NavigationController::new()
                .with_clear_query_on_navigate(config.general.clear_query_on_navigate),
            visible: Vec::new(),
            cursor: 0,
            mode: AppMode::Normal,
            preview: None,
            dispatcher,
            prefs,
            theme,
            dark_theme,
            show_icons: config.ui.show_icons,
            date_format: config.ui.date_format.clone(),
            notice: None,
            should_quit: false,
        }
    }

    /// Requests the root listing.
    pub fn start(mut self) -> (Self, Vec<Effect>) {
        let request = self.nav.refresh("");
        (self, vec![Effect::List(request)])
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn current_path(&self) -> &str {
        self.nav.current_path()
    }

    pub fn is_loading(&self) -> bool {
        self.nav.is_loading()
    }

    pub fn query(&self) -> &str {
        self.nav.query()
    }

    /// Filtered and sorted entries, as displayed.
    pub fn visible(&self) -> &[FileEntry] {
        &self.visible
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected_entry(&self) -> Option<&FileEntry> {
        self.visible.get(self.cursor)
    }

    pub fn preview(&self) -> Option<&PreviewSession> {
        self.preview.as_ref()
    }

    pub fn prefs(&self) -> Preferences {
        self.prefs
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn show_icons(&self) -> bool {
        self.show_icons
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn with_mode(self, mode: AppMode) -> Self {
        Self { mode, ..self }
    }

    fn with_notice(self, text: impl Into<String>, is_error: bool) -> Self {
        Self {
            notice: Some(Notice {
                text: text.into(),
                is_error,
            }),
            ..self
        }
    }

    /// Applies a user command.
    pub fn handle_command(mut self, cmd: Command) -> (Self, Vec<Effect>) {
        match cmd {
            Command::CursorUp | Command::CursorDown | Command::CursorFirst | Command::CursorLast
                if self.mode == AppMode::Preview =>
            {
                (self.scroll_preview(&cmd), Vec::new())
            }
            Command::CursorUp => {
                self.cursor = self.cursor.saturating_sub(1);
                (self, Vec::new())
            }
            Command::CursorDown => {
                if self.cursor + 1 < self.visible.len() {
                    self.cursor += 1;
                }
                (self, Vec::new())
            }
            Command::CursorFirst => {
                self.cursor = 0;
                (self, Vec::new())
            }
            Command::CursorLast => {
                self.cursor = self.visible.len().saturating_sub(1);
                (self, Vec::new())
            }
            Command::Activate => self.activate_selected(),
            Command::GoUp => match self.nav.up() {
                Some(request) => (self, vec![Effect::List(request)]),
                None => (self.with_notice("Already at Home", false), Vec::new()),
            },
            Command::Reload => {
                let request = self.nav.reload();
                (self, vec![Effect::List(request)])
            }
            Command::BeginSearch => (self.with_mode(AppMode::Search), Vec::new()),
            Command::SetQuery(query) => {
                self.nav.set_query(query);
                (self.rebuild_view(None), Vec::new())
            }
            Command::ClearQuery => {
                let keep = self.selected_entry().map(|e| e.path().to_owned());
                self.nav.set_query("");
                let next = self.rebuild_view(keep.as_deref());
                (next.with_mode(AppMode::Normal), Vec::new())
            }
            Command::Download => self.download(),
            Command::ClosePreview => {
                self.preview = None;
                (self.with_mode(AppMode::Normal), Vec::new())
            }
            Command::ToggleViewMode => {
                let prefs = self.prefs.with_view_mode(self.prefs.view_mode.toggle());
                self.prefs = prefs;
                (self, vec![Effect::SavePrefs(prefs)])
            }
            Command::ToggleTheme => {
                let prefs = self.prefs.with_theme(self.prefs.theme.toggle());
                self.prefs = prefs;
                self.theme = palette(prefs.theme, &self.dark_theme);
                (self, vec![Effect::SavePrefs(prefs)])
            }
            Command::Quit => {
                self.should_quit = true;
                (self, Vec::new())
            }
        }
    }

    /// Appends a character to the query while searching.
    pub fn search_push(self, c: char) -> (Self, Vec<Effect>) {
        let mut query = self.query().to_owned();
        query.push(c);
        self.handle_command(Command::SetQuery(query))
    }

    /// Removes the last character of the query while searching.
    pub fn search_pop(self) -> (Self, Vec<Effect>) {
        let mut query = self.query().to_owned();
        query.pop();
        self.handle_command(Command::SetQuery(query))
    }

    /// Applies the outcome of a background task.
    pub fn apply_message(mut self, msg: BackgroundMessage) -> Self {
        match msg {
            BackgroundMessage::Listing(response) => match self.nav.settle(response) {
                // a fresh listing always scrolls back to the top
                Some(event @ Event::DirectoryLoaded { .. }) => {
                    self.rebuild_view(None).with_notice(event.notice(), false)
                }
                Some(event) => {
                    let is_error = event.is_error();
                    self.with_notice(event.notice(), is_error)
                }
                None => self,
            },
            BackgroundMessage::PreviewLoaded { id, content } => {
                match self.preview.as_mut() {
                    Some(session) if session.state.id() == id && !session.state.is_failed() => {
                        session.content = ContentState::Ready(content);
                    }
                    _ => tracing::debug!(id, "discarding preview content for closed session"),
                }
                self
            }
            BackgroundMessage::PreviewFailed { id, error } => {
                if let Some(session) = self.preview.as_mut() {
                    if session.state.fail(id) {
                        tracing::warn!(path = %session.entry().path(), %error, "preview failed");
                        session.modality = self.dispatcher.resolve(&session.state);
                        session.content = ContentState::NotNeeded;
                    }
                }
                self
            }
            BackgroundMessage::Download(event) => {
                let is_error = event.is_error();
                self.with_notice(event.notice(), is_error)
            }
        }
    }

    fn activate_selected(mut self) -> (Self, Vec<Effect>) {
        let Some(entry) = self.selected_entry().cloned() else {
            return (self, Vec::new());
        };
        match self.nav.activate(&entry) {
            Activation::Navigate(request) => (self, vec![Effect::List(request)]),
            Activation::Preview(state) => self.open_preview(state),
        }
    }

    fn open_preview(mut self, state: PreviewState) -> (Self, Vec<Effect>) {
        let modality = self.dispatcher.resolve(&state);
        let kind = ContentKind::for_modality(modality.kind());
        let job = kind.map(|kind| PreviewJob {
            id: state.id(),
            path: state.entry().path().to_owned(),
            kind,
            use_thumbnail: modality.kind() == ModalityKind::Image
                && state.entry().size() > FULL_IMAGE_LIMIT,
        });
        tracing::debug!(
            id = state.id(),
            path = %state.entry().path(),
            modality = ?modality.kind(),
            "preview opened"
        );

        self.preview = Some(PreviewSession {
            content: if job.is_some() {
                ContentState::Loading
            } else {
                ContentState::NotNeeded
            },
            state,
            modality,
            scroll: 0,
        });
        self.mode = AppMode::Preview;
        (self, job.map(Effect::LoadPreview).into_iter().collect())
    }

    fn download(self) -> (Self, Vec<Effect>) {
        let target = match (&self.preview, self.mode) {
            (Some(session), AppMode::Preview) => Some(session.entry().clone()),
            _ => self.selected_entry().cloned(),
        };
        match target {
            Some(entry) => {
                let notice = format!("Downloading {}…", entry.name());
                (self.with_notice(notice, false), vec![Effect::Download(entry)])
            }
            None => (self, Vec::new()),
        }
    }

    fn scroll_preview(mut self, cmd: &Command) -> Self {
        if let Some(session) = self.preview.as_mut() {
            let limit = session.scroll_limit();
            session.scroll = match cmd {
                Command::CursorUp => session.scroll.saturating_sub(1),
                Command::CursorDown => session.scroll.saturating_add(1).min(limit),
                Command::CursorFirst => 0,
                _ => limit,
            };
        }
        self
    }

    /// Recomputes the view; the cursor follows `keep` when it is still
    /// visible and is clamped otherwise.
    fn rebuild_view(mut self, keep: Option<&str>) -> Self {
        self.visible = self.nav.view();
        self.cursor = keep
            .and_then(|path| self.visible.iter().position(|e| e.path() == path))
            .unwrap_or(0);
        self
    }
}

fn palette(mode: ThemeMode, dark: &Theme) -> Theme {
    match mode {
        ThemeMode::Dark => dark.clone(),
        ThemeMode::Light => Theme::light(),
    }
}
