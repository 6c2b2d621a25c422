use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rapyd_core::Command;

use crate::app::AppMode;

/// Actions that can result from a key press.
#[derive(Debug)]
pub enum InputAction {
    /// Dispatch a core Command.
    Command(Command),
    /// Enter a new AppMode.
    EnterMode(AppMode),
    /// Leave search mode keeping the query.
    ExitSearch,
    /// Append a character to the search query.
    SearchChar(char),
    /// Remove the last character from the search query.
    SearchBackspace,
    /// No action for this key.
    None,
}

/// Tracks state for multi-key sequences like "gg".
#[derive(Debug, Default)]
pub struct InputState {
    pending_g: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self { pending_g: false }
    }
}

/// Maps a key event to an InputAction based on the current mode.
/// Returns the action and a new InputState.
pub fn handle_key(key: KeyEvent, mode: AppMode, state: &InputState) -> (InputAction, InputState) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return (InputAction::Command(Command::Quit), InputState::new());
    }
    match mode {
        AppMode::Normal => handle_normal_key(key, state),
        AppMode::Search => handle_search_key(key),
        AppMode::Preview => handle_preview_key(key, state),
        AppMode::Help => handle_help_key(key),
    }
}

/// Resolves the second key of a `g` sequence.
fn finish_g(key: KeyEvent) -> (InputAction, InputState) {
    let action = match key.code {
        KeyCode::Char('g') => InputAction::Command(Command::CursorFirst),
        _ => InputAction::None,
    };
    (action, InputState::new())
}

fn handle_normal_key(key: KeyEvent, state: &InputState) -> (InputAction, InputState) {
    if state.pending_g {
        return finish_g(key);
    }

    let action = match key.code {
        KeyCode::Char('j') | KeyCode::Down => InputAction::Command(Command::CursorDown),
        KeyCode::Char('k') | KeyCode::Up => InputAction::Command(Command::CursorUp),
        KeyCode::Char('G') | KeyCode::End => InputAction::Command(Command::CursorLast),
        KeyCode::Home => InputAction::Command(Command::CursorFirst),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => {
            InputAction::Command(Command::Activate)
        }
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => {
            InputAction::Command(Command::GoUp)
        }
        KeyCode::Char('r') => InputAction::Command(Command::Reload),
        KeyCode::Char('/') => InputAction::Command(Command::BeginSearch),
        KeyCode::Char('d') => InputAction::Command(Command::Download),
        KeyCode::Char('v') => InputAction::Command(Command::ToggleViewMode),
        KeyCode::Char('t') => InputAction::Command(Command::ToggleTheme),
        KeyCode::Char('?') => InputAction::EnterMode(AppMode::Help),
        KeyCode::Char('q') => InputAction::Command(Command::Quit),
        KeyCode::Esc => InputAction::Command(Command::ClearQuery),
        KeyCode::Char('g') => {
            return (InputAction::None, InputState { pending_g: true });
        }
        _ => InputAction::None,
    };
    (action, InputState::new())
}

fn handle_search_key(key: KeyEvent) -> (InputAction, InputState) {
    let action = match key.code {
        KeyCode::Esc => InputAction::Command(Command::ClearQuery),
        KeyCode::Enter => InputAction::ExitSearch,
        KeyCode::Backspace => InputAction::SearchBackspace,
        KeyCode::Down => InputAction::Command(Command::CursorDown),
        KeyCode::Up => InputAction::Command(Command::CursorUp),
        KeyCode::Char(c) => InputAction::SearchChar(c),
        _ => InputAction::None,
    };
    (action, InputState::new())
}

fn handle_preview_key(key: KeyEvent, state: &InputState) -> (InputAction, InputState) {
    if state.pending_g {
        return finish_g(key);
    }

    let action = match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Left => {
            InputAction::Command(Command::ClosePreview)
        }
        KeyCode::Char('j') | KeyCode::Down => InputAction::Command(Command::CursorDown),
        KeyCode::Char('k') | KeyCode::Up => InputAction::Command(Command::CursorUp),
        KeyCode::Char('G') | KeyCode::End => InputAction::Command(Command::CursorLast),
        KeyCode::Home => InputAction::Command(Command::CursorFirst),
        KeyCode::Char('d') => InputAction::Command(Command::Download),
        KeyCode::Char('t') => InputAction::Command(Command::ToggleTheme),
        KeyCode::Char('g') => {
            return (InputAction::None, InputState { pending_g: true });
        }
        _ => InputAction::None,
    };
    (action, InputState::new())
}

fn handle_help_key(key: KeyEvent) -> (InputAction, InputState) {
    let action = match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            InputAction::EnterMode(AppMode::Normal)
        }
        _ => InputAction::None,
    };
    (action, InputState::new())
}
