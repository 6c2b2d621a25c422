//! Colour themes.
//!
//! Colors are stored as strings (e.g. `"blue"`, `"#ff5500"`) and converted
//! to [`ratatui::style::Color`] at render time via [`parse_color`]. Two
//! palettes are built in, one per [`ThemeMode`]; a TOML file may override
//! either.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::prefs::ThemeMode;
use crate::error::{CoreError, CoreResult};

/// Complete theme configuration with per-component color groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default)]
    pub panel: PanelTheme,
    #[serde(default)]
    pub statusbar: StatusBarTheme,
    #[serde(default)]
    pub breadcrumb: BreadcrumbTheme,
    #[serde(default)]
    pub preview: PreviewTheme,
    #[serde(default)]
    pub popup: PopupTheme,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            panel: PanelTheme::default(),
            statusbar: StatusBarTheme::default(),
            breadcrumb: BreadcrumbTheme::default(),
            preview: PreviewTheme::default(),
            popup: PopupTheme::default(),
        }
    }

    pub fn light() -> Self {
        Self {
            panel: PanelTheme {
                bg: "#fafafa".to_string(),
                fg: "#202020".to_string(),
                dir_fg: "#1f5fbf".to_string(),
                image_fg: "#8a3fb8".to_string(),
                video_fg: "#b8563f".to_string(),
                meta_fg: "gray".to_string(),
                selected_fg: "#b07800".to_string(),
            },
            statusbar: StatusBarTheme {
                bg: "#e0e0e0".to_string(),
                position_fg: "black".to_string(),
                message_fg: "#6a1b9a".to_string(),
                error_fg: "#c62828".to_string(),
                loading_fg: "#1f5fbf".to_string(),
            },
            breadcrumb: BreadcrumbTheme {
                bg: "#d0d0d0".to_string(),
                home_fg: "#00695c".to_string(),
                separator_fg: "gray".to_string(),
                component_fg: "black".to_string(),
            },
            preview: PreviewTheme {
                border_fg: "gray".to_string(),
                line_number_fg: "gray".to_string(),
                title_fg: "#1f5fbf".to_string(),
                error_fg: "#c62828".to_string(),
                truncation_fg: "#b07800".to_string(),
                syntax_theme: "InspiredGitHub".to_string(),
            },
            popup: PopupTheme {
                border_fg: "#b07800".to_string(),
            },
        }
    }

    /// Built-in palette for `mode`.
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }

    /// Loads a theme from a TOML file at `path`. Missing sections fall back
    /// to the dark palette.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// File list colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelTheme {
    pub bg: String,
    pub fg: String,
    pub dir_fg: String,
    pub image_fg: String,
    pub video_fg: String,
    pub meta_fg: String,
    pub selected_fg: String,
}

impl Default for PanelTheme {
    fn default() -> Self {
        Self {
            bg: "reset".to_string(),
            fg: "reset".to_string(),
            dir_fg: "blue".to_string(),
            image_fg: "magenta".to_string(),
            video_fg: "light_red".to_string(),
            meta_fg: "dark_gray".to_string(),
            selected_fg: "yellow".to_string(),
        }
    }
}

/// Status bar colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBarTheme {
    pub bg: String,
    pub position_fg: String,
    pub message_fg: String,
    pub error_fg: String,
    pub loading_fg: String,
}

impl Default for StatusBarTheme {
    fn default() -> Self {
        Self {
            bg: "white".to_string(),
            position_fg: "black".to_string(),
            message_fg: "magenta".to_string(),
            error_fg: "red".to_string(),
            loading_fg: "blue".to_string(),
        }
    }
}

/// Breadcrumb path colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbTheme {
    pub bg: String,
    pub home_fg: String,
    pub separator_fg: String,
    pub component_fg: String,
}

impl Default for BreadcrumbTheme {
    fn default() -> Self {
        Self {
            bg: "dark_gray".to_string(),
            home_fg: "cyan".to_string(),
            separator_fg: "gray".to_string(),
            component_fg: "white".to_string(),
        }
    }
}

/// Preview overlay colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewTheme {
    pub border_fg: String,
    pub line_number_fg: String,
    pub title_fg: String,
    pub error_fg: String,
    pub truncation_fg: String,
    pub syntax_theme: String,
}

impl Default for PreviewTheme {
    fn default() -> Self {
        Self {
            border_fg: "dark_gray".to_string(),
            line_number_fg: "dark_gray".to_string(),
            title_fg: "blue".to_string(),
            error_fg: "red".to_string(),
            truncation_fg: "yellow".to_string(),
            syntax_theme: "base16-eighties.dark".to_string(),
        }
    }
}

/// Popup/dialog colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupTheme {
    pub border_fg: String,
}

impl Default for PopupTheme {
    fn default() -> Self {
        Self {
            border_fg: "yellow".to_string(),
        }
    }
}

/// Parses a color string into a `ratatui::style::Color`.
///
/// Supports named colors (`"blue"`, `"dark_gray"`) and hex (`"#rrggbb"`).
/// Returns `Color::Reset` for unrecognised values.
pub fn parse_color(s: &str) -> ratatui::style::Color {
    use ratatui::style::Color;

    match s.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Color::DarkGray,
        "light_red" | "lightred" => Color::LightRed,
        "light_green" | "lightgreen" => Color::LightGreen,
        "light_yellow" | "lightyellow" => Color::LightYellow,
        "light_blue" | "lightblue" => Color::LightBlue,
        "light_magenta" | "lightmagenta" => Color::LightMagenta,
        "light_cyan" | "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        "reset" => Color::Reset,
        hex if hex.starts_with('#') && hex.len() == 7 && hex.is_ascii() => {
            let channel =
                |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).unwrap_or(0);
            Color::Rgb(channel(1..3), channel(3..5), channel(5..7))
        }
        _ => Color::Reset,
    }
}
