//! Configuration management.
//!
//! Static settings ([`settings::Config`]) are read from TOML at startup;
//! UI toggles ([`prefs::Preferences`]) are written back whenever they change.

pub mod prefs;
pub mod settings;
pub mod theme;
