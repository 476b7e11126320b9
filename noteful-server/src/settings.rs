//! Server settings for Noteful.
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! an optional JSON file at an OS-appropriate location, and environment
//! variables (`HOST`, `PORT`, `DATABASE_PATH`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Value of `database_path` that selects a throwaway in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Persisted server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: String,
    pub port: u16,
    /// SQLite database file, or [`IN_MEMORY`].
    pub database_path: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: default_database_path().to_string_lossy().to_string(),
        }
    }
}

impl ServerSettings {
    /// Applies overrides looked up through `var`.
    ///
    /// An unparsable `PORT` is ignored with a warning.
    pub fn apply_overrides<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("HOST").filter(|h| !h.is_empty()) {
            self.host = host;
        }
        if let Some(port) = var("PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!("ignoring invalid PORT value {port:?}"),
            }
        }
        if let Some(path) = var("DATABASE_PATH").filter(|p| !p.is_empty()) {
            self.database_path = path;
        }
        self
    }

    /// Applies overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == IN_MEMORY
    }

    /// `host:port`, ready for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Returns the path to the settings JSON file.
///
/// - macOS / Linux: `~/.config/noteful/settings.json`
/// - Windows: `%APPDATA%/Noteful/settings.json`
pub fn settings_file_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("Noteful").join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("noteful").join("settings.json")
    }
}

/// Returns the default database location: `<data dir>/noteful/noteful.db`.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
                .join("share")
        })
        .join("noteful")
        .join("noteful.db")
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
pub fn load_settings_from(path: &Path) -> ServerSettings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("ignoring corrupt settings file {}: {e}", path.display());
            ServerSettings::default()
        }),
        Err(_) => ServerSettings::default(),
    }
}

/// Loads the settings file, then applies environment overrides.
pub fn load_settings() -> ServerSettings {
    load_settings_from(&settings_file_path()).with_env()
}
