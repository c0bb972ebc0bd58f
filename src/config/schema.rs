use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/musify/config.toml` or `~/.config/musify/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `MUSIFY__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub channel: ChannelSettings,
    pub scanner: ScannerSettings,
    pub permission: PermissionSettings,
    pub index: IndexSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChannelSettings {
    /// Application namespace; the channel is named `<namespace>/audio`.
    pub namespace: String,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            namespace: "com.example.musify".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScannerSettings {
    /// Files smaller than this are treated as corrupt or placeholder entries.
    pub min_file_size_bytes: u64,
    /// Shortest accepted track, in milliseconds.
    pub min_duration_ms: u64,
    /// Directory names that exclude any file below them (case-insensitive).
    pub denied_dirs: Vec<String>,
    /// Voice memo / call recording extensions (case-insensitive, without dot).
    pub denied_extensions: Vec<String>,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            min_file_size_bytes: 50 * 1024,
            min_duration_ms: 10_000,
            denied_dirs: [
                "WhatsApp",
                "Recorder",
                "Recordings",
                "Voice",
                "Call",
                "Telegram",
                "Signal",
                "Viber",
                "Skype",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            denied_extensions: ["opus", "amr", "m4r", "3gp", "awb"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PermissionSettings {
    /// Platform API level; selects which read permission is checked.
    pub api_level: u32,
    /// Request code used to match permission results to our request.
    pub request_code: i32,
}

impl Default for PermissionSettings {
    fn default() -> Self {
        Self {
            api_level: 34,
            request_code: 123,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Directories the filesystem index walks.
    pub roots: Vec<PathBuf>,
    /// SQLite media index. When set it is used instead of walking `roots`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// File extensions the filesystem index picks up (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during walking.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Optional cap on directory recursion depth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            database: None,
            extensions: [
                "mp3", "flac", "wav", "ogg", "m4a", "opus", "amr", "m4r", "3gp", "awb",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            follow_links: true,
            include_hidden: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
