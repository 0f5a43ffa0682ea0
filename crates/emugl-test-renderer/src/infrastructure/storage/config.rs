//! TOML configuration for the test renderer.
//!
//! Reads `AppConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\emugl\test-renderer.toml`
//! - Linux:    `~/.config/emugl/test-renderer.toml`
//! - macOS:    `~/Library/Application Support/emugl/test-renderer.toml`
//!
//! A missing file is not an error: every field has a default, so the harness
//! runs with no configuration at all.  Example:
//!
//! ```toml
//! [window]
//! width = 480
//! height = 800
//!
//! [console]
//! port = 5556
//!
//! [session]
//! log_level = "debug"
//! ```
//!
//! The `ANDROID_WINDOW_SIZE` environment variable is applied on top of the
//! file by the binary and wins over `[window]`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use emugl_core::domain::target::DEFAULT_RENDER_PORT;
use emugl_core::protocol::console::DEFAULT_CONSOLE_PORT;
use emugl_core::WindowSize;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::session_loop::{SessionSettings, DEFAULT_ITERATIONS_PER_SECOND};
use crate::infrastructure::input_sink::ConsoleSinkConfig;

/// File name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "test-renderer.toml";

/// Token file written by the emulator into the user's home directory.
pub const AUTH_TOKEN_FILE_NAME: &str = ".emulator_console_auth_token";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Harness window settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_title")]
    pub title: String,
}

/// Render library settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderConfig {
    /// TCP port the renderer listens on for GL command streams.
    #[serde(default = "default_render_port")]
    pub port: u16,
    /// Path of the render library; the platform default name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<PathBuf>,
}

/// Emulator console settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    #[serde(default = "default_console_host")]
    pub host: String,
    #[serde(default = "default_console_port")]
    pub port: u16,
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
    /// Token file; `~/.emulator_console_auth_token` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token_file: Option<PathBuf>,
    /// Unsent console lines kept before the oldest is dropped.
    #[serde(default = "default_max_queued")]
    pub max_queued: usize,
}

/// Session loop settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "default_iterations_per_second")]
    pub iterations_per_second: u32,
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_width() -> u32 {
    WindowSize::DEFAULT.width
}
fn default_height() -> u32 {
    WindowSize::DEFAULT.height
}
fn default_title() -> String {
    "emulator test renderer".to_string()
}
fn default_render_port() -> u16 {
    DEFAULT_RENDER_PORT
}
fn default_console_host() -> String {
    "127.0.0.1".to_string()
}
fn default_console_port() -> u16 {
    DEFAULT_CONSOLE_PORT
}
fn default_reconnect_interval_ms() -> u64 {
    1000
}
fn default_max_queued() -> usize {
    256
}
fn default_iterations_per_second() -> u32 {
    DEFAULT_ITERATIONS_PER_SECOND
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            port: default_render_port(),
            library: None,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            host: default_console_host(),
            port: default_console_port(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            auth_token_file: None,
            max_queued: default_max_queued(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            iterations_per_second: default_iterations_per_second(),
            log_level: default_log_level(),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl WindowConfig {
    /// The configured size; a zero dimension falls back to the default size.
    pub fn size(&self) -> WindowSize {
        if self.width == 0 || self.height == 0 {
            WindowSize::DEFAULT
        } else {
            WindowSize::new(self.width, self.height)
        }
    }
}

impl ConsoleConfig {
    /// Resolves the auth token file, defaulting to the emulator's location in
    /// the home directory.
    pub fn auth_token_path(&self) -> Option<PathBuf> {
        self.auth_token_file.clone().or_else(default_auth_token_path)
    }

    /// Builds the sink configuration with an already loaded token.
    pub fn sink_config(&self, auth_token: Option<String>) -> ConsoleSinkConfig {
        ConsoleSinkConfig {
            host: self.host.clone(),
            port: self.port,
            reconnect_interval: Duration::from_millis(self.reconnect_interval_ms),
            auth_token,
            max_queued: self.max_queued,
        }
    }
}

impl AppConfig {
    /// Session settings for a window of `window_size`.
    pub fn session_settings(&self, window_size: WindowSize) -> SessionSettings {
        SessionSettings::new(
            window_size,
            self.render.port,
            self.session.iterations_per_second,
        )
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    let dir = platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Loads `AppConfig` from the platform config file, returning defaults when
/// the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning defaults when it does not exist.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("USERPROFILE").map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("HOME").map(PathBuf::from)
    }
}

/// `~/.emulator_console_auth_token`.
pub fn default_auth_token_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(AUTH_TOKEN_FILE_NAME))
}

/// Resolves the platform config directory including the `emugl` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("emugl"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| home_dir().map(|h| h.join(".config")))?;
        Some(base.join("emugl"))
    }

    #[cfg(target_os = "macos")]
    {
        home_dir().map(|h| h.join("Library").join("Application Support").join("emugl"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
