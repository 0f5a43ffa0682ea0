//! Emulator test renderer entry point.
//!
//! Wires together the config file, the native window, the render library and
//! the console input sink, then runs the session loop on a single-threaded
//! Tokio runtime.
//!
//! # Startup order
//!
//! ```text
//! main()
//!  └─ load_config()               -- defaults when the file is missing
//!  └─ tracing subscriber          -- RUST_LOG wins over [session] log_level
//!  └─ ANDROID_WINDOW_SIZE         -- wins over [window]
//!  └─ open_native_window()
//!  └─ DylibRenderBackend::load()
//!  └─ ConsoleInputSink::new()     -- no I/O until the renderer is running
//!  └─ SessionLoop::run()
//! ```
//!
//! Any startup failure is reported and turned into a non-zero exit status by
//! returning an error from `main`.

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use emugl_core::domain::window::WINDOW_SIZE_ENV;
use emugl_core::WindowSize;
use emugl_test_renderer::application::session_loop::SessionLoop;
use emugl_test_renderer::infrastructure::{
    input_sink::{load_auth_token, ConsoleInputSink},
    render_backend::DylibRenderBackend,
    storage::config::{load_config, AppConfig, ConfigError},
    window::open_native_window,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = read_config()?;

    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.session.log_level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("emulator test renderer starting");

    // ── Window ────────────────────────────────────────────────────────────────
    let env_size = std::env::var(WINDOW_SIZE_ENV).ok();
    let window_size = WindowSize::from_env_value(env_size.as_deref(), config.window.size());
    info!("window size {window_size}");
    let window = open_native_window(window_size, &config.window.title)
        .context("failed to open the renderer window")?;

    // ── Render library ────────────────────────────────────────────────────────
    let backend = match &config.render.library {
        Some(path) => DylibRenderBackend::load(path),
        None => DylibRenderBackend::load_default(),
    }
    .context("failed to load the render library")?;

    // ── Console input sink ────────────────────────────────────────────────────
    let auth_token = match config.console.auth_token_path() {
        Some(path) => load_auth_token(&path).unwrap_or_else(|e| {
            warn!("could not read console auth token {}: {e}", path.display());
            None
        }),
        None => None,
    };
    let sink = ConsoleInputSink::new(config.console.sink_config(auth_token));

    // ── Session ───────────────────────────────────────────────────────────────
    let mut session = SessionLoop::new(window, sink, config.session_settings(window_size));
    session.run(&backend).await?;

    info!("emulator test renderer stopped");
    Ok(())
}

/// Loads the config file.  Runs before logging is set up, so a broken file
/// surfaces as the process error.
fn read_config() -> anyhow::Result<AppConfig> {
    match load_config() {
        // No home directory to look in: run on defaults.
        Err(ConfigError::NoPlatformConfigDir) => Ok(AppConfig::default()),
        other => other.context("failed to load the config file"),
    }
}
