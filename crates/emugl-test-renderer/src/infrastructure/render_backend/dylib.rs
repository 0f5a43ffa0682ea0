//! Render library loaded at runtime.
//!
//! The render library (`libOpenglRender.so`, `OpenglRender.dll`,
//! `libOpenglRender.dylib`) exports two C entry points:
//!
//! ```text
//! bool initOpenGLRenderer(FBNativeWindowType win, int x, int y,
//!                         int width, int height, int port);
//! bool stopOpenGLRenderer(void);
//! ```
//!
//! Both symbols are resolved once in [`DylibRenderBackend::load`]; a library
//! missing either of them is rejected before any window work happens.

use std::ffi::{c_int, OsString};
use std::path::{Path, PathBuf};

use emugl_core::RenderTarget;
use libloading::Library;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::render_session::{RenderBackend, RenderError};

/// Native window type expected by `initOpenGLRenderer`.
#[cfg(target_os = "linux")]
pub type FbNativeWindow = std::ffi::c_ulong;

/// Native window type expected by `initOpenGLRenderer`.
#[cfg(not(target_os = "linux"))]
pub type FbNativeWindow = *mut std::ffi::c_void;

type InitRendererFn =
    unsafe extern "C" fn(FbNativeWindow, c_int, c_int, c_int, c_int, c_int) -> bool;
type StopRendererFn = unsafe extern "C" fn() -> bool;

const INIT_SYMBOL: &[u8] = b"initOpenGLRenderer\0";
const STOP_SYMBOL: &[u8] = b"stopOpenGLRenderer\0";

/// Error type for loading the render library.
#[derive(Debug, Error)]
pub enum DylibError {
    #[error("failed to load render library {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("render library {path} does not export {symbol}: {source}")]
    MissingSymbol {
        path: PathBuf,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },
}

/// Platform file name of the render library, e.g. `libOpenglRender.so`.
pub fn default_library_name() -> OsString {
    libloading::library_filename("OpenglRender")
}

/// [`RenderBackend`] calling into the render library.
pub struct DylibRenderBackend {
    init: InitRendererFn,
    stop: StopRendererFn,
    path: PathBuf,
    // Keeps the function pointers above valid; must outlive them.
    _library: Library,
}

impl DylibRenderBackend {
    /// Loads the render library from `path` and resolves both entry points.
    ///
    /// A bare file name is looked up through the platform's library search
    /// path.
    ///
    /// # Errors
    ///
    /// [`DylibError::Load`] if the library cannot be opened,
    /// [`DylibError::MissingSymbol`] if an entry point is missing.
    pub fn load(path: &Path) -> Result<Self, DylibError> {
        // SAFETY: loading the render library runs its initializers; it is a
        // trusted component shipped with the emulator.
        let library = unsafe { Library::new(path) }.map_err(|source| DylibError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let missing = |symbol: &'static str| {
            let path = path.to_path_buf();
            move |source| DylibError::MissingSymbol {
                path,
                symbol,
                source,
            }
        };

        // SAFETY: the signatures match the exported C prototypes above.  The
        // copied function pointers are only called while `library` is alive,
        // which the struct guarantees by owning it.
        let init = unsafe { library.get::<InitRendererFn>(INIT_SYMBOL) }
            .map(|symbol| *symbol)
            .map_err(missing("initOpenGLRenderer"))?;
        let stop = unsafe { library.get::<StopRendererFn>(STOP_SYMBOL) }
            .map(|symbol| *symbol)
            .map_err(missing("stopOpenGLRenderer"))?;

        info!("loaded render library {}", path.display());
        Ok(Self {
            init,
            stop,
            path: path.to_path_buf(),
            _library: library,
        })
    }

    /// Loads the render library by its platform default name.
    pub fn load_default() -> Result<Self, DylibError> {
        Self::load(Path::new(&default_library_name()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn native_window(target: &RenderTarget) -> FbNativeWindow {
    #[cfg(target_os = "linux")]
    return target.window().as_raw() as FbNativeWindow;
    #[cfg(not(target_os = "linux"))]
    return target.window().as_raw() as usize as FbNativeWindow;
}

impl RenderBackend for DylibRenderBackend {
    fn initialize(&self, target: &RenderTarget, x: i32, y: i32) -> Result<(), RenderError> {
        let invalid = || RenderError::InvalidDimensions {
            width: target.width(),
            height: target.height(),
        };
        let width = c_int::try_from(target.width()).map_err(|_| invalid())?;
        let height = c_int::try_from(target.height()).map_err(|_| invalid())?;

        debug!(
            "initOpenGLRenderer(win={}, x={x}, y={y}, {width}x{height}, port={})",
            target.window(),
            target.port()
        );
        // SAFETY: `init` was resolved from the loaded library and the
        // arguments have the C types of the prototype.
        let ok = unsafe {
            (self.init)(
                native_window(target),
                x,
                y,
                width,
                height,
                c_int::from(target.port()),
            )
        };
        if ok {
            Ok(())
        } else {
            Err(RenderError::InitializeFailed { port: target.port() })
        }
    }

    fn shutdown(&self) -> Result<(), RenderError> {
        // SAFETY: `stop` was resolved from the loaded library and takes no
        // arguments.
        if unsafe { (self.stop)() } {
            Ok(())
        } else {
            Err(RenderError::ShutdownFailed)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
