//! GLESv1 client context for the guest-side passthrough shim.
//!
//! The shim forwards every GL call to an encoder that serialises it for the
//! host.  A handful of calls cannot be forwarded verbatim: string queries are
//! answered by the EGL layer, and the EGL image extensions must resolve a
//! guest native buffer to its host handle first.  [`GlesClient`] owns the
//! collaborators those calls need.
//!
//! # One context, no globals
//!
//! The EGL interface and the host connection are handed to
//! [`GlesClient::new`], the single initialisation entry point, and reached
//! only through the returned value.  Callers that need the context on several
//! threads share it behind an `Arc`.

pub mod procs;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

pub use procs::{lookup, GlesProc, GLES1_PROCS};

/// `ANDROID_NATIVE_MAKE_CONSTANT('_','b','f','r')`.
pub const ANDROID_NATIVE_BUFFER_MAGIC: u32 = u32::from_be_bytes(*b"_bfr");

/// Structure version of the 32-bit guest `android_native_buffer_t`.
pub const ANDROID_NATIVE_BUFFER_VERSION: u32 = 104;

/// `GL_VENDOR` .. `GL_EXTENSIONS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlStringName {
    Vendor,
    Renderer,
    Version,
    Extensions,
}

impl GlStringName {
    /// Maps a GL enum value to a string name, `None` for anything else.
    pub fn from_gl_enum(value: u32) -> Option<Self> {
        match value {
            0x1F00 => Some(GlStringName::Vendor),
            0x1F01 => Some(GlStringName::Renderer),
            0x1F02 => Some(GlStringName::Version),
            0x1F03 => Some(GlStringName::Extensions),
            _ => None,
        }
    }
}

/// Header of a guest native buffer passed as an `EGLImageKHR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeBuffer {
    pub magic: u32,
    pub version: u32,
    /// Host-side color buffer handle stored in the gralloc handle.
    pub host_handle: u32,
}

/// Errors produced by the context.  The GL API has no channel for them, so
/// the C boundary logs and drops them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GlesError {
    #[error("native buffer magic 0x{found:08x} is not a native buffer")]
    BadMagic { found: u32 },

    #[error("native buffer version {found} does not match {expected}")]
    BadVersion { found: u32, expected: u32 },

    #[error("failed to get host connection")]
    NoHostConnection,

    #[error("failed to get renderControl encoder context")]
    NoRenderControl,

    #[error("failed to get GL encoder")]
    NoEncoder,
}

/// EGL-side services the GLES library calls back into.
#[cfg_attr(test, mockall::automock)]
pub trait EglInterface: Send + Sync {
    /// Returns the string the EGL layer reports for `name`.
    fn gl_string(&self, name: GlStringName) -> Option<String>;
}

/// The renderControl encoder of the host connection.
#[cfg_attr(test, mockall::automock)]
pub trait RenderControl: Send + Sync {
    fn bind_texture(&self, host_handle: u32);
    fn bind_renderbuffer(&self, host_handle: u32);
}

/// The GLESv1 encoder of the host connection.
#[cfg_attr(test, mockall::automock)]
pub trait GlEncoder: Send + Sync {
    /// Blocks until the host has executed every queued command.
    fn finish(&self);
}

/// Per-thread connection to the host renderer.
pub trait HostConnection: Send + Sync {
    fn gl_encoder(&self) -> Option<&dyn GlEncoder>;
    fn render_control(&self) -> Option<&dyn RenderControl>;
}

/// The explicitly owned GLESv1 shim context.
pub struct GlesClient {
    egl: Option<Arc<dyn EglInterface>>,
    host: Option<Arc<dyn HostConnection>>,
}

impl GlesClient {
    /// Creates the context.  Either collaborator may be absent; the affected
    /// calls then degrade the way the GL API expects (`None` strings, no-op
    /// bindings).
    pub fn new(
        egl: Option<Arc<dyn EglInterface>>,
        host: Option<Arc<dyn HostConnection>>,
    ) -> Self {
        Self { egl, host }
    }

    /// `glGetString`, answered by the EGL layer.
    pub fn get_string(&self, name: GlStringName) -> Option<String> {
        self.egl.as_ref().and_then(|egl| egl.gl_string(name))
    }

    /// `glFinish` through the GL encoder.
    ///
    /// # Errors
    ///
    /// [`GlesError::NoHostConnection`] / [`GlesError::NoEncoder`] when the
    /// collaborator is missing.
    pub fn finish(&self) -> Result<(), GlesError> {
        let host = self.host.as_ref().ok_or(GlesError::NoHostConnection)?;
        host.gl_encoder().ok_or(GlesError::NoEncoder)?.finish();
        Ok(())
    }

    /// `glEGLImageTargetTexture2DOES`: binds the host color buffer behind
    /// `image` to the current texture.
    ///
    /// # Errors
    ///
    /// Returns an error when `image` is not a valid native buffer or the host
    /// connection is unavailable.
    pub fn egl_image_target_texture_2d(
        &self,
        target: u32,
        image: &NativeBuffer,
    ) -> Result<(), GlesError> {
        debug!("glEGLImageTargetTexture2DOES target=0x{target:x} image=0x{:x}", image.host_handle);
        let rc = self.validated_render_control(image)?;
        rc.bind_texture(image.host_handle);
        Ok(())
    }

    /// `glEGLImageTargetRenderbufferStorageOES`: binds the host color buffer
    /// behind `image` to the current renderbuffer.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GlesClient::egl_image_target_texture_2d`].
    pub fn egl_image_target_renderbuffer_storage(
        &self,
        target: u32,
        image: &NativeBuffer,
    ) -> Result<(), GlesError> {
        debug!(
            "glEGLImageTargetRenderbufferStorageOES target=0x{target:x} image=0x{:x}",
            image.host_handle
        );
        let rc = self.validated_render_control(image)?;
        rc.bind_renderbuffer(image.host_handle);
        Ok(())
    }

    /// `eglGetProcAddress` for GLESv1 extension functions.
    pub fn proc_address(&self, name: &str) -> Option<GlesProc> {
        procs::lookup(name)
    }

    fn validated_render_control(&self, image: &NativeBuffer) -> Result<&dyn RenderControl, GlesError> {
        if image.magic != ANDROID_NATIVE_BUFFER_MAGIC {
            return Err(GlesError::BadMagic { found: image.magic });
        }
        if image.version != ANDROID_NATIVE_BUFFER_VERSION {
            return Err(GlesError::BadVersion {
                found: image.version,
                expected: ANDROID_NATIVE_BUFFER_VERSION,
            });
        }

        let host = self.host.as_deref().ok_or_else(|| {
            error!("egl: Failed to get host connection");
            GlesError::NoHostConnection
        })?;
        host.render_control().ok_or_else(|| {
            error!("egl: Failed to get renderControl encoder context");
            GlesError::NoRenderControl
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
