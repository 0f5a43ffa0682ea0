//! GLESv1 extension entry point table.
//!
//! `eglGetProcAddress` resolves extension functions by name.  The table maps
//! each exported name to a [`GlesProc`] tag; the shim dispatches on the tag.
//! Names not in the table resolve to `None`, which the C boundary reports as
//! a null function pointer.

/// Extension entry points exported by the GLESv1 shim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlesProc {
    EglImageTargetTexture2D,
    EglImageTargetRenderbufferStorage,
    BlendEquationSeparate,
    BlendFuncSeparate,
    BlendEquation,
    DrawTexs,
    DrawTexi,
    DrawTexx,
    DrawTexf,
    DrawTexsv,
    DrawTexiv,
    DrawTexxv,
    DrawTexfv,
    IsRenderbuffer,
    BindRenderbuffer,
    DeleteRenderbuffers,
    GenRenderbuffers,
    RenderbufferStorage,
    GetRenderbufferParameteriv,
    IsFramebuffer,
    BindFramebuffer,
    DeleteFramebuffers,
    GenFramebuffers,
    CheckFramebufferStatus,
    FramebufferRenderbuffer,
    FramebufferTexture2D,
    GetFramebufferAttachmentParameteriv,
    GenerateMipmap,
    MapBuffer,
    UnmapBuffer,
    GetBufferPointerv,
    CurrentPaletteMatrix,
    LoadPaletteFromModelViewMatrix,
    QueryMatrixx,
    BindVertexArray,
    DeleteVertexArrays,
    GenVertexArrays,
    IsVertexArray,
    DiscardFramebuffer,
}

/// Exported name → entry point.  Order is irrelevant; names are unique.
pub const GLES1_PROCS: &[(&str, GlesProc)] = &[
    ("glEGLImageTargetTexture2DOES", GlesProc::EglImageTargetTexture2D),
    (
        "glEGLImageTargetRenderbufferStorageOES",
        GlesProc::EglImageTargetRenderbufferStorage,
    ),
    ("glBlendEquationSeparateOES", GlesProc::BlendEquationSeparate),
    ("glBlendFuncSeparateOES", GlesProc::BlendFuncSeparate),
    ("glBlendEquationOES", GlesProc::BlendEquation),
    ("glDrawTexsOES", GlesProc::DrawTexs),
    ("glDrawTexiOES", GlesProc::DrawTexi),
    ("glDrawTexxOES", GlesProc::DrawTexx),
    ("glDrawTexfOES", GlesProc::DrawTexf),
    ("glDrawTexsvOES", GlesProc::DrawTexsv),
    ("glDrawTexivOES", GlesProc::DrawTexiv),
    ("glDrawTexxvOES", GlesProc::DrawTexxv),
    ("glDrawTexfvOES", GlesProc::DrawTexfv),
    ("glIsRenderbufferOES", GlesProc::IsRenderbuffer),
    ("glBindRenderbufferOES", GlesProc::BindRenderbuffer),
    ("glDeleteRenderbuffersOES", GlesProc::DeleteRenderbuffers),
    ("glGenRenderbuffersOES", GlesProc::GenRenderbuffers),
    ("glRenderbufferStorageOES", GlesProc::RenderbufferStorage),
    ("glGetRenderbufferParameterivOES", GlesProc::GetRenderbufferParameteriv),
    ("glIsFramebufferOES", GlesProc::IsFramebuffer),
    ("glBindFramebufferOES", GlesProc::BindFramebuffer),
    ("glDeleteFramebuffersOES", GlesProc::DeleteFramebuffers),
    ("glGenFramebuffersOES", GlesProc::GenFramebuffers),
    ("glCheckFramebufferStatusOES", GlesProc::CheckFramebufferStatus),
    ("glFramebufferRenderbufferOES", GlesProc::FramebufferRenderbuffer),
    ("glFramebufferTexture2DOES", GlesProc::FramebufferTexture2D),
    (
        "glGetFramebufferAttachmentParameterivOES",
        GlesProc::GetFramebufferAttachmentParameteriv,
    ),
    ("glGenerateMipmapOES", GlesProc::GenerateMipmap),
    ("glMapBufferOES", GlesProc::MapBuffer),
    ("glUnmapBufferOES", GlesProc::UnmapBuffer),
    ("glGetBufferPointervOES", GlesProc::GetBufferPointerv),
    ("glCurrentPaletteMatrixOES", GlesProc::CurrentPaletteMatrix),
    (
        "glLoadPaletteFromModelViewMatrixOES",
        GlesProc::LoadPaletteFromModelViewMatrix,
    ),
    ("glQueryMatrixxOES", GlesProc::QueryMatrixx),
    ("glBindVertexArrayOES", GlesProc::BindVertexArray),
    ("glDeleteVertexArraysOES", GlesProc::DeleteVertexArrays),
    ("glGenVertexArraysOES", GlesProc::GenVertexArrays),
    ("glIsVertexArrayOES", GlesProc::IsVertexArray),
    ("glDiscardFramebufferEXT", GlesProc::DiscardFramebuffer),
];

/// Looks up an entry point by its exact exported name.
pub fn lookup(name: &str) -> Option<GlesProc> {
    GLES1_PROCS
        .iter()
        .find(|(proc_name, _)| *proc_name == name)
        .map(|(_, proc)| *proc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_known_extension() {
        assert_eq!(
            lookup("glEGLImageTargetTexture2DOES"),
            Some(GlesProc::EglImageTargetTexture2D)
        );
    }

    #[test]
    fn test_lookup_is_case_sensitive_exact_match() {
        assert_eq!(lookup("glegLImageTargetTexture2DOES"), None);
        assert_eq!(lookup("glEGLImageTargetTexture2D"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn test_lookup_unknown_name_is_none() {
        assert_eq!(lookup("glNotARealFunction"), None);
    }

    #[test]
    fn test_table_names_and_procs_are_unique() {
        let names: HashSet<_> = GLES1_PROCS.iter().map(|(n, _)| *n).collect();
        let procs: HashSet<_> = GLES1_PROCS.iter().map(|(_, p)| *p).collect();
        assert_eq!(names.len(), GLES1_PROCS.len());
        assert_eq!(procs.len(), GLES1_PROCS.len());
    }
}
