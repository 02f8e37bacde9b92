//! Failure taxonomy for the viewer.
//!
//! Every failure is surfaced as a [`Error`] value or logged where it is
//! detected and degraded to a sentinel; nothing in the library panics.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The importer returned no scene, an incomplete scene, or a scene
    /// without a root node. The model stays empty.
    #[error("model import failed: {0}")]
    Import(String),

    /// A texture image could not be decoded. The owning mesh still builds
    /// and draws without that texture.
    #[error("texture load failed for {path}: {reason}")]
    TextureLoad { path: String, reason: String },

    /// A shader stage failed to compile; carries the driver's info log.
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    /// A shader program failed to link; carries the driver's info log.
    #[error("shader program link failed: {0}")]
    ShaderLink(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
