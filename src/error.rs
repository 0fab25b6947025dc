//! Error types for wallpaper rendering

use thiserror::Error;

/// Result type alias for rendering operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur around a render.
///
/// Option normalization never fails; these cover the caller side of a
/// render (surface allocation, encoding, fonts, option documents, I/O).
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to allocate a drawing surface
    #[error("Surface allocation failed: {0}")]
    SurfaceError(String),

    /// Failed while drawing
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Failed to encode the rendered surface
    #[error("PNG encoding failed: {0}")]
    EncodeError(String),

    /// Failed to load or parse a font face
    #[error("Font loading failed: {0}")]
    FontError(String),

    /// Malformed options document
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Filesystem or socket error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
