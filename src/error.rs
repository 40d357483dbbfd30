//! Error types for the lawlens library.

use std::io;
use thiserror::Error;

/// Result type alias for lawlens operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting and analyzing a document.
///
/// Only [`Error::BackendUnavailable`] and [`Error::Config`] escape the
/// pipeline. The content-level variants are recorded per page in the
/// extraction manifest and never abort a run.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An OCR engine or rasterization binary could not be located.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Invalid pipeline configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and cannot be read.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting the embedded text layer.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Error rasterizing pages or probing the page count.
    #[error("Rasterization error: {0}")]
    Render(String),

    /// Error recognizing a page image.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Error loading or resizing a page image.
    #[error("Image error: {0}")]
    Image(String),

    /// Error serializing an analysis.
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}
