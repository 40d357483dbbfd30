//! OCR fallback: page rasterization and parallel recognition.
//!
//! The default backends shell out to poppler (`pdfinfo`, `pdftoppm`) and
//! `tesseract`. Both sit behind traits so other engines can be plugged in.

mod engine;
mod pool;
mod render;
mod tools;

use std::path::PathBuf;

pub use engine::{OcrEngine, TesseractConfig, TesseractEngine};
pub use pool::{
    default_workers, OcrOptions, OcrOutput, OcrPool, DEFAULT_BATCH_SIZE, DEFAULT_DPI,
    MAX_IMAGE_EDGE, MIN_WORKERS,
};
pub use render::{downscale, PageRenderer, PopplerRenderer};

/// Where to find the external OCR executables.
///
/// `None` fields fall back to a `PATH` lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendPaths {
    /// Path to the `tesseract` executable
    pub tesseract: Option<PathBuf>,

    /// Directory containing `pdfinfo` and `pdftoppm`
    pub poppler_bin: Option<PathBuf>,
}

impl BackendPaths {
    /// Look everything up on `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit tesseract executable.
    pub fn with_tesseract(mut self, path: impl Into<PathBuf>) -> Self {
        self.tesseract = Some(path.into());
        self
    }

    /// Use poppler tools from a specific directory.
    pub fn with_poppler_bin(mut self, dir: impl Into<PathBuf>) -> Self {
        self.poppler_bin = Some(dir.into());
        self
    }
}
