//! OCR engine abstraction and the Tesseract implementation.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};
use crate::model::PageImage;

use super::tools::{require_file, resolve_binary, stderr_summary};

/// Recognizes the text of a single page image.
///
/// Calls are independent and may run concurrently from several worker threads.
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Recognize the text of one page image.
    fn recognize(&self, image: &PageImage) -> Result<String>;
}

/// Settings for the Tesseract command-line engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractConfig {
    /// Explicit path to the `tesseract` executable; `PATH` lookup when `None`
    pub binary: Option<PathBuf>,

    /// Recognition language (e.g. "eng")
    pub language: String,

    /// OCR engine mode (`--oem`); 1 selects the LSTM engine
    pub engine_mode: u8,

    /// Page segmentation mode (`--psm`); 3 is fully automatic
    pub page_segmentation: u8,
}

impl TesseractConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit executable.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    /// Set the recognition language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: None,
            language: "eng".to_string(),
            engine_mode: 1,
            page_segmentation: 3,
        }
    }
}

/// OCR through the `tesseract` executable.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    config: TesseractConfig,
}

impl TesseractEngine {
    /// Locate the executable and create the engine.
    ///
    /// Fails with [`Error::BackendUnavailable`] if `tesseract` cannot be found.
    pub fn new(config: TesseractConfig) -> Result<Self> {
        let binary = match &config.binary {
            Some(path) => require_file(path)?,
            None => resolve_binary("tesseract", None)?,
        };
        log::info!("Using tesseract from {}", binary.display());
        Ok(Self { binary, config })
    }

    /// Path of the executable in use.
    pub fn binary(&self) -> &std::path::Path {
        &self.binary
    }

    fn args(&self) -> Vec<String> {
        vec![
            "-l".to_string(),
            self.config.language.clone(),
            "--oem".to_string(),
            self.config.engine_mode.to_string(),
            "--psm".to_string(),
            self.config.page_segmentation.to_string(),
            "-c".to_string(),
            "tessedit_do_invert=0".to_string(),
        ]
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &PageImage) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg(&image.path)
            .arg("stdout")
            .args(self.args())
            .output()
            .map_err(|e| Error::Ocr(format!("failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            return Err(Error::Ocr(format!(
                "tesseract failed on page {}: {}",
                image.page,
                stderr_summary(&output)
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TesseractConfig::default();
        assert_eq!(config.language, "eng");
        assert_eq!(config.engine_mode, 1);
        assert_eq!(config.page_segmentation, 3);
        assert!(config.binary.is_none());
    }

    #[test]
    fn test_missing_binary_is_fatal() {
        let config = TesseractConfig::new().with_binary("/nonexistent/bin/tesseract");
        let err = TesseractEngine::new(config).unwrap_err();
        assert!(matches!(err, Error::BackendUnavailable(_)));
    }

    #[test]
    fn test_args() {
        let engine = TesseractEngine {
            binary: PathBuf::from("tesseract"),
            config: TesseractConfig::new().with_language("deu"),
        };
        assert_eq!(
            engine.args(),
            vec!["-l", "deu", "--oem", "1", "--psm", "3", "-c", "tessedit_do_invert=0"]
        );
    }
}
