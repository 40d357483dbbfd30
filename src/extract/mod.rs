//! Raw text extraction results shared by the digital and OCR paths.

mod digital;

use serde::{Deserialize, Serialize};

use crate::model::{join_pages, PageReport, PageStatus, PageText};

pub use digital::{DigitalExtractor, DigitalOutcome, DEFAULT_MIN_DIGITAL_CHARS};

/// How the raw text of a document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Embedded text layer
    Digital,
    /// Rasterization and OCR
    Ocr,
}

impl ExtractionMethod {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Digital => "digital",
            ExtractionMethod::Ocr => "ocr",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Per-page manifest of an extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Path that produced the text
    pub method: ExtractionMethod,

    /// Number of pages in the document (0 if unknown)
    pub page_count: u32,

    /// One entry per page, in page order
    pub pages: Vec<PageReport>,

    /// Why the digital text layer was not used, for OCR runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl ExtractionReport {
    /// Build a report from per-page results.
    pub fn from_pages(method: ExtractionMethod, page_count: u32, pages: &[PageText]) -> Self {
        Self {
            method,
            page_count,
            pages: pages.iter().map(PageText::report).collect(),
            fallback_reason: None,
        }
    }

    /// Record why OCR was used.
    pub fn with_fallback_reason(mut self, reason: impl Into<String>) -> Self {
        self.fallback_reason = Some(reason.into());
        self
    }

    /// Number of pages that failed.
    pub fn failed_pages(&self) -> usize {
        self.count(PageStatus::Failed)
    }

    /// Number of pages never processed.
    pub fn skipped_pages(&self) -> usize {
        self.count(PageStatus::Skipped)
    }

    fn count(&self, status: PageStatus) -> usize {
        self.pages.iter().filter(|p| p.status == status).count()
    }
}

/// Raw document text plus its manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Page texts joined with newlines and trimmed
    pub text: String,

    /// How the text was obtained
    pub report: ExtractionReport,
}

impl ExtractedText {
    /// Assemble the document text from per-page results.
    pub fn from_pages(method: ExtractionMethod, page_count: u32, pages: &[PageText]) -> Self {
        Self {
            text: join_pages(pages),
            report: ExtractionReport::from_pages(method, page_count, pages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracted_text_from_pages() {
        let pages = vec![
            PageText::recognized(1, "Lease agreement"),
            PageText::failed(2, "tesseract exited with 1"),
            PageText::skipped(3),
        ];
        let extracted = ExtractedText::from_pages(ExtractionMethod::Ocr, 3, &pages);

        assert_eq!(extracted.text, "Lease agreement");
        assert_eq!(extracted.report.page_count, 3);
        assert_eq!(extracted.report.pages[1].status, PageStatus::Failed);
        assert_eq!(extracted.report.failed_pages(), 1);
        assert_eq!(extracted.report.skipped_pages(), 1);
    }

    #[test]
    fn test_method_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ExtractionMethod::Ocr).unwrap(), "\"ocr\"");
        assert_eq!(ExtractionMethod::Digital.to_string(), "digital");
    }
}
