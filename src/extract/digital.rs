//! Extraction from the PDF's embedded text layer using lopdf.

use lopdf::Document as LopdfDocument;

use crate::error::{Error, Result};
use crate::model::{Document, PageText};

use super::{ExtractedText, ExtractionMethod};

/// Digital text shorter than this (after trimming) triggers OCR fallback.
pub const DEFAULT_MIN_DIGITAL_CHARS: usize = 50;

/// Result of attempting digital extraction.
#[derive(Debug)]
pub enum DigitalOutcome {
    /// The text layer had enough content.
    Sufficient(ExtractedText),

    /// The PDF parsed but carries too little text.
    Insufficient {
        /// Characters found after trimming
        chars: usize,
        /// Page count of the parsed document
        page_count: u32,
    },

    /// The PDF could not be parsed or its text could not be read.
    Failed(Error),
}

impl DigitalOutcome {
    /// Page count learned while parsing, if any.
    pub fn page_count(&self) -> Option<u32> {
        match self {
            DigitalOutcome::Sufficient(extracted) => Some(extracted.report.page_count),
            DigitalOutcome::Insufficient { page_count, .. } => Some(*page_count),
            DigitalOutcome::Failed(_) => None,
        }
    }

    /// Human-readable reason OCR is needed, or `None` when it is not.
    pub fn fallback_reason(&self, min_chars: usize) -> Option<String> {
        match self {
            DigitalOutcome::Sufficient(_) => None,
            DigitalOutcome::Insufficient { chars, .. } => Some(format!(
                "digital text too short ({} < {} chars)",
                chars, min_chars
            )),
            DigitalOutcome::Failed(e) => Some(format!("digital extraction failed: {}", e)),
        }
    }
}

/// Reads the embedded text layer page by page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitalExtractor {
    min_chars: usize,
}

impl Default for DigitalExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DIGITAL_CHARS)
    }
}

impl DigitalExtractor {
    /// Create an extractor that requires at least `min_chars` characters.
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    /// Minimum content threshold.
    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    /// Extract the text layer and decide whether it is usable.
    pub fn extract(&self, doc: &Document) -> DigitalOutcome {
        let (page_count, pages) = match read_pages(doc.bytes()) {
            Ok(result) => result,
            Err(e) => return DigitalOutcome::Failed(e),
        };

        let extracted = ExtractedText::from_pages(ExtractionMethod::Digital, page_count, &pages);
        let chars = extracted.text.chars().count();
        log::debug!("Digital text layer: {} pages, {} chars", page_count, chars);

        if chars < self.min_chars {
            DigitalOutcome::Insufficient { chars, page_count }
        } else {
            DigitalOutcome::Sufficient(extracted)
        }
    }
}

fn read_pages(data: &[u8]) -> Result<(u32, Vec<PageText>)> {
    let doc = LopdfDocument::load_mem(data)?;
    if doc.is_encrypted() {
        return Err(Error::Encrypted);
    }

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    let mut pages = Vec::with_capacity(page_numbers.len());
    for page in &page_numbers {
        let text = doc
            .extract_text(&[*page])
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page, e)))?;
        pages.push(PageText::recognized(*page, text));
    }

    Ok((page_numbers.len() as u32, pages))
}
