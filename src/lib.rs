//! # lawlens
//!
//! Text extraction and paragraph importance scoring for legal PDFs.
//!
//! Documents are read from their embedded text layer when it carries enough
//! content, and rasterized and OCR'd in parallel batches otherwise. The raw
//! text is normalized, split into paragraphs, and every paragraph is scored
//! by how often it mentions a caller-supplied keyword list.
//!
//! ## Quick Start
//!
//! ```no_run
//! use lawlens::{analyze_file, Importance};
//!
//! fn main() -> lawlens::Result<()> {
//!     let analysis = analyze_file("lease.pdf", &["tenant", "termination", "rent"])?;
//!
//!     for record in &analysis.records {
//!         if record.importance == Importance::High {
//!             println!("{}", record.paragraph);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **OCR fallback**: poppler + tesseract, batched and bounded in memory
//! - **Parallel recognition**: pages OCR'd concurrently on a Rayon pool, reassembled in order
//! - **Pluggable backends**: `PageRenderer` and `OcrEngine` traits
//! - **Normalization**: hyphenation, whitespace, control characters, page numbers
//! - **Scoring**: whole-word, case-insensitive keyword density in two or three tiers

pub mod error;
pub mod extract;
pub mod json;
pub mod model;
pub mod ocr;
pub mod pipeline;
pub mod score;
pub mod text;

// Re-export commonly used types
pub use error::{Error, Result};
pub use extract::{
    DigitalExtractor, DigitalOutcome, ExtractedText, ExtractionMethod, ExtractionReport,
};
pub use json::{to_json, JsonFormat};
pub use model::{
    Document, Importance, ImportanceRecord, PageImage, PageOutcome, PageReport, PageStatus,
    PageText, TierCounts,
};
pub use ocr::{
    BackendPaths, OcrEngine, OcrOptions, OcrPool, PageRenderer, PopplerRenderer,
    TesseractConfig, TesseractEngine,
};
pub use pipeline::{Analysis, Pipeline, PipelineOptions};
pub use score::{clean_keywords, density, ImportanceScorer, KeywordMatcher, TierScheme};
pub use text::{normalize, split_into_paragraphs, NormalizeOptions, Normalizer, Segmenter};

use std::path::Path;

/// Analyze a PDF file with default options and the system OCR backends.
///
/// # Arguments
///
/// * `path` - Path to the PDF file
/// * `keywords` - Keywords to score paragraphs against
///
/// # Example
///
/// ```no_run
/// use lawlens::analyze_file;
///
/// let analysis = analyze_file("contract.pdf", &["indemnify", "liability"]).unwrap();
/// println!("{} high-importance paragraphs", analysis.metrics.high);
/// ```
pub fn analyze_file<P, S>(path: P, keywords: &[S]) -> Result<Analysis>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    analyze_file_with_options(path, keywords, PipelineOptions::default())
}

/// Analyze a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use lawlens::{analyze_file_with_options, PipelineOptions};
///
/// let options = PipelineOptions::new()
///     .with_dpi(300)
///     .with_medium_threshold(1)
///     .with_high_threshold(3);
/// let analysis = analyze_file_with_options("contract.pdf", &["breach"], options).unwrap();
/// ```
pub fn analyze_file_with_options<P: AsRef<Path>, S: AsRef<str>>(
    path: P,
    keywords: &[S],
    options: PipelineOptions,
) -> Result<Analysis> {
    let doc = Document::open(path)?;
    let pipeline = Pipeline::with_system_backends(options, &BackendPaths::default())?;
    pipeline.analyze(&doc, keywords)
}

/// Extract normalized text from a PDF file, using OCR if needed.
///
/// # Example
///
/// ```no_run
/// use lawlens::extract_text;
///
/// let text = extract_text("scanned.pdf").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = Document::open(path)?;
    let options = PipelineOptions::default();
    let pipeline = Pipeline::with_system_backends(options, &BackendPaths::default())?;
    let extracted = pipeline.extract_text(&doc)?;
    Ok(pipeline.normalize(&extracted.text))
}

/// Score the paragraphs of already-extracted text with default settings.
///
/// Normalizes and segments `raw`, then classifies each paragraph using the
/// two-tier scheme. No OCR backend is involved.
///
/// # Example
///
/// ```
/// use lawlens::{score_text, Importance};
///
/// let records = score_text(
///     "The tenant shall pay the rent and the tenant shall keep the premises clean.",
///     &["tenant"],
/// );
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].importance, Importance::High);
/// ```
pub fn score_text<S: AsRef<str>>(raw: &str, keywords: &[S]) -> Vec<ImportanceRecord> {
    let text = normalize(raw);
    let paragraphs = Segmenter::default().segment(&text);
    ImportanceScorer::default().score(&paragraphs, keywords)
}
