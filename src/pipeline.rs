//! End-to-end analysis: extraction, normalization, segmentation and scoring.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::extract::{
    DigitalExtractor, DigitalOutcome, ExtractedText, ExtractionMethod, ExtractionReport,
    DEFAULT_MIN_DIGITAL_CHARS,
};
use crate::model::{Document, ImportanceRecord, TierCounts};
use crate::ocr::{
    default_workers, BackendPaths, OcrEngine, OcrOptions, OcrPool, PageRenderer,
    PopplerRenderer, TesseractConfig, TesseractEngine, DEFAULT_BATCH_SIZE, DEFAULT_DPI,
    MAX_IMAGE_EDGE,
};
use crate::score::{clean_keywords, ImportanceScorer, TierScheme};
use crate::text::{
    NormalizeOptions, Normalizer, SegmentOptions, Segmenter, DEFAULT_MIN_PARAGRAPH_CHARS,
};

/// Options for a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// OCR rasterization resolution in dots per inch
    pub dpi: u32,

    /// Pages rasterized per OCR batch
    pub batch_size: u32,

    /// Concurrent OCR workers
    pub workers: usize,

    /// Digital text shorter than this triggers OCR
    pub min_digital_chars: usize,

    /// Fragments shorter than this are not paragraphs
    pub min_paragraph_chars: usize,

    /// Importance thresholds
    pub tiers: TierScheme,

    /// Wall-clock budget for OCR
    pub ocr_timeout: Option<Duration>,

    /// Normalizer passes
    pub normalize: NormalizeOptions,

    /// Tesseract language for the system OCR backend
    pub language: String,

    /// Run keyword cleanup before scoring
    pub clean_keywords: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            batch_size: DEFAULT_BATCH_SIZE,
            workers: default_workers(),
            min_digital_chars: DEFAULT_MIN_DIGITAL_CHARS,
            min_paragraph_chars: DEFAULT_MIN_PARAGRAPH_CHARS,
            tiers: TierScheme::default(),
            ocr_timeout: None,
            normalize: NormalizeOptions::default(),
            language: "eng".to_string(),
            clean_keywords: false,
        }
    }
}

impl PipelineOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the OCR resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the OCR batch size.
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the OCR worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the minimum digital text length.
    pub fn with_min_digital_chars(mut self, chars: usize) -> Self {
        self.min_digital_chars = chars;
        self
    }

    /// Set the minimum paragraph length.
    pub fn with_min_paragraph_chars(mut self, chars: usize) -> Self {
        self.min_paragraph_chars = chars;
        self
    }

    /// Set the density at which paragraphs become high importance.
    pub fn with_high_threshold(mut self, high: usize) -> Self {
        self.tiers.high = high;
        self
    }

    /// Enable the medium tier starting at `medium`.
    pub fn with_medium_threshold(mut self, medium: usize) -> Self {
        self.tiers.medium = Some(medium);
        self
    }

    /// Bound the time spent in OCR.
    pub fn with_ocr_timeout(mut self, timeout: Duration) -> Self {
        self.ocr_timeout = Some(timeout);
        self
    }

    /// Set the normalizer passes.
    pub fn with_normalize(mut self, normalize: NormalizeOptions) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set the tesseract language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Clean keywords (lowercase, dedupe, drop short ones) before scoring.
    pub fn with_clean_keywords(mut self, enabled: bool) -> Self {
        self.clean_keywords = enabled;
        self
    }

    /// OCR pool settings derived from these options.
    pub fn ocr_options(&self) -> OcrOptions {
        OcrOptions {
            dpi: self.dpi,
            batch_size: self.batch_size,
            workers: self.workers,
            max_image_edge: MAX_IMAGE_EDGE,
            timeout: self.ocr_timeout,
        }
    }

    /// Reject inconsistent settings.
    pub fn validate(&self) -> Result<()> {
        self.ocr_options().validate()?;
        if let Some(medium) = self.tiers.medium {
            if medium >= self.tiers.high {
                return Err(Error::Config(format!(
                    "medium threshold ({}) must be below the high threshold ({})",
                    medium, self.tiers.high
                )));
            }
        }
        if self.language.trim().is_empty() {
            return Err(Error::Config("OCR language must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Everything produced for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Normalized document text
    pub text: String,

    /// Scored paragraphs, in reading order
    pub records: Vec<ImportanceRecord>,

    /// Paragraph counts per tier
    pub metrics: TierCounts,

    /// Keywords actually used for scoring
    pub keywords: Vec<String>,

    /// How the raw text was obtained
    pub extraction: ExtractionReport,
}

/// Document analysis pipeline with injected OCR backends.
///
/// # Example
///
/// ```no_run
/// use lawlens::{BackendPaths, Document, Pipeline, PipelineOptions};
///
/// let pipeline = Pipeline::with_system_backends(PipelineOptions::default(), &BackendPaths::new())?;
/// let doc = Document::open("lease.pdf")?;
/// let analysis = pipeline.analyze(&doc, &["tenant", "rent"])?;
/// for record in &analysis.records {
///     println!("[{}] {}", record.importance, record.paragraph);
/// }
/// # Ok::<(), lawlens::Error>(())
/// ```
pub struct Pipeline {
    options: PipelineOptions,
    renderer: Arc<dyn PageRenderer>,
    engine: Arc<dyn OcrEngine>,
    digital: DigitalExtractor,
    normalizer: Normalizer,
    segmenter: Segmenter,
    scorer: ImportanceScorer,
}

impl Pipeline {
    /// Create a pipeline over the given OCR backends.
    pub fn new(
        options: PipelineOptions,
        renderer: Arc<dyn PageRenderer>,
        engine: Arc<dyn OcrEngine>,
    ) -> Result<Self> {
        options.validate()?;

        let segment = SegmentOptions::new().with_min_chars(options.min_paragraph_chars);

        Ok(Self {
            digital: DigitalExtractor::new(options.min_digital_chars),
            normalizer: Normalizer::new(options.normalize.clone()),
            segmenter: Segmenter::new(segment),
            scorer: ImportanceScorer::new(options.tiers),
            options,
            renderer,
            engine,
        })
    }

    /// Create a pipeline over poppler and tesseract.
    ///
    /// Fails with [`Error::BackendUnavailable`] if any executable is missing.
    pub fn with_system_backends(options: PipelineOptions, paths: &BackendPaths) -> Result<Self> {
        options.validate()?;

        let mut config = TesseractConfig::new().with_language(options.language.clone());
        if let Some(binary) = &paths.tesseract {
            config = config.with_binary(binary);
        }
        let engine = TesseractEngine::new(config)?;
        let renderer = PopplerRenderer::new(paths.poppler_bin.as_deref())?;

        Self::new(options, Arc::new(renderer), Arc::new(engine))
    }

    /// The options this pipeline runs with.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Obtain the raw text, from the text layer if it is usable, otherwise by OCR.
    pub fn extract_text(&self, doc: &Document) -> Result<ExtractedText> {
        let outcome = match self.digital.extract(doc) {
            DigitalOutcome::Sufficient(extracted) => {
                log::debug!("Using digital text layer");
                return Ok(extracted);
            }
            other => other,
        };

        let reason = outcome
            .fallback_reason(self.digital.min_chars())
            .unwrap_or_default();
        match &outcome {
            DigitalOutcome::Failed(_) => log::warn!("Falling back to OCR: {}", reason),
            _ => log::info!("Falling back to OCR: {}", reason),
        }

        let known_pages = outcome.page_count().filter(|&count| count > 0);
        let pdf = doc.materialize()?;
        let pool = OcrPool::new(
            Arc::clone(&self.renderer),
            Arc::clone(&self.engine),
            self.options.ocr_options(),
        )?;
        let output = pool.run(pdf.path(), known_pages);

        let mut extracted =
            ExtractedText::from_pages(ExtractionMethod::Ocr, output.page_count, &output.pages);
        extracted.report = extracted.report.with_fallback_reason(reason);
        Ok(extracted)
    }

    /// Normalize raw text.
    pub fn normalize(&self, raw: &str) -> String {
        self.normalizer.normalize(raw)
    }

    /// Split normalized text into paragraphs.
    pub fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.segmenter.segment(text)
    }

    /// Score paragraphs against a keyword list.
    pub fn score<P, S>(&self, paragraphs: &[P], keywords: &[S]) -> Vec<ImportanceRecord>
    where
        P: AsRef<str>,
        S: AsRef<str>,
    {
        self.scorer.score(paragraphs, keywords)
    }

    /// Run the whole pipeline on a document.
    pub fn analyze<S: AsRef<str>>(&self, doc: &Document, keywords: &[S]) -> Result<Analysis> {
        let extracted = self.extract_text(doc)?;
        Ok(self.analyze_extracted(extracted, keywords))
    }

    /// Normalize, segment and score already-extracted text.
    pub fn analyze_extracted<S: AsRef<str>>(
        &self,
        extracted: ExtractedText,
        keywords: &[S],
    ) -> Analysis {
        let keywords: Vec<String> = if self.options.clean_keywords {
            clean_keywords(keywords)
        } else {
            keywords.iter().map(|k| k.as_ref().to_string()).collect()
        };

        let text = self.normalize(&extracted.text);
        let paragraphs = self.segment(&text);
        let records = self.score(&paragraphs, &keywords);
        let metrics = TierCounts::from_records(&records, keywords.len());

        log::debug!(
            "Scored {} paragraphs: {} high, {} medium, {} low",
            metrics.total_paragraphs,
            metrics.high,
            metrics.medium,
            metrics.low
        );

        Analysis {
            text,
            records,
            metrics,
            keywords,
            extraction: extracted.report,
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("options", &self.options)
            .field("engine", &self.engine.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Importance, PageImage, PageText};
    use std::path::Path;

    struct NoRenderer;

    impl PageRenderer for NoRenderer {
        fn page_count(&self, _pdf: &Path) -> Result<u32> {
            Err(Error::Render("no pages".to_string()))
        }

        fn render(&self, _: &Path, _: u32, _: u32, _: u32, _: &Path) -> Result<Vec<PageImage>> {
            Ok(Vec::new())
        }
    }

    struct NoEngine;

    impl OcrEngine for NoEngine {
        fn name(&self) -> &str {
            "none"
        }

        fn recognize(&self, _image: &PageImage) -> Result<String> {
            Ok(String::new())
        }
    }

    fn pipeline(options: PipelineOptions) -> Pipeline {
        Pipeline::new(options, Arc::new(NoRenderer), Arc::new(NoEngine)).unwrap()
    }

    #[test]
    fn test_default_options() {
        let options = PipelineOptions::default();
        assert_eq!(options.dpi, 200);
        assert_eq!(options.batch_size, 20);
        assert!(options.workers >= 4);
        assert_eq!(options.min_digital_chars, 50);
        assert_eq!(options.min_paragraph_chars, 40);
        assert_eq!(options.tiers, TierScheme::two_tier(2));
        assert!(!options.clean_keywords);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_options() {
        assert!(PipelineOptions::new().with_dpi(0).validate().is_err());
        assert!(PipelineOptions::new().with_batch_size(0).validate().is_err());
        assert!(PipelineOptions::new().with_workers(0).validate().is_err());
        assert!(PipelineOptions::new().with_language(" ").validate().is_err());

        let err = PipelineOptions::new()
            .with_high_threshold(3)
            .with_medium_threshold(3)
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(PipelineOptions::new()
            .with_high_threshold(3)
            .with_medium_threshold(1)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_new_validates() {
        let result = Pipeline::new(
            PipelineOptions::new().with_batch_size(0),
            Arc::new(NoRenderer),
            Arc::new(NoEngine),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unreadable_pdf_yields_empty_analysis() {
        let pipeline = pipeline(PipelineOptions::new().with_workers(1));
        let doc = Document::from_bytes(b"not a pdf".to_vec());

        let analysis = pipeline.analyze(&doc, &["tenant"]).unwrap();
        assert_eq!(analysis.text, "");
        assert!(analysis.records.is_empty());
        assert_eq!(analysis.extraction.method, ExtractionMethod::Ocr);
        assert_eq!(analysis.extraction.page_count, 0);
        assert!(analysis.extraction.pages.is_empty());
        assert!(analysis.extraction.fallback_reason.is_some());
    }

    #[test]
    fn test_analyze_extracted_cleans_keywords() {
        let pipeline = pipeline(PipelineOptions::new().with_clean_keywords(true));
        let pages = vec![PageText::recognized(
            1,
            "The Tenant shall pay rent monthly to the landlord at the agreed address.",
        )];
        let extracted = ExtractedText::from_pages(ExtractionMethod::Digital, 1, &pages);

        let analysis = pipeline.analyze_extracted(extracted, &["TENANT", "tenant", "Rent", "ab"]);
        assert_eq!(analysis.keywords, vec!["tenant", "rent"]);
        assert_eq!(analysis.records.len(), 1);
        assert_eq!(analysis.records[0].density, 2);
        assert_eq!(analysis.records[0].importance, Importance::High);
        assert_eq!(analysis.metrics.high, 1);
        assert_eq!(analysis.metrics.total_keywords, 2);
    }
}
