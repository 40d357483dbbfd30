//! Page-level types: rasterized images and per-page text outcomes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A rasterized page on disk.
///
/// The file belongs to the batch directory that produced it and disappears
/// when that batch is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Page index (1-based)
    pub page: u32,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Location of the image file
    pub path: PathBuf,
}

impl PageImage {
    /// Create a new page image.
    pub fn new(page: u32, width: u32, height: u32, path: impl Into<PathBuf>) -> Self {
        Self {
            page,
            width,
            height,
            path: path.into(),
        }
    }

    /// The larger of the two pixel dimensions.
    pub fn long_edge(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Dimensions after capping the long edge at `max_edge`, keeping the aspect ratio.
    ///
    /// Returns `None` when the image already fits.
    pub fn scaled_to_fit(&self, max_edge: u32) -> Option<(u32, u32)> {
        let long = self.long_edge();
        if long <= max_edge || max_edge == 0 {
            return None;
        }
        let scale = max_edge as f64 / long as f64;
        let width = ((self.width as f64 * scale).round() as u32).clamp(1, max_edge);
        let height = ((self.height as f64 * scale).round() as u32).clamp(1, max_edge);
        Some((width, height))
    }
}

/// What happened to a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Text was obtained (possibly empty, when the page is blank).
    Recognized(String),
    /// Rendering or recognition failed; the reason is kept for diagnostics.
    Failed(String),
    /// The page was never processed because the OCR deadline passed.
    Skipped,
}

/// Text result for one page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Page index (1-based)
    pub page: u32,

    /// Outcome of extraction or recognition
    pub outcome: PageOutcome,
}

impl PageText {
    /// A page whose text was obtained.
    pub fn recognized(page: u32, text: impl Into<String>) -> Self {
        Self {
            page,
            outcome: PageOutcome::Recognized(text.into()),
        }
    }

    /// A page that failed.
    pub fn failed(page: u32, reason: impl Into<String>) -> Self {
        Self {
            page,
            outcome: PageOutcome::Failed(reason.into()),
        }
    }

    /// A page that was never processed.
    pub fn skipped(page: u32) -> Self {
        Self {
            page,
            outcome: PageOutcome::Skipped,
        }
    }

    /// Text contributed to the document. Failed and skipped pages contribute
    /// an empty string.
    pub fn text(&self) -> &str {
        match &self.outcome {
            PageOutcome::Recognized(text) => text,
            PageOutcome::Failed(_) | PageOutcome::Skipped => "",
        }
    }

    /// Summarize the page for the extraction manifest.
    pub fn report(&self) -> PageReport {
        let (status, error) = match &self.outcome {
            PageOutcome::Recognized(text) if text.trim().is_empty() => (PageStatus::Empty, None),
            PageOutcome::Recognized(_) => (PageStatus::Recognized, None),
            PageOutcome::Failed(reason) => (PageStatus::Failed, Some(reason.clone())),
            PageOutcome::Skipped => (PageStatus::Skipped, None),
        };
        PageReport {
            page: self.page,
            status,
            chars: self.text().chars().count(),
            error,
        }
    }
}

/// Manifest status of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    /// Text was obtained
    Recognized,
    /// Processed successfully but yielded no text
    Empty,
    /// Rendering or recognition failed
    Failed,
    /// Never processed
    Skipped,
}

/// Manifest entry for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageReport {
    /// Page index (1-based)
    pub page: u32,

    /// Outcome of processing
    pub status: PageStatus,

    /// Number of characters of raw text
    pub chars: usize,

    /// Failure reason, for failed pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Join page texts in order with newline separators, trimming the result.
pub fn join_pages(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(PageText::text)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_to_fit_landscape() {
        let image = PageImage::new(1, 4000, 3000, "page-1.png");
        assert_eq!(image.long_edge(), 4000);
        assert_eq!(image.scaled_to_fit(2000), Some((2000, 1500)));
    }

    #[test]
    fn test_scaled_to_fit_portrait() {
        // Letter at 300 DPI
        let image = PageImage::new(1, 2550, 3300, "page-1.png");
        let (w, h) = image.scaled_to_fit(2000).unwrap();
        assert_eq!(h, 2000);
        assert_eq!(w, 1545);
    }

    #[test]
    fn test_scaled_to_fit_small_image_untouched() {
        // Letter at 200 DPI stays below the cap
        let image = PageImage::new(1, 1700, 2000, "page-1.png");
        assert_eq!(image.scaled_to_fit(2000), None);
    }

    #[test]
    fn test_page_text_sentinels() {
        assert_eq!(PageText::recognized(1, "abc").text(), "abc");
        assert_eq!(PageText::failed(2, "boom").text(), "");
        assert_eq!(PageText::skipped(3).text(), "");
    }

    #[test]
    fn test_report_distinguishes_empty_failed_skipped() {
        assert_eq!(PageText::recognized(1, "  ").report().status, PageStatus::Empty);
        assert_eq!(
            PageText::recognized(1, "text").report().status,
            PageStatus::Recognized
        );

        let failed = PageText::failed(2, "tesseract crashed").report();
        assert_eq!(failed.status, PageStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("tesseract crashed"));
        assert_eq!(failed.chars, 0);

        assert_eq!(PageText::skipped(3).report().status, PageStatus::Skipped);
    }

    #[test]
    fn test_join_pages_keeps_empty_segments() {
        let pages = vec![
            PageText::recognized(1, "first"),
            PageText::failed(2, "error"),
            PageText::recognized(3, "third\n"),
        ];
        assert_eq!(join_pages(&pages), "first\n\nthird");
    }
}
