//! Batched, parallel OCR over a whole document.
//!
//! Pages are rasterized in consecutive batches so that at most one batch of
//! images lives on disk at a time. Within a batch, pages are recognized
//! concurrently on a dedicated worker pool and reassembled in page order.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::{PageImage, PageText};

use super::engine::OcrEngine;
use super::render::{downscale, PageRenderer};

/// Rasterization resolution used when none is configured.
pub const DEFAULT_DPI: u32 = 200;

/// Pages rasterized per batch.
pub const DEFAULT_BATCH_SIZE: u32 = 20;

/// Lower bound on the default worker count.
pub const MIN_WORKERS: usize = 4;

/// Images with a longer edge than this are downscaled before recognition.
pub const MAX_IMAGE_EDGE: u32 = 2000;

/// Default worker count: the machine's parallelism, but at least [`MIN_WORKERS`].
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .max(MIN_WORKERS)
}

/// Settings for the OCR worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOptions {
    /// Rasterization resolution in dots per inch
    pub dpi: u32,

    /// Pages per rasterization batch
    pub batch_size: u32,

    /// Concurrent recognition workers
    pub workers: usize,

    /// Long-edge cap in pixels; 0 disables downscaling
    pub max_image_edge: u32,

    /// Wall-clock budget for the whole OCR run
    pub timeout: Option<Duration>,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            batch_size: DEFAULT_BATCH_SIZE,
            workers: default_workers(),
            max_image_edge: MAX_IMAGE_EDGE,
            timeout: None,
        }
    }
}

impl OcrOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rasterization resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the long-edge cap for page images.
    pub fn with_max_image_edge(mut self, max_image_edge: u32) -> Self {
        self.max_image_edge = max_image_edge;
        self
    }

    /// Stop recognizing new pages once `timeout` has elapsed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reject settings the pool cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(Error::Config("dpi must be greater than zero".to_string()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch size must be greater than zero".to_string()));
        }
        if self.workers == 0 {
            return Err(Error::Config("worker count must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Result of an OCR run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOutput {
    /// Number of pages in the document (0 if it could not be determined)
    pub page_count: u32,

    /// One entry per page, in page order
    pub pages: Vec<PageText>,
}

/// Renders a PDF in batches and recognizes pages on a bounded worker pool.
pub struct OcrPool {
    renderer: Arc<dyn PageRenderer>,
    engine: Arc<dyn OcrEngine>,
    options: OcrOptions,
    pool: rayon::ThreadPool,
}

impl OcrPool {
    /// Create a pool with its own worker threads.
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        engine: Arc<dyn OcrEngine>,
        options: OcrOptions,
    ) -> Result<Self> {
        options.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .thread_name(|i| format!("ocr-worker-{}", i))
            .build()
            .map_err(|e| Error::Config(format!("failed to start OCR workers: {}", e)))?;

        Ok(Self {
            renderer,
            engine,
            options,
            pool,
        })
    }

    /// The options this pool runs with.
    pub fn options(&self) -> &OcrOptions {
        &self.options
    }

    /// Recognize every page of the PDF at `pdf`.
    ///
    /// `known_pages` skips the page-count probe when the caller already knows it.
    /// Page failures never abort the run; they are recorded in the output.
    pub fn run(&self, pdf: &Path, known_pages: Option<u32>) -> OcrOutput {
        let page_count = match known_pages {
            Some(count) => count,
            None => match self.renderer.page_count(pdf) {
                Ok(count) => count,
                Err(e) => {
                    log::warn!("Could not determine page count: {}", e);
                    return OcrOutput {
                        page_count: 0,
                        pages: Vec::new(),
                    };
                }
            },
        };

        log::info!(
            "Running OCR on {} pages with {} ({} workers, batches of {})",
            page_count,
            self.engine.name(),
            self.options.workers,
            self.options.batch_size
        );

        let deadline = self.options.timeout.map(|t| Instant::now() + t);
        let mut pages = Vec::with_capacity(page_count as usize);

        for first in (1..=page_count).step_by(self.options.batch_size as usize) {
            let last = first
                .saturating_add(self.options.batch_size - 1)
                .min(page_count);

            if expired(deadline) {
                log::warn!("OCR deadline reached, skipping pages {}-{}", first, last);
                pages.extend((first..=last).map(PageText::skipped));
                continue;
            }

            pages.extend(self.run_batch(pdf, first, last, deadline));
        }

        OcrOutput { page_count, pages }
    }

    fn run_batch(
        &self,
        pdf: &Path,
        first: u32,
        last: u32,
        deadline: Option<Instant>,
    ) -> Vec<PageText> {
        log::debug!("Rendering pages {}-{}", first, last);

        let dir = match tempfile::Builder::new().prefix("lawlens-batch-").tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                let reason = format!("failed to create batch directory: {}", e);
                log::warn!("Pages {}-{}: {}", first, last, reason);
                return fail_range(first, last, &reason);
            }
        };

        let images = match self
            .renderer
            .render(pdf, first, last, self.options.dpi, dir.path())
        {
            Ok(images) => images,
            Err(e) => {
                log::warn!("Rendering pages {}-{} failed: {}", first, last, e);
                return fail_range(first, last, &e.to_string());
            }
        };

        let mut slots: Vec<Option<PageImage>> = vec![None; (last - first + 1) as usize];
        for image in images {
            if image.page < first || image.page > last {
                log::warn!(
                    "Renderer returned page {} outside batch {}-{}",
                    image.page,
                    first,
                    last
                );
                continue;
            }
            let slot = (image.page - first) as usize;
            slots[slot] = Some(image);
        }

        // The batch directory must outlive every recognition call.
        let pages = self.pool.install(|| {
            slots
                .into_par_iter()
                .enumerate()
                .map(|(i, image)| {
                    let page = first + i as u32;
                    match image {
                        Some(image) => self.recognize_page(image, deadline),
                        None => PageText::failed(page, "page was not rendered"),
                    }
                })
                .collect::<Vec<_>>()
        });

        drop(dir);
        pages
    }

    fn recognize_page(&self, image: PageImage, deadline: Option<Instant>) -> PageText {
        let page = image.page;
        if expired(deadline) {
            return PageText::skipped(page);
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.recognize_image(&image)));
        match result {
            Ok(Ok(text)) => {
                log::debug!("Page {}: {} chars", page, text.chars().count());
                PageText::recognized(page, text)
            }
            Ok(Err(e)) => {
                log::warn!("OCR failed on page {}: {}", page, e);
                PageText::failed(page, e.to_string())
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                log::warn!("OCR panicked on page {}: {}", page, reason);
                PageText::failed(page, reason)
            }
        }
    }

    fn recognize_image(&self, image: &PageImage) -> Result<String> {
        match downscale(image, self.options.max_image_edge) {
            Ok(Some(fitted)) => self.engine.recognize(&fitted),
            Ok(None) => self.engine.recognize(image),
            Err(e) => {
                log::warn!(
                    "Downscaling page {} failed, recognizing at full size: {}",
                    image.page,
                    e
                );
                self.engine.recognize(image)
            }
        }
    }
}

impl std::fmt::Debug for OcrPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrPool")
            .field("engine", &self.engine.name())
            .field("options", &self.options)
            .finish()
    }
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

fn fail_range(first: u32, last: u32, reason: &str) -> Vec<PageText> {
    (first..=last).map(|page| PageText::failed(page, reason)).collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic".to_string()
    }
}
