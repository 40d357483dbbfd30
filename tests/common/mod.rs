//! Shared fixtures: scripted OCR backends and generated PDFs.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use lawlens::{Error, OcrEngine, PageImage, PageRenderer, Pipeline, PipelineOptions, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};

/// Renderer that writes placeholder files and records every call.
pub struct FakeRenderer {
    page_count: Option<u32>,
    failing_batches: HashSet<u32>,
    pub calls: Mutex<Vec<(u32, u32)>>,
    pub batch_dirs: Mutex<Vec<PathBuf>>,
    pub probes: AtomicUsize,
}

impl FakeRenderer {
    /// A renderer for a document of `page_count` pages.
    pub fn new(page_count: u32) -> Self {
        Self {
            page_count: Some(page_count),
            failing_batches: HashSet::new(),
            calls: Mutex::new(Vec::new()),
            batch_dirs: Mutex::new(Vec::new()),
            probes: AtomicUsize::new(0),
        }
    }

    /// A renderer whose page-count probe always fails.
    pub fn unprobeable() -> Self {
        Self {
            page_count: None,
            ..Self::new(0)
        }
    }

    /// Fail the batch that starts at `first`.
    pub fn failing_batch(mut self, first: u32) -> Self {
        self.failing_batches.insert(first);
        self
    }

    pub fn calls(&self) -> Vec<(u32, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageRenderer for FakeRenderer {
    fn page_count(&self, _pdf: &Path) -> Result<u32> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.page_count
            .ok_or_else(|| Error::Render("pdfinfo failed: Syntax Error".to_string()))
    }

    fn render(
        &self,
        pdf: &Path,
        first: u32,
        last: u32,
        _dpi: u32,
        out_dir: &Path,
    ) -> Result<Vec<PageImage>> {
        assert!(pdf.exists(), "document must be materialized while rendering");
        self.calls.lock().unwrap().push((first, last));
        self.batch_dirs.lock().unwrap().push(out_dir.to_path_buf());

        if self.failing_batches.contains(&first) {
            return Err(Error::Render(format!("pdftoppm failed for pages {}-{}", first, last)));
        }

        let mut images = Vec::new();
        for page in first..=last {
            let path = out_dir.join(format!("page-{}.png", page));
            std::fs::write(&path, b"placeholder")?;
            images.push(PageImage::new(page, 850, 1100, path));
        }
        // Out of order on purpose; the pool must place pages by number.
        images.reverse();
        Ok(images)
    }
}

/// Engine returning scripted text per page.
#[derive(Default)]
pub struct FakeEngine {
    texts: HashMap<u32, String>,
    failing: HashSet<u32>,
    panicking: HashSet<u32>,
    delays: HashMap<u32, Duration>,
    pub calls: AtomicUsize,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl FakeEngine {
    /// Page `n` (1-based) recognizes as `texts[n - 1]`.
    pub fn with_pages<S: AsRef<str>>(texts: &[S]) -> Self {
        Self {
            texts: texts
                .iter()
                .enumerate()
                .map(|(i, t)| (i as u32 + 1, t.as_ref().to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, page: u32) -> Self {
        self.failing.insert(page);
        self
    }

    pub fn panicking_on(mut self, page: u32) -> Self {
        self.panicking.insert(page);
        self
    }

    pub fn with_delay(mut self, page: u32, delay: Duration) -> Self {
        self.delays.insert(page, delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn recognize(&self, image: &PageImage) -> Result<String> {
        assert!(image.path.exists(), "page image must exist during recognition");
        self.calls.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&image.page) {
            thread::sleep(*delay);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.contains(&image.page) {
            panic!("simulated engine crash on page {}", image.page);
        }
        if self.failing.contains(&image.page) {
            return Err(Error::Ocr(format!("tesseract failed on page {}", image.page)));
        }
        Ok(self.texts.get(&image.page).cloned().unwrap_or_default())
    }
}

/// Build a pipeline over fake backends.
pub fn pipeline(
    options: PipelineOptions,
    renderer: &Arc<FakeRenderer>,
    engine: &Arc<FakeEngine>,
) -> Pipeline {
    Pipeline::new(options, renderer.clone(), engine.clone()).unwrap()
}

/// Build a PDF with one page per entry; each line becomes a text-showing operator.
///
/// An empty entry yields a page with no text layer, like a scanned page.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::new();
    for text in pages {
        let mut operations = Vec::new();
        if !text.is_empty() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 11.into()]));
            operations.push(Operation::new("Td", vec![72.into(), 720.into()]));
            operations.push(Operation::new("TL", vec![14.into()]));
            for line in text.lines() {
                operations.push(Operation::new("Tj", vec![Object::string_literal(line)]));
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
