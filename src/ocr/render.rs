//! Page rasterization.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::imageops::FilterType;

use crate::error::{Error, Result};
use crate::model::PageImage;

use super::tools::{resolve_binary, stderr_summary};

/// Converts PDF pages to raster images.
pub trait PageRenderer: Send + Sync {
    /// Number of pages in the PDF at `pdf`.
    fn page_count(&self, pdf: &Path) -> Result<u32>;

    /// Render pages `first..=last` (1-based) at `dpi` into `out_dir`.
    ///
    /// Images may come back in any order; missing pages are treated as failed.
    fn render(
        &self,
        pdf: &Path,
        first: u32,
        last: u32,
        dpi: u32,
        out_dir: &Path,
    ) -> Result<Vec<PageImage>>;
}

/// Rasterization through poppler's `pdfinfo` and `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PopplerRenderer {
    pdfinfo: PathBuf,
    pdftoppm: PathBuf,
}

impl PopplerRenderer {
    /// Locate the poppler executables, in `bin_dir` if given, otherwise on `PATH`.
    ///
    /// Fails with [`Error::BackendUnavailable`] if either tool is missing.
    pub fn new(bin_dir: Option<&Path>) -> Result<Self> {
        let pdfinfo = resolve_binary("pdfinfo", bin_dir)?;
        let pdftoppm = resolve_binary("pdftoppm", bin_dir)?;
        log::info!("Using poppler from {}", pdftoppm.display());
        Ok(Self { pdfinfo, pdftoppm })
    }
}

impl PageRenderer for PopplerRenderer {
    fn page_count(&self, pdf: &Path) -> Result<u32> {
        let output = Command::new(&self.pdfinfo)
            .arg(pdf)
            .output()
            .map_err(|e| Error::Render(format!("failed to run pdfinfo: {}", e)))?;

        if !output.status.success() {
            return Err(Error::Render(format!(
                "pdfinfo failed: {}",
                stderr_summary(&output)
            )));
        }

        parse_page_count(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| Error::Render("pdfinfo reported no page count".to_string()))
    }

    fn render(
        &self,
        pdf: &Path,
        first: u32,
        last: u32,
        dpi: u32,
        out_dir: &Path,
    ) -> Result<Vec<PageImage>> {
        let output = Command::new(&self.pdftoppm)
            .args(["-png", "-r", &dpi.to_string()])
            .args(["-f", &first.to_string(), "-l", &last.to_string()])
            .arg(pdf)
            .arg(out_dir.join("page"))
            .output()
            .map_err(|e| Error::Render(format!("failed to run pdftoppm: {}", e)))?;

        if !output.status.success() {
            return Err(Error::Render(format!(
                "pdftoppm failed for pages {}-{}: {}",
                first,
                last,
                stderr_summary(&output)
            )));
        }

        let mut images = Vec::new();
        for page in first..=last {
            let Some(path) = find_page_image(out_dir, page) else {
                log::warn!("pdftoppm produced no image for page {}", page);
                continue;
            };
            let (width, height) = image::image_dimensions(&path)?;
            images.push(PageImage::new(page, width, height, path));
        }
        Ok(images)
    }
}

/// Extract the `Pages:` value from `pdfinfo` output.
fn parse_page_count(info: &str) -> Option<u32> {
    info.lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|value| value.trim().parse().ok())
}

/// Find the image file pdftoppm wrote for `page`.
///
/// pdftoppm zero-pads page numbers to the digit count of the document's
/// last page, so the width is not known in advance.
fn find_page_image(dir: &Path, page: u32) -> Option<PathBuf> {
    (1..=6)
        .map(|width| dir.join(format!("page-{:0width$}.png", page, width = width)))
        .find(|path| path.exists())
}

/// Shrink a page image so its long edge is at most `max_edge` pixels.
///
/// Returns `None` when the image already fits. The resized copy is written
/// next to the original, inside the same batch directory.
pub fn downscale(image: &PageImage, max_edge: u32) -> Result<Option<PageImage>> {
    let Some((width, height)) = image.scaled_to_fit(max_edge) else {
        return Ok(None);
    };

    let resized = image::open(&image.path)?.resize_exact(width, height, FilterType::Lanczos3);
    let path = image
        .path
        .with_file_name(format!("page-{}-fit.png", image.page));
    resized.save(&path)?;

    log::debug!(
        "Downscaled page {} from {}x{} to {}x{}",
        image.page,
        image.width,
        image.height,
        width,
        height
    );
    Ok(Some(PageImage::new(image.page, width, height, path)))
}
