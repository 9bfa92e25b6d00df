//! Document backend used by the prompter

use super::reader::with_document;
use crate::error::Result;
use crate::layout::{build_pages, Page, PageSource, PipelineConfig, RasterTarget};
use image::RgbaImage;

/// Loads documents and renders their pages.
///
/// Every call receives the raw document bytes; implementations hold no
/// per-document state.
pub trait PdfBackend: Send + Sync {
    /// Build the display model of every page. Fails with
    /// [`Error::UnreadableDocument`](crate::Error::UnreadableDocument) before
    /// any page is processed if the data cannot be parsed.
    fn build_pages(&self, data: &[u8], config: &PipelineConfig) -> Result<Vec<Page>>;

    /// Render one page to fit inside `width` x `height` pixels
    fn render_page(&self, data: &[u8], page: usize, width: u32, height: u32) -> Result<RgbaImage>;
}

/// [`PdfBackend`] over PDFium
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumBackend;

impl PdfBackend for PdfiumBackend {
    fn build_pages(&self, data: &[u8], config: &PipelineConfig) -> Result<Vec<Page>> {
        with_document(data, |pages| build_pages(pages, config))
    }

    fn render_page(&self, data: &[u8], page: usize, width: u32, height: u32) -> Result<RgbaImage> {
        with_document(data, |pages| {
            pages.rasterize(page, RasterTarget::Fit { width, height })
        })
    }
}
