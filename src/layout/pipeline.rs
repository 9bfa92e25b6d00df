//! Per-page orchestration: fragments to display lines

use super::geometry::{Line, Page, TextFragment};
use super::ink::{detect_ink_bbox, WHITE};
use super::normalize::Normalizer;
use super::reconstruct::reconstruct;
use crate::error::Result;
use image::RgbaImage;

/// Raster size requested from a [`PageSource`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RasterTarget {
    /// Render at a resolution in dots per inch
    Dpi(f32),
    /// Render to fit inside a pixel box
    Fit { width: u32, height: u32 },
}

/// Per-page access to a loaded document
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Positioned text fragments of a page, in any order
    fn fragments(&self, page: usize) -> Result<Vec<TextFragment>>;

    /// Rasterize a page
    fn rasterize(&self, page: usize, target: RasterTarget) -> Result<RgbaImage>;
}

/// Pipeline settings
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Resolution of the preview used for ink detection
    pub preview_dpi: f32,
    pub normalizer: Normalizer,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            preview_dpi: 36.0,
            normalizer: Normalizer::default(),
        }
    }
}

/// Build the display model of every page.
pub fn build_pages<S: PageSource + ?Sized>(source: &S, config: &PipelineConfig) -> Result<Vec<Page>> {
    (0..source.page_count())
        .map(|index| build_page(source, index, config))
        .collect()
}

/// Build the display model of one page.
///
/// Text pages get one normalized line per reconstructed line. Stored text is
/// never pre-split. Pages without text are rasterized at the preview
/// resolution and get a single image line around the ink, or nothing if the
/// preview is blank.
pub fn build_page<S: PageSource + ?Sized>(
    source: &S,
    index: usize,
    config: &PipelineConfig,
) -> Result<Page> {
    let fragments = source.fragments(index)?;

    if !fragments.is_empty() {
        let lines = reconstruct(fragments)
            .into_iter()
            .map(|raw| Line::text(raw.bbox, config.normalizer.normalize(&raw.text)))
            .collect();
        return Ok(Page::new(lines));
    }

    let preview = source.rasterize(index, RasterTarget::Dpi(config.preview_dpi))?;
    match detect_ink_bbox(&preview, WHITE) {
        Some(bbox) => {
            tracing::debug!(page = index, ?bbox, "image-only page");
            Ok(Page::new(vec![Line::image(
                bbox,
                preview.width(),
                preview.height(),
            )]))
        }
        None => {
            tracing::debug!(page = index, "blank page");
            Ok(Page::default())
        }
    }
}
