//! Selection service driving the display from the active document

use crate::display::{DisplayCommand, DisplaySurface};
use crate::document::{Document, DocumentStore};
use crate::error::{Error, Result};
use crate::layout::{
    fit_font, initial_font_size, split_if_long, BoundingBox, LineContent, PipelineConfig,
    TextMeasure, DEFAULT_MIN_FONT_SIZE, DEFAULT_SPLIT_THRESHOLD,
};
use crate::pdf::{check_pdf_header, PdfBackend};
use crate::source::{PreviewCache, PreviewKey};
use image::{imageops, RgbaImage};
use std::sync::Arc;

/// Prompter tuning
#[derive(Debug, Clone)]
pub struct PrompterConfig {
    /// Lines longer than this are split into two rows at display time
    pub split_threshold: usize,
    pub min_font_size: u32,
    /// Initial font size is the display width divided by this
    pub font_divisor: u32,
    pub pipeline: PipelineConfig,
    pub preview_cache_entries: usize,
    pub preview_cache_max_bytes: usize,
}

impl Default for PrompterConfig {
    fn default() -> Self {
        Self {
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
            min_font_size: DEFAULT_MIN_FONT_SIZE,
            font_divisor: 18,
            pipeline: PipelineConfig::default(),
            preview_cache_entries: 64,
            preview_cache_max_bytes: 64 * 1024 * 1024,
        }
    }
}

/// What `set_line` put on screen
#[derive(Debug, Clone, PartialEq)]
pub enum LineSelection {
    /// A text line at the chosen size; `text` is what was drawn, row break included
    Text {
        page: usize,
        line: usize,
        text: String,
        font_size: u32,
    },
    /// A crop of the page rendered at display size
    Image {
        page: usize,
        line: usize,
        crop: BoundingBox,
    },
    /// Line index out of range, nothing changed
    Ignored,
}

/// The teleprompter: one active document, one display
pub struct Prompter {
    store: DocumentStore,
    previews: PreviewCache,
    backend: Arc<dyn PdfBackend>,
    display: Arc<dyn DisplaySurface>,
    measure: Arc<dyn TextMeasure>,
    config: PrompterConfig,
    initial_font_size: u32,
}

impl Prompter {
    /// The initial font size is fixed here from the display's current width.
    pub fn new(
        backend: Arc<dyn PdfBackend>,
        display: Arc<dyn DisplaySurface>,
        measure: Arc<dyn TextMeasure>,
        config: PrompterConfig,
    ) -> Self {
        let display_size = display.size();
        let initial_font_size = initial_font_size(display_size.0, config.font_divisor);
        tracing::info!(
            size = ?display_size,
            font_size = initial_font_size,
            "prompter ready"
        );
        Self {
            store: DocumentStore::new(),
            previews: PreviewCache::new(
                config.preview_cache_entries,
                config.preview_cache_max_bytes,
            ),
            backend,
            display,
            measure,
            config,
            initial_font_size,
        }
    }

    pub fn initial_font_size(&self) -> u32 {
        self.initial_font_size
    }

    pub fn display_size(&self) -> (u32, u32) {
        self.display.size()
    }

    /// Build the display model of `data` and make it the active document.
    ///
    /// Nothing is replaced if the data cannot be read.
    pub fn upload(&self, data: Vec<u8>) -> Result<Arc<Document>> {
        check_pdf_header(&data)?;

        let pages = self.backend.build_pages(&data, &self.config.pipeline)?;
        let document = Document::new(data, pages);
        let id = document.id();
        tracing::info!(document_id = %id, pages = document.page_count(), "document uploaded");

        let document = self.store.replace(document);
        self.previews.retain_document(id);
        Ok(document)
    }

    /// Snapshot of the active document
    pub fn document(&self) -> Result<Arc<Document>> {
        self.store.require()
    }

    /// PNG of a page rendered into `size` (display size by default).
    ///
    /// Returns the clamped page index with the encoded image.
    pub fn page_preview(&self, page: usize, size: Option<(u32, u32)>) -> Result<(usize, Vec<u8>)> {
        let document = self.store.require()?;
        let page = clamp_page(&document, page)?;
        let (width, height) = size.unwrap_or_else(|| self.display.size());

        let key = PreviewKey {
            document: document.id(),
            page,
            width,
            height,
        };
        if let Some(png) = self.previews.get(&key) {
            return Ok((page, png));
        }

        let image = self.render(&document, page, width, height)?;
        let png = encode_png(&image)?;
        self.previews.put(key, png.clone());
        Ok((page, png))
    }

    /// Show a whole page. Returns the clamped page index.
    pub fn set_page(&self, page: usize) -> Result<usize> {
        let document = self.store.require()?;
        let page = clamp_page(&document, page)?;
        let (width, height) = self.display.size();

        let image = self.render(&document, page, width, height)?;
        self.display.apply(DisplayCommand::Image(image))?;
        tracing::info!(page, "page shown");
        Ok(page)
    }

    /// Show one line: text is split and fitted, image lines are cropped from
    /// a display-size render.
    pub fn set_line(&self, page: usize, line: usize) -> Result<LineSelection> {
        let document = self.store.require()?;
        let Some((page, selected)) = document.line(page, line) else {
            tracing::debug!(page, line, "line index out of range, ignored");
            return Ok(LineSelection::Ignored);
        };

        let (width, height) = self.display.size();
        match &selected.content {
            LineContent::Text { text } => {
                let text = split_if_long(text, self.config.split_threshold);
                let font_size = fit_font(
                    &text,
                    width,
                    height,
                    self.initial_font_size,
                    self.config.min_font_size,
                    self.measure.as_ref(),
                );
                self.display.apply(DisplayCommand::Text {
                    text: text.clone(),
                    font_size,
                })?;
                tracing::info!(page, line, font_size, "text line shown");
                Ok(LineSelection::Text {
                    page,
                    line,
                    text,
                    font_size,
                })
            }
            LineContent::Image {
                image_width,
                image_height,
            } => {
                let full = self.render(&document, page, width, height)?;
                let (cropped, crop) =
                    crop_line(&full, selected.bbox, (*image_width, *image_height));
                self.display.apply(DisplayCommand::Image(cropped))?;
                tracing::info!(page, line, ?crop, "image line shown");
                Ok(LineSelection::Image { page, line, crop })
            }
        }
    }

    /// Blank the display
    pub fn clear_screen(&self) -> Result<()> {
        self.display.apply(DisplayCommand::Clear)
    }

    fn render(&self, document: &Document, page: usize, width: u32, height: u32) -> Result<RgbaImage> {
        self.backend
            .render_page(document.data(), page, width, height)
            .map_err(|e| match e {
                Error::RenderFailure { .. } => e,
                other => Error::render(other),
            })
    }
}

fn clamp_page(document: &Document, page: usize) -> Result<usize> {
    document.clamp_page(page).ok_or_else(|| Error::RenderFailure {
        reason: "document has no pages".to_string(),
    })
}

/// Crop the region of an image line out of a full render of its page.
///
/// The stored box is in preview pixels and ends on the last ink pixel. Its
/// pixel extent is rescaled by the full/preview ratio and clamped to the render.
pub fn crop_line(
    full: &RgbaImage,
    preview_box: BoundingBox,
    preview_size: (u32, u32),
) -> (RgbaImage, BoundingBox) {
    let scaled = preview_box
        .pixel_extent()
        .rescale(preview_size, full.dimensions());

    let x = scaled.left.clamp(0, full.width() as i32) as u32;
    let y = scaled.top.clamp(0, full.height() as i32) as u32;
    let right = scaled.right().clamp(x as i32, full.width() as i32) as u32;
    let bottom = scaled.bottom().clamp(y as i32, full.height() as i32) as u32;

    let crop = BoundingBox::new(y as i32, x as i32, (right - x) as i32, (bottom - y) as i32);
    let image = imageops::crop_imm(full, x, y, right - x, bottom - y).to_image();
    (image, crop)
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(Error::render)?;
    Ok(png)
}
