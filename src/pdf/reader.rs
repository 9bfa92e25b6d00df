//! PDFium-backed page source

use crate::error::{Error, Result};
use crate::layout::{BoundingBox, PageSource, RasterTarget, TextFragment};
use image::RgbaImage;
use pdfium_render::prelude::*;

/// Get PDFium instance (creates new instance each time - PDFium is not thread-safe)
fn create_pdfium() -> Result<Pdfium> {
    // Try to bind to system library or use static linking
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::RenderFailure {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

/// Cheap header check done before PDFium is touched
pub fn check_pdf_header(data: &[u8]) -> Result<()> {
    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::UnreadableDocument {
            reason: "Not a valid PDF file".to_string(),
        });
    }
    Ok(())
}

/// A document loaded into PDFium
pub struct PdfiumPages<'a> {
    document: PdfDocument<'a>,
}

/// Load `data` into a fresh PDFium instance and run `f` against it.
///
/// PDFium handles never outlive the call.
pub fn with_document<T>(data: &[u8], f: impl FnOnce(&PdfiumPages<'_>) -> Result<T>) -> Result<T> {
    check_pdf_header(data)?;

    let pdfium = create_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(data, None)
        .map_err(|e| Error::UnreadableDocument {
            reason: format!("{}", e),
        })?;

    let pages = PdfiumPages { document };
    f(&pages)
}

impl PdfiumPages<'_> {
    fn page(&self, index: usize) -> Result<PdfPage<'_>> {
        let pages = self.document.pages();
        let index = u16::try_from(index).map_err(|_| Error::RenderFailure {
            reason: format!("Page index {} too large", index),
        })?;
        pages.get(index).map_err(|e| Error::RenderFailure {
            reason: format!("Failed to get page {}: {}", index, e),
        })
    }
}

impl PageSource for PdfiumPages<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn fragments(&self, page: usize) -> Result<Vec<TextFragment>> {
        let page = self.page(page)?;
        let page_height = page.height().value;

        let text = page.text().map_err(|e| Error::RenderFailure {
            reason: format!("Failed to extract text: {}", e),
        })?;

        let mut builder = WordBuilder::new(page_height);
        for segment in text.segments().iter() {
            if let Ok(chars) = segment.chars() {
                for char_result in chars.iter() {
                    let Some(c) = char_result.unicode_char() else {
                        continue;
                    };
                    match char_result.loose_bounds() {
                        Ok(bounds) if !c.is_whitespace() => builder.push(
                            c,
                            CharBox {
                                left: bounds.left().value,
                                top: bounds.top().value,
                                right: bounds.right().value,
                                bottom: bounds.bottom().value,
                            },
                        ),
                        _ => builder.finish_word(),
                    }
                }
            }
            builder.finish_word();
        }

        Ok(builder.into_fragments())
    }

    fn rasterize(&self, page: usize, target: RasterTarget) -> Result<RgbaImage> {
        let page_index = page;
        let page = self.page(page_index)?;

        let config = match target {
            RasterTarget::Dpi(dpi) => PdfRenderConfig::new().scale_page_by_factor(dpi / 72.0),
            RasterTarget::Fit { width, height } => {
                PdfRenderConfig::new().set_target_size(width as i32, height as i32)
            }
        };
        let config = config.render_form_data(true).render_annotations(true);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| Error::RenderFailure {
                reason: format!("Failed to render page {}: {}", page_index, e),
            })?;

        Ok(bitmap.as_image().to_rgba8())
    }
}

/// Character box in PDF user space (origin bottom-left)
#[derive(Debug, Clone, Copy)]
struct CharBox {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

/// Accumulates characters into word fragments with top-left-origin boxes
struct WordBuilder {
    page_height: f32,
    fragments: Vec<TextFragment>,
    text: String,
    extent: Option<CharBox>,
}

impl WordBuilder {
    fn new(page_height: f32) -> Self {
        Self {
            page_height,
            fragments: Vec::new(),
            text: String::new(),
            extent: None,
        }
    }

    fn push(&mut self, c: char, b: CharBox) {
        self.text.push(c);
        self.extent = Some(match self.extent {
            None => b,
            Some(e) => CharBox {
                left: e.left.min(b.left),
                top: e.top.max(b.top),
                right: e.right.max(b.right),
                bottom: e.bottom.min(b.bottom),
            },
        });
    }

    fn finish_word(&mut self) {
        let Some(e) = self.extent.take() else {
            self.text.clear();
            return;
        };

        let top = (self.page_height - e.top).round() as i32;
        let left = e.left.round() as i32;
        let bbox = BoundingBox::new(
            top,
            left,
            e.right.round() as i32 - left,
            (self.page_height - e.bottom).round() as i32 - top,
        );
        self.fragments
            .push(TextFragment::new(std::mem::take(&mut self.text), bbox));
    }

    fn into_fragments(mut self) -> Vec<TextFragment> {
        self.finish_word();
        self.fragments
    }
}
