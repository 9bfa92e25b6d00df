//! Integration tests for the PDF prompter

use image::{Rgba, RgbaImage};
use pdf_prompter::display::{DisplayCommand, DisplaySurface};
use pdf_prompter::layout::{
    build_pages, BoundingBox, LineContent, Page, PageSource, PipelineConfig, RasterTarget,
    TextExtent, TextFragment, WHITE,
};
use pdf_prompter::pdf::PdfBackend;
use pdf_prompter::{Error, LineSelection, Prompter, PrompterConfig, Result};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// In-memory document: fragments per page plus one preview raster per page
#[derive(Clone)]
struct MemoryPages {
    fragments: Vec<Vec<TextFragment>>,
    previews: Vec<RgbaImage>,
}

impl PageSource for MemoryPages {
    fn page_count(&self) -> usize {
        self.fragments.len()
    }

    fn fragments(&self, page: usize) -> Result<Vec<TextFragment>> {
        Ok(self.fragments[page].clone())
    }

    fn rasterize(&self, page: usize, target: RasterTarget) -> Result<RgbaImage> {
        let preview = &self.previews[page];
        match target {
            RasterTarget::Dpi(_) => Ok(preview.clone()),
            RasterTarget::Fit { width, height } => Ok(image::imageops::resize(
                preview,
                width,
                height,
                image::imageops::FilterType::Nearest,
            )),
        }
    }
}

/// Backend that maps a document's first byte after the header to a fixture
struct MemoryBackend {
    documents: Vec<MemoryPages>,
    fail_render: bool,
}

impl MemoryBackend {
    fn pick(&self, data: &[u8]) -> Result<&MemoryPages> {
        data.get(4)
            .and_then(|&i| self.documents.get(i as usize))
            .ok_or_else(|| Error::UnreadableDocument {
                reason: "unknown fixture".to_string(),
            })
    }
}

impl PdfBackend for MemoryBackend {
    fn build_pages(&self, data: &[u8], config: &PipelineConfig) -> Result<Vec<Page>> {
        build_pages(self.pick(data)?, config)
    }

    fn render_page(&self, data: &[u8], page: usize, width: u32, height: u32) -> Result<RgbaImage> {
        if self.fail_render {
            return Err(Error::RenderFailure {
                reason: "backend down".to_string(),
            });
        }
        self.pick(data)?
            .rasterize(page, RasterTarget::Fit { width, height })
    }
}

/// Display that records every command
struct RecordingDisplay {
    size: (u32, u32),
    commands: Mutex<Vec<DisplayCommand>>,
}

impl RecordingDisplay {
    fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            commands: Mutex::new(Vec::new()),
        }
    }

    fn last(&self) -> Option<DisplayCommand> {
        self.commands.lock().last().cloned()
    }

    fn count(&self) -> usize {
        self.commands.lock().len()
    }
}

impl DisplaySurface for RecordingDisplay {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn apply(&self, command: DisplayCommand) -> Result<()> {
        self.commands.lock().push(command);
        Ok(())
    }
}

/// Half an em per character, rows split on '\n'
fn half_em(text: &str, size: u32, _bounds: (u32, u32)) -> TextExtent {
    let rows: Vec<&str> = text.split('\n').collect();
    let widest = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    TextExtent::new(
        widest as f32 * size as f32 * 0.5,
        rows.len() as f32 * size as f32,
    )
}

fn frag(text: &str, top: i32, left: i32, width: i32, height: i32) -> TextFragment {
    TextFragment::new(text, BoundingBox::new(top, left, width, height))
}

fn square_preview() -> RgbaImage {
    let mut preview = RgbaImage::from_pixel(40, 40, WHITE);
    for y in 5..=20 {
        for x in 5..=20 {
            preview.put_pixel(x, y, Rgba([0, 0, 0, 255]));
        }
    }
    preview
}

fn liturgy() -> MemoryPages {
    let long = "Seigneur Jésus, envoyé par le Père pour guérir et sauver les hommes, prends pitié";
    let words: Vec<&str> = long.split(' ').collect();
    let mut long_fragments = Vec::new();
    let mut left = 0;
    for word in words {
        long_fragments.push(frag(word, 60, left, 10, 12));
        left += 20;
    }

    let mut page0 = vec![
        frag("file", 10, 35, 30, 10),
        frag("PDF", 10, 0, 30, 10),
        frag("R/", 30, 0, 10, 12),
        frag("Amen.", 30, 14, 30, 12),
    ];
    page0.extend(long_fragments);

    MemoryPages {
        fragments: vec![page0, Vec::new(), Vec::new()],
        previews: vec![
            RgbaImage::from_pixel(40, 40, WHITE),
            square_preview(),
            RgbaImage::from_pixel(40, 40, WHITE),
        ],
    }
}

fn other_document() -> MemoryPages {
    MemoryPages {
        fragments: vec![vec![frag("Alléluia", 0, 0, 40, 12)]],
        previews: vec![RgbaImage::from_pixel(10, 10, WHITE)],
    }
}

fn upload_bytes(fixture: u8) -> Vec<u8> {
    vec![b'%', b'P', b'D', b'F', fixture]
}

fn prompter_with(display: Arc<RecordingDisplay>, fail_render: bool) -> Prompter {
    Prompter::new(
        Arc::new(MemoryBackend {
            documents: vec![liturgy(), other_document()],
            fail_render,
        }),
        display,
        Arc::new(half_em),
        PrompterConfig::default(),
    )
}

#[test]
fn test_upload_builds_display_model() {
    let prompter = prompter_with(Arc::new(RecordingDisplay::new(1800, 1000)), false);
    let document = prompter.upload(upload_bytes(0)).unwrap();

    assert_eq!(document.page_count(), 3);
    let page0 = &document.pages()[0];
    assert_eq!(page0.lines.len(), 3);

    assert_eq!(page0.lines[0].text_str(), "PDF\u{a0}file");
    assert_eq!(page0.lines[0].bbox, BoundingBox::new(10, 0, 65, 10));
    assert_eq!(page0.lines[1].text_str(), "Amen.");
    assert!(!page0.lines[2].text_str().contains('\n'));

    let image = &document.pages()[1].lines[0];
    assert_eq!(image.bbox, BoundingBox::new(5, 5, 15, 15));
    assert_eq!(
        image.content,
        LineContent::Image {
            image_width: 40,
            image_height: 40
        }
    );

    assert!(document.pages()[2].is_empty());
}

#[test]
fn test_document_serializes_for_preview_clients() {
    let prompter = prompter_with(Arc::new(RecordingDisplay::new(1800, 1000)), false);
    let document = prompter.upload(upload_bytes(0)).unwrap();

    let value = serde_json::to_value(document.pages()).unwrap();
    assert_eq!(value[0][0]["text"], "PDF\u{a0}file");
    assert_eq!(value[0][0]["is_image"], false);
    assert!(value[0][0].get("image_width").is_none());
    assert_eq!(value[1][0]["image_width"], 40);
    assert_eq!(value[1][0]["left"], 5);
    assert_eq!(value[2], serde_json::json!([]));
}

#[test]
fn test_set_line_splits_long_text_and_fits_font() {
    let display = Arc::new(RecordingDisplay::new(1800, 1000));
    let prompter = prompter_with(display.clone(), false);
    prompter.upload(upload_bytes(0)).unwrap();
    assert_eq!(prompter.initial_font_size(), 100);

    let selection = prompter.set_line(0, 2).unwrap();
    let LineSelection::Text {
        text, font_size, ..
    } = selection
    else {
        panic!("expected a text line, got {:?}", selection);
    };

    assert_eq!(text.matches('\n').count(), 1);
    let (first, _) = text.split_once('\n').unwrap();
    assert!(first.ends_with(','));

    let widest = text.split('\n').map(|r| r.chars().count()).max().unwrap() as u32;
    assert!(widest * font_size <= 3600);
    assert!(widest * (font_size + 1) > 3600);

    match display.last() {
        Some(DisplayCommand::Text {
            text: shown,
            font_size: shown_size,
        }) => {
            assert_eq!(shown, text);
            assert_eq!(shown_size, font_size);
        }
        other => panic!("unexpected display command {:?}", other),
    }
}

#[test]
fn test_short_line_uses_initial_size() {
    let prompter = prompter_with(Arc::new(RecordingDisplay::new(1800, 1000)), false);
    prompter.upload(upload_bytes(0)).unwrap();

    let selection = prompter.set_line(0, 1).unwrap();
    assert_eq!(
        selection,
        LineSelection::Text {
            page: 0,
            line: 1,
            text: "Amen.".to_string(),
            font_size: 100,
        }
    );
}

#[test]
fn test_image_line_is_cropped_with_rescaled_box() {
    let display = Arc::new(RecordingDisplay::new(80, 80));
    let prompter = prompter_with(display.clone(), false);
    prompter.upload(upload_bytes(0)).unwrap();

    let selection = prompter.set_line(1, 0).unwrap();
    assert_eq!(
        selection,
        LineSelection::Image {
            page: 1,
            line: 0,
            crop: BoundingBox::new(10, 10, 32, 32),
        }
    );

    match display.last() {
        Some(DisplayCommand::Image(image)) => {
            assert_eq!(image.dimensions(), (32, 32));
            assert!(image.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
        }
        other => panic!("unexpected display command {:?}", other),
    }
}

#[test]
fn test_image_line_crop_keeps_all_ink() {
    let ink = Rgba([0, 0, 0, 255]);
    for size in [40, 80, 120] {
        let display = Arc::new(RecordingDisplay::new(size, size));
        let prompter = prompter_with(display.clone(), false);
        prompter.upload(upload_bytes(0)).unwrap();
        prompter.set_line(1, 0).unwrap();

        let full = liturgy()
            .rasterize(1, RasterTarget::Fit {
                width: size,
                height: size,
            })
            .unwrap();
        let total = full.pixels().filter(|p| **p == ink).count();

        match display.last() {
            Some(DisplayCommand::Image(image)) => {
                let shown = image.pixels().filter(|p| **p == ink).count();
                assert_eq!(shown, total, "display {}x{}", size, size);
            }
            other => panic!("unexpected display command {:?}", other),
        }
    }
}

#[test]
fn test_out_of_range_indices() {
    let display = Arc::new(RecordingDisplay::new(1800, 1000));
    let prompter = prompter_with(display.clone(), false);
    prompter.upload(upload_bytes(0)).unwrap();

    // Page clamps to the last page, which has no lines
    assert_eq!(prompter.set_line(99, 0).unwrap(), LineSelection::Ignored);
    assert_eq!(prompter.set_line(0, 3).unwrap(), LineSelection::Ignored);
    assert_eq!(display.count(), 0);

    assert_eq!(prompter.set_page(99).unwrap(), 2);
    assert_eq!(display.count(), 1);
}

#[test]
fn test_no_document() {
    let prompter = prompter_with(Arc::new(RecordingDisplay::new(100, 100)), false);
    assert!(matches!(prompter.set_line(0, 0), Err(Error::NoDocument)));
    assert!(matches!(prompter.set_page(0), Err(Error::NoDocument)));
    assert!(matches!(prompter.document(), Err(Error::NoDocument)));
}

#[test]
fn test_unreadable_upload_keeps_active_document() {
    let prompter = prompter_with(Arc::new(RecordingDisplay::new(100, 100)), false);
    let first = prompter.upload(upload_bytes(0)).unwrap();

    let result = prompter.upload(b"GIF89a".to_vec());
    assert!(matches!(result, Err(Error::UnreadableDocument { .. })));

    let result = prompter.upload(upload_bytes(7));
    assert!(matches!(result, Err(Error::UnreadableDocument { .. })));

    assert_eq!(prompter.document().unwrap().id(), first.id());
}

#[test]
fn test_render_failure_is_reported() {
    let display = Arc::new(RecordingDisplay::new(100, 100));
    let prompter = prompter_with(display.clone(), true);
    let document = prompter.upload(upload_bytes(0)).unwrap();

    assert!(matches!(
        prompter.set_page(0),
        Err(Error::RenderFailure { .. })
    ));
    assert!(matches!(
        prompter.set_line(1, 0),
        Err(Error::RenderFailure { .. })
    ));
    assert!(matches!(
        prompter.page_preview(0, None),
        Err(Error::RenderFailure { .. })
    ));
    assert_eq!(display.count(), 0);
    assert_eq!(prompter.document().unwrap().id(), document.id());
}

#[test]
fn test_reupload_replaces_document() {
    let prompter = prompter_with(Arc::new(RecordingDisplay::new(100, 100)), false);
    let first = prompter.upload(upload_bytes(0)).unwrap();
    let second = prompter.upload(upload_bytes(1)).unwrap();

    assert_ne!(first.id(), second.id());
    let active = prompter.document().unwrap();
    assert_eq!(active.page_count(), 1);
    assert_eq!(active.pages()[0].lines[0].text_str(), "Alléluia");

    // Old snapshot is untouched
    assert_eq!(first.page_count(), 3);
}

#[test]
fn test_page_preview_is_cached_per_document() {
    let prompter = prompter_with(Arc::new(RecordingDisplay::new(64, 48)), false);
    prompter.upload(upload_bytes(0)).unwrap();

    let (page, png) = prompter.page_preview(9, None).unwrap();
    assert_eq!(page, 2);
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 48));

    let (_, again) = prompter.page_preview(2, None).unwrap();
    assert_eq!(png, again);
}

#[test]
fn test_concurrent_readers_see_whole_documents() {
    let prompter = Arc::new(prompter_with(Arc::new(RecordingDisplay::new(200, 100)), false));
    prompter.upload(upload_bytes(0)).unwrap();

    let mut handles = Vec::new();
    for worker in 0..4 {
        let prompter = Arc::clone(&prompter);
        handles.push(std::thread::spawn(move || {
            for round in 0..50 {
                if worker == 0 {
                    prompter.upload(upload_bytes((round % 2) as u8)).unwrap();
                } else {
                    let document = prompter.document().unwrap();
                    let pages = document.page_count();
                    assert!(pages == 1 || pages == 3);
                    let last = document.clamp_page(usize::MAX).unwrap();
                    assert_eq!(last, pages - 1);
                    prompter.set_line(round % 3, 0).unwrap();
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_clear_screen() {
    let display = Arc::new(RecordingDisplay::new(10, 10));
    let prompter = prompter_with(display.clone(), false);
    prompter.clear_screen().unwrap();
    assert!(matches!(display.last(), Some(DisplayCommand::Clear)));
}
