//! Display surface the prompter draws onto

use super::measure::GlyphMeasure;
use crate::error::{Error, Result};
use ab_glyph::PxScale;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use parking_lot::Mutex;
use std::path::PathBuf;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// One display update
#[derive(Debug, Clone)]
pub enum DisplayCommand {
    /// Show text at a fixed pixel size, wrapped and centered
    Text { text: String, font_size: u32 },
    /// Show an image scaled to fit the screen
    Image(RgbaImage),
    /// Solid black
    Clear,
}

/// The screen
pub trait DisplaySurface: Send + Sync {
    /// Current size in pixels
    fn size(&self) -> (u32, u32);

    fn apply(&self, command: DisplayCommand) -> Result<()>;
}

/// In-memory frame buffer, optionally mirrored to a PNG file after each update
pub struct FrameDisplay {
    width: u32,
    height: u32,
    glyphs: Option<GlyphMeasure>,
    mirror: Option<PathBuf>,
    frame: Mutex<RgbaImage>,
}

impl FrameDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            glyphs: None,
            mirror: None,
            frame: Mutex::new(RgbaImage::from_pixel(width, height, BLACK)),
        }
    }

    /// Font used to draw text commands
    pub fn with_font(mut self, glyphs: GlyphMeasure) -> Self {
        self.glyphs = Some(glyphs);
        self
    }

    /// Write every new frame to `path` as PNG
    pub fn with_mirror(mut self, path: impl Into<PathBuf>) -> Self {
        self.mirror = Some(path.into());
        self
    }

    /// Copy of the current frame
    pub fn frame(&self) -> RgbaImage {
        self.frame.lock().clone()
    }

    fn blank(&self) -> RgbaImage {
        RgbaImage::from_pixel(self.width, self.height, BLACK)
    }

    fn draw_text(&self, text: &str, font_size: u32) -> Result<RgbaImage> {
        let glyphs = self.glyphs.as_ref().ok_or_else(|| Error::FontLoad {
            reason: "no font configured for text display".to_string(),
        })?;

        let mut canvas = self.blank();
        let layout = glyphs.layout(text, font_size, self.width);
        let block_height = layout.rows.len() as f32 * layout.line_height;
        let mut y = ((self.height as f32 - block_height) / 2.0).max(0.0);

        for row in &layout.rows {
            let x = ((self.width as f32 - row.width) / 2.0).max(0.0);
            draw_text_mut(
                &mut canvas,
                TEXT_COLOR,
                x as i32,
                y as i32,
                PxScale::from(font_size as f32),
                glyphs.font(),
                &row.text,
            );
            y += layout.line_height;
        }

        Ok(canvas)
    }

    fn draw_image(&self, image: &RgbaImage) -> RgbaImage {
        let mut canvas = self.blank();
        if image.width() == 0 || image.height() == 0 {
            return canvas;
        }

        let scale = f64::min(
            self.width as f64 / image.width() as f64,
            self.height as f64 / image.height() as f64,
        );
        let w = ((image.width() as f64 * scale).round() as u32).clamp(1, self.width.max(1));
        let h = ((image.height() as f64 * scale).round() as u32).clamp(1, self.height.max(1));
        let resized = imageops::resize(image, w, h, FilterType::Triangle);

        let x = (self.width - w) / 2;
        let y = (self.height - h) / 2;
        imageops::overlay(&mut canvas, &resized, x as i64, y as i64);
        canvas
    }
}

impl DisplaySurface for FrameDisplay {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn apply(&self, command: DisplayCommand) -> Result<()> {
        let next = match command {
            DisplayCommand::Text { text, font_size } => self.draw_text(&text, font_size)?,
            DisplayCommand::Image(image) => self.draw_image(&image),
            DisplayCommand::Clear => self.blank(),
        };

        let mut frame = self.frame.lock();
        if let Some(path) = &self.mirror {
            next.save(path).map_err(Error::render)?;
        }
        *frame = next;
        Ok(())
    }
}
