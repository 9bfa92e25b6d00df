//! Geometry and display-model records

use serde::{Deserialize, Serialize};

/// Axis-aligned box with a top-left origin.
///
/// Units follow the source: PDF points for extracted text, pixels for
/// rasterized previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(top: i32, left: i32, width: i32, height: i32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Right edge (`left + width`)
    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    /// Bottom edge (`top + height`)
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Box that also covers its end pixels.
    ///
    /// Ink boxes measure `max - min`, so the last row and column lie on
    /// `right()` and `bottom()`; this widens the box to include them.
    pub fn pixel_extent(&self) -> BoundingBox {
        BoundingBox::new(self.top, self.left, self.width + 1, self.height + 1)
    }

    /// Rescale a box measured on a `from` raster onto a `to` raster of the same page.
    ///
    /// Each axis is multiplied by its own ratio; left and top are floored,
    /// right and bottom are ceiled.
    pub fn rescale(&self, from: (u32, u32), to: (u32, u32)) -> BoundingBox {
        if from.0 == 0 || from.1 == 0 {
            return *self;
        }
        let sx = to.0 as f64 / from.0 as f64;
        let sy = to.1 as f64 / from.1 as f64;

        let left = (self.left as f64 * sx).floor() as i32;
        let top = (self.top as f64 * sy).floor() as i32;
        let right = (self.right() as f64 * sx).ceil() as i32;
        let bottom = (self.bottom() as f64 * sy).ceil() as i32;

        BoundingBox::new(top, left, right - left, bottom - top)
    }
}

/// One positioned piece of extracted text, roughly a word
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub bbox: BoundingBox,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// What a [`Line`] displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineContent {
    /// A reconstructed and normalized text line
    Text { text: String },
    /// A region of the page image.
    ///
    /// The dimensions are those of the preview raster the box was measured on.
    Image { image_width: u32, image_height: u32 },
}

/// One displayable unit of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "LineRecord")]
pub struct Line {
    pub bbox: BoundingBox,
    pub content: LineContent,
}

impl Line {
    pub fn text(bbox: BoundingBox, text: impl Into<String>) -> Self {
        Self {
            bbox,
            content: LineContent::Text { text: text.into() },
        }
    }

    pub fn image(bbox: BoundingBox, image_width: u32, image_height: u32) -> Self {
        Self {
            bbox,
            content: LineContent::Image {
                image_width,
                image_height,
            },
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self.content, LineContent::Image { .. })
    }

    /// Line text, empty for image lines
    pub fn text_str(&self) -> &str {
        match &self.content {
            LineContent::Text { text } => text,
            LineContent::Image { .. } => "",
        }
    }
}

/// Flat wire form of a [`Line`] used by preview clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct LineRecord {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
    pub text: String,
    pub is_image: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_height: Option<u32>,
}

impl From<Line> for LineRecord {
    fn from(line: Line) -> Self {
        let BoundingBox {
            top,
            left,
            width,
            height,
        } = line.bbox;
        match line.content {
            LineContent::Text { text } => LineRecord {
                top,
                left,
                width,
                height,
                text,
                is_image: false,
                image_width: None,
                image_height: None,
            },
            LineContent::Image {
                image_width,
                image_height,
            } => LineRecord {
                top,
                left,
                width,
                height,
                text: String::new(),
                is_image: true,
                image_width: Some(image_width),
                image_height: Some(image_height),
            },
        }
    }
}

impl From<&Line> for LineRecord {
    fn from(line: &Line) -> Self {
        line.clone().into()
    }
}

/// Ordered lines of one page, top to bottom
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Page {
    pub lines: Vec<Line>,
}

impl Page {
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
