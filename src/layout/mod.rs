//! Line reconstruction and display-fit engine
//!
//! Turns positioned text fragments into normalized display lines, locates
//! the ink on text-free pages, splits long lines and fits font sizes to the
//! display.

pub mod fit;
pub mod geometry;
pub mod ink;
pub mod normalize;
pub mod pipeline;
pub mod reconstruct;
pub mod split;

pub use fit::{fit_font, initial_font_size, TextExtent, TextMeasure, DEFAULT_MIN_FONT_SIZE};
pub use geometry::{BoundingBox, Line, LineContent, LineRecord, Page, TextFragment};
pub use ink::{detect_ink_bbox, WHITE};
pub use normalize::{normalize, Normalizer, DEFAULT_CONNECTORS, NBSP, ZWSP};
pub use pipeline::{build_page, build_pages, PageSource, PipelineConfig, RasterTarget};
pub use reconstruct::{reconstruct, RawLine};
pub use split::{split_if_long, DEFAULT_SPLIT_THRESHOLD};
