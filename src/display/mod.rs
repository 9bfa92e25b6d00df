//! Display layer: text measurement and the screen surface

pub mod measure;
pub mod surface;

pub use measure::{wrap_rows, GlyphMeasure, Row, TextLayout};
pub use surface::{DisplayCommand, DisplaySurface, FrameDisplay};
