//! Upload sources and preview caching

pub mod cache;
pub mod resolver;

pub use cache::{PreviewCache, PreviewKey};
pub use resolver::{resolve_base64, resolve_path, validate_path_access, ResolvedPdf};
