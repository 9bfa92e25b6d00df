//! PDF processing layer
//!
//! This module binds PDFium for text-fragment extraction and page rasterization.

mod backend;
mod reader;

pub use backend::{PdfBackend, PdfiumBackend};
pub use reader::{check_pdf_header, with_document, PdfiumPages};
