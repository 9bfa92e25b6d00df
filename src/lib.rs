//! PDF Prompter Library
//!
//! A remote-controlled teleprompter: an uploaded PDF is turned into
//! displayable lines, and single lines or pages are shown on a display
//! sized to fill the screen. Exposed as MCP tools:
//! - `upload_pdf`: Make a PDF the active document
//! - `get_document`: List every page's lines
//! - `get_page_image`: Render a page preview
//! - `set_page` / `set_line` / `clear_screen`: Drive the display

pub mod display;
pub mod document;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod prompter;
pub mod server;
pub mod source;

pub use document::{Document, DocumentStore};
pub use error::{Error, Result};
pub use prompter::{LineSelection, Prompter, PrompterConfig};
pub use server::{run_server_with_config, PdfSource, PrompterServer, ServerConfig};
