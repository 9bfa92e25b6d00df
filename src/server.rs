//! MCP Server implementation using rmcp

use crate::display::{DisplaySurface, FrameDisplay, GlyphMeasure};
use crate::error::Error;
use crate::layout::{LineRecord, Normalizer, PipelineConfig, TextMeasure, DEFAULT_CONNECTORS};
use crate::pdf::{PdfBackend, PdfiumBackend};
use crate::prompter::{LineSelection, Prompter, PrompterConfig};
use crate::source::{resolve_base64, resolve_path, validate_path_access, ResolvedPdf};
use anyhow::Result;
use base64::Engine;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Upload source specification
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum PdfSource {
    /// File path (absolute or relative)
    Path {
        /// Path to the PDF file
        path: String,
    },
    /// Base64 encoded PDF data
    Base64 {
        /// Base64 encoded PDF content
        base64: String,
    },
}

impl<'de> serde::Deserialize<'de> for PdfSource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        let Some(obj) = value.as_object() else {
            return Err(serde::de::Error::custom(
                "Invalid source: expected an object with \"path\" or \"base64\"",
            ));
        };

        if let Some(v) = obj.get("path") {
            return match v.as_str() {
                Some(s) => Ok(PdfSource::Path {
                    path: s.to_string(),
                }),
                None => Err(serde::de::Error::custom("\"path\" must be a string")),
            };
        }
        if let Some(v) = obj.get("base64") {
            return match v.as_str() {
                Some(s) => Ok(PdfSource::Base64 {
                    base64: s.to_string(),
                }),
                None => Err(serde::de::Error::custom("\"base64\" must be a string")),
            };
        }

        let keys: Vec<&String> = obj.keys().collect();
        Err(serde::de::Error::custom(format!(
            "Invalid source: expected an object with \"path\" or \"base64\", but got keys: {:?}",
            keys
        )))
    }
}

/// Display and resource configuration for the prompter server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Display surface width in pixels (default: 1920)
    pub display_width: u32,
    /// Display surface height in pixels (default: 1080)
    pub display_height: u32,
    /// TTF/OTF font used to measure and draw text lines
    pub font_path: Option<PathBuf>,
    /// PNG file rewritten after every display update
    pub frame_path: Option<PathBuf>,
    /// Preview resolution for ink detection on text-free pages (default: 36)
    pub preview_dpi: f32,
    /// Lines longer than this are split into two rows (default: 55)
    pub split_threshold: usize,
    /// Smallest font size for line display (default: 5)
    pub min_font_size: u32,
    /// Initial font size = display width / font_divisor (default: 18)
    pub font_divisor: u32,
    /// Words that may start a new row after a non-breaking space
    pub connector_words: Vec<String>,
    /// Directories uploads by path must come from (empty: any)
    pub resource_dirs: Vec<String>,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_bytes: u64,
    /// Maximum number of cached page previews (default: 64)
    pub preview_cache_entries: usize,
    /// Maximum total bytes of cached page previews (default: 64MB)
    pub preview_cache_max_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            display_width: 1920,
            display_height: 1080,
            font_path: None,
            frame_path: None,
            preview_dpi: 36.0,
            split_threshold: 55,
            min_font_size: 5,
            font_divisor: 18,
            connector_words: DEFAULT_CONNECTORS.iter().map(|w| w.to_string()).collect(),
            resource_dirs: Vec::new(),
            max_upload_bytes: 100 * 1024 * 1024, // 100MB
            preview_cache_entries: 64,
            preview_cache_max_bytes: 64 * 1024 * 1024, // 64MB
        }
    }
}

impl ServerConfig {
    pub fn prompter_config(&self) -> PrompterConfig {
        PrompterConfig {
            split_threshold: self.split_threshold,
            min_font_size: self.min_font_size,
            font_divisor: self.font_divisor,
            pipeline: PipelineConfig {
                preview_dpi: self.preview_dpi,
                normalizer: Normalizer::new(self.connector_words.clone()),
            },
            preview_cache_entries: self.preview_cache_entries,
            preview_cache_max_bytes: self.preview_cache_max_bytes,
        }
    }
}

/// Prompter MCP Server
#[derive(Clone)]
pub struct PrompterServer {
    prompter: Arc<Prompter>,
    tool_router: ToolRouter<Self>,
    /// Server configuration
    config: Arc<ServerConfig>,
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UploadPdfParams {
    /// PDF to make the active document
    pub source: PdfSource,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadPdfResult {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub page_count: usize,
    /// Upload time (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct GetDocumentResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Lines of every page, top to bottom
    pub pages: Vec<Vec<LineRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetPageImageParams {
    /// Page index (0-based); clamped to the last page
    pub page_index: usize,
    /// Target width in pixels (default: display width)
    #[serde(default)]
    pub width: Option<u32>,
    /// Target height in pixels (default: display height)
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct GetPageImageResult {
    /// Page actually rendered after clamping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<usize>,
    /// Base64-encoded PNG data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_base64: Option<String>,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetPageParams {
    /// Page index (0-based); clamped to the last page
    pub page_index: usize,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SetPageResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetLineParams {
    /// Page index (0-based); clamped to the last page
    pub page_index: usize,
    /// Line index within the page; out of range leaves the display unchanged
    pub line_index: usize,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SetLineResult {
    /// Whether the display changed
    pub shown: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_index: Option<usize>,
    pub is_image: bool,
    /// Text as drawn, row break included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SetLineResult {
    fn failed(error: String) -> Self {
        Self {
            shown: false,
            page_index: None,
            line_index: None,
            is_image: false,
            text: None,
            font_size: None,
            error: Some(error),
        }
    }
}

impl From<LineSelection> for SetLineResult {
    fn from(selection: LineSelection) -> Self {
        match selection {
            LineSelection::Text {
                page,
                line,
                text,
                font_size,
            } => Self {
                shown: true,
                page_index: Some(page),
                line_index: Some(line),
                is_image: false,
                text: Some(text),
                font_size: Some(font_size),
                error: None,
            },
            LineSelection::Image { page, line, .. } => Self {
                shown: true,
                page_index: Some(page),
                line_index: Some(line),
                is_image: true,
                text: None,
                font_size: None,
                error: None,
            },
            LineSelection::Ignored => Self {
                shown: false,
                page_index: None,
                line_index: None,
                is_image: false,
                text: None,
                font_size: None,
                error: None,
            },
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ClearScreenResult {
    pub cleared: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[tool_router]
impl PrompterServer {
    /// Create a server with a PDFium backend and a frame-buffer display.
    /// Fails if the configured font cannot be loaded.
    pub fn with_config(config: ServerConfig) -> crate::error::Result<Self> {
        let font_path = config.font_path.clone().ok_or_else(|| Error::FontLoad {
            reason: "no font path configured".to_string(),
        })?;
        let glyphs = GlyphMeasure::load(&font_path)?;

        let mut display = FrameDisplay::new(config.display_width, config.display_height)
            .with_font(glyphs.clone());
        if let Some(frame_path) = &config.frame_path {
            display = display.with_mirror(frame_path);
        }

        Ok(Self::with_parts(
            config,
            Arc::new(PdfiumBackend),
            Arc::new(display),
            Arc::new(glyphs),
        ))
    }

    /// Create a server from explicit collaborators
    pub fn with_parts(
        config: ServerConfig,
        backend: Arc<dyn PdfBackend>,
        display: Arc<dyn DisplaySurface>,
        measure: Arc<dyn TextMeasure>,
    ) -> Self {
        let prompter = Prompter::new(backend, display, measure, config.prompter_config());
        Self {
            prompter: Arc::new(prompter),
            tool_router: Self::tool_router(),
            config: Arc::new(config),
        }
    }

    /// Upload a PDF and make it the active document
    #[tool(
        description = "Upload a PDF and make it the active document, replacing any previous one. Returns the page count.

Source format: {\"path\": \"/absolute/path.pdf\"} or {\"base64\": \"...\"}"
    )]
    async fn upload_pdf(&self, Parameters(params): Parameters<UploadPdfParams>) -> String {
        let result = self
            .process_upload_pdf(&params.source)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "upload_pdf failed");
                UploadPdfResult {
                    source: Self::source_name(&params.source),
                    document_id: None,
                    page_count: 0,
                    uploaded_at: None,
                    error: Some(e.client_message()),
                }
            });

        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// List every line of the active document
    #[tool(
        description = "List the lines of every page of the active document: position (top, left, width, height), cleaned text, and for image regions is_image with image_width/image_height of the preview."
    )]
    async fn get_document(&self) -> String {
        let result = self.process_get_document().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "get_document failed");
            GetDocumentResult {
                document_id: None,
                pages: vec![],
                error: Some(e.client_message()),
            }
        });

        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// Render a page preview
    #[tool(
        description = "Render a page of the active document as a PNG (base64-encoded), by default at the display size. Page indices past the end show the last page."
    )]
    async fn get_page_image(&self, Parameters(params): Parameters<GetPageImageParams>) -> String {
        let result = self
            .process_get_page_image(&params)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "get_page_image failed");
                GetPageImageResult {
                    page_index: None,
                    data_base64: None,
                    mime_type: "image/png".to_string(),
                    error: Some(e.client_message()),
                }
            });

        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// Show a whole page on the display
    #[tool(description = "Show a whole page of the active document on the display.")]
    async fn set_page(&self, Parameters(params): Parameters<SetPageParams>) -> String {
        let result = self.process_set_page(&params).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "set_page failed");
            SetPageResult {
                page_index: None,
                error: Some(e.client_message()),
            }
        });

        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// Show a single line on the display
    #[tool(
        description = "Show one line of the active document on the display. Text lines are drawn as large as fits the screen; image regions are cropped from the page. An out-of-range line index changes nothing."
    )]
    async fn set_line(&self, Parameters(params): Parameters<SetLineParams>) -> String {
        let result = self.process_set_line(&params).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "set_line failed");
            SetLineResult::failed(e.client_message())
        });

        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// Blank the display
    #[tool(description = "Show solid black instead of a page or line.")]
    async fn clear_screen(&self) -> String {
        let result = match self.run(|p| p.clear_screen()).await {
            Ok(()) => ClearScreenResult {
                cleared: true,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "clear_screen failed");
                ClearScreenResult {
                    cleared: false,
                    error: Some(e.client_message()),
                }
            }
        };

        serde_json::to_string_pretty(&result).unwrap_or_default()
    }
}

impl PrompterServer {
    fn source_name(source: &PdfSource) -> String {
        match source {
            PdfSource::Path { path } => path.clone(),
            PdfSource::Base64 { .. } => "<base64>".to_string(),
        }
    }

    fn resolve_source(&self, source: &PdfSource) -> crate::error::Result<ResolvedPdf> {
        match source {
            PdfSource::Path { path } => {
                let path = validate_path_access(path, &self.config.resource_dirs)?;
                resolve_path(path, self.config.max_upload_bytes)
            }
            PdfSource::Base64 { base64 } => resolve_base64(base64, self.config.max_upload_bytes),
        }
    }

    /// Run a prompter call on the blocking pool
    async fn run<T, F>(&self, f: F) -> crate::error::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Prompter) -> crate::error::Result<T> + Send + 'static,
    {
        let prompter = Arc::clone(&self.prompter);
        tokio::task::spawn_blocking(move || f(&prompter))
            .await
            .map_err(|e| Error::RenderFailure {
                reason: format!("Task join error: {}", e),
            })?
    }

    pub async fn process_upload_pdf(
        &self,
        source: &PdfSource,
    ) -> crate::error::Result<UploadPdfResult> {
        let resolved = self.resolve_source(source)?;
        let source_name = resolved.source_name;
        let data = resolved.data;

        let document = self.run(move |p| p.upload(data)).await?;

        Ok(UploadPdfResult {
            source: source_name,
            document_id: Some(document.id().to_string()),
            page_count: document.page_count(),
            uploaded_at: Some(document.uploaded_at().to_rfc3339()),
            error: None,
        })
    }

    pub fn process_get_document(&self) -> crate::error::Result<GetDocumentResult> {
        let document = self.prompter.document()?;
        let pages = document
            .pages()
            .iter()
            .map(|page| page.lines.iter().map(LineRecord::from).collect())
            .collect();

        Ok(GetDocumentResult {
            document_id: Some(document.id().to_string()),
            pages,
            error: None,
        })
    }

    pub async fn process_get_page_image(
        &self,
        params: &GetPageImageParams,
    ) -> crate::error::Result<GetPageImageResult> {
        let (display_width, display_height) = self.prompter.display_size();
        let size = (
            params.width.unwrap_or(display_width),
            params.height.unwrap_or(display_height),
        );
        let page_index = params.page_index;

        let (page, png) = self
            .run(move |p| p.page_preview(page_index, Some(size)))
            .await?;

        Ok(GetPageImageResult {
            page_index: Some(page),
            data_base64: Some(base64::engine::general_purpose::STANDARD.encode(&png)),
            mime_type: "image/png".to_string(),
            error: None,
        })
    }

    pub async fn process_set_page(
        &self,
        params: &SetPageParams,
    ) -> crate::error::Result<SetPageResult> {
        let page_index = params.page_index;
        let page = self.run(move |p| p.set_page(page_index)).await?;

        Ok(SetPageResult {
            page_index: Some(page),
            error: None,
        })
    }

    pub async fn process_set_line(
        &self,
        params: &SetLineParams,
    ) -> crate::error::Result<SetLineResult> {
        let (page_index, line_index) = (params.page_index, params.line_index);
        let selection = self
            .run(move |p| p.set_line(page_index, line_index))
            .await?;

        Ok(selection.into())
    }
}

#[tool_handler]
impl ServerHandler for PrompterServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "PDF prompter: upload a PDF, list its lines, then show a page or a single line \
                 on the display sized to fill the screen."
                    .into(),
            ),
        }
    }
}

/// Run the MCP server with full configuration
pub async fn run_server_with_config(config: ServerConfig) -> Result<()> {
    let server = PrompterServer::with_config(config)?;

    tracing::info!("PDF Prompter ready, waiting for connections...");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
