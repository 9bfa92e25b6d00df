//! PDF Prompter - Entry point
//!
//! Serves the prompter tools over MCP on stdio.

use clap::Parser;
use pdf_prompter::{run_server_with_config, ServerConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "pdf-prompter", version, about = "MCP-controlled PDF teleprompter")]
struct Cli {
    /// Font file used to measure and draw text lines
    #[arg(long, env = "PROMPTER_FONT")]
    font: PathBuf,

    /// Display width in pixels
    #[arg(long, env = "PROMPTER_WIDTH", default_value_t = 1920)]
    width: u32,

    /// Display height in pixels
    #[arg(long, env = "PROMPTER_HEIGHT", default_value_t = 1080)]
    height: u32,

    /// Write every displayed frame to this PNG file
    #[arg(long, env = "PROMPTER_FRAME")]
    frame: Option<PathBuf>,

    /// Preview resolution for pages without text
    #[arg(long, env = "PROMPTER_PREVIEW_DPI", default_value_t = 36.0)]
    preview_dpi: f32,

    /// Split lines longer than this many characters
    #[arg(long, env = "PROMPTER_SPLIT_THRESHOLD", default_value_t = 55)]
    split_threshold: usize,

    /// Smallest font size for line display
    #[arg(long, env = "PROMPTER_MIN_FONT_SIZE", default_value_t = 5)]
    min_font_size: u32,

    /// Initial font size is the display width divided by this
    #[arg(long, env = "PROMPTER_FONT_DIVISOR", default_value_t = 18)]
    font_divisor: u32,

    /// Connector words that may start a new row (repeatable)
    #[arg(long = "connector", env = "PROMPTER_CONNECTORS", value_delimiter = ',')]
    connectors: Vec<String>,

    /// Only allow uploads by path from these directories (repeatable)
    #[arg(long = "resource-dir", env = "PROMPTER_RESOURCE_DIRS", value_delimiter = ',')]
    resource_dirs: Vec<String>,

    /// Maximum upload size in bytes
    #[arg(long, env = "PROMPTER_MAX_UPLOAD_BYTES", default_value_t = 100 * 1024 * 1024)]
    max_upload_bytes: u64,

    /// Maximum number of cached page previews
    #[arg(long, env = "PROMPTER_PREVIEW_CACHE_ENTRIES", default_value_t = 64)]
    preview_cache_entries: usize,

    /// Maximum total bytes of cached page previews
    #[arg(long, env = "PROMPTER_PREVIEW_CACHE_MAX_BYTES", default_value_t = 64 * 1024 * 1024)]
    preview_cache_max_bytes: usize,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            display_width: self.width,
            display_height: self.height,
            font_path: Some(self.font),
            frame_path: self.frame,
            preview_dpi: self.preview_dpi,
            split_threshold: self.split_threshold,
            min_font_size: self.min_font_size,
            font_divisor: self.font_divisor,
            connector_words: if self.connectors.is_empty() {
                ServerConfig::default().connector_words
            } else {
                self.connectors
            },
            resource_dirs: self.resource_dirs,
            max_upload_bytes: self.max_upload_bytes,
            preview_cache_entries: self.preview_cache_entries,
            preview_cache_max_bytes: self.preview_cache_max_bytes,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_prompter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting PDF Prompter");

    run_server_with_config(cli.into_config()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_flags_reach_config() {
        let cli = Cli::try_parse_from([
            "pdf-prompter",
            "--font",
            "/fonts/a.ttf",
            "--preview-cache-entries",
            "8",
            "--preview-cache-max-bytes",
            "4096",
            "--connector",
            "and,or",
        ])
        .unwrap();
        let config = cli.into_config();

        assert_eq!(config.preview_cache_entries, 8);
        assert_eq!(config.preview_cache_max_bytes, 4096);
        assert_eq!(config.connector_words, vec!["and", "or"]);
        assert_eq!(config.prompter_config().preview_cache_entries, 8);
    }

    #[test]
    fn test_defaults_match_server_config() {
        let config = Cli::try_parse_from(["pdf-prompter", "--font", "/fonts/a.ttf"])
            .unwrap()
            .into_config();
        let defaults = ServerConfig::default();

        assert_eq!(config.preview_cache_entries, defaults.preview_cache_entries);
        assert_eq!(config.preview_cache_max_bytes, defaults.preview_cache_max_bytes);
        assert_eq!(config.split_threshold, defaults.split_threshold);
        assert_eq!(config.connector_words, defaults.connector_words);
        assert_eq!(config.font_path, Some(PathBuf::from("/fonts/a.ttf")));
    }
}
