//! Upload source resolution

use crate::error::{Error, Result};
use crate::pdf::check_pdf_header;
use base64::Engine;
use std::path::{Path, PathBuf};

/// Resolved upload data
pub struct ResolvedPdf {
    pub data: Vec<u8>,
    pub source_name: String,
}

fn check_size(size: u64, max_bytes: u64) -> Result<()> {
    if size > max_bytes {
        return Err(Error::UploadTooLarge {
            size,
            max_size: max_bytes,
        });
    }
    Ok(())
}

/// Resolve a file path to PDF data
pub fn resolve_path<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<ResolvedPdf> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::PdfNotFound {
            path: path.display().to_string(),
        });
    }

    check_size(std::fs::metadata(path)?.len(), max_bytes)?;
    let data = std::fs::read(path).map_err(Error::Io)?;
    check_pdf_header(&data)?;

    Ok(ResolvedPdf {
        data,
        source_name: path.display().to_string(),
    })
}

/// Resolve base64 encoded data to PDF data
pub fn resolve_base64(base64_data: &str, max_bytes: u64) -> Result<ResolvedPdf> {
    // Decoded size is at most 3/4 of the encoded length
    check_size(base64_data.len() as u64 / 4 * 3, max_bytes)?;

    let engine = base64::engine::general_purpose::STANDARD;
    let data = engine.decode(base64_data.trim())?;
    check_pdf_header(&data)?;

    Ok(ResolvedPdf {
        data,
        source_name: "<base64>".to_string(),
    })
}

/// Check that `path` lies inside one of `resource_dirs`.
/// An empty list allows every path.
pub fn validate_path_access(path: &str, resource_dirs: &[String]) -> Result<PathBuf> {
    if resource_dirs.is_empty() {
        return Ok(PathBuf::from(path));
    }

    let canonical = std::fs::canonicalize(path).map_err(|_| Error::PdfNotFound {
        path: path.to_string(),
    })?;

    let allowed = resource_dirs.iter().any(|dir| {
        std::fs::canonicalize(dir)
            .map(|cd| canonical.starts_with(&cd))
            .unwrap_or(false)
    });

    if allowed {
        Ok(canonical)
    } else {
        Err(Error::PathAccessDenied {
            path: path.to_string(),
        })
    }
}
