//! Document Extractor: gets resume content out of an upload or inline text.
//!
//! Uploads are staged to a uniquely named temp file inside the upload directory and
//! read back from there; the temp file is removed when the guard drops, on success
//! and failure alike.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

pub const SUPPORTED_EXTENSIONS: &[&str] = &[".pdf", ".txt"];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format: {extension}. Currently supported: {}", SUPPORTED_EXTENSIONS.join(", "))]
    UnsupportedFormat { extension: String },

    #[error("Failed to read uploaded file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Uploaded text file is not valid UTF-8")]
    Encoding,

    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),

    #[error("Document contains no extractable text")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Pdf,
}

impl DocumentKind {
    /// Accepts ".pdf", "pdf", ".TXT", ...
    pub fn from_extension(extension: &str) -> Result<Self, ExtractError> {
        let normalized = extension.trim().trim_start_matches('.').to_lowercase();
        match normalized.as_str() {
            "txt" => Ok(Self::PlainText),
            "pdf" => Ok(Self::Pdf),
            _ => Err(ExtractError::UnsupportedFormat {
                extension: format!(".{normalized}"),
            }),
        }
    }

    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::PlainText => ".txt",
            Self::Pdf => ".pdf",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Pdf => "application/pdf",
        }
    }
}

/// How PDFs reach the model: as locally extracted text, or as the raw document bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PdfMode {
    #[default]
    ExtractText,
    Inline,
}

impl FromStr for PdfMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "extract" => Ok(Self::ExtractText),
            "inline" => Ok(Self::Inline),
            other => Err(format!("unknown PDF mode '{other}' (expected 'text' or 'inline')")),
        }
    }
}

/// A file received from the client, still in memory.
#[derive(Debug, Clone)]
pub struct UploadedResume {
    pub file_name: String,
    pub bytes: Bytes,
}

/// What the pipeline sends to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeContent {
    Text(String),
    Document {
        media_type: &'static str,
        bytes: Bytes,
    },
}

/// Extracts plain text from a file on disk. Only `.txt` and `.pdf` are supported.
pub fn extract_text(path: &Path, extension: &str) -> Result<String, ExtractError> {
    let text = match DocumentKind::from_extension(extension)? {
        DocumentKind::PlainText => {
            String::from_utf8(std::fs::read(path)?).map_err(|_| ExtractError::Encoding)?
        }
        DocumentKind::Pdf => {
            pdf_extract::extract_text(path).map_err(|e| ExtractError::Pdf(e.to_string()))?
        }
    };

    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

/// Turns an upload into pipeline content, staging it through the upload directory
/// unless the PDF is forwarded to the model as-is.
pub async fn prepare_upload(
    upload: UploadedResume,
    upload_dir: &Path,
    pdf_mode: PdfMode,
) -> Result<ResumeContent, ExtractError> {
    let kind = DocumentKind::from_file_name(&upload.file_name)?;
    info!(
        "Processing uploaded file '{}' ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    if kind == DocumentKind::Pdf && pdf_mode == PdfMode::Inline {
        return Ok(ResumeContent::Document {
            media_type: kind.media_type(),
            bytes: upload.bytes,
        });
    }

    let upload_dir: PathBuf = upload_dir.to_path_buf();
    // pdf-extract can panic on malformed files; the join error covers that case
    let text = tokio::task::spawn_blocking(move || stage_and_extract(&upload_dir, kind, &upload.bytes))
        .await
        .map_err(|e| ExtractError::Pdf(format!("extraction task failed: {e}")))??;

    Ok(ResumeContent::Text(text))
}

fn stage_and_extract(
    upload_dir: &Path,
    kind: DocumentKind,
    bytes: &[u8],
) -> Result<String, ExtractError> {
    let mut staged = tempfile::Builder::new()
        .prefix("resume-")
        .suffix(kind.extension())
        .tempfile_in(upload_dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;
    debug!("Staged upload at {}", staged.path().display());

    extract_text(staged.path(), kind.extension())
}
