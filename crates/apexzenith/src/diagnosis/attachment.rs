//! Uploaded attachments: acceptance rules and line-delimited JSON inspection.

use serde_json::Value;
use thiserror::Error;

/// File extensions accepted at the upload boundary. Anything else is rejected
/// before a diagnosis is attempted.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["txt", "json", "jsonl", "png", "jpg"];

/// The one extension whose content is ever inspected.
pub const JSONL_EXTENSION: &str = "jsonl";

/// How many parsed rows are surfaced back as a preview.
pub const PREVIEW_ROWS: usize = 5;

/// Failure to read an attachment as line-delimited JSON. This is the only
/// domain failure in the diagnose flow; it becomes the outcome of the
/// submission rather than an error response.
#[derive(Debug, Error)]
pub enum AttachmentParseError {
    #[error("content is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),
    #[error("file is empty")]
    Empty,
    #[error("line {line} is not valid JSON: {source}")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// An uploaded file as received at the boundary: the client-side name and the
/// raw bytes, nothing more. Attachments are never written to disk.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lowercased extension of the file name, if it has a plausible one.
    pub fn extension(&self) -> Option<String> {
        let ext = self.name.rsplit('.').next()?;
        if ext.is_empty() || ext == self.name || ext.len() > 10 || ext.contains(' ') {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Whether the extension is on the fixed allow-list.
    pub fn is_allowed(&self) -> bool {
        self.extension()
            .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Whether this attachment gets parsed at all. Only the line-delimited
    /// JSON variant does; a plain `.json` file is accepted but never opened.
    pub fn is_jsonl(&self) -> bool {
        self.extension().as_deref() == Some(JSONL_EXTENSION)
    }

    /// Parse the content as one JSON value per line and return the first
    /// [`PREVIEW_ROWS`] rows. Every line is validated even though only the
    /// head is returned, so a malformed line anywhere in the file fails the
    /// whole read.
    pub fn preview_rows(&self) -> Result<Vec<Value>, AttachmentParseError> {
        let text = std::str::from_utf8(&self.bytes)?;
        if text.trim().is_empty() {
            return Err(AttachmentParseError::Empty);
        }

        let mut rows = Vec::with_capacity(PREVIEW_ROWS);
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line).map_err(|source| {
                AttachmentParseError::InvalidJson {
                    line: idx + 1,
                    source,
                }
            })?;
            if rows.len() < PREVIEW_ROWS {
                rows.push(value);
            }
        }
        Ok(rows)
    }
}
