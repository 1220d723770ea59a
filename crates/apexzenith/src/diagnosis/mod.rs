//! The diagnose flow and its supporting types.

pub mod attachment;
pub mod handler;
pub mod record;

pub use attachment::{Attachment, AttachmentParseError, ALLOWED_EXTENSIONS, PREVIEW_ROWS};
pub use handler::{diagnose, DiagnosisReport};
pub use record::{Diagnosis, DiagnosisRecord, SUGGESTED_FIX};
