//! Diagnosis outcomes and the records built from them.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The one suggestion the daemon ever produces. There is no analysis behind
/// it; every successful submission gets this exact string.
pub const SUGGESTED_FIX: &str =
    "Suggested Fix: Configuration mismatch in config.xml. Check schema or dependencies.";

/// Outcome of one diagnosis submission.
///
/// Attachment failures are reported in the result position like any other
/// outcome, but carry their own tag so a consumer never has to sniff the text
/// to tell a failure from a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum Diagnosis {
    /// The fixed remediation suggestion.
    Suggestion(String),
    /// The attachment could not be read; the failure text stands in for a
    /// suggestion.
    AttachmentError(String),
}

impl Diagnosis {
    /// The canonical successful outcome.
    pub fn suggestion() -> Self {
        Self::Suggestion(SUGGESTED_FIX.to_string())
    }

    /// The user-visible result text. Never empty.
    pub fn message(&self) -> &str {
        match self {
            Self::Suggestion(text) | Self::AttachmentError(text) => text,
        }
    }

    pub fn is_attachment_error(&self) -> bool {
        matches!(self, Self::AttachmentError(_))
    }

    /// Short tag for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Suggestion(_) => "suggestion",
            Self::AttachmentError(_) => "attachment_error",
        }
    }
}

/// One (timestamp, input, result) triple. Records are immutable once stamped;
/// nothing in the system updates or deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisRecord {
    /// Stamping time. Non-decreasing across records within one process.
    pub timestamp: DateTime<Utc>,
    /// The submitted text, exactly as received. May be empty.
    pub input: String,
    /// Tagged outcome; flattens to `kind` and `result` on the wire.
    #[serde(flatten)]
    pub outcome: Diagnosis,
}

impl DiagnosisRecord {
    /// Stamp a new record. The clock is clamped to a process-wide watermark
    /// so two records stamped back to back never observe time going
    /// backwards, no matter what the wall clock does.
    pub fn new(input: impl Into<String>, outcome: Diagnosis) -> Self {
        Self {
            timestamp: next_timestamp(),
            input: input.into(),
            outcome,
        }
    }

    /// The result text as it is written to the durable log.
    pub fn result(&self) -> &str {
        self.outcome.message()
    }
}

/// Highest timestamp handed out so far, in microseconds since the epoch.
static WATERMARK: AtomicI64 = AtomicI64::new(0);

fn next_timestamp() -> DateTime<Utc> {
    let now = Utc::now().timestamp_micros();
    let previous = WATERMARK.fetch_max(now, Ordering::SeqCst);
    DateTime::from_timestamp_micros(previous.max(now)).unwrap_or_else(Utc::now)
}
