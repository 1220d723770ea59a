//! The diagnose flow: inspect the input, stamp a record, persist it.

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use crate::diagnosis::attachment::Attachment;
use crate::diagnosis::record::{Diagnosis, DiagnosisRecord};
use crate::session::SessionRegistry;
use crate::store::DiagnosisLog;

/// What one submission produces: the stamped record, plus preview rows when
/// a line-delimited JSON attachment parsed cleanly.
#[derive(Debug, Clone)]
pub struct DiagnosisReport {
    pub record: DiagnosisRecord,
    pub preview: Option<Vec<Value>>,
}

/// Run one diagnosis submission against an accepted input.
///
/// The outcome does not depend on the submitted text. Only a `.jsonl`
/// attachment is ever opened; when it parses, the fixed suggestion is
/// returned alongside a preview of its head rows, and when it does not, the
/// failure text becomes the outcome itself, tagged so it stays
/// distinguishable from a suggestion. Either way the session registry stamps
/// a record and appends it to the session history in one step, and the
/// record then goes to the durable log. A log failure propagates to the
/// caller after the session append, so the session may run ahead of the log
/// but never behind it.
pub async fn diagnose(
    text: &str,
    attachment: Option<&Attachment>,
    store: &DiagnosisLog,
    sessions: &SessionRegistry,
    session_id: &str,
) -> Result<DiagnosisReport> {
    let (outcome, preview) = inspect(attachment);
    debug!("Diagnosis outcome for session {}: {}", session_id, outcome.kind());

    let record = sessions.record(session_id, text, outcome);
    store.append(&record).await?;

    Ok(DiagnosisReport { record, preview })
}

fn inspect(attachment: Option<&Attachment>) -> (Diagnosis, Option<Vec<Value>>) {
    match attachment {
        Some(file) if file.is_jsonl() => match file.preview_rows() {
            Ok(rows) => (Diagnosis::suggestion(), Some(rows)),
            Err(err) => (
                Diagnosis::AttachmentError(format!("Error reading file: {}", err)),
                None,
            ),
        },
        _ => (Diagnosis::suggestion(), None),
    }
}
