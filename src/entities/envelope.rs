//! Typed representation of one queue message.
//!
//! The wire shape follows the analyzer's completion event: run metadata under
//! `event_metadata`, the transcript reference nested under `s3`, analysis
//! references at the top level with an optional "friendly" variant that is
//! preferred when present.
use crate::entities::document::{DocumentKind, DocumentRef};
use crate::result::EnvelopeErr;

use serde::Deserialize;

/// Validated payload of an "analysis complete" event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisEvent {
    pub run_id: String,
    pub source: String,
    pub committee: Option<String>,
    pub date: Option<String>,
    pub transcript: DocumentRef,
    pub analysis: DocumentRef,
    pub pdf: Option<DocumentRef>,
}

impl AnalysisEvent {
    /// Decodes and validates a raw message body.
    ///
    /// Missing run id, transcript reference or analysis reference makes the
    /// envelope malformed, which callers treat as a permanent failure.
    pub fn from_json(body: &str) -> Result<Self, EnvelopeErr> {
        let wire: WireEvent = serde_json::from_str(body)?;
        let run_id = non_empty(wire.run_id).ok_or(EnvelopeErr::MissingField("run_id"))?;
        let transcript = wire
            .s3
            .and_then(|s3| non_empty(s3.transcript))
            .ok_or(EnvelopeErr::MissingField("s3.transcript"))?;
        // friendly URL wins when the producer published one
        let analysis = non_empty(wire.analysis_html_s3_friendly)
            .or_else(|| non_empty(wire.analysis_html_s3))
            .ok_or(EnvelopeErr::MissingField("analysis_html_s3"))?;
        let metadata = wire.event_metadata.unwrap_or_default();
        Ok(Self {
            run_id,
            source: non_empty(wire.source_type).unwrap_or_else(|| "unknown".into()),
            committee: non_empty(metadata.committee).or_else(|| non_empty(metadata.title)),
            date: non_empty(metadata.date),
            transcript: DocumentRef::new(DocumentKind::Transcript, transcript),
            analysis: DocumentRef::new(DocumentKind::Analysis, analysis),
            pdf: non_empty(wire.analysis_pdf_s3).map(|uri| DocumentRef::new(DocumentKind::Pdf, uri)),
        })
    }
}

/// Opaque token identifying one delivery of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptHandle(pub String);

impl std::fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    run_id: Option<String>,
    source_type: Option<String>,
    event_metadata: Option<WireMetadata>,
    s3: Option<WireS3>,
    analysis_html_s3: Option<String>,
    analysis_html_s3_friendly: Option<String>,
    analysis_pdf_s3: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireMetadata {
    committee: Option<String>,
    title: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireS3 {
    transcript: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
