//! Per-event orchestration: fetch both documents, match, build the alert.
use crate::entities::alert::AlertRecord;
use crate::entities::document::{DocumentKind, DocumentRef};
use crate::entities::envelope::AnalysisEvent;
use crate::entities::keywords::KeywordBook;
use crate::use_cases::fetcher::{DocumentFetcher, FetchResult, Fetcher};
use crate::use_cases::services::matcher;

use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Terminal outcome of processing one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Alert(AlertRecord),
    NoMatch,
    /// Neither document could be fetched. Retryable via redelivery, distinct
    /// from a confirmed "no keywords found".
    FetchFailure,
}

/// Orchestrates fetching and matching for one event.
///
/// Side-effect free apart from the two fetch calls - it never touches the queue
/// or the alert sink, so processing the same event twice with the same fetch
/// results yields the same outcome.
#[derive(Debug)]
pub struct Processor {
    fetcher: Fetcher,
    keywords: Arc<KeywordBook>,
}

impl Processor {
    pub fn new(fetcher: Fetcher, keywords: Arc<KeywordBook>) -> Self {
        Self { fetcher, keywords }
    }

    #[instrument(skip(self), fields(run_id = %event.run_id))]
    pub fn process(&self, event: &AnalysisEvent) -> ProcessOutcome {
        let Some(keywords) = self.keywords.effective_for(event.committee.as_deref()) else {
            debug!("no keywords apply to this event");
            return ProcessOutcome::NoMatch;
        };

        // fetched independently, one failure never aborts the other
        let transcript = self.fetch_text(&event.transcript);
        let analysis = self.fetch_text(&event.analysis);
        if transcript.is_none() && analysis.is_none() {
            return ProcessOutcome::FetchFailure;
        }

        let matches = matcher::evaluate(
            &keywords,
            &[
                (DocumentKind::Transcript, transcript.as_deref()),
                (DocumentKind::Analysis, analysis.as_deref()),
            ],
        );
        if matches.is_empty() {
            return ProcessOutcome::NoMatch;
        }
        debug!("matched {} keyword(s)", matches.entries().len());
        ProcessOutcome::Alert(AlertRecord::new(event, &matches))
    }

    fn fetch_text(&self, doc: &DocumentRef) -> Option<String> {
        match self.fetcher.fetch(doc) {
            FetchResult::Content(text) => Some(text),
            FetchResult::NotFound => {
                warn!("document not found: '{}'", doc);
                None
            }
            FetchResult::Error(e) => {
                warn!("failed to fetch '{}': '{}'", doc, e);
                None
            }
        }
    }
}
