use crate::entities::document::{DocumentKind, DocumentRef};
use crate::entities::envelope::AnalysisEvent;

/// Outcome of scanning one event's documents against a keyword set.
///
/// Entries keep the keyword set's order; each carries the kinds of document the
/// phrase was found in. Empty result means no alert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    entries: Vec<MatchedKeyword>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedKeyword {
    pub phrase: String,
    pub found_in: Vec<DocumentKind>,
}

impl MatchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Records `phrase` as found in `kind`, keeping first-seen phrase order.
    pub fn record<S: Into<String>>(&mut self, phrase: S, kind: DocumentKind) {
        let phrase = phrase.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.phrase == phrase) {
            if !entry.found_in.contains(&kind) {
                entry.found_in.push(kind);
            }
        } else {
            self.entries.push(MatchedKeyword {
                phrase,
                found_in: vec![kind],
            });
        }
    }

    pub fn entries(&self) -> &[MatchedKeyword] {
        &self.entries
    }

    pub fn phrases(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.phrase.as_str()).collect()
    }

    /// Union of document kinds any phrase was found in, in matchable-kind order.
    pub fn found_in(&self) -> Vec<DocumentKind> {
        DocumentKind::matchable()
            .filter(|kind| self.entries.iter().any(|e| e.found_in.contains(kind)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fully-formed notification payload handed to the alert sink. Never mutated
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRecord {
    pub run_id: String,
    pub source: String,
    pub committee: String,
    pub date: String,
    pub keywords: Vec<String>,
    pub found_in: Vec<DocumentKind>,
    pub transcript: DocumentRef,
    pub analysis: DocumentRef,
    pub pdf: Option<DocumentRef>,
}

impl AlertRecord {
    pub fn new(event: &AnalysisEvent, matches: &MatchResult) -> Self {
        Self {
            run_id: event.run_id.clone(),
            source: event.source.clone(),
            committee: event.committee.clone().unwrap_or_else(|| "Unknown".into()),
            date: event.date.clone().unwrap_or_else(|| "Unknown date".into()),
            keywords: matches.phrases().iter().map(ToString::to_string).collect(),
            found_in: matches.found_in(),
            transcript: event.transcript.clone(),
            analysis: event.analysis.clone(),
            pdf: event.pdf.clone(),
        }
    }
}
