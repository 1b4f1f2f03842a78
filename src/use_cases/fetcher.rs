//! Interface for retrieving document text.
use crate::entities::document::DocumentRef;
use crate::result::FetchErr;

use std::fmt::Debug;
use std::sync::Arc;

pub type Fetcher = Arc<dyn DocumentFetcher>;

/// Resolves a document reference to its text content.
pub trait DocumentFetcher: Send + Sync + Debug {
    fn fetch(&self, doc: &DocumentRef) -> FetchResult;
}

/// Outcome of one fetch call. Consumed immediately by the matcher, not retained.
#[derive(Debug)]
pub enum FetchResult {
    Content(String),
    NotFound,
    Error(FetchErr),
}

impl FetchResult {
    pub fn content(self) -> Option<String> {
        match self {
            FetchResult::Content(text) => Some(text),
            _ => None,
        }
    }
}
