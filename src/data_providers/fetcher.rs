//! Local filesystem implementation of [`crate::use_cases::fetcher::DocumentFetcher`].
//!
//! Understands plain paths and `file://` URIs. Transcripts arrive as JSON with
//! the spoken text under a `text` field; that field is unwrapped before
//! matching. Any other valid JSON is matched against its serialized form, and
//! everything else (plain text, HTML) passes through untouched.
use crate::entities::document::DocumentRef;
use crate::result::FetchErr;
use crate::use_cases::fetcher::{DocumentFetcher, FetchResult};

use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Default)]
pub struct FsFetcher;

impl FsFetcher {
    pub fn new() -> Self {
        Self
    }

    fn local_path(uri: &str) -> Result<PathBuf, FetchErr> {
        if let Some(path) = uri.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        if uri.contains("://") {
            return Err(FetchErr::UnsupportedRef(uri.to_string()));
        }
        Ok(PathBuf::from(uri))
    }
}

impl DocumentFetcher for FsFetcher {
    fn fetch(&self, doc: &DocumentRef) -> FetchResult {
        let path = match Self::local_path(&doc.uri) {
            Ok(path) => path,
            Err(e) => return FetchResult::Error(e),
        };
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return FetchResult::NotFound,
            Err(e) => return FetchResult::Error(e.into()),
        };
        let raw = match String::from_utf8(bytes) {
            Ok(raw) => raw,
            Err(e) => return FetchResult::Error(e.into()),
        };
        FetchResult::Content(unwrap_transcript_json(raw))
    }
}

fn unwrap_transcript_json(raw: String) -> String {
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => match map.get("text") {
            Some(Value::String(text)) => text.clone(),
            _ => Value::Object(map).to_string(),
        },
        Ok(other) => other.to_string(),
        Err(_) => {
            debug!("document is not json, using raw content");
            raw
        }
    }
}
