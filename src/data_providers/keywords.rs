//! Concrete keyword sources: inline comma-separated configuration and JSON
//! files.
//!
//! The JSON file accepts three shapes: the structured
//! `{"global": [...], "commissions": {"name": [...]}}` form, the legacy
//! `{"keywords": [...]}` form and a bare `[...]` list. Legacy and bare lists
//! feed the global set.
use crate::result::ConfigurationErr;
use crate::use_cases::keywords::{KeywordSource, KeywordsDoc};

use serde_json::Value;
use std::fs::read_to_string;
use std::path::PathBuf;
use tracing::instrument;

/// Comma-separated phrases straight from configuration.
pub struct InlineSource {
    raw: String,
}

impl InlineSource {
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self { raw: raw.into() }
    }
}

impl KeywordSource for InlineSource {
    fn resolve(&self) -> Result<KeywordsDoc, ConfigurationErr> {
        Ok(KeywordsDoc {
            global: self
                .raw
                .split(',')
                .map(str::trim)
                .filter(|phrase| !phrase.is_empty())
                .map(ToString::to_string)
                .collect(),
            ..KeywordsDoc::default()
        })
    }
}

/// JSON keywords file on the local filesystem.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl KeywordSource for JsonFileSource {
    #[instrument(skip(self))]
    fn resolve(&self) -> Result<KeywordsDoc, ConfigurationErr> {
        let raw = read_to_string(&self.path)
            .map_err(|e| ConfigurationErr::Keywords(format!("{}: {}", self.path.display(), e)))?;
        parse_keywords_doc(&raw)
            .map_err(|e| ConfigurationErr::Keywords(format!("{}: {}", self.path.display(), e)))
    }
}

fn parse_keywords_doc(raw: &str) -> Result<KeywordsDoc, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    match value {
        Value::Array(_) => Ok(KeywordsDoc {
            global: string_list(&value)?,
            ..KeywordsDoc::default()
        }),
        Value::Object(ref map) => {
            if map.contains_key("global") || map.contains_key("commissions") {
                serde_json::from_value(value).map_err(|e| e.to_string())
            } else if let Some(keywords) = map.get("keywords") {
                Ok(KeywordsDoc {
                    global: string_list(keywords)?,
                    ..KeywordsDoc::default()
                })
            } else {
                Err("no keyword fields found".into())
            }
        }
        _ => Err("expected a json object or list".into()),
    }
}

fn string_list(value: &Value) -> Result<Vec<String>, String> {
    value
        .as_array()
        .ok_or_else(|| String::from("expected a list of strings"))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(ToString::to_string)
                .ok_or_else(|| format!("not a string: {v}"))
        })
        .collect()
}
