//! Interface for resolving the raw keyword configuration.
//!
//! Sources produce an unnormalized [`KeywordsDoc`]; building the immutable
//! [`crate::entities::keywords::KeywordBook`] out of one or more docs happens
//! once, at startup.
use crate::result::ConfigurationErr;

use serde::Deserialize;
use std::collections::HashMap;

pub type KeywordSrc = Box<dyn KeywordSource>;

/// Resolves keyword phrases from some medium (inline configuration, file,
/// remote parameter store).
pub trait KeywordSource: Send {
    fn resolve(&self) -> Result<KeywordsDoc, ConfigurationErr>;
}

/// Raw keyword document: global phrases plus commission-specific lists.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct KeywordsDoc {
    #[serde(default)]
    pub global: Vec<String>,
    #[serde(default)]
    pub commissions: HashMap<String, Vec<String>>,
}

impl KeywordsDoc {
    pub fn merge(&mut self, other: KeywordsDoc) {
        self.global.extend(other.global);
        for (commission, phrases) in other.commissions {
            self.commissions.entry(commission).or_default().extend(phrases);
        }
    }
}
