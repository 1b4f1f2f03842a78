//! Keyword configuration entities.
//!
//! A [`KeywordSet`] is the normalized, deduplicated list of phrases one scan runs
//! against. A [`KeywordBook`] groups the global set with commission-specific
//! extras and resolves the effective set for a particular committee.
use crate::helpers::slugify;
use crate::result::ConfigurationErr;

use std::collections::HashMap;

/// Immutable, ordered collection of normalized alert phrases.
///
/// Normalization lowercases and trims each phrase; internal whitespace is kept so
/// multi-word phrases like "banco central" match literally. Duplicates (any casing)
/// collapse to the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    phrases: Vec<String>,
}

impl KeywordSet {
    /// Builds the set from raw phrases. Fails when nothing survives normalization.
    pub fn build<I, S>(raw_phrases: I) -> Result<Self, ConfigurationErr>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut phrases = Vec::new();
        for raw in raw_phrases {
            let phrase = raw.as_ref().trim().to_lowercase();
            if !phrase.is_empty() && !phrases.contains(&phrase) {
                phrases.push(phrase);
            }
        }
        if phrases.is_empty() {
            return Err(ConfigurationErr::NoKeywords);
        }
        Ok(Self { phrases })
    }

    /// Returns the phrases contained in `text`, in set order.
    ///
    /// Matching is case-insensitive substring containment, no word boundaries:
    /// "codelco" matches inside "codelconorte". This mirrors the behavior of the
    /// upstream service and is intentional policy, coarse as it is.
    pub fn matches(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let text = text.to_lowercase();
        self.phrases
            .iter()
            .filter(|phrase| text.contains(phrase.as_str()))
            .cloned()
            .collect()
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

/// Global keywords plus commission-specific extras, resolved once at startup.
///
/// Read-only after construction. Commission keys are slugified committee names.
#[derive(Debug, Default)]
pub struct KeywordBook {
    global: Vec<String>,
    commissions: HashMap<String, Vec<String>>,
}

impl KeywordBook {
    /// Builds the book. Fails when neither global nor commission phrases exist.
    pub fn build(
        global: Vec<String>,
        commissions: HashMap<String, Vec<String>>,
    ) -> Result<Self, ConfigurationErr> {
        let global = normalize(global);
        let commissions: HashMap<String, Vec<String>> = commissions
            .into_iter()
            .map(|(name, phrases)| (slugify(&name), normalize(phrases)))
            .filter(|(_, phrases)| !phrases.is_empty())
            .collect();
        if global.is_empty() && commissions.is_empty() {
            return Err(ConfigurationErr::NoKeywords);
        }
        Ok(Self {
            global,
            commissions,
        })
    }

    /// Resolves the keyword set applicable to an event from `committee`.
    ///
    /// Global phrases always apply; commission-specific phrases are appended when
    /// the slugified committee has an entry. `None` when nothing applies.
    pub fn effective_for(&self, committee: Option<&str>) -> Option<KeywordSet> {
        let mut phrases = self.global.clone();
        if let Some(committee) = committee {
            if let Some(extra) = self.commissions.get(&slugify(committee)) {
                phrases.extend(extra.iter().cloned());
            }
        }
        KeywordSet::build(phrases).ok()
    }

    pub fn global_count(&self) -> usize {
        self.global.len()
    }

    pub fn commission_count(&self) -> usize {
        self.commissions.len()
    }
}

fn normalize(phrases: Vec<String>) -> Vec<String> {
    let mut normalized = Vec::new();
    for phrase in phrases {
        let phrase = phrase.trim().to_lowercase();
        if !phrase.is_empty() && !normalized.contains(&phrase) {
            normalized.push(phrase);
        }
    }
    normalized
}
