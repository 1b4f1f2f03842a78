//! Scans fetched documents against a keyword set.
use crate::entities::alert::MatchResult;
use crate::entities::document::DocumentKind;
use crate::entities::keywords::KeywordSet;

/// Evaluates every present document against `keywords` and unions the results.
///
/// Absent documents are skipped rather than failing the evaluation; a missing
/// transcript never prevents matching against an available analysis. When every
/// document is absent the result is definitionally empty - the caller is the one
/// who knows whether that means "no alert" or "nothing could be fetched".
pub fn evaluate(
    keywords: &KeywordSet,
    documents: &[(DocumentKind, Option<&str>)],
) -> MatchResult {
    let per_document: Vec<(DocumentKind, Vec<String>)> = documents
        .iter()
        .filter_map(|&(kind, text)| text.map(|t| (kind, keywords.matches(t))))
        .collect();

    // merged in keyword-set order, not document-scan order
    let mut result = MatchResult::empty();
    for phrase in keywords.phrases() {
        for (kind, matched) in &per_document {
            if matched.iter().any(|m| m == phrase) {
                result.record(phrase.clone(), *kind);
            }
        }
    }
    result
}
