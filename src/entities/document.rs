use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// The kind of document a reference points at.
///
/// Only [`DocumentKind::Transcript`] and [`DocumentKind::Analysis`] are fetched and
/// matched against keywords. [`DocumentKind::Pdf`] exists solely as an attachment
/// reference carried through to the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
pub enum DocumentKind {
    Transcript,
    Analysis,
    Pdf,
}

impl DocumentKind {
    /// Kinds which take part in keyword matching.
    pub fn matchable() -> impl Iterator<Item = DocumentKind> {
        enum_iterator::all::<DocumentKind>().filter(|k| *k != DocumentKind::Pdf)
    }
}

impl Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentKind::Transcript => "transcript",
            DocumentKind::Analysis => "analysis",
            DocumentKind::Pdf => "pdf",
        })
    }
}

/// Opaque locator of a document plus its kind.
///
/// The uri is not interpreted here. Concrete fetchers decide what they understand
/// (local paths, `file://`, remote object storage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub kind: DocumentKind,
    pub uri: String,
}

impl DocumentRef {
    pub fn new<S: Into<String>>(kind: DocumentKind, uri: S) -> Self {
        Self {
            kind,
            uri: uri.into(),
        }
    }
}

impl Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.uri)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn matchable_kinds_exclude_pdf() {
        // when
        let kinds: Vec<DocumentKind> = DocumentKind::matchable().collect();

        // then
        assert_eq!(kinds, vec![DocumentKind::Transcript, DocumentKind::Analysis]);
    }

    #[test]
    fn document_ref_displays_kind_and_uri() {
        // given
        let doc = DocumentRef::new(DocumentKind::Transcript, "file:///tmp/t.json");

        // when
        let displayed = doc.to_string();

        // then
        assert_eq!(displayed, "transcript: file:///tmp/t.json");
    }
}
