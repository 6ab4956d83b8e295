use std::collections::BTreeSet;

/// Backend-assigned document identifier.
pub type DocumentId = i64;

/// Ingestion pipeline stage reported by the backend.
///
/// Stages advance strictly in declaration order up to `Ingested`; `Error` is
/// absorbing and reachable from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentStatus {
    Uploaded,
    Downloading,
    Parsing,
    Chunking,
    Embedding,
    Indexing,
    Ingested,
    Error,
    /// A status string this client does not know. Treated as still in flight.
    Unknown,
}

impl DocumentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DocumentStatus::Ingested | DocumentStatus::Error)
    }

    /// Only ingested documents may be queried or summarized.
    pub fn is_queryable(self) -> bool {
        self == DocumentStatus::Ingested
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentStatus::Uploaded => "Queued",
            DocumentStatus::Downloading => "Downloading",
            DocumentStatus::Parsing => "Parsing",
            DocumentStatus::Chunking => "Chunking",
            DocumentStatus::Embedding => "Embedding",
            DocumentStatus::Indexing => "Indexing",
            DocumentStatus::Ingested => "Ready",
            DocumentStatus::Error => "Error",
            DocumentStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    pub status: DocumentStatus,
}

/// Local mirror of the backend document list.
///
/// The mirror is only ever replaced wholesale with what the backend reported;
/// no status is advanced locally.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the mirror. Returns `true` when the contents changed.
    pub fn replace(&mut self, documents: Vec<Document>) -> bool {
        if self.documents == documents {
            return false;
        }
        self.documents = documents;
        true
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> BTreeSet<DocumentId> {
        self.documents.iter().map(|doc| doc.id).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// True iff any document is neither ingested nor errored.
    pub fn any_ingesting(&self) -> bool {
        self.documents.iter().any(|doc| !doc.status.is_terminal())
    }

    pub fn ingested_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|doc| doc.status == DocumentStatus::Ingested)
            .count()
    }
}
