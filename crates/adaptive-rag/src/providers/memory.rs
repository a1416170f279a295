//! In-memory document store backed by a JSON corpus

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Document;

use super::document_store::DocumentStore;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "do", "does", "for", "from", "how", "in",
    "is", "it", "of", "on", "or", "that", "the", "this", "to", "was", "what", "when", "where",
    "which", "who", "why", "with",
];

/// One entry of a corpus file
#[derive(Debug, Deserialize)]
struct CorpusEntry {
    #[serde(alias = "source_id", alias = "url")]
    source: String,
    #[serde(alias = "text", alias = "page_content")]
    content: String,
}

/// Document store ranking by query-term overlap.
///
/// Stands in for an embedding index: good enough for demos and tests, and
/// deterministic, so identical queries return identical documents.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Load `[{"source": "...", "content": "..."}, ...]`
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<CorpusEntry> = serde_json::from_str(&raw)?;

        let documents: Vec<Document> = entries
            .into_iter()
            .filter(|entry| !entry.content.trim().is_empty())
            .map(|entry| Document::new(entry.content, entry.source))
            .collect();

        if documents.is_empty() {
            return Err(Error::Config(format!(
                "Corpus {} contains no documents",
                path.display()
            )));
        }

        tracing::info!("Loaded {} documents from {}", documents.len(), path.display());
        Ok(Self::from_documents(documents))
    }

    pub fn insert(&self, document: Document) {
        self.documents.write().push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    fn rank(&self, query: &str, k: usize) -> Vec<Document> {
        let terms = terms(query);
        if terms.is_empty() || k == 0 {
            return Vec::new();
        }

        let documents = self.documents.read();
        let mut scored: Vec<(usize, &Document)> = documents
            .iter()
            .filter_map(|doc| {
                let doc_terms = terms_of(doc.content());
                let score = terms.iter().filter(|t| doc_terms.contains(*t)).count();
                (score > 0).then_some((score, doc))
            })
            .collect();

        // stable: ties keep corpus order
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(k).map(|(_, doc)| doc.clone()).collect()
    }
}

fn terms(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| t.len() > 1 && !STOPWORDS.contains(&t.as_str()))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn terms_of(text: &str) -> HashSet<String> {
    terms(text).into_iter().collect()
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Document>> {
        Ok(self.rank(query, k))
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
