//! BM25 lexical index.
//!
//! Okapi BM25 over lowercase alphanumeric terms with English stopwords
//! removed. Built once from the corpus; queries only read it.

use std::collections::HashMap;

use async_trait::async_trait;
use lumen_core::error::RetrievalError;
use lumen_core::retrieval::{PassageRetriever, RelevanceSource, RetrievedPassage};

use crate::corpus::{Corpus, CorpusChunk};

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "do", "does", "for", "from", "how",
    "in", "is", "it", "its", "me", "of", "on", "or", "that", "the", "this", "to", "was", "what",
    "when", "which", "who", "why", "will", "with",
];

/// Split text into index terms.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect()
}

struct IndexedDoc {
    chunk: CorpusChunk,
    term_freqs: HashMap<String, u32>,
    len: usize,
}

/// In-memory BM25 index over the corpus.
pub struct Bm25Index {
    docs: Vec<IndexedDoc>,
    doc_freqs: HashMap<String, u32>,
    avg_len: f32,
    k1: f32,
    b: f32,
}

impl Bm25Index {
    /// Build the index with the usual defaults (`k1 = 1.2`, `b = 0.75`).
    pub fn new(corpus: &Corpus) -> Self {
        Self::with_params(corpus, 1.2, 0.75)
    }

    pub fn with_params(corpus: &Corpus, k1: f32, b: f32) -> Self {
        let mut doc_freqs: HashMap<String, u32> = HashMap::new();
        let docs: Vec<IndexedDoc> = corpus
            .chunks
            .iter()
            .map(|chunk| {
                let terms = tokenize(&chunk.content);
                let mut term_freqs: HashMap<String, u32> = HashMap::new();
                for term in &terms {
                    *term_freqs.entry(term.clone()).or_default() += 1;
                }
                for term in term_freqs.keys() {
                    *doc_freqs.entry(term.clone()).or_default() += 1;
                }
                IndexedDoc {
                    chunk: chunk.clone(),
                    term_freqs,
                    len: terms.len(),
                }
            })
            .collect();

        let total_len: usize = docs.iter().map(|d| d.len).sum();
        let avg_len = if docs.is_empty() {
            0.0
        } else {
            total_len as f32 / docs.len() as f32
        };

        Self {
            docs,
            doc_freqs,
            avg_len,
            k1,
            b,
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn idf(&self, term: &str) -> f32 {
        let n = self.docs.len() as f32;
        let df = self.doc_freqs.get(term).copied().unwrap_or(0) as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn score(&self, doc: &IndexedDoc, query_terms: &[String]) -> f32 {
        let len_norm = if self.avg_len > 0.0 {
            doc.len as f32 / self.avg_len
        } else {
            0.0
        };

        query_terms
            .iter()
            .filter_map(|term| {
                let tf = *doc.term_freqs.get(term)? as f32;
                let denom = tf + self.k1 * (1.0 - self.b + self.b * len_norm);
                Some(self.idf(term) * tf * (self.k1 + 1.0) / denom)
            })
            .sum()
    }

    /// Rank chunks against `query`. Chunks sharing no term with the query
    /// are never returned.
    pub fn search(&self, query: &str, limit: usize) -> Vec<RetrievedPassage> {
        let query_terms = tokenize(query);
        if query_terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f32, &IndexedDoc)> = self
            .docs
            .iter()
            .map(|doc| (self.score(doc, &query_terms), doc))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(score, doc)| RetrievedPassage {
                id: doc.chunk.id.clone(),
                content: doc.chunk.content.clone(),
                metadata: doc.chunk.metadata.clone(),
                source: RelevanceSource::Lexical,
                score,
            })
            .collect()
    }
}

#[async_trait]
impl PassageRetriever for Bm25Index {
    fn name(&self) -> &str {
        "bm25"
    }

    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        if self.docs.is_empty() {
            return Err(RetrievalError::Lexical("index is empty".into()));
        }
        Ok(self.search(query, top_k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[(&str, &str)]) -> Corpus {
        Corpus::new(
            texts
                .iter()
                .map(|(id, content)| CorpusChunk {
                    id: id.to_string(),
                    content: content.to_string(),
                    metadata: serde_json::Map::new(),
                    embedding: None,
                })
                .collect(),
        )
    }

    fn chapter() -> Corpus {
        corpus(&[
            ("echo", "An echo is the reflection of sound heard after the original sound."),
            ("pitch", "Pitch of a sound depends on the frequency of vibration."),
            ("sonar", "SONAR uses ultrasonic waves to measure distance under water."),
            ("reverb", "Reverberation is the persistence of sound due to repeated reflection."),
        ])
    }

    #[test]
    fn tokenize_drops_stopwords_and_punctuation() {
        assert_eq!(tokenize("What is the Echo?"), vec!["echo"]);
        assert_eq!(tokenize("speed-of-sound 343 m/s"), vec!["speed", "sound", "343", "m", "s"]);
    }

    #[test]
    fn ranks_matching_chunk_first() {
        let index = Bm25Index::new(&chapter());
        let results = index.search("what is an echo", 2);
        assert_eq!(results[0].id, "echo");
        assert!(results.iter().all(|p| p.source == RelevanceSource::Lexical));
    }

    #[test]
    fn rare_terms_outweigh_common_ones() {
        let index = Bm25Index::new(&chapter());
        // "sound" appears in three chunks, "frequency" in one.
        let results = index.search("sound frequency", 4);
        assert_eq!(results[0].id, "pitch");
    }

    #[test]
    fn respects_limit_and_skips_non_matching() {
        let index = Bm25Index::new(&chapter());
        assert_eq!(index.search("reflection", 1).len(), 1);
        assert_eq!(index.search("reflection", 10).len(), 2);
        assert!(index.search("photosynthesis", 10).is_empty());
    }

    #[test]
    fn stopword_only_query_returns_nothing() {
        let index = Bm25Index::new(&chapter());
        assert!(index.search("what is the", 3).is_empty());
    }

    #[tokio::test]
    async fn empty_index_is_an_error() {
        let index = Bm25Index::new(&Corpus::default());
        assert!(index.retrieve("echo", 2).await.is_err());
    }
}
