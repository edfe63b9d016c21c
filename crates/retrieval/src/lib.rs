//! Retrieval over the fixed chapter corpus.
//!
//! - [`bm25`]: term-frequency (lexical) ranking
//! - [`vector`]: dense embedding similarity
//! - [`hybrid`]: runs both, concatenates, and reorders
//! - [`visual`]: client for the page-image retrieval sidecar
//! - [`image_store`]: page image lookup by index
//! - [`corpus`]: loading the pre-built chunk corpus

pub mod bm25;
pub mod corpus;
pub mod hybrid;
pub mod image_store;
pub mod reorder;
pub mod vector;
pub mod visual;

pub use bm25::Bm25Index;
pub use corpus::{Corpus, CorpusChunk};
pub use hybrid::HybridRetriever;
pub use image_store::PageImageStore;
pub use reorder::ReorderStrategy;
pub use vector::{VectorIndex, cosine_similarity};
pub use visual::HttpVisualRetriever;
