//! Multi-signal retrieval over a fixed, pre-built corpus.
//!
//! A query flows through [`query::QueryVector`] → candidate generation from
//! titles and anchor text → body relevance (BM25, cosine TF-IDF) restricted
//! to those candidates → authority fusion → top-K selection. The tables live
//! behind [`index::IndexService`] and are never written after loading, so one
//! [`engine::SearchEngine`] can serve queries from many threads at once.

pub mod authority;
pub mod candidates;
pub mod config;
pub mod engine;
mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod router;
pub mod score_map;
pub mod scoring;
pub mod tokenizer;
pub mod topk;

pub use config::{Preset, RankingConfig};
pub use engine::{Ranking, SearchEngine, Stage};
pub use error::{Error, Result};
pub use index::{AnchorLink, DocId, DocumentStats, Field, FieldIndex, IndexService, MemoryIndex, Posting};
pub use query::QueryVector;
pub use router::Route;
pub use score_map::{CandidateSet, ScoreMap};
pub use topk::RankedResult;
