//! Second-stage relevance scoring over body text.
//!
//! Body posting lists can span most of the corpus, so every scan is filtered
//! by candidate membership and polls a [`Deadline`] as it goes.

use crate::config::Bm25Params;
use crate::index::{Field, IndexService};
use crate::query::QueryVector;
use crate::score_map::{CandidateSet, ScoreMap};
use std::time::{Duration, Instant};

/// Postings visited between deadline checks.
const DEADLINE_STRIDE: usize = 1024;

/// Point in time after which posting scans stop early.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn none() -> Self { Self { at: None } }

    pub fn after(timeout: Duration) -> Self { Self { at: Some(Instant::now() + timeout) } }

    pub fn from_timeout_ms(timeout_ms: Option<u64>) -> Self {
        timeout_ms.map(|ms| Self::after(Duration::from_millis(ms))).unwrap_or_default()
    }

    pub fn expired(&self) -> bool {
        self.at.map(|at| Instant::now() >= at).unwrap_or(false)
    }
}

/// BM25 contribution of one term in one document.
pub fn bm25_term_score(
    params: &Bm25Params,
    freq: u32,
    doc_len: f64,
    avg_doc_len: f64,
    num_docs: u32,
    df: u32,
    qtf: f64,
) -> f64 {
    if df == 0 || freq == 0 {
        return 0.0;
    }
    let len_ratio = if avg_doc_len > 0.0 { doc_len / avg_doc_len } else { 1.0 };
    let length_norm = 1.0 - params.b + params.b * len_ratio;
    let f = freq as f64;
    let tf_part = ((params.k1 + 1.0) * f) / (params.k1 * length_norm + f);
    let idf = ((num_docs as f64 + 1.0) / df as f64).log10();
    let qtf_part = ((params.k3 + 1.0) * qtf) / (params.k3 + qtf);
    tf_part * idf * qtf_part
}

/// BM25 over the body field, restricted to `candidates`.
///
/// Scores are max-normalized and scaled to `[0, weight]`. Documents without
/// stats are treated as average length.
pub fn bm25(
    index: &dyn IndexService,
    query: &QueryVector,
    candidates: &CandidateSet,
    params: &Bm25Params,
    weight: f64,
    deadline: &Deadline,
) -> ScoreMap {
    let mut scores = ScoreMap::new();
    if candidates.is_empty() {
        return scores;
    }
    let num_docs = index.num_docs();
    let avg_len = index.avg_doc_len() as f64;
    'terms: for (term, qtf) in query.iter() {
        let df = index.df(Field::Body, term);
        if df == 0 {
            continue;
        }
        for (i, posting) in index.postings(Field::Body, term).iter().enumerate() {
            if i % DEADLINE_STRIDE == 0 && deadline.expired() {
                tracing::warn!(term, scanned = i, "bm25 scan hit query deadline");
                break 'terms;
            }
            if !candidates.contains(&posting.doc_id) {
                continue;
            }
            let doc_len = index.doc_stats(posting.doc_id).map(|s| s.length as f64).unwrap_or(avg_len);
            scores.add(posting.doc_id, bm25_term_score(params, posting.freq, doc_len, avg_len, num_docs, df, qtf));
        }
    }
    scores.normalize_max(weight);
    scores
}

/// Cosine TF-IDF over the body field.
///
/// Each term adds `w * log10(N / df)`; the sum is scaled by the query's
/// inverse norm, the document's stored norm and `weight`. With `restrict`
/// set, documents outside the set are skipped.
pub fn cosine_tfidf(
    index: &dyn IndexService,
    query: &QueryVector,
    restrict: Option<&CandidateSet>,
    weight: f64,
    deadline: &Deadline,
) -> ScoreMap {
    let mut scores = ScoreMap::new();
    let query_norm = query.inverse_norm();
    if query_norm == 0.0 {
        return scores;
    }
    let num_docs = index.num_docs() as f64;
    'terms: for (term, w) in query.iter() {
        let df = index.df(Field::Body, term);
        if df == 0 {
            continue;
        }
        let idf = (num_docs / df as f64).log10();
        for (i, posting) in index.postings(Field::Body, term).iter().enumerate() {
            if i % DEADLINE_STRIDE == 0 && deadline.expired() {
                tracing::warn!(term, scanned = i, "cosine scan hit query deadline");
                break 'terms;
            }
            if restrict.is_some_and(|set| !set.contains(&posting.doc_id)) {
                continue;
            }
            scores.add(posting.doc_id, w * idf);
        }
    }
    scores
        .iter()
        .map(|(doc, s)| {
            let doc_norm = index.doc_stats(doc).map(|st| st.norm as f64).unwrap_or(0.0);
            (doc, weight * s * query_norm * doc_norm)
        })
        .collect()
}

/// Title term frequency weighted by query weight, restricted to `candidates`.
pub fn title_term_frequency(
    index: &dyn IndexService,
    query: &QueryVector,
    candidates: &CandidateSet,
    weight: f64,
) -> ScoreMap {
    let mut scores = ScoreMap::new();
    for (term, qtf) in query.iter() {
        for posting in index.postings(Field::Title, term) {
            if candidates.contains(&posting.doc_id) {
                scores.add(posting.doc_id, qtf * posting.freq as f64);
            }
        }
    }
    scores.normalize_max(weight);
    scores
}
