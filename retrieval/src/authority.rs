//! Query-independent authority signals: page popularity and static link rank.

use crate::config::AuthorityWeights;
use crate::index::{DocId, IndexService};
use crate::score_map::ScoreMap;

/// Raw authority prior used to weight title hits: `1 + views + rank`.
pub fn prior(index: &dyn IndexService, doc: DocId) -> f64 {
    1.0 + index.page_views(doc) as f64 + index.page_rank(doc)
}

/// Authority contribution for every document in `scores`.
///
/// Popularity and rank are each max-normalized over the documents present,
/// then combined linearly with their own weight. A signal that is zero for
/// every document contributes nothing.
pub fn authority_scores(index: &dyn IndexService, scores: &ScoreMap, weights: &AuthorityWeights) -> ScoreMap {
    let signals: Vec<(DocId, f64, f64)> = scores
        .docs()
        .map(|doc| (doc, index.page_views(doc) as f64, index.page_rank(doc)))
        .collect();
    let max_views = signals.iter().map(|s| s.1).fold(0.0, f64::max);
    let max_rank = signals.iter().map(|s| s.2).fold(0.0, f64::max);
    signals
        .into_iter()
        .map(|(doc, views, rank)| {
            let mut score = 0.0;
            if max_views > 0.0 {
                score += weights.popularity * views / max_views;
            }
            if max_rank > 0.0 {
                score += weights.rank * rank / max_rank;
            }
            (doc, score)
        })
        .collect()
}

/// Add the authority contribution to `scores` in place.
pub fn fuse(index: &dyn IndexService, scores: &mut ScoreMap, weights: &AuthorityWeights) {
    let authority = authority_scores(index, scores, weights);
    scores.merge(&authority);
}
