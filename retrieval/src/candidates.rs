//! First-stage candidate generation from the title and anchor-text fields.
//!
//! Each generator returns a capped, max-normalized [`ScoreMap`]. Posting
//! lists here are short compared to the body field, so they are read in full.

use crate::authority::prior;
use crate::index::{AnchorLink, DocId, Field, IndexService};
use crate::query::QueryVector;
use crate::score_map::ScoreMap;
use std::collections::{HashMap, HashSet};

/// Documents whose title contains a query term, scored by authority.
///
/// Every title hit adds `1 + popularity + static rank`, so a title match is
/// worth more on a well-known page. The best `cap` survive, normalized to
/// `[0, weight]`.
pub fn title_authority(index: &dyn IndexService, query: &QueryVector, weight: f64, cap: usize) -> ScoreMap {
    let mut scores = ScoreMap::new();
    for term in query.terms() {
        for posting in index.postings(Field::Title, term) {
            scores.add(posting.doc_id, prior(index, posting.doc_id));
        }
    }
    let mut top = scores.truncate_top(cap);
    top.normalize_max(weight);
    top
}

/// Documents referenced by anchor text containing a query term, scored by
/// the number of matching terms.
pub fn anchor_overlap(index: &dyn IndexService, query: &QueryVector, weight: f64, cap: usize) -> ScoreMap {
    let mut scores = ScoreMap::new();
    for term in query.terms() {
        for posting in index.postings(Field::AnchorText, term) {
            scores.add(posting.doc_id, 1.0);
        }
    }
    let mut top = scores.truncate_top(cap);
    top.normalize_max(weight);
    top
}

/// Union of the title and anchor stages, scores summed where both hit.
pub fn union(title: &ScoreMap, anchor: &ScoreMap) -> ScoreMap {
    let mut merged = title.clone();
    merged.merge(anchor);
    merged
}

/// Scores documents by their strongest anchor relationship.
///
/// For every query term, each distinct `(doc, target)` link counts once. A
/// document's score is the count of its most frequently matched target,
/// i.e. how many query terms agree on the same relationship.
pub fn anchor_relationships(index: &dyn IndexService, query: &QueryVector, cap: usize) -> ScoreMap {
    let mut order: Vec<DocId> = Vec::new();
    let mut counts: HashMap<DocId, HashMap<DocId, u32>> = HashMap::new();
    for term in query.terms() {
        let mut seen: HashSet<AnchorLink> = HashSet::new();
        for link in index.anchor_links(term) {
            if !seen.insert(*link) {
                continue;
            }
            let targets = counts.entry(link.doc_id).or_insert_with(|| {
                order.push(link.doc_id);
                HashMap::new()
            });
            *targets.entry(link.target).or_insert(0) += 1;
        }
    }
    let scores: ScoreMap = order
        .into_iter()
        .map(|doc| {
            let best = counts.get(&doc).and_then(|t| t.values().max().copied()).unwrap_or(0);
            (doc, best as f64)
        })
        .collect();
    scores.truncate_top(cap)
}

/// Number of distinct query terms found in `field` for each document.
pub fn distinct_term_matches(index: &dyn IndexService, field: Field, query: &QueryVector) -> ScoreMap {
    let mut scores = ScoreMap::new();
    for term in query.terms() {
        let mut seen: HashSet<DocId> = HashSet::new();
        for posting in index.postings(field, term) {
            if seen.insert(posting.doc_id) {
                scores.add(posting.doc_id, 1.0);
            }
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;

    fn corpus() -> MemoryIndex {
        let mut b = MemoryIndex::builder();
        for doc in 1..=300u32 {
            b = b.doc(doc, &format!("Doc {doc}"), 1.0, 10).posting(Field::AnchorText, "river", doc, 1);
        }
        b.posting(Field::AnchorText, "delta", 7, 2)
            .posting(Field::Title, "river", 5, 1)
            .posting(Field::Title, "river", 6, 1)
            .page_view(6, 1000)
            .anchor_link("capit", 10, 100)
            .anchor_link("capit", 10, 100)
            .anchor_link("franc", 10, 100)
            .anchor_link("franc", 11, 100)
            .anchor_link("capit", 11, 200)
            .build()
    }

    #[test]
    fn anchor_stage_never_exceeds_cap() {
        let index = corpus();
        let q = QueryVector::parse("river delta");
        let scores = anchor_overlap(&index, &q, 0.15, 200);
        assert_eq!(scores.len(), 200);
        assert_eq!(scores.docs().next(), Some(7));
        assert!((scores.get(7) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn title_stage_prefers_authority() {
        let index = corpus();
        let q = QueryVector::parse("river");
        let scores = title_authority(&index, &q, 0.3, 100);
        assert_eq!(scores.docs().collect::<Vec<_>>(), vec![6, 5]);
        assert!((scores.get(6) - 0.3).abs() < 1e-12);
        assert!(scores.get(5) > 0.0);
    }

    #[test]
    fn unknown_terms_produce_empty_maps() {
        let index = corpus();
        let q = QueryVector::parse("zeppelin");
        assert!(title_authority(&index, &q, 1.0, 10).is_empty());
        assert!(anchor_overlap(&index, &q, 1.0, 10).is_empty());
        assert!(anchor_relationships(&index, &q, 10).is_empty());
    }

    #[test]
    fn relationships_dedupe_within_a_term() {
        let index = corpus();
        let q = QueryVector::parse("capital france");
        let scores = anchor_relationships(&index, &q, 200);
        // doc 10 -> 100 matched by both terms, the duplicate "capit" link counts once
        assert_eq!(scores.get(10), 2.0);
        // doc 11 links to two different targets, one term each
        assert_eq!(scores.get(11), 1.0);
        assert_eq!(scores.docs().next(), Some(10));
    }
}
