use crate::index::{DocId, IndexService};
use crate::score_map::ScoreMap;
use serde::{Serialize, Serializer};

/// One entry of the outward result list, serialized as `["<id>", "<title>"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub doc_id: DocId,
    pub title: String,
}

impl Serialize for RankedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.doc_id.to_string(), &self.title).serialize(serializer)
    }
}

/// Sum stage maps by document. A document only needs to appear in one.
pub fn merge<'a>(maps: impl IntoIterator<Item = &'a ScoreMap>) -> ScoreMap {
    let mut merged = ScoreMap::new();
    for map in maps {
        merged.merge(map);
    }
    merged
}

/// Best `limit` documents (all of them when `None`), titles attached.
///
/// Ties keep the order in which documents were first scored.
pub fn select(index: &dyn IndexService, scores: &ScoreMap, limit: Option<usize>) -> Vec<RankedResult> {
    let limit = limit.unwrap_or(usize::MAX);
    scores
        .ranked()
        .into_iter()
        .take(limit)
        .map(|(doc_id, _)| RankedResult {
            doc_id,
            title: index.title(doc_id).unwrap_or_default().to_string(),
        })
        .collect()
}
