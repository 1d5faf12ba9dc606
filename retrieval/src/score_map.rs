//! Per-stage score accumulator.
//!
//! A [`ScoreMap`] maps document ids to `f64` scores. Reading a document that
//! was never touched yields exactly `0.0`, so stages can accumulate without
//! checking for presence first. Entries remember the order in which they
//! were first inserted; every ordering operation here is stable with respect
//! to that order, which makes it the tie-break between equal scores.

use crate::index::DocId;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreMap {
    slots: HashMap<DocId, usize>,
    entries: Vec<(DocId, f64)>,
}

/// Document ids surviving the first stage.
pub type CandidateSet = HashSet<DocId>;

impl ScoreMap {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Score of `doc`, or `0.0` when it has no entry.
    pub fn get(&self, doc: DocId) -> f64 {
        self.slots.get(&doc).map(|&i| self.entries[i].1).unwrap_or(0.0)
    }

    pub fn contains(&self, doc: DocId) -> bool { self.slots.contains_key(&doc) }

    fn slot(&mut self, doc: DocId) -> &mut f64 {
        let i = match self.slots.get(&doc) {
            Some(&i) => i,
            None => {
                self.slots.insert(doc, self.entries.len());
                self.entries.push((doc, 0.0));
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }

    pub fn add(&mut self, doc: DocId, delta: f64) { *self.slot(doc) += delta; }

    pub fn iter(&self) -> impl Iterator<Item = (DocId, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn docs(&self) -> impl Iterator<Item = DocId> + '_ {
        self.entries.iter().map(|(d, _)| *d)
    }

    pub fn candidates(&self) -> CandidateSet { self.docs().collect() }

    pub fn max(&self) -> Option<f64> {
        self.entries.iter().map(|(_, s)| *s).fold(None, |acc, s| match acc {
            Some(m) if m >= s => Some(m),
            _ => Some(s),
        })
    }

    /// Divide every score by the maximum and multiply by `weight`.
    ///
    /// A missing or non-positive maximum is treated as 1, so a map where
    /// nothing scored keeps contributing zero instead of NaN.
    pub fn normalize_max(&mut self, weight: f64) {
        let max = match self.max() {
            Some(m) if m > 0.0 => m,
            _ => 1.0,
        };
        for (_, s) in self.entries.iter_mut() {
            *s = weight * (*s / max);
        }
    }

    /// Sum `other` into `self`; documents new to `self` are appended in `other`'s order.
    pub fn merge(&mut self, other: &ScoreMap) {
        for (doc, score) in other.iter() {
            self.add(doc, score);
        }
    }

    /// Entries sorted by descending score, ties in insertion order.
    pub fn ranked(&self) -> Vec<(DocId, f64)> {
        let mut out = self.entries.clone();
        out.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        out
    }

    /// Keep only the `n` best entries. Survivors are re-inserted best-first.
    pub fn truncate_top(self, n: usize) -> ScoreMap {
        self.ranked().into_iter().take(n).collect()
    }
}

impl FromIterator<(DocId, f64)> for ScoreMap {
    fn from_iter<T: IntoIterator<Item = (DocId, f64)>>(iter: T) -> Self {
        let mut map = ScoreMap::new();
        for (doc, score) in iter {
            map.add(doc, score);
        }
        map
    }
}
