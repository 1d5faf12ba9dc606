use crate::tokenizer::tokenize;
use std::collections::HashMap;

/// Normalized query terms with their relative frequency in the query.
///
/// Terms are unique and kept in first-occurrence order, so iterating a
/// vector always visits terms in the same order for the same query text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryVector {
    terms: Vec<(String, f64)>,
}

impl QueryVector {
    /// Tokenize `text` and weight every surviving term by `count / total`.
    pub fn parse(text: &str) -> Self {
        let tokens = tokenize(text);
        let total = tokens.len();
        if total == 0 {
            return Self::default();
        }
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<(&str, u32)> = Vec::new();
        for token in &tokens {
            match slots.get(token.as_str()) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    slots.insert(token.as_str(), counts.len());
                    counts.push((token.as_str(), 1));
                }
            }
        }
        let terms = counts
            .into_iter()
            .map(|(term, count)| (term.to_string(), count as f64 / total as f64))
            .collect();
        Self { terms }
    }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.terms.iter().map(|(t, w)| (t.as_str(), *w))
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.iter().map(|(t, _)| t.as_str())
    }

    #[cfg(test)]
    fn weight(&self, term: &str) -> f64 {
        self.terms.iter().find(|(t, _)| t == term).map(|(_, w)| *w).unwrap_or(0.0)
    }

    /// `1 / sqrt(sum of squared weights)`, or 0 for an empty vector.
    pub fn inverse_norm(&self) -> f64 {
        let sum: f64 = self.terms.iter().map(|(_, w)| w * w).sum();
        if sum > 0.0 { 1.0 / sum.sqrt() } else { 0.0 }
    }
}
