use crate::query::QueryVector;

/// Ranking strategy chosen once per query from its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Nothing survived normalization.
    Empty,
    /// One distinct term: title and authority signals only.
    SingleTerm,
    /// Raw text contains `?`: anchor relationship scorer.
    Interrogative,
    /// Candidate generation, BM25, fusion.
    General,
}

impl Route {
    pub fn select(raw: &str, query: &QueryVector) -> Route {
        if query.is_empty() {
            Route::Empty
        } else if query.len() == 1 {
            Route::SingleTerm
        } else if raw.contains('?') {
            Route::Interrogative
        } else {
            Route::General
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Empty => "empty",
            Route::SingleTerm => "single_term",
            Route::Interrogative => "interrogative",
            Route::General => "general",
        }
    }
}
