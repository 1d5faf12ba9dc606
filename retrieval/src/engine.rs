//! Query execution: routing, stage composition and final selection.

use crate::authority;
use crate::candidates;
use crate::config::RankingConfig;
use crate::index::{DocId, Field, IndexService};
use crate::query::QueryVector;
use crate::router::Route;
use crate::score_map::ScoreMap;
use crate::scoring::{self, Deadline};
use crate::topk::{self, RankedResult};
use std::sync::Arc;

/// Scoring stages, recorded in execution order for each ranked query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TitleAuthority,
    AnchorOverlap,
    TitleFrequency,
    Bm25,
    Cosine,
    Authority,
    AnchorRelationships,
}

/// Fused scores for one query before titles are attached.
#[derive(Debug, Clone)]
pub struct Ranking {
    pub route: Route,
    pub stages: Vec<Stage>,
    pub scores: ScoreMap,
}

/// Ranks queries against a shared, read-only index.
///
/// Cheap to clone; clones share the index.
#[derive(Clone)]
pub struct SearchEngine {
    index: Arc<dyn IndexService>,
    config: RankingConfig,
}

impl SearchEngine {
    pub fn new(index: Arc<dyn IndexService>, config: RankingConfig) -> Self {
        Self { index, config }
    }

    pub fn config(&self) -> &RankingConfig { &self.config }

    pub fn index(&self) -> &dyn IndexService { self.index.as_ref() }

    /// Best results for `text` using the route its shape selects.
    pub fn search(&self, text: &str) -> Vec<RankedResult> {
        let ranking = self.rank(text);
        let results = topk::select(self.index(), &ranking.scores, Some(self.config.max_results));
        tracing::debug!(route = ranking.route.name(), stages = ?ranking.stages, results = results.len(), "search");
        results
    }

    pub fn rank(&self, text: &str) -> Ranking {
        let query = QueryVector::parse(text);
        let route = Route::select(text, &query);
        let deadline = Deadline::from_timeout_ms(self.config.query_timeout_ms);
        match route {
            Route::Empty => Ranking { route, stages: Vec::new(), scores: ScoreMap::new() },
            // Title and authority only; no title hit means no results.
            Route::SingleTerm => self.single_term(&query),
            Route::Interrogative => {
                let scores = candidates::anchor_relationships(self.index(), &query, self.config.question_cap);
                Ranking { route, stages: vec![Stage::AnchorRelationships], scores }
            }
            Route::General => self.general(&query, &deadline),
        }
    }

    fn single_term(&self, query: &QueryVector) -> Ranking {
        let w = &self.config.single_term;
        let index = self.index();
        let by_title = candidates::title_authority(index, query, w.title_authority, self.config.title_cap);
        let title_tf = scoring::title_term_frequency(index, query, &by_title.candidates(), w.title_tf);
        let mut scores = topk::merge([&by_title, &title_tf]);
        authority::fuse(index, &mut scores, &self.config.authority);
        Ranking {
            route: Route::SingleTerm,
            stages: vec![Stage::TitleAuthority, Stage::TitleFrequency, Stage::Authority],
            scores,
        }
    }

    fn general(&self, query: &QueryVector, deadline: &Deadline) -> Ranking {
        let w = &self.config.general;
        let index = self.index();
        let mut stages = vec![Stage::TitleAuthority, Stage::AnchorOverlap, Stage::TitleFrequency, Stage::Bm25];

        let by_title = candidates::title_authority(index, query, w.title_authority, self.config.title_cap);
        let by_anchor = candidates::anchor_overlap(index, query, w.anchor, self.config.anchor_cap);
        let first_stage = candidates::union(&by_title, &by_anchor);
        let candidate_set = first_stage.candidates();

        let title_tf = scoring::title_term_frequency(index, query, &candidate_set, w.title_tf);
        let bm25 = scoring::bm25(index, query, &candidate_set, &self.config.bm25, w.bm25, deadline);
        let mut scores = topk::merge([&first_stage, &title_tf, &bm25]);
        if w.cosine > 0.0 {
            let cosine = scoring::cosine_tfidf(index, query, Some(&candidate_set), w.cosine, deadline);
            scores.merge(&cosine);
            stages.push(Stage::Cosine);
        }
        authority::fuse(index, &mut scores, &self.config.authority);
        stages.push(Stage::Authority);
        Ranking { route: Route::General, stages, scores }
    }

    /// Cosine TF-IDF over body text only, no candidate stage.
    pub fn search_body(&self, text: &str) -> Vec<RankedResult> {
        let query = QueryVector::parse(text);
        let deadline = Deadline::from_timeout_ms(self.config.query_timeout_ms);
        let scores = scoring::cosine_tfidf(self.index(), &query, None, 1.0, &deadline);
        topk::select(self.index(), &scores, Some(self.config.max_results))
    }

    /// Every document whose title holds a query term, by distinct terms matched.
    pub fn search_title(&self, text: &str) -> Vec<RankedResult> {
        self.search_field(Field::Title, text)
    }

    /// Every document whose anchor text holds a query term, by distinct terms matched.
    pub fn search_anchor(&self, text: &str) -> Vec<RankedResult> {
        self.search_field(Field::AnchorText, text)
    }

    fn search_field(&self, field: Field, text: &str) -> Vec<RankedResult> {
        let query = QueryVector::parse(text);
        let scores = candidates::distinct_term_matches(self.index(), field, &query);
        topk::select(self.index(), &scores, None)
    }

    pub fn page_ranks(&self, ids: &[DocId]) -> Vec<f64> {
        ids.iter().map(|&id| self.index.page_rank(id)).collect()
    }

    pub fn page_views(&self, ids: &[DocId]) -> Vec<u64> {
        ids.iter().map(|&id| self.index.page_views(id)).collect()
    }
}
