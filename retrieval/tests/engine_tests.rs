use retrieval::{
    AnchorLink, DocId, DocumentStats, Field, IndexService, MemoryIndex, Posting, RankingConfig, Route, SearchEngine,
    Stage,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Small encyclopedia: three river articles, one about a city, one about a band.
fn corpus() -> MemoryIndex {
    MemoryIndex::builder()
        .doc(10, "Amazon River", 0.4, 120)
        .doc(11, "River", 0.5, 80)
        .doc(12, "Nile", 0.3, 300)
        .doc(13, "Manaus", 0.6, 90)
        .doc(14, "Amazon Basin Band", 0.7, 60)
        // titles
        .posting(Field::Title, "amazon", 10, 1)
        .posting(Field::Title, "river", 10, 1)
        .posting(Field::Title, "river", 11, 1)
        .posting(Field::Title, "nile", 12, 1)
        .posting(Field::Title, "manaus", 13, 1)
        .posting(Field::Title, "amazon", 14, 1)
        .posting(Field::Title, "basin", 14, 1)
        // body
        .posting(Field::Body, "amazon", 10, 12)
        .posting(Field::Body, "amazon", 13, 4)
        .posting(Field::Body, "amazon", 14, 1)
        .posting(Field::Body, "river", 10, 9)
        .posting(Field::Body, "river", 11, 6)
        .posting(Field::Body, "river", 12, 7)
        .posting(Field::Body, "basin", 10, 3)
        .posting(Field::Body, "basin", 14, 2)
        .posting(Field::Body, "delta", 12, 4)
        // anchor text
        .posting(Field::AnchorText, "river", 12, 5)
        .posting(Field::AnchorText, "amazon", 13, 1)
        .posting(Field::AnchorText, "delta", 12, 2)
        // anchor relationships
        .anchor_link("largest", 10, 13)
        .anchor_link("river", 10, 13)
        .anchor_link("river", 12, 20)
        .page_view(10, 9000)
        .page_view(12, 3000)
        .page_rank(10, 3.5)
        .page_rank(11, 0.5)
        .build()
}

fn engine() -> SearchEngine {
    SearchEngine::new(Arc::new(corpus()), RankingConfig::default())
}

fn ids(results: &[retrieval::RankedResult]) -> Vec<DocId> {
    results.iter().map(|r| r.doc_id).collect()
}

#[test]
fn empty_and_stopword_queries_return_nothing() {
    let e = engine();
    for q in ["", "   ", "the of and", "who is the?"] {
        assert!(e.search(q).is_empty(), "search({q:?})");
        assert!(e.search_body(q).is_empty(), "search_body({q:?})");
        assert!(e.search_title(q).is_empty(), "search_title({q:?})");
        assert!(e.search_anchor(q).is_empty(), "search_anchor({q:?})");
    }
}

#[test]
fn general_route_fuses_all_stages() {
    let e = engine();
    let ranking = e.rank("amazon river");
    assert_eq!(ranking.route, Route::General);
    assert_eq!(
        ranking.stages,
        vec![Stage::TitleAuthority, Stage::AnchorOverlap, Stage::TitleFrequency, Stage::Bm25, Stage::Authority]
    );
    let results = e.search("amazon river");
    assert_eq!(results[0].doc_id, 10);
    assert_eq!(results[0].title, "Amazon River");
}

#[test]
fn results_never_exceed_distinct_documents_touched() {
    let e = engine();
    let ranking = e.rank("amazon river basin");
    let results = e.search("amazon river basin");
    assert!(results.len() <= ranking.scores.len());
    assert!(results.len() <= 100);
    let mut unique = ids(&results);
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), results.len());
}

#[test]
fn result_count_is_capped() {
    let mut b = MemoryIndex::builder();
    for doc in 0..400u32 {
        b = b.doc(doc, &format!("Lake {doc}"), 1.0, 10).posting(Field::Title, "lake", doc, 1);
    }
    let e = SearchEngine::new(Arc::new(b.build()), RankingConfig::default());
    assert_eq!(e.search("lake").len(), 100);
    assert_eq!(e.search_title("lake").len(), 400);
}

#[test]
fn repeated_queries_are_identical() {
    let e = engine();
    for q in ["amazon river", "amazon", "largest river?", "basin amazon nile"] {
        assert_eq!(e.search(q), e.search(q), "{q}");
    }
}

#[test]
fn title_ranking_orders_by_distinct_matches() {
    let index = MemoryIndex::builder()
        .doc(1, "Green Lantern", 1.0, 10)
        .doc(2, "Green Arrow", 1.0, 10)
        .doc(3, "Batman", 1.0, 10)
        .posting(Field::Title, "green", 2, 1)
        .posting(Field::Title, "green", 1, 1)
        .posting(Field::Title, "lantern", 1, 1)
        .posting(Field::Title, "batman", 3, 1)
        .build();
    let e = SearchEngine::new(Arc::new(index), RankingConfig::default());
    let results = e.search_title("green lantern");
    assert_eq!(ids(&results), vec![1, 2]);
    assert!(!ids(&results).contains(&3));
}

#[test]
fn anchor_ranking_counts_distinct_terms() {
    let e = engine();
    let results = e.search_anchor("amazon river");
    assert_eq!(ids(&results), vec![13, 12]);
}

#[test]
fn single_term_without_authority_data_ranks_by_title_signal() {
    let index = MemoryIndex::builder()
        .doc(1, "ngrok", 1.0, 10)
        .doc(2, "ngrok ngrok tunnels", 1.0, 10)
        .posting(Field::Title, "ngrok", 1, 1)
        .posting(Field::Title, "ngrok", 2, 2)
        .build();
    let e = SearchEngine::new(Arc::new(index), RankingConfig::default());
    let ranking = e.rank("ngrok");
    assert_eq!(ranking.route, Route::SingleTerm);
    assert!(!ranking.stages.contains(&Stage::Bm25));
    let auth = retrieval::authority::authority_scores(e.index(), &ranking.scores, &e.config().authority);
    assert!(auth.iter().all(|(_, s)| s == 0.0));
    // equal title authority, doc 2 repeats the term in its title
    assert_eq!(ids(&e.search("ngrok")), vec![2, 1]);
}

#[test]
fn single_term_without_title_matches_stays_off_the_body() {
    let index = Arc::new(CountingIndex { inner: corpus(), body_reads: AtomicUsize::new(0) });
    let e = SearchEngine::new(index.clone(), RankingConfig::default());

    // "delta" only appears in body and anchor text
    for text in ["delta", "delta?"] {
        let ranking = e.rank(text);
        assert_eq!(ranking.route, Route::SingleTerm, "{text}");
        assert!(!ranking.stages.contains(&Stage::Bm25), "{text}");
        assert!(ranking.scores.is_empty(), "{text}");
        assert!(e.search(text).is_empty(), "{text}");
    }
    assert_eq!(index.body_reads.load(Ordering::SeqCst), 0);
}

#[test]
fn page_signals_default_to_zero() {
    let e = engine();
    assert_eq!(e.page_ranks(&[10, 11, 999]), vec![3.5, 0.5, 0.0]);
    assert_eq!(e.page_views(&[12, 999]), vec![3000, 0]);
    assert!(e.page_views(&[]).is_empty());
}

#[test]
fn body_search_uses_cosine_only() {
    let e = engine();
    let results = e.search_body("basin");
    // idf is identical for both, doc 14 has the larger stored norm
    assert_eq!(ids(&results), vec![14, 10]);
}

/// Wraps an index and counts body posting reads.
struct CountingIndex {
    inner: MemoryIndex,
    body_reads: AtomicUsize,
}

impl IndexService for CountingIndex {
    fn num_docs(&self) -> u32 { self.inner.num_docs() }
    fn avg_doc_len(&self) -> f32 { self.inner.avg_doc_len() }
    fn postings(&self, field: Field, term: &str) -> &[Posting] {
        if field == Field::Body {
            self.body_reads.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.postings(field, term)
    }
    fn df(&self, field: Field, term: &str) -> u32 { self.inner.df(field, term) }
    fn anchor_links(&self, term: &str) -> &[AnchorLink] { self.inner.anchor_links(term) }
    fn doc_stats(&self, doc: DocId) -> Option<DocumentStats> { self.inner.doc_stats(doc) }
    fn page_views(&self, doc: DocId) -> u64 { self.inner.page_views(doc) }
    fn page_rank(&self, doc: DocId) -> f64 { self.inner.page_rank(doc) }
    fn title(&self, doc: DocId) -> Option<&str> { self.inner.title(doc) }
}

#[test]
fn interrogative_queries_never_read_body_postings() {
    let index = Arc::new(CountingIndex { inner: corpus(), body_reads: AtomicUsize::new(0) });
    let e = SearchEngine::new(index.clone(), RankingConfig::default());

    let ranking = e.rank("largest river?");
    assert_eq!(ranking.route, Route::Interrogative);
    assert_eq!(ranking.stages, vec![Stage::AnchorRelationships]);
    let results = e.search("largest river?");
    assert_eq!(results[0].doc_id, 10);
    assert_eq!(index.body_reads.load(Ordering::SeqCst), 0);

    e.search("amazon river");
    assert!(index.body_reads.load(Ordering::SeqCst) > 0);
}

#[test]
fn engine_is_shareable_across_threads() {
    let e = engine();
    let expected = e.search("amazon river");
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let e = e.clone();
            std::thread::spawn(move || e.search("amazon river"))
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}
