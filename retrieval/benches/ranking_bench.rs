use criterion::{criterion_group, criterion_main, Criterion};
use retrieval::{Field, MemoryIndex, RankingConfig, SearchEngine};
use std::sync::Arc;

const TERMS: &[&str] = &["river", "delta", "basin", "flood", "estuari", "tributari", "sediment", "valley"];

/// Body postings span the whole corpus; titles and anchors hit a small slice.
fn synthetic_index(num_docs: u32) -> MemoryIndex {
    let mut b = MemoryIndex::builder();
    for doc in 0..num_docs {
        b = b.doc(doc, &format!("Article {doc}"), 1.0 / (1.0 + (doc % 17) as f32), 50 + doc % 400);
        for (i, term) in TERMS.iter().enumerate() {
            if (doc as usize + i) % 3 != 0 {
                b = b.posting(Field::Body, term, doc, 1 + (doc + i as u32) % 9);
            }
            if doc % 97 == i as u32 {
                b = b.posting(Field::Title, term, doc, 1);
            }
            if doc % 41 == i as u32 {
                b = b.posting(Field::AnchorText, term, doc, 1 + doc % 3);
            }
        }
        if doc % 5 == 0 {
            b = b.page_view(doc, (doc as u64 * 31) % 10_000).page_rank(doc, (doc % 13) as f64);
        }
    }
    b.build()
}

fn bench_search(c: &mut Criterion) {
    let engine = SearchEngine::new(Arc::new(synthetic_index(50_000)), RankingConfig::default());
    c.bench_function("search_general", |b| b.iter(|| engine.search("river delta sediment")));
    c.bench_function("search_single_term", |b| b.iter(|| engine.search("flood")));
    c.bench_function("search_body_cosine", |b| b.iter(|| engine.search_body("river basin")));
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
