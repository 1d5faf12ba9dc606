use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocId = u32;

/// Which posting table a lookup reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Body,
    Title,
    AnchorText,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub freq: u32,
}

/// One anchor relationship: `doc_id` carries anchor text pointing at `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorLink {
    pub doc_id: DocId,
    pub target: DocId,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Cosine normalization factor for the body vector.
    pub norm: f32,
    /// Body length in tokens.
    pub length: u32,
}

/// Postings and document frequencies for a single field.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FieldIndex {
    pub df: HashMap<String, u32>,
    pub postings: HashMap<String, Vec<Posting>>, // postings sorted by doc_id
}

impl FieldIndex {
    pub fn new() -> Self { Self::default() }

    pub fn postings(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn df(&self, term: &str) -> u32 {
        self.df.get(term).copied().unwrap_or(0)
    }
}

/// Read-only view over the corpus tables.
///
/// Every lookup is total: unknown terms give empty posting lists and a df of
/// 0, unknown ids give 0 for the authority tables and `None` for stats and
/// titles. Implementations are shared across query threads behind an `Arc`,
/// so all methods take `&self` and must never mutate.
pub trait IndexService: Send + Sync {
    fn num_docs(&self) -> u32;
    fn avg_doc_len(&self) -> f32;
    fn postings(&self, field: Field, term: &str) -> &[Posting];
    fn df(&self, field: Field, term: &str) -> u32;
    fn anchor_links(&self, term: &str) -> &[AnchorLink];
    fn doc_stats(&self, doc: DocId) -> Option<DocumentStats>;
    fn page_views(&self, doc: DocId) -> u64;
    fn page_rank(&self, doc: DocId) -> f64;
    fn title(&self, doc: DocId) -> Option<&str>;
}

/// All tables held in memory, populated once at startup.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    pub(crate) body: FieldIndex,
    pub(crate) title: FieldIndex,
    pub(crate) anchor_text: FieldIndex,
    pub(crate) anchor_links: HashMap<String, Vec<AnchorLink>>,
    pub(crate) doc_stats: HashMap<DocId, DocumentStats>,
    pub(crate) page_views: HashMap<DocId, u64>,
    pub(crate) page_ranks: HashMap<DocId, f64>,
    pub(crate) titles: HashMap<DocId, String>,
    pub(crate) num_docs: u32,
    pub(crate) avg_doc_len: f32,
}

impl MemoryIndex {
    pub fn builder() -> MemoryIndexBuilder { MemoryIndexBuilder::default() }

    fn field(&self, field: Field) -> &FieldIndex {
        match field {
            Field::Body => &self.body,
            Field::Title => &self.title,
            Field::AnchorText => &self.anchor_text,
        }
    }

    pub fn num_titles(&self) -> usize { self.titles.len() }

    pub fn num_terms(&self, field: Field) -> usize { self.field(field).postings.len() }
}

impl IndexService for MemoryIndex {
    fn num_docs(&self) -> u32 { self.num_docs }

    fn avg_doc_len(&self) -> f32 { self.avg_doc_len }

    fn postings(&self, field: Field, term: &str) -> &[Posting] {
        self.field(field).postings(term)
    }

    fn df(&self, field: Field, term: &str) -> u32 {
        self.field(field).df(term)
    }

    fn anchor_links(&self, term: &str) -> &[AnchorLink] {
        self.anchor_links.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    fn doc_stats(&self, doc: DocId) -> Option<DocumentStats> {
        self.doc_stats.get(&doc).copied()
    }

    fn page_views(&self, doc: DocId) -> u64 {
        self.page_views.get(&doc).copied().unwrap_or(0)
    }

    fn page_rank(&self, doc: DocId) -> f64 {
        self.page_ranks.get(&doc).copied().unwrap_or(0.0)
    }

    fn title(&self, doc: DocId) -> Option<&str> {
        self.titles.get(&doc).map(String::as_str)
    }
}

/// Assembles a [`MemoryIndex`] from individual entries.
///
/// Document frequencies are derived from the posting lists unless set
/// explicitly, and corpus size and average length come from the document
/// stats. Intended for loading and for small synthetic corpora in tests.
#[derive(Debug, Default)]
pub struct MemoryIndexBuilder {
    index: MemoryIndex,
    num_docs: Option<u32>,
    avg_doc_len: Option<f32>,
}

impl MemoryIndexBuilder {
    pub fn field_index(mut self, field: Field, table: FieldIndex) -> Self {
        match field {
            Field::Body => self.index.body = table,
            Field::Title => self.index.title = table,
            Field::AnchorText => self.index.anchor_text = table,
        }
        self
    }

    pub fn posting(mut self, field: Field, term: &str, doc_id: DocId, freq: u32) -> Self {
        let table = match field {
            Field::Body => &mut self.index.body,
            Field::Title => &mut self.index.title,
            Field::AnchorText => &mut self.index.anchor_text,
        };
        let list = table.postings.entry(term.to_string()).or_default();
        match list.iter_mut().find(|p| p.doc_id == doc_id) {
            Some(existing) => existing.freq = freq,
            None => {
                list.push(Posting { doc_id, freq });
                *table.df.entry(term.to_string()).or_insert(0) += 1;
            }
        }
        self
    }

    pub fn anchor_link(mut self, term: &str, doc_id: DocId, target: DocId) -> Self {
        self.index.anchor_links.entry(term.to_string()).or_default().push(AnchorLink { doc_id, target });
        self
    }

    pub fn anchor_links(mut self, links: HashMap<String, Vec<AnchorLink>>) -> Self {
        self.index.anchor_links = links;
        self
    }

    pub fn doc(mut self, doc_id: DocId, title: &str, norm: f32, length: u32) -> Self {
        self.index.titles.insert(doc_id, title.to_string());
        self.index.doc_stats.insert(doc_id, DocumentStats { norm, length });
        self
    }

    pub fn doc_stats(mut self, stats: HashMap<DocId, DocumentStats>) -> Self {
        self.index.doc_stats = stats;
        self
    }

    pub fn titles(mut self, titles: HashMap<DocId, String>) -> Self {
        self.index.titles = titles;
        self
    }

    pub fn page_views(mut self, views: HashMap<DocId, u64>) -> Self {
        self.index.page_views = views;
        self
    }

    pub fn page_view(mut self, doc_id: DocId, views: u64) -> Self {
        self.index.page_views.insert(doc_id, views);
        self
    }

    pub fn page_ranks(mut self, ranks: HashMap<DocId, f64>) -> Self {
        self.index.page_ranks = ranks;
        self
    }

    pub fn page_rank(mut self, doc_id: DocId, rank: f64) -> Self {
        self.index.page_ranks.insert(doc_id, rank);
        self
    }

    pub fn num_docs(mut self, n: u32) -> Self {
        self.num_docs = Some(n);
        self
    }

    pub fn avg_doc_len(mut self, avg: f32) -> Self {
        self.avg_doc_len = Some(avg);
        self
    }

    pub fn build(self) -> MemoryIndex {
        let mut index = self.index;
        for table in [&mut index.body, &mut index.title, &mut index.anchor_text] {
            for list in table.postings.values_mut() {
                list.sort_by_key(|p| p.doc_id);
            }
        }
        let stats_len = index.doc_stats.len() as u32;
        index.num_docs = self.num_docs.filter(|n| *n > 0).unwrap_or(stats_len);
        index.avg_doc_len = match self.avg_doc_len.filter(|avg| *avg > 0.0) {
            Some(avg) => avg,
            None if stats_len > 0 => {
                let total: u64 = index.doc_stats.values().map(|s| s.length as u64).sum();
                total as f32 / stats_len as f32
            }
            None => 0.0,
        };
        index
    }
}
