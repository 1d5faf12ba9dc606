use crate::index::{AnchorLink, DocId, DocumentStats, Field, FieldIndex, MemoryIndex};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    #[serde(default)]
    pub avg_doc_len: f32,
    pub created_at: String,
    pub version: u32,
}

/// File layout of a table directory, typically a local mirror of the blob store.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn field(&self, field: Field) -> PathBuf {
        match field {
            Field::Body => self.root.join("body.bin"),
            Field::Title => self.root.join("title.bin"),
            Field::AnchorText => self.root.join("anchor_text.bin"),
        }
    }
    fn anchor_links(&self) -> PathBuf { self.root.join("anchor_links.bin") }
    fn doc_stats(&self) -> PathBuf { self.root.join("doc_stats.bin") }
    fn page_views(&self) -> PathBuf { self.root.join("pageviews.bin") }
    fn page_ranks(&self) -> PathBuf { self.root.join("pagerank.bin") }
    fn titles(&self) -> PathBuf { self.root.join("titles.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io { path: path.to_path_buf(), source }
}

fn write_table<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir).map_err(io_err(dir))?;
    }
    let f = File::create(path).map_err(io_err(path))?;
    let mut w = BufWriter::new(f);
    bincode::serialize_into(&mut w, value).map_err(|source| Error::Bincode { path: path.to_path_buf(), source })?;
    w.flush().map_err(io_err(path))?;
    Ok(())
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).map_err(io_err(path))?;
    bincode::deserialize_from(BufReader::new(f)).map_err(|source| Error::Bincode { path: path.to_path_buf(), source })
}

/// Tables without which some routes would silently return nothing are
/// required; the rest fall back to empty with a warning.
fn read_optional_table<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "optional table missing, using empty table");
        return Ok(T::default());
    }
    read_table(path)
}

pub fn save_field_index(paths: &IndexPaths, field: Field, table: &FieldIndex) -> Result<()> {
    write_table(&paths.field(field), table)
}

pub fn load_field_index(paths: &IndexPaths, field: Field) -> Result<FieldIndex> {
    read_table(&paths.field(field))
}

pub fn save_anchor_links(paths: &IndexPaths, links: &HashMap<String, Vec<AnchorLink>>) -> Result<()> {
    write_table(&paths.anchor_links(), links)
}

pub fn save_doc_stats(paths: &IndexPaths, stats: &HashMap<DocId, DocumentStats>) -> Result<()> {
    write_table(&paths.doc_stats(), stats)
}

pub fn save_page_views(paths: &IndexPaths, views: &HashMap<DocId, u64>) -> Result<()> {
    write_table(&paths.page_views(), views)
}

pub fn save_page_ranks(paths: &IndexPaths, ranks: &HashMap<DocId, f64>) -> Result<()> {
    write_table(&paths.page_ranks(), ranks)
}

pub fn save_titles(paths: &IndexPaths, titles: &HashMap<DocId, String>) -> Result<()> {
    write_table(&paths.titles(), titles)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root).map_err(io_err(&paths.root))?;
    let path = paths.meta();
    let json = serde_json::to_string_pretty(meta).map_err(|source| Error::Json { path: path.clone(), source })?;
    let mut f = File::create(&path).map_err(io_err(&path))?;
    f.write_all(json.as_bytes()).map_err(io_err(&path))?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let path = paths.meta();
    let mut f = File::open(&path).map_err(io_err(&path))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf).map_err(io_err(&path))?;
    serde_json::from_str(&buf).map_err(|source| Error::Json { path, source })
}

/// Load every table into memory. Called once at startup; the returned index
/// is never mutated afterwards.
pub fn load_index(paths: &IndexPaths) -> Result<MemoryIndex> {
    let meta = load_meta(paths)?;
    let body = load_field_index(paths, Field::Body)?;
    let title = load_field_index(paths, Field::Title)?;
    let titles: HashMap<DocId, String> = read_table(&paths.titles())?;
    let anchor_text: FieldIndex = read_optional_table(&paths.field(Field::AnchorText))?;
    let anchor_links: HashMap<String, Vec<AnchorLink>> = read_optional_table(&paths.anchor_links())?;
    let doc_stats: HashMap<DocId, DocumentStats> = read_optional_table(&paths.doc_stats())?;
    let page_views: HashMap<DocId, u64> = read_optional_table(&paths.page_views())?;
    let page_ranks: HashMap<DocId, f64> = read_optional_table(&paths.page_ranks())?;

    let index = MemoryIndex::builder()
        .field_index(Field::Body, body)
        .field_index(Field::Title, title)
        .field_index(Field::AnchorText, anchor_text)
        .anchor_links(anchor_links)
        .doc_stats(doc_stats)
        .titles(titles)
        .page_views(page_views)
        .page_ranks(page_ranks)
        .num_docs(meta.num_docs)
        .avg_doc_len(meta.avg_doc_len)
        .build();
    tracing::info!(
        root = %paths.root.display(),
        num_docs = meta.num_docs,
        version = meta.version,
        body_terms = index.num_terms(Field::Body),
        title_terms = index.num_terms(Field::Title),
        titles = index.num_titles(),
        "loaded index tables"
    );
    Ok(index)
}
