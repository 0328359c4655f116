use crate::{Corpus, Error, InvertedIndex, Normalization, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_records: u32,
    pub num_tokens: u32,
    pub ngram_size: usize,
    pub normalization: Normalization,
    pub created_at: String,
    pub version: u32,
}

/// Layout of a saved blocking snapshot.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn corpus(&self) -> PathBuf { self.root.join("corpus.bin") }
    fn index(&self) -> PathBuf { self.root.join("index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn write_bytes(path: PathBuf, bytes: &[u8]) -> Result<()> {
    let mut f = File::create(path)?;
    f.write_all(bytes)?;
    Ok(())
}

fn read_bytes(path: PathBuf) -> Result<Vec<u8>> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(buf)
}

pub fn save_corpus(paths: &IndexPaths, corpus: &Corpus) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bytes(paths.corpus(), &bincode::serialize(corpus)?)
}

pub fn load_corpus(paths: &IndexPaths) -> Result<Corpus> {
    Ok(bincode::deserialize(&read_bytes(paths.corpus())?)?)
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bytes(paths.index(), &bincode::serialize(index)?)
}

pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    Ok(bincode::deserialize(&read_bytes(paths.index())?)?)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(meta)?;
    write_bytes(paths.meta(), json.as_bytes())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Load everything `score` needs: corpus, index and meta.
pub fn load_snapshot(paths: &IndexPaths) -> Result<(Corpus, InvertedIndex, MetaFile)> {
    let meta = load_meta(paths)?;
    let corpus = load_corpus(paths)?;
    let index = load_index(paths)?;
    check_snapshot(&corpus, &index, &meta)?;
    Ok((corpus, index, meta))
}

fn check_snapshot(corpus: &Corpus, index: &InvertedIndex, meta: &MetaFile) -> Result<()> {
    if corpus.len() != meta.num_records as usize {
        return Err(Error::Snapshot(format!(
            "meta lists {} records, corpus holds {}",
            meta.num_records,
            corpus.len()
        )));
    }
    if index.len() != meta.num_tokens as usize || index.postings.len() != index.len() {
        return Err(Error::Snapshot(format!(
            "meta lists {} tokens, index holds {} tokens and {} postings lists",
            meta.num_tokens,
            index.len(),
            index.postings.len()
        )));
    }
    let records = corpus.len();
    if let Some(id) = index.postings.iter().flatten().find(|&&id| id as usize >= records) {
        return Err(Error::Snapshot(format!("index refers to record {id}, corpus holds {records}")));
    }
    Ok(())
}
