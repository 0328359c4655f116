use anyhow::{Context, Result};
use linkage_core::persist::{load_snapshot, save_corpus, save_index, save_meta, IndexPaths, MetaFile};
use linkage_core::{dedup_pairs, CandidatePair, Corpus, EventSink, Pipeline, PipelineConfig};
use std::path::Path;

pub mod io;

const SNAPSHOT_VERSION: u32 = 1;

/// Post-scoring filters. A threshold here is whatever the caller passes in.
#[derive(Debug, Clone, Default)]
pub struct PairFilter {
    pub min_score: Option<f64>,
    /// Keep one row per record pair instead of one per shared token.
    pub dedup: bool,
    /// Drop pairs whose records come from the same input dataset.
    pub cross_only: bool,
}

impl PairFilter {
    pub fn apply(&self, corpus: &Corpus, mut pairs: Vec<CandidatePair>) -> Vec<CandidatePair> {
        if let Some(min) = self.min_score {
            pairs.retain(|p| p.score >= min);
        }
        if self.cross_only {
            pairs.retain(|p| corpus.is_cross_pair(p.id_a, p.id_b));
        }
        if self.dedup {
            pairs = dedup_pairs(pairs);
        }
        pairs
    }
}

/// Read both datasets, run the whole pipeline and write the surviving pairs.
pub fn link(
    left: &Path,
    right: &Path,
    output: &Path,
    config: PipelineConfig,
    filter: &PairFilter,
    sink: &dyn EventSink,
) -> Result<usize> {
    let left = io::read_dataset(left)?;
    let right = io::read_dataset(right)?;
    tracing::info!(left = left.len(), right = right.len(), "read datasets");

    let pipeline = Pipeline::new(config, sink)?;
    let linkage = pipeline.run(&left, &right)?;
    let pairs = filter.apply(&linkage.corpus, linkage.pairs);
    io::write_pairs(output, &pairs, &linkage.corpus)?;
    tracing::info!(pairs = pairs.len(), output = %output.display(), "wrote candidate pairs");
    Ok(pairs.len())
}

/// Tokenize and index both datasets, then save corpus, index and meta under `output`.
pub fn build_snapshot(
    left: &Path,
    right: &Path,
    output: &Path,
    config: PipelineConfig,
    sink: &dyn EventSink,
) -> Result<MetaFile> {
    let left = io::read_dataset(left)?;
    let right = io::read_dataset(right)?;

    let pipeline = Pipeline::new(config, sink)?;
    let corpus = pipeline.build_corpus(&left, &right)?;
    let index = pipeline.build_index(&corpus)?;

    let paths = IndexPaths::new(output);
    save_corpus(&paths, &corpus).context("failed to save corpus")?;
    save_index(&paths, &index).context("failed to save index")?;
    let meta = MetaFile {
        num_records: corpus.len() as u32,
        num_tokens: index.len() as u32,
        ngram_size: pipeline.config().ngram_size,
        normalization: pipeline.config().normalization,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .context("failed to format snapshot timestamp")?,
        version: SNAPSHOT_VERSION,
    };
    save_meta(&paths, &meta).context("failed to save meta")?;
    tracing::info!(output = %output.display(), "snapshot build complete");
    Ok(meta)
}

/// Score a saved snapshot without re-reading the datasets.
pub fn score_snapshot(
    index_dir: &Path,
    output: &Path,
    threads: Option<usize>,
    filter: &PairFilter,
    sink: &dyn EventSink,
) -> Result<usize> {
    let paths = IndexPaths::new(index_dir);
    let (corpus, index, meta) =
        load_snapshot(&paths).with_context(|| format!("failed to load snapshot from {}", index_dir.display()))?;
    if meta.version != SNAPSHOT_VERSION {
        anyhow::bail!("unsupported snapshot version {}", meta.version);
    }
    tracing::info!(records = meta.num_records, tokens = meta.num_tokens, "loaded snapshot");

    let config = PipelineConfig { ngram_size: meta.ngram_size, normalization: meta.normalization, threads };
    let pipeline = Pipeline::new(config, sink)?;
    let pairs = filter.apply(&corpus, pipeline.score(&corpus, &index));
    io::write_pairs(output, &pairs, &corpus)?;
    tracing::info!(pairs = pairs.len(), output = %output.display(), "wrote candidate pairs");
    Ok(pairs.len())
}
