use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::PipelineConfig;
use crate::corpus::{Corpus, Origin};
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::events::{EventSink, PipelineEvent};
use crate::index::InvertedIndex;
use crate::scorer::{score_candidates_with, CandidatePair};
use crate::tokenizer::Tokenizer;

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct Linkage {
    pub corpus: Corpus,
    pub index: InvertedIndex,
    pub pairs: Vec<CandidatePair>,
}

/// datasets -> corpus -> index -> scored pairs, under one config and sink.
pub struct Pipeline<'s> {
    config: PipelineConfig,
    tokenizer: Tokenizer,
    pool: Option<ThreadPool>,
    sink: &'s dyn EventSink,
}

impl<'s> Pipeline<'s> {
    pub fn new(config: PipelineConfig, sink: &'s dyn EventSink) -> Result<Self> {
        config.validate()?;
        let tokenizer = config.tokenizer()?;
        let pool = match config.threads {
            Some(n) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| Error::InvalidConfig(format!("failed to build thread pool: {e}")))?,
            ),
            None => None,
        };
        Ok(Self { config, tokenizer, pool, sink })
    }

    pub fn config(&self) -> &PipelineConfig { &self.config }

    fn install<T: Send>(&self, f: impl FnOnce() -> T + Send) -> T {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }

    pub fn build_corpus(&self, left: &Dataset, right: &Dataset) -> Result<Corpus> {
        let corpus = self.install(|| Corpus::build(left, right, &self.tokenizer))?;
        self.sink.emit(PipelineEvent::CorpusBuilt {
            records: corpus.len(),
            left: corpus.count(Origin::Left),
            right: corpus.count(Origin::Right),
            untokenized: corpus.records().iter().filter(|r| r.tokens.is_empty()).count(),
        });
        Ok(corpus)
    }

    pub fn build_index(&self, corpus: &Corpus) -> Result<InvertedIndex> {
        let index = InvertedIndex::build(corpus)?;
        self.sink.emit(PipelineEvent::IndexBuilt {
            tokens: index.len(),
            postings: index.num_postings(),
            largest_bucket: index.largest_bucket(),
            candidates: index.candidate_count(),
        });
        Ok(index)
    }

    pub fn score(&self, corpus: &Corpus, index: &InvertedIndex) -> Vec<CandidatePair> {
        let sink = self.sink;
        self.install(|| score_candidates_with(corpus, index, sink))
    }

    pub fn run(&self, left: &Dataset, right: &Dataset) -> Result<Linkage> {
        let corpus = self.build_corpus(left, right)?;
        let index = self.build_index(&corpus)?;
        let pairs = self.score(&corpus, &index);
        Ok(Linkage { corpus, index, pairs })
    }
}
