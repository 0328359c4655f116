//! Blocking and scoring for approximate record linkage of bibliographic data.
//!
//! Records from two datasets are merged into one [`Corpus`], their author
//! fields are cut into n-gram tokens, an [`InvertedIndex`] groups records
//! sharing a token, and every pair inside a bucket gets a normalized
//! Levenshtein score on its titles.

pub mod config;
pub mod corpus;
pub mod dataset;
pub mod error;
pub mod events;
pub mod index;
pub mod persist;
pub mod pipeline;
pub mod scorer;
pub mod tokenizer;

pub use config::PipelineConfig;
pub use corpus::{build_corpus, Corpus, Origin, Record, RecordId};
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use events::{CollectingSink, EventSink, NullSink, PipelineEvent, TracingSink};
pub use index::{build_index, InvertedIndex, TokenId};
pub use pipeline::{Linkage, Pipeline};
pub use scorer::{dedup_pairs, score_candidates, score_candidates_with, score_lev_distance, CandidatePair};
pub use tokenizer::{tokenize, Normalization, TokenSet, Tokenizer, DEFAULT_ADHOC_NGRAM, DEFAULT_INDEX_NGRAM};
