//! Structured progress events.
//!
//! The pipeline never logs through global state. Callers hand it an
//! [`EventSink`]; [`TracingSink`] forwards to `tracing`, [`CollectingSink`]
//! keeps events in memory.

use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    CorpusBuilt { records: usize, left: usize, right: usize, untokenized: usize },
    IndexBuilt { tokens: usize, postings: usize, largest_bucket: usize, candidates: usize },
    /// One bucket with at least two records was scored.
    BucketScored { token: String, size: usize, pairs: usize },
    /// `skipped` counts buckets holding a single record.
    ScoringFinished { buckets: usize, skipped: usize, pairs: usize },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: PipelineEvent) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::CorpusBuilt { records, left, right, untokenized } => {
                tracing::info!(records, left, right, untokenized, "built corpus");
            }
            PipelineEvent::IndexBuilt { tokens, postings, largest_bucket, candidates } => {
                tracing::info!(tokens, postings, largest_bucket, candidates, "built blocking index");
            }
            PipelineEvent::BucketScored { token, size, pairs } => {
                tracing::debug!(token = %token, size, pairs, "scored bucket");
            }
            PipelineEvent::ScoringFinished { buckets, skipped, pairs } => {
                tracing::info!(buckets, skipped, pairs, "scored candidate pairs");
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self { Self::default() }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize { self.events.lock().len() }

    pub fn is_empty(&self) -> bool { self.events.lock().is_empty() }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: PipelineEvent) {
        self.events.lock().push(event);
    }
}
