use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::corpus::{Corpus, RecordId};
use crate::events::{EventSink, NullSink, PipelineEvent};
use crate::index::InvertedIndex;

/// Two records sharing `token`, with `id_a < id_b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePair {
    pub token: String,
    pub id_a: RecordId,
    pub id_b: RecordId,
    pub score: f64,
}

/// Normalized Levenshtein similarity in [0, 1], rounded to two decimals.
/// Lengths count chars; two empty strings are identical.
pub fn score_lev_distance(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(a, b);
    round2(1.0 - distance as f64 / longest as f64)
}

/// Round the binary value of `x` to two decimals, ties to even.
fn round2(x: f64) -> f64 {
    let scaled = x * 100.0;
    let mut rounded = scaled.round_ties_even();
    if (scaled - scaled.trunc()).abs() == 0.5 {
        // the product may have landed on .5 by rounding; its residual tells
        // which side of the half the exact value lies on
        let residual = x.mul_add(100.0, -scaled);
        if residual > 0.0 {
            rounded = scaled.ceil();
        } else if residual < 0.0 {
            rounded = scaled.floor();
        }
    }
    rounded / 100.0
}

/// All pairs of one bucket, in combination order of their positions.
fn score_bucket(corpus: &Corpus, token: &str, ids: &[RecordId]) -> Vec<CandidatePair> {
    let mut pairs = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1) / 2);
    for (i, &id_a) in ids.iter().enumerate() {
        let Some(rec_a) = corpus.get(id_a) else { continue };
        for &id_b in &ids[i + 1..] {
            let Some(rec_b) = corpus.get(id_b) else { continue };
            pairs.push(CandidatePair {
                token: token.to_string(),
                id_a,
                id_b,
                score: score_lev_distance(rec_a.title_or_empty(), rec_b.title_or_empty()),
            });
        }
    }
    pairs
}

/// Score every pair inside every bucket of `index`.
///
/// Output follows index order, then combination order within a bucket. A
/// record pair sharing several tokens is emitted once per shared token; see
/// [`dedup_pairs`].
pub fn score_candidates(corpus: &Corpus, index: &InvertedIndex) -> Vec<CandidatePair> {
    score_candidates_with(corpus, index, &NullSink)
}

/// Like [`score_candidates`], reporting progress to `sink`. Buckets are scored
/// on the current rayon pool.
pub fn score_candidates_with(corpus: &Corpus, index: &InvertedIndex, sink: &dyn EventSink) -> Vec<CandidatePair> {
    let buckets: Vec<Vec<CandidatePair>> = index
        .tokens
        .par_iter()
        .zip(index.postings.par_iter())
        .filter(|(_, ids)| ids.len() >= 2)
        .map(|(token, ids)| {
            let pairs = score_bucket(corpus, token, ids);
            sink.emit(PipelineEvent::BucketScored { token: token.clone(), size: ids.len(), pairs: pairs.len() });
            pairs
        })
        .collect();

    let skipped = index.len() - buckets.len();
    let mut out = Vec::with_capacity(buckets.iter().map(Vec::len).sum());
    let scored = buckets.len();
    for bucket in buckets {
        out.extend(bucket);
    }
    sink.emit(PipelineEvent::ScoringFinished { buckets: scored, skipped, pairs: out.len() });
    out
}

/// Keep the first occurrence of each `(id_a, id_b)` pair.
pub fn dedup_pairs(pairs: Vec<CandidatePair>) -> Vec<CandidatePair> {
    let mut seen = HashSet::with_capacity(pairs.len());
    pairs.into_iter().filter(|p| seen.insert((p.id_a, p.id_b))).collect()
}
