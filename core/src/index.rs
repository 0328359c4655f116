use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::corpus::{Corpus, RecordId};
use crate::error::{Error, Result};

pub type TokenId = u32;

/// Blocking index from n-gram token to the records containing it.
///
/// Tokens get ids in first-seen order; `postings[token_id]` holds record ids
/// in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub dictionary: HashMap<String, TokenId>,
    pub tokens: Vec<String>,
    pub postings: Vec<Vec<RecordId>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Build from a corpus, scanning records by ascending id.
    pub fn build(corpus: &Corpus) -> Result<Self> {
        let mut index = Self::new();
        for record in corpus.records() {
            for token in &record.tokens {
                index.insert(token, record.id)?;
            }
        }
        Ok(index)
    }

    fn insert(&mut self, token: &str, id: RecordId) -> Result<()> {
        let tid = match self.dictionary.get(token) {
            Some(&tid) => tid,
            None => {
                let tid = next_token_id(self.tokens.len())?;
                self.dictionary.insert(token.to_string(), tid);
                self.tokens.push(token.to_string());
                self.postings.push(Vec::new());
                tid
            }
        };
        let plist = &mut self.postings[tid as usize];
        // a record's token set has no duplicates, so only the tail can repeat
        if plist.last() != Some(&id) {
            plist.push(id);
        }
        Ok(())
    }

    pub fn get(&self, token: &str) -> Option<&[RecordId]> {
        let tid = *self.dictionary.get(token)?;
        self.postings.get(tid as usize).map(Vec::as_slice)
    }

    /// Buckets in token id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RecordId])> + '_ {
        self.tokens.iter().map(String::as_str).zip(self.postings.iter().map(Vec::as_slice))
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize { self.tokens.len() }

    pub fn is_empty(&self) -> bool { self.tokens.is_empty() }

    pub fn num_postings(&self) -> usize {
        self.postings.iter().map(Vec::len).sum()
    }

    pub fn largest_bucket(&self) -> usize {
        self.postings.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Total pairs scoring will emit: sum of C(k, 2) over buckets.
    pub fn candidate_count(&self) -> usize {
        self.postings.iter().map(|p| p.len() * p.len().saturating_sub(1) / 2).sum()
    }
}

fn next_token_id(len: usize) -> Result<TokenId> {
    TokenId::try_from(len)
        .map_err(|_| Error::InvalidConfig(format!("more than {} distinct tokens", TokenId::MAX)))
}

pub fn build_index(corpus: &Corpus) -> Result<InvertedIndex> {
    InvertedIndex::build(corpus)
}
