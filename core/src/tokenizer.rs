use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Window size used when tokenizing author fields for the blocking index.
pub const DEFAULT_INDEX_NGRAM: usize = 10;
/// Window size used for ad-hoc inspection from the command line.
pub const DEFAULT_ADHOC_NGRAM: usize = 20;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w,]").expect("valid regex");
}

/// Sorted so that index construction visits tokens in a reproducible order.
pub type TokenSet = BTreeSet<String>;

/// How a segment is cleaned before n-grams are cut from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// NFKC, lowercase, then drop everything that is not a word character.
    #[default]
    Strip,
    /// Lowercase only; whitespace and punctuation stay part of the tokens.
    Preserve,
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalization::Strip => f.write_str("strip"),
            Normalization::Preserve => f.write_str("preserve"),
        }
    }
}

impl FromStr for Normalization {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strip" => Ok(Normalization::Strip),
            "preserve" => Ok(Normalization::Preserve),
            other => Err(format!("unknown normalization `{other}` (expected `strip` or `preserve`)")),
        }
    }
}

/// Character n-gram tokenizer for comma-separated name lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokenizer {
    n: usize,
    normalization: Normalization,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self { n: DEFAULT_INDEX_NGRAM, normalization: Normalization::default() }
    }
}

impl Tokenizer {
    pub fn new(n: usize, normalization: Normalization) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidConfig("n-gram size must be at least 1".into()));
        }
        Ok(Self { n, normalization })
    }

    pub fn n(&self) -> usize { self.n }

    pub fn normalization(&self) -> Normalization { self.normalization }

    /// Tokenize a possibly absent field. Each comma-separated name contributes
    /// its own n-grams; a name shorter than `n` is kept whole.
    pub fn tokenize(&self, text: Option<&str>) -> TokenSet {
        let mut tokens = TokenSet::new();
        let Some(text) = text else { return tokens };
        for segment in self.segments(text) {
            // nothing left after cleaning, e.g. a trailing comma
            if segment.is_empty() && self.normalization == Normalization::Strip {
                continue;
            }
            push_ngrams(&segment, self.n, &mut tokens);
        }
        tokens
    }

    fn segments(&self, text: &str) -> Vec<String> {
        match self.normalization {
            Normalization::Strip => {
                let normalized = text.nfkc().collect::<String>().to_lowercase();
                normalized
                    .split(',')
                    .map(|s| NON_WORD.replace_all(s, "").into_owned())
                    .collect()
            }
            Normalization::Preserve => text.to_lowercase().split(',').map(str::to_owned).collect(),
        }
    }
}

fn push_ngrams(segment: &str, n: usize, tokens: &mut TokenSet) {
    let chars: Vec<char> = segment.chars().collect();
    if chars.len() < n {
        tokens.insert(segment.to_string());
        return;
    }
    for window in chars.windows(n) {
        tokens.insert(window.iter().collect());
    }
}

/// Tokenize with the default (`Strip`) normalization. `n` below 1 is treated as 1.
pub fn tokenize(text: Option<&str>, n: usize) -> TokenSet {
    Tokenizer { n: n.max(1), normalization: Normalization::default() }.tokenize(text)
}
