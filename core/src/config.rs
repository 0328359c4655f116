use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};
use crate::tokenizer::{Normalization, Tokenizer, DEFAULT_INDEX_NGRAM};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Window size for author-name tokens in the blocking index.
    pub ngram_size: usize,
    pub normalization: Normalization,
    /// Size of a dedicated rayon pool; `None` runs on the global pool.
    pub threads: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { ngram_size: DEFAULT_INDEX_NGRAM, normalization: Normalization::default(), threads: None }
    }
}

impl PipelineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path)?;
        let config: PipelineConfig = serde_json::from_reader(BufReader::new(f))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ngram_size == 0 {
            return Err(Error::InvalidConfig("ngram_size must be at least 1".into()));
        }
        if self.threads == Some(0) {
            return Err(Error::InvalidConfig("threads must be at least 1".into()));
        }
        Ok(())
    }

    pub fn tokenizer(&self) -> Result<Tokenizer> {
        Tokenizer::new(self.ngram_size, self.normalization)
    }
}
