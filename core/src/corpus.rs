use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::tokenizer::{TokenSet, Tokenizer};

pub type RecordId = u32;

/// Which input dataset a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Position in the merged corpus.
    pub id: RecordId,
    pub origin: Origin,
    /// Row index inside the originating dataset.
    pub row: usize,
    /// Value of the dataset's own `id` column, when it has one.
    pub external_id: Option<String>,
    pub authors: Option<String>,
    pub title: Option<String>,
    pub tokens: TokenSet,
}

impl Record {
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

/// Arena of records. A record's id is its index into the arena.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    records: Vec<Record>,
}

struct Columns {
    id: Option<usize>,
    authors: usize,
    title: usize,
}

fn required_columns(ds: &Dataset) -> Result<Columns> {
    let missing = |field: &'static str| Error::InvalidInput { dataset: ds.name().to_string(), field };
    Ok(Columns {
        id: ds.column("id"),
        authors: ds.column("authors").ok_or_else(|| missing("authors"))?,
        title: ds.column("title").ok_or_else(|| missing("title"))?,
    })
}

impl Corpus {
    /// Concatenate `left` then `right`, tokenizing every `authors` cell.
    pub fn build(left: &Dataset, right: &Dataset, tokenizer: &Tokenizer) -> Result<Self> {
        let left_cols = required_columns(left)?;
        let right_cols = required_columns(right)?;

        let total = left.len() + right.len();
        if RecordId::try_from(total).is_err() {
            return Err(Error::InvalidConfig(format!("{total} records exceed the record id range")));
        }

        let rows: Vec<(Origin, &Dataset, &Columns, usize)> = (0..left.len())
            .map(|row| (Origin::Left, left, &left_cols, row))
            .chain((0..right.len()).map(|row| (Origin::Right, right, &right_cols, row)))
            .collect();

        let records = rows
            .into_par_iter()
            .enumerate()
            .map(|(pos, (origin, ds, cols, row))| {
                let authors = ds.value(row, cols.authors).map(str::to_owned);
                let tokens = tokenizer.tokenize(authors.as_deref());
                Record {
                    id: pos as RecordId,
                    origin,
                    row,
                    external_id: cols.id.and_then(|c| ds.value(row, c)).map(str::to_owned),
                    title: ds.value(row, cols.title).map(str::to_owned),
                    authors,
                    tokens,
                }
            })
            .collect();

        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] { &self.records }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id as usize)
    }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn count(&self, origin: Origin) -> usize {
        self.records.iter().filter(|r| r.origin == origin).count()
    }

    /// True when the two records come from different input datasets.
    pub fn is_cross_pair(&self, a: RecordId, b: RecordId) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(ra), Some(rb)) => ra.origin != rb.origin,
            _ => false,
        }
    }
}

/// Build a corpus with the default index tokenizer.
pub fn build_corpus(left: &Dataset, right: &Dataset) -> Result<Corpus> {
    Corpus::build(left, right, &Tokenizer::default())
}
