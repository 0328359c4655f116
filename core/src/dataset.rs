/// An in-memory table of optional text cells, addressed by row position.
///
/// Loading from files is left to callers; the corpus builder only needs the
/// column names and the cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Dataset {
    pub fn new<S: Into<String>>(name: S, columns: Vec<String>) -> Self {
        Self { name: name.into(), columns, rows: Vec::new() }
    }

    /// Append a row. Short rows are padded with `None`, extra cells are dropped.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn columns(&self) -> &[String] { &self.columns }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<String>]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }
}
