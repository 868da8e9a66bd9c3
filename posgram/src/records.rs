//! Column-oriented record sets.

use crate::errors::{PosgramError, Result};
use crate::tagger::TaggedSentence;

/// Column of a [`RecordSet`].
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Text(Vec<String>),
    Tagged(Vec<TaggedSentence>),
    /// Numbers; `None` marks a missing cell.
    Numeric(Vec<Option<f64>>),
    List(Vec<Vec<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Self::Text(v) => v.len(),
            Self::Tagged(v) => v.len(),
            Self::Numeric(v) => v.len(),
            Self::List(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Tagged(_) => "tagged",
            Self::Numeric(_) => "numeric",
            Self::List(_) => "list",
        }
    }

    /// Formats the cell at `row` for tabular output.
    pub fn cell_string(&self, row: usize) -> String {
        match self {
            Self::Text(v) => v[row].clone(),
            Self::Tagged(v) => crate::tokenizer::format_tagged(&v[row]),
            Self::Numeric(v) => v[row].map_or_else(String::new, |x| x.to_string()),
            Self::List(v) => v[row].join(" "),
        }
    }
}

/// Table of named columns sharing one row count.
///
/// Row indices are the record identifiers the n-gram pipeline links back to, so rows are never
/// reordered or removed once the set is built.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordSet {
    n_rows: usize,
    columns: Vec<(String, Column)>,
}

impl RecordSet {
    /// Creates an empty record set with `n_rows` rows and no columns.
    pub const fn new(n_rows: usize) -> Self {
        Self {
            n_rows,
            columns: vec![],
        }
    }

    /// Creates a record set with a single text column.
    pub fn from_texts<S>(name: S, texts: Vec<String>) -> Self
    where
        S: Into<String>,
    {
        Self {
            n_rows: texts.len(),
            columns: vec![(name.into(), Column::Text(texts))],
        }
    }

    /// Creates a record set with a single tagged column.
    pub fn from_tagged<S>(name: S, sentences: Vec<TaggedSentence>) -> Self
    where
        S: Into<String>,
    {
        Self {
            n_rows: sentences.len(),
            columns: vec![(name.into(), Column::Tagged(sentences))],
        }
    }

    pub const fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Adds a column, replacing any column with the same name in place.
    ///
    /// # Errors
    ///
    /// If the column length differs from the row count, an error variant will be returned.
    pub fn push_column<S>(&mut self, name: S, column: Column) -> Result<()>
    where
        S: Into<String>,
    {
        let name = name.into();
        if column.len() != self.n_rows {
            return Err(PosgramError::invalid_argument(
                "column",
                format!(
                    "column {name:?} has {} rows, expected {}",
                    column.len(),
                    self.n_rows
                ),
            ));
        }
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, c)) => *c = column,
            None => self.columns.push((name, column)),
        }
        Ok(())
    }

    /// Gets a column by name.
    ///
    /// # Errors
    ///
    /// [`PosgramError::UnknownColumn`] if there is no such column.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find_map(|(n, c)| (n == name).then_some(c))
            .ok_or_else(|| PosgramError::UnknownColumn(name.to_string()))
    }

    pub fn text(&self, name: &str) -> Result<&[String]> {
        match self.column(name)? {
            Column::Text(v) => Ok(v),
            _ => Err(PosgramError::column_type(name, "text")),
        }
    }

    pub fn tagged(&self, name: &str) -> Result<&[TaggedSentence]> {
        match self.column(name)? {
            Column::Tagged(v) => Ok(v),
            _ => Err(PosgramError::column_type(name, "tagged")),
        }
    }

    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        match self.column(name)? {
            Column::Numeric(v) => Ok(v),
            _ => Err(PosgramError::column_type(name, "numeric")),
        }
    }

    pub fn list(&self, name: &str) -> Result<&[Vec<String>]> {
        match self.column(name)? {
            Column::List(v) => Ok(v),
            _ => Err(PosgramError::column_type(name, "list")),
        }
    }
}
