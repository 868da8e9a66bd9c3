//! N-gram vocabulary and word-frequency matrix.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use bincode::{Decode, Encode};
use hashbrown::HashMap;
use log::debug;

use crate::errors::{PosgramError, Result};
use crate::records::{Column, RecordSet};
use crate::tagger::TaggedSentence;
use crate::tokenizer::tokenize_words;
use crate::utils::most_frequent;

const VECTORIZER_MAGIC: &str = "posgram-vectorizer-0.1\n";

/// One entry of an n-gram table.
#[derive(Clone, Debug, PartialEq)]
pub struct NgramRecord {
    pub text: String,

    /// Total occurrences over all records.
    pub frequency: usize,

    /// Most frequent tag sequence of the n-gram. Only set for tagged input.
    pub tags: Option<Vec<String>>,

    /// Ascending indices of the records containing the n-gram. `None` until enriched.
    pub ids: Option<Vec<usize>>,

    /// Aggregates of other columns over `ids`, keyed by output column name.
    pub aggregates: BTreeMap<String, Option<f64>>,
}

impl NgramRecord {
    pub fn new<S>(text: S, frequency: usize) -> Self
    where
        S: Into<String>,
    {
        Self {
            text: text.into(),
            frequency,
            tags: None,
            ids: None,
            aggregates: BTreeMap::new(),
        }
    }
}

/// Records × terms matrix in compressed sparse rows.
///
/// Row `i` is the record with index `i` of the record set the matrix was computed from. Terms are
/// sorted alphabetically.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WordFrequencyMatrix {
    terms: Vec<String>,
    /// Row `i` occupies `row_ptr[i]..row_ptr[i + 1]` of `col_idx` and `values`.
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl WordFrequencyMatrix {
    fn from_rows(terms: Vec<String>, rows: Vec<Vec<(usize, f64)>>) -> Self {
        let mut row_ptr = Vec::with_capacity(rows.len() + 1);
        let mut col_idx = vec![];
        let mut values = vec![];
        row_ptr.push(0);
        for row in rows {
            for (col, value) in row {
                col_idx.push(col);
                values.push(value);
            }
            row_ptr.push(col_idx.len());
        }
        Self {
            terms,
            row_ptr,
            col_idx,
            values,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.row_ptr.len().saturating_sub(1)
    }

    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.terms.binary_search_by(|t| t.as_str().cmp(term)).ok()
    }

    /// Iterates over the non-zero cells of a row as (column, value).
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.row_ptr[row];
        let end = self.row_ptr[row + 1];
        (start..end).map(move |i| (self.col_idx[i], self.values[i]))
    }

    /// Iterates over the non-zero cells of a column as (row, value).
    pub fn column(&self, col: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        (0..self.n_rows()).filter_map(move |row| {
            let v = self.get(row, col);
            (v != 0.0).then_some((row, v))
        })
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        let start = self.row_ptr[row];
        let end = self.row_ptr[row + 1];
        self.col_idx[start..end]
            .binary_search(&col)
            .map_or(0.0, |i| self.values[start + i])
    }
}

/// Learns an n-gram vocabulary and turns documents into [`WordFrequencyMatrix`] rows.
///
/// # Examples
///
/// ```
/// use posgram::NgramVectorizer;
///
/// let docs = vec![
///     vec!["a".to_string(), "b".to_string()],
///     vec!["a".to_string(), "c".to_string()],
/// ];
/// let mut vectorizer = NgramVectorizer::new(1, 1, 1000, false).unwrap();
/// let (ngrams, matrix) = vectorizer.fit_transform(&docs);
///
/// let freqs: Vec<_> = ngrams.iter().map(|r| (r.text.as_str(), r.frequency)).collect();
/// assert_eq!(vec![("a", 2), ("b", 1), ("c", 1)], freqs);
/// assert_eq!(vec![(0, 1.0), (1, 1.0)], matrix.row(0).collect::<Vec<_>>());
/// assert_eq!(vec![(0, 1.0), (2, 1.0)], matrix.row(1).collect::<Vec<_>>());
/// ```
#[derive(Clone, Debug, PartialEq, Decode, Encode)]
pub struct NgramVectorizer {
    min_gram: usize,
    max_gram: usize,
    max_features: usize,
    tfidf: bool,
    vocabulary: Vec<String>,
    idf: Vec<f64>,
}

type DocCounts = HashMap<String, usize>;

impl NgramVectorizer {
    /// Creates an unfitted vectorizer.
    ///
    /// # Errors
    ///
    /// This function will return an error variant when:
    ///
    /// * `min_gram` is 0 or greater than `max_gram`.
    /// * `max_features` is 0.
    pub fn new(min_gram: usize, max_gram: usize, max_features: usize, tfidf: bool) -> Result<Self> {
        if min_gram == 0 {
            return Err(PosgramError::invalid_argument("min_gram", "must be at least 1"));
        }
        if min_gram > max_gram {
            return Err(PosgramError::invalid_argument(
                "max_gram",
                format!("{max_gram} is smaller than min_gram {min_gram}"),
            ));
        }
        if max_features == 0 {
            return Err(PosgramError::invalid_argument(
                "max_features",
                "must be at least 1",
            ));
        }
        Ok(Self {
            min_gram,
            max_gram,
            max_features,
            tfidf,
            vocabulary: vec![],
            idf: vec![],
        })
    }

    /// Alphabetical vocabulary of the last fit.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub const fn tfidf(&self) -> bool {
        self.tfidf
    }

    fn for_each_ngram<T, F>(&self, words: &[T], mut f: F)
    where
        F: FnMut(usize, usize),
    {
        for n in self.min_gram..=self.max_gram {
            if n > words.len() {
                break;
            }
            for start in 0..=words.len() - n {
                f(start, start + n);
            }
        }
    }

    fn count(&self, words: &[String]) -> DocCounts {
        let mut counts = DocCounts::new();
        self.for_each_ngram(words, |start, end| {
            *counts.entry(words[start..end].join(" ")).or_insert(0) += 1;
        });
        counts
    }

    /// Learns the vocabulary from word streams.
    ///
    /// # Returns
    ///
    /// The kept n-grams ranked by frequency (descending, then alphabetically), and the matrix of
    /// `docs`.
    pub fn fit_transform(&mut self, docs: &[Vec<String>]) -> (Vec<NgramRecord>, WordFrequencyMatrix) {
        let doc_counts: Vec<DocCounts> = docs.iter().map(|words| self.count(words)).collect();
        self.fit_counts(doc_counts)
    }

    /// Learns the vocabulary from the words of tagged sentences. Each returned n-gram also carries
    /// its most frequent tag sequence.
    pub fn fit_transform_tagged(
        &mut self,
        docs: &[TaggedSentence],
    ) -> (Vec<NgramRecord>, WordFrequencyMatrix) {
        let mut doc_counts = Vec::with_capacity(docs.len());
        let mut tag_counts: HashMap<String, HashMap<Vec<String>, usize>> = HashMap::new();
        for doc in docs {
            let mut counts = DocCounts::new();
            self.for_each_ngram(doc, |start, end| {
                let pairs = &doc[start..end];
                let text = pairs
                    .iter()
                    .map(|(w, _)| w.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let tags = pairs.iter().map(|(_, t)| t.clone()).collect();
                *tag_counts
                    .entry(text.clone())
                    .or_default()
                    .entry(tags)
                    .or_insert(0) += 1;
                *counts.entry(text).or_insert(0) += 1;
            });
            doc_counts.push(counts);
        }
        let (mut ngrams, matrix) = self.fit_counts(doc_counts);
        for ngram in &mut ngrams {
            ngram.tags = tag_counts
                .get(&ngram.text)
                .and_then(most_frequent)
                .map(|(tags, _)| tags.clone());
        }
        (ngrams, matrix)
    }

    fn fit_counts(&mut self, doc_counts: Vec<DocCounts>) -> (Vec<NgramRecord>, WordFrequencyMatrix) {
        let mut totals = DocCounts::new();
        for counts in &doc_counts {
            for (text, &c) in counts {
                *totals.entry(text.clone()).or_insert(0) += c;
            }
        }
        let mut ranked: Vec<(String, usize)> = totals.into_iter().collect();
        ranked.sort_unstable_by(|(ta, fa), (tb, fb)| fb.cmp(fa).then_with(|| ta.cmp(tb)));
        let n_candidates = ranked.len();
        ranked.truncate(self.max_features);

        let mut vocabulary: Vec<String> = ranked.iter().map(|(t, _)| t.clone()).collect();
        vocabulary.sort_unstable();

        let n_docs = doc_counts.len() as f64;
        self.idf = vocabulary
            .iter()
            .map(|term| {
                let df = doc_counts.iter().filter(|c| c.contains_key(term)).count() as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.vocabulary = vocabulary;
        debug!(
            "Vocabulary: {} of {} candidate n-grams kept",
            self.vocabulary.len(),
            n_candidates,
        );

        let matrix = self.matrix(&doc_counts);
        let ngrams = ranked
            .into_iter()
            .map(|(text, frequency)| NgramRecord::new(text, frequency))
            .collect();
        (ngrams, matrix)
    }

    /// Computes the matrix of word streams with the fitted vocabulary. Unknown n-grams are
    /// ignored.
    pub fn transform(&self, docs: &[Vec<String>]) -> WordFrequencyMatrix {
        let doc_counts: Vec<DocCounts> = docs.iter().map(|words| self.count(words)).collect();
        self.matrix(&doc_counts)
    }

    fn matrix(&self, doc_counts: &[DocCounts]) -> WordFrequencyMatrix {
        let rows = doc_counts
            .iter()
            .map(|counts| {
                let mut row: Vec<(usize, f64)> = counts
                    .iter()
                    .filter_map(|(text, &c)| {
                        let col = self.vocabulary.binary_search(text).ok()?;
                        Some((col, c as f64))
                    })
                    .collect();
                row.sort_unstable_by_key(|&(col, _)| col);
                if self.tfidf {
                    for (col, v) in &mut row {
                        *v *= self.idf[*col];
                    }
                    let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
                    if norm > 0.0 {
                        for (_, v) in &mut row {
                            *v /= norm;
                        }
                    }
                }
                row
            })
            .collect();
        WordFrequencyMatrix::from_rows(self.vocabulary.clone(), rows)
    }

    /// Exports the fitted vectorizer.
    ///
    /// # Errors
    ///
    /// When bincode generates an error, it will be returned as is.
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        wtr.write_all(VECTORIZER_MAGIC.as_bytes())?;
        bincode::encode_into_std_write(self, &mut wtr, bincode::config::standard())?;
        Ok(())
    }

    /// Imports a fitted vectorizer.
    ///
    /// # Errors
    ///
    /// When bincode generates an error, it will be returned as is.
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut magic = [0; VECTORIZER_MAGIC.len()];
        rdr.read_exact(&mut magic)?;
        if magic != VECTORIZER_MAGIC.as_bytes() {
            return Err(PosgramError::invalid_model("unknown vectorizer file header"));
        }
        let vectorizer: Self = bincode::decode_from_std_read(&mut rdr, bincode::config::standard())?;
        if vectorizer.idf.len() != vectorizer.vocabulary.len() {
            return Err(PosgramError::invalid_model(
                "idf and vocabulary lengths differ",
            ));
        }
        Ok(vectorizer)
    }
}

/// Extracts the n-grams of a record set column.
///
/// With `pos_tuples`, the column must hold tagged sentences and n-grams are built over their
/// words; otherwise it must hold text, split with [`tokenize_words`].
///
/// # Errors
///
/// If the column is missing or has the wrong type, an error variant will be returned.
pub fn extract_ngrams(
    records: &RecordSet,
    column: &str,
    vectorizer: &mut NgramVectorizer,
    pos_tuples: bool,
) -> Result<(Vec<NgramRecord>, WordFrequencyMatrix)> {
    let result = if pos_tuples {
        vectorizer.fit_transform_tagged(records.tagged(column)?)
    } else {
        match records.column(column)? {
            Column::Text(texts) => {
                let docs: Vec<Vec<String>> = texts.iter().map(|t| tokenize_words(t)).collect();
                vectorizer.fit_transform(&docs)
            }
            _ => return Err(PosgramError::column_type(column, "text")),
        }
    };
    debug!(
        "Extracted {} n-grams from {} records",
        result.0.len(),
        records.n_rows()
    );
    Ok(result)
}
