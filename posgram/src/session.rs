//! Analysis session: preprocessing, extraction, enrichment, search and aggregation over one
//! record set.

use hashbrown::HashMap;
use log::{info, warn};

use crate::enrich::{aggregate_mean, enrich_with_ids, filter_containing};
use crate::errors::{Outcome, PosgramError, Result};
use crate::ngram::{extract_ngrams, NgramRecord, NgramVectorizer, WordFrequencyMatrix};
use crate::records::RecordSet;

pub const CLEANED_COLUMN: &str = "Cleaned";
pub const HASHTAGS_COLUMN: &str = "Hashtags";
pub const MENTIONS_COLUMN: &str = "At Mentions";
pub const STEMMED_COLUMN: &str = "Stemmed";
pub const PREPROCESSED_COLUMN: &str = "Preprocessed";

/// Options passed to a [`Preprocessor`] on each run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreprocessOptions {
    /// Stemmer and stopword language, e.g. `english`.
    pub language: String,
    pub adhoc_stopwords: Vec<String>,
    /// The text column holds tagged sentences.
    pub pos_tuples: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            language: "english".to_string(),
            adhoc_stopwords: vec![],
            pos_tuples: false,
        }
    }
}

/// Text preprocessing used by [`NgramSession`].
pub trait Preprocessor {
    /// Adds the [`PREPROCESSED_COLUMN`] (and any intermediate columns) derived from
    /// `text_column`.
    ///
    /// Missing language resources should degrade the result rather than fail it.
    fn preprocess(
        &self,
        records: &mut RecordSet,
        text_column: &str,
        options: &PreprocessOptions,
    ) -> Result<Outcome<()>>;

    /// Stems a single search word the way [`Self::preprocess`] stems text.
    fn stem_word(&self, word: &str, language: &str) -> Outcome<String>;
}

/// Preprocessor copying the text column unchanged. It has no stemmer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl Preprocessor for Passthrough {
    fn preprocess(
        &self,
        records: &mut RecordSet,
        text_column: &str,
        _options: &PreprocessOptions,
    ) -> Result<Outcome<()>> {
        let column = records.column(text_column)?.clone();
        records.push_column(PREPROCESSED_COLUMN, column)?;
        Ok(Outcome::Complete(()))
    }

    fn stem_word(&self, word: &str, language: &str) -> Outcome<String> {
        Outcome::degraded(word.to_string(), format!("no stemmer for {language:?}"))
    }
}

/// Parameters of [`NgramSession::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub min_gram: usize,
    pub max_gram: usize,
    /// Extract from the [`PREPROCESSED_COLUMN`] instead of the raw text column.
    pub preprocess: bool,
    pub language: String,
    pub adhoc_stopwords: Vec<String>,
    pub max_features: usize,
    pub tfidf: bool,
    pub pos_tuples: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            min_gram: 2,
            max_gram: 4,
            preprocess: false,
            language: "english".to_string(),
            adhoc_stopwords: vec![],
            max_features: 1000,
            tfidf: true,
            pos_tuples: false,
        }
    }
}

impl RunConfig {
    pub fn preprocess_options(&self) -> PreprocessOptions {
        PreprocessOptions {
            language: self.language.clone(),
            adhoc_stopwords: self.adhoc_stopwords.clone(),
            pos_tuples: self.pos_tuples,
        }
    }
}

/// Printable n-gram table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NgramTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Working state of one n-gram analysis over a record set.
///
/// The session owns its records. Row order never changes, so the frequency matrix rows stay
/// aligned with the record identifiers for the session's lifetime.
///
/// # Examples
///
/// ```
/// use posgram::{NgramSession, RecordSet, RunConfig};
///
/// let records = RecordSet::from_texts("Snippet", vec!["a b".into(), "a c".into()]);
/// let mut session = NgramSession::new(records, "Snippet").unwrap();
/// session
///     .run(RunConfig {
///         min_gram: 1,
///         max_gram: 1,
///         tfidf: false,
///         ..RunConfig::default()
///     })
///     .unwrap();
/// session.enrich(false, 3).unwrap();
///
/// assert_eq!(1, session.search_on_word("b", false));
/// assert_eq!(Some(vec![0]), session.filtered().unwrap()[0].ids);
/// ```
pub struct NgramSession<P = Passthrough> {
    records: RecordSet,
    text_column: String,
    preprocessor: P,
    config: RunConfig,
    ngrams: Vec<NgramRecord>,
    filtered: Option<Vec<NgramRecord>>,
    matrix: WordFrequencyMatrix,
    vectorizer: Option<NgramVectorizer>,
    ids_enriched: bool,
    degraded: Vec<String>,
}

impl NgramSession<Passthrough> {
    /// Creates a session without text preprocessing.
    ///
    /// # Errors
    ///
    /// [`PosgramError::UnknownColumn`] if `text_column` does not exist.
    pub fn new<S>(records: RecordSet, text_column: S) -> Result<Self>
    where
        S: Into<String>,
    {
        Self::with_preprocessor(records, text_column, Passthrough)
    }
}

impl<P> NgramSession<P>
where
    P: Preprocessor,
{
    /// Creates a session preprocessing text with `preprocessor`.
    ///
    /// # Errors
    ///
    /// [`PosgramError::UnknownColumn`] if `text_column` does not exist.
    pub fn with_preprocessor<S>(records: RecordSet, text_column: S, preprocessor: P) -> Result<Self>
    where
        S: Into<String>,
    {
        let text_column = text_column.into();
        records.column(&text_column)?;
        Ok(Self {
            records,
            text_column,
            preprocessor,
            config: RunConfig::default(),
            ngrams: vec![],
            filtered: None,
            matrix: WordFrequencyMatrix::default(),
            vectorizer: None,
            ids_enriched: false,
            degraded: vec![],
        })
    }

    /// Computes the n-gram vocabulary and the frequency matrix.
    ///
    /// Replaces the previous results, drops the search subset and resets the enrichment state.
    /// Preprocessing always starts from the original text column, so repeated runs with the same
    /// configuration give the same results.
    ///
    /// # Errors
    ///
    /// On error the previous results are kept.
    pub fn run(&mut self, config: RunConfig) -> Result<Outcome<()>> {
        let mut vectorizer = NgramVectorizer::new(
            config.min_gram,
            config.max_gram,
            config.max_features,
            config.tfidf,
        )?;

        let mut reasons = vec![];
        let column = if config.preprocess {
            let outcome = self.preprocessor.preprocess(
                &mut self.records,
                &self.text_column,
                &config.preprocess_options(),
            )?;
            reasons = outcome.into_parts().1;
            for reason in &reasons {
                warn!("Preprocessing degraded: {reason}");
            }
            PREPROCESSED_COLUMN
        } else {
            self.text_column.as_str()
        };

        let (ngrams, matrix) =
            extract_ngrams(&self.records, column, &mut vectorizer, config.pos_tuples)?;
        info!(
            "Extracted {} n-grams ({}..={}) from {} records",
            ngrams.len(),
            config.min_gram,
            config.max_gram,
            self.records.n_rows(),
        );

        self.ngrams = ngrams;
        self.matrix = matrix;
        self.vectorizer = Some(vectorizer);
        self.filtered = None;
        self.ids_enriched = false;
        self.degraded = reasons.clone();
        self.config = config;
        Ok(if reasons.is_empty() {
            Outcome::Complete(())
        } else {
            Outcome::Degraded { value: (), reasons }
        })
    }

    /// Keeps the n-grams containing `word` as the filtered subset.
    ///
    /// With `stemmed`, `word` is stemmed first. This only finds anything if the n-grams were
    /// built from stemmed text.
    ///
    /// # Returns
    ///
    /// The number of matching n-grams.
    pub fn search_on_word(&mut self, word: &str, stemmed: bool) -> usize {
        let word = if stemmed {
            let outcome = self.preprocessor.stem_word(word, &self.config.language);
            for reason in outcome.reasons() {
                warn!("Searching unstemmed {word:?}: {reason}");
            }
            outcome.into_value()
        } else {
            word.to_string()
        };
        let found = filter_containing(&self.ngrams, &word);
        info!("{} n-grams contain {word:?}", found.len());
        let n = found.len();
        self.filtered = Some(found);
        n
    }

    /// Attaches record identifiers to the top `take_top_x` n-grams.
    ///
    /// With `filtered`, the search subset is enriched and the identifiers are copied onto the
    /// same n-grams of the full collection.
    ///
    /// # Errors
    ///
    /// If `filtered` is set and no search was done, an error variant will be returned.
    pub fn enrich(&mut self, filtered: bool, take_top_x: usize) -> Result<()> {
        if filtered {
            let subset = self.filtered.as_mut().ok_or_else(|| {
                PosgramError::invalid_argument("filtered", "no search result to enrich")
            })?;
            enrich_with_ids(subset, &self.matrix, take_top_x);
            let ids: HashMap<&str, &Vec<usize>> = subset
                .iter()
                .filter_map(|r| Some((r.text.as_str(), r.ids.as_ref()?)))
                .collect();
            for ngram in &mut self.ngrams {
                if let Some(&found) = ids.get(ngram.text.as_str()) {
                    ngram.ids = Some(found.clone());
                }
            }
        } else {
            enrich_with_ids(&mut self.ngrams, &self.matrix, take_top_x);
            if let Some(subset) = self.filtered.as_mut() {
                let ids: HashMap<&str, &Vec<usize>> = self
                    .ngrams
                    .iter()
                    .filter_map(|r| Some((r.text.as_str(), r.ids.as_ref()?)))
                    .collect();
                for ngram in subset {
                    if let Some(&found) = ids.get(ngram.text.as_str()) {
                        ngram.ids = Some(found.clone());
                    }
                }
            }
        }
        self.ids_enriched = true;
        info!("Enriched the top {take_top_x} n-grams with record identifiers");
        Ok(())
    }

    /// Stores the mean of a numeric column over each enriched n-gram's records as `new_column`.
    ///
    /// # Errors
    ///
    /// [`PosgramError::NotEnriched`] before [`Self::enrich`]. Nothing is changed in that case.
    pub fn aggregate_other_data_column(
        &mut self,
        column: &str,
        new_column: &str,
        filtered: bool,
    ) -> Result<()> {
        if !self.ids_enriched {
            warn!("Cannot aggregate {column:?}: enrich the n-grams first");
            return Err(PosgramError::NotEnriched);
        }
        let values = self.records.numeric(column)?;
        let target = if filtered {
            self.filtered.as_mut().ok_or_else(|| {
                PosgramError::invalid_argument("filtered", "no search result to aggregate")
            })?
        } else {
            &mut self.ngrams
        };
        aggregate_mean(target, values, new_column);
        info!("Aggregated {column:?} as {new_column:?}");
        Ok(())
    }

    /// Formats the n-grams (or the search subset) as a table.
    ///
    /// Columns are `Ngram`, `Frequency`, then `Tags` for tagged input, `Original Data Keys` once
    /// enriched, and one column per aggregate.
    pub fn table(&self, filtered: bool) -> NgramTable {
        let ngrams = match (filtered, &self.filtered) {
            (true, Some(subset)) => subset.as_slice(),
            (true, None) => &[],
            (false, _) => self.ngrams.as_slice(),
        };
        let with_tags = ngrams.iter().any(|r| r.tags.is_some());
        let mut aggregates: Vec<&str> = ngrams
            .iter()
            .flat_map(|r| r.aggregates.keys().map(String::as_str))
            .collect();
        aggregates.sort_unstable();
        aggregates.dedup();

        let mut header = vec!["Ngram".to_string(), "Frequency".to_string()];
        if with_tags {
            header.push("Tags".to_string());
        }
        if self.ids_enriched {
            header.push("Original Data Keys".to_string());
        }
        header.extend(aggregates.iter().map(|a| a.to_string()));

        let rows = ngrams
            .iter()
            .map(|r| {
                let mut row = vec![r.text.clone(), r.frequency.to_string()];
                if with_tags {
                    row.push(r.tags.as_deref().map_or_else(String::new, |t| t.join(" ")));
                }
                if self.ids_enriched {
                    row.push(r.ids.as_deref().map_or_else(String::new, |ids| {
                        ids.iter()
                            .map(usize::to_string)
                            .collect::<Vec<_>>()
                            .join(" ")
                    }));
                }
                for agg in &aggregates {
                    let value = r.aggregates.get(*agg).copied().flatten();
                    row.push(value.map_or_else(String::new, |v| v.to_string()));
                }
                row
            })
            .collect();
        NgramTable { header, rows }
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn text_column(&self) -> &str {
        &self.text_column
    }

    pub fn ngrams(&self) -> &[NgramRecord] {
        &self.ngrams
    }

    /// Result of the last search.
    pub fn filtered(&self) -> Option<&[NgramRecord]> {
        self.filtered.as_deref()
    }

    pub fn matrix(&self) -> &WordFrequencyMatrix {
        &self.matrix
    }

    /// Vectorizer fitted by the last run.
    pub fn vectorizer(&self) -> Option<&NgramVectorizer> {
        self.vectorizer.as_ref()
    }

    pub const fn ids_enriched(&self) -> bool {
        self.ids_enriched
    }

    /// Degradation reasons of the last run.
    pub fn degraded(&self) -> &[String] {
        &self.degraded
    }
}
