//! Text preprocessing for posgram.
//!
//! [`BasicPreprocessor`] adds the `Cleaned`, `Hashtags`, `At Mentions`, `Stemmed` and
//! `Preprocessed` columns to a record set. The building blocks are exported for use on their
//! own.

mod cleaning;
mod social;
mod stemming;
mod stopwords;

use hashbrown::HashSet;
use log::info;
use posgram::{
    Column, Outcome, PreprocessOptions, Preprocessor, RecordSet, Result, TaggedSentence,
    CLEANED_COLUMN, HASHTAGS_COLUMN, MENTIONS_COLUMN, PREPROCESSED_COLUMN, STEMMED_COLUMN,
};
use rust_stemmers::Stemmer;

pub use cleaning::{clean_text, clean_token};
pub use social::{extract_hashtags, extract_mentions, remove_hashtags, remove_mentions};
pub use stemming::{algorithm_for, stem_text};
pub use stopwords::{builtin_stopwords, remove_stopwords};

/// Cleaning, stemming and stopword removal.
///
/// # Examples
///
/// ```
/// use posgram::{NgramSession, RecordSet, RunConfig};
/// use posgram_preprocess::BasicPreprocessor;
///
/// let records = RecordSet::from_texts(
///     "Snippet",
///     vec!["@bob The cats are chasing mice!".into(), "Cats chasing #birds".into()],
/// );
/// let mut session =
///     NgramSession::with_preprocessor(records, "Snippet", BasicPreprocessor::new()).unwrap();
/// session
///     .run(RunConfig {
///         preprocess: true,
///         ..RunConfig::default()
///     })
///     .unwrap();
///
/// assert_eq!("cat chase", session.ngrams()[0].text);
/// assert_eq!(5, session.search_on_word("chasing", true));
/// ```
#[derive(Clone, Debug)]
pub struct BasicPreprocessor {
    remove_hashtag_words: bool,
    remove_mentioned_authors: bool,
    stopped_not_stemmed: bool,
}

impl BasicPreprocessor {
    /// Creates a preprocessor removing mentioned users and keeping hashtag words.
    pub const fn new() -> Self {
        Self {
            remove_hashtag_words: false,
            remove_mentioned_authors: true,
            stopped_not_stemmed: false,
        }
    }

    /// Removes `#hashtags` together with their words before cleaning.
    pub const fn remove_hashtag_words(mut self, flag: bool) -> Self {
        self.remove_hashtag_words = flag;
        self
    }

    /// Removes `@mentions` before cleaning.
    pub const fn remove_mentioned_authors(mut self, flag: bool) -> Self {
        self.remove_mentioned_authors = flag;
        self
    }

    /// Builds the preprocessed text from the cleaned text instead of the stemmed text.
    pub const fn stopped_not_stemmed(mut self, flag: bool) -> Self {
        self.stopped_not_stemmed = flag;
        self
    }

    fn preprocess_texts(
        &self,
        records: &mut RecordSet,
        text_column: &str,
        stemmer: Option<&Stemmer>,
        stopwords: Option<&HashSet<String>>,
    ) -> Result<()> {
        let texts = records.text(text_column)?;
        let hashtags: Vec<_> = texts.iter().map(|t| extract_hashtags(t)).collect();
        let mentions: Vec<_> = texts.iter().map(|t| extract_mentions(t)).collect();
        let cleaned: Vec<_> = texts
            .iter()
            .map(|t| {
                let mut t = t.clone();
                if self.remove_hashtag_words {
                    t = remove_hashtags(&t);
                }
                if self.remove_mentioned_authors {
                    t = remove_mentions(&t);
                }
                clean_text(&t)
            })
            .collect();
        info!("Cleaned text");

        let stemmed: Vec<_> = match stemmer {
            Some(stemmer) => cleaned.iter().map(|t| stem_text(stemmer, t)).collect(),
            None => cleaned.clone(),
        };
        let base = if self.stopped_not_stemmed {
            &cleaned
        } else {
            &stemmed
        };
        let preprocessed: Vec<_> = match stopwords {
            Some(stopwords) => base.iter().map(|t| remove_stopwords(t, stopwords)).collect(),
            None => base.clone(),
        };

        records.push_column(HASHTAGS_COLUMN, Column::List(hashtags))?;
        records.push_column(MENTIONS_COLUMN, Column::List(mentions))?;
        records.push_column(CLEANED_COLUMN, Column::Text(cleaned))?;
        records.push_column(STEMMED_COLUMN, Column::Text(stemmed))?;
        records.push_column(PREPROCESSED_COLUMN, Column::Text(preprocessed))?;
        Ok(())
    }

    fn preprocess_tagged(
        &self,
        records: &mut RecordSet,
        text_column: &str,
        stemmer: Option<&Stemmer>,
        stopwords: Option<&HashSet<String>>,
    ) -> Result<()> {
        let cleaned: Vec<TaggedSentence> = records
            .tagged(text_column)?
            .iter()
            .map(|sent| {
                sent.iter()
                    .map(|(w, t)| (clean_token(w), t.clone()))
                    .filter(|(w, _)| !w.is_empty())
                    .collect()
            })
            .collect();
        info!("Cleaned tagged text");

        let stemmed: Vec<TaggedSentence> = match stemmer {
            Some(stemmer) => cleaned
                .iter()
                .map(|sent| {
                    sent.iter()
                        .map(|(w, t)| (stemmer.stem(w).into_owned(), t.clone()))
                        .collect()
                })
                .collect(),
            None => cleaned.clone(),
        };
        let base = if self.stopped_not_stemmed {
            &cleaned
        } else {
            &stemmed
        };
        let preprocessed: Vec<TaggedSentence> = match stopwords {
            Some(stopwords) => base
                .iter()
                .map(|sent| {
                    sent.iter()
                        .filter(|(w, _)| !stopwords.contains(w))
                        .cloned()
                        .collect()
                })
                .collect(),
            None => base.clone(),
        };

        records.push_column(CLEANED_COLUMN, Column::Tagged(cleaned))?;
        records.push_column(STEMMED_COLUMN, Column::Tagged(stemmed))?;
        records.push_column(PREPROCESSED_COLUMN, Column::Tagged(preprocessed))?;
        Ok(())
    }
}

impl Default for BasicPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor for BasicPreprocessor {
    fn preprocess(
        &self,
        records: &mut RecordSet,
        text_column: &str,
        options: &PreprocessOptions,
    ) -> Result<Outcome<()>> {
        let mut reasons = vec![];
        let stemmer = algorithm_for(&options.language).map(Stemmer::create);
        if stemmer.is_none() {
            reasons.push(format!(
                "no stemmer for {:?}, text not stemmed",
                options.language
            ));
        }
        let stopwords = builtin_stopwords(&options.language).map(|mut set| {
            set.extend(options.adhoc_stopwords.iter().cloned());
            set
        });
        if stopwords.is_none() {
            reasons.push(format!(
                "no stopwords for {:?}, stopwords not removed",
                options.language
            ));
        }

        if options.pos_tuples {
            self.preprocess_tagged(records, text_column, stemmer.as_ref(), stopwords.as_ref())?;
        } else {
            self.preprocess_texts(records, text_column, stemmer.as_ref(), stopwords.as_ref())?;
        }
        info!("Preprocessed {:?} into {:?}", text_column, PREPROCESSED_COLUMN);

        Ok(if reasons.is_empty() {
            Outcome::Complete(())
        } else {
            Outcome::Degraded { value: (), reasons }
        })
    }

    fn stem_word(&self, word: &str, language: &str) -> Outcome<String> {
        let word = clean_token(word);
        match algorithm_for(language) {
            Some(algorithm) => Outcome::Complete(Stemmer::create(algorithm).stem(&word).into_owned()),
            None => Outcome::degraded(word, format!("no stemmer for {language:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use posgram::{NgramSession, RunConfig};

    fn records(texts: &[&str]) -> RecordSet {
        RecordSet::from_texts("Snippet", texts.iter().map(|t| t.to_string()).collect())
    }

    fn english() -> PreprocessOptions {
        PreprocessOptions {
            language: "english".into(),
            ..PreprocessOptions::default()
        }
    }

    #[test]
    fn test_preprocess_text_columns() {
        let mut rs = records(&["@ann The dogs are barking at #Cats!"]);
        let outcome = BasicPreprocessor::new()
            .preprocess(&mut rs, "Snippet", &english())
            .unwrap();
        assert_eq!(Outcome::Complete(()), outcome);
        assert_eq!(
            &["the dogs are barking at cats".to_string()],
            rs.text(CLEANED_COLUMN).unwrap()
        );
        assert_eq!(&[vec!["#Cats".to_string()]], rs.list(HASHTAGS_COLUMN).unwrap());
        assert_eq!(&[vec!["@ann".to_string()]], rs.list(MENTIONS_COLUMN).unwrap());
        assert_eq!(
            &["the dog are bark at cat".to_string()],
            rs.text(STEMMED_COLUMN).unwrap()
        );
        assert_eq!(
            &["dog bark cat".to_string()],
            rs.text(PREPROCESSED_COLUMN).unwrap()
        );
    }

    #[test]
    fn test_flags_and_adhoc_stopwords() {
        let mut rs = records(&["@ann The dogs are barking at #Cats!"]);
        let options = PreprocessOptions {
            adhoc_stopwords: vec!["dogs".into()],
            ..english()
        };
        BasicPreprocessor::new()
            .remove_hashtag_words(true)
            .remove_mentioned_authors(false)
            .stopped_not_stemmed(true)
            .preprocess(&mut rs, "Snippet", &options)
            .unwrap();
        assert_eq!(
            &["ann the dogs are barking at".to_string()],
            rs.text(CLEANED_COLUMN).unwrap()
        );
        assert_eq!(
            &["ann barking".to_string()],
            rs.text(PREPROCESSED_COLUMN).unwrap()
        );
    }

    #[test]
    fn test_unknown_language_degrades() {
        let mut rs = records(&["The Dogs"]);
        let options = PreprocessOptions {
            language: "klingon".into(),
            ..PreprocessOptions::default()
        };
        let outcome = BasicPreprocessor::new()
            .preprocess(&mut rs, "Snippet", &options)
            .unwrap();
        assert!(outcome.is_degraded());
        assert_eq!(2, outcome.reasons().len());
        assert_eq!(&["the dogs".to_string()], rs.text(PREPROCESSED_COLUMN).unwrap());
    }

    #[test]
    fn test_preprocess_tagged() {
        let sent: TaggedSentence = [("The", "OT"), ("Dogs", "NN"), ("barked", "VB"), ("!", ".")]
            .iter()
            .map(|(w, t)| (w.to_string(), t.to_string()))
            .collect();
        let mut rs = RecordSet::from_tagged("Tagged", vec![sent]);
        let options = PreprocessOptions {
            pos_tuples: true,
            ..english()
        };
        BasicPreprocessor::new()
            .preprocess(&mut rs, "Tagged", &options)
            .unwrap();
        let pairs = |v: &[(&str, &str)]| -> TaggedSentence {
            v.iter().map(|(w, t)| (w.to_string(), t.to_string())).collect()
        };
        assert_eq!(
            &[pairs(&[("the", "OT"), ("dogs", "NN"), ("barked", "VB")])],
            rs.tagged(CLEANED_COLUMN).unwrap()
        );
        assert_eq!(
            &[pairs(&[("dog", "NN"), ("bark", "VB")])],
            rs.tagged(PREPROCESSED_COLUMN).unwrap()
        );
        assert!(!rs.contains(HASHTAGS_COLUMN));
    }

    #[test]
    fn test_stem_word() {
        let p = BasicPreprocessor::new();
        assert_eq!(Outcome::Complete("run".to_string()), p.stem_word("Running", "english"));
        let outcome = p.stem_word("Running", "klingon");
        assert!(outcome.is_degraded());
        assert_eq!("running", outcome.into_value());
    }

    #[test]
    fn test_repeated_run_reads_original_text() {
        let mut session = NgramSession::with_preprocessor(
            records(&["The cats are chasing mice", "Cats chase the mice!"]),
            "Snippet",
            BasicPreprocessor::new(),
        )
        .unwrap();
        let config = RunConfig {
            min_gram: 1,
            max_gram: 2,
            preprocess: true,
            tfidf: false,
            ..RunConfig::default()
        };
        session.run(config.clone()).unwrap();
        let table = session.table(false);
        let matrix = session.matrix().clone();
        assert_eq!(vec!["cat".to_string(), "2".to_string()], table.rows[0]);

        session.run(config).unwrap();
        assert_eq!("Snippet", session.text_column());
        assert_eq!(table, session.table(false));
        assert_eq!(&matrix, session.matrix());
        assert_eq!(
            &["The cats are chasing mice".to_string(), "Cats chase the mice!".to_string()],
            session.records().text("Snippet").unwrap()
        );
    }

    #[test]
    fn test_wrong_column_type() {
        let mut rs = records(&["text"]);
        assert!(BasicPreprocessor::new()
            .preprocess(
                &mut rs,
                "Snippet",
                &PreprocessOptions {
                    pos_tuples: true,
                    ..english()
                }
            )
            .is_err());
    }
}
