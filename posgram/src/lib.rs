#![cfg_attr(docsrs, feature(doc_cfg))]

//! # posgram
//!
//! posgram tags words with parts of speech using layered backoff taggers, and extracts ranked
//! n-grams from a record set, linking each n-gram back to the records it occurs in.
//!
//! ## Examples
//!
//! ```no_run
//! use std::io::{stdin, BufRead};
//!
//! use posgram::{ArtifactStore, Predictor};
//!
//! let store = ArtifactStore::new("models");
//! let predictor = Predictor::load(&store, "simplified_en").unwrap();
//!
//! for line in stdin().lock().lines() {
//!     let tagged = predictor.tag_snippet(&line.unwrap());
//!     println!("{}", posgram::tokenizer::format_tagged(&tagged));
//! }
//! ```
//!
//! ```
//! use posgram::{NgramSession, RecordSet, RunConfig};
//!
//! let records = RecordSet::from_texts(
//!     "Snippet",
//!     vec!["the quick fox".into(), "the quick dog".into()],
//! );
//! let mut session = NgramSession::new(records, "Snippet").unwrap();
//! session.run(RunConfig::default()).unwrap();
//! session.enrich(false, 300).unwrap();
//!
//! assert_eq!("the quick", session.ngrams()[0].text);
//! assert_eq!(Some(vec![0, 1]), session.ngrams()[0].ids);
//! ```
//!
//! Training requires **crate feature** `train` (enabled by default). For more details, see
//! [`Trainer`].

mod errors;
mod model;
mod ngram;
mod predictor;
mod records;
mod session;
mod store;
mod tagger;
mod tagset;
mod utils;

#[cfg(feature = "train")]
mod trainer;

pub mod enrich;
pub mod tokenizer;

pub use errors::{
    InvalidArgumentError, InvalidModelError, Outcome, PosgramError, Result,
};
pub use model::TaggerArtifact;
pub use ngram::{extract_ngrams, NgramRecord, NgramVectorizer, WordFrequencyMatrix};
pub use predictor::{tag_snippet, Predictor};
pub use records::{Column, RecordSet};
pub use session::{
    NgramSession, NgramTable, Passthrough, PreprocessOptions, Preprocessor, RunConfig,
    CLEANED_COLUMN, HASHTAGS_COLUMN, MENTIONS_COLUMN, PREPROCESSED_COLUMN, STEMMED_COLUMN,
};
pub use store::ArtifactStore;
pub use tagger::{BigramContext, RegexTagger, TaggedSentence, Tagger};
pub use tagset::{is_canonical, TagRule, TagTable, Tagset, CANONICAL_TAGS, OTHER_TAG};
pub use utils::SerializableHashMap;

#[cfg(feature = "train")]
pub use trainer::{
    evaluate, fallback_patterns, split_corpus, train_and_save, train_tagger, Fallback,
    TrainConfig, Trainer,
};
