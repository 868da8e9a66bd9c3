use std::sync::Arc;

use log::debug;

use crate::errors::Result;
use crate::model::TaggerArtifact;
use crate::store::ArtifactStore;
use crate::tagger::TaggedSentence;
use crate::tokenizer::{tokenize_for_tagging, tokenize_sentences};

/// Predictor.
///
/// Holds a trained artifact read-only, so clones share it and may tag from several threads.
#[derive(Clone, Debug)]
pub struct Predictor {
    artifact: Arc<TaggerArtifact>,
}

impl Predictor {
    /// Creates a new predictor.
    ///
    /// # Arguments
    ///
    /// * `artifact` - A trained tagger.
    ///
    /// # Returns
    ///
    /// A new predictor.
    pub fn new(artifact: TaggerArtifact) -> Self {
        Self {
            artifact: Arc::new(artifact),
        }
    }

    /// Creates a predictor from the artifact saved under `name`.
    ///
    /// # Errors
    ///
    /// [`PosgramError::ArtifactNotFound`](crate::PosgramError::ArtifactNotFound) if nothing is
    /// saved under `name`.
    pub fn load(store: &ArtifactStore, name: &str) -> Result<Self> {
        Ok(Self::new(store.load(name)?))
    }

    pub fn artifact(&self) -> &TaggerArtifact {
        &self.artifact
    }

    /// Tags pre-tokenized words of one sentence.
    pub fn tag_tokens(&self, tokens: &[String]) -> TaggedSentence {
        self.artifact.tag(tokens)
    }

    /// Tags a snippet of raw text.
    ///
    /// The snippet is split into sentences, each sentence into words and the punctuation marks
    /// `.,!?;`, and the results are concatenated in input order.
    pub fn tag_snippet(&self, snippet: &str) -> TaggedSentence {
        let mut result = vec![];
        for sentence in tokenize_sentences(snippet) {
            let tokens = tokenize_for_tagging(&sentence);
            result.extend(self.artifact.tag(&tokens));
        }
        debug!(
            "Tagged {} tokens with {:?}",
            result.len(),
            self.artifact.name()
        );
        result
    }
}

/// Tags a snippet with the artifact saved under `name`.
///
/// # Errors
///
/// [`PosgramError::ArtifactNotFound`](crate::PosgramError::ArtifactNotFound) if nothing is saved
/// under `name`. There is no fallback tagger.
pub fn tag_snippet(snippet: &str, name: &str, store: &ArtifactStore) -> Result<TaggedSentence> {
    Ok(Predictor::load(store, name)?.tag_snippet(snippet))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::thread;

    use crate::errors::PosgramError;
    use crate::tagger::{RegexTagger, Tagger};
    use crate::tagset::Tagset;
    use crate::utils::SerializableHashMap;

    fn artifact() -> TaggerArtifact {
        let fallback = Tagger::RegexFallback(
            RegexTagger::new([(r".*ing$", "VB"), (r"[.,!?;]$", "."), (r".*", "NN")]).unwrap(),
        );
        let mut table = SerializableHashMap::default();
        table.insert("I".to_string(), "PN".to_string());
        table.insert("don't".to_string(), "VB".to_string());
        let tagger = Tagger::UnigramLookup {
            table,
            backoff: Box::new(fallback),
        };
        TaggerArtifact::new("small", Tagset::Brown, true, tagger, None)
    }

    fn pairs(v: &[(&str, &str)]) -> TaggedSentence {
        v.iter().map(|(w, t)| (w.to_string(), t.to_string())).collect()
    }

    #[test]
    fn test_tag_snippet_multi_sentence() {
        let predictor = Predictor::new(artifact());
        assert_eq!(
            pairs(&[
                ("I", "PN"),
                ("like", "NN"),
                ("running", "VB"),
                (".", "."),
                ("I", "PN"),
                ("don't", "VB"),
                ("!", "."),
            ]),
            predictor.tag_snippet("I like running. I don't!"),
        );
    }

    #[test]
    fn test_tag_snippet_empty() {
        let predictor = Predictor::new(artifact());
        assert!(predictor.tag_snippet("   ").is_empty());
    }

    #[test]
    fn test_tag_snippet_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(matches!(
            tag_snippet("hello", "missing", &store),
            Err(PosgramError::ArtifactNotFound { .. })
        ));
    }

    #[test]
    fn test_tag_snippet_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&artifact()).unwrap();
        assert_eq!(
            pairs(&[("I", "PN"), ("sing", "VB")]),
            tag_snippet("I sing", "small", &store).unwrap(),
        );
    }

    #[test]
    fn test_shared_across_threads() {
        let predictor = Predictor::new(artifact());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let predictor = predictor.clone();
                thread::spawn(move || predictor.tag_snippet("walking"))
            })
            .collect();
        for handle in handles {
            assert_eq!(pairs(&[("walking", "VB")]), handle.join().unwrap());
        }
    }
}
