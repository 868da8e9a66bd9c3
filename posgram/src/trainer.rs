use std::hash::Hash;

use hashbrown::{HashMap, HashSet};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::{PosgramError, Result};
use crate::model::TaggerArtifact;
use crate::store::ArtifactStore;
use crate::tagger::{BigramContext, RegexTagger, TaggedSentence, Tagger};
use crate::tagset::Tagset;
use crate::tokenizer::split_tagged;
use crate::utils::{most_frequent, SerializableHashMap};

/// Level 0 of the backoff chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fallback {
    /// Infer the tag from word endings and number shapes.
    Regex,

    /// Always answer the tagset's default tag.
    Default,
}

/// Training parameters.
#[derive(Clone, Debug)]
pub struct TrainConfig {
    /// Name the artifact is saved under.
    pub name: String,
    pub tagset: Tagset,
    /// Map corpus tags to the canonical tagset before training.
    pub simplify: bool,
    pub fallback: Fallback,
    /// Language of the regex fallback patterns. Only `en` is available.
    pub regex_language: String,
    /// Probability of each sentence landing in the training split, in (0, 1].
    pub train_ratio: f64,
    /// Seed of the split. Without a seed the split differs on every run.
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            name: "simplified_en".to_string(),
            tagset: Tagset::Brown,
            simplify: true,
            fallback: Fallback::Regex,
            regex_language: "en".to_string(),
            train_ratio: 0.8,
            seed: None,
        }
    }
}

/// Gets the regex fallback patterns for a language.
///
/// # Errors
///
/// [`PosgramError::UnsupportedLanguage`] if no patterns exist for `language`.
pub fn fallback_patterns(
    language: &str,
    simplified: bool,
) -> Result<&'static [(&'static str, &'static str)]> {
    match (language, simplified) {
        ("en", true) => Ok(&[
            (r".*ing$", "VB"),
            (r".*ed$", "VB"),
            (r".*es$", "VB"),
            (r"-?[0-9]+(.[0-9]+)?$", "NU"),
            (r".*", "NN"),
        ]),
        ("en", false) => Ok(&[
            (r".*ing$", "VBG"),
            (r".*ed$", "VBD"),
            (r".*es$", "VBZ"),
            (r".*ould$", "MD"),
            (r".*'s$", "NN$"),
            (r".*s$", "NNS"),
            (r"-?[0-9]+(.[0-9]+)?$", "CD"),
            (r".*", "NN"),
        ]),
        _ => Err(PosgramError::UnsupportedLanguage(language.to_string())),
    }
}

/// Partitions sentences with an independent Bernoulli draw per sentence.
///
/// # Returns
///
/// The (train, test) split.
pub fn split_corpus<R>(
    corpus: Vec<TaggedSentence>,
    train_ratio: f64,
    rng: &mut R,
) -> (Vec<TaggedSentence>, Vec<TaggedSentence>)
where
    R: Rng,
{
    corpus
        .into_iter()
        .partition(|_| rng.gen::<f64>() < train_ratio)
}

/// Token accuracy of `tagger` on a gold corpus.
///
/// # Returns
///
/// `None` if `gold` holds no tokens.
pub fn evaluate(tagger: &Tagger, gold: &[TaggedSentence]) -> Option<f64> {
    let mut n_total = 0usize;
    let mut n_correct = 0usize;
    for sentence in gold {
        let (tokens, tags) = split_tagged(sentence);
        for ((_, predicted), expected) in tagger.tag(&tokens).iter().zip(&tags) {
            n_total += 1;
            if predicted == expected {
                n_correct += 1;
            }
        }
    }
    (n_total != 0).then(|| n_correct as f64 / n_total as f64)
}

/// Learns a context → tag table.
///
/// A context is kept only if the backoff gets at least one of its occurrences wrong, and maps to
/// its most frequent tag.
fn train_context<K, F>(
    train: &[TaggedSentence],
    backoff: &Tagger,
    context: F,
) -> SerializableHashMap<K, String>
where
    K: Clone + Eq + Hash,
    F: Fn(&[String], usize, &[String]) -> K,
{
    let mut counts: HashMap<K, HashMap<String, usize>> = HashMap::new();
    let mut useful = HashSet::new();
    for sentence in train {
        let (tokens, tags) = split_tagged(sentence);
        for (i, tag) in tags.iter().enumerate() {
            let ctx = context(&tokens, i, &tags);
            *counts
                .entry(ctx.clone())
                .or_default()
                .entry(tag.clone())
                .or_insert(0) += 1;
            if backoff.tag_one(&tokens, i, &tags[..i]) != tag.as_str() {
                useful.insert(ctx);
            }
        }
    }
    useful
        .into_iter()
        .filter_map(|ctx| {
            let best = most_frequent(counts.get(&ctx)?)?.0.clone();
            Some((ctx, best))
        })
        .collect()
}

/// Trainer of 3-level backoff taggers (fallback → unigram → bigram).
///
/// # Examples
///
/// ```
/// use posgram::tokenizer::parse_tagged_line;
/// use posgram::{TrainConfig, Trainer};
///
/// let corpus = vec![
///     parse_tagged_line("The/AT dog/NN barked/VBD ./.").unwrap(),
///     parse_tagged_line("A/AT cat/NN sleeps/VBZ ./.").unwrap(),
/// ];
/// let config = TrainConfig {
///     train_ratio: 1.0,
///     ..TrainConfig::default()
/// };
/// let artifact = Trainer::new(config).unwrap().train(corpus).unwrap();
/// let tokens: Vec<String> = ["The", "dog", "jumped"].iter().map(|s| s.to_string()).collect();
/// let tags: Vec<_> = artifact.tag(&tokens).into_iter().map(|(_, t)| t).collect();
/// assert_eq!(vec!["OT", "NN", "VB"], tags);
/// ```
pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    /// Creates a new trainer.
    ///
    /// # Errors
    ///
    /// This function will return an error variant when:
    ///
    /// * `train_ratio` is not in (0, 1].
    /// * the regex fallback is selected and `regex_language` has no patterns.
    pub fn new(config: TrainConfig) -> Result<Self> {
        if !(config.train_ratio > 0.0 && config.train_ratio <= 1.0) {
            return Err(PosgramError::invalid_argument(
                "train_ratio",
                format!("{} is not in (0, 1]", config.train_ratio),
            ));
        }
        if config.fallback == Fallback::Regex {
            fallback_patterns(&config.regex_language, config.simplify)?;
        }
        Ok(Self { config })
    }

    pub const fn config(&self) -> &TrainConfig {
        &self.config
    }

    fn fallback_tagger(&self) -> Result<Tagger> {
        let config = &self.config;
        Ok(match config.fallback {
            Fallback::Regex => Tagger::RegexFallback(RegexTagger::new(
                fallback_patterns(&config.regex_language, config.simplify)?
                    .iter()
                    .copied(),
            )?),
            Fallback::Default => {
                Tagger::DefaultFallback(config.tagset.default_tag(config.simplify).to_string())
            }
        })
    }

    /// Trains a tagger and evaluates it on the held-out split.
    ///
    /// # Errors
    ///
    /// [`PosgramError::NoCorpus`] if `corpus` is empty.
    pub fn train(&self, corpus: Vec<TaggedSentence>) -> Result<TaggerArtifact> {
        if corpus.is_empty() {
            return Err(PosgramError::NoCorpus);
        }
        let config = &self.config;

        let corpus = if config.simplify {
            let table = config.tagset.simplification_table();
            corpus
                .into_iter()
                .map(|sent| {
                    sent.into_iter()
                        .map(|(word, tag)| {
                            let tag = table.simplify(&tag);
                            (word, tag)
                        })
                        .collect()
                })
                .collect()
        } else {
            corpus
        };

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (train, test) = split_corpus(corpus, config.train_ratio, &mut rng);
        debug!("Split: {} train / {} test sentences", train.len(), test.len());

        let t0 = self.fallback_tagger()?;
        let t1 = Tagger::UnigramLookup {
            table: train_context(&train, &t0, |tokens, i, _| tokens[i].clone()),
            backoff: Box::new(t0),
        };
        let t2 = Tagger::BigramLookup {
            table: train_context(&train, &t1, |tokens, i, tags| -> BigramContext {
                (i.checked_sub(1).map(|j| tags[j].clone()), tokens[i].clone())
            }),
            backoff: Box::new(t1),
        };

        let accuracy = evaluate(&t2, &test);
        match accuracy {
            Some(accuracy) => info!("Accuracy {accuracy}"),
            None => warn!("Test split is empty; accuracy not measured"),
        }
        Ok(TaggerArtifact::new(
            config.name.clone(),
            config.tagset,
            config.simplify,
            t2,
            accuracy,
        ))
    }
}

/// Trains a tagger with [`Trainer`].
pub fn train_tagger(corpus: Vec<TaggedSentence>, config: TrainConfig) -> Result<TaggerArtifact> {
    Trainer::new(config)?.train(corpus)
}

/// Trains a tagger and saves it to `store` under the configured name.
pub fn train_and_save(
    corpus: Vec<TaggedSentence>,
    config: TrainConfig,
    store: &ArtifactStore,
) -> Result<TaggerArtifact> {
    let artifact = train_tagger(corpus, config)?;
    store.save(&artifact)?;
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tagset::is_canonical;
    use crate::tokenizer::parse_tagged_line;

    fn corpus(lines: &[&str]) -> Vec<TaggedSentence> {
        lines.iter().map(|l| parse_tagged_line(l).unwrap()).collect()
    }

    fn brown_corpus() -> Vec<TaggedSentence> {
        corpus(&[
            "The/AT dog/NN barked/VBD ./.",
            "I/PPSS want/VB to/TO run/VB ./.",
            "The/AT run/NN was/BEDZ long/JJ ./.",
            "A/AT run/NN ended/VBD ./.",
            "Her/PP$ run/NN was/BEDZ 12/CD miles/NNS ./.",
            "We/PPSS like/VB to/TO run/VB ./.",
        ])
    }

    fn all_train(fallback: Fallback, simplify: bool) -> TrainConfig {
        TrainConfig {
            name: "test".into(),
            simplify,
            fallback,
            train_ratio: 1.0,
            ..TrainConfig::default()
        }
    }

    fn tag_words(artifact: &TaggerArtifact, text: &str) -> Vec<String> {
        let tokens: Vec<String> = text.split(' ').map(str::to_string).collect();
        artifact.tag(&tokens).into_iter().map(|(_, t)| t).collect()
    }

    #[test]
    fn test_empty_corpus() {
        assert!(matches!(
            train_tagger(vec![], TrainConfig::default()),
            Err(PosgramError::NoCorpus)
        ));
    }

    #[test]
    fn test_unsupported_regex_language() {
        let config = TrainConfig {
            regex_language: "es".into(),
            ..TrainConfig::default()
        };
        assert!(matches!(
            train_tagger(brown_corpus(), config),
            Err(PosgramError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_default_fallback_ignores_language() {
        let config = TrainConfig {
            regex_language: "xx".into(),
            ..all_train(Fallback::Default, false)
        };
        let artifact = train_tagger(brown_corpus(), config).unwrap();
        assert_eq!(vec!["NN"], tag_words(&artifact, "zebra"));
    }

    #[test]
    fn test_invalid_ratio() {
        for ratio in [0.0, -0.5, 1.5, f64::NAN] {
            let config = TrainConfig {
                train_ratio: ratio,
                ..TrainConfig::default()
            };
            assert!(matches!(
                Trainer::new(config),
                Err(PosgramError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_full_train_ratio_has_no_accuracy() {
        let artifact = train_tagger(brown_corpus(), all_train(Fallback::Regex, true)).unwrap();
        assert_eq!(None, artifact.accuracy());
        assert_eq!(3, artifact.tagger().depth());
    }

    #[test]
    fn test_simplified_tags_are_canonical() {
        let artifact = train_tagger(brown_corpus(), all_train(Fallback::Regex, true)).unwrap();
        for tag in tag_words(&artifact, "The dog was 12 miles long , walking !") {
            assert!(is_canonical(&tag), "{tag}");
        }
        assert_eq!(
            vec!["OT", "NN", "VB", "NU", "NN", "AD", "NN", "VB", "NN"],
            tag_words(&artifact, "The dog was 12 miles long zebras walking tree"),
        );
    }

    #[test]
    fn test_unsimplified_regex_fallback() {
        let artifact = train_tagger(brown_corpus(), all_train(Fallback::Regex, false)).unwrap();
        assert_eq!(
            vec!["VBG", "VBD", "VBZ", "MD", "NN$", "NNS", "CD", "NN"],
            tag_words(&artifact, "singing jumped goes could cat's zebras 3.5 zebra"),
        );
    }

    #[test]
    fn test_bigram_context() {
        let artifact = train_tagger(brown_corpus(), all_train(Fallback::Regex, false)).unwrap();
        assert_eq!(vec!["TO", "VB"], tag_words(&artifact, "to run"));
        assert_eq!(vec!["AT", "NN"], tag_words(&artifact, "The run"));
        assert_eq!(vec!["NN"], tag_words(&artifact, "run"));
    }

    #[test]
    fn test_unigram_skips_contexts_the_fallback_gets_right() {
        let artifact = train_tagger(brown_corpus(), all_train(Fallback::Regex, false)).unwrap();
        let Tagger::BigramLookup { backoff, .. } = artifact.tagger() else {
            panic!("expected a bigram level");
        };
        let Tagger::UnigramLookup { table, .. } = backoff.as_ref() else {
            panic!("expected a unigram level");
        };
        assert!(!table.contains_key("barked"));
        assert!(!table.contains_key("dog"));
        assert_eq!(Some(&"AT".to_string()), table.get("The"));
    }

    #[test]
    fn test_seeded_split_is_reproducible() {
        let mut big = vec![];
        for _ in 0..20 {
            big.extend(brown_corpus());
        }
        let config = TrainConfig {
            seed: Some(7),
            train_ratio: 0.5,
            ..TrainConfig::default()
        };
        let a = train_tagger(big.clone(), config.clone()).unwrap();
        let b = train_tagger(big, config).unwrap();
        assert_eq!(a, b);
        let accuracy = a.accuracy().unwrap();
        assert!((0.0..=1.0).contains(&accuracy));
    }

    #[test]
    fn test_split_corpus_ratio_one_keeps_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let (train, test) = split_corpus(brown_corpus(), 1.0, &mut rng);
        assert_eq!(6, train.len());
        assert!(test.is_empty());
    }

    #[test]
    fn test_evaluate() {
        let tagger = Tagger::DefaultFallback("NN".into());
        let gold = corpus(&["a/NN b/VB", "c/NN d/NN"]);
        assert_eq!(Some(0.75), evaluate(&tagger, &gold));
        assert_eq!(None, evaluate(&tagger, &[]));
        assert_eq!(None, evaluate(&tagger, &[vec![]]));
    }

    #[test]
    fn test_train_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let artifact =
            train_and_save(brown_corpus(), all_train(Fallback::Regex, true), &store).unwrap();
        assert_eq!(artifact, store.load("test").unwrap());
    }
}
