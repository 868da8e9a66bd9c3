//! Layered backoff tagger.

use bincode::{
    de::{BorrowDecoder, Decoder},
    enc::Encoder,
    error::{DecodeError, EncodeError},
    BorrowDecode, Decode, Encode,
};
use regex::Regex;

use crate::errors::{PosgramError, Result};
use crate::utils::SerializableHashMap;

/// Ordered sequence of (word, tag) pairs.
pub type TaggedSentence = Vec<(String, String)>;

const CATCH_ALL_PROBES: &[&str] = &["", "catch-all probe", "0"];

/// Tagger assigning the tag of the first pattern that matches the start of a word.
///
/// The last pattern must match every word, so this tagger never leaves a word untagged.
#[derive(Clone, Debug)]
pub struct RegexTagger {
    sources: Vec<(String, String)>,
    compiled: Vec<Regex>,
}

impl RegexTagger {
    /// Creates a new regex tagger.
    ///
    /// # Arguments
    ///
    /// * `patterns` - (pattern, tag) pairs, tried in order.
    ///
    /// # Errors
    ///
    /// This function will return an error variant when:
    ///
    /// * `patterns` is empty.
    /// * a pattern is not a valid regular expression.
    /// * the last pattern does not match every word.
    ///
    /// # Examples
    ///
    /// ```
    /// use posgram::RegexTagger;
    ///
    /// let t = RegexTagger::new([(r".*ing$", "VB"), (r".*", "NN")]).unwrap();
    /// assert_eq!("VB", t.tag_word("running"));
    /// assert_eq!("NN", t.tag_word("dog"));
    ///
    /// assert!(RegexTagger::new([(r".*ing$", "VB")]).is_err());
    /// ```
    pub fn new<I, P, T>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, T)>,
        P: Into<String>,
        T: Into<String>,
    {
        let sources: Vec<(String, String)> = patterns
            .into_iter()
            .map(|(p, t)| (p.into(), t.into()))
            .collect();
        let compiled = sources
            .iter()
            .map(|(p, _)| Regex::new(&format!("^(?:{p})")))
            .collect::<Result<Vec<_>, _>>()?;
        let last = compiled.last().ok_or_else(|| {
            PosgramError::invalid_argument("patterns", "at least one pattern is required")
        })?;
        if !CATCH_ALL_PROBES.iter().all(|probe| last.is_match(probe)) {
            return Err(PosgramError::invalid_argument(
                "patterns",
                format!("the last pattern {:?} is not a catch-all", sources[sources.len() - 1].0),
            ));
        }
        Ok(Self { sources, compiled })
    }

    /// Gets the tag of the first matching pattern.
    pub fn tag_word(&self, word: &str) -> &str {
        let idx = self
            .compiled
            .iter()
            .position(|re| re.is_match(word))
            .unwrap_or(self.sources.len() - 1);
        &self.sources[idx].1
    }

    pub fn patterns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sources.iter().map(|(p, t)| (p.as_str(), t.as_str()))
    }
}

impl PartialEq for RegexTagger {
    fn eq(&self, other: &Self) -> bool {
        self.sources == other.sources
    }
}

impl Encode for RegexTagger {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        Encode::encode(&self.sources, encoder)
    }
}

impl<Context> Decode<Context> for RegexTagger {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let sources: Vec<(String, String)> = Decode::decode(decoder)?;
        Self::new(sources).map_err(|e| DecodeError::OtherString(e.to_string()))
    }
}

impl<'de, Context> BorrowDecode<'de, Context> for RegexTagger {
    fn borrow_decode<D: BorrowDecoder<'de, Context = Context>>(
        decoder: &mut D,
    ) -> Result<Self, DecodeError> {
        Decode::decode(decoder)
    }
}

/// Context of a bigram lookup: the previous tag (none at the start of a sentence) and the word.
pub type BigramContext = (Option<String>, String);

/// One level of a backoff chain. Lookup levels delegate to their backoff on a miss; the fallback
/// levels always produce a tag.
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub enum Tagger {
    RegexFallback(RegexTagger),
    DefaultFallback(String),
    UnigramLookup {
        table: SerializableHashMap<String, String>,
        backoff: Box<Tagger>,
    },
    BigramLookup {
        table: SerializableHashMap<BigramContext, String>,
        backoff: Box<Tagger>,
    },
}

impl Tagger {
    /// Tags the token at `index`.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Words of the sentence.
    /// * `index` - Position to tag.
    /// * `history` - Tags already assigned to `tokens[..index]`.
    pub fn tag_one<'a>(&'a self, tokens: &[String], index: usize, history: &[String]) -> &'a str {
        match self {
            Self::RegexFallback(tagger) => tagger.tag_word(&tokens[index]),
            Self::DefaultFallback(tag) => tag.as_str(),
            Self::UnigramLookup { table, backoff } => match table.get(&tokens[index]) {
                Some(tag) => tag.as_str(),
                None => backoff.tag_one(tokens, index, history),
            },
            Self::BigramLookup { table, backoff } => {
                let context = (
                    index.checked_sub(1).map(|i| history[i].clone()),
                    tokens[index].clone(),
                );
                match table.get(&context) {
                    Some(tag) => tag.as_str(),
                    None => backoff.tag_one(tokens, index, history),
                }
            }
        }
    }

    /// Tags a sentence, feeding each assigned tag back as history for the next token.
    ///
    /// # Examples
    ///
    /// ```
    /// use posgram::Tagger;
    ///
    /// let tagger = Tagger::DefaultFallback("NN".into());
    /// let tokens = vec!["a".to_string(), "b".to_string()];
    /// assert_eq!(
    ///     vec![("a".to_string(), "NN".to_string()), ("b".to_string(), "NN".to_string())],
    ///     tagger.tag(&tokens),
    /// );
    /// ```
    pub fn tag(&self, tokens: &[String]) -> TaggedSentence {
        let mut history: Vec<String> = Vec::with_capacity(tokens.len());
        for i in 0..tokens.len() {
            let tag = self.tag_one(tokens, i, &history).to_string();
            history.push(tag);
        }
        tokens.iter().cloned().zip(history).collect()
    }

    pub fn backoff(&self) -> Option<&Tagger> {
        match self {
            Self::RegexFallback(_) | Self::DefaultFallback(_) => None,
            Self::UnigramLookup { backoff, .. } | Self::BigramLookup { backoff, .. } => {
                Some(&**backoff)
            }
        }
    }

    /// Number of levels in the chain, this one included.
    pub fn depth(&self) -> usize {
        1 + self.backoff().map_or(0, Tagger::depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split(' ').map(str::to_string).collect()
    }

    fn tags(tagged: &TaggedSentence) -> Vec<&str> {
        tagged.iter().map(|(_, t)| t.as_str()).collect()
    }

    #[test]
    fn test_regex_tagger_first_match_wins() {
        let t = RegexTagger::new([(r".*es$", "VB"), (r".*s$", "NNS"), (r".*", "NN")]).unwrap();
        assert_eq!("VB", t.tag_word("goes"));
        assert_eq!("NNS", t.tag_word("cats"));
        assert_eq!("NN", t.tag_word("cat"));
    }

    #[test]
    fn test_regex_tagger_matches_prefix_only() {
        let t = RegexTagger::new([(r"[0-9]+", "NU"), (r".*", "NN")]).unwrap();
        assert_eq!("NU", t.tag_word("42nd"));
        assert_eq!("NN", t.tag_word("route66"));
    }

    #[test]
    fn test_regex_tagger_rejects_bad_patterns() {
        let empty: [(&str, &str); 0] = [];
        assert!(matches!(
            RegexTagger::new(empty),
            Err(PosgramError::InvalidArgument(_))
        ));
        assert!(matches!(
            RegexTagger::new([("(", "NN")]),
            Err(PosgramError::Regex(_))
        ));
        assert!(matches!(
            RegexTagger::new([(".*", "NN"), (r"^[0-9]+$", "NU")]),
            Err(PosgramError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unigram_backs_off() {
        let table = [("the".to_string(), "AT".to_string())].into_iter().collect();
        let tagger = Tagger::UnigramLookup {
            table,
            backoff: Box::new(Tagger::DefaultFallback("NN".into())),
        };
        assert_eq!(vec!["AT", "NN"], tags(&tagger.tag(&words("the dog"))));
        assert_eq!(2, tagger.depth());
    }

    #[test]
    fn test_bigram_uses_assigned_history() {
        let unigram = Tagger::UnigramLookup {
            table: [("to".to_string(), "TO".to_string())].into_iter().collect(),
            backoff: Box::new(Tagger::DefaultFallback("NN".into())),
        };
        let bigram = Tagger::BigramLookup {
            table: [
                ((Some("TO".to_string()), "run".to_string()), "VB".to_string()),
                ((None, "run".to_string()), "NN".to_string()),
            ]
            .into_iter()
            .collect(),
            backoff: Box::new(unigram),
        };
        assert_eq!(vec!["TO", "VB"], tags(&bigram.tag(&words("to run"))));
        assert_eq!(vec!["NN", "NN"], tags(&bigram.tag(&words("run run"))));
        assert_eq!(3, bigram.depth());
    }

    #[test]
    fn test_tag_empty_sentence() {
        let tagger = Tagger::DefaultFallback("NN".into());
        assert!(tagger.tag(&[]).is_empty());
    }

    #[test]
    fn test_encode_decode_chain() {
        let tagger = Tagger::UnigramLookup {
            table: [("ran".to_string(), "VB".to_string())].into_iter().collect(),
            backoff: Box::new(Tagger::RegexFallback(
                RegexTagger::new([(r".*ing$", "VB"), (r".*", "NN")]).unwrap(),
            )),
        };
        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(&tagger, config).unwrap();
        let (decoded, _): (Tagger, usize) = bincode::decode_from_slice(&bytes, config).unwrap();
        assert_eq!(tagger, decoded);
        assert_eq!(
            vec!["VB", "VB", "NN"],
            tags(&decoded.tag(&words("ran running dog")))
        );
    }
}
