//! Word, sentence and tagging tokenizers.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::errors::{PosgramError, Result};
use crate::tagger::TaggedSentence;

/// Splits text into words on whitespace, line breaks and slashes.
///
/// # Examples
///
/// ```
/// use posgram::tokenizer::tokenize_words;
///
/// assert_eq!(vec!["either", "or", "both"], tokenize_words("either/or\n  both"));
/// ```
pub fn tokenize_words(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == '/')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits text into words like [`tokenize_words`], but keeps quoted phrases together.
///
/// Quotes are removed from the output. Outside of quotes a backslash escapes the next
/// character. Inside double quotes it only escapes `"` and `\`, and is kept as is before
/// anything else. Inside single quotes it has no special meaning.
///
/// # Errors
///
/// Returns [`PosgramError::InvalidArgument`] if a quote is left open.
pub fn tokenize_phrases(text: &str) -> Result<Vec<String>> {
    let mut tokens = vec![];
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut escape = false;
    for c in text.chars() {
        let c = if c == '\n' || c == '/' { ' ' } else { c };
        match (escape, quote, c) {
            (true, q, _) => {
                if q == Some('"') && c != '"' && c != '\\' {
                    current.push('\\');
                }
                current.push(c);
                escape = false;
            }
            (false, Some('\''), '\'') | (false, Some('"'), '"') => {
                quote = None;
            }
            (false, Some('\''), _) => current.push(c),
            (false, Some(_), '\\') | (false, None, '\\') => {
                escape = true;
                in_token = true;
            }
            (false, Some(_), _) => current.push(c),
            (false, None, '\'' | '"') => {
                quote = Some(c);
                in_token = true;
            }
            (false, None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (false, None, _) => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if quote.is_some() {
        return Err(PosgramError::invalid_argument(
            "text",
            "contains an unterminated quote",
        ));
    }
    if escape {
        return Err(PosgramError::invalid_argument(
            "text",
            "ends with an escape character",
        ));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Splits text into sentences on Unicode sentence boundaries (UAX #29).
///
/// A period followed by a lowercase word does not end a sentence, so abbreviations such as
/// "p.m." stay inside their sentence.
///
/// # Examples
///
/// ```
/// use posgram::tokenizer::tokenize_sentences;
///
/// let sents = tokenize_sentences("It rained. Did it stop?  Yes!");
/// assert_eq!(vec!["It rained.", "Did it stop?", "Yes!"], sents);
/// ```
pub fn tokenize_sentences(text: &str) -> Vec<String> {
    text.split_sentence_bounds()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn tagging_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\w']+|[.,!?;]").unwrap())
}

/// Splits a sentence into the tokens fed to a tagger: runs of word characters (apostrophes
/// included), and `.`, `,`, `!`, `?`, `;` as standalone tokens. Everything else is dropped.
///
/// # Examples
///
/// ```
/// use posgram::tokenizer::tokenize_for_tagging;
///
/// assert_eq!(
///     vec!["Don't", "stop", ",", "ok", "?"],
///     tokenize_for_tagging("Don't stop, ok?"),
/// );
/// ```
pub fn tokenize_for_tagging(sentence: &str) -> Vec<String> {
    tagging_pattern()
        .find_iter(sentence)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Splits tagged pairs into a word list and a tag list.
pub fn split_tagged(tagged: &[(String, String)]) -> (Vec<String>, Vec<String>) {
    tagged.iter().cloned().unzip()
}

/// Reverses [`split_tagged`] after the word list has been filtered.
///
/// Walks `original` in order, keeps the words that are still present in `tokens`, and pairs each
/// with the tag at the same position of `tags`.
pub fn rejoin_tagged(tokens: &[String], tags: &[String], original: &[String]) -> TaggedSentence {
    let kept: HashSet<&str> = tokens.iter().map(String::as_str).collect();
    original
        .iter()
        .zip(tags)
        .filter(|(word, _)| kept.contains(word.as_str()))
        .map(|(word, tag)| (word.clone(), tag.clone()))
        .collect()
}

/// Parses a line of `word/TAG` tokens separated by whitespace.
///
/// The tag is the part after the last slash, so words may contain slashes.
///
/// # Errors
///
/// Returns [`PosgramError::InvalidArgument`] if a token has no tag or an empty word.
pub fn parse_tagged_line(line: &str) -> Result<TaggedSentence> {
    line.split_whitespace()
        .map(|token| match token.rsplit_once('/') {
            Some((word, tag)) if !word.is_empty() && !tag.is_empty() => {
                Ok((word.to_string(), tag.to_string()))
            }
            _ => Err(PosgramError::invalid_argument(
                "line",
                format!("token {token:?} is not in word/TAG form"),
            )),
        })
        .collect()
}

/// Formats tagged pairs as `word/TAG` tokens separated by single spaces.
pub fn format_tagged(tagged: &[(String, String)]) -> String {
    let mut buf = String::new();
    for (i, (word, tag)) in tagged.iter().enumerate() {
        if i != 0 {
            buf.push(' ');
        }
        buf.push_str(word);
        buf.push('/');
        buf.push_str(tag);
    }
    buf
}
