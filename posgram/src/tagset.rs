//! Simplification of corpus-specific POS tags to a small canonical tagset.

use std::fmt;
use std::str::FromStr;

use bincode::{Decode, Encode};

use crate::errors::PosgramError;

/// Tags produced by simplification, besides single ASCII punctuation characters which map to
/// themselves.
pub const CANONICAL_TAGS: &[&str] = &["NP", "NN", "VB", "NU", "AD", "QL", "AV", "PN", "OT", "*:", "."];

/// Tag given to source tags matched by no rule.
pub const OTHER_TAG: &str = "OT";

/// Returns `true` if `tag` belongs to the canonical tagset.
pub fn is_canonical(tag: &str) -> bool {
    CANONICAL_TAGS.contains(&tag) || is_ascii_punctuation(tag)
}

fn is_ascii_punctuation(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_punctuation())
}

/// One step of a simplification table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagRule {
    /// Maps any member to `tag`.
    Members { tag: String, members: Vec<String> },

    /// Keeps a single ASCII punctuation character as its own tag.
    AsciiPunctuation,
}

impl TagRule {
    pub fn members(tag: &str, members: &[&str]) -> Self {
        Self::Members {
            tag: tag.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn apply(&self, prefix: &str) -> Option<String> {
        match self {
            Self::Members { tag, members } => {
                members.iter().any(|m| m == prefix).then(|| tag.clone())
            }
            Self::AsciiPunctuation => is_ascii_punctuation(prefix).then(|| prefix.to_string()),
        }
    }
}

/// Ordered membership table for one source tagset. The first rule that matches wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagTable {
    rules: Vec<TagRule>,
}

impl TagTable {
    pub const fn new(rules: Vec<TagRule>) -> Self {
        Self { rules }
    }

    /// Table for the Brown corpus tagset.
    pub fn brown() -> Self {
        Self::new(vec![
            TagRule::members("NP", &["NP"]),
            TagRule::AsciiPunctuation,
            TagRule::members("NN", &["NR", "NN"]),
            TagRule::members("VB", &["VB", "DO", "EX", "HV", "BE", "DI"]),
            TagRule::members("NU", &["CD", "OD"]),
            TagRule::members("AD", &["JJ"]),
            TagRule::members("QL", &["QL", "DT", "WQ"]),
            TagRule::members("AV", &["RB", "RN", "RP"]),
            TagRule::members("*:", &["*:"]),
            TagRule::members("PN", &["PN", "PP", "PR", "WP"]),
        ])
    }

    /// Table for Parole-style tags.
    pub fn parole() -> Self {
        Self::new(vec![
            TagRule::members("NP", &["NP"]),
            TagRule::AsciiPunctuation,
            TagRule::members("NN", &["NC"]),
            TagRule::members("VB", &["VS", "VM", "VA"]),
            TagRule::members("NU", &["Z", "Zm", "Zp"]),
            TagRule::members("AD", &["AO", "AQ"]),
            TagRule::members("AV", &["RG", "RN"]),
        ])
    }

    /// Table for Spanish Parole-style corpora. Punctuation tags (`F*`) collapse to `.`.
    pub fn parole_es() -> Self {
        Self::new(vec![
            TagRule::members("NP", &["NP"]),
            TagRule::members(
                ".",
                &[
                    "Fa", "Fc", "Fd", "Fe", "Fg", "Fh", "Fi", "Fp", "Fr", "Fs", "Fx", "Fz",
                ],
            ),
            TagRule::members("NN", &["NC", "W"]),
            TagRule::members("VB", &["VA", "VM", "VS"]),
            TagRule::members("NU", &["Z", "Zd", "Zm", "Zp"]),
            TagRule::members("AD", &["JJ"]),
            TagRule::members("QL", &["DA", "DD", "DI", "DT", "PD", "PI"]),
            TagRule::members("AV", &["RG", "RN"]),
            TagRule::members("PN", &["DP", "PX", "P0", "PP", "PR", "PT"]),
        ])
    }

    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    /// Maps a source tag to its canonical tag.
    ///
    /// Only the first two characters of `tag` are looked at.
    ///
    /// # Examples
    ///
    /// ```
    /// use posgram::TagTable;
    ///
    /// let table = TagTable::brown();
    /// assert_eq!("NN", table.simplify("NNS"));
    /// assert_eq!("VB", table.simplify("VBD"));
    /// assert_eq!(".", table.simplify("."));
    /// assert_eq!("OT", table.simplify("IN"));
    /// ```
    pub fn simplify(&self, tag: &str) -> String {
        let prefix = match tag.char_indices().nth(2) {
            Some((end, _)) => &tag[..end],
            None => tag,
        };
        self.rules
            .iter()
            .find_map(|rule| rule.apply(prefix))
            .unwrap_or_else(|| OTHER_TAG.to_string())
    }
}

/// Source tagsets a tagger can be trained on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Encode, Decode)]
pub enum Tagset {
    Brown,
    Parole,
}

impl Tagset {
    /// The table used to simplify a training corpus of this tagset.
    pub fn simplification_table(self) -> TagTable {
        match self {
            Self::Brown => TagTable::brown(),
            Self::Parole => TagTable::parole_es(),
        }
    }

    /// Tag assigned by a constant fallback tagger.
    pub const fn default_tag(self, simplified: bool) -> &'static str {
        match (self, simplified) {
            (_, true) | (Self::Brown, false) => "NN",
            (Self::Parole, false) => "NCS",
        }
    }
}

impl FromStr for Tagset {
    type Err = PosgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brown" => Ok(Self::Brown),
            "parole" => Ok(Self::Parole),
            _ => Err(PosgramError::UnsupportedTagset(s.to_string())),
        }
    }
}

impl fmt::Display for Tagset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Brown => write!(f, "brown"),
            Self::Parole => write!(f, "parole"),
        }
    }
}
