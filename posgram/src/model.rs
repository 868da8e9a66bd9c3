use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::errors::{PosgramError, Result};
use crate::tagger::{TaggedSentence, Tagger};
use crate::tagset::Tagset;

const MODEL_MAGIC: &str = "posgram-tagger-0.1\n";

/// A trained backoff tagger together with what it was trained on.
///
/// Artifacts are immutable once trained and can be shared across threads for inference.
#[derive(Clone, Debug, PartialEq, Decode, Encode)]
pub struct TaggerArtifact {
    pub(crate) name: String,
    pub(crate) tagset: Tagset,
    pub(crate) simplified: bool,
    pub(crate) tagger: Tagger,
    pub(crate) accuracy: Option<f64>,
}

impl TaggerArtifact {
    pub fn new(
        name: impl Into<String>,
        tagset: Tagset,
        simplified: bool,
        tagger: Tagger,
        accuracy: Option<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            tagset,
            simplified,
            tagger,
            accuracy,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn tagset(&self) -> Tagset {
        self.tagset
    }

    pub const fn simplified(&self) -> bool {
        self.simplified
    }

    pub const fn tagger(&self) -> &Tagger {
        &self.tagger
    }

    /// Accuracy on the held-out split, if the split was not empty.
    pub const fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    /// Tags already tokenized words.
    pub fn tag(&self, tokens: &[String]) -> TaggedSentence {
        self.tagger.tag(tokens)
    }

    /// Exports the artifact.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        wtr.write_all(MODEL_MAGIC.as_bytes())?;
        let config = bincode::config::standard();
        bincode::encode_into_std_write(self, &mut wtr, config)?;
        Ok(())
    }

    /// Creates an artifact from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Returns
    ///
    /// An artifact read from `rdr`.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error, it will be returned as is. An unknown header or invalid
    /// fallback patterns are reported as [`PosgramError::InvalidModel`] /
    /// [`PosgramError::DecodeError`].
    ///
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut magic = [0; MODEL_MAGIC.len()];
        rdr.read_exact(&mut magic)?;
        if magic != MODEL_MAGIC.as_bytes() {
            return Err(PosgramError::invalid_model("unknown tagger file header"));
        }
        let config = bincode::config::standard();
        Ok(bincode::decode_from_std_read(&mut rdr, config)?)
    }
}
