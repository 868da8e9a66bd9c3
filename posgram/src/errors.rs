//! Definition of errors.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = PosgramError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PosgramError {
    /// The training corpus is empty.
    #[error("NoCorpusError: no training corpus supplied")]
    NoCorpus,

    /// The tagset is not one of the supported tagsets.
    #[error("UnsupportedTagsetError: {0} (choose from brown, parole)")]
    UnsupportedTagset(String),

    /// No fallback patterns exist for the requested language.
    #[error("UnsupportedLanguageError: no regex patterns for language {0:?}")]
    UnsupportedLanguage(String),

    /// A persisted tagger could not be found.
    #[error("ArtifactNotFoundError: tagger {name:?} not found at {}", path.display())]
    ArtifactNotFound { name: String, path: PathBuf },

    /// Aggregation was requested before the n-grams were enriched with record ids.
    #[error("NotEnrichedError: enrich the n-grams with record ids first")]
    NotEnriched,

    #[error("UnknownColumnError: {0:?}")]
    UnknownColumn(String),

    #[error("ColumnTypeError: column {column:?} is not a {expected} column")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgumentError),

    #[error(transparent)]
    InvalidModel(#[from] InvalidModelError),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    DecodeError(#[from] bincode::error::DecodeError),

    #[error(transparent)]
    EncodeError(#[from] bincode::error::EncodeError),

    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

impl PosgramError {
    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(InvalidModelError { msg: msg.into() })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn column_type<S>(column: S, expected: &'static str) -> Self
    where
        S: Into<String>,
    {
        Self::ColumnType {
            column: column.into(),
            expected,
        }
    }
}

/// Error used when the model is invalid.
#[derive(Debug, Error)]
#[error("InvalidModelError: {msg}")]
pub struct InvalidModelError {
    /// Error message.
    pub(crate) msg: String,
}

/// Error used when the argument is invalid.
#[derive(Debug, Error)]
#[error("InvalidArgumentError: {arg}: {msg}")]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

/// Result of a stage that may succeed in a reduced form.
///
/// A stage that cannot do its full job (e.g. no stemmer exists for the language) still returns a
/// value, together with the reasons it had to fall back.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Complete(T),
    Degraded { value: T, reasons: Vec<String> },
}

impl<T> Outcome<T> {
    pub fn degraded<S>(value: T, reason: S) -> Self
    where
        S: Into<String>,
    {
        Self::Degraded {
            value,
            reasons: vec![reason.into()],
        }
    }

    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            Self::Complete(_) => &[],
            Self::Degraded { reasons, .. } => reasons,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Complete(value) | Self::Degraded { value, .. } => value,
        }
    }

    /// Splits the outcome into its value and the degradation reasons (empty when complete).
    pub fn into_parts(self) -> (T, Vec<String>) {
        match self {
            Self::Complete(value) => (value, vec![]),
            Self::Degraded { value, reasons } => (value, reasons),
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Complete(value) => Outcome::Complete(f(value)),
            Self::Degraded { value, reasons } => Outcome::Degraded {
                value: f(value),
                reasons,
            },
        }
    }
}
