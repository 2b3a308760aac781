//! Error types for confval
//!
//! Every failure carries a root cause ([`ErrorKind`]) and a context chain of
//! [`Source`]s describing where the offending value came from. Context is
//! added from the inside out as an error propagates through keyed sources and
//! composite validation, so the final chain reads outermost first.

use std::fmt;
use std::path::PathBuf;

use crate::rules::BoundKind;

/// Shown in place of secret values
pub(crate) const MASK: &str = "********";

/// Result type alias for confval operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for confval operations
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// The root cause
    pub kind: ErrorKind,
    /// Where the value came from, outermost first (e.g. `[Key("inputs"), Key("features")]`)
    pub context: Vec<Source>,
}

/// Identifies where a value was read from. Only used to annotate errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    /// A key in a dynamic or string map, or a struct field name
    Key(String),
    /// A position in a list
    Index(usize),
    /// An environment variable name
    EnvVar(String),
    /// A file path
    File(PathBuf),
}

impl Source {
    fn is_path_segment(&self) -> bool {
        matches!(self, Source::Key(_) | Source::Index(_))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Key(key) => write!(f, "{}", key),
            Source::Index(idx) => write!(f, "[{}]", idx),
            Source::EnvVar(name) => write!(f, "environment variable \"{}\"", name),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// Coercion failed: the raw value is not of the expected primitive type
    #[error("{value}: invalid type (expected {expected})")]
    InvalidPrimitiveType { value: String, expected: String },

    /// A required value was absent
    #[error("must be defined")]
    MustBeDefined,

    /// A null value where null is disallowed
    #[error("cannot be null")]
    CannotBeNull,

    /// Value outside the configured allowed set
    #[error("{value} is not allowed (valid values: {})", .allowed.join(", "))]
    NotInAllowedSet { value: String, allowed: Vec<String> },

    /// Value violates one configured bound
    #[error("{value} must be {bound} {limit}")]
    OutOfBounds {
        value: String,
        bound: BoundKind,
        limit: String,
    },

    /// Rejected by a custom validator
    #[error("{message}")]
    Custom { message: String },

    /// A map or list was present but empty
    #[error("cannot be empty")]
    EmptyNotAllowed,

    /// A struct received a key it does not declare
    #[error("key is not supported")]
    UnsupportedKey,

    /// A validated struct could not be decoded into the requested type
    #[error("failed to decode: {message}")]
    Decode { message: String },

    /// The prompt could not be read
    #[error("failed to read prompt: {message}")]
    Prompt { message: String },
}

impl Error {
    /// Create an error with no context
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: Vec::new(),
        }
    }

    /// Create a type-mismatch error for a raw value
    pub fn invalid_primitive_type(value: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPrimitiveType {
            value: value.into(),
            expected: expected.into(),
        })
    }

    /// Create a must-be-defined error
    pub fn must_be_defined() -> Self {
        Self::new(ErrorKind::MustBeDefined)
    }

    /// Create a cannot-be-null error
    pub fn cannot_be_null() -> Self {
        Self::new(ErrorKind::CannotBeNull)
    }

    /// Create a not-in-allowed-set error
    pub fn not_in_allowed_set(value: impl Into<String>, allowed: Vec<String>) -> Self {
        Self::new(ErrorKind::NotInAllowedSet {
            value: value.into(),
            allowed,
        })
    }

    /// Create an out-of-bounds error naming the violated bound
    pub fn out_of_bounds(
        value: impl Into<String>,
        bound: BoundKind,
        limit: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::OutOfBounds {
            value: value.into(),
            bound,
            limit: limit.into(),
        })
    }

    /// Create a custom validation error (for use inside injected validators)
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Custom {
            message: message.into(),
        })
    }

    /// Create an empty-not-allowed error
    pub fn empty_not_allowed() -> Self {
        Self::new(ErrorKind::EmptyNotAllowed)
    }

    /// Create an unsupported-key error already wrapped with the offending key
    pub fn unsupported_key(key: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedKey).with_key(key)
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode {
            message: message.into(),
        })
    }

    /// Create a prompt read error
    pub fn prompt(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Prompt {
            message: message.into(),
        })
    }

    /// Add an outer layer of context. The root cause is left untouched.
    pub fn wrap(mut self, source: Source) -> Self {
        self.context.insert(0, source);
        self
    }

    /// Wrap with a map key or field name
    pub fn with_key(self, key: impl Into<String>) -> Self {
        self.wrap(Source::Key(key.into()))
    }

    /// Wrap with a list index
    pub fn with_index(self, idx: usize) -> Self {
        self.wrap(Source::Index(idx))
    }

    /// Wrap with an environment variable name
    pub fn with_env_var(self, name: impl Into<String>) -> Self {
        self.wrap(Source::EnvVar(name.into()))
    }

    /// Wrap with a file path
    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        self.wrap(Source::File(path.into()))
    }

    /// Replace the offending value with `********`, for secrets. Rule
    /// literals (allowed values, bound limits) are kept.
    pub fn masked(mut self) -> Self {
        match &mut self.kind {
            ErrorKind::InvalidPrimitiveType { value, .. }
            | ErrorKind::NotInAllowedSet { value, .. }
            | ErrorKind::OutOfBounds { value, .. } => *value = MASK.to_string(),
            _ => {}
        }
        self
    }

    /// The outermost source, if any context was attached
    pub fn origin(&self) -> Option<&Source> {
        self.context.first()
    }

    /// The dotted key path of this error, ignoring env var and file context
    /// (e.g. `"inputs.features[0].name"`)
    pub fn path(&self) -> String {
        let mut path = String::new();
        for source in self.context.iter().filter(|s| s.is_path_segment()) {
            if let Source::Key(key) = source {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(key);
            } else {
                path.push_str(&source.to_string());
            }
        }
        path
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Runs of keys/indexes render as one dotted path; env vars and files
        // each stand alone, and groups are separated by ": "
        let mut groups: Vec<String> = Vec::new();
        let mut in_path = false;
        for source in &self.context {
            match source {
                Source::Key(key) if in_path => {
                    if let Some(last) = groups.last_mut() {
                        last.push('.');
                        last.push_str(key);
                    }
                }
                Source::Index(_) if in_path => {
                    if let Some(last) = groups.last_mut() {
                        last.push_str(&source.to_string());
                    }
                }
                _ => {
                    groups.push(source.to_string());
                    in_path = source.is_path_segment();
                }
            }
        }

        for group in &groups {
            write!(f, "{}: ", group)?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
