//! Error types for the versit codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing or unbalanced BEGIN/END envelope")]
  MissingEnvelope,

  #[error("{component} has no VERSION line")]
  MissingVersion { component: String },

  #[error("{component} does not support version {version}")]
  UnsupportedVersion { component: String, version: String },

  #[error("malformed content-line: {0}")]
  MalformedContentLine(String),

  #[error("malformed argument {argument:?}: {reason}")]
  MalformedArgument { argument: String, reason: String },

  #[error("malformed value for {property}: {reason}")]
  MalformedValue { property: String, reason: String },

  #[error("unknown property {0}")]
  UnknownProperty(String),

  #[error("{property} may occur only once in {component}")]
  CardinalityViolation { property: String, component: String },

  #[error("{subject} is not supported by version {version}")]
  VersionMismatch { subject: String, version: String },

  #[error("{component} is missing required fields: {}", fields.join(", "))]
  MissingRequiredField { component: String, fields: Vec<String> },

  #[error("{component}: {reason}")]
  ConstraintViolation { component: String, reason: String },

  #[error("{child} cannot be nested inside {parent}")]
  InvalidNesting { parent: String, child: String },

  #[error("blob at {0} is not available locally")]
  ExternalBlob(String),

  #[error("line {number} ({line:?}): {source}")]
  AtLine {
    number: usize,
    line:   String,
    #[source]
    source: Box<Error>,
  },

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("base64 error: {0}")]
  Base64(#[from] base64::DecodeError),
}

impl Error {
  /// Strip any [`Error::AtLine`] wrappers and return the underlying error.
  pub fn root_cause(&self) -> &Error {
    match self {
      Self::AtLine { source, .. } => source.root_cause(),
      other => other,
    }
  }

  pub(crate) fn malformed_value(
    property: &str,
    reason: impl Into<String>,
  ) -> Self {
    Self::MalformedValue {
      property: property.to_string(),
      reason:   reason.into(),
    }
  }

  pub(crate) fn malformed_argument(
    argument: &str,
    reason: impl Into<String>,
  ) -> Self {
    Self::MalformedArgument {
      argument: argument.to_string(),
      reason:   reason.into(),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
