use std::time::Duration;

use thiserror::Error;

/// Top-level error returned by [`crate::FeedClient::fetch`].
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Couldn't fetch feed from {endpoint}: {cause}")]
    Fetch {
        endpoint: String,
        #[source]
        cause: FetchCause,
    },
}

impl Error {
    pub(crate) fn fetch(endpoint: impl Into<String>, cause: impl Into<FetchCause>) -> Self {
        Error::Fetch { endpoint: endpoint.into(), cause: cause.into() }
    }

    /// The underlying fetch cause, if this is not a configuration error.
    pub fn cause(&self) -> Option<&FetchCause> {
        match self {
            Error::Fetch { cause, .. } => Some(cause),
            Error::Config(_) => None,
        }
    }

    pub fn path_error(&self) -> Option<&PathError> {
        match self.cause() {
            Some(FetchCause::Path(err)) => Some(err),
            _ => None,
        }
    }

    pub fn mapping_error(&self) -> Option<&MappingError> {
        match self.cause() {
            Some(FetchCause::Mapping(err)) => Some(err),
            _ => None,
        }
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self.cause() {
            Some(FetchCause::Validation(err)) => Some(err),
            _ => None,
        }
    }
}

/// Bad or missing client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unknown unit system '{0}'. Supported unit systems: c (international), f (US).")]
    InvalidUnitSystem(String),

    #[error("Unknown feed shape '{0}'. Supported shapes: json, xml.")]
    InvalidShape(String),

    #[error("No location was given")]
    NoLocation,

    #[error("The XML feed needs a numeric location id, got '{0}'")]
    LocationNotNumeric(String),

    #[error("Invalid feed endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Why a fetch failed after configuration was accepted.
#[derive(Debug, Error)]
pub enum FetchCause {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<RecordError> for FetchCause {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Mapping(err) => FetchCause::Mapping(err),
            RecordError::Validation(err) => FetchCause::Validation(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Content is not a feed document of the expected shape.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse feed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse feed XML: {0}")]
    Xml(String),

    #[error("Feed has no '{0}' root")]
    MissingRoot(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathReason {
    SubpathMissing,
    KeyMissing,
    NotASection,
}

impl PathReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathReason::SubpathMissing => "subpath-missing",
            PathReason::KeyMissing => "key-missing",
            PathReason::NotASection => "not-a-section",
        }
    }
}

/// A section or key is absent at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Section '{path}' not available: {}", .reason.as_str())]
pub struct PathError {
    pub path: String,
    pub reason: PathReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingReason {
    Missing,
    Type,
}

impl MappingReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingReason::Missing => "missing",
            MappingReason::Type => "type",
        }
    }
}

/// A raw field could not be bound to a record field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Field '{field}' in section '{section}': {}", .reason.as_str())]
pub struct MappingError {
    pub section: &'static str,
    pub field: &'static str,
    pub reason: MappingReason,
}

/// A record rejected a value at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value '{value}' for '{field}': {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Self { field, value: value.to_string(), reason: reason.into() }
    }
}

/// Failure while turning one raw section into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
