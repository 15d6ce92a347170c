use std::collections::BTreeMap;

/// Convenience result type used across adforge.
pub type AdResult<T> = Result<T, AdError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum AdError {
    /// Image loading or decoding failed where it could not be recovered locally.
    #[error("image error: {0}")]
    Image(String),

    /// Drawing surface could not be allocated or painted.
    #[error("canvas error: {0}")]
    Canvas(String),

    /// Persisted template storage failed (quota, IO, corrupt data).
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid user-provided template or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AdError {
    /// Build an [`AdError::Image`] value.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Build an [`AdError::Canvas`] value.
    pub fn canvas(msg: impl Into<String>) -> Self {
        Self::Canvas(msg.into())
    }

    /// Build an [`AdError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Build an [`AdError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AdError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Category this error is reported under.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Image(_) => ErrorKind::Image,
            Self::Canvas(_) => ErrorKind::Canvas,
            Self::Storage(_) | Self::Other(_) => ErrorKind::Storage,
            Self::Validation(_) | Self::Serde(_) => ErrorKind::Validation,
        }
    }
}

/// Error categories surfaced to users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Image load/decode/timeout/cross-origin failures.
    Image,
    /// Surface allocation or tainting.
    Canvas,
    /// Template store quota or parse failures.
    Storage,
    /// Remote fetch failures.
    Network,
    /// Malformed templates or configuration.
    Validation,
}

impl ErrorKind {
    /// Human-readable title shown in front of a report message.
    pub fn title(self) -> &'static str {
        match self {
            Self::Image => "Image Error",
            Self::Canvas => "Canvas Error",
            Self::Storage => "Storage Error",
            Self::Network => "Network Error",
            Self::Validation => "Validation Error",
        }
    }
}

/// Structured error value handed to callers instead of a thrown error.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorReport {
    /// Error category.
    pub kind: ErrorKind,
    /// User-facing message.
    pub message: String,
    /// Optional key/value context (operation name, image URL, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl ErrorReport {
    /// Build a report without context.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    /// Attach one context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Report for a failed store operation such as `"save template"`.
    pub fn storage(err: &AdError, operation: &str) -> Self {
        let message = match err {
            AdError::Storage(msg) if msg.contains("quota") => {
                "Storage quota exceeded. Please clear some data.".to_owned()
            }
            _ => format!("Failed to {operation}. Please try again."),
        };
        Self::new(ErrorKind::Storage, message)
            .with_context("operation", operation)
            .with_context("cause", err.to_string())
    }

    /// One-line message with the per-kind title, e.g. `"Storage Error: ..."`.
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.kind.title(), self.message)
    }
}

impl From<&AdError> for ErrorReport {
    fn from(err: &AdError) -> Self {
        let message = match err {
            AdError::Image(m)
            | AdError::Canvas(m)
            | AdError::Storage(m)
            | AdError::Validation(m)
            | AdError::Serde(m) => m.clone(),
            AdError::Other(e) => format!("{e:#}"),
        };
        Self::new(err.kind(), message)
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_message())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
