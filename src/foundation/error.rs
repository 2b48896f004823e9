use crate::foundation::diagnostics::Diagnostics;

/// Convenience result type used across the crate.
pub type ImfResult<T> = Result<T, ImfError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ImfError {
    /// Invalid user-provided or composition data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed or unsupported MXF structures.
    #[error("mxf error: {0}")]
    Mxf(String),

    /// Malformed XML fragments.
    #[error("xml error: {0}")]
    Xml(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Construction stopped on FATAL diagnostics; carries everything accumulated so far.
    #[error("fatal diagnostics reported:\n{0}")]
    Fatal(Diagnostics),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImfError {
    /// Build a [`ImfError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ImfError::Mxf`] value.
    pub fn mxf(msg: impl Into<String>) -> Self {
        Self::Mxf(msg.into())
    }

    /// Build a [`ImfError::Xml`] value.
    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml(msg.into())
    }

    /// Build a [`ImfError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Diagnostics attached to a [`ImfError::Fatal`] failure.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::Fatal(d) => Some(d),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImfError {
    fn from(e: std::io::Error) -> Self {
        Self::Other(anyhow::Error::new(e))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
