//! Structured diagnostics accumulated by every validation phase.
//!
//! Validators return a [`Diagnostics`] value instead of writing into a shared logger; callers merge
//! the values they receive and decide pass/fail from the presence of [`Severity::Fatal`] entries.

use crate::foundation::error::{ImfError, ImfResult};
use std::fmt;

/// How a diagnostic affects the validity of the checked object.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Severity {
    /// Informational, no effect on validity.
    Warning,
    /// Recorded defect; checking continues but the object is invalid.
    NonFatal,
    /// Stops the current construction or validation phase.
    Fatal,
}

/// Diagnostic category.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum ErrorCode {
    /// Playlist structure (segments, sequences, resources).
    CplStructure,
    /// ST 2067-2 core constraints.
    CoreConstraints,
    /// Application profile rules.
    ApplicationProfile,
    /// Essence descriptors and referenced track files.
    EssenceComponent,
    /// Internal consistency failures.
    Internal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Warning => "WARNING",
            Self::NonFatal => "NON_FATAL",
            Self::Fatal => "FATAL",
        };
        f.write_str(s)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CplStructure => "IMF_CPL_ERROR",
            Self::CoreConstraints => "IMF_CORE_CONSTRAINTS_ERROR",
            Self::ApplicationProfile => "APPLICATION_COMPOSITION_ERROR",
            Self::EssenceComponent => "IMF_ESSENCE_COMPONENT_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        };
        f.write_str(s)
    }
}

/// A single structured diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    /// Category.
    pub code: ErrorCode,
    /// Severity.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
        }
    }

    pub fn fatal(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Fatal, message)
    }

    pub fn non_fatal(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::NonFatal, message)
    }

    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.code, self.severity, self.message)
    }
}

/// Ordered list of diagnostics produced by one validation call.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn fatal(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.push(Diagnostic::fatal(code, message));
    }

    pub fn non_fatal(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.push(Diagnostic::non_fatal(code, message));
    }

    pub fn warning(&mut self, code: ErrorCode, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%code, "{message}");
        self.push(Diagnostic::warning(code, message));
    }

    /// Append every entry of `other`, preserving order.
    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }

    pub fn has_fatal(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Fatal)
    }

    /// `true` when anything other than warnings was recorded.
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity != Severity::Warning)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Turn the accumulated list into a failure when it holds at least one FATAL entry.
    pub fn fail_on_fatal(self) -> ImfResult<Self> {
        if self.has_fatal() {
            Err(ImfError::Fatal(self))
        } else {
            Ok(self)
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = Diagnostic>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/diagnostics.rs"]
mod tests;
