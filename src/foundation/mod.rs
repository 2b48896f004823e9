//! Value types, error taxonomy and diagnostics shared by every component.

pub(crate) mod core;
pub(crate) mod diagnostics;
pub(crate) mod error;
