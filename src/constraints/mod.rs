//! Structural constraints on compositions.

pub(crate) mod core;
