//! Composition playlist model, boundary document and virtual track reconstruction.

pub(crate) mod def;
pub(crate) mod model;
pub(crate) mod playlist;
pub(crate) mod reconstruct;
pub(crate) mod virtual_track;
