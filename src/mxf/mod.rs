//! MXF header partition reading: KLV triplets, primer packs, local sets and the descriptor
//! element registry.

pub(crate) mod header;
pub(crate) mod klv;
pub(crate) mod local_set;
pub(crate) mod primer;
pub(crate) mod registry;
pub(crate) mod ul;
