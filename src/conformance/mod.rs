//! Conformance of declared essence descriptors with the essence they describe.

pub(crate) mod descriptors;
