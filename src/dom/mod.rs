//! Normalized descriptor trees and their XML ingestion.

pub(crate) mod model;
pub(crate) mod xml;
