//! Local-set encoded metadata sets.

use crate::foundation::core::Uuid;
use crate::foundation::error::{ImfError, ImfResult};
use crate::mxf::klv::{read_batch, read_local_items};
use crate::mxf::primer::PrimerPack;
use crate::mxf::ul::{Ul, labels};

/// A metadata set with its properties resolved to element labels through the primer pack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalSet {
    key: Ul,
    items: Vec<(Ul, Vec<u8>)>,
}

impl LocalSet {
    /// Decode a local set value. Tags missing from the primer are dropped.
    pub fn parse(key: Ul, value: &[u8], primer: &PrimerPack) -> ImfResult<Self> {
        let mut items = Vec::new();
        for (tag, bytes) in read_local_items(value)? {
            match primer.lookup(tag) {
                Some(ul) => items.push((ul, bytes.to_vec())),
                None => tracing::debug!(set = %key, tag, "local tag not in primer"),
            }
        }
        Ok(Self { key, items })
    }

    pub fn key(&self) -> Ul {
        self.key
    }

    /// Properties in stream order.
    pub fn items(&self) -> &[(Ul, Vec<u8>)] {
        &self.items
    }

    /// Raw value of a property, matched ignoring the label version byte.
    pub fn get(&self, element: &Ul) -> Option<&[u8]> {
        self.items
            .iter()
            .find(|(ul, _)| ul.eq_ignore_version(element))
            .map(|(_, v)| v.as_slice())
    }

    /// 16-byte UUID property.
    pub fn uuid(&self, element: &Ul) -> ImfResult<Option<Uuid>> {
        self.get(element).map(uuid_from_bytes).transpose()
    }

    /// Batch of 16-byte UUIDs (strong reference arrays).
    pub fn uuid_array(&self, element: &Ul) -> ImfResult<Vec<Uuid>> {
        match self.get(element) {
            Some(bytes) => read_batch(bytes)?.into_iter().map(uuid_from_bytes).collect(),
            None => Ok(Vec::new()),
        }
    }

    pub fn instance_uid(&self) -> ImfResult<Option<Uuid>> {
        self.uuid(&labels::INSTANCE_UID)
    }
}

pub(crate) fn uuid_from_bytes(bytes: &[u8]) -> ImfResult<Uuid> {
    Uuid::from_slice(bytes)
        .map_err(|_| ImfError::mxf(format!("expected a 16-byte UUID, got {} bytes", bytes.len())))
}

#[cfg(test)]
#[path = "../../tests/unit/mxf/local_set.rs"]
mod tests;
