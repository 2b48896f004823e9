use crate::foundation::error::{ImfError, ImfResult};
use crate::mxf::klv::read_batch;
use crate::mxf::ul::Ul;
use std::collections::BTreeMap;

const ENTRY_LEN: usize = 18;

/// Primer pack: maps the 2-byte local tags of a header partition to element labels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrimerPack {
    entries: BTreeMap<u16, Ul>,
}

impl PrimerPack {
    /// Parse the value of a primer pack triplet.
    pub fn parse(value: &[u8]) -> ImfResult<Self> {
        let mut entries = BTreeMap::new();
        for item in read_batch(value)? {
            if item.len() != ENTRY_LEN {
                return Err(ImfError::mxf(format!(
                    "primer pack entries are {} bytes, expected {ENTRY_LEN}",
                    item.len()
                )));
            }
            let tag = u16::from_be_bytes([item[0], item[1]]);
            let mut ul = [0u8; 16];
            ul.copy_from_slice(&item[2..]);
            entries.insert(tag, Ul(ul));
        }
        Ok(Self { entries })
    }

    pub fn lookup(&self, tag: u16) -> Option<Ul> {
        self.entries.get(&tag).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, Ul)> + '_ {
        self.entries.iter().map(|(t, u)| (*t, *u))
    }
}
