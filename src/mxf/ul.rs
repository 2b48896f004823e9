//! SMPTE Universal Labels.
//!
//! Labels are 16-byte identifiers. Byte 8 (index 7) is the registry version and is ignored when
//! two labels are compared for meaning, so a descriptor written against an older registry still
//! matches the same property in a newer one.

use crate::foundation::error::{ImfError, ImfResult};
use std::fmt;

/// A 16-byte Universal Label.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ul(pub [u8; 16]);

const VERSION_BYTE: usize = 7;

impl Ul {
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// SMPTE-registered labels start with `06 0E 2B 34`.
    pub fn is_smpte(&self) -> bool {
        self.0[0..4] == labels::SMPTE_PREFIX
    }

    pub fn version(&self) -> u8 {
        self.0[VERSION_BYTE]
    }

    /// Copy of the label with the version byte cleared.
    pub fn without_version(&self) -> Ul {
        let mut bytes = self.0;
        bytes[VERSION_BYTE] = 0;
        Ul(bytes)
    }

    /// Compare two labels ignoring the registry version byte.
    pub fn eq_ignore_version(&self, other: &Ul) -> bool {
        self.without_version() == other.without_version()
    }

    /// Partition packs share the first 13 bytes; byte 13 selects header/body/footer.
    pub fn is_partition_pack(&self) -> bool {
        self.0[0..13] == labels::PARTITION_PACK_BASE[0..13] && (0x02..=0x04).contains(&self.0[13])
    }

    pub fn is_header_partition_pack(&self) -> bool {
        self.is_partition_pack() && self.0[13] == 0x02
    }

    pub fn is_primer_pack(&self) -> bool {
        self.eq_ignore_version(&labels::PRIMER_PACK)
    }

    pub fn is_fill_item(&self) -> bool {
        self.0[0..4] == labels::FILL_ITEM.0[0..4] && self.0[8..13] == labels::FILL_ITEM.0[8..13]
    }

    /// Local-set encoded metadata (category 02, registry 53).
    pub fn is_local_set(&self) -> bool {
        self.is_smpte() && self.0[4] == 0x02 && self.0[5] == 0x53
    }

    /// Parse `urn:smpte:ul:060e2b34.04010101.0d010301.027f0100` (case-insensitive, dots optional).
    pub fn parse_urn(text: &str) -> ImfResult<Ul> {
        let trimmed = text.trim();
        let hex = match trimmed.get(..13) {
            Some(prefix) if prefix.eq_ignore_ascii_case("urn:smpte:ul:") => &trimmed[13..],
            _ => trimmed,
        };
        let digits: String = hex.chars().filter(|c| *c != '.').collect();
        if digits.len() != 32 {
            return Err(ImfError::validation(format!("invalid UL '{text}'")));
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = digits
                .get(2 * i..2 * i + 2)
                .ok_or_else(|| ImfError::validation(format!("invalid UL '{text}'")))?;
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|e| ImfError::validation(format!("invalid UL '{text}': {e}")))?;
        }
        Ok(Ul(bytes))
    }
}

impl fmt::Debug for Ul {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ul({self})")
    }
}

impl fmt::Display for Ul {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("urn:smpte:ul:")?;
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 && i % 4 == 0 {
                f.write_str(".")?;
            }
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 16]> for Ul {
    fn from(bytes: [u8; 16]) -> Self {
        Ul(bytes)
    }
}

/// Well-known Universal Labels.
pub mod labels {
    use super::Ul;

    /// SMPTE label prefix.
    pub const SMPTE_PREFIX: [u8; 4] = [0x06, 0x0E, 0x2B, 0x34];

    /// Partition pack base (bytes 13..16 vary).
    pub const PARTITION_PACK_BASE: [u8; 16] = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Closed complete header partition pack.
    pub const HEADER_PARTITION_CLOSED_COMPLETE: Ul = Ul([
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x02, 0x04,
        0x00,
    ]);

    /// Primer pack.
    pub const PRIMER_PACK: Ul = Ul([
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x05, 0x01,
        0x00,
    ]);

    /// KLV fill item.
    pub const FILL_ITEM: Ul = Ul([
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x02, 0x03, 0x01, 0x02, 0x10, 0x01, 0x00, 0x00,
        0x00,
    ]);

    /// Operational pattern OP1a (bytes 14..16 carry qualifiers).
    pub const OP1A: Ul = Ul([
        0x06, 0x0E, 0x2B, 0x34, 0x04, 0x01, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x01, 0x09,
        0x00,
    ]);

    /// Source package set.
    pub const SOURCE_PACKAGE: Ul = Ul([
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x37,
        0x00,
    ]);

    /// Material package set.
    pub const MATERIAL_PACKAGE: Ul = Ul([
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x36,
        0x00,
    ]);

    /// Multiple descriptor set.
    pub const MULTIPLE_DESCRIPTOR: Ul = Ul([
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x44,
        0x00,
    ]);

    /// Preface set.
    pub const PREFACE: Ul = Ul([
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x2F,
        0x00,
    ]);

    /// InstanceUID property (local tag 3C0A).
    pub const INSTANCE_UID: Ul = Ul([
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x15, 0x02, 0x00, 0x00, 0x00,
        0x00,
    ]);

    /// PackageUID property (local tag 4401).
    pub const PACKAGE_UID: Ul = Ul([
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x15, 0x10, 0x00, 0x00, 0x00,
        0x00,
    ]);

    /// Source package Descriptor strong reference (local tag 4701).
    pub const DESCRIPTOR_REF: Ul = Ul([
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x04, 0x02, 0x03, 0x00,
        0x00,
    ]);

    /// Multiple descriptor FileDescriptors strong reference array (local tag 3F01).
    pub const FILE_DESCRIPTORS: Ul = Ul([
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x06, 0x01, 0x01, 0x04, 0x06, 0x0B, 0x00,
        0x00,
    ]);

    /// SubDescriptors strong reference array.
    pub const SUB_DESCRIPTORS: Ul = Ul([
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x09, 0x06, 0x01, 0x01, 0x04, 0x06, 0x10, 0x00,
        0x00,
    ]);
}

#[cfg(test)]
#[path = "../../tests/unit/mxf/ul.rs"]
mod tests;
