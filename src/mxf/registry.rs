//! Element and group dictionary for essence descriptor sets.
//!
//! Maps the labels found in local sets to their registered symbol names and value types, so a
//! descriptor read from a header partition turns into the same [`DomNode`] shape as its
//! registered-XML rendition in a composition playlist.

use crate::dom::model::{DomNode, FieldValue};
use crate::foundation::core::{Uuid, urn_uuid};
use crate::foundation::error::{ImfError, ImfResult};
use crate::mxf::klv::read_batch;
use crate::mxf::local_set::{LocalSet, uuid_from_bytes};
use crate::mxf::ul::Ul;
use byteorder::{BigEndian, ByteOrder};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Namespace of registered groups (sets).
pub const GROUPS_NS: &str = "http://www.smpte-ra.org/reg/395/2014/13/1/aaf";
/// Namespace of registered elements (properties).
pub const ELEMENTS_NS: &str = "http://www.smpte-ra.org/reg/335/2012";
/// Namespace of registered types (record members).
pub const TYPES_NS: &str = "http://www.smpte-ra.org/reg/2003/2012";

const MAX_SUB_DESCRIPTOR_DEPTH: usize = 8;

/// Encoding of an element value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int32,
    Boolean,
    Rational,
    Ul,
    Uuid,
    Utf16String,
    Utf8String,
    FrameLayout,
    /// 8 (code, size) byte pairs.
    RgbaLayout,
    /// Batch of UUIDs rendered as `UUID` members.
    UuidBatch,
    /// Strong reference array to sub-descriptor sets.
    SubDescriptors,
}

/// Registered element.
#[derive(Clone, Copy, Debug)]
pub struct ElementDef {
    pub ul: Ul,
    pub name: &'static str,
    pub value_type: ValueType,
}

const fn smpte(tail: [u8; 12]) -> Ul {
    Ul([
        0x06, 0x0E, 0x2B, 0x34, tail[0], tail[1], tail[2], tail[3], tail[4], tail[5], tail[6],
        tail[7], tail[8], tail[9], tail[10], tail[11],
    ])
}

const fn element(name: &'static str, value_type: ValueType, tail: [u8; 12]) -> ElementDef {
    ElementDef {
        ul: smpte(tail),
        name,
        value_type,
    }
}

const fn group_key(id: u8) -> Ul {
    smpte([
        0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, id, 0x00,
    ])
}

use ValueType as T;

#[rustfmt::skip]
const ELEMENT_DEFS: &[ElementDef] = &[
    element("InstanceID", T::Uuid, [0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x15, 0x02, 0, 0, 0, 0]),
    element("SampleRate", T::Rational, [0x01, 0x01, 0x01, 0x01, 0x04, 0x06, 0x01, 0x01, 0, 0, 0, 0]),
    element("EssenceLength", T::UInt64, [0x01, 0x01, 0x01, 0x02, 0x04, 0x06, 0x01, 0x02, 0, 0, 0, 0]),
    element("ContainerFormat", T::Ul, [0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x04, 0x01, 0x02, 0, 0]),
    element("LinkedTrackID", T::UInt32, [0x01, 0x01, 0x01, 0x05, 0x06, 0x01, 0x01, 0x03, 0x05, 0, 0, 0]),
    element("SubDescriptors", T::SubDescriptors, [0x01, 0x01, 0x01, 0x09, 0x06, 0x01, 0x01, 0x04, 0x06, 0x10, 0, 0]),
    // Picture
    element("PictureCompression", T::Ul, [0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x06, 0x01, 0, 0, 0, 0]),
    element("StoredHeight", T::UInt32, [0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x02, 0x01, 0, 0, 0]),
    element("StoredWidth", T::UInt32, [0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x02, 0x02, 0, 0, 0]),
    element("SampledHeight", T::UInt32, [0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x01, 0x07, 0, 0, 0]),
    element("SampledWidth", T::UInt32, [0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x01, 0x08, 0, 0, 0]),
    element("DisplayHeight", T::UInt32, [0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x01, 0x0B, 0, 0, 0]),
    element("DisplayWidth", T::UInt32, [0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x01, 0x0C, 0, 0, 0]),
    element("FrameLayout", T::FrameLayout, [0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x03, 0x01, 0x04, 0, 0, 0]),
    element("ImageAspectRatio", T::Rational, [0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x01, 0x01, 0x01, 0, 0, 0]),
    element("TransferCharacteristic", T::Ul, [0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x02, 0x01, 0x01, 0x01, 0x02, 0]),
    element("CodingEquations", T::Ul, [0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x02, 0x01, 0x01, 0x03, 0x01, 0]),
    element("ColorPrimaries", T::Ul, [0x01, 0x01, 0x01, 0x09, 0x04, 0x01, 0x02, 0x01, 0x01, 0x06, 0x01, 0]),
    element("ComponentDepth", T::UInt32, [0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x05, 0x03, 0x0A, 0, 0, 0]),
    element("HorizontalSubsampling", T::UInt32, [0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x01, 0x05, 0, 0, 0]),
    element("VerticalSubsampling", T::UInt32, [0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x05, 0x01, 0x10, 0, 0, 0]),
    element("ColorSiting", T::UInt8, [0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x01, 0x06, 0, 0, 0]),
    element("BlackRefLevel", T::UInt32, [0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x03, 0x03, 0, 0, 0]),
    element("WhiteRefLevel", T::UInt32, [0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x03, 0x04, 0, 0, 0]),
    element("ColorRange", T::UInt32, [0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x05, 0x03, 0x05, 0, 0, 0]),
    element("PixelLayout", T::RgbaLayout, [0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x05, 0x03, 0x06, 0, 0, 0]),
    element("ComponentMaxRef", T::UInt32, [0x01, 0x01, 0x01, 0x05, 0x04, 0x01, 0x05, 0x03, 0x0B, 0, 0, 0]),
    element("ComponentMinRef", T::UInt32, [0x01, 0x01, 0x01, 0x05, 0x04, 0x01, 0x05, 0x03, 0x0C, 0, 0, 0]),
    // Sound
    element("AudioSampleRate", T::Rational, [0x01, 0x01, 0x01, 0x05, 0x04, 0x02, 0x03, 0x01, 0x01, 0x01, 0, 0]),
    element("Locked", T::Boolean, [0x01, 0x01, 0x01, 0x04, 0x04, 0x02, 0x03, 0x01, 0x04, 0, 0, 0]),
    element("ChannelCount", T::UInt32, [0x01, 0x01, 0x01, 0x05, 0x04, 0x02, 0x01, 0x01, 0x04, 0, 0, 0]),
    element("QuantizationBits", T::UInt32, [0x01, 0x01, 0x01, 0x04, 0x04, 0x02, 0x03, 0x03, 0x04, 0, 0, 0]),
    element("BlockAlign", T::UInt16, [0x01, 0x01, 0x01, 0x05, 0x04, 0x02, 0x03, 0x02, 0x01, 0, 0, 0]),
    element("AverageBytesPerSecond", T::UInt32, [0x01, 0x01, 0x01, 0x05, 0x04, 0x02, 0x03, 0x03, 0x05, 0, 0, 0]),
    element("ChannelAssignment", T::Ul, [0x01, 0x01, 0x01, 0x07, 0x04, 0x02, 0x01, 0x01, 0x05, 0, 0, 0]),
    // JPEG 2000
    element("Rsiz", T::UInt16, [0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x01, 0, 0, 0]),
    element("Xsiz", T::UInt32, [0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x02, 0, 0, 0]),
    element("Ysiz", T::UInt32, [0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x03, 0, 0, 0]),
    element("XOsiz", T::UInt32, [0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x04, 0, 0, 0]),
    element("YOsiz", T::UInt32, [0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x05, 0, 0, 0]),
    element("XTsiz", T::UInt32, [0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x06, 0, 0, 0]),
    element("YTsiz", T::UInt32, [0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x07, 0, 0, 0]),
    element("XTOsiz", T::UInt32, [0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x08, 0, 0, 0]),
    element("YTOsiz", T::UInt32, [0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x09, 0, 0, 0]),
    element("Csiz", T::UInt16, [0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x0A, 0, 0, 0]),
    element("J2CLayout", T::RgbaLayout, [0x01, 0x01, 0x01, 0x0E, 0x04, 0x01, 0x06, 0x03, 0x0E, 0, 0, 0]),
    // Multichannel audio labels
    element("MCALabelDictionaryID", T::Ul, [0x01, 0x01, 0x01, 0x0E, 0x01, 0x03, 0x07, 0x01, 0x01, 0, 0, 0]),
    element("MCATagSymbol", T::Utf16String, [0x01, 0x01, 0x01, 0x0E, 0x01, 0x03, 0x07, 0x01, 0x02, 0, 0, 0]),
    element("MCATagName", T::Utf16String, [0x01, 0x01, 0x01, 0x0E, 0x01, 0x03, 0x07, 0x01, 0x03, 0, 0, 0]),
    element("MCAChannelID", T::UInt32, [0x01, 0x01, 0x01, 0x0E, 0x01, 0x03, 0x04, 0x0A, 0, 0, 0, 0]),
    element("MCALinkID", T::Uuid, [0x01, 0x01, 0x01, 0x0E, 0x01, 0x01, 0x15, 0x20, 0, 0, 0, 0]),
    element("SoundfieldGroupLinkID", T::Uuid, [0x01, 0x01, 0x01, 0x0E, 0x01, 0x01, 0x15, 0x22, 0, 0, 0, 0]),
    element("GroupOfSoundfieldGroupsLinkID", T::UuidBatch, [0x01, 0x01, 0x01, 0x0E, 0x01, 0x01, 0x15, 0x23, 0, 0, 0, 0]),
    element("RFC5646SpokenLanguage", T::Utf8String, [0x01, 0x01, 0x01, 0x0D, 0x03, 0x01, 0x01, 0x02, 0x03, 0x15, 0, 0]),
];

const GROUP_DEFS: &[(u8, &str)] = &[
    (0x28, "CDCIDescriptor"),
    (0x29, "RGBADescriptor"),
    (0x48, "WAVEPCMDescriptor"),
    (0x5A, "JPEG2000SubDescriptor"),
    (0x67, "ContainerConstraintsSubDescriptor"),
    (0x6A, "MCALabelSubDescriptor"),
    (0x6B, "AudioChannelLabelSubDescriptor"),
    (0x6C, "SoundfieldGroupLabelSubDescriptor"),
    (0x6D, "GroupOfSoundfieldGroupsLabelSubDescriptor"),
];

static ELEMENTS: LazyLock<BTreeMap<Ul, &'static ElementDef>> = LazyLock::new(|| {
    ELEMENT_DEFS
        .iter()
        .map(|d| (d.ul.without_version(), d))
        .collect()
});

static GROUPS: LazyLock<BTreeMap<Ul, &'static str>> = LazyLock::new(|| {
    GROUP_DEFS
        .iter()
        .map(|(id, name)| (group_key(*id).without_version(), *name))
        .collect()
});

/// Registered element for a property label (version byte ignored).
pub fn element_def(ul: &Ul) -> Option<&'static ElementDef> {
    ELEMENTS.get(&ul.without_version()).copied()
}

/// Registered group name for a set key (version byte ignored).
pub fn group_name(key: &Ul) -> Option<&'static str> {
    GROUPS.get(&key.without_version()).copied()
}

fn expect_len(def: &ElementDef, bytes: &[u8], len: usize) -> ImfResult<()> {
    if bytes.len() == len {
        Ok(())
    } else {
        Err(ImfError::mxf(format!(
            "{} is {} bytes, expected {len}",
            def.name,
            bytes.len()
        )))
    }
}

fn frame_layout_name(code: u8) -> Option<&'static str> {
    Some(match code {
        0 => "FullFrame",
        1 => "SeparateFields",
        2 => "OneField",
        3 => "MixedFields",
        4 => "SegmentedFrame",
        _ => return None,
    })
}

fn rgba_component_name(code: u8) -> Option<&'static str> {
    Some(match code {
        0x00 => "CompNull",
        b'R' => "CompRed",
        b'G' => "CompGreen",
        b'B' => "CompBlue",
        b'A' => "CompAlpha",
        b'F' => "CompFill",
        b'P' => "CompPalette",
        b'U' => "CompU",
        b'V' => "CompV",
        b'W' => "CompW",
        b'X' => "CompX",
        b'Y' => "CompY",
        b'Z' => "CompZ",
        b'r' => "CompRedLSBs",
        b'g' => "CompGreenLSBs",
        b'b' => "CompBlueLSBs",
        b'a' => "CompAlphaLSBs",
        _ => return None,
    })
}

/// Decode a scalar element value into its field form.
pub fn decode_scalar(def: &ElementDef, bytes: &[u8]) -> ImfResult<FieldValue> {
    let value = match def.value_type {
        T::UInt8 => {
            expect_len(def, bytes, 1)?;
            FieldValue::text(bytes[0].to_string())
        }
        T::UInt16 => {
            expect_len(def, bytes, 2)?;
            FieldValue::text(BigEndian::read_u16(bytes).to_string())
        }
        T::UInt32 => {
            expect_len(def, bytes, 4)?;
            FieldValue::text(BigEndian::read_u32(bytes).to_string())
        }
        T::UInt64 => {
            expect_len(def, bytes, 8)?;
            FieldValue::text(BigEndian::read_u64(bytes).to_string())
        }
        T::Int32 => {
            expect_len(def, bytes, 4)?;
            FieldValue::text(BigEndian::read_i32(bytes).to_string())
        }
        T::Boolean => {
            expect_len(def, bytes, 1)?;
            FieldValue::text(if bytes[0] == 0 { "false" } else { "true" })
        }
        T::Rational => {
            expect_len(def, bytes, 8)?;
            FieldValue::Fraction {
                num: i64::from(BigEndian::read_i32(&bytes[..4])),
                den: i64::from(BigEndian::read_i32(&bytes[4..])),
            }
        }
        T::Ul => {
            expect_len(def, bytes, 16)?;
            let mut ul = [0u8; 16];
            ul.copy_from_slice(bytes);
            FieldValue::Ul(Ul(ul))
        }
        T::Uuid => FieldValue::text(urn_uuid(uuid_from_bytes(bytes)?)),
        T::Utf16String => {
            if bytes.len() % 2 != 0 {
                return Err(ImfError::mxf(format!("{} has odd UTF-16 length", def.name)));
            }
            let units = bytes.chunks_exact(2).map(BigEndian::read_u16);
            let text: String = char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect();
            FieldValue::text(text.trim_end_matches('\0'))
        }
        T::Utf8String => {
            FieldValue::text(String::from_utf8_lossy(bytes).trim_end_matches('\0'))
        }
        T::FrameLayout => {
            expect_len(def, bytes, 1)?;
            match frame_layout_name(bytes[0]) {
                Some(name) => FieldValue::text(name),
                None => FieldValue::text(bytes[0].to_string()),
            }
        }
        T::RgbaLayout | T::UuidBatch | T::SubDescriptors => {
            return Err(ImfError::mxf(format!("{} is not a scalar element", def.name)));
        }
    };
    Ok(value)
}

fn rgba_layout(def: &ElementDef, bytes: &[u8]) -> ImfResult<DomNode> {
    if bytes.len() % 2 != 0 {
        return Err(ImfError::mxf(format!("{} has odd length {}", def.name, bytes.len())));
    }
    let mut node = DomNode::new(def.name, ELEMENTS_NS);
    for pair in bytes.chunks_exact(2) {
        let code = match rgba_component_name(pair[0]) {
            Some(name) => name.to_owned(),
            None => pair[0].to_string(),
        };
        node.add_child(
            DomNode::new("RGBALayoutItem", TYPES_NS)
                .with_field("Code", FieldValue::text(code))
                .with_field("ComponentSize", FieldValue::text(pair[1].to_string())),
        );
    }
    Ok(node)
}

fn uuid_batch(def: &ElementDef, bytes: &[u8]) -> ImfResult<DomNode> {
    let mut node = DomNode::new(def.name, ELEMENTS_NS);
    for item in read_batch(bytes)? {
        node.add_field("UUID", FieldValue::text(urn_uuid(uuid_from_bytes(item)?)));
    }
    Ok(node)
}

/// Builds descriptor trees from local sets, resolving sub-descriptor strong references.
pub struct DescriptorTreeBuilder<'a> {
    sets: &'a BTreeMap<Uuid, LocalSet>,
}

impl<'a> DescriptorTreeBuilder<'a> {
    /// `sets` indexes every set that may be referenced, by instance UID.
    pub fn new(sets: &'a BTreeMap<Uuid, LocalSet>) -> Self {
        Self { sets }
    }

    /// Tree for `set`; `None` when its group is not registered.
    pub fn build(&self, set: &LocalSet) -> ImfResult<Option<DomNode>> {
        self.build_at(set, 0)
    }

    fn build_at(&self, set: &LocalSet, depth: usize) -> ImfResult<Option<DomNode>> {
        let Some(name) = group_name(&set.key()) else {
            tracing::debug!(key = %set.key(), "unregistered descriptor set skipped");
            return Ok(None);
        };
        if depth > MAX_SUB_DESCRIPTOR_DEPTH {
            return Err(ImfError::mxf(format!(
                "sub-descriptor chain deeper than {MAX_SUB_DESCRIPTOR_DEPTH} at {name}"
            )));
        }
        let mut node = DomNode::new(name, GROUPS_NS);
        for (ul, bytes) in set.items() {
            let Some(def) = element_def(ul) else {
                continue;
            };
            match def.value_type {
                T::RgbaLayout => node.add_child(rgba_layout(def, bytes)?),
                T::UuidBatch => node.add_child(uuid_batch(def, bytes)?),
                T::SubDescriptors => {
                    let mut subs = DomNode::new(def.name, ELEMENTS_NS);
                    for item in read_batch(bytes)? {
                        let id = uuid_from_bytes(item)?;
                        let sub = self.sets.get(&id).ok_or_else(|| {
                            ImfError::mxf(format!("{name} references missing sub-descriptor {id}"))
                        })?;
                        if let Some(child) = self.build_at(sub, depth + 1)? {
                            subs.add_child(child);
                        }
                    }
                    node.add_child(subs);
                }
                _ => node.add_field(def.name, decode_scalar(def, bytes)?),
            }
        }
        Ok(Some(node))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mxf/registry.rs"]
mod tests;
