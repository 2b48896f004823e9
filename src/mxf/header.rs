//! Header partition access.
//!
//! [`HeaderPartition`] is what the conformance check needs from an essence file: the package it
//! belongs to, where its essence descriptors live and the primer pack to decode them.
//! [`MxfHeaderPartition`] implements it over a buffer holding the start of an MXF file.

use crate::dom::model::DomNode;
use crate::foundation::core::Uuid;
use crate::foundation::diagnostics::{Diagnostics, ErrorCode};
use crate::foundation::error::{ImfError, ImfResult};
use crate::mxf::klv::{KlvHeader, KlvReader, read_batch};
use crate::mxf::local_set::{LocalSet, uuid_from_bytes};
use crate::mxf::primer::PrimerPack;
use crate::mxf::registry::DescriptorTreeBuilder;
use crate::mxf::ul::{Ul, labels};
use byteorder::{BigEndian, ReadBytesExt};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};

/// Random access to the bytes of one essence file.
pub trait ByteRangeProvider {
    /// `length` bytes starting at `offset`.
    fn byte_range(&self, offset: u64, length: u64) -> ImfResult<Cow<'_, [u8]>>;
}

/// [`ByteRangeProvider`] over an in-memory buffer.
#[derive(Clone, Copy, Debug)]
pub struct SliceByteProvider<'a> {
    data: &'a [u8],
}

impl<'a> SliceByteProvider<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl ByteRangeProvider for SliceByteProvider<'_> {
    fn byte_range(&self, offset: u64, length: u64) -> ImfResult<Cow<'_, [u8]>> {
        let range = usize::try_from(offset)
            .ok()
            .zip(usize::try_from(length).ok())
            .and_then(|(start, len)| Some(start..start.checked_add(len)?));
        range
            .and_then(|r| self.data.get(r))
            .map(Cow::Borrowed)
            .ok_or_else(|| {
                ImfError::mxf(format!(
                    "byte range {offset}+{length} outside {} byte buffer",
                    self.data.len()
                ))
            })
    }
}

/// Structural metadata of one essence file.
pub trait HeaderPartition {
    /// Material number of the top-level file package; equals the track file id.
    fn package_uuid(&self) -> Uuid;

    /// Essence descriptor triplets referenced by the file package.
    fn essence_descriptor_headers(&self) -> &[KlvHeader];

    /// Sub-descriptor triplets reachable from the essence descriptors.
    fn sub_descriptor_headers(&self) -> &[KlvHeader];

    fn primer_pack(&self) -> &PrimerPack;

    /// IMF track file constraints on the partition (ST 2067-5); failures are FATAL.
    fn check_imf_constraints(&self) -> Diagnostics;
}

/// Header partition pack fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionPack {
    pub major_version: u16,
    pub minor_version: u16,
    pub kag_size: u32,
    pub this_partition: u64,
    pub previous_partition: u64,
    pub footer_partition: u64,
    pub header_byte_count: u64,
    pub index_byte_count: u64,
    pub index_sid: u32,
    pub body_offset: u64,
    pub body_sid: u32,
    pub operational_pattern: Ul,
    pub essence_containers: Vec<Ul>,
}

impl PartitionPack {
    /// Parse a partition pack value.
    pub fn parse(value: &[u8]) -> ImfResult<Self> {
        let short = |_| ImfError::mxf("truncated partition pack");
        let mut cursor = Cursor::new(value);
        let major_version = cursor.read_u16::<BigEndian>().map_err(short)?;
        let minor_version = cursor.read_u16::<BigEndian>().map_err(short)?;
        let kag_size = cursor.read_u32::<BigEndian>().map_err(short)?;
        let this_partition = cursor.read_u64::<BigEndian>().map_err(short)?;
        let previous_partition = cursor.read_u64::<BigEndian>().map_err(short)?;
        let footer_partition = cursor.read_u64::<BigEndian>().map_err(short)?;
        let header_byte_count = cursor.read_u64::<BigEndian>().map_err(short)?;
        let index_byte_count = cursor.read_u64::<BigEndian>().map_err(short)?;
        let index_sid = cursor.read_u32::<BigEndian>().map_err(short)?;
        let body_offset = cursor.read_u64::<BigEndian>().map_err(short)?;
        let body_sid = cursor.read_u32::<BigEndian>().map_err(short)?;
        let mut op = [0u8; 16];
        cursor.read_exact(&mut op).map_err(short)?;
        let batch_start = cursor.position() as usize;

        let essence_containers = read_batch(&value[batch_start..])?
            .into_iter()
            .filter(|item| item.len() == 16)
            .map(|item| {
                let mut ul = [0u8; 16];
                ul.copy_from_slice(item);
                Ul(ul)
            })
            .collect();

        Ok(Self {
            major_version,
            minor_version,
            kag_size,
            this_partition,
            previous_partition,
            footer_partition,
            header_byte_count,
            index_byte_count,
            index_sid,
            body_offset,
            body_sid,
            operational_pattern: Ul(op),
            essence_containers,
        })
    }

    /// OP1a: item complexity 1, package complexity a (qualifier bytes ignored).
    pub fn is_op1a(&self) -> bool {
        let op = self.operational_pattern.without_version();
        op.as_bytes()[..14] == labels::OP1A.without_version().as_bytes()[..14]
    }
}

/// Header partition parsed from the leading bytes of an MXF file.
#[derive(Clone, Debug)]
pub struct MxfHeaderPartition {
    partition_pack: PartitionPack,
    primer: PrimerPack,
    package_uuid: Option<Uuid>,
    source_package_count: usize,
    descriptors: Vec<KlvHeader>,
    sub_descriptors: Vec<KlvHeader>,
}

impl MxfHeaderPartition {
    /// Parse the header partition at the start of `bytes`.
    ///
    /// Reading stops after the header metadata (as sized by the partition pack) or at the end of
    /// the buffer, whichever comes first.
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn parse(bytes: &[u8]) -> ImfResult<Self> {
        let mut reader = KlvReader::new(bytes);
        let (pack_header, pack_value) = reader
            .read_klv()?
            .ok_or_else(|| ImfError::mxf("buffer too small for a partition pack"))?;
        if !pack_header.key.is_header_partition_pack() {
            return Err(ImfError::mxf(format!(
                "expected a header partition pack, found {}",
                pack_header.key
            )));
        }
        let partition_pack = PartitionPack::parse(pack_value)?;
        let metadata_end = match partition_pack.header_byte_count {
            0 => bytes.len() as u64,
            n => (pack_header.offset + pack_header.total_len()).saturating_add(n),
        };

        let mut primer: Option<PrimerPack> = None;
        let mut sets: BTreeMap<Uuid, (KlvHeader, LocalSet)> = BTreeMap::new();
        let mut source_packages: Vec<LocalSet> = Vec::new();

        while (reader.position() as u64) < metadata_end {
            let Some((header, value)) = reader.read_klv()? else {
                break;
            };
            let key = header.key;
            if key.is_fill_item() {
                continue;
            }
            if key.is_primer_pack() {
                primer = Some(PrimerPack::parse(value)?);
                continue;
            }
            if key.is_partition_pack() {
                break;
            }
            if !key.is_local_set() {
                continue;
            }
            let primer = primer
                .as_ref()
                .ok_or_else(|| ImfError::mxf("local set found before the primer pack"))?;
            let set = LocalSet::parse(key, value, primer)?;
            if key.eq_ignore_version(&labels::SOURCE_PACKAGE) {
                source_packages.push(set.clone());
            }
            if let Some(id) = set.instance_uid()? {
                sets.insert(id, (header, set));
            }
        }

        let primer = primer.ok_or_else(|| ImfError::mxf("header partition has no primer pack"))?;

        let mut package_uuid = None;
        let mut descriptors = Vec::new();
        let mut sub_descriptors = Vec::new();
        if let Some(package) = source_packages.first() {
            let umid = package
                .get(&labels::PACKAGE_UID)
                .ok_or_else(|| ImfError::mxf("source package has no PackageUID"))?;
            if umid.len() != 32 {
                return Err(ImfError::mxf(format!("PackageUID is {} bytes", umid.len())));
            }
            package_uuid = Some(uuid_from_bytes(&umid[16..])?);

            if let Some(descriptor_id) = package.uuid(&labels::DESCRIPTOR_REF)? {
                let entry = sets.get(&descriptor_id).ok_or_else(|| {
                    ImfError::mxf(format!("descriptor {descriptor_id} is not in the header"))
                })?;
                let multiple = entry.1.key().eq_ignore_version(&labels::MULTIPLE_DESCRIPTOR);
                let file_descriptors = if multiple {
                    entry
                        .1
                        .uuid_array(&labels::FILE_DESCRIPTORS)?
                        .into_iter()
                        .map(|id| {
                            sets.get(&id).ok_or_else(|| {
                                ImfError::mxf(format!("file descriptor {id} is not in the header"))
                            })
                        })
                        .collect::<ImfResult<Vec<_>>>()?
                } else {
                    vec![entry]
                };
                for (header, set) in file_descriptors {
                    descriptors.push(*header);
                    collect_sub_descriptors(set, &sets, &mut sub_descriptors, 0)?;
                }
            }
        }

        tracing::debug!(
            package = ?package_uuid,
            descriptors = descriptors.len(),
            sub_descriptors = sub_descriptors.len(),
            "header partition parsed"
        );

        Ok(Self {
            partition_pack,
            primer,
            package_uuid,
            source_package_count: source_packages.len(),
            descriptors,
            sub_descriptors,
        })
    }

    pub fn partition_pack(&self) -> &PartitionPack {
        &self.partition_pack
    }
}

fn collect_sub_descriptors(
    set: &LocalSet,
    sets: &BTreeMap<Uuid, (KlvHeader, LocalSet)>,
    out: &mut Vec<KlvHeader>,
    depth: usize,
) -> ImfResult<()> {
    if depth > 8 {
        return Err(ImfError::mxf("sub-descriptor references form a cycle"));
    }
    for id in set.uuid_array(&labels::SUB_DESCRIPTORS)? {
        let (header, sub) = sets
            .get(&id)
            .ok_or_else(|| ImfError::mxf(format!("sub-descriptor {id} is not in the header")))?;
        if !out.contains(header) {
            out.push(*header);
        }
        collect_sub_descriptors(sub, sets, out, depth + 1)?;
    }
    Ok(())
}

impl HeaderPartition for MxfHeaderPartition {
    fn package_uuid(&self) -> Uuid {
        self.package_uuid.unwrap_or(Uuid::nil())
    }

    fn essence_descriptor_headers(&self) -> &[KlvHeader] {
        &self.descriptors
    }

    fn sub_descriptor_headers(&self) -> &[KlvHeader] {
        &self.sub_descriptors
    }

    fn primer_pack(&self) -> &PrimerPack {
        &self.primer
    }

    fn check_imf_constraints(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let id = self.package_uuid();
        if !self.partition_pack.is_op1a() {
            diags.fatal(
                ErrorCode::EssenceComponent,
                format!(
                    "track file {id}: operational pattern {} is not OP1A",
                    self.partition_pack.operational_pattern
                ),
            );
        }
        let containers = self.partition_pack.essence_containers.len();
        if containers != 1 {
            diags.fatal(
                ErrorCode::EssenceComponent,
                format!("track file {id}: {containers} essence containers declared, expected 1"),
            );
        }
        if self.source_package_count != 1 {
            diags.fatal(
                ErrorCode::EssenceComponent,
                format!(
                    "track file {id}: {} source packages found, expected 1",
                    self.source_package_count
                ),
            );
        }
        if self.package_uuid.is_some() && self.descriptors.is_empty() {
            diags.fatal(
                ErrorCode::EssenceComponent,
                format!("track file {id}: file package has no essence descriptor"),
            );
        }
        diags
    }
}

/// Normalized trees of every essence descriptor of one essence file.
///
/// Descriptor and sub-descriptor triplets are fetched through `bytes`, decoded with the primer
/// pack and converted through the element registry. Unregistered sets yield no tree.
pub fn essence_descriptor_doms(
    partition: &dyn HeaderPartition,
    bytes: &dyn ByteRangeProvider,
) -> ImfResult<Vec<DomNode>> {
    let primer = partition.primer_pack();
    let read_set = |header: &KlvHeader| -> ImfResult<LocalSet> {
        let raw = bytes.byte_range(header.offset, header.total_len())?;
        let mut reader = KlvReader::new(&raw);
        let (klv, value) = reader
            .read_klv()?
            .ok_or_else(|| ImfError::mxf(format!("no KLV at offset {}", header.offset)))?;
        if klv.key != header.key {
            return Err(ImfError::mxf(format!(
                "expected {} at offset {}, found {}",
                header.key, header.offset, klv.key
            )));
        }
        LocalSet::parse(klv.key, value, primer)
    };

    let mut subs = BTreeMap::new();
    for header in partition.sub_descriptor_headers() {
        let set = read_set(header)?;
        if let Some(id) = set.instance_uid()? {
            subs.insert(id, set);
        }
    }
    let builder = DescriptorTreeBuilder::new(&subs);

    let mut doms = Vec::new();
    for header in partition.essence_descriptor_headers() {
        let set = read_set(header)?;
        if let Some(dom) = builder.build(&set)? {
            doms.push(dom);
        }
    }
    Ok(doms)
}

#[cfg(test)]
#[path = "../../tests/unit/mxf/header.rs"]
mod tests;
