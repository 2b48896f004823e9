//! Byte-level builders for synthetic MXF header partitions and the matching
//! registered-XML descriptors.
#![allow(dead_code)]

pub type Key = [u8; 16];

pub const fn smpte(tail: [u8; 12]) -> Key {
    [
        0x06, 0x0E, 0x2B, 0x34, tail[0], tail[1], tail[2], tail[3], tail[4], tail[5], tail[6],
        tail[7], tail[8], tail[9], tail[10], tail[11],
    ]
}

const fn group(id: u8) -> Key {
    smpte([0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, id, 0x00])
}

pub const HEADER_PARTITION: Key =
    smpte([0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x02, 0x04, 0x00]);
pub const PRIMER: Key =
    smpte([0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x05, 0x01, 0x00]);
pub const FILL: Key = smpte([0x01, 0x01, 0x01, 0x02, 0x03, 0x01, 0x02, 0x10, 0x01, 0x00, 0x00, 0x00]);
pub const OP1A: Key = smpte([0x04, 0x01, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x01, 0x09, 0x00]);
pub const OP_ATOM: Key = smpte([0x04, 0x01, 0x01, 0x02, 0x0D, 0x01, 0x02, 0x01, 0x10, 0x00, 0x00, 0x00]);
pub const J2K_CONTAINER: Key =
    smpte([0x04, 0x01, 0x01, 0x07, 0x0D, 0x01, 0x03, 0x01, 0x02, 0x0C, 0x01, 0x00]);
pub const WAVE_CONTAINER: Key =
    smpte([0x04, 0x01, 0x01, 0x0A, 0x0D, 0x01, 0x03, 0x01, 0x02, 0x06, 0x02, 0x00]);

pub const SOURCE_PACKAGE: Key = group(0x37);
pub const CDCI_DESCRIPTOR: Key = group(0x28);
pub const WAVE_DESCRIPTOR: Key = group(0x48);
pub const J2K_SUB_DESCRIPTOR: Key = group(0x5A);
pub const SOUNDFIELD_SUB_DESCRIPTOR: Key = group(0x6C);
/// Not part of the element registry.
pub const PHDR_SUB_DESCRIPTOR: Key = group(0x7E);

pub const PRIMARIES_BT709: Key =
    smpte([0x04, 0x01, 0x01, 0x06, 0x04, 0x01, 0x01, 0x01, 0x03, 0x03, 0x00, 0x00]);
pub const PRIMARIES_BT2020: Key =
    smpte([0x04, 0x01, 0x01, 0x0D, 0x04, 0x01, 0x01, 0x01, 0x03, 0x04, 0x00, 0x00]);
pub const TRANSFER_BT709: Key =
    smpte([0x04, 0x01, 0x01, 0x01, 0x04, 0x01, 0x01, 0x01, 0x01, 0x02, 0x00, 0x00]);
pub const TRANSFER_PQ: Key =
    smpte([0x04, 0x01, 0x01, 0x0D, 0x04, 0x01, 0x01, 0x01, 0x01, 0x0A, 0x00, 0x00]);
pub const CODING_BT709: Key =
    smpte([0x04, 0x01, 0x01, 0x01, 0x04, 0x01, 0x01, 0x01, 0x02, 0x02, 0x00, 0x00]);
pub const CODING_BT2020: Key =
    smpte([0x04, 0x01, 0x01, 0x0D, 0x04, 0x01, 0x01, 0x01, 0x02, 0x06, 0x00, 0x00]);
pub const MCA_STEREO: Key =
    smpte([0x04, 0x01, 0x01, 0x0D, 0x03, 0x02, 0x02, 0x20, 0x01, 0x00, 0x00, 0x00]);

// Local tags and their element labels.
pub const TAG_INSTANCE_UID: u16 = 0x3C0A;
pub const TAG_PACKAGE_UID: u16 = 0x4401;
pub const TAG_DESCRIPTOR: u16 = 0x4701;
pub const TAG_SAMPLE_RATE: u16 = 0x3001;
pub const TAG_ESSENCE_LENGTH: u16 = 0x3002;
pub const TAG_CONTAINER_FORMAT: u16 = 0x3004;
pub const TAG_STORED_HEIGHT: u16 = 0x3202;
pub const TAG_STORED_WIDTH: u16 = 0x3203;
pub const TAG_FRAME_LAYOUT: u16 = 0x320C;
pub const TAG_TRANSFER: u16 = 0x3210;
pub const TAG_PRIMARIES: u16 = 0x3219;
pub const TAG_CODING: u16 = 0x321A;
pub const TAG_COMPONENT_DEPTH: u16 = 0x3301;
pub const TAG_H_SUBSAMPLING: u16 = 0x3302;
pub const TAG_BLACK_REF: u16 = 0x3304;
pub const TAG_WHITE_REF: u16 = 0x3305;
pub const TAG_COLOR_RANGE: u16 = 0x3306;
pub const TAG_V_SUBSAMPLING: u16 = 0x3308;
pub const TAG_AUDIO_SAMPLE_RATE: u16 = 0x3D03;
pub const TAG_CHANNEL_COUNT: u16 = 0x3D07;
pub const TAG_QUANTIZATION_BITS: u16 = 0x3D01;
pub const TAG_BLOCK_ALIGN: u16 = 0x3D0A;
pub const TAG_SUB_DESCRIPTORS: u16 = 0xFFFE;
pub const TAG_RSIZ: u16 = 0xFFF0;
pub const TAG_XSIZ: u16 = 0xFFF1;
pub const TAG_YSIZ: u16 = 0xFFF2;
pub const TAG_CSIZ: u16 = 0xFFF3;
pub const TAG_MCA_DICTIONARY_ID: u16 = 0xFFE0;
pub const TAG_MCA_TAG_SYMBOL: u16 = 0xFFE1;
pub const TAG_MCA_TAG_NAME: u16 = 0xFFE2;
pub const TAG_MCA_LINK_ID: u16 = 0xFFE3;

pub fn primer_entries() -> Vec<(u16, Key)> {
    vec![
        (TAG_INSTANCE_UID, smpte([0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x15, 0x02, 0, 0, 0, 0])),
        (TAG_PACKAGE_UID, smpte([0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x15, 0x10, 0, 0, 0, 0])),
        (TAG_DESCRIPTOR, smpte([0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x04, 0x02, 0x03, 0, 0])),
        (TAG_SAMPLE_RATE, smpte([0x01, 0x01, 0x01, 0x01, 0x04, 0x06, 0x01, 0x01, 0, 0, 0, 0])),
        (TAG_ESSENCE_LENGTH, smpte([0x01, 0x01, 0x01, 0x02, 0x04, 0x06, 0x01, 0x02, 0, 0, 0, 0])),
        (TAG_CONTAINER_FORMAT, smpte([0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x04, 0x01, 0x02, 0, 0])),
        (TAG_STORED_HEIGHT, smpte([0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x02, 0x01, 0, 0, 0])),
        (TAG_STORED_WIDTH, smpte([0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x02, 0x02, 0, 0, 0])),
        (TAG_FRAME_LAYOUT, smpte([0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x03, 0x01, 0x04, 0, 0, 0])),
        (TAG_TRANSFER, smpte([0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x02, 0x01, 0x01, 0x01, 0x02, 0])),
        (TAG_PRIMARIES, smpte([0x01, 0x01, 0x01, 0x09, 0x04, 0x01, 0x02, 0x01, 0x01, 0x06, 0x01, 0])),
        (TAG_CODING, smpte([0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x02, 0x01, 0x01, 0x03, 0x01, 0])),
        (TAG_COMPONENT_DEPTH, smpte([0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x05, 0x03, 0x0A, 0, 0, 0])),
        (TAG_H_SUBSAMPLING, smpte([0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x01, 0x05, 0, 0, 0])),
        (TAG_BLACK_REF, smpte([0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x03, 0x03, 0, 0, 0])),
        (TAG_WHITE_REF, smpte([0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x03, 0x04, 0, 0, 0])),
        (TAG_COLOR_RANGE, smpte([0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x05, 0x03, 0x05, 0, 0, 0])),
        (TAG_V_SUBSAMPLING, smpte([0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x05, 0x01, 0x10, 0, 0, 0])),
        (TAG_AUDIO_SAMPLE_RATE, smpte([0x01, 0x01, 0x01, 0x05, 0x04, 0x02, 0x03, 0x01, 0x01, 0x01, 0, 0])),
        (TAG_CHANNEL_COUNT, smpte([0x01, 0x01, 0x01, 0x05, 0x04, 0x02, 0x01, 0x01, 0x04, 0, 0, 0])),
        (TAG_QUANTIZATION_BITS, smpte([0x01, 0x01, 0x01, 0x04, 0x04, 0x02, 0x03, 0x03, 0x04, 0, 0, 0])),
        (TAG_BLOCK_ALIGN, smpte([0x01, 0x01, 0x01, 0x05, 0x04, 0x02, 0x03, 0x02, 0x01, 0, 0, 0])),
        (TAG_SUB_DESCRIPTORS, smpte([0x01, 0x01, 0x01, 0x09, 0x06, 0x01, 0x01, 0x04, 0x06, 0x10, 0, 0])),
        (TAG_RSIZ, smpte([0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x01, 0, 0, 0])),
        (TAG_XSIZ, smpte([0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x02, 0, 0, 0])),
        (TAG_YSIZ, smpte([0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x03, 0, 0, 0])),
        (TAG_CSIZ, smpte([0x01, 0x01, 0x01, 0x0A, 0x04, 0x01, 0x06, 0x03, 0x0A, 0, 0, 0])),
        (TAG_MCA_DICTIONARY_ID, smpte([0x01, 0x01, 0x01, 0x0E, 0x01, 0x03, 0x07, 0x01, 0x01, 0, 0, 0])),
        (TAG_MCA_TAG_SYMBOL, smpte([0x01, 0x01, 0x01, 0x0E, 0x01, 0x03, 0x07, 0x01, 0x02, 0, 0, 0])),
        (TAG_MCA_TAG_NAME, smpte([0x01, 0x01, 0x01, 0x0E, 0x01, 0x03, 0x07, 0x01, 0x03, 0, 0, 0])),
        (TAG_MCA_LINK_ID, smpte([0x01, 0x01, 0x01, 0x0E, 0x01, 0x01, 0x15, 0x20, 0, 0, 0, 0])),
    ]
}

pub fn ber(len: usize) -> Vec<u8> {
    if len < 0x80 {
        vec![len as u8]
    } else {
        let b = (len as u32).to_be_bytes();
        vec![0x84, b[0], b[1], b[2], b[3]]
    }
}

pub fn klv(key: &Key, value: &[u8]) -> Vec<u8> {
    let mut out = key.to_vec();
    out.extend(ber(value.len()));
    out.extend_from_slice(value);
    out
}

pub fn batch(items: &[Vec<u8>], item_len: u32) -> Vec<u8> {
    let mut out = (items.len() as u32).to_be_bytes().to_vec();
    out.extend(item_len.to_be_bytes());
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

pub fn uuid(n: u128) -> Vec<u8> {
    n.to_be_bytes().to_vec()
}

pub fn urn(n: u128) -> String {
    let h = format!("{n:032x}");
    format!(
        "urn:uuid:{}-{}-{}-{}-{}",
        &h[..8],
        &h[8..12],
        &h[12..16],
        &h[16..20],
        &h[20..]
    )
}

pub fn ul_urn(key: &Key) -> String {
    let hex: Vec<String> = key
        .chunks(4)
        .map(|c| c.iter().map(|b| format!("{b:02x}")).collect())
        .collect();
    format!("urn:smpte:ul:{}", hex.join("."))
}

pub fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
}

/// Local set under construction.
pub struct SetBuilder {
    key: Key,
    items: Vec<(u16, Vec<u8>)>,
}

impl SetBuilder {
    pub fn new(key: Key, instance: u128) -> Self {
        Self {
            key,
            items: vec![(TAG_INSTANCE_UID, uuid(instance))],
        }
    }

    pub fn item(mut self, tag: u16, value: Vec<u8>) -> Self {
        self.items.push((tag, value));
        self
    }

    pub fn u8(self, tag: u16, v: u8) -> Self {
        self.item(tag, vec![v])
    }

    pub fn u16(self, tag: u16, v: u16) -> Self {
        self.item(tag, v.to_be_bytes().to_vec())
    }

    pub fn u32(self, tag: u16, v: u32) -> Self {
        self.item(tag, v.to_be_bytes().to_vec())
    }

    pub fn u64(self, tag: u16, v: u64) -> Self {
        self.item(tag, v.to_be_bytes().to_vec())
    }

    pub fn rational(self, tag: u16, num: i32, den: i32) -> Self {
        let mut v = num.to_be_bytes().to_vec();
        v.extend(den.to_be_bytes());
        self.item(tag, v)
    }

    pub fn ul(self, tag: u16, key: &Key) -> Self {
        self.item(tag, key.to_vec())
    }

    pub fn refs(self, tag: u16, ids: &[u128]) -> Self {
        let items: Vec<Vec<u8>> = ids.iter().map(|id| uuid(*id)).collect();
        self.item(tag, batch(&items, 16))
    }

    pub fn build(self) -> Vec<u8> {
        let mut value = Vec::new();
        for (tag, bytes) in &self.items {
            value.extend(tag.to_be_bytes());
            value.extend((bytes.len() as u16).to_be_bytes());
            value.extend_from_slice(bytes);
        }
        klv(&self.key, &value)
    }
}

pub fn partition_pack(op: &Key, containers: &[Key]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend(1u16.to_be_bytes());
    v.extend(3u16.to_be_bytes());
    v.extend(1u32.to_be_bytes());
    for _ in 0..5 {
        v.extend(0u64.to_be_bytes());
    }
    v.extend(0u32.to_be_bytes());
    v.extend(0u64.to_be_bytes());
    v.extend(1u32.to_be_bytes());
    v.extend_from_slice(op);
    let items: Vec<Vec<u8>> = containers.iter().map(|c| c.to_vec()).collect();
    v.extend(batch(&items, 16));
    klv(&HEADER_PARTITION, &v)
}

pub fn primer(entries: &[(u16, Key)]) -> Vec<u8> {
    let items: Vec<Vec<u8>> = entries
        .iter()
        .map(|(tag, key)| {
            let mut item = tag.to_be_bytes().to_vec();
            item.extend_from_slice(key);
            item
        })
        .collect();
    klv(&PRIMER, &batch(&items, 18))
}

pub fn source_package(package: u128, descriptor: u128) -> Vec<u8> {
    let mut umid = vec![
        0x06, 0x0A, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x05, 0x01, 0x01, 0x0F, 0x20, 0x13, 0x00, 0x00,
        0x00,
    ];
    umid.extend(uuid(package));
    SetBuilder::new(SOURCE_PACKAGE, package ^ 0xA5A5)
        .item(TAG_PACKAGE_UID, umid)
        .item(TAG_DESCRIPTOR, uuid(descriptor))
        .build()
}

/// JPEG 2000 CDCI image track file.
#[derive(Clone, Debug)]
pub struct ImageTrackFile {
    pub package: u128,
    pub width: u32,
    pub height: u32,
    pub rate: (i32, i32),
    pub duration: u64,
    pub primaries: Key,
    pub transfer: Key,
    pub coding: Key,
    pub depth: u32,
    pub rsiz: u16,
    pub with_phdr: bool,
    pub op: Key,
    pub containers: Vec<Key>,
}

impl ImageTrackFile {
    pub fn new(package: u128) -> Self {
        Self {
            package,
            width: 1920,
            height: 1080,
            rate: (24, 1),
            duration: 240,
            primaries: PRIMARIES_BT709,
            transfer: TRANSFER_BT709,
            coding: CODING_BT709,
            depth: 10,
            rsiz: 1798,
            with_phdr: false,
            op: OP1A,
            containers: vec![J2K_CONTAINER],
        }
    }

    fn descriptor_id(&self) -> u128 {
        self.package + 0x100
    }

    fn j2k_id(&self) -> u128 {
        self.package + 0x200
    }

    fn phdr_id(&self) -> u128 {
        self.package + 0x300
    }

    fn black(&self) -> u32 {
        16 << (self.depth - 8)
    }

    fn white(&self) -> u32 {
        235 << (self.depth - 8)
    }

    fn range(&self) -> u32 {
        (224 << (self.depth - 8)) + 1
    }

    pub fn header_partition(&self) -> Vec<u8> {
        let mut subs = vec![self.j2k_id()];
        if self.with_phdr {
            subs.push(self.phdr_id());
        }
        let mut out = partition_pack(&self.op, &self.containers);
        out.extend(klv(&FILL, &[0u8; 8]));
        out.extend(primer(&primer_entries()));
        out.extend(
            SetBuilder::new(CDCI_DESCRIPTOR, self.descriptor_id())
                .rational(TAG_SAMPLE_RATE, self.rate.0, self.rate.1)
                .u64(TAG_ESSENCE_LENGTH, self.duration)
                .ul(TAG_CONTAINER_FORMAT, &J2K_CONTAINER)
                .u32(TAG_STORED_WIDTH, self.width)
                .u32(TAG_STORED_HEIGHT, self.height)
                .u8(TAG_FRAME_LAYOUT, 0)
                .ul(TAG_PRIMARIES, &self.primaries)
                .ul(TAG_TRANSFER, &self.transfer)
                .ul(TAG_CODING, &self.coding)
                .u32(TAG_COMPONENT_DEPTH, self.depth)
                .u32(TAG_H_SUBSAMPLING, 2)
                .u32(TAG_V_SUBSAMPLING, 1)
                .u32(TAG_BLACK_REF, self.black())
                .u32(TAG_WHITE_REF, self.white())
                .u32(TAG_COLOR_RANGE, self.range())
                .refs(TAG_SUB_DESCRIPTORS, &subs)
                .build(),
        );
        out.extend(
            SetBuilder::new(J2K_SUB_DESCRIPTOR, self.j2k_id())
                .u16(TAG_RSIZ, self.rsiz)
                .u32(TAG_XSIZ, self.width)
                .u32(TAG_YSIZ, self.height)
                .u16(TAG_CSIZ, 3)
                .build(),
        );
        if self.with_phdr {
            out.extend(
                SetBuilder::new(PHDR_SUB_DESCRIPTOR, self.phdr_id())
                    .u32(TAG_CHANNEL_COUNT, 1)
                    .build(),
            );
        }
        out.extend(source_package(self.package, self.descriptor_id()));
        out
    }

    /// Registered-XML rendition of the descriptor, as carried in a playlist.
    pub fn regxml(&self) -> String {
        let phdr = if self.with_phdr {
            format!(
                "<r0:PHDRMetadataTrackSubDescriptor><r1:InstanceID>{}</r1:InstanceID>\
                 <r1:SimplePayloadSID>1</r1:SimplePayloadSID></r0:PHDRMetadataTrackSubDescriptor>",
                urn(self.phdr_id())
            )
        } else {
            String::new()
        };
        format!(
            r#"<r0:CDCIDescriptor xmlns:r0="http://www.smpte-ra.org/reg/395/2014/13/1/aaf" xmlns:r1="http://www.smpte-ra.org/reg/335/2012">
  <r1:InstanceID>{instance}</r1:InstanceID>
  <r1:SampleRate>{rn}/{rd}</r1:SampleRate>
  <r1:EssenceLength>{duration}</r1:EssenceLength>
  <r1:ContainerFormat>{container}</r1:ContainerFormat>
  <r1:StoredWidth>{width}</r1:StoredWidth>
  <r1:StoredHeight>{height}</r1:StoredHeight>
  <r1:FrameLayout>FullFrame</r1:FrameLayout>
  <r1:ColorPrimaries>{primaries}</r1:ColorPrimaries>
  <r1:TransferCharacteristic>{transfer}</r1:TransferCharacteristic>
  <r1:CodingEquations>{coding}</r1:CodingEquations>
  <r1:ComponentDepth>{depth}</r1:ComponentDepth>
  <r1:HorizontalSubsampling>2</r1:HorizontalSubsampling>
  <r1:VerticalSubsampling>1</r1:VerticalSubsampling>
  <r1:BlackRefLevel>{black}</r1:BlackRefLevel>
  <r1:WhiteRefLevel>{white}</r1:WhiteRefLevel>
  <r1:ColorRange>{range}</r1:ColorRange>
  <r1:SubDescriptors>
    <r0:JPEG2000SubDescriptor>
      <r1:InstanceID>{j2k}</r1:InstanceID>
      <r1:Rsiz>{rsiz}</r1:Rsiz>
      <r1:Xsiz>{width}</r1:Xsiz>
      <r1:Ysiz>{height}</r1:Ysiz>
      <r1:Csiz>3</r1:Csiz>
    </r0:JPEG2000SubDescriptor>
    {phdr}
  </r1:SubDescriptors>
</r0:CDCIDescriptor>"#,
            instance = urn(self.descriptor_id() + 0xFFFF),
            rn = self.rate.0,
            rd = self.rate.1,
            duration = self.duration,
            container = ul_urn(&J2K_CONTAINER),
            width = self.width,
            height = self.height,
            primaries = ul_urn(&self.primaries),
            transfer = ul_urn(&self.transfer),
            coding = ul_urn(&self.coding),
            depth = self.depth,
            black = self.black(),
            white = self.white(),
            range = self.range(),
            j2k = urn(self.j2k_id() + 0xFFFF),
            rsiz = self.rsiz,
            phdr = phdr,
        )
    }
}

/// PCM audio track file with a stereo soundfield group label.
#[derive(Clone, Debug)]
pub struct AudioTrackFile {
    pub package: u128,
    pub channels: u32,
    pub bits: u32,
}

impl AudioTrackFile {
    pub fn new(package: u128) -> Self {
        Self {
            package,
            channels: 2,
            bits: 24,
        }
    }

    fn descriptor_id(&self) -> u128 {
        self.package + 0x100
    }

    fn label_id(&self) -> u128 {
        self.package + 0x200
    }

    pub fn header_partition(&self) -> Vec<u8> {
        let mut out = partition_pack(&OP1A, &[WAVE_CONTAINER]);
        out.extend(primer(&primer_entries()));
        out.extend(
            SetBuilder::new(WAVE_DESCRIPTOR, self.descriptor_id())
                .rational(TAG_SAMPLE_RATE, 24, 1)
                .ul(TAG_CONTAINER_FORMAT, &WAVE_CONTAINER)
                .rational(TAG_AUDIO_SAMPLE_RATE, 48000, 1)
                .u32(TAG_CHANNEL_COUNT, self.channels)
                .u32(TAG_QUANTIZATION_BITS, self.bits)
                .u16(TAG_BLOCK_ALIGN, (self.channels * self.bits / 8) as u16)
                .refs(TAG_SUB_DESCRIPTORS, &[self.label_id()])
                .build(),
        );
        out.extend(
            SetBuilder::new(SOUNDFIELD_SUB_DESCRIPTOR, self.label_id())
                .ul(TAG_MCA_DICTIONARY_ID, &MCA_STEREO)
                .item(TAG_MCA_TAG_SYMBOL, utf16("sgST"))
                .item(TAG_MCA_TAG_NAME, utf16("Standard Stereo"))
                .item(TAG_MCA_LINK_ID, uuid(0x5151))
                .build(),
        );
        out.extend(source_package(self.package, self.descriptor_id()));
        out
    }

    pub fn regxml(&self) -> String {
        format!(
            r#"<r0:WAVEPCMDescriptor xmlns:r0="http://www.smpte-ra.org/reg/395/2014/13/1/aaf" xmlns:r1="http://www.smpte-ra.org/reg/335/2012">
  <r1:InstanceID>{instance}</r1:InstanceID>
  <r1:SampleRate>24/1</r1:SampleRate>
  <r1:ContainerFormat>{container}</r1:ContainerFormat>
  <r1:AudioSampleRate>48000/1</r1:AudioSampleRate>
  <r1:ChannelCount>{channels}</r1:ChannelCount>
  <r1:QuantizationBits>{bits}</r1:QuantizationBits>
  <r1:BlockAlign>{align}</r1:BlockAlign>
  <r1:SubDescriptors>
    <r0:SoundfieldGroupLabelSubDescriptor>
      <r1:InstanceID>{label}</r1:InstanceID>
      <r1:MCALabelDictionaryID>{dict}</r1:MCALabelDictionaryID>
      <r1:MCATagSymbol>sgST</r1:MCATagSymbol>
      <r1:MCATagName>Standard Stereo</r1:MCATagName>
      <r1:MCALinkID>{link}</r1:MCALinkID>
    </r0:SoundfieldGroupLabelSubDescriptor>
  </r1:SubDescriptors>
</r0:WAVEPCMDescriptor>"#,
            instance = urn(self.descriptor_id() + 0xFFFF),
            container = ul_urn(&WAVE_CONTAINER),
            channels = self.channels,
            bits = self.bits,
            align = self.channels * self.bits / 8,
            label = urn(self.label_id() + 0xFFFF),
            dict = ul_urn(&MCA_STEREO),
            link = urn(0x5151),
        )
    }
}
