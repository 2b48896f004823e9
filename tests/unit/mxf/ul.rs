use super::*;

#[test]
fn urn_roundtrip_is_lowercase_dotted() {
    let ul = labels::PRIMER_PACK;
    let text = ul.to_string();
    assert_eq!(text, "urn:smpte:ul:060e2b34.02050101.0d010201.01050100");
    assert_eq!(Ul::parse_urn(&text).unwrap(), ul);
    assert_eq!(Ul::parse_urn(&text.to_uppercase()).unwrap(), ul);
}

#[test]
fn parse_rejects_short_labels() {
    assert!(Ul::parse_urn("urn:smpte:ul:060e2b34.0205").is_err());
    assert!(Ul::parse_urn("urn:smpte:ul:zz0e2b34.02050101.0d010201.01050100").is_err());
}

#[test]
fn version_byte_is_ignored_for_meaning() {
    let mut bytes = *labels::SUB_DESCRIPTORS.as_bytes();
    bytes[7] = 0x0e;
    let newer = Ul(bytes);
    assert_ne!(newer, labels::SUB_DESCRIPTORS);
    assert!(newer.eq_ignore_version(&labels::SUB_DESCRIPTORS));
}

#[test]
fn partition_and_primer_detection() {
    let header = labels::HEADER_PARTITION_CLOSED_COMPLETE;
    assert!(header.is_partition_pack());
    assert!(header.is_header_partition_pack());
    assert!(!header.is_primer_pack());
    assert!(labels::PRIMER_PACK.is_primer_pack());
    assert!(!labels::PRIMER_PACK.is_partition_pack());
    assert!(labels::SOURCE_PACKAGE.is_local_set());
}

#[test]
fn fill_item_detection_ignores_version_and_item_tail() {
    let mut bytes = *labels::FILL_ITEM.as_bytes();
    bytes[7] = 0x01;
    bytes[13] = 0x7F;
    assert!(Ul(bytes).is_fill_item());
    assert!(labels::FILL_ITEM.is_fill_item());
    assert!(!labels::PRIMER_PACK.is_fill_item());
}
