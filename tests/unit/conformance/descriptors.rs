use super::*;
use crate::composition::def::CompositionDef;
use crate::composition::playlist::ImfComposition;
use crate::foundation::diagnostics::Severity;
use crate::mxf::header::{MxfHeaderPartition, SliceByteProvider};
use serde_json::Value;

#[path = "../../support/cpl_fixture.rs"]
mod cpl;
#[path = "../../support/mxf_fixture.rs"]
mod fixture;

use fixture::{AudioTrackFile, ImageTrackFile};

const IMAGE_FILE: u128 = 0xA1;
const AUDIO_FILE: u128 = 0xA2;

fn composition(value: Value) -> ImfComposition {
    let def: CompositionDef = serde_json::from_value(value).unwrap();
    ImfComposition::new(def).unwrap()
}

fn declared(image: &ImageTrackFile, audio: &AudioTrackFile) -> ImfComposition {
    composition(cpl::simple_playlist(image.regxml(), audio.regxml()))
}

struct Files {
    bytes: Vec<Vec<u8>>,
}

impl Files {
    fn new(bytes: Vec<Vec<u8>>) -> Self {
        Self { bytes }
    }

    fn conform(&self, composition: &ImfComposition, opts: &ConformanceOpts) -> Diagnostics {
        let partitions: Vec<MxfHeaderPartition> = self
            .bytes
            .iter()
            .map(|b| MxfHeaderPartition::parse(b).unwrap())
            .collect();
        let providers: Vec<SliceByteProvider<'_>> =
            self.bytes.iter().map(|b| SliceByteProvider::new(b)).collect();
        let sources: Vec<TrackFileSource<'_>> = partitions
            .iter()
            .zip(&providers)
            .map(|(p, b)| TrackFileSource::new(p, b))
            .collect();
        composition.conform_virtual_tracks_with(&sources, opts)
    }
}

fn default_files() -> Files {
    Files::new(vec![
        ImageTrackFile::new(IMAGE_FILE).header_partition(),
        AudioTrackFile::new(AUDIO_FILE).header_partition(),
    ])
}

#[test]
fn matching_descriptors_conform() {
    let composition = declared(&ImageTrackFile::new(IMAGE_FILE), &AudioTrackFile::new(AUDIO_FILE));
    let diags = default_files().conform(&composition, &ConformanceOpts::default());
    assert!(diags.is_empty(), "{diags}");
}

#[test]
fn phdr_sub_descriptor_is_ignored() {
    let image = ImageTrackFile {
        with_phdr: true,
        ..ImageTrackFile::new(IMAGE_FILE)
    };
    let composition = declared(&image, &AudioTrackFile::new(AUDIO_FILE));
    let files = Files::new(vec![
        image.header_partition(),
        AudioTrackFile::new(AUDIO_FILE).header_partition(),
    ]);
    let diags = files.conform(&composition, &ConformanceOpts::default());
    assert!(diags.is_empty(), "{diags}");
}

#[test]
fn mismatch_is_fatal_with_both_sides() {
    let declared_image = ImageTrackFile {
        rsiz: 1799,
        ..ImageTrackFile::new(IMAGE_FILE)
    };
    let composition = declared(&declared_image, &AudioTrackFile::new(AUDIO_FILE));
    let diags = default_files().conform(&composition, &ConformanceOpts::default());

    assert_eq!(diags.count(Severity::Fatal), 1, "{diags}");
    let d = &diags.as_slice()[0];
    assert_eq!(d.code, ErrorCode::EssenceComponent);
    assert!(d.message.contains(&Uuid::from_u128(0xE1).to_string()));
    assert!(d.message.contains("Rsiz = 1799"), "{}", d.message);
    assert!(d.message.contains("Rsiz = 1798"), "{}", d.message);
    assert!(d.message.contains("declared only"));
}

#[test]
fn failing_track_file_does_not_stop_the_others() {
    let declared_audio = AudioTrackFile {
        bits: 16,
        ..AudioTrackFile::new(AUDIO_FILE)
    };
    let composition = declared(&ImageTrackFile::new(IMAGE_FILE), &declared_audio);
    let broken_image = ImageTrackFile {
        op: fixture::OP_ATOM,
        ..ImageTrackFile::new(IMAGE_FILE)
    };
    let files = Files::new(vec![
        broken_image.header_partition(),
        AudioTrackFile::new(AUDIO_FILE).header_partition(),
    ]);
    let diags = files.conform(&composition, &ConformanceOpts::default());

    assert_eq!(diags.count(Severity::Fatal), 2, "{diags}");
    assert!(diags.iter().any(|d| d.message.contains("not OP1A")));
    assert!(
        diags
            .iter()
            .any(|d| d.message.contains(&Uuid::from_u128(0xE2).to_string())
                && d.message.contains("QuantizationBits"))
    );
}

#[test]
fn missing_header_partition_is_reported_once() {
    let composition = declared(&ImageTrackFile::new(IMAGE_FILE), &AudioTrackFile::new(AUDIO_FILE));
    let files = Files::new(vec![ImageTrackFile::new(IMAGE_FILE).header_partition()]);
    let diags = files.conform(&composition, &ConformanceOpts::default());
    assert_eq!(diags.len(), 1, "{diags}");
    assert!(diags.as_slice()[0].message.contains("has no header partition"));
}

#[test]
fn nothing_resolved_aborts() {
    let composition = declared(&ImageTrackFile::new(IMAGE_FILE), &AudioTrackFile::new(AUDIO_FILE));
    let diags = composition.conform_virtual_tracks(&[], false);
    assert_eq!(diags.count(Severity::Fatal), 3, "{diags}");
    assert!(diags.iter().any(|d| d.message.contains("conformance aborted")));
}

#[test]
fn conform_all_flags_unreferenced_entries() {
    let mut value = cpl::simple_playlist(
        ImageTrackFile::new(IMAGE_FILE).regxml(),
        AudioTrackFile::new(AUDIO_FILE).regxml(),
    );
    value["essence_descriptor_list"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::json!({
            "id": cpl::urn(0xE9),
            "xml": ImageTrackFile::new(0xB1).regxml(),
        }));
    let composition = composition(value);
    let files = default_files();

    let diags = files.conform(&composition, &ConformanceOpts::default());
    assert!(diags.is_empty(), "{diags}");

    let all = ConformanceOpts {
        conform_all_virtual_tracks: true,
        ..ConformanceOpts::default()
    };
    let diags = files.conform(&composition, &all);
    assert_eq!(diags.count(Severity::NonFatal), 1, "{diags}");
    assert!(diags.as_slice()[0].message.contains("not referenced"));
}

#[test]
fn source_encoding_without_list_entry_is_non_fatal() {
    let value = cpl::playlist(
        "2016",
        [24, 1],
        &[],
        vec![cpl::image_and_audio_segment("s0", IMAGE_FILE, AUDIO_FILE)],
    );
    let composition = composition(value);
    let all = ConformanceOpts {
        conform_all_virtual_tracks: true,
        ..ConformanceOpts::default()
    };
    let diags = default_files().conform(&composition, &all);

    assert_eq!(diags.len(), 2, "{diags}");
    assert_eq!(diags.count(Severity::NonFatal), 2);
    for (encoding, track) in [(0xE1, cpl::IMAGE_TRACK), (0xE2, cpl::AUDIO_TRACK)] {
        assert!(
            diags.iter().any(|d| d.message.contains(&Uuid::from_u128(encoding).to_string())
                && d.message.contains(&Uuid::from_u128(track).to_string())
                && d.message.contains("no essence descriptor list entry")),
            "{diags}"
        );
    }
}

#[test]
fn default_options_strip_volatile_fields() {
    let opts = ConformanceOpts::default();
    for name in ["PHDRMetadataTrackSubDescriptor", "InstanceUID", "InstanceID", "EssenceLength"] {
        assert!(opts.ignore_set.contains(name), "{name}");
    }
    assert!(!opts.conform_all_virtual_tracks);
}
