use crate::dom::model::DomNode;
use crate::foundation::core::{EditRate, Uuid};
use crate::foundation::diagnostics::{Diagnostics, ErrorCode};
use std::fmt;

/// Default scope of the standard marker labels (ST 2067-3).
pub const STANDARD_MARKER_SCOPE: &str =
    "http://www.smpte-ra.org/schemas/2067-3/2013#standard-markers";

/// Kind of content carried by a sequence (and so by its virtual track).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SequenceType {
    /// Main image essence.
    MainImageSequence,
    /// Main audio essence.
    MainAudioSequence,
    /// Timeline markers.
    MarkerSequence,
    /// Subtitles (ST 2067-2 timed text).
    SubtitlesSequence,
    /// Captions for the hearing impaired.
    HearingImpairedCaptionsSequence,
    /// Text for the visually impaired.
    VisuallyImpairedTextSequence,
    /// Commentary timed text.
    CommentarySequence,
    /// Karaoke timed text.
    KaraokeSequence,
    /// Forced narrative timed text.
    ForcedNarrativeSequence,
    /// Ancillary data.
    AncillaryDataSequence,
    /// Immersive audio bitstream (ST 2067-201).
    IABSequence,
    /// MGA S-ADM signal (ST 2067-203).
    MGASADMSignalSequence,
    /// ADM audio (ST 2067-204).
    ADMAudioSequence,
    /// Any other sequence element name.
    Unsupported(String),
}

impl SequenceType {
    /// Map a sequence element name to its type; unknown names are kept as
    /// [`SequenceType::Unsupported`].
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "MainImageSequence" => Self::MainImageSequence,
            "MainAudioSequence" => Self::MainAudioSequence,
            "MarkerSequence" => Self::MarkerSequence,
            "SubtitlesSequence" => Self::SubtitlesSequence,
            "HearingImpairedCaptionsSequence" => Self::HearingImpairedCaptionsSequence,
            "VisuallyImpairedTextSequence" => Self::VisuallyImpairedTextSequence,
            "CommentarySequence" => Self::CommentarySequence,
            "KaraokeSequence" => Self::KaraokeSequence,
            "ForcedNarrativeSequence" => Self::ForcedNarrativeSequence,
            "AncillaryDataSequence" => Self::AncillaryDataSequence,
            "IABSequence" => Self::IABSequence,
            "MGASADMSignalSequence" => Self::MGASADMSignalSequence,
            "ADMAudioSequence" => Self::ADMAudioSequence,
            other => Self::Unsupported(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::MainImageSequence => "MainImageSequence",
            Self::MainAudioSequence => "MainAudioSequence",
            Self::MarkerSequence => "MarkerSequence",
            Self::SubtitlesSequence => "SubtitlesSequence",
            Self::HearingImpairedCaptionsSequence => "HearingImpairedCaptionsSequence",
            Self::VisuallyImpairedTextSequence => "VisuallyImpairedTextSequence",
            Self::CommentarySequence => "CommentarySequence",
            Self::KaraokeSequence => "KaraokeSequence",
            Self::ForcedNarrativeSequence => "ForcedNarrativeSequence",
            Self::AncillaryDataSequence => "AncillaryDataSequence",
            Self::IABSequence => "IABSequence",
            Self::MGASADMSignalSequence => "MGASADMSignalSequence",
            Self::ADMAudioSequence => "ADMAudioSequence",
            Self::Unsupported(name) => name,
        }
    }

    /// Image and audio tracks are the ones whose essence descriptors are checked.
    pub fn is_image_or_audio(&self) -> bool {
        matches!(self, Self::MainImageSequence | Self::MainAudioSequence)
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for SequenceType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for SequenceType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

/// Core constraints generation the playlist was authored against.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum CoreConstraintsVersion {
    /// SMPTE ST 2067-2:2013.
    #[serde(rename = "2013")]
    St2067_2_2013,
    /// SMPTE ST 2067-2:2016.
    #[serde(rename = "2016")]
    St2067_2_2016,
    /// SMPTE ST 2067-2:2020.
    #[serde(rename = "2020")]
    St2067_2_2020,
}

/// Timing fields shared by every resource kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceCommon {
    id: String,
    edit_rate: EditRate,
    intrinsic_duration: u64,
    entry_point: u64,
    source_duration: u64,
    repeat_count: u64,
}

impl ResourceCommon {
    /// Build the shared timing block, applying the CPL defaults for omitted fields.
    pub fn new(
        id: impl Into<String>,
        edit_rate: EditRate,
        intrinsic_duration: u64,
        entry_point: Option<u64>,
        source_duration: Option<u64>,
        repeat_count: Option<u64>,
    ) -> Self {
        let entry_point = entry_point.unwrap_or(0);
        Self {
            id: id.into(),
            edit_rate,
            intrinsic_duration,
            entry_point,
            source_duration: source_duration
                .unwrap_or_else(|| intrinsic_duration.saturating_sub(entry_point)),
            repeat_count: repeat_count.unwrap_or(1),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn edit_rate(&self) -> EditRate {
        self.edit_rate
    }

    pub fn intrinsic_duration(&self) -> u64 {
        self.intrinsic_duration
    }

    pub fn entry_point(&self) -> u64 {
        self.entry_point
    }

    pub fn source_duration(&self) -> u64 {
        self.source_duration
    }

    pub fn repeat_count(&self) -> u64 {
        self.repeat_count
    }

    /// Contribution to the timeline in the resource's own edit units.
    pub fn duration(&self) -> u64 {
        self.source_duration.saturating_mul(self.repeat_count)
    }

    /// Whether `source_duration <= intrinsic_duration - entry_point` holds.
    pub fn duration_in_bounds(&self) -> bool {
        self.entry_point <= self.intrinsic_duration
            && self.source_duration <= self.intrinsic_duration - self.entry_point
    }

    /// Two resources are equivalent when they contribute identically to the timeline.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.edit_rate == other.edit_rate
            && self.entry_point == other.entry_point
            && self.intrinsic_duration == other.intrinsic_duration
            && self.source_duration == other.source_duration
            && self.repeat_count == other.repeat_count
    }
}

/// Resource pointing into an essence track file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackFileResource {
    common: ResourceCommon,
    track_file_id: Uuid,
    source_encoding: Uuid,
    hash: Option<Vec<u8>>,
    hash_algorithm: Option<String>,
}

impl TrackFileResource {
    pub fn new(
        common: ResourceCommon,
        track_file_id: Uuid,
        source_encoding: Uuid,
        hash: Option<Vec<u8>>,
        hash_algorithm: Option<String>,
    ) -> Self {
        Self {
            common,
            track_file_id,
            source_encoding,
            hash,
            hash_algorithm,
        }
    }

    pub fn common(&self) -> &ResourceCommon {
        &self.common
    }

    pub fn track_file_id(&self) -> Uuid {
        self.track_file_id
    }

    /// Id of the essence descriptor this resource was encoded with.
    pub fn source_encoding(&self) -> Uuid {
        self.source_encoding
    }

    pub fn hash(&self) -> Option<&[u8]> {
        self.hash.as_deref()
    }

    pub fn hash_algorithm(&self) -> Option<&str> {
        self.hash_algorithm.as_deref()
    }
}

/// Marker label with its scope.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MarkerLabel {
    /// Label value, e.g. `FFOC`.
    pub value: String,
    /// Label scope URI.
    #[serde(default = "default_marker_scope")]
    pub scope: String,
}

fn default_marker_scope() -> String {
    STANDARD_MARKER_SCOPE.to_owned()
}

/// A single timeline marker.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Marker {
    /// Marker label.
    pub label: MarkerLabel,
    /// Offset in edit units from the start of the resource.
    pub offset: u64,
    /// Optional annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

/// Resource carrying markers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerResource {
    common: ResourceCommon,
    markers: Vec<Marker>,
}

impl MarkerResource {
    /// Build a marker resource, sorting markers by offset.
    ///
    /// Markers at or beyond the intrinsic duration are reported as FATAL.
    pub fn new(common: ResourceCommon, mut markers: Vec<Marker>) -> (Self, Diagnostics) {
        let mut diags = Diagnostics::new();
        markers.sort_by_key(|m| m.offset);
        for m in &markers {
            if m.offset >= common.intrinsic_duration() {
                diags.fatal(
                    ErrorCode::CplStructure,
                    format!(
                        "marker '{}' in resource {} has offset {} which is not < intrinsic duration {}",
                        m.label.value,
                        common.id(),
                        m.offset,
                        common.intrinsic_duration()
                    ),
                );
            }
        }
        (Self { common, markers }, diags)
    }

    pub fn common(&self) -> &ResourceCommon {
        &self.common
    }

    /// Markers ordered by ascending offset.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

/// Discriminant of [`Resource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// [`Resource::TrackFile`].
    TrackFile,
    /// [`Resource::Marker`].
    Marker,
}

/// A resource of a sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    /// Essence track file resource.
    TrackFile(TrackFileResource),
    /// Marker resource.
    Marker(MarkerResource),
}

impl Resource {
    pub fn common(&self) -> &ResourceCommon {
        match self {
            Self::TrackFile(r) => r.common(),
            Self::Marker(r) => r.common(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::TrackFile(_) => ResourceKind::TrackFile,
            Self::Marker(_) => ResourceKind::Marker,
        }
    }
}

/// Ordered resources of one track within one segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sequence {
    id: String,
    track_id: Uuid,
    sequence_type: SequenceType,
    resources: Vec<Resource>,
}

impl Sequence {
    /// Build a sequence; mixing resource kinds is reported as FATAL.
    pub fn new(
        id: impl Into<String>,
        track_id: Uuid,
        sequence_type: SequenceType,
        resources: Vec<Resource>,
    ) -> (Self, Diagnostics) {
        let id = id.into();
        let mut diags = Diagnostics::new();
        if let Some(first) = resources.first()
            && resources.iter().any(|r| r.kind() != first.kind())
        {
            diags.fatal(
                ErrorCode::CplStructure,
                format!("sequence {id} of track {track_id} mixes resource kinds"),
            );
        }
        (
            Self {
                id,
                track_id,
                sequence_type,
                resources,
            },
            diags,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn track_id(&self) -> Uuid {
        self.track_id
    }

    pub fn sequence_type(&self) -> &SequenceType {
        &self.sequence_type
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }
}

/// One segment of the playlist timeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    id: String,
    sequences: Vec<Sequence>,
}

impl Segment {
    pub fn new(id: impl Into<String>, sequences: Vec<Sequence>) -> Self {
        Self {
            id: id.into(),
            sequences,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }
}

/// One entry of the playlist's essence descriptor list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EssenceDescriptorEntry {
    id: Uuid,
    dom: DomNode,
}

impl EssenceDescriptorEntry {
    pub fn new(id: Uuid, dom: DomNode) -> Self {
        Self { id, dom }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Normalized descriptor tree.
    pub fn dom(&self) -> &DomNode {
        &self.dom
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
