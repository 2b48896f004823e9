//! Virtual tracks: one logical timeline assembled from the sequences of every segment.

use crate::composition::model::{
    MarkerResource, ResourceCommon, ResourceKind, SequenceType, TrackFileResource,
};
use crate::foundation::core::{EditRate, Uuid};
use std::collections::BTreeSet;

/// Identity shared by every virtual track variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackHeader {
    pub track_id: Uuid,
    pub sequence_type: SequenceType,
    pub composition_edit_rate: EditRate,
}

/// A track made of essence track file resources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EssenceComponentTrack {
    header: TrackHeader,
    resources: Vec<TrackFileResource>,
}

/// A track made of marker resources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerTrack {
    header: TrackHeader,
    resources: Vec<MarkerResource>,
}

/// Virtual track, typed by the kind of its resources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VirtualTrack {
    EssenceComponent(EssenceComponentTrack),
    Marker(MarkerTrack),
}

impl EssenceComponentTrack {
    pub fn new(header: TrackHeader, resources: Vec<TrackFileResource>) -> Self {
        Self { header, resources }
    }

    pub fn resources(&self) -> &[TrackFileResource] {
        &self.resources
    }
}

impl MarkerTrack {
    pub fn new(header: TrackHeader, resources: Vec<MarkerResource>) -> Self {
        Self { header, resources }
    }

    pub fn resources(&self) -> &[MarkerResource] {
        &self.resources
    }
}

impl VirtualTrack {
    pub fn header(&self) -> &TrackHeader {
        match self {
            Self::EssenceComponent(t) => &t.header,
            Self::Marker(t) => &t.header,
        }
    }

    pub fn track_id(&self) -> Uuid {
        self.header().track_id
    }

    pub fn sequence_type(&self) -> &SequenceType {
        &self.header().sequence_type
    }

    pub fn composition_edit_rate(&self) -> EditRate {
        self.header().composition_edit_rate
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::EssenceComponent(_) => ResourceKind::TrackFile,
            Self::Marker(_) => ResourceKind::Marker,
        }
    }

    /// Timing blocks of every resource, in timeline order.
    pub fn resource_commons(&self) -> Vec<&ResourceCommon> {
        match self {
            Self::EssenceComponent(t) => t.resources.iter().map(|r| r.common()).collect(),
            Self::Marker(t) => t.resources.iter().map(|r| r.common()).collect(),
        }
    }

    /// Track file resources; empty for marker tracks.
    pub fn track_file_resources(&self) -> &[TrackFileResource] {
        match self {
            Self::EssenceComponent(t) => &t.resources,
            Self::Marker(_) => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::EssenceComponent(t) => t.resources.is_empty(),
            Self::Marker(t) => t.resources.is_empty(),
        }
    }

    /// Distinct edit rates used by the resources.
    pub fn edit_rates(&self) -> BTreeSet<EditRate> {
        self.resource_commons()
            .into_iter()
            .map(|c| c.edit_rate())
            .collect()
    }

    /// Edit rate of the first resource, which the track is counted in.
    pub fn track_edit_rate(&self) -> Option<EditRate> {
        self.resource_commons().first().map(|c| c.edit_rate())
    }

    /// Sum of `source_duration * repeat_count` in track edit units.
    pub fn duration_in_track_edit_units(&self) -> u64 {
        self.resource_commons()
            .into_iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.duration()))
    }

    /// Track duration in composition edit units, rounded to the nearest unit.
    pub fn duration(&self) -> u64 {
        let units = self.duration_in_track_edit_units();
        match self.track_edit_rate() {
            Some(rate) => rate.convert_duration(units, self.composition_edit_rate()),
            None => 0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/virtual_track.rs"]
mod tests;
