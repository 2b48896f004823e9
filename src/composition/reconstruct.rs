use crate::composition::model::{Resource, ResourceKind, Segment, SequenceType};
use crate::composition::virtual_track::{
    EssenceComponentTrack, MarkerTrack, TrackHeader, VirtualTrack,
};
use crate::foundation::core::{EditRate, Uuid};
use crate::foundation::diagnostics::{Diagnostics, ErrorCode};
use std::collections::BTreeMap;

/// Rebuild the virtual tracks of a playlist from its segments.
///
/// Segment 0 establishes the track ids. Resources of every segment are concatenated per track in
/// segment order; resources contributing no duration are dropped with a warning. Every later
/// segment must carry exactly the segment-0 track ids, once each.
#[tracing::instrument(skip(segments), fields(segments = segments.len()))]
pub fn reconstruct(
    segments: &[Segment],
    composition_edit_rate: EditRate,
) -> (BTreeMap<Uuid, VirtualTrack>, Diagnostics) {
    let (tracks, mut diags) = rebuild_tracks(segments, composition_edit_rate);
    diags.merge(segment_track_sets(segments));
    (tracks, diags)
}

/// [`reconstruct`] without the segment track-set check, which the core constraints run.
pub(crate) fn rebuild_tracks(
    segments: &[Segment],
    composition_edit_rate: EditRate,
) -> (BTreeMap<Uuid, VirtualTrack>, Diagnostics) {
    let mut diags = Diagnostics::new();
    let mut tracks = BTreeMap::new();

    let Some(first) = segments.first() else {
        diags.fatal(ErrorCode::CplStructure, "composition has no segments");
        return (tracks, diags);
    };

    let mut track_types: BTreeMap<Uuid, SequenceType> = BTreeMap::new();
    for sequence in first.sequences() {
        if track_types.contains_key(&sequence.track_id()) {
            diags.fatal(
                ErrorCode::CplStructure,
                format!(
                    "segment {} carries track {} more than once",
                    first.id(),
                    sequence.track_id()
                ),
            );
            continue;
        }
        track_types.insert(sequence.track_id(), sequence.sequence_type().clone());
    }

    let mut resources: BTreeMap<Uuid, Vec<Resource>> = BTreeMap::new();
    for segment in segments {
        for sequence in segment.sequences() {
            if !track_types.contains_key(&sequence.track_id()) {
                continue;
            }
            let list = resources.entry(sequence.track_id()).or_default();
            for resource in sequence.resources() {
                if resource.common().source_duration() == 0 {
                    diags.warning(
                        ErrorCode::CplStructure,
                        format!(
                            "resource {} of track {} has a zero source duration and is ignored",
                            resource.common().id(),
                            sequence.track_id()
                        ),
                    );
                    continue;
                }
                list.push(resource.clone());
            }
        }
    }

    for (track_id, sequence_type) in track_types {
        let list = resources.remove(&track_id).unwrap_or_default();
        let header = TrackHeader {
            track_id,
            sequence_type,
            composition_edit_rate,
        };
        match classify(header, list, &mut diags) {
            Some(track) => {
                tracks.insert(track_id, track);
            }
            None => diags.fatal(
                ErrorCode::CplStructure,
                format!("track {track_id} has no resources"),
            ),
        }
    }

    tracing::debug!(tracks = tracks.len(), "virtual tracks rebuilt");
    (tracks, diags)
}

/// Type the track by its first resource. Resources of another kind are reported and dropped.
fn classify(
    header: TrackHeader,
    list: Vec<Resource>,
    diags: &mut Diagnostics,
) -> Option<VirtualTrack> {
    let kind = list.first()?.kind();
    let track_id = header.track_id;
    let mut track_files = Vec::new();
    let mut markers = Vec::new();
    for resource in list {
        match resource {
            Resource::TrackFile(r) => track_files.push(r),
            Resource::Marker(r) => markers.push(r),
        }
    }
    let stray = match kind {
        ResourceKind::TrackFile => markers.len(),
        ResourceKind::Marker => track_files.len(),
    };
    if stray > 0 {
        diags.fatal(
            ErrorCode::CplStructure,
            format!("track {track_id} mixes resource kinds across segments ({stray} dropped)"),
        );
    }
    Some(match kind {
        ResourceKind::TrackFile => {
            VirtualTrack::EssenceComponent(EssenceComponentTrack::new(header, track_files))
        }
        ResourceKind::Marker => VirtualTrack::Marker(MarkerTrack::new(header, markers)),
    })
}

/// Every segment after the first must carry the segment-0 track ids, each exactly once.
pub(crate) fn segment_track_sets(segments: &[Segment]) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let Some(first) = segments.first() else {
        return diags;
    };
    let reference: BTreeMap<Uuid, usize> = track_counts(first);
    for segment in &segments[1..] {
        let counts = track_counts(segment);
        let missing: Vec<String> = reference
            .keys()
            .filter(|id| !counts.contains_key(*id))
            .map(ToString::to_string)
            .collect();
        let extra: Vec<String> = counts
            .keys()
            .filter(|id| !reference.contains_key(*id))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() || !extra.is_empty() {
            diags.fatal(
                ErrorCode::CplStructure,
                format!(
                    "segment {} track ids differ from segment {} (missing [{}], unexpected [{}])",
                    segment.id(),
                    first.id(),
                    missing.join(", "),
                    extra.join(", ")
                ),
            );
        } else if segment.sequences().len() != first.sequences().len() {
            diags.fatal(
                ErrorCode::CplStructure,
                format!(
                    "segment {} has {} sequences, segment {} has {}",
                    segment.id(),
                    segment.sequences().len(),
                    first.id(),
                    first.sequences().len()
                ),
            );
        }
    }
    diags
}

fn track_counts(segment: &Segment) -> BTreeMap<Uuid, usize> {
    let mut counts = BTreeMap::new();
    for sequence in segment.sequences() {
        *counts.entry(sequence.track_id()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
#[path = "../../tests/unit/composition/reconstruct.rs"]
mod tests;
