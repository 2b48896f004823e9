//! ST 2067-2 core constraints over a playlist and its virtual tracks.

use crate::composition::model::{CoreConstraintsVersion, Segment, SequenceType};
use crate::composition::playlist::ImfComposition;
use crate::composition::reconstruct::segment_track_sets;
use crate::composition::virtual_track::VirtualTrack;
use crate::dom::model::DomNode;
use crate::foundation::core::{EditRate, Uuid};
use crate::foundation::diagnostics::{Diagnostics, ErrorCode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Descriptor names that legitimately differ between track files of one virtual track.
pub const DEFAULT_HOMOGENEITY_IGNORE_SET: &[&str] = &[
    "InstanceUID",
    "InstanceID",
    "EssenceLength",
    "AlternativeCenterCuts",
    "GroupOfSoundfieldGroupsLinkID",
];

/// Options of the core constraints check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOpts {
    /// Field and element names stripped before descriptors of one track are compared.
    pub homogeneity_ignore_set: BTreeSet<String>,
    /// Severity of a second main image track: FATAL when `true`, NON_FATAL when `false`.
    /// Unset follows the core constraints version (FATAL from 2016 on).
    pub strict_multiple_main_image: Option<bool>,
}

impl Default for ValidationOpts {
    fn default() -> Self {
        Self {
            homogeneity_ignore_set: DEFAULT_HOMOGENEITY_IGNORE_SET
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            strict_multiple_main_image: None,
        }
    }
}

/// Check the core constraints, accumulating every violation.
///
/// Covers the segment track-id sets as well, so a composition's segments are checked even when
/// its tracks were rebuilt elsewhere.
#[tracing::instrument(skip_all, fields(tracks = virtual_tracks.len()))]
pub fn check(
    composition: &ImfComposition,
    virtual_tracks: &BTreeMap<Uuid, VirtualTrack>,
    opts: &ValidationOpts,
) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let version = composition.core_constraints_schema();
    let edl = composition.essence_descriptor_map();

    let mut main_images = 0usize;
    let mut main_audio = 0usize;
    for track in virtual_tracks.values() {
        let track_id = track.track_id();
        if track.is_empty() {
            diags.fatal(
                ErrorCode::CoreConstraints,
                format!("virtual track {track_id} has no resources"),
            );
            continue;
        }
        check_resource_bounds(track, &mut diags);

        let rates = track.edit_rates();
        if rates.len() > 1 {
            let listed: Vec<String> = rates.iter().map(ToString::to_string).collect();
            diags.fatal(
                ErrorCode::CoreConstraints,
                format!(
                    "virtual track {track_id} mixes edit rates [{}]",
                    listed.join(", ")
                ),
            );
        }

        match track.sequence_type() {
            SequenceType::MainImageSequence => {
                main_images += 1;
                for resource in track.track_file_resources() {
                    let rate = resource.common().edit_rate();
                    if rate != composition.edit_rate() {
                        diags.fatal(
                            ErrorCode::CoreConstraints,
                            format!(
                                "image resource {} edit rate {rate} differs from composition edit rate {}",
                                resource.common().id(),
                                composition.edit_rate()
                            ),
                        );
                    }
                }
            }
            SequenceType::MainAudioSequence => main_audio += 1,
            _ => {}
        }

        if !edl.is_empty() && track.sequence_type().is_image_or_audio() {
            check_descriptors(track, &edl, &opts.homogeneity_ignore_set, &mut diags);
        }
    }

    match main_images {
        0 => diags.fatal(
            ErrorCode::CoreConstraints,
            "composition has no MainImageSequence virtual track",
        ),
        1 => {}
        n => {
            let message = format!("composition has {n} MainImageSequence virtual tracks");
            let strict = opts
                .strict_multiple_main_image
                .unwrap_or(version != CoreConstraintsVersion::St2067_2_2013);
            if strict {
                diags.fatal(ErrorCode::CoreConstraints, message);
            } else {
                diags.non_fatal(ErrorCode::CoreConstraints, message);
            }
        }
    }
    if main_audio == 0 {
        diags.fatal(
            ErrorCode::CoreConstraints,
            "composition has no MainAudioSequence virtual track",
        );
    }

    diags.merge(segment_track_sets(composition.segments()));

    if version != CoreConstraintsVersion::St2067_2_2013 {
        check_track_durations(virtual_tracks, &mut diags);
        check_segment_durations(composition.segments(), composition.edit_rate(), &mut diags);
    }
    diags
}

fn check_resource_bounds(track: &VirtualTrack, diags: &mut Diagnostics) {
    for common in track.resource_commons() {
        if !common.duration_in_bounds() {
            diags.fatal(
                ErrorCode::CoreConstraints,
                format!(
                    "resource {} of track {}: source duration {} exceeds intrinsic duration {} minus entry point {}",
                    common.id(),
                    track.track_id(),
                    common.source_duration(),
                    common.intrinsic_duration(),
                    common.entry_point()
                ),
            );
        }
    }
}

/// EDL resolution and homogeneity of the descriptors referenced by one track.
fn check_descriptors(
    track: &VirtualTrack,
    edl: &BTreeMap<Uuid, &DomNode>,
    ignore: &BTreeSet<String>,
    diags: &mut Diagnostics,
) {
    let track_id = track.track_id();
    let mut referenced: Vec<(Uuid, DomNode)> = Vec::new();
    for resource in track.track_file_resources() {
        let id = resource.source_encoding();
        match edl.get(&id) {
            None => diags.fatal(
                ErrorCode::CoreConstraints,
                format!(
                    "resource {} of track {track_id} references essence descriptor {id} which is not in the essence descriptor list",
                    resource.common().id()
                ),
            ),
            Some(dom) => {
                if !referenced.iter().any(|(seen, _)| *seen == id) {
                    referenced.push((id, dom.with_ignored(ignore)));
                }
            }
        }
    }

    let Some(((first_id, first), rest)) = referenced.split_first() else {
        return;
    };
    if let Some((other_id, other)) = rest.iter().find(|(_, dom)| dom != first) {
        let diff = DomNode::remove_nodes(other, first);
        diags.fatal(
            ErrorCode::CoreConstraints,
            format!(
                "virtual track {track_id} is not homogeneous: essence descriptor {other_id} differs from {first_id}\n{diff}"
            ),
        );
    }
}

fn check_track_durations(virtual_tracks: &BTreeMap<Uuid, VirtualTrack>, diags: &mut Diagnostics) {
    let Some(main) = virtual_tracks
        .values()
        .find(|t| *t.sequence_type() == SequenceType::MainImageSequence)
    else {
        return;
    };
    let expected = main.duration();
    for track in virtual_tracks.values() {
        if matches!(track, VirtualTrack::Marker(_)) || track.is_empty() {
            continue;
        }
        let duration = track.duration();
        if duration != expected {
            diags.non_fatal(
                ErrorCode::CoreConstraints,
                format!(
                    "virtual track {} lasts {duration} composition edit units, main image track lasts {expected}",
                    track.track_id()
                ),
            );
        }
    }
}

/// All sequences of a segment must last the same number of composition edit units.
fn check_segment_durations(
    segments: &[Segment],
    composition_rate: EditRate,
    diags: &mut Diagnostics,
) {
    for segment in segments {
        let durations: BTreeSet<u64> = segment
            .sequences()
            .iter()
            .filter_map(|sequence| {
                let rate = sequence.resources().first()?.common().edit_rate();
                let units = sequence
                    .resources()
                    .iter()
                    .fold(0u64, |acc, r| acc.saturating_add(r.common().duration()));
                Some(rate.convert_duration(units, composition_rate))
            })
            .collect();
        if durations.len() > 1 {
            let listed: Vec<String> = durations.iter().map(ToString::to_string).collect();
            diags.fatal(
                ErrorCode::CoreConstraints,
                format!(
                    "sequences of segment {} have different durations [{}]",
                    segment.id(),
                    listed.join(", ")
                ),
            );
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/constraints/core.rs"]
mod tests;
