//! Cross-validation of declared essence descriptors against the referenced track files.
//!
//! Each track file is checked on its own: a header partition that violates the IMF track file
//! constraints, or whose descriptors cannot be decoded, yields a FATAL diagnostic for that
//! package and the remaining packages are still conformed. The whole check stops early only when
//! not a single resource could be resolved to an embedded descriptor.

use crate::composition::model::EssenceDescriptorEntry;
use crate::composition::virtual_track::VirtualTrack;
use crate::dom::model::DomNode;
use crate::foundation::core::Uuid;
use crate::foundation::diagnostics::{Diagnostics, ErrorCode};
use crate::mxf::header::{ByteRangeProvider, HeaderPartition, essence_descriptor_doms};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Names stripped from both sides before declared and embedded descriptors are compared.
///
/// `PHDRMetadataTrackSubDescriptor` has no registered-XML form and never appears in both.
pub const DEFAULT_CONFORMANCE_IGNORE_SET: &[&str] = &[
    "PHDRMetadataTrackSubDescriptor",
    "InstanceUID",
    "InstanceID",
    "EssenceLength",
    "AlternativeCenterCuts",
    "GroupOfSoundfieldGroupsLinkID",
];

/// Options of the conformance check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConformanceOpts {
    pub ignore_set: BTreeSet<String>,
    /// Also require every essence descriptor list entry to be referenced by some resource.
    pub conform_all_virtual_tracks: bool,
}

impl Default for ConformanceOpts {
    fn default() -> Self {
        Self {
            ignore_set: DEFAULT_CONFORMANCE_IGNORE_SET
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            conform_all_virtual_tracks: false,
        }
    }
}

/// One referenced track file: its header partition and access to its bytes.
#[derive(Clone, Copy)]
pub struct TrackFileSource<'a> {
    pub partition: &'a dyn HeaderPartition,
    pub bytes: &'a dyn ByteRangeProvider,
}

impl<'a> TrackFileSource<'a> {
    pub fn new(partition: &'a dyn HeaderPartition, bytes: &'a dyn ByteRangeProvider) -> Self {
        Self { partition, bytes }
    }
}

impl std::fmt::Debug for TrackFileSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackFileSource")
            .field("package", &self.partition.package_uuid())
            .finish_non_exhaustive()
    }
}

/// Embedded descriptors of one package, or why they are unavailable.
enum PackageDescriptors {
    Resolved(Vec<DomNode>),
    Failed,
}

/// Conform the image and audio virtual tracks against their track files.
#[tracing::instrument(skip_all, fields(tracks = virtual_tracks.len(), sources = sources.len()))]
pub fn conform(
    virtual_tracks: &BTreeMap<Uuid, VirtualTrack>,
    edl: &[EssenceDescriptorEntry],
    sources: &[TrackFileSource<'_>],
    opts: &ConformanceOpts,
) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let packages = resolve_packages(sources, &mut diags);

    let declared: BTreeMap<Uuid, DomNode> = edl
        .iter()
        .map(|e| (e.id(), e.dom().with_ignored(&opts.ignore_set)))
        .collect();

    if opts.conform_all_virtual_tracks {
        let referenced: BTreeSet<Uuid> = virtual_tracks
            .values()
            .flat_map(|t| t.track_file_resources())
            .map(|r| r.source_encoding())
            .collect();
        for id in declared.keys().filter(|id| !referenced.contains(*id)) {
            diags.non_fatal(
                ErrorCode::EssenceComponent,
                format!("essence descriptor {id} is not referenced by any resource"),
            );
        }
    }

    // Embedded descriptors per source encoding, from resolved packages only,
    // each contributing once.
    let mut embedded: BTreeMap<Uuid, Vec<DomNode>> = BTreeMap::new();
    let mut contributed: BTreeSet<(Uuid, Uuid)> = BTreeSet::new();
    let mut missing_packages: BTreeSet<Uuid> = BTreeSet::new();
    // First track referencing each source encoding.
    let mut encodings: BTreeMap<Uuid, Uuid> = BTreeMap::new();
    let mut considered = 0usize;
    let mut resolved = 0usize;

    let tracks = virtual_tracks
        .values()
        .filter(|t| t.sequence_type().is_image_or_audio());
    for track in tracks {
        for resource in track.track_file_resources() {
            considered += 1;
            let package = resource.track_file_id();
            let source_encoding = resource.source_encoding();
            encodings.entry(source_encoding).or_insert(track.track_id());
            match packages.get(&package) {
                Some(PackageDescriptors::Resolved(doms)) => {
                    resolved += 1;
                    let list = embedded.entry(source_encoding).or_default();
                    if contributed.insert((source_encoding, package)) {
                        list.extend(doms.iter().map(|d| d.with_ignored(&opts.ignore_set)));
                    }
                }
                Some(PackageDescriptors::Failed) => {}
                None => {
                    if missing_packages.insert(package) {
                        diags.fatal(
                            ErrorCode::EssenceComponent,
                            format!(
                                "track file {package} of track {} has no header partition",
                                track.track_id()
                            ),
                        );
                    }
                }
            }
        }
    }

    if considered > 0 && resolved == 0 {
        diags.fatal(
            ErrorCode::EssenceComponent,
            "no essence descriptor could be resolved for any virtual track, conformance aborted",
        );
        return diags;
    }

    for (source_encoding, track_id) in &encodings {
        if !declared.contains_key(source_encoding) {
            diags.non_fatal(
                ErrorCode::EssenceComponent,
                format!(
                    "track {track_id} references source encoding {source_encoding} which has no \
                     essence descriptor list entry"
                ),
            );
        }
    }

    for (source_encoding, candidates) in &embedded {
        let Some(reference) = declared.get(source_encoding) else {
            continue;
        };
        if candidates.is_empty() {
            diags.non_fatal(
                ErrorCode::EssenceComponent,
                format!(
                    "essence descriptor {source_encoding} has no corresponding descriptor in its track files"
                ),
            );
            continue;
        }
        if candidates.iter().any(|c| c == reference) {
            continue;
        }
        diags.fatal(
            ErrorCode::EssenceComponent,
            mismatch_message(*source_encoding, reference, candidates),
        );
    }
    diags
}

fn resolve_packages(
    sources: &[TrackFileSource<'_>],
    diags: &mut Diagnostics,
) -> BTreeMap<Uuid, PackageDescriptors> {
    let mut packages = BTreeMap::new();
    for source in sources {
        let package = source.partition.package_uuid();
        let constraints = source.partition.check_imf_constraints();
        if constraints.has_fatal() {
            tracing::debug!(%package, "track file fails IMF constraints");
            diags.merge(constraints);
            packages.insert(package, PackageDescriptors::Failed);
            continue;
        }
        diags.merge(constraints);
        match essence_descriptor_doms(source.partition, source.bytes) {
            Ok(doms) => {
                tracing::debug!(%package, descriptors = doms.len(), "embedded descriptors read");
                packages.insert(package, PackageDescriptors::Resolved(doms));
            }
            Err(e) => {
                diags.fatal(
                    ErrorCode::EssenceComponent,
                    format!("track file {package}: essence descriptors cannot be read: {e}"),
                );
                packages.insert(package, PackageDescriptors::Failed);
            }
        }
    }
    packages
}

fn mismatch_message(source_encoding: Uuid, reference: &DomNode, candidates: &[DomNode]) -> String {
    let mut message = format!(
        "essence descriptor {source_encoding} does not match the descriptors of its track files"
    );
    if let Some((_, closest)) = DomNode::closest_match(reference, candidates) {
        let declared_only = DomNode::remove_nodes(reference, closest);
        let embedded_only = DomNode::remove_nodes(closest, reference);
        message.push_str(&format!(
            "\ndeclared only:\n{declared_only}embedded only:\n{embedded_only}"
        ));
    }
    message.push_str(&format!("\ndeclared:\n{reference}"));
    for (i, candidate) in candidates.iter().enumerate() {
        message.push_str(&format!("embedded #{i}:\n{candidate}"));
    }
    message
}

#[cfg(test)]
#[path = "../../tests/unit/conformance/descriptors.rs"]
mod tests;
