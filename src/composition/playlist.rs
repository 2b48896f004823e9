//! Version-independent composition playlist.
//!
//! [`ImfComposition`] is built once from a [`CompositionDef`]: identifiers are parsed, the
//! essence descriptor list is normalized into [`DomNode`] trees, virtual tracks are rebuilt and
//! the core constraints are checked. Every finding is kept in [`ImfComposition::errors`];
//! construction fails only when one of them is FATAL.

use crate::composition::def::{CompositionDef, ContentVersionDef, ResourceDef, SequenceDef};
use crate::composition::model::{
    CoreConstraintsVersion, EssenceDescriptorEntry, MarkerResource, Resource, ResourceCommon,
    Segment, Sequence, SequenceType, TrackFileResource,
};
use crate::composition::reconstruct::rebuild_tracks;
use crate::composition::virtual_track::VirtualTrack;
use crate::conformance::descriptors::{ConformanceOpts, TrackFileSource, conform};
use crate::constraints::core::{ValidationOpts, check};
use crate::dom::model::DomNode;
use crate::dom::xml::dom_from_xml;
use crate::foundation::core::{EditRate, Uuid, parse_urn_uuid};
use crate::foundation::diagnostics::{Diagnostics, ErrorCode};
use crate::foundation::error::ImfResult;
use base64::Engine as _;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// A composition playlist with its virtual tracks.
#[derive(Clone, Debug)]
pub struct ImfComposition {
    id: Uuid,
    edit_rate: EditRate,
    annotation: Option<String>,
    issuer: Option<String>,
    creator: Option<String>,
    content_originator: Option<String>,
    content_title: Option<String>,
    content_kind: Option<String>,
    content_version_list: Vec<ContentVersionDef>,
    segments: Vec<Segment>,
    essence_descriptor_list: Vec<EssenceDescriptorEntry>,
    application_id_set: BTreeSet<String>,
    core_constraints_schema: CoreConstraintsVersion,
    virtual_tracks: BTreeMap<Uuid, VirtualTrack>,
    errors: Diagnostics,
}

impl ImfComposition {
    /// Build with default validation options.
    pub fn new(def: CompositionDef) -> ImfResult<Self> {
        Self::with_opts(def, &ValidationOpts::default())
    }

    /// Build and validate; fails with every diagnostic attached when any is FATAL.
    #[tracing::instrument(skip(def, opts), fields(id = %def.id))]
    pub fn with_opts(def: CompositionDef, opts: &ValidationOpts) -> ImfResult<Self> {
        let mut composition = Self::build(def, opts);
        let errors = std::mem::take(&mut composition.errors).fail_on_fatal()?;
        composition.errors = errors;
        Ok(composition)
    }

    /// Every diagnostic construction would produce, without failing on FATAL ones.
    pub fn validate(def: CompositionDef, opts: &ValidationOpts) -> Diagnostics {
        Self::build(def, opts).errors
    }

    /// Parse a boundary document from a JSON reader and build it.
    pub fn from_reader<R: std::io::Read>(r: R) -> ImfResult<Self> {
        Self::new(CompositionDef::from_reader(r)?)
    }

    /// Parse a boundary document from a JSON file and build it.
    pub fn from_path(path: impl AsRef<Path>) -> ImfResult<Self> {
        Self::new(CompositionDef::from_path(path)?)
    }

    fn build(def: CompositionDef, opts: &ValidationOpts) -> Self {
        let mut diags = Diagnostics::new();

        let id = parse_uuid_or_report(&def.id, "composition id", &mut diags);

        let mut essence_descriptor_list = Vec::new();
        let mut seen = BTreeSet::new();
        for entry in &def.essence_descriptor_list {
            let Some(entry_id) = parse_uuid(&entry.id, "essence descriptor id", &mut diags) else {
                continue;
            };
            if !seen.insert(entry_id) {
                diags.fatal(
                    ErrorCode::CplStructure,
                    format!("essence descriptor {entry_id} is listed more than once"),
                );
                continue;
            }
            match dom_from_xml(&entry.xml) {
                Ok(dom) => essence_descriptor_list.push(EssenceDescriptorEntry::new(entry_id, dom)),
                Err(e) => diags.fatal(
                    ErrorCode::CplStructure,
                    format!("essence descriptor {entry_id} cannot be read: {e}"),
                ),
            }
        }

        let segments: Vec<Segment> = def
            .segments
            .iter()
            .map(|segment| {
                let sequences = segment
                    .sequences
                    .iter()
                    .filter_map(|sequence| build_sequence(sequence, def.edit_rate, &mut diags))
                    .collect();
                Segment::new(segment.id.clone(), sequences)
            })
            .collect();

        // Segment track sets are left to the core check.
        let (virtual_tracks, reconstruct_diags) = rebuild_tracks(&segments, def.edit_rate);
        diags.merge(reconstruct_diags);

        let mut composition = Self {
            id,
            edit_rate: def.edit_rate,
            annotation: def.annotation,
            issuer: def.issuer,
            creator: def.creator,
            content_originator: def.content_originator,
            content_title: def.content_title,
            content_kind: def.content_kind,
            content_version_list: def.content_version_list,
            segments,
            essence_descriptor_list,
            application_id_set: def
                .application_identification
                .into_iter()
                .map(|s| s.trim().to_owned())
                .collect(),
            core_constraints_schema: def.cpl_schema,
            virtual_tracks,
            errors: Diagnostics::new(),
        };
        diags.merge(check(&composition, &composition.virtual_tracks, opts));
        composition.errors = diags;
        composition
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn edit_rate(&self) -> EditRate {
        self.edit_rate
    }

    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    pub fn creator(&self) -> Option<&str> {
        self.creator.as_deref()
    }

    pub fn content_originator(&self) -> Option<&str> {
        self.content_originator.as_deref()
    }

    pub fn content_title(&self) -> Option<&str> {
        self.content_title.as_deref()
    }

    pub fn content_kind(&self) -> Option<&str> {
        self.content_kind.as_deref()
    }

    pub fn content_version_list(&self) -> &[ContentVersionDef] {
        &self.content_version_list
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn application_id_set(&self) -> &BTreeSet<String> {
        &self.application_id_set
    }

    pub fn core_constraints_schema(&self) -> CoreConstraintsVersion {
        self.core_constraints_schema
    }

    /// Diagnostics accumulated while building; never FATAL for a built composition.
    pub fn errors(&self) -> &Diagnostics {
        &self.errors
    }

    pub fn virtual_tracks(&self) -> &BTreeMap<Uuid, VirtualTrack> {
        &self.virtual_tracks
    }

    pub fn virtual_track(&self, track_id: Uuid) -> Option<&VirtualTrack> {
        self.virtual_tracks.get(&track_id)
    }

    /// The main image track (the first one if several exist).
    pub fn main_image_track(&self) -> Option<&VirtualTrack> {
        self.virtual_tracks
            .values()
            .find(|t| *t.sequence_type() == SequenceType::MainImageSequence)
    }

    /// Composition duration in composition edit units, from the main image track.
    pub fn duration(&self) -> u64 {
        self.main_image_track().map_or(0, VirtualTrack::duration)
    }

    pub fn essence_descriptors(&self) -> &[EssenceDescriptorEntry] {
        &self.essence_descriptor_list
    }

    /// Essence descriptor list keyed by descriptor id.
    pub fn essence_descriptor_map(&self) -> BTreeMap<Uuid, &DomNode> {
        self.essence_descriptor_list
            .iter()
            .map(|e| (e.id(), e.dom()))
            .collect()
    }

    /// Declared descriptor of the first resource referencing `track_file_id`.
    pub fn essence_descriptor(&self, track_file_id: Uuid) -> Option<&DomNode> {
        let source_encoding = self
            .virtual_tracks
            .values()
            .flat_map(|t| t.track_file_resources())
            .find(|r| r.track_file_id() == track_file_id)?
            .source_encoding();
        self.essence_descriptor_list
            .iter()
            .find(|e| e.id() == source_encoding)
            .map(EssenceDescriptorEntry::dom)
    }

    /// Cross-check declared essence descriptors against the referenced track files.
    pub fn conform_virtual_tracks(
        &self,
        sources: &[TrackFileSource<'_>],
        conform_all_virtual_tracks: bool,
    ) -> Diagnostics {
        let opts = ConformanceOpts {
            conform_all_virtual_tracks,
            ..ConformanceOpts::default()
        };
        self.conform_virtual_tracks_with(sources, &opts)
    }

    #[tracing::instrument(skip(self, sources, opts), fields(id = %self.id, sources = sources.len()))]
    pub fn conform_virtual_tracks_with(
        &self,
        sources: &[TrackFileSource<'_>],
        opts: &ConformanceOpts,
    ) -> Diagnostics {
        conform(
            &self.virtual_tracks,
            &self.essence_descriptor_list,
            sources,
            opts,
        )
    }
}

fn parse_uuid(text: &str, what: &str, diags: &mut Diagnostics) -> Option<Uuid> {
    match parse_urn_uuid(text) {
        Ok(id) => Some(id),
        Err(e) => {
            diags.fatal(ErrorCode::CplStructure, format!("{what}: {e}"));
            None
        }
    }
}

fn parse_uuid_or_report(text: &str, what: &str, diags: &mut Diagnostics) -> Uuid {
    parse_uuid(text, what, diags).unwrap_or(Uuid::nil())
}

fn build_sequence(
    def: &SequenceDef,
    composition_edit_rate: EditRate,
    diags: &mut Diagnostics,
) -> Option<Sequence> {
    let track_id = parse_uuid(
        &def.track_id,
        &format!("track id of sequence {}", def.id),
        diags,
    )?;
    let resources = def
        .resources
        .iter()
        .filter_map(|r| build_resource(r, composition_edit_rate, diags))
        .collect();
    let (sequence, sequence_diags) =
        Sequence::new(def.id.clone(), track_id, def.sequence_type.clone(), resources);
    diags.merge(sequence_diags);
    Some(sequence)
}

fn build_resource(
    def: &ResourceDef,
    composition_edit_rate: EditRate,
    diags: &mut Diagnostics,
) -> Option<Resource> {
    match def {
        ResourceDef::TrackFile(r) => {
            let common = ResourceCommon::new(
                r.id.clone(),
                r.edit_rate.unwrap_or(composition_edit_rate),
                r.intrinsic_duration,
                r.entry_point,
                r.source_duration,
                r.repeat_count,
            );
            let track_file_id = parse_uuid(
                &r.track_file_id,
                &format!("track file id of resource {}", r.id),
                diags,
            );
            let source_encoding = parse_uuid(
                &r.source_encoding,
                &format!("source encoding of resource {}", r.id),
                diags,
            );
            let hash = match r.hash.as_deref() {
                Some(text) => match base64::engine::general_purpose::STANDARD.decode(text.trim()) {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        diags.non_fatal(
                            ErrorCode::CplStructure,
                            format!("hash of resource {} is not base64: {e}", r.id),
                        );
                        None
                    }
                },
                None => None,
            };
            Some(Resource::TrackFile(TrackFileResource::new(
                common,
                track_file_id?,
                source_encoding?,
                hash,
                r.hash_algorithm.clone(),
            )))
        }
        ResourceDef::Marker(r) => {
            let common = ResourceCommon::new(
                r.id.clone(),
                r.edit_rate.unwrap_or(composition_edit_rate),
                r.intrinsic_duration,
                r.entry_point,
                r.source_duration,
                r.repeat_count,
            );
            let (resource, marker_diags) = MarkerResource::new(common, r.markers.clone());
            diags.merge(marker_diags);
            Some(Resource::Marker(resource))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/playlist.rs"]
mod tests;
