//! JSON boundary model of a composition playlist.
//!
//! This is the version-normalized shape an upstream CPL reader hands over, whichever schema
//! generation (2013, 2016 or 2020) the playlist was written against. Essence descriptors travel
//! as their registered-XML fragments and are normalized when the composition is built.

use crate::composition::model::{CoreConstraintsVersion, Marker, SequenceType};
use crate::foundation::core::EditRate;
use crate::foundation::error::{ImfError, ImfResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Composition playlist boundary document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionDef {
    /// Core constraints generation (`"2013"`, `"2016"` or `"2020"`).
    pub cpl_schema: CoreConstraintsVersion,
    /// Playlist id (`urn:uuid:` form).
    pub id: String,
    /// Composition edit rate.
    pub edit_rate: EditRate,
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub content_originator: Option<String>,
    #[serde(default)]
    pub content_title: Option<String>,
    #[serde(default)]
    pub content_kind: Option<String>,
    #[serde(default)]
    pub content_version_list: Vec<ContentVersionDef>,
    /// Application identification namespaces.
    #[serde(default)]
    pub application_identification: Vec<String>,
    #[serde(default)]
    pub essence_descriptor_list: Vec<EssenceDescriptorDef>,
    pub segments: Vec<SegmentDef>,
}

/// Content version entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentVersionDef {
    pub id: String,
    #[serde(default)]
    pub label_text: Option<String>,
}

/// Essence descriptor entry with its registered-XML fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssenceDescriptorDef {
    pub id: String,
    pub xml: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentDef {
    pub id: String,
    pub sequences: Vec<SequenceDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceDef {
    pub id: String,
    pub track_id: String,
    /// Sequence element name, e.g. `MainImageSequence`.
    #[serde(rename = "type")]
    pub sequence_type: SequenceType,
    #[serde(default)]
    pub resources: Vec<ResourceDef>,
}

/// Resource of a sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceDef {
    TrackFile(TrackFileResourceDef),
    Marker(MarkerResourceDef),
}

/// Track file resource. Omitted timing fields take their CPL defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackFileResourceDef {
    pub id: String,
    /// Falls back to the composition edit rate.
    #[serde(default)]
    pub edit_rate: Option<EditRate>,
    pub intrinsic_duration: u64,
    #[serde(default)]
    pub entry_point: Option<u64>,
    #[serde(default)]
    pub source_duration: Option<u64>,
    #[serde(default)]
    pub repeat_count: Option<u64>,
    pub track_file_id: String,
    pub source_encoding: String,
    /// Base64 digest of the track file.
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub hash_algorithm: Option<String>,
}

/// Marker resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerResourceDef {
    pub id: String,
    #[serde(default)]
    pub edit_rate: Option<EditRate>,
    pub intrinsic_duration: u64,
    #[serde(default)]
    pub entry_point: Option<u64>,
    #[serde(default)]
    pub source_duration: Option<u64>,
    #[serde(default)]
    pub repeat_count: Option<u64>,
    #[serde(default)]
    pub markers: Vec<Marker>,
}

impl CompositionDef {
    /// Parse a boundary document from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ImfResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ImfError::serde(format!("parse composition JSON: {e}")))
    }

    /// Parse a boundary document from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ImfResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ImfError::validation(format!("open composition JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse a boundary document from a JSON string.
    pub fn from_json_str(json: &str) -> ImfResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ImfError::serde(format!("parse composition JSON: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/def.rs"]
mod tests;
