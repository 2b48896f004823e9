//! Interoperable Master Format composition modelling and conformance.
//!
//! The crate covers the path from a composition playlist to a conformance verdict:
//!
//! - Load a [`CompositionDef`] and build an [`ImfComposition`] (virtual tracks are reconstructed
//!   from segments and core constraints are checked on the way)
//! - Cross-check declared essence descriptors against MXF header partitions with
//!   [`ImfComposition::conform_virtual_tracks`]
//! - Apply application profile rules with [`application_compositions`]
//!
//! Problems are accumulated as [`Diagnostics`]; only unrecoverable input errors surface as
//! [`ImfError`].
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod composition;
pub(crate) mod conformance;
pub(crate) mod constraints;
pub(crate) mod dom;
pub(crate) mod mxf;
pub(crate) mod profiles;

pub use crate::foundation::core::{EditRate, Uuid, parse_urn_uuid, urn_uuid};
pub use crate::foundation::diagnostics::{Diagnostic, Diagnostics, ErrorCode, Severity};
pub use crate::foundation::error::{ImfError, ImfResult};

pub use crate::composition::def::{
    CompositionDef, ContentVersionDef, EssenceDescriptorDef, MarkerResourceDef, ResourceDef,
    SegmentDef, SequenceDef, TrackFileResourceDef,
};
pub use crate::composition::model::{
    CoreConstraintsVersion, EssenceDescriptorEntry, Marker, MarkerLabel, MarkerResource, Resource,
    ResourceCommon, ResourceKind, STANDARD_MARKER_SCOPE, Segment, Sequence, SequenceType,
    TrackFileResource,
};
pub use crate::composition::playlist::ImfComposition;
pub use crate::composition::reconstruct::reconstruct;
pub use crate::composition::virtual_track::{
    EssenceComponentTrack, MarkerTrack, TrackHeader, VirtualTrack,
};

pub use crate::constraints::core::{DEFAULT_HOMOGENEITY_IGNORE_SET, ValidationOpts, check};

pub use crate::conformance::descriptors::{
    ConformanceOpts, DEFAULT_CONFORMANCE_IGNORE_SET, TrackFileSource, conform,
};

pub use crate::dom::model::{DomNode, FieldValue};
pub use crate::dom::xml::dom_from_xml;

pub use crate::mxf::header::{
    ByteRangeProvider, HeaderPartition, MxfHeaderPartition, PartitionPack, SliceByteProvider,
    essence_descriptor_doms,
};
pub use crate::mxf::klv::KlvHeader;
pub use crate::mxf::primer::PrimerPack;
pub use crate::mxf::ul::Ul;

pub use crate::profiles::image::{
    ColorModel, Colorimetry, FrameLayout, ImageDescriptorModel, Quantization, Sampling,
};
pub use crate::profiles::registry::{
    APP2_NAMESPACE, APP2E_2020_NAMESPACE, APP2E_NAMESPACE, APP4_NAMESPACE, APP5_NAMESPACE,
    ApplicationComposition, ApplicationConstructor, ApplicationProfile, TSP2121_NAMESPACE,
    application_compositions, constructor,
};
pub use crate::profiles::rules::validate as validate_profile;
