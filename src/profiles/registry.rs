//! Application identification namespaces and the profile each one selects.

use crate::composition::playlist::ImfComposition;
use crate::dom::model::DomNode;
use crate::foundation::diagnostics::{Diagnostics, ErrorCode};
use crate::profiles::image::ImageDescriptorModel;
use crate::profiles::rules::validate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

pub const APP2_NAMESPACE: &str = "http://www.smpte-ra.org/schemas/2067-20/2016";
pub const APP2E_NAMESPACE: &str = "http://www.smpte-ra.org/schemas/2067-21/2016";
pub const APP2E_2020_NAMESPACE: &str = "http://www.smpte-ra.org/ns/2067-21/2020";
pub const APP4_NAMESPACE: &str = "http://www.smpte-ra.org/ns/2067-40/2020";
pub const APP5_NAMESPACE: &str = "http://www.smpte-ra.org/ns/2067-50/2017";
pub const TSP2121_NAMESPACE: &str =
    "http://www.digitalproductionpartnership.co.uk/schema/imf/TSP2121-1/2018";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationProfile {
    /// ST 2067-20.
    App2,
    /// ST 2067-21.
    App2E,
    /// ST 2067-40.
    App4,
    /// ST 2067-50.
    App5,
    /// DPP TSP 2121-1.
    Tsp2121,
}

impl fmt::Display for ApplicationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::App2 => "App2",
            Self::App2E => "App2E",
            Self::App4 => "App4",
            Self::App5 => "App5",
            Self::Tsp2121 => "TSP2121",
        };
        f.write_str(s)
    }
}

/// A composition checked against one application profile.
#[derive(Clone, Debug)]
pub struct ApplicationComposition {
    profile: ApplicationProfile,
    errors: Diagnostics,
    image_descriptor: Option<ImageDescriptorModel>,
}

impl ApplicationComposition {
    /// Project the main image descriptor and apply the profile's rules.
    ///
    /// Descriptors of the main image track must agree once `ignore` is stripped; the first one is
    /// the one checked.
    #[tracing::instrument(skip(composition, ignore), fields(id = %composition.id()))]
    pub fn new(
        composition: &ImfComposition,
        ignore: &BTreeSet<String>,
        profile: ApplicationProfile,
    ) -> Self {
        let mut errors = Diagnostics::new();
        let image_descriptor = main_image_descriptor(composition, ignore, profile, &mut errors)
            .map(|dom| {
                let (model, model_diags) = ImageDescriptorModel::from_dom(dom);
                errors.merge(model_diags);
                errors.merge(validate(&model, profile));
                model
            });
        Self {
            profile,
            errors,
            image_descriptor,
        }
    }

    pub fn profile(&self) -> ApplicationProfile {
        self.profile
    }

    pub fn errors(&self) -> &Diagnostics {
        &self.errors
    }

    pub fn image_descriptor(&self) -> Option<&ImageDescriptorModel> {
        self.image_descriptor.as_ref()
    }

    /// No NON_FATAL or FATAL diagnostic was recorded.
    pub fn is_conformant(&self) -> bool {
        !self.errors.has_errors()
    }
}

fn main_image_descriptor<'a>(
    composition: &'a ImfComposition,
    ignore: &BTreeSet<String>,
    profile: ApplicationProfile,
    errors: &mut Diagnostics,
) -> Option<&'a DomNode> {
    let Some(track) = composition.main_image_track() else {
        errors.non_fatal(
            ErrorCode::ApplicationProfile,
            format!("{profile}: composition has no main image track"),
        );
        return None;
    };
    let mut descriptors: Vec<&DomNode> = Vec::new();
    for resource in track.track_file_resources() {
        let id = resource.source_encoding();
        match composition
            .essence_descriptors()
            .iter()
            .find(|e| e.id() == id)
        {
            Some(entry) => descriptors.push(entry.dom()),
            None => errors.non_fatal(
                ErrorCode::ApplicationProfile,
                format!("{profile}: main image resource {} has no essence descriptor", resource.common().id()),
            ),
        }
    }
    let first = *descriptors.first()?;
    let reference = first.with_ignored(ignore);
    if descriptors
        .iter()
        .skip(1)
        .any(|d| d.with_ignored(ignore) != reference)
    {
        errors.non_fatal(
            ErrorCode::ApplicationProfile,
            format!("{profile}: main image essence descriptors are not identical"),
        );
    }
    Some(first)
}

/// Builds an [`ApplicationComposition`] for one profile.
pub type ApplicationConstructor = fn(&ImfComposition, &BTreeSet<String>) -> ApplicationComposition;

fn app2(c: &ImfComposition, ignore: &BTreeSet<String>) -> ApplicationComposition {
    ApplicationComposition::new(c, ignore, ApplicationProfile::App2)
}

fn app2e(c: &ImfComposition, ignore: &BTreeSet<String>) -> ApplicationComposition {
    ApplicationComposition::new(c, ignore, ApplicationProfile::App2E)
}

fn app4(c: &ImfComposition, ignore: &BTreeSet<String>) -> ApplicationComposition {
    ApplicationComposition::new(c, ignore, ApplicationProfile::App4)
}

fn app5(c: &ImfComposition, ignore: &BTreeSet<String>) -> ApplicationComposition {
    ApplicationComposition::new(c, ignore, ApplicationProfile::App5)
}

fn tsp2121(c: &ImfComposition, ignore: &BTreeSet<String>) -> ApplicationComposition {
    ApplicationComposition::new(c, ignore, ApplicationProfile::Tsp2121)
}

static REGISTRY: LazyLock<BTreeMap<&'static str, ApplicationConstructor>> = LazyLock::new(|| {
    let entries: [(&'static str, ApplicationConstructor); 6] = [
        (APP2_NAMESPACE, app2),
        (APP2E_NAMESPACE, app2e),
        (APP2E_2020_NAMESPACE, app2e),
        (APP4_NAMESPACE, app4),
        (APP5_NAMESPACE, app5),
        (TSP2121_NAMESPACE, tsp2121),
    ];
    entries.into_iter().collect()
});

/// Constructor registered for an application identification namespace.
pub fn constructor(namespace: &str) -> Option<ApplicationConstructor> {
    REGISTRY.get(namespace.trim()).copied()
}

/// Check the composition against every profile its application identification names.
///
/// Unknown namespaces are reported as WARNING and skipped.
#[tracing::instrument(skip(composition, ignore), fields(id = %composition.id()))]
pub fn application_compositions(
    composition: &ImfComposition,
    ignore: &BTreeSet<String>,
) -> (Vec<ApplicationComposition>, Diagnostics) {
    let mut diags = Diagnostics::new();
    let mut out = Vec::new();
    for namespace in composition.application_id_set() {
        match constructor(namespace) {
            Some(build) => out.push(build(composition, ignore)),
            None => diags.warning(
                ErrorCode::ApplicationProfile,
                format!("application identification {namespace} is not supported"),
            ),
        }
    }
    (out, diags)
}

#[cfg(test)]
#[path = "../../tests/unit/profiles/registry.rs"]
mod tests;
