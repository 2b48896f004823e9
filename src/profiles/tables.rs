//! Read-only lookup tables of the application profiles, built on first use.

use crate::mxf::ul::Ul;
use crate::profiles::image::{ColorModel, Colorimetry, FrameLayout, Quantization, Sampling};
use crate::profiles::registry::ApplicationProfile;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

const fn color_label(group: u8, item: u8) -> Ul {
    Ul::new([
        0x06, 0x0E, 0x2B, 0x34, 0x04, 0x01, 0x01, 0x06, 0x04, 0x01, 0x01, 0x01, group, item, 0x00,
        0x00,
    ])
}

pub const PRIMARIES_SMPTE170M: Ul = color_label(0x03, 0x01);
pub const PRIMARIES_BT470_PAL: Ul = color_label(0x03, 0x02);
pub const PRIMARIES_BT709: Ul = color_label(0x03, 0x03);
pub const PRIMARIES_BT2020: Ul = color_label(0x03, 0x04);
pub const PRIMARIES_DCDM: Ul = color_label(0x03, 0x05);
pub const PRIMARIES_P3D65: Ul = color_label(0x03, 0x06);
pub const PRIMARIES_ACES: Ul = color_label(0x03, 0x07);

pub const TRANSFER_BT709: Ul = color_label(0x01, 0x02);
pub const TRANSFER_LINEAR: Ul = color_label(0x01, 0x06);
pub const TRANSFER_XVYCC: Ul = color_label(0x01, 0x08);
pub const TRANSFER_BT2020: Ul = color_label(0x01, 0x09);
pub const TRANSFER_ST2084: Ul = color_label(0x01, 0x0A);

pub const CODING_BT601: Ul = color_label(0x02, 0x01);
pub const CODING_BT709: Ul = color_label(0x02, 0x02);
pub const CODING_BT2020_NCL: Ul = color_label(0x02, 0x06);

/// (primaries, transfer) keyed without the version byte.
static COLORIMETRY: LazyLock<BTreeMap<(Ul, Ul), Colorimetry>> = LazyLock::new(|| {
    [
        (PRIMARIES_BT470_PAL, TRANSFER_BT709, Colorimetry::Color1),
        (PRIMARIES_SMPTE170M, TRANSFER_BT709, Colorimetry::Color2),
        (PRIMARIES_BT709, TRANSFER_BT709, Colorimetry::Color3),
        (PRIMARIES_BT709, TRANSFER_XVYCC, Colorimetry::Color4),
        (PRIMARIES_BT2020, TRANSFER_BT2020, Colorimetry::Color5),
        (PRIMARIES_P3D65, TRANSFER_ST2084, Colorimetry::Color6),
        (PRIMARIES_BT2020, TRANSFER_ST2084, Colorimetry::Color7),
        (PRIMARIES_ACES, TRANSFER_LINEAR, Colorimetry::App5Ap0),
    ]
    .into_iter()
    .map(|(p, t, c)| ((p.without_version(), t.without_version()), c))
    .collect()
});

pub fn colorimetry(primaries: Ul, transfer: Ul) -> Colorimetry {
    COLORIMETRY
        .get(&(primaries.without_version(), transfer.without_version()))
        .copied()
        .unwrap_or(Colorimetry::Unknown)
}

/// Constraints of one application profile.
///
/// The keys of `max_dimensions` are the allowed color models. Per-color-model tables without an
/// entry for a model leave that property unconstrained.
#[derive(Debug)]
pub struct ProfileRules {
    pub max_dimensions: BTreeMap<ColorModel, (u64, u64)>,
    pub samplings: BTreeMap<ColorModel, BTreeSet<Sampling>>,
    pub quantizations: BTreeMap<ColorModel, BTreeSet<Quantization>>,
    pub colorimetries: BTreeMap<ColorModel, BTreeSet<Colorimetry>>,
    pub bit_depths: BTreeMap<Colorimetry, BTreeSet<u32>>,
    pub frame_layouts: BTreeSet<FrameLayout>,
    pub sample_rates: BTreeMap<FrameLayout, BTreeSet<(u64, u64)>>,
}

/// 2^32 - 1.
pub const MAX_U32_DIMENSION: u64 = 4_294_967_295;

const HD_RATES: &[(u64, u64)] = &[
    (24000, 1001),
    (24, 1),
    (25, 1),
    (30000, 1001),
    (30, 1),
    (50, 1),
    (60000, 1001),
    (60, 1),
];
const UHD_EXTRA_RATES: &[(u64, u64)] = &[(48, 1), (100, 1), (120000, 1001), (120, 1)];
const INTERLACED_RATES: &[(u64, u64)] = &[(25, 1), (30000, 1001)];

fn set<T: Ord + Copy>(items: &[T]) -> BTreeSet<T> {
    items.iter().copied().collect()
}

fn per_model<T: Ord + Copy>(rgb: &[T], yuv: &[T]) -> BTreeMap<ColorModel, BTreeSet<T>> {
    let mut map = BTreeMap::new();
    if !rgb.is_empty() {
        map.insert(ColorModel::Rgb, set(rgb));
    }
    if !yuv.is_empty() {
        map.insert(ColorModel::Yuv, set(yuv));
    }
    map
}

fn rates(
    progressive: &[&[(u64, u64)]],
    interlaced: &[(u64, u64)],
) -> BTreeMap<FrameLayout, BTreeSet<(u64, u64)>> {
    let mut map = BTreeMap::new();
    map.insert(
        FrameLayout::FullFrame,
        progressive.iter().flat_map(|r| r.iter().copied()).collect(),
    );
    if !interlaced.is_empty() {
        map.insert(FrameLayout::SeparateFields, set(interlaced));
    }
    map
}

fn app2() -> ProfileRules {
    use Colorimetry::*;
    ProfileRules {
        max_dimensions: [(ColorModel::Rgb, (1920, 1080)), (ColorModel::Yuv, (1920, 1080))].into(),
        samplings: per_model(&[Sampling::Sampling444], &[Sampling::Sampling422]),
        quantizations: per_model(&[Quantization::Qe1], &[Quantization::Qe2]),
        colorimetries: per_model(&[Color1, Color2, Color3], &[Color1, Color2, Color3]),
        bit_depths: [
            (Color1, set(&[8, 10])),
            (Color2, set(&[8, 10])),
            (Color3, set(&[8, 10])),
        ]
        .into(),
        frame_layouts: set(&[FrameLayout::FullFrame, FrameLayout::SeparateFields]),
        sample_rates: rates(&[HD_RATES], INTERLACED_RATES),
    }
}

fn app2e() -> ProfileRules {
    use Colorimetry::*;
    ProfileRules {
        max_dimensions: [(ColorModel::Rgb, (4096, 3112)), (ColorModel::Yuv, (3840, 2160))].into(),
        samplings: per_model(&[Sampling::Sampling444], &[Sampling::Sampling422]),
        quantizations: per_model(&[Quantization::Qe1, Quantization::Qe2], &[Quantization::Qe2]),
        colorimetries: per_model(
            &[Color1, Color2, Color3, Color5, Color7],
            &[Color1, Color2, Color3, Color5, Color7],
        ),
        bit_depths: [
            (Color1, set(&[8, 10])),
            (Color2, set(&[8, 10])),
            (Color3, set(&[8, 10])),
            (Color5, set(&[10, 12])),
            (Color7, set(&[10, 12])),
        ]
        .into(),
        frame_layouts: set(&[FrameLayout::FullFrame, FrameLayout::SeparateFields]),
        sample_rates: rates(&[HD_RATES, UHD_EXTRA_RATES], INTERLACED_RATES),
    }
}

fn app4() -> ProfileRules {
    use Colorimetry::*;
    ProfileRules {
        max_dimensions: [(ColorModel::Rgb, (MAX_U32_DIMENSION, MAX_U32_DIMENSION))].into(),
        samplings: per_model(&[Sampling::Sampling444], &[]),
        quantizations: per_model(&[Quantization::Qe1], &[]),
        colorimetries: per_model(&[Color3, Color5, Color6, Color7], &[]),
        bit_depths: [
            (Color3, set(&[8, 10, 12, 16])),
            (Color5, set(&[10, 12, 16])),
            (Color6, set(&[12, 16])),
            (Color7, set(&[12, 16])),
        ]
        .into(),
        frame_layouts: set(&[FrameLayout::FullFrame]),
        sample_rates: rates(&[HD_RATES, UHD_EXTRA_RATES], &[]),
    }
}

fn app5() -> ProfileRules {
    ProfileRules {
        max_dimensions: [(ColorModel::Rgb, (MAX_U32_DIMENSION, MAX_U32_DIMENSION))].into(),
        samplings: per_model(&[Sampling::Sampling444], &[]),
        quantizations: BTreeMap::new(),
        colorimetries: per_model(&[Colorimetry::App5Ap0], &[]),
        bit_depths: [(Colorimetry::App5Ap0, set(&[16]))].into(),
        frame_layouts: set(&[FrameLayout::FullFrame]),
        sample_rates: rates(&[HD_RATES, &[(48, 1)]], &[]),
    }
}

fn tsp2121() -> ProfileRules {
    use Colorimetry::*;
    ProfileRules {
        max_dimensions: [(ColorModel::Rgb, (3840, 2160)), (ColorModel::Yuv, (3840, 2160))].into(),
        samplings: per_model(&[Sampling::Sampling444], &[Sampling::Sampling422]),
        quantizations: per_model(&[Quantization::Qe1], &[Quantization::Qe2]),
        colorimetries: per_model(&[Color3, Color5, Color7], &[Color3, Color5, Color7]),
        bit_depths: [
            (Color3, set(&[10])),
            (Color5, set(&[10, 12])),
            (Color7, set(&[10, 12])),
        ]
        .into(),
        frame_layouts: set(&[FrameLayout::FullFrame, FrameLayout::SeparateFields]),
        sample_rates: rates(&[HD_RATES, &[(48, 1)]], INTERLACED_RATES),
    }
}

static PROFILE_RULES: LazyLock<BTreeMap<ApplicationProfile, ProfileRules>> = LazyLock::new(|| {
    [
        (ApplicationProfile::App2, app2()),
        (ApplicationProfile::App2E, app2e()),
        (ApplicationProfile::App4, app4()),
        (ApplicationProfile::App5, app5()),
        (ApplicationProfile::Tsp2121, tsp2121()),
    ]
    .into()
});

pub fn profile_rules(profile: ApplicationProfile) -> Option<&'static ProfileRules> {
    PROFILE_RULES.get(&profile)
}

#[cfg(test)]
#[path = "../../tests/unit/profiles/tables.rs"]
mod tests;
