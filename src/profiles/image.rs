//! Typed projection of an image essence descriptor.
//!
//! Application profiles constrain a handful of image properties. [`ImageDescriptorModel`] reads
//! them once from a normalized descriptor tree (CPL-declared or MXF-embedded, both have the same
//! shape). Values that are missing or cannot be interpreted become `Unknown` (or `None`) and
//! produce a diagnostic; the projection itself never fails.

use crate::dom::model::{DomNode, FieldValue};
use crate::foundation::core::EditRate;
use crate::foundation::diagnostics::{Diagnostics, ErrorCode};
use crate::mxf::ul::Ul;
use crate::profiles::tables;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Picture color model, from the descriptor set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorModel {
    /// `RGBADescriptor`.
    Rgb,
    /// `CDCIDescriptor`.
    Yuv,
    Unknown,
}

/// Colorimetry code, identified by (color primaries, transfer characteristic).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Colorimetry {
    /// BT.470 PAL primaries, BT.709 transfer.
    Color1,
    /// SMPTE 170M primaries, BT.709 transfer.
    Color2,
    /// BT.709 primaries and transfer.
    Color3,
    /// BT.709 primaries, xvYCC transfer.
    Color4,
    /// BT.2020 primaries and transfer.
    Color5,
    /// P3D65 primaries, ST 2084 transfer.
    Color6,
    /// BT.2020 primaries, ST 2084 transfer.
    Color7,
    /// ACES AP0 primaries, linear transfer.
    App5Ap0,
    /// Any other combination, or labels missing.
    Unknown,
}

impl Colorimetry {
    /// Look up the colorimetry of a primaries/transfer pair; unmapped pairs are `Unknown`.
    pub fn from_labels(primaries: Option<Ul>, transfer: Option<Ul>) -> Self {
        match (primaries, transfer) {
            (Some(p), Some(t)) => tables::colorimetry(p, t),
            _ => Self::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    Sampling444,
    Sampling422,
    Sampling420,
    Unknown,
}

/// Code value range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantization {
    /// Full range: `0 ..= 2^n - 1`.
    Qe1,
    /// Narrow range: `16 << (n - 8) ..= 235 << (n - 8)`.
    Qe2,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameLayout {
    FullFrame,
    SeparateFields,
    OneField,
    MixedFields,
    SegmentedFrame,
    Unknown,
}

impl FrameLayout {
    fn parse(text: &str) -> Self {
        match text.trim() {
            "FullFrame" | "0" => Self::FullFrame,
            "SeparateFields" | "1" => Self::SeparateFields,
            "OneField" | "2" => Self::OneField,
            "MixedFields" | "3" => Self::MixedFields,
            "SegmentedFrame" | "4" => Self::SegmentedFrame,
            _ => Self::Unknown,
        }
    }
}

macro_rules! display_as_debug {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        })*
    };
}

display_as_debug!(ColorModel, Colorimetry, Sampling, Quantization, FrameLayout);

/// Image properties constrained by the application profiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageDescriptorModel {
    pub color_model: ColorModel,
    pub colorimetry: Colorimetry,
    pub color_primaries: Option<Ul>,
    pub transfer_characteristic: Option<Ul>,
    pub coding_equations: Option<Ul>,
    pub frame_layout: FrameLayout,
    pub stored_width: Option<u64>,
    pub stored_height: Option<u64>,
    pub sample_rate: Option<EditRate>,
    pub pixel_bit_depth: Option<u32>,
    pub quantization: Quantization,
    pub sampling: Sampling,
    pub stored_f2_offset: Option<i64>,
    pub display_f2_offset: Option<i64>,
}

/// Reads fields of one descriptor, reporting what cannot be read.
struct FieldReader<'a> {
    dom: &'a DomNode,
    diags: Diagnostics,
}

impl FieldReader<'_> {
    fn report(&mut self, message: String) {
        self.diags.non_fatal(ErrorCode::ApplicationProfile, message);
    }

    fn integer<T: std::str::FromStr>(&mut self, name: &str, required: bool) -> Option<T> {
        let dom = self.dom;
        match dom.field(name) {
            Some(value) => {
                let parsed = value.as_text().and_then(|t| t.trim().parse::<T>().ok());
                if parsed.is_none() {
                    self.report(format!(
                        "{} {name} '{value}' is not an integer",
                        dom.local_name()
                    ));
                }
                parsed
            }
            None => {
                if required {
                    self.report(format!("{} has no {name}", dom.local_name()));
                }
                None
            }
        }
    }

    fn label(&mut self, name: &str) -> Option<Ul> {
        let dom = self.dom;
        let value = dom.field(name)?;
        let ul = value.as_ul();
        if ul.is_none() {
            self.report(format!(
                "{} {name} '{value}' is not a universal label",
                dom.local_name()
            ));
        }
        ul
    }
}

impl ImageDescriptorModel {
    /// Project a normalized image descriptor; the diagnostics list every degraded field.
    pub fn from_dom(dom: &DomNode) -> (Self, Diagnostics) {
        let mut r = FieldReader {
            dom,
            diags: Diagnostics::new(),
        };

        let color_model = match dom.local_name() {
            "RGBADescriptor" => ColorModel::Rgb,
            "CDCIDescriptor" => ColorModel::Yuv,
            other => {
                r.report(format!("{other} is not an image essence descriptor"));
                ColorModel::Unknown
            }
        };

        let color_primaries = r.label("ColorPrimaries");
        let transfer_characteristic = r.label("TransferCharacteristic");
        let coding_equations = r.label("CodingEquations");
        let colorimetry = Colorimetry::from_labels(color_primaries, transfer_characteristic);
        if colorimetry == Colorimetry::Unknown {
            r.report(format!(
                "{} colorimetry cannot be determined from primaries {} and transfer characteristic {}",
                dom.local_name(),
                label_text(color_primaries),
                label_text(transfer_characteristic)
            ));
        }

        let frame_layout = match dom.field("FrameLayout").and_then(FieldValue::as_text) {
            Some(text) => FrameLayout::parse(text),
            None => FrameLayout::Unknown,
        };
        if frame_layout == FrameLayout::Unknown {
            r.report(format!("{} frame layout is missing or unknown", dom.local_name()));
        }

        let stored_width = r.integer::<u64>("StoredWidth", true);
        let stored_height = r.integer::<u64>("StoredHeight", true);

        let sample_rate = match dom.field("SampleRate") {
            Some(value) => {
                let rate = value
                    .as_fraction()
                    .and_then(|(n, d)| Some((u64::try_from(n).ok()?, u64::try_from(d).ok()?)))
                    .and_then(|(n, d)| EditRate::new(n, d).ok());
                if rate.is_none() {
                    r.report(format!(
                        "{} SampleRate '{value}' is not a valid rate",
                        dom.local_name()
                    ));
                }
                rate
            }
            None => {
                r.report(format!("{} has no SampleRate", dom.local_name()));
                None
            }
        };

        let pixel_bit_depth = match color_model {
            ColorModel::Yuv => r.integer::<u32>("ComponentDepth", true),
            ColorModel::Rgb => rgb_bit_depth(&mut r),
            ColorModel::Unknown => None,
        };

        let sampling = match color_model {
            ColorModel::Rgb => Sampling::Sampling444,
            ColorModel::Yuv => {
                let h = r.integer::<u32>("HorizontalSubsampling", true);
                let v = r.integer::<u32>("VerticalSubsampling", false).unwrap_or(1);
                match (h, v) {
                    (Some(1), 1) => Sampling::Sampling444,
                    (Some(2), 1) => Sampling::Sampling422,
                    (Some(2), 2) => Sampling::Sampling420,
                    _ => Sampling::Unknown,
                }
            }
            ColorModel::Unknown => Sampling::Unknown,
        };

        let quantization = match (color_model, pixel_bit_depth) {
            (ColorModel::Rgb, Some(depth)) => {
                let min = r.integer::<u64>("ComponentMinRef", false).unwrap_or(0);
                let max = r
                    .integer::<u64>("ComponentMaxRef", false)
                    .unwrap_or_else(|| full_range_max(depth));
                rgb_quantization(depth, min, max)
            }
            (ColorModel::Yuv, Some(depth)) => {
                let black = r.integer::<u64>("BlackRefLevel", false);
                let white = r.integer::<u64>("WhiteRefLevel", false);
                let range = r.integer::<u64>("ColorRange", false);
                match (black, white, range) {
                    (Some(b), Some(w), Some(c)) => yuv_quantization(depth, b, w, c),
                    _ => Quantization::Unknown,
                }
            }
            _ => Quantization::Unknown,
        };

        let stored_f2_offset = r.integer::<i64>("StoredF2Offset", false);
        let display_f2_offset = r.integer::<i64>("DisplayF2Offset", false);

        let model = Self {
            color_model,
            colorimetry,
            color_primaries,
            transfer_characteristic,
            coding_equations,
            frame_layout,
            stored_width,
            stored_height,
            sample_rate,
            pixel_bit_depth,
            quantization,
            sampling,
            stored_f2_offset,
            display_f2_offset,
        };
        (model, r.diags)
    }
}

fn label_text(ul: Option<Ul>) -> String {
    ul.map_or_else(|| "(none)".to_owned(), |ul| ul.to_string())
}

/// Largest R, G or B component size of the pixel layout, else derived from `ComponentMaxRef`.
fn rgb_bit_depth(r: &mut FieldReader<'_>) -> Option<u32> {
    let dom = r.dom;
    let from_layout = dom.child("PixelLayout").and_then(|layout| {
        layout
            .children_named("RGBALayoutItem")
            .filter(|item| {
                matches!(
                    item.field("Code").and_then(FieldValue::as_text),
                    Some("CompRed" | "CompGreen" | "CompBlue")
                )
            })
            .filter_map(|item| item.field("ComponentSize")?.as_text()?.parse::<u32>().ok())
            .max()
    });
    if from_layout.is_some() {
        return from_layout;
    }
    match r.integer::<u64>("ComponentMaxRef", false) {
        Some(max) => Some(u64::BITS - max.leading_zeros()),
        None => {
            r.report(format!("{} pixel bit depth cannot be determined", dom.local_name()));
            None
        }
    }
}

fn full_range_max(depth: u32) -> u64 {
    1u64.checked_shl(depth).map_or(u64::MAX, |v| v - 1)
}

fn narrow_black(depth: u32) -> Option<u64> {
    depth.checked_sub(8).and_then(|s| 16u64.checked_shl(s))
}

fn narrow_white(depth: u32) -> Option<u64> {
    depth.checked_sub(8).and_then(|s| 235u64.checked_shl(s))
}

fn rgb_quantization(depth: u32, min: u64, max: u64) -> Quantization {
    if min == 0 && max == full_range_max(depth) {
        Quantization::Qe1
    } else if Some(min) == narrow_black(depth) && Some(max) == narrow_white(depth) {
        Quantization::Qe2
    } else {
        Quantization::Unknown
    }
}

fn yuv_quantization(depth: u32, black: u64, white: u64, range: u64) -> Quantization {
    let full = full_range_max(depth);
    if black == 0 && white == full && range == full.saturating_add(1) {
        return Quantization::Qe1;
    }
    let narrow_range = depth
        .checked_sub(8)
        .and_then(|s| 224u64.checked_shl(s))
        .map(|v| v + 1);
    if Some(black) == narrow_black(depth)
        && Some(white) == narrow_white(depth)
        && Some(range) == narrow_range
    {
        Quantization::Qe2
    } else {
        Quantization::Unknown
    }
}

#[cfg(test)]
#[path = "../../tests/unit/profiles/image.rs"]
mod tests;
