use crate::foundation::diagnostics::{Diagnostics, ErrorCode};
use crate::profiles::image::ImageDescriptorModel;
use crate::profiles::registry::ApplicationProfile;
use crate::profiles::tables::{ProfileRules, profile_rules};
use std::collections::BTreeSet;
use std::fmt;

struct RateText((u64, u64));

impl fmt::Display for RateText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0.0, self.0.1)
    }
}

struct Checker {
    profile: ApplicationProfile,
    diags: Diagnostics,
}

impl Checker {
    fn violation(&mut self, message: String) {
        self.diags.non_fatal(
            ErrorCode::ApplicationProfile,
            format!("{}: {message}", self.profile),
        );
    }

    /// Report `value` unless it is one of `allowed`.
    fn require<T: Ord + fmt::Display>(&mut self, what: &str, value: &T, allowed: &BTreeSet<T>) {
        if allowed.contains(value) {
            return;
        }
        let listed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        self.violation(format!(
            "{what} {value} is not allowed (allowed: {})",
            listed.join(", ")
        ));
    }
}

/// Check an image descriptor against the rules of one application profile.
///
/// Each failing property yields one NON_FATAL diagnostic; properties are checked independently.
#[tracing::instrument(skip(model))]
pub fn validate(model: &ImageDescriptorModel, profile: ApplicationProfile) -> Diagnostics {
    let mut checker = Checker {
        profile,
        diags: Diagnostics::new(),
    };
    let Some(rules) = profile_rules(profile) else {
        checker.violation("no rule set registered".to_owned());
        return checker.diags;
    };
    check_image(&mut checker, model, rules);
    checker.diags
}

fn check_image(c: &mut Checker, model: &ImageDescriptorModel, rules: &ProfileRules) {
    let color_model = model.color_model;
    match rules.max_dimensions.get(&color_model) {
        None => {
            let allowed: BTreeSet<_> = rules.max_dimensions.keys().copied().collect();
            c.require("color model", &color_model, &allowed);
        }
        Some(&(max_width, max_height)) => {
            if let Some(width) = model.stored_width
                && width > max_width
            {
                c.violation(format!("stored width {width} exceeds {max_width} for {color_model}"));
            }
            if let Some(height) = model.stored_height
                && height > max_height
            {
                c.violation(format!(
                    "stored height {height} exceeds {max_height} for {color_model}"
                ));
            }
        }
    }

    if let Some(allowed) = rules.samplings.get(&color_model) {
        c.require("sampling", &model.sampling, allowed);
    }
    if let Some(allowed) = rules.quantizations.get(&color_model) {
        c.require("quantization", &model.quantization, allowed);
    }
    if let Some(allowed) = rules.colorimetries.get(&color_model) {
        c.require("colorimetry", &model.colorimetry, allowed);
    }

    if let Some(allowed) = rules.bit_depths.get(&model.colorimetry) {
        match model.pixel_bit_depth {
            Some(depth) => c.require(
                &format!("pixel bit depth for {}", model.colorimetry),
                &depth,
                allowed,
            ),
            None => c.violation("pixel bit depth is unknown".to_owned()),
        }
    }

    c.require("frame layout", &model.frame_layout, &rules.frame_layouts);
    if let Some(allowed) = rules.sample_rates.get(&model.frame_layout) {
        match model.sample_rate {
            Some(rate) => {
                let key = (rate.numerator(), rate.denominator());
                if !allowed.contains(&key) {
                    let listed: Vec<String> =
                        allowed.iter().map(|r| RateText(*r).to_string()).collect();
                    c.violation(format!(
                        "sample rate {} is not allowed for {} (allowed: {})",
                        RateText(key),
                        model.frame_layout,
                        listed.join(", ")
                    ));
                }
            }
            None => c.violation("sample rate is unknown".to_owned()),
        }
    }

    if let Some(offset) = model.stored_f2_offset
        && offset != 0
    {
        c.violation(format!("stored F2 offset {offset} is not 0"));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/profiles/rules.rs"]
mod tests;
