//! Geometric placement of the subject against a background plate

use crate::{
    error::{Result, StageError},
    styles::StagingRule,
};
use image::{imageops, RgbaImage};

/// Scale factor for flat-lay staging
const FLAT_LAY_SCALE: f64 = 0.65;
/// Scale factor for spotlight staging
const SPOTLIGHT_SCALE: f64 = 0.45;
/// Scale factor for every other floor scene
const FLOOR_SCALE: f64 = 0.5;
/// Fraction of the background height where a standing subject's base sits
const FLOOR_HORIZON: f64 = 0.7;

/// Computed geometry for one staging run.
///
/// Created once by [`plan`] and consumed read-only by lighting synthesis and
/// compositing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositionPlan {
    /// Uniform scale applied to the padded subject
    pub scale: f64,
    /// Left edge of the scaled subject on the background
    pub anchor_x: i64,
    /// Top edge of the scaled subject on the background
    pub anchor_y: i64,
    /// Safe-zone margin the subject was padded with
    pub padding_used: u32,
}

impl CompositionPlan {
    /// Subject anchor as a coordinate pair
    #[must_use]
    pub fn anchor(&self) -> (i64, i64) {
        (self.anchor_x, self.anchor_y)
    }
}

/// Dimensions of `subject` after applying `scale`, never collapsing to zero
fn scaled_dimensions(subject: &RgbaImage, scale: f64) -> (u32, u32) {
    let width = (f64::from(subject.width()) * scale).round().max(1.0) as u32;
    let height = (f64::from(subject.height()) * scale).round().max(1.0) as u32;
    (width, height)
}

/// Compute scale and placement for the padded subject.
///
/// `trimmed_height` is the subject height *before* padding and scaling; scaling
/// against it avoids compounding rounding error across repeated resizes. Floor
/// scenes scale the subject so its trimmed height covers a style-dependent
/// fraction of the background height; other scenes keep the subject at its
/// original size. The horizontal anchor always centers; the vertical anchor
/// centers for spotlight and flat-lay staging and otherwise rests the subject's
/// bottom at 70% of the background height.
///
/// # Errors
/// Returns an internal error if `trimmed_height` is zero (callers reject empty
/// subjects before planning).
pub fn plan(
    subject: &RgbaImage,
    trimmed_height: u32,
    background: (u32, u32),
    rule: StagingRule,
    padding: u32,
) -> Result<CompositionPlan> {
    if trimmed_height == 0 {
        return Err(StageError::stage_error("geometry", "subject height is zero"));
    }
    let (bg_width, bg_height) = background;

    let scale = if rule.is_floor {
        let factor = if rule.is_flat_lay {
            FLAT_LAY_SCALE
        } else if rule.is_spotlight {
            SPOTLIGHT_SCALE
        } else {
            FLOOR_SCALE
        };
        let target_height = (f64::from(bg_height) * factor).floor();
        target_height / f64::from(trimmed_height)
    } else {
        1.0
    };

    let (scaled_width, scaled_height) = scaled_dimensions(subject, scale);

    let anchor_x = (i64::from(bg_width) - i64::from(scaled_width)) / 2;
    let anchor_y = if !rule.is_floor || rule.is_spotlight || rule.is_flat_lay {
        (i64::from(bg_height) - i64::from(scaled_height)) / 2
    } else {
        (f64::from(bg_height) * FLOOR_HORIZON) as i64 - i64::from(scaled_height)
    };

    Ok(CompositionPlan {
        scale,
        anchor_x,
        anchor_y,
        padding_used: padding,
    })
}

/// Apply the plan's scale with high-quality resampling.
///
/// Returns a clone when no resize is needed.
#[must_use]
pub fn rescale(subject: &RgbaImage, plan: &CompositionPlan) -> RgbaImage {
    if (plan.scale - 1.0).abs() < f64::EPSILON {
        return subject.clone();
    }
    let (width, height) = scaled_dimensions(subject, plan.scale);
    imageops::resize(subject, width, height, imageops::FilterType::Lanczos3)
}
