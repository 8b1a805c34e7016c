//! Scene assembly
//!
//! Paints background, shadow/reflection layers, the refined subject and the
//! final grain pass in a fixed order. The staging branch is selected once per
//! call from the style's [`StagingRule`] flags; transitions are linear, with no
//! loops or backtracking.

use crate::{
    geometry::CompositionPlan,
    lighting::{self, ShadowLayer},
    styles::StagingRule,
};
use image::{imageops, Rgba, RgbaImage};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Paste a padded shadow layer at the subject anchor
fn paste_shadow(canvas: &mut RgbaImage, layer: &ShadowLayer, anchor: (i64, i64)) {
    let (x, y) = layer.paste_anchor(anchor);
    imageops::overlay(canvas, &layer.image, x, y);
}

/// Assemble a plate scene: background, lighting layers, subject, grain.
///
/// Floor scenes run the full staging order: reflection or light bounce, then
/// exactly one shadow branch (flat-lay, slate, or generic floor), then the
/// subject. Non-floor scenes get a single soft drop shadow.
#[allow(clippy::too_many_lines)]
pub fn render_scene<R: Rng>(
    background: &RgbaImage,
    subject: &RgbaImage,
    plan: &CompositionPlan,
    rule: StagingRule,
    subject_is_light: bool,
    grain_intensity: f32,
    rng: &mut R,
) -> RgbaImage {
    let mut canvas = background.clone();
    let anchor = plan.anchor();
    let subject_height = i64::from(subject.height());

    if rule.is_floor {
        // Reflection or light bounce behind every other layer
        if rule.is_marble {
            let refl = lighting::reflection(subject, 0.08, 4.0);
            imageops::overlay(&mut canvas, &refl, anchor.0, anchor.1 + subject_height - 2);
        } else if subject_is_light && rule.is_daylight {
            // Light subjects bounce light back onto a sunlit floor
            let bounce = lighting::drop_shadow(subject, (0, 0), Rgba([255, 255, 255, 20]), 50.0);
            paste_shadow(&mut canvas, &bounce, anchor);
        }

        if rule.is_flat_lay {
            let offset = if rule.is_daylight { (-12, 10) } else { (0, 4) };
            let base_opacity: u8 = if rule.is_daylight { 45 } else { 80 };
            // Light subjects need stronger shadows to avoid a floating look
            let soft_opacity = if subject_is_light {
                (f32::from(base_opacity) * 1.5).round().clamp(0.0, 255.0) as u8
            } else {
                base_opacity
            };
            let soft = lighting::drop_shadow(subject, offset, Rgba([0, 0, 0, soft_opacity]), 35.0);
            paste_shadow(&mut canvas, &soft, anchor);

            let contact_opacity = if subject_is_light { 220 } else { 160 };
            let contact = lighting::drop_shadow(
                subject,
                (offset.0 / 4, offset.1 / 4),
                Rgba([0, 0, 0, contact_opacity]),
                4.0,
            );
            paste_shadow(&mut canvas, &contact, anchor);
        } else if rule.is_slate {
            let soft_opacity = if subject_is_light { 90 } else { 60 };
            let soft = lighting::drop_shadow(subject, (15, 12), Rgba([0, 0, 0, soft_opacity]), 40.0);
            paste_shadow(&mut canvas, &soft, anchor);

            let contact_opacity = if subject_is_light { 200 } else { 180 };
            let contact =
                lighting::drop_shadow(subject, (3, 2), Rgba([0, 0, 0, contact_opacity]), 4.0);
            paste_shadow(&mut canvas, &contact, anchor);
        } else {
            let perspective = lighting::perspective_shadow(
                subject,
                0.2,
                15.0,
                if subject_is_light { 0.35 } else { 0.25 },
            );
            imageops::overlay(
                &mut canvas,
                &perspective,
                anchor.0,
                anchor.1 + subject_height / 10,
            );

            let contact_opacity = if subject_is_light { 210 } else { 180 };
            let contact =
                lighting::drop_shadow(subject, (0, 2), Rgba([0, 0, 0, contact_opacity]), 2.0);
            paste_shadow(&mut canvas, &contact, anchor);

            let ambient_opacity = if subject_is_light { 60 } else { 40 };
            let ambient =
                lighting::drop_shadow(subject, (0, 4), Rgba([0, 0, 0, ambient_opacity]), 25.0);
            paste_shadow(&mut canvas, &ambient, anchor);
        }
    } else {
        let opacity = if subject_is_light { 80 } else { 60 };
        let shadow = lighting::drop_shadow(subject, (0, 10), Rgba([0, 0, 0, opacity]), 30.0);
        paste_shadow(&mut canvas, &shadow, anchor);
    }

    imageops::overlay(&mut canvas, subject, anchor.0, anchor.1);
    film_grain(&canvas, grain_intensity, rng)
}

/// Paste a feathered subject directly onto a solid-color canvas.
///
/// The flat-color path runs no shadow, lighting or grain stages.
#[must_use]
pub fn render_flat(subject: &RgbaImage, fill: Rgba<u8>) -> RgbaImage {
    let (width, height) = subject.dimensions();
    let mut canvas = RgbaImage::from_pixel(width, height, fill);
    imageops::overlay(&mut canvas, subject, 0, 0);
    canvas
}

/// Unify compositing artifacts under a layer of sensor noise.
///
/// Adds zero-mean Gaussian noise with `sigma = intensity * 255` to each color
/// channel, clipped to the valid range; the alpha channel is preserved
/// unchanged. The noise source is injected so a seeded run is reproducible.
#[must_use]
pub fn film_grain<R: Rng>(image: &RgbaImage, intensity: f32, rng: &mut R) -> RgbaImage {
    if intensity <= 0.0 {
        return image.clone();
    }
    let Ok(noise) = Normal::new(0.0f32, intensity * 255.0) else {
        return image.clone();
    };

    let mut out = image.clone();
    for px in out.pixels_mut() {
        for c in 0..3 {
            let v = f32::from(px[c]) + noise.sample(rng);
            px[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CompositionPlan;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn subject(size: u32, value: u8) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba([value, value, value, 255]))
    }

    fn plan_at(x: i64, y: i64) -> CompositionPlan {
        CompositionPlan {
            scale: 1.0,
            anchor_x: x,
            anchor_y: y,
            padding_used: 0,
        }
    }

    #[test]
    fn test_render_flat_is_exact() {
        let mut cutout = RgbaImage::new(8, 8);
        for y in 2..6 {
            for x in 2..6 {
                cutout.put_pixel(x, y, Rgba([128, 128, 128, 255]));
            }
        }
        let rendered = render_flat(&cutout, Rgba([255, 255, 255, 255]));
        assert_eq!(rendered.dimensions(), cutout.dimensions());
        assert_eq!(*rendered.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*rendered.get_pixel(3, 3), Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn test_film_grain_deterministic_with_seed() {
        let image = subject(16, 128);
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let mut rng_c = StdRng::seed_from_u64(7);

        let a = film_grain(&image, 0.05, &mut rng_a);
        let b = film_grain(&image, 0.05, &mut rng_b);
        let c = film_grain(&image, 0.05, &mut rng_c);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_film_grain_preserves_alpha() {
        let mut image = subject(8, 100);
        image.put_pixel(1, 1, Rgba([100, 100, 100, 37]));
        let mut rng = StdRng::seed_from_u64(1);
        let grained = film_grain(&image, 0.1, &mut rng);
        assert_eq!(grained.get_pixel(1, 1)[3], 37);
        assert_eq!(grained.get_pixel(4, 4)[3], 255);
    }

    #[test]
    fn test_film_grain_zero_intensity_is_noop() {
        let image = subject(8, 100);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(film_grain(&image, 0.0, &mut rng), image);
    }

    #[test]
    fn test_render_scene_keeps_background_dimensions() {
        let background = RgbaImage::from_pixel(64, 64, Rgba([240, 240, 240, 255]));
        let small = subject(16, 128);
        let rule = StagingRule {
            is_floor: true,
            ..StagingRule::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let rendered = render_scene(
            &background,
            &small,
            &plan_at(24, 20),
            rule,
            false,
            0.0,
            &mut rng,
        );
        assert_eq!(rendered.dimensions(), (64, 64));
        // Subject pasted at its anchor
        assert_eq!(rendered.get_pixel(30, 28)[0], 128);
    }

    #[test]
    fn test_floor_scene_casts_shadow() {
        let background = RgbaImage::from_pixel(64, 64, Rgba([240, 240, 240, 255]));
        let small = subject(16, 50);
        let rule = StagingRule {
            is_floor: true,
            ..StagingRule::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let rendered = render_scene(
            &background,
            &small,
            &plan_at(24, 20),
            rule,
            false,
            0.0,
            &mut rng,
        );
        // Below the subject the ambient shadow darkens the plate
        let below = rendered.get_pixel(32, 40);
        assert!(below[0] < 240, "expected shadow below subject, got {:?}", below);
    }

    #[test]
    fn test_marble_scene_adds_reflection() {
        let background = RgbaImage::from_pixel(64, 96, Rgba([255, 255, 255, 255]));
        let dark_subject = subject(16, 20);
        let marble = StagingRule {
            is_floor: true,
            is_marble: true,
            ..StagingRule::default()
        };
        let plain = StagingRule {
            is_floor: true,
            ..StagingRule::default()
        };

        // Both rules take the generic floor shadow branch, so the only
        // difference between the two renders is the reflection layer.
        let mut rng_a = StdRng::seed_from_u64(3);
        let mut rng_b = StdRng::seed_from_u64(3);
        let with_marble = render_scene(
            &background,
            &dark_subject,
            &plan_at(24, 10),
            marble,
            false,
            0.0,
            &mut rng_a,
        );
        let without = render_scene(
            &background,
            &dark_subject,
            &plan_at(24, 10),
            plain,
            false,
            0.0,
            &mut rng_b,
        );

        // The reflection band starts just below the subject's bottom edge
        let band_mean = |image: &RgbaImage| -> f64 {
            let mut sum = 0.0;
            for y in 24..40u32 {
                for x in 24..40u32 {
                    sum += f64::from(image.get_pixel(x, y)[0]);
                }
            }
            sum / (16.0 * 16.0)
        };
        assert!(
            band_mean(&with_marble) < band_mean(&without),
            "reflection of a dark subject must darken the band below it"
        );
    }
}
