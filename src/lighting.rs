//! Lighting layer synthesis
//!
//! Produces the auxiliary rasters that sell the composite: drop shadows,
//! perspective ground shadows, reflections, rim glow, light wrap and
//! scene-shadow projection, plus the final cinematic tone pass. Shadow renders
//! follow one discipline throughout: pad the canvas by four blur radii before
//! blurring, so Gaussian falloff always reaches zero inside the layer instead
//! of clipping into a hard square edge.

use crate::utils::raster::{alpha_plane, blend, crop_region, edge_band, lerp_u8, sharpen_rgb};
use image::{imageops, GrayImage, Luma, Rgb, Rgba, RgbaImage};
use ndarray::Array2;

/// A shadow raster rendered larger than its subject.
///
/// `padding` is the per-side margin added before blurring; subtract it from the
/// subject anchor when pasting.
#[derive(Debug, Clone)]
pub struct ShadowLayer {
    pub image: RgbaImage,
    pub padding: u32,
}

impl ShadowLayer {
    /// Paste position for a subject anchored at `anchor`
    #[must_use]
    pub fn paste_anchor(&self, anchor: (i64, i64)) -> (i64, i64) {
        (
            anchor.0 - i64::from(self.padding),
            anchor.1 - i64::from(self.padding),
        )
    }
}

/// Render the subject's alpha as a colored, blurred shadow blob.
///
/// The layer is padded by `4 * blur` pixels per side so the falloff never
/// clips; output dimensions are therefore `subject + 2 * (4 * blur)` regardless
/// of `offset`. The alpha component of `color` sets the shadow's peak opacity.
#[must_use]
pub fn drop_shadow(
    subject: &RgbaImage,
    offset: (i64, i64),
    color: Rgba<u8>,
    blur: f32,
) -> ShadowLayer {
    let padding = (blur * 4.0).round().max(0.0) as u32;
    let (width, height) = subject.dimensions();
    let layer_w = width + padding * 2;
    let layer_h = height + padding * 2;

    let mut mask = GrayImage::new(layer_w, layer_h);
    for (x, y, px) in subject.enumerate_pixels() {
        let tx = i64::from(x) + i64::from(padding) + offset.0;
        let ty = i64::from(y) + i64::from(padding) + offset.1;
        if tx >= 0 && ty >= 0 && tx < i64::from(layer_w) && ty < i64::from(layer_h) {
            mask.put_pixel(tx as u32, ty as u32, Luma([px[3]]));
        }
    }
    if blur > 0.0 {
        mask = imageops::blur(&mask, blur);
    }

    let mut layer = RgbaImage::new(layer_w, layer_h);
    for (m, out) in mask.pixels().zip(layer.pixels_mut()) {
        let alpha = (u16::from(m[0]) * u16::from(color[3]) / 255) as u8;
        *out = Rgba([color[0], color[1], color[2], alpha]);
    }

    ShadowLayer {
        image: layer,
        padding,
    }
}

/// Ground shadow from a vertically squashed silhouette.
///
/// The silhouette is compressed to `squash` of the subject height, anchored at
/// the subject's base and blurred, simulating a shadow cast on a receding
/// floor. The returned raster matches the subject's dimensions.
#[must_use]
pub fn perspective_shadow(subject: &RgbaImage, squash: f32, blur: f32, opacity: f32) -> RgbaImage {
    let (width, height) = subject.dimensions();
    let silhouette = alpha_plane(subject);
    let shadow_height = ((height as f32 * squash).round() as u32).clamp(1, height.max(1));
    let squashed = imageops::resize(
        &silhouette,
        width,
        shadow_height,
        imageops::FilterType::Lanczos3,
    );

    let peak = (opacity.clamp(0.0, 1.0) * 255.0).round() as u16;
    let base_y = height.saturating_sub(shadow_height);
    let mut shadow = RgbaImage::new(width, height);
    for (x, y, px) in squashed.enumerate_pixels() {
        let alpha = (u16::from(px[0]) * peak / 255) as u8;
        shadow.put_pixel(x, base_y + y, Rgba([0, 0, 0, alpha]));
    }

    if blur > 0.0 {
        shadow = imageops::blur(&shadow, blur);
    }
    shadow
}

/// Faded mirror reflection for reflective (marble) surfaces.
///
/// Flips the subject vertically, attenuates its alpha with a top-to-bottom
/// falloff raised to the 1.5 power (sharper drop-off than linear near the
/// contact edge), then blurs.
#[must_use]
pub fn reflection(subject: &RgbaImage, opacity: f32, blur: f32) -> RgbaImage {
    let mut flipped = imageops::flip_vertical(subject);
    let height = flipped.height().max(1);

    for (_, y, px) in flipped.enumerate_pixels_mut() {
        let fade = 1.0 - (y as f32 / height as f32).powf(1.5);
        let factor = (opacity * fade).max(0.0);
        px[3] = (f32::from(px[3]) * factor).round().clamp(0.0, 255.0) as u8;
    }

    if blur > 0.0 {
        flipped = imageops::blur(&flipped, blur);
    }
    flipped
}

/// Soft glow behind the subject's edges, separating dark subjects from dark
/// backgrounds. The glow layer is painted first, the subject on top.
#[must_use]
pub fn rim_glow(subject: &RgbaImage, color: Rgb<u8>, power: f32, blur: f32) -> RgbaImage {
    let (width, height) = subject.dimensions();
    let glow_mask = imageops::blur(&alpha_plane(subject), blur);
    let strength = (100.0 * power).round().clamp(0.0, 255.0) as u16;

    let mut combined = RgbaImage::new(width, height);
    for (px, m) in combined.pixels_mut().zip(glow_mask.pixels()) {
        let alpha = (u16::from(m[0]) * strength / 255) as u8;
        *px = Rgba([color[0], color[1], color[2], alpha]);
    }
    imageops::overlay(&mut combined, subject, 0, 0);
    combined
}

/// Two-pass edge integration: the subject's rim picks up ambient background
/// color.
///
/// A sharp pass (thin edge band, mildly blurred background) composites
/// directly; a soft pass (wider band, strongly blurred background) blends in at
/// `intensity`.
#[must_use]
pub fn light_wrap(
    subject: &RgbaImage,
    background: &RgbaImage,
    anchor: (i64, i64),
    intensity: f32,
    blur: f32,
) -> RgbaImage {
    let (width, height) = subject.dimensions();
    let bg_crop = crop_region(background, anchor.0, anchor.1, width, height);
    let alpha = alpha_plane(subject);

    let wrap_layer = |band_sigma: f32, bg_sigma: f32| -> RgbaImage {
        let band = edge_band(&alpha, band_sigma);
        let mut layer = imageops::blur(&bg_crop, bg_sigma);
        for (px, b) in layer.pixels_mut().zip(band.pixels()) {
            px[3] = (u16::from(px[3]) * u16::from(b[0]) / 255) as u8;
        }
        layer
    };

    let sharp = wrap_layer(1.0, 3.0);
    let soft = wrap_layer(3.0, blur);

    let mut result = subject.clone();
    imageops::overlay(&mut result, &sharp, 0, 0);

    let mut with_soft = result.clone();
    imageops::overlay(&mut with_soft, &soft, 0, 0);
    blend(&result, &with_soft, intensity)
}

/// Imprint the background's light/shadow pattern onto the subject surface.
///
/// The background region under the subject is converted to grayscale, inverted
/// (dark background areas become bright multiplier sources), softened, and
/// multiplied onto the subject's RGB at `intensity`.
#[must_use]
pub fn scene_shadow_projection(
    subject: &RgbaImage,
    background: &RgbaImage,
    anchor: (i64, i64),
    intensity: f32,
) -> RgbaImage {
    let (width, height) = subject.dimensions();
    if width == 0 || height == 0 {
        return subject.clone();
    }
    let bg_crop = crop_region(background, anchor.0, anchor.1, width, height);
    let mut luma = imageops::grayscale(&bg_crop);
    imageops::invert(&mut luma);
    let luma = imageops::blur(&luma, 2.0);

    // Multiplier plane in 0.0-1.0
    let multiplier = Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        f32::from(luma.get_pixel(x as u32, y as u32)[0]) / 255.0
    });

    let intensity = intensity.clamp(0.0, 1.0);
    let mut out = subject.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let coverage = f32::from(px[3]) / 255.0;
        if coverage == 0.0 {
            continue;
        }
        let m = multiplier[(y as usize, x as usize)];
        for c in 0..3 {
            let original = f32::from(px[c]);
            let shadowed = original * m;
            let blended = original * (1.0 - intensity) + shadowed * intensity;
            // The projection only lands where the subject is present
            let v = original * (1.0 - coverage) + blended * coverage;
            px[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Final tone pass: global color harmony, visibility lift for dark subjects,
/// backlight separation against dark scenes, and a sharpening step that
/// restores crispness lost to the preceding blurs. Order matters:
/// tint, brightness/contrast, glow, sharpen.
#[must_use]
pub fn cinematic_pass(
    subject: &RgbaImage,
    is_dark_background: bool,
    is_dark_subject: bool,
    tint: Option<Rgb<u8>>,
) -> RgbaImage {
    let mut processed = subject.clone();

    if let Some(tint) = tint {
        for px in processed.pixels_mut() {
            for c in 0..3 {
                px[c] = lerp_u8(px[c], tint[c], 0.02);
            }
        }
    }

    if is_dark_subject {
        processed = crate::utils::raster::scale_brightness(&processed, 1.1);
        processed = crate::utils::raster::adjust_contrast(&processed, 1.05);
    }

    if is_dark_background {
        processed = rim_glow(&processed, Rgb([255, 255, 255]), 1.1, 5.0);
    }

    sharpen_rgb(&processed)
}
