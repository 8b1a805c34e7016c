//! Foreground edge refinement
//!
//! Cleans up the raw segmentation cutout before staging: trims to content, adds
//! a transparent safe zone, bleeds subject color outward so blurs never drag in
//! background color, erodes residual fringe pixels, suppresses halo artifacts by
//! subject tone, and feathers the mask for anti-aliased edges.
//!
//! Every function is pure: it takes an RGBA buffer by reference and returns a
//! new one. Degenerate inputs (no opaque pixels) come back unchanged; callers
//! that need a subject treat an empty [`content_bounds`] as a failure.

use crate::utils::raster::{alpha_plane, edge_band, lerp_u8, rgb_plane, scale_brightness, set_alpha, set_rgb};
use image::{imageops, GrayImage, Luma, RgbaImage};

/// Tightest bounding box of non-zero-alpha pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Find the minimal bounding box of pixels with non-zero alpha.
///
/// Returns `None` when the raster is fully transparent.
#[must_use]
pub fn content_bounds(image: &RgbaImage) -> Option<ContentBounds> {
    let (width, height) = image.dimensions();
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;

    for (x, y, px) in image.enumerate_pixels() {
        if px[3] > 0 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    any.then(|| ContentBounds {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Crop to the tightest bounding box of non-zero-alpha pixels.
///
/// A fully transparent raster is returned unchanged.
#[must_use]
pub fn trim_to_content(image: &RgbaImage) -> RgbaImage {
    match content_bounds(image) {
        Some(bounds) => {
            imageops::crop_imm(image, bounds.x, bounds.y, bounds.width, bounds.height).to_image()
        },
        None => image.clone(),
    }
}

/// Embed the raster centered in a larger transparent canvas with `margin`
/// pixels of border on all sides.
///
/// Downstream blur and morphology never touch the canvas edge after this.
#[must_use]
pub fn pad(image: &RgbaImage, margin: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut canvas = RgbaImage::new(width + margin * 2, height + margin * 2);
    imageops::overlay(&mut canvas, image, i64::from(margin), i64::from(margin));
    canvas
}

/// Bleed subject color into the transparent border.
///
/// Iteratively blurs the RGB channels and, for every pixel with zero alpha,
/// overwrites its RGB with the blurred value. Semi-transparent edge pixels then
/// carry subject color instead of leftover background color, so a later alpha
/// blur cannot reintroduce fringes. Saturates after a few iterations.
#[must_use]
pub fn solidify_edges(image: &RgbaImage, iterations: u32) -> RgbaImage {
    let alpha = alpha_plane(image);
    let mut rgb = rgb_plane(image);

    for _ in 0..iterations {
        let blurred = imageops::blur(&rgb, 3.0);
        for (x, y, px) in rgb.enumerate_pixels_mut() {
            if alpha.get_pixel(x, y)[0] == 0 {
                *px = *blurred.get_pixel(x, y);
            }
        }
    }

    let mut out = image.clone();
    set_rgb(&mut out, &rgb);
    out
}

/// Erode the alpha channel with a minimum filter of the given odd window size,
/// stripping residual background fringe pixels left by segmentation.
#[must_use]
pub fn shave_mask(image: &RgbaImage, window: u32) -> RgbaImage {
    if window <= 1 {
        return image.clone();
    }
    let shrunk = min_filter(&alpha_plane(image), window);
    let mut out = image.clone();
    set_alpha(&mut out, &shrunk);
    out
}

/// Separable minimum filter over a square window; out-of-bounds samples read
/// as zero (fully transparent).
fn min_filter(plane: &GrayImage, window: u32) -> GrayImage {
    let radius = i64::from(window / 2);
    let (width, height) = plane.dimensions();

    let mut horizontal = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut value = 255u8;
            for dx in -radius..=radius {
                let sx = i64::from(x) + dx;
                let sample = if sx < 0 || sx >= i64::from(width) {
                    0
                } else {
                    plane.get_pixel(sx as u32, y)[0]
                };
                value = value.min(sample);
            }
            horizontal.put_pixel(x, y, Luma([value]));
        }
    }

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut value = 255u8;
            for dy in -radius..=radius {
                let sy = i64::from(y) + dy;
                let sample = if sy < 0 || sy >= i64::from(height) {
                    0
                } else {
                    horizontal.get_pixel(x, sy as u32)[0]
                };
                value = value.min(sample);
            }
            out.put_pixel(x, y, Luma([value]));
        }
    }
    out
}

/// Suppress halo artifacts in a thin band at the mask boundary.
///
/// Dark subjects get their edges darkened (brightness x0.4) to hide light
/// flicker from the original photo; light subjects get a slight lift (x1.05)
/// instead, since darkening would ruin a white product.
#[must_use]
pub fn defringe(image: &RgbaImage, is_light: bool) -> RgbaImage {
    let band = edge_band(&alpha_plane(image), 1.0);
    let factor = if is_light { 1.05 } else { 0.4 };
    let adjusted = scale_brightness(image, factor);

    let mut out = image.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let weight = f32::from(band.get_pixel(x, y)[0]) / 255.0;
        if weight > 0.0 {
            let adj = adjusted.get_pixel(x, y);
            for c in 0..3 {
                px[c] = lerp_u8(px[c], adj[c], weight);
            }
        }
    }
    out
}

/// Feather the mask boundary: solidify first, then Gaussian-blur the alpha
/// channel only. Soft anti-aliased edges without color bleed.
#[must_use]
pub fn feather(image: &RgbaImage, sigma: f32) -> RgbaImage {
    let mut out = solidify_edges(image, 2);
    if sigma > 0.0 {
        let alpha = imageops::blur(&alpha_plane(&out), sigma);
        set_alpha(&mut out, &alpha);
    }
    out
}
