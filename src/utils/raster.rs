//! Raster plane utilities
//!
//! Channel split/recombine helpers and the small pixel-algebra building blocks
//! shared by edge refinement, lighting synthesis and compositing. All functions
//! take buffers by reference and allocate their output; callers never observe
//! partial mutation.

use image::{imageops, GrayImage, Rgba, RgbaImage, RgbImage};

/// 3x3 edge-detection kernel applied to alpha planes (Laplacian-style)
const EDGE_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

/// 3x3 sharpening kernel, normalized to unit gain
const SHARPEN_KERNEL: [f32; 9] = [
    -0.125, -0.125, -0.125, -0.125, 2.0, -0.125, -0.125, -0.125, -0.125,
];

/// Linear interpolation between two channel values, `t` in 0.0-1.0
#[must_use]
pub fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let t = t.clamp(0.0, 1.0);
    (f32::from(a) * (1.0 - t) + f32::from(b) * t)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Extract the alpha channel as a grayscale plane
#[must_use]
pub fn alpha_plane(image: &RgbaImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let data = image.pixels().map(|px| px[3]).collect();
    GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Replace the alpha channel from a grayscale plane of equal dimensions
pub fn set_alpha(image: &mut RgbaImage, alpha: &GrayImage) {
    debug_assert_eq!(image.dimensions(), alpha.dimensions());
    for (pixel, a) in image.pixels_mut().zip(alpha.pixels()) {
        pixel[3] = a[0];
    }
}

/// Extract the RGB channels as an opaque plane
#[must_use]
pub fn rgb_plane(image: &RgbaImage) -> RgbImage {
    let (width, height) = image.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let px = image.get_pixel(x, y);
        image::Rgb([px[0], px[1], px[2]])
    })
}

/// Replace the RGB channels from a plane of equal dimensions, keeping alpha
pub fn set_rgb(image: &mut RgbaImage, rgb: &RgbImage) {
    debug_assert_eq!(image.dimensions(), rgb.dimensions());
    for (pixel, src) in image.pixels_mut().zip(rgb.pixels()) {
        pixel[0] = src[0];
        pixel[1] = src[1];
        pixel[2] = src[2];
    }
}

/// Per-channel linear blend of two equally sized images: `a * (1-t) + b * t`
#[must_use]
pub fn blend(a: &RgbaImage, b: &RgbaImage, t: f32) -> RgbaImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let (width, height) = a.dimensions();
    let mut out = RgbaImage::new(width, height);
    for ((pa, pb), po) in a.pixels().zip(b.pixels()).zip(out.pixels_mut()) {
        for c in 0..4 {
            po[c] = lerp_u8(pa[c], pb[c], t);
        }
    }
    out
}

/// Scale RGB brightness by `factor`, leaving alpha untouched
#[must_use]
pub fn scale_brightness(image: &RgbaImage, factor: f32) -> RgbaImage {
    let mut out = image.clone();
    for px in out.pixels_mut() {
        for c in 0..3 {
            px[c] = (f32::from(px[c]) * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Adjust RGB contrast around the image's mean luminance, leaving alpha untouched
#[must_use]
pub fn adjust_contrast(image: &RgbaImage, factor: f32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let mut sum = 0.0f64;
    for px in image.pixels() {
        sum += 0.299 * f64::from(px[0]) + 0.587 * f64::from(px[1]) + 0.114 * f64::from(px[2]);
    }
    let pivot = (sum / f64::from(width * height)) as f32;

    let mut out = image.clone();
    for px in out.pixels_mut() {
        for c in 0..3 {
            let v = pivot + (f32::from(px[c]) - pivot) * factor;
            px[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Sharpen the RGB channels with a 3x3 kernel, preserving alpha exactly
#[must_use]
pub fn sharpen_rgb(image: &RgbaImage) -> RgbaImage {
    let rgb = rgb_plane(image);
    let sharpened: RgbImage = imageops::filter3x3(&rgb, &SHARPEN_KERNEL);
    let mut out = image.clone();
    set_rgb(&mut out, &sharpened);
    out
}

/// Thin boundary band of a mask: edge detection followed by a Gaussian blur
#[must_use]
pub fn edge_band(alpha: &GrayImage, sigma: f32) -> GrayImage {
    let edges: GrayImage = imageops::filter3x3(alpha, &EDGE_KERNEL);
    if sigma > 0.0 {
        imageops::blur(&edges, sigma)
    } else {
        edges
    }
}

/// Copy a region of an image, zero-filling samples outside its bounds.
///
/// The anchor may be negative or reach past the source; the output always has
/// the requested dimensions.
#[must_use]
pub fn crop_region(image: &RgbaImage, x: i64, y: i64, width: u32, height: u32) -> RgbaImage {
    let (src_w, src_h) = image.dimensions();
    RgbaImage::from_fn(width, height, |dx, dy| {
        let sx = x + i64::from(dx);
        let sy = y + i64::from(dy);
        if sx >= 0 && sy >= 0 && sx < i64::from(src_w) && sy < i64::from(src_h) {
            *image.get_pixel(sx as u32, sy as u32)
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn checkerboard(size: u32) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([200, 200, 200, 255])
            } else {
                Rgba([50, 50, 50, 255])
            }
        })
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp_u8(10, 200, 0.0), 10);
        assert_eq!(lerp_u8(10, 200, 1.0), 200);
        assert_eq!(lerp_u8(0, 255, 2.0), 255);
    }

    #[test]
    fn test_plane_roundtrip() {
        let image = checkerboard(4);
        let alpha = alpha_plane(&image);
        let rgb = rgb_plane(&image);
        let mut rebuilt = RgbaImage::new(4, 4);
        set_rgb(&mut rebuilt, &rgb);
        set_alpha(&mut rebuilt, &alpha);
        assert_eq!(rebuilt, image);
    }

    #[test]
    fn test_blend_midpoint() {
        let a = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let b = RgbaImage::from_pixel(2, 2, Rgba([100, 100, 100, 255]));
        let mid = blend(&a, &b, 0.5);
        assert_eq!(mid.get_pixel(0, 0)[0], 50);
    }

    #[test]
    fn test_brightness_clamps() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([200, 200, 200, 128]));
        let brightened = scale_brightness(&image, 2.0);
        assert_eq!(brightened.get_pixel(0, 0)[0], 255);
        assert_eq!(brightened.get_pixel(0, 0)[3], 128);
    }

    #[test]
    fn test_contrast_preserves_flat_image() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([100, 100, 100, 255]));
        let adjusted = adjust_contrast(&image, 1.5);
        // Every pixel sits at the pivot, so contrast has nothing to stretch
        assert_eq!(adjusted.get_pixel(0, 0)[0], 100);
    }

    #[test]
    fn test_edge_band_marks_boundary_only() {
        let mut alpha = GrayImage::new(8, 8);
        for y in 2..6 {
            for x in 2..6 {
                alpha.put_pixel(x, y, Luma([255]));
            }
        }
        let band = edge_band(&alpha, 0.0);
        assert_eq!(band.get_pixel(0, 0)[0], 0);
        // Interior of the square is flat, so no edge response
        assert_eq!(band.get_pixel(4, 4)[0], 0);
        // Boundary pixels respond
        assert!(band.get_pixel(2, 2)[0] > 0);
    }

    #[test]
    fn test_crop_region_clips() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        let crop = crop_region(&image, -2, -2, 4, 4);
        assert_eq!(*crop.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*crop.get_pixel(3, 3), Rgba([9, 9, 9, 255]));
    }
}
