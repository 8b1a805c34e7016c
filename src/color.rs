//! Subject and scene brightness classification

use image::{Rgb, RgbaImage};
use ndarray::{ArrayView3, Axis};

/// Decide whether a subject reads as light or dark.
///
/// Computes the mean of R, G and B over pixels with non-zero alpha and compares
/// it against `threshold`. A fully transparent raster classifies as dark
/// (`false`), not as an error.
#[must_use]
pub fn is_light(image: &RgbaImage, threshold: u8) -> bool {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return false;
    }
    let Ok(view) = ArrayView3::from_shape((height as usize, width as usize, 4), image.as_raw())
    else {
        return false;
    };

    let mut sum = 0.0f64;
    let mut count = 0u64;
    for px in view.lanes(Axis(2)) {
        if px[3] > 0 {
            sum += f64::from(px[0]) + f64::from(px[1]) + f64::from(px[2]);
            count += 3;
        }
    }
    count > 0 && sum / count as f64 > f64::from(threshold)
}

/// Average RGB color over the whole frame, ignoring alpha.
///
/// Used as the tint source for the cinematic pass; background plates are opaque
/// so every pixel contributes.
#[must_use]
pub fn average_color(image: &RgbaImage) -> Rgb<u8> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Rgb([255, 255, 255]);
    }
    let Ok(view) = ArrayView3::from_shape((height as usize, width as usize, 4), image.as_raw())
    else {
        return Rgb([255, 255, 255]);
    };

    let pixels = f64::from(width) * f64::from(height);
    let mut channels = [0.0f64; 3];
    for px in view.lanes(Axis(2)) {
        channels[0] += f64::from(px[0]);
        channels[1] += f64::from(px[1]);
        channels[2] += f64::from(px[2]);
    }
    Rgb([
        (channels[0] / pixels).round() as u8,
        (channels[1] / pixels).round() as u8,
        (channels[2] / pixels).round() as u8,
    ])
}
