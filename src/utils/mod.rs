//! Shared utilities for raster plane manipulation

pub mod raster;

pub use raster::{
    adjust_contrast, alpha_plane, blend, crop_region, edge_band, lerp_u8, rgb_plane, scale_brightness,
    set_alpha, set_rgb, sharpen_rgb,
};
