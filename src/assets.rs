//! Background plate catalog
//!
//! Plates live on disk as `<style_key>.png` under a fixed directory and are
//! resized to the staging target on load. A missing or unreadable plate
//! degrades to a flat-white canvas instead of failing the pipeline. Decoded
//! plates are memoized per `(key, size)` since catalog reads are read-only
//! after load.

use image::{imageops, Rgba, RgbaImage};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// On-disk background plate catalog with in-memory memoization
pub struct BackgroundCatalog {
    dir: PathBuf,
    cache: Mutex<HashMap<(String, u32, u32), RgbaImage>>,
}

impl BackgroundCatalog {
    /// Create a catalog rooted at `dir`
    #[must_use]
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Directory this catalog reads from
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the plate for `key`, resized to `target_size`.
    ///
    /// Falls back to a flat-white canvas when the plate is missing or cannot
    /// be decoded.
    #[must_use]
    pub fn load(&self, key: &str, target_size: (u32, u32)) -> RgbaImage {
        let cache_key = (key.to_owned(), target_size.0, target_size.1);
        if let Ok(cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&cache_key) {
                return cached.clone();
            }
        }

        let plate = self.load_uncached(key, target_size);

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(cache_key, plate.clone());
        }
        plate
    }

    fn load_uncached(&self, key: &str, target_size: (u32, u32)) -> RgbaImage {
        let path = self.dir.join(format!("{key}.png"));
        match image::open(&path) {
            Ok(plate) => {
                debug!("Loaded background plate '{}' from {}", key, path.display());
                imageops::resize(
                    &plate.to_rgba8(),
                    target_size.0,
                    target_size.1,
                    imageops::FilterType::Lanczos3,
                )
            },
            Err(err) => {
                warn!(
                    "Background plate '{}' unavailable ({}); using flat white fallback",
                    key, err
                );
                Self::flat_fallback(target_size)
            },
        }
    }

    /// Flat-white canvas used when a plate is absent
    #[must_use]
    pub fn flat_fallback(target_size: (u32, u32)) -> RgbaImage {
        RgbaImage::from_pixel(target_size.0, target_size.1, Rgba([255, 255, 255, 255]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_plate_falls_back_to_white() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = BackgroundCatalog::new(dir.path());
        let plate = catalog.load("marble_floor", (32, 16));
        assert_eq!(plate.dimensions(), (32, 16));
        assert!(plate.pixels().all(|px| *px == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_plate_loads_and_resizes() {
        let dir = tempfile::tempdir().unwrap();
        let plate = RgbaImage::from_pixel(8, 8, Rgba([10, 200, 30, 255]));
        plate.save(dir.path().join("wood_floor.png")).unwrap();

        let catalog = BackgroundCatalog::new(dir.path());
        let loaded = catalog.load("wood_floor", (16, 16));
        assert_eq!(loaded.dimensions(), (16, 16));
        assert_eq!(loaded.get_pixel(8, 8)[1], 200);
    }

    #[test]
    fn test_cache_survives_file_removal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studio_floor.png");
        let plate = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        plate.save(&path).unwrap();

        let catalog = BackgroundCatalog::new(dir.path());
        let first = catalog.load("studio_floor", (4, 4));
        std::fs::remove_file(&path).unwrap();
        let second = catalog.load("studio_floor", (4, 4));
        assert_eq!(first, second);
        assert_eq!(second.get_pixel(0, 0)[2], 3);
    }
}
