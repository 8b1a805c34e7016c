//! Unified staging processor
//!
//! `StagingProcessor` consolidates the whole pipeline: segmentation, edge
//! refinement, geometric placement, lighting synthesis and compositing. Every
//! raster it creates is call-scoped, so concurrent processors on different
//! images are naturally independent.

use crate::{
    assets::BackgroundCatalog,
    color, compositor,
    config::{BackgroundChoice, StageConfig},
    edge,
    error::{Result, StageError},
    geometry, lighting,
    segmentation::Segmenter,
    styles::{BackgroundStyle, FlatColor},
    types::{AlphaMask, ProcessingMetadata, ProcessingTimings, StagedResult},
};
use image::{DynamicImage, RgbaImage};
use instant::Instant;
use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{span, Level};

/// Window of the minimum filter that strips segmentation fringe pixels
const SHAVE_WINDOW: u32 = 7;
/// Feather sigma for plate staging (sub-pixel anti-aliasing)
const PLATE_FEATHER_SIGMA: f32 = 0.4;
/// Feather sigma for the flat-color path
const FLAT_FEATHER_SIGMA: f32 = 0.7;
/// Strength of the soft light-wrap pass
const LIGHT_WRAP_INTENSITY: f32 = 0.12;
/// Blur of the soft light-wrap pass
const LIGHT_WRAP_BLUR: f32 = 12.0;
/// Strength of the scene-shadow projection on sunlit scenes
const SCENE_SHADOW_INTENSITY: f32 = 0.08;

/// Unified processor running the full staging pipeline
pub struct StagingProcessor {
    config: StageConfig,
    segmenter: Box<dyn Segmenter>,
    catalog: BackgroundCatalog,
    rng: StdRng,
}

impl StagingProcessor {
    /// Create a processor from a validated configuration and a segmentation
    /// backend.
    ///
    /// # Errors
    /// Returns `StageError::InvalidConfig` when the configuration carries an
    /// out-of-range grain intensity (configs built through the builder are
    /// already validated).
    pub fn new(config: StageConfig, segmenter: Box<dyn Segmenter>) -> Result<Self> {
        if !config.grain_intensity.is_finite() || !(0.0..=0.25).contains(&config.grain_intensity) {
            return Err(StageError::config_value_error(
                "grain_intensity",
                config.grain_intensity,
                "0.0-0.25",
            ));
        }

        let catalog = BackgroundCatalog::new(config.assets_dir.clone());
        let rng = match config.grain_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            segmenter,
            catalog,
            rng,
        })
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Run the full pipeline on `image`.
    ///
    /// Returns the composited scene (always fully opaque RGB) plus the
    /// resolved background label.
    ///
    /// # Errors
    /// - `StageError::Segmentation` when the collaborator fails
    /// - `StageError::NoSubject` when segmentation yields an empty mask
    /// - `StageError::Internal` for unexpected compositing failures
    pub fn process_image(&mut self, image: &DynamicImage) -> Result<StagedResult> {
        let stage_span = span!(Level::INFO, "stage_product");
        let _guard = stage_span.enter();

        let total_start = Instant::now();
        let mut timings = ProcessingTimings::new();

        // 1. Segmentation (external collaborator)
        let segment_start = Instant::now();
        let cutout = self.segmenter.segment(image)?;
        timings.segmentation_ms = segment_start.elapsed().as_millis() as u64;
        debug!(
            "Segmentation ({}) completed in {}ms",
            self.segmenter.describe(),
            timings.segmentation_ms
        );

        // 2. Trim to content and add the safe zone
        let refine_start = Instant::now();
        let bounds = edge::content_bounds(&cutout).ok_or_else(|| {
            StageError::no_subject(
                "segmentation produced an empty mask; ensure a clear foreground subject",
            )
        })?;
        let trimmed = edge::trim_to_content(&cutout);
        let padded = edge::pad(&trimmed, self.config.safe_margin);
        timings.refinement_ms += refine_start.elapsed().as_millis() as u64;

        if self.config.debug {
            let stats = AlphaMask::from_alpha_channel(&cutout).statistics();
            debug!(
                "Subject bounds {}x{} at ({}, {}), coverage {:.1}%",
                bounds.width,
                bounds.height,
                bounds.x,
                bounds.y,
                stats.coverage * 100.0
            );
        }

        let (result_image, label, subject_mask, subject_is_light) = match self.config.background {
            BackgroundChoice::Style(style) => {
                let (image, mask, is_light) =
                    self.stage_on_plate(&padded, bounds.height, style, &mut timings)?;
                (image, style.display_name().to_owned(), mask, is_light)
            },
            BackgroundChoice::Flat(fill) => {
                let (image, mask) = Self::stage_on_flat(&padded, fill, &mut timings);
                (image, fill.label().to_owned(), mask, None)
            },
            BackgroundChoice::Auto => {
                // Light subjects sit on black, dark subjects on white
                let is_light = color::is_light(&padded, self.config.light_threshold);
                let fill = if is_light {
                    FlatColor::Black
                } else {
                    FlatColor::White
                };
                let (image, mask) = Self::stage_on_flat(&padded, fill, &mut timings);
                (image, fill.label().to_owned(), mask, Some(is_light))
            },
        };

        timings.total_ms = total_start.elapsed().as_millis() as u64;
        info!("Staged subject on '{}' in {}ms", label, timings.total_ms);

        let mut metadata = ProcessingMetadata::new(label.clone());
        metadata.subject_is_light = subject_is_light;
        metadata.grain_seed = match self.config.background {
            BackgroundChoice::Style(_) => self.config.grain_seed,
            _ => None,
        };
        metadata.set_timings(timings);

        Ok(StagedResult::new(result_image, label, subject_mask, metadata))
    }

    /// Full plate staging: scale, refine, light, composite, grain.
    fn stage_on_plate(
        &mut self,
        padded: &RgbaImage,
        trimmed_height: u32,
        style: BackgroundStyle,
        timings: &mut ProcessingTimings,
    ) -> Result<(DynamicImage, AlphaMask, Option<bool>)> {
        let rule = style.staging_rule();
        let background = self.catalog.load(style.asset_key(), padded.dimensions());

        let plan = geometry::plan(
            padded,
            trimmed_height,
            background.dimensions(),
            rule,
            self.config.safe_margin,
        )?;
        let subject = geometry::rescale(padded, &plan);
        debug!(
            "Planned '{}': scale {:.3}, anchor ({}, {})",
            style, plan.scale, plan.anchor_x, plan.anchor_y
        );

        // First classification: observed before refinement, drives the
        // defringe direction and the cinematic dark-subject lift.
        let is_light_initial = color::is_light(&subject, self.config.light_threshold);

        let refine_start = Instant::now();
        let subject = edge::shave_mask(&subject, SHAVE_WINDOW);
        let subject = edge::defringe(&subject, is_light_initial);
        let subject = edge::feather(&subject, PLATE_FEATHER_SIGMA);
        timings.refinement_ms += refine_start.elapsed().as_millis() as u64;

        let lighting_start = Instant::now();
        let tint = color::average_color(&background);
        let mut subject = lighting::cinematic_pass(
            &subject,
            style.is_dark_scene(),
            !is_light_initial,
            Some(tint),
        );
        if rule.is_daylight {
            subject = lighting::scene_shadow_projection(
                &subject,
                &background,
                plan.anchor(),
                SCENE_SHADOW_INTENSITY,
            );
        }
        subject = lighting::light_wrap(
            &subject,
            &background,
            plan.anchor(),
            LIGHT_WRAP_INTENSITY,
            LIGHT_WRAP_BLUR,
        );
        timings.lighting_ms = lighting_start.elapsed().as_millis() as u64;

        // Second classification: the refined pixels shift measured brightness,
        // and shadow opacity keys off what will actually be pasted.
        let is_light_refined = color::is_light(&subject, self.config.light_threshold);

        let composite_start = Instant::now();
        let composite = compositor::render_scene(
            &background,
            &subject,
            &plan,
            rule,
            is_light_refined,
            self.config.grain_intensity,
            &mut self.rng,
        );
        timings.compositing_ms = composite_start.elapsed().as_millis() as u64;

        let mask = AlphaMask::from_alpha_channel(&subject);
        let rgb = DynamicImage::ImageRgba8(composite).to_rgb8();
        Ok((DynamicImage::ImageRgb8(rgb), mask, Some(is_light_refined)))
    }

    /// Flat-color staging: feather and paste, no lighting stages.
    fn stage_on_flat(
        padded: &RgbaImage,
        fill: FlatColor,
        timings: &mut ProcessingTimings,
    ) -> (DynamicImage, AlphaMask) {
        let refine_start = Instant::now();
        let subject = edge::feather(padded, FLAT_FEATHER_SIGMA);
        timings.refinement_ms += refine_start.elapsed().as_millis() as u64;

        let composite_start = Instant::now();
        let composite = compositor::render_flat(&subject, fill.fill());
        timings.compositing_ms = composite_start.elapsed().as_millis() as u64;

        let mask = AlphaMask::from_alpha_channel(&subject);
        let rgb = DynamicImage::ImageRgba8(composite).to_rgb8();
        (DynamicImage::ImageRgb8(rgb), mask)
    }
}
