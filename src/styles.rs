//! Background style catalog and staging rules
//!
//! Every selectable background is a variant of [`BackgroundStyle`]; each variant
//! carries a fixed [`StagingRule`] record and the key of its plate asset. This
//! enum is the only place new staging styles are added; geometry and lighting
//! never inspect style names.

use serde::{Deserialize, Serialize};

/// Scene-type flags governing which geometry/lighting branch a style takes.
///
/// Derived once from the style variant and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct StagingRule {
    /// Subject stands on a visible floor plane (enables scaling and ground shadows)
    pub is_floor: bool,
    /// Reflective surface: paint a faded mirror reflection under the subject
    pub is_marble: bool,
    /// Spotlight staging: smaller subject, centered vertically
    pub is_spotlight: bool,
    /// Flat-lay staging: centered subject, soft top-down shadows
    pub is_flat_lay: bool,
    /// Slate staging: hard directional shadow pair
    pub is_slate: bool,
    /// Naturally lit scene: warm offset shadows, scene-shadow projection,
    /// light bounce for light subjects
    pub is_daylight: bool,
}

/// Flat color backgrounds (no plate asset, no lighting stages)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlatColor {
    White,
    Black,
}

impl FlatColor {
    /// Human-readable label, as reported back to the caller
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Black => "Black",
        }
    }

    /// Canvas fill color
    #[must_use]
    pub fn fill(self) -> image::Rgba<u8> {
        match self {
            Self::White => image::Rgba([255, 255, 255, 255]),
            Self::Black => image::Rgba([0, 0, 0, 255]),
        }
    }
}

/// Photographic background plate styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackgroundStyle {
    RealisticStudio,
    WoodenFloor,
    MarbleFloor,
    GreyMarbleFloor,
    PremiumDarkMarble,
    PremiumWhiteMarble,
    MidnightObsidianMarble,
    DarkStudioFlatLay,
    IndustrialSlateFloor,
    NaturalDaylightStudio,
    PremiumOakParquet,
}

impl BackgroundStyle {
    /// Every plate style, in catalog order
    pub const ALL: [Self; 11] = [
        Self::RealisticStudio,
        Self::WoodenFloor,
        Self::MarbleFloor,
        Self::GreyMarbleFloor,
        Self::PremiumDarkMarble,
        Self::PremiumWhiteMarble,
        Self::MidnightObsidianMarble,
        Self::DarkStudioFlatLay,
        Self::IndustrialSlateFloor,
        Self::NaturalDaylightStudio,
        Self::PremiumOakParquet,
    ];

    /// Public display name (also the accepted selection string)
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::RealisticStudio => "Realistic Studio",
            Self::WoodenFloor => "Wooden Floor",
            Self::MarbleFloor => "Marble Floor",
            Self::GreyMarbleFloor => "Grey Marble Floor",
            Self::PremiumDarkMarble => "Premium Dark Marble",
            Self::PremiumWhiteMarble => "Premium White Marble",
            Self::MidnightObsidianMarble => "Midnight Obsidian Marble",
            Self::DarkStudioFlatLay => "Dark Studio (Flat Lay)",
            Self::IndustrialSlateFloor => "Industrial Slate Floor",
            Self::NaturalDaylightStudio => "Natural Daylight Studio",
            Self::PremiumOakParquet => "Premium Oak Parquet",
        }
    }

    /// File stem of the plate asset under the backgrounds directory
    #[must_use]
    pub fn asset_key(self) -> &'static str {
        match self {
            Self::RealisticStudio => "studio_floor",
            Self::WoodenFloor => "wood_floor",
            Self::MarbleFloor => "marble_floor",
            Self::GreyMarbleFloor => "grey_marble_floor",
            Self::PremiumDarkMarble => "premium_dark_marble",
            Self::PremiumWhiteMarble => "premium_white_marble",
            Self::MidnightObsidianMarble => "obsidian_marble",
            Self::DarkStudioFlatLay => "dark_studio_floor",
            Self::IndustrialSlateFloor => "industrial_slate",
            Self::NaturalDaylightStudio => "daylight_studio",
            Self::PremiumOakParquet => "premium_parquet",
        }
    }

    /// Staging rule record for this style.
    ///
    /// Note: `PremiumOakParquet` carries `is_daylight` because every consumer of
    /// the daylight flag treats parquet identically (warm shadow offset, light
    /// bounce, scene-shadow projection).
    #[must_use]
    pub fn staging_rule(self) -> StagingRule {
        let floor = StagingRule {
            is_floor: true,
            ..StagingRule::default()
        };
        match self {
            Self::RealisticStudio | Self::WoodenFloor => floor,
            Self::MarbleFloor
            | Self::GreyMarbleFloor
            | Self::PremiumDarkMarble
            | Self::PremiumWhiteMarble => StagingRule {
                is_marble: true,
                ..floor
            },
            Self::MidnightObsidianMarble => StagingRule {
                is_marble: true,
                is_spotlight: true,
                ..floor
            },
            Self::DarkStudioFlatLay => StagingRule {
                is_flat_lay: true,
                ..floor
            },
            Self::IndustrialSlateFloor => StagingRule {
                is_slate: true,
                ..floor
            },
            Self::NaturalDaylightStudio | Self::PremiumOakParquet => StagingRule {
                is_flat_lay: true,
                is_daylight: true,
                ..floor
            },
        }
    }

    /// Whether the plate reads as dark overall (drives rim glow and tone lifts)
    #[must_use]
    pub fn is_dark_scene(self) -> bool {
        matches!(
            self,
            Self::PremiumDarkMarble
                | Self::MidnightObsidianMarble
                | Self::DarkStudioFlatLay
                | Self::IndustrialSlateFloor
        )
    }

    /// Resolve a public display name back to a style
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|style| style.display_name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for BackgroundStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// All 14 public background selections: auto-detect, both flat colors, and
/// every plate style.
#[must_use]
pub fn public_backgrounds() -> Vec<&'static str> {
    let mut names = vec!["Auto-detect", "White", "Black"];
    names.extend(BackgroundStyle::ALL.iter().map(|s| s.display_name()));
    names
}
