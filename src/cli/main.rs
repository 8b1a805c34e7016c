//! Product staging CLI tool
//!
//! Composites a cut-out product photo onto a chosen background. Inputs are
//! expected to already carry an alpha cutout (run your segmentation tool of
//! choice first); the CLI wires the passthrough segmenter into the core
//! pipeline.

use crate::{
    config::{BackgroundChoice, OutputFormat, StageConfig, DEFAULT_ASSETS_DIR},
    segmentation::PassthroughSegmenter,
    services::ImageIOService,
    styles::BackgroundStyle,
    tracing_config::init_cli_tracing,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use serde_json::json;
use std::path::PathBuf;

/// Product photo staging CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "photostage")]
pub struct Cli {
    /// Input image with an alpha cutout (PNG with transparency)
    #[arg(value_name = "INPUT", required_unless_present = "list_backgrounds")]
    pub input: Option<PathBuf>,

    /// Background selection: Auto-detect, White, Black, or a plate style name
    #[arg(short, long, value_name = "NAME")]
    pub background: Option<String>,

    /// Output file [default: <input>_staged.<ext>]
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output format [default: inferred from the output extension]
    #[arg(short, long, value_enum)]
    pub format: Option<CliOutputFormat>,

    /// JPEG quality (0-100)
    #[arg(long, default_value_t = 90)]
    pub jpeg_quality: u8,

    /// Directory holding background plate assets
    #[arg(long, value_name = "DIR", default_value = DEFAULT_ASSETS_DIR)]
    pub assets_dir: PathBuf,

    /// Seed for the film grain noise (reproducible output)
    #[arg(long)]
    pub grain_seed: Option<u64>,

    /// List available backgrounds and exit
    #[arg(long)]
    pub list_backgrounds: bool,

    /// Emit machine-readable JSON where applicable
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Jpeg,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Png => Self::Png,
            CliOutputFormat::Jpeg => Self::Jpeg,
        }
    }
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    if cli.list_backgrounds {
        list_backgrounds(cli.json);
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("INPUT is required unless --list-backgrounds is given")?;

    let background = BackgroundChoice::parse(cli.background.as_deref())?;

    let output = cli.output.clone().unwrap_or_else(|| default_output(&input));
    let format = cli
        .format
        .map_or_else(|| ImageIOService::format_for_path(&output), OutputFormat::from);

    let mut builder = StageConfig::builder()
        .background(background)
        .assets_dir(cli.assets_dir.clone())
        .output_format(format)
        .jpeg_quality(cli.jpeg_quality)
        .debug(cli.verbose > 0);
    if let Some(seed) = cli.grain_seed {
        builder = builder.grain_seed(seed);
    }
    let config = builder.build()?;

    let bytes = tokio::fs::read(&input)
        .await
        .with_context(|| format!("Failed to read input '{}'", input.display()))?;

    let result = crate::stage_product_from_bytes(
        &bytes,
        &config,
        Box::new(PassthroughSegmenter::new()),
    )
    .await?;

    result.save(&output, format, config.jpeg_quality)?;
    info!("{}", result.timing_summary());

    if cli.json {
        println!(
            "{}",
            json!({
                "output": output.display().to_string(),
                "background": result.label,
                "width": result.dimensions().0,
                "height": result.dimensions().1,
            })
        );
    } else {
        println!("Staged on '{}' -> {}", result.label, output.display());
    }

    Ok(())
}

/// Default output path: input stem with a `_staged` suffix
fn default_output(input: &std::path::Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("result");
    input.with_file_name(format!("{stem}_staged.png"))
}

fn list_backgrounds(as_json: bool) {
    if as_json {
        let entries: Vec<_> = crate::styles::public_backgrounds()
            .into_iter()
            .map(|name| match BackgroundStyle::from_name(name) {
                Some(style) => json!({
                    "name": name,
                    "kind": "plate",
                    "asset_key": style.asset_key(),
                    "rule": style.staging_rule(),
                }),
                None if name == "Auto-detect" => json!({ "name": name, "kind": "auto" }),
                None => json!({ "name": name, "kind": "flat" }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries).unwrap_or_default());
    } else {
        println!("Available backgrounds:");
        for name in crate::styles::public_backgrounds() {
            println!("  {name}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        let path = default_output(std::path::Path::new("shots/tshirt.png"));
        assert_eq!(path, PathBuf::from("shots/tshirt_staged.png"));
    }

    #[test]
    fn test_cli_parses_background() {
        let cli = Cli::parse_from(["photostage", "in.png", "-b", "Marble Floor", "--grain-seed", "7"]);
        assert_eq!(cli.background.as_deref(), Some("Marble Floor"));
        assert_eq!(cli.grain_seed, Some(7));
    }

    #[test]
    fn test_cli_allows_listing_without_input() {
        let cli = Cli::parse_from(["photostage", "--list-backgrounds"]);
        assert!(cli.list_backgrounds);
        assert!(cli.input.is_none());
    }
}
