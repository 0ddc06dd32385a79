//! Varislice CLI - inspect the variable layer-height slicing core.
//!
//! Usage:
//!   varislice-cli params <scene.json>
//!   varislice-cli profile <scene.json> [--adaptive-cusp <mm>]
//!   varislice-cli layers <scene.json> [--json]
//!
//! The scene file is a JSON document describing the printer, the object
//! configuration, the object height and optional layer height ranges:
//!
//! ```json
//! {
//!   "print": { "nozzle_diameter": [0.4], "min_layer_height": [0.07], "max_layer_height": [0.0] },
//!   "object": { "layer_height": 0.2, "first_layer_height": { "Absolute": 0.3 }, ... },
//!   "object_height": 25.0,
//!   "object_extruders": [1],
//!   "ranges": [[5.0, 8.0, 0.1]]
//! }
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use varislice::{
    generate_object_layers, layer_height_profile_from_ranges, LayerHeightRange, LayerHeightRanges,
    PrintConfig, PrintObjectConfig, SlicingParameters,
};

/// Variable layer-height slicing core
#[derive(Parser, Debug)]
#[command(name = "varislice-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the slicing parameters derived from a scene
    Params {
        /// Scene description file (JSON)
        #[arg(value_name = "SCENE")]
        scene: PathBuf,
    },
    /// Print the layer height profile of a scene
    Profile {
        /// Scene description file (JSON)
        #[arg(value_name = "SCENE")]
        scene: PathBuf,
    },
    /// Print the generated layer table of a scene
    Layers {
        /// Scene description file (JSON)
        #[arg(value_name = "SCENE")]
        scene: PathBuf,

        /// Emit the flat layer boundary list as JSON
        #[arg(long)]
        json: bool,
    },
}

/// On-disk scene description: configuration plus object geometry facts.
#[derive(Debug, Deserialize)]
struct Scene {
    #[serde(default = "default_print_config")]
    print: PrintConfig,
    #[serde(default = "default_object_config")]
    object: PrintObjectConfig,
    object_height: f64,
    #[serde(default)]
    object_extruders: Vec<u32>,
    #[serde(default)]
    ranges: Vec<(f64, f64, f64)>,
}

fn default_print_config() -> PrintConfig {
    PrintConfig::default()
}

fn default_object_config() -> PrintObjectConfig {
    PrintObjectConfig::default()
}

fn load_scene(path: &PathBuf) -> Result<(SlicingParameters, LayerHeightRanges)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file {}", path.display()))?;
    let scene: Scene = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse scene file {}", path.display()))?;

    let params = SlicingParameters::from_config(
        &scene.print,
        &scene.object,
        scene.object_height,
        &scene.object_extruders,
    )
    .context("Failed to derive slicing parameters")?;

    let mut ranges = LayerHeightRanges::new();
    for &(lo, hi, height) in &scene.ranges {
        ranges.insert(
            LayerHeightRange::new(lo, hi, height)
                .with_context(|| format!("Invalid layer height range [{lo}, {hi}] -> {height}"))?,
        );
    }
    Ok((params, ranges))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        LevelFilter::Debug
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Params { scene } => {
            let (params, _) = load_scene(&scene)?;
            println!("{params}");
            println!("  object_print_z_height: {:.3}mm", params.object_print_z_height());
            println!(
                "  first object layer: {:.3}mm ({}fixed{})",
                params.first_object_layer_height,
                if params.first_object_layer_height_fixed() {
                    ""
                } else {
                    "not "
                },
                if params.first_object_layer_bridging {
                    ", bridging"
                } else {
                    ""
                },
            );
            if params.has_raft() {
                println!(
                    "  raft: {} base + {} interface layers, contact top at {:.3}mm",
                    params.base_raft_layers,
                    params.interface_raft_layers,
                    params.raft_contact_top_z
                );
            }
        }
        Commands::Profile { scene } => {
            let (params, ranges) = load_scene(&scene)?;
            let profile = layer_height_profile_from_ranges(&params, &ranges);
            info!("profile with {} key-points", profile.len() / 2);
            println!("{:>10}  {:>8}", "z (mm)", "h (mm)");
            for pair in profile.chunks(2) {
                println!("{:>10.4}  {:>8.4}", pair[0], pair[1]);
            }
        }
        Commands::Layers { scene, json } => {
            let (params, ranges) = load_scene(&scene)?;
            let profile = layer_height_profile_from_ranges(&params, &ranges);
            let layers = generate_object_layers(&params, &profile);
            info!("generated {} layers", layers.len() / 2);
            if json {
                println!("{}", serde_json::to_string(&layers)?);
            } else {
                println!("{:>6}  {:>10}  {:>10}  {:>8}", "#", "low (mm)", "high (mm)", "h (mm)");
                for (i, pair) in layers.chunks(2).enumerate() {
                    println!(
                        "{:>6}  {:>10.4}  {:>10.4}  {:>8.4}",
                        i,
                        pair[0],
                        pair[1],
                        pair[1] - pair[0]
                    );
                }
            }
        }
    }

    Ok(())
}
