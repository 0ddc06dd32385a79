//! # Varislice
//!
//! The variable layer-height slicing core of an FDM 3D printing pipeline.
//!
//! Given printer/object configuration and an object height, this library
//! computes:
//! - global slicing parameters ([`SlicingParameters`]),
//! - a piecewise-linear layer-height profile along the build Z axis,
//!   either from user-declared height ranges or adaptively from mesh
//!   curvature (cusp height),
//! - localized interactive edits of that profile (increase / decrease /
//!   reduce-toward-nominal / smooth),
//! - the final sequence of concrete layer boundaries fed to downstream
//!   slicing,
//! - an auxiliary RGBA heatmap texture visualizing layer heights.
//!
//! ## Example
//!
//! ```rust,ignore
//! use varislice::{PrintConfig, PrintObjectConfig, SlicingParameters};
//! use varislice::{layer_height_profile_from_ranges, generate_object_layers, LayerHeightRanges};
//!
//! let print_config = PrintConfig::default();
//! let object_config = PrintObjectConfig::default();
//! let params = SlicingParameters::from_config(&print_config, &object_config, 10.0, &[1])?;
//! let profile = layer_height_profile_from_ranges(&params, &LayerHeightRanges::new());
//! let layers = generate_object_layers(&params, &profile);
//! ```

// Core modules
pub mod config;
pub mod mesh;
pub mod slicing;

// Re-export commonly used types
pub use config::{FirstLayerHeight, PrintConfig, PrintObjectConfig};
pub use mesh::{Point3F, Triangle, TriangleMesh};
pub use slicing::{
    adjust_layer_height_profile, equal_layering, generate_layer_height_texture,
    generate_object_layers, layer_height_profile_adaptive,
    layer_height_profile_adaptive_with_cusp, layer_height_profile_from_ranges, profile_height_at,
    profile_is_valid, AdaptiveSlicing, CuspHeightOracle, LayerHeightEditAction, LayerHeightProfile,
    LayerHeightRange, LayerHeightRanges, SlicingParameters, DEFAULT_CUSP_VALUE, MIN_LAYER_HEIGHT,
    MIN_LAYER_HEIGHT_DEFAULT,
};

/// Floating-point coordinate type for unscaled values (millimetres).
pub type CoordF = f64;

/// Tolerance used for Z comparisons throughout the slicing core (mm).
pub const EPSILON: CoordF = 1e-4;

/// Result type used throughout the slicing core.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for slicing core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Slicing error: {0}")]
    Slicing(String),

    #[error("Mesh error: {0}")]
    Mesh(String),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
