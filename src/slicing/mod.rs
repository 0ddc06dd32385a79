//! Variable layer-height slicing core.
//!
//! This module contains the heart of the library:
//! - [`SlicingParameters`] - global slicing parameters derived from
//!   printer/object configuration
//! - [`layer_height_profile_from_ranges`] - profile from user-declared
//!   fixed height ranges
//! - [`layer_height_profile_adaptive`] - profile from mesh curvature
//!   via the cusp-height oracle
//! - [`adjust_layer_height_profile`] - localized interactive profile edits
//! - [`generate_object_layers`] - the final layer boundary sequence
//! - [`generate_layer_height_texture`] - RGBA heatmap of layer heights

mod adaptive;
mod layers;
mod params;
mod profile;
mod texture;

pub use adaptive::{
    layer_height_profile_adaptive, layer_height_profile_adaptive_with_cusp, AdaptiveSlicing,
    CuspHeightOracle, DEFAULT_CUSP_VALUE,
};
pub use layers::generate_object_layers;
pub use params::{
    equal_layering, SlicingParameters, MIN_LAYER_HEIGHT, MIN_LAYER_HEIGHT_DEFAULT,
};
pub use profile::{
    adjust_layer_height_profile, layer_height_profile_from_ranges, profile_height_at,
    profile_is_valid, LayerHeightEditAction, LayerHeightProfile, LayerHeightRange,
    LayerHeightRanges,
};
pub use texture::generate_layer_height_texture;

use crate::CoordF;

/// Linear interpolation between two scalars.
#[inline]
pub(crate) fn lerp(a: CoordF, b: CoordF, t: CoordF) -> CoordF {
    a + (b - a) * t
}
