//! Layer boundary generation from a layer height profile.

use super::{lerp, SlicingParameters};
use crate::{CoordF, EPSILON};

/// Produce object layers as pairs of low / high layer boundaries, stored
/// into a flat vector `[lo0, hi0, lo1, hi1, ...]`.
///
/// Each layer's height is the profile sampled at the layer's midpoint:
/// the candidate slice Z starts half a minimum layer above the current
/// print Z and is refined once with the sampled height, which suffices
/// given the profile's small local slope. The final layer is not snapped
/// to the object top; an under-coverage smaller than the minimum layer
/// height may remain.
pub fn generate_object_layers(
    slicing_params: &SlicingParameters,
    layer_height_profile: &[CoordF],
) -> Vec<CoordF> {
    debug_assert!(!layer_height_profile.is_empty());

    let mut print_z = 0.0;
    let mut out = Vec::new();

    if slicing_params.first_object_layer_height_fixed() {
        out.push(0.0);
        print_z = slicing_params.first_object_layer_height;
        out.push(print_z);
    }

    let mut idx_layer_height_profile = 0;
    let mut slice_z = print_z + 0.5 * slicing_params.min_layer_height;
    while slice_z < slicing_params.object_print_z_height() {
        let mut height = slicing_params.min_layer_height;
        if idx_layer_height_profile < layer_height_profile.len() {
            let mut next = idx_layer_height_profile + 2;
            while next < layer_height_profile.len() && slice_z >= layer_height_profile[next] {
                idx_layer_height_profile = next;
                next += 2;
            }
            let z1 = layer_height_profile[idx_layer_height_profile];
            let h1 = layer_height_profile[idx_layer_height_profile + 1];
            height = h1;
            if next < layer_height_profile.len() {
                let z2 = layer_height_profile[next];
                let h2 = layer_height_profile[next + 1];
                height = lerp(h1, h2, (slice_z - z1) / (z2 - z1));
                debug_assert!(
                    height >= slicing_params.min_layer_height - EPSILON
                        && height <= slicing_params.max_layer_height + EPSILON
                );
            }
        }
        slice_z = print_z + 0.5 * height;
        if slice_z >= slicing_params.object_print_z_height() {
            break;
        }
        out.push(print_z);
        print_z += height;
        slice_z = print_z + 0.5 * slicing_params.min_layer_height;
        out.push(print_z);
    }

    out
}
