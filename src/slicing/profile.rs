//! Layer height profiles and their interactive edits.
//!
//! A profile is a flat sequence of doubles `[z0, h0, z1, h1, ...]`
//! describing a piecewise-linear layer height function over the object's
//! Z span. Key-points may repeat a Z with different heights, which
//! encodes a hard step between segments; that is the only allowed
//! discontinuity. The profile is referenced to z = 0, meaning raft
//! layers are not accounted for and the printed object may be lifted by
//! the raft thickness at G-code generation time.

use super::{lerp, SlicingParameters};
use crate::{CoordF, Error, Result, EPSILON};
use log::trace;
use serde::{Deserialize, Serialize};

/// A layer height profile: flat `[z, h, z, h, ...]` key-point storage.
pub type LayerHeightProfile = Vec<CoordF>;

/// Resampling step of the profile editor (mm).
const Z_STEP: CoordF = 0.1;

/// A user-declared fixed layer height over a Z interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerHeightRange {
    /// Bottom of the interval (mm).
    pub lo: CoordF,
    /// Top of the interval (mm).
    pub hi: CoordF,
    /// Layer height to use inside the interval (mm).
    pub height: CoordF,
}

impl LayerHeightRange {
    /// Create a new range, validating its invariants.
    pub fn new(lo: CoordF, hi: CoordF, height: CoordF) -> Result<Self> {
        if !lo.is_finite() || !hi.is_finite() || !height.is_finite() {
            return Err(Error::Config("Layer height range must be finite".into()));
        }
        if lo >= hi {
            return Err(Error::Config(format!(
                "Layer height range must have lo < hi, got [{lo}, {hi}]"
            )));
        }
        if height <= 0.0 {
            return Err(Error::Config(format!(
                "Layer height range height must be positive, got {height}"
            )));
        }
        Ok(Self { lo, hi, height })
    }
}

/// An ordered set of layer height ranges, sorted lexicographically by
/// `(lo, hi)`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayerHeightRanges {
    ranges: Vec<LayerHeightRange>,
}

impl LayerHeightRanges {
    /// Create an empty range set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a range, keeping the set sorted.
    pub fn insert(&mut self, range: LayerHeightRange) {
        let pos = self
            .ranges
            .partition_point(|r| (r.lo, r.hi) < (range.lo, range.hi));
        self.ranges.insert(pos, range);
    }

    /// Iterate the ranges in `(lo, hi)` order.
    pub fn iter(&self) -> std::slice::Iter<'_, LayerHeightRange> {
        self.ranges.iter()
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Convert layer height ranges to a layer height profile.
///
/// Overlapping ranges are resolved by trimming the later range's low
/// boundary against the earlier range's high boundary; the fixed first
/// layer (if any) takes priority over all user ranges. Intervals not
/// covered by any range default to the regular layer height. Ranges
/// thinner than `EPSILON` after trimming are dropped.
pub fn layer_height_profile_from_ranges(
    slicing_params: &SlicingParameters,
    layer_height_ranges: &LayerHeightRanges,
) -> LayerHeightProfile {
    // 1) Trim the ranges one by the other to make them non-overlapping;
    //    insert the 1st layer if fixed.
    let mut ranges_non_overlapping: Vec<LayerHeightRange> =
        Vec::with_capacity(layer_height_ranges.len() + 1);
    if slicing_params.first_object_layer_height_fixed() {
        ranges_non_overlapping.push(LayerHeightRange {
            lo: 0.0,
            hi: slicing_params.first_object_layer_height,
            height: slicing_params.first_object_layer_height,
        });
    }
    for range in layer_height_ranges.iter() {
        let mut lo = range.lo;
        let hi = range.hi.min(slicing_params.object_print_z_height());
        if let Some(last) = ranges_non_overlapping.last() {
            // Trim the current low with the last high.
            lo = lo.max(last.hi);
        }
        if lo + EPSILON < hi {
            ranges_non_overlapping.push(LayerHeightRange {
                lo,
                hi,
                height: range.height,
            });
        }
    }

    // 2) Convert the trimmed ranges to a height profile, filling the
    //    intervals between them with the regular layer height.
    let mut profile: LayerHeightProfile = Vec::with_capacity(4 * ranges_non_overlapping.len() + 4);
    for range in &ranges_non_overlapping {
        let last_z = if profile.is_empty() {
            0.0
        } else {
            profile[profile.len() - 2]
        };
        if range.lo > last_z + EPSILON {
            // Insert a step of regular layer height.
            profile.push(last_z);
            profile.push(slicing_params.layer_height);
            profile.push(range.lo);
            profile.push(slicing_params.layer_height);
        }
        // Insert a step of the overridden layer height.
        profile.push(range.lo);
        profile.push(range.height);
        profile.push(range.hi);
        profile.push(range.height);
    }

    let last_z = if profile.is_empty() {
        0.0
    } else {
        profile[profile.len() - 2]
    };
    if last_z < slicing_params.object_print_z_height() {
        // Insert a step of regular layer height up to the object top.
        profile.push(last_z);
        profile.push(slicing_params.layer_height);
        profile.push(slicing_params.object_print_z_height());
        profile.push(slicing_params.layer_height);
    }

    profile
}

/// Sample the layer height profile at the given Z.
///
/// `default_height` is returned for an empty profile; when `z` lies at
/// or beyond the last key-point the last height is used.
pub fn profile_height_at(profile: &[CoordF], z: CoordF, default_height: CoordF) -> CoordF {
    let mut height = default_height;
    let mut i = 0;
    while i < profile.len() {
        if i + 2 == profile.len() {
            height = profile[i + 1];
            break;
        } else if profile[i + 2] > z {
            let z1 = profile[i];
            let h1 = profile[i + 1];
            let z2 = profile[i + 2];
            let h2 = profile[i + 3];
            height = lerp(h1, h2, (z - z1) / (z2 - z1));
            break;
        }
        i += 2;
    }
    height
}

/// Check the profile invariants against the given parameters: even
/// length with at least one segment, Z monotone starting at 0 and
/// ending at the object top, all heights within the layer height bounds.
pub fn profile_is_valid(slicing_params: &SlicingParameters, profile: &[CoordF]) -> bool {
    if profile.len() < 4 || profile.len() % 2 != 0 {
        return false;
    }
    if profile[0] != 0.0 {
        return false;
    }
    if (profile[profile.len() - 2] - slicing_params.object_print_z_height()).abs() > EPSILON {
        return false;
    }
    for i in (2..profile.len()).step_by(2) {
        if profile[i - 2] > profile[i] {
            return false;
        }
    }
    profile.iter().skip(1).step_by(2).all(|&h| {
        h > slicing_params.min_layer_height - EPSILON && h < slicing_params.max_layer_height + EPSILON
    })
}

/// A localized edit of the layer height profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerHeightEditAction {
    /// Thicken layers around the picked Z.
    Increase,
    /// Thin layers around the picked Z.
    Decrease,
    /// Steer layers around the picked Z back towards the regular height.
    Reduce,
    /// Average out height oscillations around the picked Z.
    Smooth,
}

/// Apply a localized edit to the layer height profile.
///
/// The edit is centred at `z`, affects a window of `band_width`
/// millimetres, and changes thickness by up to `layer_thickness_delta`,
/// weighted by a cosine falloff towards the window edges. Edits outside
/// the variable Z window, or that cannot change anything within the
/// layer height bounds, are silent no-ops.
pub fn adjust_layer_height_profile(
    slicing_params: &SlicingParameters,
    layer_height_profile: &mut LayerHeightProfile,
    z: CoordF,
    mut layer_thickness_delta: CoordF,
    band_width: CoordF,
    action: LayerHeightEditAction,
) {
    // Constrain the profile variability by the 1st layer height.
    let z_span_variable = (
        if slicing_params.first_object_layer_height_fixed() {
            slicing_params.first_object_layer_height
        } else {
            0.0
        },
        slicing_params.object_print_z_height(),
    );
    if z < z_span_variable.0 || z > z_span_variable.1 {
        trace!("layer height edit at z={z:.3} outside the variable window, ignored");
        return;
    }

    debug_assert!(layer_height_profile.len() >= 2);
    debug_assert!(
        (layer_height_profile[layer_height_profile.len() - 2]
            - slicing_params.object_print_z_height())
        .abs()
            < EPSILON
    );

    // 1) Get the current layer thickness at z.
    let current_layer_height =
        profile_height_at(layer_height_profile, z, slicing_params.layer_height);

    // 2) Is it possible to apply the delta?
    match action {
        LayerHeightEditAction::Increase | LayerHeightEditAction::Decrease => {
            if action == LayerHeightEditAction::Decrease {
                layer_thickness_delta = -layer_thickness_delta;
            }
            if layer_thickness_delta > 0.0 {
                if current_layer_height >= slicing_params.max_layer_height - EPSILON {
                    return;
                }
                layer_thickness_delta = layer_thickness_delta
                    .min(slicing_params.max_layer_height - current_layer_height);
            } else {
                if current_layer_height <= slicing_params.min_layer_height + EPSILON {
                    return;
                }
                layer_thickness_delta = layer_thickness_delta
                    .max(slicing_params.min_layer_height - current_layer_height);
            }
        }
        LayerHeightEditAction::Reduce | LayerHeightEditAction::Smooth => {
            layer_thickness_delta = layer_thickness_delta
                .abs()
                .min((slicing_params.layer_height - current_layer_height).abs());
            if layer_thickness_delta < EPSILON {
                return;
            }
        }
    }

    // 3) Densify the profile inside z +- band_width/2, removing
    //    duplicate Zs from the height profile inside the band.
    let lo = z_span_variable.0.max(z - 0.5 * band_width);
    // Do not limit the upper side of the band, so that modifications to
    // the top point of the profile stay possible.
    let hi = z + 0.5 * band_width;

    // Last key-point at or below the band bottom.
    let mut idx = 0;
    while idx + 2 < layer_height_profile.len() && layer_height_profile[idx + 2] <= lo {
        idx += 2;
    }

    let mut profile_new: LayerHeightProfile = Vec::with_capacity(layer_height_profile.len());
    profile_new.extend_from_slice(&layer_height_profile[..idx + 2]);
    let i_resampled_start = profile_new.len();
    let mut zz = lo;
    while zz < hi {
        let next = idx + 2;
        let z1 = layer_height_profile[idx];
        let h1 = layer_height_profile[idx + 1];
        let mut height = h1;
        if next < layer_height_profile.len() {
            let z2 = layer_height_profile[next];
            let h2 = layer_height_profile[next + 1];
            height = lerp(h1, h2, (zz - z1) / (z2 - z1));
        }
        // Adjust the height by the weighted delta.
        let weight = if (zz - z).abs() < 0.5 * band_width {
            0.5 + 0.5 * (2.0 * std::f64::consts::PI * (zz - z) / band_width).cos()
        } else {
            0.0
        };
        match action {
            LayerHeightEditAction::Increase | LayerHeightEditAction::Decrease => {
                height += weight * layer_thickness_delta;
            }
            LayerHeightEditAction::Reduce => {
                let delta = height - slicing_params.layer_height;
                let step = weight * layer_thickness_delta;
                let step = if delta.abs() > step {
                    if delta > 0.0 {
                        -step
                    } else {
                        step
                    }
                } else {
                    -delta
                };
                height += step;
            }
            LayerHeightEditAction::Smooth => {
                // The profile is not modified during resampling; the
                // averaging happens in the next step.
            }
        }
        height = height.clamp(slicing_params.min_layer_height, slicing_params.max_layer_height);
        if zz >= z_span_variable.1 {
            // This is the last point of the profile.
            if profile_new[profile_new.len() - 2] + EPSILON > zz {
                profile_new.truncate(profile_new.len() - 2);
            }
            profile_new.push(zz);
            profile_new.push(height);
            idx = layer_height_profile.len();
            break;
        }
        // Avoid entering a too short segment.
        if profile_new[profile_new.len() - 2] + EPSILON < zz {
            profile_new.push(zz);
            profile_new.push(height);
        }
        // Limit zz to the object height, so the last profile point gets
        // set on the next iteration.
        zz = (zz + Z_STEP).min(z_span_variable.1);
        idx = next;
        while idx < layer_height_profile.len() && layer_height_profile[idx] < zz {
            idx += 2;
        }
        idx -= 2;
    }

    idx += 2;
    let i_resampled_end = profile_new.len();
    if idx < layer_height_profile.len() {
        profile_new.extend_from_slice(&layer_height_profile[idx..]);
    } else if profile_new[profile_new.len() - 2] + 0.5 * EPSILON < z_span_variable.1 {
        profile_new.extend_from_slice(&layer_height_profile[layer_height_profile.len() - 2..]);
    }
    *layer_height_profile = profile_new;

    if action == LayerHeightEditAction::Smooth {
        let i_start = i_resampled_start.max(2);
        let mut i_end = i_resampled_end;
        if i_end == layer_height_profile.len() {
            i_end -= 2;
        }
        let n_rounds = 6;
        for _ in 0..n_rounds {
            let snapshot = layer_height_profile.clone();
            let mut i = i_start;
            while i < i_end {
                let zz = snapshot[i];
                let t = if (zz - z).abs() < 0.5 * band_width {
                    0.25 + 0.25 * (2.0 * std::f64::consts::PI * (zz - z) / band_width).cos()
                } else {
                    0.0
                };
                layer_height_profile[i + 1] = if i == 0 {
                    (1.0 - t) * snapshot[i + 1] + t * snapshot[i + 3]
                } else if i + 3 >= snapshot.len() {
                    (1.0 - t) * snapshot[i + 1] + t * snapshot[i - 1]
                } else {
                    (1.0 - t) * snapshot[i + 1] + 0.5 * t * (snapshot[i - 1] + snapshot[i + 3])
                };
                i += 2;
            }
        }
    }

    debug_assert!(layer_height_profile.len() > 2);
    debug_assert!(layer_height_profile.len() % 2 == 0);
    debug_assert!(layer_height_profile[0] == 0.0);
    debug_assert!(profile_is_valid(slicing_params, layer_height_profile));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FirstLayerHeight, PrintConfig, PrintObjectConfig};

    fn params(object_height: CoordF, first_layer_height: CoordF) -> SlicingParameters {
        let print_config = PrintConfig::default()
            .nozzle_diameter(vec![0.4])
            .min_layer_height(vec![0.1])
            .max_layer_height(vec![0.3]);
        let object_config = PrintObjectConfig::default()
            .layer_height(0.2)
            .first_layer_height(FirstLayerHeight::Absolute(first_layer_height));
        SlicingParameters::from_config(&print_config, &object_config, object_height, &[1]).unwrap()
    }

    fn ranges(list: &[(CoordF, CoordF, CoordF)]) -> LayerHeightRanges {
        let mut ranges = LayerHeightRanges::new();
        for &(lo, hi, height) in list {
            ranges.insert(LayerHeightRange::new(lo, hi, height).unwrap());
        }
        ranges
    }

    #[test]
    fn test_range_validation() {
        assert!(LayerHeightRange::new(1.0, 2.0, 0.1).is_ok());
        assert!(LayerHeightRange::new(2.0, 1.0, 0.1).is_err());
        assert!(LayerHeightRange::new(1.0, 1.0, 0.1).is_err());
        assert!(LayerHeightRange::new(1.0, 2.0, 0.0).is_err());
        assert!(LayerHeightRange::new(1.0, 2.0, -0.1).is_err());
        assert!(LayerHeightRange::new(CoordF::NAN, 2.0, 0.1).is_err());
    }

    #[test]
    fn test_ranges_kept_sorted() {
        let ranges = ranges(&[(3.0, 4.0, 0.1), (1.0, 2.0, 0.15), (1.0, 1.5, 0.25)]);
        let keys: Vec<(CoordF, CoordF)> = ranges.iter().map(|r| (r.lo, r.hi)).collect();
        assert_eq!(keys, vec![(1.0, 1.5), (1.0, 2.0), (3.0, 4.0)]);
    }

    #[test]
    fn test_flat_profile_without_ranges() {
        // First layer equals the regular height, so nothing is fixed.
        let params = params(10.0, 0.2);
        assert!(!params.first_object_layer_height_fixed());
        let profile = layer_height_profile_from_ranges(&params, &LayerHeightRanges::new());
        assert_eq!(profile, vec![0.0, 0.2, 10.0, 0.2]);
        assert!(profile_is_valid(&params, &profile));
    }

    #[test]
    fn test_fixed_first_layer_profile() {
        let params = params(1.5, 0.3);
        assert!(params.first_object_layer_height_fixed());
        let profile = layer_height_profile_from_ranges(&params, &LayerHeightRanges::new());
        // First layer plateau, then the regular height up to the top.
        assert_eq!(profile, vec![0.0, 0.3, 0.3, 0.3, 0.3, 0.2, 1.5, 0.2]);
        assert!(profile_is_valid(&params, &profile));
    }

    #[test]
    fn test_single_range_plateaus() {
        let params = params(5.0, 0.2);
        let profile = layer_height_profile_from_ranges(&params, &ranges(&[(1.0, 2.0, 0.1)]));
        assert!(profile_is_valid(&params, &profile));
        assert!((profile_height_at(&profile, 0.5, 0.0) - 0.2).abs() < 1e-9);
        assert!((profile_height_at(&profile, 1.5, 0.0) - 0.1).abs() < 1e-9);
        assert!((profile_height_at(&profile, 3.5, 0.0) - 0.2).abs() < 1e-9);
        // Plateau boundaries present as hard steps.
        assert_eq!(
            profile,
            vec![0.0, 0.2, 1.0, 0.2, 1.0, 0.1, 2.0, 0.1, 2.0, 0.2, 5.0, 0.2]
        );
    }

    #[test]
    fn test_overlapping_ranges_trimmed() {
        let params = params(5.0, 0.2);
        let profile = layer_height_profile_from_ranges(
            &params,
            &ranges(&[(1.0, 3.0, 0.1), (2.0, 4.0, 0.25)]),
        );
        assert!(profile_is_valid(&params, &profile));
        // The second range is trimmed to [3, 4].
        assert!((profile_height_at(&profile, 1.5, 0.0) - 0.1).abs() < 1e-9);
        assert!((profile_height_at(&profile, 2.5, 0.0) - 0.1).abs() < 1e-9);
        assert!((profile_height_at(&profile, 3.5, 0.0) - 0.25).abs() < 1e-9);
        assert!((profile_height_at(&profile, 4.5, 0.0) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_range_dropped() {
        let params = params(5.0, 0.2);
        // Fully covered by the first range; trimmed to nothing.
        let profile = layer_height_profile_from_ranges(
            &params,
            &ranges(&[(1.0, 3.0, 0.1), (2.0, 3.00001, 0.25)]),
        );
        assert!(profile_is_valid(&params, &profile));
        assert!((profile_height_at(&profile, 2.99, 0.0) - 0.1).abs() < 1e-9);
        assert!((profile_height_at(&profile, 3.5, 0.0) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_range_clamped_to_object_height() {
        let params = params(5.0, 0.2);
        let profile = layer_height_profile_from_ranges(&params, &ranges(&[(4.0, 9.0, 0.1)]));
        assert!(profile_is_valid(&params, &profile));
        assert_eq!(profile[profile.len() - 2], 5.0);
        assert!((profile_height_at(&profile, 4.5, 0.0) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_increase_edit_band() {
        let params = params(10.0, 0.2);
        let mut profile = layer_height_profile_from_ranges(&params, &LayerHeightRanges::new());
        adjust_layer_height_profile(
            &params,
            &mut profile,
            5.0,
            0.05,
            2.0,
            LayerHeightEditAction::Increase,
        );
        assert!(profile_is_valid(&params, &profile));
        // The centre is raised by the full delta.
        assert!((profile_height_at(&profile, 5.0, 0.0) - 0.25).abs() < 0.01);
        // Mid-band positions rise less than the centre.
        let at_4_5 = profile_height_at(&profile, 4.5, 0.0);
        assert!(at_4_5 > 0.2 + 1e-3);
        assert!(at_4_5 < profile_height_at(&profile, 5.0, 0.0));
        // Outside the band nothing changes.
        assert!((profile_height_at(&profile, 3.5, 0.0) - 0.2).abs() < 1e-9);
        assert!((profile_height_at(&profile, 6.5, 0.0) - 0.2).abs() < 1e-9);
        // Nothing dropped below the original height.
        for h in profile.iter().skip(1).step_by(2) {
            assert!(*h > 0.2 - 1e-9);
            assert!(*h < 0.3 + 1e-9);
        }
    }

    #[test]
    fn test_decrease_edit_band() {
        let params = params(10.0, 0.2);
        let mut profile = layer_height_profile_from_ranges(&params, &LayerHeightRanges::new());
        adjust_layer_height_profile(
            &params,
            &mut profile,
            5.0,
            0.05,
            2.0,
            LayerHeightEditAction::Decrease,
        );
        assert!(profile_is_valid(&params, &profile));
        assert!((profile_height_at(&profile, 5.0, 0.0) - 0.15).abs() < 0.01);
        for h in profile.iter().skip(1).step_by(2) {
            assert!(*h < 0.2 + 1e-9);
            assert!(*h > 0.1 - 1e-9);
        }
    }

    #[test]
    fn test_edit_outside_window_is_noop() {
        let params = params(10.0, 0.3);
        let mut profile = layer_height_profile_from_ranges(&params, &LayerHeightRanges::new());
        let before = profile.clone();
        // Below the fixed first layer.
        adjust_layer_height_profile(
            &params,
            &mut profile,
            0.1,
            0.05,
            2.0,
            LayerHeightEditAction::Increase,
        );
        assert_eq!(profile, before);
        // Above the object top.
        adjust_layer_height_profile(
            &params,
            &mut profile,
            11.0,
            0.05,
            2.0,
            LayerHeightEditAction::Increase,
        );
        assert_eq!(profile, before);
    }

    #[test]
    fn test_increase_at_max_is_noop() {
        let params = params(10.0, 0.2);
        let mut profile = layer_height_profile_from_ranges(&params, &ranges(&[(0.0, 10.0, 0.3)]));
        let before = profile.clone();
        adjust_layer_height_profile(
            &params,
            &mut profile,
            5.0,
            0.05,
            2.0,
            LayerHeightEditAction::Increase,
        );
        assert_eq!(profile, before);
    }

    #[test]
    fn test_reduce_at_nominal_is_noop() {
        let params = params(10.0, 0.2);
        let mut profile = layer_height_profile_from_ranges(&params, &LayerHeightRanges::new());
        let before = profile.clone();
        adjust_layer_height_profile(
            &params,
            &mut profile,
            5.0,
            0.05,
            2.0,
            LayerHeightEditAction::Reduce,
        );
        assert_eq!(profile, before);
    }

    #[test]
    fn test_reduce_moves_towards_nominal() {
        let params = params(10.0, 0.2);
        let mut profile = layer_height_profile_from_ranges(&params, &LayerHeightRanges::new());
        adjust_layer_height_profile(
            &params,
            &mut profile,
            5.0,
            0.08,
            2.0,
            LayerHeightEditAction::Increase,
        );
        let raised = profile_height_at(&profile, 5.0, 0.0);
        assert!(raised > 0.25);
        adjust_layer_height_profile(
            &params,
            &mut profile,
            5.0,
            0.05,
            2.0,
            LayerHeightEditAction::Reduce,
        );
        assert!(profile_is_valid(&params, &profile));
        let reduced = profile_height_at(&profile, 5.0, 0.0);
        // Every adjusted height ends up closer to the regular height.
        assert!(reduced < raised);
        assert!(reduced > 0.2 - 1e-9);
    }

    #[test]
    fn test_edit_keeps_profile_ends() {
        let params = params(10.0, 0.2);
        let mut profile = layer_height_profile_from_ranges(&params, &LayerHeightRanges::new());
        adjust_layer_height_profile(
            &params,
            &mut profile,
            9.9,
            0.05,
            2.0,
            LayerHeightEditAction::Increase,
        );
        assert!(profile_is_valid(&params, &profile));
        assert_eq!(profile[0], 0.0);
        assert!((profile[profile.len() - 2] - 10.0).abs() < EPSILON);
        // The top key-point itself is editable.
        assert!(profile_height_at(&profile, 10.0, 0.0) > 0.2 + 1e-3);
    }

    #[test]
    fn test_edit_at_band_touching_profile_bottom() {
        let params = params(10.0, 0.2);
        let mut profile = layer_height_profile_from_ranges(&params, &LayerHeightRanges::new());
        // The band extends below z = 0; the seek must clamp at the first
        // key-point instead of running off the front of the profile.
        adjust_layer_height_profile(
            &params,
            &mut profile,
            0.3,
            0.05,
            2.0,
            LayerHeightEditAction::Increase,
        );
        assert!(profile_is_valid(&params, &profile));
        assert!(profile_height_at(&profile, 0.3, 0.0) > 0.2 + 1e-3);
    }

    #[test]
    fn test_smooth_reduces_oscillation() {
        let params = params(10.0, 0.2);
        // Build a profile carrying a spiky 0.1/0.3 oscillation over z in [4, 6].
        let mut profile: LayerHeightProfile = vec![0.0, 0.2];
        let mut z = 0.2;
        let mut spike = true;
        while z < 10.0 - 1e-9 {
            let h = if (4.0..6.0).contains(&z) {
                if spike {
                    0.3
                } else {
                    0.1
                }
            } else {
                0.2
            };
            spike = !spike;
            profile.push(z);
            profile.push(h);
            z += 0.2;
        }
        profile.push(10.0);
        profile.push(0.2);

        let window_heights = |profile: &[CoordF]| -> Vec<CoordF> {
            (0..profile.len())
                .step_by(2)
                .filter(|&i| profile[i] >= 4.0 && profile[i] <= 6.0)
                .map(|i| profile[i + 1])
                .collect()
        };
        let stddev = |values: &[CoordF]| -> CoordF {
            let mean = values.iter().sum::<CoordF>() / values.len() as CoordF;
            (values.iter().map(|v| (v - mean) * (v - mean)).sum::<CoordF>()
                / values.len() as CoordF)
                .sqrt()
        };

        let before = stddev(&window_heights(&profile));
        assert!(before > 0.05);
        adjust_layer_height_profile(
            &params,
            &mut profile,
            5.0,
            1.0,
            2.0,
            LayerHeightEditAction::Smooth,
        );
        assert!(profile_is_valid(&params, &profile));
        let after = stddev(&window_heights(&profile));
        assert!(
            after <= before * 0.5,
            "smoothing should halve the oscillation, got {before} -> {after}"
        );
        assert_eq!(profile[0], 0.0);
        assert!((profile[profile.len() - 2] - 10.0).abs() < EPSILON);
    }
}
