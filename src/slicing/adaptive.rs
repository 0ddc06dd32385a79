//! Adaptive layer height computation from mesh curvature.
//!
//! The adaptive profile builder bounds the chordal ("cusp") error of the
//! stairstep approximation: for every facet crossing a candidate layer,
//! the perpendicular distance from the facet to the extrusion chord must
//! stay below the cusp tolerance. Shallow facets (normal close to the Z
//! axis) force thin layers; vertical walls allow the maximum height.

use super::{LayerHeightProfile, LayerHeightRanges, SlicingParameters};
use crate::mesh::TriangleMesh;
use crate::{CoordF, EPSILON};
use log::debug;

/// Default cusp tolerance: the maximum allowed distance from a corner of
/// a rectangular extrusion to the chordal line (mm).
pub const DEFAULT_CUSP_VALUE: CoordF = 0.2;

/// Stand-in cusp height for facets with no Z slope.
const UNLIMITED_HEIGHT: CoordF = 9999.0;

/// Capability consumed by the adaptive profile builder: the maximum
/// layer height starting at a given Z that keeps the chordal error of
/// every crossed facet below the cusp tolerance.
///
/// `current_facet` is an acceleration hint; callers pass the value
/// written by the previous query and the oracle keeps it non-decreasing
/// across calls with increasing `z`.
pub trait CuspHeightOracle {
    /// Store the layer height limits to report against.
    fn set_slicing_parameters(&mut self, params: &SlicingParameters);

    /// Register an object mesh. Modifier meshes must not be added.
    fn add_mesh(&mut self, mesh: &TriangleMesh);

    /// Build acceleration structures; must be called after the last
    /// `add_mesh` and before the first query.
    fn prepare(&mut self);

    /// Maximum layer height for a layer starting at `z`.
    fn cusp_height(&self, z: CoordF, cusp_value: CoordF, current_facet: &mut usize) -> CoordF;
}

/// A facet projected to the data the oracle queries: its Z span and the
/// Z component of its unit normal.
#[derive(Clone, Copy, Debug)]
struct FaceZ {
    z_span: (CoordF, CoordF),
    normal_z: CoordF,
}

/// The concrete cusp-height oracle: facets of all registered meshes,
/// ordered by their Z span.
///
/// After [`prepare`](CuspHeightOracle::prepare) the oracle is logically
/// immutable and queries are pure functions of `(z, cusp_value)` plus
/// the facet hint.
#[derive(Clone, Debug, Default)]
pub struct AdaptiveSlicing {
    min_layer_height: CoordF,
    max_layer_height: CoordF,
    object_print_z_height: CoordF,
    faces: Vec<FaceZ>,
}

impl AdaptiveSlicing {
    /// Create an empty oracle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance from `z` up to the next facet lying flat, as a dormant
    /// hook for matching layer boundaries to horizontal surfaces.
    /// Returns at most the maximum layer height, limited by the object
    /// top.
    pub fn horizontal_facet_distance(&self, z: CoordF) -> CoordF {
        for face in &self.faces {
            if face.z_span.0 > z + self.max_layer_height {
                break;
            }
            if face.z_span.0 > z && face.normal_z > 0.999 {
                return face.z_span.0 - z;
            }
        }
        if z + self.max_layer_height > self.object_print_z_height {
            (self.object_print_z_height - z).max(0.0)
        } else {
            self.max_layer_height
        }
    }
}

impl CuspHeightOracle for AdaptiveSlicing {
    fn set_slicing_parameters(&mut self, params: &SlicingParameters) {
        self.min_layer_height = params.min_layer_height;
        self.max_layer_height = params.max_layer_height;
        self.object_print_z_height = params.object_print_z_height();
    }

    fn add_mesh(&mut self, mesh: &TriangleMesh) {
        self.faces.extend(mesh.triangles().iter().map(|t| FaceZ {
            z_span: t.z_span(),
            normal_z: t.normal().z,
        }));
    }

    fn prepare(&mut self) {
        self.faces.sort_by(|a, b| {
            a.z_span
                .0
                .total_cmp(&b.z_span.0)
                .then(a.z_span.1.total_cmp(&b.z_span.1))
        });
        debug!("adaptive slicing prepared with {} facets", self.faces.len());
    }

    fn cusp_height(&self, z: CoordF, cusp_value: CoordF, current_facet: &mut usize) -> CoordF {
        let mut height = self.max_layer_height;
        let mut first_hit = false;

        // Facets whose span crosses the slice plane bound the height by
        // their slope.
        let mut ordered_id = *current_facet;
        while ordered_id < self.faces.len() {
            let face = &self.faces[ordered_id];
            // Facet starts above the slice plane; the rest is for the
            // in-layer scan below.
            if face.z_span.0 >= z {
                break;
            }
            if face.z_span.1 > z {
                if !first_hit {
                    first_hit = true;
                    *current_facet = ordered_id;
                }
                // Skip touching facets which could otherwise cause
                // unnecessarily small cusp values.
                if face.z_span.1 > z + EPSILON {
                    height = height.min(if face.normal_z == 0.0 {
                        UNLIMITED_HEIGHT
                    } else {
                        (cusp_value / face.normal_z).abs()
                    });
                }
            }
            ordered_id += 1;
        }

        // Lower limit due to printer capabilities.
        height = height.max(self.min_layer_height);

        // Check for facets starting inside the candidate layer and
        // correct the height if necessary.
        if height > self.min_layer_height {
            while ordered_id < self.faces.len() {
                let face = &self.faces[ordered_id];
                if face.z_span.0 >= z + height {
                    break;
                }
                if face.z_span.1 > z + EPSILON {
                    let z_diff = face.z_span.0 - z;
                    if face.normal_z > 0.999 {
                        // A near-horizontal facet ahead; stop the layer
                        // right below it.
                        height = z_diff;
                    } else {
                        let cusp = if face.normal_z == 0.0 {
                            UNLIMITED_HEIGHT
                        } else {
                            (cusp_value / face.normal_z).abs()
                        };
                        if cusp > z_diff {
                            if cusp < height {
                                height = cusp;
                            }
                        } else {
                            height = z_diff;
                        }
                    }
                }
                ordered_id += 1;
            }
            height = height.max(self.min_layer_height);
        }

        height
    }
}

/// Build a layer height profile ensuring a prescribed maximum cusp
/// height, using the default cusp tolerance.
///
/// Custom layer height ranges are accepted for interface parity but are
/// not applied by the adaptive path.
pub fn layer_height_profile_adaptive(
    slicing_params: &SlicingParameters,
    layer_height_ranges: &LayerHeightRanges,
    meshes: &[TriangleMesh],
) -> LayerHeightProfile {
    layer_height_profile_adaptive_with_cusp(
        slicing_params,
        layer_height_ranges,
        meshes,
        DEFAULT_CUSP_VALUE,
    )
}

/// Build a layer height profile ensuring the given maximum cusp height.
pub fn layer_height_profile_adaptive_with_cusp(
    slicing_params: &SlicingParameters,
    _layer_height_ranges: &LayerHeightRanges,
    meshes: &[TriangleMesh],
    cusp_value: CoordF,
) -> LayerHeightProfile {
    // 1) Initialize the oracle with the object meshes.
    let mut oracle = AdaptiveSlicing::new();
    oracle.set_slicing_parameters(slicing_params);
    for mesh in meshes {
        oracle.add_mesh(mesh);
    }
    oracle.prepare();

    // 2) Walk the object bottom to top, each step as tall as the cusp
    //    tolerance allows.
    let object_print_z_height = slicing_params.object_print_z_height();
    let mut profile: LayerHeightProfile = Vec::new();
    profile.push(0.0);
    profile.push(slicing_params.first_object_layer_height);
    if slicing_params.first_object_layer_height_fixed() {
        profile.push(slicing_params.first_object_layer_height);
        profile.push(slicing_params.first_object_layer_height);
    }
    let mut slice_z = slicing_params.first_object_layer_height;
    let mut height = slicing_params.first_object_layer_height;
    let mut current_facet = 0;
    while slice_z - height <= object_print_z_height {
        let cusp_height = oracle.cusp_height(slice_z, cusp_value, &mut current_facet);
        height = cusp_height.clamp(
            slicing_params.min_layer_height,
            slicing_params.max_layer_height,
        );
        // Key-points past the object top are snapped to it; the walk
        // itself keeps advancing so the loop terminates.
        profile.push(slice_z.min(object_print_z_height));
        profile.push(height);
        slice_z += height;
        profile.push(slice_z.min(object_print_z_height));
        profile.push(height);
    }

    // 3) Close with a plateau at the first object layer height so the
    //    profile ends exactly at the object top.
    let last = slicing_params
        .first_object_layer_height
        .max(profile[profile.len() - 2])
        .min(object_print_z_height);
    profile.push(last);
    profile.push(slicing_params.first_object_layer_height);
    profile.push(object_print_z_height);
    profile.push(slicing_params.first_object_layer_height);

    debug!(
        "adaptive profile: {} key-points over {:.3}mm",
        profile.len() / 2,
        object_print_z_height
    );
    profile
}
