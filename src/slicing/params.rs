//! Slicing parameters derived from printer and object configuration.
//!
//! [`SlicingParameters`] is the immutable record every other part of the
//! slicing core works from: nominal and bounded layer heights, first
//! layer heights, raft geometry and the object's print Z span.

use crate::config::{PrintConfig, PrintObjectConfig};
use crate::{CoordF, Error, Result, EPSILON};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard lower bound on any layer height (mm).
pub const MIN_LAYER_HEIGHT: CoordF = 0.01;

/// Minimum layer height used when the per-extruder limit is unset (mm).
pub const MIN_LAYER_HEIGHT_DEFAULT: CoordF = 0.07;

/// Minimum layer height for the variable layer height algorithm.
fn min_layer_height_from_nozzle(print_config: &PrintConfig, idx_nozzle: u32) -> CoordF {
    let min_layer_height = print_config.min_layer_height_at(idx_nozzle);
    if min_layer_height == 0.0 {
        MIN_LAYER_HEIGHT_DEFAULT
    } else {
        min_layer_height.max(MIN_LAYER_HEIGHT)
    }
}

/// Maximum layer height for the variable layer height algorithm, 3/4 of
/// a nozzle diameter by default; never smaller than the minimum layer
/// height of the same nozzle.
fn max_layer_height_from_nozzle(print_config: &PrintConfig, idx_nozzle: u32) -> CoordF {
    let min_layer_height = min_layer_height_from_nozzle(print_config, idx_nozzle);
    let max_layer_height = print_config.max_layer_height_at(idx_nozzle);
    let nozzle_dmr = print_config.nozzle_diameter_at(idx_nozzle);
    min_layer_height.max(if max_layer_height == 0.0 {
        0.75 * nozzle_dmr
    } else {
        max_layer_height
    })
}

/// Parameters controlling layering of a single print object.
///
/// Built once per slicing pass by [`SlicingParameters::from_config`] and
/// treated as immutable afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlicingParameters {
    /// Regular layer height (mm).
    pub layer_height: CoordF,
    /// Minimum layer height over all extruders involved (mm).
    pub min_layer_height: CoordF,
    /// Maximum layer height over all extruders involved (mm).
    pub max_layer_height: CoordF,
    /// Maximum layer height for support layers (mm); 0 when support is off.
    pub max_support_layer_height: CoordF,

    /// Height of the very first printed layer, raft or object (mm).
    pub first_print_layer_height: CoordF,
    /// Height of the first object layer above any raft (mm); equals
    /// `first_print_layer_height` when there is no raft.
    pub first_object_layer_height: CoordF,
    /// Whether the first object layer is printed with a bridging flow
    /// over a non-soluble raft.
    pub first_object_layer_bridging: bool,

    /// Number of raft base layers.
    pub base_raft_layers: usize,
    /// Number of raft interface layers, including the contact layer.
    pub interface_raft_layers: usize,
    /// Height of raft base layers (mm).
    pub base_raft_layer_height: CoordF,
    /// Height of raft interface layers (mm).
    pub interface_raft_layer_height: CoordF,
    /// Height of the raft contact layer (mm).
    pub contact_raft_layer_height: CoordF,
    /// Whether the raft contact layer uses a bridging flow.
    pub contact_raft_layer_height_bridging: bool,

    /// Top Z of the raft base stratum (mm).
    pub raft_base_top_z: CoordF,
    /// Top Z of the raft interface stratum (mm).
    pub raft_interface_top_z: CoordF,
    /// Top Z of the raft contact layer (mm).
    pub raft_contact_top_z: CoordF,

    /// Air gap between the raft top and the object (mm).
    pub gap_raft_object: CoordF,
    /// Air gap between the object top and support above it (mm).
    pub gap_object_support: CoordF,
    /// Air gap between support and the object above it (mm).
    pub gap_support_object: CoordF,
    /// Whether the support interface is soluble (zero contact distance).
    pub soluble_interface: bool,

    /// Bottom Z of the object portion of the print (mm).
    pub object_print_z_min: CoordF,
    /// Top Z of the object portion of the print (mm).
    pub object_print_z_max: CoordF,
}

impl SlicingParameters {
    /// Derive slicing parameters from configuration.
    ///
    /// `object_extruders` lists the 1-based extruder indices the object
    /// prints with; an empty list falls back to the active nozzle.
    pub fn from_config(
        print_config: &PrintConfig,
        object_config: &PrintObjectConfig,
        object_height: CoordF,
        object_extruders: &[u32],
    ) -> Result<Self> {
        print_config.validate().map_err(Error::Config)?;
        object_config.validate().map_err(Error::Config)?;
        if !(object_height > 0.0) {
            return Err(Error::Slicing(format!(
                "Object height must be positive, got {object_height}"
            )));
        }

        let first_layer_height = if object_config.first_layer_height.raw_value() <= 0.0 {
            object_config.layer_height
        } else {
            object_config
                .first_layer_height
                .get_abs_value(object_config.layer_height)
        };

        // Support extruder 0 means "no tool change, use the active
        // nozzle"; the table lookup wraps to the 0th diameter then.
        let support_material_extruder_dmr =
            print_config.nozzle_diameter_at(object_config.support_material_extruder);
        let support_material_interface_extruder_dmr =
            print_config.nozzle_diameter_at(object_config.support_material_interface_extruder);
        let soluble_interface = object_config.support_material_contact_distance == 0.0;

        let mut params = SlicingParameters {
            layer_height: object_config.layer_height,
            first_print_layer_height: first_layer_height,
            first_object_layer_height: first_layer_height,
            object_print_z_min: 0.0,
            object_print_z_max: object_height,
            base_raft_layers: object_config.raft_layers as usize,
            soluble_interface,
            ..Default::default()
        };

        // Intersection of the per-extruder layer height limits.
        params.min_layer_height = MIN_LAYER_HEIGHT;
        params.max_layer_height = CoordF::MAX;
        if object_config.support_material || params.base_raft_layers > 0 {
            // Some form of support; its extruders constrain the limits too.
            params.min_layer_height =
                min_layer_height_from_nozzle(print_config, object_config.support_material_extruder)
                    .max(min_layer_height_from_nozzle(
                        print_config,
                        object_config.support_material_interface_extruder,
                    ));
            params.max_layer_height =
                max_layer_height_from_nozzle(print_config, object_config.support_material_extruder)
                    .min(max_layer_height_from_nozzle(
                        print_config,
                        object_config.support_material_interface_extruder,
                    ));
            params.max_support_layer_height = params.max_layer_height;
        }
        if object_extruders.is_empty() {
            params.min_layer_height = params
                .min_layer_height
                .max(min_layer_height_from_nozzle(print_config, 0));
            params.max_layer_height = params
                .max_layer_height
                .min(max_layer_height_from_nozzle(print_config, 0));
        } else {
            for &extruder_id in object_extruders {
                params.min_layer_height = params
                    .min_layer_height
                    .max(min_layer_height_from_nozzle(print_config, extruder_id));
                params.max_layer_height = params
                    .max_layer_height
                    .min(max_layer_height_from_nozzle(print_config, extruder_id));
            }
        }
        params.min_layer_height = params.min_layer_height.min(params.layer_height);
        params.max_layer_height = params.max_layer_height.max(params.layer_height);

        if !soluble_interface {
            params.gap_raft_object = object_config.support_material_contact_distance;
            params.gap_object_support = object_config.support_material_contact_distance;
            params.gap_support_object = object_config.support_material_contact_distance;
        }

        if params.base_raft_layers > 0 {
            params.interface_raft_layers = (params.base_raft_layers + 1) / 2;
            params.base_raft_layers -= params.interface_raft_layers;
            // Use as large as possible layer height for the intermediate raft layers.
            params.base_raft_layer_height = params
                .layer_height
                .max(0.75 * support_material_extruder_dmr);
            params.interface_raft_layer_height = params
                .layer_height
                .max(0.75 * support_material_interface_extruder_dmr);
            params.contact_raft_layer_height = params
                .layer_height
                .max(0.75 * support_material_interface_extruder_dmr);
            params.contact_raft_layer_height_bridging = false;
            params.first_object_layer_bridging = false;
            if !soluble_interface {
                // The 1st object layer is printed with a bridging flow
                // over the full raft; its height comes from the average
                // nozzle diameter of the object's extruders.
                let mut average_object_extruder_dmr = 0.0;
                if !object_extruders.is_empty() {
                    for &extruder_id in object_extruders {
                        average_object_extruder_dmr +=
                            print_config.nozzle_diameter_at(extruder_id);
                    }
                    average_object_extruder_dmr /= object_extruders.len() as CoordF;
                }
                params.first_object_layer_height = average_object_extruder_dmr;
                params.first_object_layer_bridging = true;
            }
        }

        if params.has_raft() {
            if params.raft_layers() == 1 {
                // There is only the contact layer.
                params.contact_raft_layer_height = first_layer_height;
                params.raft_contact_top_z = first_layer_height;
            } else {
                debug_assert!(params.base_raft_layers > 0);
                debug_assert!(params.interface_raft_layers > 0);
                // Number of the base raft layers is decreased by the first layer.
                params.raft_base_top_z = first_layer_height
                    + (params.base_raft_layers - 1) as CoordF * params.base_raft_layer_height;
                // Number of the interface raft layers is decreased by the contact layer.
                params.raft_interface_top_z = params.raft_base_top_z
                    + (params.interface_raft_layers - 1) as CoordF
                        * params.interface_raft_layer_height;
                params.raft_contact_top_z =
                    params.raft_interface_top_z + params.contact_raft_layer_height;
            }
            // Raise the object by the raft thickness plus the air gap.
            let print_z = params.raft_contact_top_z + params.gap_raft_object;
            params.object_print_z_min = print_z;
            params.object_print_z_max += print_z;
            debug!(
                "raft: {} base + {} interface layers, contact top at {:.3}mm, object lifted to {:.3}mm",
                params.base_raft_layers,
                params.interface_raft_layers,
                params.raft_contact_top_z,
                params.object_print_z_min
            );
        }

        debug!(
            "slicing parameters: layer height {:.3}mm in [{:.3}, {:.3}], first layer {:.3}mm",
            params.layer_height,
            params.min_layer_height,
            params.max_layer_height,
            params.first_print_layer_height
        );
        Ok(params)
    }

    /// Z height of the object portion of the print.
    pub fn object_print_z_height(&self) -> CoordF {
        self.object_print_z_max - self.object_print_z_min
    }

    /// Check if a raft is enabled.
    pub fn has_raft(&self) -> bool {
        self.raft_layers() > 0
    }

    /// Total number of raft layers.
    pub fn raft_layers(&self) -> usize {
        self.base_raft_layers + self.interface_raft_layers
    }

    /// Is the first object layer height fixed, or could it be varied?
    pub fn first_object_layer_height_fixed(&self) -> bool {
        self.has_raft() || (self.first_print_layer_height - self.layer_height).abs() > EPSILON
    }
}

impl Default for SlicingParameters {
    fn default() -> Self {
        Self {
            layer_height: 0.2,
            min_layer_height: MIN_LAYER_HEIGHT_DEFAULT,
            max_layer_height: 0.3,
            max_support_layer_height: 0.0,
            first_print_layer_height: 0.2,
            first_object_layer_height: 0.2,
            first_object_layer_bridging: false,
            base_raft_layers: 0,
            interface_raft_layers: 0,
            base_raft_layer_height: 0.0,
            interface_raft_layer_height: 0.0,
            contact_raft_layer_height: 0.0,
            contact_raft_layer_height_bridging: false,
            raft_base_top_z: 0.0,
            raft_interface_top_z: 0.0,
            raft_contact_top_z: 0.0,
            gap_raft_object: 0.0,
            gap_object_support: 0.0,
            gap_support_object: 0.0,
            soluble_interface: true,
            object_print_z_min: 0.0,
            object_print_z_max: 0.0,
        }
    }
}

impl fmt::Display for SlicingParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SlicingParameters(layer_height={:.3}mm in [{:.3}, {:.3}], first_layer={:.3}mm, raft_layers={}, object_z=[{:.3}, {:.3}])",
            self.layer_height,
            self.min_layer_height,
            self.max_layer_height,
            self.first_print_layer_height,
            self.raft_layers(),
            self.object_print_z_min,
            self.object_print_z_max
        )
    }
}

/// Check if two slicing parameter sets produce the same layering.
pub fn equal_layering(sp1: &SlicingParameters, sp2: &SlicingParameters) -> bool {
    sp1.base_raft_layers == sp2.base_raft_layers
        && sp1.interface_raft_layers == sp2.interface_raft_layers
        && (sp1.base_raft_layer_height - sp2.base_raft_layer_height).abs() < 1e-6
        && (sp1.interface_raft_layer_height - sp2.interface_raft_layer_height).abs() < 1e-6
        && (sp1.contact_raft_layer_height - sp2.contact_raft_layer_height).abs() < 1e-6
        && (sp1.layer_height - sp2.layer_height).abs() < 1e-6
        && (sp1.min_layer_height - sp2.min_layer_height).abs() < 1e-6
        && (sp1.max_layer_height - sp2.max_layer_height).abs() < 1e-6
        && (sp1.first_print_layer_height - sp2.first_print_layer_height).abs() < 1e-6
        && (sp1.first_object_layer_height - sp2.first_object_layer_height).abs() < 1e-6
        && sp1.first_object_layer_bridging == sp2.first_object_layer_bridging
        && sp1.soluble_interface == sp2.soluble_interface
}
