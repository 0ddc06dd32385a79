//! Print configuration types.
//!
//! This module provides the configuration projection consumed by the
//! slicing parameter builder, mirroring the PrintConfig / PrintObjectConfig
//! split of the reference slicers: printer-wide tables indexed by extruder
//! on one side, per-object layering and support settings on the other.

use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// First layer height given either in millimetres or as a percentage of
/// the regular layer height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum FirstLayerHeight {
    /// Absolute height (mm).
    Absolute(CoordF),
    /// Percentage of the regular layer height.
    Percent(CoordF),
}

impl FirstLayerHeight {
    /// The raw configured value, before resolving percentages.
    /// A value <= 0 means "use the regular layer height".
    pub fn raw_value(&self) -> CoordF {
        match *self {
            FirstLayerHeight::Absolute(v) => v,
            FirstLayerHeight::Percent(v) => v,
        }
    }

    /// Resolve to an absolute height, interpreting percentages relative
    /// to `base`.
    pub fn get_abs_value(&self, base: CoordF) -> CoordF {
        match *self {
            FirstLayerHeight::Absolute(v) => v,
            FirstLayerHeight::Percent(p) => base * p / 100.0,
        }
    }
}

impl Default for FirstLayerHeight {
    fn default() -> Self {
        FirstLayerHeight::Absolute(0.2)
    }
}

impl fmt::Display for FirstLayerHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FirstLayerHeight::Absolute(v) => write!(f, "{v:.3}mm"),
            FirstLayerHeight::Percent(p) => write!(f, "{p:.1}%"),
        }
    }
}

/// Printer-wide configuration: per-extruder tables.
///
/// Each table is indexed by a 0-based extruder slot. Lookups go through
/// the `*_at` accessors, which take the 1-based extruder numbering used
/// by object configuration (0 meaning "the active nozzle").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrintConfig {
    /// Nozzle diameter per extruder (mm).
    pub nozzle_diameter: Vec<CoordF>,
    /// Minimum layer height per extruder (mm); 0 selects the built-in default.
    pub min_layer_height: Vec<CoordF>,
    /// Maximum layer height per extruder (mm); 0 selects 3/4 of the nozzle diameter.
    pub max_layer_height: Vec<CoordF>,
}

impl PrintConfig {
    /// Create a new PrintConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the nozzle diameter table.
    pub fn nozzle_diameter(mut self, diameters: Vec<CoordF>) -> Self {
        self.nozzle_diameter = diameters;
        self
    }

    /// Builder method: set the minimum layer height table.
    pub fn min_layer_height(mut self, heights: Vec<CoordF>) -> Self {
        self.min_layer_height = heights;
        self
    }

    /// Builder method: set the maximum layer height table.
    pub fn max_layer_height(mut self, heights: Vec<CoordF>) -> Self {
        self.max_layer_height = heights;
        self
    }

    /// Nozzle diameter for a 1-based extruder index.
    ///
    /// Extruder 0 means "whichever nozzle is active" and resolves to the
    /// first table entry; all nozzles must then share one diameter for
    /// the result to be meaningful.
    pub fn nozzle_diameter_at(&self, extruder: u32) -> CoordF {
        Self::get_at(&self.nozzle_diameter, extruder)
    }

    /// Minimum layer height for a 1-based extruder index (0 = unset).
    pub fn min_layer_height_at(&self, extruder: u32) -> CoordF {
        Self::get_at(&self.min_layer_height, extruder)
    }

    /// Maximum layer height for a 1-based extruder index (0 = unset).
    pub fn max_layer_height_at(&self, extruder: u32) -> CoordF {
        Self::get_at(&self.max_layer_height, extruder)
    }

    // Out-of-range indices (including the extruder-0 wrap) fall back to
    // the first entry, so "no tool change" reads the active nozzle slot.
    fn get_at(values: &[CoordF], extruder: u32) -> CoordF {
        if values.is_empty() {
            return 0.0;
        }
        let idx = (extruder as usize).wrapping_sub(1);
        values.get(idx).copied().unwrap_or(values[0])
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.nozzle_diameter.is_empty() {
            return Err("Nozzle diameter table must not be empty".into());
        }
        if self.nozzle_diameter.iter().any(|&d| !(d > 0.0)) {
            return Err("Nozzle diameters must be positive".into());
        }
        if self.min_layer_height.iter().any(|&h| h < 0.0)
            || self.max_layer_height.iter().any(|&h| h < 0.0)
        {
            return Err("Layer height limits must not be negative".into());
        }
        Ok(())
    }
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            nozzle_diameter: vec![0.4],
            min_layer_height: vec![0.07],
            max_layer_height: vec![0.0],
        }
    }
}

/// Per-object configuration: layering, raft and support settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrintObjectConfig {
    /// Regular layer height (mm).
    pub layer_height: CoordF,
    /// First layer height; <= 0 means "use the regular layer height".
    pub first_layer_height: FirstLayerHeight,
    /// Number of raft layers requested (total, before the base/interface split).
    pub raft_layers: u32,
    /// Whether support material is generated for this object.
    pub support_material: bool,
    /// Extruder printing support material, 1-based; 0 = active nozzle.
    pub support_material_extruder: u32,
    /// Extruder printing the support interface, 1-based; 0 = active nozzle.
    pub support_material_interface_extruder: u32,
    /// Vertical clearance between support and object (mm); 0 = soluble interface.
    pub support_material_contact_distance: CoordF,
}

impl PrintObjectConfig {
    /// Create a new PrintObjectConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set layer height.
    pub fn layer_height(mut self, height: CoordF) -> Self {
        self.layer_height = height;
        self
    }

    /// Builder method: set first layer height.
    pub fn first_layer_height(mut self, height: FirstLayerHeight) -> Self {
        self.first_layer_height = height;
        self
    }

    /// Builder method: set the raft layer count.
    pub fn raft_layers(mut self, layers: u32) -> Self {
        self.raft_layers = layers;
        self
    }

    /// Builder method: enable/disable support material.
    pub fn support_material(mut self, enabled: bool) -> Self {
        self.support_material = enabled;
        self
    }

    /// Builder method: set the support contact distance.
    pub fn support_material_contact_distance(mut self, distance: CoordF) -> Self {
        self.support_material_contact_distance = distance;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.layer_height <= 0.0 {
            return Err("Layer height must be positive".into());
        }
        if self.support_material_contact_distance < 0.0 {
            return Err("Support contact distance must not be negative".into());
        }
        Ok(())
    }
}

impl Default for PrintObjectConfig {
    fn default() -> Self {
        Self {
            layer_height: 0.2,
            first_layer_height: FirstLayerHeight::default(),
            raft_layers: 0,
            support_material: false,
            support_material_extruder: 1,
            support_material_interface_extruder: 1,
            support_material_contact_distance: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_config_default_valid() {
        let config = PrintConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.nozzle_diameter_at(1) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_table_lookup_wraps_extruder_zero() {
        let config = PrintConfig::default().nozzle_diameter(vec![0.4, 0.6]);
        // Extruder 0 means "active nozzle" and reads the first slot.
        assert!((config.nozzle_diameter_at(0) - 0.4).abs() < 1e-6);
        assert!((config.nozzle_diameter_at(1) - 0.4).abs() < 1e-6);
        assert!((config.nozzle_diameter_at(2) - 0.6).abs() < 1e-6);
        // Out of range falls back to the first slot as well.
        assert!((config.nozzle_diameter_at(5) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_empty_table_reads_zero() {
        let config = PrintConfig::default().max_layer_height(vec![]);
        assert_eq!(config.max_layer_height_at(1), 0.0);
    }

    #[test]
    fn test_print_config_invalid() {
        let config = PrintConfig::default().nozzle_diameter(vec![]);
        assert!(config.validate().is_err());

        let config = PrintConfig::default().nozzle_diameter(vec![0.0]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_first_layer_height_resolution() {
        let absolute = FirstLayerHeight::Absolute(0.3);
        assert!((absolute.get_abs_value(0.2) - 0.3).abs() < 1e-6);

        let percent = FirstLayerHeight::Percent(150.0);
        assert!((percent.get_abs_value(0.2) - 0.3).abs() < 1e-6);
        assert!((percent.raw_value() - 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_object_config_builder() {
        let config = PrintObjectConfig::new()
            .layer_height(0.15)
            .raft_layers(3)
            .support_material(true);
        assert!((config.layer_height - 0.15).abs() < 1e-6);
        assert_eq!(config.raft_layers, 3);
        assert!(config.support_material);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_object_config_invalid() {
        let config = PrintObjectConfig::new().layer_height(0.0);
        assert!(config.validate().is_err());
    }
}
