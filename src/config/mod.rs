//! Configuration types consumed by the slicing core.
//!
//! This module provides the read-only projection of printer and object
//! configuration that the slicing parameter builder works from:
//! - [`PrintConfig`] - per-printer settings (per-extruder nozzle and
//!   layer-height tables)
//! - [`PrintObjectConfig`] - per-object settings (layer heights, raft,
//!   support)

mod print_config;

pub use print_config::{FirstLayerHeight, PrintConfig, PrintObjectConfig};
