//! Layer height heatmap texture generation.
//!
//! Renders a layer sequence into a row-major RGBA grid colour-mapped by
//! layer height deviation from the regular height, with a cosine
//! intensity modulation that makes individual layer boundaries visible.

use super::{lerp, SlicingParameters};
use crate::{CoordF, Error, Result};

// ColorBrewer-style diverging palette, green through yellow to red.
// https://github.com/aschn/gnuplot-colorbrewer
const PALETTE: [[CoordF; 3]; 8] = [
    [0x1A as CoordF, 0x98 as CoordF, 0x50 as CoordF],
    [0x66 as CoordF, 0xBD as CoordF, 0x63 as CoordF],
    [0xA6 as CoordF, 0xD9 as CoordF, 0x6A as CoordF],
    [0xD9 as CoordF, 0xF1 as CoordF, 0xEB as CoordF],
    [0xFE as CoordF, 0xE6 as CoordF, 0xEB as CoordF],
    [0xFD as CoordF, 0xAE as CoordF, 0x61 as CoordF],
    [0xF4 as CoordF, 0x6D as CoordF, 0x43 as CoordF],
    [0xD7 as CoordF, 0x30 as CoordF, 0x27 as CoordF],
];

fn palette_color(h: CoordF, layer_height: CoordF, hscale: CoordF) -> (CoordF, CoordF, CoordF) {
    let idxf = (0.5 * hscale + (h - layer_height)) * (PALETTE.len() - 1) as CoordF / hscale;
    let idx1 = (idxf.floor() as isize).clamp(0, PALETTE.len() as isize - 1) as usize;
    let idx2 = (idx1 + 1).min(PALETTE.len() - 1);
    let t = idxf - idx1 as CoordF;
    let color1 = &PALETTE[idx1];
    let color2 = &PALETTE[idx2];
    (
        lerp(color1[0], color2[0], t),
        lerp(color1[1], color2[1], t),
        lerp(color1[2], color2[2], t),
    )
}

/// Fill a row-major RGBA grid (plus an optional half-resolution level
/// appended behind it) with a heatmap of the layer heights.
///
/// `layers` is the flat `[lo, hi, ...]` sequence produced by
/// [`generate_object_layers`](super::generate_object_layers). Returns
/// the number of cells of the full-resolution level.
pub fn generate_layer_height_texture(
    slicing_params: &SlicingParameters,
    layers: &[CoordF],
    data: &mut [u8],
    rows: usize,
    cols: usize,
    level_of_detail_2nd_level: bool,
) -> Result<usize> {
    if rows == 0 || cols < 2 {
        return Err(Error::Slicing(format!(
            "Layer height texture needs at least 1x2 cells, got {rows}x{cols}"
        )));
    }
    let lod0_size = rows * cols * 4;
    let lod1_size = if level_of_detail_2nd_level {
        (rows / 2) * (cols / 2) * 4
    } else {
        0
    };
    if data.len() < lod0_size + lod1_size {
        return Err(Error::Slicing(format!(
            "Layer height texture buffer too small: {} < {}",
            data.len(),
            lod0_size + lod1_size
        )));
    }
    let (lod0, lod1) = data.split_at_mut(lod0_size);

    let object_height = slicing_params.object_print_z_height();
    let ncells = ((cols - 1) * rows)
        .min((16.0 * object_height / slicing_params.min_layer_height).ceil() as usize);
    let cols1 = cols / 2;
    // The half-resolution level stores one cell less per row, so its
    // cell count is bounded by the addressable capacity, not ncells / 2.
    let ncells1 = if cols1 > 1 {
        (ncells / 2).min((rows / 2) * (cols1 - 1))
    } else {
        0
    };
    let z_to_cell = (ncells - 1) as CoordF / object_height;
    let cell_to_z = object_height / (ncells - 1) as CoordF;
    let z_to_cell1 = (ncells1.max(1) - 1) as CoordF / object_height;

    // Color scaling: full palette swing covers twice the larger height
    // deviation admitted by the bounds.
    let mut hscale = 2.0
        * (slicing_params.max_layer_height - slicing_params.layer_height)
            .max(slicing_params.layer_height - slicing_params.min_layer_height);
    if hscale == 0.0 {
        // All layers share one height; any scale avoids division by zero.
        hscale = slicing_params.layer_height;
    }

    for idx_layer in (0..layers.len()).step_by(2) {
        let lo = layers[idx_layer];
        let mut hi = layers[idx_layer + 1];
        let mid = 0.5 * (lo + hi);
        let h = hi - lo;
        hi = hi.min(object_height);

        let (r, g, b) = palette_color(h, slicing_params.layer_height, hscale);

        let cell_first = ((lo * z_to_cell).ceil().max(0.0) as usize).min(ncells - 1);
        let cell_last = ((hi * z_to_cell).floor().max(0.0) as usize).min(ncells - 1);
        for cell in cell_first..=cell_last {
            let z = cell_to_z * cell as CoordF;
            // Intensity profile visualizing the layer boundaries.
            let intensity = (std::f64::consts::PI * 0.7 * (mid - z) / h).cos();
            let row = cell / (cols - 1);
            let col = cell - row * (cols - 1);
            debug_assert!(row < rows);
            debug_assert!(col < cols);
            let offset = row * cols + col;
            write_cell(lod0, offset, intensity * r, intensity * g, intensity * b);
            if col == 0 && row > 0 {
                // Duplicate the first value in a row as the last value
                // of the preceding row.
                copy_cell(lod0, offset, offset - 1);
            }
        }

        if level_of_detail_2nd_level && ncells1 > 1 && cols1 > 1 {
            let cell_first = ((lo * z_to_cell1).ceil().max(0.0) as usize).min(ncells1 - 1);
            let cell_last = ((hi * z_to_cell1).floor().max(0.0) as usize).min(ncells1 - 1);
            for cell in cell_first..=cell_last {
                let row = cell / (cols1 - 1);
                let col = cell - row * (cols1 - 1);
                debug_assert!(row < rows / 2);
                debug_assert!(col < cols1);
                let offset = row * cols1 + col;
                write_cell(lod1, offset, r, g, b);
                if col == 0 && row > 0 {
                    copy_cell(lod1, offset, offset - 1);
                }
            }
        }
    }

    // Number of cells of the full-resolution level.
    Ok(ncells)
}

fn write_cell(plane: &mut [u8], cell_offset: usize, r: CoordF, g: CoordF, b: CoordF) {
    let ptr = &mut plane[cell_offset * 4..cell_offset * 4 + 4];
    ptr[0] = (r + 0.5).floor().clamp(0.0, 255.0) as u8;
    ptr[1] = (g + 0.5).floor().clamp(0.0, 255.0) as u8;
    ptr[2] = (b + 0.5).floor().clamp(0.0, 255.0) as u8;
    ptr[3] = 255;
}

fn copy_cell(plane: &mut [u8], from_offset: usize, to_offset: usize) {
    let (a, b) = (from_offset * 4, to_offset * 4);
    for i in 0..4 {
        plane[b + i] = plane[a + i];
    }
}
