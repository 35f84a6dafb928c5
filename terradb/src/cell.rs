//! Cell extraction.
//!
//! Each block is tiled by an 8×8 lattice of cells. Adjacent cells share one
//! row/column of samples so the query engine can interpolate across cell
//! edges without touching a second record.

use crate::grid::{ElevationGrid, NO_DATA, POINTS_PER_DEGREE};

/// Cells along each side of a block.
pub const CELLS_PER_SIDE: usize = 8;

/// Cells per block.
pub const CELL_COUNT: usize = CELLS_PER_SIDE * CELLS_PER_SIDE;

/// Grid rows/columns between the origins of adjacent cells.
pub const CELL_STEP: usize = POINTS_PER_DEGREE / CELLS_PER_SIDE;

/// Rows/columns per cell, including the 1-sample halo shared with neighbors.
pub const CELL_POINTS: usize = CELL_STEP + 1;

/// Samples per cell.
pub const CELL_SAMPLES: usize = CELL_POINTS * CELL_POINTS;

/// Grid origin (south-east sample) of cell `cell` within its block.
#[inline]
pub fn cell_origin(cell: usize) -> (i32, i32) {
    debug_assert!(cell < CELL_COUNT);
    let row = (cell / CELLS_PER_SIDE * CELL_STEP) as i32;
    let col = (cell % CELLS_PER_SIDE * CELL_STEP) as i32;
    (row, col)
}

/// Copy cell `cell` out of `grid` into `out` in record sample order:
/// row-major, south to north, east to west.
///
/// Returns `false` (with `out` cleared) the moment a [`NO_DATA`] sample is
/// seen; downstream code relies on a cell being either fully valid or
/// entirely absent, never partially missing.
pub fn extract(grid: &ElevationGrid, cell: usize, out: &mut Vec<i16>) -> bool {
    let (row0, col0) = cell_origin(cell);
    out.clear();

    for row in row0..row0 + CELL_POINTS as i32 {
        for col in col0..col0 + CELL_POINTS as i32 {
            let v = grid.get(row, col);
            if v == NO_DATA {
                out.clear();
                return false;
            }
            out.push(v);
        }
    }
    true
}
