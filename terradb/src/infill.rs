//! Coastal missing-data repair.
//!
//! Survey providers frequently mark open water as void rather than zero
//! elevation, which would otherwise knock out entire cells along a
//! coastline. When a grid looks coastal (it has voids *and* a large number
//! of exact-zero samples), isolated voids whose whole neighborhood sits at
//! sea level are filled with zero. Voids adjoining real terrain are left
//! alone and propagate to whole-cell no-data flags downstream.

use std::ops::RangeInclusive;

use crate::grid::{ElevationGrid, NO_DATA};

/// Default zero-sample count above which a grid is treated as coastal.
pub const DEFAULT_ZERO_COUNT_THRESHOLD: u32 = 1000;

/// Default elevation band treated as "sea level" when judging neighbors.
///
/// Slightly negative values are common in ocean survey data.
pub const DEFAULT_NEAR_SEA_BAND: RangeInclusive<i16> = -5..=0;

/// Replace isolated sea-level voids with zero elevation, in place.
///
/// Runs only when the grid contains at least one void sample and its
/// zero-elevation count exceeds `zero_count_threshold`; otherwise the grid
/// is left untouched. A void sample is replaced when all 8 of its neighbors
/// are themselves void or inside `near_sea`.
///
/// This is a single pass over every sample except the outermost margin
/// ring (so the neighbor probes never leave the buffer). Replacement is not
/// iterative: a void region adjoining real terrain stays void no matter how
/// much of it borders the sea.
///
/// Returns the number of samples replaced.
pub fn repair_coastal(
    grid: &mut ElevationGrid,
    near_sea: &RangeInclusive<i16>,
    zero_count_threshold: u32,
) -> u32 {
    if !grid.has_no_data() || grid.zero_count() <= zero_count_threshold {
        return 0;
    }

    let mut replaced = 0u32;
    for row in (ElevationGrid::MIN_COORD + 1)..ElevationGrid::MAX_COORD {
        for col in (ElevationGrid::MIN_COORD + 1)..ElevationGrid::MAX_COORD {
            if grid.get(row, col) != NO_DATA {
                continue;
            }

            let mut all_sea = true;
            'probe: for dr in -1..=1i32 {
                for dc in -1..=1i32 {
                    if dr == 0 && dc == 0 {
                        continue;
                    }
                    let n = grid.get(row + dr, col + dc);
                    if n != NO_DATA && !near_sea.contains(&n) {
                        all_sea = false;
                        break 'probe;
                    }
                }
            }

            if all_sea {
                grid.set(row, col, 0);
                replaced += 1;
            }
        }
    }
    replaced
}
