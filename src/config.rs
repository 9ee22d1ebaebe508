//! Tuning knobs of the hierarchy.
//!
//! The defaults are the values the hierarchy was designed around; most
//! simulations never need to touch them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{HshgError, Result};

/// Ratio between the cell sizes of two neighbouring grid levels
pub const HIERARCHY_FACTOR: f64 = 2.0;

/// Cell size of the very first grid, relative to the first object's size.
///
/// A cell of `size * sqrt(2)` holds the full diagonal of the object.
pub const HIERARCHY_FACTOR_SQRT: f64 = std::f64::consts::SQRT_2;

/// Default upper bound of objects per cell
pub const DEFAULT_MAX_OBJECT_CELL_DENSITY: f64 = 1.0 / 8.0;

/// Smallest accepted `max_object_cell_density`.
///
/// A single object already forces `1 / density` cells into its level, so
/// this bounds the memory one object can claim to 4096 cells.
pub const MIN_MAX_OBJECT_CELL_DENSITY: f64 = 1.0 / 4096.0;

/// 16 x 16 = 256 cells per freshly created grid level
pub const DEFAULT_INITIAL_ROW_COLUMN_COUNT: usize = 16;

/// Default size floor for point-like objects
pub const DEFAULT_MIN_OBJECT_SIZE: f64 = 1.0 / 1024.0;

/// Longest accepted edge of a bounding box.
///
/// Keeps every cell size finite: the first level is `size * sqrt(2)` and the
/// upward doubling walk stops below `2 * size`, both under `f64::MAX`.
pub const MAX_OBJECT_SIZE: f64 = f64::MAX / HIERARCHY_FACTOR;

/// How [`Hshg::update`](crate::Hshg::update) relocates objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum UpdateStrategy {
    /// Rehash every object in its current grid and move only those whose
    /// cell changed. Cheap when most objects stay in their cell.
    #[default]
    Recompute,
    /// Throw away every grid level and re-add all objects. Slower, but
    /// objects that grew or shrank land in the right level again.
    RemoveAll,
}

/// Configuration for a [`Hshg`](crate::Hshg)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HshgConfig {
    /// Upper bound of `objects / cells` in any grid level.
    ///
    /// Crossing it quadruples the cell count of that level and rehashes its
    /// objects. Lower = more memory, fewer hash collisions per cell.
    /// Higher = fewer expansions, more objects to test per cell.
    pub max_object_cell_density: f64,

    /// Rows (and columns) of a newly created grid level.
    ///
    /// Must be a power of two so hashing can mask instead of divide, and at
    /// least 4 so the 3x3 neighbourhood of a cell never wraps onto itself.
    pub initial_row_column_count: usize,

    /// Size assumed for objects smaller than this (world units).
    ///
    /// Keeps point-like objects from creating levels with zero-sized cells.
    pub min_object_size: f64,

    /// What [`Hshg::update`](crate::Hshg::update) does per call
    pub update_strategy: UpdateStrategy,
}

impl Default for HshgConfig {
    fn default() -> Self {
        Self {
            max_object_cell_density: DEFAULT_MAX_OBJECT_CELL_DENSITY,
            initial_row_column_count: DEFAULT_INITIAL_ROW_COLUMN_COUNT,
            min_object_size: DEFAULT_MIN_OBJECT_SIZE,
            update_strategy: UpdateStrategy::Recompute,
        }
    }
}

impl HshgConfig {
    /// Sets [`max_object_cell_density`](Self::max_object_cell_density)
    #[must_use]
    pub fn with_max_object_cell_density(mut self, density: f64) -> Self {
        self.max_object_cell_density = density;
        self
    }

    /// Sets [`initial_row_column_count`](Self::initial_row_column_count)
    #[must_use]
    pub fn with_initial_row_column_count(mut self, count: usize) -> Self {
        self.initial_row_column_count = count;
        self
    }

    /// Sets [`min_object_size`](Self::min_object_size)
    #[must_use]
    pub fn with_min_object_size(mut self, size: f64) -> Self {
        self.min_object_size = size;
        self
    }

    /// Sets [`update_strategy`](Self::update_strategy)
    #[must_use]
    pub fn with_update_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.update_strategy = strategy;
        self
    }

    /// Checks every field, returning the first problem found
    ///
    /// # Errors
    ///
    /// [`HshgError::InvalidConfiguration`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if !self.max_object_cell_density.is_finite() || self.max_object_cell_density <= 0.0 {
            return Err(HshgError::InvalidConfiguration {
                reason: "max_object_cell_density must be finite and positive",
            });
        }
        if self.max_object_cell_density < MIN_MAX_OBJECT_CELL_DENSITY {
            return Err(HshgError::InvalidConfiguration {
                reason: "max_object_cell_density must be at least 1/4096",
            });
        }
        if !self.initial_row_column_count.is_power_of_two() {
            return Err(HshgError::InvalidConfiguration {
                reason: "initial_row_column_count must be a power of two",
            });
        }
        if self.initial_row_column_count < 4 {
            return Err(HshgError::InvalidConfiguration {
                reason: "initial_row_column_count must be at least 4",
            });
        }
        if !self.min_object_size.is_finite() || self.min_object_size <= 0.0 {
            return Err(HshgError::InvalidConfiguration {
                reason: "min_object_size must be finite and positive",
            });
        }
        if self.min_object_size > MAX_OBJECT_SIZE {
            return Err(HshgError::InvalidConfiguration {
                reason: "min_object_size must not exceed MAX_OBJECT_SIZE",
            });
        }
        Ok(())
    }
}
