//! Axis-aligned bounding box used as the extent of every indexed object.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::MAX_OBJECT_SIZE;

/// Box structure: `min` is the lower-left corner, `max` the upper-right one.
///
/// Coordinates follow the same `(min_x, min_y, max_x, max_y)` order as the
/// constructor. A box with `min == max` is a point and is perfectly valid.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Lower-left corner `[x, y]`
    pub min: [f64; 2],
    /// Upper-right corner `[x, y]`
    pub max: [f64; 2],
}

impl Aabb {
    /// Creates a box from its corner coordinates
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min: [min_x, min_y], max: [max_x, max_y] }
    }

    /// Creates a box with the lower-left corner at `(x, y)`
    pub const fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Extent along x
    #[inline]
    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    /// Extent along y
    #[inline]
    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// Length of the longest edge; this is the "size" used to pick a grid level.
    #[inline]
    pub fn longest_edge(&self) -> f64 {
        self.width().max(self.height())
    }

    /// Returns false when a coordinate is not finite, `min > max` on
    /// either axis, or the longest edge exceeds [`MAX_OBJECT_SIZE`].
    ///
    /// The last case covers finite corners whose distance overflows, e.g.
    /// `-1e308..1e308`; no grid level could hold such a box.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.min.iter().chain(&self.max).all(|c| c.is_finite())
            && self.min[0] <= self.max[0]
            && self.min[1] <= self.max[1]
            && self.longest_edge() <= MAX_OBJECT_SIZE
    }

    /// Inclusive overlap test: touching edges count as overlapping.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.min[0] > other.max[0]
            || self.min[1] > other.max[1]
            || self.max[0] < other.min[0]
            || self.max[1] < other.min[1])
    }

    /// Returns the box moved by `(dx, dy)`
    #[inline]
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.min[0] + dx, self.min[1] + dy, self.max[0] + dx, self.max[1] + dy)
    }
}
