//! Grid cells and their precomputed 3x3 neighbourhoods.
//!
//! Every cell knows the nine index deltas leading to itself and its eight
//! neighbours on the torus. Interior cells all share one array owned by the
//! grid; only cells on an edge carry their own wrapped copy. A neighbourhood
//! walk is then `cell.index() + offset` with no modulo and no bounds checks.

use crate::ObjectKey;

/// Number of offsets in a neighbourhood (3x3, self included)
pub const NEIGHBORHOOD_LEN: usize = 9;

/// The first `HALF_NEIGHBORHOOD_LEN` offsets point to one triangular half of
/// the neighbourhood (up-left, up, up-right, left). Visiting only those from
/// every cell covers each pair of adjacent cells exactly once.
pub const HALF_NEIGHBORHOOD_LEN: usize = 4;

/// Index of the cell itself inside a neighbourhood array
pub const SELF_OFFSET_SLOT: usize = 4;

/// Index deltas from a cell to its 3x3 neighbourhood
pub type Offsets = [isize; NEIGHBORHOOD_LEN];

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum NeighborOffsets {
    /// Use the grid's shared inner offsets
    Inner,
    /// Cell on an edge or corner, offsets wrap to the opposite side.
    /// Boxed so interior cells stay pointer-sized.
    Edge(Box<Offsets>),
}

/// Offsets of a cell that touches no edge, in `[up-left, up, up-right, left,
/// self, right, down-left, down, down-right]` order with y growing upwards.
pub(crate) fn inner_offsets(row_column_count: usize) -> Offsets {
    let wh = row_column_count as isize;
    [wh - 1, wh, wh + 1, -1, 0, 1, -1 - wh, -wh, -wh + 1]
}

/// Neighbour offsets of the cell at `index`, wrapping at the grid edges
pub(crate) fn neighbor_offsets(index: usize, row_column_count: usize) -> NeighborOffsets {
    let wh = row_column_count as isize;
    let cell_count = wh * wh;
    let x = index % row_column_count;
    let y = index / row_column_count;

    let on_right = x + 1 == row_column_count;
    let on_left = x == 0;
    let on_top = y + 1 == row_column_count;
    let on_bottom = y == 0;

    if !(on_right || on_left || on_top || on_bottom) {
        return NeighborOffsets::Inner;
    }

    let right = if on_right { 1 - wh } else { 1 };
    let left = if on_left { wh - 1 } else { -1 };
    let top = if on_top { wh - cell_count } else { wh };
    let bottom = if on_bottom { cell_count - wh } else { -wh };

    NeighborOffsets::Edge(Box::new([
        left + top,
        top,
        right + top,
        left,
        0,
        right,
        left + bottom,
        bottom,
        right + bottom,
    ]))
}

/// One bucket of a grid level
#[derive(Clone, Debug)]
pub struct Cell {
    pub(crate) objects: Vec<ObjectKey>,
    pub(crate) neighbors: NeighborOffsets,
    pub(crate) index: usize,
    /// Position in the grid's occupied list; `None` iff `objects` is empty
    pub(crate) occupied_index: Option<usize>,
}

impl Cell {
    pub(crate) fn new(index: usize, row_column_count: usize) -> Self {
        Self {
            objects: Vec::new(),
            neighbors: neighbor_offsets(index, row_column_count),
            index,
            occupied_index: None,
        }
    }

    /// Objects whose bounding-box origin hashes into this cell
    pub fn objects(&self) -> &[ObjectKey] {
        &self.objects
    }

    /// Position of this cell in its grid
    pub fn index(&self) -> usize {
        self.index
    }

    /// Position in the grid's list of non-empty cells
    pub fn occupied_index(&self) -> Option<usize> {
        self.occupied_index
    }

    /// True when no object hashes into this cell
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[inline]
    pub(crate) fn offsets<'a>(&'a self, shared_inner: &'a Offsets) -> &'a Offsets {
        match &self.neighbors {
            NeighborOffsets::Inner => shared_inner,
            NeighborOffsets::Edge(offsets) => offsets,
        }
    }

    /// Absolute index of the neighbour reached through `offset`
    #[inline]
    pub(crate) fn neighbor_index(&self, offset: isize) -> usize {
        (self.index as isize + offset) as usize
    }
}
