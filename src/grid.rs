//! One level of the hierarchy: a torus-wrapped hash table of cells.
//!
//! The table is `row_column_count x row_column_count` cells, where the row
//! count is always a power of two so that hashing is a multiply, a truncation
//! and a mask. Points outside the nominal extent wrap around instead of being
//! clamped, so every coordinate maps to a valid cell without bounds checks.
//!
//! Insertion and removal are O(1): objects, occupied cells and the grid's own
//! object list all use swap-removal, with the moved element's stored slot
//! patched in place. When `objects / cells` crosses the configured density
//! the grid doubles its row count (four times the cells) and rehashes.

use slotmap::SlotMap;
use tracing::debug;

use crate::cell::{Cell, HALF_NEIGHBORHOOD_LEN, Offsets, inner_offsets};
use crate::hshg::{Entry, Placement};
use crate::{Collidable, ObjectKey};

slotmap::new_key_type! {
    /// Stable handle of a grid level, unaffected by level reordering
    pub struct GridKey;
}

/// One grid level: `row_column_count x row_column_count` cells of side
/// `cell_size`, wrapped into a torus
#[derive(Clone, Debug)]
pub struct Grid {
    key: GridKey,
    cell_size: f64,
    inverse_cell_size: f64,
    row_column_count: usize,
    xy_hash_mask: usize,
    max_density: f64,
    cells: Vec<Cell>,
    /// Indices of the non-empty cells, in no particular order
    occupied_cells: Vec<usize>,
    objects: Vec<ObjectKey>,
    shared_inner_offsets: Offsets,
}

impl Grid {
    pub(crate) fn new(key: GridKey, cell_size: f64, row_column_count: usize, max_density: f64) -> Self {
        debug_assert!(row_column_count.is_power_of_two(), "row count {row_column_count} is not a power of two");
        debug_assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell size {cell_size} must be finite and positive"
        );
        let mut grid = Self {
            key,
            cell_size,
            inverse_cell_size: 1.0 / cell_size,
            row_column_count,
            xy_hash_mask: row_column_count - 1,
            max_density,
            cells: Vec::new(),
            occupied_cells: Vec::new(),
            objects: Vec::new(),
            shared_inner_offsets: inner_offsets(row_column_count),
        };
        grid.init_cells();
        grid
    }

    /// Rebuilds every cell for the current row count. Drops all contents.
    fn init_cells(&mut self) {
        let row_column_count = self.row_column_count;
        self.shared_inner_offsets = inner_offsets(row_column_count);
        self.cells = (0..row_column_count * row_column_count)
            .map(|index| Cell::new(index, row_column_count))
            .collect();
        self.occupied_cells.clear();
    }

    /// Handle of this level inside the hierarchy
    pub fn key(&self) -> GridKey {
        self.key
    }

    /// Side length of one cell in world units
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Rows (and columns) of the table, always a power of two
    pub fn row_column_count(&self) -> usize {
        self.row_column_count
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of objects stored in this level
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// True when the level holds no object
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects per cell
    pub fn density(&self) -> f64 {
        self.objects.len() as f64 / self.cells.len() as f64
    }

    /// Density above which the level expands
    pub fn max_density(&self) -> f64 {
        self.max_density
    }

    /// Every object of this level, in swap-removal order
    pub fn objects(&self) -> &[ObjectKey] {
        &self.objects
    }

    /// All cells, indexed by hash
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at `hash`, `None` when out of range
    pub fn cell(&self, hash: usize) -> Option<&Cell> {
        self.cells.get(hash)
    }

    /// Number of non-empty cells
    pub fn occupied_cell_count(&self) -> usize {
        self.occupied_cells.len()
    }

    /// The non-empty cells
    pub fn occupied_cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.occupied_cells.iter().map(move |&index| &self.cells[index])
    }

    /// Maps a world-space point to the index of its cell.
    ///
    /// Negative coordinates are mirrored so that the cells on both sides of
    /// zero stay adjacent on the torus.
    #[inline]
    pub fn to_hash(&self, x: f64, y: f64) -> usize {
        self.axis_hash(x) + self.axis_hash(y) * self.row_column_count
    }

    #[inline]
    #[expect(clippy::cast_possible_truncation, reason = "the cell index is masked to the row count")]
    fn axis_hash(&self, coordinate: f64) -> usize {
        // float -> usize casts truncate and saturate, so huge values still mask.
        if coordinate < 0.0 {
            let i = (-coordinate * self.inverse_cell_size) as usize;
            self.row_column_count - 1 - (i & self.xy_hash_mask)
        } else {
            (coordinate * self.inverse_cell_size) as usize & self.xy_hash_mask
        }
    }

    /// Inserts `key` into the cell `hash`, expanding the grid if this pushes
    /// the density over the limit.
    pub(crate) fn add_object<T: Collidable>(
        &mut self,
        key: ObjectKey,
        hash: usize,
        entries: &mut SlotMap<ObjectKey, Entry<T>>,
    ) {
        self.place(key, hash, entries);
        while self.density() > self.max_density {
            self.expand(entries);
        }
    }

    fn place<T>(&mut self, key: ObjectKey, hash: usize, entries: &mut SlotMap<ObjectKey, Entry<T>>) {
        let cell = &mut self.cells[hash];
        if cell.objects.is_empty() {
            cell.occupied_index = Some(self.occupied_cells.len());
            self.occupied_cells.push(hash);
        }

        let placement = &mut entries[key].placement;
        placement.grid = self.key;
        placement.hash = hash;
        placement.cell_slot = cell.objects.len();
        placement.grid_slot = self.objects.len();

        cell.objects.push(key);
        self.objects.push(key);
    }

    /// Swap-removes `key` from its cell, the occupied list and the object list.
    pub(crate) fn remove_object<T>(&mut self, key: ObjectKey, entries: &mut SlotMap<ObjectKey, Entry<T>>) {
        let Placement { hash, cell_slot, grid_slot, .. } = entries[key].placement;

        let cell = &mut self.cells[hash];
        cell.objects.swap_remove(cell_slot);
        if let Some(&moved) = cell.objects.get(cell_slot) {
            entries[moved].placement.cell_slot = cell_slot;
        }

        if cell.objects.is_empty() {
            if let Some(occupied) = cell.occupied_index.take() {
                self.occupied_cells.swap_remove(occupied);
                if let Some(&moved) = self.occupied_cells.get(occupied) {
                    self.cells[moved].occupied_index = Some(occupied);
                }
            }
        }

        self.objects.swap_remove(grid_slot);
        if let Some(&moved) = self.objects.get(grid_slot) {
            entries[moved].placement.grid_slot = grid_slot;
        }
    }

    /// Quadruples the cell count and rehashes every object.
    fn expand<T: Collidable>(&mut self, entries: &mut SlotMap<ObjectKey, Entry<T>>) {
        // Snapshot first: the rebuild below starts from an empty object list.
        let objects = std::mem::take(&mut self.objects);
        let previous = self.row_column_count;

        self.row_column_count *= 2;
        self.xy_hash_mask = self.row_column_count - 1;
        self.init_cells();

        for key in objects {
            let aabb = entries[key].object.aabb();
            let hash = self.to_hash(aabb.min[0], aabb.min[1]);
            self.place(key, hash, entries);
        }

        debug!(
            cell_size = self.cell_size,
            from = previous,
            to = self.row_column_count,
            objects = self.objects.len(),
            "expanded grid level"
        );
    }

    /// Calls `f` for every pair of objects sharing a cell or sitting in two
    /// adjacent cells, each pair once.
    pub(crate) fn for_each_cell_pair<F>(&self, mut f: F)
    where
        F: FnMut(ObjectKey, ObjectKey),
    {
        for &index in &self.occupied_cells {
            let cell = &self.cells[index];
            let objects = cell.objects();

            for (i, &a) in objects.iter().enumerate() {
                for &b in &objects[i + 1..] {
                    f(a, b);
                }
            }

            let offsets = cell.offsets(&self.shared_inner_offsets);
            for &offset in &offsets[..HALF_NEIGHBORHOOD_LEN] {
                let adjacent = &self.cells[cell.neighbor_index(offset)];
                for &a in objects {
                    for &b in adjacent.objects() {
                        f(a, b);
                    }
                }
            }
        }
    }

    /// Calls `f` for every object in the 3x3 neighbourhood of the cell
    /// containing `(x, y)`.
    pub(crate) fn for_each_neighbor<F>(&self, x: f64, y: f64, mut f: F)
    where
        F: FnMut(ObjectKey),
    {
        let cell = &self.cells[self.to_hash(x, y)];
        for &offset in cell.offsets(&self.shared_inner_offsets) {
            for &b in self.cells[cell.neighbor_index(offset)].objects() {
                f(b);
            }
        }
    }
}
