//! The hierarchy: grid levels sorted by cell size plus the object registry.
//!
//! Each level serves objects within roughly one octave of size, so the
//! number of objects per cell stays low whatever mix of sizes the scene
//! has. Objects are owned by the hierarchy and addressed through
//! [`ObjectKey`] handles; their placement lives next to them in the arena.
//!
//! Per simulation tick the expected call order is [`Hshg::update`] then
//! [`Hshg::query_for_collision_pairs`].

use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::config::{HIERARCHY_FACTOR, HIERARCHY_FACTOR_SQRT, HshgConfig, UpdateStrategy};
use crate::error::{HshgError, Result};
use crate::grid::{Grid, GridKey};
use crate::{Aabb, Collidable};

slotmap::new_key_type! {
    /// Handle of a registered object
    pub struct ObjectKey;
}

/// Two objects whose bounding boxes passed the broad-phase test
pub type CollisionPair = (ObjectKey, ObjectKey);

/// Where an object currently lives.
///
/// The three slots are swap-removal indices into the cell's object list, the
/// grid's object list and the hierarchy's object list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    /// Level holding the object
    pub grid: GridKey,
    /// Cell index inside that level
    pub hash: usize,
    /// Index in the cell's object list
    pub cell_slot: usize,
    /// Index in the grid's object list
    pub grid_slot: usize,
    /// Index in the hierarchy's object list
    pub global_slot: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct Entry<T> {
    pub(crate) object: T,
    pub(crate) placement: Placement,
}

/// Result of searching the levels for an object size
enum Level {
    Existing(GridKey),
    New { position: usize, cell_size: f64 },
}

/// Hierarchical spatial hash grid
#[derive(Clone, Debug)]
pub struct Hshg<T> {
    config: HshgConfig,
    entries: SlotMap<ObjectKey, Entry<T>>,
    grids: SlotMap<GridKey, Grid>,
    /// Grid levels, ascending cell size
    levels: Vec<GridKey>,
    /// Every registered object exactly once
    objects: Vec<ObjectKey>,
    /// Scratch buffer of `update`
    relocations: Vec<(ObjectKey, usize)>,
}

impl<T: Collidable> Hshg<T> {
    /// Creates an empty hierarchy with the default configuration
    pub fn new() -> Self {
        Self::from_valid_config(HshgConfig::default())
    }

    /// Creates an empty hierarchy, rejecting an invalid configuration
    ///
    /// # Errors
    ///
    /// [`HshgError::InvalidConfiguration`] when [`HshgConfig::validate`] fails.
    pub fn with_config(config: HshgConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: HshgConfig) -> Self {
        Self {
            config,
            entries: SlotMap::with_key(),
            grids: SlotMap::with_key(),
            levels: Vec::new(),
            objects: Vec::new(),
            relocations: Vec::new(),
        }
    }

    /// Configuration the hierarchy was built with
    pub fn config(&self) -> &HshgConfig {
        &self.config
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when no object is registered
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// True when `key` refers to a registered object
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Shared access to a registered object
    pub fn get(&self, key: ObjectKey) -> Option<&T> {
        self.entries.get(key).map(|entry| &entry.object)
    }

    /// Mutable access to an object, e.g. to move it.
    ///
    /// The index notices the new position on the next [`update`](Self::update).
    /// Growing or shrinking an object past its level's size band needs
    /// [`rebuild`](Self::rebuild) or a remove and re-add.
    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut T> {
        self.entries.get_mut(key).map(|entry| &mut entry.object)
    }

    /// Current placement of an object, mostly useful for diagnostics
    pub fn placement(&self, key: ObjectKey) -> Option<Placement> {
        self.entries.get(key).map(|entry| entry.placement)
    }

    /// Keys of all registered objects, in swap-removal order
    pub fn keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.objects.iter().copied()
    }

    /// All registered objects with their keys, in arena order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &T)> + '_ {
        self.entries.iter().map(|(key, entry)| (key, &entry.object))
    }

    /// Number of grid levels
    pub fn grid_count(&self) -> usize {
        self.levels.len()
    }

    /// Grid levels, smallest cells first
    pub fn grids(&self) -> impl Iterator<Item = &Grid> + '_ {
        self.levels.iter().map(move |&key| &self.grids[key])
    }

    /// Grid level holding `key`
    pub fn grid_of(&self, key: ObjectKey) -> Option<&Grid> {
        self.entries.get(key).map(|entry| &self.grids[entry.placement.grid])
    }

    /// Registers an object and returns its handle
    ///
    /// # Errors
    ///
    /// [`HshgError::MalformedBoundingBox`] with `key: None` when the object's
    /// box fails [`Aabb::is_well_formed`]; nothing is stored then.
    pub fn add_object(&mut self, object: T) -> Result<ObjectKey> {
        let aabb = object.aabb();
        if !aabb.is_well_formed() {
            return Err(HshgError::MalformedBoundingBox { key: None, aabb });
        }

        let placement = Placement { global_slot: self.objects.len(), ..Placement::default() };
        let key = self.entries.insert(Entry { object, placement });
        self.objects.push(key);
        self.place(key, &aabb);
        Ok(key)
    }

    /// Unregisters an object and hands it back.
    ///
    /// A grid level left without objects is dropped from the hierarchy.
    ///
    /// # Errors
    ///
    /// [`HshgError::NotRegistered`] for an unknown or already removed key.
    pub fn remove_object(&mut self, key: ObjectKey) -> Result<T> {
        let Some(entry) = self.entries.get(key) else {
            return Err(HshgError::NotRegistered(key));
        };
        let Placement { grid, global_slot, .. } = entry.placement;

        self.grids[grid].remove_object(key, &mut self.entries);

        self.objects.swap_remove(global_slot);
        if let Some(&moved) = self.objects.get(global_slot) {
            self.entries[moved].placement.global_slot = global_slot;
        }

        if self.grids[grid].is_empty() {
            self.drop_level(grid);
        }

        self.entries
            .remove(key)
            .map(|entry| entry.object)
            .ok_or(HshgError::NotRegistered(key))
    }

    /// Removes every object and grid level
    pub fn clear(&mut self) {
        self.entries.clear();
        self.grids.clear();
        self.levels.clear();
        self.objects.clear();
    }

    /// Relocates objects that moved since the last call, following
    /// [`HshgConfig::update_strategy`].
    ///
    /// # Errors
    ///
    /// [`HshgError::MalformedBoundingBox`] when any object reports a malformed
    /// bounding box. The index is left untouched in that case.
    pub fn update(&mut self) -> Result<()> {
        match self.config.update_strategy {
            UpdateStrategy::Recompute => self.update_recompute(),
            UpdateStrategy::RemoveAll => self.rebuild(),
        }
    }

    fn update_recompute(&mut self) -> Result<()> {
        let mut relocations = std::mem::take(&mut self.relocations);
        relocations.clear();

        let collected = self.collect_relocations(&mut relocations);
        if collected.is_ok() {
            // Remove-then-add keeps the object count, so no expansion can
            // invalidate the hashes queued for the same grid.
            for &(key, hash) in &relocations {
                let grid = &mut self.grids[self.entries[key].placement.grid];
                grid.remove_object(key, &mut self.entries);
                grid.add_object(key, hash, &mut self.entries);
            }
            trace!(relocated = relocations.len(), objects = self.objects.len(), "update");
        }

        self.relocations = relocations;
        collected
    }

    fn collect_relocations(&self, relocations: &mut Vec<(ObjectKey, usize)>) -> Result<()> {
        for &key in &self.objects {
            let entry = &self.entries[key];
            let aabb = entry.object.aabb();
            if !aabb.is_well_formed() {
                return Err(HshgError::MalformedBoundingBox { key: Some(key), aabb });
            }
            let hash = self.grids[entry.placement.grid].to_hash(aabb.min[0], aabb.min[1]);
            if hash != entry.placement.hash {
                relocations.push((key, hash));
            }
        }
        Ok(())
    }

    /// Discards every grid level and places all objects again from scratch.
    ///
    /// Unlike the default update this also moves objects whose size changed
    /// into the level that fits them now. Keys stay valid.
    ///
    /// # Errors
    ///
    /// [`HshgError::MalformedBoundingBox`] for the first malformed box found,
    /// before any level is discarded.
    pub fn rebuild(&mut self) -> Result<()> {
        let mut aabbs = Vec::with_capacity(self.objects.len());
        for &key in &self.objects {
            let aabb = self.entries[key].object.aabb();
            if !aabb.is_well_formed() {
                return Err(HshgError::MalformedBoundingBox { key: Some(key), aabb });
            }
            aabbs.push(aabb);
        }

        self.grids.clear();
        self.levels.clear();
        for (slot, aabb) in aabbs.iter().enumerate() {
            let key = self.objects[slot];
            self.place(key, aabb);
        }

        debug!(objects = self.objects.len(), levels = self.levels.len(), "rebuilt hierarchy");
        Ok(())
    }

    /// Puts an already registered object into the level fitting its size
    fn place(&mut self, key: ObjectKey, aabb: &Aabb) {
        // Both bounds are checked on the way in, so every cell size derived
        // from `size` stays finite and positive.
        let size = aabb.longest_edge().max(self.config.min_object_size);
        let grid_key = match self.find_level(size) {
            Level::Existing(grid_key) => grid_key,
            Level::New { position, cell_size } => self.create_level(position, cell_size),
        };

        let grid = &mut self.grids[grid_key];
        let hash = grid.to_hash(aabb.min[0], aabb.min[1]);
        grid.add_object(key, hash, &mut self.entries);
    }

    /// Picks the first level whose cells are larger than `size`, or where a
    /// new level has to go when that one is more than a factor too coarse.
    ///
    /// `size` lies in `[min_object_size, MAX_OBJECT_SIZE]` and every existing
    /// cell size is finite and positive, so both walks end.
    fn find_level(&self, size: f64) -> Level {
        let Some(&largest) = self.levels.last() else {
            return Level::New { position: 0, cell_size: size * HIERARCHY_FACTOR_SQRT };
        };

        for (position, &grid_key) in self.levels.iter().enumerate() {
            let cell_size = self.grids[grid_key].cell_size();
            if size < cell_size {
                let mut smaller = cell_size / HIERARCHY_FACTOR;
                if size >= smaller {
                    return Level::Existing(grid_key);
                }
                while size < smaller {
                    smaller /= HIERARCHY_FACTOR;
                }
                return Level::New { position, cell_size: smaller * HIERARCHY_FACTOR };
            }
        }

        let mut cell_size = self.grids[largest].cell_size();
        while size >= cell_size {
            cell_size *= HIERARCHY_FACTOR;
        }
        Level::New { position: self.levels.len(), cell_size }
    }

    fn create_level(&mut self, position: usize, cell_size: f64) -> GridKey {
        let row_column_count = self.config.initial_row_column_count;
        let max_density = self.config.max_object_cell_density;
        let grid_key = self
            .grids
            .insert_with_key(|key| Grid::new(key, cell_size, row_column_count, max_density));
        self.levels.insert(position, grid_key);

        debug!(cell_size, position, levels = self.levels.len(), "created grid level");
        grid_key
    }

    fn drop_level(&mut self, grid_key: GridKey) {
        if let Some(grid) = self.grids.remove(grid_key) {
            self.levels.retain(|&key| key != grid_key);
            debug!(cell_size = grid.cell_size(), levels = self.levels.len(), "dropped empty grid level");
        }
    }

    /// Broad-phase pairs using the inclusive AABB overlap test.
    ///
    /// Every object with an `on_collide` hook is told about each pair it is
    /// part of, after the whole list has been collected.
    pub fn query_for_collision_pairs(&mut self) -> Vec<CollisionPair> {
        self.query_for_collision_pairs_with(|a, b| a.aabb().overlaps(&b.aabb()))
    }

    /// Like [`query_for_collision_pairs`](Self::query_for_collision_pairs)
    /// with a caller supplied overlap predicate.
    pub fn query_for_collision_pairs_with<F>(&mut self, overlaps: F) -> Vec<CollisionPair>
    where
        F: FnMut(&T, &T) -> bool,
    {
        let pairs = self.candidate_pairs(overlaps);
        for &(a, b) in &pairs {
            self.entries[a].object.on_collide(b);
            self.entries[b].object.on_collide(a);
        }
        pairs
    }

    /// Collects candidate pairs without notifying the objects.
    ///
    /// Levels are visited from fine to coarse. Within a level, objects are
    /// paired with their own cell and one half of the adjacent cells. Across
    /// levels, each object probes the full 3x3 block around its position in
    /// every coarser level. An object in a coarse level never probes finer
    /// ones: the finer object of a pair always initiates, so no pair is
    /// produced twice.
    pub fn candidate_pairs<F>(&self, mut overlaps: F) -> Vec<CollisionPair>
    where
        F: FnMut(&T, &T) -> bool,
    {
        let mut pairs = Vec::new();

        for (level, &grid_key) in self.levels.iter().enumerate() {
            let grid = &self.grids[grid_key];

            grid.for_each_cell_pair(|a, b| {
                if overlaps(&self.entries[a].object, &self.entries[b].object) {
                    pairs.push((a, b));
                }
            });

            let coarser = &self.levels[level + 1..];
            if coarser.is_empty() {
                continue;
            }
            for &a in grid.objects() {
                let object = &self.entries[a].object;
                let aabb = object.aabb();
                for &coarse_key in coarser {
                    self.grids[coarse_key].for_each_neighbor(aabb.min[0], aabb.min[1], |b| {
                        if overlaps(object, &self.entries[b].object) {
                            pairs.push((a, b));
                        }
                    });
                }
            }
        }

        pairs
    }
}

impl<T: Collidable> Default for Hshg<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl<T: Collidable> Hshg<T> {
    /// Panics when any structural invariant of the hierarchy is broken
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.levels.len(), self.grids.len(), "every grid is a level");
        for pair in self.levels.windows(2) {
            assert!(
                self.grids[pair[0]].cell_size() < self.grids[pair[1]].cell_size(),
                "levels not sorted by cell size"
            );
        }
        for grid in self.grids.values() {
            assert!(grid.cell_size().is_finite(), "infinite cell size {}", grid.cell_size());
        }

        assert_eq!(self.objects.len(), self.entries.len(), "registry and arena disagree");
        for (slot, &key) in self.objects.iter().enumerate() {
            assert_eq!(self.entries[key].placement.global_slot, slot, "stale global slot");
        }

        let mut in_grids = 0;
        for (grid_key, grid) in &self.grids {
            assert!(!grid.is_empty(), "empty level kept");
            assert!(grid.density() <= grid.max_density(), "density above limit");
            in_grids += grid.object_count();

            for (slot, &key) in grid.objects().iter().enumerate() {
                let placement = self.entries[key].placement;
                assert_eq!(placement.grid, grid_key, "placement points at another grid");
                assert_eq!(placement.grid_slot, slot, "stale grid slot");
                assert_eq!(grid.cells()[placement.hash].objects()[placement.cell_slot], key, "stale cell slot");
            }

            let mut in_cells = 0;
            for cell in grid.cells() {
                in_cells += cell.objects().len();
                assert_eq!(cell.is_empty(), cell.occupied_index().is_none(), "occupied flag mismatch");
            }
            assert_eq!(in_cells, grid.object_count(), "cells and grid list disagree");

            let occupied: Vec<_> = grid.occupied_cells().collect();
            for (slot, cell) in occupied.iter().enumerate() {
                assert_eq!(cell.occupied_index(), Some(slot), "stale occupied slot");
            }
            assert_eq!(
                occupied.len(),
                grid.cells().iter().filter(|cell| !cell.is_empty()).count(),
                "occupied list misses a cell"
            );
        }
        assert_eq!(in_grids, self.objects.len(), "object stored in more or fewer than one grid");
    }

    /// Panics when an object's stored hash differs from its current position
    pub(crate) fn assert_hashes_current(&self) {
        for &key in &self.objects {
            let entry = &self.entries[key];
            let aabb = entry.object.aabb();
            let grid = &self.grids[entry.placement.grid];
            assert_eq!(entry.placement.hash, grid.to_hash(aabb.min[0], aabb.min[1]), "stale hash");
        }
    }
}
