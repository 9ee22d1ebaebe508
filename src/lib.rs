//! # HSHG - Hierarchical Spatial Hash Grid
//!
//! A broad-phase collision index for moving, variably sized 2D objects.
//! Once per simulation tick it finds the pairs of objects whose axis-aligned
//! bounding boxes (AABB) overlap, so that only those pairs go through an
//! exact collision test.
//!
//! ## Features
//!
//! - **Multi-resolution**: objects are sorted into grid levels whose cell size
//!   roughly matches the object size, so tiny and huge objects coexist cheaply
//! - **Toroidal hashing**: any coordinate maps to a valid cell, no world bounds
//! - **O(1) relocation**: objects that cross a cell border are swap-removed and
//!   reinserted; objects that stay in their cell cost one hash per tick
//! - **Self-expanding levels**: a level doubles its resolution when crowded
//!
//! ## Quick Start
//!
//! ```rust
//! use hshg::prelude::*;
//!
//! let mut index = Hshg::new();
//!
//! // Register objects (min_x, min_y, max_x, max_y)
//! let a = index.add_object(Aabb::new(0.0, 0.0, 2.0, 2.0)).unwrap();
//! let b = index.add_object(Aabb::new(1.0, 1.0, 3.0, 3.0)).unwrap();
//! let _far = index.add_object(Aabb::new(50.0, 50.0, 51.0, 51.0)).unwrap();
//!
//! // Move an object, then let the index catch up
//! *index.get_mut(b).unwrap() = Aabb::new(1.5, 1.5, 3.5, 3.5);
//! index.update().unwrap();
//!
//! let pairs = index.query_for_collision_pairs();
//! assert_eq!(pairs.len(), 1);
//! assert!(pairs[0] == (a, b) || pairs[0] == (b, a));
//! ```
//!
//! ## How It Works
//!
//! Each grid level is a fixed-size, power-of-two hash table of cells wrapped
//! into a torus. An object is stored in the cell its AABB origin hashes to.
//! Candidate pairs come from two passes per level: pairs inside a cell and
//! between adjacent cells of the same level, then every object against the
//! 3x3 block around its position in each coarser level.
//!
//! Registered objects implement [`Collidable`]; the index owns them and hands
//! out [`ObjectKey`] handles. Objects that want to react to contacts override
//! [`Collidable::on_collide`].

pub mod aabb;
pub mod cell;
pub mod collidable;
pub mod config;
pub mod error;
pub mod grid;
pub mod hshg;
pub mod prelude;

pub use aabb::Aabb;
pub use cell::Cell;
pub use collidable::Collidable;
pub use config::{HshgConfig, UpdateStrategy};
pub use error::{HshgError, Result};
pub use grid::{Grid, GridKey};
pub use hshg::{CollisionPair, Hshg, ObjectKey, Placement};

#[cfg(test)]
mod comparison_tests;
