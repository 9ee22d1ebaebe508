//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the crate.
//! Users can import everything they need with:
//!
//! ```
//! use hshg::prelude::*;
//! ```

pub use crate::{
    Aabb, Collidable, CollisionPair, Hshg, HshgConfig, HshgError, ObjectKey, UpdateStrategy,
};
