//! Capability trait for anything that can be registered in the hierarchy.

use crate::{Aabb, ObjectKey};

/// An object with a bounding box, optionally interested in its collisions.
///
/// `on_collide` is called once per candidate pair on each side, after the
/// whole pair list of a query has been collected, so implementations may
/// freely mutate themselves. Structural changes to the index (adding or
/// removing objects) must be queued by the caller and applied after the
/// query returns.
pub trait Collidable {
    /// Current bounding box of the object
    fn aabb(&self) -> Aabb;

    /// Called for every broad-phase candidate pair this object is part of
    fn on_collide(&mut self, _other: ObjectKey) {}
}

impl Collidable for Aabb {
    #[inline]
    fn aabb(&self) -> Self {
        *self
    }
}
