//! Error type shared by every fallible operation of the hierarchy.

use thiserror::Error;

use crate::{Aabb, ObjectKey};

/// Everything that can go wrong when registering, moving or removing objects
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum HshgError {
    /// The key does not belong to a registered object, or its object has
    /// since been removed.
    #[error("object {0:?} is not registered in the hierarchy")]
    NotRegistered(ObjectKey),

    /// A bounding box with a non-finite coordinate, `min > max` on an axis,
    /// or an edge longer than [`MAX_OBJECT_SIZE`](crate::config::MAX_OBJECT_SIZE)
    #[error("malformed bounding box {aabb:?} (object: {key:?})")]
    MalformedBoundingBox {
        /// `None` when the box was rejected before the object got a key
        key: Option<ObjectKey>,
        /// The offending box
        aabb: Aabb,
    },

    /// A [`HshgConfig`](crate::HshgConfig) field is out of range
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Which field and what it must satisfy
        reason: &'static str,
    },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, HshgError>;
