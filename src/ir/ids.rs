//! Newtype indices for type-safe identification of reconstruction records.
//!
//! Using newtypes prevents accidentally mixing up different kinds of indices
//! (e.g., storing a point index where a measurement expects a camera index).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based position of a camera in the order it was parsed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraIndex(pub i32);

impl CameraIndex {
    /// Creates a new CameraIndex.
    #[inline]
    pub fn new(index: i32) -> Self {
        Self(index)
    }

    /// Returns the underlying i32 value.
    #[inline]
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Debug for CameraIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CameraIndex({})", self.0)
    }
}

impl fmt::Display for CameraIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for CameraIndex {
    fn from(index: i32) -> Self {
        CameraIndex::new(index)
    }
}

/// Zero-based position of a sparse or dense point in the order it was parsed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointIndex(pub i32);

impl PointIndex {
    /// Creates a new PointIndex.
    #[inline]
    pub fn new(index: i32) -> Self {
        Self(index)
    }

    /// Returns the underlying i32 value.
    #[inline]
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Debug for PointIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PointIndex({})", self.0)
    }
}

impl fmt::Display for PointIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for PointIndex {
    fn from(index: i32) -> Self {
        PointIndex::new(index)
    }
}
