//! Track value kinds and layer blend modes.

use serde::{Deserialize, Serialize};

/// Numeric shape of a blended track value.
///
/// Vector targets carry 3 components, quaternion targets 4 (x, y, z, w).
/// Buffers are sized once from the kind and never reallocated.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrackKind {
    Vector,
    Quaternion,
}

impl TrackKind {
    #[inline]
    pub fn component_count(self) -> usize {
        match self {
            TrackKind::Vector => 3,
            TrackKind::Quaternion => 4,
        }
    }

    /// Identity element for aggregation: zero vector or identity rotation.
    #[inline]
    pub fn identity(self) -> [f32; 4] {
        match self {
            TrackKind::Vector => [0.0, 0.0, 0.0, 0.0],
            TrackKind::Quaternion => [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// How a layer's contribution combines with the layers below it.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlendMode {
    /// Weighted blend of the aggregate toward the layer's value.
    Overwrite,
    /// Rest-pose-relative delta composed on top of the aggregate.
    Additive,
}
