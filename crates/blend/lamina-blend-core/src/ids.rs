//! Identifiers for slot-indexed storage.

use serde::{Deserialize, Serialize};

/// Index of a Target inside one Evaluator's slot table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// Index of a TargetValue inside a TargetRegistry's slot table.
/// Dense indices improve cache locality; ids are opaque externally.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ValueId(pub u32);

impl TargetId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ValueId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
