//! Core configuration for lamina-blend-core.

use serde::{Deserialize, Serialize};

/// Capacity hints for preallocated hot-path storage.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Expected clips per layer (sort scratch + clip list).
    pub clip_capacity: usize,
    /// Expected Targets per layer (slot table + path index).
    pub target_capacity: usize,
    /// Expected transform paths per animated object (registry slot table).
    pub value_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clip_capacity: 8,
            target_capacity: 256,
            value_capacity: 256,
        }
    }
}
