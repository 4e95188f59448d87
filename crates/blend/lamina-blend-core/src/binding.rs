//! Binder trait and resolved destinations.
//!
//! The Binder is the seam to the host scene: it resolves curve paths to
//! destinations, reads rest-pose values, and applies blended results. Hosts
//! implement this and pass it into Evaluator/TargetRegistry calls by
//! `&mut dyn` reference; the core never reaches for ambient state.

use serde::{Deserialize, Serialize};

use crate::value::TrackKind;

/// Opaque handle to a resolved destination, minted by the Binder.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BindHandle(pub u32);

/// A resolved curve path.
///
/// `kind` is the closed tag: it fixes the component count (3 or 4) and how
/// the value blends. `is_transform` routes the value through the shared
/// cross-layer TargetValue instead of a direct apply.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Destination {
    pub handle: BindHandle,
    pub kind: TrackKind,
    pub is_transform: bool,
}

impl Destination {
    #[inline]
    pub fn component_count(&self) -> usize {
        self.kind.component_count()
    }
}

/// Host-side resolution and application of destination values.
///
/// A failed `resolve` is not an error: the curve is skipped and playback
/// continues (one missing bone binding must not halt a whole character).
pub trait Binder {
    /// Resolve a curve path, or `None` if the path has no destination.
    fn resolve(&mut self, path: &str) -> Option<Destination>;

    /// Release a previously resolved path.
    fn unresolve(&mut self, path: &str);

    /// Read the destination's current (rest-pose) value into `out`.
    fn fetch(&self, handle: BindHandle, out: &mut [f32]);

    /// Write a blended value to the destination.
    fn apply(&mut self, handle: BindHandle, value: &[f32]);

    /// Deferred per-frame work, run at the end of each Evaluator update.
    fn update(&mut self, _dt: f32) {}
}
