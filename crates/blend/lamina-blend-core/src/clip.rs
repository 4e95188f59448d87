//! Clip trait: one playing instance of an animation track.
//!
//! Clips are external collaborators, referenced not owned. Curve sampling has
//! already happened by the time the Evaluator runs; `sample` only copies the
//! current sampled components out. A curve may drive more than one path.

use std::cell::RefCell;
use std::rc::Rc;

/// Shared clip reference. The pipeline is single-threaded and synchronous,
/// so `Rc<RefCell<_>>` sharing between the owner and its layers is safe.
pub type ClipRef = Rc<RefCell<dyn Clip>>;

pub trait Clip {
    fn name(&self) -> &str;

    /// Blend weight in 0..1. Zero-weight clips contribute nothing and are
    /// not advanced.
    fn blend_weight(&self) -> f32;

    /// Sort key for deterministic intra-layer composition order.
    fn blend_order(&self) -> f32;

    /// Step the clip's local time and resample its curves.
    fn advance(&mut self, dt: f32);

    fn curve_count(&self) -> usize;

    /// Destination paths driven by one curve.
    fn curve_paths(&self, curve: usize) -> &[String];

    /// Copy the curve's current sampled components into `out`
    /// (`out.len()` is the destination's component count).
    fn sample(&self, curve: usize, out: &mut [f32]);
}
