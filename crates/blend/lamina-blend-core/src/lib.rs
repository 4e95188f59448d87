//! Lamina Blend Core (engine-agnostic)
//!
//! Layered animation blending: a stateless vector/quaternion kernel, a
//! per-layer clip compositor (Evaluator), and a cross-layer per-path value
//! aggregator (TargetRegistry/TargetValue). Curve sampling, asset loading,
//! and the scene graph live behind the Binder/Clip traits; this crate only
//! composes sampled numeric outputs into final per-property values.

pub mod binding;
pub mod clip;
pub mod config;
pub mod evaluator;
pub mod ids;
pub mod kernel;
pub mod registry;
pub mod target_value;
pub mod value;

// Re-exports for consumers (adapters)
pub use binding::{BindHandle, Binder, Destination};
pub use clip::{Clip, ClipRef};
pub use config::Config;
pub use evaluator::Evaluator;
pub use ids::{TargetId, ValueId};
pub use registry::{Layer, TargetRegistry};
pub use target_value::TargetValue;
pub use value::{BlendMode, TrackKind};
