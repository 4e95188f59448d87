//! Cross-layer value aggregation for one transform path.
//!
//! A TargetValue combines every layer's contribution for a single path into
//! one final value, applying per-layer weight, mask, and additive/overwrite
//! rules. Contributions arrive in strictly increasing layer order; the
//! counter defines frame boundaries (counter == 0 is "first call of frame"),
//! so a layer-count change between frames self-corrects without a phase flag.

use crate::binding::{BindHandle, Binder};
use crate::kernel;
use crate::registry::Layer;
use crate::value::{BlendMode, TrackKind};

pub struct TargetValue {
    kind: TrackKind,
    handle: Option<BindHandle>,
    /// Per-layer participation bits.
    mask: Vec<bool>,
    /// Cached effective weights, recomputed lazily.
    weights: Vec<f32>,
    /// Per-layer acquire counts (how many of that layer's Targets bind here).
    refs: Vec<u32>,
    total_weight: f32,
    weights_dirty: bool,
    counter: usize,
    value: [f32; 4],
    base: [f32; 4],
}

impl TargetValue {
    pub(crate) fn new(
        kind: TrackKind,
        handle: Option<BindHandle>,
        base: [f32; 4],
        layer_count: usize,
    ) -> Self {
        Self {
            kind,
            handle,
            mask: vec![false; layer_count],
            weights: vec![0.0; layer_count],
            refs: vec![0; layer_count],
            total_weight: 0.0,
            weights_dirty: true,
            counter: 0,
            value: kind.identity(),
            base,
        }
    }

    #[inline]
    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    /// Final composed value as of the last contribution.
    #[inline]
    pub fn aggregate(&self) -> &[f32] {
        &self.value[..self.kind.component_count()]
    }

    /// Rest-pose value captured at bind time.
    #[inline]
    pub fn base(&self) -> &[f32] {
        &self.base[..self.kind.component_count()]
    }

    #[inline]
    pub fn is_masked(&self, layer: usize) -> bool {
        self.mask.get(layer).copied().unwrap_or(false)
    }

    #[inline]
    pub(crate) fn acquire(&mut self, layer: usize) -> u32 {
        match self.refs.get_mut(layer) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => 0,
        }
    }

    #[inline]
    pub(crate) fn release(&mut self, layer: usize) -> u32 {
        match self.refs.get_mut(layer) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => 0,
        }
    }

    #[inline]
    pub(crate) fn total_refs(&self) -> u32 {
        self.refs.iter().sum()
    }

    #[inline]
    pub(crate) fn mark_weights_dirty(&mut self) {
        self.weights_dirty = true;
    }

    /// Grow or shrink per-layer slots when layers are added at the end.
    pub(crate) fn resize_layers(&mut self, layer_count: usize) {
        self.mask.resize(layer_count, false);
        self.weights.resize(layer_count, 0.0);
        self.refs.resize(layer_count, 0);
        if self.counter >= layer_count {
            self.counter = 0;
        }
        self.weights_dirty = true;
    }

    /// Drop one layer's slot when a layer is removed from the middle.
    pub(crate) fn remove_layer(&mut self, layer: usize) {
        if layer < self.mask.len() {
            self.mask.remove(layer);
            self.weights.remove(layer);
            self.refs.remove(layer);
        }
        if self.counter >= self.mask.len() {
            self.counter = 0;
        }
        self.weights_dirty = true;
    }

    /// Record a layer's participation.
    ///
    /// In weight-normalized mode, enabling an Overwrite layer's mask clears
    /// the mask bits of all lower-indexed layers: a later overwrite layer
    /// suppresses earlier contributions for this path.
    pub(crate) fn set_mask(
        &mut self,
        layers: &[Layer],
        normalize: bool,
        layer: usize,
        enabled: bool,
    ) {
        if layer >= self.mask.len() {
            return;
        }
        self.mask[layer] = enabled;
        if enabled && normalize {
            if let Some(info) = layers.get(layer) {
                if info.mode == BlendMode::Overwrite {
                    for bit in self.mask[..layer].iter_mut() {
                        *bit = false;
                    }
                }
            }
        }
        self.weights_dirty = true;
    }

    /// Effective weight of one layer, recomputing the whole table if dirty.
    pub(crate) fn weight(&mut self, layers: &[Layer], normalize: bool, layer: usize) -> f32 {
        if self.weights_dirty {
            self.recompute_weights(layers, normalize);
        }
        self.weights.get(layer).copied().unwrap_or(0.0)
    }

    fn recompute_weights(&mut self, layers: &[Layer], normalize: bool) {
        self.total_weight = layers
            .iter()
            .zip(&self.mask)
            .filter(|(_, on)| **on)
            .map(|(l, _)| l.weight)
            .sum();
        for (i, info) in layers.iter().enumerate() {
            if i >= self.weights.len() {
                break;
            }
            self.weights[i] = if normalize {
                if self.mask[i] && self.total_weight > 0.0 {
                    info.weight / self.total_weight
                } else {
                    0.0
                }
            } else {
                info.weight.clamp(0.0, 1.0)
            };
        }
        self.weights_dirty = false;
    }

    /// Fold one layer's value into the aggregate and push the result.
    pub(crate) fn update(
        &mut self,
        layers: &[Layer],
        normalize: bool,
        layer: usize,
        incoming: &[f32],
        binder: &mut dyn Binder,
    ) {
        let n = self.kind.component_count();

        // First contribution of the frame starts from identity; outside
        // normalized mode the rest pose is blended in as the floor so that
        // additive layers compose on top of the bind pose.
        if self.counter == 0 {
            self.value = self.kind.identity();
            if !normalize {
                let base = self.base;
                kernel::blend(&mut self.value[..n], &base[..n], 1.0, self.kind, false);
            }
        }

        if layer < self.mask.len() && layer < layers.len() {
            let w = self.weight(layers, normalize, layer);
            if self.mask[layer] && w > 0.0 {
                if layers[layer].mode == BlendMode::Additive && !normalize {
                    self.apply_delta(incoming, w);
                } else {
                    kernel::blend(&mut self.value[..n], &incoming[..n], w, self.kind, false);
                }
            }
        }

        if let Some(handle) = self.handle {
            binder.apply(handle, &self.value[..n]);
        }

        self.counter += 1;
        if self.counter >= self.mask.len() {
            self.counter = 0;
        }
    }

    /// Rest-pose-relative additive contribution (non-normalized mode only).
    fn apply_delta(&mut self, incoming: &[f32], w: f32) {
        match self.kind {
            TrackKind::Vector => {
                for i in 0..3 {
                    self.value[i] += (incoming[i] - self.base[i]) * w;
                }
            }
            TrackKind::Quaternion => {
                let q = [incoming[0], incoming[1], incoming[2], incoming[3]];
                let delta = kernel::quat_mul(q, kernel::quat_conjugate(self.base));
                // Scale the delta toward identity by the layer weight, then
                // compose it onto the aggregate.
                let mut scaled = TrackKind::Quaternion.identity();
                kernel::blend_quat(&mut scaled, &delta, w, false);
                self.value = kernel::quat_mul(scaled, self.value);
                kernel::normalize(&mut self.value);
            }
        }
    }

    /// Push the rest pose through the setter once.
    pub(crate) fn unbind(&mut self, binder: &mut dyn Binder) {
        let n = self.kind.component_count();
        if let Some(handle) = self.handle {
            binder.apply(handle, &self.base[..n]);
        }
    }
}
