//! Per-object registry of shared TargetValues and the layer list.
//!
//! One TargetRegistry exists per animated object. Every layer's Evaluator
//! acquires TargetValues here for its transform paths; the registry owns the
//! layer weights/modes and the weight-normalization flag they aggregate
//! under. Passed into Evaluator calls explicitly, never reached through
//! ambient state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::binding::{Binder, Destination};
use crate::config::Config;
use crate::ids::ValueId;
use crate::target_value::TargetValue;
use crate::value::BlendMode;

/// One animation layer: an Evaluator plus its weight and blend mode.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Layer {
    /// Raw blend weight (0..1 before normalization).
    pub weight: f32,
    pub mode: BlendMode,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            weight: 1.0,
            mode: BlendMode::Overwrite,
        }
    }
}

pub struct TargetRegistry {
    layers: Vec<Layer>,
    normalize_weights: bool,
    slots: Vec<Option<TargetValue>>,
    by_path: HashMap<String, ValueId>,
}

impl TargetRegistry {
    pub fn new(normalize_weights: bool) -> Self {
        Self::with_config(&Config::default(), normalize_weights)
    }

    pub fn with_config(cfg: &Config, normalize_weights: bool) -> Self {
        Self {
            layers: Vec::new(),
            normalize_weights,
            slots: Vec::with_capacity(cfg.value_capacity),
            by_path: HashMap::with_capacity(cfg.value_capacity),
        }
    }

    #[inline]
    pub fn normalize_weights(&self) -> bool {
        self.normalize_weights
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layer(&self, index: usize) -> Option<Layer> {
        self.layers.get(index).copied()
    }

    /// Append a layer, re-associating every slot's per-layer state.
    pub fn push_layer(&mut self, layer: Layer) -> usize {
        self.layers.push(layer);
        let count = self.layers.len();
        for slot in self.slots.iter_mut().flatten() {
            slot.resize_layers(count);
        }
        count - 1
    }

    /// Remove a layer, re-associating every slot's per-layer state.
    pub fn remove_layer(&mut self, index: usize) {
        if index >= self.layers.len() {
            return;
        }
        self.layers.remove(index);
        for slot in self.slots.iter_mut().flatten() {
            slot.remove_layer(index);
        }
    }

    /// Replace a layer's weight/mode and invalidate cached weights.
    pub fn set_layer(&mut self, index: usize, layer: Layer) {
        if let Some(entry) = self.layers.get_mut(index) {
            *entry = layer;
            for slot in self.slots.iter_mut().flatten() {
                slot.mark_weights_dirty();
            }
        }
    }

    #[inline]
    pub fn id_of(&self, path: &str) -> Option<ValueId> {
        self.by_path.get(path).copied()
    }

    #[inline]
    pub fn value(&self, id: ValueId) -> Option<&TargetValue> {
        self.slots.get(id.index()).and_then(|s| s.as_ref())
    }

    /// Bind one layer's Target for `path`, creating the shared TargetValue on
    /// first acquire. The rest pose is captured from the destination at
    /// creation time. First acquire from a layer enables that layer's mask.
    pub fn acquire(
        &mut self,
        layer: usize,
        path: &str,
        dest: &Destination,
        binder: &dyn Binder,
    ) -> ValueId {
        let id = match self.by_path.get(path) {
            Some(id) => *id,
            None => {
                let mut base = dest.kind.identity();
                binder.fetch(dest.handle, &mut base[..dest.component_count()]);
                let value =
                    TargetValue::new(dest.kind, Some(dest.handle), base, self.layers.len());
                let id = self.alloc_slot(value);
                self.by_path.insert(path.to_string(), id);
                id
            }
        };
        if let Some(slot) = self.slots.get_mut(id.index()).and_then(|s| s.as_mut()) {
            if slot.acquire(layer) == 1 {
                slot.set_mask(&self.layers, self.normalize_weights, layer, true);
            }
        }
        id
    }

    /// Release one layer's binding; the slot is dropped when no layer holds it.
    pub fn release(&mut self, layer: usize, id: ValueId) {
        let mut drop_slot = false;
        if let Some(slot) = self.slots.get_mut(id.index()).and_then(|s| s.as_mut()) {
            if slot.release(layer) == 0 {
                slot.set_mask(&self.layers, self.normalize_weights, layer, false);
            }
            drop_slot = slot.total_refs() == 0;
        }
        if drop_slot {
            self.slots[id.index()] = None;
            self.by_path.retain(|_, v| *v != id);
        }
    }

    pub fn set_mask(&mut self, id: ValueId, layer: usize, enabled: bool) {
        if let Some(slot) = self.slots.get_mut(id.index()).and_then(|s| s.as_mut()) {
            slot.set_mask(&self.layers, self.normalize_weights, layer, enabled);
        }
    }

    /// Effective (lazily recomputed) weight of `layer` for this path.
    pub fn get_weight(&mut self, id: ValueId, layer: usize) -> f32 {
        match self.slots.get_mut(id.index()).and_then(|s| s.as_mut()) {
            Some(slot) => slot.weight(&self.layers, self.normalize_weights, layer),
            None => 0.0,
        }
    }

    /// Fold one layer's value into the path's aggregate. Layers must call
    /// this in strictly increasing layer order within a frame.
    pub fn update_value(&mut self, id: ValueId, layer: usize, value: &[f32], binder: &mut dyn Binder) {
        if let Some(slot) = self.slots.get_mut(id.index()).and_then(|s| s.as_mut()) {
            slot.update(&self.layers, self.normalize_weights, layer, value, binder);
        }
    }

    /// Restore the rest pose on every bound path.
    pub fn unbind(&mut self, binder: &mut dyn Binder) {
        for slot in self.slots.iter_mut().flatten() {
            slot.unbind(binder);
        }
    }

    fn alloc_slot(&mut self, value: TargetValue) -> ValueId {
        match self.slots.iter().position(|s| s.is_none()) {
            Some(i) => {
                self.slots[i] = Some(value);
                ValueId(i as u32)
            }
            None => {
                self.slots.push(Some(value));
                ValueId((self.slots.len() - 1) as u32)
            }
        }
    }
}
