//! Per-layer clip compositor.
//!
//! An Evaluator owns one layer's active clip list and its registry of
//! per-path Targets. Each frame it stable-sorts the clips by blend order,
//! composes their sampled curve outputs into each Target's value, and
//! forwards transform targets to the shared cross-layer TargetValue (others
//! apply straight through the Binder). Collaborators are passed per call;
//! the Evaluator holds no ambient references.
//!
//! Failure semantics: never panics. Unresolved paths and mismatched
//! clip/target combinations degrade silently to "no contribution" so one
//! missing binding cannot halt an entire object's playback.

use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use crate::binding::{BindHandle, Binder};
use crate::clip::ClipRef;
use crate::config::Config;
use crate::ids::{TargetId, ValueId};
use crate::kernel;
use crate::registry::TargetRegistry;
use crate::value::TrackKind;

/// One layer's binding of one or more curves to a single destination path.
struct Target {
    path: String,
    handle: BindHandle,
    kind: TrackKind,
    /// Shared cross-layer aggregator, present for transform destinations.
    shared: Option<ValueId>,
    value: [f32; 4],
    curve_count: u32,
    blend_counter: u32,
}

pub struct Evaluator {
    layer_index: usize,
    clips: Vec<ClipRef>,
    /// Per-clip (curve index, target) pairs, parallel to `clips`.
    clip_bindings: Vec<Vec<(usize, TargetId)>>,
    targets: Vec<Option<Target>>,
    by_path: HashMap<String, TargetId>,
    /// Scratch permutation reused across frames.
    order: Vec<usize>,
    /// Scratch sample buffer reused across frames.
    sample: [f32; 4],
}

impl Evaluator {
    pub fn new(layer_index: usize) -> Self {
        Self::with_config(layer_index, &Config::default())
    }

    pub fn with_config(layer_index: usize, cfg: &Config) -> Self {
        Self {
            layer_index,
            clips: Vec::with_capacity(cfg.clip_capacity),
            clip_bindings: Vec::with_capacity(cfg.clip_capacity),
            targets: Vec::with_capacity(cfg.target_capacity),
            by_path: HashMap::with_capacity(cfg.target_capacity),
            order: Vec::with_capacity(cfg.clip_capacity),
            sample: [0.0; 4],
        }
    }

    #[inline]
    pub fn layer_index(&self) -> usize {
        self.layer_index
    }

    #[inline]
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Whether a live Target exists for `path`.
    #[inline]
    pub fn has_target(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Current composed value for `path`, if a Target is live.
    pub fn target_value(&self, path: &str) -> Option<&[f32]> {
        let id = *self.by_path.get(path)?;
        self.targets
            .get(id.index())
            .and_then(|s| s.as_ref())
            .map(|t| &t.value[..t.kind.component_count()])
    }

    /// Register a clip: resolve every curve path and bind it to a Target.
    ///
    /// Unresolved paths are skipped silently; the first resolve of a path
    /// creates its Target, and transform destinations are additionally
    /// registered with the shared TargetValue registry.
    pub fn add_clip(
        &mut self,
        clip: ClipRef,
        binder: &mut dyn Binder,
        registry: &mut TargetRegistry,
    ) {
        let mut bindings = Vec::new();
        {
            let c = clip.borrow();
            for curve in 0..c.curve_count() {
                for path in c.curve_paths(curve) {
                    let id = match self.by_path.get(path.as_str()) {
                        Some(id) => *id,
                        None => match binder.resolve(path) {
                            Some(dest) => {
                                let shared = if dest.is_transform {
                                    Some(registry.acquire(self.layer_index, path, &dest, &*binder))
                                } else {
                                    None
                                };
                                let id = self.alloc_target(Target {
                                    path: path.clone(),
                                    handle: dest.handle,
                                    kind: dest.kind,
                                    shared,
                                    value: dest.kind.identity(),
                                    curve_count: 0,
                                    blend_counter: 0,
                                });
                                self.by_path.insert(path.clone(), id);
                                id
                            }
                            None => {
                                log::debug!("curve path {path:?} did not resolve; skipping");
                                continue;
                            }
                        },
                    };
                    if let Some(t) = self.targets.get_mut(id.index()).and_then(|s| s.as_mut()) {
                        t.curve_count += 1;
                    }
                    bindings.push((curve, id));
                }
            }
        }
        self.clips.push(clip);
        self.clip_bindings.push(bindings);
    }

    /// Unregister a clip, releasing Targets whose curve count returns to zero.
    pub fn remove_clip(
        &mut self,
        clip: &ClipRef,
        binder: &mut dyn Binder,
        registry: &mut TargetRegistry,
    ) {
        // Compare data pointers only; vtable pointers of identical clips can
        // differ across codegen units.
        let target_ptr = Rc::as_ptr(clip) as *const ();
        let Some(pos) = self
            .clips
            .iter()
            .position(|c| Rc::as_ptr(c) as *const () == target_ptr)
        else {
            return;
        };
        self.clips.remove(pos);
        let bindings = self.clip_bindings.remove(pos);
        for (_, id) in bindings {
            let gone = match self.targets.get_mut(id.index()).and_then(|s| s.as_mut()) {
                Some(t) => {
                    t.curve_count = t.curve_count.saturating_sub(1);
                    t.curve_count == 0
                }
                None => false,
            };
            if gone {
                if let Some(t) = self.targets[id.index()].take() {
                    binder.unresolve(&t.path);
                    if let Some(vid) = t.shared {
                        registry.release(self.layer_index, vid);
                    }
                    self.by_path.remove(&t.path);
                }
            }
        }
    }

    /// Remove every clip.
    pub fn remove_clips(&mut self, binder: &mut dyn Binder, registry: &mut TargetRegistry) {
        while let Some(clip) = self.clips.last().cloned() {
            self.remove_clip(&clip, binder, registry);
        }
    }

    /// Look up an active clip by name.
    pub fn find_clip(&self, name: &str) -> Option<ClipRef> {
        self.clips
            .iter()
            .find(|c| c.borrow().name() == name)
            .cloned()
    }

    /// Tear down and rebuild all Targets for the current clip list.
    /// Output is unchanged for unchanged clip state.
    pub fn rebind(&mut self, binder: &mut dyn Binder, registry: &mut TargetRegistry) {
        let clips = self.clips.clone();
        for clip in &clips {
            self.remove_clip(clip, binder, registry);
        }
        for clip in clips {
            self.add_clip(clip, binder, registry);
        }
    }

    /// Set this layer's mask bit on every shared (transform) target.
    pub fn assign_mask(&mut self, enabled: bool, registry: &mut TargetRegistry) {
        for t in self.targets.iter().flatten() {
            if let Some(vid) = t.shared {
                registry.set_mask(vid, self.layer_index, enabled);
            }
        }
    }

    /// Compose one frame.
    ///
    /// Clips are visited in stable blend order. A full-weight clip SETs the
    /// Target outright; partial weights SET on the first contribution and
    /// BLEND after that. Every live Target then forwards to its shared
    /// TargetValue (transform paths) or applies directly through the Binder.
    pub fn update(&mut self, dt: f32, binder: &mut dyn Binder, registry: &mut TargetRegistry) {
        let mut order = mem::take(&mut self.order);
        order.clear();
        order.extend(0..self.clips.len());
        {
            let clips = &self.clips;
            kernel::stable_sort_by(&mut order, |a, b| {
                clips[*a].borrow().blend_order() < clips[*b].borrow().blend_order()
            });
        }

        for &ci in &order {
            let weight = self.clips[ci].borrow().blend_weight();
            if weight <= 0.0 {
                continue;
            }
            self.clips[ci].borrow_mut().advance(dt);

            let clip = self.clips[ci].borrow();
            for &(curve, id) in &self.clip_bindings[ci] {
                let Some(target) = self.targets.get_mut(id.index()).and_then(|s| s.as_mut())
                else {
                    continue;
                };
                let n = target.kind.component_count();
                clip.sample(curve, &mut self.sample[..n]);
                if weight >= 1.0 {
                    kernel::set(&mut target.value[..n], &self.sample[..n], target.kind);
                    target.blend_counter = 1;
                } else {
                    if target.blend_counter == 0 {
                        kernel::set(&mut target.value[..n], &self.sample[..n], target.kind);
                    } else {
                        kernel::blend(
                            &mut target.value[..n],
                            &self.sample[..n],
                            weight,
                            target.kind,
                            false,
                        );
                    }
                    target.blend_counter += 1;
                }
            }
        }

        for slot in self.targets.iter_mut() {
            if let Some(t) = slot.as_mut() {
                let n = t.kind.component_count();
                match t.shared {
                    Some(vid) => registry.update_value(vid, self.layer_index, &t.value[..n], binder),
                    None => binder.apply(t.handle, &t.value[..n]),
                }
                t.blend_counter = 0;
            }
        }

        binder.update(dt);
        self.order = order;
    }

    fn alloc_target(&mut self, target: Target) -> TargetId {
        match self.targets.iter().position(|s| s.is_none()) {
            Some(i) => {
                self.targets[i] = Some(target);
                TargetId(i as u32)
            }
            None => {
                self.targets.push(Some(target));
                TargetId((self.targets.len() - 1) as u32)
            }
        }
    }
}
