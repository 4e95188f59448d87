//! Shared test fixtures for the Lamina blend workspace.
//!
//! Provides a scriptable rig (`TestRig`, a [`Binder`]) and clip
//! (`TestClip`, a [`Clip`]) plus the canonical `fixtures/rig.json`
//! description, so integration tests and benches across crates drive the
//! core through the same collaborators.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

use lamina_blend_core::{BindHandle, Binder, Clip, ClipRef, Destination, TrackKind};

static RIG: Lazy<RigSpec> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/rig.json");
    serde_json::from_str(raw).expect("rig fixture should parse")
});

/// Declarative rig description backing [`TestRig`].
#[derive(Debug, Clone, Deserialize)]
pub struct RigSpec {
    pub name: String,
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub path: String,
    pub kind: TrackKind,
    pub transform: bool,
    pub rest: Vec<f32>,
}

/// The canonical rig fixture (`fixtures/rig.json`), parsed once.
pub fn rig_spec() -> &'static RigSpec {
    &RIG
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

/// Load an alternative rig description from the fixtures directory.
pub fn load_rig(rel: &str) -> Result<RigSpec> {
    let path = fixtures_root().join(rel);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse rig fixture {rel}"))
}

/// One destination slot of a [`TestRig`].
#[derive(Debug, Clone)]
pub struct RigSlot {
    pub path: String,
    pub kind: TrackKind,
    pub is_transform: bool,
    pub rest: Vec<f32>,
    pub current: Vec<f32>,
    /// How many times a value was applied to this slot.
    pub writes: usize,
}

/// In-memory rig implementing [`Binder`].
///
/// Resolution is by exact path; slots record every applied value so tests
/// can assert on the final composed output and on write counts.
#[derive(Debug, Default)]
pub struct TestRig {
    slots: Vec<RigSlot>,
    by_path: HashMap<String, u32>,
    pub resolve_calls: usize,
    pub unresolve_calls: usize,
    pub update_calls: Vec<f32>,
}

impl TestRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the rig described by `fixtures/rig.json`.
    pub fn from_fixture() -> Self {
        Self::from_spec(rig_spec())
    }

    pub fn from_spec(spec: &RigSpec) -> Self {
        let mut rig = Self::new();
        for node in &spec.nodes {
            rig.add_node(&node.path, node.kind, node.transform, &node.rest);
        }
        rig
    }

    pub fn add_node(&mut self, path: &str, kind: TrackKind, is_transform: bool, rest: &[f32]) {
        let handle = self.slots.len() as u32;
        self.slots.push(RigSlot {
            path: path.to_string(),
            kind,
            is_transform,
            rest: rest.to_vec(),
            current: rest.to_vec(),
            writes: 0,
        });
        self.by_path.insert(path.to_string(), handle);
    }

    pub fn slot(&self, path: &str) -> Option<&RigSlot> {
        let idx = *self.by_path.get(path)?;
        self.slots.get(idx as usize)
    }

    /// Current value of a slot; panics on unknown path (test helper).
    pub fn current(&self, path: &str) -> &[f32] {
        &self.slot(path).expect("rig slot should exist").current
    }

    pub fn writes(&self, path: &str) -> usize {
        self.slot(path).map(|s| s.writes).unwrap_or(0)
    }
}

impl Binder for TestRig {
    fn resolve(&mut self, path: &str) -> Option<Destination> {
        self.resolve_calls += 1;
        let idx = *self.by_path.get(path)?;
        let slot = &self.slots[idx as usize];
        Some(Destination {
            handle: BindHandle(idx),
            kind: slot.kind,
            is_transform: slot.is_transform,
        })
    }

    fn unresolve(&mut self, _path: &str) {
        self.unresolve_calls += 1;
    }

    fn fetch(&self, handle: BindHandle, out: &mut [f32]) {
        if let Some(slot) = self.slots.get(handle.0 as usize) {
            let n = out.len().min(slot.current.len());
            out[..n].copy_from_slice(&slot.current[..n]);
        }
    }

    fn apply(&mut self, handle: BindHandle, value: &[f32]) {
        if let Some(slot) = self.slots.get_mut(handle.0 as usize) {
            let n = value.len().min(slot.current.len());
            slot.current[..n].copy_from_slice(&value[..n]);
            slot.writes += 1;
        }
    }

    fn update(&mut self, dt: f32) {
        self.update_calls.push(dt);
    }
}

#[derive(Debug, Clone)]
struct TestCurve {
    paths: Vec<String>,
    sample: Vec<f32>,
}

/// Scriptable clip implementing [`Clip`].
///
/// Samples are fixed per curve until a test swaps them with `set_sample`;
/// `advance` only records the dt it was given.
#[derive(Debug, Clone)]
pub struct TestClip {
    name: String,
    pub weight: f32,
    pub order: f32,
    curves: Vec<TestCurve>,
    pub advanced: Vec<f32>,
}

impl TestClip {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            weight: 1.0,
            order: 0.0,
            curves: Vec::new(),
            advanced: Vec::new(),
        }
    }

    pub fn weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn order(mut self, order: f32) -> Self {
        self.order = order;
        self
    }

    /// Add a curve driving one or more paths with a fixed sample.
    pub fn curve(mut self, paths: &[&str], sample: &[f32]) -> Self {
        self.curves.push(TestCurve {
            paths: paths.iter().map(|p| p.to_string()).collect(),
            sample: sample.to_vec(),
        });
        self
    }

    pub fn set_sample(&mut self, curve: usize, sample: &[f32]) {
        if let Some(c) = self.curves.get_mut(curve) {
            c.sample = sample.to_vec();
        }
    }

    pub fn into_ref(self) -> Rc<RefCell<TestClip>> {
        Rc::new(RefCell::new(self))
    }
}

impl Clip for TestClip {
    fn name(&self) -> &str {
        &self.name
    }

    fn blend_weight(&self) -> f32 {
        self.weight
    }

    fn blend_order(&self) -> f32 {
        self.order
    }

    fn advance(&mut self, dt: f32) {
        self.advanced.push(dt);
    }

    fn curve_count(&self) -> usize {
        self.curves.len()
    }

    fn curve_paths(&self, curve: usize) -> &[String] {
        &self.curves[curve].paths
    }

    fn sample(&self, curve: usize, out: &mut [f32]) {
        let sample = &self.curves[curve].sample;
        let n = out.len().min(sample.len());
        out[..n].copy_from_slice(&sample[..n]);
    }
}

/// Erase a concrete clip to the core's shared reference type.
pub fn clip_ref(clip: Rc<RefCell<TestClip>>) -> ClipRef {
    clip
}
