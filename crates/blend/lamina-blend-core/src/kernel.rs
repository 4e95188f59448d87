//! Blending kernel: stateless vector/quaternion arithmetic and a stable sort.
//!
//! All functions operate on plain `f32` slices so Targets and TargetValues can
//! blend in place without copying into math types. Quaternions are (x, y, z, w).

use crate::value::TrackKind;

/// Sum of component-wise products.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scale `v` to unit length in place. Zero-length input is left unchanged
/// to avoid a divide-by-zero NaN.
#[inline]
pub fn normalize(v: &mut [f32]) {
    let len2 = dot(v, v);
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        for x in v.iter_mut() {
            *x *= inv_len;
        }
    }
}

/// Copy `src` into `dst`; quaternions are renormalized on the way in.
#[inline]
pub fn set(dst: &mut [f32], src: &[f32], kind: TrackKind) {
    dst.copy_from_slice(src);
    if kind == TrackKind::Quaternion {
        normalize(dst);
    }
}

/// `dst = dst * (additive ? 1 : 1 - t) + src * t`, component-wise.
#[inline]
pub fn blend_vec(dst: &mut [f32], src: &[f32], t: f32, additive: bool) {
    let keep = if additive { 1.0 } else { 1.0 - t };
    for (d, s) in dst.iter_mut().zip(src) {
        *d = *d * keep + *s * t;
    }
}

/// Weighted quaternion combination with shortest-arc sign correction.
///
/// If `dot(dst, src) < 0` the interpolation parameter is negated so the
/// double-cover ambiguity never sends the blend the long way around. The
/// result is renormalized unless `additive`. This is a linear approximation
/// of spherical interpolation, adequate for small per-frame deltas.
#[inline]
pub fn blend_quat(dst: &mut [f32], src: &[f32], t: f32, additive: bool) {
    let t = if dot(dst, src) < 0.0 { -t } else { t };
    blend_vec(dst, src, t, additive);
    if !additive {
        normalize(dst);
    }
}

/// Dispatch to [`blend_vec`] or [`blend_quat`] by kind.
#[inline]
pub fn blend(dst: &mut [f32], src: &[f32], t: f32, kind: TrackKind, additive: bool) {
    match kind {
        TrackKind::Vector => blend_vec(dst, src, t, additive),
        TrackKind::Quaternion => blend_quat(dst, src, t, additive),
    }
}

/// Hamilton product `a * b` (x, y, z, w).
#[inline]
pub fn quat_mul(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    [
        a[3] * b[0] + a[0] * b[3] + a[1] * b[2] - a[2] * b[1],
        a[3] * b[1] - a[0] * b[2] + a[1] * b[3] + a[2] * b[0],
        a[3] * b[2] + a[0] * b[1] - a[1] * b[0] + a[2] * b[3],
        a[3] * b[3] - a[0] * b[0] - a[1] * b[1] - a[2] * b[2],
    ]
}

/// Conjugate of `q`; the inverse for unit quaternions.
#[inline]
pub fn quat_conjugate(q: [f32; 4]) -> [f32; 4] {
    [-q[0], -q[1], -q[2], q[3]]
}

/// Insertion sort: stable, in place.
///
/// Per-layer clip counts stay small, so the O(n²) cost is irrelevant;
/// stability is the contract callers rely on for deterministic blend order.
pub fn stable_sort_by<T, F>(items: &mut [T], less: F)
where
    F: Fn(&T, &T) -> bool,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && less(&items[j], &items[j - 1]) {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}
