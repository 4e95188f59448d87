use lamina_blend_core::kernel::{
    blend, blend_quat, blend_vec, dot, normalize, set, stable_sort_by,
};
use lamina_blend_core::value::TrackKind;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn approx_all(a: &[f32], b: &[f32], eps: f32) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        approx(*x, *y, eps);
    }
}

fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// it should compute dot commutatively for equal-length inputs
#[test]
fn dot_commutative() {
    let pairs: &[(&[f32], &[f32])] = &[
        (&[1.0, 2.0, 3.0], &[-4.0, 5.0, 0.5]),
        (&[0.0, 0.0, 0.0, 1.0], &[0.3, -0.2, 0.9, 0.1]),
        (&[7.5, -2.25], &[1.0, 4.0]),
    ];
    for (a, b) in pairs {
        approx(dot(a, b), dot(b, a), 1e-6);
    }
}

/// it should normalize to unit length and leave the zero vector unchanged
#[test]
fn normalize_unit_and_zero() {
    let mut v = [3.0, 0.0, 4.0];
    normalize(&mut v);
    approx(norm(&v), 1.0, 1e-6);
    approx_all(&v, &[0.6, 0.0, 0.8], 1e-6);

    let mut z = [0.0, 0.0, 0.0, 0.0];
    normalize(&mut z);
    approx_all(&z, &[0.0; 4], 0.0);
}

/// it should keep dst at unit length after any non-additive quat blend
#[test]
fn blend_quat_stays_unit() {
    let cases = [
        ([0.0, 0.0, 0.0, 1.0], [0.0, 0.70710677, 0.0, 0.70710677], 0.5),
        ([0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 0.0, -1.0], 0.25),
        ([0.5, 0.5, 0.5, 0.5], [0.0, 0.0, 0.0, 1.0], 0.9),
    ];
    for (dst, src, t) in cases {
        let mut d = dst;
        blend_quat(&mut d, &src, t, false);
        approx(norm(&d), 1.0, 1e-5);
    }
}

/// it should negate the interpolation parameter when dot(dst, src) < 0
#[test]
fn blend_quat_short_path() {
    let dst = [0.0, 0.0, 0.0, 1.0];
    let src = [0.0, 0.70710677, 0.0, -0.70710677];
    assert!(dot(&dst, &src) < 0.0);

    let mut quat = dst;
    blend_quat(&mut quat, &src, 0.3, false);

    // Same weighted combination with t = -0.3, then normalized.
    let mut expect = dst;
    blend_vec(&mut expect, &src, -0.3, false);
    normalize(&mut expect);
    approx_all(&quat, &expect, 1e-6);
}

/// it should blend vectors as dst*(1-t) + src*t, and additively as dst + src*t
#[test]
fn blend_vec_weighted_and_additive() {
    let mut d = [1.0, 2.0, 3.0];
    blend_vec(&mut d, &[3.0, 2.0, 1.0], 0.5, false);
    approx_all(&d, &[2.0, 2.0, 2.0], 1e-6);

    let mut a = [1.0, 2.0, 3.0];
    blend_vec(&mut a, &[4.0, 4.0, 4.0], 0.25, true);
    approx_all(&a, &[2.0, 3.0, 4.0], 1e-6);
}

/// it should renormalize quaternions on set and plain-copy vectors
#[test]
fn set_by_kind() {
    let mut q = [0.0; 4];
    set(&mut q, &[0.0, 2.0, 0.0, 0.0], TrackKind::Quaternion);
    approx_all(&q, &[0.0, 1.0, 0.0, 0.0], 1e-6);

    let mut v = [0.0; 3];
    set(&mut v, &[0.5, -0.5, 9.0], TrackKind::Vector);
    approx_all(&v, &[0.5, -0.5, 9.0], 0.0);
}

/// it should dispatch blend() by kind
#[test]
fn blend_dispatch() {
    let mut v = [0.0, 0.0, 0.0];
    blend(&mut v, &[1.0, 1.0, 1.0], 0.5, TrackKind::Vector, false);
    approx_all(&v, &[0.5, 0.5, 0.5], 1e-6);

    let mut q = [0.0, 0.0, 0.0, 1.0];
    blend(
        &mut q,
        &[0.0, 0.70710677, 0.0, 0.70710677],
        0.5,
        TrackKind::Quaternion,
        false,
    );
    approx(norm(&q), 1.0, 1e-5);
}

/// it should preserve relative order of equal keys (stability)
#[test]
fn stable_sort_preserves_equal_key_order() {
    let mut items = [(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (2, 'e')];
    stable_sort_by(&mut items, |x, y| x.0 < y.0);
    assert_eq!(items, [(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c'), (2, 'e')]);
}

/// it should sort ascending and handle empty/single slices
#[test]
fn stable_sort_basics() {
    let mut empty: [i32; 0] = [];
    stable_sort_by(&mut empty, |a, b| a < b);

    let mut one = [42];
    stable_sort_by(&mut one, |a, b| a < b);
    assert_eq!(one, [42]);

    let mut many = [5, 3, 9, 1, 3];
    stable_sort_by(&mut many, |a, b| a < b);
    assert_eq!(many, [1, 3, 3, 5, 9]);
}
