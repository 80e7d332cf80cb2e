//! Scalar easing helpers.

/// Clamp into `[0, 1]`. NaN maps to 0.
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}

/// Hermite smoothstep `t² (3 − 2t)` after clamping `t` into `[0, 1]`.
///
/// Soft S-curve: zero slope at both ends, exactly 0 at `t ≤ 0` and exactly 1
/// at `t ≥ 1`.
pub fn smoothstep(t: f64) -> f64 {
    let t = clamp01(t);
    t * t * (3.0 - 2.0 * t)
}
