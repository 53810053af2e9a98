//! Recurve family: monotone 1-D remappings applied element-wise (spec C9).

use crate::array::Array;

fn apply(array: &mut Array, f: impl Fn(f32) -> f32) {
    array.data.iter_mut().for_each(|v| *v = f(*v));
}

/// Generic recurve: caller-supplied monotone mapping `t -> v`.
pub fn recurve(array: &mut Array, f: impl Fn(f32) -> f32) {
    apply(array, f);
}

/// Bounded-exponential S-curve: `v = 1 - exp(-k*t)`, renormalized to
/// `[0, 1]` on the input's current range.
pub fn recurve_bexp(array: &mut Array, k: f32) {
    let (vmin, vmax) = (array.min(), array.max());
    let (a, b) = Array::normalization_coeff(vmin, vmax);
    apply(array, |v| {
        let t = v * a + b;
        let y = 1.0 - (-k * t).exp();
        let norm = 1.0 - (-k).exp();
        vmin + (vmax - vmin) * (y / norm)
    });
}

/// Smoothstep-based S-curve.
pub fn recurve_s(array: &mut Array) {
    let (vmin, vmax) = (array.min(), array.max());
    let (a, b) = Array::normalization_coeff(vmin, vmax);
    apply(array, |v| {
        let t = v * a + b;
        vmin + (vmax - vmin) * crate::range::smoothstep3(t)
    });
}

/// Kumaraswamy-distribution-shaped recurve with parameters `(alpha, beta)`.
pub fn recurve_kura(array: &mut Array, alpha: f32, beta: f32) {
    let (vmin, vmax) = (array.min(), array.max());
    let (a, b) = Array::normalization_coeff(vmin, vmax);
    apply(array, |v| {
        let t = (v * a + b).clamp(0.0, 1.0);
        let y = 1.0 - (1.0 - t.powf(alpha)).powf(beta);
        vmin + (vmax - vmin) * y
    });
}

/// Rational smoothstep-like recurve with sharpness `k`.
pub fn recurve_smoothstep(array: &mut Array, k: f32) {
    let (vmin, vmax) = (array.min(), array.max());
    let (a, b) = Array::normalization_coeff(vmin, vmax);
    apply(array, |v| {
        let t = (v * a + b).clamp(0.0, 1.0);
        let y = t.powf(k) / (t.powf(k) + (1.0 - t).powf(k)).max(1e-6);
        vmin + (vmax - vmin) * y
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec2i;

    #[test]
    fn recurve_s_is_monotone_on_sorted_input() {
        let mut a = Array::from_vec(Vec2i::new(5, 1), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        recurve_s(&mut a);
        for w in a.data.windows(2) {
            assert!(w[1] >= w[0] - 1e-6);
        }
    }
}
