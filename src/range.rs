//! Range and math utilities (spec C7): clamps, smooth min/max, smoothstep
//! family, remap, saturate, and generic vector utilities.

use crate::array::Array;

pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    x.clamp(lo, hi)
}

pub fn clamp_min(array: &mut Array, lo: f32) {
    array.data.iter_mut().for_each(|v| *v = v.max(lo));
}

pub fn clamp_max(array: &mut Array, hi: f32) {
    array.data.iter_mut().for_each(|v| *v = v.min(hi));
}

/// Polynomial smooth-min, parameterized by blending radius `k`.
pub fn smooth_min(a: f32, b: f32, k: f32) -> f32 {
    if k <= 0.0 {
        return a.min(b);
    }
    let h = (k - (a - b).abs()).max(0.0) / k;
    a.min(b) - h * h * k * 0.25
}

pub fn smooth_max(a: f32, b: f32, k: f32) -> f32 {
    -smooth_min(-a, -b, k)
}

/// Quintic smoothstep: `r*(r*6-15)+10)*r*r*r`, the stitching profile used in
/// `Heightmap::smooth_overlap_buffers` (C12).
pub fn smoothstep5(r: f32) -> f32 {
    let r = r.clamp(0.0, 1.0);
    (r * (r * 6.0 - 15.0) + 10.0) * r * r * r
}

/// Cubic smoothstep: `3r^2 - 2r^3`.
pub fn smoothstep3(r: f32) -> f32 {
    let r = r.clamp(0.0, 1.0);
    r * r * (3.0 - 2.0 * r)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn lerp_array(a: &Array, b: &Array, mask: &Array) -> Array {
    let mut out = Array::new(a.shape);
    for k in 0..a.size() {
        out.data[k] = lerp(a.data[k], b.data[k], mask.data[k]);
    }
    out
}

/// Linear remap of `x` from `[in_lo, in_hi]` to `[out_lo, out_hi]`.
pub fn remap(x: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    let (a, b) = Array::normalization_coeff(in_lo, in_hi);
    out_lo + (out_hi - out_lo) * (x * a + b)
}

pub fn remap_array(array: &mut Array, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) {
    array
        .data
        .iter_mut()
        .for_each(|v| *v = remap(*v, in_lo, in_hi, out_lo, out_hi));
}

/// Clamp `x` into `[lo, hi]` with a smooth transition of width `k` at each
/// bound (soft clipping, used by stream-power erosion's accumulation clip).
pub fn saturate(x: f32, lo: f32, hi: f32, k: f32) -> f32 {
    let y = smooth_max(x, lo, k);
    smooth_min(y, hi, k)
}

/// `n` evenly spaced samples over `[a, b]`; `endpoint=false` excludes `b`
/// (matching upstream `linspace(.., false)` usage for pixel-center grids).
pub fn linspace(a: f32, b: f32, n: usize, endpoint: bool) -> Vec<f32> {
    if n == 0 {
        return vec![];
    }
    if n == 1 {
        return vec![a];
    }
    let denom = if endpoint { n - 1 } else { n } as f32;
    let step = (b - a) / denom;
    (0..n).map(|i| a + step * i as f32).collect()
}

/// Indices that would sort `v` ascending.
pub fn argsort(v: &[f32]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..v.len()).collect();
    idx.sort_by(|&a, &b| v[a].partial_cmp(&v[b]).unwrap());
    idx
}

pub fn unique(v: &[f32]) -> Vec<f32> {
    let mut out = v.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap());
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_endpoints() {
        assert!((smoothstep5(0.0) - 0.0).abs() < 1e-6);
        assert!((smoothstep5(1.0) - 1.0).abs() < 1e-6);
        assert!(smoothstep5(0.5) > 0.0 && smoothstep5(0.5) < 1.0);
    }

    #[test]
    fn mask_blend_law() {
        let a = Array::filled(crate::algebra::Vec2i::new(2, 2), 1.0);
        let b = Array::filled(a.shape, 2.0);
        let ones = Array::filled(a.shape, 1.0);
        let zeros = Array::new(a.shape);
        assert_eq!(lerp_array(&a, &b, &ones).data, b.data);
        assert_eq!(lerp_array(&a, &b, &zeros).data, a.data);
    }

    #[test]
    fn linspace_basic() {
        let v = linspace(0.0, 1.0, 4, true);
        assert_eq!(v.len(), 4);
        assert!((v[0] - 0.0).abs() < 1e-6);
        assert!((v[3] - 1.0).abs() < 1e-6);
    }
}
