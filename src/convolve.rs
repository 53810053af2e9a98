//! Convolution (spec C5), grounded on `HighMap/src/convolve/convolve.cpp`
//! (separable/truncated) and `convolve2d_svd.cpp` (rank-k SVD approximation,
//! here backed by `nalgebra` in place of upstream's GSL thin SVD).

use crate::algebra::Vec2i;
use crate::array::Array;
use nalgebra::DMatrix;

/// Reflects `idx` across `[0, n)`'s edges (mirrors about `-0.5` and
/// `n - 0.5`, then clamps), matching upstream `convolve1d_i`/`_j`'s boundary
/// handling exactly.
fn reflect_clamped(idx: i32, n: i32) -> i32 {
    let reflected = if idx < 0 {
        -idx
    } else if idx > n - 1 {
        2 * n - 1 - idx
    } else {
        idx
    };
    reflected.clamp(0, n - 1)
}

/// 1-D convolution along i with reflective padding; the kernel's reference
/// tap is offset by `i1 = ceil(nk/2)` (not `nk/2`), so it shares the exact
/// same asymmetric centering as [`convolve2d_truncated`] — the two must
/// agree or separable and direct 2-D convolution silently diverge by a
/// one-cell shift. Output shape equals input shape.
pub fn convolve1d_i(array: &Array, kernel: &[f32]) -> Array {
    let nk = kernel.len() as i32;
    let i1 = (nk + 1) / 2;
    let mut out = Array::new(array.shape);
    for (p, &kv) in kernel.iter().enumerate() {
        let p = p as i32;
        for i in 0..array.shape.x {
            let si = reflect_clamped(i + p - i1, array.shape.x);
            for j in 0..array.shape.y {
                out.add_to(i, j, kv * array.at(si, j));
            }
        }
    }
    out
}

pub fn convolve1d_j(array: &Array, kernel: &[f32]) -> Array {
    let nk = kernel.len() as i32;
    let j1 = (nk + 1) / 2;
    let mut out = Array::new(array.shape);
    for (q, &kv) in kernel.iter().enumerate() {
        let q = q as i32;
        for j in 0..array.shape.y {
            let sj = reflect_clamped(j + q - j1, array.shape.y);
            for i in 0..array.shape.x {
                out.add_to(i, j, kv * array.at(i, sj));
            }
        }
    }
    out
}

/// Pads `array` by `(i1, i2)` on the x axis and `(j1, j2)` on the y axis,
/// reflecting the interior across each new edge (matches upstream
/// `generate_buffered_array`'s asymmetric-buffer reflect scheme, used when a
/// kernel's extent doesn't split evenly around its center).
fn generate_buffered_array(array: &Array, i1: i32, i2: i32, j1: i32, j2: i32) -> Array {
    let shape = Vec2i::new(array.shape.x + i1 + i2, array.shape.y + j1 + j2);
    let mut out = Array::new(shape);
    for i in 0..array.shape.x {
        for j in 0..array.shape.y {
            out.set(i + i1, j + j1, array.at(i, j));
        }
    }

    for j in j1..(shape.y - j2) {
        for i in 0..i1 {
            out.set(i, j, out.at(2 * i1 - i, j));
        }
    }
    for j in j1..(shape.y - j2) {
        for i in (shape.x - i2)..shape.x {
            out.set(i, j, out.at(2 * (shape.x - i2) - i - 1, j));
        }
    }
    for j in 0..j1 {
        for i in 0..shape.x {
            out.set(i, j, out.at(i, 2 * j1 - j));
        }
    }
    for j in (shape.y - j2)..shape.y {
        for i in 0..shape.x {
            out.set(i, j, out.at(i, 2 * (shape.y - j2) - j - 1));
        }
    }
    out
}

/// Full 2-D convolution: buffers the input (kernel extent split as
/// `i1 = ceil(kx/2), i2 = kx - i1`, same on y) then calls
/// [`convolve2d_truncated`], so the output shape matches the input shape.
pub fn convolve2d(array: &Array, kernel: &Array) -> Array {
    let i1 = (kernel.shape.x + 1) / 2;
    let i2 = kernel.shape.x - i1;
    let j1 = (kernel.shape.y + 1) / 2;
    let j2 = kernel.shape.y - j1;
    let buffered = generate_buffered_array(array, i1, i2, j1, j2);
    convolve2d_truncated(&buffered, kernel)
}

/// Direct multiply-accumulate 2-D convolution ("valid" mode); output shape
/// is `input.shape - kernel.shape`.
pub fn convolve2d_truncated(array: &Array, kernel: &Array) -> Array {
    let out_shape = Vec2i::new(
        array.shape.x - kernel.shape.x,
        array.shape.y - kernel.shape.y,
    );
    let mut out = Array::new(out_shape);
    for i in 0..out_shape.x {
        for j in 0..out_shape.y {
            let mut acc = 0.0;
            for ki in 0..kernel.shape.x {
                for kj in 0..kernel.shape.y {
                    acc += kernel.at(ki, kj) * array.at(i + ki, j + kj);
                }
            }
            out.set(i, j, acc);
        }
    }
    out
}

/// Thin SVD of `kernel` truncated to `rank` triplets: returns column
/// vectors `u[r]` (length `kernel.shape.x`), `v[r]` (length
/// `kernel.shape.y`), and singular values `s[r]`.
fn thin_svd(kernel: &Array, rank: usize) -> (Vec<Vec<f32>>, Vec<Vec<f32>>, Vec<f32>) {
    let (nx, ny) = (kernel.shape.x as usize, kernel.shape.y as usize);
    let m = DMatrix::from_fn(nx, ny, |i, j| kernel.at(i as i32, j as i32) as f64);
    let svd = m.svd(true, true);
    let u = svd.u.unwrap();
    let vt = svd.v_t.unwrap();
    let s = svd.singular_values;

    let rank = rank.min(s.len());
    let mut us = Vec::with_capacity(rank);
    let mut vs = Vec::with_capacity(rank);
    let mut ss = Vec::with_capacity(rank);
    for r in 0..rank {
        us.push((0..nx).map(|i| u[(i, r)] as f32).collect());
        vs.push((0..ny).map(|j| vt[(r, j)] as f32).collect());
        ss.push(s[r] as f32);
    }
    (us, vs, ss)
}

/// Approximate `convolve2d` by summing `rank` separable passes weighted by
/// the kernel's singular values.
pub fn convolve2d_svd(array: &Array, kernel: &Array, rank: usize) -> Array {
    let (us, vs, ss) = thin_svd(kernel, rank);
    let mut out = Array::new(array.shape);
    for r in 0..us.len() {
        let pass = convolve1d_j(&convolve1d_i(array, &us[r]), &vs[r]);
        out.add_assign_array(&pass.mul_scalar(ss[r]));
    }
    out
}

/// A deterministic sparse binary mask with density `p` of ones, seeded.
fn white_sparse_binary(shape: Vec2i, density: f32, seed: u64) -> Array {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = Array::new(shape);
    for v in out.data.iter_mut() {
        *v = if rng.gen::<f32>() < density { 1.0 } else { 0.0 };
    }
    out
}

/// `n_rotations` angles spanning 360 degrees; for each, a sparse binary
/// mask (density = 1/n_rotations) isolates a sub-support and an
/// SVD-approximated convolution is accumulated using the *rotated* kernel
/// (this crate's resolution of an apparent upstream inconsistency — see
/// DESIGN.md).
pub fn convolve2d_svd_rotated_kernel(
    array: &Array,
    kernel: &Array,
    rank: usize,
    n_rotations: usize,
    seed: u64,
) -> Array {
    let density = 1.0 / n_rotations.max(1) as f32;
    let mut out = Array::new(array.shape);
    for r in 0..n_rotations {
        let angle = r as f32 * 360.0 / n_rotations.max(1) as f32;
        let mask = white_sparse_binary(array.shape, density, seed.wrapping_add(r as u64));
        let masked = array.mul_array(&mask);
        let kr = crate::transform_ops::rotate(kernel, angle, true);
        let pass = convolve2d_svd(&masked, &kr, rank);
        out.add_assign_array(&pass);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separable_kernel_matches_2d() {
        let shape = Vec2i::new(9, 9);
        let a = Array::from_vec(
            shape,
            (0..81).map(|v| (v as f32 * 0.37).sin()).collect(),
        );
        let u = vec![0.25, 0.5, 0.25];
        let v = vec![0.25, 0.5, 0.25];
        let mut kernel = Array::new(Vec2i::new(3, 3));
        for i in 0..3 {
            for j in 0..3 {
                kernel.set(i, j, u[i as usize] * v[j as usize]);
            }
        }
        let full = convolve2d(&a, &kernel);
        let sep = convolve1d_j(&convolve1d_i(&a, &u), &v);
        for k in 0..full.size() {
            assert!((full.data[k] - sep.data[k]).abs() < 1e-3);
        }
    }

    #[test]
    fn svd_rank1_recovers_separable_kernel() {
        let shape = Vec2i::new(12, 12);
        let a = Array::from_vec(shape, (0..144).map(|v| v as f32 * 0.1).collect());
        let u = [0.2, 0.6, 0.2];
        let v = [0.3, 0.4, 0.3];
        let mut kernel = Array::new(Vec2i::new(3, 3));
        for i in 0..3 {
            for j in 0..3 {
                kernel.set(i, j, u[i as usize] * v[j as usize]);
            }
        }
        let i1 = (kernel.shape.x + 1) / 2;
        let i2 = kernel.shape.x - i1;
        let j1 = (kernel.shape.y + 1) / 2;
        let j2 = kernel.shape.y - j1;
        let buffered = generate_buffered_array(&a, i1, i2, j1, j2);
        let truncated = convolve2d_truncated(&buffered, &kernel);
        let svd_approx = convolve2d_svd(&a, &kernel, 1);
        assert_eq!(truncated.shape, svd_approx.shape);
        for k in 0..truncated.size() {
            assert!((truncated.data[k] - svd_approx.data[k]).abs() < 1e-2);
        }
    }
}
