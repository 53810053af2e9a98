//! Owned 2-D row-major float grid (spec C2), grounded on the teacher's
//! `Tilemap<T>` (`src/tilemap.rs`, since removed) generalized from a
//! horizontally-wrapping game-map grid to a plain bounds-checked-by-caller
//! array, and on `HighMap/src/array/array_methods.cpp` for the exact
//! sampling/resampling semantics.

use crate::algebra::{Vec2, Vec2i, Vec4, Vec4i};

/// Owned 2-D row-major float grid. Index `(i, j)` with `0 <= i < shape.x`,
/// `0 <= j < shape.y`; storage is `i * shape.y + j` (x leading, y trailing).
#[derive(Clone, Debug)]
pub struct Array {
    pub shape: Vec2i,
    pub data: Vec<f32>,
}

impl Array {
    pub fn new(shape: Vec2i) -> Self {
        Self {
            shape,
            data: vec![0.0; (shape.x * shape.y) as usize],
        }
    }

    pub fn filled(shape: Vec2i, value: f32) -> Self {
        Self {
            shape,
            data: vec![value; (shape.x * shape.y) as usize],
        }
    }

    pub fn from_vec(shape: Vec2i, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), (shape.x * shape.y) as usize);
        Self { shape, data }
    }

    #[inline]
    pub fn linear_index(&self, i: i32, j: i32) -> usize {
        (i * self.shape.y + j) as usize
    }

    pub fn linear_index_reverse(&self, k: usize) -> (i32, i32) {
        let k = k as i32;
        (k / self.shape.y, k % self.shape.y)
    }

    #[inline]
    pub fn at(&self, i: i32, j: i32) -> f32 {
        self.data[self.linear_index(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: i32, j: i32, v: f32) {
        let k = self.linear_index(i, j);
        self.data[k] = v;
    }

    #[inline]
    pub fn add_to(&mut self, i: i32, j: i32, v: f32) {
        let k = self.linear_index(i, j);
        self.data[k] += v;
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn fill(&mut self, v: f32) {
        self.data.iter_mut().for_each(|e| *e = v);
    }

    // --- element-wise arithmetic ---

    pub fn add_scalar(&self, s: f32) -> Array {
        self.map(|v| v + s)
    }
    pub fn sub_scalar(&self, s: f32) -> Array {
        self.map(|v| v - s)
    }
    pub fn mul_scalar(&self, s: f32) -> Array {
        self.map(|v| v * s)
    }
    pub fn div_scalar(&self, s: f32) -> Array {
        self.map(|v| v / s)
    }

    pub fn add_assign_scalar(&mut self, s: f32) {
        self.data.iter_mut().for_each(|v| *v += s);
    }
    pub fn sub_assign_scalar(&mut self, s: f32) {
        self.data.iter_mut().for_each(|v| *v -= s);
    }
    pub fn mul_assign_scalar(&mut self, s: f32) {
        self.data.iter_mut().for_each(|v| *v *= s);
    }
    pub fn div_assign_scalar(&mut self, s: f32) {
        self.data.iter_mut().for_each(|v| *v /= s);
    }

    pub fn add_array(&self, other: &Array) -> Array {
        self.zip(other, |a, b| a + b)
    }
    pub fn sub_array(&self, other: &Array) -> Array {
        self.zip(other, |a, b| a - b)
    }
    pub fn mul_array(&self, other: &Array) -> Array {
        self.zip(other, |a, b| a * b)
    }
    pub fn div_array(&self, other: &Array) -> Array {
        self.zip(other, |a, b| a / b)
    }

    pub fn add_assign_array(&mut self, other: &Array) {
        self.zip_assign(other, |a, b| a + b);
    }
    pub fn sub_assign_array(&mut self, other: &Array) {
        self.zip_assign(other, |a, b| a - b);
    }
    pub fn mul_assign_array(&mut self, other: &Array) {
        self.zip_assign(other, |a, b| a * b);
    }
    pub fn div_assign_array(&mut self, other: &Array) {
        self.zip_assign(other, |a, b| a / b);
    }

    pub fn neg(&self) -> Array {
        self.map(|v| -v)
    }

    fn map(&self, f: impl Fn(f32) -> f32) -> Array {
        Array::from_vec(self.shape, self.data.iter().map(|&v| f(v)).collect())
    }

    fn zip(&self, other: &Array, f: impl Fn(f32, f32) -> f32) -> Array {
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Array::from_vec(self.shape, data)
    }

    fn zip_assign(&mut self, other: &Array, f: impl Fn(f32, f32) -> f32) {
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a = f(*a, b);
        }
    }

    // --- reductions ---

    pub fn min(&self) -> f32 {
        self.data.iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    pub fn mean(&self) -> f32 {
        self.sum() / self.data.len() as f32
    }

    pub fn ptp(&self) -> f32 {
        self.max() - self.min()
    }

    pub fn unique_values(&self) -> Vec<f32> {
        let mut v: Vec<f32> = self.data.clone();
        v.sort_by(|a, b| a.partial_cmp(b).unwrap());
        v.dedup();
        v
    }

    /// Divide all entries by the sum. Undefined (NaN) if sum is 0, matching
    /// upstream `Array::normalize`.
    pub fn normalize(&mut self) {
        let s = self.sum();
        self.div_assign_scalar(s);
    }

    /// `(a, b)` such that `a*x + b` maps `[vmin, vmax]` to `[0, 1]`. Returns
    /// `(0, 0)` when `vmin == vmax`, matching upstream.
    pub fn normalization_coeff(vmin: f32, vmax: f32) -> (f32, f32) {
        if vmax == vmin {
            (0.0, 0.0)
        } else {
            let a = 1.0 / (vmax - vmin);
            (a, -vmin * a)
        }
    }

    // --- slicing ---

    /// Exclusive upper bounds on `idx = (i1, i2, j1, j2)`, matching upstream
    /// `extract_slice` and the exclusive-bound convention this crate commits
    /// to everywhere (spec section 9's open question).
    pub fn extract_slice(&self, idx: Vec4i) -> Array {
        let ni = idx.b - idx.a;
        let nj = idx.d - idx.c;
        let mut out = Array::new(Vec2i::new(ni, nj));
        for i in 0..ni {
            for j in 0..nj {
                out.set(i, j, self.at(idx.a + i, idx.c + j));
            }
        }
        out
    }

    pub fn set_slice(&mut self, idx: Vec4i, value: f32) {
        for i in idx.a..idx.b {
            for j in idx.c..idx.d {
                self.set(i, j, value);
            }
        }
    }

    pub fn row_to_vector(&self, j: i32) -> Vec<f32> {
        (0..self.shape.x).map(|i| self.at(i, j)).collect()
    }

    pub fn col_to_vector(&self, i: i32) -> Vec<f32> {
        (0..self.shape.y).map(|j| self.at(i, j)).collect()
    }

    // --- sampling kernels ---

    /// Bilinear sample over the 2x2 block anchored at `(i, j)`; requires
    /// `i <= shape.x - 2`, `j <= shape.y - 2`, `u, v in [0, 1)`.
    pub fn value_bilinear_at(&self, i: i32, j: i32, u: f32, v: f32) -> f32 {
        let f00 = self.at(i, j);
        let f10 = self.at(i + 1, j);
        let f01 = self.at(i, j + 1);
        let f11 = self.at(i + 1, j + 1);
        let a10 = f10 - f00;
        let a01 = f01 - f00;
        let a11 = f11 - f10 - f01 + f00;
        f00 + a10 * u + a01 * v + a11 * u * v
    }

    /// Clamp `(x, y)` into `bbox` then round to the nearest cell (truncation
    /// toward zero, matching upstream `get_value_nearest`).
    pub fn value_nearest(&self, x: f32, y: f32, bbox: Vec4) -> f32 {
        let xc = x.clamp(bbox.a, bbox.b);
        let yc = y.clamp(bbox.c, bbox.d);
        let u = ((xc - bbox.a) / (bbox.b - bbox.a)).clamp(0.0, 1.0);
        let v = ((yc - bbox.c) / (bbox.d - bbox.c)).clamp(0.0, 1.0);
        let i = (u * (self.shape.x - 1) as f32) as i32;
        let j = (v * (self.shape.y - 1) as f32) as i32;
        self.at(
            i.clamp(0, self.shape.x - 1),
            j.clamp(0, self.shape.y - 1),
        )
    }

    /// Central-difference gradient at `(i, j)`, scaled by 0.5 as upstream.
    pub fn gradient_x_at(&self, i: i32, j: i32) -> f32 {
        0.5 * (self.at(i + 1, j) - self.at(i - 1, j))
    }

    pub fn gradient_y_at(&self, i: i32, j: i32) -> f32 {
        0.5 * (self.at(i, j + 1) - self.at(i, j - 1))
    }

    /// Bilinear-interpolated forward-difference gradient, matching upstream
    /// `get_gradient_x_bilinear_at`: forward differences at the 4 corners of
    /// the cell anchored at `(i, j)`, then bilinearly blended by `(u, v)`.
    pub fn gradient_x_bilinear_at(&self, i: i32, j: i32, u: f32, v: f32) -> f32 {
        let f00 = self.at(i + 1, j) - self.at(i, j);
        let f10 = self.at(i + 2, j) - self.at(i + 1, j);
        let f01 = self.at(i + 1, j + 1) - self.at(i, j + 1);
        let f11 = self.at(i + 2, j + 1) - self.at(i + 1, j + 1);
        let a10 = f10 - f00;
        let a01 = f01 - f00;
        let a11 = f11 - f10 - f01 + f00;
        f00 + a10 * u + a01 * v + a11 * u * v
    }

    pub fn gradient_y_bilinear_at(&self, i: i32, j: i32, u: f32, v: f32) -> f32 {
        let f00 = self.at(i, j + 1) - self.at(i, j);
        let f10 = self.at(i + 1, j + 1) - self.at(i + 1, j);
        let f01 = self.at(i, j + 2) - self.at(i, j + 1);
        let f11 = self.at(i + 1, j + 2) - self.at(i + 1, j + 1);
        let a10 = f10 - f00;
        let a01 = f01 - f00;
        let a11 = f11 - f10 - f01 + f00;
        f00 + a10 * u + a01 * v + a11 * u * v
    }

    pub fn normal_at(&self, i: i32, j: i32) -> (f32, f32, f32) {
        let gx = self.gradient_x_at(i, j);
        let gy = self.gradient_y_at(i, j);
        let n = crate::algebra::Vec3::new(-gx, -gy, 1.0).normalized();
        (n.x, n.y, n.z)
    }

    /// Radial-kernel deposition used by hydraulic erosion: add `amount *
    /// (1-u)(1-v)` etc. into the 2x2 block anchored at `(i, j)`.
    pub fn depose_amount_bilinear_at(&mut self, i: i32, j: i32, u: f32, v: f32, amount: f32) {
        self.add_to(i, j, amount * (1.0 - u) * (1.0 - v));
        self.add_to(i + 1, j, amount * u * (1.0 - v));
        self.add_to(i, j + 1, amount * (1.0 - u) * v);
        self.add_to(i + 1, j + 1, amount * u * v);
    }

    /// Bounds-clipped kernel accumulation: `self += amount * kernel`, clipped
    /// at the array edges.
    pub fn add_kernel(&mut self, kernel: &Array, ic: i32, jc: i32, amount: f32) {
        let ri = kernel.shape.x / 2;
        let rj = kernel.shape.y / 2;
        for ki in 0..kernel.shape.x {
            for kj in 0..kernel.shape.y {
                let i = ic + ki - ri;
                let j = jc + kj - rj;
                if i >= 0 && i < self.shape.x && j >= 0 && j < self.shape.y {
                    self.add_to(i, j, amount * kernel.at(ki, kj));
                }
            }
        }
    }

    // --- resampling ---

    /// Bilinear resample to `new_shape`. Reproduces the upstream edge-clamp
    /// quirk: at the last row/column, `u`/`v` collapse to `1.0` instead of
    /// indexing past the array (spec section 4.1 / open question).
    pub fn resample_to_shape(&self, new_shape: Vec2i) -> Array {
        let mut out = Array::new(new_shape);
        for oi in 0..new_shape.x {
            let x = if new_shape.x > 1 {
                oi as f32 / (new_shape.x - 1) as f32 * (self.shape.x - 1) as f32
            } else {
                0.0
            };
            let mut iref = x.floor() as i32;
            let mut u = x - iref as f32;
            if iref == self.shape.x - 1 {
                iref = self.shape.x - 2;
                u = 1.0;
            }
            let iref = iref.max(0);
            for oj in 0..new_shape.y {
                let y = if new_shape.y > 1 {
                    oj as f32 / (new_shape.y - 1) as f32 * (self.shape.y - 1) as f32
                } else {
                    0.0
                };
                let mut jref = y.floor() as i32;
                let mut v = y - jref as f32;
                if jref == self.shape.y - 1 {
                    jref = self.shape.y - 2;
                    v = 1.0;
                }
                let jref = jref.max(0);
                out.set(oi, oj, self.value_bilinear_at(iref, jref, u, v));
            }
        }
        out
    }

    /// Nearest-neighbor resample: floor of the mapped coordinate, no edge
    /// adjustment.
    pub fn resample_to_shape_nearest(&self, new_shape: Vec2i) -> Array {
        let mut out = Array::new(new_shape);
        for oi in 0..new_shape.x {
            let x = if new_shape.x > 1 {
                oi as f32 / (new_shape.x - 1) as f32 * (self.shape.x - 1) as f32
            } else {
                0.0
            };
            let iref = (x.floor() as i32).clamp(0, self.shape.x - 1);
            for oj in 0..new_shape.y {
                let y = if new_shape.y > 1 {
                    oj as f32 / (new_shape.y - 1) as f32 * (self.shape.y - 1) as f32
                } else {
                    0.0
                };
                let jref = (y.floor() as i32).clamp(0, self.shape.y - 1);
                out.set(oi, oj, self.at(iref, jref));
            }
        }
        out
    }

    /// Concatenate along x (stacking rows of tiles side by side).
    pub fn hstack(&self, other: &Array) -> Array {
        assert_eq!(self.shape.y, other.shape.y);
        let mut out = Array::new(Vec2i::new(self.shape.x + other.shape.x, self.shape.y));
        for i in 0..self.shape.x {
            for j in 0..self.shape.y {
                out.set(i, j, self.at(i, j));
            }
        }
        for i in 0..other.shape.x {
            for j in 0..other.shape.y {
                out.set(self.shape.x + i, j, other.at(i, j));
            }
        }
        out
    }

    /// Concatenate along y.
    pub fn vstack(&self, other: &Array) -> Array {
        assert_eq!(self.shape.x, other.shape.x);
        let mut out = Array::new(Vec2i::new(self.shape.x, self.shape.y + other.shape.y));
        for i in 0..self.shape.x {
            for j in 0..self.shape.y {
                out.set(i, j, self.at(i, j));
            }
        }
        for i in 0..other.shape.x {
            for j in 0..other.shape.y {
                out.set(i, self.shape.y + j, other.at(i, j));
            }
        }
        out
    }

    pub fn to_raw_f32(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    pub fn bbox_unit(&self) -> Vec4 {
        Vec4::new(0.0, 1.0, 0.0, 1.0)
    }

    pub fn center_u_v(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }
}

impl std::ops::Index<(i32, i32)> for Array {
    type Output = f32;
    fn index(&self, (i, j): (i32, i32)) -> &f32 {
        &self.data[self.linear_index(i, j)]
    }
}

impl std::ops::IndexMut<(i32, i32)> for Array {
    fn index_mut(&mut self, (i, j): (i32, i32)) -> &mut f32 {
        let k = self.linear_index(i, j);
        &mut self.data[k]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_algebra() {
        let a = Array::from_vec(Vec2i::new(2, 2), vec![1.0, 2.0, 3.0, 4.0]);
        let zero = Array::new(a.shape);
        let one = Array::filled(a.shape, 1.0);
        assert_eq!(a.add_array(&zero).data, a.data);
        assert_eq!(a.mul_array(&one).data, a.data);
        let diff = a.sub_array(&a);
        assert!(diff.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn resample_idempotence() {
        let a = Array::from_vec(
            Vec2i::new(4, 3),
            (0..12).map(|v| v as f32).collect(),
        );
        let b = a.resample_to_shape(a.shape);
        for (x, y) in a.data.iter().zip(b.data.iter()) {
            assert!((x - y).abs() < 1e-4);
        }
    }

    #[test]
    fn nearest_resample_is_a_selection() {
        let a = Array::from_vec(Vec2i::new(3, 3), (0..9).map(|v| v as f32).collect());
        let b = a.resample_to_shape_nearest(Vec2i::new(7, 5));
        for v in b.data {
            assert!(a.data.iter().any(|&x| (x - v).abs() < 1e-6));
        }
    }

    #[test]
    fn sampling_clamp() {
        let a = Array::from_vec(Vec2i::new(3, 3), (0..9).map(|v| v as f32).collect());
        let bbox = Vec4::new(0.0, 2.0, 0.0, 2.0);
        let inside_corner = a.value_nearest(2.0, 2.0, bbox);
        let outside = a.value_nearest(10.0, 10.0, bbox);
        assert_eq!(inside_corner, outside);
    }

    #[test]
    fn extract_slice_is_exclusive() {
        let a = Array::from_vec(Vec2i::new(4, 4), (0..16).map(|v| v as f32).collect());
        let s = a.extract_slice(Vec4i::new(1, 3, 1, 3));
        assert_eq!(s.shape, Vec2i::new(2, 2));
    }

    #[test]
    fn normalization_coeff_degenerate() {
        assert_eq!(Array::normalization_coeff(1.0, 1.0), (0.0, 0.0));
    }
}
