//! Owned 3-D grid (x, y, channel), used for color/normal-map export (spec
//! C3). Storage is row-major with the channel axis fastest-varying,
//! generalizing [`crate::array::Array`]'s layout convention.

use crate::array::Array;
use crate::algebra::Vec2i;

#[derive(Clone, Debug)]
pub struct Tensor {
    pub shape_xy: Vec2i,
    pub nz: usize,
    pub data: Vec<f32>,
}

impl Tensor {
    pub fn new(shape_xy: Vec2i, nz: usize) -> Self {
        assert!((1..=4).contains(&nz), "nz must be in 1..=4 for image export");
        Self {
            shape_xy,
            nz,
            data: vec![0.0; (shape_xy.x * shape_xy.y) as usize * nz],
        }
    }

    #[inline]
    fn index(&self, i: i32, j: i32, k: usize) -> usize {
        ((i * self.shape_xy.y + j) as usize) * self.nz + k
    }

    pub fn get(&self, i: i32, j: i32, k: usize) -> f32 {
        self.data[self.index(i, j, k)]
    }

    pub fn set(&mut self, i: i32, j: i32, k: usize, v: f32) {
        let idx = self.index(i, j, k);
        self.data[idx] = v;
    }

    /// Overwrite channel `k` from a 2-D array of matching shape.
    pub fn set_slice(&mut self, k: usize, array: &Array) {
        assert_eq!(array.shape, self.shape_xy);
        for i in 0..self.shape_xy.x {
            for j in 0..self.shape_xy.y {
                self.set(i, j, k, array.at(i, j));
            }
        }
    }

    pub fn get_slice(&self, k: usize) -> Array {
        let mut out = Array::new(self.shape_xy);
        for i in 0..self.shape_xy.x {
            for j in 0..self.shape_xy.y {
                out.set(i, j, self.get(i, j, k));
            }
        }
        out
    }

    pub fn min(&self) -> f32 {
        self.data.iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Remap the full buffer linearly from `[vmin, vmax]` to `[a, b]`.
    pub fn remap(&mut self, vmin: f32, vmax: f32, a: f32, b: f32) {
        let (coeff, off) = Array::normalization_coeff(vmin, vmax);
        for v in self.data.iter_mut() {
            *v = a + (b - a) * (*v * coeff + off);
        }
    }

    pub fn to_raw_u8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 255.0) as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_roundtrip() {
        let shape = Vec2i::new(3, 2);
        let mut t = Tensor::new(shape, 3);
        let a = Array::from_vec(shape, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        t.set_slice(1, &a);
        let back = t.get_slice(1);
        assert_eq!(back.data, a.data);
    }
}
