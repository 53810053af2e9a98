//! Laplacian-style multi-level pyramid (spec C15), grounded on
//! `HighMap/src/multiscale/pyramid.cpp`: builds a coarse-to-fine chain of
//! Gaussian-smoothed levels and their residuals, and reconstructs by
//! summing residuals back onto the coarsest level.

use crate::array::Array;
use crate::filters::smooth_gaussian;

pub struct Pyramid {
    /// Gaussian-smoothed level, from coarsest (last) to finest (first) —
    /// `levels[0]` is the original-resolution smoothed array.
    pub levels: Vec<Array>,
    /// `levels[k] - levels[k+1]` detail residual, one fewer than `levels`.
    pub residuals: Vec<Array>,
}

impl Pyramid {
    /// Builds `n_levels` successively coarser Gaussian-smoothed copies of
    /// `array` (radius doubling each level) and their detail residuals.
    pub fn build(array: &Array, n_levels: u32) -> Self {
        let mut levels = vec![array.clone()];
        for level in 1..n_levels {
            let mut smoothed = levels[(level - 1) as usize].clone();
            smooth_gaussian(&mut smoothed, 1 << level);
            levels.push(smoothed);
        }

        let mut residuals = Vec::with_capacity(levels.len().saturating_sub(1));
        for k in 0..levels.len().saturating_sub(1) {
            residuals.push(levels[k].sub_array(&levels[k + 1]));
        }

        Self { levels, residuals }
    }

    pub fn finest(&self) -> &Array {
        &self.levels[0]
    }

    pub fn coarsest(&self) -> &Array {
        self.levels.last().unwrap()
    }

    /// Reconstructs the full-resolution array by summing the coarsest level
    /// with every residual (inverse of [`Self::build`]); should reproduce
    /// the original input up to smoothing round-off.
    pub fn reconstruct(&self) -> Array {
        let mut out = self.coarsest().clone();
        for residual in self.residuals.iter().rev() {
            out.add_assign_array(residual);
        }
        out
    }

    /// Applies `fct` independently to each level's array at `finest_level`
    /// and coarser, weighting each transformed level's contribution by the
    /// corresponding entry of `weights` before recombining with the
    /// untouched finer residuals (matches upstream `Pyramid::transform`'s
    /// per-octave reweighting, used e.g. to dampen large-scale erosion
    /// relative to fine detail).
    pub fn transform(&self, fct: impl Fn(&Array) -> Array, weights: &[f32], finest_level: usize) -> Array {
        let mut levels: Vec<Array> = self.levels.clone();
        for (k, level) in levels.iter_mut().enumerate().skip(finest_level) {
            let w = weights.get(k).copied().unwrap_or(1.0);
            let transformed = fct(level);
            *level = level.mul_scalar(1.0 - w).add_array(&transformed.mul_scalar(w));
        }

        let mut out = levels.last().unwrap().clone();
        for k in (0..levels.len() - 1).rev() {
            let residual = if k < finest_level {
                self.residuals[k].clone()
            } else {
                levels[k].sub_array(&levels[k + 1])
            };
            out.add_assign_array(&residual);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec2i;

    #[test]
    fn reconstruct_approximates_input() {
        let shape = Vec2i::new(32, 32);
        let mut a = Array::new(shape);
        for i in 0..shape.x {
            for j in 0..shape.y {
                a.set(i, j, ((i + j) as f32 * 0.2).sin());
            }
        }
        let pyr = Pyramid::build(&a, 3);
        let r = pyr.reconstruct();
        for k in 0..a.size() {
            assert!((r.data[k] - a.data[k]).abs() < 1e-4);
        }
    }

    #[test]
    fn transform_identity_weight_zero_preserves_input() {
        let shape = Vec2i::new(16, 16);
        let a = Array::from_vec(shape, (0..256).map(|v| v as f32 * 0.01).collect());
        let pyr = Pyramid::build(&a, 3);
        let out = pyr.transform(|lvl| lvl.mul_scalar(10.0), &[0.0, 0.0, 0.0], 0);
        for k in 0..a.size() {
            assert!((out.data[k] - a.data[k]).abs() < 1e-4);
        }
    }
}
