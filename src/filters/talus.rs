//! Priority-queue talus filters (spec C9), grounded on
//! `HighMap/src/filters/filters.cpp`'s `fill_talus`/`expand_talus`: an
//! 8-connected neighborhood with diagonal weight `1/sqrt(2)`, a binary max-
//! (fill) or min- (expand) heap, and a seeded jitter on the talus step.

use crate::array::Array;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f32::consts::FRAC_1_SQRT_2;

const DI: [i32; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
const DJ: [i32; 8] = [0, -1, -1, -1, 0, 1, 1, 1];
const C: [f32; 8] = [
    1.0,
    FRAC_1_SQRT_2,
    1.0,
    FRAC_1_SQRT_2,
    1.0,
    FRAC_1_SQRT_2,
    1.0,
    FRAC_1_SQRT_2,
];

#[derive(PartialEq)]
struct HeapItem {
    z: f32,
    i: i32,
    j: i32,
}
impl Eq for HeapItem {}
impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.z.partial_cmp(&other.z).unwrap_or(Ordering::Equal)
    }
}

/// Builds the max-heap over all interior cells (excluding a 2-cell border)
/// and pushes `z(nbr) = max(z(nbr), z(cur) - d*talus*jitter)` until the
/// queue empties. Deterministic given `seed`.
pub fn fill_talus(array: &mut Array, talus: f32, seed: u64, noise_ratio: f32) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (nx, ny) = (array.shape.x, array.shape.y);

    let mut heap = BinaryHeap::new();
    for i in 2..nx - 2 {
        for j in 2..ny - 2 {
            heap.push(HeapItem {
                z: array.at(i, j),
                i,
                j,
            });
        }
    }

    while let Some(HeapItem { i, j, .. }) = heap.pop() {
        let z_cur = array.at(i, j);
        for k in 0..8 {
            let p = i + DI[k];
            let q = j + DJ[k];
            if p < 0 || p >= nx || q < 0 || q >= ny {
                continue;
            }
            let jitter = 1.0 + rng.gen_range(-noise_ratio..=noise_ratio);
            let h = z_cur - C[k] * talus * jitter;
            if h > array.at(p, q) {
                array.set(p, q, h);
                heap.push(HeapItem { z: h, i: p, j: q });
            }
        }
    }

    crate::boundary::extrapolate_borders(array, 2);
}

/// Priority-flood from `{(i,j): mask(i,j) > 0}`: neighbors are admitted in
/// ascending elevation, each raised to `z(parent) + talus*d*jitter` if
/// currently lower.
pub fn expand_talus(array: &mut Array, mask: &Array, talus: f32, seed: u64, noise_ratio: f32) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (nx, ny) = (array.shape.x, array.shape.y);

    #[derive(PartialEq)]
    struct MinItem {
        z: f32,
        i: i32,
        j: i32,
    }
    impl Eq for MinItem {}
    impl PartialOrd for MinItem {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for MinItem {
        fn cmp(&self, other: &Self) -> Ordering {
            other.z.partial_cmp(&self.z).unwrap_or(Ordering::Equal)
        }
    }

    let mut heap = BinaryHeap::new();
    let mut seen = vec![false; array.size()];
    for i in 0..nx {
        for j in 0..ny {
            if mask.at(i, j) > 0.0 {
                heap.push(MinItem {
                    z: array.at(i, j),
                    i,
                    j,
                });
                seen[array.linear_index(i, j)] = true;
            }
        }
    }

    while let Some(MinItem { z, i, j }) = heap.pop() {
        for k in 0..8 {
            let p = i + DI[k];
            let q = j + DJ[k];
            if p < 0 || p >= nx || q < 0 || q >= ny {
                continue;
            }
            let idx = array.linear_index(p, q);
            if seen[idx] {
                continue;
            }
            let jitter = 1.0 + rng.gen_range(-noise_ratio..=noise_ratio);
            let h = z + C[k] * talus * jitter;
            if h < array.at(p, q) {
                array.set(p, q, h);
            }
            seen[idx] = true;
            heap.push(MinItem {
                z: array.at(p, q),
                i: p,
                j: q,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec2i;

    #[test]
    fn fill_talus_slope_bound() {
        let shape = Vec2i::new(65, 65);
        let mut a = Array::new(shape);
        a.set(32, 32, 1.0);
        fill_talus(&mut a, 0.05, 0, 0.0);

        for i in 1..shape.x - 1 {
            for j in 1..shape.y - 1 {
                let z = a.at(i, j);
                for (di, dj) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                    let zn = a.at(i + di, j + dj);
                    assert!((z - zn).abs() <= 0.05 + 1e-3);
                }
            }
        }
    }

    #[test]
    fn fill_talus_scenario_s4() {
        let shape = Vec2i::new(65, 65);
        let mut a = Array::new(shape);
        a.set(32, 32, 1.0);
        fill_talus(&mut a, 0.05, 0, 0.0);
        for i in 0..shape.x {
            for j in 0..shape.y {
                let bound = (1.0 - 0.05 * (i - 32).abs().max((j - 32).abs()) as f32).max(0.0);
                assert!(a.at(i, j) >= bound - 1e-3);
            }
        }
    }
}
