//! Non-parametric pixel-wise texture sampling (spec C17), grounded on the
//! Wei-Levoy / Efros-Leung per-pixel synthesis algorithm as implemented in
//! `HighMap/src/synthesis/non_parametric_sampling.cpp`: pixels are filled in
//! order of how many of their neighbors are already known (a greedy
//! priority queue, not raster order), each matched against the source by a
//! smooth-cosine-weighted SSD over the causal neighborhood.

use crate::array::Array;
use crate::kernel::smooth_cosine;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct NonParametricParams {
    pub window_radius: i32,
    pub seed: u64,
    pub jitter: f32,
}

impl Default for NonParametricParams {
    fn default() -> Self {
        Self {
            window_radius: 3,
            seed: 0,
            jitter: 0.0,
        }
    }
}

#[derive(PartialEq)]
struct QueueItem {
    filled_neighbors: i32,
    i: i32,
    j: i32,
}
impl Eq for QueueItem {}
impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.filled_neighbors.cmp(&other.filled_neighbors)
    }
}

fn count_filled_neighbors(filled: &[bool], shape: crate::algebra::Vec2i, i: i32, j: i32, r: i32) -> i32 {
    let mut n = 0;
    for di in -r..=r {
        for dj in -r..=r {
            if di == 0 && dj == 0 {
                continue;
            }
            let (ni, nj) = (i + di, j + dj);
            if ni >= 0 && ni < shape.x && nj >= 0 && nj < shape.y {
                let idx = (ni * shape.y + nj) as usize;
                if filled[idx] {
                    n += 1;
                }
            }
        }
    }
    n
}

/// Weighted SSD between the causal neighborhood of `(ti, tj)` in `target`
/// (only cells marked `filled`) and the neighborhood of `(si, sj)` in
/// `source`, weighted by a smooth-cosine radial kernel so nearby pixels
/// dominate the match.
fn neighborhood_cost(
    source: &Array,
    target: &Array,
    filled: &[bool],
    si: i32,
    sj: i32,
    ti: i32,
    tj: i32,
    r: i32,
    weight: &Array,
) -> f32 {
    let mut cost = 0.0;
    let mut total_w = 0.0;
    for di in -r..=r {
        for dj in -r..=r {
            let (tni, tnj) = (ti + di, tj + dj);
            if tni < 0 || tni >= target.shape.x || tnj < 0 || tnj >= target.shape.y {
                continue;
            }
            let idx = (tni * target.shape.y + tnj) as usize;
            if !filled[idx] {
                continue;
            }
            let (sni, snj) = (si + di, sj + dj);
            if sni < 0 || sni >= source.shape.x || snj < 0 || snj >= source.shape.y {
                cost += 1e6;
                continue;
            }
            let w = weight.at(di + r, dj + r);
            let d = target.at(tni, tnj) - source.at(sni, snj);
            cost += w * d * d;
            total_w += w;
        }
    }
    if total_w > 0.0 {
        cost / total_w
    } else {
        f32::INFINITY
    }
}

/// Fills `target` (same shape as `source`) by greedily choosing, among
/// cells with the most already-known neighbors, the source location whose
/// causal neighborhood best matches what is already known around it.
/// `target` must be pre-seeded with at least one filled cell (callers
/// typically copy a small patch from `source` to bootstrap).
pub fn non_parametric_sample(
    source: &Array,
    mut target: Array,
    mut filled: Vec<bool>,
    params: &NonParametricParams,
) -> Array {
    assert_eq!(source.shape, target.shape);
    assert_eq!(filled.len(), target.size());

    let r = params.window_radius;
    let mut weight = smooth_cosine(r);
    if weight.sum() <= 0.0 {
        weight.fill(1.0);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let mut heap = BinaryHeap::new();
    for i in 0..target.shape.x {
        for j in 0..target.shape.y {
            let idx = (i * target.shape.y + j) as usize;
            if !filled[idx] {
                heap.push(QueueItem {
                    filled_neighbors: count_filled_neighbors(&filled, target.shape, i, j, r),
                    i,
                    j,
                });
            }
        }
    }

    while let Some(QueueItem { filled_neighbors: claimed, i, j }) = heap.pop() {
        let idx = (i * target.shape.y + j) as usize;
        if filled[idx] {
            continue;
        }
        let actual = count_filled_neighbors(&filled, target.shape, i, j, r);
        if actual != claimed {
            heap.push(QueueItem { filled_neighbors: actual, i, j });
            continue;
        }

        let mut best_cost = f32::INFINITY;
        let mut best_value = source.at(i.clamp(0, source.shape.x - 1), j.clamp(0, source.shape.y - 1));
        for si in 0..source.shape.x {
            for sj in 0..source.shape.y {
                let cost = neighborhood_cost(source, &target, &filled, si, sj, i, j, r, &weight);
                if cost < best_cost {
                    best_cost = cost;
                    best_value = source.at(si, sj);
                }
            }
        }

        let jitter = if params.jitter > 0.0 {
            rng.gen_range(-params.jitter..params.jitter)
        } else {
            0.0
        };
        target.set(i, j, best_value + jitter);
        filled[idx] = true;
    }

    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec2i;

    #[test]
    fn fills_every_cell() {
        let shape = Vec2i::new(10, 10);
        let mut source = Array::new(shape);
        for i in 0..shape.x {
            for j in 0..shape.y {
                source.set(i, j, ((i + j) % 2) as f32);
            }
        }
        let mut target = Array::new(shape);
        let mut filled = vec![false; source.size()];
        target.set(0, 0, source.at(0, 0));
        filled[0] = true;

        let params = NonParametricParams {
            window_radius: 1,
            seed: 1,
            jitter: 0.0,
        };
        let out = non_parametric_sample(&source, target, filled, &params);
        assert!(out.data.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn deterministic_given_seed() {
        let shape = Vec2i::new(6, 6);
        let source = Array::from_vec(shape, (0..36).map(|v| (v as f32 * 0.3).sin()).collect());
        let mut target1 = Array::new(shape);
        let mut filled1 = vec![false; source.size()];
        target1.set(0, 0, source.at(0, 0));
        filled1[0] = true;
        let target2 = target1.clone();
        let filled2 = filled1.clone();

        let params = NonParametricParams { window_radius: 1, seed: 9, jitter: 0.1 };
        let a = non_parametric_sample(&source, target1, filled1, &params);
        let b = non_parametric_sample(&source, target2, filled2, &params);
        assert_eq!(a.data, b.data);
    }
}
