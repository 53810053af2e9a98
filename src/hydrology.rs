//! D8/D-infinity flow routing and depression filling (spec C10), grounded
//! on `src/hydrology/flow_accumulation_d8.cpp` — this is the authoritative
//! topological-queue algorithm, which supersedes the teacher's
//! sort-by-elevation approximation (`erosion/rivers.rs`, since removed) that
//! does not satisfy spec invariant 7 (exact conservation) on branching DAGs.

use crate::array::Array;
use crate::boundary::fill_borders;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f32::consts::FRAC_1_SQRT_2;

const DI: [i32; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
const DJ: [i32; 8] = [0, -1, -1, -1, 0, 1, 1, 1];
const W: [f32; 8] = [
    1.0,
    FRAC_1_SQRT_2,
    1.0,
    FRAC_1_SQRT_2,
    1.0,
    FRAC_1_SQRT_2,
    1.0,
    FRAC_1_SQRT_2,
];
/// For each interior cell, the neighbor maximizing `(z(i,j)-z(nbr))*w[k]`
/// (steepest descent, diagonal-weighted). Borders are filled by
/// extrapolation. A cell with no downhill neighbor (a local minimum or
/// flat) defaults to neighbor index 0, so every interior cell always has
/// an outgoing edge.
pub fn flow_direction_d8(z: &Array) -> Vec<i8> {
    let (nx, ny) = (z.shape.x, z.shape.y);
    let mut dir = vec![0i8; z.size()];

    for i in 1..nx - 1 {
        for j in 1..ny - 1 {
            let zc = z.at(i, j);
            let mut best_drop = 0.0f32;
            let mut best_k = 0i8;
            for k in 0..8 {
                let drop = (zc - z.at(i + DI[k], j + DJ[k])) * W[k];
                if drop > best_drop {
                    best_drop = drop;
                    best_k = k as i8;
                }
            }
            dir[z.linear_index(i, j)] = best_k;
        }
    }

    let mut dir_array = Array::from_vec(z.shape, dir.iter().map(|&v| v as f32).collect());
    fill_borders(&mut dir_array, 1);
    dir_array.data.iter().map(|&v| v as i8).collect()
}

/// Topological-order flow accumulation: computes incoming-degree `nidp` (how
/// many neighbors point into each cell via D8), seeds a queue with all
/// `nidp==0` leaves, and propagates accumulation (starting at 1 per cell)
/// downstream, decrementing `nidp` until it hits zero. This terminates in
/// one linear pass per cell and is an exact topological order of the flow
/// DAG (spec section 4.5, invariant 7).
pub fn flow_accumulation_d8(z: &Array, dir: &[i8]) -> Array {
    let (nx, ny) = (z.shape.x, z.shape.y);
    let n = z.size();
    let mut nidp = vec![0u32; n];

    for i in 0..nx {
        for j in 0..ny {
            let k = z.linear_index(i, j);
            let d = dir[k];
            let p = i + DI[d as usize];
            let q = j + DJ[d as usize];
            if p < 0 || p >= nx || q < 0 || q >= ny {
                continue;
            }
            if p != i || q != j {
                nidp[z.linear_index(p, q)] += 1;
            }
        }
    }

    let mut facc = vec![1.0f32; n];
    let mut queue: Vec<(i32, i32)> = Vec::new();
    for i in 0..nx {
        for j in 0..ny {
            if nidp[z.linear_index(i, j)] == 0 {
                queue.push((i, j));
            }
        }
    }

    while let Some((i, j)) = queue.pop() {
        let k = z.linear_index(i, j);
        let d = dir[k];
        let p = i + DI[d as usize];
        let q = j + DJ[d as usize];
        if p < 0 || p >= nx || q < 0 || q >= ny || (p == i && q == j) {
            continue;
        }
        let kd = z.linear_index(p, q);
        facc[kd] += facc[k];
        nidp[kd] -= 1;
        if nidp[kd] == 0 {
            queue.push((p, q));
        }
    }

    Array::from_vec(z.shape, facc)
}

/// D-infinity: fractional routing to the two downstream neighbors of the
/// steepest triangular facet (8 facets around each cell), returning
/// `(direction_angle, two_neighbor_weights)`. Accumulation uses the same
/// topological propagation as D8, splitting contributions by the facet
/// weight.
pub fn flow_accumulation_dinf(z: &Array) -> Array {
    let (nx, ny) = (z.shape.x, z.shape.y);
    let n = z.size();
    // facets: (e1 index, e2 index) pairs around the 8-neighborhood, each
    // spanning 45 degrees; angle measured from e1 toward e2.
    let facets: [(usize, usize); 8] = [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7), (7, 0)];

    let mut weight_to: Vec<Vec<(usize, f32)>> = vec![Vec::new(); n];
    let mut out_degree_unused = vec![0u32; n]; // kept for parity with D8 nidp pattern
    let _ = &mut out_degree_unused;

    for i in 1..nx - 1 {
        for j in 1..ny - 1 {
            let k = z.linear_index(i, j);
            let zc = z.at(i, j);
            let mut best_slope = 0.0f32;
            let mut best_targets: Vec<(usize, f32)> = Vec::new();

            for &(a, b) in facets.iter() {
                let za = z.at(i + DI[a], j + DJ[a]);
                let zb = z.at(i + DI[b], j + DJ[b]);
                let sa = (zc - za) * W[a];
                let sb = (zc - zb) * W[b];
                let slope = sa.max(sb).max(0.0);
                if slope > best_slope {
                    best_slope = slope;
                    let wa = (sa.max(0.0) + 1e-9) / (sa.max(0.0) + sb.max(0.0) + 2e-9);
                    best_targets = vec![
                        (z.linear_index(i + DI[a], j + DJ[a]), wa),
                        (z.linear_index(i + DI[b], j + DJ[b]), 1.0 - wa),
                    ];
                }
            }
            weight_to[k] = best_targets;
        }
    }

    let mut indeg = vec![0u32; n];
    for targets in weight_to.iter() {
        for &(t, _) in targets {
            indeg[t] += 1;
        }
    }

    let mut facc = vec![1.0f32; n];
    let mut queue: Vec<usize> = (0..n).filter(|&k| indeg[k] == 0).collect();
    while let Some(k) = queue.pop() {
        let targets = weight_to[k].clone();
        for (t, w) in targets {
            if t == k {
                continue;
            }
            facc[t] += facc[k] * w;
            indeg[t] -= 1;
            if indeg[t] == 0 {
                queue.push(t);
            }
        }
    }

    Array::from_vec(z.shape, facc)
}

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

/// Priority-flood depression filling: initializes the queue with boundary
/// cells, then iteratively pops the lowest-elevation frontier cell, visits
/// unvisited neighbors, and raises each to at least the popped cell's
/// elevation before re-inserting. Guarantees `z_out >= z_in` everywhere and
/// every local minimum in the output sits on the boundary (spec invariant
/// 8).
pub fn fill_depressions(z: &Array) -> Array {
    let (nx, ny) = (z.shape.x, z.shape.y);
    let mut out = z.clone();
    let mut visited = vec![false; z.size()];
    let mut heap = BinaryHeap::new();

    for i in 0..nx {
        for j in 0..ny {
            if i == 0 || j == 0 || i == nx - 1 || j == ny - 1 {
                heap.push(MinItem {
                    z: out.at(i, j),
                    i,
                    j,
                });
                visited[z.linear_index(i, j)] = true;
            }
        }
    }

    while let Some(MinItem { z: zc, i, j }) = heap.pop() {
        for k in 0..8 {
            let p = i + DI[k];
            let q = j + DJ[k];
            if p < 0 || p >= nx || q < 0 || q >= ny {
                continue;
            }
            let idx = out.linear_index(p, q);
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            let raised = out.at(p, q).max(zc);
            out.set(p, q, raised);
            heap.push(MinItem {
                z: raised,
                i: p,
                j: q,
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec2i;

    #[test]
    fn flow_accumulation_east_to_west() {
        let shape = Vec2i::new(8, 8);
        let mut z = Array::new(shape);
        for i in 0..8 {
            for j in 0..8 {
                z.set(i, j, i as f32);
            }
        }
        let dir = flow_direction_d8(&z);
        let facc = flow_accumulation_d8(&z, &dir);
        for j in 1..7 {
            assert!((facc.at(0, j) - 8.0).abs() < 1e-3, "col0 row {j}: {}", facc.at(0, j));
        }
    }

    #[test]
    fn depression_filling_monotone_and_flat_pit() {
        let shape = Vec2i::new(9, 9);
        let mut z = Array::filled(shape, 1.0);
        for i in 3..6 {
            for j in 3..6 {
                z.set(i, j, 0.0);
            }
        }
        let out = fill_depressions(&z);
        for k in 0..z.size() {
            assert!(out.data[k] >= z.data[k] - 1e-6);
        }
        for i in 3..6 {
            for j in 3..6 {
                assert!((out.at(i, j) - 1.0).abs() < 1e-4);
            }
        }
    }
}
