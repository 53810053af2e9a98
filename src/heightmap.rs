//! Tiled heightmap (spec C12): a regular grid of overlapping [`Tile`]s
//! covering the normalized `[0,1]x[0,1]` domain, grounded on
//! `HighMap/include/highmap/heightmap.hpp`'s `Heightmap` and its
//! `smooth_overlap_buffers` stitching pass.

use crate::algebra::{Vec2, Vec2i, Vec4};
use crate::array::Array;
use crate::range::{lerp, smoothstep5};
use crate::tile::Tile;

#[derive(Clone, Debug)]
pub struct Heightmap {
    pub shape: Vec2i,
    pub tiling: Vec2i,
    pub overlap: f32,
    /// World-coordinate bounding box `(xmin, xmax, ymin, ymax)` of the whole
    /// heightmap (spec section 3); each tile's `bbox` is derived from this
    /// plus its own `shift`/`scale`.
    pub bbox: Vec4,
    pub tiles: Vec<Tile>,
}

impl Heightmap {
    /// Builds an empty tiled heightmap: `shape` is the overall resolution,
    /// `tiling` the number of tiles along each axis, `overlap` the
    /// fractional overlap (of a tile's own size) shared with neighbors. The
    /// world bbox defaults to the unit square; use [`Self::with_bbox`] for a
    /// non-default domain.
    pub fn new(shape: Vec2i, tiling: Vec2i, overlap: f32) -> Self {
        Self::with_bbox(shape, tiling, overlap, Vec4::new(0.0, 1.0, 0.0, 1.0))
    }

    /// As [`Self::new`], but with an explicit world bbox.
    pub fn with_bbox(shape: Vec2i, tiling: Vec2i, overlap: f32, bbox: Vec4) -> Self {
        let mut hm = Self {
            shape,
            tiling,
            overlap,
            bbox,
            tiles: Vec::new(),
        };
        hm.update_tile_parameters();
        hm
    }

    /// Recomputes each tile's shift/scale/pixel-shape from `shape`,
    /// `tiling` and `overlap`, rebuilding tiles in place (same ordering and
    /// layout convention as the upstream constructor: row-major, `tiling.x`
    /// columns across the x axis).
    pub fn update_tile_parameters(&mut self) {
        let nt = (self.tiling.x * self.tiling.y) as usize;
        let base_scale = Vec2::new(1.0 / self.tiling.x as f32, 1.0 / self.tiling.y as f32);
        let overlap_scale = Vec2::new(
            base_scale.x * (1.0 + self.overlap),
            base_scale.y * (1.0 + self.overlap),
        );
        let tile_shape = Vec2i::new(
            ((self.shape.x as f32 / self.tiling.x as f32) * (1.0 + self.overlap)).round() as i32,
            ((self.shape.y as f32 / self.tiling.y as f32) * (1.0 + self.overlap)).round() as i32,
        );

        let mut tiles = Vec::with_capacity(nt);
        for ti in 0..self.tiling.x {
            for tj in 0..self.tiling.y {
                let shift = Vec2::new(
                    ti as f32 * base_scale.x - 0.5 * (overlap_scale.x - base_scale.x),
                    tj as f32 * base_scale.y - 0.5 * (overlap_scale.y - base_scale.y),
                );
                let mut tile = Tile::new(tile_shape, shift, overlap_scale);
                tile.rescale_bbox(self.bbox);
                tiles.push(tile);
            }
        }
        self.tiles = tiles;
    }

    fn tile_index(&self, ti: i32, tj: i32) -> usize {
        (ti * self.tiling.y + tj) as usize
    }

    /// Composites all tiles onto a single full-resolution [`Array`],
    /// quintic-smoothstep-blending the overlap regions between
    /// horizontally/vertically adjacent tiles (`smooth_overlap_buffers`):
    /// two passes (x then y), each raised-cosine-weighted by distance into
    /// the shared band so no hard seam is visible.
    pub fn to_array(&self) -> Array {
        let mut out = Array::new(self.shape);
        let mut weight = Array::new(self.shape);

        for ti in 0..self.tiling.x {
            for tj in 0..self.tiling.y {
                let tile = &self.tiles[self.tile_index(ti, tj)];
                let (tnx, tny) = (tile.shape().x, tile.shape().y);
                for li in 0..tnx {
                    for lj in 0..tny {
                        let u = li as f32 / (tnx - 1).max(1) as f32;
                        let v = lj as f32 / (tny - 1).max(1) as f32;
                        let (gx, gy) = tile.to_global(u, v);
                        let px = (gx * (self.shape.x - 1) as f32).round() as i32;
                        let py = (gy * (self.shape.y - 1) as f32).round() as i32;
                        if px < 0 || px >= self.shape.x || py < 0 || py >= self.shape.y {
                            continue;
                        }
                        let wx = edge_weight(u, self.overlap);
                        let wy = edge_weight(v, self.overlap);
                        let w = wx * wy;
                        out.add_to(px, py, w * tile.array.at(li, lj));
                        weight.add_to(px, py, w);
                    }
                }
            }
        }

        for k in 0..out.size() {
            if weight.data[k] > 1e-6 {
                out.data[k] /= weight.data[k];
            }
        }
        out
    }

    /// Blends the shared overlap band of every pair of adjacent tiles and
    /// writes the blended values back into *both* tiles' buffers (spec 4.7):
    /// for a horizontal seam, `tile_right[p,q] = (1-r)*tile_left[...] +
    /// r*tile_right[...]`, mirrored into `tile_left` too, so the two tiles
    /// agree exactly across the seam afterward (invariant 6). Distinct from
    /// [`Self::to_array`], which composites without mutating any tile.
    pub fn stitch_overlap(&mut self) {
        if self.overlap <= 1e-6 {
            return;
        }
        let band = (0.5 * self.overlap / (1.0 + self.overlap)).clamp(0.0, 0.5);

        for ti in 0..self.tiling.x - 1 {
            for tj in 0..self.tiling.y {
                let li = self.tile_index(ti, tj);
                let ri = self.tile_index(ti + 1, tj);
                let (tnx, tny) = (self.tiles[li].shape().x, self.tiles[li].shape().y);
                let w = (((band * (tnx - 1) as f32).round() as i32).max(1)).min(tnx);
                let (left_slice, right_slice) = self.tiles.split_at_mut(ri);
                let left = &mut left_slice[li];
                let right = &mut right_slice[0];
                for k in 0..w {
                    let t = if w > 1 { k as f32 / (w - 1) as f32 } else { 0.0 };
                    for j in 0..tny {
                        let lval = left.array.at(tnx - w + k, j);
                        let rval = right.array.at(k, j);
                        let blended = lerp(lval, rval, t);
                        left.array.set(tnx - w + k, j, blended);
                        right.array.set(k, j, blended);
                    }
                }
            }
        }

        for ti in 0..self.tiling.x {
            for tj in 0..self.tiling.y - 1 {
                let bi = self.tile_index(ti, tj);
                let ti2 = self.tile_index(ti, tj + 1);
                let (tnx, tny) = (self.tiles[bi].shape().x, self.tiles[bi].shape().y);
                let w = (((band * (tny - 1) as f32).round() as i32).max(1)).min(tny);
                let (bottom_slice, top_slice) = self.tiles.split_at_mut(ti2);
                let bottom = &mut bottom_slice[bi];
                let top = &mut top_slice[0];
                for k in 0..w {
                    let t = if w > 1 { k as f32 / (w - 1) as f32 } else { 0.0 };
                    for i in 0..tnx {
                        let bval = bottom.array.at(i, tny - w + k);
                        let tval = top.array.at(i, k);
                        let blended = lerp(bval, tval, t);
                        bottom.array.set(i, tny - w + k, blended);
                        top.array.set(i, k, blended);
                    }
                }
            }
        }

        tracing::debug!(tiles = self.tiles.len(), band, "stitched tile overlaps");
    }

    pub fn fill(&mut self, mut f: impl FnMut(&Tile) -> Array) {
        for tile in self.tiles.iter_mut() {
            tile.array = f(tile);
        }
    }

    pub fn min(&self) -> f32 {
        self.tiles
            .iter()
            .map(|t| t.array.min())
            .fold(f32::INFINITY, f32::min)
    }

    pub fn max(&self) -> f32 {
        self.tiles
            .iter()
            .map(|t| t.array.max())
            .fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn sum(&self) -> f32 {
        self.tiles.iter().map(|t| t.array.sum()).sum()
    }

    pub fn mean(&self) -> f32 {
        let n: usize = self.tiles.iter().map(|t| t.array.size()).sum();
        if n == 0 {
            0.0
        } else {
            self.sum() / n as f32
        }
    }

    pub fn unique_values(&self) -> Vec<f32> {
        let mut all: Vec<f32> = self.tiles.iter().flat_map(|t| t.array.data.clone()).collect();
        all.sort_by(|a, b| a.partial_cmp(b).unwrap());
        all.dedup();
        all
    }
}

/// Quintic-smoothstep raised weight, at its maximum in the tile interior
/// and fading to zero at the tile edges across the overlap band, used to
/// cross-fade overlapping tiles without a visible seam. The band width
/// tracks `overlap` (the fraction of the tile shared with its neighbor) so
/// a non-overlapping tile (`overlap == 0`) contributes uniform weight
/// instead of fading at its own boundary.
fn edge_weight(t: f32, overlap: f32) -> f32 {
    let band = (0.5 * overlap / (1.0 + overlap)).clamp(0.0, 0.5);
    if band <= 1e-6 {
        1.0
    } else if t < band {
        smoothstep5(t / band)
    } else if t > 1.0 - band {
        smoothstep5((1.0 - t) / band)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_tile_covers_full_array() {
        let mut hm = Heightmap::new(Vec2i::new(16, 16), Vec2i::new(1, 1), 0.0);
        hm.fill(|t| Array::filled(t.shape(), 3.0));
        let a = hm.to_array();
        for v in a.data {
            assert!((v - 3.0).abs() < 1e-3);
        }
    }

    #[test]
    fn multi_tile_blends_without_nan() {
        let mut hm = Heightmap::new(Vec2i::new(32, 32), Vec2i::new(2, 2), 0.25);
        hm.fill(|t| Array::filled(t.shape(), 1.0));
        let a = hm.to_array();
        assert!(a.data.iter().all(|v| v.is_finite()));
        assert!((a.mean() - 1.0).abs() < 1e-2);
    }

    #[test]
    fn stitch_overlap_matches_adjacent_tiles_across_seam() {
        let mut hm = Heightmap::new(Vec2i::new(32, 32), Vec2i::new(2, 2), 0.25);
        let mut n = 0.0;
        hm.fill(|_| {
            n += 1.0;
            Array::filled(Vec2i::new(20, 20), n)
        });
        hm.stitch_overlap();

        let band = (0.5 * hm.overlap / (1.0 + hm.overlap)).clamp(0.0, 0.5);
        for ti in 0..hm.tiling.x - 1 {
            for tj in 0..hm.tiling.y {
                let li = hm.tile_index(ti, tj);
                let ri = hm.tile_index(ti + 1, tj);
                let tnx = hm.tiles[li].shape().x;
                let w = (((band * (tnx - 1) as f32).round() as i32).max(1)).min(tnx);
                for k in 0..w {
                    for j in 0..hm.tiles[li].shape().y {
                        let lval = hm.tiles[li].array.at(tnx - w + k, j);
                        let rval = hm.tiles[ri].array.at(k, j);
                        assert!((lval - rval).abs() < 1e-4, "seam mismatch at k={k},j={j}");
                    }
                }
            }
        }
    }

    #[test]
    fn tile_bbox_tracks_heightmap_bbox() {
        let hm = Heightmap::with_bbox(
            Vec2i::new(16, 16),
            Vec2i::new(2, 1),
            0.0,
            Vec4::new(0.0, 100.0, 0.0, 50.0),
        );
        let first = &hm.tiles[hm.tile_index(0, 0)];
        let second = &hm.tiles[hm.tile_index(1, 0)];
        assert!((first.bbox.a - 0.0).abs() < 1e-3);
        assert!((first.bbox.b - 50.0).abs() < 1e-3);
        assert!((second.bbox.a - 50.0).abs() < 1e-3);
        assert!((second.bbox.b - 100.0).abs() < 1e-3);
    }
}
