//! Oriented coordinate frame over a heightmap (spec C14), grounded on
//! `HighMap/include/highmap/coord_frame.hpp`: a shifted, scaled and rotated
//! mapping between a local `Array`'s index space and the global normalized
//! domain.

use crate::algebra::Vec2;
use crate::array::Array;

#[derive(Clone, Copy, Debug)]
pub struct CoordFrame {
    pub shift: Vec2,
    pub scale: Vec2,
    pub angle_deg: f32,
    cos_a: f32,
    sin_a: f32,
}

impl CoordFrame {
    pub fn new(shift: Vec2, scale: Vec2, angle_deg: f32) -> Self {
        let rad = angle_deg.to_radians();
        Self {
            shift,
            scale,
            angle_deg,
            cos_a: rad.cos(),
            sin_a: rad.sin(),
        }
    }

    /// Maps local normalized coordinates `(u, v)` (in `[0,1]^2`) to global
    /// coordinates: `origin + R * diag(size) * (u, v)` (spec 4.9) — scale
    /// then rotate about the frame's origin, then shift. No centering.
    pub fn map_to_global_coords(&self, u: f32, v: f32) -> (f32, f32) {
        let su = u * self.scale.x;
        let sv = v * self.scale.y;
        let rx = su * self.cos_a - sv * self.sin_a;
        let ry = su * self.sin_a + sv * self.cos_a;
        (self.shift.x + rx, self.shift.y + ry)
    }

    /// Inverse of [`Self::map_to_global_coords`].
    pub fn map_to_relative_coords(&self, x: f32, y: f32) -> (f32, f32) {
        let dx = x - self.shift.x;
        let dy = y - self.shift.y;
        let su = dx * self.cos_a + dy * self.sin_a;
        let sv = -dx * self.sin_a + dy * self.cos_a;
        (su / self.scale.x, sv / self.scale.y)
    }

    /// Axis-aligned bounding box `(xmin, xmax, ymin, ymax)` of the rotated
    /// unit square in global coordinates.
    pub fn compute_bounding_box(&self) -> (f32, f32, f32, f32) {
        let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];
        let mut xmin = f32::INFINITY;
        let mut xmax = f32::NEG_INFINITY;
        let mut ymin = f32::INFINITY;
        let mut ymax = f32::NEG_INFINITY;
        for (u, v) in corners {
            let (x, y) = self.map_to_global_coords(u, v);
            xmin = xmin.min(x);
            xmax = xmax.max(x);
            ymin = ymin.min(y);
            ymax = ymax.max(y);
        }
        (xmin, xmax, ymin, ymax)
    }

    pub fn is_point_within(&self, x: f32, y: f32) -> bool {
        let (u, v) = self.map_to_relative_coords(x, y);
        (0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v)
    }

    /// Distance from `(u, v)` to the nearest edge of the local unit square,
    /// normalized so the frame's center is at `1.0` and an edge is `0.0`.
    pub fn normalized_distance_to_edges(&self, u: f32, v: f32) -> f32 {
        let du = u.min(1.0 - u).max(0.0);
        let dv = v.min(1.0 - v).max(0.0);
        du.min(dv) * 2.0
    }

    /// Quartic bump over the local unit square, `256 u²(1-u)² v²(1-v)²`:
    /// `1.0` at the frame center, `0.0` on its edges, used alongside
    /// [`Self::normalized_distance_to_edges`] to weight cross-frame blending
    /// in [`Self::flatten_heightmap`].
    pub fn normalized_shape_factor(&self, u: f32, v: f32) -> f32 {
        256.0 * u * u * (1.0 - u) * (1.0 - u) * v * v * (1.0 - v) * (1.0 - v)
    }

    pub fn get_heightmap_value_bilinear(&self, array: &Array, u: f32, v: f32) -> f32 {
        let x = (u * (array.shape.x - 1) as f32).clamp(0.0, (array.shape.x - 1) as f32);
        let y = (v * (array.shape.y - 1) as f32).clamp(0.0, (array.shape.y - 1) as f32);
        let i = (x.floor() as i32).min(array.shape.x - 2).max(0);
        let j = (y.floor() as i32).min(array.shape.y - 2).max(0);
        array.value_bilinear_at(i, j, x - i as f32, y - j as f32)
    }

    pub fn get_heightmap_value_nearest(&self, array: &Array, u: f32, v: f32) -> f32 {
        let i = ((u * (array.shape.x - 1) as f32).round() as i32).clamp(0, array.shape.x - 1);
        let j = ((v * (array.shape.y - 1) as f32).round() as i32).clamp(0, array.shape.y - 1);
        array.at(i, j)
    }

    /// Samples `source` (living in `source_frame`) at every cell of `dest`
    /// (living in `self`), writing into `dest`. Cells of `dest` that fall
    /// outside `source_frame`'s footprint are left untouched.
    pub fn interpolate_heightmap(&self, dest: &mut Array, source: &Array, source_frame: &CoordFrame) {
        let (nx, ny) = (dest.shape.x, dest.shape.y);
        for i in 0..nx {
            for j in 0..ny {
                let u = i as f32 / (nx - 1).max(1) as f32;
                let v = j as f32 / (ny - 1).max(1) as f32;
                let (gx, gy) = self.map_to_global_coords(u, v);
                if !source_frame.is_point_within(gx, gy) {
                    continue;
                }
                let (su, sv) = source_frame.map_to_relative_coords(gx, gy);
                let value = source_frame.get_heightmap_value_bilinear(source, su, sv);
                dest.set(i, j, value);
            }
        }
    }

    /// Flattens `source` (in `source_frame`) into `dest`'s own frame,
    /// summing overlapping contributions weighted by
    /// [`Self::normalized_distance_to_edges`] so frame interiors dominate
    /// over their edges where neighboring frames also contribute.
    pub fn flatten_heightmap(&self, dest: &mut Array, weight: &mut Array, source: &Array, source_frame: &CoordFrame) {
        let (nx, ny) = (dest.shape.x, dest.shape.y);
        for i in 0..nx {
            for j in 0..ny {
                let u = i as f32 / (nx - 1).max(1) as f32;
                let v = j as f32 / (ny - 1).max(1) as f32;
                let (gx, gy) = self.map_to_global_coords(u, v);
                if !source_frame.is_point_within(gx, gy) {
                    continue;
                }
                let (su, sv) = source_frame.map_to_relative_coords(gx, gy);
                let value = source_frame.get_heightmap_value_bilinear(source, su, sv);
                let w = (source_frame.normalized_distance_to_edges(su, sv)
                    * source_frame.normalized_shape_factor(su, sv))
                .max(1e-3);
                dest.add_to(i, j, value * w);
                weight.add_to(i, j, w);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrotated_frame_roundtrips() {
        let f = CoordFrame::new(Vec2::new(0.25, 0.25), Vec2::new(0.5, 0.5), 0.0);
        let (x, y) = f.map_to_global_coords(0.3, 0.7);
        let (u, v) = f.map_to_relative_coords(x, y);
        assert!((u - 0.3).abs() < 1e-5);
        assert!((v - 0.7).abs() < 1e-5);
    }

    #[test]
    fn rotated_frame_roundtrips() {
        let f = CoordFrame::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 37.0);
        let (x, y) = f.map_to_global_coords(0.2, 0.9);
        let (u, v) = f.map_to_relative_coords(x, y);
        assert!((u - 0.2).abs() < 1e-4);
        assert!((v - 0.9).abs() < 1e-4);
    }

    #[test]
    fn center_is_within_and_edge_is_not() {
        let f = CoordFrame::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 0.0);
        assert!(f.is_point_within(0.5, 0.5));
        assert!(!f.is_point_within(10.0, 10.0));
    }

    #[test]
    fn matches_documented_rotation_formula() {
        let f = CoordFrame::new(Vec2::new(10.0, 20.0), Vec2::new(50.0, 100.0), 30.0);
        let (x, y) = f.map_to_global_coords(0.5, 0.5);
        assert!((x - 6.65).abs() < 0.1, "x = {x}");
        assert!((y - 75.8).abs() < 0.1, "y = {y}");
    }
}
