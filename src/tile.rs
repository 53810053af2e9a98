//! A single tile of a tiled heightmap (spec C12): an [`Array`] plus the
//! `shift`/`scale` mapping that places it within the overall normalized
//! `[0,1]x[0,1]` domain, grounded on `HighMap/include/highmap/heightmap.hpp`.

use crate::algebra::{Vec2, Vec2i, Vec4};
use crate::array::Array;

#[derive(Clone, Debug)]
pub struct Tile {
    pub array: Array,
    pub shift: Vec2,
    pub scale: Vec2,
    /// Bounding box `(xmin, xmax, ymin, ymax)` of this tile in world
    /// coordinates, derived from the owning heightmap's `bbox` combined with
    /// `shift`/`scale` (spec section 3) — kept as a field distinct from
    /// `shift`/`scale` rather than recomputed, so it can carry a non-unit
    /// heightmap bbox.
    pub bbox: Vec4,
}

impl Tile {
    pub fn new(shape: Vec2i, shift: Vec2, scale: Vec2) -> Self {
        let bbox = Vec4::new(shift.x, shift.x + scale.x, shift.y, shift.y + scale.y);
        Self {
            array: Array::new(shape),
            shift,
            scale,
            bbox,
        }
    }

    pub fn shape(&self) -> Vec2i {
        self.array.shape
    }

    /// Rescales `bbox` into `heightmap_bbox`'s world coordinates: this
    /// tile's `shift`/`scale` are fractions of the heightmap domain, so its
    /// world bbox is the heightmap bbox linearly interpolated by them.
    pub fn rescale_bbox(&mut self, heightmap_bbox: Vec4) {
        let (hxmin, hxmax, hymin, hymax) = (
            heightmap_bbox.a,
            heightmap_bbox.b,
            heightmap_bbox.c,
            heightmap_bbox.d,
        );
        let wx = hxmax - hxmin;
        let wy = hymax - hymin;
        self.bbox = Vec4::new(
            hxmin + self.shift.x * wx,
            hxmin + (self.shift.x + self.scale.x) * wx,
            hymin + self.shift.y * wy,
            hymin + (self.shift.y + self.scale.y) * wy,
        );
    }

    /// Maps a point in this tile's local `[0,1]^2` coordinates to the
    /// overall domain.
    pub fn to_global(&self, u: f32, v: f32) -> (f32, f32) {
        (self.shift.x + u * self.scale.x, self.shift.y + v * self.scale.y)
    }

    /// Maps a point in the overall domain to this tile's local `[0,1]^2`
    /// coordinates (not clamped).
    pub fn to_local(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.shift.x) / self.scale.x,
            (y - self.shift.y) / self.scale.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_local_roundtrip() {
        let t = Tile::new(Vec2i::new(4, 4), Vec2::new(0.25, 0.5), Vec2::new(0.5, 0.25));
        let (gx, gy) = t.to_global(0.5, 0.5);
        let (lu, lv) = t.to_local(gx, gy);
        assert!((lu - 0.5).abs() < 1e-6);
        assert!((lv - 0.5).abs() < 1e-6);
    }
}
