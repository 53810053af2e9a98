//! Geometric transforms (spec C8), grounded on
//! `HighMap/include/highmap/transform.hpp`'s declarations.

use crate::algebra::Vec2i;
use crate::array::Array;

pub fn flip_lr(array: &Array) -> Array {
    let mut out = Array::new(array.shape);
    for i in 0..array.shape.x {
        for j in 0..array.shape.y {
            out.set(array.shape.x - 1 - i, j, array.at(i, j));
        }
    }
    out
}

pub fn flip_ud(array: &Array) -> Array {
    let mut out = Array::new(array.shape);
    for i in 0..array.shape.x {
        for j in 0..array.shape.y {
            out.set(i, array.shape.y - 1 - j, array.at(i, j));
        }
    }
    out
}

/// Counterclockwise 90-degree rotation (square arrays).
pub fn rot90(array: &Array) -> Array {
    let (nx, ny) = (array.shape.x, array.shape.y);
    let mut out = Array::new(Vec2i::new(ny, nx));
    for i in 0..nx {
        for j in 0..ny {
            out.set(j, nx - 1 - i, array.at(i, j));
        }
    }
    out
}

pub fn transpose(array: &Array) -> Array {
    let (nx, ny) = (array.shape.x, array.shape.y);
    let mut out = Array::new(Vec2i::new(ny, nx));
    for i in 0..nx {
        for j in 0..ny {
            out.set(j, i, array.at(i, j));
        }
    }
    out
}

/// Arbitrary-angle rotation via inverse-mapped bilinear sampling, with
/// optional zero-padding outside the source extent (else clamped, matching
/// upstream's boolean `zero_padding` flag).
pub fn rotate(array: &Array, angle_deg: f32, zero_padding: bool) -> Array {
    let theta = angle_deg.to_radians();
    let (ca, sa) = (theta.cos(), theta.sin());
    let (nx, ny) = (array.shape.x, array.shape.y);
    let (cx, cy) = ((nx - 1) as f32 / 2.0, (ny - 1) as f32 / 2.0);

    let mut out = Array::new(array.shape);
    for i in 0..nx {
        for j in 0..ny {
            let x = i as f32 - cx;
            let y = j as f32 - cy;
            let sx = x * ca + y * sa + cx;
            let sy = -x * sa + y * ca + cy;

            if sx < 0.0 || sy < 0.0 || sx > (nx - 1) as f32 || sy > (ny - 1) as f32 {
                out.set(i, j, if zero_padding { 0.0 } else { array.at(
                    (sx.round() as i32).clamp(0, nx - 1),
                    (sy.round() as i32).clamp(0, ny - 1),
                ) });
                continue;
            }

            let si = sx.floor() as i32;
            let sj = sy.floor() as i32;
            let u = sx - si as f32;
            let v = sy - sj as f32;
            let si = si.min(nx - 2).max(0);
            let sj = sj.min(ny - 2).max(0);
            out.set(i, j, array.value_bilinear_at(si, sj, u, v));
        }
    }
    out
}

/// Shift the array by `(dx, dy)` cells (non-integer allowed via bilinear
/// sampling); `periodic` wraps around instead of clamping.
pub fn translate(array: &Array, dx: f32, dy: f32, periodic: bool) -> Array {
    let (nx, ny) = (array.shape.x, array.shape.y);
    let mut out = Array::new(array.shape);
    for i in 0..nx {
        for j in 0..ny {
            let mut sx = i as f32 - dx;
            let mut sy = j as f32 - dy;
            if periodic {
                sx = sx.rem_euclid(nx as f32);
                sy = sy.rem_euclid(ny as f32);
            } else {
                sx = sx.clamp(0.0, (nx - 1) as f32);
                sy = sy.clamp(0.0, (ny - 1) as f32);
            }
            let si = (sx.floor() as i32).min(nx - 2).max(0);
            let sj = (sy.floor() as i32).min(ny - 2).max(0);
            let u = sx - si as f32;
            let v = sy - sj as f32;
            out.set(i, j, array.value_bilinear_at(si, sj, u, v));
        }
    }
    out
}

/// Make an array tileable by cross-fading opposite edges over `transition`
/// cells on each axis (periodicity via stitching, spec C8).
pub fn make_periodic(array: &Array, transition: i32) -> Array {
    let (nx, ny) = (array.shape.x, array.shape.y);
    let mut out = array.clone();
    for j in 0..ny {
        for p in 0..transition {
            let r = crate::range::smoothstep5(p as f32 / (transition - 1).max(1) as f32);
            let left = array.at(p, j);
            let right = array.at(nx - transition + p, j);
            let blended = crate::range::lerp(right, left, r);
            out.set(p, j, blended);
            out.set(nx - transition + p, j, blended);
        }
    }
    for i in 0..nx {
        for p in 0..transition {
            let r = crate::range::smoothstep5(p as f32 / (transition - 1).max(1) as f32);
            let bottom = out.at(i, p);
            let top = out.at(i, ny - transition + p);
            let blended = crate::range::lerp(top, bottom, r);
            out.set(i, p, blended);
            out.set(i, ny - transition + p, blended);
        }
    }
    out
}

/// Resample-based zoom about the array center by `factor` (>1 zooms in).
pub fn zoom(array: &Array, factor: f32) -> Array {
    let shape = array.shape;
    let coarse = Vec2i::new(
        ((shape.x as f32) / factor).max(2.0) as i32,
        ((shape.y as f32) / factor).max(2.0) as i32,
    );
    let small = array.resample_to_shape(coarse);
    small.resample_to_shape(shape)
}

/// Domain-warp: resample `array` through a per-cell offset given by
/// `(warp_x, warp_y)`.
pub fn warp(array: &Array, warp_x: &Array, warp_y: &Array) -> Array {
    let (nx, ny) = (array.shape.x, array.shape.y);
    let mut out = Array::new(array.shape);
    for i in 0..nx {
        for j in 0..ny {
            let sx = (i as f32 + warp_x.at(i, j)).clamp(0.0, (nx - 1) as f32);
            let sy = (j as f32 + warp_y.at(i, j)).clamp(0.0, (ny - 1) as f32);
            let si = (sx.floor() as i32).min(nx - 2).max(0);
            let sj = (sy.floor() as i32).min(ny - 2).max(0);
            let u = sx - si as f32;
            let v = sy - sj as f32;
            out.set(i, j, array.value_bilinear_at(si, sj, u, v));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec2i;

    #[test]
    fn flip_is_involution() {
        let a = Array::from_vec(Vec2i::new(3, 3), (0..9).map(|v| v as f32).collect());
        let b = flip_lr(&flip_lr(&a));
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn transpose_swaps_shape() {
        let a = Array::from_vec(Vec2i::new(4, 2), (0..8).map(|v| v as f32).collect());
        let t = transpose(&a);
        assert_eq!(t.shape, Vec2i::new(2, 4));
    }
}
