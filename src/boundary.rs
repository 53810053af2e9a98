//! Border extrapolation and buffering (spec C8), grounded on
//! `HighMap/src/boundary/boundary.cpp`.

use crate::array::Array;

/// Linear extrapolation for `nbuffer` cells on both sides of both axes:
/// `v(k) = 2*v(k+1) - v(k+2)`, optionally blended toward `sigma` of a
/// reference value at the `nbuffer` offset.
pub fn extrapolate_borders(array: &mut Array, nbuffer: i32) {
    let (nx, ny) = (array.shape.x, array.shape.y);
    for j in 0..ny {
        for k in (0..nbuffer).rev() {
            let v = 2.0 * array.at(k + 1, j) - array.at(k + 2, j);
            array.set(k, j, v);
        }
        for k in (0..nbuffer).rev() {
            let i = nx - 1 - k;
            let v = 2.0 * array.at(i - 1, j) - array.at(i - 2, j);
            array.set(i, j, v);
        }
    }
    for i in 0..nx {
        for k in (0..nbuffer).rev() {
            let v = 2.0 * array.at(i, k + 1) - array.at(i, k + 2);
            array.set(i, k, v);
        }
        for k in (0..nbuffer).rev() {
            let j = ny - 1 - k;
            let v = 2.0 * array.at(i, j - 1) - array.at(i, j - 2);
            array.set(i, j, v);
        }
    }
}

/// Copy the outermost row/column into the `nbuffer` cells just inside it.
pub fn fill_borders(array: &mut Array, nbuffer: i32) {
    let (nx, ny) = (array.shape.x, array.shape.y);
    for j in 0..ny {
        let left = array.at(nbuffer, j);
        let right = array.at(nx - 1 - nbuffer, j);
        for k in 0..nbuffer {
            array.set(k, j, left);
            array.set(nx - 1 - k, j, right);
        }
    }
    for i in 0..nx {
        let bottom = array.at(i, nbuffer);
        let top = array.at(i, ny - 1 - nbuffer);
        for k in 0..nbuffer {
            array.set(i, k, bottom);
            array.set(i, ny - 1 - k, top);
        }
    }
}

/// Radial distance-function-based multiplicative falloff from the array
/// border toward its center over `width` cells.
pub fn falloff(array: &mut Array, width: f32) {
    let (nx, ny) = (array.shape.x as f32, array.shape.y as f32);
    for i in 0..array.shape.x {
        for j in 0..array.shape.y {
            let di = (i as f32).min(nx - 1.0 - i as f32);
            let dj = (j as f32).min(ny - 1.0 - j as f32);
            let d = di.min(dj);
            let w = (d / width.max(1e-6)).clamp(0.0, 1.0);
            let k = crate::range::smoothstep3(w);
            let idx = array.linear_index(i, j);
            array.data[idx] *= k;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec2i;

    #[test]
    fn extrapolate_keeps_constant_flat() {
        let mut a = Array::filled(Vec2i::new(10, 10), 3.0);
        extrapolate_borders(&mut a, 2);
        assert!(a.data.iter().all(|&v| (v - 3.0).abs() < 1e-4));
    }

    #[test]
    fn falloff_zero_at_border() {
        let mut a = Array::filled(Vec2i::new(21, 21), 1.0);
        falloff(&mut a, 5.0);
        assert!(a.at(0, 10).abs() < 1e-6);
        assert!((a.at(10, 10) - 1.0).abs() < 1e-3);
    }
}
