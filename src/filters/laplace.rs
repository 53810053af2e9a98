//! Laplace edge-preserving smoothing (spec C9): iterates
//! `z <- z + sigma*(grad(c).grad(z) + c*laplacian(z))` with
//! `c = 1/(1 + |grad(z)|^2 / talus^2)`.

use crate::array::Array;

pub fn laplace(array: &mut Array, talus: f32, sigma: f32, iterations: u32) {
    let (nx, ny) = (array.shape.x, array.shape.y);
    for _ in 0..iterations {
        let prev = array.clone();
        let mut c = Array::new(prev.shape);
        for i in 1..nx - 1 {
            for j in 1..ny - 1 {
                let gx = prev.gradient_x_at(i, j);
                let gy = prev.gradient_y_at(i, j);
                c.set(i, j, 1.0 / (1.0 + (gx * gx + gy * gy) / (talus * talus)));
            }
        }
        crate::boundary::fill_borders(&mut c, 1);

        for i in 1..nx - 1 {
            for j in 1..ny - 1 {
                let cx = c.gradient_x_at(i, j);
                let cy = c.gradient_y_at(i, j);
                let zx = prev.gradient_x_at(i, j);
                let zy = prev.gradient_y_at(i, j);
                let lap = prev.at(i + 1, j) + prev.at(i - 1, j) + prev.at(i, j + 1)
                    + prev.at(i, j - 1)
                    - 4.0 * prev.at(i, j);
                let delta = sigma * (cx * zx + cy * zy + c.at(i, j) * lap);
                array.set(i, j, prev.at(i, j) + delta);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec2i;

    #[test]
    fn laplace_preserves_flat() {
        let mut a = Array::filled(Vec2i::new(9, 9), 1.0);
        laplace(&mut a, 0.1, 0.25, 3);
        assert!(a.data.iter().all(|&v| (v - 1.0).abs() < 1e-3));
    }
}
