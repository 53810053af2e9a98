//! Kuwahara edge-preserving smoothing (spec C9).

use crate::array::Array;

/// For each interior pixel, compute mean and std over the four
/// `(ir+1)x(ir+1)` quadrants anchored at the pixel; output is the mean of
/// the quadrant with the smallest std, optionally mixed with the input by
/// `mix_ratio` (0 = filtered only, 1 = input only).
pub fn kuwahara(array: &Array, ir: i32, mix_ratio: f32) -> Array {
    let (nx, ny) = (array.shape.x, array.shape.y);
    let mut out = array.clone();

    for i in ir..nx - ir {
        for j in ir..ny - ir {
            let quadrants = [
                (-ir, 0, -ir, 0),
                (0, ir, -ir, 0),
                (-ir, 0, 0, ir),
                (0, ir, 0, ir),
            ];

            let mut best_mean = array.at(i, j);
            let mut best_std = f32::INFINITY;

            for (di0, di1, dj0, dj1) in quadrants {
                let mut sum = 0.0;
                let mut sum2 = 0.0;
                let mut n = 0.0;
                for di in di0..=di1 {
                    for dj in dj0..=dj1 {
                        let v = array.at(i + di, j + dj);
                        sum += v;
                        sum2 += v * v;
                        n += 1.0;
                    }
                }
                let mean = sum / n;
                let var = (sum2 / n - mean * mean).max(0.0);
                let std = var.sqrt();
                if std < best_std {
                    best_std = std;
                    best_mean = mean;
                }
            }

            let v = crate::range::lerp(best_mean, array.at(i, j), mix_ratio);
            out.set(i, j, v);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec2i;

    #[test]
    fn kuwahara_preserves_flat_regions() {
        let a = Array::filled(Vec2i::new(17, 17), 2.0);
        let out = kuwahara(&a, 3, 0.0);
        assert!(out.data.iter().all(|&v| (v - 2.0).abs() < 1e-4));
    }
}
