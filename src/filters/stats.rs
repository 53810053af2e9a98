//! Median, plateau and histogram-equalize filters (spec C9).

use crate::array::Array;

/// 3x3 median filter on interior cells.
pub fn median3(array: &Array) -> Array {
    let (nx, ny) = (array.shape.x, array.shape.y);
    let mut out = array.clone();
    for i in 1..nx - 1 {
        for j in 1..ny - 1 {
            let mut window = [0.0f32; 9];
            let mut k = 0;
            for di in -1..=1 {
                for dj in -1..=1 {
                    window[k] = array.at(i + di, j + dj);
                    k += 1;
                }
            }
            window.sort_by(|a, b| a.partial_cmp(b).unwrap());
            out.set(i, j, window[4]);
        }
    }
    out
}

fn local_window_stat(array: &Array, ir: i32, stat: impl Fn(&[f32]) -> f32) -> Array {
    let (nx, ny) = (array.shape.x, array.shape.y);
    let mut out = Array::new(array.shape);
    let mut buf = Vec::with_capacity(((2 * ir + 1) * (2 * ir + 1)) as usize);
    for i in 0..nx {
        for j in 0..ny {
            buf.clear();
            for di in -ir..=ir {
                for dj in -ir..=ir {
                    let si = (i + di).clamp(0, nx - 1);
                    let sj = (j + dj).clamp(0, ny - 1);
                    buf.push(array.at(si, sj));
                }
            }
            out.set(i, j, stat(&buf));
        }
    }
    out
}

/// Locally normalize by `minimum_local`/`maximum_local` (box-smoothed) then
/// apply `gain` and rescale, matching the "plateau" flattening filter.
pub fn plateau(array: &Array, ir: i32, gain: f32) -> Array {
    let local_min = local_window_stat(array, ir, |w| w.iter().copied().fold(f32::INFINITY, f32::min));
    let local_max = local_window_stat(array, ir, |w| w.iter().copied().fold(f32::NEG_INFINITY, f32::max));

    let mut out = Array::new(array.shape);
    for k in 0..array.size() {
        let lo = local_min.data[k];
        let hi = local_max.data[k].max(lo + 1e-6);
        let t = ((array.data[k] - lo) / (hi - lo)).clamp(0.0, 1.0);
        out.data[k] = lo + (hi - lo) * t.powf(gain);
    }
    out
}

/// Histogram-match `array` to a uniform reference derived from a fixed
/// seed: ranks each value and maps it to an evenly spaced target.
pub fn equalize(array: &mut Array, seed: u64) {
    let _ = seed; // a uniform reference needs no randomness beyond the rank order
    let n = array.data.len();
    if n == 0 {
        return;
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| array.data[a].partial_cmp(&array.data[b]).unwrap());

    let (vmin, vmax) = (array.min(), array.max());
    let mut out = vec![0.0; n];
    for (rank, &idx) in order.iter().enumerate() {
        let t = rank as f32 / (n - 1).max(1) as f32;
        out[idx] = vmin + (vmax - vmin) * t;
    }
    array.data = out;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec2i;

    #[test]
    fn median_removes_spike() {
        let mut a = Array::filled(Vec2i::new(5, 5), 1.0);
        a.set(2, 2, 100.0);
        let out = median3(&a);
        assert!((out.at(2, 2) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn equalize_spans_full_range() {
        let mut a = Array::from_vec(Vec2i::new(5, 1), vec![0.0, 0.0, 0.5, 1.0, 1.0]);
        equalize(&mut a, 0);
        assert!((a.min() - 0.0).abs() < 1e-4);
        assert!((a.max() - 1.0).abs() < 1e-4);
    }
}
