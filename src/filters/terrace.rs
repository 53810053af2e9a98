//! Terrace filter (spec C9): partitions `[vmin, vmax]` into `n` levels with
//! uniform jitter on interior boundaries; each value is mapped into its
//! interval, gain-corrected, and mapped back.

use crate::array::Array;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub fn terrace(array: &mut Array, n: usize, gain: f32, seed: u64) {
    let (vmin, vmax) = (array.min(), array.max());
    if vmax <= vmin || n == 0 {
        return;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut bounds: Vec<f32> = (0..=n)
        .map(|k| vmin + (vmax - vmin) * k as f32 / n as f32)
        .collect();
    let step = (vmax - vmin) / n as f32;
    for b in bounds.iter_mut().take(n).skip(1) {
        *b += rng.gen_range(-0.4 * step..0.4 * step);
    }

    for v in array.data.iter_mut() {
        let mut level = 0;
        while level < n - 1 && *v >= bounds[level + 1] {
            level += 1;
        }
        let lo = bounds[level];
        let hi = bounds[level + 1].max(lo + 1e-6);
        let t = ((*v - lo) / (hi - lo)).clamp(0.0, 1.0);
        let corrected = t.powf(1.0 / gain.max(1e-3));
        *v = lo + (hi - lo) * corrected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec2i;

    #[test]
    fn terrace_stays_within_range() {
        let mut a = Array::from_vec(
            Vec2i::new(10, 1),
            (0..10).map(|v| v as f32 / 9.0).collect(),
        );
        let (vmin, vmax) = (a.min(), a.max());
        terrace(&mut a, 4, 1.5, 7);
        assert!(a.min() >= vmin - 1e-3);
        assert!(a.max() <= vmax + 1e-3);
    }
}
