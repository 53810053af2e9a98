//! Noise generators and geometric primitives (spec C6), grounded on the
//! teacher's `heightmap::generate_heightmap` (domain-warped `noise` crate
//! usage plus a hand-rolled fBm loop) and on
//! `HighMap/src/primitives/primitives.cpp`'s primitive formulas.

use crate::algebra::Vec2i;
use crate::array::Array;
use crate::range::linspace;
use noise::{NoiseFn, Perlin, Simplex, Worley};
use std::f32::consts::PI;

/// Selects which `noise`-crate generator backs the noise-function handle.
#[derive(Clone, Copy, Debug)]
pub enum NoiseFunction {
    Perlin,
    Simplex,
    Worley,
}

/// Dispatches per-cell `(x, y) -> fct(x, y, z_in)`, matching the
/// `fill_array_using_xy_function` contract: walks the grid with coordinates
/// mapped through `bbox`, optionally adds per-cell domain-warp offsets
/// (`noise_x`, `noise_y`) scaled by `stretching`, and writes `fct(...)` into
/// each cell.
pub fn fill_array_using_xy_function(
    shape: Vec2i,
    bbox: (f32, f32, f32, f32),
    noise_x: Option<&Array>,
    noise_y: Option<&Array>,
    stretching: Option<f32>,
    fct: impl Fn(f32, f32, f32) -> f32,
) -> Array {
    let (xmin, xmax, ymin, ymax) = bbox;
    let xs = linspace(xmin, xmax, shape.x as usize, false);
    let ys = linspace(ymin, ymax, shape.y as usize, false);
    let stretch = stretching.unwrap_or(1.0);

    let mut out = Array::new(shape);
    for i in 0..shape.x {
        for j in 0..shape.y {
            let mut x = xs[i as usize];
            let mut y = ys[j as usize];
            if let Some(nx) = noise_x {
                x += stretch * nx.at(i, j);
            }
            if let Some(ny) = noise_y {
                y += stretch * ny.at(i, j);
            }
            out.set(i, j, fct(x, y, 0.0));
        }
    }
    out
}

fn sample(kind: NoiseFunction, seed: u32, x: f64, y: f64) -> f32 {
    match kind {
        NoiseFunction::Perlin => Perlin::new(seed).get([x, y]) as f32,
        NoiseFunction::Simplex => Simplex::new(seed).get([x, y]) as f32,
        NoiseFunction::Worley => Worley::new(seed).get([x, y]) as f32,
    }
}

/// A single-octave noise array at wavenumbers `kw = (kx, ky)`.
pub fn noise(kind: NoiseFunction, shape: Vec2i, kw: (f32, f32), seed: u32) -> Array {
    fill_array_using_xy_function(
        shape,
        (0.0, 1.0, 0.0, 1.0),
        None,
        None,
        None,
        |x, y, _| sample(kind, seed, (x * kw.0) as f64, (y * kw.1) as f64),
    )
}

/// Fractional Brownian motion: sums `octaves` scaled copies with
/// `persistence` amplitude decay and `lacunarity` frequency growth.
/// `ctrl_param`, when present, modulates each octave's contribution weight
/// per cell (spec C6).
pub fn fbm(
    kind: NoiseFunction,
    shape: Vec2i,
    kw: (f32, f32),
    seed: u32,
    octaves: u32,
    persistence: f32,
    lacunarity: f32,
    ctrl_param: Option<&Array>,
) -> Array {
    let mut out = Array::new(shape);
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut norm = 0.0;

    for o in 0..octaves {
        let layer = noise(
            kind,
            shape,
            (kw.0 * frequency, kw.1 * frequency),
            seed.wrapping_add(o),
        );
        for k in 0..out.size() {
            let w = ctrl_param.map(|c| c.data[k]).unwrap_or(1.0);
            out.data[k] += amplitude * w * layer.data[k];
        }
        norm += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }
    if norm > 0.0 {
        out.div_assign_scalar(norm);
    }
    out
}

// --- geometric primitives ---

pub fn constant(shape: Vec2i, value: f32) -> Array {
    Array::filled(shape, value)
}

/// Per-primitive noise/stretching controls (spec 4.3: geometric primitives
/// "receive optional noise/stretching" through the same
/// [`fill_array_using_xy_function`] contract as the noise generators).
#[derive(Clone, Copy, Default)]
pub struct PrimitiveNoise<'a> {
    pub noise_x: Option<&'a Array>,
    pub noise_y: Option<&'a Array>,
    pub stretching: Option<f32>,
}

/// Conical bump peaking at 1 at the array center, falling to 0 at radius 1.
pub fn cone(shape: Vec2i, noise: PrimitiveNoise) -> Array {
    fill_array_using_xy_function(
        shape,
        (-1.0, 1.0, -1.0, 1.0),
        noise.noise_x,
        noise.noise_y,
        noise.stretching,
        |x, y, _| (1.0 - (x * x + y * y).sqrt()).max(0.0),
    )
}

pub fn disk(shape: Vec2i, radius: f32, noise: PrimitiveNoise) -> Array {
    fill_array_using_xy_function(
        shape,
        (-1.0, 1.0, -1.0, 1.0),
        noise.noise_x,
        noise.noise_y,
        noise.stretching,
        move |x, y, _| if (x * x + y * y).sqrt() <= radius { 1.0 } else { 0.0 },
    )
}

pub fn biweight(shape: Vec2i, noise: PrimitiveNoise) -> Array {
    fill_array_using_xy_function(
        shape,
        (-1.0, 1.0, -1.0, 1.0),
        noise.noise_x,
        noise.noise_y,
        noise.stretching,
        |x, y, _| {
            let r2 = x * x + y * y;
            if r2 <= 1.0 {
                let v = 1.0 - r2;
                v * v
            } else {
                0.0
            }
        },
    )
}

pub fn tricube(shape: Vec2i, noise: PrimitiveNoise) -> Array {
    fill_array_using_xy_function(
        shape,
        (-1.0, 1.0, -1.0, 1.0),
        noise.noise_x,
        noise.noise_y,
        noise.stretching,
        |x, y, _| {
            let r = (x * x + y * y).sqrt();
            if r <= 1.0 {
                (1.0 - r.powi(3)).powi(3)
            } else {
                0.0
            }
        },
    )
}

pub fn smooth_cosine(shape: Vec2i, noise: PrimitiveNoise) -> Array {
    fill_array_using_xy_function(
        shape,
        (-1.0, 1.0, -1.0, 1.0),
        noise.noise_x,
        noise.noise_y,
        noise.stretching,
        |x, y, _| {
            let r = (x * x + y * y).sqrt();
            if r <= 1.0 {
                0.5 * (1.0 + (PI * r).cos())
            } else {
                0.0
            }
        },
    )
}

pub fn cubic_pulse(shape: Vec2i, noise: PrimitiveNoise) -> Array {
    biweight(shape, noise)
}

/// Gaussian bump, `exp(-0.5*r^2/sigma^2)`. `noise`, when present, is added
/// as real per-cell domain warp on both axes before the radius is computed
/// (the same `noise_x`/`noise_y` mechanism every other primitive uses), so
/// `Some(&array)` perturbs the bump's shape instead of being a no-op.
pub fn gaussian_pulse(shape: Vec2i, sigma: f32, noise: Option<&Array>) -> Array {
    fill_array_using_xy_function(
        shape,
        (-1.0, 1.0, -1.0, 1.0),
        noise,
        noise,
        None,
        move |x, y, _| {
            let r2 = x * x + y * y;
            (-0.5 * r2 / (sigma * sigma)).exp()
        },
    )
}

pub fn slope_x(shape: Vec2i, talus: f32) -> Array {
    let mut out = Array::new(shape);
    for i in 0..shape.x {
        let h = talus * i as f32;
        for j in 0..shape.y {
            out.set(i, j, h);
        }
    }
    out
}

pub fn slope_y(shape: Vec2i, talus: f32) -> Array {
    let mut out = Array::new(shape);
    for j in 0..shape.y {
        let h = talus * j as f32;
        for i in 0..shape.x {
            out.set(i, j, h);
        }
    }
    out
}

/// Planar slope at `angle` degrees, talus normalized to the unit square.
pub fn slope(shape: Vec2i, angle: f32, talus: f32, noise: PrimitiveNoise) -> Array {
    let ca = angle.to_radians().cos();
    let sa = angle.to_radians().sin();
    let talus_n = talus * shape.x.max(shape.y) as f32;
    fill_array_using_xy_function(
        shape,
        (0.0, 1.0, 0.0, 1.0),
        noise.noise_x,
        noise.noise_y,
        noise.stretching,
        move |x, y, _| talus_n * (ca * x + sa * y),
    )
}

/// Step function transitioning at `x0` along the x axis, over width
/// `talus` (0 = hard step).
pub fn step(shape: Vec2i, x0: f32, talus: f32, noise: PrimitiveNoise) -> Array {
    fill_array_using_xy_function(
        shape,
        (0.0, 1.0, 0.0, 1.0),
        noise.noise_x,
        noise.noise_y,
        noise.stretching,
        move |x, _y, _| {
            if talus <= 0.0 {
                if x < x0 {
                    0.0
                } else {
                    1.0
                }
            } else {
                ((x - x0) / talus).clamp(-0.5, 0.5) + 0.5
            }
        },
    )
}

pub fn wave_sine(shape: Vec2i, kw: f32, angle: f32, noise: PrimitiveNoise) -> Array {
    let ca = angle.to_radians().cos();
    let sa = angle.to_radians().sin();
    fill_array_using_xy_function(
        shape,
        (0.0, 1.0, 0.0, 1.0),
        noise.noise_x,
        noise.noise_y,
        noise.stretching,
        move |x, y, _| (2.0 * PI * kw * (ca * x + sa * y)).sin(),
    )
}

pub fn wave_square(shape: Vec2i, kw: f32, angle: f32, noise: PrimitiveNoise) -> Array {
    wave_sine(shape, kw, angle, noise).map_values(|v| v.signum())
}

pub fn wave_triangular(shape: Vec2i, kw: f32, angle: f32, slant_ratio: f32, noise: PrimitiveNoise) -> Array {
    let ca = angle.to_radians().cos();
    let sa = angle.to_radians().sin();
    let slant = slant_ratio.clamp(0.01, 0.99);
    fill_array_using_xy_function(
        shape,
        (0.0, 1.0, 0.0, 1.0),
        noise.noise_x,
        noise.noise_y,
        noise.stretching,
        move |x, y, _| {
            let t = (kw * (ca * x + sa * y)).rem_euclid(1.0);
            if t < slant {
                t / slant
            } else {
                1.0 - (t - slant) / (1.0 - slant)
            }
        },
    )
}

pub fn wave_dune(shape: Vec2i, kw: f32, angle: f32, xtop: f32, xbottom: f32, noise: PrimitiveNoise) -> Array {
    let ca = angle.to_radians().cos();
    let sa = angle.to_radians().sin();
    fill_array_using_xy_function(
        shape,
        (0.0, 1.0, 0.0, 1.0),
        noise.noise_x,
        noise.noise_y,
        noise.stretching,
        move |x, y, _| {
            let t = (kw * (ca * x + sa * y)).rem_euclid(1.0);
            if t < xtop {
                (t / xtop).powf(0.5)
            } else if t < xbottom {
                1.0 - (t - xtop) / (xbottom - xtop)
            } else {
                0.0
            }
        },
    )
}

/// Crater: a cone with an inner rim rebound, radius `r`, depth `depth`,
/// rim amplitude `rim_amplitude`.
pub fn crater(shape: Vec2i, r: f32, depth: f32, rim_amplitude: f32, noise: PrimitiveNoise) -> Array {
    fill_array_using_xy_function(
        shape,
        (-1.0, 1.0, -1.0, 1.0),
        noise.noise_x,
        noise.noise_y,
        noise.stretching,
        move |x, y, _| {
            let d = (x * x + y * y).sqrt() / r;
            if d > 1.5 {
                0.0
            } else {
                -depth * (1.0 - d * d).max(-1.0) + rim_amplitude * (-((d - 1.0) * (d - 1.0)) * 8.0).exp()
            }
        },
    )
}

/// Caldera: flat-bottomed crater with a sharp outer rim.
pub fn caldera(shape: Vec2i, r: f32, depth: f32, rim_width: f32, noise: PrimitiveNoise) -> Array {
    fill_array_using_xy_function(
        shape,
        (-1.0, 1.0, -1.0, 1.0),
        noise.noise_x,
        noise.noise_y,
        noise.stretching,
        move |x, y, _| {
            let d = (x * x + y * y).sqrt() / r;
            if d < 1.0 {
                -depth
            } else if d < 1.0 + rim_width {
                -depth + depth * (d - 1.0) / rim_width
            } else {
                0.0
            }
        },
    )
}

pub fn peak(shape: Vec2i, r: f32, gain: f32, noise: PrimitiveNoise) -> Array {
    fill_array_using_xy_function(
        shape,
        (-1.0, 1.0, -1.0, 1.0),
        noise.noise_x,
        noise.noise_y,
        noise.stretching,
        move |x, y, _| {
            let d = (x * x + y * y).sqrt() / r;
            (1.0 - d).max(0.0).powf(gain)
        },
    )
}

/// Field of randomly scattered bumps via a distance-transform-like density
/// estimate (teacher's `heightmap.rs` fBm-domain-warp idiom, simplified to
/// a seeded point scatter convolved with a cubic-pulse falloff).
pub fn bump_field(shape: Vec2i, kw: f32, seed: u32) -> Array {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
    let n_bumps = (kw * kw).max(1.0) as usize;
    let mut centers = Vec::with_capacity(n_bumps);
    for _ in 0..n_bumps {
        centers.push((
            rng.gen_range(0..shape.x),
            rng.gen_range(0..shape.y),
        ));
    }
    let rmax = (shape.x.min(shape.y) as f32 / kw).max(1.0);

    let mut out = Array::new(shape);
    for i in 0..shape.x {
        for j in 0..shape.y {
            let mut best = f32::INFINITY;
            for &(ci, cj) in &centers {
                let d = (((i - ci) * (i - ci) + (j - cj) * (j - cj)) as f32).sqrt();
                best = best.min(d);
            }
            let t = (best / rmax).min(1.0);
            out.set(i, j, 1.0 - t * t * (2.0 - t));
        }
    }
    out
}

pub fn checkerboard(shape: Vec2i, period: i32) -> Array {
    let mut out = Array::new(shape);
    for i in 0..shape.x {
        for j in 0..shape.y {
            let v = ((i / period.max(1)) + (j / period.max(1))) % 2;
            out.set(i, j, v as f32);
        }
    }
    out
}

trait MapValues {
    fn map_values(&self, f: impl Fn(f32) -> f32) -> Array;
}

impl MapValues for Array {
    fn map_values(&self, f: impl Fn(f32) -> f32) -> Array {
        Array::from_vec(self.shape, self.data.iter().map(|&v| f(v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fbm_has_energy() {
        let shape = Vec2i::new(16, 16);
        let a = fbm(NoiseFunction::Perlin, shape, (2.0, 2.0), 42, 4, 0.5, 2.0, None);
        assert!(a.ptp() > 0.0);
    }

    #[test]
    fn cone_is_bounded() {
        let c = cone(Vec2i::new(17, 17), PrimitiveNoise::default());
        assert!(c.max() <= 1.0 + 1e-5);
        assert!(c.min() >= 0.0);
    }

    #[test]
    fn cone_noise_x_perturbs_shape() {
        let shape = Vec2i::new(17, 17);
        let warp = Array::filled(shape, 0.3);
        let plain = cone(shape, PrimitiveNoise::default());
        let warped = cone(
            shape,
            PrimitiveNoise {
                noise_x: Some(&warp),
                ..Default::default()
            },
        );
        assert_ne!(plain.data, warped.data);
    }

    #[test]
    fn gaussian_pulse_noise_perturbs_output() {
        let shape = Vec2i::new(17, 17);
        let mut warp = Array::new(shape);
        for k in 0..warp.size() {
            warp.data[k] = if k % 2 == 0 { 0.4 } else { -0.4 };
        }
        let plain = gaussian_pulse(shape, 0.5, None);
        let jittered = gaussian_pulse(shape, 0.5, Some(&warp));
        assert_ne!(plain.data, jittered.data);
    }

    #[test]
    fn checkerboard_alternates() {
        let c = checkerboard(Vec2i::new(4, 4), 1);
        assert_ne!(c.at(0, 0), c.at(1, 0));
    }
}
