//! Static kernel generators (spec C4), grounded on
//! `HighMap/include/highmap/kernels.hpp`'s generator family. All kernels are
//! square, with `ir` the half-width (kernel side length `2*ir+1`), centered
//! at `(ir, ir)`.

use crate::algebra::Vec2i;
use crate::array::Array;
use std::f32::consts::PI;

fn square_radial(ir: i32, f: impl Fn(f32) -> f32) -> Array {
    let n = 2 * ir + 1;
    let mut k = Array::new(Vec2i::new(n, n));
    for i in 0..n {
        for j in 0..n {
            let x = (i - ir) as f32 / ir.max(1) as f32;
            let y = (j - ir) as f32 / ir.max(1) as f32;
            let r = (x * x + y * y).sqrt();
            k.set(i, j, f(r));
        }
    }
    k
}

/// Conical kernel: `max(0, 1 - r)`.
pub fn cone(ir: i32) -> Array {
    square_radial(ir, |r| (1.0 - r).max(0.0))
}

/// Flat disk kernel: `1` inside unit radius, else `0`.
pub fn disk(ir: i32) -> Array {
    square_radial(ir, |r| if r <= 1.0 { 1.0 } else { 0.0 })
}

/// Cubic-pulse kernel: `(1 - r^2)^2` inside unit radius.
pub fn cubic_pulse(ir: i32) -> Array {
    square_radial(ir, |r| {
        if r <= 1.0 {
            let v = 1.0 - r * r;
            v * v
        } else {
            0.0
        }
    })
}

/// Biweight kernel: `(1 - r^2)^2`, same closed form as cubic-pulse but
/// distinguished as a separate named generator per spec.
pub fn biweight(ir: i32) -> Array {
    cubic_pulse(ir)
}

/// Tricube kernel: `(1 - |r|^3)^3`.
pub fn tricube(ir: i32) -> Array {
    square_radial(ir, |r| {
        if r <= 1.0 {
            let v = 1.0 - r.powi(3);
            v.powi(3)
        } else {
            0.0
        }
    })
}

/// Smooth-cosine kernel: `0.5*(1 + cos(pi*r))` inside unit radius.
pub fn smooth_cosine(ir: i32) -> Array {
    square_radial(ir, |r| {
        if r <= 1.0 {
            0.5 * (1.0 + (PI * r).cos())
        } else {
            0.0
        }
    })
}

/// Gaussian kernel with `sigma` expressed relative to `ir`.
pub fn gaussian(ir: i32, sigma: f32) -> Array {
    square_radial(ir, |r| (-0.5 * (r / sigma).powi(2)).exp())
}

/// 1-D sinc kernel of half-width `ir`.
pub fn sinc_1d(ir: i32) -> Vec<f32> {
    let n = (2 * ir + 1) as usize;
    (0..n)
        .map(|i| {
            let x = PI * (i as i32 - ir) as f32;
            if x == 0.0 {
                1.0
            } else {
                x.sin() / x
            }
        })
        .collect()
}

/// 1-D Blackman window of half-width `ir`.
pub fn blackman_1d(ir: i32) -> Vec<f32> {
    let n = (2 * ir + 1) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / (n - 1).max(1) as f32;
            0.42 - 0.5 * (2.0 * PI * t).cos() + 0.08 * (4.0 * PI * t).cos()
        })
        .collect()
}

/// Windowed-sinc separable low-pass kernel (sinc times Blackman window),
/// used by the downscale-transform prefilter (C16).
pub fn windowed_sinc_1d(ir: i32) -> Vec<f32> {
    let sinc = sinc_1d(ir);
    let win = blackman_1d(ir);
    let mut v: Vec<f32> = sinc.iter().zip(win.iter()).map(|(s, w)| s * w).collect();
    let sum: f32 = v.iter().sum();
    if sum != 0.0 {
        v.iter_mut().for_each(|x| *x /= sum);
    }
    v
}

/// Gabor kernel: Gaussian envelope modulated by a plane wave at `angle`
/// (degrees) and wavenumber `kw`.
pub fn gabor(ir: i32, kw: f32, angle: f32) -> Array {
    let ca = angle.to_radians().cos();
    let sa = angle.to_radians().sin();
    let n = 2 * ir + 1;
    let mut k = Array::new(Vec2i::new(n, n));
    for i in 0..n {
        for j in 0..n {
            let x = (i - ir) as f32 / ir.max(1) as f32;
            let y = (j - ir) as f32 / ir.max(1) as f32;
            let r2 = x * x + y * y;
            let xr = x * ca + y * sa;
            k.set(i, j, (-0.5 * r2).exp() * (2.0 * PI * kw * xr).cos());
        }
    }
    k
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cone_peaks_at_center() {
        let k = cone(4);
        let c = k.shape.x / 2;
        assert!((k.at(c, c) - 1.0).abs() < 1e-6);
        assert!(k.at(0, 0) <= k.at(c, c));
    }

    #[test]
    fn windowed_sinc_normalizes() {
        let k = windowed_sinc_1d(6);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }
}
