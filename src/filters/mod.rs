//! Filters (spec C9), grounded on `HighMap/src/filters/filters.cpp`. All
//! filters operate in place; each has a `_masked` variant computing the full
//! result on a scratch copy and blending via [`crate::range::lerp_array`]
//! (spec's masked-filter pattern: never branch inside the hot loop).

mod kuwahara;
mod laplace;
mod morphology;
mod recurve;
mod stats;
mod talus;
mod terrace;

pub use kuwahara::kuwahara;
pub use laplace::laplace;
pub use morphology::{expand, expand_kernel, shrink, shrink_kernel};
pub use recurve::{recurve, recurve_bexp, recurve_kura, recurve_s, recurve_smoothstep};
pub use stats::{equalize, median3, plateau};
pub use talus::{expand_talus, fill_talus};
pub use terrace::terrace;

use crate::array::Array;
use crate::kernel;

/// Build a normalized 1-D kernel of length `2*ir+1` for a cubic-pulse
/// profile and convolve it along both axes.
pub fn smooth_cpulse(array: &mut Array, ir: i32) {
    smooth_1d_profile(array, ir, |r| {
        let v = 1.0 - r * r;
        v.max(0.0) * v.max(0.0)
    });
}

/// Gaussian smoothing with `NSIGMA=2`, kernel length `NSIGMA*(2*ir+1)`.
pub fn smooth_gaussian(array: &mut Array, ir: i32) {
    const NSIGMA: i32 = 2;
    let half = NSIGMA * ir;
    let sigma = ir.max(1) as f32;
    let kernel: Vec<f32> = (-half..=half)
        .map(|k| (-0.5 * (k as f32 / sigma).powi(2)).exp())
        .collect();
    let kernel = normalize_1d(kernel);
    *array = crate::convolve::convolve1d_j(&crate::convolve::convolve1d_i(array, &kernel), &kernel);
}

pub fn smooth_cone(array: &mut Array, ir: i32) {
    smooth_1d_profile(array, ir, |r| (1.0 - r.abs()).max(0.0));
}

pub fn smooth_flat(array: &mut Array, ir: i32) {
    smooth_1d_profile(array, ir, |_| 1.0);
}

fn smooth_1d_profile(array: &mut Array, ir: i32, profile: impl Fn(f32) -> f32) {
    let n = 2 * ir + 1;
    let kernel: Vec<f32> = (0..n)
        .map(|k| profile((k - ir) as f32 / ir.max(1) as f32))
        .collect();
    let kernel = normalize_1d(kernel);
    *array = crate::convolve::convolve1d_j(&crate::convolve::convolve1d_i(array, &kernel), &kernel);
}

fn normalize_1d(mut k: Vec<f32>) -> Vec<f32> {
    let s: f32 = k.iter().sum();
    if s != 0.0 {
        k.iter_mut().for_each(|v| *v /= s);
    }
    k
}

/// Apply `filter` to a scratch copy of `array` then blend by `mask` (1 =
/// fully filtered, 0 = unchanged), matching spec's universal masked-filter
/// contract.
pub fn masked(array: &mut Array, mask: &Array, filter: impl FnOnce(&mut Array)) {
    let mut scratch = array.clone();
    filter(&mut scratch);
    *array = crate::range::lerp_array(array, &scratch, mask);
}

/// Grayscale dilation with an arbitrary structuring element: for each pixel,
/// take the max of `se(p,q) * src(i+p, j+q)` over the support.
pub fn expand_with_se(array: &Array, se: &Array) -> Array {
    morphology::dilate_erode(array, se, true)
}

pub fn shrink_with_se(array: &Array, se: &Array) -> Array {
    morphology::dilate_erode(array, se, false)
}

pub fn default_cubic_pulse_se(ir: i32) -> Array {
    kernel::cubic_pulse(ir)
}
