//! Expand/shrink morphology with an arbitrary structuring element (spec C9).

use crate::array::Array;
use crate::kernel;

/// Grayscale dilation (`dilate=true`) or erosion (`dilate=false`) with a
/// cubic-pulse structuring element of radius `ir`.
pub fn expand(array: &Array, ir: i32) -> Array {
    let se = kernel::cubic_pulse(ir);
    dilate_erode(array, &se, true)
}

pub fn shrink(array: &Array, ir: i32) -> Array {
    let se = kernel::cubic_pulse(ir);
    dilate_erode(array, &se, false)
}

pub fn expand_kernel(array: &Array, se: &Array) -> Array {
    dilate_erode(array, se, true)
}

pub fn shrink_kernel(array: &Array, se: &Array) -> Array {
    dilate_erode(array, se, false)
}

/// Dual via negation around max: shrink(z) = -expand(-z).
pub(super) fn dilate_erode(array: &Array, se: &Array, dilate: bool) -> Array {
    let ri = se.shape.x / 2;
    let rj = se.shape.y / 2;
    let (nx, ny) = (array.shape.x, array.shape.y);
    let mut out = Array::new(array.shape);

    for i in 0..nx {
        for j in 0..ny {
            let mut best = f32::NEG_INFINITY;
            for p in 0..se.shape.x {
                for q in 0..se.shape.y {
                    let si = i + p - ri;
                    let sj = j + q - rj;
                    if si >= 0 && si < nx && sj >= 0 && sj < ny {
                        let src = if dilate { array.at(si, sj) } else { -array.at(si, sj) };
                        let v = se.at(p, q) * src;
                        if v > best {
                            best = v;
                        }
                    }
                }
            }
            out.set(i, j, if dilate { best } else { -best });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec2i;

    #[test]
    fn expand_grows_a_peak() {
        let mut a = Array::new(Vec2i::new(9, 9));
        a.set(4, 4, 1.0);
        let e = expand(&a, 2);
        assert!(e.at(3, 4) > 0.0);
        assert!(e.at(4, 4) >= a.at(4, 4));
    }
}
