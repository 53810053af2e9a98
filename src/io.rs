//! Thin I/O contracts (spec C18): raw float binary, 8/16-bit PNG via the
//! `image` crate. Mesh exporters and an OpenCL mirror are explicitly
//! out of scope (spec Non-goals).

use crate::algebra::Vec2i;
use crate::array::Array;
use crate::error::{HighmapError, Result};
use std::io::Write;
use std::path::Path;

/// Writes `array.data` as little-endian `f32`, row-major, with an 8-byte
/// `(nx: u32, ny: u32)` header.
pub fn write_raw_f32(array: &Array, path: impl AsRef<Path>) -> Result<()> {
    let mut f = std::fs::File::create(path)?;
    f.write_all(&(array.shape.x as u32).to_le_bytes())?;
    f.write_all(&(array.shape.y as u32).to_le_bytes())?;
    f.write_all(&array.to_raw_f32())?;
    Ok(())
}

/// Reads back the format written by [`write_raw_f32`].
pub fn read_raw_f32(path: impl AsRef<Path>) -> Result<Array> {
    let bytes = std::fs::read(path)?;
    if bytes.len() < 8 {
        return Err(HighmapError::InvalidArgument("raw file too short".into()));
    }
    let nx = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as i32;
    let ny = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as i32;
    let expected = 8 + (nx as usize) * (ny as usize) * 4;
    if bytes.len() != expected {
        return Err(HighmapError::InvalidArgument(format!(
            "raw file size mismatch: expected {expected}, got {}",
            bytes.len()
        )));
    }
    let data = bytes[8..]
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
        .collect();
    Ok(Array::from_vec(Vec2i::new(nx, ny), data))
}

/// Writes `array` as an 8-bit grayscale PNG, normalized to `[0, 255]` and
/// rotated 90 degrees counter-clockwise (matching the upstream
/// `export_to_png` convention of row-major x-as-image-columns).
pub fn write_png_8bit(array: &Array, path: impl AsRef<Path>) -> Result<()> {
    let (nx, ny) = (array.shape.x as u32, array.shape.y as u32);
    let (vmin, vmax) = (array.min(), array.max());
    let (a, b) = Array::normalization_coeff(vmin, vmax);

    let mut img = image::GrayImage::new(ny, nx);
    for i in 0..array.shape.x {
        for j in 0..array.shape.y {
            let t = (array.at(i, j) * a + b).clamp(0.0, 1.0);
            let px = (t * 255.0).round() as u8;
            img.put_pixel((array.shape.y - 1 - j) as u32, i as u32, image::Luma([px]));
        }
    }
    img.save(path)
        .map_err(|e| HighmapError::UnsupportedConfig(format!("png export failed: {e}")))
}

/// Writes `array` as a 16-bit grayscale PNG for higher dynamic range.
pub fn write_png_16bit(array: &Array, path: impl AsRef<Path>) -> Result<()> {
    let (vmin, vmax) = (array.min(), array.max());
    let (a, b) = Array::normalization_coeff(vmin, vmax);

    let mut img = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::new(
        array.shape.y as u32,
        array.shape.x as u32,
    );
    for i in 0..array.shape.x {
        for j in 0..array.shape.y {
            let t = (array.at(i, j) * a + b).clamp(0.0, 1.0);
            let px = (t * 65535.0).round() as u16;
            img.put_pixel((array.shape.y - 1 - j) as u32, i as u32, image::Luma([px]));
        }
    }
    img.save(path)
        .map_err(|e| HighmapError::UnsupportedConfig(format!("png export failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip() {
        let a = Array::from_vec(Vec2i::new(3, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let dir = std::env::temp_dir();
        let path = dir.join("highmap_test_raw.bin");
        write_raw_f32(&a, &path).unwrap();
        let b = read_raw_f32(&path).unwrap();
        assert_eq!(a.shape, b.shape);
        assert_eq!(a.data, b.data);
        let _ = std::fs::remove_file(path);
    }
}
