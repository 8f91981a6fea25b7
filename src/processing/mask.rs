// src/processing/mask.rs
use gdal::raster::Buffer;
use rayon::prelude::*;

use crate::error::{ensure_shape, Result};
use crate::io::BandArray;

/// Binary mask, values exactly 0 or 1.
pub type Mask = Buffer<u8>;

/// 1 where `index > cutoff`, 0 elsewhere. NaN never passes.
pub fn threshold_mask(index: &BandArray, cutoff: f32) -> Mask {
    let data = index
        .data()
        .par_iter()
        .map(|&value| u8::from(value > cutoff))
        .collect();
    Buffer::new(index.shape(), data)
}

/// Keep index values under the mask, NaN everywhere else.
pub fn apply_mask(index: &BandArray, mask: &Mask) -> Result<BandArray> {
    ensure_shape(index.shape(), mask.shape())?;

    let data = index
        .data()
        .par_iter()
        .zip(mask.data().par_iter())
        .map(|(&value, &keep)| if keep == 1 { value } else { f32::NAN })
        .collect();
    Ok(Buffer::new(index.shape(), data))
}

/// Number of pixels set in the mask.
pub fn coverage(mask: &Mask) -> usize {
    mask.data().iter().filter(|&&m| m == 1).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict_and_rejects_nan() {
        let index = Buffer::new((4, 1), vec![0.0, 0.1, -0.2, f32::NAN]);
        let mask = threshold_mask(&index, 0.0);
        assert_eq!(mask.data(), &[0, 1, 0, 0]);
    }

    #[test]
    fn masked_pixels_become_nan() {
        let index = Buffer::new((2, 2), vec![0.2, 0.3, 0.4, 0.5]);
        let mask = Buffer::new((2, 2), vec![1u8, 0, 1, 0]);
        let masked = apply_mask(&index, &mask).unwrap();
        assert_eq!(masked.data()[0], 0.2);
        assert!(masked.data()[1].is_nan());
        assert_eq!(masked.data()[2], 0.4);
        assert!(masked.data()[3].is_nan());
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let index = Buffer::new((2, 2), vec![0.0; 4]);
        let mask = Buffer::new((4, 1), vec![1u8; 4]);
        assert!(apply_mask(&index, &mask).is_err());
    }

    #[test]
    fn coverage_counts_ones() {
        let mask = Buffer::new((3, 1), vec![1u8, 0, 1]);
        assert_eq!(coverage(&mask), 2);
    }
}
