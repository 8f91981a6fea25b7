// src/processing/stats.rs
use serde::Serialize;

use crate::error::{ensure_shape, Result};
use crate::io::BandArray;
use crate::processing::mask::Mask;

/// Summary of an index over the pixels a mask keeps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaskedStatistics {
    pub mean: Option<f64>,
    pub max: Option<f64>,
    /// Masked pixels with a finite index value.
    pub valid_count: usize,
    /// All pixels the mask keeps, NaN or not.
    pub masked_count: usize,
}

/// Mean and max of `index` where `mask == 1`, skipping NaN.
pub fn masked_statistics(index: &BandArray, mask: &Mask) -> Result<MaskedStatistics> {
    ensure_shape(index.shape(), mask.shape())?;

    let mut sum = 0.0f64;
    let mut max = f64::NEG_INFINITY;
    let mut valid_count = 0usize;
    let mut masked_count = 0usize;

    for (&value, &keep) in index.data().iter().zip(mask.data()) {
        if keep != 1 {
            continue;
        }
        masked_count += 1;
        if value.is_nan() {
            continue;
        }
        let value = value as f64;
        sum += value;
        max = max.max(value);
        valid_count += 1;
    }

    let (mean, max) = if valid_count > 0 {
        (Some(sum / valid_count as f64), Some(max))
    } else {
        (None, None)
    };

    Ok(MaskedStatistics {
        mean,
        max,
        valid_count,
        masked_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gdal::raster::Buffer;

    #[test]
    fn ignores_unmasked_and_nan() {
        let index = Buffer::new((4, 1), vec![0.1, 0.3, f32::NAN, 0.9]);
        let mask = Buffer::new((4, 1), vec![1u8, 1, 1, 0]);
        let stats = masked_statistics(&index, &mask).unwrap();
        assert_relative_eq!(stats.mean.unwrap(), 0.2, epsilon = 1e-6);
        assert_relative_eq!(stats.max.unwrap(), 0.3, epsilon = 1e-6);
        assert_eq!(stats.valid_count, 2);
        assert_eq!(stats.masked_count, 3);
    }

    #[test]
    fn empty_mask_has_no_statistics() {
        let index = Buffer::new((2, 1), vec![0.1, 0.2]);
        let mask = Buffer::new((2, 1), vec![0u8, 0]);
        let stats = masked_statistics(&index, &mask).unwrap();
        assert_eq!(stats.mean, None);
        assert_eq!(stats.max, None);
        assert_eq!(stats.valid_count, 0);
    }
}
