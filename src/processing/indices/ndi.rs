// src/processing/indices/ndi.rs
use gdal::raster::Buffer;
use rayon::prelude::*;

use crate::error::{ensure_shape, Result};
use crate::io::{BandArray, BandSet};
use crate::processing::pipeline::IndexCalculator;

/// Normalized difference `(A - B) / (A + B)` of two bands.
///
/// A zero denominator yields NaN instead of an error.
pub struct NormalizedDifference {
    band_a: usize,
    band_b: usize,
    name: String,
}

impl NormalizedDifference {
    pub fn new(band_a: usize, band_b: usize, name: Option<String>) -> Self {
        Self {
            band_a,
            band_b,
            name: name.unwrap_or_else(|| "NDI".to_string()),
        }
    }

    /// Water index: (GREEN - NIR) / (GREEN + NIR)
    pub fn ndwi(green: usize, nir: usize) -> Self {
        Self::new(green, nir, Some("NDWI".to_string()))
    }

    /// Chlorophyll index: (RED_EDGE - RED) / (RED_EDGE + RED)
    pub fn ndci(red_edge: usize, red: usize) -> Self {
        Self::new(red_edge, red, Some("NDCI".to_string()))
    }

    /// Turbidity index: (RED - GREEN) / (RED + GREEN)
    pub fn ndti(red: usize, green: usize) -> Self {
        Self::new(red, green, Some("NDTI".to_string()))
    }

    /// Vegetation index: (NIR - RED) / (NIR + RED)
    pub fn ndvi(nir: usize, red: usize) -> Self {
        Self::new(nir, red, Some("NDVI".to_string()))
    }
}

impl IndexCalculator for NormalizedDifference {
    fn calculate(&self, inputs: &BandSet) -> Result<BandArray> {
        normalized_difference(inputs.band(self.band_a)?, inputs.band(self.band_b)?)
    }

    fn required_bands(&self) -> Vec<usize> {
        vec![self.band_a, self.band_b]
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Elementwise `(a - b) / (a + b)` over two arrays of equal shape.
pub fn normalized_difference(a: &BandArray, b: &BandArray) -> Result<BandArray> {
    ensure_shape(a.shape(), b.shape())?;

    let a_data = a.data();
    let b_data = b.data();
    let mut result = vec![0.0f32; a_data.len()];

    result.par_iter_mut().enumerate().for_each(|(i, out)| {
        let sum = a_data[i] + b_data[i];
        *out = if sum != 0.0 {
            (a_data[i] - b_data[i]) / sum
        } else {
            f32::NAN
        };
    });

    Ok(Buffer::new(a.shape(), result))
}
