// src/processing/pipeline.rs
use itertools::Itertools;

use crate::error::{Error, Result};
use crate::io::{BandArray, BandSet};
use crate::processing::mask::{apply_mask, coverage, threshold_mask, Mask};

/// Trait for spectral index calculators
pub trait IndexCalculator: Send + Sync {
    /// Calculate the index from the bands of one raster
    fn calculate(&self, inputs: &BandSet) -> Result<BandArray>;

    /// 1-based band numbers this index reads
    fn required_bands(&self) -> Vec<usize>;

    /// Return the name of the index
    fn name(&self) -> &str;
}

/// Everything one masked-index pass produces.
pub struct MaskedIndex {
    /// The index the mask was derived from (e.g. NDWI).
    pub mask_source: BandArray,
    pub mask: Mask,
    /// The unmasked product index (e.g. NDCI).
    pub index: BandArray,
    /// `index` with every unmasked pixel set to NaN.
    pub masked: BandArray,
}

/// Threshold one index, apply the result to another.
pub struct MaskedIndexPipeline<M, P> {
    mask_index: M,
    product_index: P,
    cutoff: f32,
}

impl<M: IndexCalculator, P: IndexCalculator> MaskedIndexPipeline<M, P> {
    pub fn new(mask_index: M, product_index: P, cutoff: f32) -> Self {
        Self {
            mask_index,
            product_index,
            cutoff,
        }
    }

    /// Band numbers both indices need, deduplicated and sorted.
    pub fn required_bands(&self) -> Vec<usize> {
        self.mask_index
            .required_bands()
            .into_iter()
            .chain(self.product_index.required_bands())
            .sorted()
            .dedup()
            .collect()
    }

    pub fn run(&self, inputs: &BandSet) -> Result<MaskedIndex> {
        let required = self.required_bands();
        if inputs.len() < required.len() {
            return Err(Error::NotEnoughBands {
                index: format!("{}/{}", self.mask_index.name(), self.product_index.name()),
                required: required.len(),
                provided: inputs.len(),
            });
        }

        let mask_source = self.mask_index.calculate(inputs)?;
        let mask = threshold_mask(&mask_source, self.cutoff);
        log::debug!(
            "{} > {} keeps {} of {} pixels",
            self.mask_index.name(),
            self.cutoff,
            coverage(&mask),
            mask.data().len()
        );

        let index = self.product_index.calculate(inputs)?;
        let masked = apply_mask(&index, &mask)?;

        Ok(MaskedIndex {
            mask_source,
            mask,
            index,
            masked,
        })
    }
}
