// src/io/reader.rs
use std::collections::BTreeMap;
use std::path::Path;

use gdal::raster::{Buffer, GdalType};
use gdal::Dataset;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::geo::Bounds;

/// One band of reflectance values, shape `(cols, rows)`, row-major.
pub type BandArray = Buffer<f32>;

/// Spatial metadata carried from the source raster to the export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterProfile {
    pub projection: String,
    pub geo_transform: [f64; 6],
    pub width: usize,
    pub height: usize,
}

impl RasterProfile {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        let (width, height) = dataset.raster_size();
        Ok(Self {
            projection: dataset.projection(),
            geo_transform: dataset.geo_transform()?,
            width,
            height,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_geo_transform(&self.geo_transform, self.width, self.height)
    }

    pub fn has_crs(&self) -> bool {
        !self.projection.trim().is_empty()
    }
}

/// Bands read from one raster, keyed by their 1-based band number.
pub struct BandSet {
    profile: RasterProfile,
    band_count: usize,
    arrays: BTreeMap<usize, BandArray>,
}

impl BandSet {
    /// Build a band set from in-memory arrays. Every array must match the profile's shape.
    pub fn from_arrays(
        profile: RasterProfile,
        arrays: impl IntoIterator<Item = (usize, BandArray)>,
    ) -> Result<Self> {
        let arrays: BTreeMap<usize, BandArray> = arrays.into_iter().collect();
        for array in arrays.values() {
            crate::error::ensure_shape(profile.shape(), array.shape())?;
        }
        let band_count = arrays.keys().max().copied().unwrap_or(0);
        Ok(Self {
            profile,
            band_count,
            arrays,
        })
    }

    pub fn profile(&self) -> &RasterProfile {
        &self.profile
    }

    pub fn shape(&self) -> (usize, usize) {
        self.profile.shape()
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn band(&self, band: usize) -> Result<&BandArray> {
        self.arrays.get(&band).ok_or(Error::BandOutOfRange {
            band,
            count: self.band_count,
        })
    }
}

/// Fails with `InputNotFound` unless `path` exists.
pub fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Read the given 1-based bands of a raster as f32.
///
/// The dataset is opened for the duration of the call only.
pub fn read_bands(path: &Path, bands: &[usize]) -> Result<BandSet> {
    ensure_exists(path)?;

    let dataset = Dataset::open(path)?;
    let profile = RasterProfile::from_dataset(&dataset)?;
    let band_count = dataset.raster_count() as usize;
    let (width, height) = profile.shape();

    log::debug!(
        "Opened {} ({}x{}, {} bands)",
        path.display(),
        width,
        height,
        band_count
    );

    let mut arrays = BTreeMap::new();
    for &band in bands {
        if band == 0 || band > band_count {
            return Err(Error::BandOutOfRange {
                band,
                count: band_count,
            });
        }
        if arrays.contains_key(&band) {
            continue;
        }
        let buffer = dataset.rasterband(band)?.read_as::<f32>(
            (0, 0),
            (width, height),
            (width, height),
            None,
        )?;
        arrays.insert(band, buffer);
    }

    Ok(BandSet {
        profile,
        band_count,
        arrays,
    })
}

/// A single-band raster read back from disk together with its declared nodata.
pub struct SingleBand<T: GdalType> {
    pub data: Buffer<T>,
    pub nodata: Option<f64>,
    pub profile: RasterProfile,
}

impl SingleBand<f32> {
    /// Values with the declared nodata turned back into NaN.
    pub fn with_nan(&self) -> Vec<f32> {
        match self.nodata {
            Some(nodata) => crate::utils::nodata::sentinel_to_nan(self.data.data(), nodata as f32),
            None => self.data.data().to_vec(),
        }
    }
}

/// Read band 1 of an exported raster.
pub fn read_single_band<T: GdalType + Copy>(path: &Path) -> Result<SingleBand<T>> {
    ensure_exists(path)?;

    let dataset = Dataset::open(path)?;
    let profile = RasterProfile::from_dataset(&dataset)?;
    let band = dataset.rasterband(1)?;
    let shape = profile.shape();
    let data = band.read_as::<T>((0, 0), shape, shape, None)?;

    Ok(SingleBand {
        data,
        nodata: band.no_data_value(),
        profile,
    })
}
