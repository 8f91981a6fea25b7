// src/io/writer.rs
use std::path::Path;

use gdal::raster::{Buffer, GdalType, RasterCreationOptions};
use gdal::{DriverManager, Metadata};

use super::reader::RasterProfile;
use crate::error::{ensure_shape, Result};
use crate::utils::nodata::nan_to_sentinel;

/// Nodata written for masked float products.
pub const FLOAT_NODATA: f32 = -9999.0;
/// Nodata written for integer class maps.
pub const CLASS_NODATA: i32 = 0;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub nodata: f64,
    pub description: String,
    pub compress: String,
    pub tiled: bool,
}

impl ExportOptions {
    pub fn float(description: &str) -> Self {
        Self {
            nodata: FLOAT_NODATA as f64,
            description: description.to_string(),
            compress: "DEFLATE".to_string(),
            tiled: false,
        }
    }

    pub fn class(description: &str) -> Self {
        Self {
            nodata: CLASS_NODATA as f64,
            description: description.to_string(),
            compress: "DEFLATE".to_string(),
            tiled: false,
        }
    }

    fn creation_options(&self) -> RasterCreationOptions {
        let mut options = Vec::new();
        if !self.compress.eq_ignore_ascii_case("NONE") {
            options.push(format!("COMPRESS={}", self.compress.to_uppercase()));
        }
        if self.tiled {
            options.push("TILED=YES".to_string());
        }
        RasterCreationOptions::from_iter(options)
    }
}

/// Write a masked f32 map, replacing NaN with `options.nodata`.
pub fn write_f32(
    data: &Buffer<f32>,
    profile: &RasterProfile,
    output_path: &Path,
    options: &ExportOptions,
) -> Result<()> {
    ensure_shape(profile.shape(), data.shape())?;
    let filled = nan_to_sentinel(data.data(), options.nodata as f32);
    write_band(Buffer::new(data.shape(), filled), profile, output_path, options)
}

/// Write an integer class map as-is with `options.nodata` declared.
pub fn write_i32(
    data: &Buffer<i32>,
    profile: &RasterProfile,
    output_path: &Path,
    options: &ExportOptions,
) -> Result<()> {
    ensure_shape(profile.shape(), data.shape())?;
    write_band(
        Buffer::new(data.shape(), data.data().to_vec()),
        profile,
        output_path,
        options,
    )
}

fn write_band<T: GdalType + Copy>(
    mut buffer: Buffer<T>,
    profile: &RasterProfile,
    output_path: &Path,
    options: &ExportOptions,
) -> Result<()> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;

    let mut out_ds = driver.create_with_band_type_with_options::<T, _>(
        output_path,
        profile.width,
        profile.height,
        1,
        &options.creation_options(),
    )?;

    if profile.has_crs() {
        out_ds.set_projection(&profile.projection)?;
    }
    out_ds.set_geo_transform(&profile.geo_transform)?;

    let mut band = out_ds.rasterband(1)?;
    band.set_no_data_value(Some(options.nodata))?;
    band.set_description(&options.description)?;

    let shape = buffer.shape();
    band.write((0, 0), shape, &mut buffer)?;

    out_ds.flush_cache()?;
    log::debug!("Wrote {:?} band to {}", shape, output_path.display());

    Ok(())
}
