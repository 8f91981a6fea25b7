// src/error.rs
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("input raster not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("band {band} requested but raster has {count} band(s)")]
    BandOutOfRange { band: usize, count: usize },

    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("not enough input bands for {index}: required {required}, provided {provided}")]
    NotEnoughBands {
        index: String,
        required: usize,
        provided: usize,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),

    #[error("font error: {0}")]
    Font(#[from] ab_glyph::InvalidFont),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Shape check shared by every elementwise operation.
pub fn ensure_shape(expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
    if expected != actual {
        return Err(Error::ShapeMismatch { expected, actual });
    }
    Ok(())
}
