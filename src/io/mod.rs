// src/io/mod.rs
pub mod reader;
pub mod writer;

pub use reader::{read_bands, read_single_band, BandArray, BandSet, RasterProfile};
pub use writer::{write_f32, write_i32, ExportOptions, CLASS_NODATA, FLOAT_NODATA};
