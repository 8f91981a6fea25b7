pub mod nodata;
