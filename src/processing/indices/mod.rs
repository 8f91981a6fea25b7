// src/processing/indices/mod.rs
pub mod ndi;

pub use ndi::{normalized_difference, NormalizedDifference};
