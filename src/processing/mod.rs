// src/processing/mod.rs
pub mod indices;
pub mod mask;
pub mod pipeline;
pub mod stats;
pub mod temporal;

// Re-export main components
pub use indices::NormalizedDifference;
pub use mask::{apply_mask, threshold_mask, Mask};
pub use pipeline::{IndexCalculator, MaskedIndex, MaskedIndexPipeline};
pub use stats::{masked_statistics, MaskedStatistics};
pub use temporal::{class_histogram, stability_score, ClassHistogram, StabilityClass};
