// src/geo/mod.rs
pub mod extent;
pub mod ticks;

pub use extent::{geographic_extent, Bounds, GeoExtent};
pub use ticks::{format_dm, AxisTicks, Tick};
