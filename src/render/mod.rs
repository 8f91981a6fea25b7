// src/render/mod.rs
pub mod colormap;
pub mod encode;
pub mod figure;
pub mod layers;

pub use ::image::RgbImage;
pub use colormap::{ColorScheme, Colormap};
pub use figure::{Figure, LegendEntry, Panel, FIGURE_DPI};
pub use layers::{classify, colorize, composite};
