// src/render/layers.rs
//! Map layers: band arrays turned into RGB images.

use gdal::raster::Buffer;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use rayon::prelude::*;

use super::colormap::Colormap;
use crate::error::{ensure_shape, Result};
use crate::io::BandArray;
use crate::processing::temporal::{StabilityClass, StabilityScore};

/// Fill an image of `shape` (cols, rows) from a row-major pixel function.
fn from_band(shape: (usize, usize), pixel: impl Fn(usize) -> Rgb<u8> + Sync) -> RgbImage {
    let (width, height) = shape;
    let mut image = RgbImage::new(width as u32, height as u32);
    image
        .par_enumerate_pixels_mut()
        .for_each(|(x, y, px)| *px = pixel(y as usize * width + x as usize));
    image
}

fn to_byte(value: f32, scale: f32) -> u8 {
    let v = value / scale;
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Three bands divided by `scale`, clipped to [0, 1].
pub fn composite(
    red: &BandArray,
    green: &BandArray,
    blue: &BandArray,
    scale: f32,
) -> Result<RgbImage> {
    ensure_shape(red.shape(), green.shape())?;
    ensure_shape(red.shape(), blue.shape())?;

    let (r, g, b) = (red.data(), green.data(), blue.data());
    Ok(from_band(red.shape(), |i| {
        Rgb([to_byte(r[i], scale), to_byte(g[i], scale), to_byte(b[i], scale)])
    }))
}

pub fn colorize(index: &BandArray, colormap: &Colormap) -> RgbImage {
    let data = index.data();
    from_band(index.shape(), |i| Rgb(colormap.map(data[i])))
}

/// Stability scores drawn with the class palette; out-of-range scores are black.
pub fn classify(score: &StabilityScore) -> RgbImage {
    let data = score.data();
    from_band(score.shape(), |i| {
        Rgb(StabilityClass::from_score(data[i])
            .map(|class| class.color())
            .unwrap_or([0, 0, 0]))
    })
}

/// Horizontal ramp of `colormap` from vmin (left) to vmax (right).
pub fn colorbar(colormap: &Colormap, width: u32, height: u32) -> RgbImage {
    let span = colormap.vmax - colormap.vmin;
    RgbImage::from_fn(width, height, |x, _| {
        let t = if width > 1 {
            x as f32 / (width - 1) as f32
        } else {
            0.0
        };
        Rgb(colormap.map(colormap.vmin + span * t))
    })
}

/// Nearest-neighbour enlargement by an integer factor.
pub fn upscale(image: &RgbImage, factor: u32) -> RgbImage {
    if factor <= 1 {
        return image.clone();
    }
    imageops::resize(
        image,
        image.width() * factor,
        image.height() * factor,
        FilterType::Nearest,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::colormap::ColorScheme;

    #[test]
    fn composite_scales_and_clips() {
        let red = Buffer::new((2, 1), vec![3000.0, 6000.0]);
        let green = Buffer::new((2, 1), vec![1500.0, -10.0]);
        let blue = Buffer::new((2, 1), vec![0.0, f32::NAN]);
        let image = composite(&red, &green, &blue, 3000.0).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [255, 128, 0]);
        assert_eq!(image.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn pixel_order_follows_columns_then_rows() {
        let index = Buffer::new((3, 2), vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        let cmap = Colormap::new(ColorScheme::Viridis, 0.0, 1.0);
        let image = colorize(&index, &cmap);
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 0).0, [253, 231, 37]);
        assert_eq!(image.get_pixel(2, 1).0, [68, 1, 84]);
    }

    #[test]
    fn classify_uses_palette() {
        let score = Buffer::new((2, 1), vec![0, 3]);
        let image = classify(&score);
        assert_eq!(image.get_pixel(0, 0).0, [0xff, 0xff, 0xff]);
        assert_eq!(image.get_pixel(1, 0).0, [0x00, 0x4f, 0x0d]);
    }

    #[test]
    fn upscale_repeats_pixels() {
        let index = Buffer::new((2, 1), vec![-1.0, 1.0]);
        let cmap = Colormap::new(ColorScheme::Viridis, -1.0, 1.0);
        let image = upscale(&colorize(&index, &cmap), 4);
        assert_eq!(image.dimensions(), (8, 4));
        assert_eq!(image.get_pixel(1, 2).0, [68, 1, 84]);
        assert_eq!(image.get_pixel(6, 1).0, [253, 231, 37]);
    }

    #[test]
    fn colorbar_runs_low_to_high() {
        let cmap = Colormap::new(ColorScheme::Viridis, 0.0, 1.0);
        let bar = colorbar(&cmap, 10, 2);
        assert_eq!(bar.get_pixel(0, 1).0, [68, 1, 84]);
        assert_eq!(bar.get_pixel(9, 0).0, [253, 231, 37]);
    }
}
