// src/render/figure.rs
//! Multi-panel comparison figure.
//!
//! Panels sit on a grid with their titles, degree-minute tick labels,
//! colourbars, legends and north arrows drawn into the bitmap. A JSON
//! manifest next to the PNG repeats the text and value ranges.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use ab_glyph::{FontRef, PxScale};
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut,
    draw_text_mut, text_size,
};
use imageproc::point::Point;
use imageproc::rect::Rect;
use serde::Serialize;

use super::colormap::Colormap;
use super::encode::write_png;
use super::layers::{colorbar, upscale};
use crate::error::Result;
use crate::geo::{AxisTicks, GeoExtent};

/// Output resolution recorded in the PNG.
pub const FIGURE_DPI: u32 = 300;

const MIN_PANEL_SIDE: u32 = 256;
const MARGIN: u32 = 24;
const HEADER: u32 = 72;
const PANEL_TITLE: u32 = 26;
const Y_LABELS: u32 = 60;
const X_LABELS: u32 = 20;
const TICK: i32 = 4;
const FRAME: u32 = 2;
const COLORBAR_GAP: u32 = 6;
const COLORBAR_HEIGHT: u32 = 14;
const COLORBAR_LABEL: u32 = 20;
const NOTE_LINE: u32 = 18;
const FOOTER: u32 = 28;
const SWATCH: u32 = 12;

const TITLE_SIZE: f32 = 26.0;
const SUBTITLE_SIZE: f32 = 17.0;
const PANEL_TITLE_SIZE: f32 = 15.0;
const LABEL_SIZE: f32 = 12.0;
const NOTE_SIZE: f32 = 13.0;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const GREY: Rgb<u8> = Rgb([90, 90, 90]);

#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorbarSpec {
    pub label: String,
    #[serde(flatten)]
    pub colormap: Colormap,
}

pub struct Panel {
    pub title: String,
    pub image: RgbImage,
    pub colorbar: Option<ColorbarSpec>,
    pub legend: Vec<LegendEntry>,
    pub north_arrow: bool,
}

impl Panel {
    pub fn new(title: &str, image: RgbImage) -> Self {
        Self {
            title: title.to_string(),
            image,
            colorbar: None,
            legend: Vec::new(),
            north_arrow: true,
        }
    }

    pub fn with_colorbar(mut self, label: &str, colormap: Colormap) -> Self {
        self.colorbar = Some(ColorbarSpec {
            label: label.to_string(),
            colormap,
        });
        self
    }

    pub fn with_legend(mut self, legend: Vec<LegendEntry>) -> Self {
        self.legend = legend;
        self
    }

    pub fn without_north_arrow(mut self) -> Self {
        self.north_arrow = false;
        self
    }
}

/// Noto Sans faces used for every label.
struct Typeface {
    regular: FontRef<'static>,
    bold: FontRef<'static>,
}

impl Typeface {
    fn load() -> Result<Self> {
        Ok(Self {
            regular: FontRef::try_from_slice(notosans::REGULAR_TTF)?,
            bold: FontRef::try_from_slice(notosans::BOLD_TTF)?,
        })
    }
}

fn text_width(font: &FontRef, size: f32, text: &str) -> i32 {
    text_size(PxScale::from(size), font, text).0 as i32
}

fn draw_label(canvas: &mut RgbImage, font: &FontRef, size: f32, color: Rgb<u8>, x: i32, y: i32, text: &str) {
    draw_text_mut(canvas, color, x, y, PxScale::from(size), font, text);
}

/// Text whose horizontal centre is `cx`.
fn draw_centered(canvas: &mut RgbImage, font: &FontRef, size: f32, color: Rgb<u8>, cx: i32, y: i32, text: &str) {
    let x = cx - text_width(font, size, text) / 2;
    draw_label(canvas, font, size, color, x, y, text);
}

pub struct Figure {
    pub title: String,
    pub subtitle: Option<String>,
    pub footer: Option<String>,
    pub columns: usize,
    pub background: [u8; 3],
    pub extent: GeoExtent,
    pub ticks: AxisTicks,
    pub notes: Vec<String>,
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn new(title: &str, columns: usize, extent: GeoExtent, ticks: AxisTicks) -> Self {
        Self {
            title: title.to_string(),
            subtitle: None,
            footer: None,
            columns: columns.max(1),
            background: [0xf8, 0xf9, 0xfa],
            extent,
            ticks,
            notes: Vec::new(),
            panels: Vec::new(),
        }
    }

    pub fn push(&mut self, panel: Panel) {
        self.panels.push(panel);
    }

    fn rows(&self) -> usize {
        self.panels.len().div_ceil(self.columns)
    }

    /// Compose every panel and its annotations into one image.
    pub fn render(&self) -> Result<RgbImage> {
        let fonts = Typeface::load()?;

        let long_side = self
            .panels
            .iter()
            .map(|p| p.image.width().max(p.image.height()))
            .max()
            .unwrap_or(1)
            .max(1);
        let factor = MIN_PANEL_SIDE.div_ceil(long_side).max(1);

        let scaled: Vec<RgbImage> = self.panels.iter().map(|p| upscale(&p.image, factor)).collect();
        let image_w = scaled.iter().map(|i| i.width()).max().unwrap_or(0);
        let image_h = scaled.iter().map(|i| i.height()).max().unwrap_or(0);
        let has_colorbar = self.panels.iter().any(|p| p.colorbar.is_some());

        let cell_w = Y_LABELS + image_w;
        let mut cell_h = PANEL_TITLE + image_h + X_LABELS;
        if has_colorbar {
            cell_h += COLORBAR_GAP + COLORBAR_HEIGHT + COLORBAR_LABEL;
        }

        let columns = self.columns as u32;
        let rows = self.rows() as u32;
        let width = MARGIN + columns * (cell_w + MARGIN);
        let grid_bottom = HEADER + rows * (cell_h + MARGIN);
        let height = grid_bottom + self.notes.len() as u32 * NOTE_LINE + FOOTER;
        let mut canvas = RgbImage::from_pixel(width, height, Rgb(self.background));

        let center = (width / 2) as i32;
        draw_centered(&mut canvas, &fonts.bold, TITLE_SIZE, BLACK, center, 10, &self.title);
        if let Some(subtitle) = &self.subtitle {
            draw_centered(&mut canvas, &fonts.regular, SUBTITLE_SIZE, GREY, center, 44, subtitle);
        }

        for (i, (panel, image)) in self.panels.iter().zip(&scaled).enumerate() {
            let i = i as u32;
            let x = MARGIN + (i % columns) * (cell_w + MARGIN) + Y_LABELS;
            let y = HEADER + (i / columns) * (cell_h + MARGIN) + PANEL_TITLE;
            let (w, h) = image.dimensions();

            draw_centered(
                &mut canvas,
                &fonts.bold,
                PANEL_TITLE_SIZE,
                BLACK,
                (x + w / 2) as i32,
                (y - PANEL_TITLE + 2) as i32,
                &panel.title,
            );
            imageops::overlay(&mut canvas, image, x as i64, y as i64);
            draw_frame(&mut canvas, x, y, w, h);
            self.draw_ticks(&mut canvas, &fonts.regular, x, y, w, h);

            if panel.north_arrow {
                draw_north_arrow(&mut canvas, &fonts.bold, x, y, w, h);
            }
            if !panel.legend.is_empty() {
                draw_legend(&mut canvas, &fonts.regular, &panel.legend, x, y, w, h);
            }
            if let Some(spec) = &panel.colorbar {
                let bar_y = y + h + X_LABELS + COLORBAR_GAP;
                draw_colorbar(&mut canvas, &fonts.regular, spec, x, bar_y, w);
            }
        }

        for (i, note) in self.notes.iter().enumerate() {
            let y = grid_bottom + i as u32 * NOTE_LINE;
            draw_label(&mut canvas, &fonts.regular, NOTE_SIZE, BLACK, MARGIN as i32, y as i32, note);
        }
        if let Some(footer) = &self.footer {
            let y = (height - FOOTER + 6) as i32;
            draw_centered(&mut canvas, &fonts.regular, LABEL_SIZE, GREY, center, y, footer);
        }

        Ok(canvas)
    }

    /// Tick marks and degree-minute labels below and left of a panel.
    fn draw_ticks(&self, canvas: &mut RgbImage, font: &FontRef, x: u32, y: u32, w: u32, h: u32) {
        let extent = &self.extent;

        let span = extent.width();
        if span > 0.0 {
            let bottom = (y + h + FRAME) as i32;
            for tick in &self.ticks.x {
                let px = x as i32 + ((tick.value - extent.west) / span * w as f64).round() as i32;
                draw_line_segment_mut(
                    canvas,
                    (px as f32, bottom as f32),
                    (px as f32, (bottom + TICK) as f32),
                    BLACK,
                );
                draw_centered(canvas, font, LABEL_SIZE, BLACK, px, bottom + TICK + 1, &tick.label);
            }
        }

        let span = extent.height();
        if span > 0.0 {
            let left = x as i32 - FRAME as i32;
            for tick in &self.ticks.y {
                let py = y as i32 + ((extent.north - tick.value) / span * h as f64).round() as i32;
                draw_line_segment_mut(
                    canvas,
                    ((left - TICK) as f32, py as f32),
                    (left as f32, py as f32),
                    BLACK,
                );
                let label_x = left - TICK - 2 - text_width(font, LABEL_SIZE, &tick.label);
                let label_y = py - LABEL_SIZE as i32 / 2;
                draw_label(canvas, font, LABEL_SIZE, BLACK, label_x, label_y, &tick.label);
            }
        }
    }

    pub fn manifest(&self, image_path: &Path) -> FigureManifest {
        FigureManifest {
            image: image_path.to_path_buf(),
            dpi: FIGURE_DPI,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            footer: self.footer.clone(),
            extent: self.extent,
            ticks: self.ticks.clone(),
            notes: self.notes.clone(),
            panels: self
                .panels
                .iter()
                .map(|p| PanelManifest {
                    title: p.title.clone(),
                    width: p.image.width() as usize,
                    height: p.image.height() as usize,
                    colorbar: p.colorbar.clone(),
                    legend: p.legend.clone(),
                })
                .collect(),
        }
    }

    /// Write the PNG and its `.json` manifest. Returns the manifest path.
    pub fn save(&self, path: &Path) -> Result<PathBuf> {
        write_png(&self.render()?, path, FIGURE_DPI)?;

        let manifest_path = path.with_extension("json");
        let writer = BufWriter::new(File::create(&manifest_path)?);
        serde_json::to_writer_pretty(writer, &self.manifest(path))?;
        Ok(manifest_path)
    }
}

#[derive(Debug, Serialize)]
pub struct PanelManifest {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub colorbar: Option<ColorbarSpec>,
    pub legend: Vec<LegendEntry>,
}

#[derive(Debug, Serialize)]
pub struct FigureManifest {
    pub image: PathBuf,
    pub dpi: u32,
    pub title: String,
    pub subtitle: Option<String>,
    pub footer: Option<String>,
    pub extent: GeoExtent,
    pub ticks: AxisTicks,
    pub notes: Vec<String>,
    pub panels: Vec<PanelManifest>,
}

/// Border drawn just outside the panel image.
fn draw_frame(canvas: &mut RgbImage, x: u32, y: u32, w: u32, h: u32) {
    for t in 1..=FRAME {
        let rect = Rect::at(x as i32 - t as i32, y as i32 - t as i32).of_size(w + 2 * t, h + 2 * t);
        draw_hollow_rect_mut(canvas, rect, BLACK);
    }
}

/// Filled arrow over an "N" in a white box near the panel's top-left corner.
fn draw_north_arrow(canvas: &mut RgbImage, font: &FontRef, x: u32, y: u32, w: u32, h: u32) {
    let size = (w.min(h) / 12).max(10) as i32;
    let left = x as i32 + (w as f64 * 0.05) as i32 + FRAME as i32;
    let top = y as i32 + (h as f64 * 0.05) as i32 + FRAME as i32;

    let frame = Rect::at(left, top).of_size(size as u32 + 8, (size + LABEL_SIZE as i32 + 8) as u32);
    draw_filled_rect_mut(canvas, frame, WHITE);
    draw_hollow_rect_mut(canvas, frame, BLACK);

    let cx = left + 4 + size / 2;
    let base = top + 3 + size;
    draw_polygon_mut(
        canvas,
        &[
            Point::new(cx, top + 3),
            Point::new(cx - size / 2, base),
            Point::new(cx + size / 2, base),
        ],
        BLACK,
    );
    draw_centered(canvas, font, LABEL_SIZE, BLACK, cx, base, "N");
}

/// Swatches with labels in a white box at the panel's bottom-right corner.
fn draw_legend(
    canvas: &mut RgbImage,
    font: &FontRef,
    legend: &[LegendEntry],
    x: u32,
    y: u32,
    w: u32,
    h: u32,
) {
    let row = SWATCH as i32 + 6;
    let label_w = legend
        .iter()
        .map(|entry| text_width(font, LABEL_SIZE, &entry.label))
        .max()
        .unwrap_or(0);
    let box_w = SWATCH as i32 + label_w + 18;
    let box_h = row * legend.len() as i32 + 6;
    let left = x as i32 + w as i32 - box_w - 6;
    let top = y as i32 + h as i32 - box_h - 6;

    let frame = Rect::at(left, top).of_size(box_w as u32, box_h as u32);
    draw_filled_rect_mut(canvas, frame, WHITE);
    draw_hollow_rect_mut(canvas, frame, BLACK);

    for (i, entry) in legend.iter().enumerate() {
        let row_top = top + 6 + i as i32 * row;
        let swatch = Rect::at(left + 6, row_top).of_size(SWATCH, SWATCH);
        draw_filled_rect_mut(canvas, swatch, Rgb(entry.color));
        draw_hollow_rect_mut(canvas, swatch, BLACK);
        let label_x = left + 12 + SWATCH as i32;
        draw_label(canvas, font, LABEL_SIZE, BLACK, label_x, row_top - 1, &entry.label);
    }
}

/// Colour ramp under a panel with its range and label.
fn draw_colorbar(canvas: &mut RgbImage, font: &FontRef, spec: &ColorbarSpec, x: u32, y: u32, w: u32) {
    if w == 0 {
        return;
    }
    let bar = colorbar(&spec.colormap, w, COLORBAR_HEIGHT);
    imageops::overlay(canvas, &bar, x as i64, y as i64);
    draw_hollow_rect_mut(canvas, Rect::at(x as i32, y as i32).of_size(w, COLORBAR_HEIGHT), BLACK);

    let label_y = (y + COLORBAR_HEIGHT + 3) as i32;
    let low = format!("{:.2}", spec.colormap.vmin);
    let high = format!("{:.2}", spec.colormap.vmax);
    draw_label(canvas, font, LABEL_SIZE, BLACK, x as i32, label_y, &low);
    let high_x = (x + w) as i32 - text_width(font, LABEL_SIZE, &high);
    draw_label(canvas, font, LABEL_SIZE, BLACK, high_x, label_y, &high);
    draw_centered(canvas, font, LABEL_SIZE, BLACK, (x + w / 2) as i32, label_y, &spec.label);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::colormap::ColorScheme;

    const PANEL: Rgb<u8> = Rgb([10, 20, 30]);

    fn extent() -> GeoExtent {
        GeoExtent {
            west: 0.0,
            east: 1.0,
            south: 0.0,
            north: 1.0,
        }
    }

    fn figure(title: &str) -> Figure {
        Figure::new(title, 2, extent(), AxisTicks::for_extent(&extent(), 0.1))
    }

    /// Pixels in the header band that differ from the background.
    fn header_ink(image: &RgbImage, background: [u8; 3]) -> usize {
        (0..HEADER)
            .flat_map(|y| (0..image.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| image.get_pixel(x, y).0 != background)
            .count()
    }

    #[test]
    fn two_panels_side_by_side() {
        let mut figure = figure("Test");
        figure.push(Panel::new("A", RgbImage::from_pixel(2, 2, PANEL)));
        figure.push(
            Panel::new("B", RgbImage::from_pixel(2, 2, BLACK))
                .with_colorbar("idx", Colormap::new(ColorScheme::Viridis, 0.0, 1.0)),
        );

        let image = figure.render().unwrap();
        // 2x2 panels upscale to 256x256
        assert_eq!(image.width(), MARGIN + 2 * (Y_LABELS + 256 + MARGIN));
        assert_eq!(
            image.height(),
            HEADER
                + PANEL_TITLE
                + 256
                + X_LABELS
                + COLORBAR_GAP
                + COLORBAR_HEIGHT
                + COLORBAR_LABEL
                + MARGIN
                + FOOTER
        );

        let (x0, y0) = (MARGIN + Y_LABELS, HEADER + PANEL_TITLE);
        // interior of first panel keeps its colour
        assert_eq!(*image.get_pixel(x0 + 200, y0 + 120), PANEL);
        // frame
        assert_eq!(*image.get_pixel(x0 - 1, y0 + 100), BLACK);
    }

    #[test]
    fn title_is_drawn() {
        let mut titled = figure("Identification of Potential Fishing Zones");
        titled.push(Panel::new("A", RgbImage::from_pixel(4, 4, PANEL)));
        let image = titled.render().unwrap();
        assert!(header_ink(&image, titled.background) > 100);

        let mut blank = figure("");
        blank.push(Panel::new("A", RgbImage::from_pixel(4, 4, PANEL)));
        let image = blank.render().unwrap();
        assert_eq!(header_ink(&image, blank.background), 0);
    }

    #[test]
    fn north_arrow_is_optional() {
        let (x0, y0) = (MARGIN + Y_LABELS, HEADER + PANEL_TITLE);
        // 256 px panel: arrow box at +14, triangle centred at +28
        let inside_arrow = (x0 + 28, y0 + 14 + 15);

        let mut with_arrow = figure("");
        with_arrow.push(Panel::new("A", RgbImage::from_pixel(256, 256, PANEL)));
        let image = with_arrow.render().unwrap();
        assert_eq!(*image.get_pixel(inside_arrow.0, inside_arrow.1), BLACK);

        let mut without = figure("");
        without.push(Panel::new("A", RgbImage::from_pixel(256, 256, PANEL)).without_north_arrow());
        let image = without.render().unwrap();
        assert_eq!(*image.get_pixel(inside_arrow.0, inside_arrow.1), PANEL);
    }

    #[test]
    fn legend_box_sits_bottom_right() {
        let mut figure = figure("");
        let legend = vec![LegendEntry {
            label: "Stable (>5 Years)".to_string(),
            color: [0x00, 0x4f, 0x0d],
        }];
        figure.push(
            Panel::new("A", RgbImage::from_pixel(256, 256, PANEL))
                .with_legend(legend)
                .without_north_arrow(),
        );
        let image = figure.render().unwrap();
        let (x0, y0) = (MARGIN + Y_LABELS, HEADER + PANEL_TITLE);
        // box_h = 18 + 6, so the swatch row starts 18 px above the bottom edge
        let swatch_y = y0 + 256 - 6 - 24 + 6 + SWATCH / 2;
        let row: Vec<Rgb<u8>> = (x0..x0 + 256).map(|x| *image.get_pixel(x, swatch_y)).collect();
        assert!(row.contains(&Rgb([0x00, 0x4f, 0x0d])));
        assert!(row.contains(&WHITE));
    }

    #[test]
    fn grid_wraps_rows() {
        let mut figure = figure("Grid");
        figure.notes = vec!["one".to_string(), "two".to_string()];
        for _ in 0..4 {
            figure.push(Panel::new("p", RgbImage::from_pixel(300, 200, WHITE)).without_north_arrow());
        }
        assert_eq!(figure.rows(), 2);
        let image = figure.render().unwrap();
        assert_eq!(
            image.height(),
            HEADER + 2 * (PANEL_TITLE + 200 + X_LABELS + MARGIN) + 2 * NOTE_LINE + FOOTER
        );
    }
}
