// src/workflows/mangrove.rs
//! Mangrove stability across three dates: NDVI > cutoff per date, summed
//! and restricted to pixels still vegetated on the latest date.

use std::path::{Path, PathBuf};

use super::{first_missing, prepare_output_dir, RunOutcome, RunReport};
use crate::config::{Config, FourBands};
use crate::error::Result;
use crate::geo::{geographic_extent, AxisTicks};
use crate::io::{read_bands, write_i32, BandSet, ExportOptions};
use crate::processing::{
    class_histogram, stability_score, threshold_mask, IndexCalculator, Mask,
    NormalizedDifference, StabilityClass,
};
use crate::render::{classify, colorize, composite, ColorScheme, Colormap, Figure, LegendEntry, Panel};

/// Vegetation mask for one date.
pub fn vegetation_mask(bands: &BandSet, layout: &FourBands, cutoff: f32) -> Result<Mask> {
    let ndvi = NormalizedDifference::ndvi(layout.nir, layout.red).calculate(bands)?;
    Ok(threshold_mask(&ndvi, cutoff))
}

fn read_mask(path: &Path, layout: &FourBands, cutoff: f32) -> Result<Mask> {
    let bands = read_bands(path, &[layout.red, layout.nir])?;
    vegetation_mask(&bands, layout, cutoff)
}

pub fn run(config: &Config) -> Result<RunOutcome> {
    let cfg = &config.mangrove;
    let inputs: Vec<PathBuf> = cfg
        .inputs
        .iter()
        .map(|d| config.input_path(&d.path))
        .collect();
    if let Some(missing) = first_missing(inputs.iter().map(PathBuf::as_path)) {
        return Ok(RunOutcome::MissingInput(missing));
    }
    prepare_output_dir(config)?;

    log::info!("1. Processing Data...");
    let b = cfg.bands;
    let first = read_mask(&inputs[0], &b, cfg.vegetation_threshold)?;
    let middle = read_mask(&inputs[1], &b, cfg.vegetation_threshold)?;
    let latest = read_bands(&inputs[2], &b.as_array())?;
    let last = vegetation_mask(&latest, &b, cfg.vegetation_threshold)?;

    log::info!("2. Transforming Coordinates...");
    let extent = geographic_extent(latest.profile())?;

    log::info!("3. Calculating Mangrove Age/Stability...");
    let score = stability_score(&first, &middle, &last)?;
    let classes = class_histogram(&score);
    for class in StabilityClass::ALL {
        log::info!("   {:<24} {:>10} px", class.label(), classes.count(class));
    }

    log::info!("4. Generating Visualization...");
    let (red, green, blue, nir) = (
        latest.band(b.red)?,
        latest.band(b.green)?,
        latest.band(b.blue)?,
        latest.band(b.nir)?,
    );
    let true_color = composite(red, green, blue, cfg.rgb_scale)?;
    let false_color = composite(nir, red, green, cfg.rgb_scale)?;
    let ndwi = NormalizedDifference::ndwi(b.green, b.nir).calculate(&latest)?;
    let ndwi_colormap = Colormap::new(
        ColorScheme::RedBlue,
        cfg.ndwi_display.min,
        cfg.ndwi_display.max,
    )
    .with_bad([255, 255, 255]);

    let first_label = &cfg.inputs[0].label;
    let latest_label = &cfg.inputs[2].label;
    let mut figure = Figure::new(
        &format!(
            "Spatiotemporal Mangrove Stability Analysis ({}-{})",
            first_label, latest_label
        ),
        2,
        extent,
        AxisTicks::for_extent(&extent, cfg.tick_pad),
    );
    figure.push(Panel::new(&format!("True Color ({})", latest_label), true_color).without_north_arrow());
    figure.push(Panel::new("False Color (Vegetation)", false_color).without_north_arrow());
    figure.push(
        Panel::new("NDWI (Water Index)", colorize(&ndwi, &ndwi_colormap))
            .with_colorbar("NDWI", ndwi_colormap)
            .without_north_arrow(),
    );
    let legend = [
        StabilityClass::Stable,
        StabilityClass::Intermediate,
        StabilityClass::New,
    ]
    .into_iter()
    .map(|class| LegendEntry {
        label: class.label().to_string(),
        color: class.color(),
    })
    .collect();
    figure.push(
        Panel::new("Mangrove Stability Class", classify(&score))
            .with_legend(legend)
            .without_north_arrow(),
    );

    let layout = config.output_path(&cfg.layout);
    let manifest = figure.save(&layout)?;
    log::info!("   Image saved to: {}", layout.display());

    log::info!("5. Exporting GeoTIFF...");
    let raster = config.output_path(&cfg.raster);
    write_i32(
        &score,
        latest.profile(),
        &raster,
        &ExportOptions::class("Mangrove stability score"),
    )?;
    log::info!("   TIF saved to: {}", raster.display());

    Ok(RunOutcome::Completed(RunReport {
        workflow: "mangrove",
        layout,
        manifest,
        raster,
        extent,
        statistics: None,
        classes: Some(classes),
    }))
}
