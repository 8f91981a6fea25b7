// src/workflows/turbidity.rs
//! Sediment load: NDTI over water (NDWI > 0).

use super::{first_missing, prepare_output_dir, RunOutcome, RunReport};
use crate::config::Config;
use crate::error::Result;
use crate::geo::{geographic_extent, AxisTicks};
use crate::io::{read_bands, write_f32, ExportOptions};
use crate::processing::{masked_statistics, MaskedIndexPipeline, NormalizedDifference};
use crate::render::{colorize, composite, ColorScheme, Colormap, Figure, Panel};

pub fn run(config: &Config) -> Result<RunOutcome> {
    let cfg = &config.turbidity;
    let input = config.input_path(&cfg.input);
    if let Some(missing) = first_missing([input.as_path()]) {
        return Ok(RunOutcome::MissingInput(missing));
    }
    prepare_output_dir(config)?;

    log::info!("1. Reading Data & Calculating Algorithms...");
    let b = cfg.bands;
    let bands = read_bands(&input, &b.as_array())?;

    let pipeline = MaskedIndexPipeline::new(
        NormalizedDifference::ndwi(b.green, b.nir),
        NormalizedDifference::ndti(b.red, b.green),
        cfg.water_threshold,
    );
    let result = pipeline.run(&bands)?;
    let stats = masked_statistics(&result.index, &result.mask)?;
    log::debug!("NDTI over water: {:?}", stats);

    let true_color = composite(
        bands.band(b.red)?,
        bands.band(b.green)?,
        bands.band(b.blue)?,
        cfg.rgb_scale,
    )?;
    let extent = geographic_extent(bands.profile())?;

    log::info!("2. Generating Visualization...");
    let colormap = Colormap::new(ColorScheme::EarthReversed, cfg.display.min, cfg.display.max);
    let mut figure = Figure::new(
        "Turbidity and Water Quality Mapping Analysis",
        2,
        extent,
        AxisTicks::for_extent(&extent, cfg.tick_pad),
    );
    figure.notes = vec![
        "Analysis Interpretation:".to_string(),
        "- Brown/Yellow Areas: High Sedimentation.".to_string(),
        "- Blue/Green Areas: Clear Water.".to_string(),
        "- Black Areas: Land Mask (Excluded).".to_string(),
    ];
    figure.push(Panel::new("A. Natural View (True Color RGB)", true_color));
    figure.push(
        Panel::new(
            "B. Sediment Distribution (NDTI Analysis)",
            colorize(&result.masked, &colormap),
        )
        .with_colorbar(
            "Turbidity Index (NDTI) - Blue = Clear Water | Brown = High Turbidity",
            colormap,
        ),
    );

    let layout = config.output_path(&cfg.layout);
    let manifest = figure.save(&layout)?;
    log::info!("   Layout saved to: {}", layout.display());

    log::info!("3. Exporting GeoTIFF...");
    let raster = config.output_path(&cfg.raster);
    write_f32(
        &result.masked,
        bands.profile(),
        &raster,
        &ExportOptions::float("NDTI (water only)"),
    )?;
    log::info!("   GeoTIFF saved to: {}", raster.display());

    Ok(RunOutcome::Completed(RunReport {
        workflow: "turbidity",
        layout,
        manifest,
        raster,
        extent,
        statistics: Some(stats),
        classes: None,
    }))
}
