// src/workflows/chlorophyll.rs
//! Potential fishing zones: chlorophyll-a (NDCI) over water (NDWI > 0).

use super::{first_missing, prepare_output_dir, RunOutcome, RunReport};
use crate::config::Config;
use crate::error::Result;
use crate::geo::{geographic_extent, AxisTicks};
use crate::io::{read_bands, write_f32, ExportOptions};
use crate::processing::{masked_statistics, MaskedIndexPipeline, NormalizedDifference};
use crate::render::{colorize, composite, ColorScheme, Colormap, Figure, Panel};

pub fn run(config: &Config) -> Result<RunOutcome> {
    let cfg = &config.chlorophyll;
    let input = config.input_path(&cfg.input);
    if let Some(missing) = first_missing([input.as_path()]) {
        return Ok(RunOutcome::MissingInput(missing));
    }
    prepare_output_dir(config)?;

    log::info!("1. Reading Data & Preparing Validation...");
    let b = cfg.bands;
    let bands = read_bands(&input, &[b.blue, b.green, b.red, b.red_edge, b.nir])?;

    let pipeline = MaskedIndexPipeline::new(
        NormalizedDifference::ndwi(b.green, b.nir),
        NormalizedDifference::ndci(b.red_edge, b.red),
        cfg.water_threshold,
    );
    let result = pipeline.run(&bands)?;

    let stats = masked_statistics(&result.index, &result.mask)?;
    log::info!("[STATISTICAL CHECK]");
    match (stats.mean, stats.max) {
        (Some(mean), Some(max)) => {
            log::info!("Mean NDCI : {:.4} (Expected: -0.1 to 0.1 for coastal)", mean);
            log::info!("Max NDCI  : {:.4}", max);
        }
        _ => log::warn!("No valid water pixels; NDCI statistics unavailable"),
    }

    let true_color = composite(
        bands.band(b.red)?,
        bands.band(b.green)?,
        bands.band(b.blue)?,
        cfg.rgb_scale,
    )?;
    let extent = geographic_extent(bands.profile())?;

    log::info!("2. Generating Layout...");
    let colormap = Colormap::new(ColorScheme::Viridis, cfg.display.min, cfg.display.max);
    let mut figure = Figure::new(
        "Identification of Potential Fishing Zones",
        2,
        extent,
        AxisTicks::for_extent(&extent, cfg.tick_pad),
    );
    figure.subtitle = Some("Chlorophyll-a Distribution & Validation Analysis".to_string());
    figure.footer = Some(
        "Method: Sentinel-2 Red-Edge Analysis (NDCI) | Validation: Visual & Statistical"
            .to_string(),
    );
    figure.notes = vec![
        "Validation Logic:".to_string(),
        "1. Cloud Artifacts: If Panel A is White but Panel B is Yellow -> FALSE POSITIVE (Ignore).".to_string(),
        "2. Algae Presence: High NDCI (Yellow) should align with greenish tints in Panel A.".to_string(),
        match stats.mean {
            Some(mean) => format!("3. Statistical Mean: {:.3}", mean),
            None => "3. Statistical Mean: n/a".to_string(),
        },
    ];
    figure.push(Panel::new("A. Reference: True Color (Cloud Check)", true_color));
    figure.push(
        Panel::new(
            "B. Analysis: Chlorophyll-a (NDCI)",
            colorize(&result.masked, &colormap),
        )
        .with_colorbar("Chlorophyll Index (NDCI)", colormap),
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
        &ExportOptions::float("NDCI (water only)"),
    )?;
    log::info!("   GeoTIFF saved to: {}", raster.display());

    Ok(RunOutcome::Completed(RunReport {
        workflow: "chlorophyll",
        layout,
        manifest,
        raster,
        extent,
        statistics: Some(stats),
        classes: None,
    }))
}
