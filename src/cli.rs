use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "coastal-index")]
#[command(version)]
#[command(about = "Masked spectral index maps for coastal Sentinel-2 scenes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON parameter file; unset keys keep their defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the input rasters
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory for layouts and GeoTIFFs
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Worker threads (default: all cores)
    #[arg(short = 'j', long, global = true)]
    pub threads: Option<usize>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chlorophyll-a (NDCI) over water: potential fishing zones
    Chlorophyll {
        /// Input multi-band raster (B2, B3, B4, B5, B8), relative to --data-dir unless absolute
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// NDWI cutoff for the water mask
        #[arg(long)]
        water_threshold: Option<f32>,
    },

    /// Turbidity (NDTI) over water: sediment load
    Turbidity {
        /// Input multi-band raster (B2, B3, B4, B8), relative to --data-dir unless absolute
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// NDWI cutoff for the water mask
        #[arg(long)]
        water_threshold: Option<f32>,
    },

    /// Mangrove stability from three dates
    Mangrove {
        /// Three rasters, oldest first, relative to --data-dir unless absolute
        #[arg(short, long, num_args = 3, value_names = ["OLDEST", "MIDDLE", "LATEST"])]
        inputs: Option<Vec<PathBuf>>,

        /// NDVI cutoff for the vegetation mask
        #[arg(long)]
        vegetation_threshold: Option<f32>,
    },

    /// Run the operations listed in a JSON batch file
    Batch {
        /// Batch file path. Its "global" section is merged over
        /// --config, --data-dir and --output-dir
        #[arg(short, long)]
        file: PathBuf,
    },
}

impl Cli {
    /// Apply command-line overrides on top of a loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }

        match &self.command {
            Commands::Chlorophyll {
                input,
                water_threshold,
            } => {
                if let Some(input) = input {
                    config.chlorophyll.input = input.clone();
                }
                if let Some(t) = water_threshold {
                    config.chlorophyll.water_threshold = *t;
                }
            }
            Commands::Turbidity {
                input,
                water_threshold,
            } => {
                if let Some(input) = input {
                    config.turbidity.input = input.clone();
                }
                if let Some(t) = water_threshold {
                    config.turbidity.water_threshold = *t;
                }
            }
            Commands::Mangrove {
                inputs,
                vegetation_threshold,
            } => {
                if let Some(inputs) = inputs {
                    for (dated, path) in config.mangrove.inputs.iter_mut().zip(inputs) {
                        dated.path = path.clone();
                    }
                }
                if let Some(t) = vegetation_threshold {
                    config.mangrove.vegetation_threshold = *t;
                }
            }
            Commands::Batch { .. } => {}
        }
    }

    /// Level filter for env_logger; RUST_LOG still takes precedence.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mangrove_takes_three_inputs() {
        let cli = Cli::try_parse_from([
            "coastal-index",
            "mangrove",
            "--inputs",
            "a.tif",
            "b.tif",
            "c.tif",
            "--vegetation-threshold",
            "0.5",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.mangrove.inputs[0].path, PathBuf::from("a.tif"));
        assert_eq!(config.mangrove.inputs[2].path, PathBuf::from("c.tif"));
        assert_eq!(config.mangrove.vegetation_threshold, 0.5);

        assert!(
            Cli::try_parse_from(["coastal-index", "mangrove", "--inputs", "a.tif", "b.tif"])
                .is_err()
        );
    }

    #[test]
    fn input_resolves_under_data_dir_unless_absolute() {
        let relative =
            Cli::try_parse_from(["coastal-index", "-d", "scenes", "turbidity", "-i", "coast.tif"])
                .unwrap();
        let mut config = Config::default();
        relative.apply(&mut config);
        assert_eq!(
            config.input_path(&config.turbidity.input),
            PathBuf::from("scenes/coast.tif")
        );

        let absolute = Cli::try_parse_from([
            "coastal-index",
            "-d",
            "scenes",
            "turbidity",
            "-i",
            "/srv/coast.tif",
        ])
        .unwrap();
        let mut config = Config::default();
        absolute.apply(&mut config);
        assert_eq!(
            config.input_path(&config.turbidity.input),
            PathBuf::from("/srv/coast.tif")
        );
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "coastal-index",
            "turbidity",
            "--output-dir",
            "out",
            "-vv",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(cli.log_level(), log::LevelFilter::Trace);
    }
}
