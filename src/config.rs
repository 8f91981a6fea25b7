// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level parameters. Every field has a default, so an empty JSON
/// object is a valid config.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub chlorophyll: ChlorophyllConfig,
    pub turbidity: TurbidityConfig,
    pub mangrove: MangroveConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            chlorophyll: ChlorophyllConfig::default(),
            turbidity: TurbidityConfig::default(),
            mangrove: MangroveConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.chlorophyll.validate()?;
        self.turbidity.validate()?;
        self.mangrove.validate()
    }

    /// Input paths are relative to `data_dir` unless absolute. This applies
    /// to paths given on the command line too, not just those in the file.
    pub fn input_path(&self, file: &Path) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Output paths are relative to `output_dir` unless absolute.
    pub fn output_path(&self, file: &Path) -> PathBuf {
        self.output_dir.join(file)
    }
}

/// Value range mapped onto a colour ramp.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct DisplayRange {
    pub min: f32,
    pub max: f32,
}

impl DisplayRange {
    fn validate(&self, what: &str) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.min < self.max) {
            return Err(Error::Config(format!(
                "{what}: display range must satisfy min < max, got {}..{}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

fn check_bands(what: &str, bands: &[usize]) -> Result<()> {
    if bands.iter().any(|&b| b == 0) {
        return Err(Error::Config(format!("{what}: band numbers start at 1")));
    }
    Ok(())
}

fn check_positive(what: &str, value: f32) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(Error::Config(format!("{what} must be positive, got {value}")));
    }
    Ok(())
}

fn check_fraction(what: &str, value: f64) -> Result<()> {
    if !(0.0..0.5).contains(&value) {
        return Err(Error::Config(format!("{what} must be in [0, 0.5), got {value}")));
    }
    Ok(())
}

/// Band layout B2, B3, B4, B5, B8 stacked as 1, 2, 3, 5, 7.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ChlorophyllBands {
    pub blue: usize,
    pub green: usize,
    pub red: usize,
    pub red_edge: usize,
    pub nir: usize,
}

impl Default for ChlorophyllBands {
    fn default() -> Self {
        Self {
            blue: 1,
            green: 2,
            red: 3,
            red_edge: 5,
            nir: 7,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChlorophyllConfig {
    pub input: PathBuf,
    pub layout: PathBuf,
    pub raster: PathBuf,
    pub bands: ChlorophyllBands,
    pub water_threshold: f32,
    pub rgb_scale: f32,
    pub display: DisplayRange,
    pub tick_pad: f64,
}

impl Default for ChlorophyllConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("sentinel2_2025.tif"),
            layout: PathBuf::from("Fishing_Zone_Layout.png"),
            raster: PathBuf::from("Chlorophyll_Potential_Map.tif"),
            bands: ChlorophyllBands::default(),
            water_threshold: 0.0,
            rgb_scale: 2500.0,
            display: DisplayRange {
                min: -0.05,
                max: 0.15,
            },
            tick_pad: 0.10,
        }
    }
}

impl ChlorophyllConfig {
    fn validate(&self) -> Result<()> {
        let b = &self.bands;
        check_bands("chlorophyll", &[b.blue, b.green, b.red, b.red_edge, b.nir])?;
        check_positive("chlorophyll.rgb_scale", self.rgb_scale)?;
        check_fraction("chlorophyll.tick_pad", self.tick_pad)?;
        self.display.validate("chlorophyll")
    }
}

/// Four-band stack: blue, green, red, NIR.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct FourBands {
    pub blue: usize,
    pub green: usize,
    pub red: usize,
    pub nir: usize,
}

impl Default for FourBands {
    fn default() -> Self {
        Self {
            blue: 1,
            green: 2,
            red: 3,
            nir: 4,
        }
    }
}

impl FourBands {
    pub fn as_array(&self) -> [usize; 4] {
        [self.blue, self.green, self.red, self.nir]
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TurbidityConfig {
    pub input: PathBuf,
    pub layout: PathBuf,
    pub raster: PathBuf,
    pub bands: FourBands,
    pub water_threshold: f32,
    pub rgb_scale: f32,
    pub display: DisplayRange,
    pub tick_pad: f64,
}

impl Default for TurbidityConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("sentinel2_2025.tif"),
            layout: PathBuf::from("Turbidity_Analysis_Layout.png"),
            raster: PathBuf::from("Turbidity_Map_Result.tif"),
            bands: FourBands::default(),
            water_threshold: 0.0,
            rgb_scale: 3000.0,
            display: DisplayRange {
                min: -0.15,
                max: 0.15,
            },
            tick_pad: 0.10,
        }
    }
}

impl TurbidityConfig {
    fn validate(&self) -> Result<()> {
        check_bands("turbidity", &self.bands.as_array())?;
        check_positive("turbidity.rgb_scale", self.rgb_scale)?;
        check_fraction("turbidity.tick_pad", self.tick_pad)?;
        self.display.validate("turbidity")
    }
}

/// One acquisition date of the mangrove series.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DatedInput {
    pub label: String,
    pub path: PathBuf,
}

impl DatedInput {
    fn new(label: &str, path: &str) -> Self {
        Self {
            label: label.to_string(),
            path: PathBuf::from(path),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MangroveConfig {
    /// Oldest to most recent. The last date supplies the profile and display layers.
    pub inputs: [DatedInput; 3],
    pub layout: PathBuf,
    pub raster: PathBuf,
    pub bands: FourBands,
    pub vegetation_threshold: f32,
    pub rgb_scale: f32,
    pub ndwi_display: DisplayRange,
    pub tick_pad: f64,
}

impl Default for MangroveConfig {
    fn default() -> Self {
        Self {
            inputs: [
                DatedInput::new("2019", "2019_S2.tif"),
                DatedInput::new("2022", "2022_S2.tif"),
                DatedInput::new("2024", "2024_S2.tif"),
            ],
            layout: PathBuf::from("Mangrove_Analysis_Layout.png"),
            raster: PathBuf::from("Mangrove_Stability_Map.tif"),
            bands: FourBands::default(),
            vegetation_threshold: 0.4,
            rgb_scale: 3000.0,
            ndwi_display: DisplayRange {
                min: -0.5,
                max: 0.5,
            },
            tick_pad: 0.15,
        }
    }
}

impl MangroveConfig {
    fn validate(&self) -> Result<()> {
        check_bands("mangrove", &self.bands.as_array())?;
        check_positive("mangrove.rgb_scale", self.rgb_scale)?;
        check_fraction("mangrove.tick_pad", self.tick_pad)?;
        self.ndwi_display.validate("mangrove")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.chlorophyll.bands.red_edge, 5);
        assert_eq!(config.chlorophyll.bands.nir, 7);
        assert_eq!(config.turbidity.bands.nir, 4);
        assert_eq!(config.mangrove.vegetation_threshold, 0.4);
        assert_eq!(config.mangrove.inputs[2].label, "2024");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"turbidity": {"bands": {"nir": 8}, "rgb_scale": 10000}}"#)
                .unwrap();
        assert_eq!(config.turbidity.bands.nir, 8);
        assert_eq!(config.turbidity.bands.green, 2);
        assert_eq!(config.turbidity.rgb_scale, 10000.0);
        assert_eq!(config.turbidity.layout, PathBuf::from("Turbidity_Analysis_Layout.png"));
    }

    #[test]
    fn rejects_zero_band_and_bad_range() {
        let mut config = Config::default();
        config.turbidity.bands.red = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.chlorophyll.display = DisplayRange { min: 0.2, max: 0.1 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"data_dir": "/srv/scenes", "mangrove": {"vegetation_threshold": 0.5}}"#)
            .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.mangrove.vegetation_threshold, 0.5);
        assert_eq!(
            config.input_path(Path::new("x.tif")),
            PathBuf::from("/srv/scenes/x.tif")
        );
    }

    #[test]
    fn absolute_paths_bypass_directories() {
        let config = Config::default();
        assert_eq!(
            config.input_path(Path::new("/mnt/s2/scene.tif")),
            PathBuf::from("/mnt/s2/scene.tif")
        );
        assert_eq!(
            config.input_path(Path::new("scene.tif")),
            PathBuf::from("data/scene.tif")
        );
        assert_eq!(
            config.output_path(Path::new("/tmp/map.tif")),
            PathBuf::from("/tmp/map.tif")
        );
    }
}
