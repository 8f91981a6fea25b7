// src/geo/ticks.rs
use serde::Serialize;

use super::GeoExtent;

const TICK_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

/// Tick positions for both map axes, inset from the edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTicks {
    pub x: Vec<Tick>,
    pub y: Vec<Tick>,
}

impl AxisTicks {
    /// Four evenly spaced ticks per axis, each axis padded by
    /// `pad_fraction` of its span on both sides.
    pub fn for_extent(extent: &GeoExtent, pad_fraction: f64) -> Self {
        Self {
            x: ticks(extent.west, extent.east, pad_fraction),
            y: ticks(extent.south, extent.north, pad_fraction),
        }
    }
}

pub fn ticks(min: f64, max: f64, pad_fraction: f64) -> Vec<Tick> {
    let pad = (max - min) * pad_fraction;
    linspace(min + pad, max - pad, TICK_COUNT)
        .into_iter()
        .map(|value| Tick {
            value,
            label: format_dm(value),
        })
        .collect()
}

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Degree-minute label, degrees truncated toward zero.
///
/// The sign lives on the degree part only, so values in (-1, 0) render
/// as `0°MM'`.
pub fn format_dm(value: f64) -> String {
    let degrees = value.trunc();
    let minutes = ((value - degrees).abs() * 60.0).trunc();
    format!("{}°{:02}'", degrees as i64, minutes as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dm_positive() {
        assert_eq!(format_dm(110.5), "110°30'");
        assert_eq!(format_dm(3.25), "3°15'");
    }

    #[test]
    fn dm_negative() {
        assert_eq!(format_dm(-6.25), "-6°15'");
        assert_eq!(format_dm(-0.5), "0°30'");
    }

    #[test]
    fn ticks_are_padded_and_even() {
        let t = ticks(0.0, 10.0, 0.10);
        let values: Vec<f64> = t.iter().map(|t| t.value).collect();
        assert_eq!(values.len(), 4);
        assert_relative_eq!(values[0], 1.0);
        assert_relative_eq!(values[1], 11.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(values[3], 9.0);
    }

    #[test]
    fn extent_ticks_use_both_axes() {
        let extent = GeoExtent {
            west: 100.0,
            east: 110.0,
            south: -10.0,
            north: 0.0,
        };
        let ticks = AxisTicks::for_extent(&extent, 0.15);
        assert_relative_eq!(ticks.x[0].value, 101.5);
        assert_relative_eq!(ticks.y[3].value, -1.5);
        assert_eq!(ticks.x[0].label, "101°30'");
        assert_eq!(ticks.y[3].label, "-1°30'");
    }
}
