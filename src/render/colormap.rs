// src/render/colormap.rs
//! Continuous colour ramps for index panels.

use serde::Serialize;

#[derive(Debug, Clone, Copy)]
struct ColorStop {
    t: f64,
    color: [u8; 3],
}

const fn stop(t: f64, r: u8, g: u8, b: u8) -> ColorStop {
    ColorStop {
        t,
        color: [r, g, b],
    }
}

// Perceptually uniform purple -> teal -> yellow.
const VIRIDIS_STOPS: &[ColorStop] = &[
    stop(0.00, 68, 1, 84),
    stop(0.25, 59, 82, 139),
    stop(0.50, 33, 145, 140),
    stop(0.75, 94, 201, 98),
    stop(1.00, 253, 231, 37),
];

// Reversed earth ramp: white and sand at the low end, deep blue at the high end.
const EARTH_REVERSED_STOPS: &[ColorStop] = &[
    stop(0.00, 253, 250, 250),
    stop(0.20, 185, 160, 120),
    stop(0.40, 160, 175, 95),
    stop(0.60, 75, 145, 95),
    stop(0.80, 40, 100, 140),
    stop(1.00, 0, 0, 60),
];

// Diverging red -> white -> blue.
const RED_BLUE_STOPS: &[ColorStop] = &[
    stop(0.00, 103, 0, 31),
    stop(0.25, 214, 96, 77),
    stop(0.50, 247, 247, 247),
    stop(0.75, 67, 147, 195),
    stop(1.00, 5, 48, 97),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorScheme {
    /// Chlorophyll (NDCI)
    Viridis,
    /// Turbidity (NDTI)
    EarthReversed,
    /// Water (NDWI)
    RedBlue,
}

impl ColorScheme {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Viridis => "viridis",
            Self::EarthReversed => "gist_earth_r",
            Self::RedBlue => "RdBu",
        }
    }

    fn stops(&self) -> &'static [ColorStop] {
        match self {
            Self::Viridis => VIRIDIS_STOPS,
            Self::EarthReversed => EARTH_REVERSED_STOPS,
            Self::RedBlue => RED_BLUE_STOPS,
        }
    }

    /// Colour at normalized position `t`, clamped to [0, 1].
    pub fn evaluate(&self, t: f64) -> [u8; 3] {
        let stops = self.stops();
        let last = stops[stops.len() - 1];
        if t <= 0.0 {
            return stops[0].color;
        }
        if t >= 1.0 {
            return last.color;
        }
        for pair in stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t <= hi.t {
                let ratio = (t - lo.t) / (hi.t - lo.t);
                return lerp_color(lo.color, hi.color, ratio);
            }
        }
        last.color
    }
}

fn lerp_color(a: [u8; 3], b: [u8; 3], t: f64) -> [u8; 3] {
    let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    [lerp(a[0], b[0]), lerp(a[1], b[1]), lerp(a[2], b[2])]
}

/// A scheme bound to a value range, with a colour for NaN.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Colormap {
    pub scheme: ColorScheme,
    pub vmin: f32,
    pub vmax: f32,
    pub bad: [u8; 3],
}

impl Colormap {
    pub fn new(scheme: ColorScheme, vmin: f32, vmax: f32) -> Self {
        Self {
            scheme,
            vmin,
            vmax,
            bad: [0, 0, 0],
        }
    }

    pub fn with_bad(mut self, bad: [u8; 3]) -> Self {
        self.bad = bad;
        self
    }

    pub fn map(&self, value: f32) -> [u8; 3] {
        if !value.is_finite() {
            return self.bad;
        }
        let range = (self.vmax - self.vmin) as f64;
        let t = if range.abs() > f64::EPSILON {
            (value - self.vmin) as f64 / range
        } else {
            0.5
        };
        self.scheme.evaluate(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_and_clamping() {
        let cmap = Colormap::new(ColorScheme::Viridis, -0.05, 0.15);
        assert_eq!(cmap.map(-0.05), [68, 1, 84]);
        assert_eq!(cmap.map(0.15), [253, 231, 37]);
        assert_eq!(cmap.map(-1.0), [68, 1, 84]);
        assert_eq!(cmap.map(1.0), [253, 231, 37]);
    }

    #[test]
    fn nan_uses_bad_colour() {
        let cmap = Colormap::new(ColorScheme::RedBlue, -0.5, 0.5).with_bad([255, 255, 255]);
        assert_eq!(cmap.map(f32::NAN), [255, 255, 255]);
    }

    #[test]
    fn diverging_midpoint_is_white() {
        assert_eq!(ColorScheme::RedBlue.evaluate(0.5), [247, 247, 247]);
    }
}
