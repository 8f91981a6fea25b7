// src/processing/temporal.rs
//! Three-date presence aggregation for vegetation masks.

use gdal::raster::Buffer;
use itertools::izip;
use serde::Serialize;

use crate::error::{ensure_shape, Result};
use crate::processing::mask::Mask;

/// Persistence score per pixel, in `0..=3`.
pub type StabilityScore = Buffer<i32>;

/// `(first + middle + last) * last`: how many dates saw the pixel, zeroed
/// wherever the most recent date does not.
pub fn stability_score(first: &Mask, middle: &Mask, last: &Mask) -> Result<StabilityScore> {
    ensure_shape(last.shape(), first.shape())?;
    ensure_shape(last.shape(), middle.shape())?;

    let data = izip!(first.data(), middle.data(), last.data())
        .map(|(&a, &b, &c)| (a as i32 + b as i32 + c as i32) * c as i32)
        .collect();
    Ok(Buffer::new(last.shape(), data))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StabilityClass {
    Absent,
    New,
    Intermediate,
    Stable,
}

impl StabilityClass {
    pub const ALL: [StabilityClass; 4] = [
        StabilityClass::Absent,
        StabilityClass::New,
        StabilityClass::Intermediate,
        StabilityClass::Stable,
    ];

    pub fn from_score(score: i32) -> Option<Self> {
        match score {
            0 => Some(Self::Absent),
            1 => Some(Self::New),
            2 => Some(Self::Intermediate),
            3 => Some(Self::Stable),
            _ => None,
        }
    }

    pub fn score(&self) -> i32 {
        match self {
            Self::Absent => 0,
            Self::New => 1,
            Self::Intermediate => 2,
            Self::Stable => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Absent => "No Mangrove",
            Self::New => "New Growth (<2 Years)",
            Self::Intermediate => "Intermediate (~3 Years)",
            Self::Stable => "Stable (>5 Years)",
        }
    }

    /// Display colour: white, light green, green, dark green.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Absent => [0xff, 0xff, 0xff],
            Self::New => [0x8a, 0xf2, 0x57],
            Self::Intermediate => [0x08, 0xb8, 0x25],
            Self::Stable => [0x00, 0x4f, 0x0d],
        }
    }
}

/// Pixel count per class, ordered Absent..Stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClassHistogram {
    pub absent: usize,
    pub new: usize,
    pub intermediate: usize,
    pub stable: usize,
}

impl ClassHistogram {
    pub fn count(&self, class: StabilityClass) -> usize {
        match class {
            StabilityClass::Absent => self.absent,
            StabilityClass::New => self.new,
            StabilityClass::Intermediate => self.intermediate,
            StabilityClass::Stable => self.stable,
        }
    }
}

pub fn class_histogram(score: &StabilityScore) -> ClassHistogram {
    let mut histogram = ClassHistogram::default();
    for &value in score.data() {
        match StabilityClass::from_score(value) {
            Some(StabilityClass::Absent) => histogram.absent += 1,
            Some(StabilityClass::New) => histogram.new += 1,
            Some(StabilityClass::Intermediate) => histogram.intermediate += 1,
            Some(StabilityClass::Stable) => histogram.stable += 1,
            None => log::warn!("Stability score {} outside 0..=3", value),
        }
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(values: &[u8]) -> Mask {
        Buffer::new((values.len(), 1), values.to_vec())
    }

    #[test]
    fn score_counts_dates_and_requires_latest() {
        let first = mask(&[1, 1, 0, 1, 0, 1, 0, 0]);
        let middle = mask(&[1, 0, 1, 1, 0, 0, 1, 0]);
        let last = mask(&[1, 1, 1, 0, 1, 0, 0, 0]);
        let score = stability_score(&first, &middle, &last).unwrap();
        assert_eq!(score.data(), &[3, 2, 2, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn every_combination_is_in_range() {
        for bits in 0u8..8 {
            let (a, b, c) = (bits & 1, (bits >> 1) & 1, (bits >> 2) & 1);
            let score = stability_score(&mask(&[a]), &mask(&[b]), &mask(&[c])).unwrap();
            let value = score.data()[0];
            assert!((0..=3).contains(&value));
            if c == 0 {
                assert_eq!(value, 0);
            }
        }
    }

    #[test]
    fn histogram_and_classes() {
        let score = Buffer::new((5, 1), vec![0, 1, 2, 3, 3]);
        let histogram = class_histogram(&score);
        assert_eq!(histogram.count(StabilityClass::Absent), 1);
        assert_eq!(histogram.count(StabilityClass::Stable), 2);
        assert_eq!(StabilityClass::from_score(2), Some(StabilityClass::Intermediate));
        assert_eq!(StabilityClass::from_score(4), None);
        assert_eq!(StabilityClass::Stable.color(), [0x00, 0x4f, 0x0d]);
    }
}
