// src/utils/nodata.rs
use rayon::prelude::*;

/// Replace every NaN with `sentinel`.
pub fn nan_to_sentinel(data: &[f32], sentinel: f32) -> Vec<f32> {
    data.par_iter()
        .map(|&value| if value.is_nan() { sentinel } else { value })
        .collect()
}

/// Replace every `sentinel` with NaN. Inverse of [`nan_to_sentinel`] for data
/// that never contained the sentinel itself.
pub fn sentinel_to_nan(data: &[f32], sentinel: f32) -> Vec<f32> {
    data.par_iter()
        .map(|&value| if value == sentinel { f32::NAN } else { value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_becomes_sentinel() {
        let out = nan_to_sentinel(&[0.5, f32::NAN, -0.25], -9999.0);
        assert_eq!(out, vec![0.5, -9999.0, -0.25]);
    }

    #[test]
    fn sentinel_becomes_nan() {
        let out = sentinel_to_nan(&[-9999.0, 0.1], -9999.0);
        assert!(out[0].is_nan());
        assert_eq!(out[1], 0.1);
    }
}
