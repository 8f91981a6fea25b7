// src/geo/extent.rs
//! Raster bounds and their geographic (EPSG:4326) re-expression for axis
//! labelling. Only the four bounding numbers are transformed; pixels are
//! never resampled.

use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use serde::Serialize;

use crate::error::Result;
use crate::io::RasterProfile;

/// Densification points used along each edge when transforming bounds.
const DENSIFY_POINTS: i32 = 21;

/// Native bounding box: `(left, bottom, right, top)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl Bounds {
    /// Bounding box of the pixel grid's four corners under the affine transform.
    pub fn from_geo_transform(gt: &[f64; 6], width: usize, height: usize) -> Self {
        let (w, h) = (width as f64, height as f64);
        let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];

        let mut bounds = Bounds {
            left: f64::INFINITY,
            bottom: f64::INFINITY,
            right: f64::NEG_INFINITY,
            top: f64::NEG_INFINITY,
        };
        for (col, row) in corners {
            let x = gt[0] + col * gt[1] + row * gt[2];
            let y = gt[3] + col * gt[4] + row * gt[5];
            bounds.left = bounds.left.min(x);
            bounds.right = bounds.right.max(x);
            bounds.bottom = bounds.bottom.min(y);
            bounds.top = bounds.top.max(y);
        }
        bounds
    }

    fn as_array(&self) -> [f64; 4] {
        [self.left, self.bottom, self.right, self.top]
    }
}

/// Display extent in degrees, ordered like an image extent:
/// `[west, east, south, north]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoExtent {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl GeoExtent {
    pub fn from_bounds(bounds: &Bounds) -> Self {
        Self {
            west: bounds.left,
            east: bounds.right,
            south: bounds.bottom,
            north: bounds.top,
        }
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}

/// Reproject the raster's bounds to EPSG:4326.
///
/// A raster without a CRS is assumed to already be geographic.
pub fn geographic_extent(profile: &RasterProfile) -> Result<GeoExtent> {
    let bounds = profile.bounds();

    if !profile.has_crs() {
        log::warn!("Raster has no CRS; using native bounds as degrees");
        return Ok(GeoExtent::from_bounds(&bounds));
    }

    let mut source = SpatialRef::from_wkt(&profile.projection)?;
    source.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
    let mut target = SpatialRef::from_epsg(4326)?;
    target.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

    let transform = CoordTransform::new(&source, &target)?;
    let [west, south, east, north] =
        transform.transform_bounds(&bounds.as_array(), DENSIFY_POINTS)?;

    let extent = GeoExtent {
        west,
        east,
        south,
        north,
    };
    log::debug!("Native bounds {:?} -> geographic {:?}", bounds, extent);
    Ok(extent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bounds_north_up() {
        let gt = [500000.0, 10.0, 0.0, 9000000.0, 0.0, -10.0];
        let b = Bounds::from_geo_transform(&gt, 200, 100);
        assert_relative_eq!(b.left, 500000.0);
        assert_relative_eq!(b.right, 502000.0);
        assert_relative_eq!(b.top, 9000000.0);
        assert_relative_eq!(b.bottom, 8999000.0);
    }

    #[test]
    fn bounds_south_up_is_normalized() {
        let gt = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let b = Bounds::from_geo_transform(&gt, 4, 3);
        assert_relative_eq!(b.bottom, 0.0);
        assert_relative_eq!(b.top, 3.0);
    }

    #[test]
    fn extent_without_crs_keeps_bounds() {
        let profile = RasterProfile {
            projection: String::new(),
            geo_transform: [110.0, 0.01, 0.0, -6.0, 0.0, -0.01],
            width: 100,
            height: 50,
        };
        let extent = geographic_extent(&profile).unwrap();
        assert_relative_eq!(extent.west, 110.0);
        assert_relative_eq!(extent.east, 111.0);
        assert_relative_eq!(extent.north, -6.0);
        assert_relative_eq!(extent.south, -6.5);
    }
}
