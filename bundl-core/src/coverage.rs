use crate::{
    usecases::Error,
    util::{
        geo::{distance_meters, MEAN_EARTH_RADIUS},
        geohash::{approximate_grid_size, encode, tabulated_grid_size},
    },
};
use bundl_entities::{
    geo::{GeoCoordinate, LAT_DEG_MAX, LAT_DEG_MIN, LNG_DEG_MAX, LNG_DEG_MIN},
    geohash::Geohash,
};
use std::{collections::HashSet, f64::consts::PI};

const LNG_DEG_SPAN: f64 = LNG_DEG_MAX - LNG_DEG_MIN;

/// All geohash cells of the given precision that
/// overlap the circle around `center`.
///
/// A grid with the approximate cell size of the precision is laid
/// over the bounding box of the circle. Each grid point within the
/// radius contributes its cell. The cell of the center itself is
/// always contained, even for a radius of 0.
pub fn coverage_geohashes(
    center: GeoCoordinate,
    radius_meters: f64,
    precision: usize,
) -> Result<HashSet<Geohash>, Error> {
    if !(radius_meters.is_finite() && radius_meters >= 0.0) {
        return Err(Error::Radius(radius_meters));
    }
    let center_hash = encode(center.lat(), center.lng(), precision)?;
    if tabulated_grid_size(precision).is_none() {
        log::warn!(
            "No grid size for geohash precision {precision}, falling back to a very fine grid"
        );
    }

    let (lat_radius, lng_radius) = radius_in_degrees(center.lat(), radius_meters);
    let grid = approximate_grid_size(precision);

    let min_lat = (center.lat() - lat_radius).max(LAT_DEG_MIN);
    let max_lat = (center.lat() + lat_radius).min(LAT_DEG_MAX);
    let min_lng = center.lng() - lng_radius;
    let max_lng = center.lng() + lng_radius;

    let mut geohashes = HashSet::new();
    for lat in grid_steps(min_lat, max_lat, grid.lat_deg) {
        for lng in grid_steps(min_lng, max_lng, grid.lng_deg) {
            if distance_meters(center.lat(), center.lng(), lat, lng) > radius_meters {
                continue;
            }
            geohashes.insert(encode(lat, wrap_lng_deg(lng), precision)?);
        }
    }
    geohashes.insert(center_hash);

    Ok(geohashes)
}

/// Flat-earth approximation of the radius in degrees.
///
/// The longitude radius is capped to the full circle
/// near the poles where the meridians converge.
fn radius_in_degrees(center_lat: f64, radius_meters: f64) -> (f64, f64) {
    let meters_per_lat_deg = MEAN_EARTH_RADIUS.to_meters() * PI / 180.0;
    let meters_per_lng_deg = meters_per_lat_deg * center_lat.to_radians().cos();
    let lat_radius = radius_meters / meters_per_lat_deg;
    let lng_radius = radius_meters / meters_per_lng_deg;
    let lng_radius = if lng_radius.is_finite() {
        lng_radius.min(LNG_DEG_SPAN / 2.0)
    } else {
        LNG_DEG_SPAN / 2.0
    };
    (lat_radius, lng_radius)
}

fn grid_steps(min: f64, max: f64, step: f64) -> impl Iterator<Item = f64> {
    debug_assert!(step > 0.0);
    (0_u32..)
        .map(move |i| min + f64::from(i) * step)
        .take_while(move |&value| value <= max)
}

fn wrap_lng_deg(lng: f64) -> f64 {
    if lng > LNG_DEG_MAX {
        lng - LNG_DEG_SPAN
    } else if lng < LNG_DEG_MIN {
        lng + LNG_DEG_SPAN
    } else {
        lng
    }
}

/// The union of the coverage of all precision levels.
pub fn multi_level_coverage_geohashes(
    center: GeoCoordinate,
    radius_meters: f64,
    precision_levels: &[usize],
) -> Result<HashSet<Geohash>, Error> {
    if precision_levels.is_empty() {
        return Err(Error::EmptyPrecisionLevels);
    }
    let mut geohashes = HashSet::new();
    for &precision in precision_levels {
        geohashes.extend(coverage_geohashes(center, radius_meters, precision)?);
    }
    Ok(geohashes)
}
