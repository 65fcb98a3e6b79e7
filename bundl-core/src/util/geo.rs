use bundl_entities::geo::{Distance, GeoCoordinate};

pub const MEAN_EARTH_RADIUS: Distance = Distance::from_meters(6_371_000.0);

/// Calculate the great-circle distance on the surface
/// of the earth using the Haversine formula.
/// Reference: https://en.wikipedia.org/wiki/Haversine_formula
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();

    let dlat_sin = (dlat / 2.0).sin();
    let dlng_sin = (dlng / 2.0).sin();

    let a = dlat_sin * dlat_sin
        + lat1.to_radians().cos() * lat2.to_radians().cos() * dlng_sin * dlng_sin;
    // Rounding may push `a` slightly above 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    MEAN_EARTH_RADIUS.to_meters() * c
}

pub fn distance(p1: GeoCoordinate, p2: GeoCoordinate) -> Distance {
    let (lat1, lng1) = p1.to_lat_lng_deg();
    let (lat2, lng2) = p2.to_lat_lng_deg();
    Distance::from_meters(distance_meters(lat1, lng1, lat2, lng2))
}
