use itertools::Itertools;
use std::{fmt, str::FromStr};
use thiserror::Error;

pub const LAT_DEG_MIN: f64 = -90.0;
pub const LAT_DEG_MAX: f64 = 90.0;
pub const LNG_DEG_MIN: f64 = -180.0;
pub const LNG_DEG_MAX: f64 = 180.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoCoordinateError {
    #[error("Invalid latitude degrees: {0}")]
    Latitude(f64),
    #[error("Invalid longitude degrees: {0}")]
    Longitude(f64),
    #[error("Failed to parse coordinate: {0}")]
    Parse(String),
}

/// A geographical position in degrees.
///
/// Both components are range checked on construction,
/// i.e. a `GeoCoordinate` is always valid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoCoordinate {
    lat: f64,
    lng: f64,
}

impl GeoCoordinate {
    pub fn try_from_lat_lng_deg(lat: f64, lng: f64) -> Result<Self, GeoCoordinateError> {
        if !is_valid_lat_deg(lat) {
            return Err(GeoCoordinateError::Latitude(lat));
        }
        if !is_valid_lng_deg(lng) {
            return Err(GeoCoordinateError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Panics in debug builds if the degrees are out of range.
    pub fn from_lat_lng_deg(lat: f64, lng: f64) -> Self {
        debug_assert!(is_valid_lat_deg(lat));
        debug_assert!(is_valid_lng_deg(lng));
        Self { lat, lng }
    }

    pub const fn lat(self) -> f64 {
        self.lat
    }

    pub const fn lng(self) -> f64 {
        self.lng
    }

    pub const fn to_lat_lng_deg(self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

pub fn is_valid_lat_deg(lat: f64) -> bool {
    (LAT_DEG_MIN..=LAT_DEG_MAX).contains(&lat)
}

pub fn is_valid_lng_deg(lng: f64) -> bool {
    (LNG_DEG_MIN..=LNG_DEG_MAX).contains(&lng)
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for GeoCoordinate {
    type Err = GeoCoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((lat_str, lng_str)) = s.split(',').map(str::trim).collect_tuple() else {
            return Err(GeoCoordinateError::Parse(s.to_owned()));
        };
        match (lat_str.parse::<f64>(), lng_str.parse::<f64>()) {
            (Ok(lat), Ok(lng)) => Self::try_from_lat_lng_deg(lat, lng),
            (Err(err), _) => Err(GeoCoordinateError::Parse(format!(
                "Invalid latitude '{lat_str}': {err}"
            ))),
            (_, Err(err)) => Err(GeoCoordinateError::Parse(format!(
                "Invalid longitude '{lng_str}': {err}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Distance(pub f64);

impl Distance {
    pub const fn from_meters(meters: f64) -> Self {
        Self(meters)
    }

    pub const fn to_meters(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.1} m", self.0)
    }
}
