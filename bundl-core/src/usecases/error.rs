use bundl_entities::{geo::GeoCoordinateError, geohash::GeohashParseError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Latitude must be between -90 and 90, got {0}")]
    Latitude(f64),
    #[error("Longitude must be between -180 and 180, got {0}")]
    Longitude(f64),
    #[error("Invalid coordinate: {0}")]
    Coordinate(String),
    #[error(
        "Precision must be between 1 and {}",
        crate::util::geohash::MAX_PRECISION
    )]
    Precision,
    #[error("Invalid geohash: {0}")]
    Geohash(#[from] GeohashParseError),
    #[error("Radius must be a finite non-negative number of meters, got {0}")]
    Radius(f64),
    #[error("Movement threshold must be a finite non-negative number of meters, got {0}")]
    MovementThreshold(f64),
    #[error("At least one precision level is required")]
    EmptyPrecisionLevels,
}

impl From<GeoCoordinateError> for Error {
    fn from(err: GeoCoordinateError) -> Self {
        match err {
            GeoCoordinateError::Latitude(lat) => Self::Latitude(lat),
            GeoCoordinateError::Longitude(lng) => Self::Longitude(lng),
            GeoCoordinateError::Parse(msg) => Self::Coordinate(msg),
        }
    }
}
