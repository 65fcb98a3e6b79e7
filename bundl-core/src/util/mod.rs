pub mod geo;
pub mod geohash;
