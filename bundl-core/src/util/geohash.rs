//! Geohash encoding by interval halving.
//!
//! Bits alternate between longitude (first) and latitude.
//! Each group of 5 bits is one character of [`BASE32_ALPHABET`].

use crate::usecases::Error;
use bundl_entities::{
    geo::{
        is_valid_lat_deg, is_valid_lng_deg, GeoCoordinate, LAT_DEG_MAX, LAT_DEG_MIN, LNG_DEG_MAX,
        LNG_DEG_MIN,
    },
    geohash::{base32_index, Geohash, BASE32_ALPHABET},
};

const BITS_PER_CHAR: u8 = 5;

type Result<T> = std::result::Result<T, Error>;

/// Approximate cell dimensions in degrees for a precision level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSize {
    pub lat_deg: f64,
    pub lng_deg: f64,
}

impl GridSize {
    const fn new(lat_deg: f64, lng_deg: f64) -> Self {
        Self { lat_deg, lng_deg }
    }
}

pub const MAX_TABULATED_PRECISION: usize = 9;

/// Longer geohashes exceed the resolution of `f64` coordinates.
pub const MAX_PRECISION: usize = 22;

const FALLBACK_GRID_SIZE: GridSize = GridSize::new(0.00001, 0.00001);

/// The approximate grid size for a precision level.
///
/// Returns `None` if the precision is not tabulated.
pub const fn tabulated_grid_size(precision: usize) -> Option<GridSize> {
    let size = match precision {
        1 => GridSize::new(45.0, 45.0),                             // ~5000 km
        2 => GridSize::new(11.25, 5.625),                           // ~1250 km x 625 km
        3 => GridSize::new(1.40625, 1.40625),                       // ~156 km
        4 => GridSize::new(0.3515625, 0.17578125),                  // ~39 km x 19.5 km
        5 => GridSize::new(0.0439453125, 0.0439453125),             // ~4.9 km
        6 => GridSize::new(0.010986328125, 0.0054931640625),        // ~1.2 km x 0.6 km
        7 => GridSize::new(0.001373291015625, 0.001373291015625),   // ~153 m
        8 => GridSize::new(0.000343322753906, 0.000171661376953),   // ~38 m x 19 m
        9 => GridSize::new(0.000042915344238, 0.000042915344238),   // ~4.8 m
        _ => return None,
    };
    Some(size)
}

/// The approximate grid size for a precision level.
///
/// Precision levels beyond the table use a tiny placeholder size,
/// which results in a very fine grid.
pub fn approximate_grid_size(precision: usize) -> GridSize {
    tabulated_grid_size(precision).unwrap_or(FALLBACK_GRID_SIZE)
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    min: f64,
    max: f64,
}

impl Interval {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn mid(self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Narrow to the upper (`true`) or lower (`false`) half.
    fn narrow(&mut self, upper: bool) {
        let mid = self.mid();
        if upper {
            self.min = mid;
        } else {
            self.max = mid;
        }
    }
}

/// The bounds of a decoded geohash cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl CellBounds {
    pub fn center(&self) -> GeoCoordinate {
        GeoCoordinate::from_lat_lng_deg(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    pub fn contains(&self, pos: GeoCoordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&pos.lat())
            && (self.min_lng..=self.max_lng).contains(&pos.lng())
    }
}

pub fn encode(lat: f64, lng: f64, precision: usize) -> Result<Geohash> {
    if !is_valid_lat_deg(lat) {
        return Err(Error::Latitude(lat));
    }
    if !is_valid_lng_deg(lng) {
        return Err(Error::Longitude(lng));
    }
    if !(1..=MAX_PRECISION).contains(&precision) {
        return Err(Error::Precision);
    }

    let mut lat_range = Interval::new(LAT_DEG_MIN, LAT_DEG_MAX);
    let mut lng_range = Interval::new(LNG_DEG_MIN, LNG_DEG_MAX);

    let mut hash = String::with_capacity(precision);
    let mut is_lng = true;
    let mut bit = 0;
    let mut index = 0;

    while hash.len() < precision {
        let (range, value) = if is_lng {
            (&mut lng_range, lng)
        } else {
            (&mut lat_range, lat)
        };
        let upper = value > range.mid();
        range.narrow(upper);
        index = (index << 1) | usize::from(upper);
        is_lng = !is_lng;

        bit += 1;
        if bit == BITS_PER_CHAR {
            hash.push(char::from(BASE32_ALPHABET[index]));
            bit = 0;
            index = 0;
        }
    }

    Ok(Geohash::new_unchecked(hash))
}

pub fn encode_coordinate(pos: GeoCoordinate, precision: usize) -> Result<Geohash> {
    encode(pos.lat(), pos.lng(), precision)
}

pub fn decode_bounds(hash: &Geohash) -> CellBounds {
    let mut lat_range = Interval::new(LAT_DEG_MIN, LAT_DEG_MAX);
    let mut lng_range = Interval::new(LNG_DEG_MIN, LNG_DEG_MAX);
    let mut is_lng = true;

    for c in hash.as_str().chars() {
        let Some(index) = base32_index(c) else {
            continue;
        };
        for shift in (0..BITS_PER_CHAR).rev() {
            let upper = (index >> shift) & 1 == 1;
            if is_lng {
                lng_range.narrow(upper);
            } else {
                lat_range.narrow(upper);
            }
            is_lng = !is_lng;
        }
    }

    CellBounds {
        min_lat: lat_range.min,
        max_lat: lat_range.max,
        min_lng: lng_range.min,
        max_lng: lng_range.max,
    }
}

/// The centroid of the cell, not the originally encoded position.
pub fn decode_geohash(hash: &Geohash) -> GeoCoordinate {
    decode_bounds(hash).center()
}

pub fn decode(hash: &str) -> Result<GeoCoordinate> {
    let hash: Geohash = hash.parse()?;
    Ok(decode_geohash(&hash))
}

/// The surrounding cells in the order N, NE, E, SE, S, SW, W, NW.
///
/// Neighbors outside of the valid coordinate range are omitted.
pub fn neighbors(hash: &Geohash) -> Vec<Geohash> {
    let center = decode_geohash(hash);
    let precision = hash.precision();
    let GridSize { lat_deg, lng_deg } = approximate_grid_size(precision);
    let offsets = [
        (lat_deg, 0.0),
        (lat_deg, lng_deg),
        (0.0, lng_deg),
        (-lat_deg, lng_deg),
        (-lat_deg, 0.0),
        (-lat_deg, -lng_deg),
        (0.0, -lng_deg),
        (lat_deg, -lng_deg),
    ];
    offsets
        .into_iter()
        .filter_map(|(lat_offset, lng_offset)| {
            encode(
                center.lat() + lat_offset,
                center.lng() + lng_offset,
                precision,
            )
            .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::util::geo::distance_meters;
    use rand::prelude::*;

    fn gh(s: &str) -> Geohash {
        s.parse().unwrap()
    }

    #[test]
    fn encode_known_positions() {
        assert_eq!(encode(12.9716, 77.5946, 7).unwrap(), gh("tdr1v9q"));
        assert_eq!(encode(57.64911, 10.40744, 11).unwrap(), gh("u4pruydqqvj"));
        assert_eq!(encode(0.0, 0.0, 5).unwrap(), gh("7zzzz"));
        assert_eq!(encode(90.0, 180.0, 5).unwrap(), gh("zzzzz"));
        assert_eq!(encode(-90.0, -180.0, 5).unwrap(), gh("00000"));
    }

    #[test]
    fn encode_is_deterministic() {
        let mut rng = rand::thread_rng();
        for _ in 0..1_000 {
            let lat = rng.gen_range(-90.0..=90.0);
            let lng = rng.gen_range(-180.0..=180.0);
            let precision = rng.gen_range(1..=12);
            assert_eq!(
                encode(lat, lng, precision).unwrap(),
                encode(lat, lng, precision).unwrap()
            );
        }
    }

    #[test]
    fn encode_alphabet_and_length() {
        for precision in 1..=12 {
            let hash = encode(12.9716, 77.5946, precision).unwrap();
            assert_eq!(hash.precision(), precision);
            assert!(hash
                .as_str()
                .bytes()
                .all(|b| BASE32_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn encode_with_invalid_arguments() {
        assert_eq!(encode(90.1, 0.0, 5), Err(Error::Latitude(90.1)));
        assert_eq!(encode(-90.1, 0.0, 5), Err(Error::Latitude(-90.1)));
        assert_eq!(encode(0.0, 180.1, 5), Err(Error::Longitude(180.1)));
        assert_eq!(encode(0.0, -180.1, 5), Err(Error::Longitude(-180.1)));
        assert_eq!(encode(0.0, 0.0, 0), Err(Error::Precision));
        assert_eq!(encode(0.0, 0.0, MAX_PRECISION + 1), Err(Error::Precision));
        assert_eq!(encode(0.0, 0.0, usize::MAX), Err(Error::Precision));
        assert_eq!(encode(0.0, 0.0, MAX_PRECISION).unwrap().precision(), MAX_PRECISION);
        assert!(encode(f64::NAN, 0.0, 5).is_err());
    }

    #[test]
    fn decode_with_invalid_arguments() {
        assert!(matches!(decode(""), Err(Error::Geohash(_))));
        assert!(matches!(decode("tdr1a"), Err(Error::Geohash(_))));
        assert!(matches!(decode("TDR1"), Err(Error::Geohash(_))));
    }

    #[test]
    fn decode_returns_the_cell_centroid() {
        let pos = decode("tdr1v9q").unwrap();
        let bounds = decode_bounds(&gh("tdr1v9q"));
        assert!(bounds.contains(GeoCoordinate::from_lat_lng_deg(12.9716, 77.5946)));
        assert_eq!(pos, bounds.center());
        assert_eq!(pos.to_lat_lng_deg(), (12.971420288085938, 77.59437561035156));
    }

    #[test]
    fn decode_near_the_encoded_position() {
        let (lat, lng) = (12.9716, 77.5946);
        let pos = decode(encode(lat, lng, 7).unwrap().as_str()).unwrap();
        assert!(distance_meters(lat, lng, pos.lat(), pos.lng()) < 80.0);

        let pos = decode(encode(lat, lng, 6).unwrap().as_str()).unwrap();
        assert!((pos.lat() - lat).abs() < 0.01);
        assert!((pos.lng() - lng).abs() < 0.01);
    }

    #[test]
    fn reencoding_the_centroid_is_idempotent() {
        let mut rng = rand::thread_rng();
        for _ in 0..1_000 {
            let precision = rng.gen_range(1..=12);
            let hash: String = (0..precision)
                .map(|_| char::from(BASE32_ALPHABET[rng.gen_range(0..32)]))
                .collect();
            let pos = decode(&hash).unwrap();
            assert_eq!(
                encode(pos.lat(), pos.lng(), precision).unwrap().as_str(),
                hash
            );
        }
    }

    #[test]
    fn decode_boundary_positions() {
        for (lat, lng) in [(90.0, 180.0), (-90.0, -180.0), (0.0, 0.0)] {
            let hash = encode(lat, lng, 5).unwrap();
            let bounds = decode_bounds(&hash);
            assert!(bounds.contains(GeoCoordinate::from_lat_lng_deg(lat, lng)));
        }
    }

    #[test]
    fn grid_sizes() {
        assert_eq!(
            approximate_grid_size(7),
            GridSize::new(0.001373291015625, 0.001373291015625)
        );
        assert_eq!(approximate_grid_size(2), GridSize::new(11.25, 5.625));
        assert!(tabulated_grid_size(0).is_none());
        assert!(tabulated_grid_size(10).is_none());
        assert_eq!(approximate_grid_size(10), FALLBACK_GRID_SIZE);
    }

    #[test]
    fn neighbors_of_a_cell() {
        let neighbors = neighbors(&gh("tdr1yhk"));
        assert_eq!(
            neighbors,
            ["tdr1yhs", "tdr1yht", "tdr1yhm", "tdr1yhj", "tdr1yhh", "tdr1yh5", "tdr1yh7", "tdr1yhe"]
                .into_iter()
                .map(gh)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn neighbors_have_the_same_precision() {
        let neighbors = neighbors(&gh("dr5ru"));
        assert!(!neighbors.is_empty());
        assert!(neighbors.len() <= 8);
        assert!(neighbors.iter().all(|n| n.precision() == 5));
        assert!(!neighbors.contains(&gh("dr5ru")));
    }

    #[test]
    fn neighbors_at_the_pole_are_omitted() {
        let corner = encode(90.0, 180.0, 3).unwrap();
        assert!(neighbors(&corner).len() < 8);
    }
}
