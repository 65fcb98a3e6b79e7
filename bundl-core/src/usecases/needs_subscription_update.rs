use super::prelude::*;
use crate::util::geo::distance;

/// Decide if a location sample requires new subscriptions.
///
/// Fallback positions never do. Otherwise the first sample does
/// and every later one only after moving at least `movement_threshold`.
pub fn needs_subscription_update(
    last_location: Option<GeoCoordinate>,
    sample: &LocationSample,
    movement_threshold: Distance,
) -> bool {
    if !sample.is_user_provided {
        return false;
    }
    let Some(last_location) = last_location else {
        return true;
    };
    distance(last_location, sample.pos) >= movement_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: Distance = Distance::from_meters(50.0);

    fn sample(lat: f64, lng: f64) -> LocationSample {
        LocationSample::user_provided(GeoCoordinate::from_lat_lng_deg(lat, lng))
    }

    #[test]
    fn first_sample() {
        assert!(needs_subscription_update(None, &sample(12.9716, 77.5946), THRESHOLD));
    }

    #[test]
    fn fallback_sample() {
        let fallback = LocationSample::fallback(GeoCoordinate::from_lat_lng_deg(12.9716, 77.5946));
        assert!(!needs_subscription_update(None, &fallback, THRESHOLD));
    }

    #[test]
    fn movement_threshold() {
        let last = Some(GeoCoordinate::from_lat_lng_deg(12.9716, 77.5946));
        // ~11 m to the north
        assert!(!needs_subscription_update(last, &sample(12.9717, 77.5946), THRESHOLD));
        // ~56 m to the north
        assert!(needs_subscription_update(last, &sample(12.9721, 77.5946), THRESHOLD));
        assert!(!needs_subscription_update(last, &sample(12.9716, 77.5946), THRESHOLD));
    }
}
