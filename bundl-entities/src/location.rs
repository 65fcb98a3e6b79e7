use crate::geo::GeoCoordinate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSample {
    pub pos: GeoCoordinate,
    /// `false` for fallback positions (e.g. a default city center)
    /// that have not been reported by the device.
    pub is_user_provided: bool,
}

impl LocationSample {
    pub const fn user_provided(pos: GeoCoordinate) -> Self {
        Self {
            pos,
            is_user_provided: true,
        }
    }

    pub const fn fallback(pos: GeoCoordinate) -> Self {
        Self {
            pos,
            is_user_provided: false,
        }
    }
}
