use crate::{usecases::Error, Distance};
use bundl_core::util::geohash::MAX_PRECISION;

pub const DEFAULT_PRECISION_LEVELS: &[usize] = &[7]; // ~153 m cells
pub const DEFAULT_MAX_RADIUS: Distance = Distance::from_meters(200.0);
pub const DEFAULT_MOVEMENT_THRESHOLD: Distance = Distance::from_meters(50.0);

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionConfig {
    precision_levels: Vec<usize>,
    max_radius: Distance,
    movement_threshold: Distance,
}

impl SubscriptionConfig {
    pub fn try_new(
        precision_levels: Vec<usize>,
        max_radius: Distance,
        movement_threshold: Distance,
    ) -> Result<Self, Error> {
        if precision_levels.is_empty() {
            return Err(Error::EmptyPrecisionLevels);
        }
        if precision_levels
            .iter()
            .any(|precision| !(1..=MAX_PRECISION).contains(precision))
        {
            return Err(Error::Precision);
        }
        let radius = max_radius.to_meters();
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::Radius(radius));
        }
        let threshold = movement_threshold.to_meters();
        if !(threshold.is_finite() && threshold >= 0.0) {
            return Err(Error::MovementThreshold(threshold));
        }
        Ok(Self {
            precision_levels,
            max_radius,
            movement_threshold,
        })
    }

    pub fn precision_levels(&self) -> &[usize] {
        &self.precision_levels
    }

    pub const fn max_radius(&self) -> Distance {
        self.max_radius
    }

    pub const fn movement_threshold(&self) -> Distance {
        self.movement_threshold
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            precision_levels: DEFAULT_PRECISION_LEVELS.to_vec(),
            max_radius: DEFAULT_MAX_RADIUS,
            movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = SubscriptionConfig::default();
        assert_eq!(
            SubscriptionConfig::try_new(
                cfg.precision_levels().to_vec(),
                cfg.max_radius(),
                cfg.movement_threshold()
            ),
            Ok(cfg)
        );
    }

    #[test]
    fn reject_invalid_config() {
        let radius = Distance::from_meters(200.0);
        let threshold = Distance::from_meters(50.0);
        assert_eq!(
            SubscriptionConfig::try_new(vec![], radius, threshold),
            Err(Error::EmptyPrecisionLevels)
        );
        assert_eq!(
            SubscriptionConfig::try_new(vec![7, 0], radius, threshold),
            Err(Error::Precision)
        );
        assert_eq!(
            SubscriptionConfig::try_new(vec![7, MAX_PRECISION + 1], radius, threshold),
            Err(Error::Precision)
        );
        assert_eq!(
            SubscriptionConfig::try_new(vec![7], Distance::from_meters(0.0), threshold),
            Err(Error::Radius(0.0))
        );
        assert_eq!(
            SubscriptionConfig::try_new(vec![7], radius, Distance::from_meters(-1.0)),
            Err(Error::MovementThreshold(-1.0))
        );
    }
}
