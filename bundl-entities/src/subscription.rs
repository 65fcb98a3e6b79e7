use crate::{
    geo::{Distance, GeoCoordinate},
    time::Timestamp,
};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SubscriptionStatus {
    /// Not subscribed to any topics.
    #[default]
    Idle,
    Updating,
    Subscribed,
    /// The last update cycle failed to subscribe.
    Error,
}

/// Snapshot of the subscriptions for display and debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionInfo {
    pub total_topics: usize,
    pub precision_levels: Vec<usize>,
    pub max_radius: Distance,
    pub last_location: Option<GeoCoordinate>,
    pub last_updated_at: Option<Timestamp>,
    pub status: SubscriptionStatus,
}

impl SubscriptionInfo {
    /// One-line text for a status notification.
    pub fn summary(&self) -> String {
        match self.total_topics {
            0 => "Not listening for nearby orders".to_owned(),
            1 => "Listening on 1 area".to_owned(),
            n => format!("Listening on {n} areas"),
        }
    }
}
