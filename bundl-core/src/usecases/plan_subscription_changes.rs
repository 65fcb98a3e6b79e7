use super::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionChanges {
    pub to_subscribe: Vec<Geohash>,
    pub to_unsubscribe: Vec<Geohash>,
}

impl SubscriptionChanges {
    pub fn is_empty(&self) -> bool {
        self.to_subscribe.is_empty() && self.to_unsubscribe.is_empty()
    }
}

/// Only cells that are added or removed are touched,
/// unchanged cells are neither unsubscribed nor re-subscribed.
pub fn plan_subscription_changes(
    current: &HashSet<Geohash>,
    next: &HashSet<Geohash>,
) -> SubscriptionChanges {
    let mut to_subscribe: Vec<_> = next.difference(current).cloned().collect();
    let mut to_unsubscribe: Vec<_> = current.difference(next).cloned().collect();
    to_subscribe.sort_unstable();
    to_unsubscribe.sort_unstable();
    SubscriptionChanges {
        to_subscribe,
        to_unsubscribe,
    }
}
