use std::collections::HashSet;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::{watch, Mutex as AsyncMutex};

use crate::{
    config::SubscriptionConfig,
    coverage::multi_level_coverage_geohashes,
    error::AppError,
    gateways::{
        clock::{Clock, SystemClock},
        topic::{self, TopicGateway},
    },
    usecases::{needs_subscription_update, plan_subscription_changes, SubscriptionChanges},
    GeoCoordinate, Geohash, LocationSample, SubscriptionInfo, SubscriptionStatus, Timestamp,
    Topic,
};

#[derive(Debug, Clone, Copy)]
struct LastUpdate {
    pos: GeoCoordinate,
    at: Timestamp,
}

/// Keeps this device subscribed to the topics of all geohash
/// cells around its most recent location.
///
/// Update cycles and cleanup are serialized. The committed cell set
/// and status can be observed through [`watch`] receivers.
pub struct SubscriptionManager<G, C = SystemClock> {
    topic_gw: G,
    clock: C,
    config: SubscriptionConfig,
    update_lock: AsyncMutex<()>,
    cells: watch::Sender<HashSet<Geohash>>,
    status: watch::Sender<SubscriptionStatus>,
    last_update: Mutex<Option<LastUpdate>>,
    // Bumped by cleanup to abandon an in-flight update cycle.
    session: watch::Sender<u64>,
}

impl<G> SubscriptionManager<G, SystemClock>
where
    G: TopicGateway + Send + Sync,
{
    pub fn new(topic_gw: G, config: SubscriptionConfig) -> Self {
        Self::with_clock(topic_gw, SystemClock, config)
    }
}

impl<G, C> SubscriptionManager<G, C>
where
    G: TopicGateway + Send + Sync,
    C: Clock + Send + Sync,
{
    pub fn with_clock(topic_gw: G, clock: C, config: SubscriptionConfig) -> Self {
        let (cells, _) = watch::channel(HashSet::new());
        let (status, _) = watch::channel(SubscriptionStatus::Idle);
        let (session, _) = watch::channel(0);
        Self {
            topic_gw,
            clock,
            config,
            update_lock: AsyncMutex::new(()),
            cells,
            status,
            last_update: Mutex::new(None),
            session,
        }
    }

    pub fn config(&self) -> &SubscriptionConfig {
        &self.config
    }

    pub fn watch_cells(&self) -> watch::Receiver<HashSet<Geohash>> {
        self.cells.subscribe()
    }

    pub fn watch_status(&self) -> watch::Receiver<SubscriptionStatus> {
        self.status.subscribe()
    }

    pub fn current_cells(&self) -> HashSet<Geohash> {
        self.cells.borrow().clone()
    }

    pub fn status(&self) -> SubscriptionStatus {
        *self.status.borrow()
    }

    pub fn last_location(&self) -> Option<GeoCoordinate> {
        self.last_update.lock().map(|last| last.pos)
    }

    pub fn info(&self) -> SubscriptionInfo {
        let last_update = *self.last_update.lock();
        SubscriptionInfo {
            total_topics: self.cells.borrow().len(),
            precision_levels: self.config.precision_levels().to_vec(),
            max_radius: self.config.max_radius(),
            last_location: last_update.map(|last| last.pos),
            last_updated_at: last_update.map(|last| last.at),
            status: self.status(),
        }
    }

    /// Subscribe to the cells around the sampled location.
    ///
    /// Samples that are not user provided or too close to the last
    /// subscribed location are ignored. Failing to unsubscribe from a
    /// cell that is no longer needed is tolerated, failing to subscribe
    /// to a new cell is not: the status switches to
    /// [`SubscriptionStatus::Error`] and the current cells are kept.
    pub async fn update_location_subscriptions(
        &self,
        sample: &LocationSample,
    ) -> crate::Result<()> {
        let _guard = self.update_lock.lock().await;

        let mut session_rx = self.session.subscribe();
        let session = *session_rx.borrow_and_update();

        if !needs_subscription_update(
            self.last_location(),
            sample,
            self.config.movement_threshold(),
        ) {
            log::debug!("Location change too small, skipping subscription update");
            return Ok(());
        }

        self.status.send_replace(SubscriptionStatus::Updating);

        let next_cells = match multi_level_coverage_geohashes(
            sample.pos,
            self.config.max_radius().to_meters(),
            self.config.precision_levels(),
        ) {
            Ok(cells) => cells,
            Err(err) => {
                self.status.send_replace(SubscriptionStatus::Error);
                return Err(err.into());
            }
        };
        log::debug!(
            "Calculated {} geohashes for location {}",
            next_cells.len(),
            sample.pos
        );

        let changes = plan_subscription_changes(&self.cells.borrow(), &next_cells);

        let applied = tokio::select! {
            applied = self.apply_changes(&changes) => applied,
            _ = session_rx.changed() => {
                log::info!("Subscription update for location {} abandoned", sample.pos);
                return Err(AppError::Cancelled);
            }
        };
        if let Err(failed) = applied {
            self.status.send_replace(SubscriptionStatus::Error);
            log::error!(
                "Failed to subscribe to {} of {} new topics",
                failed.len(),
                changes.to_subscribe.len()
            );
            return Err(AppError::Subscription { failed });
        }
        if *self.session.borrow() != session {
            return Err(AppError::Cancelled);
        }

        let total = next_cells.len();
        self.cells.send_replace(next_cells);
        *self.last_update.lock() = Some(LastUpdate {
            pos: sample.pos,
            at: self.clock.now(),
        });
        self.status.send_replace(SubscriptionStatus::Subscribed);
        log::info!(
            "Updated location subscriptions: {total} geohashes (+{} -{})",
            changes.to_subscribe.len(),
            changes.to_unsubscribe.len()
        );
        Ok(())
    }

    /// Unsubscribe from all cells and reset to [`SubscriptionStatus::Idle`].
    ///
    /// An update cycle in flight is abandoned without committing.
    /// Unsubscribe failures are only logged.
    pub async fn cleanup(&self) {
        self.session.send_modify(|session| *session += 1);
        let _guard = self.update_lock.lock().await;

        let cells: Vec<_> = self.cells.borrow().iter().cloned().collect();
        self.unsubscribe_all(&cells).await;

        self.cells.send_replace(HashSet::new());
        *self.last_update.lock() = None;
        self.status.send_replace(SubscriptionStatus::Idle);
        log::info!("Cleaned up {} geohash subscriptions", cells.len());
    }

    async fn apply_changes(
        &self,
        changes: &SubscriptionChanges,
    ) -> Result<(), Vec<(Topic, topic::Error)>> {
        self.unsubscribe_all(&changes.to_unsubscribe).await;

        let results = join_all(changes.to_subscribe.iter().map(|cell| async move {
            let topic = Topic::for_cell(cell);
            let res = self.topic_gw.subscribe(&topic).await;
            (topic, res)
        }))
        .await;

        let failed: Vec<_> = results
            .into_iter()
            .filter_map(|(topic, res)| match res {
                Ok(()) => {
                    log::debug!("Subscribed to topic: {topic}");
                    None
                }
                Err(err) => {
                    log::warn!("Failed to subscribe to topic {topic}: {err}");
                    Some((topic, err))
                }
            })
            .collect();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(failed)
        }
    }

    async fn unsubscribe_all(&self, cells: &[Geohash]) {
        let results = join_all(cells.iter().map(|cell| async move {
            let topic = Topic::for_cell(cell);
            let res = self.topic_gw.unsubscribe(&topic).await;
            (topic, res)
        }))
        .await;
        for (topic, res) in results {
            match res {
                Ok(()) => log::debug!("Unsubscribed from topic: {topic}"),
                Err(err) => log::warn!("Failed to unsubscribe from topic {topic}: {err}"),
            }
        }
    }
}
