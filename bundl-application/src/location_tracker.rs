use std::sync::Arc;

use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::{
    gateways::{clock::Clock, topic::TopicGateway},
    subscription_manager::SubscriptionManager,
    LocationSample,
};

/// Feed location samples into the subscription manager one after another
/// until the stream ends.
///
/// Failed update cycles are logged, the next qualifying sample retries.
pub async fn track_location_samples<G, C, S>(manager: &SubscriptionManager<G, C>, samples: S)
where
    G: TopicGateway + Send + Sync,
    C: Clock + Send + Sync,
    S: Stream<Item = LocationSample>,
{
    let mut samples = std::pin::pin!(samples);
    while let Some(sample) = samples.next().await {
        if !sample.is_user_provided {
            log::debug!("Ignoring fallback location {}", sample.pos);
            continue;
        }
        if let Err(err) = manager.update_location_subscriptions(&sample).await {
            log::error!(
                "Failed to update geohash subscriptions for location {}: {err}",
                sample.pos
            );
        }
    }
}

/// Runs [`track_location_samples`] in a background task.
pub struct LocationTracker<G, C> {
    manager: Arc<SubscriptionManager<G, C>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<G, C> LocationTracker<G, C>
where
    G: TopicGateway + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    pub fn new(manager: Arc<SubscriptionManager<G, C>>) -> Self {
        Self {
            manager,
            task: Mutex::new(None),
        }
    }

    pub fn manager(&self) -> &Arc<SubscriptionManager<G, C>> {
        &self.manager
    }

    /// Start tracking, replacing a previously started stream.
    pub fn start<S>(&self, samples: S)
    where
        S: Stream<Item = LocationSample> + Send + 'static,
    {
        let manager = Arc::clone(&self.manager);
        let task = tokio::spawn(async move {
            track_location_samples(&manager, samples).await;
            log::debug!("Location stream ended");
        });
        if let Some(previous) = self.task.lock().replace(task) {
            previous.abort();
        }
        log::info!("Location tracking started");
    }

    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
            log::info!("Location tracking stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Stop tracking and drop all subscriptions, e.g. on logout.
    pub async fn cleanup(&self) {
        self.stop();
        self.manager.cleanup().await;
    }
}

impl<G, C> Drop for LocationTracker<G, C> {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::prelude::*;
    use futures::stream;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn tracker() -> (
        Arc<FakeTopicGateway>,
        LocationTracker<Arc<FakeTopicGateway>, FixedClock>,
    ) {
        let gw = Arc::new(FakeTopicGateway::default());
        let manager = SubscriptionManager::with_clock(
            Arc::clone(&gw),
            FixedClock(NOW),
            SubscriptionConfig::default(),
        );
        (gw, LocationTracker::new(Arc::new(manager)))
    }

    #[tokio::test]
    async fn track_until_the_stream_ends() {
        let (gw, tracker) = tracker();
        let samples = stream::iter(vec![
            LocationSample::fallback(GeoCoordinate::from_lat_lng_deg(48.7755, 9.1827)),
            bangalore(),
            user_sample(12.9717, 77.5946),
        ]);
        track_location_samples(tracker.manager(), samples).await;

        let manager = tracker.manager();
        assert_eq!(manager.status(), SubscriptionStatus::Subscribed);
        assert_eq!(manager.last_location(), Some(bangalore().pos));
        assert_eq!(gw.subscribed().len(), 4);
    }

    #[tokio::test]
    async fn keep_tracking_after_a_failed_update() {
        let (gw, tracker) = tracker();
        gw.fail_subscribe(Topic::for_cell(&"tdr1v9q".parse().unwrap()));
        let samples = stream::iter(vec![bangalore(), user_sample(12.9816, 77.5946)]);
        track_location_samples(tracker.manager(), samples).await;

        let manager = tracker.manager();
        assert_eq!(manager.status(), SubscriptionStatus::Subscribed);
        assert_eq!(
            manager.last_location(),
            Some(GeoCoordinate::from_lat_lng_deg(12.9816, 77.5946))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn start_stop_and_cleanup() {
        init_logging();
        let (gw, tracker) = tracker();
        let (tx, rx) = mpsc::channel(8);
        let samples = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|sample| (sample, rx))
        });
        tracker.start(samples);
        assert!(tracker.is_running());

        let mut cells_rx = tracker.manager().watch_cells();
        tx.send(bangalore()).await.unwrap();
        tokio::time::timeout(
            Duration::from_secs(5),
            cells_rx.wait_for(|cells| !cells.is_empty()),
        )
        .await
        .unwrap()
        .unwrap();

        tracker.cleanup().await;
        assert!(!tracker.is_running());
        assert!(tracker.manager().current_cells().is_empty());
        assert_eq!(tracker.manager().status(), SubscriptionStatus::Idle);
        assert_eq!(gw.unsubscribed().len(), 4);
        // The aborted task drops the stream
        tokio::time::timeout(Duration::from_secs(5), tx.closed())
            .await
            .unwrap();
    }
}
