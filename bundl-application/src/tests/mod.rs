pub mod prelude {

    use std::{
        collections::HashSet,
        sync::atomic::{AtomicBool, Ordering},
    };

    use async_trait::async_trait;
    use parking_lot::Mutex;

    pub(crate) use crate::{
        coverage,
        error::AppError,
        gateways::{
            clock::Clock,
            topic::{self, TopicGateway},
        },
        prelude::*,
        GeoCoordinate, Geohash, LocationSample, SubscriptionStatus, Timestamp, Topic,
    };

    pub const NOW: Timestamp = Timestamp::from_secs(1_714_566_600);

    pub struct FixedClock(pub Timestamp);

    impl Clock for FixedClock {
        fn now(&self) -> Timestamp {
            self.0
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Subscribe(Topic),
        Unsubscribe(Topic),
    }

    /// Records all calls and fails for selected topics.
    #[derive(Default)]
    pub struct FakeTopicGateway {
        calls: Mutex<Vec<Call>>,
        failing_subscribe: Mutex<HashSet<Topic>>,
        failing_unsubscribe: Mutex<HashSet<Topic>>,
        hold_subscriptions: AtomicBool,
    }

    impl FakeTopicGateway {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }

        pub fn clear_calls(&self) {
            self.calls.lock().clear();
        }

        pub fn subscribed(&self) -> Vec<Topic> {
            let mut topics: Vec<_> = self
                .calls
                .lock()
                .iter()
                .filter_map(|call| match call {
                    Call::Subscribe(topic) => Some(topic.clone()),
                    Call::Unsubscribe(_) => None,
                })
                .collect();
            topics.sort();
            topics
        }

        pub fn unsubscribed(&self) -> Vec<Topic> {
            let mut topics: Vec<_> = self
                .calls
                .lock()
                .iter()
                .filter_map(|call| match call {
                    Call::Unsubscribe(topic) => Some(topic.clone()),
                    Call::Subscribe(_) => None,
                })
                .collect();
            topics.sort();
            topics
        }

        pub fn fail_subscribe(&self, topic: Topic) {
            self.failing_subscribe.lock().insert(topic);
        }

        pub fn succeed_subscribe(&self, topic: &Topic) {
            self.failing_subscribe.lock().remove(topic);
        }

        pub fn fail_unsubscribe(&self, topic: Topic) {
            self.failing_unsubscribe.lock().insert(topic);
        }

        /// Subscriptions never complete from now on.
        pub fn hold_subscriptions(&self) {
            self.hold_subscriptions.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl TopicGateway for FakeTopicGateway {
        async fn subscribe(&self, topic: &Topic) -> Result<(), topic::Error> {
            self.calls.lock().push(Call::Subscribe(topic.clone()));
            if self.hold_subscriptions.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            if self.failing_subscribe.lock().contains(topic) {
                return Err(topic::Error::Rejected {
                    status: 500,
                    message: "internal error".into(),
                });
            }
            Ok(())
        }

        async fn unsubscribe(&self, topic: &Topic) -> Result<(), topic::Error> {
            self.calls.lock().push(Call::Unsubscribe(topic.clone()));
            if self.failing_unsubscribe.lock().contains(topic) {
                return Err(topic::Error::Transport("connection reset".into()));
            }
            Ok(())
        }
    }

    pub fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    pub fn user_sample(lat: f64, lng: f64) -> LocationSample {
        LocationSample::user_provided(GeoCoordinate::from_lat_lng_deg(lat, lng))
    }

    pub fn bangalore() -> LocationSample {
        user_sample(12.9716, 77.5946)
    }

    pub fn cells(hashes: &[&str]) -> HashSet<Geohash> {
        hashes.iter().map(|h| h.parse().unwrap()).collect()
    }

    pub fn topics(hashes: &[&str]) -> Vec<Topic> {
        let mut topics: Vec<_> = cells(hashes).iter().map(Topic::for_cell).collect();
        topics.sort();
        topics
    }
}
