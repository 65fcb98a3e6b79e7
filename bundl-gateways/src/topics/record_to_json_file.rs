use std::{io, path::Path};

use async_trait::async_trait;
use bundl_core::gateways::clock::{Clock, SystemClock};
use bundl_entities::{time::Timestamp, topic::Topic};
use jfs::Store;
use serde::{Deserialize, Serialize};

use super::{Error, TopicGateway};

/// A local topic gateway that keeps one JSON file per subscribed topic.
pub struct RecordToJsonFile<C = SystemClock> {
    json_store: Store,
    clock: C,
}

impl RecordToJsonFile<SystemClock> {
    pub fn try_new<P: AsRef<Path>>(directory: P) -> io::Result<Self> {
        Self::try_with_clock(directory, SystemClock)
    }
}

impl<C> RecordToJsonFile<C> {
    pub fn try_with_clock<P: AsRef<Path>>(directory: P, clock: C) -> io::Result<Self> {
        let json_store = Store::new(directory)?;
        Ok(Self { json_store, clock })
    }

    pub fn path(&self) -> &Path {
        self.json_store.path()
    }

    /// All topics that are currently recorded, in order.
    pub fn subscribed_topics(&self) -> io::Result<Vec<Topic>> {
        let records = self.json_store.all::<JsonTopic>()?;
        Ok(records.into_values().map(|rec| rec.topic.into()).collect())
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct JsonTopic {
    topic: String,
    cell: Option<String>,
    subscribed_at: i64,
}

impl JsonTopic {
    fn new(topic: &Topic, subscribed_at: Timestamp) -> Self {
        Self {
            topic: topic.as_str().to_owned(),
            cell: topic.cell().map(|cell| cell.into_string()),
            subscribed_at: subscribed_at.as_secs(),
        }
    }
}

#[async_trait]
impl<C> TopicGateway for RecordToJsonFile<C>
where
    C: Clock + Send + Sync,
{
    async fn subscribe(&self, topic: &Topic) -> Result<(), Error> {
        let record = JsonTopic::new(topic, self.clock.now());
        self.json_store
            .save_with_id(&record, topic.as_str())
            .map_err(|err| anyhow::anyhow!("Unable to save topic in JSON file: {err}"))?;
        Ok(())
    }

    async fn unsubscribe(&self, topic: &Topic) -> Result<(), Error> {
        match self.json_store.delete(topic.as_str()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("Topic {topic} was not recorded");
                Ok(())
            }
            Err(err) => {
                Err(anyhow::anyhow!("Unable to delete topic from JSON file: {err}").into())
            }
        }
    }
}
