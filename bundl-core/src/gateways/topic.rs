use async_trait::async_trait;
use bundl_entities::topic::Topic;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The topic service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("The topic service is unreachable: {0}")]
    Transport(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A pub/sub service that delivers messages of a topic to this device.
///
/// Each call may fail independently of all others.
#[async_trait]
pub trait TopicGateway {
    async fn subscribe(&self, topic: &Topic) -> Result<(), Error>;
    async fn unsubscribe(&self, topic: &Topic) -> Result<(), Error>;
}

#[async_trait]
impl<T> TopicGateway for Arc<T>
where
    T: TopicGateway + Send + Sync + ?Sized,
{
    async fn subscribe(&self, topic: &Topic) -> Result<(), Error> {
        (**self).subscribe(topic).await
    }

    async fn unsubscribe(&self, topic: &Topic) -> Result<(), Error> {
        (**self).unsubscribe(topic).await
    }
}
