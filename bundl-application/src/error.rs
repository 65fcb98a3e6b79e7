use bundl_core::{gateways::topic, usecases::Error as ParameterError};
use bundl_entities::topic::Topic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error("Failed to subscribe to {} topic(s)", .failed.len())]
    Subscription { failed: Vec<(Topic, topic::Error)> },
    #[error("The subscription update has been cancelled")]
    Cancelled,
}

impl AppError {
    pub fn failed_topics(&self) -> impl Iterator<Item = &Topic> {
        let failed = match self {
            Self::Subscription { failed } => failed.as_slice(),
            _ => &[],
        };
        failed.iter().map(|(topic, _)| topic)
    }
}
