use async_trait::async_trait;
use bundl_entities::topic::Topic;
use serde::{Deserialize, Serialize};

use super::{Error, TopicGateway};

/// Manages the topic subscriptions of a single app instance
/// through the Firebase Instance ID server API.
#[derive(Debug, Clone)]
pub struct InstanceId {
    pub api_base_url: String,
    pub server_key: String,
    pub registration_token: String,
    client: reqwest::Client,
}

impl InstanceId {
    pub fn new(api_base_url: String, server_key: String, registration_token: String) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_owned(),
            server_key,
            registration_token,
            client: reqwest::Client::new(),
        }
    }

    fn subscribe_url(&self, topic: &Topic) -> String {
        let Self {
            api_base_url,
            registration_token,
            ..
        } = self;
        format!("{api_base_url}/iid/v1/{registration_token}/rel/topics/{topic}")
    }

    fn batch_remove_url(&self) -> String {
        format!("{}/iid/v1:batchRemove", self.api_base_url)
    }

    fn batch_request<'a>(&'a self, topic: &Topic) -> BatchRequest<'a> {
        BatchRequest {
            to: format!("/topics/{topic}"),
            registration_tokens: [self.registration_token.as_str()],
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    to: String,
    registration_tokens: [&'a str; 1],
}

#[derive(Debug, Default, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    results: Vec<BatchResult>,
}

#[derive(Debug, Default, Deserialize)]
struct BatchResult {
    error: Option<String>,
}

#[derive(Debug, Deserialize, thiserror::Error)]
#[error("{error}")]
struct JsonError {
    error: String,
}

struct RawResponse {
    status: u16,
    body: String,
}

#[cfg(not(test))]
async fn post_raw(
    client: &reqwest::Client,
    url: &str,
    server_key: &str,
    body: Option<&BatchRequest<'_>>,
) -> Result<RawResponse, Error> {
    use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH};

    let request = client
        .post(url)
        .header(AUTHORIZATION, format!("key={server_key}"));
    let request = match body {
        Some(body) => request.json(body),
        None => request.header(CONTENT_LENGTH, 0),
    };
    let response = request
        .send()
        .await
        .map_err(|err| Error::Transport(err.to_string()))?;
    log::debug!("Topic service response: {:#?}", response);
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|err| Error::Transport(err.to_string()))?;
    Ok(RawResponse { status, body })
}

/// Don't actually talk to the topic service while running the tests.
#[cfg(test)]
async fn post_raw(
    _: &reqwest::Client,
    url: &str,
    _: &str,
    body: Option<&BatchRequest<'_>>,
) -> Result<RawResponse, Error> {
    log::debug!("Would post to {url}: {body:?}");
    Ok(RawResponse {
        status: 200,
        body: "{}".to_owned(),
    })
}

fn check_response(response: RawResponse) -> Result<(), Error> {
    let RawResponse { status, body } = response;
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<JsonError>(&body)
            .map(|err| err.to_string())
            .unwrap_or(body);
        return Err(Error::Rejected { status, message });
    }
    // Batch operations report failures per token
    let batch: BatchResponse = serde_json::from_str(&body).unwrap_or_default();
    if let Some(message) = batch.results.into_iter().find_map(|res| res.error) {
        return Err(Error::Rejected { status, message });
    }
    Ok(())
}

#[async_trait]
impl TopicGateway for InstanceId {
    async fn subscribe(&self, topic: &Topic) -> Result<(), Error> {
        log::debug!("Subscribing to topic {topic}");
        let url = self.subscribe_url(topic);
        let response = post_raw(&self.client, &url, &self.server_key, None).await?;
        check_response(response)
    }

    async fn unsubscribe(&self, topic: &Topic) -> Result<(), Error> {
        log::debug!("Unsubscribing from topic {topic}");
        let url = self.batch_remove_url();
        let request = self.batch_request(topic);
        let response = post_raw(&self.client, &url, &self.server_key, Some(&request)).await?;
        check_response(response)
    }
}
