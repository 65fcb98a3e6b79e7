use crate::config::{self, ENV_NAME_REGISTRATION_TOKEN, ENV_NAME_SERVER_KEY};
use anyhow::{bail, Result};
use bundl_core::gateways::topic::TopicGateway;
use bundl_gateways::topics::{InstanceId, RecordToJsonFile};
use std::sync::Arc;

pub type TopicGw = Arc<dyn TopicGateway + Send + Sync>;

pub fn topic_gateway(cfg: config::TopicGateway) -> Result<TopicGw> {
    match cfg {
        config::TopicGateway::InstanceId {
            api_base_url,
            server_key,
            registration_token,
        } => {
            if server_key.is_empty() {
                bail!("Missing server key of the instance ID gateway (see {ENV_NAME_SERVER_KEY})");
            }
            if registration_token.is_empty() {
                bail!(
                    "Missing registration token of the instance ID gateway (see {ENV_NAME_REGISTRATION_TOKEN})"
                );
            }
            log::info!("Use instance ID topic gateway ({api_base_url})");
            Ok(Arc::new(InstanceId::new(
                api_base_url,
                server_key,
                registration_token,
            )))
        }
        config::TopicGateway::JsonFile { dir } => {
            let gw = RecordToJsonFile::try_new(&dir)?;
            log::info!("Use JSON file topic gateway ({})", gw.path().display());
            Ok(Arc::new(gw))
        }
    }
}
