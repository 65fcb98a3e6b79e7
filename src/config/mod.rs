use anyhow::{anyhow, Result};
use bundl_application::prelude::SubscriptionConfig;
use bundl_core::{entities::Distance, util::geohash::MAX_TABULATED_PRECISION};
use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

mod raw;

const DEFAULT_CONFIG_FILE_NAME: &str = "bundl.toml";
const DEFAULT_INSTANCE_ID_API_BASE_URL: &str = "https://iid.googleapis.com";

pub const ENV_NAME_SERVER_KEY: &str = "BUNDL_SERVER_KEY";
pub const ENV_NAME_REGISTRATION_TOKEN: &str = "BUNDL_REGISTRATION_TOKEN";

pub struct Config {
    pub subscriptions: SubscriptionConfig,
    pub topics: Topics,
}

impl Config {
    pub fn try_load_from_file_or_default<P: AsRef<Path>>(file_path: Option<P>) -> Result<Self> {
        let file_path: &Path = file_path.as_ref().map(|p| p.as_ref()).unwrap_or_else(|| {
            log::info!("No configuration file specified. load {DEFAULT_CONFIG_FILE_NAME}");
            Path::new(DEFAULT_CONFIG_FILE_NAME)
        });

        let raw_config = match fs::read_to_string(file_path) {
            Ok(cfg_string) => toml::from_str(&cfg_string)?,
            Err(err) => match err.kind() {
                ErrorKind::NotFound => {
                    log::info!(
                        "{} not found => load default configuration.",
                        file_path.display()
                    );
                    Ok(raw::Config::default())
                }
                _ => Err(err),
            }?,
        };
        let mut cfg = Self::try_from(raw_config)?;
        cfg.topics.gateway.override_credentials(
            env::var(ENV_NAME_SERVER_KEY).ok(),
            env::var(ENV_NAME_REGISTRATION_TOKEN).ok(),
        );
        Ok(cfg)
    }
}

pub struct Topics {
    pub gateway: TopicGateway,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopicGateway {
    InstanceId {
        api_base_url: String,
        server_key: String,
        registration_token: String,
    },
    /// For local testing purposes
    JsonFile {
        /// File system directory for recording topics into JSON files.
        dir: PathBuf,
    },
}

impl TopicGateway {
    fn override_credentials(
        &mut self,
        new_server_key: Option<String>,
        new_registration_token: Option<String>,
    ) {
        let Self::InstanceId {
            server_key,
            registration_token,
            ..
        } = self
        else {
            return;
        };
        if let Some(key) = new_server_key {
            *server_key = key;
        }
        if let Some(token) = new_registration_token {
            *registration_token = token;
        }
    }
}

impl TryFrom<raw::Config> for Config {
    type Error = anyhow::Error;
    fn try_from(from: raw::Config) -> Result<Self> {
        let raw::Config {
            subscriptions,
            topics,
            gateway,
        } = from;

        let raw::Subscriptions {
            precision_levels,
            max_radius_meters,
            movement_threshold_meters,
        } = subscriptions.unwrap_or_default();

        let defaults = SubscriptionConfig::default();
        let precision_levels =
            precision_levels.unwrap_or_else(|| defaults.precision_levels().to_vec());
        if let Some(precision) = precision_levels
            .iter()
            .find(|precision| **precision > MAX_TABULATED_PRECISION)
        {
            log::warn!("Geohash precision {precision} results in a very fine coverage grid");
        }
        let max_radius = max_radius_meters
            .map(Distance::from_meters)
            .unwrap_or(defaults.max_radius());
        let movement_threshold = movement_threshold_meters
            .map(Distance::from_meters)
            .unwrap_or(defaults.movement_threshold());
        let subscriptions =
            SubscriptionConfig::try_new(precision_levels, max_radius, movement_threshold)?;

        let raw::Topics { gateway: gw_name } = topics.unwrap_or_default();
        let toml_name = gw_name.as_str();
        let gateway = gateway.unwrap_or_default();

        let gateway = match gw_name {
            raw::TopicGateway::InstanceId => {
                let raw::InstanceId {
                    api_base_url,
                    server_key,
                    registration_token,
                } = gateway
                    .instance_id
                    .ok_or_else(|| anyhow!("Missing '{toml_name}' gateway configuration"))?;
                TopicGateway::InstanceId {
                    api_base_url: api_base_url
                        .unwrap_or_else(|| DEFAULT_INSTANCE_ID_API_BASE_URL.to_owned()),
                    server_key: server_key.unwrap_or_default(),
                    registration_token: registration_token.unwrap_or_default(),
                }
            }
            raw::TopicGateway::JsonFile => {
                let raw::JsonFile { dir } = gateway
                    .json_file
                    .ok_or_else(|| anyhow!("Missing '{toml_name}' gateway configuration"))?;
                TopicGateway::JsonFile { dir }
            }
        };

        Ok(Self {
            subscriptions,
            topics: Topics { gateway },
        })
    }
}
