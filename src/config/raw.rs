use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = include_str!("bundl.default.toml");

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub subscriptions: Option<Subscriptions>,
    pub topics: Option<Topics>,
    pub gateway: Option<Gateway>,
}

impl Default for Config {
    fn default() -> Self {
        let cfg: Self = toml::from_str(DEFAULT_CONFIG_FILE).expect("Default configuration");
        cfg
    }
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Subscriptions {
    pub precision_levels: Option<Vec<usize>>,
    pub max_radius_meters: Option<f64>,
    pub movement_threshold_meters: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Topics {
    pub gateway: TopicGateway,
}

impl Default for Topics {
    fn default() -> Self {
        Config::default().topics.expect("Topics configuration")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopicGateway {
    InstanceId,
    JsonFile,
}

impl TopicGateway {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InstanceId => "instance-id",
            Self::JsonFile => "json-file",
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Gateway {
    pub instance_id: Option<InstanceId>,
    pub json_file: Option<JsonFile>,
}

impl Default for Gateway {
    fn default() -> Self {
        Config::default().gateway.expect("Gateway configuration")
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstanceId {
    pub api_base_url: Option<String>,
    pub server_key: Option<String>,
    pub registration_token: Option<String>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JsonFile {
    pub dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_config() {
        let cfg = Config::default();
        let subscriptions = cfg.subscriptions.unwrap();
        assert_eq!(subscriptions.precision_levels, Some(vec![7]));
        assert_eq!(subscriptions.max_radius_meters, Some(200.0));
        assert_eq!(subscriptions.movement_threshold_meters, Some(50.0));
        assert_eq!(cfg.topics.unwrap().gateway, TopicGateway::JsonFile);
        let gateway = cfg.gateway.unwrap();
        assert_eq!(
            gateway.instance_id.unwrap().api_base_url.as_deref(),
            Some("https://iid.googleapis.com")
        );
        assert_eq!(gateway.json_file.unwrap().dir, PathBuf::from("bundl-topics"));
    }
}
