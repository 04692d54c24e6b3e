use anyhow::Context;
use config::Config;
use kafka_lag::broker::SecurityProtocol;
use kafka_lag::connection_settings::ConnectionSettings;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub brokers: Vec<String>,
    #[serde(default)]
    pub security_protocol: SecurityProtocol,
    #[serde(default = "default_broker_timeout_ms")]
    pub broker_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_broker_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl AppConfig {
    pub fn build() -> Result<Self, anyhow::Error> {
        let config = Config::builder()
            .set_default("host", "0.0.0.0")
            .context("While setting default host")?
            .set_default("port", 5000)
            .context("While setting default port")?
            .add_source(config::File::with_name("appsettings").required(false))
            .add_source(
                config::Environment::with_prefix("App")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("brokers")
                    .try_parsing(true),
            )
            .build()
            .context("While building config")?;

        let deserialized_config = Self::from_config(config)?;

        info!("App config: {deserialized_config:?}");

        Ok(deserialized_config)
    }

    pub fn from_config(config: Config) -> Result<Self, anyhow::Error> {
        config
            .try_deserialize()
            .context("While deserializing config")
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            brokers: self.brokers.clone(),
            security_protocol: self.security_protocol,
        }
    }

    pub fn broker_timeout(&self) -> Duration {
        Duration::from_millis(self.broker_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
