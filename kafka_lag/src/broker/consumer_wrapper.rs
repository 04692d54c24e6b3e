use crate::connection_settings::ConnectionSettings;
use anyhow::Context;
use rdkafka::consumer::BaseConsumer;
use rdkafka::ClientConfig;
use std::ops::Deref;

pub struct ConsumerWrapper {
    consumer: BaseConsumer,
}

impl ConsumerWrapper {
    /// Consumer that joins `group` only to read its committed offsets.
    /// It never subscribes, so nothing is consumed and nothing is committed.
    pub fn create_for_inspection(
        connection_settings: &ConnectionSettings,
        group: &str,
    ) -> Result<Self, anyhow::Error> {
        // https://raw.githubusercontent.com/confluentinc/librdkafka/master/CONFIGURATION.md
        let consumer: BaseConsumer = Self::inspection_config(connection_settings, group)?
            .create()
            .context("While creating kafka BaseConsumer")?;

        Ok(Self { consumer })
    }

    fn inspection_config(
        connection_settings: &ConnectionSettings,
        group: &str,
    ) -> Result<ClientConfig, anyhow::Error> {
        let mut config = ClientConfig::try_from(connection_settings)?;
        config
            .set("group.id", group)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "false")
            .set("enable.auto.offset.store", "false")
            .set("enable.partition.eof", "false");

        Ok(config)
    }
}

impl Deref for ConsumerWrapper {
    type Target = BaseConsumer;

    fn deref(&self) -> &Self::Target {
        &self.consumer
    }
}
