use crate::broker::{BrokerSession, ConsumerWrapper, SessionFactory};
use crate::connection_settings::ConnectionSettings;
use anyhow::{anyhow, bail, Context};
use rdkafka::consumer::Consumer;
use rdkafka::error::RDKafkaErrorCode;
use rdkafka::util::Timeout;
use rdkafka::{ClientConfig, Offset, TopicPartitionList};
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct KafkaSessionFactory {
    connection_settings: ConnectionSettings,
    broker_timeout: Duration,
}

impl KafkaSessionFactory {
    pub fn new(connection_settings: ConnectionSettings, broker_timeout: Duration) -> Result<Self, anyhow::Error> {
        ClientConfig::try_from(&connection_settings).context("While validating connection settings")?;

        Ok(Self {
            connection_settings,
            broker_timeout,
        })
    }
}

impl SessionFactory for KafkaSessionFactory {
    type Session = KafkaSession;

    fn open(&self, group_id: &str) -> Result<Self::Session, anyhow::Error> {
        let consumer = ConsumerWrapper::create_for_inspection(&self.connection_settings, group_id)
            .with_context(|| format!("While creating consumer for group {group_id}"))?;

        debug!("Opened broker session for group {}", group_id);

        Ok(KafkaSession {
            consumer: Some(consumer),
            timeout: Timeout::After(self.broker_timeout),
        })
    }
}

pub struct KafkaSession {
    consumer: Option<ConsumerWrapper>,
    timeout: Timeout,
}

impl KafkaSession {
    fn consumer(&self) -> Result<&ConsumerWrapper, anyhow::Error> {
        self.consumer
            .as_ref()
            .ok_or_else(|| anyhow!("Broker session is already closed"))
    }
}

impl BrokerSession for KafkaSession {
    fn topics(&self) -> Result<Vec<String>, anyhow::Error> {
        let metadata = self
            .consumer()?
            .fetch_metadata(None, self.timeout)
            .context("While fetching cluster metadata")?;

        trace!(
            "Got cluster metadata from broker. Topics count: {}",
            metadata.topics().len()
        );

        Ok(metadata
            .topics()
            .iter()
            .map(|topic| topic.name().to_owned())
            .collect())
    }

    fn partitions(&self, topic: &str) -> Result<Vec<i32>, anyhow::Error> {
        let metadata = self
            .consumer()?
            .fetch_metadata(Some(topic), self.timeout)
            .with_context(|| format!("While fetching topic '{}' metadata", topic))?;

        let Some(topic_metadata) = metadata.topics().iter().find(|x| x.name() == topic) else {
            return Ok(vec![]);
        };

        if let Some(error) = topic_metadata.error() {
            bail!(
                "Broker returned error for topic '{}' metadata: {}",
                topic,
                RDKafkaErrorCode::from(error)
            )
        }

        trace!(
            "Got data for topic. Name: {}, partitions: {}",
            topic_metadata.name(),
            topic_metadata.partitions().len()
        );

        Ok(topic_metadata.partitions().iter().map(|x| x.id()).collect())
    }

    fn committed_offset(&self, topic: &str, partition: i32) -> Result<Option<i64>, anyhow::Error> {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition(topic, partition);

        let committed = self
            .consumer()?
            .committed_offsets(tpl, self.timeout)
            .with_context(|| {
                format!(
                    "While fetching committed offset for topic {} and partition {}",
                    topic, partition
                )
            })?;

        let Some(element) = committed.find_partition(topic, partition) else {
            return Ok(None);
        };
        element.error().with_context(|| {
            format!(
                "Broker returned error for committed offset of topic {} and partition {}",
                topic, partition
            )
        })?;

        Ok(committed_offset_value(element.offset()))
    }

    fn end_offset(&self, topic: &str, partition: i32) -> Result<i64, anyhow::Error> {
        let (_, high) = self
            .consumer()?
            .fetch_watermarks(topic, partition, self.timeout)
            .with_context(|| {
                format!(
                    "While fetching watermarks for topic {} and partition {}",
                    topic, partition
                )
            })?;

        Ok(end_offset_value(high))
    }

    fn close(&mut self) {
        if self.consumer.take().is_some() {
            debug!("Broker session closed");
        }
    }
}

/// Only a concrete non-negative offset counts as a commit.
fn committed_offset_value(offset: Offset) -> Option<i64> {
    match offset {
        Offset::Offset(value) if value >= 0 => Some(value),
        _ => None,
    }
}

// librdkafka reports -1 for partitions it has no watermark for yet.
fn end_offset_value(high_watermark: i64) -> i64 {
    high_watermark.max(0)
}
