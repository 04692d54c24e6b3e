use crate::broker::{BrokerSession, SessionFactory};
use anyhow::bail;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Broker double that keeps topics, watermarks and group commits in memory.
///
/// Sessions opened from it share its state, and every open/close is counted so
/// callers can check that sessions are released.
#[derive(Clone, Default)]
pub struct InMemoryBroker {
    state: Arc<InMemoryState>,
}

#[derive(Default)]
struct InMemoryState {
    topics: Mutex<BTreeMap<String, BTreeMap<i32, PartitionState>>>,
    failure: Mutex<Option<(BrokerCall, RDKafkaErrorCode)>>,
    latency: Mutex<Option<Duration>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

#[derive(Default)]
struct PartitionState {
    end_offset: i64,
    committed: HashMap<String, i64>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BrokerCall {
    Open,
    Topics,
    Partitions,
    CommittedOffset(i32),
    EndOffset(i32),
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_topic(&self, topic: &str) {
        self.topics().entry(topic.to_owned()).or_default();
    }

    pub fn add_partition(&self, topic: &str, partition: i32, end_offset: i64) {
        self.topics()
            .entry(topic.to_owned())
            .or_default()
            .entry(partition)
            .or_default()
            .end_offset = end_offset;
    }

    pub fn commit(&self, group: &str, topic: &str, partition: i32, offset: i64) {
        self.topics()
            .entry(topic.to_owned())
            .or_default()
            .entry(partition)
            .or_default()
            .committed
            .insert(group.to_owned(), offset);
    }

    /// Makes every following `call` fail with `code` until cleared.
    pub fn fail_on(&self, call: BrokerCall, code: RDKafkaErrorCode) {
        *lock(&self.state.failure) = Some((call, code));
    }

    pub fn clear_failure(&self) {
        *lock(&self.state.failure) = None;
    }

    /// Blocks every broker call for `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.state.latency) = Some(latency);
    }

    pub fn opened_sessions(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn closed_sessions(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    fn topics(&self) -> MutexGuard<'_, BTreeMap<String, BTreeMap<i32, PartitionState>>> {
        lock(&self.state.topics)
    }

    fn enter(&self, call: BrokerCall) -> Result<(), anyhow::Error> {
        let latency = *lock(&self.state.latency);
        if let Some(latency) = latency {
            std::thread::sleep(latency);
        }

        let failure = *lock(&self.state.failure);
        match failure {
            Some((failing_call, code)) if failing_call == call => {
                let error = match call {
                    BrokerCall::Open => KafkaError::ClientCreation(code.to_string()),
                    BrokerCall::CommittedOffset(_) => KafkaError::OffsetFetch(code),
                    _ => KafkaError::MetadataFetch(code),
                };
                Err(error.into())
            }
            _ => Ok(()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SessionFactory for InMemoryBroker {
    type Session = InMemorySession;

    fn open(&self, group_id: &str) -> Result<Self::Session, anyhow::Error> {
        self.enter(BrokerCall::Open)?;
        self.state.opened.fetch_add(1, Ordering::SeqCst);

        Ok(InMemorySession {
            broker: self.clone(),
            group_id: group_id.to_owned(),
            closed: false,
        })
    }
}

pub struct InMemorySession {
    broker: InMemoryBroker,
    group_id: String,
    closed: bool,
}

impl InMemorySession {
    fn ensure_open(&self) -> Result<(), anyhow::Error> {
        if self.closed {
            bail!("Broker session is already closed")
        }
        Ok(())
    }
}

impl BrokerSession for InMemorySession {
    fn topics(&self) -> Result<Vec<String>, anyhow::Error> {
        self.ensure_open()?;
        self.broker.enter(BrokerCall::Topics)?;

        Ok(self.broker.topics().keys().cloned().collect())
    }

    fn partitions(&self, topic: &str) -> Result<Vec<i32>, anyhow::Error> {
        self.ensure_open()?;
        self.broker.enter(BrokerCall::Partitions)?;

        // Reverse order so consumers can't rely on the broker sorting partitions.
        Ok(self
            .broker
            .topics()
            .get(topic)
            .map(|partitions| partitions.keys().rev().copied().collect())
            .unwrap_or_default())
    }

    fn committed_offset(&self, topic: &str, partition: i32) -> Result<Option<i64>, anyhow::Error> {
        self.ensure_open()?;
        self.broker.enter(BrokerCall::CommittedOffset(partition))?;

        Ok(self
            .broker
            .topics()
            .get(topic)
            .and_then(|partitions| partitions.get(&partition))
            .and_then(|state| state.committed.get(&self.group_id).copied()))
    }

    fn end_offset(&self, topic: &str, partition: i32) -> Result<i64, anyhow::Error> {
        self.ensure_open()?;
        self.broker.enter(BrokerCall::EndOffset(partition))?;

        let topics = self.broker.topics();
        let Some(state) = topics.get(topic).and_then(|partitions| partitions.get(&partition)) else {
            return Err(KafkaError::MetadataFetch(RDKafkaErrorCode::UnknownPartition).into());
        };

        Ok(state.end_offset)
    }

    fn close(&mut self) {
        self.closed = true;
        self.broker.state.closed.fetch_add(1, Ordering::SeqCst);
    }
}
