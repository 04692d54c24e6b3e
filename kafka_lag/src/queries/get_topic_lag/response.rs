use chrono::{DateTime, Local};
use getset::{CopyGetters, Getters};

#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct TopicSnapshot {
    topic_name: String,
    group_id: String,
    captured_at: DateTime<Local>,
    partitions: Vec<PartitionLag>,
}

impl TopicSnapshot {
    pub(crate) fn new(
        topic_name: String,
        group_id: String,
        captured_at: DateTime<Local>,
        partitions: Vec<PartitionLag>,
    ) -> Self {
        Self {
            topic_name,
            group_id,
            captured_at,
            partitions,
        }
    }

    pub fn total_lag(&self) -> i64 {
        self.partitions.iter().map(|x| x.lag).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct PartitionLag {
    partition_id: i32,
    end_offset: i64,
    committed_offset: Option<i64>,
    lag: i64,
}

impl PartitionLag {
    pub(crate) fn new(partition_id: i32, end_offset: i64, committed_offset: Option<i64>, lag: i64) -> Self {
        Self {
            partition_id,
            end_offset,
            committed_offset,
            lag,
        }
    }
}

/// Raw offsets of one partition as reported by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerOffsetPair {
    pub partition_id: i32,
    pub committed_offset: Option<i64>,
    pub end_offset: i64,
}
