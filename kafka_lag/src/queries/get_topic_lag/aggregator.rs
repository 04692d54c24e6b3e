use crate::queries::get_topic_lag::{
    BrokerOffsetPair, GetTopicLagQueryInternal, PartitionLag, TopicSnapshot,
};
use chrono::Local;
use tracing::warn;

pub fn aggregate(
    query: GetTopicLagQueryInternal,
    offset_pairs: Vec<BrokerOffsetPair>,
) -> TopicSnapshot {
    let mut partitions = offset_pairs
        .into_iter()
        .map(|pair| partition_lag(&query, pair))
        .collect::<Vec<_>>();
    partitions.sort_by_key(|x| x.partition_id());

    TopicSnapshot::new(query.topic_name, query.group_id, Local::now(), partitions)
}

fn partition_lag(query: &GetTopicLagQueryInternal, pair: BrokerOffsetPair) -> PartitionLag {
    let lag = match pair.committed_offset {
        None => pair.end_offset,
        Some(committed) if committed > pair.end_offset => {
            warn!(
                "Group {} committed offset {} past end offset {} of topic {} partition {}, lag clamped to 0",
                query.group_id, committed, pair.end_offset, query.topic_name, pair.partition_id
            );
            0
        }
        Some(committed) => pair.end_offset - committed,
    };

    PartitionLag::new(pair.partition_id, pair.end_offset, pair.committed_offset, lag)
}
