use crate::time_util::ResponseDateTimeFormat;
use kafka_lag::queries::get_topic_lag::{PartitionLag, TopicSnapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GetTopicLagParams {
    pub topic_name: Option<String>,
    pub group_id: Option<String>,
}

// Field order is the wire order.
#[derive(Debug, Serialize)]
pub struct TopicLagResponseDto {
    pub topic_name: String,
    pub dt: String,
    pub group_id: String,
    pub partitions: Vec<PartitionLagDto>,
}

#[derive(Debug, Serialize)]
pub struct PartitionLagDto {
    pub max_offsets: i64,
    pub last_committed_offsets: Option<i64>,
    pub lag: i64,
    pub partition_id: i32,
}

pub fn topic_snapshot_to_response(model: &TopicSnapshot) -> TopicLagResponseDto {
    let partitions = model
        .partitions()
        .iter()
        .map(partition_lag_to_dto)
        .collect();

    TopicLagResponseDto {
        topic_name: model.topic_name().clone(),
        dt: model.captured_at().to_response_string(),
        group_id: model.group_id().clone(),
        partitions,
    }
}

fn partition_lag_to_dto(model: &PartitionLag) -> PartitionLagDto {
    PartitionLagDto {
        max_offsets: model.end_offset(),
        last_committed_offsets: model.committed_offset(),
        lag: model.lag(),
        partition_id: model.partition_id(),
    }
}
