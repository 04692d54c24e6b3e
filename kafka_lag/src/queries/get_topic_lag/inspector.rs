use crate::broker::{BrokerSession, SessionFactory};
use crate::error::{BrokerFailure, LagError};
use crate::queries::get_topic_lag::{BrokerOffsetPair, GetTopicLagQueryInternal};
use anyhow::{anyhow, Context};
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Reads committed and end offsets of every partition of the query topic.
///
/// Blocking. The session opened for the query group is closed before returning,
/// whatever the outcome. Either every partition is fetched or the first error is returned.
pub fn inspect<F: SessionFactory>(
    factory: &F,
    query: &GetTopicLagQueryInternal,
    cancellation_token: &CancellationToken,
) -> Result<Vec<BrokerOffsetPair>, LagError> {
    let session = factory
        .open_scoped(&query.group_id)
        .context("While opening broker session")
        .map_err(broker_error)?;

    ensure_not_cancelled(cancellation_token)?;

    let topics = session
        .topics()
        .context("While fetching topics")
        .map_err(broker_error)?;

    if !topics.iter().any(|x| *x == query.topic_name) {
        return Err(LagError::TopicNotFound(query.topic_name.clone()));
    }

    let partitions = session
        .partitions(&query.topic_name)
        .with_context(|| format!("While fetching partitions of topic {}", query.topic_name))
        .map_err(broker_error)?;

    if partitions.is_empty() {
        return Err(LagError::NoPartitions(query.topic_name.clone()));
    }

    debug!(
        "Fetching offsets of {} partitions for topic {} and group {}",
        partitions.len(),
        query.topic_name,
        query.group_id
    );

    partitions
        .into_par_iter()
        .map(|partition| {
            ensure_not_cancelled(cancellation_token)?;
            fetch_partition_offsets(&*session, &query.topic_name, partition).map_err(broker_error)
        })
        .collect::<Result<Vec<_>, _>>()
}

fn fetch_partition_offsets<S: BrokerSession>(
    session: &S,
    topic: &str,
    partition: i32,
) -> Result<BrokerOffsetPair, anyhow::Error> {
    let committed_offset = session
        .committed_offset(topic, partition)
        .with_context(|| format!("While fetching committed offset of partition {partition}"))?;
    let end_offset = session
        .end_offset(topic, partition)
        .with_context(|| format!("While fetching end offset of partition {partition}"))?;

    trace!(
        "Partition {} offsets. Committed: {:?}, end: {}",
        partition,
        committed_offset,
        end_offset
    );

    Ok(BrokerOffsetPair {
        partition_id: partition,
        committed_offset,
        end_offset,
    })
}

fn broker_error(error: anyhow::Error) -> LagError {
    LagError::broker(BrokerFailure::classify(&error), error)
}

fn ensure_not_cancelled(cancellation_token: &CancellationToken) -> Result<(), LagError> {
    if cancellation_token.is_cancelled() {
        return Err(LagError::broker(
            BrokerFailure::Cancelled,
            anyhow!("Offset inspection was cancelled"),
        ));
    }
    Ok(())
}
