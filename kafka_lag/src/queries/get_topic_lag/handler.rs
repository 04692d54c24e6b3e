use crate::broker::SessionFactory;
use crate::error::{BrokerFailure, LagError};
use crate::queries::get_topic_lag::{aggregate, inspect, GetTopicLagQueryInternal, TopicSnapshot};
use anyhow::anyhow;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[tracing::instrument(skip_all, fields(topic = %query.topic_name, group = %query.group_id))]
pub async fn get_topic_lag<F: SessionFactory>(
    factory: Arc<F>,
    query: GetTopicLagQueryInternal,
    timeout: Duration,
    cancellation_token: CancellationToken,
) -> Result<TopicSnapshot, LagError> {
    let inspection_token = cancellation_token.child_token();
    // Stops the blocking inspection if this future is dropped or times out.
    let _guard = inspection_token.clone().drop_guard();

    let blocking_query = query.clone();
    let handle = tokio::task::spawn_blocking(move || {
        inspect(factory.as_ref(), &blocking_query, &inspection_token)
    });

    let offset_pairs = match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join_error)) => {
            return Err(LagError::broker(
                BrokerFailure::Transport,
                anyhow!(join_error).context("While joining offset inspection"),
            ))
        }
        Err(_) => {
            debug!("Offset inspection exceeded {:?}", timeout);
            return Err(LagError::broker(
                BrokerFailure::Timeout,
                anyhow!("Offset inspection didn't finish in {:?}", timeout),
            ));
        }
    };

    let snapshot = aggregate(query, offset_pairs);

    info!(
        "Lag computed for {} partitions, total lag: {}",
        snapshot.partitions().len(),
        snapshot.total_lag()
    );

    Ok(snapshot)
}
