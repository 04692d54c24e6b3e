use crate::error::ApplicationError;
use crate::lag_api::{topic_snapshot_to_response, GetTopicLagParams, TopicLagResponseDto};
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use kafka_lag::broker::SessionFactory;
use kafka_lag::queries::get_topic_lag::{get_topic_lag, validate};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

pub struct LagApiState<F> {
    factory: Arc<F>,
    request_timeout: Duration,
}

impl<F> LagApiState<F> {
    pub fn new(factory: Arc<F>, request_timeout: Duration) -> Self {
        Self {
            factory,
            request_timeout,
        }
    }
}

impl<F> Clone for LagApiState<F> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

pub fn build_router<F: SessionFactory>(state: LagApiState<F>) -> Router {
    Router::new()
        .route("/", get(get_topic_lag_handler::<F>))
        .route("/health", get(health))
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[tracing::instrument(skip_all)]
async fn get_topic_lag_handler<F: SessionFactory>(
    State(state): State<LagApiState<F>>,
    Query(params): Query<GetTopicLagParams>,
) -> Result<Json<TopicLagResponseDto>, ApplicationError> {
    debug!("New request: {:?}", params);

    let query = validate(params.group_id, params.topic_name)?;

    debug!("Mapped request: {:?}", query);

    // Dropped together with the handler future when the client goes away.
    let cancellation_token = CancellationToken::new();
    let _guard = cancellation_token.clone().drop_guard();

    let snapshot = get_topic_lag(
        state.factory.clone(),
        query,
        state.request_timeout,
        cancellation_token,
    )
    .await?;

    Ok(Json(topic_snapshot_to_response(&snapshot)))
}

async fn health() -> &'static str {
    "ok"
}
