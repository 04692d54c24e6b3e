extern crate kafka_lag_api;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use kafka_lag::broker::{BrokerCall, InMemoryBroker};
use kafka_lag_api::lag_api::{build_router, LagApiState};
use rdkafka::error::RDKafkaErrorCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn orders_broker() -> Arc<InMemoryBroker> {
    let broker = InMemoryBroker::new();
    broker.add_partition("orders", 0, 100);
    broker.add_partition("orders", 1, 50);
    broker.commit("billing", "orders", 0, 80);
    Arc::new(broker)
}

fn router(broker: Arc<InMemoryBroker>) -> Router {
    build_router(LagApiState::new(broker, Duration::from_secs(5)))
}

async fn get(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn returns_lag_per_partition() {
    let broker = orders_broker();

    let (status, body) = get(router(broker.clone()), "/?topic_name=orders&group_id=billing").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["topic_name"], "orders");
    assert_eq!(json["group_id"], "billing");
    assert_eq!(
        json["partitions"],
        serde_json::json!([
            {"max_offsets": 100, "last_committed_offsets": 80, "lag": 20, "partition_id": 0},
            {"max_offsets": 50, "last_committed_offsets": null, "lag": 50, "partition_id": 1}
        ])
    );
    assert_eq!(broker.closed_sessions(), 1);
}

#[tokio::test]
async fn response_keys_keep_wire_order() {
    let (_, body) = get(router(orders_broker()), "/?topic_name=orders&group_id=billing").await;

    let positions = ["\"topic_name\"", "\"dt\"", "\"group_id\"", "\"partitions\""]
        .map(|key| body.find(key).unwrap());
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{body}");

    let partition_positions = [
        "\"max_offsets\"",
        "\"last_committed_offsets\"",
        "\"lag\"",
        "\"partition_id\"",
    ]
    .map(|key| body.find(key).unwrap());
    assert!(
        partition_positions.windows(2).all(|pair| pair[0] < pair[1]),
        "{body}"
    );
}

#[tokio::test]
async fn dt_is_formatted_to_seconds() {
    let (_, body) = get(router(orders_broker()), "/?topic_name=orders&group_id=billing").await;

    let json: Value = serde_json::from_str(&body).unwrap();
    let dt = json["dt"].as_str().unwrap();
    assert!(
        chrono::NaiveDateTime::parse_from_str(dt, "%Y-%m-%d %H:%M:%S").is_ok(),
        "{dt}"
    );
}

#[tokio::test]
async fn missing_group_id_is_bad_request() {
    let broker = orders_broker();

    let (status, body) = get(router(broker.clone()), "/?topic_name=orders").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "missing_parameter");
    assert_eq!(json["message"], "group_id parameter is required");
    assert!(json.get("partitions").is_none());
    assert_eq!(broker.opened_sessions(), 0);
}

#[tokio::test]
async fn empty_topic_name_is_bad_request() {
    let (status, body) = get(router(orders_broker()), "/?topic_name=&group_id=billing").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "topic_name parameter is required");
}

#[tokio::test]
async fn unknown_topic_is_not_found() {
    let broker = orders_broker();

    let (status, body) = get(router(broker.clone()), "/?topic_name=payments&group_id=billing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "topic_not_found");
    assert_eq!(json["message"], "The topic payments does not exist");
    assert_eq!(broker.closed_sessions(), 1);
}

#[tokio::test]
async fn broker_failure_is_service_unavailable() {
    let broker = orders_broker();
    broker.fail_on(BrokerCall::CommittedOffset(1), RDKafkaErrorCode::BrokerTransportFailure);

    let (status, body) = get(router(broker.clone()), "/?topic_name=orders&group_id=billing").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "broker_unavailable");
    assert!(json.get("partitions").is_none());
    assert_eq!(broker.closed_sessions(), 1);
}

#[tokio::test]
async fn slow_broker_is_gateway_timeout() {
    let broker = orders_broker();
    broker.set_latency(Duration::from_millis(200));
    let router = build_router(LagApiState::new(broker, Duration::from_millis(20)));

    let (status, _) = get(router, "/?topic_name=orders&group_id=billing").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn request_id_is_propagated() {
    let response = router(orders_broker())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
