use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use kafka_lag::error::{BrokerFailure, LagError};
use serde::Serialize;
use tracing::{debug, error};

#[derive(Debug)]
pub enum ApplicationError {
    InvalidArgument(LagError),
    NotFound(LagError),
    Broker(LagError),
}

#[derive(Debug, Serialize)]
pub struct ErrorDto {
    pub error: &'static str,
    pub message: String,
}

impl From<LagError> for ApplicationError {
    fn from(value: LagError) -> Self {
        if value.is_client_error() {
            return ApplicationError::InvalidArgument(value);
        }

        match value {
            LagError::TopicNotFound(_) => ApplicationError::NotFound(value),
            _ => ApplicationError::Broker(value),
        }
    }
}

impl ApplicationError {
    fn status(&self) -> StatusCode {
        match self {
            ApplicationError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApplicationError::NotFound(_) => StatusCode::NOT_FOUND,
            ApplicationError::Broker(LagError::BrokerUnavailable {
                kind: BrokerFailure::Timeout,
                ..
            }) => StatusCode::GATEWAY_TIMEOUT,
            ApplicationError::Broker(LagError::BrokerUnavailable { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApplicationError::Broker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn error_kind(error: &LagError) -> &'static str {
    match error {
        LagError::MissingParameter(_) => "missing_parameter",
        LagError::TopicNotFound(_) => "topic_not_found",
        LagError::NoPartitions(_) => "no_partitions",
        LagError::BrokerUnavailable { .. } => "broker_unavailable",
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApplicationError::InvalidArgument(e) | ApplicationError::NotFound(e) => {
                debug!("{e}");
                e
            }
            ApplicationError::Broker(e) => {
                error!("{e:?}");
                e
            }
        };

        let dto = ErrorDto {
            error: error_kind(&error),
            message: error.to_string(),
        };

        (status, Json(dto)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn errors_map_to_client_and_service_statuses() {
        let cases = [
            (LagError::MissingParameter("group_id"), StatusCode::BAD_REQUEST),
            (LagError::TopicNotFound("orders".to_owned()), StatusCode::NOT_FOUND),
            (
                LagError::NoPartitions("orders".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                LagError::broker(BrokerFailure::Transport, anyhow!("connection refused")),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                LagError::broker(BrokerFailure::Timeout, anyhow!("timed out")),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApplicationError::from(error).into_response().status(), status);
        }
    }
}
