use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LagError {
    #[error("{0} parameter is required")]
    MissingParameter(&'static str),
    #[error("The topic {0} does not exist")]
    TopicNotFound(String),
    #[error("The topic {0} has no partitions")]
    NoPartitions(String),
    #[error("Broker unavailable ({kind}): {cause:#}")]
    BrokerUnavailable {
        kind: BrokerFailure,
        cause: anyhow::Error,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BrokerFailure {
    Timeout,
    Transport,
    Cancelled,
}

impl Display for BrokerFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BrokerFailure::Timeout => write!(f, "timeout"),
            BrokerFailure::Transport => write!(f, "transport"),
            BrokerFailure::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl BrokerFailure {
    /// Timeouts reported anywhere in the error chain win over generic transport failures.
    pub fn classify(error: &anyhow::Error) -> Self {
        let timed_out = error.chain().any(|cause| {
            cause
                .downcast_ref::<KafkaError>()
                .and_then(|kafka_error| kafka_error.rdkafka_error_code())
                .is_some_and(|code| {
                    matches!(
                        code,
                        RDKafkaErrorCode::OperationTimedOut | RDKafkaErrorCode::RequestTimedOut
                    )
                })
        });

        if timed_out {
            BrokerFailure::Timeout
        } else {
            BrokerFailure::Transport
        }
    }
}

impl LagError {
    pub fn broker(kind: BrokerFailure, cause: impl Into<anyhow::Error>) -> Self {
        LagError::BrokerUnavailable {
            kind,
            cause: cause.into(),
        }
    }

    /// Validation failures are the caller's fault, everything else is on the broker side.
    pub fn is_client_error(&self) -> bool {
        matches!(self, LagError::MissingParameter(_))
    }
}
