//! Broker-side error types.

use thiserror::Error;

/// Errors a [`BrokerHandle`](crate::handle::BrokerHandle) caller can see.
///
/// Failures inside the broker never escape as panics or raw storage errors;
/// they come back as [`Rejected`](BrokerError::Rejected) with the flattened
/// message from the response envelope.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The broker task is gone; no request can be delivered or answered.
    #[error("broker is not running")]
    ChannelClosed,

    /// The broker processed the request and refused it.
    #[error("{0}")]
    Rejected(String),

    /// The response envelope did not carry the payload shape the caller
    /// asked for.
    #[error("malformed response payload: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, BrokerError>;
