//! Playback error types and fault classification.

use bridge_traits::error::BridgeError;
use bridge_traits::media::{FaultKind, MediaFault};
use thiserror::Error;

/// Errors raised by playback control operations.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The queue has no entries to play.
    #[error("the queue is empty")]
    EmptyQueue,

    /// A load was requested for an index the queue does not have.
    #[error("index {index} out of range for queue of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A host bridge call failed.
    #[error("bridge failure: {0}")]
    Bridge(#[from] BridgeError),

    /// A broker request failed.
    #[error("broker failure: {0}")]
    Broker(#[from] core_broker::BrokerError),

    /// A durable preference read or write failed.
    #[error("preference storage failure: {0}")]
    Prefs(String),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Recovery action a fault maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Restart the current load and show a timed notice.
    Transient,
    /// Try one in-place media recovery; reclassify as fatal if it fails.
    Recoverable,
    /// Tear down, notify, auto-advance after a delay.
    Fatal,
}

/// Map a reported fault onto the recovery action the controller takes.
///
/// The reporting component's `fatal` flag always wins; non-fatal faults
/// split by family.
pub fn classify_fault(fault: &MediaFault) -> FaultClass {
    if fault.fatal {
        return FaultClass::Fatal;
    }
    match fault.kind {
        FaultKind::Network => FaultClass::Transient,
        FaultKind::Media | FaultKind::Other => FaultClass::Recoverable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_flag_always_wins() {
        let fault = MediaFault::new(FaultKind::Network, true, "manifest 500");
        assert_eq!(classify_fault(&fault), FaultClass::Fatal);
    }

    #[test]
    fn nonfatal_network_is_transient() {
        let fault = MediaFault::new(FaultKind::Network, false, "segment timeout");
        assert_eq!(classify_fault(&fault), FaultClass::Transient);
    }

    #[test]
    fn nonfatal_media_is_recoverable() {
        let fault = MediaFault::new(FaultKind::Media, false, "buffer stall");
        assert_eq!(classify_fault(&fault), FaultClass::Recoverable);
        let fault = MediaFault::new(FaultKind::Other, false, "unclassified");
        assert_eq!(classify_fault(&fault), FaultClass::Recoverable);
    }
}
