use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaylistError {
    /// The queue is at its configured capacity.
    #[error("Queue is full ({0} entries)")]
    QueueFull(usize),

    /// The backing storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] BridgeError),

    /// A snapshot could not be encoded for storage.
    #[error("Encode error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, PlaylistError>;
