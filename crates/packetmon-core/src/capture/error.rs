use thiserror::Error;

/// Errors returned while extracting and framing game traffic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("packet slice error: {0}")]
    Slice(String),
    #[error("missing network layer in packet")]
    MissingNetworkLayer,
    #[error("invalid message length {length}: shorter than the {minimum}-byte header")]
    InvalidLength { length: usize, minimum: usize },
}
