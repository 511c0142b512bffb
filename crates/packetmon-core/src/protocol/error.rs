use thiserror::Error;

use super::classify::Direction;

/// Errors returned by packet views, field reads and decoders.
///
/// `UnknownPacketType` is not a failure: it reports that no structured
/// decode exists for the tag, and the caller keeps its generic line.
///
/// # Examples
/// ```
/// use packetmon_core::DecodeError;
///
/// let err = DecodeError::Truncated { needed: 8, actual: 3 };
/// assert!(err.to_string().contains("payload too short"));
/// assert!(!err.is_unstructured());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("view out of bounds: offset {offset} + length {length} exceeds buffer of {buffer_len} bytes")]
    OutOfBounds {
        offset: usize,
        length: usize,
        buffer_len: usize,
    },
    #[error("payload too short: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("no structured decode for packet type {tag} ({direction})")]
    UnknownPacketType { tag: u8, direction: Direction },
    #[error("tile entity {id} has unsupported variant {kind}")]
    UnsupportedEntityVariant { id: i32, kind: u8 },
    #[error("field {field} value {value} does not fit in {target}")]
    FieldOverflow {
        field: &'static str,
        value: i64,
        target: &'static str,
    },
}

impl DecodeError {
    /// True when the error only means "no structured decode available".
    pub fn is_unstructured(&self) -> bool {
        matches!(self, DecodeError::UnknownPacketType { .. })
    }
}
