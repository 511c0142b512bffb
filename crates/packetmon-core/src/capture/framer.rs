use std::collections::BTreeMap;

use crate::protocol::layout::{FRAME_HEADER_LEN, FRAME_LENGTH_PREFIX};

use super::error::CaptureError;

/// Out-of-order bytes a flow may hold before the hole is treated as lost.
pub const MAX_REORDER_BYTES: usize = 64 * 1024;

/// Result of feeding one segment to a [`StreamFramer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentOutcome {
    Accepted,
    /// Arrived ahead of missing bytes; held until the hole fills.
    OutOfOrder,
    /// Every byte was already seen.
    Retransmit,
    /// Bytes are missing and the hole could not be held open; everything
    /// buffered is discarded.
    Gap,
    /// Framing was lost earlier; the segment is ignored.
    Desynced,
}

/// One length-prefixed game message, prefix and type byte included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedMessage {
    pub tag: u8,
    pub bytes: Vec<u8>,
}

/// Reassembles one direction of a game TCP stream into messages.
///
/// A stream first seen mid-connection is assumed to start on a message
/// boundary. Segments that arrive early are held (up to
/// [`MAX_REORDER_BYTES`]) and spliced in once the bytes before them show up.
/// After a hole that cannot be held, or an impossible length prefix, the
/// framer stops producing messages until the connection restarts with a SYN.
#[derive(Debug, Default)]
pub struct StreamFramer {
    buffer: Vec<u8>,
    next_seq: Option<u32>,
    /// Early segments keyed by sequence distance from `origin`.
    ahead: BTreeMap<u32, Vec<u8>>,
    ahead_bytes: usize,
    origin: u32,
    desynced: bool,
}

impl StreamFramer {
    pub fn push(&mut self, seq: u32, syn: bool, payload: &[u8]) -> SegmentOutcome {
        let data_seq = if syn {
            self.reset();
            seq.wrapping_add(1)
        } else {
            seq
        };
        if self.desynced {
            return SegmentOutcome::Desynced;
        }

        let Some(expected) = self.next_seq else {
            self.buffer.extend_from_slice(payload);
            self.next_seq = Some(data_seq.wrapping_add(payload.len() as u32));
            return SegmentOutcome::Accepted;
        };
        if payload.is_empty() {
            return SegmentOutcome::Accepted;
        }

        // Sequence space wraps; the signed distance orders the two.
        let delta = data_seq.wrapping_sub(expected) as i32;
        if delta > 0 {
            return self.hold(expected, data_seq, delta.unsigned_abs() as usize, payload);
        }
        let skip = delta.unsigned_abs() as usize;
        if skip >= payload.len() {
            return SegmentOutcome::Retransmit;
        }
        self.buffer.extend_from_slice(&payload[skip..]);
        self.next_seq = Some(data_seq.wrapping_add(payload.len() as u32));
        self.release();
        SegmentOutcome::Accepted
    }

    fn hold(
        &mut self,
        expected: u32,
        data_seq: u32,
        distance: usize,
        payload: &[u8],
    ) -> SegmentOutcome {
        if self.ahead.is_empty() {
            self.origin = expected;
        }
        if distance > MAX_REORDER_BYTES || self.ahead_bytes + payload.len() > MAX_REORDER_BYTES {
            self.reset();
            self.desynced = true;
            return SegmentOutcome::Gap;
        }
        let key = data_seq.wrapping_sub(self.origin);
        let held = self.ahead.entry(key).or_default();
        if payload.len() > held.len() {
            self.ahead_bytes += payload.len() - held.len();
            *held = payload.to_vec();
        }
        SegmentOutcome::OutOfOrder
    }

    /// Splice held segments that now touch the end of the stream.
    fn release(&mut self) {
        while let Some(expected) = self.next_seq {
            let at = expected.wrapping_sub(self.origin);
            let Some(entry) = self.ahead.first_entry() else {
                break;
            };
            if *entry.key() > at {
                break;
            }
            let start = *entry.key();
            let bytes = entry.remove();
            self.ahead_bytes -= bytes.len();
            let skip = (at - start) as usize;
            if skip < bytes.len() {
                self.buffer.extend_from_slice(&bytes[skip..]);
                self.next_seq = Some(expected.wrapping_add((bytes.len() - skip) as u32));
            }
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.ahead.clear();
        self.ahead_bytes = 0;
        self.next_seq = None;
        self.desynced = false;
    }

    /// Pop the next complete message, if buffered.
    pub fn next_message(&mut self) -> Result<Option<FramedMessage>, CaptureError> {
        if self.desynced || self.buffer.len() < FRAME_LENGTH_PREFIX {
            return Ok(None);
        }
        let length = usize::from(u16::from_le_bytes([self.buffer[0], self.buffer[1]]));
        if length < FRAME_HEADER_LEN {
            self.reset();
            self.desynced = true;
            return Err(CaptureError::InvalidLength {
                length,
                minimum: FRAME_HEADER_LEN,
            });
        }
        if self.buffer.len() < length {
            return Ok(None);
        }
        let bytes: Vec<u8> = self.buffer.drain(..length).collect();
        Ok(Some(FramedMessage {
            tag: bytes[FRAME_LENGTH_PREFIX],
            bytes,
        }))
    }

    pub fn is_desynced(&self) -> bool {
        self.desynced
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Whether early segments are still waiting on missing bytes.
    pub fn has_hole(&self) -> bool {
        !self.ahead.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{MAX_REORDER_BYTES, SegmentOutcome, StreamFramer};
    use crate::capture::error::CaptureError;

    fn drain(framer: &mut StreamFramer) -> Vec<(u8, usize)> {
        let mut out = Vec::new();
        while let Some(message) = framer.next_message().unwrap() {
            out.push((message.tag, message.bytes.len()));
        }
        out
    }

    #[test]
    fn splits_coalesced_messages() {
        let mut framer = StreamFramer::default();
        let bytes = [3, 0, 13, 5, 0, 17, 0xAA, 0xBB];
        assert_eq!(framer.push(100, false, &bytes), SegmentOutcome::Accepted);
        assert_eq!(drain(&mut framer), vec![(13, 3), (17, 5)]);
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn joins_message_split_across_segments() {
        let mut framer = StreamFramer::default();
        framer.push(10, false, &[6, 0, 79]);
        assert!(framer.next_message().unwrap().is_none());
        framer.push(13, false, &[1, 2, 3]);
        let message = framer.next_message().unwrap().expect("message");
        assert_eq!(message.tag, 79);
        assert_eq!(message.bytes, vec![6, 0, 79, 1, 2, 3]);
    }

    #[test]
    fn syn_consumes_one_sequence_number() {
        let mut framer = StreamFramer::default();
        framer.push(999, true, &[]);
        assert_eq!(framer.push(1000, false, &[3, 0, 36]), SegmentOutcome::Accepted);
        assert_eq!(drain(&mut framer), vec![(36, 3)]);
    }

    #[test]
    fn retransmit_is_ignored_and_overlap_trimmed() {
        let mut framer = StreamFramer::default();
        framer.push(0, false, &[4, 0, 16]);
        assert_eq!(framer.push(0, false, &[4, 0, 16]), SegmentOutcome::Retransmit);
        assert_eq!(framer.push(1, false, &[0, 16, 9]), SegmentOutcome::Accepted);
        let message = framer.next_message().unwrap().expect("message");
        assert_eq!(message.bytes, vec![4, 0, 16, 9]);
    }

    #[test]
    fn sequence_wraparound_is_contiguous() {
        let mut framer = StreamFramer::default();
        framer.push(u32::MAX - 1, false, &[3, 0]);
        assert_eq!(framer.push(0, false, &[40]), SegmentOutcome::Accepted);
        assert_eq!(drain(&mut framer), vec![(40, 3)]);
    }

    #[test]
    fn reordered_segments_are_spliced_back() {
        let mut framer = StreamFramer::default();
        assert_eq!(framer.push(990, false, &[3, 0, 13]), SegmentOutcome::Accepted);
        assert_eq!(framer.push(996, false, &[3, 0, 17]), SegmentOutcome::OutOfOrder);
        assert!(framer.has_hole());
        assert_eq!(drain(&mut framer), vec![(13, 3)]);

        assert_eq!(framer.push(993, false, &[3, 0, 16]), SegmentOutcome::Accepted);
        assert!(!framer.has_hole());
        assert_eq!(framer.push(999, false, &[3, 0, 79]), SegmentOutcome::Accepted);
        assert_eq!(drain(&mut framer), vec![(16, 3), (17, 3), (79, 3)]);
        assert!(!framer.is_desynced());
    }

    #[test]
    fn held_segments_overlapping_the_fill_are_trimmed() {
        let mut framer = StreamFramer::default();
        framer.push(0, false, &[6, 0]);
        assert_eq!(framer.push(4, false, &[2, 3, 3, 0, 13]), SegmentOutcome::OutOfOrder);
        assert_eq!(framer.push(6, false, &[3, 0, 13]), SegmentOutcome::OutOfOrder);
        assert_eq!(framer.push(2, false, &[40, 1, 2]), SegmentOutcome::Accepted);
        let message = framer.next_message().unwrap().expect("message");
        assert_eq!(message.bytes, vec![6, 0, 40, 1, 2, 3]);
        assert_eq!(drain(&mut framer), vec![(13, 3)]);
        assert!(!framer.has_hole());
    }

    #[test]
    fn reordering_across_wraparound() {
        let mut framer = StreamFramer::default();
        framer.push(u32::MAX - 2, false, &[3, 0]);
        assert_eq!(framer.push(1, false, &[0, 17]), SegmentOutcome::OutOfOrder);
        assert_eq!(framer.push(u32::MAX, false, &[13, 3]), SegmentOutcome::Accepted);
        assert_eq!(drain(&mut framer), vec![(13, 3), (17, 3)]);
    }

    #[test]
    fn hole_wider_than_reorder_window_desyncs_until_next_syn() {
        let mut framer = StreamFramer::default();
        framer.push(0, false, &[5, 0]);
        let far = 2 + MAX_REORDER_BYTES as u32 + 1;
        assert_eq!(framer.push(far, false, &[3, 0, 13]), SegmentOutcome::Gap);
        assert!(framer.is_desynced());
        assert_eq!(framer.push(2, false, &[13, 1, 2]), SegmentOutcome::Desynced);
        assert!(framer.next_message().unwrap().is_none());

        framer.push(500, true, &[]);
        assert!(!framer.is_desynced());
        framer.push(501, false, &[3, 0, 13]);
        assert_eq!(drain(&mut framer), vec![(13, 3)]);
    }

    #[test]
    fn held_bytes_beyond_the_limit_are_a_gap() {
        let mut framer = StreamFramer::default();
        framer.push(0, false, &[3, 0]);
        let chunk = vec![0u8; MAX_REORDER_BYTES / 2];
        assert_eq!(framer.push(10, false, &chunk), SegmentOutcome::OutOfOrder);
        let next = 10 + chunk.len() as u32;
        assert_eq!(framer.push(next, false, &chunk), SegmentOutcome::OutOfOrder);
        assert_eq!(framer.push(11, false, &chunk), SegmentOutcome::Gap);
        assert!(!framer.has_hole());
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn short_length_prefix_desyncs() {
        let mut framer = StreamFramer::default();
        framer.push(0, false, &[2, 0, 13, 0]);
        assert!(matches!(
            framer.next_message(),
            Err(CaptureError::InvalidLength {
                length: 2,
                minimum: 3
            })
        ));
        assert!(framer.is_desynced());
        assert!(framer.next_message().unwrap().is_none());
    }
}
