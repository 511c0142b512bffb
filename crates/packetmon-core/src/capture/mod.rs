//! Live-capture adaptation.
//!
//! Turns link-layer frames from a [`PacketSource`] into the same
//! [`MonitorEvent`]s a hook trace produces: TCP segments on the server port
//! are reassembled per flow, split into length-prefixed game messages and
//! exposed as hook-shaped [`WireMessage`]s.

pub mod error;
pub mod framer;
pub mod tcp;

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;

use serde::Serialize;

use crate::protocol::classify::Direction;
use crate::protocol::layout::{FRAME_HEADER_LEN, FRAME_LENGTH_PREFIX};
use crate::protocol::view::RawPacketView;
use crate::source::{EventSource, LinkFrame, MonitorEvent, PacketSource, SourceError, WireMessage};

pub use error::CaptureError;
pub use framer::{FramedMessage, MAX_REORDER_BYTES, SegmentOutcome, StreamFramer};
pub use tcp::{TcpSegment, parse_tcp_segment};

/// Counters describing how much of a capture could be followed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureStats {
    pub frames: u64,
    pub skipped_frames: u64,
    pub segments: u64,
    pub messages: u64,
    /// Segments that arrived ahead of missing bytes.
    pub reordered: u64,
    pub retransmits: u64,
    pub gaps: u64,
    pub desynced: u64,
}

/// [`EventSource`] over captured game traffic.
///
/// Clients are numbered by first appearance, starting at 0. Frames that are
/// not TCP or do not touch the server port are counted and skipped.
pub struct CaptureEventSource<S> {
    source: S,
    server_port: u16,
    clients: HashMap<SocketAddr, i32>,
    flows: HashMap<(SocketAddr, Direction), StreamFramer>,
    pending: VecDeque<MonitorEvent>,
    stats: CaptureStats,
}

impl<S: PacketSource> CaptureEventSource<S> {
    pub fn new(source: S, server_port: u16) -> Self {
        Self {
            source,
            server_port,
            clients: HashMap::new(),
            flows: HashMap::new(),
            pending: VecDeque::new(),
            stats: CaptureStats::default(),
        }
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    fn client_id(&mut self, peer: SocketAddr) -> i32 {
        let next = i32::try_from(self.clients.len()).unwrap_or(i32::MAX);
        *self.clients.entry(peer).or_insert(next)
    }

    fn ingest(&mut self, frame: &LinkFrame) {
        let segment = match parse_tcp_segment(frame.linktype, &frame.data) {
            Ok(Some(segment)) => segment,
            Ok(None) | Err(_) => {
                self.stats.skipped_frames += 1;
                return;
            }
        };
        let (peer, direction) = if segment.dst.port() == self.server_port {
            (segment.src, Direction::Inbound)
        } else if segment.src.port() == self.server_port {
            (segment.dst, Direction::Outbound)
        } else {
            self.stats.skipped_frames += 1;
            return;
        };
        self.stats.segments += 1;

        let client = self.client_id(peer);
        let framer = self.flows.entry((peer, direction)).or_default();
        match framer.push(segment.seq, segment.syn, segment.payload) {
            SegmentOutcome::Accepted | SegmentOutcome::Desynced => {}
            SegmentOutcome::OutOfOrder => self.stats.reordered += 1,
            SegmentOutcome::Retransmit => self.stats.retransmits += 1,
            SegmentOutcome::Gap => self.stats.gaps += 1,
        }

        loop {
            match framer.next_message() {
                Ok(Some(message)) => {
                    self.stats.messages += 1;
                    self.pending
                        .push_back(wire_event(message, frame.ts, client, direction));
                }
                Ok(None) => break,
                Err(_) => {
                    self.stats.desynced += 1;
                    break;
                }
            }
        }

        let hole = framer.has_hole();
        if segment.fin || segment.rst {
            // Bytes still missing at close will never arrive.
            if hole {
                self.stats.gaps += 1;
            }
            self.flows.remove(&(peer, direction));
        }
    }
}

impl<S: PacketSource> EventSource for CaptureEventSource<S> {
    fn next_event(&mut self) -> Result<Option<MonitorEvent>, SourceError> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            let Some(frame) = self.source.next_frame()? else {
                return Ok(None);
            };
            self.stats.frames += 1;
            self.ingest(&frame);
        }
    }
}

fn wire_event(
    message: FramedMessage,
    ts: Option<f64>,
    client: i32,
    direction: Direction,
) -> MonitorEvent {
    let message_length = message.bytes.len() - FRAME_LENGTH_PREFIX;
    let (offset, length) =
        match RawPacketView::from_hook(message.tag, &message.bytes, FRAME_HEADER_LEN, message_length)
        {
            Ok(view) => (view.offset(), view.len()),
            Err(_) => (FRAME_HEADER_LEN, 0),
        };
    let wire = WireMessage {
        ts,
        tag: message.tag,
        client,
        buffer: message.bytes,
        offset,
        length: Some(length),
    };
    match direction {
        Direction::Inbound => MonitorEvent::Recv(wire),
        Direction::Outbound => MonitorEvent::SendRaw(wire),
    }
}
