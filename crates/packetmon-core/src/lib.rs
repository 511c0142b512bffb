//! packetmon core library for Terraria packet monitoring.
//!
//! This crate implements the decoding core used by the CLI: event sources
//! (hook traces or pcap captures) feed the monitor, which classifies each
//! packet, drives the protocol decoders (layout/reader/parser) or the
//! outbound field adapter, and writes one line per observation.
//! Decoding is byte-oriented and side-effect free; all file access lives in
//! `source`, all output in `monitor`.
//!
//! Invariants:
//! - Decoders never read outside the declared payload window.
//! - A truncated payload yields an error, never a partial record.
//! - Classification and decoding are independent: suppressing the generic
//!   line never suppresses a structured decode.
//!
//! # Examples
//! ```no_run
//! use std::io;
//! use std::path::Path;
//!
//! use packetmon_core::{MonitorConfig, replay_trace_file};
//!
//! let stats = replay_trace_file(Path::new("session.jsonl"), io::stdout(), MonitorConfig::default())?;
//! println!("decoded: {}", stats.decoded);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod capture;
pub mod monitor;
pub mod outbound;
pub mod protocol;
pub mod source;

pub use capture::{CaptureError, CaptureEventSource, CaptureStats};
pub use monitor::{
    EventOutcome, Monitor, MonitorConfig, MonitorError, MonitorStats, OutputFormat,
    PlayerDirectory, format_ts, monitor_capture_file, replay_trace_file,
};
pub use outbound::adapter::decode_outbound;
pub use outbound::fields::{NO_CLIENT, OutboundFields, WorldSize};
pub use outbound::registry::{EntityRecord, ItemStack, TileEntityRegistry};
pub use protocol::classify::{
    DecoderKind, Direction, NoiseClass, NoiseProfile, classify, decoder_for, packet_name,
};
pub use protocol::error::DecodeError;
pub use protocol::parser::decode_raw;
pub use protocol::reader::FieldReader;
pub use protocol::record::{
    DecodedRecord, ItemFrameState, ObjectPlacement, TileEdit, TileEntityPlacement,
    TileEntityUpdate, TileSquare, TileSquareBroadcast,
};
pub use protocol::view::RawPacketView;
pub use source::{
    Broadcast, EventSource, LinkFrame, MonitorEvent, PacketSource, PcapFileSource, SourceError,
    TraceFileSource, WireMessage,
};
