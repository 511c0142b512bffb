//! Formatting collaborator.
//!
//! The decoding core never writes anything. `Monitor` owns the state the
//! decoders consult (players, tile entities, world size), classifies each
//! packet event, runs the matching decoder and writes text or JSON lines to
//! an injected sink.

mod format;
mod players;

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::capture::{CaptureEventSource, CaptureStats};
use crate::outbound::adapter::decode_outbound;
use crate::outbound::fields::WorldSize;
use crate::outbound::registry::EntityRecord;
use crate::protocol::classify::{Direction, NoiseClass, NoiseProfile};
use crate::protocol::error::DecodeError;
use crate::protocol::parser::decode_raw;
use crate::protocol::record::DecodedRecord;
use crate::source::{
    Broadcast, EventSource, MonitorEvent, PcapFileSource, SourceError, TraceFileSource,
    WireMessage,
};

pub use format::format_ts;
pub use players::PlayerDirectory;

use format::{JsonLine, Peers, failure_line, record_line, seen_line};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per packet event with output.
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorConfig {
    pub profile: NoiseProfile,
    /// Emit "packet seen" lines for suppressed types too.
    pub show_noise: bool,
    pub format: OutputFormat,
    /// World size until a `world` event says otherwise.
    pub world: WorldSize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonitorStats {
    pub events: u64,
    pub packets: u64,
    /// Entries written to the sink; a multi-line record counts once.
    pub lines: u64,
    pub suppressed: u64,
    pub decoded: u64,
    pub unstructured: u64,
    pub failures: u64,
}

/// What the monitor did with one event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Collaborator state was updated.
    State,
    Packet {
        tag: u8,
        direction: Direction,
        noise: NoiseClass,
        decode: Result<DecodedRecord, DecodeError>,
    },
}

impl EventOutcome {
    /// The decode error, unless it only reports a missing decoder.
    pub fn failure(&self) -> Option<&DecodeError> {
        match self {
            EventOutcome::Packet {
                decode: Err(err), ..
            } if !err.is_unstructured() => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct Monitor<W> {
    sink: W,
    config: MonitorConfig,
    players: PlayerDirectory,
    entities: HashMap<i32, EntityRecord>,
    world: WorldSize,
    stats: MonitorStats,
}

impl<W: Write> Monitor<W> {
    /// # Examples
    /// ```
    /// use packetmon_core::{Monitor, MonitorConfig, MonitorEvent, WireMessage};
    ///
    /// let mut monitor = Monitor::new(Vec::new(), MonitorConfig::default());
    /// monitor.handle(&MonitorEvent::Join { client: 0, name: "Ada".into() })?;
    /// monitor.handle(&MonitorEvent::Recv(WireMessage {
    ///     ts: None,
    ///     tag: 79,
    ///     client: 0,
    ///     buffer: vec![10, 0, 20, 0, 5, 0, 1, 0],
    ///     offset: 0,
    ///     length: None,
    /// }))?;
    /// let text = String::from_utf8(monitor.into_inner()).unwrap();
    /// assert_eq!(
    ///     text,
    ///     "-: [Recv] 79 (PlaceObject) from: 0 (Ada)\n\
    ///      -: \t\t[Recv] OBJpl @ (10, 20), type: 5, style: 1\n"
    /// );
    /// # Ok::<(), packetmon_core::MonitorError>(())
    /// ```
    pub fn new(sink: W, config: MonitorConfig) -> Self {
        Self {
            sink,
            config,
            players: PlayerDirectory::default(),
            entities: HashMap::new(),
            world: config.world,
            stats: MonitorStats::default(),
        }
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    pub fn players(&self) -> &PlayerDirectory {
        &self.players
    }

    pub fn world(&self) -> WorldSize {
        self.world
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    pub fn handle(&mut self, event: &MonitorEvent) -> Result<EventOutcome, MonitorError> {
        self.stats.events += 1;
        match event {
            MonitorEvent::World { width, height } => {
                self.world = WorldSize {
                    width: *width,
                    height: *height,
                };
            }
            MonitorEvent::Join { client, name } => self.players.join(*client, name.as_str()),
            MonitorEvent::Leave { client } => self.players.leave(*client),
            MonitorEvent::TileEntitySet { id, entity } => {
                self.entities.insert(*id, entity.clone());
            }
            MonitorEvent::TileEntityRemove { id } => {
                self.entities.remove(id);
            }
            MonitorEvent::Recv(message) => return self.handle_wire(message, Direction::Inbound),
            MonitorEvent::SendRaw(message) => {
                return self.handle_wire(message, Direction::Outbound);
            }
            MonitorEvent::Send(broadcast) => return self.handle_broadcast(broadcast),
        }
        Ok(EventOutcome::State)
    }

    /// Drain `source`, calling `observe` after every event.
    pub fn run<S, F>(&mut self, source: &mut S, mut observe: F) -> Result<MonitorStats, MonitorError>
    where
        S: EventSource + ?Sized,
        F: FnMut(&MonitorEvent, &EventOutcome),
    {
        while let Some(event) = source.next_event()? {
            let outcome = self.handle(&event)?;
            observe(&event, &outcome);
        }
        self.sink.flush()?;
        Ok(self.stats)
    }

    fn handle_wire(
        &mut self,
        message: &WireMessage,
        direction: Direction,
    ) -> Result<EventOutcome, MonitorError> {
        let decode = message
            .view()
            .and_then(|view| decode_raw(&view, direction));
        self.emit(
            message.ts,
            message.tag,
            direction,
            Peers::Client(message.client),
            decode,
        )
    }

    fn handle_broadcast(&mut self, broadcast: &Broadcast) -> Result<EventOutcome, MonitorError> {
        let decode = decode_outbound(broadcast.tag, &broadcast.fields, self.world, &self.entities);
        let peers = Peers::Broadcast {
            ignore: broadcast.fields.ignore_client,
            remote: broadcast.fields.remote_client,
        };
        self.emit(broadcast.ts, broadcast.tag, Direction::Outbound, peers, decode)
    }

    fn emit(
        &mut self,
        ts: Option<f64>,
        tag: u8,
        direction: Direction,
        peers: Peers,
        decode: Result<DecodedRecord, DecodeError>,
    ) -> Result<EventOutcome, MonitorError> {
        self.stats.packets += 1;
        let noise = self.config.profile.classify(tag, direction);
        let show_seen = noise == NoiseClass::Routine || self.config.show_noise;
        if !show_seen {
            self.stats.suppressed += 1;
        }
        let failure = match &decode {
            Ok(_) => {
                self.stats.decoded += 1;
                None
            }
            Err(err) if err.is_unstructured() => {
                self.stats.unstructured += 1;
                None
            }
            Err(err) => {
                self.stats.failures += 1;
                Some(err)
            }
        };

        let mut entries = Vec::with_capacity(2);
        match self.config.format {
            OutputFormat::Text => {
                let stamp = format_ts(ts);
                if show_seen {
                    entries.push(seen_line(&stamp, direction, tag, peers, &self.players));
                }
                match (&decode, failure) {
                    (Ok(record), _) => entries.push(record_line(&stamp, direction, record)),
                    (Err(_), Some(err)) => {
                        entries.push(failure_line(&stamp, direction, tag, err));
                    }
                    (Err(_), None) => {}
                }
            }
            OutputFormat::Json => {
                let record = decode.as_ref().ok();
                if show_seen || record.is_some() || failure.is_some() {
                    let mut line = JsonLine::new(ts, direction, tag, noise, peers, &self.players);
                    line.record = record;
                    line.error = failure.map(ToString::to_string);
                    entries.push(serde_json::to_string(&line)?);
                }
            }
        }

        for entry in &entries {
            writeln!(self.sink, "{entry}")?;
        }
        self.stats.lines += entries.len() as u64;

        Ok(EventOutcome::Packet {
            tag,
            direction,
            noise,
            decode,
        })
    }
}

/// Replay a JSON-lines hook trace through a fresh monitor.
pub fn replay_trace_file<W: Write>(
    path: &Path,
    sink: W,
    config: MonitorConfig,
) -> Result<MonitorStats, MonitorError> {
    let mut source = TraceFileSource::open(path)?;
    Monitor::new(sink, config).run(&mut source, |_, _| {})
}

/// Monitor game traffic on `server_port` from a pcap/pcapng capture.
pub fn monitor_capture_file<W: Write>(
    path: &Path,
    server_port: u16,
    sink: W,
    config: MonitorConfig,
) -> Result<(MonitorStats, CaptureStats), MonitorError> {
    let mut source = CaptureEventSource::new(PcapFileSource::open(path)?, server_port);
    let stats = Monitor::new(sink, config).run(&mut source, |_, _| {})?;
    Ok((stats, source.stats()))
}
