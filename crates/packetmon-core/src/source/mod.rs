//! Event sources.
//!
//! Sources own all file access. `TraceFileSource` replays recorded hook
//! events; `PcapFileSource` yields link-layer frames which the `capture`
//! layer turns into game messages.

mod event;
pub(crate) mod pcap;
mod trace;

pub use event::{Broadcast, MonitorEvent, WireMessage};
pub use pcap::PcapFileSource;
pub use trace::TraceFileSource;

use pcap_parser::Linktype;
use thiserror::Error;

/// One captured link-layer frame.
#[derive(Debug, Clone)]
pub struct LinkFrame {
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

pub trait PacketSource {
    fn next_frame(&mut self) -> Result<Option<LinkFrame>, SourceError>;
}

pub trait EventSource {
    fn next_event(&mut self) -> Result<Option<MonitorEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PCAP parse error: {0}")]
    Pcap(String),
    #[error("trace line {line}: {message}")]
    Trace { line: usize, message: String },
}

impl From<pcap::error::PcapSourceError> for SourceError {
    fn from(value: pcap::error::PcapSourceError) -> Self {
        match value {
            pcap::error::PcapSourceError::Io(err) => SourceError::Io(err),
            pcap::error::PcapSourceError::Pcap { context, message } => {
                SourceError::Pcap(format!("{context}: {message}"))
            }
        }
    }
}
