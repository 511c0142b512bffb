//! PCAP/PCAPNG capture source.
//!
//! Yields raw link-layer frames with their capture timestamps. Game-level
//! reassembly happens in `capture`; this module only handles file access
//! and block parsing.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::PcapFileSource;
