use std::fs::File;
use std::path::Path;

use pcap_parser::{
    Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader,
    traits::PcapReaderIterator,
};

use crate::source::{LinkFrame, PacketSource, SourceError};

use super::error::PcapSourceError;
use super::layout;
use super::reader::{
    is_pcapng_magic, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
    read_magic_and_rewind,
};

/// Capture file source producing link-layer frames in file order.
pub struct PcapFileSource {
    format: CaptureFormat,
}

enum CaptureFormat {
    Legacy {
        reader: LegacyPcapReader<File>,
        linktype: Linktype,
    },
    Ng {
        reader: PcapNGReader<File>,
        interfaces: Vec<Linktype>,
    },
}

impl PcapFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let mut file = File::open(path)?;
        let magic = read_magic_and_rewind(&mut file)?;
        let format = if is_pcapng_magic(&magic) {
            CaptureFormat::Ng {
                reader: PcapNGReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
                    .map_err(|e| PcapSourceError::pcap("pcapng reader init", e))?,
                interfaces: Vec::new(),
            }
        } else {
            CaptureFormat::Legacy {
                reader: LegacyPcapReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
                    .map_err(|e| PcapSourceError::pcap("pcap reader init", e))?,
                linktype: Linktype::ETHERNET,
            }
        };
        Ok(Self { format })
    }
}

impl PacketSource for PcapFileSource {
    fn next_frame(&mut self) -> Result<Option<LinkFrame>, SourceError> {
        let frame = match &mut self.format {
            CaptureFormat::Legacy { reader, linktype } => next_legacy(reader, linktype)?,
            CaptureFormat::Ng { reader, interfaces } => next_ng(reader, interfaces)?,
        };
        Ok(frame)
    }
}

fn next_legacy(
    reader: &mut LegacyPcapReader<File>,
    linktype: &mut Linktype,
) -> Result<Option<LinkFrame>, PcapSourceError> {
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                let frame = match block {
                    PcapBlockOwned::LegacyHeader(header) => {
                        *linktype = header.network;
                        None
                    }
                    PcapBlockOwned::Legacy(packet) => Some(LinkFrame {
                        ts: Some(legacy_ts_to_seconds(packet.ts_sec, packet.ts_usec)),
                        linktype: *linktype,
                        data: packet.data.to_vec(),
                    }),
                    _ => None,
                };
                reader.consume(offset);
                if frame.is_some() {
                    return Ok(frame);
                }
            }
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::Incomplete(_)) => {
                reader
                    .refill()
                    .map_err(|e| PcapSourceError::pcap("pcap reader refill", e))?;
            }
            Err(e) => return Err(PcapSourceError::pcap("pcap reader next", e)),
        }
    }
}

fn next_ng(
    reader: &mut PcapNGReader<File>,
    interfaces: &mut Vec<Linktype>,
) -> Result<Option<LinkFrame>, PcapSourceError> {
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                let frame = match block {
                    PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                        interfaces.clear();
                        None
                    }
                    PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                        interfaces.push(intf.linktype);
                        None
                    }
                    PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => Some(LinkFrame {
                        ts: Some(pcapng_ts_to_seconds(packet.ts_high, packet.ts_low)),
                        linktype: linktype_for_interface(interfaces, packet.if_id),
                        data: packet.data.to_vec(),
                    }),
                    _ => None,
                };
                reader.consume(offset);
                if frame.is_some() {
                    return Ok(frame);
                }
            }
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::Incomplete(_)) => {
                reader
                    .refill()
                    .map_err(|e| PcapSourceError::pcap("pcapng reader refill", e))?;
            }
            Err(e) => return Err(PcapSourceError::pcap("pcapng reader next", e)),
        }
    }
}
