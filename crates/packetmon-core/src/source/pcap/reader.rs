use std::io::{Read, Seek, SeekFrom};

use pcap_parser::Linktype;

use super::error::PcapSourceError;
use super::layout;

/// Peek the first four bytes of a capture and rewind.
pub fn read_magic_and_rewind<R: Read + Seek>(reader: &mut R) -> Result<[u8; 4], PcapSourceError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(magic)
}

pub fn is_pcapng_magic(magic: &[u8; 4]) -> bool {
    magic == &layout::PCAPNG_MAGIC
}

/// Linktype of a PCAPNG interface; unknown interfaces are treated as Ethernet.
pub fn linktype_for_interface(linktypes: &[Linktype], if_id: u32) -> Linktype {
    linktypes
        .get(if_id as usize)
        .copied()
        .unwrap_or(Linktype::ETHERNET)
}

/// PCAPNG split timestamp (microsecond resolution) to seconds.
pub fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32) -> f64 {
    let micros = (u64::from(ts_high) << 32) | u64::from(ts_low);
    micros as f64 / layout::MICROS_PER_SECOND
}

pub fn legacy_ts_to_seconds(ts_sec: u32, ts_usec: u32) -> f64 {
    f64::from(ts_sec) + f64::from(ts_usec) / layout::MICROS_PER_SECOND
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn magic_is_read_without_consuming() {
        let mut cursor = Cursor::new(vec![0x0a, 0x0d, 0x0d, 0x0a, 0x01]);
        let magic = read_magic_and_rewind(&mut cursor).unwrap();
        assert!(is_pcapng_magic(&magic));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn short_input_fails_magic_read() {
        let mut cursor = Cursor::new(vec![0x0a, 0x0d]);
        assert!(matches!(
            read_magic_and_rewind(&mut cursor),
            Err(PcapSourceError::Io(_))
        ));
    }

    #[test]
    fn legacy_magic_is_not_pcapng() {
        assert!(!is_pcapng_magic(&[0xd4, 0xc3, 0xb2, 0xa1]));
    }

    #[test]
    fn interface_linktype_defaults_to_ethernet() {
        let linktypes = [Linktype::RAW];
        assert_eq!(linktype_for_interface(&linktypes, 0), Linktype::RAW);
        assert_eq!(linktype_for_interface(&linktypes, 3), Linktype::ETHERNET);
    }

    #[test]
    fn timestamps_convert_to_seconds() {
        assert!((pcapng_ts_to_seconds(0, 1_500_000) - 1.5).abs() < f64::EPSILON);
        assert!((legacy_ts_to_seconds(2, 250_000) - 2.25).abs() < f64::EPSILON);
    }
}
