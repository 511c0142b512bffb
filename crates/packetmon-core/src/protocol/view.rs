use super::error::DecodeError;
use super::reader::FieldReader;

/// Immutable view of one packet payload inside a larger receive buffer.
///
/// Construction checks `offset + length <= buffer.len()`, so readers built
/// from a view never need to re-validate the window.
#[derive(Debug, Clone, Copy)]
pub struct RawPacketView<'a> {
    tag: u8,
    buffer: &'a [u8],
    offset: usize,
    length: usize,
}

impl<'a> RawPacketView<'a> {
    /// # Examples
    /// ```
    /// use packetmon_core::RawPacketView;
    ///
    /// let buffer = [0u8; 8];
    /// assert!(RawPacketView::new(17, &buffer, 2, 6).is_ok());
    /// assert!(RawPacketView::new(17, &buffer, 2, 7).is_err());
    /// ```
    pub fn new(
        tag: u8,
        buffer: &'a [u8],
        offset: usize,
        length: usize,
    ) -> Result<Self, DecodeError> {
        FieldReader::new(buffer, offset, length)?;
        Ok(Self {
            tag,
            buffer,
            offset,
            length,
        })
    }

    /// View over a whole buffer holding only the payload.
    pub fn payload(tag: u8, payload: &'a [u8]) -> Self {
        Self {
            tag,
            buffer: payload,
            offset: 0,
            length: payload.len(),
        }
    }

    /// View described the way host receive hooks describe a message.
    ///
    /// `index` points just past the type byte and `message_length` counts
    /// the type byte, so the payload spans `message_length - 1` bytes.
    ///
    /// # Examples
    /// ```
    /// use packetmon_core::RawPacketView;
    ///
    /// // [len lo, len hi, type, payload...]
    /// let buffer = [0x06, 0x00, 87, 0x0a, 0x00, 0x14];
    /// let view = RawPacketView::from_hook(87, &buffer, 3, 4).unwrap();
    /// assert_eq!(view.bytes(), &[0x0a, 0x00, 0x14]);
    /// ```
    pub fn from_hook(
        tag: u8,
        buffer: &'a [u8],
        index: usize,
        message_length: usize,
    ) -> Result<Self, DecodeError> {
        let length = message_length
            .checked_sub(1)
            .ok_or(DecodeError::Truncated {
                needed: 1,
                actual: message_length,
            })?;
        Self::new(tag, buffer, index, length)
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Payload bytes covered by the view.
    pub fn bytes(&self) -> &'a [u8] {
        &self.buffer[self.offset..self.offset + self.length]
    }

    pub fn reader(&self) -> FieldReader<'a> {
        FieldReader::over(self.bytes())
    }
}
