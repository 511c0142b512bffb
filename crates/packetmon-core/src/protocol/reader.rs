use super::error::DecodeError;

/// Forward-only cursor over one packet payload.
///
/// Every read is bounds-checked against the declared payload length before
/// the bytes are touched; multi-byte fields are little-endian.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    payload: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    /// Reader over `length` bytes of `buffer` starting at `offset`.
    ///
    /// # Examples
    /// ```
    /// use packetmon_core::FieldReader;
    ///
    /// let buffer = [0xff, 0x34, 0x12, 0xfe];
    /// let mut reader = FieldReader::new(&buffer, 1, 3).unwrap();
    /// assert_eq!(reader.read_u16().unwrap(), 0x1234);
    /// assert_eq!(reader.read_i8().unwrap(), -2);
    /// assert!(reader.read_u8().is_err());
    /// ```
    pub fn new(buffer: &'a [u8], offset: usize, length: usize) -> Result<Self, DecodeError> {
        let out_of_bounds = DecodeError::OutOfBounds {
            offset,
            length,
            buffer_len: buffer.len(),
        };
        let end = offset.checked_add(length).ok_or(out_of_bounds.clone())?;
        let payload = buffer.get(offset..end).ok_or(out_of_bounds)?;
        Ok(Self::over(payload))
    }

    /// Reader over an already validated payload slice.
    pub fn over(payload: &'a [u8]) -> Self {
        Self { payload, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.payload.len() - self.pos
    }

    /// Fail early when the payload cannot hold `needed` bytes in total.
    pub fn require_len(&self, needed: usize) -> Result<(), DecodeError> {
        if self.payload.len() < needed {
            return Err(DecodeError::Truncated {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let [byte] = self.take::<1>()?;
        Ok(byte)
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(i8::from_le_bytes(self.take::<1>()?))
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.take::<2>()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(i16::from_le_bytes(self.take::<2>()?))
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.pos.saturating_add(N);
        let bytes = self
            .payload
            .get(self.pos..end)
            .ok_or(DecodeError::Truncated {
                needed: end,
                actual: self.payload.len(),
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.pos = end;
        Ok(out)
    }
}
