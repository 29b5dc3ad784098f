//! Decoder for the chain's linear binary codec, used by atomic transactions
//! embedded in block extra-data. All integers are big-endian and slices are
//! prefixed by a `u32` element count.

pub mod atomic;
pub mod ids;

use crate::models::errors::DecodeError;

pub const CODEC_VERSION: u16 = 0;

pub(crate) struct Reader<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.offset
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < needed {
            return Err(DecodeError::UnexpectedEof {
                offset: self.offset,
                needed,
            });
        }
        let bytes = &self.input[self.offset..self.offset + needed];
        self.offset += needed;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.read_array().map(u32::from_be_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        self.read_array().map(u64::from_be_bytes)
    }

    /// Reads a slice length, rejecting counts that cannot possibly fit in
    /// the rest of the input given each element's minimum encoded size.
    pub fn read_len(&mut self, min_element_size: usize) -> Result<usize, DecodeError> {
        let offset = self.offset;
        let len = self.read_u32()?;
        let required = (len as usize).saturating_mul(min_element_size);
        if required > self.remaining() {
            return Err(DecodeError::OversizedSlice { offset, len });
        }
        Ok(len as usize)
    }

    pub fn read_vec<T>(
        &mut self,
        min_element_size: usize,
        mut read: impl FnMut(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<Vec<T>, DecodeError> {
        let len = self.read_len(min_element_size)?;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(read(self)?);
        }
        Ok(out)
    }

    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}
