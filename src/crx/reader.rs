use std::io::Read;

use super::errors::CrxResult;

/// Forward-only little-endian reader over a byte stream.
///
/// Never reads past what the caller asks for, so whatever follows the header
/// is still available on the underlying stream afterwards.
pub struct CrxReader<'a, R: Read + ?Sized> {
    input: &'a mut R,
}

impl<'a, R: Read + ?Sized> CrxReader<'a, R> {
    pub fn new(input: &'a mut R) -> Self {
        Self { input }
    }

    pub fn read_array<const N: usize>(&mut self) -> CrxResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.input.read_exact(&mut buf)?;

        Ok(buf)
    }

    pub fn read_u32_le(&mut self) -> CrxResult<u32> {
        let bytes = self.read_array::<4>()?;

        Ok(u32::from_le_bytes(bytes))
    }

    /// Reads exactly `len` bytes. Callers bound `len` before calling.
    pub fn read_bytes(&mut self, len: usize) -> CrxResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.input.read_exact(&mut buf)?;

        Ok(buf)
    }
}
