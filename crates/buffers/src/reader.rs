//! Binary buffer reader with cursor tracking.

use crate::BufferError;

/// A bounds-checked binary reader over a byte slice.
///
/// The reader maintains a cursor position and an optional mark, and provides
/// big-endian methods for reading the integer and floating point widths used
/// by wire formats. Every read that would run past the end of the slice fails
/// with [`BufferError::EndOfBuffer`] and leaves the cursor untouched.
///
/// # Example
///
/// ```
/// use dechunk_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = Reader::new(&data);
///
/// reader.mark();
/// assert_eq!(reader.u8(), Ok(0x01));
/// reader.reset().unwrap();
/// assert_eq!(reader.u32(), Ok(0x01020304));
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    uint8: &'a [u8],
    x: usize,
    mark: Option<usize>,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self {
            uint8,
            x: 0,
            mark: None,
        }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.x
    }

    /// Total length of the underlying slice.
    pub fn len(&self) -> usize {
        self.uint8.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uint8.is_empty()
    }

    /// Returns the number of remaining bytes.
    pub fn size(&self) -> usize {
        self.uint8.len() - self.x
    }

    /// Saves the current cursor position.
    pub fn mark(&mut self) {
        self.mark = Some(self.x);
    }

    /// Rewinds the cursor to the marked position and clears the mark.
    pub fn reset(&mut self) -> Result<(), BufferError> {
        let mark = self.mark.take().ok_or(BufferError::NoMark)?;
        self.x = mark;
        Ok(())
    }

    /// Returns `len` bytes starting at absolute `offset` without moving the cursor.
    pub fn subarray(&self, offset: usize, len: usize) -> Result<&'a [u8], BufferError> {
        let available = self.uint8.len().saturating_sub(offset);
        if offset > self.uint8.len() || len > available {
            return Err(BufferError::EndOfBuffer {
                offset,
                requested: len,
                available,
            });
        }
        Ok(&self.uint8[offset..offset + len])
    }

    /// Advances the cursor by the given number of bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        self.buf(length).map(|_| ())
    }

    /// Returns a subarray of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        let bin = self.subarray(self.x, size)?;
        self.x += size;
        Ok(bin)
    }

    #[inline]
    fn take<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.buf(N)?);
        Ok(out)
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        let [b] = self.take::<1>()?;
        Ok(b)
    }

    /// Reads a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self) -> Result<i8, BufferError> {
        Ok(i8::from_be_bytes(self.take()?))
    }

    /// Reads an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        Ok(u16::from_be_bytes(self.take()?))
    }

    /// Reads a signed 16-bit integer (big-endian).
    #[inline]
    pub fn i16(&mut self) -> Result<i16, BufferError> {
        Ok(i16::from_be_bytes(self.take()?))
    }

    /// Reads an unsigned 24-bit integer (big-endian).
    #[inline]
    pub fn u24(&mut self) -> Result<u32, BufferError> {
        let [a, b, c] = self.take::<3>()?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    /// Reads a signed 24-bit integer (big-endian), sign-extended to 32 bits.
    #[inline]
    pub fn i24(&mut self) -> Result<i32, BufferError> {
        Ok(((self.u24()? << 8) as i32) >> 8)
    }

    /// Reads an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        Ok(u32::from_be_bytes(self.take()?))
    }

    /// Reads a signed 32-bit integer (big-endian).
    #[inline]
    pub fn i32(&mut self) -> Result<i32, BufferError> {
        Ok(i32::from_be_bytes(self.take()?))
    }

    /// Reads an unsigned 64-bit integer (big-endian).
    #[inline]
    pub fn u64(&mut self) -> Result<u64, BufferError> {
        Ok(u64::from_be_bytes(self.take()?))
    }

    /// Reads a signed 64-bit integer (big-endian).
    #[inline]
    pub fn i64(&mut self) -> Result<i64, BufferError> {
        Ok(i64::from_be_bytes(self.take()?))
    }

    /// Reads a 32-bit floating point number (big-endian).
    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        Ok(f32::from_be_bytes(self.take()?))
    }

    /// Reads a 64-bit floating point number (big-endian).
    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        Ok(f64::from_be_bytes(self.take()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u8(), Ok(0x01));
        assert_eq!(reader.u8(), Ok(0x02));
        assert_eq!(reader.u8(), Ok(0x03));
    }

    #[test]
    fn test_u16() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u16(), Ok(0x0102));
        assert_eq!(reader.u16(), Ok(0x0304));
    }

    #[test]
    fn test_u24_and_i24() {
        let data = [0x01, 0x02, 0x03, 0xff, 0xff, 0xfe];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u24(), Ok(0x010203));
        assert_eq!(reader.i24(), Ok(-2));
    }

    #[test]
    fn test_u32() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u32(), Ok(0x01020304));
    }

    #[test]
    fn test_floats() {
        let mut data = Vec::new();
        data.extend_from_slice(&1.5f32.to_be_bytes());
        data.extend_from_slice(&(-2.25f64).to_be_bytes());
        let mut reader = Reader::new(&data);
        assert_eq!(reader.f32(), Ok(1.5));
        assert_eq!(reader.f64(), Ok(-2.25));
    }

    #[test]
    fn test_skip() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = Reader::new(&data);
        reader.skip(2).unwrap();
        assert_eq!(reader.u8(), Ok(0x03));
        assert_eq!(reader.size(), 1);
    }

    #[test]
    fn test_short_read_leaves_cursor() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = Reader::new(&data);
        reader.u8().unwrap();
        assert_eq!(
            reader.u32(),
            Err(BufferError::EndOfBuffer {
                offset: 1,
                requested: 4,
                available: 2,
            })
        );
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.u16(), Ok(0x0203));
    }

    #[test]
    fn test_subarray_past_end() {
        let data = [0x01, 0x02];
        let reader = Reader::new(&data);
        assert_eq!(reader.subarray(1, 1), Ok(&data[1..]));
        assert!(reader.subarray(2, 0).is_ok());
        assert!(reader.subarray(5, 0).is_err());
        assert!(reader.subarray(5, 1).is_err());
    }

    #[test]
    fn test_mark_reset() {
        let data = [0x0a, 0x0b, 0x0c];
        let mut reader = Reader::new(&data);
        reader.u8().unwrap();
        reader.mark();
        reader.u16().unwrap();
        reader.reset().unwrap();
        assert_eq!(reader.u8(), Ok(0x0b));
        assert_eq!(reader.reset(), Err(BufferError::NoMark));
    }
}
