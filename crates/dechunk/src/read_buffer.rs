//! Read-only capability surface shared by reassembled and in-memory messages.

use bytes::Bytes;
use dechunk_buffers::Reader;

use crate::error::DechunkError;

/// A read-only, randomly addressable view of one logical message.
///
/// Offsets are logical message offsets. `get_*` methods read at an explicit
/// offset and leave the read cursor alone; `read_*` methods read at the read
/// cursor and advance it. All multi-byte values are big-endian.
///
/// Implementors expose no way to write to, re-slice or search the message.
pub trait ReadBuffer {
    /// Returns `len` bytes at logical `offset`, pulling in more of the
    /// message first if needed.
    fn view(&mut self, offset: u64, len: usize) -> Result<&[u8], DechunkError>;

    /// Logical offset of the read cursor.
    fn reader_index(&self) -> u64;

    /// Advances the read cursor by `len` bytes.
    fn skip_bytes(&mut self, len: usize) -> Result<(), DechunkError>;

    /// Remembers the read cursor for a later [`reset`](ReadBuffer::reset).
    fn mark(&mut self);

    /// Moves the read cursor back to the mark and clears it.
    fn reset(&mut self) -> Result<(), DechunkError>;

    /// Whether any byte of the message is still unread, buffered or not.
    /// Never blocks.
    fn has_more_readable(&self) -> bool;

    /// Unread bytes currently buffered. Says nothing about the message total.
    fn readable_bytes(&self) -> usize;

    /// Bytes currently held, read or not.
    fn capacity(&self) -> usize;

    /// Whether at least one more byte can be read, fetching if needed.
    fn is_readable(&mut self) -> Result<bool, DechunkError> {
        let index = self.reader_index();
        match self.view(index, 1) {
            Ok(_) => Ok(true),
            Err(err) if err.is_end_of_message() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn get_u8(&mut self, index: u64) -> Result<u8, DechunkError> {
        Ok(Reader::new(self.view(index, 1)?).u8()?)
    }

    fn get_i8(&mut self, index: u64) -> Result<i8, DechunkError> {
        Ok(Reader::new(self.view(index, 1)?).i8()?)
    }

    fn get_u16(&mut self, index: u64) -> Result<u16, DechunkError> {
        Ok(Reader::new(self.view(index, 2)?).u16()?)
    }

    fn get_i16(&mut self, index: u64) -> Result<i16, DechunkError> {
        Ok(Reader::new(self.view(index, 2)?).i16()?)
    }

    fn get_u24(&mut self, index: u64) -> Result<u32, DechunkError> {
        Ok(Reader::new(self.view(index, 3)?).u24()?)
    }

    fn get_i24(&mut self, index: u64) -> Result<i32, DechunkError> {
        Ok(Reader::new(self.view(index, 3)?).i24()?)
    }

    fn get_u32(&mut self, index: u64) -> Result<u32, DechunkError> {
        Ok(Reader::new(self.view(index, 4)?).u32()?)
    }

    fn get_i32(&mut self, index: u64) -> Result<i32, DechunkError> {
        Ok(Reader::new(self.view(index, 4)?).i32()?)
    }

    fn get_u64(&mut self, index: u64) -> Result<u64, DechunkError> {
        Ok(Reader::new(self.view(index, 8)?).u64()?)
    }

    fn get_i64(&mut self, index: u64) -> Result<i64, DechunkError> {
        Ok(Reader::new(self.view(index, 8)?).i64()?)
    }

    fn get_f32(&mut self, index: u64) -> Result<f32, DechunkError> {
        Ok(Reader::new(self.view(index, 4)?).f32()?)
    }

    fn get_f64(&mut self, index: u64) -> Result<f64, DechunkError> {
        Ok(Reader::new(self.view(index, 8)?).f64()?)
    }

    /// Copies `dst.len()` bytes starting at `index` into `dst`.
    fn get_bytes(&mut self, index: u64, dst: &mut [u8]) -> Result<(), DechunkError> {
        let src = self.view(index, dst.len())?;
        dst.copy_from_slice(src);
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8, DechunkError> {
        let index = self.reader_index();
        let value = self.get_u8(index)?;
        self.skip_bytes(1)?;
        Ok(value)
    }

    fn read_i8(&mut self) -> Result<i8, DechunkError> {
        let index = self.reader_index();
        let value = self.get_i8(index)?;
        self.skip_bytes(1)?;
        Ok(value)
    }

    fn read_u16(&mut self) -> Result<u16, DechunkError> {
        let index = self.reader_index();
        let value = self.get_u16(index)?;
        self.skip_bytes(2)?;
        Ok(value)
    }

    fn read_i16(&mut self) -> Result<i16, DechunkError> {
        let index = self.reader_index();
        let value = self.get_i16(index)?;
        self.skip_bytes(2)?;
        Ok(value)
    }

    fn read_u24(&mut self) -> Result<u32, DechunkError> {
        let index = self.reader_index();
        let value = self.get_u24(index)?;
        self.skip_bytes(3)?;
        Ok(value)
    }

    fn read_i24(&mut self) -> Result<i32, DechunkError> {
        let index = self.reader_index();
        let value = self.get_i24(index)?;
        self.skip_bytes(3)?;
        Ok(value)
    }

    fn read_u32(&mut self) -> Result<u32, DechunkError> {
        let index = self.reader_index();
        let value = self.get_u32(index)?;
        self.skip_bytes(4)?;
        Ok(value)
    }

    fn read_i32(&mut self) -> Result<i32, DechunkError> {
        let index = self.reader_index();
        let value = self.get_i32(index)?;
        self.skip_bytes(4)?;
        Ok(value)
    }

    fn read_u64(&mut self) -> Result<u64, DechunkError> {
        let index = self.reader_index();
        let value = self.get_u64(index)?;
        self.skip_bytes(8)?;
        Ok(value)
    }

    fn read_i64(&mut self) -> Result<i64, DechunkError> {
        let index = self.reader_index();
        let value = self.get_i64(index)?;
        self.skip_bytes(8)?;
        Ok(value)
    }

    fn read_f32(&mut self) -> Result<f32, DechunkError> {
        let index = self.reader_index();
        let value = self.get_f32(index)?;
        self.skip_bytes(4)?;
        Ok(value)
    }

    fn read_f64(&mut self) -> Result<f64, DechunkError> {
        let index = self.reader_index();
        let value = self.get_f64(index)?;
        self.skip_bytes(8)?;
        Ok(value)
    }

    /// Fills `dst` from the read cursor and advances past it.
    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<(), DechunkError> {
        let index = self.reader_index();
        self.get_bytes(index, dst)?;
        self.skip_bytes(dst.len())
    }

    /// Copies the next `len` bytes out into an owned buffer and advances past them.
    fn read_slice(&mut self, len: usize) -> Result<Bytes, DechunkError> {
        let index = self.reader_index();
        let bytes = Bytes::copy_from_slice(self.view(index, len)?);
        self.skip_bytes(len)?;
        Ok(bytes)
    }
}

/// A fully buffered message: nothing is ever fetched.
impl ReadBuffer for Reader<'_> {
    fn view(&mut self, offset: u64, len: usize) -> Result<&[u8], DechunkError> {
        let Ok(start) = usize::try_from(offset) else {
            return Err(DechunkError::EndOfMessage {
                offset,
                requested: len,
                available: 0,
            });
        };
        Ok(self.subarray(start, len)?)
    }

    fn reader_index(&self) -> u64 {
        self.position() as u64
    }

    fn skip_bytes(&mut self, len: usize) -> Result<(), DechunkError> {
        Ok(self.skip(len)?)
    }

    fn mark(&mut self) {
        Reader::mark(self);
    }

    fn reset(&mut self) -> Result<(), DechunkError> {
        Ok(Reader::reset(self)?)
    }

    fn has_more_readable(&self) -> bool {
        self.size() > 0
    }

    fn readable_bytes(&self) -> usize {
        self.size()
    }

    fn capacity(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        let mut data = vec![0xfe, 0x01, 0x02, 0xff, 0xff, 0xfd];
        data.extend_from_slice(&7u32.to_be_bytes());
        data.extend_from_slice(&(-9i64).to_be_bytes());
        data.extend_from_slice(&0.5f32.to_be_bytes());
        data
    }

    #[test]
    fn test_reader_sequential() {
        let data = sample();
        let mut buf = Reader::new(&data);
        assert_eq!(buf.read_i8().unwrap(), -2);
        assert_eq!(buf.read_u16().unwrap(), 0x0102);
        assert_eq!(buf.read_i24().unwrap(), -3);
        assert_eq!(buf.read_u32().unwrap(), 7);
        assert_eq!(buf.read_i64().unwrap(), -9);
        assert_eq!(buf.read_f32().unwrap(), 0.5);
        assert!(!buf.has_more_readable());
        assert!(!buf.is_readable().unwrap());
        assert!(buf.read_u8().unwrap_err().is_end_of_message());
    }

    #[test]
    fn test_reader_positional_does_not_move_cursor() {
        let data = sample();
        let mut buf = Reader::new(&data);
        assert_eq!(buf.get_u24(3).unwrap(), 0xfffffd);
        assert_eq!(buf.get_u32(6).unwrap(), 7);
        assert_eq!(buf.reader_index(), 0);
        assert_eq!(buf.read_u8().unwrap(), 0xfe);
    }

    #[test]
    fn test_reader_mark_reset() {
        let data = sample();
        let mut buf = Reader::new(&data);
        buf.skip_bytes(1).unwrap();
        ReadBuffer::mark(&mut buf);
        let mut head = [0u8; 2];
        buf.read_bytes(&mut head).unwrap();
        assert_eq!(head, [0x01, 0x02]);
        ReadBuffer::reset(&mut buf).unwrap();
        assert_eq!(buf.reader_index(), 1);
        assert!(matches!(
            ReadBuffer::reset(&mut buf),
            Err(DechunkError::NoMark)
        ));
    }

    #[test]
    fn test_reader_read_slice() {
        let data = b"hello world";
        let mut buf = Reader::new(data);
        assert_eq!(buf.read_slice(5).unwrap().as_ref(), b"hello");
        assert_eq!(buf.readable_bytes(), 6);
        assert_eq!(buf.capacity(), 11);
    }
}
