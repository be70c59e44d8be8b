//! Chunk envelope: a leading continuation marker byte followed by payload.

use bytes::{Buf, Bytes};

/// Marker byte of the final chunk of a message.
pub const CONTINUATION_LAST: u8 = 0x00;
/// Marker byte of a chunk that is followed by at least one more chunk.
pub const CONTINUATION_MORE: u8 = 0x01;

/// Whether more chunks follow for the current logical message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Continuation {
    Last = CONTINUATION_LAST,
    More = CONTINUATION_MORE,
}

impl Continuation {
    pub fn is_more(self) -> bool {
        matches!(self, Continuation::More)
    }
}

impl TryFrom<u8> for Continuation {
    type Error = ChunkError;

    fn try_from(v: u8) -> Result<Self, ChunkError> {
        match v {
            CONTINUATION_LAST => Ok(Self::Last),
            CONTINUATION_MORE => Ok(Self::More),
            other => Err(ChunkError::UnknownMarker(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    #[error("empty chunk has no continuation marker")]
    Empty,
    #[error("unknown continuation marker 0x{0:02x}")]
    UnknownMarker(u8),
}

/// One transport-delivered unit of a logical message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    continuation: Continuation,
    payload: Bytes,
}

impl Chunk {
    /// Splits the marker byte off a raw chunk.
    ///
    /// The payload shares the raw chunk's storage; nothing is copied.
    pub fn decode(mut raw: Bytes) -> Result<Self, ChunkError> {
        if raw.is_empty() {
            return Err(ChunkError::Empty);
        }
        let continuation = Continuation::try_from(raw.get_u8())?;
        Ok(Self {
            continuation,
            payload: raw,
        })
    }

    pub fn continuation(&self) -> Continuation {
        self.continuation
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_last() {
        let chunk = Chunk::decode(Bytes::from_static(b"\x00EF")).unwrap();
        assert_eq!(chunk.continuation(), Continuation::Last);
        assert_eq!(chunk.payload().as_ref(), b"EF");
    }

    #[test]
    fn test_decode_more_empty_payload() {
        let chunk = Chunk::decode(Bytes::from_static(b"\x01")).unwrap();
        assert!(chunk.continuation().is_more());
        assert!(chunk.payload().is_empty());
    }

    #[test]
    fn test_decode_shares_storage() {
        let raw = Bytes::from(vec![CONTINUATION_LAST, 1, 2, 3]);
        let tail = raw.as_ptr().wrapping_add(1);
        let chunk = Chunk::decode(raw).unwrap();
        assert_eq!(chunk.payload().as_ptr(), tail);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(Chunk::decode(Bytes::new()), Err(ChunkError::Empty));
        assert_eq!(
            Chunk::decode(Bytes::from_static(b"\x07abc")),
            Err(ChunkError::UnknownMarker(0x07))
        );
    }
}
