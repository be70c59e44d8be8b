//! Reassembly error type.

use dechunk_buffers::BufferError;

use crate::chunk::ChunkError;
use crate::transport::TransportError;

/// The two failure categories a caller has to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The next chunk could not be obtained; fatal to the current message.
    Communication,
    /// The calling layer used the buffer wrongly, e.g. read past the end.
    Misuse,
}

#[derive(Debug, thiserror::Error)]
pub enum DechunkError {
    #[error("communication failure: {0}")]
    Communication(#[from] TransportError),
    #[error("malformed chunk: {0}")]
    MalformedChunk(#[from] ChunkError),
    #[error("end of message: {requested} bytes requested at offset {offset}, {available} available")]
    EndOfMessage {
        offset: u64,
        requested: usize,
        available: u64,
    },
    #[error("offset {offset} was already discarded, window starts at {base}")]
    Discarded { offset: u64, base: u64 },
    #[error("reset without a marked position")]
    NoMark,
}

impl DechunkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DechunkError::Communication(_) | DechunkError::MalformedChunk(_) => {
                ErrorKind::Communication
            }
            DechunkError::EndOfMessage { .. }
            | DechunkError::Discarded { .. }
            | DechunkError::NoMark => ErrorKind::Misuse,
        }
    }

    pub fn is_end_of_message(&self) -> bool {
        matches!(self, DechunkError::EndOfMessage { .. })
    }
}

impl From<BufferError> for DechunkError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer {
                offset,
                requested,
                available,
            } => DechunkError::EndOfMessage {
                offset: offset as u64,
                requested,
                available: available as u64,
            },
            BufferError::NoMark => DechunkError::NoMark,
        }
    }
}
