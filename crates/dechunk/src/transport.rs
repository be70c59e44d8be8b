//! The blocking chunk transport the reassembling buffer pulls from.

use std::io;
use std::time::Duration;

use bytes::Bytes;

/// Failure to deliver the next chunk.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("timed out after {0:?} waiting for the next chunk")]
    TimedOut(Duration),
    #[error("connection failed: {0}")]
    Io(#[from] io::Error),
    #[error("interrupted while waiting for the next chunk")]
    Interrupted,
    #[error("transport closed before the final chunk")]
    Closed,
}

/// A blocking source of raw chunks, marker byte included.
///
/// `next_chunk` waits at most `timeout` and either returns one whole chunk or
/// fails; a failed call delivers no bytes.
pub trait ChunkSource {
    fn next_chunk(&mut self, timeout: Duration) -> Result<Bytes, TransportError>;
}

impl<S: ChunkSource + ?Sized> ChunkSource for &mut S {
    fn next_chunk(&mut self, timeout: Duration) -> Result<Bytes, TransportError> {
        (**self).next_chunk(timeout)
    }
}

impl<S: ChunkSource + ?Sized> ChunkSource for Box<S> {
    fn next_chunk(&mut self, timeout: Duration) -> Result<Bytes, TransportError> {
        (**self).next_chunk(timeout)
    }
}
