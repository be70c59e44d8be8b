//! Chunk-reassembling read buffer.
//!
//! A logical message of unknown length arrives as a sequence of chunks, each
//! led by a continuation marker byte. [`DechunkingBuffer`] hides the chunking
//! from upper protocol layers: it looks like one continuous, randomly
//! addressable, read-only byte buffer, and pulls the next chunk from a
//! blocking [`ChunkSource`] only when a read needs bytes that have not
//! arrived yet.
//!
//! # Overview
//!
//! - [`DechunkingBuffer`] - The reassembling buffer, bound to one message
//! - [`ReadBuffer`] - The read-only surface: positional `get_*`, sequential `read_*`, mark/reset
//! - [`ChunkSource`] - The blocking transport the buffer pulls raw chunks from
//! - [`chunk_channel`] - An in-process transport with interruption support
//! - [`Chunk`] - Decoding of the continuation marker envelope
//!
//! # Example
//!
//! ```
//! use dechunk::{chunk_channel, DechunkingBuffer, ErrorKind, ReadBuffer};
//!
//! let (tx, rx) = chunk_channel();
//! tx.send(&b"\x01\x00\x2a"[..]).unwrap();
//! tx.send(&b"\x00\x07"[..]).unwrap();
//!
//! let mut buf = DechunkingBuffer::new(rx).unwrap();
//! assert_eq!(buf.read_u16().unwrap(), 42);
//! assert_eq!(buf.read_u8().unwrap(), 7);
//! let err = buf.read_u8().unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Misuse);
//! ```

mod buffer;
mod channel;
mod chunk;
mod config;
mod error;
mod read_buffer;
mod transport;

pub use buffer::DechunkingBuffer;
pub use channel::{chunk_channel, ChannelChunkSource, ChunkSender, Interrupter};
pub use chunk::{Chunk, ChunkError, Continuation, CONTINUATION_LAST, CONTINUATION_MORE};
pub use config::{DechunkConfig, DEFAULT_READ_TIMEOUT};
pub use error::{DechunkError, ErrorKind};
pub use read_buffer::ReadBuffer;
pub use transport::{ChunkSource, TransportError};
