//! Binary buffer utilities for dechunk.
//!
//! This crate provides the bounds-checked decoding layer underneath the
//! chunk-reassembling buffer: every fixed-width primitive the upper protocol
//! layers read is decoded here, big-endian, from a plain byte slice.
//!
//! # Overview
//!
//! - [`Reader`] - Reads binary data from a byte slice with cursor and mark tracking
//! - [`OctetsPreview`] - Lazily formats the head of a byte slice as hex for diagnostics
//!
//! # Example
//!
//! ```
//! use dechunk_buffers::Reader;
//!
//! let data = [0x01, 0x02, 0x03, 0x00, 0x00, 0x2a];
//! let mut reader = Reader::new(&data);
//!
//! assert_eq!(reader.u8(), Ok(0x01));
//! assert_eq!(reader.u16(), Ok(0x0203));
//! assert_eq!(reader.u24(), Ok(42));
//! assert!(reader.u8().is_err());
//! ```

mod octets;
mod reader;

pub use octets::OctetsPreview;
pub use reader::Reader;

/// Error type for buffer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// Attempted to read past the end of the buffer.
    #[error("end of buffer: {requested} bytes requested at offset {offset}, {available} available")]
    EndOfBuffer {
        offset: usize,
        requested: usize,
        available: usize,
    },
    /// Reset was called without a marked position.
    #[error("reset without a marked position")]
    NoMark,
}
