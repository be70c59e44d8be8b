//! The chunk-reassembling read buffer.

use std::fmt;
use std::time::Duration;

use bytes::{Buf, Bytes, BytesMut};
use dechunk_buffers::OctetsPreview;
use tracing::{debug, trace, warn};

use crate::chunk::Chunk;
use crate::config::DechunkConfig;
use crate::error::DechunkError;
use crate::read_buffer::ReadBuffer;
use crate::transport::ChunkSource;

/// The bytes currently held for the message.
#[derive(Debug)]
enum Window {
    /// Payload of a message that arrived as one final chunk, exactly as
    /// received.
    Single(Bytes),
    /// Payloads of several chunks, appended back to back.
    Reassembled(BytesMut),
}

impl Window {
    fn as_slice(&self) -> &[u8] {
        match self {
            Window::Single(bytes) => &bytes[..],
            Window::Reassembled(buf) => &buf[..],
        }
    }

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn discard(&mut self, n: usize) {
        match self {
            Window::Single(bytes) => bytes.advance(n),
            Window::Reassembled(buf) => buf.advance(n),
        }
    }

    fn append(&mut self, payload: &[u8]) {
        match self {
            Window::Reassembled(buf) => buf.extend_from_slice(payload),
            // A single window holds a final chunk, so the buffer never fetches
            // after it. Appending still yields the concatenation if that changes.
            Window::Single(bytes) => {
                let mut buf = BytesMut::with_capacity(bytes.len() + payload.len());
                buf.extend_from_slice(bytes);
                buf.extend_from_slice(payload);
                *self = Window::Reassembled(buf);
            }
        }
    }
}

/// Presents one chunked message as a single continuous read-only buffer.
///
/// The buffer is bound to one [`ChunkSource`] for one logical message. It
/// fetches the first chunk on construction and afterwards only blocks on the
/// source when a read asks for bytes that have not arrived yet and the last
/// chunk said more would follow.
///
/// Bytes behind the read cursor (or behind the mark, while one is set) are
/// dropped whenever a new chunk is appended, so memory stays bounded by the
/// live bytes plus one chunk.
///
/// # Example
///
/// ```
/// use dechunk::{chunk_channel, DechunkingBuffer, ReadBuffer};
///
/// let (tx, rx) = chunk_channel();
/// tx.send(&b"\x01AB"[..]).unwrap();
/// tx.send(&b"\x00CD"[..]).unwrap();
///
/// let mut buf = DechunkingBuffer::new(rx).unwrap();
/// assert_eq!(buf.read_u32().unwrap(), u32::from_be_bytes(*b"ABCD"));
/// assert!(!buf.has_more_readable());
/// ```
pub struct DechunkingBuffer<S> {
    source: S,
    config: DechunkConfig,
    window: Window,
    /// Logical offset of `window[0]`.
    base: u64,
    /// Read cursor, relative to `window`.
    reader: usize,
    /// Saved read cursor, relative to `window`. Never ahead of `reader`.
    mark: Option<usize>,
    more: bool,
    chunks: u64,
}

impl<S: ChunkSource> DechunkingBuffer<S> {
    /// Binds a buffer to `source` with the default configuration and fetches
    /// the first chunk.
    pub fn new(source: S) -> Result<Self, DechunkError> {
        Self::with_config(source, DechunkConfig::default())
    }

    pub fn with_config(mut source: S, config: DechunkConfig) -> Result<Self, DechunkError> {
        let chunk = receive(&mut source, config.read_timeout, 0)?;
        let more = chunk.continuation().is_more();
        let window = if more {
            Window::Reassembled(BytesMut::from(chunk.payload().as_ref()))
        } else {
            Window::Single(chunk.into_payload())
        };
        Ok(Self {
            source,
            config,
            window,
            base: 0,
            reader: 0,
            mark: None,
            more,
            chunks: 1,
        })
    }

    /// Number of chunks fetched so far, the priming one included.
    pub fn chunks_received(&self) -> u64 {
        self.chunks
    }

    /// Whether the final chunk has arrived and every byte has been read.
    pub fn is_exhausted(&self) -> bool {
        !self.has_more_readable()
    }

    fn end(&self) -> u64 {
        self.base + self.window.len() as u64
    }

    /// Appends the next chunk. Nothing changes unless a whole chunk arrived.
    ///
    /// `pin` is a logical offset whose bytes must survive the discard.
    fn fetch_next_chunk(&mut self, pin: u64) -> Result<(), DechunkError> {
        let chunk = receive(&mut self.source, self.config.read_timeout, self.chunks)?;
        self.chunks += 1;
        self.more = chunk.continuation().is_more();
        self.discard_read_bytes(pin);
        self.window.append(chunk.payload());
        Ok(())
    }

    fn discard_read_bytes(&mut self, pin: u64) {
        let pin = (pin - self.base) as usize;
        let keep_from = self.mark.unwrap_or(self.reader).min(pin);
        if keep_from == 0 {
            return;
        }
        self.window.discard(keep_from);
        self.reader -= keep_from;
        if let Some(mark) = self.mark.as_mut() {
            *mark -= keep_from;
        }
        self.base += keep_from as u64;
        debug!(discarded = keep_from, base = self.base, "discarded read bytes");
    }
}

fn receive<S: ChunkSource>(
    source: &mut S,
    timeout: Duration,
    received: u64,
) -> Result<Chunk, DechunkError> {
    let raw = source.next_chunk(timeout).map_err(|err| {
        warn!(error = %err, received, "chunk fetch failed");
        err
    })?;
    let chunk = Chunk::decode(raw).map_err(|err| {
        warn!(error = %err, received, "rejected malformed chunk");
        err
    })?;
    debug!(
        payload_len = chunk.payload().len(),
        more = chunk.continuation().is_more(),
        received = received + 1,
        "received chunk"
    );
    trace!(
        head = %OctetsPreview::new(chunk.payload(), OctetsPreview::DEFAULT_MAX),
        "chunk payload"
    );
    Ok(chunk)
}

impl<S: ChunkSource> ReadBuffer for DechunkingBuffer<S> {
    fn view(&mut self, offset: u64, len: usize) -> Result<&[u8], DechunkError> {
        if offset < self.base {
            return Err(DechunkError::Discarded {
                offset,
                base: self.base,
            });
        }
        let end = offset.saturating_add(len as u64);
        while self.end() < end && self.more {
            self.fetch_next_chunk(offset)?;
        }
        let available = self.end().saturating_sub(offset);
        if offset > self.end() || available < len as u64 {
            return Err(DechunkError::EndOfMessage {
                offset,
                requested: len,
                available,
            });
        }
        let start = (offset - self.base) as usize;
        Ok(&self.window.as_slice()[start..start + len])
    }

    fn reader_index(&self) -> u64 {
        self.base + self.reader as u64
    }

    fn skip_bytes(&mut self, len: usize) -> Result<(), DechunkError> {
        let index = self.reader_index();
        self.view(index, len)?;
        self.reader += len;
        Ok(())
    }

    fn mark(&mut self) {
        self.mark = Some(self.reader);
    }

    fn reset(&mut self) -> Result<(), DechunkError> {
        self.reader = self.mark.take().ok_or(DechunkError::NoMark)?;
        Ok(())
    }

    fn has_more_readable(&self) -> bool {
        self.reader < self.window.len() || self.more
    }

    fn readable_bytes(&self) -> usize {
        self.window.len() - self.reader
    }

    fn capacity(&self) -> usize {
        self.window.len()
    }
}

impl<S> fmt::Debug for DechunkingBuffer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unread = &self.window.as_slice()[self.reader..];
        f.debug_struct("DechunkingBuffer")
            .field("base", &self.base)
            .field("reader", &self.reader)
            .field("mark", &self.mark)
            .field("len", &self.window.len())
            .field("more", &self.more)
            .field("chunks", &self.chunks)
            .field(
                "unread",
                &format_args!("{}", OctetsPreview::new(unread, OctetsPreview::DEFAULT_MAX)),
            )
            .finish()
    }
}
