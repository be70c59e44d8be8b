//! In-process chunk transport backed by a channel, with interruption.
//!
//! A producer thread hands raw chunks to a [`ChunkSender`]; the consuming
//! thread pulls them through [`ChannelChunkSource`]. Any holder of an
//! [`Interrupter`] can cancel a blocked wait. The interrupt flag stays set
//! after the wait fails, mirroring a thread's interrupted status, until
//! someone calls [`Interrupter::clear`].

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::transport::{ChunkSource, TransportError};

enum Delivery {
    Chunk(Bytes),
    Failed(io::Error),
    Wake,
    Closed,
}

/// Creates a connected producer/consumer pair.
pub fn chunk_channel() -> (ChunkSender, ChannelChunkSource) {
    let (tx, rx) = mpsc::channel();
    let sender = ChunkSender {
        tx: tx.clone(),
        senders: Arc::new(AtomicUsize::new(1)),
    };
    let source = ChannelChunkSource {
        rx,
        wake: tx,
        interrupted: Arc::new(AtomicBool::new(false)),
        closed: false,
    };
    (sender, source)
}

/// Producer side. Dropping the last clone closes the transport.
pub struct ChunkSender {
    tx: Sender<Delivery>,
    senders: Arc<AtomicUsize>,
}

impl ChunkSender {
    /// Delivers one raw chunk, marker byte included.
    pub fn send(&self, raw: impl Into<Bytes>) -> Result<(), TransportError> {
        self.tx
            .send(Delivery::Chunk(raw.into()))
            .map_err(|_| TransportError::Closed)
    }

    /// Makes the consumer's pending or next wait fail with `err`.
    pub fn fail(&self, err: io::Error) -> Result<(), TransportError> {
        self.tx
            .send(Delivery::Failed(err))
            .map_err(|_| TransportError::Closed)
    }
}

impl Clone for ChunkSender {
    fn clone(&self) -> Self {
        self.senders.fetch_add(1, Ordering::AcqRel);
        Self {
            tx: self.tx.clone(),
            senders: Arc::clone(&self.senders),
        }
    }
}

impl Drop for ChunkSender {
    fn drop(&mut self) {
        if self.senders.fetch_sub(1, Ordering::AcqRel) == 1 {
            let _ = self.tx.send(Delivery::Closed);
        }
    }
}

/// Cancels waits on one [`ChannelChunkSource`].
#[derive(Clone)]
pub struct Interrupter {
    flag: Arc<AtomicBool>,
    wake: Sender<Delivery>,
}

impl Interrupter {
    /// Sets the interrupt flag and wakes a blocked consumer. Only the call
    /// that sets the flag queues a wake-up.
    pub fn interrupt(&self) {
        if !self.flag.swap(true, Ordering::SeqCst) {
            let _ = self.wake.send(Delivery::Wake);
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clears the flag, returning whether it was set.
    pub fn clear(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

/// Consumer side of [`chunk_channel`].
pub struct ChannelChunkSource {
    rx: Receiver<Delivery>,
    wake: Sender<Delivery>,
    interrupted: Arc<AtomicBool>,
    closed: bool,
}

impl ChannelChunkSource {
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            flag: Arc::clone(&self.interrupted),
            wake: self.wake.clone(),
        }
    }
}

impl ChunkSource for ChannelChunkSource {
    fn next_chunk(&mut self, timeout: Duration) -> Result<Bytes, TransportError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.interrupted.load(Ordering::SeqCst) {
                return Err(TransportError::Interrupted);
            }
            if self.closed {
                return Err(TransportError::Closed);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(Delivery::Chunk(raw)) => return Ok(raw),
                Ok(Delivery::Failed(err)) => return Err(TransportError::Io(err)),
                // Stale wake-ups from a cleared interrupt are dropped here.
                Ok(Delivery::Wake) => {}
                Ok(Delivery::Closed) | Err(RecvTimeoutError::Disconnected) => self.closed = true,
                Err(RecvTimeoutError::Timeout) => return Err(TransportError::TimedOut(timeout)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_delivers_in_order() {
        let (tx, mut rx) = chunk_channel();
        tx.send(&b"\x01AB"[..]).unwrap();
        tx.send(&b"\x00CD"[..]).unwrap();
        assert_eq!(rx.next_chunk(WAIT).unwrap().as_ref(), b"\x01AB");
        assert_eq!(rx.next_chunk(WAIT).unwrap().as_ref(), b"\x00CD");
    }

    #[test]
    fn test_times_out() {
        let (_tx, mut rx) = chunk_channel();
        let err = rx.next_chunk(Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, TransportError::TimedOut(_)));
    }

    #[test]
    fn test_reports_failure() {
        let (tx, mut rx) = chunk_channel();
        tx.fail(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .unwrap();
        let err = rx.next_chunk(WAIT).unwrap_err();
        assert!(matches!(err, TransportError::Io(e) if e.kind() == io::ErrorKind::ConnectionReset));
    }

    #[test]
    fn test_closed_after_last_sender_dropped() {
        let (tx, mut rx) = chunk_channel();
        let other = tx.clone();
        tx.send(&b"\x01A"[..]).unwrap();
        drop(tx);
        drop(other);
        assert!(rx.next_chunk(WAIT).is_ok());
        assert!(matches!(rx.next_chunk(WAIT), Err(TransportError::Closed)));
        assert!(matches!(rx.next_chunk(WAIT), Err(TransportError::Closed)));
    }

    #[test]
    fn test_interrupt_wakes_blocked_wait_and_stays_set() {
        let (_tx, mut rx) = chunk_channel();
        let interrupter = rx.interrupter();
        let remote = interrupter.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.interrupt();
        });
        let err = rx.next_chunk(WAIT).unwrap_err();
        handle.join().unwrap();
        assert!(matches!(err, TransportError::Interrupted));
        assert!(interrupter.is_interrupted());
        assert!(interrupter.clear());
        assert!(!interrupter.is_interrupted());
    }

    #[test]
    fn test_repeated_interrupts_queue_one_wake() {
        let (_tx, rx) = chunk_channel();
        let interrupter = rx.interrupter();
        for _ in 0..5 {
            interrupter.interrupt();
        }
        let wakes = rx
            .rx
            .try_iter()
            .filter(|delivery| matches!(delivery, Delivery::Wake))
            .count();
        assert_eq!(wakes, 1);

        interrupter.clear();
        interrupter.interrupt();
        assert!(matches!(rx.rx.try_recv(), Ok(Delivery::Wake)));
    }

    #[test]
    fn test_cleared_interrupt_does_not_fail_next_wait() {
        let (tx, mut rx) = chunk_channel();
        let interrupter = rx.interrupter();
        interrupter.interrupt();
        interrupter.clear();
        tx.send(&b"\x00Z"[..]).unwrap();
        assert_eq!(rx.next_chunk(WAIT).unwrap().as_ref(), b"\x00Z");
    }
}
