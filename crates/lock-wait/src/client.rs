//! Lock-client identities.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Hands out lock-client ids, starting at zero.
///
/// Owned by whichever component creates lock clients; two allocators never
/// share a sequence.
#[derive(Debug, Default)]
pub struct LockClientIds {
    next: AtomicU32,
}

impl LockClientIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&self) -> LockClient {
        LockClient {
            id: self.next.fetch_add(1, Ordering::Relaxed),
            transaction_id: AtomicU64::new(0),
        }
    }
}

/// A participant in lock acquisition, tagged with the transaction it is
/// currently acting for.
#[derive(Debug)]
pub struct LockClient {
    id: u32,
    transaction_id: AtomicU64,
}

impl LockClient {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn transaction_id(&self) -> u64 {
        self.transaction_id.load(Ordering::Acquire)
    }

    pub fn set_transaction_id(&self, transaction_id: u64) {
        self.transaction_id.store(transaction_id, Ordering::Release);
    }
}

impl fmt::Display for LockClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LockClient[{} for transaction: {}]",
            self.id,
            self.transaction_id()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let ids = LockClientIds::new();
        assert_eq!(ids.allocate().id(), 0);
        assert_eq!(ids.allocate().id(), 1);
        assert_eq!(LockClientIds::new().allocate().id(), 0);
    }

    #[test]
    fn test_display() {
        let client = LockClientIds::new().allocate();
        client.set_transaction_id(42);
        assert_eq!(client.to_string(), "LockClient[0 for transaction: 42]");
    }
}
