//! Lock acquisition wait policies and lock-client identities.
//!
//! This crate is independent of the chunk reassembly crates. It holds the two
//! small pieces a lock manager needs around its acquire loop:
//!
//! - [`WaitStrategy`] - What to do between failed acquire attempts
//! - [`LockClientIds`] - An explicitly owned allocator of [`LockClient`] ids
//!
//! # Example
//!
//! ```
//! use lock_wait::WaitStrategy;
//!
//! let mut tries = 0;
//! let iterations = WaitStrategy::Yield
//!     .wait_until(|| {
//!         tries += 1;
//!         tries == 3
//!     })
//!     .unwrap();
//! assert_eq!(iterations, 2);
//! ```

mod client;
mod strategy;

pub use client::{LockClient, LockClientIds};
pub use strategy::{LockConfig, LockWaitError, WaitStrategy};
