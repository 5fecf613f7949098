//! The persistent, memory-mapped pool underneath a sorted engine.
//!
//! A pool is a single file divided into four regions: a small fixed header
//! (magic, format version, the engine's compile-time parameters, the
//! element count, the bound comparator's name, and the root pointer), an
//! allocator superblock, a write-ahead log scratch area sized relative to
//! the pool itself, and a data region holding fixed-size node blocks. All
//! mutation goes through [`Transaction`], which stages writes in memory and
//! only makes them durable — via the log — at `commit`.

mod header;
mod layout;
mod pool;
mod txn;
mod wal;

pub use header::{PoolHeader, FORMAT_VERSION, HEADER_SIZE, NULL};
pub use layout::{PoolLayout, WAL_BODY_MIN};
pub use pool::{Pool, PoolRead};
pub use txn::Transaction;
