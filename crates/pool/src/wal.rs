//! The redo log a transaction stages its writes through.
//!
//! A transaction never touches the data region directly. It accumulates
//! `(offset, bytes)` writes in memory; committing serialises them into the
//! WAL region and flushes that *before* applying anything to the data
//! region, then flushes again after application and clears the log. A
//! crash between those two flushes is recovered by replaying the log on
//! the next open — the writes are idempotent, so replaying an
//! already-applied transaction is harmless.

use crate::layout::PoolLayout;
use byteorder::{ByteOrder, NativeEndian};
use sortkv_core::{Error, Result};

pub struct PendingWrite {
    pub offset: u64,
    pub bytes: Vec<u8>,
}

/// Serialise staged writes into the WAL body, returning the byte length
/// written (header not included). `capacity` is the pool's WAL scratch
/// region size, sized relative to the pool itself rather than a flat cap
/// (see [`PoolLayout::wal_body_capacity`]).
pub fn encode_records(writes: &[PendingWrite], capacity: u64) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    for w in writes {
        body.extend_from_slice(&w.offset.to_ne_bytes());
        body.extend_from_slice(&(w.bytes.len() as u32).to_ne_bytes());
        body.extend_from_slice(&w.bytes);
    }
    if body.len() as u64 > capacity {
        return Err(Error::TransactionScopeError(format!(
            "transaction stages {} bytes, exceeding the {capacity}-byte log",
            body.len()
        )));
    }
    Ok(body)
}

/// Parse the WAL body back into `(offset, bytes)` pairs, `count` records.
pub fn decode_records(body: &[u8], count: u32) -> Vec<(u64, Vec<u8>)> {
    let mut out = Vec::with_capacity(count as usize);
    let mut cursor = 0usize;
    for _ in 0..count {
        let offset = NativeEndian::read_u64(&body[cursor..cursor + 8]);
        cursor += 8;
        let len = NativeEndian::read_u32(&body[cursor..cursor + 4]) as usize;
        cursor += 4;
        let bytes = body[cursor..cursor + len].to_vec();
        cursor += len;
        out.push((offset, bytes));
    }
    out
}

pub fn is_active(mmap: &[u8], layout: &PoolLayout) -> bool {
    mmap[layout.wal_flag() as usize] != 0
}

pub fn record_count(mmap: &[u8], layout: &PoolLayout) -> u32 {
    let start = layout.wal_count() as usize;
    NativeEndian::read_u32(&mmap[start..start + 4])
}
