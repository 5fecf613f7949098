//! Transactional scope over a pool: stage writes in memory, then commit
//! them through the write-ahead log in one durability-preserving sweep.

use crate::layout::PoolLayout;
use crate::wal::{self, PendingWrite};
use byteorder::{ByteOrder, NativeEndian};
use memmap2::MmapMut;
use parking_lot::RwLockWriteGuard;
use sortkv_core::{Error, Result};

const NULL: u64 = u64::MAX;

/// A single atomic scope. Nothing staged here touches the pool file until
/// [`Transaction::commit`] runs; dropping without committing is a no-op
/// abort.
pub struct Transaction<'a> {
    guard: RwLockWriteGuard<'a, MmapMut>,
    layout: PoolLayout,
    pending: Vec<PendingWrite>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(guard: RwLockWriteGuard<'a, MmapMut>, layout: PoolLayout) -> Self {
        Self {
            guard,
            layout,
            pending: Vec::new(),
        }
    }

    fn stage(&mut self, offset: u64, bytes: Vec<u8>) {
        self.pending.push(PendingWrite { offset, bytes });
    }

    /// Read `len` bytes from `rel_offset` in the data region, reflecting
    /// any write already staged earlier in this same transaction.
    fn read_abs(&self, abs: u64, len: usize) -> Vec<u8> {
        if let Some(w) = self
            .pending
            .iter()
            .rev()
            .find(|w| w.offset == abs && w.bytes.len() == len)
        {
            return w.bytes.clone();
        }
        let start = abs as usize;
        self.guard[start..start + len].to_vec()
    }

    /// Write `bytes` at `rel_offset` in the data region.
    pub fn write(&mut self, rel_offset: u64, bytes: &[u8]) {
        self.stage(self.layout.abs(rel_offset), bytes.to_vec());
    }

    /// Read `len` bytes at `rel_offset` in the data region.
    pub fn read(&self, rel_offset: u64, len: usize) -> Vec<u8> {
        self.read_abs(self.layout.abs(rel_offset), len)
    }

    pub fn element_count(&self) -> u64 {
        NativeEndian::read_u64(&self.read_abs(32, 8))
    }

    fn set_element_count(&mut self, n: u64) {
        self.stage(32, n.to_ne_bytes().to_vec());
    }

    pub fn increment_count(&mut self) {
        let n = self.element_count() + 1;
        self.set_element_count(n);
    }

    pub fn decrement_count(&mut self) {
        let n = self.element_count().saturating_sub(1);
        self.set_element_count(n);
    }

    pub fn root(&self) -> u64 {
        NativeEndian::read_u64(&self.read_abs(297, 8))
    }

    pub fn set_root(&mut self, rel_offset: u64) {
        self.stage(297, rel_offset.to_ne_bytes().to_vec());
    }

    fn alloc_block(&mut self, free_head_field: u64, block_size: usize) -> Result<u64> {
        let head = NativeEndian::read_u64(&self.read_abs(free_head_field, 8));
        if head != NULL {
            let next_abs = self.layout.abs(head);
            let next = NativeEndian::read_u64(&self.read_abs(next_abs, 8));
            self.stage(free_head_field, next.to_ne_bytes().to_vec());
            return Ok(head);
        }

        let bump = NativeEndian::read_u64(&self.read_abs(self.layout.sb_data_bump(), 8));
        let new_bump = bump
            .checked_add(block_size as u64)
            .ok_or_else(|| Error::OutOfMemory("allocator bump pointer overflowed".into()))?;
        if new_bump > self.layout.data_len {
            return Err(Error::OutOfMemory(format!(
                "pool exhausted: {block_size} more bytes requested, {} remain",
                self.layout.data_len.saturating_sub(bump)
            )));
        }
        self.stage(self.layout.sb_data_bump(), new_bump.to_ne_bytes().to_vec());
        Ok(bump)
    }

    fn free_block(&mut self, free_head_field: u64, rel_offset: u64) {
        let head = NativeEndian::read_u64(&self.read_abs(free_head_field, 8));
        let abs = self.layout.abs(rel_offset);
        self.stage(abs, head.to_ne_bytes().to_vec());
        self.stage(free_head_field, rel_offset.to_ne_bytes().to_vec());
    }

    /// Allocate a fixed-size leaf node block, returning its data-relative offset.
    pub fn alloc_leaf(&mut self, size: usize) -> Result<u64> {
        self.alloc_block(self.layout.sb_leaf_free_head(), size)
    }

    /// Allocate a fixed-size inner node block, returning its data-relative offset.
    pub fn alloc_inner(&mut self, size: usize) -> Result<u64> {
        self.alloc_block(self.layout.sb_inner_free_head(), size)
    }

    pub fn free_leaf(&mut self, rel_offset: u64) {
        self.free_block(self.layout.sb_leaf_free_head(), rel_offset);
    }

    pub fn free_inner(&mut self, rel_offset: u64) {
        self.free_block(self.layout.sb_inner_free_head(), rel_offset);
    }

    /// Commit every staged write through the write-ahead log: the log is
    /// made durable first (the point past which a crash replays rather
    /// than discards this transaction), then the data region is updated,
    /// then the log is cleared.
    pub fn commit(mut self) -> Result<()> {
        if self.pending.is_empty() {
            tracing::debug!("commit with no staged writes");
            return Ok(());
        }

        let count = self.pending.len() as u32;
        let body = wal::encode_records(&self.pending, self.layout.wal_body_capacity())?;

        let body_start = self.layout.wal_body() as usize;
        self.guard[body_start..body_start + body.len()].copy_from_slice(&body);
        let count_start = self.layout.wal_count() as usize;
        self.guard[count_start..count_start + 4].copy_from_slice(&count.to_ne_bytes());
        self.guard.flush().map_err(Error::Io)?;

        let flag_start = self.layout.wal_flag() as usize;
        self.guard[flag_start] = 1;
        self.guard.flush().map_err(Error::Io)?;
        tracing::debug!(records = count, "transaction reached durability point");

        for w in &self.pending {
            let off = w.offset as usize;
            self.guard[off..off + w.bytes.len()].copy_from_slice(&w.bytes);
        }
        self.guard.flush().map_err(Error::Io)?;

        self.guard[flag_start] = 0;
        self.guard[count_start..count_start + 4].copy_from_slice(&0u32.to_ne_bytes());
        self.guard.flush().map_err(Error::Io)?;
        tracing::debug!("transaction committed");
        Ok(())
    }

    /// Discard every staged write. Equivalent to dropping the transaction.
    pub fn abort(self) {
        tracing::debug!("transaction aborted");
    }
}
