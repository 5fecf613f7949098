//! Partitions a pool file into its three regions: header, allocator
//! superblock, and a write-ahead log scratch area ahead of the data region
//! that holds nodes.
//!
//! Everything outside the data region is private to this crate. Only the
//! [`PoolHeader`](crate::header::PoolHeader) fields are part of the format
//! a caller could reasonably parse by hand; the superblock and WAL are
//! implementation detail that happens to live in the same file.

use crate::header::HEADER_SIZE;
use sortkv_core::{Error, Result};

/// data_bump(8) + leaf_free_head(8) + inner_free_head(8)
pub const SUPERBLOCK_SIZE: usize = 8 + 8 + 8;

const SB_DATA_BUMP: usize = 0;
const SB_LEAF_FREE_HEAD: usize = 8;
const SB_INNER_FREE_HEAD: usize = 16;

pub const WAL_FLAG_SIZE: usize = 1;
pub const WAL_COUNT_SIZE: usize = 4;
pub const WAL_HEADER_SIZE: usize = 16; // flag + count, padded for alignment

/// Floor on the WAL scratch region, regardless of pool size: comfortably
/// more than a handful of default-geometry leaf/inner node writes, so even
/// a small pool has room to stage one transaction.
pub const WAL_BODY_MIN: usize = 64 * 1024;
/// The WAL scratch region is sized as this fraction of the pool's total
/// size (bounded below by [`WAL_BODY_MIN`]), rather than a flat capacity
/// that could exceed a small pool's entire size.
const WAL_BODY_FRACTION_DIVISOR: u64 = 8;

fn wal_body_capacity_for(total_size: u64) -> usize {
    let fraction = (total_size / WAL_BODY_FRACTION_DIVISOR) as usize;
    fraction.max(WAL_BODY_MIN)
}

#[derive(Debug, Clone, Copy)]
pub struct PoolLayout {
    pub total_size: u64,
    pub superblock_start: u64,
    pub wal_start: u64,
    pub wal_body_capacity: u64,
    pub data_start: u64,
    pub data_len: u64,
}

impl PoolLayout {
    pub fn compute(total_size: u64) -> Result<Self> {
        let superblock_start = HEADER_SIZE as u64;
        let wal_start = superblock_start + SUPERBLOCK_SIZE as u64;
        let wal_body_capacity = wal_body_capacity_for(total_size) as u64;
        let data_start = wal_start + WAL_HEADER_SIZE as u64 + wal_body_capacity;
        if total_size <= data_start {
            return Err(Error::InvalidArgument(format!(
                "pool size {total_size} is too small to hold header, allocator state, and WAL (needs at least {data_start})"
            )));
        }
        Ok(Self {
            total_size,
            superblock_start,
            wal_start,
            wal_body_capacity,
            data_start,
            data_len: total_size - data_start,
        })
    }

    pub fn abs(&self, data_relative: u64) -> u64 {
        self.data_start + data_relative
    }

    pub fn sb_data_bump(&self) -> u64 {
        self.superblock_start + SB_DATA_BUMP as u64
    }

    pub fn sb_leaf_free_head(&self) -> u64 {
        self.superblock_start + SB_LEAF_FREE_HEAD as u64
    }

    pub fn sb_inner_free_head(&self) -> u64 {
        self.superblock_start + SB_INNER_FREE_HEAD as u64
    }

    pub fn wal_flag(&self) -> u64 {
        self.wal_start
    }

    pub fn wal_count(&self) -> u64 {
        self.wal_start + WAL_FLAG_SIZE as u64
    }

    pub fn wal_body(&self) -> u64 {
        self.wal_start + WAL_HEADER_SIZE as u64
    }

    /// Scratch capacity, in bytes, reserved for one in-flight transaction's
    /// staged writes in this pool.
    pub fn wal_body_capacity(&self) -> u64 {
        self.wal_body_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_rejects_undersized_files() {
        assert!(PoolLayout::compute(100).is_err());
    }

    #[test]
    fn layout_computes_disjoint_regions() {
        let layout = PoolLayout::compute(16 * 1024 * 1024).unwrap();
        assert!(layout.superblock_start >= HEADER_SIZE as u64);
        assert!(layout.wal_start >= layout.superblock_start + SUPERBLOCK_SIZE as u64);
        assert!(
            layout.data_start
                >= layout.wal_start + WAL_HEADER_SIZE as u64 + layout.wal_body_capacity()
        );
        assert!(layout.data_len > 0);
    }

    #[test]
    fn a_one_mebibyte_pool_is_a_valid_size() {
        // The very common `size = 1024 * 1024` must not be rejected: the WAL
        // scratch region scales with pool size instead of reserving a flat
        // capacity that could exceed the whole pool.
        let layout = PoolLayout::compute(1024 * 1024).unwrap();
        assert!(layout.data_len > 0);
    }

    #[test]
    fn wal_capacity_scales_with_pool_size_but_never_below_the_floor() {
        let small = PoolLayout::compute(256 * 1024).unwrap();
        assert_eq!(small.wal_body_capacity(), WAL_BODY_MIN as u64);

        let large = PoolLayout::compute(64 * 1024 * 1024).unwrap();
        assert_eq!(
            large.wal_body_capacity(),
            64 * 1024 * 1024 / WAL_BODY_FRACTION_DIVISOR
        );
    }
}
