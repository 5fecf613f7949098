//! The memory-mapped pool: a file on disk, its fixed-size header and
//! allocator state, and the single `RwLock` that serialises writers against
//! readers.

use crate::header::{PoolHeader, HEADER_SIZE, NULL};
use crate::layout::PoolLayout;
use crate::txn::Transaction;
use crate::wal;
use byteorder::{ByteOrder, NativeEndian};
use fs2::FileExt;
use memmap2::MmapMut;
use parking_lot::RwLock;
use sortkv_core::{Error, Result};
use std::fs::OpenOptions;
use std::path::Path;

/// Pool is the persistent, memory-mapped region a sorted engine stores its
/// tree in. It owns the `RwLock` that gives writers exclusive access and
/// readers a consistent shared snapshot (§5 of the contract: a writer and a
/// reader never run concurrently against the same pool).
pub struct Pool {
    _file: std::fs::File,
    mmap: RwLock<MmapMut>,
    layout: PoolLayout,
    degree: u32,
    key_max: u64,
    value_max: u64,
    comparator_name: String,
}

impl Pool {
    /// Create a new pool file of `size` bytes, initialised with an empty
    /// tree bound to `comparator_name`.
    pub fn create(
        path: &Path,
        size: u64,
        degree: u32,
        key_max: u64,
        value_max: u64,
        comparator_name: &str,
    ) -> Result<Self> {
        let layout = PoolLayout::compute(size)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        file.set_len(size)?;
        file.lock_exclusive()?;

        let mut mmap = unsafe { MmapMut::map_mut(&file)? };
        let header = PoolHeader::new(degree, key_max, value_max, comparator_name)?;
        header.write_to(&mut mmap[0..HEADER_SIZE]);

        NativeEndian::write_u64(&mut mmap[layout.sb_data_bump() as usize..][..8], 0);
        NativeEndian::write_u64(&mut mmap[layout.sb_leaf_free_head() as usize..][..8], NULL);
        NativeEndian::write_u64(&mut mmap[layout.sb_inner_free_head() as usize..][..8], NULL);
        mmap.flush()?;

        tracing::info!(path = %path.display(), size, degree, "created pool");

        Ok(Self {
            _file: file,
            mmap: RwLock::new(mmap),
            layout,
            degree,
            key_max,
            value_max,
            comparator_name: comparator_name.to_string(),
        })
    }

    /// Open an existing pool file, replaying any in-flight transaction left
    /// behind by a crash and verifying that `comparator_name` matches the
    /// one the pool was created with.
    pub fn open(path: &Path, comparator_name: &str) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        file.lock_exclusive()?;
        let size = file.metadata()?.len();
        let layout = PoolLayout::compute(size)?;

        let mut mmap = unsafe { MmapMut::map_mut(&file)? };
        let header = PoolHeader::read_from(&mmap[0..HEADER_SIZE])?;

        if wal::is_active(&mmap, &layout) {
            tracing::warn!(path = %path.display(), "replaying in-flight transaction left by a crash");
            recover(&mut mmap, &layout)?;
        }

        if header.comparator_name != comparator_name {
            return Err(Error::ComparatorMismatch {
                expected: header.comparator_name,
                actual: comparator_name.to_string(),
            });
        }

        Ok(Self {
            _file: file,
            mmap: RwLock::new(mmap),
            layout,
            degree: header.degree,
            key_max: header.key_max,
            value_max: header.value_max,
            comparator_name: header.comparator_name,
        })
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    pub fn key_max(&self) -> u64 {
        self.key_max
    }

    pub fn value_max(&self) -> u64 {
        self.value_max
    }

    pub fn comparator_name(&self) -> &str {
        &self.comparator_name
    }

    pub fn layout(&self) -> PoolLayout {
        self.layout
    }

    pub fn element_count(&self) -> u64 {
        let guard = self.mmap.read();
        NativeEndian::read_u64(&guard[32..40])
    }

    pub fn root(&self) -> u64 {
        let guard = self.mmap.read();
        NativeEndian::read_u64(&guard[297..305])
    }

    /// Begin a transaction. Holds the pool's write lock until the
    /// transaction is committed or dropped.
    pub fn begin(&self) -> Transaction<'_> {
        tracing::debug!("begin transaction");
        Transaction::new(self.mmap.write(), self.layout)
    }

    /// Take a read guard good for one point lookup or one whole range scan.
    pub fn read(&self) -> PoolRead<'_> {
        PoolRead {
            guard: self.mmap.read(),
            layout: self.layout,
        }
    }
}

/// A read-only view into the pool's data region, held for the duration of
/// a lookup or a range scan so the caller sees one consistent snapshot.
pub struct PoolRead<'a> {
    guard: parking_lot::RwLockReadGuard<'a, MmapMut>,
    layout: PoolLayout,
}

impl PoolRead<'_> {
    pub fn bytes(&self, rel_offset: u64, len: usize) -> &[u8] {
        let abs = self.layout.abs(rel_offset) as usize;
        &self.guard[abs..abs + len]
    }

    pub fn element_count(&self) -> u64 {
        NativeEndian::read_u64(&self.guard[32..40])
    }

    pub fn root(&self) -> u64 {
        NativeEndian::read_u64(&self.guard[297..305])
    }
}

fn recover(mmap: &mut MmapMut, layout: &PoolLayout) -> Result<()> {
    let count = wal::record_count(mmap, layout);
    let body_start = layout.wal_body() as usize;
    let records = wal::decode_records(&mmap[body_start..], count);
    for (offset, bytes) in records {
        let off = offset as usize;
        mmap[off..off + bytes.len()].copy_from_slice(&bytes);
    }
    mmap.flush()?;
    mmap[layout.wal_flag() as usize] = 0;
    let count_start = layout.wal_count() as usize;
    mmap[count_start..count_start + 4].copy_from_slice(&0u32.to_ne_bytes());
    mmap.flush()?;
    Ok(())
}
