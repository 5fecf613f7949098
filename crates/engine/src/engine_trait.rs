//! The public contract (spec §4.5) every engine implements.

use sortkv_core::{RangeBound, Result};

/// Uniform operation surface shared by the sorted engine, the blackhole
/// engine, and any future engine. Range and count operations take
/// [`RangeBound`] endpoints so `above`, `below`, `between`, and `all` are
/// all one traversal parameterised differently rather than four separate
/// code paths (callers needing a concrete-key `above`/`below` supply
/// [`RangeBound::Min`] or [`RangeBound::Max`] for the other side).
pub trait Engine: Send + Sync {
    /// Cheap, tracked total entry count.
    fn count_all(&self) -> Result<u64>;

    /// Count of entries strictly between `lo` and `hi`. `NOT_SUPPORTED` on
    /// engines that cannot order keys.
    fn count_range(&self, lo: &RangeBound, hi: &RangeBound) -> Result<u64>;

    /// `Ok(())` if `key` is present, `Err(NotFound)` otherwise.
    fn exists(&self, key: &[u8]) -> Result<()>;

    /// Look up `key`, delivering its value to `callback` on success.
    fn get(&self, key: &[u8], callback: &mut dyn FnMut(&[u8])) -> Result<()>;

    /// Insert or replace `key`. Replacing an existing key leaves the
    /// element count unchanged.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove `key`. `Err(NotFound)` if it was not present; no transaction
    /// is opened in that case.
    fn remove(&self, key: &[u8]) -> Result<()>;

    /// Deliver every entry strictly between `lo` and `hi`, in
    /// comparator-ascending order, to `callback`. Iteration halts early
    /// (returning `Err(StoppedByCallback)`) if `callback` returns non-zero.
    /// `NOT_SUPPORTED` on engines that cannot order keys.
    fn get_range(
        &self,
        lo: &RangeBound,
        hi: &RangeBound,
        callback: &mut dyn FnMut(&[u8], &[u8]) -> i32,
    ) -> Result<()>;
}
