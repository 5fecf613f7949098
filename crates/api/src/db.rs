//! [`Db`]: the opaque handle over a dispatched [`Engine`], wrapping every
//! call so the thread-local diagnostic channel is reset on entry and
//! populated on failure (spec §6), and expanding the `RangeBound`-keyed
//! `get_range`/`count_range` primitives into the named `above`/`below`/
//! `between`/`all` operations of the public contract (spec §4.5).

use crate::diagnostic;
use sortkv_config::ConfigBag;
use sortkv_core::{RangeBound, Result};
use sortkv_engine::Engine;

/// An opened engine, ready to serve the public contract.
///
/// `Db` erases which concrete engine backs it behind `Box<dyn Engine>` —
/// the same opaque-handle boundary spec.md's design notes call for,
/// without also erasing Rust's type system down to a C ABI.
pub struct Db {
    engine: Box<dyn Engine>,
}

impl Db {
    /// Dispatch `engine_name` with `config`, taking ownership of the bag.
    pub fn open(engine_name: &str, config: ConfigBag) -> Result<Db> {
        diagnostic::clear();
        match sortkv_engine::open(engine_name, config) {
            Ok(engine) => Ok(Db { engine }),
            Err(err) => {
                diagnostic::set(err.to_string());
                Err(err)
            }
        }
    }

    /// Destroy this handle. Durable state is untouched; a dropped `Db`
    /// would do the same, this just names the operation the contract
    /// describes.
    pub fn close(self) {
        sortkv_engine::close(self.engine);
    }

    fn run<T>(&self, f: impl FnOnce(&dyn Engine) -> Result<T>) -> Result<T> {
        diagnostic::clear();
        let result = f(self.engine.as_ref());
        if let Err(ref err) = result {
            diagnostic::set(err.to_string());
        }
        result
    }

    pub fn count_all(&self) -> Result<u64> {
        self.run(|e| e.count_all())
    }

    pub fn count_above(&self, key: &[u8]) -> Result<u64> {
        self.run(|e| e.count_range(&RangeBound::Key(key.to_vec()), &RangeBound::Max))
    }

    pub fn count_below(&self, key: &[u8]) -> Result<u64> {
        self.run(|e| e.count_range(&RangeBound::Min, &RangeBound::Key(key.to_vec())))
    }

    pub fn count_between(&self, lo: &[u8], hi: &[u8]) -> Result<u64> {
        self.run(|e| {
            e.count_range(
                &RangeBound::Key(lo.to_vec()),
                &RangeBound::Key(hi.to_vec()),
            )
        })
    }

    pub fn exists(&self, key: &[u8]) -> Result<()> {
        self.run(|e| e.exists(key))
    }

    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.run(|e| {
            let mut out = None;
            e.get(key, &mut |v| out = Some(v.to_vec()))?;
            Ok(out.expect("engine reported success without delivering a value"))
        })
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.run(|e| e.put(key, value))
    }

    pub fn remove(&self, key: &[u8]) -> Result<()> {
        self.run(|e| e.remove(key))
    }

    pub fn get_above(&self, key: &[u8], callback: &mut dyn FnMut(&[u8], &[u8]) -> i32) -> Result<()> {
        self.run(|e| e.get_range(&RangeBound::Key(key.to_vec()), &RangeBound::Max, callback))
    }

    pub fn get_below(&self, key: &[u8], callback: &mut dyn FnMut(&[u8], &[u8]) -> i32) -> Result<()> {
        self.run(|e| e.get_range(&RangeBound::Min, &RangeBound::Key(key.to_vec()), callback))
    }

    pub fn get_between(
        &self,
        lo: &[u8],
        hi: &[u8],
        callback: &mut dyn FnMut(&[u8], &[u8]) -> i32,
    ) -> Result<()> {
        self.run(|e| {
            e.get_range(
                &RangeBound::Key(lo.to_vec()),
                &RangeBound::Key(hi.to_vec()),
                callback,
            )
        })
    }

    pub fn get_all(&self, callback: &mut dyn FnMut(&[u8], &[u8]) -> i32) -> Result<()> {
        self.run(|e| e.get_range(&RangeBound::Min, &RangeBound::Max, callback))
    }

    /// The general form `above`/`below`/`between`/`all` all desugar to:
    /// arbitrary [`RangeBound`] endpoints, for callers that already have a
    /// bound in hand (e.g. forwarding `MIN_KEY`/`MAX_KEY` sentinels).
    pub fn get_range(
        &self,
        lo: &RangeBound,
        hi: &RangeBound,
        callback: &mut dyn FnMut(&[u8], &[u8]) -> i32,
    ) -> Result<()> {
        self.run(|e| e.get_range(lo, hi, callback))
    }

    pub fn count_range(&self, lo: &RangeBound, hi: &RangeBound) -> Result<u64> {
        self.run(|e| e.count_range(lo, hi))
    }
}
