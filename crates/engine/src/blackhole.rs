//! The `blackhole` engine: accepts every write and remembers nothing. It
//! exists to exercise the dispatch layer and the public contract's
//! `NOT_SUPPORTED` path against an engine that cannot order keys, without
//! pulling in a second storage backend.

use crate::engine_trait::Engine;
use sortkv_config::ConfigBag;
use sortkv_core::{Error, RangeBound, Result};

pub struct BlackholeEngine;

impl BlackholeEngine {
    pub fn open(_config: ConfigBag) -> Result<Self> {
        tracing::debug!("blackhole engine opened");
        Ok(Self)
    }
}

impl Engine for BlackholeEngine {
    fn count_all(&self) -> Result<u64> {
        Ok(0)
    }

    fn count_range(&self, _lo: &RangeBound, _hi: &RangeBound) -> Result<u64> {
        Err(Error::NotSupported)
    }

    fn exists(&self, _key: &[u8]) -> Result<()> {
        Err(Error::NotFound)
    }

    fn get(&self, _key: &[u8], _callback: &mut dyn FnMut(&[u8])) -> Result<()> {
        Err(Error::NotFound)
    }

    fn put(&self, _key: &[u8], _value: &[u8]) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &[u8]) -> Result<()> {
        Err(Error::NotFound)
    }

    fn get_range(
        &self,
        _lo: &RangeBound,
        _hi: &RangeBound,
        _callback: &mut dyn FnMut(&[u8], &[u8]) -> i32,
    ) -> Result<()> {
        Err(Error::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortkv_core::Status;

    #[test]
    fn put_always_succeeds_and_is_forgotten() {
        let engine = BlackholeEngine::open(ConfigBag::new()).unwrap();
        engine.put(b"a", b"1").unwrap();
        assert_eq!(engine.exists(b"a").unwrap_err().status(), Status::NotFound);
        assert_eq!(engine.count_all().unwrap(), 0);
    }

    #[test]
    fn ordered_operations_are_not_supported() {
        let engine = BlackholeEngine::open(ConfigBag::new()).unwrap();
        let err = engine
            .count_range(&RangeBound::Min, &RangeBound::Max)
            .unwrap_err();
        assert_eq!(err.status(), Status::NotSupported);
    }
}
