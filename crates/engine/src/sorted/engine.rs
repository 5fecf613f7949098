//! [`SortedEngine`]: validates its configuration, opens or creates the
//! backing pool, and implements the public contract over the B+-tree
//! algorithms in [`super::tree`].

use crate::engine_trait::Engine;
use crate::sorted::node::Geometry;
use crate::sorted::tree;
use sortkv_config::ConfigBag;
use sortkv_core::{ByteComparator, Comparator, Error, RangeBound, Result, DEFAULT_COMPARATOR_NAME};
use sortkv_pool::Pool;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Compile-time branching factor for newly created pools. Existing pools
/// keep whatever degree they were created with (read back from the header).
pub const DEFAULT_DEGREE: u32 = 32;
/// Compile-time `KEY_MAX` for newly created pools, in bytes. Kept modest
/// so a default-geometry leaf node block (`LEAF_CAP * (KEY_MAX + VALUE_MAX)`
/// plus header) stays a few dozen kilobytes rather than hundreds — small
/// pools (a single mebibyte and up) need to hold several such blocks plus
/// room for the WAL to stage one in full.
pub const DEFAULT_KEY_MAX: u64 = 256;
/// Compile-time `VALUE_MAX` for newly created pools, in bytes.
pub const DEFAULT_VALUE_MAX: u64 = 1024;

pub struct SortedEngine {
    pool: Pool,
    comparator: Arc<dyn Comparator>,
    geo: Geometry,
}

impl SortedEngine {
    pub fn open(config: ConfigBag) -> Result<Self> {
        let path = config
            .get_string("path")
            .ok_or_else(|| Error::ConfigParsingError("missing required option 'path'".into()))?
            .to_string();
        let force_create = config.get_int64("force_create").unwrap_or(0) != 0;
        let comparator = config
            .comparator()
            .unwrap_or_else(|| Arc::new(ByteComparator));

        let path = Path::new(&path);
        let exists = path.exists();

        let pool = if !exists || force_create {
            if force_create && exists {
                std::fs::remove_file(path).map_err(Error::Io)?;
            }
            let size = config.get_uint64("size").ok_or_else(|| {
                Error::ConfigParsingError(
                    "missing required option 'size' when creating a new pool".into(),
                )
            })?;
            create_pool(path, size, comparator.name())?
        } else {
            Pool::open(path, comparator.name())?
        };

        let geo = Geometry {
            degree: pool.degree(),
            key_max: pool.key_max(),
            value_max: pool.value_max(),
        };

        tracing::info!(
            path = %path.display(),
            degree = geo.degree,
            key_max = geo.key_max,
            value_max = geo.value_max,
            comparator = comparator.name(),
            "sorted engine opened"
        );

        Ok(Self {
            pool,
            comparator,
            geo,
        })
    }
}

fn create_pool(path: &Path, size: u64, comparator_name: &str) -> Result<Pool> {
    let path: PathBuf = path.to_path_buf();
    Pool::create(
        &path,
        size,
        DEFAULT_DEGREE,
        DEFAULT_KEY_MAX,
        DEFAULT_VALUE_MAX,
        comparator_name,
    )
}

impl Engine for SortedEngine {
    fn count_all(&self) -> Result<u64> {
        tree::count_all(&self.pool)
    }

    fn count_range(&self, lo: &RangeBound, hi: &RangeBound) -> Result<u64> {
        tree::count_range(&self.pool, &self.geo, self.comparator.as_ref(), lo, hi)
    }

    fn exists(&self, key: &[u8]) -> Result<()> {
        tree::exists(&self.pool, &self.geo, self.comparator.as_ref(), key)
    }

    fn get(&self, key: &[u8], callback: &mut dyn FnMut(&[u8])) -> Result<()> {
        let value = tree::get(&self.pool, &self.geo, self.comparator.as_ref(), key)?;
        callback(&value);
        Ok(())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        tree::put(&self.pool, &self.geo, self.comparator.as_ref(), key, value)
    }

    fn remove(&self, key: &[u8]) -> Result<()> {
        tree::remove(&self.pool, &self.geo, self.comparator.as_ref(), key)
    }

    fn get_range(
        &self,
        lo: &RangeBound,
        hi: &RangeBound,
        callback: &mut dyn FnMut(&[u8], &[u8]) -> i32,
    ) -> Result<()> {
        tree::get_range(
            &self.pool,
            &self.geo,
            self.comparator.as_ref(),
            lo,
            hi,
            callback,
        )
    }
}
