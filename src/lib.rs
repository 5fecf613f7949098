//! sortkv: a persistent, ordered key-value store over a memory-mapped
//! pool, with crash-consistent B+-tree storage and a pluggable comparator.
//!
//! This root crate is a thin re-export over the workspace: [`Db`] is the
//! entry point, [`ConfigBag`] configures an engine before opening it, and
//! [`RangeBound`] names range-scan endpoints (including the `MIN_KEY`/
//! `MAX_KEY` sentinels).
//!
//! ```no_run
//! use sortkv::{ConfigBag, Db};
//!
//! let mut config = ConfigBag::new();
//! config.put_string("path", "/tmp/example.sortkv");
//! config.put_uint64("size", 16 * 1024 * 1024);
//!
//! let db = Db::open("sorted", config)?;
//! db.put(b"hello", b"world")?;
//! assert_eq!(db.get(b"hello")?, b"world");
//! # Ok::<(), sortkv::Error>(())
//! ```

pub use sortkv_api::{
    last_error, ByteComparator, Comparator, ConfigBag, Db, Error, RangeBound, Result, Status,
    DEFAULT_COMPARATOR_NAME,
};
pub use sortkv_engine::{BlackholeEngine, Engine, SortedEngine};
