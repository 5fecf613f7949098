//! Shared types for the sortkv workspace.
//!
//! This crate carries nothing specific to any one engine: the stable status
//! codes and error type every crate propagates through, the comparator
//! binding that decides key order, and the range-endpoint sentinels used by
//! ordered scans.

pub mod comparator;
pub mod error;
pub mod range;

pub use comparator::{ByteComparator, Comparator, DEFAULT_COMPARATOR_NAME};
pub use error::{Error, Result, Status};
pub use range::RangeBound;
