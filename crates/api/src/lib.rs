//! The public contract: the opaque [`Db`] handle, status plumbing, and the
//! thread-local last-error diagnostic channel (spec §6).
//!
//! Engines are reached only through [`Db::open`]; nothing in this crate
//! lets an internal panic or a raw `io::Error` escape a public call — every
//! method returns a [`sortkv_core::Result`] and records its own diagnostic
//! on failure.

mod db;
mod diagnostic;

pub use db::Db;
pub use diagnostic::last_error;
pub use sortkv_config::ConfigBag;
pub use sortkv_core::{
    ByteComparator, Comparator, Error, RangeBound, Result, Status, DEFAULT_COMPARATOR_NAME,
};
