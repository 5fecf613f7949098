//! Engines and dispatch for sortkv.
//!
//! This crate carries the B+-tree sorted engine (spec §4.3), the
//! `blackhole` no-op engine, and the dispatch layer (§4.4) that maps an
//! engine name plus a configuration bag to a concrete opened [`Engine`].

mod blackhole;
mod dispatch;
mod engine_trait;
mod sorted;

pub use blackhole::BlackholeEngine;
pub use dispatch::{close, open};
pub use engine_trait::Engine;
pub use sorted::{Geometry, SortedEngine, DEFAULT_DEGREE, DEFAULT_KEY_MAX, DEFAULT_VALUE_MAX};
