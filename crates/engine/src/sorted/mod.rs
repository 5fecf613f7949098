//! The ordered persistent B+-tree engine (spec §4.3).

mod engine;
mod node;
mod tree;

pub use engine::{SortedEngine, DEFAULT_DEGREE, DEFAULT_KEY_MAX, DEFAULT_VALUE_MAX};
pub use node::Geometry;
