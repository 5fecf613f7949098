//! The configuration bag.
//!
//! A typed, order-preserving mapping from option names to one of a small
//! closed set of value kinds. Engines consume (or discard) the bag at open
//! time; `open()` takes it by value so there is no question of who owns it
//! afterward.

mod bag;
mod value;

pub use bag::ConfigBag;
pub use value::ConfigValue;

/// Name reserved for the comparator binding: set only via
/// [`ConfigBag::put_comparator`], never through the generic `put_*` calls.
pub const RESERVED_COMPARATOR_NAME: &str = "__comparator";
