//! The closed set of value kinds a configuration bag can hold.

use std::any::Any;
use std::fmt;

/// One binding's value, tagged by its kind.
///
/// Each name holds exactly one value of exactly one kind; replacing a
/// binding with a value of a different kind is allowed and simply drops the
/// old one (running its disposer immediately if it was an `Object`).
pub enum ConfigValue {
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// IEEE-754 double.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Explicit-length byte buffer.
    Data(Vec<u8>),
    /// An externally-owned object. Dropping this value (directly, or via the
    /// bag's own `Drop` impl) disposes of it through ordinary `Box` drop
    /// semantics, which stands in for the disposer-callback pattern of an
    /// opaque-pointer C API.
    Object(Box<dyn Any + Send>),
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Int64(v) => write!(f, "Int64({v})"),
            ConfigValue::UInt64(v) => write!(f, "UInt64({v})"),
            ConfigValue::Double(v) => write!(f, "Double({v})"),
            ConfigValue::String(v) => write!(f, "String({v:?})"),
            ConfigValue::Data(v) => write!(f, "Data({} bytes)", v.len()),
            ConfigValue::Object(_) => write!(f, "Object(..)"),
        }
    }
}

impl ConfigValue {
    /// A short name for this value's kind, used in type-mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConfigValue::Int64(_) => "int64",
            ConfigValue::UInt64(_) => "uint64",
            ConfigValue::Double(_) => "double",
            ConfigValue::String(_) => "string",
            ConfigValue::Data(_) => "data",
            ConfigValue::Object(_) => "object",
        }
    }
}
