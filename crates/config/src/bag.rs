//! [`ConfigBag`]: the ordered, typed mapping engines read their options from.

use crate::value::ConfigValue;
use crate::RESERVED_COMPARATOR_NAME;
use sortkv_core::Comparator;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A typed mapping from option names to values, consumed by an engine at
/// open time.
///
/// Insertion order is preserved so that, on drop, `Object` bindings are
/// disposed of in reverse insertion order — the last object registered is
/// the first one torn down, mirroring how a caller would expect resources
/// acquired later (and potentially dependent on earlier ones) to be released
/// first.
#[derive(Default)]
pub struct ConfigBag {
    entries: Vec<(String, ConfigValue)>,
    index: HashMap<String, usize>,
    comparator: Option<Arc<dyn Comparator>>,
}

impl ConfigBag {
    /// Create an empty configuration bag.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: &str, value: ConfigValue) {
        if let Some(&i) = self.index.get(name) {
            // Replacing drops the old value immediately, running its
            // disposer now rather than waiting for bag teardown.
            self.entries[i].1 = value;
        } else {
            self.index.insert(name.to_string(), self.entries.len());
            self.entries.push((name.to_string(), value));
        }
    }

    fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// Store a signed 64-bit integer under `name`.
    pub fn put_int64(&mut self, name: &str, value: i64) {
        self.insert(name, ConfigValue::Int64(value));
    }

    /// Store an unsigned 64-bit integer under `name`.
    pub fn put_uint64(&mut self, name: &str, value: u64) {
        self.insert(name, ConfigValue::UInt64(value));
    }

    /// Store a double under `name`.
    pub fn put_double(&mut self, name: &str, value: f64) {
        self.insert(name, ConfigValue::Double(value));
    }

    /// Store a string under `name`.
    pub fn put_string(&mut self, name: &str, value: impl Into<String>) {
        self.insert(name, ConfigValue::String(value.into()));
    }

    /// Store an explicit-length byte buffer under `name`.
    pub fn put_data(&mut self, name: &str, value: impl Into<Vec<u8>>) {
        self.insert(name, ConfigValue::Data(value.into()));
    }

    /// Store an externally-owned object under `name`.
    pub fn put_object<T: Any + Send>(&mut self, name: &str, value: T) {
        self.insert(name, ConfigValue::Object(Box::new(value)));
    }

    /// Bind a comparator under the reserved `__comparator` name.
    ///
    /// A later call replaces the previously bound comparator.
    pub fn put_comparator(&mut self, comparator: Arc<dyn Comparator>) {
        self.comparator = Some(comparator);
    }

    /// Read the comparator bound by [`ConfigBag::put_comparator`], if any.
    pub fn comparator(&self) -> Option<Arc<dyn Comparator>> {
        self.comparator.clone()
    }

    /// Read a signed 64-bit integer bound under `name`.
    pub fn get_int64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            ConfigValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Read an unsigned 64-bit integer bound under `name`.
    pub fn get_uint64(&self, name: &str) -> Option<u64> {
        match self.get(name)? {
            ConfigValue::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    /// Read a double bound under `name`.
    pub fn get_double(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ConfigValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Read a string bound under `name`.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ConfigValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Read a byte buffer bound under `name`.
    pub fn get_data(&self, name: &str) -> Option<&[u8]> {
        match self.get(name)? {
            ConfigValue::Data(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Read an object bound under `name`, downcasting to `T`.
    pub fn get_object<T: Any>(&self, name: &str) -> Option<&T> {
        match self.get(name)? {
            ConfigValue::Object(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Whether any value is bound under `name` (of any kind).
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The kind of whatever is bound under `name`, if anything.
    pub fn kind_of(&self, name: &str) -> Option<&'static str> {
        self.get(name).map(ConfigValue::kind_name)
    }

    /// Names bound in this bag, in insertion order. Does not include the
    /// reserved comparator binding.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl Drop for ConfigBag {
    fn drop(&mut self) {
        // Reverse insertion order: last registered, first disposed.
        while let Some((name, value)) = self.entries.pop() {
            self.index.remove(&name);
            drop(value);
        }
    }
}
