//! Engine dispatch (spec §4.4): maps an engine name plus a configuration
//! bag to a concrete opened engine.
//!
//! Mirrors the teacher's process-wide singleton registry pattern, but keyed
//! by engine name instead of filesystem path: this spec allows multiple
//! independently-named engines rather than one Database instance per path.

use crate::blackhole::BlackholeEngine;
use crate::engine_trait::Engine;
use crate::sorted::SortedEngine;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use sortkv_config::ConfigBag;
use sortkv_core::{Error, Result};
use std::collections::HashMap;

type EngineFactory = fn(ConfigBag) -> Result<Box<dyn Engine>>;

static REGISTRY: Lazy<Mutex<HashMap<&'static str, EngineFactory>>> = Lazy::new(|| {
    let mut registry: HashMap<&'static str, EngineFactory> = HashMap::new();
    registry.insert("sorted", sorted_factory);
    registry.insert("blackhole", blackhole_factory);
    Mutex::new(registry)
});

fn sorted_factory(config: ConfigBag) -> Result<Box<dyn Engine>> {
    Ok(Box::new(SortedEngine::open(config)?))
}

fn blackhole_factory(config: ConfigBag) -> Result<Box<dyn Engine>> {
    Ok(Box::new(BlackholeEngine::open(config)?))
}

/// Open `name` with `config`, taking ownership of the bag. Unknown names
/// yield `WrongEngineName` without touching `config`'s comparator or any
/// filesystem state.
pub fn open(name: &str, config: ConfigBag) -> Result<Box<dyn Engine>> {
    let factory = {
        let registry = REGISTRY.lock();
        registry.get(name).copied()
    };
    match factory {
        Some(factory) => factory(config),
        None => Err(Error::WrongEngineName(name.to_string())),
    }
}

/// Destroy an engine handle, releasing transient state. Durable state is
/// untouched; this is just `drop` given a name that matches the public
/// contract's vocabulary.
pub fn close(engine: Box<dyn Engine>) {
    drop(engine);
    tracing::debug!("engine closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_engine_name_is_rejected() {
        let err = open("no-such-engine", ConfigBag::new()).unwrap_err();
        assert_eq!(err.status(), sortkv_core::Status::WrongEngineName);
    }

    #[test]
    fn blackhole_is_reachable_through_dispatch() {
        let engine = open("blackhole", ConfigBag::new()).unwrap();
        assert_eq!(engine.count_all().unwrap(), 0);
        close(engine);
    }
}
