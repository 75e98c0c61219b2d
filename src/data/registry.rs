//! Process-wide factory registry for archived types.
//!
//! Deserializing a polymorphic object requires constructing a default
//! instance from its stored type label before its fields can be read back.
//! The registry is an explicit table from label to factory function,
//! populated at startup (see [`register_default_types`]) before any
//! deserialization takes place.

use super::archive::{Archive, ArchiveError};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

type ArchiveFactory = fn() -> Box<dyn Archive>;

fn table() -> &'static RwLock<HashMap<&'static str, ArchiveFactory>> {
    static TABLE: OnceLock<RwLock<HashMap<&'static str, ArchiveFactory>>> = OnceLock::new();
    TABLE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Registers a factory for the type labeled `label`.
///
/// Registering the same label twice replaces the previous factory and logs a
/// warning.
pub fn register(label: &'static str, factory: ArchiveFactory) {
    let mut table = table().write().unwrap();
    if table.insert(label, factory).is_some() {
        log::warn!("type `{label}` registered more than once; keeping the latest factory");
    }
}

/// Returns `true` if a factory is registered for `label`.
pub fn is_registered(label: &str) -> bool {
    table().read().unwrap().contains_key(label)
}

/// Constructs a default instance of the type labeled `label`.
pub fn instantiate(label: &str) -> Result<Box<dyn Archive>, ArchiveError> {
    let table = table().read().unwrap();
    let factory = table
        .get(label)
        .ok_or_else(|| ArchiveError::UnknownType(label.to_owned()))?;
    Ok(factory())
}

/// Registers the factories for every archived type defined by this crate.
///
/// Hosts must call this once at startup before reading any archive.
pub fn register_default_types() {
    register("DistanceJoint", || {
        Box::new(crate::dynamics::DistanceJoint::default())
    });
    register("BarrelShape", || {
        Box::new(crate::geometry::BarrelShape::default())
    });
}
