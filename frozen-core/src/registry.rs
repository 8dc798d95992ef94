//! Process-wide table of declared types, keyed by name.
//!
//! Only needed to turn a stored type name back into a descriptor (see
//! [`RawSnapshot::resolve`](crate::RawSnapshot::resolve)). Registration is
//! append-only and is normally done once at startup.

use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::RwLock;

use crate::{FrozenError, TypeDescriptor};

static REGISTRY: LazyLock<RwLock<HashMap<&'static str, &'static TypeDescriptor>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Registers a type under its name, resolving its catalog eagerly so that a
/// broken hierarchy is reported here rather than on first use.
///
/// Registering the same descriptor twice is a no-op. Registering a different
/// descriptor under a taken name fails with [`FrozenError::DuplicateType`].
pub fn register(descriptor: &'static TypeDescriptor) -> Result<(), FrozenError> {
    descriptor.catalog()?;

    let mut registry = REGISTRY.write();
    match registry.get(descriptor.name) {
        Some(existing) if core::ptr::eq(*existing, descriptor) => Ok(()),
        Some(_) => Err(FrozenError::DuplicateType {
            type_name: descriptor.name,
        }),
        None => {
            trace!("Registered {}", descriptor.name);
            registry.insert(descriptor.name, descriptor);
            Ok(())
        }
    }
}

/// Looks a registered type up by name
pub fn lookup(name: &str) -> Option<&'static TypeDescriptor> {
    REGISTRY.read().get(name).copied()
}

/// Names of every registered type, sorted
pub fn registered() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY.read().keys().copied().collect();
    names.sort_unstable();
    names
}
