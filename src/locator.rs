//! Capability lookup.
//!
//! A [`Locator`] maps a capability type (usually a `dyn Trait`) to a provider
//! function. The first registration for a type wins; the first
//! [`load`](Locator::load) runs the provider and every later load returns the
//! same `'static` instance. Loading a type nobody registered is fatal.

use core::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::OnceLock;

use crossbeam_utils::sync::ShardedLock;

use crate::accessor::MemoryAccessor;
use crate::backend;
use crate::config::AccessorConfig;

/// Builds the instance of a capability.
pub type Provider<S> = fn() -> Box<S>;

struct Slot<S: ?Sized + 'static> {
    provider: Provider<S>,
    instance: OnceLock<&'static S>,
}

/// A registry of capability providers.
///
/// Slots are leaked on registration and live for the rest of the process, so a
/// provider runs with no lock held and may itself use the locator.
pub struct Locator {
    slots: ShardedLock<HashMap<TypeId, &'static (dyn Any + Send + Sync)>>,
}

impl Locator {
    /// Creates a locator with nothing registered.
    pub fn new() -> Self {
        Self {
            slots: ShardedLock::new(HashMap::new()),
        }
    }

    /// The process-wide locator.
    ///
    /// It starts out with the [`MemoryAccessor`] provider registered; the
    /// provider reads [`AccessorConfig::from_env`] when it first runs.
    pub fn global() -> &'static Locator {
        static GLOBAL: OnceLock<Locator> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let locator = Locator::new();
            locator.register::<dyn MemoryAccessor>(configured_accessor);
            locator
        })
    }

    /// Registers `provider` for `S`.
    ///
    /// Returns `false` and keeps the existing provider if `S` already has one.
    pub fn register<S: ?Sized + Sync + 'static>(&self, provider: Provider<S>) -> bool {
        let mut slots = self.slots.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if slots.contains_key(&TypeId::of::<S>()) {
            tracing::debug!(capability = type_name::<S>(), "provider already registered");
            return false;
        }
        let slot: &'static Slot<S> = Box::leak(Box::new(Slot {
            provider,
            instance: OnceLock::new(),
        }));
        slots.insert(TypeId::of::<S>(), slot);
        true
    }

    /// Returns `true` if a provider for `S` is registered.
    pub fn is_registered<S: ?Sized + 'static>(&self) -> bool {
        self.slots
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(&TypeId::of::<S>())
    }

    /// Returns the instance of `S`, creating it on first use.
    ///
    /// # Panics
    /// Panics if no provider for `S` is registered.
    pub fn load<S: ?Sized + Sync + 'static>(&self) -> &'static S {
        let Some(slot) = self.slot::<S>() else {
            tracing::error!(capability = type_name::<S>(), "no provider registered");
            panic!("no implementation of `{}` installed", type_name::<S>());
        };
        *slot.instance.get_or_init(|| {
            tracing::debug!(capability = type_name::<S>(), "resolving capability");
            let instance: &'static S = Box::leak((slot.provider)());
            instance
        })
    }

    /// The slot for `S`; the read guard is released before returning.
    fn slot<S: ?Sized + Sync + 'static>(&self) -> Option<&'static Slot<S>> {
        let entry: &'static (dyn Any + Send + Sync) = *self
            .slots
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&TypeId::of::<S>())?;
        entry.downcast_ref::<Slot<S>>()
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::new()
    }
}

fn configured_accessor() -> Box<dyn MemoryAccessor> {
    let config = AccessorConfig::from_env();
    tracing::info!(backend = %config.backend, "selected memory accessor backend");
    backend::create(config.backend)
}
