//! Configuration context registry.
//!
//! The registry owns every [`VmConfig`] and hands callers opaque integer
//! handles. The slot table is append-only: a handle is an index into the
//! table, and a slot that has been freed or consumed stays in place as a
//! tombstone, so a stale handle can never silently alias a newer context.
//!
//! This table is the one piece of shared mutable state in the crate; all
//! access goes through a single mutex, making every operation (including
//! the exactly-once `take`) one atomic critical section.

use crate::error::{Error, Result};
use crate::vm::config::VmConfig;
use parking_lot::Mutex;

/// Handles must stay representable as non-negative `i32` so they fit the
/// signed status-code domain of the launcher surface.
const MAX_CONTEXTS: usize = i32::MAX as usize;

/// Lifecycle of one registry slot.
#[derive(Debug)]
enum Slot {
    /// Configuration is live and mutable.
    Open(Box<VmConfig>),

    /// Configuration was taken by the launch engine. Terminal.
    Consumed,

    /// Context was explicitly freed. Terminal.
    Freed,
}

/// Registry mapping integer handles to VM configurations.
#[derive(Debug, Default)]
pub struct ContextRegistry {
    slots: Mutex<Vec<Slot>>,
}

impl ContextRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh handle bound to a new, empty configuration.
    pub fn create(&self) -> Result<u32> {
        let mut slots = self.slots.lock();
        if slots.len() >= MAX_CONTEXTS {
            return Err(Error::resource_exhausted("context handle space"));
        }
        slots.push(Slot::Open(Box::default()));
        Ok((slots.len() - 1) as u32)
    }

    /// Release the configuration and invalidate the handle.
    ///
    /// Fails with `InvalidHandle` if the handle is unknown, already freed,
    /// or already consumed by a launch.
    pub fn free(&self, ctx: u32) -> Result<()> {
        let mut slots = self.slots.lock();
        match slots.get_mut(ctx as usize) {
            Some(slot @ Slot::Open(_)) => {
                *slot = Slot::Freed;
                Ok(())
            }
            _ => Err(Error::InvalidHandle(ctx)),
        }
    }

    /// Run a mutation against the configuration behind an open handle.
    ///
    /// Setters go through here; the closure runs under the table lock so
    /// the handle cannot change state mid-mutation. Fails with
    /// `AlreadyConsumed` if the handle was passed to a launch, and
    /// `InvalidHandle` if it is unknown or freed.
    pub fn update<R>(&self, ctx: u32, f: impl FnOnce(&mut VmConfig) -> Result<R>) -> Result<R> {
        let mut slots = self.slots.lock();
        match slots.get_mut(ctx as usize) {
            Some(Slot::Open(config)) => f(config),
            Some(Slot::Consumed) => Err(Error::AlreadyConsumed(ctx)),
            _ => Err(Error::InvalidHandle(ctx)),
        }
    }

    /// Remove and return the configuration, transitioning the slot to
    /// `Consumed`.
    ///
    /// Exactly-once: of two callers racing on the same handle, one gets
    /// the configuration and the other observes `AlreadyConsumed`.
    pub fn take(&self, ctx: u32) -> Result<VmConfig> {
        let mut slots = self.slots.lock();
        match slots.get_mut(ctx as usize) {
            Some(slot @ Slot::Open(_)) => match std::mem::replace(slot, Slot::Consumed) {
                Slot::Open(config) => Ok(*config),
                _ => unreachable!("slot matched Open under the table lock"),
            },
            Some(Slot::Consumed) => Err(Error::AlreadyConsumed(ctx)),
            _ => Err(Error::InvalidHandle(ctx)),
        }
    }

    /// Number of handles ever allocated (open, freed, or consumed).
    pub fn allocated(&self) -> usize {
        self.slots.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};

    #[test]
    fn test_create_returns_distinct_handles() {
        let registry = ContextRegistry::new();
        let a = registry.create().unwrap();
        let b = registry.create().unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.allocated(), 2);
    }

    #[test]
    fn test_free_invalidates_handle() {
        let registry = ContextRegistry::new();
        let ctx = registry.create().unwrap();
        registry.free(ctx).unwrap();

        assert!(matches!(registry.free(ctx), Err(Error::InvalidHandle(_))));
        assert!(matches!(
            registry.update(ctx, |c| c.set_root("/rootfs")),
            Err(Error::InvalidHandle(_))
        ));
        assert!(matches!(registry.take(ctx), Err(Error::InvalidHandle(_))));
    }

    #[test]
    fn test_unknown_handle_rejected() {
        let registry = ContextRegistry::new();
        assert!(matches!(registry.free(7), Err(Error::InvalidHandle(7))));
        assert!(matches!(registry.take(7), Err(Error::InvalidHandle(7))));
    }

    #[test]
    fn test_freed_handle_is_never_reused() {
        let registry = ContextRegistry::new();
        let a = registry.create().unwrap();
        registry.free(a).unwrap();
        let b = registry.create().unwrap();
        assert_ne!(a, b, "freed handle must not alias a new context");
        assert!(matches!(registry.take(a), Err(Error::InvalidHandle(_))));
    }

    #[test]
    fn test_take_is_exactly_once() {
        let registry = ContextRegistry::new();
        let ctx = registry.create().unwrap();
        registry.take(ctx).unwrap();
        assert!(matches!(registry.take(ctx), Err(Error::AlreadyConsumed(_))));
    }

    #[test]
    fn test_setters_after_take_report_consumed() {
        let registry = ContextRegistry::new();
        let ctx = registry.create().unwrap();
        registry.take(ctx).unwrap();
        assert!(matches!(
            registry.update(ctx, |c| c.set_root("/rootfs")),
            Err(Error::AlreadyConsumed(_))
        ));
        // free on a consumed handle is InvalidHandle, not AlreadyConsumed
        assert!(matches!(registry.free(ctx), Err(Error::InvalidHandle(_))));
    }

    #[test]
    fn test_update_reaches_the_right_config() {
        let registry = ContextRegistry::new();
        let a = registry.create().unwrap();
        let b = registry.create().unwrap();
        registry.update(a, |c| c.set_root("/a")).unwrap();
        registry.update(b, |c| c.set_root("/b")).unwrap();

        let config = registry.take(a).unwrap();
        assert_eq!(config.root_path.as_deref(), Some(std::path::Path::new("/a")));
        let config = registry.take(b).unwrap();
        assert_eq!(config.root_path.as_deref(), Some(std::path::Path::new("/b")));
    }

    #[test]
    fn test_concurrent_take_race_has_one_winner() {
        let registry = Arc::new(ContextRegistry::new());
        let ctx = registry.create().unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let threads: Vec<_> = (0..2)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    registry.take(ctx).is_ok()
                })
            })
            .collect();

        let wins: usize = threads
            .into_iter()
            .map(|t| t.join().unwrap() as usize)
            .sum();
        assert_eq!(wins, 1, "exactly one take must win the race");
    }

    #[test]
    fn test_concurrent_create_and_free() {
        let registry = Arc::new(ContextRegistry::new());
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let ctx = registry.create().unwrap();
                        registry.update(ctx, |c| c.set_root("/rootfs")).unwrap();
                        registry.free(ctx).unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(registry.allocated(), 800);
    }
}
