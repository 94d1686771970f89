//! Hypervisor backend discovery.
//!
//! Real backends (KVM, Hypervisor.framework) live outside this crate and
//! plug in through the [`VmBackend`] trait; embedders pass their backend
//! to [`Vmm::with_backend`](crate::Vmm::with_backend). This module only
//! knows how to enumerate what is compiled in.

use crate::error::{Error, Result};
use crate::vm::VmBackend;

/// Create the default backend for this platform.
///
/// Fails when no hypervisor backend is compiled into this build; the
/// embedder must supply one through `Vmm::with_backend`.
pub fn create_default() -> Result<Box<dyn VmBackend>> {
    Err(Error::backend(
        "no hypervisor backend compiled in for this platform",
    ))
}

/// List all available backends.
pub fn available_backends() -> Vec<&'static str> {
    Vec::new()
}
