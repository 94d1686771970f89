//! VM configuration, launch state machine, and collaborator seams.
//!
//! This module provides the core abstractions of the launch path:
//! - [`VmConfig`] / [`LaunchRequest`]: accumulated and resolved settings
//! - [`LaunchPhase`]: the boot/handoff state machine
//! - [`VmBackend`]: trait for hypervisor backend implementations
//! - [`GuestConsole`]: trait for the stdio handoff subsystem

pub mod backend;
pub mod config;
pub mod console;
pub mod launch;
pub mod state;
#[cfg(test)]
pub(crate) mod testing;

use crate::error::Result;
use std::path::Path;

pub use config::{
    GuestEnv, LaunchRequest, VmConfig, VmResources, DEFAULT_RAM_MIB, DEFAULT_VCPUS, MAX_RAM_MIB,
    MAX_VCPUS,
};
pub use console::PassthroughConsole;
pub use state::{GuestShutdown, LaunchPhase};

/// Hypervisor backend driving an actual microVM.
///
/// The launch engine invokes each method once, synchronously, during the
/// Preparing and Handoff phases. Implementations handle the
/// platform-specific details of memory, vCPUs, and guest boot.
pub trait VmBackend: Send + Sync {
    /// Backend name (e.g., "kvm", "hvf").
    fn name(&self) -> &'static str;

    /// Check if this backend is available on the current system.
    fn is_available(&self) -> bool;

    /// Allocate guest memory and create vCPUs.
    fn allocate(&self, vcpus: u8, ram_mib: u32) -> Result<()>;

    /// Bind the host path as the guest root filesystem.
    ///
    /// This is where root existence and readability are checked; the
    /// control plane defers all filesystem inspection to this point.
    fn bind_root(&self, root: &Path) -> Result<()>;

    /// Load the guest entrypoint and make it runnable with the resolved
    /// argv/envp.
    fn start_guest(&self, request: &LaunchRequest) -> Result<()>;

    /// Block until the guest shuts down, returning its exit code.
    ///
    /// This call spans the entire guest lifetime; the host process exits
    /// with the returned code.
    fn wait_shutdown(&self) -> Result<i32>;
}

/// Console subsystem handing the process's stdio to the guest.
pub trait GuestConsole: Send + Sync {
    /// Redirect the current process's stdin/stdout to the guest console.
    ///
    /// After this call the guest appears to directly own the controlling
    /// terminal: no framing, no multiplexing.
    fn redirect_stdio(&self) -> Result<()>;
}
