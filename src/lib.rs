//! # vmenter
//!
//! Control plane for a microVM launcher: describe a lightweight VM
//! (vCPUs, RAM, root filesystem, guest entrypoint, argv, envp) through an
//! opaque integer handle, then irrevocably hand the calling process over
//! to it.
//!
//! The crate owns the configuration-context registry and the
//! boot/handoff state machine. The hypervisor itself (device emulation,
//! virtio transport, guest kernel boot) is an external collaborator
//! behind the [`VmBackend`] trait.
//!
//! ## Quick start
//!
//! ```no_run
//! use vmenter::Vmm;
//!
//! fn main() -> vmenter::Result<()> {
//!     let vmm = Vmm::new()?;
//!     let ctx = vmm.create_ctx()?;
//!     vmm.set_vm_config(ctx, 2, 512)?;
//!     vmm.set_root(ctx, "/var/lib/vmenter/rootfs")?;
//!     vmm.set_exec(ctx, "/bin/sh", vec!["/bin/sh".into()], None)?;
//!
//!     // Only returns if the launch fails before the handoff; on
//!     // success the guest owns the process until it shuts down.
//!     vmm.start_enter(ctx)?;
//!     unreachable!("start_enter does not return on success");
//! }
//! ```
//!
//! ## The non-return contract
//!
//! [`Vmm::start_enter`] consumes the configuration behind the handle.
//! Every failure before the handoff is reported once, synchronously, as
//! an [`Error`] (with a negative status code via [`Error::status`]), and
//! the handle stays consumed. On success the function never returns: the
//! guest takes the process's stdio, and guest shutdown exits the host
//! process with the guest's code.

#![deny(missing_docs)]

pub mod error;
mod log;
pub mod registry;
pub mod vm;
mod vmm;

pub use error::{Error, Result};
pub use log::{level_filter, MAX_LOG_LEVEL};
pub use registry::ContextRegistry;
pub use vm::{
    GuestConsole, GuestEnv, GuestShutdown, LaunchPhase, LaunchRequest, PassthroughConsole,
    VmBackend, VmConfig, VmResources, DEFAULT_RAM_MIB, DEFAULT_VCPUS, MAX_RAM_MIB, MAX_VCPUS,
};
pub use vmm::Vmm;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
