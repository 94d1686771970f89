//! Process-wide launcher state and the public operation surface.

use crate::error::Result;
use crate::log::LogControl;
use crate::registry::ContextRegistry;
use crate::vm::launch::LaunchEngine;
use crate::vm::{backend, GuestConsole, GuestEnv, PassthroughConsole, VmBackend};
use std::convert::Infallible;
use std::path::Path;

/// The launcher control plane: context registry, hypervisor backend,
/// console subsystem, and log verbosity, explicitly constructed and
/// passed around rather than living in a process-wide singleton.
///
/// All operations are safe to call from multiple threads; the registry
/// serializes its own bookkeeping. Configuring a single handle while
/// concurrently launching it is the caller's responsibility to order.
pub struct Vmm {
    registry: ContextRegistry,
    backend: Box<dyn VmBackend>,
    console: Box<dyn GuestConsole>,
    log: LogControl,
}

impl Vmm {
    /// Create a launcher with the default platform backend.
    ///
    /// Fails when no hypervisor backend is compiled into this build; use
    /// [`Vmm::with_backend`] to supply one.
    pub fn new() -> Result<Self> {
        Ok(Self::with_backend(
            backend::create_default()?,
            Box::new(PassthroughConsole),
        ))
    }

    /// Create a launcher over an explicit backend and console.
    pub fn with_backend(backend: Box<dyn VmBackend>, console: Box<dyn GuestConsole>) -> Self {
        Self {
            registry: ContextRegistry::new(),
            backend,
            console,
            log: LogControl::new(),
        }
    }

    /// Set the log verbosity level (0 = off .. 5 = trace).
    ///
    /// Idempotent; the last call wins. Fails with `InvalidArgument` for
    /// levels above 5.
    pub fn set_log_level(&self, level: u32) -> Result<()> {
        self.log.set_level(level)
    }

    /// Create a configuration context, returning its handle.
    pub fn create_ctx(&self) -> Result<u32> {
        let ctx = self.registry.create()?;
        tracing::debug!(ctx, "created configuration context");
        Ok(ctx)
    }

    /// Free an existing configuration context.
    pub fn free_ctx(&self, ctx: u32) -> Result<()> {
        self.registry.free(ctx)?;
        tracing::debug!(ctx, "freed configuration context");
        Ok(())
    }

    /// Set vCPU count and RAM size for the microVM.
    pub fn set_vm_config(&self, ctx: u32, num_vcpus: u8, ram_mib: u32) -> Result<()> {
        self.registry
            .update(ctx, |c| c.set_resources(num_vcpus, ram_mib))
    }

    /// Set the host path to use as the guest root filesystem.
    ///
    /// The path is not inspected here; a missing or unreadable root
    /// surfaces when the launch binds it.
    pub fn set_root(&self, ctx: u32, root_path: impl AsRef<Path>) -> Result<()> {
        self.registry.update(ctx, |c| c.set_root(root_path))
    }

    /// Set the guest entrypoint (relative to the root), its argument
    /// vector, and its environment.
    ///
    /// `envp = None` means "inherit the host environment": the snapshot
    /// is taken at launch time, not here, so variables exported between
    /// this call and the launch reach the guest. `Some(vec![])` is an
    /// explicitly empty environment.
    pub fn set_exec(
        &self,
        ctx: u32,
        exec_path: impl AsRef<Path>,
        argv: Vec<String>,
        envp: Option<Vec<String>>,
    ) -> Result<()> {
        let env = match envp {
            Some(vars) => GuestEnv::Explicit { vars },
            None => GuestEnv::Inherit,
        };
        self.registry.update(ctx, |c| c.set_exec(exec_path, argv, env))
    }

    /// Start and enter the microVM.
    ///
    /// This consumes the configuration behind `ctx`: whatever happens,
    /// the handle is invalid afterwards. On any failure before the
    /// handoff the error is returned normally. **On success this function
    /// does not return**: the guest takes over the process's stdio, and
    /// when it shuts down the host process exits with the guest's code.
    /// The uninhabited `Ok` type makes the non-return visible to callers.
    pub fn start_enter(&self, ctx: u32) -> Result<Infallible> {
        let mut engine = LaunchEngine::new(&self.registry, self.backend.as_ref(), self.console.as_ref());
        let shutdown = engine.run(ctx)?;
        tracing::info!(ctx, code = shutdown.exit_code(), "guest shut down, exiting host process");
        std::process::exit(shutdown.exit_code())
    }
}
