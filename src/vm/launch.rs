//! Launch engine: drives the irreversible transition into the microVM.
//!
//! The engine consumes a configuration from the registry (exactly once),
//! validates it, prepares the hypervisor backend, and hands the process's
//! stdio to the guest. Every failure before the handoff returns normally
//! to the caller with the handle left consumed; nothing returns once the
//! handoff has happened.

use crate::error::Result;
use crate::registry::ContextRegistry;
use crate::vm::state::{GuestShutdown, LaunchPhase};
use crate::vm::{GuestConsole, VmBackend};

/// One launch attempt against a context handle.
///
/// The engine is single-use: it tracks the [`LaunchPhase`] of this
/// attempt and ends in `Terminated` or `Failed`.
pub struct LaunchEngine<'a> {
    registry: &'a ContextRegistry,
    backend: &'a dyn VmBackend,
    console: &'a dyn GuestConsole,
    phase: LaunchPhase,
}

impl<'a> LaunchEngine<'a> {
    /// Create an engine over the given registry and collaborators.
    pub fn new(
        registry: &'a ContextRegistry,
        backend: &'a dyn VmBackend,
        console: &'a dyn GuestConsole,
    ) -> Self {
        Self {
            registry,
            backend,
            console,
            phase: LaunchPhase::Idle,
        }
    }

    /// Current phase of this launch attempt.
    pub fn phase(&self) -> LaunchPhase {
        self.phase
    }

    /// Run the launch to guest shutdown.
    ///
    /// On success this returns only after the guest has shut down; the
    /// caller is expected to exit the process with the carried code. On
    /// any pre-handoff failure the handle stays consumed and the error is
    /// returned; the caller must create a fresh context to retry.
    pub fn run(&mut self, ctx: u32) -> Result<GuestShutdown> {
        match self.drive(ctx) {
            Ok(shutdown) => Ok(shutdown),
            Err(e) => {
                self.transition(ctx, LaunchPhase::Failed);
                tracing::error!(ctx, error = %e, "launch failed before handoff");
                Err(e)
            }
        }
    }

    fn drive(&mut self, ctx: u32) -> Result<GuestShutdown> {
        self.transition(ctx, LaunchPhase::Validating);
        // Exactly-once consumption; the handle is invalid from here on,
        // launched or not.
        let config = self.registry.take(ctx)?;
        let request = config.resolve()?;

        self.transition(ctx, LaunchPhase::Preparing);
        self.backend
            .allocate(request.resources.vcpus, request.resources.ram_mib)?;
        self.backend.bind_root(&request.root)?;
        self.backend.start_guest(&request)?;
        self.console.redirect_stdio()?;

        // The guest owns the terminal now. Nothing past this point hands
        // control back to the caller.
        self.transition(ctx, LaunchPhase::Handoff);
        let code = match self.backend.wait_shutdown() {
            Ok(code) => code,
            Err(e) => {
                tracing::error!(ctx, error = %e, "guest wait failed after handoff");
                1
            }
        };

        self.transition(ctx, LaunchPhase::Terminated);
        Ok(GuestShutdown::new(code))
    }

    fn transition(&mut self, ctx: u32, next: LaunchPhase) {
        tracing::debug!(ctx, from = %self.phase, to = %next, "launch phase transition");
        self.phase = next;
    }
}
