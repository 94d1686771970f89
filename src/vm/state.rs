//! Launch state machine types.

use serde::{Deserialize, Serialize};

/// Phases of the launch state machine.
///
/// The engine moves `Idle → Validating → Preparing → Handoff`, then ends
/// in `Terminated` (guest ran and shut down; the host process exits) or
/// `Failed` (error before handoff; the call returns normally). Nothing
/// returns to the caller once `Handoff` is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchPhase {
    /// No launch in progress.
    Idle,

    /// Configuration consumed from the registry, being validated.
    Validating,

    /// Backend setup: memory, vCPUs, root binding, guest entrypoint.
    Preparing,

    /// Guest owns the process's stdio; blocking until guest shutdown.
    Handoff,

    /// Guest shut down; the host process is about to exit.
    Terminated,

    /// Launch failed before handoff; the error was returned to the caller.
    Failed,
}

impl LaunchPhase {
    /// Check whether this phase ends the state machine.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LaunchPhase::Terminated | LaunchPhase::Failed)
    }

    /// Check whether the caller can still get control back from this phase.
    ///
    /// From `Handoff` onward the only exits are guest shutdown (process
    /// exit) or an external kill.
    pub fn can_return(&self) -> bool {
        matches!(
            self,
            LaunchPhase::Idle | LaunchPhase::Validating | LaunchPhase::Preparing
        )
    }

    /// Get the phase name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            LaunchPhase::Idle => "idle",
            LaunchPhase::Validating => "validating",
            LaunchPhase::Preparing => "preparing",
            LaunchPhase::Handoff => "handoff",
            LaunchPhase::Terminated => "terminated",
            LaunchPhase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for LaunchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Outcome of a guest run, carried from the backend to the final
/// process exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestShutdown {
    code: i32,
}

impl GuestShutdown {
    /// Wrap a guest exit code.
    pub fn new(code: i32) -> Self {
        Self { code }
    }

    /// Exit code the host process terminates with.
    pub fn exit_code(&self) -> i32 {
        self.code
    }
}
