//! Stdio handoff to the guest console.

use crate::error::Result;
use crate::vm::GuestConsole;

/// Direct-redirection console: the guest console is wired straight over
/// the process's existing stdio descriptors.
///
/// The backend attaches the guest serial console to fds 0/1, so there is
/// nothing to remap here; the contract is that no framing or multiplexing
/// layer is ever inserted between the terminal and the guest.
#[derive(Debug, Default)]
pub struct PassthroughConsole;

impl GuestConsole for PassthroughConsole {
    fn redirect_stdio(&self) -> Result<()> {
        tracing::debug!("handing stdio to guest console (direct passthrough)");
        Ok(())
    }
}
